use crate::book::*;
use crate::evaluate::*;
use crate::movegen::*;
use crate::movetypes::*;
use crate::position::*;
use crate::search::*;
use crate::sfen::SfenError;
use crate::thread::*;
use crate::types::*;
use crate::usioption::*;
use anyhow::Context;
use thiserror::Error;

pub const ENGINE_NAME: &str = concat!("tsubame ", env!("CARGO_PKG_VERSION"));
pub const AUTHORS: &str = "the tsubame developers";

#[derive(Error, Debug)]
pub enum UsiError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("option {0} is not a button")]
    NotButton(String),
    #[error("invalid value {value} for option {name}")]
    InvalidOptionValue { name: String, value: String },
    #[error("no value after {0}")]
    MissingValue(String),
    #[error(r#"invalid token: "{0}""#)]
    InvalidToken(String),
    #[error("illegal move {mv} in {sfen}")]
    IllegalMove { mv: String, sfen: String },
    #[error(r#"we need "isready" command in advance"#)]
    NotReady,
    #[error("sfen error: {0}")]
    Sfen(#[from] SfenError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn next_num<T: std::str::FromStr>(token: &str, iter: &mut std::slice::Iter<'_, &str>) -> Result<T, UsiError> {
    let item = iter.next().ok_or_else(|| UsiError::MissingValue(token.to_string()))?;
    item.parse().map_err(|_| UsiError::InvalidToken(item.to_string()))
}

/// Parses the arguments of "go". Margins are taken off the clock here.
pub fn parse_go(usi_options: &UsiOptions, args: &[&str]) -> Result<LimitsType, UsiError> {
    let mut limits = LimitsType::new();
    limits.start_time = Some(std::time::Instant::now());
    let mut iter = args.iter();
    while let Some(&token) = iter.next() {
        match token {
            "btime" | "wtime" => {
                let color = if token == "btime" { Color::BLACK } else { Color::WHITE };
                let n: u64 = next_num(token, &mut iter)?;
                let time_margin = usi_options.get_i64(UsiOptions::TIME_MARGIN) as u64;
                limits.time[color.0 as usize] = std::time::Duration::from_millis(n.saturating_sub(time_margin));
            }
            "binc" | "winc" => {
                let color = if token == "binc" { Color::BLACK } else { Color::WHITE };
                let n = next_num(token, &mut iter)?;
                limits.inc[color.0 as usize] = std::time::Duration::from_millis(n);
            }
            "byoyomi" => {
                let n: u64 = next_num(token, &mut iter)?;
                // "byoyomi 0" means sudden death.
                if n != 0 {
                    let byoyomi_margin = usi_options.get_i64(UsiOptions::BYOYOMI_MARGIN) as u64;
                    limits.movetime = Some(std::time::Duration::from_millis(n.saturating_sub(byoyomi_margin)));
                }
            }
            "movetime" => {
                let n = next_num(token, &mut iter)?;
                limits.movetime = Some(std::time::Duration::from_millis(n));
            }
            "movestogo" => limits.movestogo = Some(next_num(token, &mut iter)?),
            "depth" => limits.depth = Some(next_num(token, &mut iter)?),
            "nodes" => limits.nodes = Some(next_num(token, &mut iter)?),
            "perft" => limits.perft = Some(next_num(token, &mut iter)?),
            "infinite" => limits.infinite = true,
            "ponder" => limits.ponder = true,
            invalid_token => return Err(UsiError::InvalidToken(invalid_token.to_string())),
        }
    }
    Ok(limits)
}

/// Builds the position of a "position" command. `pos` is left alone on error.
pub fn parse_position(args: &[&str], repetition_threshold: u32) -> Result<Position, UsiError> {
    let (mut pos, rest) = match args.first() {
        Some(&"startpos") => (Position::new(), &args[1..]),
        Some(&"sfen") => {
            let end = args.iter().position(|&x| x == "moves").unwrap_or(args.len());
            // &args[1..end]: skip "sfen".
            (Position::new_from_sfen_args(&args[1..end])?, &args[end..])
        }
        Some(&token) => return Err(UsiError::InvalidToken(token.to_string())),
        None => return Err(UsiError::MissingValue("position".to_string())),
    };
    pos.set_repetition_threshold(repetition_threshold);
    pos.record_repetition();
    match rest.first() {
        None => {}
        Some(&"moves") => {
            for arg in &rest[1..] {
                let m = Move::new_from_usi_str(arg, &pos).ok_or_else(|| UsiError::IllegalMove {
                    mv: arg.to_string(),
                    sfen: pos.to_sfen(),
                })?;
                pos.do_move(m);
                pos.record_repetition();
            }
        }
        Some(&token) => return Err(UsiError::InvalidToken(token.to_string())),
    }
    pos.reserve_states();
    Ok(pos)
}

fn legal_moves_string(pos: &Position) -> String {
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(pos, 0);
    mlist
        .slice(0)
        .iter()
        .map(|x| x.mv.to_usi_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn perft_string(pos: &Position, depth: i32) -> String {
    let start = std::time::Instant::now();
    let mut pos = pos.clone();
    let divided = perft_divide(&mut pos, depth);
    let nodes: u64 = divided.iter().map(|(_, n)| n).sum();
    let elapsed = start.elapsed().as_millis() as u64;
    let mut s = divided
        .iter()
        .map(|(m, n)| format!("{}: {}\n", m.to_usi_string(), n))
        .collect::<String>();
    s += &format!("perft {} nodes {} time {}", depth, nodes, elapsed);
    s
}

/// The engine side of a USI session: options, position and search threads.
pub struct UsiEngine {
    usi_options: UsiOptions,
    thread_pool: ThreadPool,
    pos: Position,
    is_ready: bool,
}

impl UsiEngine {
    /// The hash table gets its configured size at "isready".
    pub fn new() -> Result<UsiEngine, UsiError> {
        let usi_options = UsiOptions::new();
        let thread_pool = ThreadPool::new(usi_options.get_i64(UsiOptions::THREADS) as usize, 1)?;
        Ok(UsiEngine {
            usi_options,
            thread_pool,
            pos: Position::new(),
            is_ready: false,
        })
    }
    pub fn position(&self) -> &Position {
        &self.pos
    }
    pub fn usi_options(&self) -> &UsiOptions {
        &self.usi_options
    }
    pub fn thread_pool(&self) -> &ThreadPool {
        &self.thread_pool
    }
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }
    /// Keeps "info" and "bestmove" lines off stdout.
    pub fn set_hide_output(&self, hide_output: bool) {
        self.thread_pool.set_hide_output(hide_output);
    }

    fn isready(&mut self) {
        if self.usi_options.get_bool(UsiOptions::BOOK_ENABLE) && self.thread_pool.book.is_none() {
            let path = self.usi_options.get_string(UsiOptions::BOOK_FILE);
            match Book::from_file(&path) {
                Ok(book) => {
                    log::info!("book {}: {} entries", path, book.len());
                    self.thread_pool.book = Some(book);
                }
                // Playing without a book is fine.
                Err(err) => log::warn!("{}", err),
            }
        }
        let hash = self.usi_options.get_i64(UsiOptions::USI_HASH) as usize;
        if self.thread_pool.tt().mega_byte_size() != hash {
            self.thread_pool.resize_tt(hash);
        }
        self.is_ready = true;
    }

    fn setoption(&mut self, args: &[&str]) -> Result<(), UsiError> {
        // setoption name <id> [value <x>]
        match args {
            ["name", name] => self.usi_options.push_button(name, &mut self.thread_pool),
            ["name", name, "value"] => Err(UsiError::MissingValue(name.to_string())),
            // A file name may contain spaces.
            ["name", name, "value", value @ ..] => {
                let value = value.join(" ");
                self.usi_options
                    .set(name, &value, &mut self.thread_pool, &mut self.pos)
            }
            ["name", ..] | [] => Err(UsiError::MissingValue("name".to_string())),
            [token, ..] => Err(UsiError::InvalidToken(token.to_string())),
        }
    }

    fn go(&mut self, args: &[&str]) -> Result<(), UsiError> {
        if !self.is_ready {
            return Err(UsiError::NotReady);
        }
        let limits = parse_go(&self.usi_options, args)?;
        if let Some(depth) = limits.perft {
            println!("{}", perft_string(&self.pos, depth as i32));
            return Ok(());
        }
        self.thread_pool.start_thinking(&self.pos, limits, &self.usi_options);
        Ok(())
    }

    /// Runs one command line. Returns `Ok(false)` after "quit".
    pub fn execute(&mut self, line: &str) -> anyhow::Result<bool> {
        let args: Vec<&str> = line.split_whitespace().collect();
        // An empty line is not an error.
        let token = match args.first() {
            Some(&token) => token,
            None => return Ok(true),
        };
        match token {
            "quit" => {
                self.thread_pool.stop();
                self.thread_pool.wait_for_search_finished();
                return Ok(false);
            }
            "stop" | "gameover" => self.thread_pool.stop(),
            "ponderhit" => self.thread_pool.ponderhit(),
            "go" => self.go(&args[1..])?,
            "isready" => {
                self.thread_pool.wait_for_search_finished();
                self.isready();
                println!("readyok");
            }
            "position" => {
                self.thread_pool.wait_for_search_finished();
                let threshold = self.usi_options.get_i64(UsiOptions::REPETITION_COUNT) as u32;
                self.pos = parse_position(&args[1..], threshold)?;
            }
            "setoption" => {
                self.setoption(&args[1..])
                    .with_context(|| format!("setoption failed: {}", line))?;
            }
            "usi" => {
                println!("id name {}", ENGINE_NAME);
                println!("id author {}", AUTHORS);
                println!("{}", self.usi_options.to_usi_string());
                println!("usiok");
            }
            "usinewgame" => {
                self.thread_pool.wait_for_search_finished();
                self.thread_pool.clear();
            }
            // Not required commands as USI protocol.
            "d" => {
                println!("sfen {}", self.pos.to_sfen());
                println!("key {:016x}", self.pos.key().0);
                println!("checkers {}", self.pos.in_check());
            }
            "eval" => println!("{}", evaluate(&self.pos).to_usi()),
            "legal_moves" => println!("{}", legal_moves_string(&self.pos)),
            "perft" => {
                let mut iter = args[1..].iter();
                let depth: i32 = next_num(token, &mut iter)?;
                println!("{}", perft_string(&self.pos, depth));
            }
            "wait" => self.thread_pool.wait_for_search_finished(),
            _ => return Err(UsiError::UnknownCommand(line.to_string()).into()),
        }
        Ok(true)
    }
}

/// Reads commands from stdin until "quit" or EOF. With command line
/// arguments, runs them as one command and exits.
pub fn cmd_loop() -> anyhow::Result<()> {
    let mut engine = UsiEngine::new().context("cannot start search threads")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let line = args.join(" ");
        engine.execute(&line)?;
        engine.execute("wait")?;
        return Ok(());
    }
    let mut line = String::new();
    loop {
        line.clear();
        // read_line() includes "\n". EOF is Ok(0).
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => line = "quit".to_string(),
            Ok(_) => {}
            Err(err) => {
                log::error!("cannot read stdin: {}", err);
                line = "quit".to_string();
            }
        }
        match engine.execute(line.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => log::warn!("{:#}", err),
        }
    }
    Ok(())
}

#[test]
fn test_parse_go() {
    let mut usi_options = UsiOptions::new();
    let limits = parse_go(&usi_options, &["btime", "60000", "wtime", "300", "binc", "1000", "byoyomi", "0"]).unwrap();
    assert_eq!(limits.time[Color::BLACK.0 as usize].as_millis(), 59_500);
    assert_eq!(limits.time[Color::WHITE.0 as usize].as_millis(), 0);
    assert_eq!(limits.inc[Color::BLACK.0 as usize].as_millis(), 1000);
    assert_eq!(limits.movetime, None);
    assert!(limits.use_time_management());

    usi_options.set_value(UsiOptions::BYOYOMI_MARGIN, "100").unwrap();
    let limits = parse_go(&usi_options, &["btime", "0", "wtime", "0", "byoyomi", "3000"]).unwrap();
    assert_eq!(limits.movetime, Some(std::time::Duration::from_millis(2900)));

    let limits = parse_go(&usi_options, &["depth", "5", "nodes", "10000", "movestogo", "20"]).unwrap();
    assert_eq!(limits.depth, Some(5));
    assert_eq!(limits.nodes, Some(10000));
    assert_eq!(limits.movestogo, Some(20));
    assert!(!limits.use_time_management());

    assert!(parse_go(&usi_options, &["infinite"]).unwrap().infinite);
    let limits = parse_go(&usi_options, &["ponder", "btime", "1000", "wtime", "1000", "byoyomi", "1000"]).unwrap();
    assert!(limits.ponder);
    assert!(limits.movetime.is_some());
    assert!(!parse_go(&usi_options, &["depth", "1"]).unwrap().ponder);
    assert_eq!(parse_go(&usi_options, &["perft", "3"]).unwrap().perft, Some(3));
    assert!(matches!(parse_go(&usi_options, &["depth"]), Err(UsiError::MissingValue(_))));
    assert!(matches!(parse_go(&usi_options, &["depth", "x"]), Err(UsiError::InvalidToken(_))));
    assert!(matches!(parse_go(&usi_options, &["mate", "1"]), Err(UsiError::InvalidToken(_))));
}

#[test]
fn test_parse_position() {
    let pos = parse_position(&["startpos", "moves", "7g7f", "3c3d", "8h2b+"], 4).unwrap();
    assert_eq!(
        pos.to_sfen(),
        "lnsgkgsnl/1r5+B1/pppppp1pp/6p2/9/2P6/PP1PPPPPP/7R1/LNSGKGSNL w B 4"
    );
    let sfen = ["sfen", "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL", "b", "-", "1"];
    assert_eq!(parse_position(&sfen, 4).unwrap().key(), Position::new().key());
    let mut args = sfen.to_vec();
    args.extend_from_slice(&["moves", "2g2f"]);
    assert_eq!(parse_position(&args, 4).unwrap().game_ply(), 2);

    assert!(matches!(
        parse_position(&["startpos", "moves", "7g7f", "7g7f"], 4),
        Err(UsiError::IllegalMove { .. })
    ));
    assert!(matches!(parse_position(&["sfen", "9/9", "b", "-", "1"], 4), Err(UsiError::Sfen(_))));
    assert!(matches!(parse_position(&["startpos", "7g7f"], 4), Err(UsiError::InvalidToken(_))));
    assert!(matches!(parse_position(&["endpos"], 4), Err(UsiError::InvalidToken(_))));
    assert!(matches!(parse_position(&[], 4), Err(UsiError::MissingValue(_))));
}

#[test]
fn test_parse_position_repetition() {
    let shuffle = ["5i5h", "5a5b", "5h5i", "5b5a"];
    let mut args = vec!["startpos", "moves"];
    for _ in 0..2 {
        args.extend_from_slice(&shuffle);
    }
    // The start position has now occurred 3 times.
    let pos = parse_position(&args, 4).unwrap();
    assert_eq!(pos.repetition_count(), 3);
    assert!(!pos.is_game_over());
    args.extend_from_slice(&shuffle);
    let pos = parse_position(&args, 4).unwrap();
    assert_eq!(pos.game_status(), GameStatus::Repetition);
    assert_eq!(pos.winner(), None);
    // A lower threshold ends the game earlier.
    let pos = parse_position(&args[..6], 2).unwrap();
    assert_eq!(pos.game_status(), GameStatus::Repetition);
}

#[test]
fn test_execute_rejects_bad_input() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut engine = UsiEngine::new().unwrap();
            engine.set_hide_output(true);
            let before = engine.position().to_sfen();
            assert!(engine.execute("position startpos moves 1a1b").is_err());
            assert!(engine.execute("position sfen 9/9/9 b - 1").is_err());
            assert_eq!(engine.position().to_sfen(), before);
            assert!(engine.execute("go depth 1").is_err());
            assert!(engine.execute("setoption name No_Such_Option value 1").is_err());
            assert!(engine.execute("setoption name Threads value many").is_err());
            assert!(engine.execute("setoption name USI_Hash").is_err());
            assert!(engine.execute("hello").is_err());
            assert!(engine.execute("").unwrap());
            assert!(!engine.execute("quit").unwrap());
        })
        .unwrap()
        .join()
        .unwrap();
}
