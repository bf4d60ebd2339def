use crate::evaluate::*;
use crate::movegen::*;
use crate::movepick::*;
use crate::movetypes::*;
use crate::position::*;
use crate::timeman::*;
use crate::tt::*;
use crate::types::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub const MAX_DEPTH: i32 = Depth::MAX.0;

#[derive(Clone, Debug)]
pub struct LimitsType {
    pub time: [std::time::Duration; 2],
    pub inc: [std::time::Duration; 2],
    pub movestogo: Option<u32>,
    pub depth: Option<u32>,
    pub movetime: Option<std::time::Duration>,
    pub perft: Option<u32>,
    pub infinite: bool,
    pub ponder: bool,
    pub nodes: Option<u64>,
    pub start_time: Option<std::time::Instant>,
}

impl LimitsType {
    pub fn new() -> LimitsType {
        let duration = std::time::Duration::from_millis(0);
        LimitsType {
            time: [duration; 2],
            inc: [duration; 2],
            movestogo: None,
            depth: None,
            movetime: None,
            perft: None,
            infinite: false,
            ponder: false,
            nodes: None,
            start_time: None,
        }
    }
    pub fn use_time_management(&self) -> bool {
        self.movetime.is_none() && self.depth.is_none() && self.nodes.is_none() && self.perft.is_none() && !self.infinite
    }
    /// True if the clock, not only depth or nodes, ends the search.
    pub fn is_time_limited(&self) -> bool {
        !self.infinite && (self.movetime.is_some() || self.use_time_management())
    }
}

/// Switches for every pruning heuristic. With all of them off the search
/// returns the minimax value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub null_move: bool,
    pub lmr: bool,
    pub aspiration: bool,
    pub tt_cutoffs: bool,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            null_move: true,
            lmr: true,
            aspiration: true,
            tt_cutoffs: true,
        }
    }
}

impl SearchOptions {
    pub const NONE: SearchOptions = SearchOptions {
        null_move: false,
        lmr: false,
        aspiration: false,
        tt_cutoffs: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search aborted")]
pub struct Aborted;

pub fn value_from_tt(v: Value, ply: i32) -> Value {
    match v {
        Value::NONE => Value::NONE,
        v if v >= Value::MATE_IN_MAX_PLY => v - Value(ply),
        v if v <= Value::MATED_IN_MAX_PLY => v + Value(ply),
        v => v,
    }
}

pub fn value_to_tt(v: Value, ply: i32) -> Value {
    debug_assert!(v != Value::NONE);
    match v {
        v if v >= Value::MATE_IN_MAX_PLY => v + Value(ply),
        v if v <= Value::MATED_IN_MAX_PLY => v - Value(ply),
        v => v,
    }
}

const NULL_MOVE_REDUCTION: i32 = 3;
const ASPIRATION_DELTA: Value = Value(64);
// Once the window has grown this wide it is opened completely.
const ASPIRATION_FULL_WINDOW_DELTA: Value = Value(1024);
const LMR_MIN_DEPTH: Depth = Depth(3);
const LMR_MIN_MOVE_COUNT: usize = 4;
const CHECK_INTERVAL: i32 = 1024;

/// Late move reductions, r = 1 + ln(move count) * ln(depth) / 2.
pub struct Reductions {
    values: Vec<i32>,
}

impl Reductions {
    const DEPTH_NUM: usize = MAX_DEPTH as usize + 1;

    pub fn new() -> Reductions {
        let mut values = vec![0; Reductions::DEPTH_NUM * ExtMove::MAX_LEGAL_MOVES];
        for d in 1..Reductions::DEPTH_NUM {
            for n in 1..ExtMove::MAX_LEGAL_MOVES {
                values[d * ExtMove::MAX_LEGAL_MOVES + n] = (1.0 + (n as f64).ln() * (d as f64).ln() * 0.5) as i32;
            }
        }
        Reductions { values }
    }
    pub fn get(&self, depth: Depth, move_count: usize) -> Depth {
        let d = depth.0.clamp(0, MAX_DEPTH) as usize;
        let n = move_count.min(ExtMove::MAX_LEGAL_MOVES - 1);
        Depth(self.values[d * ExtMove::MAX_LEGAL_MOVES + n])
    }
}

/// What a worker knows after its last complete iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationResult {
    pub best_move: Move,
    pub score: Value,
    pub depth: Depth,
    pub pv: Vec<Move>,
    pub nodes: u64,
}

/// Follows hash moves from `first` while they stay legal and the line does not repeat.
pub fn extract_pv_from_tt(pos: &mut Position, tt: &TranspositionTable, first: Move) -> Vec<Move> {
    let mut pv = vec![first];
    let mut keys = vec![pos.key()];
    pos.do_move(first);
    while pv.len() < MAX_PLY as usize && !keys.contains(&pos.key()) {
        keys.push(pos.key());
        let (found, data, _) = tt.probe(pos.key());
        match data.mv {
            Some(m) if found && pos.pseudo_legal(m) && pos.is_legal(m) => {
                pv.push(m);
                pos.do_move(m);
            }
            _ => break,
        }
    }
    for &m in pv.iter().rev() {
        pos.undo_move(m);
    }
    pv
}

/// Clock and node budget, watched by the main worker only.
pub struct TimeControl {
    pub timeman: TimeManagement,
    pub nodes: Vec<Arc<AtomicU64>>,
    pub print_info: bool,
    ponder: Arc<AtomicBool>,
    calls_count: i32,
}

impl TimeControl {
    pub fn new(timeman: TimeManagement, nodes: Vec<Arc<AtomicU64>>, print_info: bool) -> TimeControl {
        TimeControl {
            timeman,
            nodes,
            print_info,
            ponder: Arc::new(AtomicBool::new(false)),
            calls_count: CHECK_INTERVAL,
        }
    }
    /// While `ponder` is set the clock never stops the search. Clearing it
    /// ("ponderhit") puts the budget back in force.
    pub fn set_ponder(&mut self, ponder: Arc<AtomicBool>) {
        self.ponder = ponder;
    }
    pub fn is_pondering(&self) -> bool {
        self.ponder.load(Ordering::Relaxed)
    }
    pub fn nodes_searched(&self) -> u64 {
        self.nodes.iter().map(|nodes| nodes.load(Ordering::Relaxed)).sum()
    }
    fn out_of_budget(&self, limits: &LimitsType) -> bool {
        (limits.is_time_limited() && !self.is_pondering() && self.timeman.elapsed() >= self.timeman.maximum_millis())
            || limits.nodes.map_or(false, |nodes| self.nodes_searched() >= nodes)
    }
}

pub struct SearchWorker<'a> {
    pos: Position,
    tt: &'a TranspositionTable,
    history: &'a mut ButterflyHistory,
    stop: &'a AtomicBool,
    limits: LimitsType,
    options: SearchOptions,
    id: usize,
    reductions: Reductions,
    root_moves: Vec<Move>,
    iteration_best: Option<Move>,
    completed: Option<IterationResult>,
    report: Option<Arc<Mutex<Option<IterationResult>>>>,
    control: Option<TimeControl>,
}

impl<'a> SearchWorker<'a> {
    /// A worker searching every legal move of `pos`.
    pub fn new(
        pos: Position,
        tt: &'a TranspositionTable,
        history: &'a mut ButterflyHistory,
        stop: &'a AtomicBool,
        limits: LimitsType,
        id: usize,
    ) -> SearchWorker<'a> {
        let mut mlist = MoveList::new();
        mlist.generate::<LegalType>(&pos, 0);
        let root_moves = mlist.slice(0).iter().map(|x| x.mv).collect();
        SearchWorker {
            pos,
            tt,
            history,
            stop,
            limits,
            options: SearchOptions::default(),
            id,
            reductions: Reductions::new(),
            root_moves,
            iteration_best: None,
            completed: None,
            report: None,
            control: None,
        }
    }
    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }
    /// Restricts the root to `root_moves`, e.g. a single book move.
    pub fn set_root_moves(&mut self, root_moves: Vec<Move>) {
        self.root_moves = root_moves;
    }
    pub fn set_report(&mut self, report: Arc<Mutex<Option<IterationResult>>>) {
        self.report = Some(report);
    }
    pub fn set_time_control(&mut self, control: TimeControl) {
        self.control = Some(control);
    }
    pub fn root_moves(&self) -> &[Move] {
        &self.root_moves
    }
    pub fn position(&self) -> &Position {
        &self.pos
    }
    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.pos
    }
    fn check_abort(&mut self) -> Result<(), Aborted> {
        if let Some(control) = self.control.as_mut() {
            control.calls_count -= 1;
            if control.calls_count <= 0 {
                control.calls_count = CHECK_INTERVAL;
                if control.out_of_budget(&self.limits) {
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }
        if self.stop.load(Ordering::Relaxed) {
            Err(Aborted)
        } else {
            Ok(())
        }
    }

    pub fn iterative_deepening(&mut self) -> Option<IterationResult> {
        self.history.decay((self.id & 1) as i16);
        self.completed = None;
        if self.root_moves.is_empty() {
            return None;
        }
        let max_depth = self
            .limits
            .depth
            .map_or(MAX_DEPTH, |depth| (depth as i32).clamp(1, MAX_DEPTH));
        log::debug!("worker {} starts, max depth {}", self.id, max_depth);
        for depth in 1..=max_depth {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let score = match self.aspiration_search(Depth(depth)) {
                Ok(score) => score,
                Err(Aborted) => break,
            };
            let best_move = match self.iteration_best {
                Some(m) => m,
                None => break,
            };
            let result = IterationResult {
                best_move,
                score,
                depth: Depth(depth),
                pv: extract_pv_from_tt(&mut self.pos, self.tt, best_move),
                nodes: self.pos.nodes_searched(),
            };
            if let Some(report) = &self.report {
                *report.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
            }
            self.completed = Some(result);
            if let Some(control) = &self.control {
                if control.print_info {
                    if let Some(result) = &self.completed {
                        println!("{}", self.info_to_usi_string(result, control));
                    }
                }
                if self.limits.is_time_limited()
                    && !control.is_pondering()
                    && control.timeman.elapsed() >= control.timeman.optimum_millis()
                {
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }
        log::debug!("worker {} finished at {} nodes", self.id, self.pos.nodes_searched());
        self.completed.clone()
    }

    fn info_to_usi_string(&self, result: &IterationResult, control: &TimeControl) -> String {
        let elapsed_millis = control.timeman.elapsed().max(1);
        let nodes = control.nodes_searched();
        format!(
            "info depth {depth} score {score} time {time} nodes {nodes} nps {nps} hashfull {hashfull} pv {pv}",
            depth = result.depth.0,
            score = result.score.to_usi(),
            time = elapsed_millis,
            nodes = nodes,
            nps = nodes * 1000 / elapsed_millis,
            hashfull = self.tt.hashfull(),
            pv = result.pv.iter().map(|m| m.to_usi_string()).collect::<Vec<_>>().join(" ")
        )
    }

    fn aspiration_search(&mut self, depth: Depth) -> Result<Value, Aborted> {
        let previous = match &self.completed {
            Some(result) if self.options.aspiration && !result.score.is_mate_score() => result.score,
            _ => return self.search(depth, 0, -Value::INFINITE, Value::INFINITE, true),
        };
        let mut delta = ASPIRATION_DELTA;
        let mut alpha = std::cmp::max(previous - delta, -Value::INFINITE);
        let mut beta = std::cmp::min(previous + delta, Value::INFINITE);
        loop {
            let value = self.search(depth, 0, alpha, beta, true)?;
            if (value > alpha || alpha == -Value::INFINITE) && (value < beta || beta == Value::INFINITE) {
                return Ok(value);
            }
            delta = delta * 2;
            if delta >= ASPIRATION_FULL_WINDOW_DELTA {
                alpha = -Value::INFINITE;
                beta = Value::INFINITE;
            } else {
                alpha = std::cmp::max(value - delta, -Value::INFINITE);
                beta = std::cmp::min(value + delta, Value::INFINITE);
            }
        }
    }

    fn has_non_pawn_material(&self, c: Color) -> bool {
        let pawns_and_king = self.pos.pieces_pp(PieceType::PAWN, PieceType::KING);
        (self.pos.pieces_c(c) & !pawns_and_king).to_bool() || self.pos.hand(c).except_pawn_exist()
    }

    // Makes `m`, searches the child and unmakes it whatever the outcome.
    fn search_move(
        &mut self,
        m: Move,
        new_depth: Depth,
        reduction: Depth,
        ply: i32,
        alpha: Value,
        beta: Value,
    ) -> Result<Value, Aborted> {
        self.pos.do_move(m);
        self.pos.record_repetition();
        let result = self.search_child(new_depth, reduction, ply, alpha, beta);
        self.pos.unrecord_repetition();
        self.pos.undo_move(m);
        result
    }

    fn search_child(&mut self, new_depth: Depth, reduction: Depth, ply: i32, alpha: Value, beta: Value) -> Result<Value, Aborted> {
        if reduction > Depth::ZERO {
            let value = -self.search(new_depth - reduction, ply + 1, -(alpha + Value(1)), -alpha, false)?;
            if value <= alpha {
                return Ok(value);
            }
        }
        Ok(-self.search(new_depth, ply + 1, -beta, -alpha, false)?)
    }

    /// Fail-soft negamax. On abort every move made below this node has been unmade.
    pub fn search(&mut self, depth: Depth, ply: i32, mut alpha: Value, beta: Value, is_root: bool) -> Result<Value, Aborted> {
        if !is_root {
            match self.pos.game_status() {
                GameStatus::NoLegalMove => return Ok(Value::mated_in(ply)),
                GameStatus::Repetition => return Ok(Value::DRAW),
                GameStatus::InProgress => {}
            }
        }
        if depth <= Depth::ZERO {
            return self.qsearch(alpha, beta, ply);
        }
        self.check_abort()?;
        if ply >= MAX_PLY {
            return Ok(evaluate(&self.pos));
        }

        let tt = self.tt;
        let key = self.pos.key();
        let (tt_hit, tt_data, tt_writer) = tt.probe(key);
        let tt_value = if tt_hit {
            value_from_tt(tt_data.value, ply)
        } else {
            Value::NONE
        };
        let mut tt_move = if tt_hit { tt_data.mv } else { None };
        if is_root {
            // The hash entry of the root is only a move hint.
            if tt_move.is_none() {
                tt_move = self.completed.as_ref().map(|result| result.best_move);
            }
        } else if self.options.tt_cutoffs && tt_hit && tt_data.depth >= depth && tt_value != Value::NONE {
            let cut = match tt_data.bound {
                Bound::EXACT => true,
                Bound::LOWER => tt_value >= beta,
                Bound::UPPER => tt_value < alpha,
                _ => false,
            };
            if cut {
                return Ok(tt_value);
            }
        }

        let us = self.pos.side_to_move();
        let in_check = self.pos.in_check();
        if self.options.null_move && !is_root && !in_check && depth >= Depth(2) && self.has_non_pawn_material(us) {
            let null_depth = Depth((depth.0 - 1 - NULL_MOVE_REDUCTION).max(0));
            self.pos.do_null_move();
            let result = self.search(null_depth, ply + 1, -beta, -beta + Value(1), false);
            self.pos.undo_null_move();
            let value = -result?;
            if value >= beta {
                // A mate found with a pass proves nothing.
                return Ok(if value >= Value::MATE_IN_MAX_PLY { beta } else { value });
            }
        }

        let mut picker = MovePicker::new(&self.pos, tt_move, depth);
        let mut best_value = -Value::INFINITE;
        let mut best_move = None;
        let mut move_count = 0;
        let new_depth = depth - Depth::ONE_PLY;
        while let Some(m) = picker.next_move(&self.pos, &*self.history) {
            if is_root && !self.root_moves.contains(&m) {
                continue;
            }
            move_count += 1;
            let is_quiet = !m.is_capture(&self.pos) && !m.is_promotion();
            let reduction = if self.options.lmr
                && depth >= LMR_MIN_DEPTH
                && move_count >= LMR_MIN_MOVE_COUNT
                && is_quiet
                && !in_check
                && !self.pos.gives_check(m)
            {
                std::cmp::min(self.reductions.get(depth, move_count), new_depth - Depth::ONE_PLY)
            } else {
                Depth::ZERO
            };
            let value = self.search_move(m, new_depth, reduction, ply, alpha, beta)?;
            if is_root && move_count == 1 {
                self.iteration_best = Some(m);
            }
            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = Some(m);
                    if is_root {
                        self.iteration_best = Some(m);
                    }
                    if value >= beta {
                        if is_quiet {
                            self.history.update(us, m, depth.0 * depth.0);
                        }
                        tt_writer.write(key, value_to_tt(value, ply), Some(m), depth, Bound::LOWER);
                        return Ok(value);
                    }
                    alpha = value;
                }
            }
        }
        if move_count == 0 {
            return Ok(Value::mated_in(ply));
        }
        let bound = if best_move.is_some() { Bound::EXACT } else { Bound::UPPER };
        tt_writer.write(key, value_to_tt(best_value, ply), best_move, depth, bound);
        Ok(best_value)
    }

    pub fn qsearch(&mut self, mut alpha: Value, beta: Value, ply: i32) -> Result<Value, Aborted> {
        self.check_abort()?;
        match self.pos.game_status() {
            GameStatus::NoLegalMove => return Ok(Value::mated_in(ply)),
            GameStatus::Repetition => return Ok(Value::DRAW),
            GameStatus::InProgress => {}
        }
        if ply >= MAX_PLY {
            return Ok(evaluate(&self.pos));
        }
        let mut best_value = if self.pos.in_check() {
            -Value::INFINITE
        } else {
            let stand_pat = evaluate(&self.pos);
            if stand_pat >= beta {
                return Ok(stand_pat);
            }
            alpha = std::cmp::max(alpha, stand_pat);
            stand_pat
        };
        let mut picker = MovePicker::new(&self.pos, None, Depth::ZERO);
        while let Some(m) = picker.next_move(&self.pos, &*self.history) {
            self.pos.do_move(m);
            self.pos.record_repetition();
            let result = self.qsearch(-beta, -alpha, ply + 1);
            self.pos.unrecord_repetition();
            self.pos.undo_move(m);
            let value = -result?;
            if value > best_value {
                best_value = value;
                if value > alpha {
                    if value >= beta {
                        return Ok(value);
                    }
                    alpha = value;
                }
            }
        }
        Ok(best_value)
    }

    pub fn is_main_worker(&self) -> bool {
        self.control.is_some()
    }
}

#[cfg(test)]
fn run_search(sfen: &str, depth: u32, options: SearchOptions) -> Option<IterationResult> {
    let pos = Position::new_from_sfen(sfen).unwrap();
    let tt = TranspositionTable::new(4);
    let mut history = ButterflyHistory::new();
    let stop = AtomicBool::new(false);
    let mut limits = LimitsType::new();
    limits.depth = Some(depth);
    limits.start_time = Some(std::time::Instant::now());
    let mut worker = SearchWorker::new(pos, &tt, &mut history, &stop, limits, 0);
    worker.set_options(options);
    worker.iterative_deepening()
}

#[cfg(test)]
fn quiescence_minimax(pos: &mut Position, ply: i32) -> Value {
    match pos.game_status() {
        GameStatus::NoLegalMove => return Value::mated_in(ply),
        GameStatus::Repetition => return Value::DRAW,
        GameStatus::InProgress => {}
    }
    if ply >= MAX_PLY {
        return evaluate(pos);
    }
    let in_check = pos.in_check();
    let mut best = if in_check { -Value::INFINITE } else { evaluate(pos) };
    let mut mlist = MoveList::new();
    if in_check {
        mlist.generate::<LegalType>(pos, 0);
    } else {
        mlist.generate::<CapturesType>(pos, 0);
    }
    let moves: Vec<Move> = mlist.slice(0).iter().map(|x| x.mv).filter(|&m| pos.is_legal(m)).collect();
    for m in moves {
        pos.do_move(m);
        pos.record_repetition();
        let value = -quiescence_minimax(pos, ply + 1);
        pos.unrecord_repetition();
        pos.undo_move(m);
        best = std::cmp::max(best, value);
    }
    best
}

#[cfg(test)]
fn minimax(pos: &mut Position, depth: i32, ply: i32) -> Value {
    if ply > 0 {
        match pos.game_status() {
            GameStatus::NoLegalMove => return Value::mated_in(ply),
            GameStatus::Repetition => return Value::DRAW,
            GameStatus::InProgress => {}
        }
    }
    if depth <= 0 {
        return quiescence_minimax(pos, ply);
    }
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(pos, 0);
    let moves: Vec<Move> = mlist.slice(0).iter().map(|x| x.mv).collect();
    let mut best = -Value::INFINITE;
    for m in moves {
        pos.do_move(m);
        pos.record_repetition();
        let value = -minimax(pos, depth - 1, ply + 1);
        pos.unrecord_repetition();
        pos.undo_move(m);
        best = std::cmp::max(best, value);
    }
    best
}

#[test]
fn test_reductions() {
    let reductions = Reductions::new();
    assert_eq!(reductions.get(Depth(1), 30), Depth(1));
    assert_eq!(reductions.get(Depth(3), 4), Depth(1));
    assert!(reductions.get(Depth(20), 40) > reductions.get(Depth(10), 40));
    assert!(reductions.get(Depth(10), 40) > reductions.get(Depth(10), 5));
    // 1 + ln(30) * ln(10) / 2 = 4.9...
    assert_eq!(reductions.get(Depth(10), 30), Depth(4));
}

#[test]
fn test_value_to_tt_and_back() {
    assert_eq!(value_from_tt(value_to_tt(Value(123), 7), 7), Value(123));
    let mate = Value::mate_in(9);
    assert_eq!(value_to_tt(mate, 4), Value::mate_in(5));
    assert_eq!(value_from_tt(value_to_tt(mate, 4), 4), mate);
    let mated = Value::mated_in(6);
    assert_eq!(value_from_tt(value_to_tt(mated, 3), 3), mated);
    assert_eq!(value_from_tt(Value::NONE, 3), Value::NONE);
}

#[test]
fn test_null_move_needs_non_pawn_material() {
    let tt = TranspositionTable::new(1);
    let mut history = ButterflyHistory::new();
    let stop = AtomicBool::new(false);
    let pos = Position::new_from_sfen("4k4/9/4p4/9/9/9/4P4/9/4K4 b - 1").unwrap();
    let worker = SearchWorker::new(pos, &tt, &mut history, &stop, LimitsType::new(), 0);
    assert!(!worker.has_non_pawn_material(Color::BLACK));
    assert!(!worker.has_non_pawn_material(Color::WHITE));

    // A piece in hand counts, pawns in hand do not.
    let mut history = ButterflyHistory::new();
    let pos = Position::new_from_sfen("4k4/9/4p4/9/9/9/4P4/9/4K4 b Sp 1").unwrap();
    let worker = SearchWorker::new(pos, &tt, &mut history, &stop, LimitsType::new(), 0);
    assert!(worker.has_non_pawn_material(Color::BLACK));
    assert!(!worker.has_non_pawn_material(Color::WHITE));

    let mut history = ButterflyHistory::new();
    let pos = Position::new_from_sfen("4k4/9/4p4/9/9/9/4P4/4L4/4K4 b - 1").unwrap();
    let worker = SearchWorker::new(pos, &tt, &mut history, &stop, LimitsType::new(), 0);
    assert!(worker.has_non_pawn_material(Color::BLACK));
}

#[test]
fn test_alpha_beta_equals_minimax() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let cases = [
                ("4k4/9/4p4/4R4/9/9/9/9/4K4 b - 1", 3),
                ("4k4/9/4P4/9/9/9/9/9/4K4 b G 1", 2),
                ("3gk4/9/2p1p4/4R4/9/9/4b4/9/3GK4 w - 1", 3),
                ("9/4k4/r8/3b5/4L4/9/9/9/4K4 w pn 1", 2),
            ];
            for &(sfen, depth) in cases.iter() {
                let mut pos = Position::new_from_sfen(sfen).unwrap();
                let expected = minimax(&mut pos, depth as i32, 0);
                let result = run_search(sfen, depth, SearchOptions::NONE).unwrap();
                assert_eq!(result.score, expected, "{}", sfen);
                assert_eq!(result.depth, Depth(depth as i32));
            }
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_pruning_keeps_mate_scores() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let sfen = "4k4/9/4P4/9/9/9/9/9/4K4 b G 1";
            let plain = run_search(sfen, 3, SearchOptions::NONE).unwrap();
            let pruned = run_search(sfen, 3, SearchOptions::default()).unwrap();
            assert_eq!(plain.score, pruned.score);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_mate_in_one() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let result = run_search("4k4/9/4P4/9/9/9/9/9/4K4 b G 1", 3, SearchOptions::default()).unwrap();
            assert_eq!(result.best_move.to_usi_string(), "G*5b");
            assert_eq!(result.score, Value::mate_in(1));
            assert_eq!(result.score.to_usi(), "mate 1");
            assert_eq!(result.pv[0], result.best_move);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_tt_determinism() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let sfen = "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w GR5pnsg 1";
            let first = run_search(sfen, 3, SearchOptions::default()).unwrap();
            let second = run_search(sfen, 3, SearchOptions::default()).unwrap();
            assert_eq!(first.best_move, second.best_move);
            assert_eq!(first.score, second.score);
            assert_eq!(first.pv, second.pv);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_repetition_is_a_draw() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut pos = Position::new();
            pos.record_repetition();
            let moves = ["5i5h", "5a5b", "5h5i", "5b5a"];
            // Three full cycles minus the last move. The start position was seen three times.
            for usi in moves.iter().cycle().take(11) {
                let m = Move::new_from_usi_str(usi, &pos).unwrap();
                pos.do_move(m);
                pos.record_repetition();
            }
            let tt = TranspositionTable::new(1);
            let mut history = ButterflyHistory::new();
            let stop = AtomicBool::new(false);
            let mut worker = SearchWorker::new(pos, &tt, &mut history, &stop, LimitsType::new(), 0);
            worker.set_options(SearchOptions::NONE);
            let m = Move::new_from_usi_str("5b5a", worker.position()).unwrap();
            let pos = worker.position_mut();
            pos.do_move(m);
            pos.record_repetition();
            assert_eq!(pos.repetition_count(), 4);
            assert!(pos.is_game_over());
            assert_eq!(pos.winner(), None);
            let value = worker.search(Depth(3), 1, -Value::INFINITE, Value::INFINITE, false);
            assert_eq!(value, Ok(Value::DRAW));
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_abort_keeps_position() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let pos = Position::new();
            let sfen = pos.to_sfen();
            let key = pos.key();
            let tt = TranspositionTable::new(1);
            let mut history = ButterflyHistory::new();
            let stop = AtomicBool::new(true);
            let mut worker = SearchWorker::new(pos, &tt, &mut history, &stop, LimitsType::new(), 0);
            assert_eq!(worker.search(Depth(4), 0, -Value::INFINITE, Value::INFINITE, true), Err(Aborted));
            assert_eq!(worker.iterative_deepening(), None);
            assert_eq!(worker.position().to_sfen(), sfen);
            assert_eq!(worker.position().key(), key);
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_node_limit_stops_main_worker() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let nodes = Arc::new(AtomicU64::new(0));
            let pos = Position::new_from_position(&Position::new(), nodes.clone());
            let tt = TranspositionTable::new(1);
            let mut history = ButterflyHistory::new();
            let stop = AtomicBool::new(false);
            let mut limits = LimitsType::new();
            limits.nodes = Some(5000);
            limits.start_time = Some(std::time::Instant::now());
            let mut timeman = TimeManagement::new();
            timeman.init(&crate::usioption::UsiOptions::new(), &limits, Color::BLACK, 1);
            let mut worker = SearchWorker::new(pos, &tt, &mut history, &stop, limits, 0);
            worker.set_time_control(TimeControl::new(timeman, vec![nodes.clone()], false));
            assert!(worker.is_main_worker());
            let result = worker.iterative_deepening().unwrap();
            assert!(result.depth < Depth(MAX_DEPTH));
            assert!(stop.load(Ordering::Relaxed));
            assert!(worker.root_moves().contains(&result.best_move));
            assert!(nodes.load(Ordering::Relaxed) < 5000 + 2 * 1024 * 600);
        })
        .unwrap()
        .join()
        .unwrap();
}
