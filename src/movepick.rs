use crate::movegen::*;
use crate::movetypes::*;
use crate::piecevalue::*;
use crate::position::*;
use crate::types::*;

/// Quiet move scores indexed by side to move and the 16-bit move.
pub struct ButterflyHistory {
    v: Vec<i16>,
}

impl ButterflyHistory {
    pub const MAX: i32 = 30000;
    const MOVE_BITS: usize = 16;

    #[allow(clippy::new_without_default)]
    pub fn new() -> ButterflyHistory {
        ButterflyHistory {
            v: vec![0; Color::NUM << ButterflyHistory::MOVE_BITS],
        }
    }
    fn index(c: Color, m: Move) -> usize {
        ((c.0 as usize) << ButterflyHistory::MOVE_BITS) | m.to_u16() as usize
    }
    pub fn get(&self, c: Color, m: Move) -> i32 {
        i32::from(self.v[ButterflyHistory::index(c, m)])
    }
    // Saturating update. The result never leaves [-MAX, MAX].
    pub fn update(&mut self, c: Color, m: Move, bonus: i32) {
        let bonus = bonus.clamp(-ButterflyHistory::MAX, ButterflyHistory::MAX);
        let entry = &mut self.v[ButterflyHistory::index(c, m)];
        let val = i32::from(*entry);
        *entry = (val + bonus - val * bonus.abs() / ButterflyHistory::MAX) as i16;
    }
    /// Fades old statistics before a new search. Odd `bump`s shift every entry
    /// by one so helper threads order ties differently.
    pub fn decay(&mut self, bump: i16) {
        for item in self.v.iter_mut() {
            *item = (i32::from(*item) * 3 / 4) as i16 + bump;
        }
    }
    pub fn fill(&mut self, val: i16) {
        self.v.iter_mut().for_each(|item| *item = val);
    }
}

custom_derive! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, NextVariant)]
    enum Stage {
        MainTt, CaptureInit, Capture, QuietInit, Quiet,
        EvasionTt, EvasionInit, Evasion,
        QSearchInit, QSearch,
    }
}

impl Stage {
    fn is_terminal(self) -> bool {
        matches!(self, Stage::Quiet | Stage::Evasion | Stage::QSearch)
    }
}

const EVASION_QUIET_OFFSET: i32 = 1 << 28;

fn promotion_gain(m: Move, pos: &Position) -> i32 {
    if m.is_promotion() {
        promote_piece_type_value(PieceType::new(pos.piece_on(m.from()))).0
    } else {
        0
    }
}

// MVV-LVA plus what a promotion adds.
fn capture_score(m: Move, pos: &Position) -> i32 {
    let victim = PieceType::new(pos.piece_on(m.to()));
    let attacker = PieceType::new(pos.piece_on(m.from()));
    capture_piece_type_value(victim).0 - lva_value(attacker).0 + promotion_gain(m, pos)
}

fn score_captures(move_list: &mut [ExtMove], pos: &Position) {
    for ext_move in move_list {
        ext_move.score = capture_score(ext_move.mv, pos);
    }
}

fn score_quiets(move_list: &mut [ExtMove], pos: &Position, history: &ButterflyHistory) {
    let us = pos.side_to_move();
    for ext_move in move_list {
        let m = ext_move.mv;
        ext_move.score = history.get(us, m) + if m.is_drop() { 0 } else { promotion_gain(m, pos) };
    }
}

fn score_evasions(move_list: &mut [ExtMove], pos: &Position, history: &ButterflyHistory) {
    let us = pos.side_to_move();
    for ext_move in move_list {
        let m = ext_move.mv;
        ext_move.score = if m.is_capture(pos) {
            capture_score(m, pos)
        } else {
            history.get(us, m) - EVASION_QUIET_OFFSET
        };
    }
}

fn sort_descending(move_list: &mut [ExtMove]) {
    move_list.sort_by(|a, b| b.cmp(a));
}

/// Yields the moves of a node best first, generating lazily by stage. Every
/// move returned is legal.
pub struct MovePicker {
    stage: Stage,
    tt_move: Option<Move>,
    move_list: MoveList,
    cur: usize,
}

impl MovePicker {
    pub fn new(pos: &Position, tt_move: Option<Move>, depth: Depth) -> MovePicker {
        let tt_move = tt_move.filter(|&m| pos.pseudo_legal(m) && pos.is_legal(m));
        let stage = if pos.in_check() {
            match tt_move {
                Some(_) => Stage::EvasionTt,
                None => Stage::EvasionInit,
            }
        } else if depth <= Depth::ZERO {
            Stage::QSearchInit
        } else {
            match tt_move {
                Some(_) => Stage::MainTt,
                None => Stage::CaptureInit,
            }
        };
        MovePicker {
            stage,
            tt_move: if stage == Stage::QSearchInit { None } else { tt_move },
            move_list: MoveList::new(),
            cur: 0,
        }
    }
    fn advance(&mut self) {
        if let Some(stage) = self.stage.next_variant() {
            self.stage = stage;
        }
    }
    // Next legal move of the current list that was not already yielded as the hash move.
    fn select_next(&mut self, pos: &Position) -> Option<Move> {
        while self.cur < self.move_list.len() {
            let m = self.move_list.slice(self.cur)[0].mv;
            self.cur += 1;
            if Some(m) != self.tt_move && pos.is_legal(m) {
                return Some(m);
            }
        }
        None
    }
    fn init_list(&mut self, pos: &Position, history: &ButterflyHistory) {
        self.cur = 0;
        match self.stage {
            Stage::CaptureInit | Stage::QSearchInit => {
                self.move_list.generate::<CapturesType>(pos, 0);
                score_captures(self.move_list.slice_mut(0), pos);
            }
            Stage::QuietInit => {
                self.move_list.generate::<QuietsType>(pos, 0);
                score_quiets(self.move_list.slice_mut(0), pos, history);
            }
            Stage::EvasionInit => {
                self.move_list.generate::<EvasionsType>(pos, 0);
                score_evasions(self.move_list.slice_mut(0), pos, history);
            }
            _ => unreachable!(),
        }
        sort_descending(self.move_list.slice_mut(0));
    }
    pub fn next_move(&mut self, pos: &Position, history: &ButterflyHistory) -> Option<Move> {
        loop {
            match self.stage {
                Stage::MainTt | Stage::EvasionTt => {
                    self.advance();
                    if self.tt_move.is_some() {
                        return self.tt_move;
                    }
                }
                Stage::CaptureInit | Stage::QuietInit | Stage::EvasionInit | Stage::QSearchInit => {
                    self.init_list(pos, history);
                    self.advance();
                }
                Stage::Capture | Stage::Quiet | Stage::Evasion | Stage::QSearch => {
                    if let Some(m) = self.select_next(pos) {
                        return Some(m);
                    }
                    if self.stage.is_terminal() {
                        return None;
                    }
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
fn collect(pos: &Position, tt_move: Option<Move>, depth: Depth) -> Vec<Move> {
    let history = ButterflyHistory::new();
    let mut mp = MovePicker::new(pos, tt_move, depth);
    let mut moves = Vec::new();
    while let Some(m) = mp.next_move(pos, &history) {
        moves.push(m);
    }
    assert_eq!(mp.next_move(pos, &history), None);
    moves
}

#[test]
fn test_history_update_is_bounded() {
    let mut history = ButterflyHistory::new();
    let m = Move::new_unpromote(Square::SQ77, Square::SQ76);
    for _ in 0..1000 {
        history.update(Color::BLACK, m, 100_000);
    }
    assert!(history.get(Color::BLACK, m) <= ButterflyHistory::MAX);
    assert!(history.get(Color::BLACK, m) > ButterflyHistory::MAX - 100);
    assert_eq!(history.get(Color::WHITE, m), 0);
    for _ in 0..1000 {
        history.update(Color::BLACK, m, -100_000);
    }
    assert!(history.get(Color::BLACK, m) >= -ButterflyHistory::MAX);
    history.fill(400);
    history.decay(0);
    assert_eq!(history.get(Color::WHITE, m), 300);
    history.decay(1);
    assert_eq!(history.get(Color::WHITE, m), 226);
}

#[test]
fn test_move_picker_yields_all_legal_moves_once() {
    let sfens = [
        crate::sfen::START_SFEN,
        "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w GR5pnsg 1",
        "9/4k4/r8/3b5/4L4/9/9/9/4K4 w pnsg 1",
    ];
    for sfen in sfens.iter() {
        let pos = Position::new_from_sfen(sfen).unwrap();
        let mut legal = MoveList::new();
        legal.generate::<LegalType>(&pos, 0);
        let tt_move = legal.slice(0).last().map(|x| x.mv);
        let mut picked = collect(&pos, tt_move, Depth(4));
        assert_eq!(picked.first().copied(), tt_move);
        let mut expected: Vec<Move> = legal.slice(0).iter().map(|x| x.mv).collect();
        let key = |m: &Move| m.to_u16();
        picked.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(picked, expected);
    }
}

#[test]
fn test_move_picker_captures_first() {
    let pos = Position::new_from_sfen("l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w GR5pnsg 1").unwrap();
    let moves = collect(&pos, None, Depth(4));
    let first_quiet = moves.iter().position(|m| !m.is_capture(&pos)).unwrap();
    assert!(moves[first_quiet..].iter().all(|m| !m.is_capture(&pos)));
    assert!(first_quiet > 0);
}

#[test]
fn test_move_picker_qsearch() {
    let pos = Position::new_from_sfen("4k4/9/4p4/4R4/9/9/9/9/4K4 b - 1").unwrap();
    let moves = collect(&pos, Some(Move::new_unpromote(Square::SQ54, Square::SQ44)), Depth::ZERO);
    // only the capture, the hash move is not a capture and is ignored.
    assert_eq!(moves.len(), 2);
    assert!(moves.iter().all(|m| m.is_capture(&pos)));
    assert!(moves[0].is_promotion());
}

#[test]
fn test_move_picker_rejects_illegal_tt_move() {
    let pos = Position::new();
    let illegal = Move::new_unpromote(Square::SQ77, Square::SQ75);
    let moves = collect(&pos, Some(illegal), Depth(2));
    assert_eq!(moves.len(), 30);
    assert!(!moves.contains(&illegal));
}
