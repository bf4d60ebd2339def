use crate::position::*;
use crate::types::*;
use std::num::NonZeroU16;

// xxxxxxxx x1111111  to
// xx111111 1xxxxxxx  from, or 81 + piece type for a drop
// x1xxxxxx xxxxxxxx  promote flag
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(pub NonZeroU16);

// "No move" costs nothing in a move list or the hash table.
static_assertions::assert_eq_size!(Option<Move>, u16);

impl Move {
    const TO_MASK: u16 = 0x007f;
    const FROM_MASK: u16 = 0x3f80;
    const FROM_SHIFT: u16 = 7;
    const PROMOTE_FLAG: u16 = 1 << 14;
    const DROP_BASE: u16 = Square::NUM as u16;

    // from == to never happens for a real move.
    pub const NULL: Move = Move(match NonZeroU16::new(1 | (1 << Move::FROM_SHIFT)) {
        Some(v) => v,
        None => unreachable!(),
    });

    fn new_raw(v: u16) -> Move {
        match NonZeroU16::new(v) {
            Some(v) => Move(v),
            None => unreachable!(),
        }
    }
    pub fn new_unpromote(from: Square, to: Square) -> Move {
        debug_assert!(from.is_ok() && to.is_ok() && from != to);
        Move::new_raw(((from.0 as u16) << Move::FROM_SHIFT) | to.0 as u16)
    }
    pub fn new_promote(from: Square, to: Square) -> Move {
        Move::new_raw(Move::PROMOTE_FLAG | Move::new_unpromote(from, to).0.get())
    }
    pub fn new_drop(pt: PieceType, to: Square) -> Move {
        debug_assert!(PieceType::PAWN.0 <= pt.0 && pt.0 <= PieceType::GOLD.0);
        Move::new_raw(((Move::DROP_BASE + pt.0 as u16) << Move::FROM_SHIFT) | to.0 as u16)
    }
    /// Decodes a 16-bit move as stored in the TT or the book. The result is
    /// well formed but still has to be checked against a position.
    pub fn new_from_u16(v: u16) -> Option<Move> {
        let m = Move(NonZeroU16::new(v)?);
        let from = (v & Move::FROM_MASK) >> Move::FROM_SHIFT;
        let to = v & Move::TO_MASK;
        let valid = (to as usize) < Square::NUM
            && v & !(Move::TO_MASK | Move::FROM_MASK | Move::PROMOTE_FLAG) == 0
            && if from < Move::DROP_BASE {
                from != to
            } else {
                let pt = (from - Move::DROP_BASE) as i32;
                !m.is_promotion() && PieceType::PAWN.0 <= pt && pt <= PieceType::GOLD.0
            };
        if valid {
            Some(m)
        } else {
            None
        }
    }
    /// Parses `7g7f`, `8h2b+` or `P*5e`, accepting only moves legal in `pos`.
    pub fn new_from_usi_str(s: &str, pos: &Position) -> Option<Move> {
        let m = if let Some((piece, to)) = s.split_once('*') {
            let mut chars = piece.chars();
            let pt = PieceType::new_hand_piece_type_from_usi_char(chars.next()?)?;
            if chars.next().is_some() {
                return None;
            }
            Move::new_drop(pt, Square::new_from_usi_str(to)?)
        } else {
            let (squares, promote) = match s.strip_suffix('+') {
                Some(rest) => (rest, true),
                None => (s, false),
            };
            if squares.len() != 4 || !squares.is_ascii() {
                return None;
            }
            let from = Square::new_from_usi_str(&squares[0..2])?;
            let to = Square::new_from_usi_str(&squares[2..4])?;
            if from == to {
                return None;
            }
            if promote {
                Move::new_promote(from, to)
            } else {
                Move::new_unpromote(from, to)
            }
        };
        if !pos.pseudo_legal(m) || !pos.is_legal(m) {
            return None;
        }
        Some(m)
    }
    pub fn to(self) -> Square {
        Square((self.0.get() & Move::TO_MASK) as i32)
    }
    pub fn from(self) -> Square {
        debug_assert!(!self.is_drop());
        Square(((self.0.get() & Move::FROM_MASK) >> Move::FROM_SHIFT) as i32)
    }
    pub fn is_drop(self) -> bool {
        ((self.0.get() & Move::FROM_MASK) >> Move::FROM_SHIFT) >= Move::DROP_BASE
    }
    pub fn is_promotion(self) -> bool {
        (self.0.get() & Move::PROMOTE_FLAG) != 0
    }
    pub fn piece_type_dropped(self) -> PieceType {
        debug_assert!(self.is_drop());
        PieceType((((self.0.get() & Move::FROM_MASK) >> Move::FROM_SHIFT) - Move::DROP_BASE) as i32)
    }
    pub fn is_null(self) -> bool {
        self == Move::NULL
    }
    pub fn to_u16(self) -> u16 {
        self.0.get()
    }
    // Only meaningful before the move is done.
    pub fn is_capture(self, pos: &Position) -> bool {
        !self.is_drop() && pos.piece_on(self.to()) != Piece::EMPTY
    }
    pub fn to_usi_string(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        if self.is_drop() {
            format!("{}*{}", self.piece_type_dropped().to_usi_str(), self.to().to_usi_string())
        } else {
            format!(
                "{}{}{}",
                self.from().to_usi_string(),
                self.to().to_usi_string(),
                if self.is_promotion() { "+" } else { "" }
            )
        }
    }
}

impl std::fmt::Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Move({})", self.to_usi_string())
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_usi_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtMove {
    pub mv: Move,
    pub score: i32,
}

impl ExtMove {
    pub const MAX_LEGAL_MOVES: usize = 593 + 1;
}

impl Ord for ExtMove {
    fn cmp(&self, other: &ExtMove) -> std::cmp::Ordering {
        self.score.cmp(&other.score)
    }
}

impl PartialOrd for ExtMove {
    fn partial_cmp(&self, other: &ExtMove) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ExtMove {
    fn eq(&self, other: &ExtMove) -> bool {
        self.score == other.score
    }
}

impl Eq for ExtMove {}

#[test]
fn test_move_fields() {
    let m = Move::new_unpromote(Square::SQ77, Square::SQ76);
    assert_eq!(m.from(), Square::SQ77);
    assert_eq!(m.to(), Square::SQ76);
    assert!(!m.is_drop());
    assert!(!m.is_promotion());
    assert_eq!(m.to_usi_string(), "7g7f");

    let m = Move::new_promote(Square::SQ88, Square::SQ22);
    assert!(m.is_promotion());
    assert_eq!(m.to_usi_string(), "8h2b+");

    let m = Move::new_drop(PieceType::PAWN, Square::SQ55);
    assert!(m.is_drop());
    assert_eq!(m.piece_type_dropped(), PieceType::PAWN);
    assert_eq!(m.to(), Square::SQ55);
    assert_eq!(m.to_usi_string(), "P*5e");
}

#[test]
fn test_move_null_is_distinct() {
    for &from in Square::ALL.iter() {
        for &to in Square::ALL.iter() {
            if from != to {
                assert_ne!(Move::new_unpromote(from, to), Move::NULL);
                assert_ne!(Move::new_promote(from, to), Move::NULL);
            }
        }
        for pt in PieceType::ALL_HAND.iter() {
            assert_ne!(Move::new_drop(*pt, from), Move::NULL);
        }
    }
}

#[test]
fn test_move_from_u16() {
    let moves = [
        Move::new_unpromote(Square::SQ11, Square::SQ99),
        Move::new_promote(Square::SQ23, Square::SQ21),
        Move::new_drop(PieceType::GOLD, Square::SQ99),
    ];
    for m in moves.iter() {
        assert_eq!(Move::new_from_u16(m.to_u16()), Some(*m));
    }
    assert_eq!(Move::new_from_u16(0), None);
    assert_eq!(Move::new_from_u16(Move::NULL.to_u16()), None);
    // drop of a king
    assert_eq!(Move::new_from_u16(((81 + 8) << 7) | 3), None);
    // to out of range
    assert_eq!(Move::new_from_u16(100), None);
}
