use crate::types::*;

pub const PAWN_VALUE: i32 = 100;
const LANCE_VALUE: i32 = 300;
const KNIGHT_VALUE: i32 = 400;
const SILVER_VALUE: i32 = 500;
const BISHOP_VALUE: i32 = 1000;
const ROOK_VALUE: i32 = 1200;
const GOLD_VALUE: i32 = 600;
const PRO_PAWN_VALUE: i32 = 600;
const PRO_LANCE_VALUE: i32 = 600;
const PRO_KNIGHT_VALUE: i32 = 600;
const PRO_SILVER_VALUE: i32 = 600;
const HORSE_VALUE: i32 = 1600;
const DRAGON_VALUE: i32 = 1600;
const KING_VALUE: i32 = 0;

// Indexed by PieceType.
const PIECE_TYPE_VALUES: [i32; PieceType::NUM] = [
    0,
    PAWN_VALUE,
    LANCE_VALUE,
    KNIGHT_VALUE,
    SILVER_VALUE,
    BISHOP_VALUE,
    ROOK_VALUE,
    GOLD_VALUE,
    KING_VALUE,
    PRO_PAWN_VALUE,
    PRO_LANCE_VALUE,
    PRO_KNIGHT_VALUE,
    PRO_SILVER_VALUE,
    HORSE_VALUE,
    DRAGON_VALUE,
];

pub fn piece_type_value(pt: PieceType) -> Value {
    debug_assert!(0 <= pt.0 && (pt.0 as usize) < PieceType::NUM);
    Value(PIECE_TYPE_VALUES[pt.0 as usize])
}
pub fn piece_value(pc: Piece) -> Value {
    piece_type_value(PieceType::new(pc))
}

// Held pieces are worth 1.2 times their board value.
pub fn hand_piece_type_value(pt: PieceType) -> Value {
    Value(PIECE_TYPE_VALUES[pt.0 as usize] * 6 / 5)
}

/// The swing of taking `pt`: the victim leaves the board and comes back to
/// our hand unpromoted.
pub fn capture_piece_type_value(pt: PieceType) -> Value {
    piece_type_value(pt) + hand_piece_type_value(pt.to_demote())
}

const PROMOTE_PIECE_VALUES: [i32; 7] = [
    0,
    PRO_PAWN_VALUE - PAWN_VALUE,
    PRO_LANCE_VALUE - LANCE_VALUE,
    PRO_KNIGHT_VALUE - KNIGHT_VALUE,
    PRO_SILVER_VALUE - SILVER_VALUE,
    HORSE_VALUE - BISHOP_VALUE,
    DRAGON_VALUE - ROOK_VALUE,
];

pub fn promote_piece_type_value(pt: PieceType) -> Value {
    debug_assert!(pt.is_promotable());
    Value(PROMOTE_PIECE_VALUES[pt.0 as usize])
}

// Rank of the attacker for MVV-LVA. Cheaper attackers are preferred.
pub fn lva_value(pt: PieceType) -> Value {
    match pt {
        PieceType::PAWN => Value(1),
        PieceType::LANCE => Value(2),
        PieceType::KNIGHT => Value(3),
        PieceType::SILVER => Value(4),
        PieceType::PRO_SILVER | PieceType::PRO_KNIGHT | PieceType::PRO_LANCE | PieceType::PRO_PAWN => Value(5),
        PieceType::GOLD => Value(6),
        PieceType::BISHOP => Value(7),
        PieceType::HORSE => Value(8),
        PieceType::ROOK => Value(9),
        PieceType::DRAGON => Value(10),
        PieceType::KING => Value(11),
        _ => unreachable!(),
    }
}

#[test]
fn test_piece_value() {
    assert_eq!(piece_type_value(PieceType::PAWN), Value(100));
    assert_eq!(piece_type_value(PieceType::LANCE), Value(300));
    assert_eq!(piece_type_value(PieceType::KNIGHT), Value(400));
    assert_eq!(piece_type_value(PieceType::SILVER), Value(500));
    assert_eq!(piece_type_value(PieceType::GOLD), Value(600));
    assert_eq!(piece_type_value(PieceType::BISHOP), Value(1000));
    assert_eq!(piece_type_value(PieceType::ROOK), Value(1200));
    assert_eq!(piece_type_value(PieceType::KING), Value(0));
    assert_eq!(piece_type_value(PieceType::PRO_SILVER), Value(600));
    assert_eq!(piece_type_value(PieceType::HORSE), Value(1600));
    assert_eq!(piece_type_value(PieceType::DRAGON), Value(1600));
    assert_eq!(piece_value(Piece::W_ROOK), piece_value(Piece::B_ROOK));
}

#[test]
fn test_capture_and_promote_value() {
    assert_eq!(hand_piece_type_value(PieceType::PAWN), Value(120));
    assert_eq!(capture_piece_type_value(PieceType::PAWN), Value(220));
    assert_eq!(capture_piece_type_value(PieceType::DRAGON), Value(1600 + 1440));
    assert_eq!(promote_piece_type_value(PieceType::PAWN), Value(500));
    assert_eq!(promote_piece_type_value(PieceType::BISHOP), Value(600));
    assert_eq!(promote_piece_type_value(PieceType::ROOK), Value(400));
    assert!(lva_value(PieceType::PAWN) < lva_value(PieceType::KING));
}
