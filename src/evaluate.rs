use crate::bitboard::*;
use crate::piecevalue::*;
use crate::position::*;
use crate::types::*;

// Bonus per pawn by relative rank. Pawns pushed to ranks b..d are worth most.
const PAWN_ADVANCE_BONUS: [i32; Rank::NUM] = [0, 3, 3, 3, 2, 1, 0, 0, 0];
const KING_FREEDOM_PENALTY: i32 = 3;
const MOBILITY_WEIGHT: i32 = 1;

fn material(pos: &Position, c: Color) -> i32 {
    let board: i32 = PieceType::ALL
        .iter()
        .map(|&pt| pos.pieces_cp(c, pt).count_ones() as i32 * piece_type_value(pt).0)
        .sum();
    let hand = pos.hand(c);
    let in_hand: i32 = PieceType::ALL_HAND
        .iter()
        .map(|&pt| hand.num(pt) as i32 * hand_piece_type_value(pt).0)
        .sum();
    board + in_hand
}

fn pawn_advance(pos: &Position, c: Color) -> i32 {
    pos.pieces_cp(c, PieceType::PAWN)
        .map(|sq| PAWN_ADVANCE_BONUS[Rank::new(sq).relative(c).0 as usize])
        .sum()
}

// Empty or enemy squares next to the king. Fewer is safer.
fn king_freedom(pos: &Position, c: Color) -> i32 {
    let ksq = pos.king_square(c);
    (ATTACK_TABLE.king.attack(c, ksq) & !pos.pieces_c(c)).count_ones() as i32
}

// Squares reached by the sliding part of bishops, rooks, horses and dragons.
fn slider_mobility(pos: &Position, c: Color) -> i32 {
    let occupied = pos.occupied_bb();
    let diagonal = (pos.pieces_cp(c, PieceType::BISHOP) | pos.pieces_cp(c, PieceType::HORSE))
        .fold(Bitboard::ZERO, |bb, sq| bb | ATTACK_TABLE.bishop.attack(sq, &occupied));
    let orthogonal = (pos.pieces_cp(c, PieceType::ROOK) | pos.pieces_cp(c, PieceType::DRAGON))
        .fold(Bitboard::ZERO, |bb, sq| bb | ATTACK_TABLE.rook.attack(sq, &occupied));
    (diagonal.count_ones() + orthogonal.count_ones()) as i32
}

fn evaluate_for(pos: &Position, c: Color) -> i32 {
    material(pos, c) + pawn_advance(pos, c) - KING_FREEDOM_PENALTY * king_freedom(pos, c)
        + MOBILITY_WEIGHT * slider_mobility(pos, c)
}

/// Static score from the side to move's point of view.
pub fn evaluate(pos: &Position) -> Value {
    let us = pos.side_to_move();
    let score = evaluate_for(pos, us) - evaluate_for(pos, us.inverse());
    Value(score.clamp(Value::MATED_IN_MAX_PLY.0 + 1, Value::MATE_IN_MAX_PLY.0 - 1))
}

#[test]
fn test_evaluate_start_position_is_balanced() {
    let pos = Position::new();
    assert_eq!(evaluate(&pos), Value(0));
}

#[test]
fn test_evaluate_is_symmetric() {
    // The same position with colors swapped, seen from the other side.
    let pos = Position::new_from_sfen("l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w GR5pnsg 1").unwrap();
    let flipped = Position::new_from_sfen("lkB4nl/8r/1sg5p/p1p2Bpp1/1Ps2p3/Pp4P1P/3s1PN2/KG1+p5/LN6L b GSN5Prg 1").unwrap();
    assert_eq!(evaluate(&pos), evaluate(&flipped));
}

#[test]
fn test_evaluate_material() {
    let pos = Position::new_from_sfen("4k4/9/9/9/9/9/9/9/4K4 b R 1").unwrap();
    let rook_in_hand = evaluate(&pos);
    assert!(rook_in_hand.0 >= 1440);
    let pos = Position::new_from_sfen("4k4/9/9/9/9/9/9/9/4K4 w R 1").unwrap();
    assert_eq!(evaluate(&pos), -rook_in_hand);
}
