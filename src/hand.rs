use crate::types::*;

// xxxxxxxx xxxxxxxx xxxxxxxx xxx11111  Pawn
// xxxxxxxx xxxxxxxx xxxxxxx1 11xxxxxx  Lance
// xxxxxxxx xxxxxxxx xxx111xx xxxxxxxx  Knight
// xxxxxxxx xxxxxxx1 11xxxxxx xxxxxxxx  Silver
// xxxxxxxx xxxx11xx xxxxxxxx xxxxxxxx  Bishop
// xxxxxxxx x11xxxxx xxxxxxxx xxxxxxxx  Rook
// xxxxx111 xxxxxxxx xxxxxxxx xxxxxxxx  Gold
//
// Every field is followed by a spare zero bit, so a count never carries into
// its neighbour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Hand(pub u32);

impl Hand {
    // (shift, width) indexed by PieceType. Slot 0 is unused.
    const FIELDS: [(u32, u32); PieceType::HAND_NUM] = [(0, 0), (0, 5), (6, 3), (10, 3), (14, 3), (18, 2), (21, 2), (24, 3)];

    /// Upper bound of each count, indexed by PieceType.
    pub const MAX: [u32; PieceType::HAND_NUM] = [0, 18, 4, 4, 4, 2, 2, 4];

    const EXCEPT_PAWN_MASK: u32 = !((1 << 5) - 1);

    fn field(pt: PieceType) -> (u32, u32) {
        debug_assert!(PieceType::PAWN.0 <= pt.0 && pt.0 <= PieceType::GOLD.0);
        Hand::FIELDS[pt.0 as usize]
    }
    pub fn num(self, pt: PieceType) -> u32 {
        let (shift, width) = Hand::field(pt);
        (self.0 >> shift) & ((1 << width) - 1)
    }
    pub fn exist(self, pt: PieceType) -> bool {
        self.num(pt) != 0
    }
    pub fn except_pawn_exist(self) -> bool {
        (self.0 & Hand::EXCEPT_PAWN_MASK) != 0
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    pub fn set(&mut self, pt: PieceType, num: u32) {
        let (shift, width) = Hand::field(pt);
        debug_assert!(num < (1 << width));
        self.0 = (self.0 & !(((1 << width) - 1) << shift)) | (num << shift);
    }
    /// Adds a captured piece. Promoted types go back to the hand unpromoted.
    pub fn plus_one(&mut self, pt: PieceType) {
        let pt = pt.to_demote();
        debug_assert!(self.num(pt) < Hand::MAX[pt.0 as usize]);
        self.0 += 1 << Hand::field(pt).0;
    }
    pub fn minus_one(&mut self, pt: PieceType) {
        debug_assert!(self.exist(pt));
        self.0 -= 1 << Hand::field(pt).0;
    }
}

#[test]
fn test_hand_set_and_num() {
    let mut hand = Hand::default();
    for (i, pt) in PieceType::ALL_HAND.iter().enumerate() {
        hand.set(*pt, (i as u32 % 2) + 1);
    }
    for (i, pt) in PieceType::ALL_HAND.iter().enumerate() {
        assert_eq!(hand.num(*pt), (i as u32 % 2) + 1);
    }
    hand.set(PieceType::PAWN, 18);
    assert_eq!(hand.num(PieceType::PAWN), 18);
    assert_eq!(hand.num(PieceType::LANCE), 2);
}

#[test]
fn test_hand_plus_minus() {
    let mut hand = Hand::default();
    assert!(hand.is_empty());
    hand.plus_one(PieceType::PRO_PAWN);
    hand.plus_one(PieceType::PAWN);
    hand.plus_one(PieceType::DRAGON);
    assert_eq!(hand.num(PieceType::PAWN), 2);
    assert_eq!(hand.num(PieceType::ROOK), 1);
    assert!(hand.except_pawn_exist());
    hand.minus_one(PieceType::ROOK);
    assert!(!hand.except_pawn_exist());
    assert!(hand.exist(PieceType::PAWN));
    for _ in 0..16 {
        hand.plus_one(PieceType::PAWN);
    }
    assert_eq!(hand.num(PieceType::PAWN), 18);
    assert!(!hand.exist(PieceType::LANCE));
    hand.plus_one(PieceType::PRO_LANCE);
    assert_eq!(hand.num(PieceType::LANCE), 1);
    assert_eq!(hand.num(PieceType::PAWN), 18);
}
