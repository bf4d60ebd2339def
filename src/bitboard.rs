use crate::types::*;
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use std::ops::*;

/// 81 squares over two words: files 1 to 7 in `v[0]` (bits 0..63), files 8
/// and 9 in `v[1]` (bits 0..18). Bits beyond the board are never set.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard {
    pub v: [u64; 2],
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    fn bitor(self, other: Bitboard) -> Bitboard {
        Bitboard {
            v: [self.v[0] | other.v[0], self.v[1] | other.v[1]],
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;

    fn bitand(self, other: Bitboard) -> Bitboard {
        Bitboard {
            v: [self.v[0] & other.v[0], self.v[1] & other.v[1]],
        }
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;

    fn bitxor(self, other: Bitboard) -> Bitboard {
        Bitboard {
            v: [self.v[0] ^ other.v[0], self.v[1] ^ other.v[1]],
        }
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, other: Bitboard) {
        *self = *self | other;
    }
}

impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, other: Bitboard) {
        *self = *self & other;
    }
}

impl BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, other: Bitboard) {
        *self = *self ^ other;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;

    // Masked, so the unused high bits stay clear.
    fn not(self) -> Bitboard {
        Bitboard {
            v: [!self.v[0] & Bitboard::ALL.v[0], !self.v[1] & Bitboard::ALL.v[1]],
        }
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Bitboard {{ v: [{:#x}, {:#x}] }}", self.v[0], self.v[1])
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in Rank::ALL.iter() {
            for file in File::ALL.iter().rev() {
                let sq = Square::new(*file, *rank);
                write!(f, "{}", if self.is_set(sq) { "1" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Iterator for Bitboard {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_lsb()
    }
}

impl Bitboard {
    pub const ZERO: Bitboard = Bitboard { v: [0, 0] };
    pub const ALL: Bitboard = Bitboard {
        v: [0x7fff_ffff_ffff_ffff, 0x3ffff],
    };
    const LOW_WORD_SQUARES: i32 = 63;

    pub const fn square_mask(sq: Square) -> Bitboard {
        if sq.0 < Bitboard::LOW_WORD_SQUARES {
            Bitboard { v: [1 << sq.0, 0] }
        } else {
            Bitboard {
                v: [0, 1 << (sq.0 - Bitboard::LOW_WORD_SQUARES)],
            }
        }
    }
    pub fn file_mask(file: File) -> Bitboard {
        debug_assert!(0 <= file.0 && file.0 < File::NUM as i32);
        if file.0 < File::FILE8.0 {
            Bitboard {
                v: [0x1ff << (9 * file.0), 0],
            }
        } else {
            Bitboard {
                v: [0, 0x1ff << (9 * (file.0 - File::FILE8.0))],
            }
        }
    }
    pub fn rank_mask(rank: Rank) -> Bitboard {
        debug_assert!(0 <= rank.0 && rank.0 < Rank::NUM as i32);
        Bitboard {
            v: [0x40_2010_0804_0201 << rank.0, 0x201 << rank.0],
        }
    }
    /// The three ranks where `us` may promote.
    pub fn opponent_field_mask(us: Color) -> Bitboard {
        Rank::ALL
            .iter()
            .filter(|r| r.is_opponent_field(us))
            .fold(Bitboard::ZERO, |bb, r| bb | Bitboard::rank_mask(*r))
    }
    /// Ranks `0..n` counted from the far edge of `us`.
    pub fn far_ranks_mask(us: Color, n: i32) -> Bitboard {
        Rank::ALL
            .iter()
            .filter(|r| r.relative(us).0 < n)
            .fold(Bitboard::ZERO, |bb, r| bb | Bitboard::rank_mask(*r))
    }
    pub fn between(sq0: Square, sq1: Square) -> Bitboard {
        BETWEEN.get(sq0, sq1)
    }
    pub fn line_through(sq0: Square, sq1: Square) -> Bitboard {
        LINE.get(sq0, sq1)
    }
    pub fn part(sq: Square) -> usize {
        (sq.0 >= Bitboard::LOW_WORD_SQUARES) as usize
    }
    pub fn value(&self, i: usize) -> u64 {
        self.v[i]
    }
    pub fn set(&mut self, sq: Square) {
        *self |= Bitboard::square_mask(sq);
    }
    pub fn clear(&mut self, sq: Square) {
        *self &= !Bitboard::square_mask(sq);
    }
    pub fn xor(&mut self, sq: Square) {
        *self ^= Bitboard::square_mask(sq);
    }
    pub fn is_set(&self, sq: Square) -> bool {
        self.and_to_bool(Bitboard::square_mask(sq))
    }
    pub fn merge(&self) -> u64 {
        self.v[0] | self.v[1]
    }
    pub fn count_ones(&self) -> u32 {
        self.v[0].count_ones() + self.v[1].count_ones()
    }
    pub fn to_bool(self) -> bool {
        self.merge() != 0
    }
    pub fn and_to_bool(self, other: Bitboard) -> bool {
        (self & other).to_bool()
    }
    pub fn is_more_than_one(self) -> bool {
        self.count_ones() > 1
    }
    pub fn lsb_unchecked(&self) -> Square {
        debug_assert!(self.to_bool());
        if self.v[0] != 0 {
            Square(self.v[0].trailing_zeros() as i32)
        } else {
            Square(self.v[1].trailing_zeros() as i32 + Bitboard::LOW_WORD_SQUARES)
        }
    }
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.v[0] != 0 {
            let sq = Square(self.v[0].trailing_zeros() as i32);
            self.v[0] &= self.v[0] - 1;
            return Some(sq);
        }
        if self.v[1] != 0 {
            let sq = Square(self.v[1].trailing_zeros() as i32 + Bitboard::LOW_WORD_SQUARES);
            self.v[1] &= self.v[1] - 1;
            return Some(sq);
        }
        None
    }
}

/// Plain ray walk, stopping on (and including) the first occupied square.
fn sliding_attacks(deltas: &[Square], sq: Square, occupied: &Bitboard) -> Bitboard {
    let mut bb = Bitboard::ZERO;
    for &delta in deltas {
        let mut current = sq;
        while let Some(next) = current.checked_add(delta) {
            bb.set(next);
            if occupied.is_set(next) {
                break;
            }
            current = next;
        }
    }
    bb
}

fn index_to_occupied(index: usize, mask: &Bitboard) -> Bitboard {
    let mut ret = Bitboard::ZERO;
    for (i, sq) in (*mask).enumerate() {
        if (index & (1 << i)) != 0 {
            ret.set(sq);
        }
    }
    ret
}

#[derive(Debug, Clone)]
struct Magic {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    // Board edges never block a ray, so they are left out unless the piece stands on them.
    fn relevant_mask(deltas: &[Square], sq: Square) -> Bitboard {
        let mut bb = sliding_attacks(deltas, sq, &Bitboard::ZERO);
        let file = File::new(sq);
        let rank = Rank::new(sq);
        for (edge_file, edge_rank) in [(File::FILE1, Rank::RANK1), (File::FILE9, Rank::RANK9)] {
            if file != edge_file {
                bb &= !Bitboard::file_mask(edge_file);
            }
            if rank != edge_rank {
                bb &= !Bitboard::rank_mask(edge_rank);
            }
        }
        bb
    }
    fn index(&self, occupied: &Bitboard) -> usize {
        ((self.mask & *occupied).merge().wrapping_mul(self.magic) >> self.shift) as usize
    }
}

pub struct MagicTable {
    magics: Vec<Magic>,
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    const TRIES_PER_WIDTH: u32 = 1 << 16;

    fn new(deltas: &[Square], rng: &mut StdRng) -> MagicTable {
        let mut magics = Vec::with_capacity(Square::NUM);
        let mut attacks = Vec::new();
        for &sq in Square::ALL.iter() {
            let mask = Magic::relevant_mask(deltas, sq);
            let bits = mask.count_ones();
            let occupancies: Vec<Bitboard> = (0..(1usize << bits)).map(|i| index_to_occupied(i, &mask)).collect();
            let references: Vec<Bitboard> = occupancies.iter().map(|occ| sliding_attacks(deltas, sq, occ)).collect();
            let (magic, shift, table) = Self::find_magic(&mask, &occupancies, &references, rng);
            magics.push(Magic {
                mask,
                magic,
                shift,
                offset: attacks.len(),
            });
            attacks.extend(table);
        }
        MagicTable { magics, attacks }
    }

    // Searches sparse random multipliers. If none maps the occupancies
    // without a destructive collision, widens the index by one bit.
    fn find_magic(
        mask: &Bitboard,
        occupancies: &[Bitboard],
        references: &[Bitboard],
        rng: &mut StdRng,
    ) -> (u64, u32, Vec<Bitboard>) {
        let mut width = mask.count_ones();
        loop {
            let shift = 64 - width;
            let mut table = vec![Bitboard::ZERO; 1 << width];
            let mut epoch = vec![0u32; 1 << width];
            for attempt in 1..=Self::TRIES_PER_WIDTH {
                let magic = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
                if (mask.merge().wrapping_mul(magic) >> 56).count_ones() < 6 {
                    continue;
                }
                let mut found = true;
                for (occupied, attack) in occupancies.iter().zip(references.iter()) {
                    let index = (occupied.merge().wrapping_mul(magic) >> shift) as usize;
                    if epoch[index] != attempt {
                        epoch[index] = attempt;
                        table[index] = *attack;
                    } else if table[index] != *attack {
                        found = false;
                        break;
                    }
                }
                if found {
                    return (magic, shift, table);
                }
            }
            log::debug!("no magic with {} bits for mask {:?}, widening", width, mask);
            width += 1;
        }
    }

    pub fn attack(&self, sq: Square, occupied: &Bitboard) -> Bitboard {
        debug_assert!(sq.is_ok());
        let magic = &self.magics[sq.0 as usize];
        self.attacks[magic.offset + magic.index(occupied)]
    }

    pub fn entry_count(&self) -> usize {
        self.attacks.len()
    }
}

/// A lance only sees its own file, whose 7 interior squares are contiguous
/// bits of one word.
pub struct LanceAttackTable(Vec<Bitboard>);

impl LanceAttackTable {
    const MASK_BITS: u32 = (Rank::NUM - 2) as u32;
    const MASK_TABLE_NUM: usize = 1 << LanceAttackTable::MASK_BITS;

    fn slide(sq: Square) -> u32 {
        (9 * (File::new(sq).0 % 7) + 1) as u32
    }
    fn new() -> LanceAttackTable {
        let mut table = vec![Bitboard::ZERO; Square::NUM * Color::NUM * Self::MASK_TABLE_NUM];
        for &sq in Square::ALL.iter() {
            let file = File::new(sq);
            for &c in Color::ALL.iter() {
                let delta = if c == Color::BLACK { Square::DELTA_N } else { Square::DELTA_S };
                for index in 0..Self::MASK_TABLE_NUM {
                    let mut occupied = Bitboard::ZERO;
                    for bit in 0..Self::MASK_BITS {
                        if (index & (1 << bit)) != 0 {
                            occupied.set(Square::new(file, Rank(bit as i32 + 1)));
                        }
                    }
                    table[Self::position(c, sq, index)] = sliding_attacks(&[delta], sq, &occupied);
                }
            }
        }
        LanceAttackTable(table)
    }
    fn position(c: Color, sq: Square, index: usize) -> usize {
        ((sq.0 as usize * Color::NUM) + c.0 as usize) * Self::MASK_TABLE_NUM + index
    }
    pub fn attack(&self, c: Color, sq: Square, occupied: &Bitboard) -> Bitboard {
        let index = ((occupied.value(Bitboard::part(sq)) >> Self::slide(sq)) as usize) & (Self::MASK_TABLE_NUM - 1);
        self.0[Self::position(c, sq, index)]
    }
}

pub struct StepAttackTable([[Bitboard; Square::NUM]; Color::NUM]);

impl StepAttackTable {
    const PAWN_DELTAS: &'static [Square] = &[Square::DELTA_N];
    const KNIGHT_DELTAS: &'static [Square] = &[Square::DELTA_NNE, Square::DELTA_NNW];
    const SILVER_DELTAS: &'static [Square] = &[
        Square::DELTA_N,
        Square::DELTA_NE,
        Square::DELTA_SE,
        Square::DELTA_SW,
        Square::DELTA_NW,
    ];
    const GOLD_DELTAS: &'static [Square] = &[
        Square::DELTA_N,
        Square::DELTA_NE,
        Square::DELTA_E,
        Square::DELTA_S,
        Square::DELTA_W,
        Square::DELTA_NW,
    ];
    const KING_DELTAS: &'static [Square] = &ALL_DIRECTIONS;

    // Deltas are given for black; white moves in the mirror image.
    fn new(black_deltas: &[Square]) -> StepAttackTable {
        let mut ret = StepAttackTable([[Bitboard::ZERO; Square::NUM]; Color::NUM]);
        for &c in Color::ALL.iter() {
            for &sq in Square::ALL.iter() {
                for &delta in black_deltas {
                    let delta = if c == Color::BLACK { delta } else { Square(-delta.0) };
                    if let Some(to) = sq.checked_add(delta) {
                        ret.0[c.0 as usize][sq.0 as usize].set(to);
                    }
                }
            }
        }
        ret
    }
    pub fn attack(&self, c: Color, sq: Square) -> Bitboard {
        self.0[c.0 as usize][sq.0 as usize]
    }
}

pub struct AttackTable {
    pub pawn: StepAttackTable,
    pub lance: LanceAttackTable,
    pub knight: StepAttackTable,
    pub silver: StepAttackTable,
    pub gold: StepAttackTable,
    pub king: StepAttackTable,
    pub bishop: MagicTable,
    pub rook: MagicTable,
}

impl AttackTable {
    const BISHOP_DELTAS: [Square; 4] = [Square::DELTA_NE, Square::DELTA_SE, Square::DELTA_SW, Square::DELTA_NW];
    const ROOK_DELTAS: [Square; 4] = [Square::DELTA_N, Square::DELTA_E, Square::DELTA_S, Square::DELTA_W];
    const MAGIC_SEED: u64 = 0x7473_7562_616d_6521;

    fn new() -> AttackTable {
        let mut rng = StdRng::seed_from_u64(Self::MAGIC_SEED);
        let bishop = MagicTable::new(&Self::BISHOP_DELTAS, &mut rng);
        let rook = MagicTable::new(&Self::ROOK_DELTAS, &mut rng);
        log::debug!("magic tables built: bishop {} entries, rook {} entries", bishop.entry_count(), rook.entry_count());
        AttackTable {
            pawn: StepAttackTable::new(StepAttackTable::PAWN_DELTAS),
            lance: LanceAttackTable::new(),
            knight: StepAttackTable::new(StepAttackTable::KNIGHT_DELTAS),
            silver: StepAttackTable::new(StepAttackTable::SILVER_DELTAS),
            gold: StepAttackTable::new(StepAttackTable::GOLD_DELTAS),
            king: StepAttackTable::new(StepAttackTable::KING_DELTAS),
            bishop,
            rook,
        }
    }

    pub fn attack(&self, pt: PieceType, c: Color, sq: Square, occupied: &Bitboard) -> Bitboard {
        match pt {
            PieceType::PAWN => self.pawn.attack(c, sq),
            PieceType::LANCE => self.lance.attack(c, sq, occupied),
            PieceType::KNIGHT => self.knight.attack(c, sq),
            PieceType::SILVER => self.silver.attack(c, sq),
            PieceType::BISHOP => self.bishop.attack(sq, occupied),
            PieceType::ROOK => self.rook.attack(sq, occupied),
            PieceType::GOLD | PieceType::PRO_PAWN | PieceType::PRO_LANCE | PieceType::PRO_KNIGHT | PieceType::PRO_SILVER => {
                self.gold.attack(c, sq)
            }
            PieceType::KING => self.king.attack(c, sq),
            PieceType::HORSE => self.bishop.attack(sq, occupied) | self.king.attack(c, sq),
            PieceType::DRAGON => self.rook.attack(sq, occupied) | self.king.attack(c, sq),
            _ => unreachable!(),
        }
    }
    /// Attacks on an empty board.
    pub fn pseudo_attack(&self, pt: PieceType, c: Color, sq: Square) -> Bitboard {
        self.attack(pt, c, sq, &Bitboard::ZERO)
    }
}

const ALL_DIRECTIONS: [Square; 8] = [
    Square::DELTA_N,
    Square::DELTA_NE,
    Square::DELTA_E,
    Square::DELTA_SE,
    Square::DELTA_S,
    Square::DELTA_SW,
    Square::DELTA_W,
    Square::DELTA_NW,
];

pub struct SquarePairTable(Vec<Bitboard>);

impl SquarePairTable {
    fn get(&self, sq0: Square, sq1: Square) -> Bitboard {
        self.0[sq0.0 as usize * Square::NUM + sq1.0 as usize]
    }
    fn ray(sq: Square, delta: Square) -> Vec<Square> {
        let mut squares = Vec::new();
        let mut current = sq;
        while let Some(next) = current.checked_add(delta) {
            squares.push(next);
            current = next;
        }
        squares
    }
    fn new_between() -> SquarePairTable {
        let mut table = vec![Bitboard::ZERO; Square::NUM * Square::NUM];
        for &sq0 in Square::ALL.iter() {
            for &delta in ALL_DIRECTIONS.iter() {
                let mut open = Bitboard::ZERO;
                for sq1 in SquarePairTable::ray(sq0, delta) {
                    table[sq0.0 as usize * Square::NUM + sq1.0 as usize] = open;
                    open.set(sq1);
                }
            }
        }
        SquarePairTable(table)
    }
    fn new_line() -> SquarePairTable {
        let mut table = vec![Bitboard::ZERO; Square::NUM * Square::NUM];
        for &sq0 in Square::ALL.iter() {
            for &delta in ALL_DIRECTIONS.iter() {
                let forward = SquarePairTable::ray(sq0, delta);
                let backward = SquarePairTable::ray(sq0, Square(-delta.0));
                let line = forward
                    .iter()
                    .chain(backward.iter())
                    .fold(Bitboard::square_mask(sq0), |bb, sq| bb | Bitboard::square_mask(*sq));
                for sq1 in forward {
                    table[sq0.0 as usize * Square::NUM + sq1.0 as usize] = line;
                }
            }
        }
        SquarePairTable(table)
    }
}

/// True iff sq2 lies on the line through sq0 and sq1.
pub fn aligned(sq0: Square, sq1: Square, sq2: Square) -> bool {
    Bitboard::line_through(sq0, sq1).is_set(sq2)
}

pub static ATTACK_TABLE: Lazy<AttackTable> = Lazy::new(AttackTable::new);
pub static BETWEEN: Lazy<SquarePairTable> = Lazy::new(SquarePairTable::new_between);
pub static LINE: Lazy<SquarePairTable> = Lazy::new(SquarePairTable::new_line);

#[cfg(test)]
fn random_occupied(rng: &mut StdRng) -> Bitboard {
    Bitboard {
        v: [rng.gen::<u64>() & rng.gen::<u64>(), rng.gen::<u64>() & rng.gen::<u64>()],
    } & Bitboard::ALL
}

#[test]
fn test_bitboard_eq() {
    let bb0 = Bitboard::ZERO;
    let mut bb1 = Bitboard::ZERO;
    assert_eq!(bb0, bb1);
    bb1.set(Square::SQ13);
    assert_ne!(bb0, bb1);
    bb1.clear(Square::SQ13);
    assert_eq!(bb0, bb1);
}

#[test]
fn test_bitboard_part() {
    assert_eq!(Bitboard::part(Square::SQ11), 0);
    assert_eq!(Bitboard::part(Square::SQ79), 0);
    assert_eq!(Bitboard::part(Square::SQ81), 1);
    assert_eq!(Bitboard::part(Square::SQ99), 1);
    assert_eq!(Bitboard::square_mask(Square::SQ81), Bitboard { v: [0, 1] });
}

#[test]
fn test_bitboard_masks() {
    let mut all_files = Bitboard::ZERO;
    let mut all_ranks = Bitboard::ZERO;
    for f in File::ALL.iter() {
        assert_eq!(Bitboard::file_mask(*f).count_ones(), 9);
        all_files |= Bitboard::file_mask(*f);
    }
    for r in Rank::ALL.iter() {
        assert_eq!(Bitboard::rank_mask(*r).count_ones(), 9);
        all_ranks |= Bitboard::rank_mask(*r);
    }
    assert_eq!(all_files, Bitboard::ALL);
    assert_eq!(all_ranks, Bitboard::ALL);
    assert_eq!(!Bitboard::ZERO, Bitboard::ALL);
    assert_eq!(Bitboard::opponent_field_mask(Color::BLACK).count_ones(), 27);
    assert!(Bitboard::opponent_field_mask(Color::BLACK).is_set(Square::SQ93));
    assert!(Bitboard::opponent_field_mask(Color::WHITE).is_set(Square::SQ17));
    assert!(!Bitboard::opponent_field_mask(Color::WHITE).is_set(Square::SQ16));
    assert!(Bitboard::far_ranks_mask(Color::WHITE, 2).is_set(Square::SQ58));
    assert!(!Bitboard::far_ranks_mask(Color::WHITE, 2).is_set(Square::SQ57));
}

#[test]
fn test_bitboard_iterate() {
    let mut bb = Bitboard::ZERO;
    bb.set(Square::SQ99);
    bb.set(Square::SQ11);
    bb.set(Square::SQ79);
    bb.set(Square::SQ81);
    let squares: Vec<Square> = bb.collect();
    assert_eq!(squares, vec![Square::SQ11, Square::SQ79, Square::SQ81, Square::SQ99]);
    assert_eq!(bb.lsb_unchecked(), Square::SQ11);
    assert!(bb.is_more_than_one());
}

#[test]
fn test_sliding_attacks() {
    let mut occupied = Bitboard::ZERO;
    occupied.set(Square::SQ46);
    let bb = sliding_attacks(&AttackTable::ROOK_DELTAS, Square::SQ44, &occupied);
    assert!(bb.is_set(Square::SQ46));
    assert!(!bb.is_set(Square::SQ47));
    assert!(bb.is_set(Square::SQ41));
    assert!(bb.is_set(Square::SQ14));
    assert!(bb.is_set(Square::SQ94));
    assert_eq!(bb.count_ones(), 3 + 2 + 3 + 5);
}

#[test]
fn test_magic_matches_ray_walk() {
    let mut rng = StdRng::seed_from_u64(123);
    for _ in 0..200 {
        let occupied = random_occupied(&mut rng);
        for &sq in Square::ALL.iter() {
            assert_eq!(
                ATTACK_TABLE.bishop.attack(sq, &occupied),
                sliding_attacks(&AttackTable::BISHOP_DELTAS, sq, &occupied)
            );
            assert_eq!(
                ATTACK_TABLE.rook.attack(sq, &occupied),
                sliding_attacks(&AttackTable::ROOK_DELTAS, sq, &occupied)
            );
        }
    }
}

#[test]
fn test_lance_attack() {
    let mut rng = StdRng::seed_from_u64(123);
    for _ in 0..200 {
        let occupied = random_occupied(&mut rng);
        for &sq in Square::ALL.iter() {
            assert_eq!(
                ATTACK_TABLE.lance.attack(Color::BLACK, sq, &occupied),
                sliding_attacks(&[Square::DELTA_N], sq, &occupied)
            );
            assert_eq!(
                ATTACK_TABLE.lance.attack(Color::WHITE, sq, &occupied),
                sliding_attacks(&[Square::DELTA_S], sq, &occupied)
            );
        }
    }
    assert_eq!(ATTACK_TABLE.lance.attack(Color::BLACK, Square::SQ91, &Bitboard::ZERO), Bitboard::ZERO);
    assert_eq!(
        ATTACK_TABLE.lance.attack(Color::WHITE, Square::SQ91, &Bitboard::ZERO),
        Bitboard::file_mask(File::FILE9) & !Bitboard::rank_mask(Rank::RANK1)
    );
}

#[test]
fn test_step_attack() {
    let t = &ATTACK_TABLE;
    assert_eq!(t.pawn.attack(Color::BLACK, Square::SQ55), Bitboard::square_mask(Square::SQ54));
    assert_eq!(t.pawn.attack(Color::WHITE, Square::SQ55), Bitboard::square_mask(Square::SQ56));
    assert_eq!(t.pawn.attack(Color::BLACK, Square::SQ51), Bitboard::ZERO);
    assert_eq!(
        t.knight.attack(Color::BLACK, Square::SQ55),
        Bitboard::square_mask(Square::SQ43) | Bitboard::square_mask(Square::SQ63)
    );
    assert_eq!(t.knight.attack(Color::BLACK, Square::SQ12), Bitboard::ZERO);
    assert_eq!(t.knight.attack(Color::WHITE, Square::SQ17), Bitboard::square_mask(Square::SQ29));
    assert_eq!(t.silver.attack(Color::BLACK, Square::SQ55).count_ones(), 5);
    assert_eq!(t.gold.attack(Color::WHITE, Square::SQ55).count_ones(), 6);
    assert!(t.gold.attack(Color::WHITE, Square::SQ55).is_set(Square::SQ46));
    assert!(!t.gold.attack(Color::WHITE, Square::SQ55).is_set(Square::SQ44));
    assert_eq!(t.king.attack(Color::BLACK, Square::SQ55).count_ones(), 8);
    assert_eq!(t.king.attack(Color::WHITE, Square::SQ11).count_ones(), 3);
    assert_eq!(t.king.attack(Color::BLACK, Square::SQ19).count_ones(), 3);
    assert_eq!(t.pseudo_attack(PieceType::DRAGON, Color::BLACK, Square::SQ55).count_ones(), 16 + 4);
    assert_eq!(t.pseudo_attack(PieceType::HORSE, Color::BLACK, Square::SQ11).count_ones(), 8 + 2);
}

#[test]
fn test_between() {
    assert_eq!(Bitboard::between(Square::SQ11, Square::SQ12), Bitboard::ZERO);
    assert_eq!(Bitboard::between(Square::SQ11, Square::SQ13), Bitboard::square_mask(Square::SQ12));
    assert_eq!(Bitboard::between(Square::SQ11, Square::SQ23), Bitboard::ZERO);
    assert_eq!(Bitboard::between(Square::SQ11, Square::SQ11), Bitboard::ZERO);
    let bb = Bitboard::between(Square::SQ99, Square::SQ11);
    assert_eq!(bb.count_ones(), 7);
    assert!(bb.is_set(Square::SQ55));
    assert_eq!(Bitboard::between(Square::SQ91, Square::SQ11).count_ones(), 7);
    for &sq0 in Square::ALL.iter() {
        for &sq1 in Square::ALL.iter() {
            assert_eq!(Bitboard::between(sq0, sq1), Bitboard::between(sq1, sq0));
        }
    }
}

#[test]
fn test_line_through() {
    let line = Bitboard::line_through(Square::SQ55, Square::SQ57);
    assert_eq!(line, Bitboard::file_mask(File::FILE5));
    let diagonal = Bitboard::line_through(Square::SQ22, Square::SQ33);
    assert_eq!(diagonal.count_ones(), 9);
    assert!(diagonal.is_set(Square::SQ11));
    assert!(diagonal.is_set(Square::SQ99));
    assert_eq!(Bitboard::line_through(Square::SQ11, Square::SQ23), Bitboard::ZERO);
    assert!(aligned(Square::SQ11, Square::SQ13, Square::SQ12));
    assert!(aligned(Square::SQ11, Square::SQ12, Square::SQ19));
    assert!(!aligned(Square::SQ11, Square::SQ12, Square::SQ21));
    assert!(aligned(Square::SQ91, Square::SQ82, Square::SQ19));
}
