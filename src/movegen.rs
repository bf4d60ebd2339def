use crate::bitboard::*;
use crate::movetypes::*;
use crate::position::*;
use crate::types::*;
use arrayvec::ArrayVec;

pub trait GenType {
    const CAPTURES: bool;
    const QUIETS: bool;
    const EVASIONS: bool;
    const LEGAL: bool;
}

pub struct NonEvasionsType;
pub struct CapturesType;
pub struct QuietsType;
pub struct EvasionsType;
pub struct LegalType;

impl GenType for NonEvasionsType {
    const CAPTURES: bool = true;
    const QUIETS: bool = true;
    const EVASIONS: bool = false;
    const LEGAL: bool = false;
}
impl GenType for CapturesType {
    const CAPTURES: bool = true;
    const QUIETS: bool = false;
    const EVASIONS: bool = false;
    const LEGAL: bool = false;
}
impl GenType for QuietsType {
    const CAPTURES: bool = false;
    const QUIETS: bool = true;
    const EVASIONS: bool = false;
    const LEGAL: bool = false;
}
impl GenType for EvasionsType {
    const CAPTURES: bool = true;
    const QUIETS: bool = true;
    const EVASIONS: bool = true;
    const LEGAL: bool = false;
}
impl GenType for LegalType {
    const CAPTURES: bool = true;
    const QUIETS: bool = true;
    const EVASIONS: bool = false;
    const LEGAL: bool = true;
}

// Pseudo-legal lists can exceed the legal maximum.
const MOVE_LIST_CAPACITY: usize = 1024;

pub struct MoveList {
    ext_moves: ArrayVec<ExtMove, MOVE_LIST_CAPACITY>,
}

impl MoveList {
    #[allow(clippy::new_without_default)]
    pub fn new() -> MoveList {
        MoveList { ext_moves: ArrayVec::new() }
    }
    pub fn len(&self) -> usize {
        self.ext_moves.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ext_moves.is_empty()
    }
    pub fn slice(&self, begin: usize) -> &[ExtMove] {
        &self.ext_moves[begin..]
    }
    pub fn slice_mut(&mut self, begin: usize) -> &mut [ExtMove] {
        &mut self.ext_moves[begin..]
    }
    pub fn contains(&self, m: Move) -> bool {
        self.ext_moves.iter().any(|x| x.mv == m)
    }
    #[inline]
    pub fn push(&mut self, m: Move) {
        self.ext_moves.push(ExtMove { mv: m, score: 0 });
    }
    // Pushes the board moves of a `pt` on `from` to `to`, honouring promotion rules.
    fn push_board_move(&mut self, us: Color, pt: PieceType, from: Square, to: Square) {
        if pt.is_promotable() && (Rank::new(from).is_opponent_field(us) || Rank::new(to).is_opponent_field(us)) {
            self.push(Move::new_promote(from, to));
            if must_promote(pt, us, to) {
                return;
            }
        }
        self.push(Move::new_unpromote(from, to));
    }
    fn generate_for_pieces(&mut self, pos: &Position, from_bb: Bitboard, target: &Bitboard) {
        let us = pos.side_to_move();
        let occupied = pos.occupied_bb();
        for from in from_bb {
            let pt = PieceType::new(pos.piece_on(from));
            let to_bb = ATTACK_TABLE.attack(pt, us, from, &occupied) & *target;
            for to in to_bb {
                self.push_board_move(us, pt, from, to);
            }
        }
    }
    fn generate_for_king(&mut self, pos: &Position, target: &Bitboard) {
        let us = pos.side_to_move();
        let ksq = pos.king_square(us);
        for to in ATTACK_TABLE.king.attack(us, ksq) & *target {
            self.push(Move::new_unpromote(ksq, to));
        }
    }
    fn generate_drop(&mut self, pos: &Position, target: &Bitboard) {
        let us = pos.side_to_move();
        let hand = pos.hand(us);
        if hand.is_empty() {
            return;
        }
        let last_rank = Bitboard::far_ranks_mask(us, 1);
        let last_two_ranks = Bitboard::far_ranks_mask(us, 2);
        if hand.exist(PieceType::PAWN) {
            let mut to_bb = *target & !last_rank;
            for &file in File::ALL.iter() {
                if pos.pawn_on_file(us, file) {
                    to_bb &= !Bitboard::file_mask(file);
                }
            }
            // avoid drop pawn mate.
            let them = us.inverse();
            let check_bb = ATTACK_TABLE.pawn.attack(them, pos.king_square(them)) & to_bb;
            if check_bb.to_bool() {
                let to = check_bb.lsb_unchecked();
                if pos.is_drop_pawn_mate(us, to) {
                    to_bb.clear(to);
                }
            }
            for to in to_bb {
                self.push(Move::new_drop(PieceType::PAWN, to));
            }
        }
        for &pt in PieceType::ALL_HAND.iter() {
            if pt == PieceType::PAWN || !hand.exist(pt) {
                continue;
            }
            let to_bb = match pt {
                PieceType::LANCE => *target & !last_rank,
                PieceType::KNIGHT => *target & !last_two_ranks,
                _ => *target,
            };
            for to in to_bb {
                self.push(Move::new_drop(pt, to));
            }
        }
    }
    fn generate_non_evasions<T: GenType>(&mut self, pos: &Position) {
        let us = pos.side_to_move();
        let target = if T::CAPTURES && T::QUIETS {
            !pos.pieces_c(us)
        } else if T::CAPTURES {
            pos.pieces_c(us.inverse())
        } else {
            pos.empty_bb()
        };
        let from_bb = pos.pieces_c(us) & !pos.pieces_p(PieceType::KING);
        self.generate_for_pieces(pos, from_bb, &target);
        self.generate_for_king(pos, &target);
        if T::QUIETS {
            self.generate_drop(pos, &pos.empty_bb());
        }
    }
    fn generate_evasions(&mut self, pos: &Position) {
        let us = pos.side_to_move();
        let ksq = pos.king_square(us);
        let checkers = pos.checkers();
        debug_assert!(checkers.to_bool());
        self.generate_for_king(pos, &!pos.pieces_c(us));
        if checkers.is_more_than_one() {
            // double check. king only can move.
            return;
        }
        let checker_sq = checkers.lsb_unchecked();
        let target_drop = Bitboard::between(checker_sq, ksq);
        let target_move = target_drop | checkers;
        let from_bb = pos.pieces_c(us) & !pos.pieces_p(PieceType::KING);
        self.generate_for_pieces(pos, from_bb, &target_move);
        self.generate_drop(pos, &target_drop);
    }
    fn generate_legals(&mut self, pos: &Position, current_size: usize) {
        if pos.in_check() {
            self.generate_evasions(pos);
        } else {
            self.generate_non_evasions::<NonEvasionsType>(pos);
        }
        let mut i = current_size;
        while i < self.ext_moves.len() {
            if pos.is_legal(self.ext_moves[i].mv) {
                i += 1;
            } else {
                self.ext_moves.swap_remove(i);
            }
        }
    }
    /// Replaces everything after `current_size` with the moves of kind `T`.
    pub fn generate<T: GenType>(&mut self, pos: &Position, current_size: usize) {
        self.ext_moves.truncate(current_size);
        if T::LEGAL {
            self.generate_legals(pos, current_size);
        } else if T::EVASIONS {
            self.generate_evasions(pos);
        } else {
            self.generate_non_evasions::<T>(pos);
        }
    }
}

/// Number of legal move sequences of length `depth`.
pub fn perft(pos: &mut Position, depth: i32) -> u64 {
    if depth <= 0 {
        return 1;
    }
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(pos, 0);
    if depth == 1 {
        return mlist.len() as u64;
    }
    let mut nodes = 0;
    for ext_move in mlist.slice(0) {
        pos.do_move(ext_move.mv);
        nodes += perft(pos, depth - 1);
        pos.undo_move(ext_move.mv);
    }
    nodes
}

/// perft split by root move, in generation order.
pub fn perft_divide(pos: &mut Position, depth: i32) -> Vec<(Move, u64)> {
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(pos, 0);
    mlist
        .slice(0)
        .iter()
        .map(|ext_move| {
            pos.do_move(ext_move.mv);
            let nodes = perft(pos, depth - 1);
            pos.undo_move(ext_move.mv);
            (ext_move.mv, nodes)
        })
        .collect()
}

#[cfg(test)]
fn usi_strings(mlist: &MoveList) -> Vec<String> {
    let mut v: Vec<String> = mlist.slice(0).iter().map(|x| x.mv.to_usi_string()).collect();
    v.sort();
    v
}

#[test]
fn test_generate_start_position() {
    let pos = Position::new();
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(&pos, 0);
    assert_eq!(mlist.len(), 30);
    mlist.generate::<CapturesType>(&pos, 0);
    assert!(mlist.is_empty());
    mlist.generate::<QuietsType>(&pos, 0);
    assert_eq!(mlist.len(), 30);
}

#[test]
fn test_generate_max_legal_moves() {
    let pos = Position::new_from_sfen("R8/2K1S1SSk/4B4/9/9/9/9/9/1L1L1L3 b RBGSNLP3g3n17p 1").unwrap();
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(&pos, 0);
    assert_eq!(mlist.len(), ExtMove::MAX_LEGAL_MOVES - 1);
}

#[test]
fn test_generate_captures_and_quiets_partition() {
    let pos = Position::new_from_sfen("l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w GR5pnsg 1").unwrap();
    let mut all = MoveList::new();
    all.generate::<NonEvasionsType>(&pos, 0);
    let mut split = MoveList::new();
    split.generate::<CapturesType>(&pos, 0);
    let captures = split.len();
    assert!(split.slice(0).iter().all(|x| x.mv.is_capture(&pos)));
    split.generate::<QuietsType>(&pos, captures);
    assert!(split.slice(captures).iter().all(|x| !x.mv.is_capture(&pos)));
    assert_eq!(usi_strings(&all), usi_strings(&split));
}

#[test]
fn test_generate_forced_promotion() {
    let pos = Position::new_from_sfen("4k4/P8/1L7/2N6/9/9/9/9/4K4 b - 1").unwrap();
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(&pos, 0);
    let moves = usi_strings(&mlist);
    assert!(moves.contains(&"9b9a+".to_string()));
    assert!(!moves.contains(&"9b9a".to_string()));
    // the lance may stop on rank b unpromoted, never on rank a
    assert!(moves.contains(&"8c8b".to_string()));
    assert!(moves.contains(&"8c8b+".to_string()));
    assert!(moves.contains(&"8c8a+".to_string()));
    assert!(!moves.contains(&"8c8a".to_string()));
    // a knight reaching rank b must promote
    assert!(moves.contains(&"7d6b+".to_string()));
    assert!(!moves.contains(&"7d6b".to_string()));
    assert!(moves.contains(&"7d8b+".to_string()));
    assert!(!moves.contains(&"7d8b".to_string()));
}

#[test]
fn test_generate_drop_restrictions() {
    let pos = Position::new_from_sfen("4k4/9/9/9/9/9/P8/9/4K4 b PLN 1").unwrap();
    let mut mlist = MoveList::new();
    mlist.generate::<QuietsType>(&pos, 0);
    let drops: Vec<Move> = mlist.slice(0).iter().map(|x| x.mv).filter(|m| m.is_drop()).collect();
    for m in drops.iter() {
        let rank = Rank::new(m.to());
        let file = File::new(m.to());
        match m.piece_type_dropped() {
            PieceType::PAWN => {
                assert_ne!(rank, Rank::RANK1);
                assert_ne!(file, File::FILE9);
            }
            PieceType::LANCE => assert_ne!(rank, Rank::RANK1),
            PieceType::KNIGHT => assert!(rank.0 > Rank::RANK2.0),
            _ => unreachable!(),
        }
    }
    let empty = pos.empty_bb().count_ones() as usize;
    // pawn: 8 files without our pawn, minus rank a. lance: minus rank a. knight: minus ranks a and b.
    let pawn_drops = 8 * 8 - 1;
    let lance_drops = empty - 8;
    let knight_drops = empty - 17;
    assert_eq!(drops.len(), pawn_drops + lance_drops + knight_drops);
}

#[test]
fn test_generate_drop_pawn_mate() {
    let pos = Position::new_from_sfen("kl7/1n7/K8/9/9/9/9/9/9 b P 1").unwrap();
    let mut mlist = MoveList::new();
    mlist.generate::<NonEvasionsType>(&pos, 0);
    assert!(!mlist.contains(Move::new_drop(PieceType::PAWN, Square::SQ92)));
    assert!(mlist.contains(Move::new_drop(PieceType::PAWN, Square::SQ83)));
}

#[test]
fn test_generate_evasion() {
    let pos = Position::new_from_sfen("9/4k4/r8/3b5/4L4/9/9/9/4K4 w pnsg 1").unwrap();
    let mut mlist = MoveList::new();
    mlist.generate::<LegalType>(&pos, 0);
    assert_eq!(mlist.len(), 17);
    let count = |pt: PieceType| {
        mlist
            .slice(0)
            .iter()
            .filter(|x| !x.mv.is_drop() && PieceType::new(pos.piece_on(x.mv.from())) == pt)
            .count()
    };
    assert_eq!(count(PieceType::ROOK), 1);
    assert_eq!(count(PieceType::BISHOP), 2);
    assert_eq!(count(PieceType::KING), 6);
    assert_eq!(mlist.slice(0).iter().filter(|x| x.mv.is_drop()).count(), 8);
}

#[test]
fn test_generate_evasions_are_sound() {
    // Every legal reply to check leaves the king safe, and every pseudo-legal
    // board move or drop that does so is generated.
    let sfens = [
        "9/4k4/r8/3b5/4L4/9/9/9/4K4 w pnsg 1",
        "4k4/9/9/9/9/9/9/3g5/r3K4 b GS2P 1",
        "lnsgkgsnl/1r7/pppp1pppp/9/4p4/9/PPPPPPPPP/1B2+b2R1/LNSGKGSNL b - 1",
    ];
    for sfen in sfens.iter() {
        let mut pos = Position::new_from_sfen(sfen).unwrap();
        assert!(pos.in_check());
        let mut legal = MoveList::new();
        legal.generate::<LegalType>(&pos, 0);
        let mut superset = MoveList::new();
        superset.generate::<NonEvasionsType>(&pos, 0);
        let us = pos.side_to_move();
        let mut brute_force = Vec::new();
        for ext_move in superset.slice(0) {
            let m = ext_move.mv;
            pos.do_move(m);
            let drop_pawn_mate = m.is_drop() && m.piece_type_dropped() == PieceType::PAWN && pos.is_checkmate();
            if !pos.is_in_check(us) && !drop_pawn_mate {
                brute_force.push(m.to_usi_string());
            }
            pos.undo_move(m);
        }
        brute_force.sort();
        assert_eq!(usi_strings(&legal), brute_force);
    }
}

#[test]
fn test_perft_start_position() {
    let mut pos = Position::new();
    assert_eq!(perft(&mut pos, 0), 1);
    assert_eq!(perft(&mut pos, 1), 30);
    assert_eq!(perft(&mut pos, 2), 900);
    assert_eq!(perft(&mut pos, 3), 25470);
    assert_eq!(pos.to_sfen(), crate::sfen::START_SFEN);
    let divide = perft_divide(&mut pos, 2);
    assert_eq!(divide.len(), 30);
    assert!(divide.iter().all(|&(_, n)| n == 30));
}
