use crate::bitboard::*;
use crate::hand::*;
use crate::movegen::*;
use crate::movetypes::*;
use crate::sfen::*;
use crate::types::*;
use once_cell::sync::Lazy;
use rand::prelude::*;
use regex::Regex;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy)]
pub struct CheckInfo {
    blockers_and_pinners_for_king: [(Bitboard, Bitboard); Color::NUM], // color is color_of_king
    check_squares: [Bitboard; PieceType::NUM],
}

impl CheckInfo {
    fn new(pos: &Position) -> CheckInfo {
        let them = pos.side_to_move().inverse();
        let ksq = pos.king_square(them);
        let occupied = pos.occupied_bb();
        let mut check_squares = [Bitboard::ZERO; PieceType::NUM];
        for &pt in PieceType::ALL.iter() {
            if pt != PieceType::KING {
                check_squares[pt.0 as usize] = ATTACK_TABLE.attack(pt, them, ksq, &occupied);
            }
        }
        CheckInfo {
            blockers_and_pinners_for_king: [
                pos.slider_blockers_and_pinners(Color::WHITE, pos.king_square(Color::BLACK)),
                pos.slider_blockers_and_pinners(Color::BLACK, pos.king_square(Color::WHITE)),
            ],
            check_squares,
        }
    }
    fn blockers_for_king(&self, color_of_king: Color) -> Bitboard {
        self.blockers_and_pinners_for_king[color_of_king.0 as usize].0
    }
    fn pinners_for_king(&self, color_of_king: Color) -> Bitboard {
        self.blockers_and_pinners_for_king[color_of_king.0 as usize].1
    }
}

pub struct Zobrist {
    field: [[[Key; Color::NUM]; Square::NUM]; PieceType::NUM],
    hand: [[[Key; Color::NUM]; Zobrist::MAX_HAND_NUM + 1]; PieceType::HAND_NUM],
}

impl Zobrist {
    const COLOR: Key = Key(1);
    const MAX_HAND_NUM: usize = 18;

    fn new() -> Zobrist {
        let mut zobrist = Zobrist {
            field: [[[Key(0); Color::NUM]; Square::NUM]; PieceType::NUM],
            hand: [[[Key(0); Color::NUM]; Zobrist::MAX_HAND_NUM + 1]; PieceType::HAND_NUM],
        };
        let seed = {
            let mut items = [0_u8; 32];
            for (i, item) in items.iter_mut().enumerate() {
                *item = (i + 1) as u8;
            }
            items
        };
        let mut rng = StdRng::from_seed(seed);
        // The lowest bit is reserved for the side to move.
        for item in zobrist.field.iter_mut().flatten().flatten() {
            *item = Key(rng.gen::<u64>() & !1_u64);
        }
        for item in zobrist.hand.iter_mut().flatten().flatten() {
            *item = Key(rng.gen::<u64>() & !1_u64);
        }
        zobrist
    }
    fn get_field(&self, pt: PieceType, sq: Square, c: Color) -> Key {
        self.field[pt.0 as usize][sq.0 as usize][c.0 as usize]
    }
    // `i` is the count after adding, or before removing, a piece.
    fn get_hand(&self, pt: PieceType, i: u32, c: Color) -> Key {
        self.hand[pt.0 as usize][i as usize][c.0 as usize]
    }
}

pub static ZOBRIST: Lazy<Zobrist> = Lazy::new(Zobrist::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    NoLegalMove,
    Repetition,
}

/// Counts of every recorded key. A hash-indexed counter array filters out
/// most lookups before the exact count over the key history is taken.
#[derive(Clone)]
pub struct RepetitionTable {
    counts: Vec<u16>,
    history: Vec<Key>,
    threshold: u32,
}

impl RepetitionTable {
    const INDEX_BITS: u32 = 12;
    pub const DEFAULT_THRESHOLD: u32 = 4;

    fn new(threshold: u32) -> RepetitionTable {
        RepetitionTable {
            counts: vec![0; 1 << Self::INDEX_BITS],
            history: Vec::new(),
            threshold,
        }
    }
    fn index(key: Key) -> usize {
        (key.0 >> (64 - Self::INDEX_BITS)) as usize
    }
    fn push(&mut self, key: Key) {
        let count = &mut self.counts[Self::index(key)];
        *count = count.saturating_add(1);
        self.history.push(key);
    }
    fn pop(&mut self) {
        if let Some(key) = self.history.pop() {
            let count = &mut self.counts[Self::index(key)];
            *count = count.saturating_sub(1);
        }
    }
    pub fn count(&self, key: Key) -> u32 {
        if self.counts[Self::index(key)] == 0 {
            return 0;
        }
        self.history.iter().filter(|&&k| k == key).count() as u32
    }
    fn reaches_threshold(&self, key: Key) -> bool {
        u32::from(self.counts[Self::index(key)]) >= self.threshold && self.count(key) >= self.threshold
    }
}

#[derive(Clone)]
pub struct StateInfo {
    board_key: Key,
    hand_key: Key,
    checkers_bb: Bitboard,
    captured_piece: Piece,
    check_info: CheckInfo,
    game_status: Cell<Option<GameStatus>>,
}

impl StateInfo {
    fn new_from_position(pos: &Position) -> StateInfo {
        let us = pos.side_to_move();
        StateInfo {
            board_key: StateInfo::new_board_key(pos),
            hand_key: StateInfo::new_hand_key(pos),
            checkers_bb: pos.attackers_to(us.inverse(), pos.king_square(us), &pos.occupied_bb()),
            captured_piece: Piece::EMPTY,
            check_info: CheckInfo::new(pos),
            game_status: Cell::new(None),
        }
    }
    fn new_board_key(pos: &Position) -> Key {
        let mut key = Key(0);
        for sq in pos.occupied_bb() {
            let pc = pos.piece_on(sq);
            key ^= ZOBRIST.get_field(PieceType::new(pc), sq, Color::new(pc));
        }
        if pos.side_to_move() == Color::WHITE {
            key ^= Zobrist::COLOR;
        }
        key
    }
    fn new_hand_key(pos: &Position) -> Key {
        let mut key = Key(0);
        for &pt in PieceType::ALL_HAND.iter() {
            for &c in Color::ALL.iter() {
                for i in 1..=pos.hand(c).num(pt) {
                    key ^= ZOBRIST.get_hand(pt, i, c);
                }
            }
        }
        key
    }
    fn key(&self) -> Key {
        self.board_key ^ self.hand_key
    }
}

static BOARD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\+?[[:alpha:]]").expect("valid regex"));
static HAND_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|[[:alpha:]]").expect("valid regex"));

// Splits `s` into regex tokens. Characters not covered by any token are an error.
fn tokenize<'a>(re: &Regex, s: &'a str) -> Result<Vec<&'a str>, &'a str> {
    let mut tokens = Vec::new();
    let mut end = 0;
    for m in re.find_iter(s) {
        if m.start() != end {
            return Err(&s[end..m.start()]);
        }
        tokens.push(m.as_str());
        end = m.end();
    }
    if end != s.len() {
        return Err(&s[end..]);
    }
    Ok(tokens)
}

#[derive(Clone)]
pub struct Position {
    board: [Piece; Square::NUM],
    by_type_bb: [Bitboard; PieceType::NUM],
    by_color_bb: [Bitboard; Color::NUM],
    golds_bb: Bitboard,
    hands: [Hand; Color::NUM],
    king_squares: [Square; Color::NUM],
    pawn_on_file: [[bool; File::NUM]; Color::NUM],
    side_to_move: Color,
    game_ply: i32,
    states: Vec<StateInfo>,
    repetition: RepetitionTable,
    nodes: Arc<AtomicU64>,
}

impl Position {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Position {
        Position::new_from_sfen(START_SFEN).expect("START_SFEN is valid")
    }
    pub fn new_from_sfen(sfen: &str) -> Result<Position, SfenError> {
        Self::new_from_sfen_args(&sfen.split_whitespace().collect::<Vec<&str>>())
    }
    pub fn new_from_sfen_args(sfen_slice: &[&str]) -> Result<Position, SfenError> {
        if sfen_slice.len() != 4 {
            return Err(SfenError::InvalidNumberOfSections {
                sections: sfen_slice.len(),
            });
        }
        let board_str = sfen_slice[0];
        let side_to_move_str = sfen_slice[1];
        let hands_str = sfen_slice[2];
        let game_ply_str = sfen_slice[3];
        let mut pos = Position {
            board: [Piece::EMPTY; Square::NUM],
            by_type_bb: [Bitboard::ZERO; PieceType::NUM],
            by_color_bb: [Bitboard::ZERO; Color::NUM],
            golds_bb: Bitboard::ZERO,
            hands: [Hand(0); Color::NUM],
            king_squares: [Square::SQ11; Color::NUM],
            pawn_on_file: [[false; File::NUM]; Color::NUM],
            side_to_move: Color::BLACK,
            game_ply: 0,
            states: Vec::new(),
            repetition: RepetitionTable::new(RepetitionTable::DEFAULT_THRESHOLD),
            nodes: Arc::new(AtomicU64::new(0)),
        };

        let rank_str_vec: Vec<&str> = board_str.split('/').collect();
        if rank_str_vec.len() != Rank::NUM {
            return Err(SfenError::InvalidNumberOfRanks {
                ranks: rank_str_vec.len(),
            });
        }
        for (rank, rank_str) in Rank::ALL.iter().zip(rank_str_vec.iter()) {
            let tokens = tokenize(&BOARD_TOKEN, rank_str).map_err(|token| SfenError::InvalidPieceCharacters {
                token: token.to_string(),
            })?;
            // sfen lists files from 9 to 1.
            let mut file_idx: usize = 0;
            for token in tokens {
                if file_idx >= File::NUM {
                    return Err(SfenError::InvalidNumberOfFiles { files: file_idx + 1 });
                }
                if let Ok(digit) = token.parse::<i64>() {
                    if digit <= 0 || (File::NUM as i64) < (file_idx as i64) + digit {
                        return Err(SfenError::InvalidNumberOfEmptySquares { empty_squares: digit });
                    }
                    file_idx += digit as usize;
                } else if let Some(pc) = Piece::new_from_usi_str(token) {
                    let sq = Square::new(File::ALL[File::NUM - 1 - file_idx], *rank);
                    pos.put_piece(pc, sq);
                    file_idx += 1;
                } else {
                    return Err(SfenError::InvalidPieceCharacters {
                        token: token.to_string(),
                    });
                }
            }
            if file_idx != File::NUM {
                return Err(SfenError::InvalidNumberOfFiles { files: file_idx });
            }
        }
        for &c in Color::ALL.iter() {
            let kings = pos.pieces_cp(c, PieceType::KING);
            match kings.count_ones() {
                0 => return Err(SfenError::KingIsNothing { c }),
                1 => pos.king_squares[c.0 as usize] = kings.lsb_unchecked(),
                _ => return Err(SfenError::TooManyKings { c }),
            }
        }

        match side_to_move_str {
            "b" => pos.side_to_move = Color::BLACK,
            "w" => pos.side_to_move = Color::WHITE,
            _ => {
                return Err(SfenError::InvalidSideToMoveCharacters {
                    chars: side_to_move_str.to_string(),
                });
            }
        }

        if hands_str != "-" {
            let tokens = tokenize(&HAND_TOKEN, hands_str).map_err(|token| SfenError::InvalidHandPieceCharacters {
                token: token.to_string(),
            })?;
            let mut hand_num: i64 = 1;
            for token in tokens {
                if let Ok(digit) = token.parse::<i64>() {
                    if digit <= 0 {
                        return Err(SfenError::InvalidNumberOfHandPieces { number: digit });
                    }
                    hand_num = digit;
                    continue;
                }
                let c = match token.chars().next() {
                    Some(ch) if ch.is_ascii_uppercase() => Color::BLACK,
                    _ => Color::WHITE,
                };
                let pt = token
                    .chars()
                    .next()
                    .and_then(|ch| PieceType::new_hand_piece_type_from_usi_char(ch.to_ascii_uppercase()))
                    .ok_or_else(|| SfenError::InvalidHandPieceCharacters {
                        token: token.to_string(),
                    })?;
                if pos.hands[c.0 as usize].exist(pt) {
                    return Err(SfenError::SameHandPieceTwice {
                        token: token.to_string(),
                    });
                }
                if i64::from(Hand::MAX[pt.0 as usize]) < hand_num {
                    return Err(SfenError::TooManyPieces {
                        piece: piece_name(pt),
                        number: hand_num,
                    });
                }
                pos.hands[c.0 as usize].set(pt, hand_num as u32);
                hand_num = 1;
            }
            if hand_num != 1 {
                return Err(SfenError::EndWithHandPieceNumber { last_number: hand_num });
            }
        }

        match game_ply_str.parse::<i32>() {
            // Room is left for the plies searched on top of it.
            Ok(game_ply) if 1 <= game_ply && game_ply <= i32::MAX - MAX_PLY => pos.game_ply = game_ply,
            _ => {
                return Err(SfenError::InvalidGamePly {
                    chars: game_ply_str.to_string(),
                });
            }
        }

        for &pt in PieceType::ALL_HAND.iter() {
            let mut on_board = pos.pieces_p(pt).count_ones();
            if pt.is_promotable() {
                on_board += pos.pieces_p(pt.to_promote()).count_ones();
            }
            let number = i64::from(on_board + pos.hands[0].num(pt) + pos.hands[1].num(pt));
            if i64::from(Hand::MAX[pt.0 as usize]) < number {
                return Err(SfenError::TooManyPieces {
                    piece: piece_name(pt),
                    number,
                });
            }
        }
        for &c in Color::ALL.iter() {
            for sq in pos.pieces_c(c) {
                let pc = pos.piece_on(sq);
                let dead = match PieceType::new(pc) {
                    PieceType::PAWN | PieceType::LANCE => Rank::new(sq).relative(c) == Rank::RANK1,
                    PieceType::KNIGHT => Rank::new(sq).relative(c).0 <= Rank::RANK2.0,
                    _ => false,
                };
                if dead {
                    return Err(SfenError::DeadPiece {
                        token: pc.to_usi_string(),
                        square: sq.to_usi_string(),
                    });
                }
            }
            for sq in pos.pieces_cp(c, PieceType::PAWN) {
                let file = File::new(sq);
                if pos.pawn_on_file[c.0 as usize][file.0 as usize] {
                    return Err(SfenError::TwoPawnsOnFile {
                        c,
                        file: file.to_usi_char(),
                    });
                }
                pos.pawn_on_file[c.0 as usize][file.0 as usize] = true;
            }
        }
        let us = pos.side_to_move();
        if pos.attackers_to(us, pos.king_square(us.inverse()), &pos.occupied_bb()).to_bool() {
            return Err(SfenError::SideNotToMoveInCheck);
        }

        let state = StateInfo::new_from_position(&pos);
        pos.states.push(state);
        pos.reserve_states();
        debug_assert!(pos.is_ok());
        Ok(pos)
    }
    /// Replaces this position with `sfen`. On error, the position is unchanged.
    /// The node counter and the repetition threshold survive; the key history does not.
    pub fn set(&mut self, sfen: &str) -> Result<(), SfenError> {
        let mut pos = Position::new_from_sfen(sfen)?;
        pos.nodes = self.nodes.clone();
        pos.repetition.threshold = self.repetition.threshold;
        *self = pos;
        Ok(())
    }
    /// A copy for a search thread, counting its nodes in `nodes`.
    pub fn new_from_position(pos: &Position, nodes: Arc<AtomicU64>) -> Position {
        let mut p = pos.clone();
        p.nodes = nodes;
        p.reserve_states();
        p
    }

    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color_bb[c.0 as usize]
    }
    pub fn pieces_p(&self, pt: PieceType) -> Bitboard {
        self.by_type_bb[pt.0 as usize]
    }
    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard {
        self.pieces_c(c) & self.pieces_p(pt)
    }
    pub fn pieces_pp(&self, pt0: PieceType, pt1: PieceType) -> Bitboard {
        self.pieces_p(pt0) | self.pieces_p(pt1)
    }
    pub fn pieces_ppp(&self, pt0: PieceType, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.pieces_pp(pt0, pt1) | self.pieces_p(pt2)
    }
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.0 as usize]
    }
    pub fn occupied_bb(&self) -> Bitboard {
        self.by_type_bb[PieceType::OCCUPIED.0 as usize]
    }
    pub fn empty_bb(&self) -> Bitboard {
        !self.occupied_bb()
    }
    pub fn hand(&self, c: Color) -> Hand {
        self.hands[c.0 as usize]
    }
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }
    pub fn king_square(&self, c: Color) -> Square {
        self.king_squares[c.0 as usize]
    }
    /// True iff `c` has an unpromoted pawn on `file`.
    pub fn pawn_on_file(&self, c: Color, file: File) -> bool {
        self.pawn_on_file[c.0 as usize][file.0 as usize]
    }
    pub fn game_ply(&self) -> i32 {
        self.game_ply
    }
    pub fn nodes_searched(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    fn is_gold_like(pt: PieceType) -> bool {
        matches!(
            pt,
            PieceType::GOLD | PieceType::PRO_PAWN | PieceType::PRO_LANCE | PieceType::PRO_KNIGHT | PieceType::PRO_SILVER
        )
    }
    fn xor_bbs(&mut self, c: Color, pt: PieceType, sq: Square) {
        self.by_type_bb[PieceType::OCCUPIED.0 as usize].xor(sq);
        self.by_type_bb[pt.0 as usize].xor(sq);
        self.by_color_bb[c.0 as usize].xor(sq);
        if Position::is_gold_like(pt) {
            self.golds_bb.xor(sq);
        }
    }
    fn put_piece(&mut self, pc: Piece, sq: Square) {
        debug_assert!(!self.occupied_bb().is_set(sq));
        self.xor_bbs(Color::new(pc), PieceType::new(pc), sq);
        self.board[sq.0 as usize] = pc;
    }
    fn remove_piece(&mut self, pc: Piece, sq: Square) {
        debug_assert_eq!(self.piece_on(sq), pc);
        self.xor_bbs(Color::new(pc), PieceType::new(pc), sq);
        self.board[sq.0 as usize] = Piece::EMPTY;
    }

    pub fn attackers_to(&self, color_of_attackers: Color, to: Square, occupied: &Bitboard) -> Bitboard {
        let opp = color_of_attackers.inverse();
        let t = &*ATTACK_TABLE;
        ((t.pawn.attack(opp, to) & self.pieces_p(PieceType::PAWN))
            | (t.lance.attack(opp, to, occupied) & self.pieces_p(PieceType::LANCE))
            | (t.knight.attack(opp, to) & self.pieces_p(PieceType::KNIGHT))
            | (t.silver.attack(opp, to) & self.pieces_ppp(PieceType::SILVER, PieceType::KING, PieceType::DRAGON))
            | (t.gold.attack(opp, to) & (self.golds_bb | self.pieces_pp(PieceType::KING, PieceType::HORSE)))
            | (t.bishop.attack(to, occupied) & self.pieces_pp(PieceType::BISHOP, PieceType::HORSE))
            | (t.rook.attack(to, occupied) & self.pieces_pp(PieceType::ROOK, PieceType::DRAGON)))
            & self.pieces_c(color_of_attackers)
    }
    /// Sliders of `color_of_sliders` aiming at `ksq` through exactly one piece,
    /// returned as (blockers, pinners). A pinner pins a piece of the king's side.
    pub fn slider_blockers_and_pinners(&self, color_of_sliders: Color, ksq: Square) -> (Bitboard, Bitboard) {
        let opp_of_sliders = color_of_sliders.inverse();
        let mut blockers = Bitboard::ZERO;
        let mut pinners = Bitboard::ZERO;
        let snipers = ((ATTACK_TABLE.lance.attack(opp_of_sliders, ksq, &Bitboard::ZERO) & self.pieces_p(PieceType::LANCE))
            | (ATTACK_TABLE.bishop.attack(ksq, &Bitboard::ZERO) & self.pieces_pp(PieceType::BISHOP, PieceType::HORSE))
            | (ATTACK_TABLE.rook.attack(ksq, &Bitboard::ZERO) & self.pieces_pp(PieceType::ROOK, PieceType::DRAGON)))
            & self.pieces_c(color_of_sliders);
        for sq_of_sniper in snipers {
            let pseudo_blockers = Bitboard::between(ksq, sq_of_sniper) & self.occupied_bb();
            if pseudo_blockers.count_ones() == 1 {
                blockers |= pseudo_blockers;
                if pseudo_blockers.and_to_bool(self.pieces_c(opp_of_sliders)) {
                    pinners.set(sq_of_sniper);
                }
            }
        }
        (blockers, pinners)
    }

    fn st(&self) -> &StateInfo {
        match self.states.last() {
            Some(st) => st,
            None => unreachable!(),
        }
    }
    pub fn reserve_states(&mut self) {
        // Room for MAX_PLY frames above the current stack, whatever the move number says.
        self.states.reserve(MAX_PLY as usize);
    }
    pub fn key(&self) -> Key {
        self.st().key()
    }
    pub fn checkers(&self) -> Bitboard {
        self.st().checkers_bb
    }
    pub fn in_check(&self) -> bool {
        self.checkers().to_bool()
    }
    pub fn is_in_check(&self, c: Color) -> bool {
        if c == self.side_to_move() {
            self.in_check()
        } else {
            self.attackers_to(c.inverse(), self.king_square(c), &self.occupied_bb()).to_bool()
        }
    }
    /// The piece taken by the last move, or EMPTY.
    pub fn captured_piece(&self) -> Piece {
        self.st().captured_piece
    }
    pub fn blockers_for_king(&self, color_of_king: Color) -> Bitboard {
        self.st().check_info.blockers_for_king(color_of_king)
    }
    pub fn pinners_for_king(&self, color_of_king: Color) -> Bitboard {
        self.st().check_info.pinners_for_king(color_of_king)
    }

    /// Whether `m` could be played here ignoring checks to our own king.
    /// Used for moves of unknown origin: TT, book and USI input.
    pub fn pseudo_legal(&self, m: Move) -> bool {
        let us = self.side_to_move();
        let to = m.to();
        if m.is_drop() {
            let pt = m.piece_type_dropped();
            if !self.hand(us).exist(pt) || self.piece_on(to) != Piece::EMPTY {
                return false;
            }
            let rank = Rank::new(to).relative(us);
            return match pt {
                PieceType::PAWN => rank != Rank::RANK1 && !self.pawn_on_file(us, File::new(to)),
                PieceType::LANCE => rank != Rank::RANK1,
                PieceType::KNIGHT => rank.0 > Rank::RANK2.0,
                _ => true,
            };
        }
        let from = m.from();
        let pc_from = self.piece_on(from);
        if pc_from == Piece::EMPTY || Color::new(pc_from) != us || self.pieces_c(us).is_set(to) {
            return false;
        }
        let pt_from = PieceType::new(pc_from);
        if !ATTACK_TABLE.attack(pt_from, us, from, &self.occupied_bb()).is_set(to) {
            return false;
        }
        if m.is_promotion() {
            pt_from.is_promotable() && (Rank::new(from).is_opponent_field(us) || Rank::new(to).is_opponent_field(us))
        } else {
            !must_promote(pt_from, us, to)
        }
    }
    /// Legality of a pseudo-legal move: our king is not left in check, and a
    /// pawn drop does not deliver mate.
    pub fn is_legal(&self, m: Move) -> bool {
        let us = self.side_to_move();
        let ksq = self.king_square(us);
        let checkers = self.checkers();
        let to = m.to();
        if m.is_drop() {
            match checkers.count_ones() {
                0 => {}
                1 => {
                    if !Bitboard::between(checkers.lsb_unchecked(), ksq).is_set(to) {
                        return false;
                    }
                }
                _ => return false,
            }
            if m.piece_type_dropped() == PieceType::PAWN
                && ATTACK_TABLE.pawn.attack(us, to).is_set(self.king_square(us.inverse()))
                && self.is_drop_pawn_mate(us, to)
            {
                return false;
            }
            return true;
        }
        let from = m.from();
        if from == ksq {
            return !self
                .attackers_to(us.inverse(), to, &(self.occupied_bb() ^ Bitboard::square_mask(from)))
                .to_bool();
        }
        match checkers.count_ones() {
            0 => {}
            1 => {
                let checker_sq = checkers.lsb_unchecked();
                if to != checker_sq && !Bitboard::between(checker_sq, ksq).is_set(to) {
                    return false;
                }
            }
            _ => return false,
        }
        !self.blockers_for_king(us).is_set(from) || aligned(from, to, ksq)
    }
    /// A pawn of `color_of_pawn` dropped on `sq_of_pawn` checks the enemy king.
    /// This decides whether any reply exists: a king step (taking the pawn
    /// included) or a capture of the pawn by another piece. Interpositions
    /// are impossible against an adjacent checker.
    pub fn is_drop_pawn_mate(&self, color_of_pawn: Color, sq_of_pawn: Square) -> bool {
        let color_of_defense = color_of_pawn.inverse();
        let ksq = self.king_square(color_of_defense);
        debug_assert!(ATTACK_TABLE.pawn.attack(color_of_pawn, sq_of_pawn).is_set(ksq));
        let occupied = self.occupied_bb() | Bitboard::square_mask(sq_of_pawn);

        let capturers =
            self.attackers_to(color_of_defense, sq_of_pawn, &occupied) & !Bitboard::square_mask(ksq);
        for from in capturers {
            let occupied_after = occupied ^ Bitboard::square_mask(from);
            if !self.attackers_to(color_of_pawn, ksq, &occupied_after).to_bool() {
                return false;
            }
        }

        let escapes = ATTACK_TABLE.king.attack(color_of_defense, ksq) & !self.pieces_c(color_of_defense);
        let occupied_without_king = occupied ^ Bitboard::square_mask(ksq);
        for to in escapes {
            if !self.attackers_to(color_of_pawn, to, &occupied_without_king).to_bool() {
                return false;
            }
        }
        true
    }
    pub fn gives_check(&self, m: Move) -> bool {
        let to = m.to();
        let check_info = &self.st().check_info;
        if m.is_drop() {
            return check_info.check_squares[m.piece_type_dropped().0 as usize].is_set(to);
        }
        let from = m.from();
        let pc_from = self.piece_on(from);
        let pc_to = if m.is_promotion() { pc_from.to_promote() } else { pc_from };
        if PieceType::new(pc_to) != PieceType::KING && check_info.check_squares[PieceType::new(pc_to).0 as usize].is_set(to) {
            return true;
        }
        // discovered check
        let them = self.side_to_move().inverse();
        check_info.blockers_for_king(them).is_set(from) && !aligned(from, to, self.king_square(them))
    }

    pub fn do_move(&mut self, m: Move) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
        let mut board_key = self.st().board_key ^ Zobrist::COLOR;
        let mut hand_key = self.st().hand_key;
        let us = self.side_to_move();
        let them = us.inverse();
        let to = m.to();
        let captured_piece;
        if m.is_drop() {
            let pt = m.piece_type_dropped();
            let hand_num = self.hand(us).num(pt);
            hand_key ^= ZOBRIST.get_hand(pt, hand_num, us);
            board_key ^= ZOBRIST.get_field(pt, to, us);
            self.hands[us.0 as usize].minus_one(pt);
            self.put_piece(Piece::new(us, pt), to);
            if pt == PieceType::PAWN {
                self.pawn_on_file[us.0 as usize][File::new(to).0 as usize] = true;
            }
            captured_piece = Piece::EMPTY;
        } else {
            let from = m.from();
            let pc_from = self.piece_on(from);
            let pt_from = PieceType::new(pc_from);
            self.remove_piece(pc_from, from);
            captured_piece = self.piece_on(to);
            if captured_piece != Piece::EMPTY {
                let pt_captured = PieceType::new(captured_piece);
                self.remove_piece(captured_piece, to);
                self.hands[us.0 as usize].plus_one(pt_captured);
                let pt_demoted = pt_captured.to_demote();
                board_key ^= ZOBRIST.get_field(pt_captured, to, them);
                hand_key ^= ZOBRIST.get_hand(pt_demoted, self.hand(us).num(pt_demoted), us);
                if pt_captured == PieceType::PAWN {
                    self.pawn_on_file[them.0 as usize][File::new(to).0 as usize] = false;
                }
            }
            let pc_to = if m.is_promotion() {
                if pt_from == PieceType::PAWN {
                    self.pawn_on_file[us.0 as usize][File::new(from).0 as usize] = false;
                }
                pc_from.to_promote()
            } else {
                pc_from
            };
            self.put_piece(pc_to, to);
            if pt_from == PieceType::KING {
                self.king_squares[us.0 as usize] = to;
            }
            board_key ^= ZOBRIST.get_field(pt_from, from, us);
            board_key ^= ZOBRIST.get_field(PieceType::new(pc_to), to, us);
        }
        self.side_to_move = them;
        self.game_ply += 1;
        let state = StateInfo {
            board_key,
            hand_key,
            checkers_bb: self.attackers_to(us, self.king_square(them), &self.occupied_bb()),
            captured_piece,
            check_info: CheckInfo::new(self),
            game_status: Cell::new(None),
        };
        self.states.push(state);
    }
    /// Reverts `m`, which must be the last move done.
    pub fn undo_move(&mut self, m: Move) {
        let them = self.side_to_move();
        let us = them.inverse();
        let to = m.to();
        if m.is_drop() {
            let pt = m.piece_type_dropped();
            self.remove_piece(Piece::new(us, pt), to);
            self.hands[us.0 as usize].plus_one(pt);
            if pt == PieceType::PAWN {
                self.pawn_on_file[us.0 as usize][File::new(to).0 as usize] = false;
            }
        } else {
            let from = m.from();
            let pc_to = self.piece_on(to);
            self.remove_piece(pc_to, to);
            let pc_from = if m.is_promotion() { pc_to.to_demote() } else { pc_to };
            self.put_piece(pc_from, from);
            if m.is_promotion() && PieceType::new(pc_from) == PieceType::PAWN {
                self.pawn_on_file[us.0 as usize][File::new(from).0 as usize] = true;
            }
            if pc_from.is_king() {
                self.king_squares[us.0 as usize] = from;
            }
            let captured_piece = self.captured_piece();
            if captured_piece != Piece::EMPTY {
                let pt_captured = PieceType::new(captured_piece);
                self.put_piece(captured_piece, to);
                self.hands[us.0 as usize].minus_one(pt_captured.to_demote());
                if pt_captured == PieceType::PAWN {
                    self.pawn_on_file[them.0 as usize][File::new(to).0 as usize] = true;
                }
            }
        }
        self.side_to_move = us;
        self.game_ply -= 1;
        self.states.pop();
    }
    pub fn do_null_move(&mut self) {
        debug_assert!(!self.in_check());
        let mut state = self.st().clone();
        self.side_to_move = self.side_to_move.inverse();
        state.board_key ^= Zobrist::COLOR;
        state.captured_piece = Piece::EMPTY;
        state.game_status = Cell::new(None);
        self.states.push(state);
        let check_info = CheckInfo::new(self);
        if let Some(st) = self.states.last_mut() {
            st.check_info = check_info;
        }
    }
    pub fn undo_null_move(&mut self) {
        self.states.pop();
        self.side_to_move = self.side_to_move.inverse();
    }

    /// Records the current key for repetition detection. Called by whoever
    /// owns the move sequence, never by do_move.
    pub fn record_repetition(&mut self) {
        let key = self.key();
        self.repetition.push(key);
        self.st().game_status.set(None);
    }
    pub fn unrecord_repetition(&mut self) {
        self.repetition.pop();
        self.st().game_status.set(None);
    }
    pub fn set_repetition_threshold(&mut self, threshold: u32) {
        self.repetition.threshold = threshold;
        self.st().game_status.set(None);
    }
    pub fn repetition_count(&self) -> u32 {
        self.repetition.count(self.key())
    }

    fn has_legal_move(&self) -> bool {
        let us = self.side_to_move();
        let ksq = self.king_square(us);
        let king_targets = ATTACK_TABLE.king.attack(us, ksq) & !self.pieces_c(us);
        if king_targets.into_iter().any(|to| self.is_legal(Move::new_unpromote(ksq, to))) {
            return true;
        }
        let mut mlist = MoveList::new();
        if self.in_check() {
            mlist.generate::<EvasionsType>(self, 0);
        } else {
            mlist.generate::<NonEvasionsType>(self, 0);
        }
        mlist.slice(0).iter().any(|x| self.is_legal(x.mv))
    }
    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_move()
    }
    pub fn game_status(&self) -> GameStatus {
        if let Some(status) = self.st().game_status.get() {
            return status;
        }
        let status = if !self.has_legal_move() {
            GameStatus::NoLegalMove
        } else if self.repetition.reaches_threshold(self.key()) {
            GameStatus::Repetition
        } else {
            GameStatus::InProgress
        };
        self.st().game_status.set(Some(status));
        status
    }
    pub fn is_game_over(&self) -> bool {
        self.game_status() != GameStatus::InProgress
    }
    /// The winner of a finished game. A repetition, or a game in progress, has none.
    pub fn winner(&self) -> Option<Color> {
        match self.game_status() {
            GameStatus::NoLegalMove => Some(self.side_to_move().inverse()),
            GameStatus::Repetition | GameStatus::InProgress => None,
        }
    }

    pub fn to_sfen(&self) -> String {
        let mut s = String::new();
        for rank in Rank::ALL.iter() {
            let mut empty_squares = 0;
            if !s.is_empty() {
                s += "/";
            }
            for file in File::ALL.iter().rev() {
                let pc = self.piece_on(Square::new(*file, *rank));
                if pc == Piece::EMPTY {
                    empty_squares += 1;
                } else {
                    if empty_squares != 0 {
                        s += &empty_squares.to_string();
                    }
                    s += &pc.to_usi_string();
                    empty_squares = 0;
                }
            }
            if empty_squares != 0 {
                s += &empty_squares.to_string();
            }
        }
        s.push(' ');
        s.push(self.side_to_move.to_usi_char());
        s.push(' ');
        if self.hand(Color::BLACK).is_empty() && self.hand(Color::WHITE).is_empty() {
            s += "-";
        } else {
            for &c in Color::ALL.iter() {
                for &pt in PieceType::ALL_HAND_FOR_SFEN.iter() {
                    let num = self.hand(c).num(pt);
                    if 2 <= num {
                        s += &num.to_string();
                    }
                    if num != 0 {
                        s += &Piece::new(c, pt).to_usi_string();
                    }
                }
            }
        }
        s.push(' ');
        s += &self.game_ply.to_string();
        s
    }

    /// Recomputes everything incremental and compares. Panics with the line
    /// of the first mismatch.
    #[allow(dead_code)]
    pub fn is_ok(&self) -> bool {
        if self.pieces_c(Color::BLACK).and_to_bool(self.pieces_c(Color::WHITE)) {
            panic!("position is ng. line: {}", line!());
        }
        if (self.pieces_c(Color::BLACK) | self.pieces_c(Color::WHITE)) != self.occupied_bb() {
            panic!("position is ng. line: {}", line!());
        }
        let by_type = PieceType::ALL.iter().fold(Bitboard::ZERO, |bb, &pt| bb ^ self.pieces_p(pt));
        if by_type != self.occupied_bb() {
            panic!("position is ng. line: {}", line!());
        }
        for &sq in Square::ALL.iter() {
            let pc = self.piece_on(sq);
            if pc == Piece::EMPTY {
                if self.occupied_bb().is_set(sq) {
                    panic!("position is ng. line: {}", line!());
                }
            } else if !self.pieces_cp(Color::new(pc), PieceType::new(pc)).is_set(sq) {
                panic!("position is ng. line: {}", line!());
            }
        }
        let golds = PieceType::ALL
            .iter()
            .filter(|&&pt| Position::is_gold_like(pt))
            .fold(Bitboard::ZERO, |bb, &pt| bb | self.pieces_p(pt));
        if golds != self.golds_bb {
            panic!("position is ng. line: {}", line!());
        }
        for &c in Color::ALL.iter() {
            let kings = self.pieces_cp(c, PieceType::KING);
            if kings.count_ones() != 1 || kings.lsb_unchecked() != self.king_square(c) {
                panic!("position is ng. line: {}", line!());
            }
            for &file in File::ALL.iter() {
                let has_pawn = self.pieces_cp(c, PieceType::PAWN).and_to_bool(Bitboard::file_mask(file));
                if has_pawn != self.pawn_on_file(c, file) {
                    panic!("position is ng. line: {}", line!());
                }
            }
        }
        let us = self.side_to_move();
        if self.checkers() != self.attackers_to(us.inverse(), self.king_square(us), &self.occupied_bb()) {
            panic!("position is ng. line: {}", line!());
        }
        if self.is_in_check(us.inverse()) {
            panic!("position is ng. line: {}", line!());
        }
        if self.key() != (StateInfo::new_board_key(self) ^ StateInfo::new_hand_key(self)) {
            panic!("position is ng. line: {}", line!());
        }
        true
    }
}

fn piece_name(pt: PieceType) -> &'static str {
    match pt {
        PieceType::PAWN => "pawn",
        PieceType::LANCE => "lance",
        PieceType::KNIGHT => "knight",
        PieceType::SILVER => "silver",
        PieceType::BISHOP => "bishop",
        PieceType::ROOK => "rook",
        PieceType::GOLD => "gold",
        _ => unreachable!(),
    }
}

/// A pawn or lance on the last rank, or a knight on the last two, could never move again.
pub fn must_promote(pt: PieceType, us: Color, to: Square) -> bool {
    let rank = Rank::new(to).relative(us);
    match pt {
        PieceType::PAWN | PieceType::LANCE => rank == Rank::RANK1,
        PieceType::KNIGHT => rank.0 <= Rank::RANK2.0,
        _ => false,
    }
}

#[cfg(test)]
fn random_playout(pos: &mut Position, rng: &mut StdRng, plies: usize) -> Vec<Move> {
    let mut moves = Vec::new();
    for _ in 0..plies {
        let mut mlist = MoveList::new();
        mlist.generate::<LegalType>(pos, 0);
        if mlist.is_empty() {
            break;
        }
        let m = mlist.slice(0)[rng.gen_range(0..mlist.len())].mv;
        pos.do_move(m);
        moves.push(m);
    }
    moves
}

#[test]
fn test_position_set() {
    let sfens = [
        START_SFEN,
        "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RGgsn5p 1",
        "l4S2l/4g1gs1/5p1p1/pr2N1pkp/4Gn3/PP3PPPP/2GPP4/1K7/L3r+s2L w BS2N5Pb 20",
        "6n1l/2+S1k4/2lp4p/1np1B2b1/3PP4/1N1S3rP/1P2+pPP+p1/1p1G5/3KG2r1 b GSN2L4Pgs2p 399",
    ];
    for sfen in sfens.iter() {
        let pos = Position::new_from_sfen(sfen).unwrap();
        assert_eq!(pos.to_sfen(), sfen.to_string());
        assert!(pos.is_ok());
    }
}

#[test]
fn test_position_set_errors() {
    let cases = [
        (
            "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RRGgsn5p 1",
            SfenError::SameHandPieceTwice { token: "R".to_string() },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSG1GSNL b - 1",
            SfenError::KingIsNothing { c: Color::BLACK },
        ),
        (
            "lnsg1gsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1",
            SfenError::KingIsNothing { c: Color::WHITE },
        ),
        (
            "l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RGgsn5p9 1",
            SfenError::EndWithHandPieceNumber { last_number: 9 },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL x - 1",
            SfenError::InvalidSideToMoveCharacters { chars: "x".to_string() },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 0",
            SfenError::InvalidGamePly { chars: "0".to_string() },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSN b - 1",
            SfenError::InvalidNumberOfFiles { files: 8 },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1 b - 1",
            SfenError::InvalidNumberOfRanks { ranks: 8 },
        ),
        (
            "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSN? b - 1",
            SfenError::InvalidPieceCharacters { token: "?".to_string() },
        ),
        (
            "4k4/9/9/9/9/9/4P4/4P4/4K4 b - 1",
            SfenError::TwoPawnsOnFile { c: Color::BLACK, file: '5' },
        ),
        (
            "P3k4/9/9/9/9/9/9/9/4K4 b - 1",
            SfenError::DeadPiece {
                token: "P".to_string(),
                square: "9a".to_string(),
            },
        ),
        ("4k4/4R4/9/9/9/9/9/9/4K4 b - 1", SfenError::SideNotToMoveInCheck),
        (
            "4k4/9/9/9/9/9/9/9/4K4 b 19P 1",
            SfenError::TooManyPieces {
                piece: "pawn",
                number: 19,
            },
        ),
    ];
    for (sfen, err) in cases.iter() {
        match Position::new_from_sfen(sfen) {
            Ok(_) => panic!("accepted: {}", sfen),
            Err(e) => assert_eq!(&e, err),
        }
    }
}

#[test]
fn test_position_set_keeps_state_on_error() {
    let mut pos = Position::new();
    pos.do_move(Move::new_from_usi_str("7g7f", &pos).unwrap());
    let before = pos.to_sfen();
    assert!(pos.set("not a sfen").is_err());
    assert_eq!(pos.to_sfen(), before);
    assert!(pos.set(START_SFEN).is_ok());
    assert_eq!(pos.to_sfen(), START_SFEN);
}

#[test]
fn test_position_attackers_to() {
    let pos = Position::new();
    let attackers = pos.attackers_to(Color::WHITE, Square::SQ52, &pos.occupied_bb());
    assert_eq!(attackers.count_ones(), 4);
    assert!(attackers.is_set(Square::SQ41));
    assert!(attackers.is_set(Square::SQ51));
    assert!(attackers.is_set(Square::SQ61));
    assert!(attackers.is_set(Square::SQ82));

    let pos = Position::new_from_sfen("k8/5+R3/3b1l3/4s4/5pg1+r/4GP3/5LN2/9/K4L3 b - 1").unwrap();
    let attackers = pos.attackers_to(Color::BLACK, Square::SQ45, &pos.occupied_bb());
    assert_eq!(attackers.count_ones(), 3);
    assert!(attackers.is_set(Square::SQ46));
    assert!(attackers.is_set(Square::SQ37));
    assert!(attackers.is_set(Square::SQ56));
}

#[test]
fn test_position_slider_blockers() {
    let pos = Position::new_from_sfen("4k4/9/4r4/9/4S4/9/4K4/9/9 b - 1").unwrap();
    assert!(pos.blockers_for_king(Color::BLACK).is_set(Square::SQ55));
    assert!(pos.pinners_for_king(Color::BLACK).is_set(Square::SQ53));
    // pinned silver may only move along the file
    assert!(!pos.is_legal(Move::new_unpromote(Square::SQ55, Square::SQ44)));
    assert!(pos.is_legal(Move::new_unpromote(Square::SQ55, Square::SQ54)));
}

#[test]
fn test_position_do_move_and_undo() {
    let mut pos = Position::new();
    let m = Move::new_from_usi_str("7g7f", &pos).unwrap();
    pos.do_move(m);
    assert_eq!(pos.to_sfen(), "lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL w - 2");
    let m2 = Move::new_from_usi_str("3c3d", &pos).unwrap();
    pos.do_move(m2);
    let m3 = Move::new_from_usi_str("8h2b+", &pos).unwrap();
    pos.do_move(m3);
    assert_eq!(pos.captured_piece(), Piece::W_BISHOP);
    assert_eq!(pos.hand(Color::BLACK).num(PieceType::BISHOP), 1);
    assert!(pos.is_ok());
    pos.undo_move(m3);
    pos.undo_move(m2);
    pos.undo_move(m);
    assert_eq!(pos.to_sfen(), START_SFEN);
    assert_eq!(pos.key(), Position::new().key());
}

#[test]
fn test_position_make_unmake_identity() {
    let mut rng = StdRng::seed_from_u64(20240601);
    for _ in 0..20 {
        let mut pos = Position::new();
        let mut snapshots = Vec::new();
        for _ in 0..120 {
            let mut mlist = MoveList::new();
            mlist.generate::<LegalType>(&pos, 0);
            if mlist.is_empty() {
                break;
            }
            let m = mlist.slice(0)[rng.gen_range(0..mlist.len())].mv;
            snapshots.push((m, pos.to_sfen(), pos.key(), pos.checkers(), pos.pawn_on_file));
            pos.do_move(m);
            assert!(pos.is_ok());
        }
        while let Some((m, sfen, key, checkers, pawn_on_file)) = snapshots.pop() {
            pos.undo_move(m);
            assert_eq!(pos.to_sfen(), sfen);
            assert_eq!(pos.key(), key);
            assert_eq!(pos.checkers(), checkers);
            assert_eq!(pos.pawn_on_file, pawn_on_file);
        }
        assert_eq!(pos.to_sfen(), START_SFEN);
    }
}

#[test]
fn test_position_zobrist_consistency() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut pos = Position::new();
        random_playout(&mut pos, &mut rng, 150);
        let recomputed = Position::new_from_sfen(&pos.to_sfen()).unwrap();
        assert_eq!(pos.key(), recomputed.key());
        assert_eq!(pos.checkers(), recomputed.checkers());
    }
}

#[test]
fn test_position_null_move() {
    let mut pos = Position::new();
    let key = pos.key();
    pos.do_null_move();
    assert_eq!(pos.side_to_move(), Color::WHITE);
    assert_ne!(pos.key(), key);
    pos.undo_null_move();
    assert_eq!(pos.key(), key);
    assert_eq!(pos.side_to_move(), Color::BLACK);
}

#[test]
fn test_position_gives_check() {
    let pos = Position::new_from_sfen("4k4/9/9/9/9/9/9/9/4K4 b RGP 1").unwrap();
    assert!(pos.gives_check(Move::new_drop(PieceType::GOLD, Square::SQ52)));
    assert!(pos.gives_check(Move::new_drop(PieceType::ROOK, Square::SQ55)));
    assert!(!pos.gives_check(Move::new_drop(PieceType::ROOK, Square::SQ44)));
    let pos = Position::new_from_sfen("4k4/9/9/9/4B4/9/4R4/9/4K4 b - 1").unwrap();
    // the bishop uncovers the rook
    assert!(pos.gives_check(Move::new_unpromote(Square::SQ55, Square::SQ44)));
}

#[test]
fn test_drop_pawn_mate() {
    // The pawn on 9b is covered by the king on 9c and nothing can take it.
    let pos = Position::new_from_sfen("kl7/1n7/K8/9/9/9/9/9/9 b P 1").unwrap();
    let m = Move::new_drop(PieceType::PAWN, Square::SQ92);
    assert!(pos.pseudo_legal(m));
    assert!(!pos.is_legal(m));
    // A silver able to take the pawn makes the drop legal.
    let pos = Position::new_from_sfen("ks7/1n7/K8/9/9/9/9/9/9 b P 1").unwrap();
    assert!(pos.is_legal(m));
    // A gold pinned by the rook cannot take it.
    let pos = Position::new_from_sfen("kg5R1/1n7/K8/9/9/9/9/9/9 b P 1").unwrap();
    assert!(pos.blockers_for_king(Color::WHITE).is_set(Square::SQ81));
    assert!(!pos.is_legal(m));
    // Check without mate is fine.
    let pos = Position::new_from_sfen("4k4/9/9/9/9/9/9/9/4K4 b P 1").unwrap();
    assert!(pos.is_legal(Move::new_drop(PieceType::PAWN, Square::SQ52)));
}

#[test]
fn test_pawn_on_file() {
    let mut pos = Position::new();
    for &file in File::ALL.iter() {
        assert!(pos.pawn_on_file(Color::BLACK, file));
        assert!(pos.pawn_on_file(Color::WHITE, file));
    }
    for usi in ["7g7f", "3c3d", "7f7e", "3d3e", "7e7d", "3e3f", "7d7c+"].iter() {
        let m = Move::new_from_usi_str(usi, &pos).unwrap();
        pos.do_move(m);
    }
    assert!(!pos.pawn_on_file(Color::BLACK, File::FILE7));
    assert!(!pos.pawn_on_file(Color::WHITE, File::FILE7));
    assert!(pos.is_ok());
}

#[test]
fn test_checkmate_and_winner() {
    // White king on 1a, black gold on 1b backed by a silver on 2c.
    let pos = Position::new_from_sfen("8k/8G/7S1/9/9/9/9/9/4K4 w - 1").unwrap();
    assert!(pos.in_check());
    assert!(pos.is_checkmate());
    assert!(pos.is_game_over());
    assert_eq!(pos.winner(), Some(Color::BLACK));

    let pos = Position::new();
    assert!(!pos.is_checkmate());
    assert!(!pos.is_game_over());
    assert_eq!(pos.winner(), None);
}

#[test]
fn test_repetition() {
    let mut pos = Position::new();
    pos.record_repetition();
    let cycle = ["5i5h", "5a5b", "5h5i", "5b5a"];
    for _ in 0..3 {
        assert!(!pos.is_game_over());
        for usi in cycle.iter() {
            let m = Move::new_from_usi_str(usi, &pos).unwrap();
            pos.do_move(m);
            pos.record_repetition();
        }
    }
    assert_eq!(pos.repetition_count(), 4);
    assert_eq!(pos.game_status(), GameStatus::Repetition);
    assert!(pos.is_game_over());
    assert_eq!(pos.winner(), None);

    pos.set_repetition_threshold(5);
    assert!(!pos.is_game_over());
    pos.unrecord_repetition();
    pos.set_repetition_threshold(4);
    assert_eq!(pos.repetition_count(), 3);
    assert!(!pos.is_game_over());
}

#[test]
fn test_huge_game_ply() {
    let sfen = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 2000000000";
    let mut pos = Position::new_from_sfen(sfen).unwrap();
    assert_eq!(pos.game_ply(), 2_000_000_000);
    pos.reserve_states();
    let m = Move::new_from_usi_str("7g7f", &pos).unwrap();
    pos.do_move(m);
    assert_eq!(pos.game_ply(), 2_000_000_001);
    pos.undo_move(m);
    assert_eq!(pos.to_sfen(), sfen);
    let copied = Position::new_from_position(&pos, Arc::new(AtomicU64::new(0)));
    assert_eq!(copied.key(), pos.key());
    assert!(matches!(
        Position::new_from_sfen("lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 2147483647"),
        Err(SfenError::InvalidGamePly { .. })
    ));
}
