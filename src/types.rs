use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color(pub i32);

impl Color {
    pub const BLACK: Color = Color(0);
    pub const WHITE: Color = Color(1);
    pub const NUM: usize = 2;

    pub const ALL: [Color; Color::NUM] = [Color::BLACK, Color::WHITE];

    pub fn inverse(self) -> Color {
        Color(1 ^ self.0)
    }
    pub fn new(pc: Piece) -> Color {
        Color((pc.0 & Piece::WHITE_BIT) >> Piece::WHITE_BIT_SHIFT)
    }
    pub fn to_usi_char(self) -> char {
        match self {
            Color::BLACK => 'b',
            Color::WHITE => 'w',
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match *self {
            Color::BLACK => "black",
            Color::WHITE => "white",
            _ => unreachable!(),
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct File(pub i32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rank(pub i32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Square(pub i32);

impl File {
    pub const FILE1: File = File(0);
    pub const FILE2: File = File(1);
    pub const FILE3: File = File(2);
    pub const FILE4: File = File(3);
    pub const FILE5: File = File(4);
    pub const FILE6: File = File(5);
    pub const FILE7: File = File(6);
    pub const FILE8: File = File(7);
    pub const FILE9: File = File(8);
    pub const NUM: usize = 9;

    pub const ALL: [File; File::NUM] = [
        File::FILE1,
        File::FILE2,
        File::FILE3,
        File::FILE4,
        File::FILE5,
        File::FILE6,
        File::FILE7,
        File::FILE8,
        File::FILE9,
    ];

    pub fn new(sq: Square) -> File {
        debug_assert!(sq.is_ok());
        File(sq.0 / Rank::NUM as i32)
    }
    pub fn inverse(self) -> File {
        File(File::NUM as i32 - 1 - self.0)
    }
    pub fn to_usi_char(self) -> char {
        debug_assert!(0 <= self.0 && self.0 < File::NUM as i32);
        char::from(b'1' + self.0 as u8)
    }
    pub fn new_from_usi_char(c: char) -> Option<File> {
        match c {
            '1'..='9' => Some(File(c as i32 - '1' as i32)),
            _ => None,
        }
    }
}

impl Rank {
    pub const RANK1: Rank = Rank(0);
    pub const RANK2: Rank = Rank(1);
    pub const RANK3: Rank = Rank(2);
    pub const RANK4: Rank = Rank(3);
    pub const RANK5: Rank = Rank(4);
    pub const RANK6: Rank = Rank(5);
    pub const RANK7: Rank = Rank(6);
    pub const RANK8: Rank = Rank(7);
    pub const RANK9: Rank = Rank(8);
    pub const NUM: usize = 9;

    pub const ALL: [Rank; Rank::NUM] = [
        Rank::RANK1,
        Rank::RANK2,
        Rank::RANK3,
        Rank::RANK4,
        Rank::RANK5,
        Rank::RANK6,
        Rank::RANK7,
        Rank::RANK8,
        Rank::RANK9,
    ];

    pub fn new(sq: Square) -> Rank {
        debug_assert!(sq.is_ok());
        Rank(sq.0 % Rank::NUM as i32)
    }
    pub fn inverse(self) -> Rank {
        Rank(Rank::NUM as i32 - 1 - self.0)
    }
    /// The rank seen from `us`. RANK1 is the far edge, where forced promotion happens.
    pub fn relative(self, us: Color) -> Rank {
        match us {
            Color::BLACK => self,
            Color::WHITE => self.inverse(),
            _ => unreachable!(),
        }
    }
    pub fn new_from_usi_char(c: char) -> Option<Rank> {
        match c {
            'a'..='i' => Some(Rank(c as i32 - 'a' as i32)),
            _ => None,
        }
    }
    pub fn to_usi_char(self) -> char {
        debug_assert!(0 <= self.0 && self.0 < Rank::NUM as i32);
        char::from(b'a' + self.0 as u8)
    }
    // Promotion zone of `us`.
    pub fn is_opponent_field(self, us: Color) -> bool {
        self.relative(us).0 <= Rank::RANK3.0
    }
}

macro_rules! square_consts {
    ($($name:ident: $f:literal $r:literal),* $(,)?) => {
        impl Square {
            $(pub const $name: Square = Square(($f - 1) * 9 + ($r - 1));)*
        }
    };
}

#[rustfmt::skip]
square_consts! {
    SQ11: 1 1, SQ12: 1 2, SQ13: 1 3, SQ14: 1 4, SQ15: 1 5, SQ16: 1 6, SQ17: 1 7, SQ18: 1 8, SQ19: 1 9,
    SQ21: 2 1, SQ22: 2 2, SQ23: 2 3, SQ24: 2 4, SQ25: 2 5, SQ26: 2 6, SQ27: 2 7, SQ28: 2 8, SQ29: 2 9,
    SQ31: 3 1, SQ32: 3 2, SQ33: 3 3, SQ34: 3 4, SQ35: 3 5, SQ36: 3 6, SQ37: 3 7, SQ38: 3 8, SQ39: 3 9,
    SQ41: 4 1, SQ42: 4 2, SQ43: 4 3, SQ44: 4 4, SQ45: 4 5, SQ46: 4 6, SQ47: 4 7, SQ48: 4 8, SQ49: 4 9,
    SQ51: 5 1, SQ52: 5 2, SQ53: 5 3, SQ54: 5 4, SQ55: 5 5, SQ56: 5 6, SQ57: 5 7, SQ58: 5 8, SQ59: 5 9,
    SQ61: 6 1, SQ62: 6 2, SQ63: 6 3, SQ64: 6 4, SQ65: 6 5, SQ66: 6 6, SQ67: 6 7, SQ68: 6 8, SQ69: 6 9,
    SQ71: 7 1, SQ72: 7 2, SQ73: 7 3, SQ74: 7 4, SQ75: 7 5, SQ76: 7 6, SQ77: 7 7, SQ78: 7 8, SQ79: 7 9,
    SQ81: 8 1, SQ82: 8 2, SQ83: 8 3, SQ84: 8 4, SQ85: 8 5, SQ86: 8 6, SQ87: 8 7, SQ88: 8 8, SQ89: 8 9,
    SQ91: 9 1, SQ92: 9 2, SQ93: 9 3, SQ94: 9 4, SQ95: 9 5, SQ96: 9 6, SQ97: 9 7, SQ98: 9 8, SQ99: 9 9,
}

impl Square {
    pub const NUM: usize = 81;
    pub const DELTA_N: Square = Square(-1);
    pub const DELTA_E: Square = Square(-(File::NUM as i32));
    pub const DELTA_S: Square = Square(1);
    pub const DELTA_W: Square = Square(File::NUM as i32);
    pub const DELTA_NE: Square = Square(Square::DELTA_N.0 + Square::DELTA_E.0);
    pub const DELTA_SE: Square = Square(Square::DELTA_S.0 + Square::DELTA_E.0);
    pub const DELTA_SW: Square = Square(Square::DELTA_S.0 + Square::DELTA_W.0);
    pub const DELTA_NW: Square = Square(Square::DELTA_N.0 + Square::DELTA_W.0);
    pub const DELTA_NNE: Square = Square(Square::DELTA_N.0 + Square::DELTA_NE.0);
    pub const DELTA_SSE: Square = Square(Square::DELTA_S.0 + Square::DELTA_SE.0);
    pub const DELTA_SSW: Square = Square(Square::DELTA_S.0 + Square::DELTA_SW.0);
    pub const DELTA_NNW: Square = Square(Square::DELTA_N.0 + Square::DELTA_NW.0);

    pub const ALL: [Square; Square::NUM] = {
        let mut squares = [Square(0); Square::NUM];
        let mut i = 0;
        while i < Square::NUM {
            squares[i] = Square(i as i32);
            i += 1;
        }
        squares
    };

    pub fn new(f: File, r: Rank) -> Square {
        Square(f.0 * Rank::NUM as i32 + r.0)
    }
    pub fn inverse(self) -> Square {
        Square(Square::NUM as i32 - 1 - self.0)
    }
    pub fn is_ok(self) -> bool {
        0 <= self.0 && self.0 < Square::NUM as i32
    }
    /// One step by a primitive delta. Steps falling off the board (including
    /// wrapping around a file edge) yield None.
    pub fn checked_add(self, delta: Square) -> Option<Square> {
        let sq = Square(self.0 + delta.0);
        if !sq.is_ok() {
            return None;
        }
        let file_distance = (File::new(self).0 - File::new(sq).0).abs();
        let rank_distance = (Rank::new(self).0 - Rank::new(sq).0).abs();
        if file_distance <= 1 && rank_distance <= 2 {
            Some(sq)
        } else {
            None
        }
    }
    pub fn to_usi_string(self) -> String {
        [File::new(self).to_usi_char(), Rank::new(self).to_usi_char()].iter().collect()
    }
    pub fn new_from_usi_str(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = File::new_from_usi_char(chars.next()?)?;
        let rank = Rank::new_from_usi_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, rank))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound(pub i32);

impl Bound {
    pub const NONE: Bound = Bound(0);
    pub const UPPER: Bound = Bound(1);
    pub const LOWER: Bound = Bound(2);
    pub const EXACT: Bound = Bound(Bound::UPPER.0 | Bound::LOWER.0);

    pub fn include_lower(self) -> bool {
        (self.0 & Bound::LOWER.0) != 0
    }
    pub fn include_upper(self) -> bool {
        (self.0 & Bound::UPPER.0) != 0
    }
}

pub const MAX_PLY: i32 = 246;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Add, Sub, AddAssign, SubAssign)]
pub struct Depth(pub i32);

impl Depth {
    pub const ZERO: Depth = Depth(0);
    pub const ONE_PLY: Depth = Depth(1);
    // The TT stores depth in 6 bits.
    pub const MAX: Depth = Depth(63);
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    PartialOrd,
    Ord,
)]
pub struct Value(pub i32);

impl Value {
    pub const ZERO: Value = Value(0);
    pub const DRAW: Value = Value(0);
    pub const MATE: Value = Value(32600);
    pub const MATE_IN_MAX_PLY: Value = Value(Value::MATE.0 - MAX_PLY);
    pub const MATED_IN_MAX_PLY: Value = Value(-Value::MATE.0 + MAX_PLY);
    pub const INFINITE: Value = Value(32601);
    pub const NONE: Value = Value(32602);

    pub fn to_usi(self) -> String {
        if Value::MATED_IN_MAX_PLY < self && self < Value::MATE_IN_MAX_PLY {
            format!("cp {}", self.0)
        } else if Value::ZERO < self {
            format!("mate {}", Value::MATE.0 - self.0)
        } else {
            format!("mate -{}", Value::MATE.0 + self.0)
        }
    }
    pub fn mate_in(ply: i32) -> Value {
        Value::MATE - Value(ply)
    }
    pub fn mated_in(ply: i32) -> Value {
        -Value::MATE + Value(ply)
    }
    pub fn is_mate_score(self) -> bool {
        self >= Value::MATE_IN_MAX_PLY || self <= Value::MATED_IN_MAX_PLY
    }
    pub fn abs(self) -> Self {
        Value(self.0.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceType(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(pub i32);

impl PieceType {
    const PROMOTION: i32 = 8;
    pub const OCCUPIED: PieceType = PieceType(0);
    pub const PAWN: PieceType = PieceType(1);
    pub const LANCE: PieceType = PieceType(2);
    pub const KNIGHT: PieceType = PieceType(3);
    pub const SILVER: PieceType = PieceType(4);
    pub const BISHOP: PieceType = PieceType(5);
    pub const ROOK: PieceType = PieceType(6);
    pub const GOLD: PieceType = PieceType(7);
    pub const KING: PieceType = PieceType(8);
    pub const PRO_PAWN: PieceType = PieceType(9);
    pub const PRO_LANCE: PieceType = PieceType(10);
    pub const PRO_KNIGHT: PieceType = PieceType(11);
    pub const PRO_SILVER: PieceType = PieceType(12);
    pub const HORSE: PieceType = PieceType(13);
    pub const DRAGON: PieceType = PieceType(14);
    pub const NUM: usize = 15;
    pub const HAND_NUM: usize = 8;

    // sfen writes hands in this order.
    pub const ALL_HAND_FOR_SFEN: [PieceType; 7] = [
        PieceType::ROOK,
        PieceType::BISHOP,
        PieceType::GOLD,
        PieceType::SILVER,
        PieceType::KNIGHT,
        PieceType::LANCE,
        PieceType::PAWN,
    ];

    pub const ALL_HAND: [PieceType; 7] = [
        PieceType::PAWN,
        PieceType::LANCE,
        PieceType::KNIGHT,
        PieceType::SILVER,
        PieceType::BISHOP,
        PieceType::ROOK,
        PieceType::GOLD,
    ];

    pub const ALL: [PieceType; PieceType::NUM - 1] = [
        PieceType::PAWN,
        PieceType::LANCE,
        PieceType::KNIGHT,
        PieceType::SILVER,
        PieceType::BISHOP,
        PieceType::ROOK,
        PieceType::GOLD,
        PieceType::KING,
        PieceType::PRO_PAWN,
        PieceType::PRO_LANCE,
        PieceType::PRO_KNIGHT,
        PieceType::PRO_SILVER,
        PieceType::HORSE,
        PieceType::DRAGON,
    ];

    pub fn new(pc: Piece) -> PieceType {
        PieceType(pc.0 & (Piece::WHITE_BIT - 1))
    }
    pub fn is_slider(self) -> bool {
        matches!(
            self,
            PieceType::LANCE | PieceType::BISHOP | PieceType::ROOK | PieceType::HORSE | PieceType::DRAGON
        )
    }
    pub fn is_promotable(self) -> bool {
        matches!(
            self,
            PieceType::PAWN | PieceType::LANCE | PieceType::KNIGHT | PieceType::SILVER | PieceType::BISHOP | PieceType::ROOK
        )
    }
    pub fn is_promoted(self) -> bool {
        self.0 > PieceType::KING.0
    }
    pub fn to_promote(self) -> PieceType {
        debug_assert!(self.is_promotable());
        PieceType(self.0 + PieceType::PROMOTION)
    }
    /// The type a captured piece reverts to in the hand.
    pub fn to_demote(self) -> PieceType {
        if self.is_promoted() {
            PieceType(self.0 - PieceType::PROMOTION)
        } else {
            self
        }
    }
    pub fn to_usi_str(self) -> &'static str {
        match self {
            PieceType::PAWN => "P",
            PieceType::LANCE => "L",
            PieceType::KNIGHT => "N",
            PieceType::SILVER => "S",
            PieceType::BISHOP => "B",
            PieceType::ROOK => "R",
            PieceType::GOLD => "G",
            PieceType::KING => "K",
            PieceType::PRO_PAWN => "+P",
            PieceType::PRO_LANCE => "+L",
            PieceType::PRO_KNIGHT => "+N",
            PieceType::PRO_SILVER => "+S",
            PieceType::HORSE => "+B",
            PieceType::DRAGON => "+R",
            _ => unreachable!(),
        }
    }
    pub fn new_hand_piece_type_from_usi_char(c: char) -> Option<PieceType> {
        match c {
            'P' => Some(PieceType::PAWN),
            'L' => Some(PieceType::LANCE),
            'N' => Some(PieceType::KNIGHT),
            'S' => Some(PieceType::SILVER),
            'B' => Some(PieceType::BISHOP),
            'R' => Some(PieceType::ROOK),
            'G' => Some(PieceType::GOLD),
            _ => None,
        }
    }
}

impl Piece {
    const PROMOTION: i32 = 8;
    pub const WHITE_BIT_SHIFT: i32 = 4;
    pub const WHITE_BIT: i32 = 1 << Piece::WHITE_BIT_SHIFT;
    pub const EMPTY: Piece = Piece(0);
    pub const B_PAWN: Piece = Piece(1);
    pub const B_LANCE: Piece = Piece(2);
    pub const B_KNIGHT: Piece = Piece(3);
    pub const B_SILVER: Piece = Piece(4);
    pub const B_BISHOP: Piece = Piece(5);
    pub const B_ROOK: Piece = Piece(6);
    pub const B_GOLD: Piece = Piece(7);
    pub const B_KING: Piece = Piece(8);
    pub const B_PRO_PAWN: Piece = Piece(9);
    pub const B_PRO_LANCE: Piece = Piece(10);
    pub const B_PRO_KNIGHT: Piece = Piece(11);
    pub const B_PRO_SILVER: Piece = Piece(12);
    pub const B_HORSE: Piece = Piece(13);
    pub const B_DRAGON: Piece = Piece(14);
    pub const W_PAWN: Piece = Piece(17);
    pub const W_LANCE: Piece = Piece(18);
    pub const W_KNIGHT: Piece = Piece(19);
    pub const W_SILVER: Piece = Piece(20);
    pub const W_BISHOP: Piece = Piece(21);
    pub const W_ROOK: Piece = Piece(22);
    pub const W_GOLD: Piece = Piece(23);
    pub const W_KING: Piece = Piece(24);
    pub const W_PRO_PAWN: Piece = Piece(25);
    pub const W_PRO_LANCE: Piece = Piece(26);
    pub const W_PRO_KNIGHT: Piece = Piece(27);
    pub const W_PRO_SILVER: Piece = Piece(28);
    pub const W_HORSE: Piece = Piece(29);
    pub const W_DRAGON: Piece = Piece(30);

    pub const NUM: usize = Piece::W_DRAGON.0 as usize + 1;

    pub fn new(c: Color, pt: PieceType) -> Piece {
        Piece((c.0 << Piece::WHITE_BIT_SHIFT) | pt.0)
    }
    /// Parses a board token of the sfen: an optional `+` and one letter,
    /// uppercase for black.
    pub fn new_from_usi_str(s: &str) -> Option<Piece> {
        let (promoted, letter) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut chars = letter.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let color = if c.is_ascii_uppercase() { Color::BLACK } else { Color::WHITE };
        let pt = match c.to_ascii_uppercase() {
            'K' => PieceType::KING,
            other => PieceType::new_hand_piece_type_from_usi_char(other)?,
        };
        let pt = if promoted {
            if !pt.is_promotable() {
                return None;
            }
            pt.to_promote()
        } else {
            pt
        };
        Some(Piece::new(color, pt))
    }
    pub fn to_usi_string(self) -> String {
        let s = PieceType::new(self).to_usi_str();
        match Color::new(self) {
            Color::BLACK => s.to_string(),
            _ => s.to_ascii_lowercase(),
        }
    }
    pub fn inverse(self) -> Piece {
        Piece::new(Color::new(self).inverse(), PieceType::new(self))
    }
    pub fn is_promotable(self) -> bool {
        PieceType::new(self).is_promotable()
    }
    pub fn to_promote(self) -> Piece {
        debug_assert!(self.is_promotable());
        Piece(self.0 + Piece::PROMOTION)
    }
    pub fn to_demote(self) -> Piece {
        Piece::new(Color::new(self), PieceType::new(self).to_demote())
    }
    pub fn is_king(self) -> bool {
        PieceType::new(self) == PieceType::KING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BitXor, BitXorAssign, Hash)]
pub struct Key(pub u64);

#[test]
fn test_color_inverse() {
    assert_eq!(Color::BLACK.inverse(), Color::WHITE);
    assert_eq!(Color::WHITE.inverse(), Color::BLACK);
}

#[test]
fn test_square_new() {
    assert_eq!(Square::new(File::FILE3, Rank::RANK4), Square::SQ34);
    assert_eq!(Square::SQ11, Square(0));
    assert_eq!(Square::SQ99, Square(80));
    for (i, sq) in Square::ALL.iter().enumerate() {
        assert_eq!(sq.0, i as i32);
        assert_eq!(Square::new(File::new(*sq), Rank::new(*sq)), *sq);
    }
}

#[test]
fn test_square_inverse() {
    assert_eq!(Square::SQ11.inverse(), Square::SQ99);
    assert_eq!(Square::SQ21.inverse(), Square::SQ89);
    for sq in Square::ALL.iter() {
        assert_eq!(sq.inverse().inverse(), *sq);
    }
}

#[test]
fn test_square_checked_add() {
    assert_eq!(Square::SQ55.checked_add(Square::DELTA_N), Some(Square::SQ54));
    assert_eq!(Square::SQ55.checked_add(Square::DELTA_NNE), Some(Square::SQ43));
    assert_eq!(Square::SQ11.checked_add(Square::DELTA_N), None);
    assert_eq!(Square::SQ11.checked_add(Square::DELTA_E), None);
    // SQ19 + DELTA_S would be SQ21 without the edge check.
    assert_eq!(Square::SQ19.checked_add(Square::DELTA_S), None);
    assert_eq!(Square::SQ91.checked_add(Square::DELTA_NW), None);
    assert_eq!(Square::SQ12.checked_add(Square::DELTA_NNW), None);
}

#[test]
fn test_square_usi_string() {
    assert_eq!(Square::SQ11.to_usi_string(), "1a");
    assert_eq!(Square::SQ99.to_usi_string(), "9i");
    assert_eq!(Square::SQ35.to_usi_string(), "3e");
    for sq in Square::ALL.iter() {
        assert_eq!(Square::new_from_usi_str(&sq.to_usi_string()), Some(*sq));
    }
    assert_eq!(Square::new_from_usi_str("0a"), None);
    assert_eq!(Square::new_from_usi_str("1j"), None);
    assert_eq!(Square::new_from_usi_str("1a1"), None);
}

#[test]
fn test_file_rank_inverse() {
    assert_eq!(File::FILE1.inverse(), File::FILE9);
    assert_eq!(Rank::RANK2.inverse(), Rank::RANK8);
    assert_eq!(Rank::RANK1.relative(Color::WHITE), Rank::RANK9);
    assert_eq!(Rank::RANK1.relative(Color::BLACK), Rank::RANK1);
}

#[test]
fn test_is_opponent_field() {
    for r in Rank::ALL.iter() {
        assert_eq!(r.is_opponent_field(Color::BLACK), r.0 <= 2);
        assert_eq!(r.is_opponent_field(Color::WHITE), r.0 >= 6);
    }
}

#[test]
fn test_piece_type_new() {
    assert_eq!(PieceType::PAWN, PieceType::new(Piece::B_PAWN));
    assert_eq!(PieceType::PAWN, PieceType::new(Piece::W_PAWN));
    assert_eq!(PieceType::DRAGON, PieceType::new(Piece::W_DRAGON));
    assert_eq!(Color::new(Piece::W_DRAGON), Color::WHITE);
    assert_eq!(Color::new(Piece::B_HORSE), Color::BLACK);
}

#[test]
fn test_promote_and_demote() {
    for pt in PieceType::ALL.iter() {
        if pt.is_promotable() {
            assert!(pt.to_promote().is_promoted());
            assert_eq!(pt.to_promote().to_demote(), *pt);
        }
    }
    assert!(!PieceType::GOLD.is_promotable());
    assert!(!PieceType::KING.is_promotable());
    assert!(!PieceType::GOLD.is_promoted());
    assert_eq!(PieceType::GOLD.to_demote(), PieceType::GOLD);
    assert_eq!(Piece::W_HORSE.to_demote(), Piece::W_BISHOP);
    assert_eq!(Piece::B_SILVER.to_promote(), Piece::B_PRO_SILVER);
}

#[test]
fn test_piece_usi_string() {
    assert_eq!(Piece::new_from_usi_str("+r"), Some(Piece::W_DRAGON));
    assert_eq!(Piece::new_from_usi_str("K"), Some(Piece::B_KING));
    assert_eq!(Piece::new_from_usi_str("+G"), None);
    assert_eq!(Piece::new_from_usi_str("x"), None);
    assert_eq!(Piece::W_PRO_PAWN.to_usi_string(), "+p");
    assert_eq!(Piece::B_LANCE.to_usi_string(), "L");
    assert_eq!(Piece::B_PAWN.inverse(), Piece::W_PAWN);
}

#[test]
fn test_is_slider() {
    assert!(PieceType::LANCE.is_slider());
    assert!(PieceType::HORSE.is_slider());
    assert!(!PieceType::KNIGHT.is_slider());
    assert!(!PieceType::PRO_LANCE.is_slider());
}

#[test]
fn test_value_to_usi() {
    assert_eq!(Value(123).to_usi(), "cp 123");
    assert_eq!(Value::mate_in(3).to_usi(), "mate 3");
    assert_eq!(Value::mated_in(2).to_usi(), "mate -2");
    assert!(Value::mate_in(1).is_mate_score());
    assert!(!Value(500).is_mate_score());
}

#[test]
fn test_bound() {
    assert!(!Bound::NONE.include_lower());
    assert!(!Bound::NONE.include_upper());
    assert!(Bound::LOWER.include_lower());
    assert!(!Bound::LOWER.include_upper());
    assert!(Bound::UPPER.include_upper());
    assert!(Bound::EXACT.include_lower());
    assert!(Bound::EXACT.include_upper());
}
