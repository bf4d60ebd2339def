use crate::movetypes::*;
use crate::position::*;
use crate::types::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("cannot read book file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("broken book file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("book entries are not sorted by key")]
    Unsorted,
}

const MOVE_BITS: u32 = 16;
const COUNT_BITS: u32 = 5;
const COUNT_SHIFT: u32 = 48;
const MOVES_PER_ENTRY: usize = 3;

// data layout
// 0x0000_0000_0000_ffff  move 0
// 0x0000_0000_ffff_0000  move 1
// 0x0000_ffff_0000_0000  move 2
// 0x001f_0000_0000_0000  count 0
// 0x03e0_0000_0000_0000  count 1
// 0x7c00_0000_0000_0000  count 2
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BookEntry {
    pub key: u64,
    pub data: u64,
}

impl BookEntry {
    pub const MAX_COUNT: u32 = (1 << COUNT_BITS) - 1;

    pub fn new(key: Key) -> BookEntry {
        BookEntry { key: key.0, data: 0 }
    }
    pub fn move_at(&self, i: usize) -> Option<Move> {
        debug_assert!(i < MOVES_PER_ENTRY);
        Move::new_from_u16((self.data >> (MOVE_BITS * i as u32)) as u16)
    }
    pub fn count_at(&self, i: usize) -> u32 {
        debug_assert!(i < MOVES_PER_ENTRY);
        ((self.data >> (COUNT_SHIFT + COUNT_BITS * i as u32)) & u64::from(BookEntry::MAX_COUNT)) as u32
    }
    fn set_move(&mut self, i: usize, m: Move) {
        let shift = MOVE_BITS * i as u32;
        self.data = (self.data & !(0xffff << shift)) | (u64::from(m.to_u16()) << shift);
    }
    fn set_count(&mut self, i: usize, count: u32) {
        let shift = COUNT_SHIFT + COUNT_BITS * i as u32;
        let mask = u64::from(BookEntry::MAX_COUNT) << shift;
        self.data = (self.data & !mask) | (u64::from(count.min(BookEntry::MAX_COUNT)) << shift);
    }
    /// Counts one more occurrence of `m`. Returns false when all move slots hold other moves.
    pub fn add_move(&mut self, m: Move) -> bool {
        for i in 0..MOVES_PER_ENTRY {
            match self.move_at(i) {
                Some(x) if x == m => {
                    // saturating
                    self.set_count(i, self.count_at(i) + 1);
                    return true;
                }
                Some(_) => {}
                None => {
                    self.set_move(i, m);
                    self.set_count(i, 1);
                    return true;
                }
            }
        }
        false
    }
    pub fn candidates(&self) -> impl Iterator<Item = (Move, u32)> + '_ {
        (0..MOVES_PER_ENTRY).filter_map(move |i| self.move_at(i).map(|m| (m, self.count_at(i))))
    }
    /// Picks a move with probability proportional to its count.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        let sum: u32 = self.candidates().map(|(_, count)| count).sum();
        if sum == 0 {
            return None;
        }
        let mut num = rng.gen_range(0..sum);
        for (m, count) in self.candidates() {
            if num < count {
                return Some(m);
            }
            num -= count;
        }
        None
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Book(Vec<BookEntry>);

impl Book {
    pub fn new() -> Book {
        Book(Vec::new())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn find(&self, key: Key) -> Option<&BookEntry> {
        self.0
            .binary_search_by_key(&key.0, |entry| entry.key)
            .ok()
            .map(|i| &self.0[i])
    }
    /// Records that `m` was played from the position with `key`.
    pub fn insert(&mut self, key: Key, m: Move) -> bool {
        match self.0.binary_search_by_key(&key.0, |entry| entry.key) {
            Ok(i) => self.0[i].add_move(m),
            Err(i) => {
                let mut entry = BookEntry::new(key);
                entry.add_move(m);
                self.0.insert(i, entry);
                true
            }
        }
    }
    /// A book move for `pos`. `None` on a miss or when the sampled move is not legal here.
    pub fn probe<R: Rng + ?Sized>(&self, pos: &Position, rng: &mut R) -> Option<Move> {
        let m = self.find(pos.key())?.sample(rng)?;
        if pos.pseudo_legal(m) && pos.is_legal(m) {
            Some(m)
        } else {
            log::warn!("illegal book move {} for {}", m.to_usi_string(), pos.to_sfen());
            None
        }
    }
    pub fn from_file(path: &str) -> Result<Book, BookError> {
        let file = std::fs::File::open(path).map_err(|source| BookError::Io {
            path: path.to_string(),
            source,
        })?;
        let book: Book = serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| BookError::Json {
            path: path.to_string(),
            source,
        })?;
        if book.0.windows(2).any(|w| w[0].key >= w[1].key) {
            return Err(BookError::Unsorted);
        }
        Ok(book)
    }
    pub fn to_file(&self, path: &str) -> Result<(), BookError> {
        let file = std::fs::File::create(path).map_err(|source| BookError::Io {
            path: path.to_string(),
            source,
        })?;
        serde_json::to_writer(std::io::BufWriter::new(file), self).map_err(|source| BookError::Json {
            path: path.to_string(),
            source,
        })
    }
}

#[test]
fn test_book_entry_add_move() {
    let pos = Position::new();
    let m0 = Move::new_from_usi_str("7g7f", &pos).unwrap();
    let m1 = Move::new_from_usi_str("2g2f", &pos).unwrap();
    let m2 = Move::new_from_usi_str("5i6h", &pos).unwrap();
    let m3 = Move::new_from_usi_str("1g1f", &pos).unwrap();
    let mut entry = BookEntry::new(pos.key());
    assert!(entry.add_move(m0));
    assert!(entry.add_move(m1));
    assert!(entry.add_move(m1));
    assert!(entry.add_move(m2));
    // No slot is left.
    assert!(!entry.add_move(m3));
    assert_eq!(entry.candidates().collect::<Vec<_>>(), vec![(m0, 1), (m1, 2), (m2, 1)]);
    for _ in 0..100 {
        entry.add_move(m0);
    }
    assert_eq!(entry.count_at(0), BookEntry::MAX_COUNT);
    // Saturating one count leaves the neighbours alone.
    assert_eq!(entry.count_at(1), 2);
    assert_eq!(entry.move_at(2), Some(m2));
    assert_eq!(entry.data >> 63, 0);
}

#[test]
fn test_book_insert_keeps_order() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    let pos = Position::new();
    let m = Move::new_from_usi_str("7g7f", &pos).unwrap();
    let mut book = Book::new();
    for _ in 0..200 {
        book.insert(Key(rng.gen()), m);
    }
    book.insert(pos.key(), m);
    book.insert(pos.key(), m);
    assert_eq!(book.len(), 201);
    assert!(book.0.windows(2).all(|w| w[0].key < w[1].key));
    assert_eq!(book.find(pos.key()).unwrap().count_at(0), 2);
}

#[test]
fn test_book_probe() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let mut pos = Position::new();
    let m26 = Move::new_from_usi_str("2g2f", &pos).unwrap();
    let m76 = Move::new_from_usi_str("7g7f", &pos).unwrap();
    let mut book = Book::new();
    for _ in 0..21 {
        book.insert(pos.key(), m26);
    }
    for _ in 0..9 {
        book.insert(pos.key(), m76);
    }
    let mut count26 = 0;
    for _ in 0..3000 {
        match book.probe(&pos, &mut rng) {
            Some(m) if m == m26 => count26 += 1,
            Some(m) => assert_eq!(m, m76),
            None => unreachable!(),
        }
    }
    // 70 percent expected
    assert!((1900..2300).contains(&count26), "{}", count26);

    // miss
    pos.do_move(m76);
    assert_eq!(book.probe(&pos, &mut rng), None);

    // A move that is not legal in the stored position is rejected.
    let mut book = Book::new();
    let illegal = Move::new_unpromote(Square::SQ55, Square::SQ54);
    book.insert(pos.key(), illegal);
    assert_eq!(book.probe(&pos, &mut rng), None);
}

#[test]
fn test_book_file() {
    let pos = Position::new();
    let mut book = Book::new();
    book.insert(pos.key(), Move::new_from_usi_str("7g7f", &pos).unwrap());
    let path = std::env::temp_dir().join(format!("tsubame_book_{}.json", std::process::id()));
    let path = path.to_str().unwrap();
    book.to_file(path).unwrap();
    assert_eq!(Book::from_file(path).unwrap(), book);
    std::fs::write(path, "{").unwrap();
    assert!(matches!(Book::from_file(path), Err(BookError::Json { .. })));
    std::fs::remove_file(path).unwrap();
    assert!(matches!(Book::from_file(path), Err(BookError::Io { .. })));
}
