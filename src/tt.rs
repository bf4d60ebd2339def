use crate::movetypes::*;
use crate::types::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

// One slot is a single u64 so a concurrent reader never sees half a write.
//
// 0x0000_0000_0000_ffff  key16
// 0x0000_0000_ffff_0000  value16
// 0x0000_ffff_0000_0000  move16
// 0x003f_0000_0000_0000  depth6
// 0x00c0_0000_0000_0000  bound2
// 0xff00_0000_0000_0000  generation8
const KEY_SHIFT: u32 = 0;
const VALUE_SHIFT: u32 = 16;
const MOVE_SHIFT: u32 = 32;
const DEPTH_SHIFT: u32 = 48;
const BOUND_SHIFT: u32 = 54;
const GENERATION_SHIFT: u32 = 56;
const DEPTH_MASK: u64 = 0x3f;

const CLUSTER_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtData {
    pub value: Value,
    pub mv: Option<Move>,
    pub depth: Depth,
    pub bound: Bound,
}

impl Default for TtData {
    fn default() -> TtData {
        TtData {
            value: Value::NONE,
            mv: None,
            depth: Depth::ZERO,
            bound: Bound::NONE,
        }
    }
}

fn key16(key: Key) -> u16 {
    (key.0 >> KEY_SHIFT) as u16
}
fn generation_of(raw: u64) -> u8 {
    (raw >> GENERATION_SHIFT) as u8
}
fn decode(raw: u64) -> TtData {
    TtData {
        value: Value(i32::from((raw >> VALUE_SHIFT) as u16 as i16)),
        mv: Move::new_from_u16((raw >> MOVE_SHIFT) as u16),
        depth: Depth(((raw >> DEPTH_SHIFT) & DEPTH_MASK) as i32),
        bound: Bound(((raw >> BOUND_SHIFT) & 0x3) as i32),
    }
}

/// Handle on the slot chosen by a probe. Writing stamps the generation of the probe.
pub struct TtWriter<'a> {
    slot: &'a AtomicU64,
    generation: u8,
}

impl<'a> TtWriter<'a> {
    pub fn write(&self, key: Key, value: Value, mv: Option<Move>, depth: Depth, bound: Bound) {
        debug_assert!(i32::from(i16::MIN) <= value.0 && value.0 <= i32::from(i16::MAX));
        let depth = depth.0.clamp(0, DEPTH_MASK as i32) as u64;
        let raw = (u64::from(key16(key)) << KEY_SHIFT)
            | (u64::from(value.0 as i16 as u16) << VALUE_SHIFT)
            | (u64::from(mv.map_or(0, |m| m.to_u16())) << MOVE_SHIFT)
            | (depth << DEPTH_SHIFT)
            | ((bound.0 as u64 & 0x3) << BOUND_SHIFT)
            | (u64::from(self.generation) << GENERATION_SHIFT);
        self.slot.store(raw, Ordering::Relaxed);
    }
}

#[repr(align(32))]
#[derive(Default)]
struct TtCluster {
    slots: [AtomicU64; CLUSTER_SIZE],
}

static_assertions::const_assert_eq!(std::mem::size_of::<TtCluster>(), 32);

pub struct TranspositionTable {
    table: Vec<TtCluster>,
    generation8: AtomicU8,
    mega_byte_size: usize,
}

impl TranspositionTable {
    pub fn new(mega_byte_size: usize) -> TranspositionTable {
        let cluster_count = (mega_byte_size * 1024 * 1024 / std::mem::size_of::<TtCluster>()).max(1);
        // A large table takes a while to initialize, so build it in parallel.
        let table = (0..cluster_count).into_par_iter().map(|_| TtCluster::default()).collect();
        log::info!("transposition table: {} MB, {} clusters", mega_byte_size, cluster_count);
        TranspositionTable {
            table,
            generation8: AtomicU8::new(1),
            mega_byte_size,
        }
    }
    pub fn resize(&mut self, mega_byte_size: usize) {
        *self = TranspositionTable::new(mega_byte_size);
    }
    pub fn mega_byte_size(&self) -> usize {
        self.mega_byte_size
    }
    pub fn cluster_count(&self) -> usize {
        self.table.len()
    }
    // parallel zero clearing.
    pub fn clear(&mut self) {
        self.table.par_iter_mut().for_each(|cluster| {
            for slot in cluster.slots.iter_mut() {
                *slot.get_mut() = 0;
            }
        });
        *self.generation8.get_mut() = 1;
    }
    /// Starts a new generation. Generation 0 marks empty slots and is skipped.
    pub fn new_search(&self) {
        let mut generation = self.generation8.load(Ordering::Relaxed).wrapping_add(1);
        if generation == 0 {
            generation = 1;
        }
        self.generation8.store(generation, Ordering::Relaxed);
    }
    pub fn generation(&self) -> u8 {
        self.generation8.load(Ordering::Relaxed)
    }
    fn cluster_index(&self, key: Key) -> usize {
        fn mul_hi64(l: u64, r: u64) -> u64 {
            ((u128::from(l) * u128::from(r)) >> 64) as u64
        }
        mul_hi64(key.0, self.table.len() as u64) as usize
    }
    /// Looks `key` up. On a miss the writer points at the slot to replace: the
    /// first empty one, otherwise the one with the oldest generation.
    pub fn probe(&self, key: Key) -> (bool, TtData, TtWriter<'_>) {
        let generation = self.generation();
        let cluster = &self.table[self.cluster_index(key)];
        let raws: [u64; CLUSTER_SIZE] = [
            cluster.slots[0].load(Ordering::Relaxed),
            cluster.slots[1].load(Ordering::Relaxed),
            cluster.slots[2].load(Ordering::Relaxed),
        ];
        let writer = |i: usize| TtWriter {
            slot: &cluster.slots[i],
            generation,
        };
        let target = key16(key);
        if let Some(i) = raws
            .iter()
            .position(|&raw| generation_of(raw) != 0 && (raw >> KEY_SHIFT) as u16 == target)
        {
            return (true, decode(raws[i]), writer(i));
        }
        if let Some(i) = raws.iter().position(|&raw| generation_of(raw) == 0) {
            return (false, TtData::default(), writer(i));
        }
        let relative_age = |raw: u64| {
            let g = i32::from(generation_of(raw));
            if g > i32::from(generation) {
                g - 255
            } else {
                g
            }
        };
        let mut replace = 0;
        for i in 1..CLUSTER_SIZE {
            if relative_age(raws[i]) < relative_age(raws[replace]) {
                replace = i;
            }
        }
        (false, TtData::default(), writer(replace))
    }
    /// Permille of sampled slots written in the current generation.
    pub fn hashfull(&self) -> usize {
        let generation = self.generation();
        let samples = self.table.len().min(1000);
        let used: usize = self.table[..samples]
            .iter()
            .map(|cluster| {
                cluster
                    .slots
                    .iter()
                    .filter(|slot| generation_of(slot.load(Ordering::Relaxed)) == generation)
                    .count()
            })
            .sum();
        used * 1000 / (samples * CLUSTER_SIZE)
    }
}

#[cfg(test)]
fn same_cluster_key(rng: &mut rand::rngs::StdRng, tt: &TranspositionTable, index: usize) -> Key {
    use rand::Rng;
    loop {
        let key = Key(rng.gen());
        if tt.cluster_index(key) == index {
            return key;
        }
    }
}

#[test]
fn test_size() {
    assert_eq!(std::mem::size_of::<TtCluster>(), 32);
    assert_eq!(std::mem::size_of::<[TtCluster; 4]>(), 128);
    let tt = TranspositionTable::new(1);
    assert_eq!(tt.cluster_count(), 1024 * 1024 / 32);
    assert_eq!(tt.mega_byte_size(), 1);
}

#[test]
fn test_cluster_index() {
    let tt = TranspositionTable::new(1);
    // If key is all 1 bits, index is max.
    assert_eq!(tt.cluster_index(Key(0xffff_ffff_ffff_ffff)), tt.cluster_count() - 1);
    assert_eq!(tt.cluster_index(Key(0)), 0);
}

#[test]
fn test_probe_and_write() {
    let tt = TranspositionTable::new(1);
    let key = Key(0x0123_4567_89ab_cdef);
    let (found, data, writer) = tt.probe(key);
    assert!(!found);
    assert_eq!(data, TtData::default());
    let m = Move::new_drop(PieceType::GOLD, Square::SQ55);
    writer.write(key, Value(-1234), Some(m), Depth(17), Bound::LOWER);
    let (found, data, _) = tt.probe(key);
    assert!(found);
    assert_eq!(
        data,
        TtData {
            value: Value(-1234),
            mv: Some(m),
            depth: Depth(17),
            bound: Bound::LOWER,
        }
    );
    // Mate scores survive the 16-bit field.
    let (_, _, writer) = tt.probe(key);
    writer.write(key, Value::mated_in(3), None, Depth(63), Bound::EXACT);
    let (found, data, _) = tt.probe(key);
    assert!(found);
    assert_eq!(data.value, Value::mated_in(3));
    assert_eq!(data.mv, None);
    assert_eq!(data.depth, Depth(63));
}

#[test]
fn test_replacement() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(123);
    let tt = TranspositionTable::new(1);
    let index = tt.cluster_index(Key(0x0123_4567_89ab_cdef));
    let keys: Vec<Key> = (0..3).map(|_| same_cluster_key(&mut rng, &tt, index)).collect();
    for (i, &key) in keys.iter().enumerate() {
        let (found, _, writer) = tt.probe(key);
        assert!(!found);
        writer.write(key, Value(i as i32), None, Depth(9), Bound::EXACT);
        tt.new_search();
    }
    // Every slot is taken. The oldest entry is replaced.
    let key = same_cluster_key(&mut rng, &tt, index);
    let (found, _, writer) = tt.probe(key);
    assert!(!found);
    writer.write(key, Value(3), None, Depth(1), Bound::EXACT);
    assert!(!tt.probe(keys[0]).0);
    assert!(tt.probe(keys[1]).0);
    assert!(tt.probe(keys[2]).0);
    assert!(tt.probe(key).0);
}

#[test]
fn test_generation_skips_zero() {
    let tt = TranspositionTable::new(1);
    let mut seen_wrap = false;
    for _ in 0..600 {
        let before = tt.generation();
        tt.new_search();
        assert_ne!(tt.generation(), 0);
        if tt.generation() < before {
            assert_eq!(tt.generation(), 1);
            seen_wrap = true;
        }
    }
    assert!(seen_wrap);
}

#[test]
fn test_clear_and_hashfull() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut tt = TranspositionTable::new(1);
    assert_eq!(tt.hashfull(), 0);
    for _ in 0..200_000 {
        let key = Key(rng.gen());
        let (_, _, writer) = tt.probe(key);
        writer.write(key, Value(1), None, Depth(1), Bound::EXACT);
    }
    assert!(tt.hashfull() > 500);
    tt.new_search();
    assert_eq!(tt.hashfull(), 0);
    tt.clear();
    let key = Key(rng.gen());
    assert!(!tt.probe(key).0);
}

#[test]
fn test_concurrent_writes_are_not_torn() {
    let tt = TranspositionTable::new(1);
    let key = Key(0xdead_beef_0000_0001);
    (1..64).into_par_iter().for_each(|d| {
        for _ in 0..1000 {
            let (found, data, writer) = tt.probe(key);
            if found {
                assert_eq!(data.value.0, data.depth.0 * 10);
            }
            writer.write(key, Value(d * 10), None, Depth(d), Bound::EXACT);
        }
    });
}
