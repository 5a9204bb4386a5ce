//! Implements the transposition table.

use crate::depth::Depth;
use crate::moves::Move;
use crate::value::Value;


/// `BOUND_EXACT`, `BOUND_LOWER`, or `BOUND_UPPER`.
pub type BoundType = u8;

/// The stored value is exact.
pub const BOUND_EXACT: BoundType = 0;

/// The stored value is a lower bound (the search failed high).
pub const BOUND_LOWER: BoundType = 1;

/// The stored value is an upper bound (the search failed low).
pub const BOUND_UPPER: BoundType = 2;


/// A transposition table entry.
#[derive(Clone, Copy)]
pub struct TtEntry {
    pub key: u64,
    pub depth: Depth,
    pub value: Value,
    pub bound: BoundType,
    pub best_move: Move,
    pub age: u8,
}


/// A fixed-size transposition table.
///
/// The transposition table caches the results of previously performed
/// searches, so that when the same position is reached again by a
/// different move order, the work does not have to be repeated. Each
/// entry remembers the searched depth, the obtained value together
/// with its bound type, and the best move found. Entries carry the
/// age of the search that wrote them, so that entries from earlier
/// searches can be recycled first.
pub struct Tt {
    entries: Vec<TtEntry>,
    age: u8,
}

impl Tt {
    /// The default table size in megabytes.
    pub const DEFAULT_SIZE_MB: usize = 128;

    /// Creates a new instance.
    ///
    /// `size_mb` is the size of the table in megabytes (`None` for
    /// the default). Running out of memory here aborts the process.
    pub fn new(size_mb: Option<usize>) -> Tt {
        let size_mb = size_mb.unwrap_or(Tt::DEFAULT_SIZE_MB).max(1);
        let entry_count = size_mb * 1024 * 1024 / std::mem::size_of::<TtEntry>();
        Tt {
            entries: vec![TtEntry {
                              key: 0,
                              depth: 0,
                              value: 0,
                              bound: BOUND_EXACT,
                              best_move: Move::invalid(),
                              age: 0,
                          };
                          entry_count],
            age: 0,
        }
    }

    /// Signals that a new search is about to begin.
    ///
    /// The age counter increments monotonically (with wrapping); it
    /// is consulted by the replacement strategy.
    #[inline]
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    /// Returns the entry for a given key, if present.
    #[inline]
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        let entry = self.entries[key as usize % self.entries.len()];
        if entry.key == key {
            Some(entry)
        } else {
            None
        }
    }

    /// Stores an entry for a given key.
    ///
    /// The slot is overwritten when it is empty, when it holds the
    /// same position, when the new depth is not smaller than the
    /// stored depth, or when the stored entry comes from an earlier
    /// search.
    pub fn store(&mut self, key: u64, depth: Depth, value: Value, bound: BoundType, best_move: Move) {
        let age = self.age;
        let len = self.entries.len();
        let entry = &mut self.entries[key as usize % len];
        if entry.key == 0 || entry.key == key || entry.depth <= depth || entry.age != age {
            *entry = TtEntry {
                key,
                depth,
                value,
                bound,
                best_move,
                age,
            };
        }
    }

    /// Removes all entries from the table.
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.key = 0;
            entry.best_move = Move::invalid();
        }
        self.age = 0;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::*;

    #[test]
    fn store_and_probe() {
        let mut tt = Tt::new(Some(1));
        assert!(tt.probe(42).is_none());
        tt.store(42, 5, 100, BOUND_EXACT, Move::new(E2, E4));
        let entry = tt.probe(42).unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.value, 100);
        assert_eq!(entry.bound, BOUND_EXACT);
        assert_eq!(entry.best_move, Move::new(E2, E4));
        tt.clear();
        assert!(tt.probe(42).is_none());
    }

    #[test]
    fn deeper_entries_replace_shallower_ones() {
        let mut tt = Tt::new(Some(1));
        tt.store(42, 3, 100, BOUND_EXACT, Move::new(E2, E4));
        tt.store(42, 7, 200, BOUND_LOWER, Move::new(D2, D4));
        let entry = tt.probe(42).unwrap();
        assert_eq!(entry.depth, 7);
        assert_eq!(entry.value, 200);
    }

    #[test]
    fn old_entries_are_recycled() {
        let mut tt = Tt::new(Some(1));
        tt.new_search();
        tt.store(42, 9, 100, BOUND_EXACT, Move::new(E2, E4));
        tt.new_search();
        // A shallower entry from a newer search replaces a colliding
        // old one.
        let colliding_key = 42 + tt.entries.len() as u64;
        tt.store(colliding_key, 1, -50, BOUND_UPPER, Move::new(D2, D4));
        assert!(tt.probe(42).is_none());
        assert_eq!(tt.probe(colliding_key).unwrap().value, -50);
    }
}
