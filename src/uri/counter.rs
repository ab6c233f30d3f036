//! Shared state of URI generation

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Sequence numbers scoped by (entity kind, year).
///
/// `next` increments and reads under one lock, so two callers never receive the same number
/// for the same key. A sequence counts from 1 until it is seeded with the last number used
/// in the store.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    last: Mutex<HashMap<(String, i32), u64>>,
    seeded: Mutex<HashSet<(String, i32)>>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number of the sequence, starting at 1
    pub fn next(&self, kind: &str, year: i32) -> u64 {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = last.entry((kind.to_string(), year)).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Raise the last used number of a sequence, never lowering it
    pub fn seed(&self, kind: &str, year: i32, last_used: u64) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = last.entry((kind.to_string(), year)).or_insert(0);
        *counter = (*counter).max(last_used);
        self.seeded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((kind.to_string(), year));
    }

    pub fn is_seeded(&self, kind: &str, year: i32) -> bool {
        let seeded = self.seeded.lock().unwrap_or_else(PoisonError::into_inner);
        seeded.contains(&(kind.to_string(), year))
    }

    pub fn current(&self, kind: &str, year: i32) -> u64 {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.get(&(kind.to_string(), year)).copied().unwrap_or(0)
    }
}

/// One (kind, year) sequence of a counter, with the URI stem its numbers are appended to
#[derive(Debug, Clone)]
pub struct SequenceScope {
    stem: String,
    kind: String,
    year: i32,
    counter: Arc<SequenceCounter>,
}

impl SequenceScope {
    pub fn new(stem: String, kind: &str, year: i32, counter: &Arc<SequenceCounter>) -> Self {
        Self {
            stem,
            kind: kind.to_string(),
            year,
            counter: Arc::clone(counter),
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn is_seeded(&self) -> bool {
        self.counter.is_seeded(&self.kind, self.year)
    }

    pub fn seed(&self, last_used: u64) {
        self.counter.seed(&self.kind, self.year, last_used)
    }

    /// Sequence number of a URI of this scope, `None` for other URIs
    pub fn number_of(&self, uri: &str) -> Option<u64> {
        uri.strip_prefix(&self.stem)?.parse().ok()
    }
}

/// One lock per URI prefix, serializing check-then-create sequences within the process
#[derive(Debug, Default)]
pub struct UriLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UriLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, prefix: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(prefix.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_sequence_scoped_by_kind_and_year() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.next("event", 2024), 1);
        assert_eq!(counter.next("event", 2024), 2);
        assert_eq!(counter.next("event", 2025), 1);
        assert_eq!(counter.next("device", 2024), 1);

        assert!(!counter.is_seeded("event", 2024));
        counter.seed("event", 2024, 10);
        counter.seed("event", 2024, 3);
        assert!(counter.is_seeded("event", 2024));
        assert!(!counter.is_seeded("event", 2025));
        assert_eq!(counter.current("event", 2024), 10);
        assert_eq!(counter.next("event", 2024), 11);
    }

    #[test]
    fn test_scope_reads_numbers_under_its_stem() {
        let counter = Arc::new(SequenceCounter::new());
        let scope = SequenceScope::new("http://x.org/id/event/2024/ev24".to_string(), "event", 2024, &counter);
        assert_eq!(scope.number_of("http://x.org/id/event/2024/ev24000042"), Some(42));
        assert_eq!(scope.number_of("http://x.org/id/event/2024/ev24000042-1"), None);
        assert_eq!(scope.number_of("http://x.org/id/event/2023/ev23000042"), None);

        scope.seed(42);
        assert!(scope.is_seeded());
        assert_eq!(counter.next("event", 2024), 43);
    }

    #[test]
    fn test_concurrent_next_is_unique() {
        let counter = SequenceCounter::new();
        let numbers = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| (0..50).map(|_| counter.next("k", 2024)).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        let unique: HashSet<_> = numbers.iter().collect();
        assert_eq!(unique.len(), 400);
    }

    #[test]
    fn test_same_prefix_shares_lock() {
        let locks = UriLocks::new();
        let a = locks.lock_for("http://x.org/id/unit/");
        let b = locks.lock_for("http://x.org/id/unit/");
        let c = locks.lock_for("http://x.org/id/event/");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
