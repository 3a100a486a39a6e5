//! Unique identifiers for row groups.
//!
//! Every row that turns out to have children receives a [`GroupGuid`]; its
//! children refer to it as their parent group. The ids only feed
//! accessibility bookkeeping, so all that matters is uniqueness within a
//! generator.
//!
//! Generation is an injected capability ([`IdGenerator`]) rather than a
//! process-wide counter, which keeps the annotator deterministic under test.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier of a sibling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupGuid(u64);

impl GroupGuid {
    /// Wraps a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group-{:08x}", self.0)
    }
}

/// Source of fresh [`GroupGuid`]s.
pub trait IdGenerator: Send + Sync {
    /// Mints an id that this generator has never returned before.
    fn next_id(&self) -> GroupGuid;
}

/// Counter-backed generator; ids start at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Raw value the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> GroupGuid {
        GroupGuid(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> GroupGuid + Send + Sync,
{
    fn next_id(&self) -> GroupGuid {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_unique() {
        let ids = SequentialIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.as_raw(), 1);
        assert_eq!(b.as_raw(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_closure_generator() {
        let generator = || GroupGuid::from_raw(7);
        assert_eq!(generator.next_id(), GroupGuid::from_raw(7));
    }

    #[test]
    fn test_display() {
        assert_eq!(GroupGuid::from_raw(255).to_string(), "group-000000ff");
    }
}
