//! Command tag generation.
//!
//! Tags pair a command with its terminating status response. They must
//! never collide with the untagged indicator `*` or the continuation
//! indicator `+`, so they are formed from a fixed letter prefix and a
//! strictly increasing zero-padded counter: `c0000001`, `c0000002`, ...

use std::sync::atomic::{AtomicU32, Ordering};

/// Generator of unique, strictly increasing command tags.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a generator with the given prefix letter.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix,
        }
    }

    /// Returns the next tag.
    ///
    /// # Panics
    ///
    /// Panics if the counter would overflow, which would re-issue tag
    /// values within the connection's lifetime.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        assert!(n != u32::MAX, "tag counter overflow");
        format!("{}{:07}", self.prefix, n + 1)
    }

    /// Returns how many tags have been issued.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('c')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_format() {
        let tags = TagGenerator::default();
        assert_eq!(tags.next(), "c0000001");
        assert_eq!(tags.next(), "c0000002");
        assert_eq!(tags.next(), "c0000003");
    }

    #[test]
    fn test_custom_prefix() {
        let tags = TagGenerator::new('t');
        assert_eq!(tags.next(), "t0000001");
    }

    #[test]
    fn test_strictly_increasing() {
        let tags = TagGenerator::default();
        let mut seen = std::collections::HashSet::new();
        let mut previous = String::new();
        for _ in 0..1000 {
            let tag = tags.next();
            assert!(tag > previous, "tags must increase");
            assert!(seen.insert(tag.clone()), "tag reused");
            previous = tag;
        }
        assert_eq!(tags.issued(), 1000);
    }

    #[test]
    fn test_never_collides_with_indicators() {
        let tags = TagGenerator::default();
        for _ in 0..100 {
            let tag = tags.next();
            assert_ne!(tag, "*");
            assert_ne!(tag, "+");
        }
    }
}
