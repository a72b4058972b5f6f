//! Tree-wide ordering tokens

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter shared by every engine of one tree
///
/// Only the root engine owns an indexer. Child engines reach it through
/// [`super::NavigationEngine::root`], so two independent trees never share
/// tokens.
#[derive(Debug, Default)]
pub struct OrderingIndexer {
    next: AtomicU64,
}

impl OrderingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next token
    pub fn next_token(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Value the next call to [`Self::next_token`] will return
    pub fn peek_next(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    pub fn restore(&self, next: u64) {
        self.next.store(next, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_ascend() {
        let indexer = OrderingIndexer::new();
        let first = indexer.next_token();
        let second = indexer.next_token();
        assert!(second > first);
        assert_eq!(indexer.peek_next(), second + 1);
    }

    #[test]
    fn test_restore_continues_sequence() {
        let indexer = OrderingIndexer::new();
        indexer.restore(41);
        assert_eq!(indexer.next_token(), 41);
        assert_eq!(indexer.next_token(), 42);
    }
}
