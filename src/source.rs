//! Candidate supply for the generator loop.
//!
//! The original search enumerates exponents forever; abstracting the supply
//! lets tests feed a finite range through the same pool. Any
//! `Iterator<Item = u64>` works: `start..` is the unbounded ascending
//! search, `2..200` a finite prefix.

/// A restartable, possibly-infinite sequence of candidate exponents.
pub trait CandidateSource {
    fn next_candidate(&mut self) -> Option<u64>;
}

impl<I: Iterator<Item = u64>> CandidateSource for I {
    fn next_candidate(&mut self) -> Option<u64> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_a_source() {
        let mut source = 2..5u64;
        assert_eq!(source.next_candidate(), Some(2));
        assert_eq!(source.next_candidate(), Some(3));
        assert_eq!(source.next_candidate(), Some(4));
        assert_eq!(source.next_candidate(), None);
    }

    #[test]
    fn test_unbounded_source_ascends() {
        let mut source = 1u64..;
        assert_eq!(source.next_candidate(), Some(1));
        assert_eq!(source.next_candidate(), Some(2));
    }
}
