//! # Quorum Threshold
//!
//! k-of-n acceptance rule used by validator-set implementations.

use crate::domain::{invariant_quorum_threshold, InteropError};
use serde::{Deserialize, Serialize};

/// Acceptance requires `required` of `total` validators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumThreshold {
    required: usize,
    total: usize,
}

impl QuorumThreshold {
    /// Create a threshold; fails unless `1 <= required <= total`.
    pub fn new(required: usize, total: usize) -> Result<Self, InteropError> {
        invariant_quorum_threshold(required, total)?;
        Ok(Self { required, total })
    }

    /// Attestations required.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Validator-set size.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Check if `votes` satisfy the threshold.
    pub fn is_met(&self, votes: usize) -> bool {
        votes >= self.required
    }
}

/// Count approvals in a vote set.
pub fn count_approvals<I>(votes: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    votes.into_iter().filter(|v| *v).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(QuorumThreshold::new(1, 1).is_ok());
        assert!(QuorumThreshold::new(0, 3).is_err());
        assert!(QuorumThreshold::new(4, 3).is_err());
    }

    #[test]
    fn test_is_met() {
        let q = QuorumThreshold::new(2, 3).unwrap();
        assert!(!q.is_met(1));
        assert!(q.is_met(2));
        assert!(q.is_met(3));
    }

    #[test]
    fn test_count_approvals() {
        assert_eq!(count_approvals([true, false, true, true]), 3);
        assert_eq!(count_approvals(Vec::<bool>::new()), 0);
    }
}
