use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::decoration_handle::DecorationHandle;
use crate::shared::clock_seed::clock_seed;

/// Smallest pool for which the half-pool bias is meaningful.
pub const MIN_DECORATIONS: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RotationError {
    #[error("decoration rotation needs at least {MIN_DECORATIONS} decorations, got {0}")]
    TooFewDecorations(usize),
}

/// Cycles decoration handles with randomness biased away from recent picks.
///
/// Each pick comes from the first half of the current ordering and is then
/// moved to the back, so a handle cannot come up again until at least half
/// the pool has been handed out.
#[derive(Debug)]
pub struct DecorationRotation {
    order: Vec<DecorationHandle>,
    rng: StdRng,
}

impl DecorationRotation {
    pub fn new(handles: Vec<DecorationHandle>, rng: StdRng) -> Result<Self, RotationError> {
        if handles.len() < MIN_DECORATIONS {
            return Err(RotationError::TooFewDecorations(handles.len()));
        }
        Ok(Self { order: handles, rng })
    }

    pub fn with_seed(handles: Vec<DecorationHandle>, seed: u64) -> Result<Self, RotationError> {
        Self::new(handles, StdRng::seed_from_u64(seed))
    }

    /// Seeds from the wall clock; call once per process.
    pub fn from_clock(handles: Vec<DecorationHandle>) -> Result<Self, RotationError> {
        Self::with_seed(handles, clock_seed())
    }

    pub fn next(&mut self) -> DecorationHandle {
        let index = self.rng.gen_range(0..self.order.len() / 2);
        let handle = self.order.remove(index);
        self.order.push(handle);
        handle
    }

    /// Discards `picks` draws to shuffle the initial ordering.
    pub fn warm_up(&mut self, picks: usize) {
        for _ in 0..picks {
            self.next();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Current ordering, least recently picked first.
    pub fn order(&self) -> &[DecorationHandle] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn handles(count: u32) -> Vec<DecorationHandle> {
        (0..count).map(DecorationHandle::new).collect()
    }

    #[rstest]
    #[case::empty(0)]
    #[case::single(1)]
    fn test_rejects_tiny_pools(#[case] count: u32) {
        let result = DecorationRotation::with_seed(handles(count), 1);
        assert_eq!(
            result.unwrap_err(),
            RotationError::TooFewDecorations(count as usize)
        );
    }

    #[test]
    fn test_two_handles_alternate() {
        // len / 2 == 1: always the front handle, which then moves back
        let mut rotation = DecorationRotation::with_seed(handles(2), 5).unwrap();
        let picks: Vec<u32> = (0..6).map(|_| rotation.next().id()).collect();
        assert_eq!(picks, vec![0, 1, 0, 1, 0, 1]);
    }

    #[rstest]
    #[case(2)]
    #[case(5)]
    #[case(14)]
    #[case(31)]
    fn test_no_repeat_within_half_pool(#[case] count: u32) {
        for seed in 0..50 {
            let mut rotation = DecorationRotation::with_seed(handles(count), seed).unwrap();
            rotation.warm_up(seed as usize);
            let mut seen = HashSet::new();
            for _ in 0..count / 2 {
                assert!(seen.insert(rotation.next()));
            }
        }
    }

    #[test]
    fn test_picked_handle_moves_to_back() {
        let mut rotation = DecorationRotation::with_seed(handles(8), 42).unwrap();
        let picked = rotation.next();
        assert_eq!(*rotation.order().last().unwrap(), picked);
        assert_eq!(rotation.len(), 8);
    }

    #[test]
    fn test_ordering_stays_a_permutation() {
        let mut rotation = DecorationRotation::with_seed(handles(14), 9).unwrap();
        rotation.warm_up(100);
        let mut ids: Vec<u32> = rotation.order().iter().map(|h| h.id()).collect();
        ids.sort();
        assert_eq!(ids, (0..14).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_picks() {
        let picks = |seed| {
            let mut rotation = DecorationRotation::with_seed(handles(10), seed).unwrap();
            (0..20).map(|_| rotation.next()).collect::<Vec<_>>()
        };
        assert_eq!(picks(17), picks(17));
    }

    #[test]
    fn test_from_clock_accepts_valid_pool() {
        let rotation = DecorationRotation::from_clock(handles(3)).unwrap();
        assert_eq!(rotation.len(), 3);
        assert!(!rotation.is_empty());
    }
}
