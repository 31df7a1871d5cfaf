//! Benchmark workloads for the husk runtime substrate.
//!
//! - [`churn_ops`]: the deterministic allocate/resize/free mix the drain
//!   tests use, pre-generated so benchmarks time only the heap
//! - [`run_churn`]: replay a workload against a heap and drain it
//! - [`decimal_corpus`]: literals spread across the whole binary64 range

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use husk_core::OsShim;
use husk_heap::{Heap, HeapPtr};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a churn workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnOp {
    /// Resize the slot's allocation (allocating if the slot is empty).
    Resize {
        /// Slot index.
        slot: usize,
        /// New size in bytes.
        size: usize,
    },
    /// Free the slot's allocation, then optionally allocate a new one.
    Replace {
        /// Slot index.
        slot: usize,
        /// Size of the replacement, if any.
        size: Option<usize>,
    },
}

/// Generate `rounds` operations over `slots` slots.
///
/// Sizes are `mantissa << shift` with an 8-bit mantissa and a shift below
/// 8, so they span `0..=32640` with a bias toward small requests. About
/// one op in twenty resizes; most of the rest free and reallocate.
pub fn churn_ops(seed: u64, slots: usize, rounds: usize) -> Vec<ChurnOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rounds)
        .map(|_| {
            let slot = rng.random_range(0..slots);
            let op = rng.random_range(0..64u32);
            let size = rng.random_range(0..256usize) << rng.random_range(0..8u32);
            if op <= 2 {
                ChurnOp::Resize { slot, size }
            } else {
                ChurnOp::Replace {
                    slot,
                    size: (op > 16).then_some(size),
                }
            }
        })
        .collect()
}

/// Replay `ops` against `heap`, then free everything that is still live.
///
/// Returns the peak number of live allocations. Allocation failures leave
/// the slot empty.
pub fn run_churn<S: OsShim>(heap: &mut Heap<S>, slots: usize, ops: &[ChurnOp]) -> usize {
    let mut live: Vec<Option<HeapPtr>> = vec![None; slots];
    let mut peak = 0;
    for &op in ops {
        match op {
            ChurnOp::Resize { slot, size } => {
                if let Ok(ptr) = heap.resize(live[slot], size) {
                    live[slot] = ptr;
                }
            }
            ChurnOp::Replace { slot, size } => {
                heap.free(live[slot].take());
                if let Some(size) = size {
                    live[slot] = heap.allocate(size).ok();
                }
            }
        }
        peak = peak.max(heap.stats().allocations_live);
    }
    for ptr in live {
        heap.free(ptr);
    }
    peak
}

/// `count` decimal literals: 17 significant digits and exponents across
/// the finite binary64 range, with a few subnormals and long inputs.
pub fn decimal_corpus(seed: u64, count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let mantissa = rng.random_range(10_000_000_000_000_000u64..100_000_000_000_000_000);
            let exponent = rng.random_range(-340i32..=300);
            if i % 16 == 0 {
                // Long tail forces the exact path.
                format!("{mantissa}{:0>40}e{}", mantissa % 1000, exponent - 56)
            } else {
                let scale = 10u64.pow(16);
                format!("{}.{:016}e{exponent}", mantissa / scale, mantissa % scale)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use husk_heap::HeapConfig;
    use husk_test_utils::MockShim;

    #[test]
    fn churn_ops_are_deterministic() {
        assert_eq!(churn_ops(7, 64, 500), churn_ops(7, 64, 500));
        assert_ne!(churn_ops(7, 64, 500), churn_ops(8, 64, 500));
    }

    #[test]
    fn churn_sizes_stay_in_range() {
        for op in churn_ops(1, 16, 5000) {
            let size = match op {
                ChurnOp::Resize { size, .. } => Some(size),
                ChurnOp::Replace { size, .. } => size,
            };
            assert!(size.unwrap_or(0) <= 32640);
        }
    }

    #[test]
    fn run_churn_drains() {
        let mut heap = Heap::new(MockShim::default(), HeapConfig::checked()).unwrap();
        let ops = churn_ops(3, 128, 2000);
        let peak = run_churn(&mut heap, 128, &ops);
        assert!(peak > 0);
        assert_eq!(heap.arena_count(), 0);
        assert_eq!(heap.stats().os_allocations, heap.stats().os_frees);
    }

    #[test]
    fn corpus_parses_with_std() {
        for text in decimal_corpus(5, 200) {
            let value: f64 = text.parse().unwrap();
            assert!(value.is_finite(), "{text}");
        }
    }
}
