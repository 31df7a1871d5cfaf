//! Property tests: arbitrary operation sequences keep live blocks disjoint
//! and leave the heap structurally valid.

use husk_heap::{Heap, HeapConfig, HeapPtr};
use husk_test_utils::MockShim;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Allocate(usize),
    Resize(usize, usize),
    Free(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3000).prop_map(Op::Allocate),
        (any::<usize>(), 0usize..3000).prop_map(|(i, n)| Op::Resize(i, n)),
        any::<usize>().prop_map(Op::Free),
    ]
}

fn small_heap() -> Heap<MockShim> {
    let config = HeapConfig {
        min_arena_size: 2048,
        ..HeapConfig::checked()
    };
    Heap::new(MockShim::new(2048), config).unwrap()
}

fn assert_disjoint(heap: &Heap<MockShim>, live: &[HeapPtr]) {
    let mut spans: Vec<_> = live
        .iter()
        .map(|&p| heap.describe(p).expect("live pointer resolves"))
        .map(|info| (info.arena, info.offset, info.offset + info.capacity))
        .collect();
    spans.sort();
    for pair in spans.windows(2) {
        if pair[0].0 == pair[1].0 {
            assert!(pair[0].2 <= pair[1].1, "blocks overlap: {pair:?}");
        }
    }
}

proptest! {
    #[test]
    fn live_blocks_never_overlap(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let mut heap = small_heap();
        let mut live: Vec<HeapPtr> = Vec::new();
        for op in ops {
            match op {
                Op::Allocate(n) => live.push(heap.allocate(n).unwrap()),
                Op::Resize(i, n) if !live.is_empty() => {
                    let at = i % live.len();
                    match heap.resize(Some(live[at]), n).unwrap() {
                        Some(p) => live[at] = p,
                        None => {
                            let _ = live.swap_remove(at);
                        }
                    }
                }
                Op::Free(i) if !live.is_empty() => {
                    let at = i % live.len();
                    heap.free(Some(live.swap_remove(at)));
                }
                _ => {}
            }
            assert_disjoint(&heap, &live);
        }
        prop_assert!(heap.verify().is_ok());
        for p in live {
            heap.free(Some(p));
        }
        prop_assert_eq!(heap.arena_count(), 0);
        prop_assert_eq!(heap.stats().os_allocations, heap.stats().os_frees);
    }

    #[test]
    fn resize_preserves_prefix(initial in 1usize..2000, target in 1usize..5000, byte in any::<u8>()) {
        let mut heap = small_heap();
        let _neighbour = heap.allocate(64).unwrap();
        let p = heap.allocate(initial).unwrap();
        let _wall = heap.allocate(16).unwrap();
        heap.get_mut(p).unwrap().fill(byte);
        let q = heap.resize(Some(p), target).unwrap().unwrap();
        let kept = initial.min(target);
        prop_assert!(heap.get(q).unwrap()[..kept].iter().all(|&b| b == byte));
        prop_assert_eq!(heap.get(q).unwrap().len(), target);
    }
}
