//! Property-based invariant tests for `TimerSet`.
//!
//! These tests verify:
//!
//! 1. A timer never fires before its latest deadline
//! 2. Every armed timer fires exactly once by the time the clock passes it
//! 3. Firing order follows deadlines
//! 4. `next_deadline` is the minimum pending deadline

use std::collections::BTreeMap;

use choice_core::timer::TimerSet;
use proptest::prelude::*;
use web_time::{Duration, Instant};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Arm(u8, u64),
    Cancel(u8),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 0u64..50).prop_map(|(k, d)| Op::Arm(k, d)),
        (0u8..4).prop_map(Op::Cancel),
        (0u64..30).prop_map(Op::Advance),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

proptest! {
    #[test]
    fn timers_fire_once_and_never_early(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let t0 = Instant::now();
        let mut elapsed = 0u64;
        let mut timers = TimerSet::new();
        let mut model: BTreeMap<u8, u64> = BTreeMap::new();

        for op in &ops {
            match op {
                Op::Arm(key, delay) => {
                    let replaced = timers.arm(*key, t0 + ms(elapsed), ms(*delay));
                    prop_assert_eq!(replaced, model.insert(*key, elapsed + delay).is_some());
                }
                Op::Cancel(key) => {
                    prop_assert_eq!(timers.cancel(*key), model.remove(key).is_some());
                }
                Op::Advance(step) => {
                    elapsed += step;
                    let fired = timers.take_expired(t0 + ms(elapsed));

                    let mut expected: Vec<(u64, u8)> = model
                        .iter()
                        .filter(|(_, deadline)| **deadline <= elapsed)
                        .map(|(key, deadline)| (*deadline, *key))
                        .collect();
                    expected.sort();
                    model.retain(|_, deadline| *deadline > elapsed);

                    let expected: Vec<u8> = expected.into_iter().map(|(_, key)| key).collect();
                    prop_assert_eq!(fired, expected);
                }
            }

            prop_assert_eq!(timers.len(), model.len());
            let next = model.values().min().map(|deadline| t0 + ms(*deadline));
            prop_assert_eq!(timers.next_deadline(), next);
        }

        let flushed = timers.take_expired(t0 + ms(elapsed + 1_000));
        prop_assert_eq!(flushed.len(), model.len());
        prop_assert!(timers.is_empty());
    }
}
