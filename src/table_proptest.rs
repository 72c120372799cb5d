#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect
// bucket placement through `hash::bucket_index`.

use crate::config::{TableConfig, LOAD_THRESHOLD};
use crate::error::TableError;
use crate::hash::bucket_index;
use crate::table::Table;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i64),
    Get(usize),
    Del(usize),
    Bump(usize, i64),
    Resize,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Del),
            1 => (idx.clone(), any::<i64>()).prop_map(|(i, d)| OpI::Bump(i, d)),
            1 => Just(OpI::Resize),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario(
    mut sut: Table,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i64> = HashMap::new();
    let mut last_size = sut.size();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = &pool[i];
                let (size, entries) = (sut.size(), sut.len());
                let prev = sut.set(k, v).expect("small tables always grow");
                if sut.size() != size {
                    // Occupancy right after the growth, before the key landed
                    prop_assert!(100 * entries / sut.size() <= LOAD_THRESHOLD);
                }
                prop_assert_eq!(prev, model.insert(k.clone(), v));
                prop_assert_eq!(sut.get(k).map(|e| e.value()), Some(v));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k).map(|e| e.value()), model.get(k).copied());
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            OpI::Del(i) => {
                let k = &pool[i];
                let index = bucket_index(k, sut.size());
                let bucket_populated = model.keys().any(|m| bucket_index(m, sut.size()) == index);
                match (sut.del(k), model.remove(k)) {
                    (Ok(v), Some(mv)) => prop_assert_eq!(v, mv),
                    (Err(TableError::EmptyBucket { index: got }), None) => {
                        prop_assert_eq!(got, index);
                        prop_assert!(!bucket_populated, "empty bucket reported for a populated one");
                    }
                    (Err(TableError::NotFound { index: got }), None) => {
                        prop_assert_eq!(got, index);
                        prop_assert!(bucket_populated, "not-found reported for an empty bucket");
                    }
                    (got, expected) => {
                        prop_assert!(false, "del mismatch: got {:?}, model {:?}", got, expected);
                    }
                }
                prop_assert!(sut.get(k).is_none());
            }
            OpI::Bump(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(v), Some(mv)) => {
                        *v = v.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut disagrees with model"),
                }
            }
            OpI::Resize => {
                // Keep the per-op bucket scan cheap.
                if sut.size() > 4096 {
                    continue;
                }
                let before: BTreeMap<String, i64> =
                    sut.iter().map(|(k, v)| (k.to_string(), v)).collect();
                let size = sut.size();
                sut.resize().expect("small tables always grow");
                prop_assert_eq!(sut.size(), 2 * size + 1);
                let after: BTreeMap<String, i64> =
                    sut.iter().map(|(k, v)| (k.to_string(), v)).collect();
                prop_assert_eq!(before, after);
            }
            OpI::Iterate => {
                let seen: BTreeMap<String, i64> =
                    sut.iter().map(|(k, v)| (k.to_string(), v)).collect();
                let expected: BTreeMap<String, i64> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(sut.iter().count(), model.len(), "no duplicates");
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op
        // 1) Size parity and occupancy formula
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.used(), 100 * model.len() / sut.size());
        // 2) The bucket array never shrinks
        prop_assert!(sut.size() >= last_size);
        last_size = sut.size();
        // 3) Every entry sits in the bucket its key hashes to
        for i in 0..sut.size() {
            for e in sut.bucket(i) {
                prop_assert_eq!(bucket_index(e.key(), sut.size()), i);
            }
        }
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `set` returns the previous value and a following `get` sees the new one.
// - `del` returns the stored value, or EmptyBucket/NotFound matching the
//   actual population of the key's bucket.
// - Explicit and automatic growth keep the exact set of pairs.
// - `len`, `used` and bucket placement agree with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = Table::new(10).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: same invariants starting from a single bucket, so the first
// keys share one chain and growth runs from the smallest possible size.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_from_one_bucket((pool, ops) in arb_scenario()) {
        let config = TableConfig::default().with_initial_buckets(1);
        let sut = Table::with_config(config).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}
