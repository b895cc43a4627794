//! Property-based tests for run classification invariants
//!
//! Classification must be a pure function of the set of order ids in the
//! outcomes: permuting the sequence, or repeating the reduction, can never
//! change the answer.

use checkout_probe::domain::types::{ErrorSummary, OrderId, RequestIndex};
use checkout_probe::probe::{classify, Classification, RequestOutcome};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;

fn outcome(index: usize, order_id: Option<u64>) -> RequestOutcome {
    let index = RequestIndex::from(index as u32 + 1);
    match order_id {
        Some(id) => RequestOutcome::success(index, OrderId::from(id), Duration::from_millis(5)),
        None => RequestOutcome::failure(
            index,
            ErrorSummary::clipped("network error: connection reset"),
            Duration::from_millis(5),
        ),
    }
}

/// Ids observed per request: `None` models a failed request; the small id
/// range forces frequent collisions so the dedup path is exercised.
fn observed_ids() -> impl Strategy<Value = Vec<Option<u64>>> {
    prop::collection::vec(prop::option::of(1u64..8), 1..24)
}

proptest! {
    #[test]
    fn classification_is_permutation_invariant(
        (ids, order) in observed_ids().prop_flat_map(|ids| {
            let len = ids.len();
            (Just(ids), Just((0..len).collect::<Vec<usize>>()).prop_shuffle())
        })
    ) {
        let original: Vec<RequestOutcome> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| outcome(i, *id))
            .collect();
        let permuted: Vec<RequestOutcome> =
            order.iter().map(|&i| original[i].clone()).collect();

        let a = classify(original);
        let b = classify(permuted);

        prop_assert_eq!(a.classification(), b.classification());
        prop_assert_eq!(a.unique_order_ids(), b.unique_order_ids());
    }

    #[test]
    fn classification_matches_unique_id_cardinality(ids in observed_ids()) {
        let expected_unique: BTreeSet<u64> = ids.iter().flatten().copied().collect();
        let outcomes: Vec<RequestOutcome> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| outcome(i, *id))
            .collect();

        let result = classify(outcomes);

        prop_assert_eq!(result.unique_order_ids().len(), expected_unique.len());
        let expected = match expected_unique.len() {
            0 => Classification::NoOrders,
            1 => Classification::FixWorking,
            _ => Classification::DuplicatesDetected,
        };
        prop_assert_eq!(result.classification(), expected);
    }

    #[test]
    fn classify_preserves_the_outcome_sequence(ids in observed_ids()) {
        let outcomes: Vec<RequestOutcome> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| outcome(i, *id))
            .collect();

        let result = classify(outcomes.clone());

        prop_assert_eq!(result.outcomes(), outcomes.as_slice());
    }
}
