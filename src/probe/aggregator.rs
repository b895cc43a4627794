//! Outcome aggregation and run classification
//!
//! Pure reduction from a sequence of per-request outcomes to a
//! [`TestRunResult`]: deterministic, idempotent, and independent of the
//! order outcomes arrive in. The ordered sequence itself is preserved on the
//! result for reporting.

use crate::probe::types::{Classification, RequestOutcome, TestRunResult};
use std::collections::BTreeSet;

/// Reduce outcomes to a classified result.
///
/// The classification depends only on the cardinality of the deduplicated
/// order-id set: 0 means no orders, 1 means the target serialized the
/// submissions, more than 1 means concurrent submissions each created one.
pub fn classify(outcomes: Vec<RequestOutcome>) -> TestRunResult {
    let unique_order_ids: BTreeSet<_> = outcomes
        .iter()
        .filter_map(RequestOutcome::order_id)
        .collect();

    let classification = match unique_order_ids.len() {
        0 => Classification::NoOrders,
        1 => Classification::FixWorking,
        _ => Classification::DuplicatesDetected,
    };

    TestRunResult::new(outcomes, unique_order_ids, classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ErrorSummary, OrderId, RequestIndex};
    use rstest::rstest;
    use std::time::Duration;

    fn outcome(index: u32, order_id: Option<u64>) -> RequestOutcome {
        let index = RequestIndex::from(index);
        match order_id {
            Some(id) => {
                RequestOutcome::success(index, OrderId::from(id), Duration::from_millis(10))
            }
            None => RequestOutcome::failure(
                index,
                ErrorSummary::clipped("connection refused"),
                Duration::from_millis(10),
            ),
        }
    }

    #[rstest]
    #[case::no_orders(vec![None, None], Classification::NoOrders)]
    #[case::single(vec![Some(1)], Classification::FixWorking)]
    #[case::same_id_many_times(vec![Some(7), Some(7), Some(7)], Classification::FixWorking)]
    #[case::two_distinct(vec![Some(1), Some(2)], Classification::DuplicatesDetected)]
    #[case::mixed(vec![Some(1), None, Some(2), None], Classification::DuplicatesDetected)]
    fn classification_follows_unique_id_cardinality(
        #[case] ids: Vec<Option<u64>>,
        #[case] expected: Classification,
    ) {
        let outcomes = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| outcome(i as u32 + 1, id))
            .collect();
        assert_eq!(classify(outcomes).classification(), expected);
    }

    #[test]
    fn empty_run_classifies_as_no_orders() {
        let result = classify(Vec::new());
        assert_eq!(result.classification(), Classification::NoOrders);
        assert!(result.unique_order_ids().is_empty());
    }

    #[test]
    fn preserves_dispatch_order_of_outcomes() {
        let outcomes = vec![outcome(3, Some(30)), outcome(1, Some(10)), outcome(2, None)];
        let result = classify(outcomes.clone());
        assert_eq!(result.outcomes(), outcomes.as_slice());
    }

    #[test]
    fn classify_is_idempotent_over_its_own_outcomes() {
        let first = classify(vec![outcome(1, Some(1)), outcome(2, Some(2))]);
        let second = classify(first.outcomes().to_vec());
        assert_eq!(first.classification(), second.classification());
        assert_eq!(first.unique_order_ids(), second.unique_order_ids());
    }

    #[test]
    fn five_requests_three_orders_two_failures() {
        let outcomes = vec![
            outcome(1, Some(101)),
            outcome(2, Some(102)),
            outcome(3, None),
            outcome(4, Some(103)),
            outcome(5, None),
        ];
        let result = classify(outcomes);
        assert_eq!(result.classification(), Classification::DuplicatesDetected);
        let ids: Vec<u64> = result
            .unique_order_ids()
            .iter()
            .map(|id| id.into_inner())
            .collect();
        assert_eq!(ids, vec![101, 102, 103]);
    }

    #[test]
    fn five_requests_one_order_four_validation_failures() {
        let mut outcomes = vec![outcome(1, Some(101))];
        for i in 2..=5 {
            outcomes.push(RequestOutcome::failure(
                RequestIndex::from(i),
                ErrorSummary::clipped("Your cart is currently empty."),
                Duration::from_millis(25),
            ));
        }
        let result = classify(outcomes);
        assert_eq!(result.classification(), Classification::FixWorking);
        assert_eq!(result.unique_order_ids().len(), 1);
    }
}
