use proptest::prelude::*;
use std::collections::HashSet;
use tallygraph::aggregate::{
    distinct_values_by_first_occurrence, distinct_values_sorted, group_by, top_n, AggregateError,
    OrderingPolicy,
};
use tallygraph::data::Dataset;

/// Records drawn from a small vocabulary so that groups collide; `None` means
/// the record lacks the column.
fn cell_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec![
        "TESLA", "NISSAN", "KIA", "tesla", "", "2019", "2020", "999",
    ]))
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec((cell_strategy(), cell_strategy()), 0..64).prop_map(|rows| {
        Dataset::from_records(rows.into_iter().map(|(make, year)| {
            let mut record = Vec::new();
            if let Some(m) = make {
                record.push(("Make", m));
            }
            if let Some(y) = year {
                record.push(("Year", y));
            }
            record
        }))
    })
}

fn policy_strategy() -> impl Strategy<Value = OrderingPolicy> {
    prop_oneof![Just(OrderingPolicy::FirstOccurrence), Just(OrderingPolicy::Sorted)]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn counts_partition_present_values(ds in dataset_strategy(), policy in policy_strategy()) {
        for column in ["Make", "Year"] {
            let present = ds.column(column).flatten().count();
            let result = group_by(&ds, column, policy);
            prop_assert_eq!(result.total(), present);
            prop_assert!(result.groups.iter().all(|g| g.count > 0));
        }
    }

    #[test]
    fn orderings_share_the_same_keys(ds in dataset_strategy()) {
        let first = distinct_values_by_first_occurrence(&ds, "Make");
        let sorted = distinct_values_sorted(&ds, "Make");
        prop_assert_eq!(first.len(), sorted.len());
        let a: HashSet<_> = first.into_iter().collect();
        let b: HashSet<_> = sorted.into_iter().collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn group_by_is_idempotent(ds in dataset_strategy(), policy in policy_strategy()) {
        prop_assert_eq!(group_by(&ds, "Year", policy), group_by(&ds, "Year", policy));
    }

    #[test]
    fn top_n_truncates_in_order(ds in dataset_strategy(), n in 0i64..12) {
        let result = group_by(&ds, "Make", OrderingPolicy::FirstOccurrence);
        let top = top_n(&result, n).unwrap();
        prop_assert_eq!(top.len(), result.len().min(n as usize));
        prop_assert_eq!(&top.groups[..], &result.groups[..top.len()]);
        if n as usize >= result.len() {
            prop_assert_eq!(top, result);
        }
    }

    #[test]
    fn top_n_rejects_negative(ds in dataset_strategy(), n in i64::MIN..0) {
        let result = group_by(&ds, "Make", OrderingPolicy::FirstOccurrence);
        prop_assert!(matches!(top_n(&result, n), Err(AggregateError::InvalidArgument(_))));
    }
}

#[test]
fn top_n_zero_is_empty() {
    let ds = Dataset::from_records(vec![vec![("Make", "TESLA")]]);
    let result = group_by(&ds, "Make", OrderingPolicy::FirstOccurrence);
    assert!(top_n(&result, 0).unwrap().is_empty());
}
