//! Task ordering policies
//!
//! Every policy is a stable sort, so records that compare equal keep the
//! order they arrived in.

use std::cmp::Reverse;

use tasksync_content::{SortBy, TaskRecord};

/// Order `records` in place by `policy`
pub fn sort_records(records: &mut [&TaskRecord], policy: SortBy) {
    match policy {
        SortBy::Manual => {}
        // None sorts below every level, so it ends up last
        SortBy::Priority => records.sort_by_key(|r| Reverse(r.priority)),
        SortBy::Created => records.sort_by_key(|r| Reverse(r.created_at)),
        SortBy::Text => records.sort_by_cached_key(|r| r.text.to_lowercase()),
        SortBy::Tag => records.sort_by_cached_key(|r| match r.grouping_tag() {
            Some(tag) => (false, tag.to_lowercase()),
            None => (true, String::new()),
        }),
        SortBy::Status => records.sort_by_key(|r| r.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tasksync_content::{Priority, TaskStatus};

    fn ids(records: &[&TaskRecord]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    fn fixture() -> Vec<TaskRecord> {
        vec![
            TaskRecord::new("a", "banana")
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
                .with_tags(["zeta"]),
            TaskRecord::new("b", "Apple")
                .with_priority(Priority::Low)
                .with_status(TaskStatus::Done)
                .with_created_at(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            TaskRecord::new("c", "cherry")
                .with_priority(Priority::Highest)
                .with_created_at(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
                .with_tags(["Alpha"]),
        ]
    }

    #[test]
    fn each_policy_orders_as_documented() {
        let records = fixture();
        let cases = [
            (SortBy::Manual, ["a", "b", "c"]),
            (SortBy::Priority, ["c", "b", "a"]),
            (SortBy::Created, ["b", "c", "a"]),
            (SortBy::Text, ["b", "a", "c"]),
            (SortBy::Tag, ["c", "a", "b"]),
            (SortBy::Status, ["a", "c", "b"]),
        ];
        for (policy, expected) in cases {
            let mut refs: Vec<&TaskRecord> = records.iter().collect();
            sort_records(&mut refs, policy);
            assert_eq!(ids(&refs), expected, "{policy:?}");
        }
    }

    #[test]
    fn ties_keep_arrival_order() {
        let records = [TaskRecord::new("x", "same"), TaskRecord::new("y", "Same")];
        let mut refs: Vec<&TaskRecord> = records.iter().collect();
        sort_records(&mut refs, SortBy::Text);
        assert_eq!(ids(&refs), ["x", "y"]);
    }
}
