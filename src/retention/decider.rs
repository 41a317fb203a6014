//! Pure retention decision logic.
//!
//! Given a partition list, a policy, and the current instant, [`decide`]
//! produces the plan the executor will carry out. No I/O happens here;
//! `now` is always supplied by the caller.

use chrono::{DateTime, Utc};

use crate::retention::{
    PartitionDescriptor, RetentionError, RetentionMode, RetentionPolicy, RetentionResult,
};

/// What a retention run should do, as computed by [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Partitions to drop, oldest first. If execution is interrupted
    /// partway, the oldest partitions go first.
    pub partitions_to_drop: Vec<PartitionDescriptor>,
    /// Whether the parent table is dropped after the partitions.
    pub drop_parent: bool,
    /// Set for condition-mode policies: no partition-level action, a
    /// row-level delete is required instead. The executor treats this as
    /// an explicit not-implemented failure rather than a silent no-op.
    pub row_delete_required: bool,
}

/// Compute the retention plan for one table.
///
/// Time-window mode selects exactly the partitions with
/// `window_end <= now - retention`; the boundary is inclusive, so a
/// partition ending exactly at the cutoff instant is eligible.
///
/// Sibling partitions with overlapping windows are an upstream
/// naming-convention violation and fail the run with
/// [`RetentionError::OverlappingWindows`].
pub fn decide(
    partitions: &[PartitionDescriptor],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RetentionResult<RetentionPlan> {
    check_disjoint_windows(partitions)?;

    if let RetentionMode::Condition { .. } = policy.mode() {
        return Ok(RetentionPlan {
            partitions_to_drop: Vec::new(),
            drop_parent: policy.drop_parent_after_prune(),
            row_delete_required: true,
        });
    }

    let cutoff = now - policy.retention();
    let mut eligible: Vec<PartitionDescriptor> = partitions
        .iter()
        .filter(|p| p.window_end <= cutoff)
        .cloned()
        .collect();
    eligible.sort_by_key(|p| p.window_start);

    Ok(RetentionPlan {
        partitions_to_drop: eligible,
        drop_parent: policy.drop_parent_after_prune(),
        row_delete_required: false,
    })
}

/// Sanity check that sibling windows do not overlap.
///
/// The external partition manager guarantees disjoint windows; a violation
/// means the naming convention broke upstream, and guessing a resolution
/// order could drop live data.
fn check_disjoint_windows(partitions: &[PartitionDescriptor]) -> RetentionResult<()> {
    let mut sorted: Vec<&PartitionDescriptor> = partitions.iter().collect();
    sorted.sort_by_key(|p| p.window_start);

    for pair in sorted.windows(2) {
        if pair[1].window_start < pair[0].window_end {
            return Err(RetentionError::OverlappingWindows {
                first: pair[0].physical_name.clone(),
                second: pair[1].physical_name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn policy(retention_secs: i64) -> RetentionPolicy {
        RetentionPolicy::new(
            "test_table1",
            "public",
            RetentionMode::TimeWindow,
            Duration::seconds(retention_secs),
            Duration::seconds(1),
        )
        .unwrap()
    }

    fn partition(start: DateTime<Utc>, width_secs: i64) -> PartitionDescriptor {
        PartitionDescriptor {
            physical_name: format!("test_table1_p{}", start.format("%Y%m%d_%H%M%S")),
            parent_table: "test_table1".into(),
            window_start: start,
            window_end: start + Duration::seconds(width_secs),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_spec_scenario_fifteen_second_retention() {
        // Windows [T-20, T-19), [T-16, T-15), [T-10, T-9) with 15s
        // retention: the first two age out, the third survives.
        let t = now();
        let parts = vec![
            partition(t - Duration::seconds(10), 1),
            partition(t - Duration::seconds(20), 1),
            partition(t - Duration::seconds(16), 1),
        ];
        let plan = decide(&parts, &policy(15), t).unwrap();

        let names: Vec<&str> = plan
            .partitions_to_drop
            .iter()
            .map(|p| p.physical_name.as_str())
            .collect();
        assert_eq!(plan.partitions_to_drop.len(), 2);
        // Oldest first.
        assert_eq!(names[0], partition(t - Duration::seconds(20), 1).physical_name);
        assert_eq!(names[1], partition(t - Duration::seconds(16), 1).physical_name);
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        // window_end == now - retention is eligible.
        let t = now();
        let exactly_at_cutoff = partition(t - Duration::seconds(16), 1);
        assert_eq!(exactly_at_cutoff.window_end, t - Duration::seconds(15));

        let plan = decide(&[exactly_at_cutoff.clone()], &policy(15), t).unwrap();
        assert_eq!(plan.partitions_to_drop, vec![exactly_at_cutoff]);
    }

    #[test]
    fn test_partition_just_inside_retention_kept() {
        let t = now();
        let fresh = partition(t - Duration::seconds(15), 1);
        let plan = decide(&[fresh], &policy(15), t).unwrap();
        assert!(plan.partitions_to_drop.is_empty());
    }

    #[test]
    fn test_empty_partition_list() {
        let plan = decide(&[], &policy(15), now()).unwrap();
        assert!(plan.partitions_to_drop.is_empty());
        assert!(!plan.row_delete_required);
    }

    #[test]
    fn test_drop_parent_copied_from_policy() {
        let with_parent = policy(15).with_drop_parent_after_prune(true);
        assert!(decide(&[], &with_parent, now()).unwrap().drop_parent);
        assert!(!decide(&[], &policy(15), now()).unwrap().drop_parent);
    }

    #[test]
    fn test_condition_mode_requires_row_delete() {
        let cond = RetentionPolicy::new(
            "test_table1",
            "public",
            RetentionMode::Condition {
                expression: "status = 'stale'".into(),
            },
            Duration::seconds(15),
            Duration::seconds(1),
        )
        .unwrap();

        let t = now();
        let plan = decide(&[partition(t - Duration::seconds(60), 1)], &cond, t).unwrap();
        assert!(plan.row_delete_required);
        assert!(plan.partitions_to_drop.is_empty());
    }

    #[test]
    fn test_overlapping_windows_are_fatal() {
        let t = now();
        let a = partition(t - Duration::seconds(20), 5);
        let b = partition(t - Duration::seconds(17), 5);
        let err = decide(&[a.clone(), b.clone()], &policy(15), t).unwrap_err();
        match err {
            RetentionError::OverlappingWindows { first, second } => {
                assert_eq!(first, a.physical_name);
                assert_eq!(second, b.physical_name);
            }
            other => panic!("expected OverlappingWindows, got {other:?}"),
        }
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        // Half-open windows: [t, t+1) and [t+1, t+2) touch but are disjoint.
        let t = now();
        let parts = vec![
            partition(t - Duration::seconds(20), 1),
            partition(t - Duration::seconds(19), 1),
        ];
        assert!(decide(&parts, &policy(15), t).is_ok());
    }
}
