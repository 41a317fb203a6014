//! Partition descriptors and the partition-name parser.
//!
//! Partitions are named `<parent>_p<YYYYMMDD_HHMMSS>` where the suffix is
//! the start instant of the partition's time window, in UTC. Retention
//! decisions are made entirely from this name-encoded window, never by
//! scanning row timestamps, so the parser is the most safety-critical piece
//! of the engine: a name that does not match the convention is a hard error,
//! not a skip. A silently skipped partition could neither be pruned nor
//! counted.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::retention::{RetentionError, RetentionResult};

/// `strftime` format of the timestamp embedded in partition names.
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One physical partition of a logical parent table, with the half-open
/// time window `[window_start, window_end)` recovered from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Identifier of the concrete child table.
    pub physical_name: String,
    /// Logical table this partition belongs to.
    pub parent_table: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl PartitionDescriptor {
    /// Parse a physical partition name into a descriptor.
    ///
    /// `physical_name` must be exactly `<parent_table>_p` followed by a
    /// zero-padded `YYYYMMDD_HHMMSS` timestamp. The timestamp is the window
    /// start; the window end is `start + interval`.
    ///
    /// Fails with [`RetentionError::UnparsablePartitionName`] on any
    /// deviation from the grammar, including calendar-invalid dates.
    pub fn parse(
        physical_name: &str,
        parent_table: &str,
        interval: Duration,
    ) -> RetentionResult<Self> {
        if interval <= Duration::zero() {
            return Err(RetentionError::Configuration(format!(
                "partition interval must be positive, got {}s",
                interval.num_seconds()
            )));
        }

        let unparsable = || RetentionError::UnparsablePartitionName {
            name: physical_name.to_string(),
            parent: parent_table.to_string(),
        };

        let stamp = physical_name
            .strip_prefix(parent_table)
            .and_then(|rest| rest.strip_prefix("_p"))
            .ok_or_else(unparsable)?;

        // Strictly eight digits, an underscore, six digits. chrono's `%Y`
        // accepts variable-width years, so the shape is checked up front.
        let bytes = stamp.as_bytes();
        let shape_ok = bytes.len() == 15
            && bytes[8] == b'_'
            && bytes[..8].iter().all(u8::is_ascii_digit)
            && bytes[9..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(unparsable());
        }

        let start = NaiveDateTime::parse_from_str(stamp, NAME_TIMESTAMP_FORMAT)
            .map_err(|_| unparsable())?
            .and_utc();

        Ok(Self {
            physical_name: physical_name.to_string(),
            parent_table: parent_table.to_string(),
            window_start: start,
            window_end: start + interval,
        })
    }
}
