//! Departure-time aggregation: epoch-second mean of the members' requested
//! times, rounded onto the policy's minute grid.
//!
//! Rounding is to the nearest bucket with ties going to the even bucket, so an
//! average of :05 settles back to :00 while :55 rounds up and carries into the
//! next hour. The carry never rounds backward to the start of the current
//! hour.

use chrono::{DateTime, Duration, Timelike, Utc};

/// One representative departure for the whole group: the integer-truncated
/// mean of `times` in UTC epoch seconds, rounded with [round_to_bucket].
/// Returns `None` for an empty slice.
pub fn aggregate_departure_time(
    times: &[DateTime<Utc>],
    bucket_minutes: u32,
) -> Option<DateTime<Utc>> {
    if times.is_empty() {
        return None;
    }
    let sum: i64 = times.iter().map(|t| t.timestamp()).sum();
    let mean = sum / times.len() as i64;
    let mean_time =
        DateTime::<Utc>::from_timestamp(mean, 0).expect("mean of valid timestamps is in range");
    Some(round_to_bucket(mean_time, bucket_minutes))
}

/// Round `t` to the nearest `bucket_minutes` boundary, truncated to minute
/// precision. A minute exactly halfway between two buckets rounds to the even
/// bucket; a result of 60 minutes carries into the next hour.
///
/// `bucket_minutes` must evenly divide 60 (enforced by policy validation).
pub fn round_to_bucket(t: DateTime<Utc>, bucket_minutes: u32) -> DateTime<Utc> {
    let truncated = t
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroing sub-minute fields keeps the timestamp valid");

    let minute = truncated.minute();
    let quotient = minute / bucket_minutes;
    let remainder = minute % bucket_minutes;
    let rounded_quotient = match (2 * remainder).cmp(&bucket_minutes) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        std::cmp::Ordering::Equal => quotient + 1,
    };

    let rounded_minute = rounded_quotient * bucket_minutes;
    if rounded_minute >= 60 {
        // Carry: the minute rounded up past the end of the hour.
        truncated - Duration::minutes(minute as i64) + Duration::hours(1)
    } else {
        truncated
            .with_minute(rounded_minute)
            .expect("rounded minute is below 60")
    }
}
