//! Candidate time window: floor the trigger instant to the hour, jump the
//! forward offset, and open a symmetric half-width window around the result.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MatchPolicy;

/// Half-open candidate window `[start, end)` on the shared UTC clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MatchWindow {
    /// Window for a pass triggered at `now`: the central time is `now` floored
    /// to the hour plus the policy's forward offset, and the window extends
    /// one half-width to either side.
    pub fn around(now: DateTime<Utc>, policy: &MatchPolicy) -> Self {
        let central = floor_to_hour(now) + policy.forward_offset;
        Self {
            start: central - policy.window_half_width,
            end: central + policy.window_half_width,
        }
    }

    pub fn center(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) / 2
    }

    /// Inclusive start, exclusive end.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

impl std::fmt::Display for MatchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {})", self.start, self.end)
    }
}

fn floor_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroing sub-hour fields keeps the timestamp valid")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    #[test]
    fn window_centers_three_hours_after_the_floored_trigger() {
        let policy = MatchPolicy::new(4);
        let window = MatchWindow::around(at(8, 42), &policy);

        assert_eq!(window.start, at(10, 30));
        assert_eq!(window.end, at(11, 30));
        assert_eq!(window.center(), at(11, 0));
    }

    #[test]
    fn window_is_inclusive_start_exclusive_end() {
        let policy = MatchPolicy::new(4);
        let window = MatchWindow::around(at(8, 0), &policy);

        assert!(window.contains(at(10, 30)));
        assert!(window.contains(at(11, 29)));
        assert!(!window.contains(at(11, 30)));
        assert!(!window.contains(at(10, 29)));
    }

    #[test]
    fn trigger_minute_does_not_move_the_window() {
        let policy = MatchPolicy::new(4);
        let early = MatchWindow::around(at(8, 0), &policy);
        let late = MatchWindow::around(at(8, 59), &policy);
        assert_eq!(early, late);
    }
}
