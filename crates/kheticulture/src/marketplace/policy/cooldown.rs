use chrono::{DateTime, Utc};

use crate::marketplace::domain::{Application, ApplicationStatus};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Waiting period imposed on a worker after a rejection before they may apply again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    hours: u32,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(24)
    }
}

impl CooldownPolicy {
    pub const fn new(hours: u32) -> Self {
        Self { hours }
    }

    pub const fn hours(&self) -> u32 {
        self.hours
    }

    fn window_millis(&self) -> i64 {
        i64::from(self.hours) * MILLIS_PER_HOUR
    }

    /// Whole hours have to elapse; 23h59m after a 24h cooldown is still blocked.
    pub fn can_reapply(&self, rejected_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - rejected_at).num_milliseconds() >= self.window_millis()
    }

    /// Hours left, rounded up, so a blocked worker never reads "0 hours".
    pub fn hours_until_reapply(&self, rejected_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let remaining = self.window_millis() - (now - rejected_at).num_milliseconds();
        if remaining <= 0 {
            return 0;
        }
        let hours = (remaining + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
        u32::try_from(hours).unwrap_or(u32::MAX)
    }

    /// Only rejected applications can be recycled. A rejection without a timestamp is
    /// treated as already expired.
    pub fn application_can_reapply(&self, application: &Application, now: DateTime<Utc>) -> bool {
        match (application.status, application.rejected_at) {
            (ApplicationStatus::Rejected, Some(rejected_at)) => self.can_reapply(rejected_at, now),
            (ApplicationStatus::Rejected, None) => true,
            (ApplicationStatus::Pending | ApplicationStatus::Accepted, _) => false,
        }
    }

    pub fn application_hours_until_reapply(
        &self,
        application: &Application,
        now: DateTime<Utc>,
    ) -> Option<u32> {
        match (application.status, application.rejected_at) {
            (ApplicationStatus::Rejected, Some(rejected_at)) => {
                Some(self.hours_until_reapply(rejected_at, now))
            }
            (ApplicationStatus::Rejected, None) => Some(0),
            _ => None,
        }
    }
}
