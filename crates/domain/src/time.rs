//! Wall-clock helpers for connection activity and health snapshots.

use chrono::{DateTime, TimeDelta, Utc};

/// UTC timestamp recorded when a pooled connection was last used or a probe ran.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// How long ago `earlier` happened, clamped to zero for clock skew.
#[must_use]
pub fn since(earlier: Timestamp) -> TimeDelta {
    (now() - earlier).max(TimeDelta::zero())
}
