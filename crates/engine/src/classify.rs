//! Tier classification
//!
//! Regular snapshots are due by elapsed time. Daily, weekly and monthly
//! snapshots are due when a calendar boundary was crossed since the last
//! regular snapshot, so each boundary fires once however often passes run.
//!
//! Boundary tiers are only evaluated together with a due regular snapshot.
//! The reference point stays on the previous day until that regular snapshot
//! is taken, so a crossing seen while the interval is still running is
//! picked up by the next due pass rather than lost.
//!
//! There is no backfill: if no pass runs on a Monday (or on the 1st), that
//! week's (or month's) snapshot is skipped.

use chrono::{Datelike, Duration, Weekday};
use snap_core::{truncate_to_minute, Tier, Timestamp};

/// Which tiers a new snapshot event belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueTiers {
    pub regular: bool,
    pub daily: bool,
    pub weekly: bool,
    pub monthly: bool,
}

impl DueTiers {
    pub fn is_due(&self, tier: Tier) -> bool {
        match tier {
            Tier::Regular => self.regular,
            Tier::Daily => self.daily,
            Tier::Weekly => self.weekly,
            Tier::Monthly => self.monthly,
        }
    }

    /// Due tiers in creation order
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL.into_iter().filter(move |tier| self.is_due(*tier))
    }

    pub fn any(&self) -> bool {
        self.regular || self.daily || self.weekly || self.monthly
    }
}

/// Decide which tiers are due at `now`
///
/// `last_regular` is the newest existing regular snapshot, if any. Elapsed
/// time is measured in whole minutes; a regular snapshot is due once
/// `now - last_regular >= interval_minutes`. A `last_regular` in the future
/// (clock stepped back) is never due.
pub fn classify(now: Timestamp, last_regular: Option<Timestamp>, interval_minutes: u32) -> DueTiers {
    let now = truncate_to_minute(now);
    let interval = Duration::minutes(i64::from(interval_minutes.max(1)));

    let regular = match last_regular {
        None => true,
        Some(last) => (now - truncate_to_minute(last)).num_minutes() >= interval.num_minutes(),
    };

    if !regular {
        return DueTiers::default();
    }

    let reference = last_regular.unwrap_or(now - interval);
    let crossed_day = reference.date() != now.date();

    DueTiers {
        regular,
        daily: crossed_day,
        weekly: crossed_day && now.weekday() == Weekday::Mon,
        monthly: crossed_day && now.day() == 1,
    }
}
