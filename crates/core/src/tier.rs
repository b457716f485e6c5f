//! Retention tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Retention tier a snapshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Interval snapshot, taken every `interval_minutes`
    Regular,
    /// First snapshot after a day boundary
    Daily,
    /// First snapshot after a day boundary on a Monday
    Weekly,
    /// First snapshot after a day boundary on the 1st of the month
    Monthly,
}

impl Tier {
    /// All tiers in creation and trimming order
    pub const ALL: [Tier; 4] = [Tier::Regular, Tier::Daily, Tier::Weekly, Tier::Monthly];

    /// Literal prefix placed between `@` and the timestamp
    pub fn prefix(self) -> &'static str {
        match self {
            Tier::Regular => "snap-",
            Tier::Daily => "daily-",
            Tier::Weekly => "weekly-",
            Tier::Monthly => "monthly-",
        }
    }

    /// Find the tier whose prefix starts `s`
    pub fn from_prefixed(s: &str) -> Option<(Tier, &str)> {
        Self::ALL
            .iter()
            .find_map(|tier| s.strip_prefix(tier.prefix()).map(|rest| (*tier, rest)))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Regular => "regular",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
