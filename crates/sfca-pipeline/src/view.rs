//! The aggregate views a derivation run can produce

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use sfca_artifact::{ArtifactKind, CitywideMonthly, HourWeekday, NeighborhoodCategoryMonthly};
use std::fmt;
use std::str::FromStr;

/// Raw columns every monthly view needs besides a time source
pub const MONTHLY_RAW_COLUMNS: &[&str] = &["neighborhood", "incident_category"];

/// Raw columns the hour×weekday view needs
pub const HOURLY_RAW_COLUMNS: &[&str] = &["weekday_label", "hour", "incident_category"];

/// A derivable aggregate view, named by its artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum View {
    CitywideMonthly,
    NeighborhoodCategoryMonthly,
    HourWeekday,
}

impl View {
    pub const ALL: [Self; 3] = [
        Self::CitywideMonthly,
        Self::NeighborhoodCategoryMonthly,
        Self::HourWeekday,
    ];

    /// Artifact name the view publishes under
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CitywideMonthly => CitywideMonthly::NAME,
            Self::NeighborhoodCategoryMonthly => NeighborhoodCategoryMonthly::NAME,
            Self::HourWeekday => HourWeekday::NAME,
        }
    }

    /// Whether the view is keyed by month
    #[must_use]
    pub const fn is_monthly(self) -> bool {
        !matches!(self, Self::HourWeekday)
    }

    /// Raw columns required besides the time source
    #[must_use]
    pub const fn raw_columns(self) -> &'static [&'static str] {
        if self.is_monthly() {
            MONTHLY_RAW_COLUMNS
        } else {
            HOURLY_RAW_COLUMNS
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ConfigError::UnknownView(s.to_string()))
    }
}

impl TryFrom<String> for View {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<View> for String {
    fn from(view: View) -> Self {
        view.name().to_string()
    }
}
