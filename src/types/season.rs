//! Defines the `Season` enum and the month → season bucketing rule.

use serde::Serialize;
use std::fmt;

/// One of the four fixed calendar seasons.
///
/// Seasons are derived from the month only, using the Northern-hemisphere
/// bucketing `((month mod 12) / 3) + 1`: December, January and February are
/// Winter, March to May Spring, June to August Summer, September to November Autumn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    /// Bucket 1.
    Winter = 1,
    /// Bucket 2.
    Spring = 2,
    /// Bucket 3.
    Summer = 3,
    /// Bucket 4.
    Autumn = 4,
}

impl Season {
    /// All seasons in presentation order.
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Maps a calendar month (1-12) to its season.
    ///
    /// Returns `None` for months outside 1-12.
    ///
    /// # Examples
    ///
    /// ```
    /// use airquality::Season;
    ///
    /// assert_eq!(Season::from_month(3), Some(Season::Spring));
    /// assert_eq!(Season::from_month(12), Some(Season::Winter));
    /// assert_eq!(Season::from_month(13), None);
    /// ```
    pub fn from_month(month: u32) -> Option<Season> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Season::from_bucket(season_bucket(month))
    }

    /// Converts a bucket number (1-4) into a season.
    pub fn from_bucket(bucket: u32) -> Option<Season> {
        match bucket {
            1 => Some(Season::Winter),
            2 => Some(Season::Spring),
            3 => Some(Season::Summer),
            4 => Some(Season::Autumn),
            _ => None,
        }
    }

    /// The bucket number of this season (1-4).
    pub fn bucket(self) -> u32 {
        self as u32
    }

    /// The label stored in the `season` column.
    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Season> {
        Season::ALL.into_iter().find(|season| season.name() == name)
    }
}

/// The season bucket of a month: `((month mod 12) / 3) + 1`, integer division.
pub fn season_bucket(month: u32) -> u32 {
    (month % 12) / 3 + 1
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
