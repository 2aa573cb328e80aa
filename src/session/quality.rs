//! Sleep quality rating scale.

use std::fmt;

use crate::error::TrackerError;

/// How well the user slept, recorded after tracking stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SleepQuality {
    /// Not rated yet.
    #[default]
    Unrated,
    VeryBad,
    Poor,
    SoSo,
    Ok,
    PrettyGood,
    Excellent,
}

impl SleepQuality {
    /// Value persisted in the store (`-1` for unrated, `0..=5` otherwise).
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Unrated => -1,
            Self::VeryBad => 0,
            Self::Poor => 1,
            Self::SoSo => 2,
            Self::Ok => 3,
            Self::PrettyGood => 4,
            Self::Excellent => 5,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unrated => "--",
            Self::VeryBad => "Very bad",
            Self::Poor => "Poor",
            Self::SoSo => "So-so",
            Self::Ok => "OK",
            Self::PrettyGood => "Pretty good",
            Self::Excellent => "Excellent",
        }
    }

    pub fn is_rated(&self) -> bool {
        !matches!(self, Self::Unrated)
    }
}

impl TryFrom<i64> for SleepQuality {
    type Error = TrackerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Unrated),
            0 => Ok(Self::VeryBad),
            1 => Ok(Self::Poor),
            2 => Ok(Self::SoSo),
            3 => Ok(Self::Ok),
            4 => Ok(Self::PrettyGood),
            5 => Ok(Self::Excellent),
            other => Err(TrackerError::InvalidQuality(other)),
        }
    }
}

impl fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
