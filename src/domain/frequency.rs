//! Sampling frequencies.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::ForecastError;

/// A fixed sampling step, parsed from pandas-style aliases such as `15min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency {
    step: TimeDelta,
}

impl Frequency {
    /// Build a frequency from a positive step.
    ///
    /// # Errors
    /// Returns an error if the step is zero or negative.
    pub fn new(step: TimeDelta) -> Result<Self, ForecastError> {
        if step <= TimeDelta::zero() {
            return Err(ForecastError::InvalidFrequency(format!(
                "{}s",
                step.num_seconds()
            )));
        }
        Ok(Self { step })
    }

    #[must_use]
    pub fn minutes(count: i64) -> Self {
        Self {
            step: TimeDelta::minutes(count.max(1)),
        }
    }

    #[must_use]
    pub fn hours(count: i64) -> Self {
        Self {
            step: TimeDelta::hours(count.max(1)),
        }
    }

    #[must_use]
    pub fn days(count: i64) -> Self {
        Self {
            step: TimeDelta::days(count.max(1)),
        }
    }

    #[must_use]
    pub const fn step(&self) -> TimeDelta {
        self.step
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::minutes(1)
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ForecastError::InvalidFrequency(s.to_string());
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, unit) = trimmed.split_at(split);

        let count: i64 = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        if count <= 0 {
            return Err(invalid());
        }

        let step = match unit {
            "S" | "s" => TimeDelta::try_seconds(count),
            "min" | "T" => TimeDelta::try_minutes(count),
            "H" | "h" => TimeDelta::try_hours(count),
            "D" | "d" => TimeDelta::try_days(count),
            _ => None,
        }
        .ok_or_else(invalid)?;

        Ok(Self { step })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.step.num_seconds();
        if secs % 86_400 == 0 {
            write!(f, "{}D", secs / 86_400)
        } else if secs % 3_600 == 0 {
            write!(f, "{}H", secs / 3_600)
        } else if secs % 60 == 0 {
            write!(f, "{}min", secs / 60)
        } else {
            write!(f, "{secs}S")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("min".parse::<Frequency>().unwrap().step(), TimeDelta::minutes(1));
        assert_eq!("T".parse::<Frequency>().unwrap().step(), TimeDelta::minutes(1));
        assert_eq!("15min".parse::<Frequency>().unwrap().step(), TimeDelta::minutes(15));
        assert_eq!("H".parse::<Frequency>().unwrap().step(), TimeDelta::hours(1));
        assert_eq!("2h".parse::<Frequency>().unwrap().step(), TimeDelta::hours(2));
        assert_eq!("D".parse::<Frequency>().unwrap().step(), TimeDelta::days(1));
        assert_eq!("30S".parse::<Frequency>().unwrap().step(), TimeDelta::seconds(30));
    }

    #[test]
    fn rejects_unknown_units() {
        assert!("".parse::<Frequency>().is_err());
        assert!("15".parse::<Frequency>().is_err());
        assert!("0min".parse::<Frequency>().is_err());
        assert!("W".parse::<Frequency>().is_err());
        assert!("fortnight".parse::<Frequency>().is_err());
    }

    #[test]
    fn displays_largest_whole_unit() {
        assert_eq!("90min".parse::<Frequency>().unwrap().to_string(), "90min");
        assert_eq!("120min".parse::<Frequency>().unwrap().to_string(), "2H");
        assert_eq!("24H".parse::<Frequency>().unwrap().to_string(), "1D");
        assert_eq!("45S".parse::<Frequency>().unwrap().to_string(), "45S");
    }

    #[test]
    fn new_rejects_non_positive_steps() {
        assert!(Frequency::new(TimeDelta::zero()).is_err());
        assert!(Frequency::new(TimeDelta::seconds(5)).is_ok());
    }
}
