use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Fixed-point amount in hundredths of the table currency.
///
/// Hand histories print at most cent precision, so every financial
/// invariant (contributed vs. collected vs. rake) reconciles exactly.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Chips(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount '{0}'")]
pub struct ParseChipsError(String);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self / other`, or 0 when `other` is zero.
    pub fn ratio(self, other: Chips) -> f64 {
        if other.0 == 0 {
            0.0
        } else {
            self.0 as f64 / other.0 as f64
        }
    }
}

impl Display for Chips {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Chips {
    type Err = ParseChipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseChipsError(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let body: String = body.chars().filter(|c| *c != ',').collect();
        let (whole, frac) = body.split_once('.').unwrap_or((body.as_str(), ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;
        Ok(Chips(if negative { -cents } else { cents }))
    }
}

impl Add for Chips {
    type Output = Chips;

    fn add(self, rhs: Chips) -> Chips {
        Chips(self.0 + rhs.0)
    }
}

impl Sub for Chips {
    type Output = Chips;

    fn sub(self, rhs: Chips) -> Chips {
        Chips(self.0 - rhs.0)
    }
}

impl Neg for Chips {
    type Output = Chips;

    fn neg(self) -> Chips {
        Chips(-self.0)
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 -= rhs.0;
    }
}

impl Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Chips {
        iter.fold(Chips::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Chips> for Chips {
    fn sum<I: Iterator<Item = &'a Chips>>(iter: I) -> Chips {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grouped_and_fractional_amounts() {
        assert_eq!("1,234.56".parse::<Chips>().unwrap(), Chips::from_cents(123_456));
        assert_eq!("0.5".parse::<Chips>().unwrap(), Chips::from_cents(50));
        assert_eq!("3".parse::<Chips>().unwrap(), Chips::from_cents(300));
        assert_eq!(".25".parse::<Chips>().unwrap(), Chips::from_cents(25));
        assert_eq!("0.005".parse::<Chips>().unwrap(), Chips::from_cents(1));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Chips>().is_err());
        assert!("1.2.3".parse::<Chips>().is_err());
        assert!("abc".parse::<Chips>().is_err());
    }

    #[test]
    fn display_keeps_two_decimals() {
        assert_eq!(Chips::from_cents(-150).to_string(), "-1.50");
        assert_eq!(Chips::from_cents(7).to_string(), "0.07");
    }
}
