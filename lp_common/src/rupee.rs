use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------       Rupee         ---------------------------------------------------------
/// A monetary amount in Indian rupees, stored as a whole number of paise (1/100 ₹).
///
/// Gateways bill in the smallest currency unit, so keeping paise as the internal representation means no rounding
/// ever happens after an amount enters the system.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Rupee(i64);

op!(binary Rupee, Add, add);
op!(binary Rupee, Sub, sub);
op!(inplace Rupee, SubAssign, sub_assign);
op!(unary Rupee, Neg, neg);

impl Mul<i64> for Rupee {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Rupee {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct RupeeConversionError(String);

impl From<i64> for Rupee {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Rupee {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Rupee {}

impl TryFrom<u64> for Rupee {
    type Error = RupeeConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(RupeeConversionError(format!("Value {} is too large to convert to Rupee", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl FromStr for Rupee {
    type Err = RupeeConversionError;

    /// Parses a decimal rupee amount ("100000.00") into paise, rejecting more than two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let negative = s.starts_with('-');
        let mut parts = s.split('.');
        let whole = parts
            .next()
            .ok_or_else(|| RupeeConversionError(s.to_string()))?
            .parse::<i64>()
            .map_err(|e| RupeeConversionError(format!("Invalid rupee amount: {s}. {e}")))?;
        let paise = match parts.next() {
            None => 0,
            Some(frac) if frac.len() <= 2 => {
                let f = frac.parse::<i64>().map_err(|e| RupeeConversionError(format!("Invalid rupee amount: {s}. {e}")))?;
                if frac.len() == 1 {
                    f * 10
                } else {
                    f
                }
            },
            Some(frac) => return Err(RupeeConversionError(format!("Sub-paise precision is not supported: {frac}"))),
        };
        if parts.next().is_some() {
            return Err(RupeeConversionError(format!("Invalid rupee amount: {s}")));
        }
        let paise = if negative { -paise } else { paise };
        Ok(Self(whole * 100 + paise))
    }
}

impl Display for Rupee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl Rupee {
    /// The amount as a whole number of paise. This is what payment gateways expect.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    pub fn from_paise(paise: i64) -> Self {
        Self(paise)
    }
}
