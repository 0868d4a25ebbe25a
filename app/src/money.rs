//! Fixed-point money amounts. Balances and deposits are stored as whole
//! cents in an `i64`, so two decimal places are always exact. Conversion
//! from the decimal representation used at the API boundary rejects
//! anything with sub-cent precision.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::ops::{Add, AddAssign, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialOrd, Ord, PartialEq, Eq)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Converts a decimal amount like `50.00` into whole cents. Returns
    /// `None` for amounts with more than two decimal places or amounts
    /// too large for an `i64`.
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let cents = amount.checked_mul(Decimal::ONE_HUNDRED)?;
        if cents.fract() != Decimal::ZERO {
            return None;
        }
        cents.to_i64().map(Self)
    }

    /// The exact decimal value, always carrying two decimal places.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn decimal(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn whole_cent_amounts_convert() {
        assert_eq!(Cents::from_decimal(decimal("50.00")), Some(Cents(5000)));
        assert_eq!(Cents::from_decimal(decimal("0.01")), Some(Cents(1)));
        assert_eq!(Cents::from_decimal(decimal("1000000")), Some(Cents(100_000_000)));
        assert_eq!(Cents::from_decimal(decimal("-3.50")), Some(Cents(-350)));
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        assert_eq!(Cents::from_decimal(decimal("0.005")), None);
        assert_eq!(Cents::from_decimal(decimal("10.001")), None);
    }

    #[test]
    fn renders_with_two_decimal_places() {
        assert_eq!(Cents(5000).to_decimal().to_string(), "50.00");
        assert_eq!(Cents(1).to_decimal().to_string(), "0.01");
        assert_eq!(Cents::ZERO.to_decimal().to_string(), "0.00");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Cents(1000) + Cents(2000), Cents(3000));
        assert_eq!(Cents(1000) - Cents(250), Cents(750));
        let mut balance = Cents(5000);
        balance += Cents(1000);
        balance -= Cents(500);
        assert_eq!(balance, Cents(5500));
    }
}
