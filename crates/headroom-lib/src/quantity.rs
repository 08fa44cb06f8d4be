//! Exact resource quantities
//!
//! Kubernetes expresses CPU and memory as quantity strings (`"250m"`, `"1.5"`,
//! `"512Mi"`, `"1e3"`). This module parses them with `kube_quantity` and
//! converts the decimal result into integer newtypes: CPU in milli-cores and
//! memory in bytes. Fractional results round up to the next whole unit, the
//! same way the API server's `MilliValue` and `Value` do.

use crate::error::{Error, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube_quantity::{ParseQuantityError, ParsedQuantity};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

const KI: i64 = 1024;
const MI: i64 = KI * 1024;
const GI: i64 = MI * 1024;

/// CPU amount in milli-cores
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CpuMillis(i64);

/// Memory amount in bytes
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemoryBytes(i64);

macro_rules! quantity_ops {
    ($ty:ident) => {
        impl $ty {
            pub const ZERO: $ty = $ty(0);

            pub const fn new(value: i64) -> Self {
                $ty(value)
            }

            pub const fn value(self) -> i64 {
                self.0
            }

            pub const fn is_negative(self) -> bool {
                self.0 < 0
            }
        }

        impl Add for $ty {
            type Output = $ty;

            fn add(self, rhs: $ty) -> $ty {
                $ty(self.0.saturating_add(rhs.0))
            }
        }

        impl Sub for $ty {
            type Output = $ty;

            fn sub(self, rhs: $ty) -> $ty {
                $ty(self.0.saturating_sub(rhs.0))
            }
        }

        impl Sum for $ty {
            fn sum<I: Iterator<Item = $ty>>(iter: I) -> $ty {
                iter.fold($ty::ZERO, |acc, q| acc + q)
            }
        }

        impl From<i64> for $ty {
            fn from(value: i64) -> Self {
                $ty(value)
            }
        }
    };
}

quantity_ops!(CpuMillis);
quantity_ops!(MemoryBytes);

impl fmt::Display for CpuMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl fmt::Display for MemoryBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v != 0 && v % GI == 0 {
            write!(f, "{}Gi", v / GI)
        } else if v != 0 && v % MI == 0 {
            write!(f, "{}Mi", v / MI)
        } else if v != 0 && v % KI == 0 {
            write!(f, "{}Ki", v / KI)
        } else {
            write!(f, "{}", v)
        }
    }
}

/// Parse a CPU quantity into milli-cores
pub fn parse_cpu_millis(quantity: &Quantity) -> Result<CpuMillis> {
    to_units(quantity, Decimal::ONE_THOUSAND).map(CpuMillis)
}

/// Parse a memory quantity into bytes
pub fn parse_memory_bytes(quantity: &Quantity) -> Result<MemoryBytes> {
    to_units(quantity, Decimal::ONE).map(MemoryBytes)
}

/// Express `quantity` in units of `1 / per_whole`, rounding up.
fn to_units(quantity: &Quantity, per_whole: Decimal) -> Result<i64> {
    let raw = quantity.0.as_str();
    let overflow = || Error::QuantityOverflow(raw.to_string());

    let parsed = ParsedQuantity::try_from(quantity).map_err(|err| match err {
        ParseQuantityError::EmptyString => Error::invalid(raw, "empty quantity"),
        ParseQuantityError::ParsingFailed(_) => Error::invalid(raw, "malformed quantity"),
        ParseQuantityError::DecimalParsingFailed => overflow(),
    })?;
    let value = exact_value(raw, &parsed)?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::invalid(raw, "negative quantity"));
    }
    if value.is_zero() && has_nonzero_digit(raw) {
        // too small for the parser to hold
        return Err(overflow());
    }

    value
        .checked_mul(per_whole)
        .and_then(|units| units.ceil().to_i64())
        .ok_or_else(overflow)
}

/// Value of `parsed` in base units.
///
/// `ParsedQuantity` keeps its decimal private, but renders as that decimal
/// followed by the suffix it was parsed with.
fn exact_value(raw: &str, parsed: &ParsedQuantity) -> Result<Decimal> {
    let rendered = parsed.to_string();
    let number = rendered.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let multiplier = match &rendered[number.len()..] {
        "" => Decimal::ONE,
        "m" => Decimal::new(1, 3),
        "k" => Decimal::from(1_000_i64),
        "M" => Decimal::from(1_000_000_i64),
        "G" => Decimal::from(1_000_000_000_i64),
        "T" => Decimal::from(1_000_000_000_000_i64),
        "P" => Decimal::from(1_000_000_000_000_000_i64),
        "E" => Decimal::from(1_000_000_000_000_000_000_i64),
        "Ki" => Decimal::from(KI),
        "Mi" => Decimal::from(MI),
        "Gi" => Decimal::from(GI),
        "Ti" => Decimal::from(GI << 10),
        "Pi" => Decimal::from(GI << 20),
        "Ei" => Decimal::from(GI << 30),
        _ => return Err(Error::invalid(raw, "unknown suffix")),
    };

    Decimal::from_str(number)
        .map_err(|_| Error::invalid(raw, "malformed quantity"))?
        .checked_mul(multiplier)
        .ok_or_else(|| Error::QuantityOverflow(raw.to_string()))
}

fn has_nonzero_digit(raw: &str) -> bool {
    raw.trim_start_matches(['+', '-'])
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .any(|c| c != '0' && c != '.')
}
