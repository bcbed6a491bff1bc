//! The three CDF epoch encodings as one tagged value type.
//!
//! CDF files carry timestamps in one of three binary encodings: EPOCH
//! (milliseconds since year 0 as a double), EPOCH16 (a seconds/picoseconds
//! pair since year 0), and TT2000 (nanoseconds since J2000 on the
//! Terrestrial Time scale). Downstream code matches on `EpochValue`
//! exhaustively instead of re-inspecting array shapes; shape inspection
//! happens exactly once, at the raw-array boundary (see `raw`).

use std::cmp::Ordering;

use crate::errors::{Error, Result};

/// Which of the three CDF epoch encodings a value uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochVariant {
    /// CDF_EPOCH: millisecond resolution, double domain.
    Epoch64,
    /// CDF_EPOCH16: picosecond resolution, seconds/picoseconds pair.
    Epoch128,
    /// CDF_TIME_TT2000: nanosecond resolution, leap-second aware.
    EpochTT2000,
}

/// A single CDF timestamp.
#[derive(Clone, Copy, Debug)]
pub enum EpochValue {
    /// Milliseconds since 0000-01-01T00:00:00 (proleptic Gregorian). The
    /// domain is f64 because that is how CDF stores it, but the value is
    /// semantically an integer count of milliseconds.
    Epoch64(f64),

    /// Whole seconds since 0000-01-01T00:00:00 plus picoseconds of second,
    /// picoseconds in [0, 1e12). The two parts are never merged into one
    /// double: whole seconds exceed f64's exact-integer range long before
    /// year 9999 once scaled to picoseconds.
    Epoch128 { seconds: i64, picoseconds: i64 },

    /// Nanoseconds since 2000-01-01T12:00:00 TT, leap seconds included.
    EpochTT2000(i64),
}

impl EpochValue {
    pub fn variant(&self) -> EpochVariant {
        match self {
            EpochValue::Epoch64(_) => EpochVariant::Epoch64,
            EpochValue::Epoch128 { .. } => EpochVariant::Epoch128,
            EpochValue::EpochTT2000(_) => EpochVariant::EpochTT2000,
        }
    }

    /// Compare against another epoch of the same variant, or fail with
    /// `VariantMismatch`. The `PartialOrd` impl returns `None` for mixed
    /// variants; this is the error-carrying version for public call sites.
    pub fn compare(&self, other: &EpochValue) -> Result<Ordering> {
        self.partial_cmp(other).ok_or(Error::VariantMismatch {
            expected: self.variant(),
            actual: other.variant(),
        })
    }
}

impl PartialEq for EpochValue {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.partial_cmp(other), Some(Ordering::Equal))
    }
}

impl PartialOrd for EpochValue {
    /// Ordering is defined within a variant only. Comparing across variants
    /// yields `None`; converting first is the caller's job.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (EpochValue::Epoch64(a), EpochValue::Epoch64(b)) => a.partial_cmp(b),
            (
                EpochValue::Epoch128 {
                    seconds: s1,
                    picoseconds: p1,
                },
                EpochValue::Epoch128 {
                    seconds: s2,
                    picoseconds: p2,
                },
            ) => Some((s1, p1).cmp(&(s2, p2))),
            (EpochValue::EpochTT2000(a), EpochValue::EpochTT2000(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Calendar decomposition of an epoch. Every field is always present;
/// variants that do not carry a field report it as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeComponents {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    pub microsecond: u32,
    pub nanosecond: u32,
    pub picosecond: u32,
}

impl TimeComponents {
    /// Build components from a caller-supplied vector in field order
    /// (year, month, day, hour, minute, second, millisecond, microsecond,
    /// nanosecond, picosecond). Trailing fields default to zero; fewer than
    /// year/month/day is `InsufficientTimeComponents`.
    pub fn from_slice(fields: &[i64]) -> Result<Self> {
        if fields.len() < 3 {
            return Err(Error::InsufficientTimeComponents);
        }
        let get = |i: usize| fields.get(i).copied().unwrap_or(0) as u32;
        Ok(Self {
            year: fields[0],
            month: fields[1] as u32,
            day: fields[2] as u32,
            hour: get(3),
            minute: get(4),
            second: get(5),
            millisecond: get(6),
            microsecond: get(7),
            nanosecond: get(8),
            picosecond: get(9),
        })
    }
}

/// An ordered sequence of epochs of a single variant: a file's (or a
/// concatenation of files') DEPEND_0. Assumed non-decreasing; that is an
/// upstream data contract, not validated here.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    variant: EpochVariant,
    values: Vec<EpochValue>,
}

impl TimeAxis {
    /// Build an axis, rejecting mixed variants.
    pub fn new(variant: EpochVariant, values: Vec<EpochValue>) -> Result<Self> {
        for value in &values {
            if value.variant() != variant {
                return Err(Error::VariantMismatch {
                    expected: variant,
                    actual: value.variant(),
                });
            }
        }
        Ok(Self { variant, values })
    }

    pub fn variant(&self) -> EpochVariant {
        self.variant
    }

    pub fn values(&self) -> &[EpochValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&EpochValue> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&EpochValue> {
        self.values.last()
    }
}

/// Version of the external CDF library that produced a raw array.
///
/// EPOCH16 axes changed memory shape in 3.5.1: earlier libraries hand back
/// the pair axis transposed. The reader passes this hint down so shape
/// detection never has to guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LibraryVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl LibraryVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// Whether EPOCH16 arrays arrive as `[2, n]` (pre-3.5.1) instead of
    /// `[n, 2]`.
    pub fn epoch128_transposed(&self) -> bool {
        *self < LibraryVersion::new(3, 5, 1)
    }
}
