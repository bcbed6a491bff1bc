//! Stateless conversion engine for CDF epochs.
//!
//! Everything here is a pure function over `EpochValue` and
//! `TimeComponents`: calendar decomposition and its inverse, the canonical
//! text form, cross-variant conversion, and relative-seconds arithmetic.
//! TT2000 leap-second handling leans on the bundled TAI-UTC table in
//! `calendar`; this crate does not derive leap seconds from first
//! principles.

use crate::calendar::{
    civil_from_days, days_from_civil, delta_at, delta_at_from_sum, DAYS_0000_TO_2000, SECS_PER_DAY,
};
use crate::errors::{Error, Result};
use crate::epoch::{EpochValue, EpochVariant, TimeAxis, TimeComponents};

const MILLIS_PER_DAY: i64 = SECS_PER_DAY * 1_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;
const PICOS_PER_SEC: i64 = 1_000_000_000_000;

/// TT = TAI + 32.184s, in nanoseconds.
const TT_MINUS_TAI_NS: i64 = 32_184_000_000;

/// Seconds from 0000-01-01T00:00:00 to 2000-01-01T12:00:00, the TT2000
/// reference instant on the UTC label axis.
const J2000_SECS_FROM_0000: i64 = DAYS_0000_TO_2000 * SECS_PER_DAY + SECS_PER_DAY / 2;

/// Encode calendar components as an epoch of the given variant. Fields
/// beyond the variant's resolution are truncated: Epoch64 keeps through
/// milliseconds, TT2000 through nanoseconds, Epoch128 through picoseconds.
pub fn compute(c: &TimeComponents, variant: EpochVariant) -> EpochValue {
    let days = days_from_civil(c.year, c.month, c.day);
    let tod = (c.hour as i64) * 3_600 + (c.minute as i64) * 60 + c.second as i64;

    match variant {
        EpochVariant::Epoch64 => {
            let millis = (days * SECS_PER_DAY + tod) * 1_000 + c.millisecond as i64;
            EpochValue::Epoch64(millis as f64)
        }
        EpochVariant::Epoch128 => {
            let picoseconds = (c.millisecond as i64) * 1_000_000_000
                + (c.microsecond as i64) * 1_000_000
                + (c.nanosecond as i64) * 1_000
                + c.picosecond as i64;
            EpochValue::Epoch128 {
                seconds: days * SECS_PER_DAY + tod,
                picoseconds,
            }
        }
        EpochVariant::EpochTT2000 => {
            // UTC label seconds since J2000, then onto the TT axis by adding
            // the TAI-UTC offset for the date and the fixed TT-TAI offset.
            // A 23:59:60 leap entry lands inside the inserted second
            // naturally: the offset lookup still sees the old date.
            let label = days * SECS_PER_DAY + tod - J2000_SECS_FROM_0000;
            let sum = label + delta_at(c.year, c.month, c.day);
            let subsec_ns = (c.millisecond as i64) * 1_000_000
                + (c.microsecond as i64) * 1_000
                + c.nanosecond as i64;
            EpochValue::EpochTT2000(sum * NANOS_PER_SEC + TT_MINUS_TAI_NS + subsec_ns)
        }
    }
}

/// The spec'd variable-length entry point: component fields in order
/// (year, month, day, hour, ...), at least three required.
pub fn compute_fields(fields: &[i64], variant: EpochVariant) -> Result<EpochValue> {
    let c = TimeComponents::from_slice(fields)?;
    Ok(compute(&c, variant))
}

/// Decompose an epoch into calendar components. All ten fields are always
/// populated; fields the variant does not carry come back zero.
pub fn breakdown(epoch: &EpochValue) -> TimeComponents {
    match *epoch {
        EpochValue::Epoch64(millis) => {
            // The f64 domain holds an integer count; round rather than
            // truncate so values that picked up representation error on the
            // way in land on the intended millisecond.
            let total = millis.round() as i64;
            let days = total.div_euclid(MILLIS_PER_DAY);
            let rem = total.rem_euclid(MILLIS_PER_DAY);
            let (year, month, day) = civil_from_days(days);
            TimeComponents {
                year,
                month,
                day,
                hour: (rem / 3_600_000) as u32,
                minute: (rem / 60_000 % 60) as u32,
                second: (rem / 1_000 % 60) as u32,
                millisecond: (rem % 1_000) as u32,
                ..Default::default()
            }
        }
        EpochValue::Epoch128 {
            seconds,
            picoseconds,
        } => {
            let days = seconds.div_euclid(SECS_PER_DAY);
            let rem = seconds.rem_euclid(SECS_PER_DAY);
            let (year, month, day) = civil_from_days(days);
            TimeComponents {
                year,
                month,
                day,
                hour: (rem / 3_600) as u32,
                minute: (rem / 60 % 60) as u32,
                second: (rem % 60) as u32,
                millisecond: (picoseconds / 1_000_000_000) as u32,
                microsecond: (picoseconds / 1_000_000 % 1_000) as u32,
                nanosecond: (picoseconds / 1_000 % 1_000) as u32,
                picosecond: (picoseconds % 1_000) as u32,
            }
        }
        EpochValue::EpochTT2000(nanos) => {
            let tai = nanos - TT_MINUS_TAI_NS;
            let sum = tai.div_euclid(NANOS_PER_SEC);
            let subsec = tai.rem_euclid(NANOS_PER_SEC);
            let (offset, in_leap) = delta_at_from_sum(sum);
            let mut utc = sum - offset;
            if in_leap {
                // We are inside an inserted leap second; step back one label
                // second and render it as second 60 of the previous minute.
                utc -= 1;
            }
            let since_0000 = utc + J2000_SECS_FROM_0000;
            let days = since_0000.div_euclid(SECS_PER_DAY);
            let rem = since_0000.rem_euclid(SECS_PER_DAY);
            let (year, month, day) = civil_from_days(days);
            TimeComponents {
                year,
                month,
                day,
                hour: (rem / 3_600) as u32,
                minute: (rem / 60 % 60) as u32,
                second: (rem % 60) as u32 + if in_leap { 1 } else { 0 },
                millisecond: (subsec / 1_000_000) as u32,
                microsecond: (subsec / 1_000 % 1_000) as u32,
                nanosecond: (subsec % 1_000) as u32,
                ..Default::default()
            }
        }
    }
}

/// Elementwise `breakdown` over a whole axis.
pub fn breakdown_axis(axis: &TimeAxis) -> Vec<TimeComponents> {
    axis.values().iter().map(breakdown).collect()
}

/// Canonical text form, precision fixed by variant:
/// `yyyy-mm-ddThh:mm:ss.mmm` (Epoch64), `...mmmuuunnn` (TT2000),
/// `...mmmuuunnnppp` (Epoch128).
pub fn encode_string(epoch: &EpochValue) -> String {
    let c = breakdown(epoch);
    let prefix = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        c.year, c.month, c.day, c.hour, c.minute, c.second
    );
    match epoch.variant() {
        EpochVariant::Epoch64 => format!("{prefix}.{:03}", c.millisecond),
        EpochVariant::EpochTT2000 => format!(
            "{prefix}.{:03}{:03}{:03}",
            c.millisecond, c.microsecond, c.nanosecond
        ),
        EpochVariant::Epoch128 => format!(
            "{prefix}.{:03}{:03}{:03}{:03}",
            c.millisecond, c.microsecond, c.nanosecond, c.picosecond
        ),
    }
}

/// Parse the canonical text form. The fractional part is optional and may
/// carry up to the variant's resolution (3, 9, or 12 digits); anything else
/// is `InvalidTimeFormat`.
pub fn parse_string(text: &str, variant: EpochVariant) -> Result<EpochValue> {
    let bad = || Error::InvalidTimeFormat(text.to_string());

    let (date, time) = text.split_once('T').ok_or_else(bad)?;

    let mut date_parts = date.splitn(3, '-');
    let year: i64 = next_number(&mut date_parts, text)?;
    let month: u32 = next_number(&mut date_parts, text)?;
    let day: u32 = next_number(&mut date_parts, text)?;

    let mut time_parts = time.splitn(3, ':');
    let hour: u32 = next_number(&mut time_parts, text)?;
    let minute: u32 = next_number(&mut time_parts, text)?;
    let seconds_field: &str = time_parts.next().ok_or_else(bad)?;

    let (second, fraction) = match seconds_field.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (seconds_field, None),
    };
    let second: u32 = second.parse().map_err(|_| bad())?;

    // Second 60 is legal only in the leap-aware encoding.
    let max_second = if variant == EpochVariant::EpochTT2000 {
        60
    } else {
        59
    };
    if month < 1 || month > 12 || day < 1 || day > 31 || hour > 23 || minute > 59
        || second > max_second
    {
        return Err(bad());
    }

    let max_digits = match variant {
        EpochVariant::Epoch64 => 3,
        EpochVariant::EpochTT2000 => 9,
        EpochVariant::Epoch128 => 12,
    };
    let mut picos: i64 = 0;
    if let Some(frac) = fraction {
        if frac.is_empty() || frac.len() > max_digits || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        // Right-pad to picosecond resolution, then let compute truncate back
        // down to what the variant stores.
        let padded: i64 = frac.parse().map_err(|_| bad())?;
        picos = padded * 10_i64.pow(12 - frac.len() as u32);
    }

    let c = TimeComponents {
        year,
        month,
        day,
        hour,
        minute,
        second,
        millisecond: (picos / 1_000_000_000) as u32,
        microsecond: (picos / 1_000_000 % 1_000) as u32,
        nanosecond: (picos / 1_000 % 1_000) as u32,
        picosecond: (picos % 1_000) as u32,
    };
    Ok(compute(&c, variant))
}

fn next_number<'a, T, I>(parts: &mut I, text: &str) -> Result<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| Error::InvalidTimeFormat(text.to_string()))
}

/// Convert an epoch to another variant, strictly via breakdown followed by
/// compute so rounding and truncation behave identically everywhere.
/// Identity conversions return the input unchanged.
pub fn convert(epoch: &EpochValue, to: EpochVariant) -> EpochValue {
    if epoch.variant() == to {
        return *epoch;
    }
    compute(&breakdown(epoch), to)
}

/// Seconds elapsed from `reference` to `epoch`. Both must share a variant.
///
/// Epoch128 keeps the whole-second delta in integer arithmetic and only the
/// sub-second remainder in floating point: merging seconds and picoseconds
/// into one double would shed precision for any modern date.
pub fn to_relative_seconds(epoch: &EpochValue, reference: &EpochValue) -> Result<f64> {
    // Scaling divides by the exactly-representable powers of ten rather
    // than multiplying by their inexact reciprocals, so round deltas come
    // out exact.
    match (*epoch, *reference) {
        (EpochValue::Epoch64(a), EpochValue::Epoch64(b)) => Ok((a - b) / 1e3),
        (
            EpochValue::Epoch128 {
                seconds: s1,
                picoseconds: p1,
            },
            EpochValue::Epoch128 {
                seconds: s2,
                picoseconds: p2,
            },
        ) => Ok((s1 - s2) as f64 + (p1 - p2) as f64 / 1e12),
        (EpochValue::EpochTT2000(a), EpochValue::EpochTT2000(b)) => Ok((a - b) as f64 / 1e9),
        _ => Err(Error::VariantMismatch {
            expected: reference.variant(),
            actual: epoch.variant(),
        }),
    }
}

/// Inverse of `to_relative_seconds`: the epoch `seconds` after `reference`,
/// in the reference's variant.
pub fn from_relative_seconds(seconds: f64, reference: &EpochValue) -> EpochValue {
    match *reference {
        EpochValue::Epoch64(base) => EpochValue::Epoch64(base + seconds * 1e3),
        EpochValue::Epoch128 {
            seconds: base_secs,
            picoseconds: base_picos,
        } => {
            let whole = seconds.floor();
            let frac_picos = ((seconds - whole) * 1e12).round() as i64;
            let mut secs = base_secs + whole as i64;
            let mut picos = base_picos + frac_picos;
            secs += picos.div_euclid(PICOS_PER_SEC);
            picos = picos.rem_euclid(PICOS_PER_SEC);
            EpochValue::Epoch128 {
                seconds: secs,
                picoseconds: picos,
            }
        }
        EpochValue::EpochTT2000(base) => EpochValue::EpochTT2000(base + (seconds * 1e9).round() as i64),
    }
}

/// Seconds since midnight of the epoch's own calendar date, along with the
/// midnight epoch used as the reference.
pub fn seconds_since_midnight(epoch: &EpochValue) -> Result<(f64, EpochValue)> {
    let c = breakdown(epoch);
    let midnight = compute(
        &TimeComponents {
            year: c.year,
            month: c.month,
            day: c.day,
            ..Default::default()
        },
        epoch.variant(),
    );
    let seconds = to_relative_seconds(epoch, &midnight)?;
    Ok((seconds, midnight))
}
