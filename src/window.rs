//! Time-window selection over a monotonic record axis.
//!
//! Given a non-decreasing DEPEND_0 axis and an optional closed interval,
//! find the inclusive run of records inside it. Indices are 0-based and
//! inclusive on both ends throughout. An interval that misses the data
//! entirely is not an error: it comes back as `Selection::Empty` carrying
//! the warning that explains why.

use std::cmp::Ordering;

use crate::codec::{encode_string, parse_string};
use crate::epoch::{EpochValue, EpochVariant, TimeAxis};
use crate::errors::{Error, Result, Warning};

/// Inclusive 0-based record range. Never empty: emptiness is expressed by
/// `Selection::Empty`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordRange {
    pub first: usize,
    pub last: usize,
}

impl RecordRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Outcome of a window selection.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Records(RecordRange),
    /// Nothing matched; the warning says why (after the data, before the
    /// data, or inside a gap).
    Empty(Warning),
}

/// A requested interval as the caller supplies it: ISO-8601-like strings at
/// seconds resolution, either bound optional.
#[derive(Clone, Debug, Default)]
pub struct TimeWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeWindow {
    pub fn new<S: Into<String>>(start: Option<S>, end: Option<S>) -> Self {
        Self {
            start: start.map(Into::into),
            end: end.map(Into::into),
        }
    }

    /// Parse both bounds at the axis's variant.
    pub fn resolve(
        &self,
        variant: EpochVariant,
    ) -> Result<(Option<EpochValue>, Option<EpochValue>)> {
        let start = match &self.start {
            Some(text) => Some(parse_bound(text, variant)?),
            None => None,
        };
        let end = match &self.end {
            Some(text) => Some(parse_bound(text, variant)?),
            None => None,
        };
        Ok((start, end))
    }
}

/// Interval strings carry whole seconds; zero milliseconds are appended
/// before parsing so the canonical parser sees its full form. A string that
/// already has a fractional part is passed through untouched.
fn parse_bound(text: &str, variant: EpochVariant) -> Result<EpochValue> {
    if text.contains('.') {
        parse_string(text, variant)
    } else {
        parse_string(&format!("{text}.000"), variant)
    }
}

/// Locate the inclusive record range of `axis` inside `[start, end]`.
///
/// `start` selects the first record at or after it; `end` selects the last
/// record at or before it; both ends of the interval are closed. Bounds must
/// match the axis variant. The axis is assumed non-decreasing (upstream data
/// contract); an axis that provably is not fails with
/// `NonMonotonicTimeAxis`.
pub fn select_window(
    axis: &TimeAxis,
    start: Option<&EpochValue>,
    end: Option<&EpochValue>,
) -> Result<Selection> {
    // Zero-record variables are screened by the reader before selection
    // ever runs; an empty axis here simply selects nothing.
    if axis.is_empty() {
        return Ok(Selection::Empty(Warning::ProbableDataGap));
    }

    let values = axis.values();
    let n = values.len();

    let first = match start {
        None => 0,
        Some(bound) => {
            check_variant(axis, bound)?;
            // First fit: the first record at or after the start.
            let at_or_after = |v: &EpochValue| {
                matches!(
                    v.partial_cmp(bound),
                    Some(Ordering::Greater) | Some(Ordering::Equal)
                )
            };
            match values.iter().position(at_or_after) {
                Some(first) => first,
                None => {
                    return Ok(Selection::Empty(Warning::NoRecordsAfterStart {
                        last: encode_string(&values[n - 1]),
                    }))
                }
            }
        }
    };

    let last = match end {
        None => n - 1,
        Some(bound) => {
            check_variant(axis, bound)?;
            // Last fit: the last record at or before the end. The end bound
            // is inclusive, same as the start.
            let at_or_before = |v: &EpochValue| {
                matches!(
                    v.partial_cmp(bound),
                    Some(Ordering::Less) | Some(Ordering::Equal)
                )
            };
            match values.iter().rposition(at_or_before) {
                Some(last) => last,
                None => {
                    return Ok(Selection::Empty(Warning::NoRecordsBeforeEnd {
                        first: encode_string(&values[0]),
                    }))
                }
            }
        }
    };

    // Exactly one short of a valid range means the interval fell inside a
    // gap between adjacent samples. Any shorter and the axis cannot have
    // been monotonic in the first place.
    if last + 1 == first {
        Ok(Selection::Empty(Warning::ProbableDataGap))
    } else if (last as i64) < first as i64 - 1 {
        Err(Error::NonMonotonicTimeAxis(first))
    } else {
        Ok(Selection::Records(RecordRange::new(first, last)))
    }
}

fn check_variant(axis: &TimeAxis, bound: &EpochValue) -> Result<()> {
    if bound.variant() != axis.variant() {
        return Err(Error::VariantMismatch {
            expected: axis.variant(),
            actual: bound.variant(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{compute, from_relative_seconds};
    use crate::epoch::TimeComponents;

    /// A day of samples at 10 per second, starting 2015-03-18T00:00:00.
    fn day_axis() -> TimeAxis {
        let base = compute(
            &TimeComponents {
                year: 2015,
                month: 3,
                day: 18,
                ..Default::default()
            },
            EpochVariant::EpochTT2000,
        );
        let values: Vec<EpochValue> = (0..864_000)
            .map(|i| from_relative_seconds(i as f64 / 10.0, &base))
            .collect();
        TimeAxis::new(EpochVariant::EpochTT2000, values).unwrap()
    }

    /// Ten one-second samples with a one-hour gap between indexes 4 and 5.
    fn gapped_axis() -> TimeAxis {
        let base = compute(
            &TimeComponents {
                year: 2015,
                month: 3,
                day: 18,
                ..Default::default()
            },
            EpochVariant::Epoch64,
        );
        let values: Vec<EpochValue> = (0..10)
            .map(|i| {
                let offset = if i <= 4 { i as f64 } else { 3600.0 + i as f64 };
                from_relative_seconds(offset, &base)
            })
            .collect();
        TimeAxis::new(EpochVariant::Epoch64, values).unwrap()
    }

    #[test]
    fn test_no_bounds_selects_everything() {
        let axis = gapped_axis();
        let selection = select_window(&axis, None, None).unwrap();
        assert_eq!(selection, Selection::Records(RecordRange::new(0, 9)));
    }

    #[test]
    fn test_bounds_on_samples_are_inclusive() {
        let axis = day_axis();
        let start = axis.values()[100];
        let end = axis.values()[200];
        let selection = select_window(&axis, Some(&start), Some(&end)).unwrap();
        assert_eq!(selection, Selection::Records(RecordRange::new(100, 200)));
    }

    #[test]
    fn test_start_between_samples_rounds_up() {
        let axis = gapped_axis();
        let base = axis.values()[0];
        // Half a second in: first record at or after is index 1.
        let start = from_relative_seconds(0.5, &base);
        let selection = select_window(&axis, Some(&start), None).unwrap();
        assert_eq!(selection, Selection::Records(RecordRange::new(1, 9)));
    }

    #[test]
    fn test_end_between_samples_rounds_down() {
        let axis = gapped_axis();
        let base = axis.values()[0];
        let end = from_relative_seconds(2.5, &base);
        let selection = select_window(&axis, None, Some(&end)).unwrap();
        assert_eq!(selection, Selection::Records(RecordRange::new(0, 2)));
    }

    #[test]
    fn test_start_after_data() {
        let axis = gapped_axis();
        let base = axis.values()[0];
        let start = from_relative_seconds(7200.0, &base);
        match select_window(&axis, Some(&start), None).unwrap() {
            Selection::Empty(Warning::NoRecordsAfterStart { last }) => {
                assert_eq!(last, "2015-03-18T01:00:09.000");
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_end_before_data() {
        let axis = gapped_axis();
        let base = axis.values()[0];
        let end = from_relative_seconds(-1.0, &base);
        match select_window(&axis, None, Some(&end)).unwrap() {
            Selection::Empty(Warning::NoRecordsBeforeEnd { first }) => {
                assert_eq!(first, "2015-03-18T00:00:00.000");
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_interval_inside_gap() {
        let axis = gapped_axis();
        let base = axis.values()[0];
        // Entirely within the hour-long hole after index 4.
        let start = from_relative_seconds(600.0, &base);
        let end = from_relative_seconds(1200.0, &base);
        let selection = select_window(&axis, Some(&start), Some(&end)).unwrap();
        assert_eq!(selection, Selection::Empty(Warning::ProbableDataGap));
    }

    #[test]
    fn test_non_monotonic_axis_detected() {
        // An out-of-order axis where the first fit lands more than one past
        // the last fit, which no monotonic axis can produce.
        let values: Vec<EpochValue> = [0.0, 1000.0, 8000.0, 2000.0, 9000.0]
            .iter()
            .map(|&ms| EpochValue::Epoch64(ms))
            .collect();
        let axis = TimeAxis::new(EpochVariant::Epoch64, values).unwrap();
        let start = EpochValue::Epoch64(8500.0);
        let end = EpochValue::Epoch64(1500.0);
        assert!(matches!(
            select_window(&axis, Some(&start), Some(&end)),
            Err(Error::NonMonotonicTimeAxis(_))
        ));
    }

    #[test]
    fn test_variant_mismatch_on_bounds() {
        let axis = gapped_axis();
        let start = EpochValue::EpochTT2000(0);
        assert!(matches!(
            select_window(&axis, Some(&start), None),
            Err(Error::VariantMismatch { .. })
        ));
    }

    #[test]
    fn test_window_strings_resolve_with_appended_millis() {
        let window = TimeWindow::new(Some("2015-03-18T00:00:02"), Some("2015-03-18T00:00:04"));
        let (start, end) = window.resolve(EpochVariant::Epoch64).unwrap();
        let axis = gapped_axis();
        let selection =
            select_window(&axis, start.as_ref(), end.as_ref()).unwrap();
        assert_eq!(selection, Selection::Records(RecordRange::new(2, 4)));
    }

    #[test]
    fn test_window_strings_malformed() {
        let window = TimeWindow::new(Some("yesterday"), None);
        assert!(matches!(
            window.resolve(EpochVariant::Epoch64),
            Err(Error::InvalidTimeFormat(_))
        ));
    }
}
