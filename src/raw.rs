//! Typed raw arrays as handed back by the external CDF library.
//!
//! `RawArray` plays the role the tagged chunk enum plays elsewhere in this
//! codebase's lineage: one closed variant per element type, so the rest of
//! the crate dispatches on a tag instead of inspecting shapes and dtypes ad
//! hoc. The one place shape inspection is allowed is `detect_epoch_variant`,
//! the adapter that recovers which epoch encoding a DEPEND_0 axis uses.

use ndarray::{concatenate, ArrayD, Axis, Slice};

use crate::epoch::{EpochValue, EpochVariant, LibraryVersion, TimeAxis};
use crate::errors::{Error, Result};

/// A variable's full record set in one of the element types CDF stores.
/// The outermost axis is the record axis.
#[derive(Clone, Debug, PartialEq)]
pub enum RawArray {
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Run `$body` with `$a` bound to the typed payload, same expression for
/// every variant.
macro_rules! on_payload {
    ($self:expr, $a:ident => $body:expr) => {
        match $self {
            RawArray::I32($a) => $body,
            RawArray::U32($a) => $body,
            RawArray::I64($a) => $body,
            RawArray::U64($a) => $body,
            RawArray::F32($a) => $body,
            RawArray::F64($a) => $body,
        }
    };
}

/// Like `on_payload`, but rewraps the result in the same variant.
macro_rules! map_payload {
    ($self:expr, $a:ident => $body:expr) => {
        match $self {
            RawArray::I32($a) => RawArray::I32($body),
            RawArray::U32($a) => RawArray::U32($body),
            RawArray::I64($a) => RawArray::I64($body),
            RawArray::U64($a) => RawArray::U64($body),
            RawArray::F32($a) => RawArray::F32($body),
            RawArray::F64($a) => RawArray::F64($body),
        }
    };
}

impl RawArray {
    pub fn shape(&self) -> &[usize] {
        on_payload!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        on_payload!(self, a => a.ndim())
    }

    /// Length of the record (outermost) axis.
    pub fn records(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.records() == 0
    }

    /// Keep records `first..=last` (inclusive on both ends, 0-based, per the
    /// crate-wide index convention).
    pub fn slice_records(&self, first: usize, last: usize) -> RawArray {
        map_payload!(self, a => a.slice_axis(Axis(0), Slice::from(first..last + 1)).to_owned())
    }

    /// Drop every record but keep shape and type.
    pub fn truncate_records(&self) -> RawArray {
        map_payload!(self, a => a.slice_axis(Axis(0), Slice::from(0..0)).to_owned())
    }

    /// Reverse the axis order: the record axis moves from slowest-varying to
    /// fastest-varying. This is the whole of the "column-major" layout; a
    /// full reversal is its own inverse.
    pub fn reversed_axes(self) -> RawArray {
        map_payload!(self, a => a.reversed_axes())
    }

    /// Concatenate per-file record sets in file order. All pieces must share
    /// an element type and trailing dimensions; `name` is only for the error
    /// message.
    pub fn concat(pieces: Vec<RawArray>, name: &str) -> Result<RawArray> {
        let mut iter = pieces.into_iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return Err(Error::BadName(name.to_string())),
        };

        macro_rules! concat_as {
            ($variant:ident, $head:expr) => {{
                let mut arrays = vec![$head];
                for piece in iter {
                    match piece {
                        RawArray::$variant(a) => arrays.push(a),
                        _ => return Err(Error::InconsistentType(name.to_string())),
                    }
                }
                let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
                concatenate(Axis(0), &views)
                    .map(RawArray::$variant)
                    .map_err(|_| Error::InconsistentType(name.to_string()))
            }};
        }

        match first {
            RawArray::I32(a) => concat_as!(I32, a),
            RawArray::U32(a) => concat_as!(U32, a),
            RawArray::I64(a) => concat_as!(I64, a),
            RawArray::U64(a) => concat_as!(U64, a),
            RawArray::F32(a) => concat_as!(F32, a),
            RawArray::F64(a) => concat_as!(F64, a),
        }
    }

    fn describe(&self) -> String {
        let kind = match self {
            RawArray::I32(_) => "i32",
            RawArray::U32(_) => "u32",
            RawArray::I64(_) => "i64",
            RawArray::U64(_) => "u64",
            RawArray::F32(_) => "f32",
            RawArray::F64(_) => "f64",
        };
        format!("{kind} array of shape {:?}", self.shape())
    }
}

/// Recover which epoch encoding a raw DEPEND_0 axis uses from its concrete
/// shape, disambiguated by the version of the library that produced it.
///
/// Rules:
/// - 1-D f64: EPOCH (millisecond doubles).
/// - 2-D f64: EPOCH16 pairs. Libraries 3.5.1 and later hand these back as
///   `[n, 2]` (one seconds/picoseconds pair per record); earlier libraries
///   hand back the transpose, `[2, n]`.
/// - 1-D i64: TT2000.
/// Anything else is `UnrecognizedEpochShape`.
pub fn detect_epoch_variant(raw: &RawArray, version: LibraryVersion) -> Result<EpochVariant> {
    match raw {
        RawArray::F64(a) if a.ndim() == 1 => Ok(EpochVariant::Epoch64),
        RawArray::F64(a) if a.ndim() == 2 => {
            let pair_axis = if version.epoch128_transposed() { 0 } else { 1 };
            if a.shape()[pair_axis] == 2 {
                Ok(EpochVariant::Epoch128)
            } else {
                Err(Error::UnrecognizedEpochShape(raw.describe()))
            }
        }
        RawArray::I64(a) if a.ndim() == 1 => Ok(EpochVariant::EpochTT2000),
        _ => Err(Error::UnrecognizedEpochShape(raw.describe())),
    }
}

/// Lift a raw DEPEND_0 axis into a typed `TimeAxis`.
pub fn epoch_axis(raw: &RawArray, version: LibraryVersion) -> Result<TimeAxis> {
    let variant = detect_epoch_variant(raw, version)?;
    let values = match (variant, raw) {
        (EpochVariant::Epoch64, RawArray::F64(a)) => {
            a.iter().map(|&ms| EpochValue::Epoch64(ms)).collect()
        }
        (EpochVariant::Epoch128, RawArray::F64(a)) => {
            let n = if version.epoch128_transposed() {
                a.shape()[1]
            } else {
                a.shape()[0]
            };
            (0..n)
                .map(|i| {
                    let (seconds, picoseconds) = if version.epoch128_transposed() {
                        (a[[0, i]], a[[1, i]])
                    } else {
                        (a[[i, 0]], a[[i, 1]])
                    };
                    EpochValue::Epoch128 {
                        seconds: seconds as i64,
                        picoseconds: picoseconds as i64,
                    }
                })
                .collect()
        }
        (EpochVariant::EpochTT2000, RawArray::I64(a)) => {
            a.iter().map(|&ns| EpochValue::EpochTT2000(ns)).collect()
        }
        _ => unreachable!("detect_epoch_variant only matches these shapes"),
    };
    TimeAxis::new(variant, values)
}
