//! Multi-file variable reads: concatenate record sets in file order, prune
//! to a requested time window, and hand the result back in the requested
//! memory layout.
//!
//! A read is stateless start to finish. Dependency names and record
//! variance are resolved from the first file only; a file set is assumed
//! homogeneous and temporally ordered, neither of which is re-validated per
//! file. Recoverable conditions (empty variable, window misses the data)
//! come back as warnings with empty arrays, never as errors.

use std::path::PathBuf;

use ndarray::Array1;
use tracing::{debug, warn};

use crate::cdf::{CdfFile, CdfLibrary, ValidationGuard};
use crate::codec::{encode_string, seconds_since_midnight, to_relative_seconds};
use crate::epoch::EpochValue;
use crate::errors::{Error, Result, Warning};
use crate::raw::{self, RawArray};
use crate::window::{select_window, Selection, TimeWindow};

/// Axis ordering of returned arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryLayout {
    /// Record axis outermost (slowest-varying), as the library produces it.
    RowMajor,
    /// Axis order fully reversed: the record axis becomes fastest-varying.
    ColumnMajor,
}

/// How the DEPEND_0 axis is represented in the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochMode {
    /// The raw binary encoding, untouched.
    Raw,
    /// Seconds since midnight of the first selected record's calendar date.
    RelativeSeconds,
    /// Canonical text form per element.
    Strings,
}

/// One read: a variable, an optional time window, and output shaping.
#[derive(Clone, Debug)]
pub struct ReadRequest {
    pub variable: String,
    pub window: Option<TimeWindow>,
    pub layout: MemoryLayout,
    pub epoch_mode: EpochMode,
    /// Value to force the library's validation toggle to for the duration
    /// of this read.
    pub validate: bool,
}

impl ReadRequest {
    pub fn new<S: Into<String>>(variable: S) -> Self {
        Self {
            variable: variable.into(),
            window: None,
            layout: MemoryLayout::RowMajor,
            epoch_mode: EpochMode::Raw,
            validate: true,
        }
    }
}

/// The DEPEND_0 axis in the representation the request asked for.
#[derive(Clone, Debug)]
pub enum EpochOutput {
    Raw(RawArray),
    RelativeSeconds {
        seconds: Array1<f64>,
        /// Midnight of the first selected record's date; `None` when the
        /// selection is empty.
        reference: Option<EpochValue>,
    },
    Strings(Vec<String>),
}

/// Result of a multi-file read.
#[derive(Clone, Debug)]
pub struct VarRead {
    pub data: RawArray,
    /// DEPEND_0, present when the variable has a time axis.
    pub time: Option<EpochOutput>,
    /// DEPEND_1 through DEPEND_3, where resolved.
    pub depends: [Option<RawArray>; 3],
    pub warnings: Vec<Warning>,
}

/// Read one variable and its dependency axes across an ordered set of open
/// files. Record indices into the result are 0-based and window pruning is
/// inclusive on both ends.
pub fn read_across_files<L: CdfLibrary>(
    library: &L,
    files: &[L::File],
    request: &ReadRequest,
) -> Result<VarRead> {
    let _validation = ValidationGuard::new(library, request.validate);

    let first = files
        .first()
        .ok_or_else(|| Error::Cdf("no files to read".to_string()))?;
    let name = request.variable.as_str();

    // Dependency names and record variance from the first file only.
    let mut dep_names: [Option<String>; 4] = Default::default();
    let mut dep_varying = [false; 4];
    for axis in 0..4 {
        dep_names[axis] = first.dependency_name(name, axis)?;
        if let Some(dep) = &dep_names[axis] {
            dep_varying[axis] = first.record_variance(dep)?;
            debug!(
                variable = name,
                axis,
                dependency = dep.as_str(),
                varying = dep_varying[axis],
                "resolved dependency"
            );
        }
    }

    let mut warnings = Vec::new();

    // A variable with nothing written in the first file short-circuits to
    // an empty result rather than failing the whole read.
    if first.record_count(name)? == 0 {
        warn!(variable = name, "variable has no records in first file");
        warnings.push(Warning::EmptyVariable {
            name: name.to_string(),
        });
        let data = first.read_variable(name, true)?;
        let mut deps: [Option<RawArray>; 4] = Default::default();
        for axis in 0..4 {
            if let Some(dep) = &dep_names[axis] {
                deps[axis] = Some(first.read_variable(dep, true)?);
            }
        }
        return assemble(library, data, deps, warnings, request);
    }

    // One read per variable per file: the library's combined multi-variable
    // read is empirically slower than separate full-record reads, so the
    // N-reads pattern is deliberate.
    let mut primary_parts = Vec::with_capacity(files.len());
    let mut dep_parts: [Vec<RawArray>; 4] = Default::default();
    for file in files {
        primary_parts.push(file.read_variable(name, true)?);
        for axis in 0..4 {
            if let (Some(dep), true) = (&dep_names[axis], dep_varying[axis]) {
                dep_parts[axis].push(file.read_variable(dep, true)?);
            }
        }
    }

    // File order is temporal order across the set; concatenation preserves
    // it.
    let mut data = RawArray::concat(primary_parts, name)?;
    let mut deps: [Option<RawArray>; 4] = Default::default();
    for axis in 0..4 {
        if let Some(dep) = &dep_names[axis] {
            deps[axis] = Some(if dep_varying[axis] {
                RawArray::concat(std::mem::take(&mut dep_parts[axis]), dep)?
            } else {
                // Constant axes are identical across the set; the first
                // file's copy is the copy.
                first.read_variable(dep, true)?
            });
        }
    }

    if let Some(window) = &request.window {
        let records = data.records();
        let dep0 = deps[0]
            .as_ref()
            .ok_or_else(|| Error::NoTimeAxis(name.to_string()))?;
        let axis = raw::epoch_axis(dep0, library.version())?;
        let (start, end) = window.resolve(axis.variant())?;

        match select_window(&axis, start.as_ref(), end.as_ref())? {
            Selection::Records(range) => {
                data = data.slice_records(range.first, range.last);
                prune(&mut deps, records, |dep| {
                    dep.slice_records(range.first, range.last)
                });
            }
            Selection::Empty(warning) => {
                warn!(variable = name, ?warning, "window selected no records");
                data = data.truncate_records();
                prune(&mut deps, records, |dep| dep.truncate_records());
                warnings.push(warning);
            }
        }
    }

    assemble(library, data, deps, warnings, request)
}

/// Open every path in order, read across the handles, and close them all
/// regardless of outcome.
pub fn read_across_paths<L: CdfLibrary>(
    library: &L,
    paths: &[PathBuf],
    request: &ReadRequest,
) -> Result<VarRead> {
    // Validation applies at open time as well as read time, so the toggle
    // is scoped around the opens too. The inner guard nests harmlessly.
    let _validation = ValidationGuard::new(library, request.validate);

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match library.open(path) {
            Ok(file) => files.push(file),
            Err(err) => {
                close_all(library, files);
                return Err(err);
            }
        }
    }

    let result = read_across_files(library, &files, request);
    close_all(library, files);
    result
}

fn close_all<L: CdfLibrary>(library: &L, files: Vec<L::File>) {
    for file in files {
        if let Err(err) = library.close(file) {
            warn!(?err, "failed to close cdf file");
        }
    }
}

/// Rewrite record-varying dependency axes in place. The criterion is the
/// leading-dimension match against the primary's record count, so constant
/// axes pass through untouched.
fn prune<F>(deps: &mut [Option<RawArray>; 4], records: usize, mut f: F)
where
    F: FnMut(RawArray) -> RawArray,
{
    for slot in deps.iter_mut() {
        if let Some(dep) = slot.take() {
            *slot = Some(if dep.records() == records { f(dep) } else { dep });
        }
    }
}

/// Shape the pruned arrays into the requested output: epoch representation
/// for DEPEND_0, then layout permutation for every record-varying array.
fn assemble<L: CdfLibrary>(
    library: &L,
    mut data: RawArray,
    mut deps: [Option<RawArray>; 4],
    warnings: Vec<Warning>,
    request: &ReadRequest,
) -> Result<VarRead> {
    let records = data.records();

    let time = match deps[0].take() {
        None => None,
        Some(dep0) => Some(match request.epoch_mode {
            EpochMode::Raw => {
                let dep0 = if request.layout == MemoryLayout::ColumnMajor
                    && dep0.records() == records
                {
                    dep0.reversed_axes()
                } else {
                    dep0
                };
                EpochOutput::Raw(dep0)
            }
            EpochMode::RelativeSeconds => {
                let axis = raw::epoch_axis(&dep0, library.version())?;
                match axis.first() {
                    None => EpochOutput::RelativeSeconds {
                        seconds: Array1::zeros(0),
                        reference: None,
                    },
                    Some(first) => {
                        let (_, midnight) = seconds_since_midnight(first)?;
                        let mut seconds = Vec::with_capacity(axis.len());
                        for value in axis.values() {
                            seconds.push(to_relative_seconds(value, &midnight)?);
                        }
                        EpochOutput::RelativeSeconds {
                            seconds: Array1::from(seconds),
                            reference: Some(midnight),
                        }
                    }
                }
            }
            EpochMode::Strings => {
                let axis = raw::epoch_axis(&dep0, library.version())?;
                EpochOutput::Strings(axis.values().iter().map(encode_string).collect())
            }
        }),
    };

    if request.layout == MemoryLayout::ColumnMajor {
        data = data.reversed_axes();
        prune(&mut deps, records, RawArray::reversed_axes);
    }

    let [_, dep1, dep2, dep3] = deps;
    Ok(VarRead {
        data,
        time,
        depends: [dep1, dep2, dep3],
        warnings,
    })
}
