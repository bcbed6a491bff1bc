//! Seam to the external CDF access library.
//!
//! File handles, metadata lookup, and the binary record decoder live on the
//! other side of these traits; this crate only consumes them. The one piece
//! of shared state the external library exposes is a process-wide "validate
//! files on open" toggle, wrapped here as a scoped guard so no exit path
//! can leak a changed setting into unrelated reads.

use std::path::Path;

use crate::epoch::LibraryVersion;
use crate::errors::Result;
use crate::raw::RawArray;

/// One open CDF file.
pub trait CdfFile {
    /// Read a variable's full record set as a typed array, record axis
    /// outermost. `epoch_as_raw` asks the library to hand epoch-typed
    /// values back in their binary encoding instead of converting them;
    /// this crate always wants them raw and does its own conversion.
    fn read_variable(&self, name: &str, epoch_as_raw: bool) -> Result<RawArray>;

    /// Resolved DEPEND_{axis} variable name for `variable`, if the
    /// attribute entry exists. `axis` is 0 (time) through 3.
    fn dependency_name(&self, variable: &str, axis: usize) -> Result<Option<String>>;

    /// Number of records written for `variable`.
    fn record_count(&self, variable: &str) -> Result<u64>;

    /// Whether `variable` varies by record or is a single constant value.
    fn record_variance(&self, variable: &str) -> Result<bool>;
}

/// The CDF library itself: handle lifecycle plus the process-wide state it
/// carries.
pub trait CdfLibrary {
    type File: CdfFile;

    fn open(&self, path: &Path) -> Result<Self::File>;
    fn close(&self, file: Self::File) -> Result<()>;

    /// Current value of the global file-validation toggle.
    fn validation(&self) -> bool;

    /// Set the global file-validation toggle. Affects every subsequent open
    /// in the process, which is why callers must go through
    /// `ValidationGuard` instead of calling this directly.
    fn set_validation(&self, enabled: bool);

    /// Version of the underlying library, used to disambiguate EPOCH16
    /// array shapes (see `LibraryVersion::epoch128_transposed`).
    fn version(&self) -> LibraryVersion;
}

/// Scoped override of the library's validation toggle: saves the current
/// setting, forces the requested one, and restores the saved setting when
/// dropped, on success and failure alike.
pub struct ValidationGuard<'a, L: CdfLibrary> {
    library: &'a L,
    saved: bool,
}

impl<'a, L: CdfLibrary> ValidationGuard<'a, L> {
    pub fn new(library: &'a L, enabled: bool) -> Self {
        let saved = library.validation();
        library.set_validation(enabled);
        Self { library, saved }
    }
}

impl<L: CdfLibrary> Drop for ValidationGuard<'_, L> {
    fn drop(&mut self) {
        self.library.set_validation(self.saved);
    }
}
