//! Shared test fixtures: an in-memory stand-in for the external CDF
//! library so reader and guard behavior can be exercised without files on
//! disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::cdf::{CdfFile, CdfLibrary};
use crate::epoch::LibraryVersion;
use crate::errors::{Error, Result};
use crate::raw::RawArray;

#[derive(Clone)]
struct MemoryVariable {
    data: RawArray,
    depends: [Option<String>; 4],
    variance: bool,
}

/// One canned file: a name -> variable map. Cloned out of the library on
/// `open`, so a handle is just a snapshot.
#[derive(Clone, Default)]
pub struct MemoryFile {
    variables: HashMap<String, MemoryVariable>,
}

impl MemoryFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record-varying variable with its DEPEND_0..3 names.
    pub fn variable(
        mut self,
        name: &str,
        data: RawArray,
        depends: [Option<&str>; 4],
    ) -> Self {
        self.insert(name, data, depends, true);
        self
    }

    /// Add a constant (non-record-variant) variable.
    pub fn constant(mut self, name: &str, data: RawArray) -> Self {
        self.insert(name, data, [None, None, None, None], false);
        self
    }

    fn insert(
        &mut self,
        name: &str,
        data: RawArray,
        depends: [Option<&str>; 4],
        variance: bool,
    ) {
        self.variables.insert(
            name.to_string(),
            MemoryVariable {
                data,
                depends: depends.map(|d| d.map(str::to_string)),
                variance,
            },
        );
    }

    fn lookup(&self, name: &str) -> Result<&MemoryVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| Error::BadName(name.to_string()))
    }
}

impl CdfFile for MemoryFile {
    fn read_variable(&self, name: &str, _epoch_as_raw: bool) -> Result<RawArray> {
        Ok(self.lookup(name)?.data.clone())
    }

    fn dependency_name(&self, variable: &str, axis: usize) -> Result<Option<String>> {
        Ok(self.lookup(variable)?.depends.get(axis).cloned().flatten())
    }

    fn record_count(&self, variable: &str) -> Result<u64> {
        Ok(self.lookup(variable)?.data.records() as u64)
    }

    fn record_variance(&self, variable: &str) -> Result<bool> {
        Ok(self.lookup(variable)?.variance)
    }
}

/// The library: canned files by path, a process-wide validation toggle, and
/// a reported version.
pub struct MemoryCdf {
    files: Mutex<HashMap<PathBuf, MemoryFile>>,
    validation: Mutex<bool>,
    version: LibraryVersion,
}

impl MemoryCdf {
    pub fn new(version: LibraryVersion) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            validation: Mutex::new(false),
            version,
        }
    }

    /// A library reporting a post-3.5.1 version.
    pub fn modern() -> Self {
        Self::new(LibraryVersion::new(3, 8, 0))
    }

    pub fn add_file(&self, path: &str, file: MemoryFile) {
        self.files.lock().insert(PathBuf::from(path), file);
    }
}

impl CdfLibrary for MemoryCdf {
    type File = MemoryFile;

    fn open(&self, path: &Path) -> Result<MemoryFile> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Cdf(format!("no such file: {}", path.display())))
    }

    fn close(&self, _file: MemoryFile) -> Result<()> {
        Ok(())
    }

    fn validation(&self) -> bool {
        *self.validation.lock()
    }

    fn set_validation(&self, enabled: bool) {
        *self.validation.lock() = enabled;
    }

    fn version(&self) -> LibraryVersion {
        self.version
    }
}
