mod calendar;
mod cdf;
mod codec;
mod epoch;
mod errors;
mod raw;
mod reader;
#[cfg(test)]
mod testing;
mod window;

pub use cdf::CdfFile;
pub use cdf::CdfLibrary;
pub use cdf::ValidationGuard;

pub use codec::breakdown;
pub use codec::breakdown_axis;
pub use codec::compute;
pub use codec::compute_fields;
pub use codec::convert;
pub use codec::encode_string;
pub use codec::from_relative_seconds;
pub use codec::parse_string;
pub use codec::seconds_since_midnight;
pub use codec::to_relative_seconds;

pub use epoch::EpochValue;
pub use epoch::EpochVariant;
pub use epoch::LibraryVersion;
pub use epoch::TimeAxis;
pub use epoch::TimeComponents;

pub use errors::Error;
pub use errors::Result;
pub use errors::Warning;

pub use raw::detect_epoch_variant;
pub use raw::epoch_axis;
pub use raw::RawArray;

pub use reader::read_across_files;
pub use reader::read_across_paths;
pub use reader::EpochMode;
pub use reader::EpochOutput;
pub use reader::MemoryLayout;
pub use reader::ReadRequest;
pub use reader::VarRead;

pub use window::select_window;
pub use window::RecordRange;
pub use window::Selection;
pub use window::TimeWindow;
