mod exiftool;

pub use exiftool::{ExifToolReader, ExifToolWriter};

use crate::error::Error;
use std::path::Path;

/// Read side of the tag collaborator contract.
pub trait MetadataReader {
    /// Best capture timestamp for a file, resolved across tag namespaces in
    /// priority order. `None` when no usable value is present.
    fn capture_date(&self, path: &Path) -> Result<Option<String>, Error>;
}

/// Write side of the tag collaborator contract.
pub trait MetadataWriter {
    /// Copy all tags from `source` onto `target` and refresh the modify
    /// date, used when the incoming copy's dates have drifted.
    fn copy_all_tags_and_set_modify_date(&self, source: &Path, target: &Path)
        -> Result<(), Error>;

    /// Set only the modify date on `target`.
    fn set_modify_date(&self, target: &Path, timestamp: &str) -> Result<(), Error>;
}
