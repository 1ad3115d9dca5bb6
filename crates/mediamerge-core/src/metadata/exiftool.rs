use super::{MetadataReader, MetadataWriter};
use crate::error::Error;
use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Cameras and some exporters write this instead of omitting the tag.
const ZERO_SENTINEL: &str = "0000:00:00 00:00:00";

/// Tag namespaces tried in priority order.
const TAG_PRIORITY: &[&str] = &[
    "XMP:DateTimeOriginal",
    "EXIF:DateTimeOriginal",
    "QuickTime:DateTimeOriginal",
];

/// Capture-date reader shelling out to the `exiftool` binary with JSON
/// output.
pub struct ExifToolReader;

impl MetadataReader for ExifToolReader {
    fn capture_date(&self, path: &Path) -> Result<Option<String>, Error> {
        let output = Command::new("exiftool")
            .arg("-j")
            .arg("-G")
            .arg("-DateTimeOriginal")
            .arg(path)
            .output()
            .map_err(|err| Error::Metadata(format!("Could not run exiftool: {}", err)))?;

        if !output.status.success() {
            return Err(Error::Metadata(format!(
                "exiftool exited with {} for {}",
                output.status,
                path.display()
            )));
        }

        let entries: Vec<Value> = serde_json::from_slice(&output.stdout)
            .map_err(|err| Error::Metadata(format!("Unreadable exiftool output: {}", err)))?;
        let Some(entry) = entries.first() else {
            return Ok(None);
        };

        let found = TAG_PRIORITY
            .iter()
            .find_map(|tag| entry.get(*tag).and_then(Value::as_str));
        debug!("Capture date for {}: {:?}", path.display(), found);

        Ok(found
            .filter(|value| *value != ZERO_SENTINEL)
            .map(str::to_owned))
    }
}

/// Tag writer shelling out to the `exiftool` binary, rewriting files in
/// place.
pub struct ExifToolWriter;

impl MetadataWriter for ExifToolWriter {
    fn copy_all_tags_and_set_modify_date(
        &self,
        source: &Path,
        target: &Path,
    ) -> Result<(), Error> {
        let mut cmd = Command::new("exiftool");
        cmd.arg("-TagsFromFile")
            .arg(source)
            .arg("-alldates")
            .arg("-FileModifyDate")
            .arg(target)
            .arg("-overwrite_original");
        run(cmd)
    }

    fn set_modify_date(&self, target: &Path, timestamp: &str) -> Result<(), Error> {
        let mut cmd = Command::new("exiftool");
        cmd.arg(format!("-FileModifyDate={}", timestamp))
            .arg(target)
            .arg("-overwrite_original");
        run(cmd)
    }
}

fn run(mut cmd: Command) -> Result<(), Error> {
    let output = cmd
        .output()
        .map_err(|err| Error::Metadata(format!("Could not run exiftool: {}", err)))?;
    if !output.status.success() {
        return Err(Error::Metadata(format!(
            "exiftool exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
