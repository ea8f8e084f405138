use std::fs;
use std::path::Path;

use crate::finops::review::error::Result;
use crate::finops::review::narrative::NarrativeDocument;

/// Writes the narrative as pretty-printed JSON keyed by section label.
pub fn write_json(path: &Path, document: &NarrativeDocument) -> Result<()> {
    let json_string = serde_json::to_string_pretty(document)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Reads a narrative previously written by [`write_json`].
pub fn read_json(path: &Path) -> Result<NarrativeDocument> {
    let source = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&source)?)
}

/// Writes the plain text rendering of the narrative.
pub fn write_text(path: &Path, document: &NarrativeDocument) -> Result<()> {
    fs::write(path, document.to_text())?;
    Ok(())
}
