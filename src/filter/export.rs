//! Score-P filter file output.

use super::state::FilterStateEngine;
use crate::utils::config::{
    FILTER_BLOCK_BEGIN, FILTER_BLOCK_END, FILTER_EXCLUDE_MANGLED, FILTER_FILE_HEADER,
};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Filter file text excluding the given mangled names
pub fn render_filter<'a>(mangled_names: impl IntoIterator<Item = &'a str>) -> String {
    let mut text = String::new();
    for line in [FILTER_FILE_HEADER, FILTER_BLOCK_BEGIN, FILTER_EXCLUDE_MANGLED] {
        text.push_str(line);
        text.push('\n');
    }
    for name in mangled_names {
        text.push('\t');
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(FILTER_BLOCK_END);
    text.push('\n');
    text
}

impl FilterStateEngine {
    /// Filter file for the current exclusions
    ///
    /// **Public** - `None` while nothing is excluded
    pub fn export_exclusions(&self) -> Option<String> {
        if !self.has_filtered() {
            return None;
        }
        let regions = self.regions();
        Some(render_filter(
            self.excluded()
                .iter()
                .map(|&index| regions[index].row.mangled_name.as_str()),
        ))
    }

    /// Write the filter file, replacing any existing file
    ///
    /// **Public** - the target is either fully written or left untouched
    ///
    /// # Returns
    /// `false` when nothing is excluded and no file was written
    ///
    /// # Errors
    /// * `OutputError::InvalidPath` - empty path or a directory
    /// * `OutputError::WriteFailed` - I/O error during write
    pub fn write_filter_file(&self, path: impl AsRef<Path>) -> Result<bool, OutputError> {
        let path = path.as_ref();
        let Some(text) = self.export_exclusions() else {
            debug!("No regions excluded, skipping {}", path.display());
            return Ok(false);
        };

        if path.as_os_str().is_empty() {
            return Err(OutputError::InvalidPath("Path is empty".to_string()));
        }
        if path.is_dir() {
            return Err(OutputError::InvalidPath(format!(
                "Path is a directory: {}",
                path.display()
            )));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(text.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| OutputError::WriteFailed(e.error))?;

        info!(
            "Filter file written: {} ({} regions)",
            path.display(),
            self.excluded().len()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_filter() {
        assert_eq!(
            render_filter(["_Z3foov", "bar"]),
            "#this file is generated bei scoreQt\n\
             SCOREP_REGION_NAMES_BEGIN\n\
             EXCLUDE MANGLED\n\
             \t_Z3foov\n\
             \tbar\n\
             SCOREP_REGION_NAMES_END\n"
        );
    }

    #[test]
    fn test_render_empty_filter() {
        let text = render_filter(std::iter::empty());
        assert_eq!(text.lines().count(), 4);
        assert!(!text.contains('\t'));
    }
}
