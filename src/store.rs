use crate::row::{
    csv_record,
    Row,
};
use color_eyre::Result;
use eyre::Context as _;
use speedlog_config::FieldSelector;
use std::{
    fs::{
        self,
        OpenOptions,
    },
    io::{
        ErrorKind,
        Write as _,
    },
    path::{
        Path,
        PathBuf,
    },
};

/// Append-only CSV log of measurements.
///
/// Every call opens, writes, syncs and closes the file on its own, so a row is either fully on
/// disk or not written at all. There is a single writer; nothing is locked.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the header if the log does not exist yet or is empty. Returns whether it did.
    ///
    /// An existing log is never checked against `fields`: if the configured fields changed, the
    /// old header stays.
    pub fn ensure_header(&self, fields: &[FieldSelector]) -> Result<bool> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e).wrap_err_with(|| format!("Failed to inspect log file {:?}", self.path)),
        };
        if !needs_header {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create directory {:?}", parent))?;
        }
        let labels: Vec<String> = fields.iter().map(FieldSelector::header_label).collect();
        self.append(&csv_record(labels.iter().map(String::as_str)))?;
        info!(path = %self.path.display(), columns = labels.len(), "Wrote log header");
        Ok(true)
    }

    pub fn append_row(&self, row: &Row) -> Result<()> {
        self.append(&row.to_csv())
    }

    fn append(&self, record: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .wrap_err_with(|| format!("Failed to open log file {:?}", self.path))?;
        file.write_all(record.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_data())
            .wrap_err_with(|| format!("Failed to write to log file {:?}", self.path))
    }
}
