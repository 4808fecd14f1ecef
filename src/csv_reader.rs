// Dataset loading with a fixed failure taxonomy

use crate::data::{Dataset, Record};
use log::{debug, info};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    FileMissing { path: PathBuf },

    #[error("data file has no rows: {}", path.display())]
    FileEmpty { path: PathBuf },

    #[error("failed to load {}: {source}", path.display())]
    Other {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// Short label used in user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::FileMissing { .. } => "FileMissing",
            LoadError::FileEmpty { .. } => "FileEmpty",
            LoadError::Other { .. } => "OtherLoadFailure",
        }
    }
}

/// Load the tips table from a CSV file with a header row.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    debug!("opening dataset {}", path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::FileMissing {
            path: path.to_path_buf(),
        },
        _ => LoadError::Other {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        },
    })?;

    let records = read_records(file).map_err(|source| LoadError::Other {
        path: path.to_path_buf(),
        source,
    })?;

    if records.is_empty() {
        return Err(LoadError::FileEmpty {
            path: path.to_path_buf(),
        });
    }

    info!("loaded {} rows from {}", records.len(), path.display());
    Ok(Dataset::new(records))
}

/// Deserialize every record from CSV text. An input with no bytes at all
/// yields no records rather than an error.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: Record = result?;
        records.push(record);
    }
    Ok(records)
}
