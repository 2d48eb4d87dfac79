//! File-backed collaborators: catalogs read from JSON documents on every
//! request, catches appended to JSON-lines files.
use castline_game::{CardCatalog, CatalogError, CatalogSource, CatchLedger, CatchRecord, FishCatalog};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HISTORY_FILE: &str = "history.jsonl";
pub const UNCLAIMED_FILE: &str = "unclaimed.jsonl";
pub const CLAIMS_FILE: &str = "claims.jsonl";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        source: CatalogError,
    },
    #[error("embedded catalog is invalid: {0}")]
    Embedded(#[from] CatalogError),
}

/// Catalogs read from disk each time the engine asks, so edits to the files
/// apply on the next tick. A missing path means the embedded catalog.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    fish: Option<PathBuf>,
    cards: Option<PathBuf>,
}

impl JsonFileSource {
    #[must_use]
    pub const fn new(fish: Option<PathBuf>, cards: Option<PathBuf>) -> Self {
        Self { fish, cards }
    }

    fn read(path: &Path) -> Result<String, SourceError> {
        fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CatalogSource for JsonFileSource {
    type Error = SourceError;

    fn load_fish_catalog(&self) -> Result<FishCatalog, Self::Error> {
        let Some(path) = &self.fish else {
            return Ok(FishCatalog::embedded()?);
        };
        FishCatalog::from_json(&Self::read(path)?).map_err(|source| SourceError::Catalog {
            path: path.clone(),
            source,
        })
    }

    fn load_card_catalog(&self) -> Result<CardCatalog, Self::Error> {
        let Some(path) = &self.cards else {
            return Ok(CardCatalog::embedded()?);
        };
        CardCatalog::from_json(&Self::read(path)?).map_err(|source| SourceError::Catalog {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug)]
struct LedgerFiles {
    history: BufWriter<File>,
    unclaimed: BufWriter<File>,
    claims: BufWriter<File>,
}

fn open_append(dir: &Path, name: &str) -> std::io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(name))?;
    Ok(BufWriter::new(file))
}

fn append_line<T: Serialize>(writer: &mut BufWriter<File>, value: &T) -> Result<(), LedgerError> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Counts every catch and, when given a directory, appends it as one JSON
/// object per line.
#[derive(Debug, Default)]
pub struct JsonLinesLedger {
    files: Option<LedgerFiles>,
    pub history: u64,
    pub unclaimed: u64,
    pub claims: u64,
}

impl JsonLinesLedger {
    /// A ledger that only counts.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) the JSON-lines files under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be created.
    pub fn open(dir: &Path) -> Result<Self, LedgerError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            files: Some(LedgerFiles {
                history: open_append(dir, HISTORY_FILE)?,
                unclaimed: open_append(dir, UNCLAIMED_FILE)?,
                claims: open_append(dir, CLAIMS_FILE)?,
            }),
            ..Self::default()
        })
    }
}

impl CatchLedger for JsonLinesLedger {
    type Error = LedgerError;

    fn append_history(&mut self, record: &CatchRecord) -> Result<(), Self::Error> {
        if let Some(files) = &mut self.files {
            append_line(&mut files.history, record)?;
        }
        self.history += 1;
        Ok(())
    }

    fn append_unclaimed(&mut self, record: &CatchRecord) -> Result<(), Self::Error> {
        if let Some(files) = &mut self.files {
            append_line(&mut files.unclaimed, record)?;
        }
        self.unclaimed += 1;
        Ok(())
    }

    fn record_claim(&mut self, record: &CatchRecord) -> Result<(), Self::Error> {
        if let Some(files) = &mut self.files {
            append_line(&mut files.claims, record)?;
        }
        self.claims += 1;
        Ok(())
    }
}
