use anyhow::Result;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::warn;

use super::record::InventoryDocument;

/// Load/save boundary for the inventory document. Loading is lenient: a
/// missing or unreadable file yields an empty document rather than an error.
pub trait InventoryStore: Send {
    fn load(&self) -> InventoryDocument;
    fn save(&self, document: &InventoryDocument) -> Result<()>;
}

/// The flat-file store. Read and write paths can differ, which is how
/// dry-run works: read the real inventory, write to a throwaway file.
pub struct JsonFileStore {
    read_path: PathBuf,
    write_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonFileStore {
        let path = path.into();
        JsonFileStore {
            read_path: path.clone(),
            write_path: path,
        }
    }

    pub fn with_write_path<P: Into<PathBuf>>(read_path: P, write_path: P) -> JsonFileStore {
        JsonFileStore {
            read_path: read_path.into(),
            write_path: write_path.into(),
        }
    }

    pub fn write_path(&self) -> &Path {
        &self.write_path
    }
}

impl InventoryStore for JsonFileStore {
    fn load(&self) -> InventoryDocument {
        let text = match std::fs::read_to_string(&self.read_path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return InventoryDocument::default();
            }
            Err(err) => {
                warn!(
                    "Could not read inventory at {}, treating it as empty: {}",
                    self.read_path.display(),
                    err
                );
                return InventoryDocument::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    "Could not parse inventory at {}, treating it as empty: {}",
                    self.read_path.display(),
                    err
                );
                InventoryDocument::default()
            }
        }
    }

    fn save(&self, document: &InventoryDocument) -> Result<()> {
        let json_string = serde_json::to_string_pretty(document)?;
        let mut file = File::create(&self.write_path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

/// In-memory store, mainly a test double for the repository.
#[derive(Default)]
pub struct InMemoryStore {
    document: Mutex<InventoryDocument>,
}

impl InMemoryStore {
    pub fn new(document: InventoryDocument) -> InMemoryStore {
        InMemoryStore {
            document: Mutex::new(document),
        }
    }
}

impl InventoryStore for InMemoryStore {
    fn load(&self) -> InventoryDocument {
        self.document.lock().unwrap().clone()
    }

    fn save(&self, document: &InventoryDocument) -> Result<()> {
        *self.document.lock().unwrap() = document.clone();
        Ok(())
    }
}
