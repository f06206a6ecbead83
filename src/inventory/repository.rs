use tracing::info;

use super::mutator::{self, AddOutcome, AddRequest, InventoryError};
use super::record::{AlbumSummary, Record};
use super::store::InventoryStore;

/// Runs every mutation as a full read-modify-write cycle over the store.
/// There is no partial persistence: a failed mutation leaves the document
/// exactly as it was loaded.
pub struct InventoryRepository {
    store: Box<dyn InventoryStore>,
}

impl InventoryRepository {
    pub fn new(store: Box<dyn InventoryStore>) -> InventoryRepository {
        InventoryRepository { store }
    }

    pub fn add_or_append(&self, request: AddRequest) -> Result<AddOutcome, InventoryError> {
        let mut document = self.store.load();
        let outcome = mutator::add_or_append(&mut document.records, request)?;
        self.store.save(&document)?;
        info!("{}", outcome);
        Ok(outcome)
    }

    pub fn update_record(&self, serial: u64, new_record: Record) -> Result<(), InventoryError> {
        let mut document = self.store.load();
        mutator::update_record(&mut document.records, serial, new_record)?;
        self.store.save(&document)?;
        info!("Updated record #{}", serial);
        Ok(())
    }

    pub fn delete_record(&self, serial: u64) -> Result<usize, InventoryError> {
        let mut document = self.store.load();
        let removed = mutator::delete_record(&mut document.records, serial);
        self.store.save(&document)?;
        info!("Deleted {} record(s) with serial {}", removed, serial);
        Ok(removed)
    }

    pub fn sort(&self) -> Result<Vec<Record>, InventoryError> {
        let mut document = self.store.load();
        document.records = mutator::sort_inventory(&document.records);
        self.store.save(&document)?;
        info!("Sorted {} records", document.records.len());
        Ok(document.records)
    }

    pub fn list(&self) -> Vec<Record> {
        self.store.load().records
    }

    pub fn search(&self, term: &str) -> Vec<Record> {
        mutator::search_inventory(&self.store.load().records, term)
    }

    pub fn albums_by_artist(&self, artist: &str) -> Vec<AlbumSummary> {
        mutator::list_albums_by_artist(&self.store.load().records, artist)
    }
}
