mod mutator;
mod record;
mod repository;
mod store;

pub use mutator::{
    add_or_append, delete_record, list_albums_by_artist, next_serial, search_inventory,
    sort_inventory, update_record, AddOutcome, AddRequest, InventoryError,
};
pub use record::{AlbumSummary, InventoryDocument, Record};
pub use repository::InventoryRepository;
pub use store::{InMemoryStore, InventoryStore, JsonFileStore};
