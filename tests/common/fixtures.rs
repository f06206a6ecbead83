//! Test fixture creation
//!
//! Builds the temporary inventory file and auth store that every test
//! server starts from.

use super::constants::*;
use anyhow::Result;
use music_inventory_server::file_auth_store::FileAuthStore;
use music_inventory_server::inventory::{InventoryDocument, Record};
use music_inventory_server::server::auth::{AuthManager, UserRole};
use std::path::PathBuf;
use tempfile::TempDir;

fn seed_records() -> Vec<Record> {
    vec![
        Record {
            artist: ARTIST_1_NAME.to_owned(),
            titles: vec!["Opening Track".to_owned()],
            media: "cd".to_owned(),
            year: 1969,
            genre: "rock".to_owned(),
            serial_number: SERIAL_1,
        },
        Record {
            artist: ARTIST_1_NAME.to_owned(),
            titles: vec!["Vinyl Cut".to_owned()],
            media: "vinyl".to_owned(),
            year: 1969,
            genre: "rock".to_owned(),
            serial_number: SERIAL_2,
        },
        Record {
            artist: ARTIST_2_NAME.to_owned(),
            titles: vec!["Blue Number".to_owned()],
            media: "digital".to_owned(),
            year: 2001,
            genre: "jazz".to_owned(),
            serial_number: SERIAL_3,
        },
    ]
}

/// Writes the seed inventory into a fresh temp dir and returns it together
/// with the inventory file path.
pub fn create_test_inventory() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let inventory_path = temp_dir.path().join("music_inventory.json");

    let document = InventoryDocument {
        records: seed_records(),
    };
    std::fs::write(&inventory_path, serde_json::to_string_pretty(&document)?)?;

    Ok((temp_dir, inventory_path))
}

/// Creates an auth store file holding credentials for the admin and the
/// regular test user.
pub fn create_test_auth_store(temp_dir: &TempDir) -> Result<PathBuf> {
    let auth_store_path = temp_dir.path().join("auth_store.json");

    let store = FileAuthStore::initialize(auth_store_path.clone());
    let mut manager = AuthManager::initialize(Box::new(store))?;
    manager.create_password_credentials(ADMIN_USER, ADMIN_PASS.to_owned(), UserRole::Admin)?;
    manager.create_password_credentials(TEST_USER, TEST_PASS.to_owned(), UserRole::Regular)?;

    Ok(auth_store_path)
}
