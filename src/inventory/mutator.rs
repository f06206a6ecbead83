use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::record::{AlbumSummary, Record};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("no record with serial number {0}")]
    NotFound(u64),

    #[error("serial number {0} is already taken")]
    SerialConflict(u64),

    #[error("failed to persist inventory: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Parameters of a single add-or-append mutation. Doubles as the JSON body of
/// the create endpoint, hence the serde defaults.
#[derive(Clone, Deserialize, Debug)]
pub struct AddRequest {
    pub artist: String,
    pub title: String,
    #[serde(default = "default_media")]
    pub media: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub serial_number: Option<u64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default = "default_true")]
    pub auto_resolve_serial_conflict: bool,
    #[serde(default)]
    pub merge: bool,
}

fn default_media() -> String {
    "cd".to_owned()
}

fn default_true() -> bool {
    true
}

/// Which branch an add-or-append mutation took.
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    AppendedTitle {
        serial: u64,
    },
    TitleAlreadyPresent {
        serial: u64,
    },
    CreatedAlbumForArtist {
        serial: u64,
        renumbered_from: Option<u64>,
    },
    CreatedRecord {
        serial: u64,
        renumbered_from: Option<u64>,
    },
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::AppendedTitle { serial } => {
                write!(f, "Appended title to existing record #{}", serial)
            }
            AddOutcome::TitleAlreadyPresent { serial } => {
                write!(f, "Title already present in record #{}", serial)
            }
            AddOutcome::CreatedAlbumForArtist {
                serial,
                renumbered_from,
            } => {
                write!(f, "Added new album for existing artist with serial {}", serial)?;
                if let Some(requested) = renumbered_from {
                    write!(f, " (serial {} was taken)", requested)?;
                }
                Ok(())
            }
            AddOutcome::CreatedRecord {
                serial,
                renumbered_from,
            } => {
                write!(f, "Created new record with serial {}", serial)?;
                if let Some(requested) = renumbered_from {
                    write!(f, " (serial {} was taken)", requested)?;
                }
                Ok(())
            }
        }
    }
}

/// Next free serial number: max existing + 1, or 1 on an empty inventory.
pub fn next_serial(records: &[Record]) -> u64 {
    records
        .iter()
        .map(|record| record.serial_number)
        .max()
        .map_or(1, |max| max + 1)
}

/// Resolves a requested serial against the existing ones. Returns the serial
/// to use plus the requested value when it had to be renumbered.
fn resolve_serial(
    records: &[Record],
    requested: Option<u64>,
    auto_resolve: bool,
) -> Result<(u64, Option<u64>), InventoryError> {
    let requested = match requested {
        None => return Ok((next_serial(records), None)),
        Some(serial) => serial,
    };

    if !records
        .iter()
        .any(|record| record.serial_number == requested)
    {
        return Ok((requested, None));
    }

    if !auto_resolve {
        return Err(InventoryError::SerialConflict(requested));
    }

    let assigned = next_serial(records);
    info!("Serial {} exists, assigning {}", requested, assigned);
    Ok((assigned, Some(requested)))
}

/// Adds a title to the inventory.
///
/// In merge mode the first record of the requested artist decides what
/// happens: an exact (media, year, genre) match gets the title appended
/// (idempotently), a mismatch gets a fresh album record inserted right after
/// it so an artist's releases stay contiguous in file order. Without merge
/// mode, or when the artist is unknown, a new record goes to the end.
pub fn add_or_append(
    records: &mut Vec<Record>,
    request: AddRequest,
) -> Result<AddOutcome, InventoryError> {
    let year = request.year.unwrap_or(0);
    let genre = request.genre.clone().unwrap_or_default();

    if request.merge {
        if let Some(index) = records
            .iter()
            .position(|record| record.artist == request.artist)
        {
            let matching = &records[index];
            if matching.media == request.media && matching.year == year && matching.genre == genre {
                let serial = matching.serial_number;
                let titles = &mut records[index].titles;
                if titles.iter().any(|title| *title == request.title) {
                    return Ok(AddOutcome::TitleAlreadyPresent { serial });
                }
                titles.push(request.title);
                return Ok(AddOutcome::AppendedTitle { serial });
            }

            let (serial, renumbered_from) = resolve_serial(
                records,
                request.serial_number,
                request.auto_resolve_serial_conflict,
            )?;
            let album = Record {
                artist: request.artist,
                titles: vec![request.title],
                media: request.media,
                year,
                genre,
                serial_number: serial,
            };
            records.insert(index + 1, album);
            return Ok(AddOutcome::CreatedAlbumForArtist {
                serial,
                renumbered_from,
            });
        }
    }

    let (serial, renumbered_from) = resolve_serial(
        records,
        request.serial_number,
        request.auto_resolve_serial_conflict,
    )?;
    records.push(Record {
        artist: request.artist,
        titles: vec![request.title],
        media: request.media,
        year,
        genre,
        serial_number: serial,
    });
    Ok(AddOutcome::CreatedRecord {
        serial,
        renumbered_from,
    })
}

/// Replaces the whole record carrying the given serial. The replacement may
/// renumber the record, but not onto a serial another record already holds.
pub fn update_record(
    records: &mut [Record],
    serial: u64,
    new_record: Record,
) -> Result<(), InventoryError> {
    if new_record.serial_number != serial
        && records
            .iter()
            .any(|record| record.serial_number == new_record.serial_number)
    {
        return Err(InventoryError::SerialConflict(new_record.serial_number));
    }
    match records
        .iter_mut()
        .find(|record| record.serial_number == serial)
    {
        Some(slot) => {
            *slot = new_record;
            Ok(())
        }
        None => Err(InventoryError::NotFound(serial)),
    }
}

/// Removes every record carrying the given serial. Deleting a serial that
/// does not exist is not an error; returns how many records were removed.
pub fn delete_record(records: &mut Vec<Record>, serial: u64) -> usize {
    let before = records.len();
    records.retain(|record| record.serial_number != serial);
    before - records.len()
}

/// Regroups the inventory: artists in lexicographic order, each artist's
/// records sorted by (year, media, genre). Pure, the input is untouched.
pub fn sort_inventory(records: &[Record]) -> Vec<Record> {
    let mut by_artist: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        by_artist.entry(&record.artist).or_default().push(record);
    }

    let mut sorted = Vec::with_capacity(records.len());
    for (_, mut group) in by_artist {
        group.sort_by(|a, b| (a.year, &a.media, &a.genre).cmp(&(b.year, &b.media, &b.genre)));
        sorted.extend(group.into_iter().cloned());
    }
    sorted
}

/// All albums of the given artist (exact name match), sorted by (year, media).
pub fn list_albums_by_artist(records: &[Record], artist: &str) -> Vec<AlbumSummary> {
    let mut albums: Vec<AlbumSummary> = records
        .iter()
        .filter(|record| record.artist == artist)
        .map(Record::summary)
        .collect();
    albums.sort_by(|a, b| (a.year, &a.media).cmp(&(b.year, &b.media)));
    albums
}

/// Case-insensitive substring match against the string form of every field,
/// returned in original inventory order.
pub fn search_inventory(records: &[Record], term: &str) -> Vec<Record> {
    let term = term.to_lowercase();
    records
        .iter()
        .filter(|record| record_matches(record, &term))
        .cloned()
        .collect()
}

fn record_matches(record: &Record, lowercase_term: &str) -> bool {
    record.artist.to_lowercase().contains(lowercase_term)
        || record.media.to_lowercase().contains(lowercase_term)
        || record.genre.to_lowercase().contains(lowercase_term)
        || record.year.to_string().contains(lowercase_term)
        || record.serial_number.to_string().contains(lowercase_term)
        || record
            .titles
            .iter()
            .any(|title| title.to_lowercase().contains(lowercase_term))
}
