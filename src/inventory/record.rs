use serde::{Deserialize, Serialize};

/// One music-release entry. A record can hold several titles when merge mode
/// grouped them into the same artist/media/year/genre entry.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Record {
    pub artist: String,
    pub titles: Vec<String>,
    pub media: String,
    #[serde(default)]
    pub year: i64,
    #[serde(default)]
    pub genre: String,
    pub serial_number: u64,
}

/// The whole persisted document. The collection key matches the legacy
/// on-disk format, so existing inventory files load as-is.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct InventoryDocument {
    #[serde(rename = "music_inventory", default)]
    pub records: Vec<Record>,
}

/// Read model returned by the list-by-artist operation.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct AlbumSummary {
    pub media: String,
    pub year: i64,
    pub genre: String,
    pub serial: u64,
    pub titles: Vec<String>,
}

impl Record {
    pub fn summary(&self) -> AlbumSummary {
        AlbumSummary {
            media: self.media.clone(),
            year: self.year,
            genre: self.genre.clone(),
            serial: self.serial_number,
            titles: self.titles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_year_and_genre_default_to_unset() {
        let parsed: Record = serde_json::from_str(
            r#"{"artist":"A","titles":["t"],"media":"cd","serial_number":7}"#,
        )
        .unwrap();

        assert_eq!(parsed.year, 0);
        assert_eq!(parsed.genre, "");
    }

    #[test]
    fn document_parses_legacy_collection_key() {
        let parsed: InventoryDocument = serde_json::from_str(
            r#"{"music_inventory":[{"artist":"A","titles":["t"],"media":"cd","serial_number":1}]}"#,
        )
        .unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].serial_number, 1);
    }
}
