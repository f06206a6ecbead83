use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
};

use music_inventory_server::inventory::{
    AddRequest, InventoryRepository, InventoryStore, JsonFileStore, Record,
};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the JSON inventory file.
    #[clap(long, default_value = "music_inventory.json")]
    pub path: PathBuf,

    /// Artist of the record to add.
    #[clap(long)]
    pub artist: Option<String>,

    /// Title to add to the record.
    #[clap(long)]
    pub title: Option<String>,

    /// Media type of the record.
    #[clap(long, default_value = "cd")]
    pub media: String,

    /// Release year of the record.
    #[clap(long)]
    pub year: Option<i64>,

    /// Genre of the record.
    #[clap(long)]
    pub genre: Option<String>,

    /// Serial number to assign, picked automatically when omitted.
    #[clap(long)]
    pub serial: Option<u64>,

    /// Fail on a serial number collision instead of picking the next free one.
    #[clap(long)]
    pub no_auto_resolve: bool,

    /// Merge the title into a matching record of the same artist when one exists.
    #[clap(long)]
    pub merge: bool,

    /// Write the result to a throwaway copy instead of the inventory file.
    #[clap(long)]
    pub dry_run: bool,

    /// Sort the inventory in place and exit.
    #[clap(long)]
    pub sort: bool,

    /// Print the albums of the given artist and exit.
    #[clap(long)]
    pub list_artist: Option<String>,
}

fn ask(prompt: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", prompt, default),
        None => print!("{}: ", prompt),
    }
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read line")?;
    let line = line.trim();

    if line.is_empty() {
        return Ok(default.unwrap_or("").to_owned());
    }
    Ok(line.to_owned())
}

fn ask_i64(prompt: &str) -> Result<Option<i64>> {
    let answer = ask(prompt, None)?;
    if answer.is_empty() {
        return Ok(None);
    }
    answer
        .parse()
        .map(Some)
        .with_context(|| format!("Not a number: {}", answer))
}

fn ask_u64(prompt: &str) -> Result<Option<u64>> {
    let answer = ask(prompt, None)?;
    if answer.is_empty() {
        return Ok(None);
    }
    answer
        .parse()
        .map(Some)
        .with_context(|| format!("Not a number: {}", answer))
}

fn ask_yes_no(prompt: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let answer = ask(&format!("{} [{}]", prompt, hint), None)?;
    match answer.to_lowercase().as_str() {
        "" => Ok(default),
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => bail!("Please answer y or n, not {}", other),
    }
}

fn print_artist_albums(repository: &InventoryRepository, artist: &str) {
    let albums = repository.albums_by_artist(artist);
    if albums.is_empty() {
        println!("No records for artist {}", artist);
        return;
    }

    println!("{}", artist);
    let mut current_year = None;
    for album in albums {
        if current_year != Some(album.year) {
            println!("{}:", album.year);
            current_year = Some(album.year);
        }
        println!(
            "  {:6} | {:10} | #{:4} | {}",
            album.media,
            album.genre,
            album.serial,
            album.titles.join(", ")
        );
    }
}

fn describe_request(records: &[Record], request: &AddRequest) {
    let known_artist = records
        .iter()
        .any(|record| record.artist == request.artist);
    let action = match (request.merge, known_artist) {
        (true, true) => "Merge into the records of",
        _ => "Add a new record for",
    };
    println!(
        "{} {}: title '{}', media {}, year {}, genre {}",
        action,
        request.artist,
        request.title,
        request.media,
        request.year.unwrap_or(0),
        request.genre.as_deref().unwrap_or("(none)"),
    );
    match request.serial_number {
        Some(serial) => println!("Requested serial number: {}", serial),
        None => println!("Serial number will be picked automatically"),
    }
}

/// Builds the store for a mutation. Under dry-run the write path is a kept
/// temp file next to the inventory, so the real file is only ever read.
fn make_store(inventory_path: &Path, dry_run: bool, dry_run_prefix: &str) -> Result<JsonFileStore> {
    if !dry_run {
        return Ok(JsonFileStore::new(inventory_path));
    }

    let parent = match inventory_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_path: PathBuf = tempfile::Builder::new()
        .prefix(dry_run_prefix)
        .suffix(".json")
        .tempfile_in(parent)?
        .into_temp_path()
        .keep()?;
    println!("Dry run, writing to {}", write_path.display());
    Ok(JsonFileStore::with_write_path(
        inventory_path.to_path_buf(),
        write_path,
    ))
}

fn run() -> Result<()> {
    let cli_args = CliArgs::parse();
    let interactive = io::stdin().is_terminal();

    if cli_args.sort {
        let store = make_store(&cli_args.path, cli_args.dry_run, "music_inventory.sorted.")?;
        let saved_to = store.write_path().to_path_buf();
        let repository = InventoryRepository::new(Box::new(store));
        let records = repository.sort()?;
        println!("Sorted {} records in {}", records.len(), saved_to.display());
        return Ok(());
    }

    if let Some(artist) = cli_args.list_artist {
        let repository =
            InventoryRepository::new(Box::new(JsonFileStore::new(&cli_args.path)));
        print_artist_albums(&repository, &artist);
        return Ok(());
    }

    let mut inventory_path = cli_args.path.clone();
    let mut dry_run = cli_args.dry_run;

    let request = match (cli_args.artist, cli_args.title) {
        (Some(artist), Some(title)) => AddRequest {
            artist,
            title,
            media: cli_args.media,
            year: cli_args.year,
            serial_number: cli_args.serial,
            genre: cli_args.genre,
            auto_resolve_serial_conflict: !cli_args.no_auto_resolve,
            merge: cli_args.merge,
        },
        (artist, title) if interactive => {
            let artist = match artist {
                Some(artist) => artist,
                None => ask("Artist", None)?,
            };
            let title = match title {
                Some(title) => title,
                None => ask("Title", None)?,
            };
            if artist.is_empty() || title.is_empty() {
                bail!("Artist and title cannot be empty");
            }
            let auto_resolve = if cli_args.no_auto_resolve {
                false
            } else {
                ask_yes_no("Auto-resolve serial conflicts", true)?
            };
            let request = AddRequest {
                artist,
                title,
                media: ask("Media", Some(&cli_args.media))?,
                year: cli_args.year.map_or_else(|| ask_i64("Year"), |y| Ok(Some(y)))?,
                serial_number: cli_args
                    .serial
                    .map_or_else(|| ask_u64("Serial number"), |s| Ok(Some(s)))?,
                genre: match cli_args.genre {
                    Some(genre) => Some(genre),
                    None => {
                        let genre = ask("Genre", None)?;
                        (!genre.is_empty()).then_some(genre)
                    }
                },
                auto_resolve_serial_conflict: auto_resolve,
                merge: cli_args.merge || ask_yes_no("Merge with existing records", false)?,
            };
            inventory_path = PathBuf::from(ask(
                "Inventory path",
                Some(&inventory_path.display().to_string()),
            )?);
            if !dry_run {
                dry_run = ask_yes_no("Dry run (write to a temp file instead)", false)?;
            }
            request
        }
        _ => bail!("--artist and --title are required when stdin is not a terminal"),
    };

    let store = make_store(&inventory_path, dry_run, "music_inventory.dryrun.")?;

    if interactive {
        describe_request(&store.load().records, &request);
        if !ask_yes_no("Proceed to save", true)? {
            println!("Aborted, nothing written.");
            return Ok(());
        }
    }

    let saved_to = store.write_path().to_path_buf();
    let repository = InventoryRepository::new(Box::new(store));
    let outcome = repository.add_or_append(request)?;

    println!("{}", outcome);
    println!("Saved {}", saved_to.display());
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_dry_run_the_store_writes_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music_inventory.json");

        let store = make_store(&path, false, "music_inventory.dryrun.").unwrap();

        assert_eq!(store.write_path(), path);
    }

    #[test]
    fn dry_run_sort_leaves_the_inventory_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("music_inventory.json");
        let original = concat!(
            r#"{"music_inventory":["#,
            r#"{"artist":"Zeta","titles":["t"],"media":"cd","serial_number":1},"#,
            r#"{"artist":"Alpha","titles":["t"],"media":"cd","serial_number":2}]}"#,
        );
        std::fs::write(&path, original).unwrap();

        let store = make_store(&path, true, "music_inventory.sorted.").unwrap();
        let write_path = store.write_path().to_path_buf();
        let repository = InventoryRepository::new(Box::new(store));
        let sorted = repository.sort().unwrap();

        assert_eq!(sorted[0].artist, "Alpha");
        // The real file keeps its original order and bytes
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

        let written: Vec<Record> = serde_json::from_str::<
            music_inventory_server::inventory::InventoryDocument,
        >(&std::fs::read_to_string(&write_path).unwrap())
        .unwrap()
        .records;
        assert_eq!(written[0].artist, "Alpha");

        std::fs::remove_file(write_path).unwrap();
    }
}
