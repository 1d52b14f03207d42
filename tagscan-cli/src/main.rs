//! tagscan: scan audio files and print their metadata
//!
//! Thin host around tagscan-core: walks the given paths, loads each
//! supported file into memory and hands the bytes to the core. All
//! file I/O lives here; the core never touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;
use walkdir::WalkDir;

use tagscan_core::{parse_metadata, MetadataRecord};

/// Extensions the core dispatches on
const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp3", "flac", "m4a", "wav"];

#[derive(Parser)]
#[command(name = "tagscan")]
#[command(about = "Extract metadata from MP3/FLAC/M4A/WAV files")]
#[command(version)]
struct Cli {
    /// Files or directories to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Emit records as JSON (cover bytes replaced by their length)
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let files = collect_files(&cli.paths);
    if files.is_empty() {
        anyhow::bail!("no supported audio files found");
    }

    let records = scan_files(&files);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&json_records(&records))?);
    } else {
        print_records(&records);
    }

    Ok(())
}

/// Expand files and directories into supported audio files
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_supported(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    files
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|s| *s == e)
        })
        .unwrap_or(false)
}

/// Read each file and run it through the core
fn scan_files(files: &[PathBuf]) -> Vec<MetadataRecord> {
    let mut records = Vec::new();
    for path in files {
        let data = match fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping {:?}: {}", path, e);
                continue;
            }
        };
        records.push(parse_metadata(&data, &path.to_string_lossy()));
    }
    records
}

fn print_records(records: &[MetadataRecord]) {
    for (i, rec) in records.iter().enumerate() {
        let cover = match (&rec.cover, &rec.cover_mime) {
            (Some(bytes), Some(mime)) => format!(", cover {} B {}", bytes.len(), mime),
            _ => String::new(),
        };
        println!(
            "  {:3}. {} - {} [{}] {} {}{}",
            i + 1,
            rec.artist,
            rec.title,
            rec.album,
            format_duration(rec.duration_seconds),
            rec.format.name(),
            cover
        );
    }
}

/// Serializable view with cover bytes collapsed to a length
fn json_records(records: &[MetadataRecord]) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|rec| {
            serde_json::json!({
                "title": rec.title,
                "artist": rec.artist,
                "album": rec.album,
                "duration_seconds": rec.duration_seconds,
                "cover_bytes": rec.cover.as_ref().map(|c| c.len()),
                "cover_mime": rec.cover_mime,
                "format": rec.format.name(),
                "source_path": rec.source_path,
            })
        })
        .collect()
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
