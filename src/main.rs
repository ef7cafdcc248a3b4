//! leggio - EPUB inspector and chunker

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use leggio::io::{ByteFetch, FileFetch};
use leggio::{DEFAULT_CHUNK_WORDS, detect_language, parse_epub};

#[derive(Parser)]
#[command(name = "leggio")]
#[command(version, about = "EPUB inspector and chunker", long_about = None)]
#[command(after_help = "EXAMPLES:
    leggio book.epub                Show book metadata
    leggio --chunks book.epub       Dump text chunks as JSON
    leggio -w 60 --chunks book.epub Chunk at ~60 words per chunk")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Dump text chunks as JSON instead of metadata
    #[arg(long)]
    chunks: bool,

    /// Target words per chunk
    #[arg(short = 'w', long, default_value_t = DEFAULT_CHUNK_WORDS)]
    chunk_words: usize,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let fetch = FileFetch::new(&cli.input);
    let bytes = fetch.fetch_bytes().map_err(|e| e.to_string())?;

    let filename = Path::new(&cli.input)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&cli.input);

    let book = parse_epub(bytes, filename).map_err(|e| {
        if e.is_drm() {
            "the book is DRM-protected and cannot be read".to_string()
        } else {
            format!("could not load the book: {e}")
        }
    })?;

    if cli.chunks {
        let chunks = book.chunks(cli.chunk_words);
        let json = serde_json::to_string_pretty(&chunks).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        let meta = &book.metadata;
        println!("File: {}", cli.input);
        println!("Title: {}", meta.title);
        println!("Author: {}", meta.author);
        if let Some(ref language) = meta.language {
            println!("Declared language: {language}");
        }
        if let Some(ref publisher) = meta.publisher {
            println!("Publisher: {publisher}");
        }
        println!("Detected language: {}", detect_language(&book.full_text));
        println!("Chapters: {}", book.chapters.len());
        println!("Words: {}", book.full_text.split_whitespace().count());
        println!(
            "Chunks (~{} words): {}",
            cli.chunk_words,
            book.chunks(cli.chunk_words).len()
        );
    }

    Ok(())
}
