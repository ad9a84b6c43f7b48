//! unscan CLI - scanned PDF to Word conversion

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unscan::detect::expand_inputs;
use unscan::{BatchSummary, ChannelProgress, FileStage, Language, ProgressEvent, Unscan};

#[derive(Parser)]
#[command(name = "unscan")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert scanned PDFs to Word documents via OCR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF files or folders of PDFs to .docx
    Convert {
        /// Input PDF files or directories
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Document language (fas, eng, deu or math)
        #[arg(short, long, default_value = "fas", value_parser = Language::from_str)]
        lang: Language,

        /// Scan directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Skip table detection
        #[arg(long)]
        no_tables: bool,

        /// Skip whole-page prose recognition
        #[arg(long)]
        no_prose: bool,

        /// Rendering resolution
        #[arg(long, default_value = "200")]
        dpi: u32,

        /// Parallel workers (0 = number of CPUs)
        #[arg(short, long, default_value = "0")]
        workers: usize,

        /// Kill external tools after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        #[command(flatten)]
        tools: ToolArgs,

        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show table regions detected on an image
    Detect {
        /// Page image (PNG, JPEG or TIFF)
        #[arg(value_name = "IMAGE")]
        input: PathBuf,
    },

    /// Recognize the text of an image
    Ocr {
        /// Page or region image
        #[arg(value_name = "IMAGE")]
        input: PathBuf,

        /// Document language (fas, eng, deu or math)
        #[arg(short, long, default_value = "fas", value_parser = Language::from_str)]
        lang: Language,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct ToolArgs {
    /// tesseract executable
    #[arg(long, env = "UNSCAN_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// pdftoppm executable
    #[arg(long, env = "UNSCAN_PDFTOPPM", default_value = "pdftoppm")]
    pdftoppm: PathBuf,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            inputs,
            output,
            lang,
            recursive,
            no_tables,
            no_prose,
            dpi,
            workers,
            timeout,
            tools,
            json,
        } => {
            let mut unscan = Unscan::new()
                .with_language(lang)
                .with_dpi(dpi)
                .with_workers(workers)
                .with_tesseract(tools.tesseract)
                .with_pdftoppm(tools.pdftoppm);
            if let Some(dir) = output {
                unscan = unscan.with_output_dir(dir);
            }
            if let Some(secs) = timeout {
                unscan = unscan.with_timeout(Duration::from_secs(secs));
            }
            if no_tables {
                unscan = unscan.without_tables();
            }
            if no_prose {
                unscan = unscan.without_prose();
            }
            cmd_convert(unscan, &inputs, recursive, json)
        }
        Commands::Detect { input } => cmd_detect(&input),
        Commands::Ocr { input, lang, tools } => cmd_ocr(&input, lang, tools),
        Commands::Version => {
            cmd_version();
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_convert(
    unscan: Unscan,
    inputs: &[PathBuf],
    recursive: bool,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let files = expand_inputs(inputs, recursive)?;
    if files.is_empty() {
        println!("{}", "No PDF files found".yellow());
        return Ok(true);
    }

    let converter = unscan.build();
    let (sink, events) = ChannelProgress::channel();

    let pb = ProgressBar::new(files.len() as u64 * 100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")?
            .progress_chars("#>-"),
    );

    let joined = thread::scope(|scope| {
        let worker = scope.spawn(move || converter.convert_batch(&files, &sink));

        let mut percent: HashMap<PathBuf, f32> = HashMap::new();
        for event in events.iter() {
            match &event {
                ProgressEvent::FileStarted { path, .. } => {
                    pb.set_message(file_name(path));
                    percent.insert(path.clone(), 0.0);
                }
                ProgressEvent::Progress { path, percent: p } => {
                    percent.insert(path.clone(), *p);
                }
                ProgressEvent::FileFinished { path, stage } => {
                    percent.insert(path.clone(), 100.0);
                    if *stage == FileStage::Failed {
                        pb.println(format!("{} {}", "Failed".red(), path.display()));
                    }
                }
            }
            pb.set_position(percent.values().map(|p| *p as u64).sum());
        }

        worker.join()
    });
    pb.finish_and_clear();
    let summary = finish_batch(joined)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(summary.is_success())
}

fn finish_batch(
    joined: thread::Result<BatchSummary>,
) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    joined.map_err(|_| "conversion worker panicked".into())
}

fn print_summary(summary: &BatchSummary) {
    println!("{}", "Conversion Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {}",
        "Succeeded".bold(),
        summary.succeeded.to_string().green()
    );
    println!("{}: {}", "Skipped".bold(), summary.skipped);
    let failed = summary.failed.to_string();
    println!(
        "{}: {}",
        "Failed".bold(),
        if summary.failed > 0 { failed.red() } else { failed.normal() }
    );

    for outcome in summary.outcomes.iter().filter(|o| !o.is_success()) {
        println!(
            "  {} {}: {}",
            "✗".red(),
            outcome.input.display(),
            outcome.error.as_deref().unwrap_or("unknown error").dimmed()
        );
    }
}

fn cmd_detect(input: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let regions = unscan::detect_tables(input)?;

    println!("{} {}", "Table regions in".cyan().bold(), input.display());
    println!("{}", "─".repeat(40).dimmed());
    for (i, region) in regions.iter().enumerate() {
        let b = region.bounds;
        println!(
            "{:>3}: x={} y={} w={} h={} (area {:.0})",
            i + 1,
            b.x,
            b.y,
            b.width,
            b.height,
            region.area
        );
    }
    println!("\n{} {} regions", "Found".green().bold(), regions.len());
    Ok(true)
}

fn cmd_ocr(input: &Path, language: Language, tools: ToolArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let result = Unscan::new()
        .with_language(language)
        .with_tesseract(tools.tesseract)
        .with_pdftoppm(tools.pdftoppm)
        .recognize_image(input)?;

    log::debug!("recognized with {}", result.config);
    println!("{}", result.text);
    Ok(true)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn cmd_version() {
    println!("{} {}", "unscan".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Scanned PDF to Word conversion via OCR");
    println!();
    println!(
        "Languages: {}",
        Language::ALL
            .iter()
            .map(|l| l.tag())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Repository: {}", "https://github.com/iyulab/unscan".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "unscan", "convert", "a.pdf", "scans", "-o", "out", "-l", "ENG", "--no-tables",
            "--timeout", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert {
                inputs,
                output,
                lang,
                no_tables,
                no_prose,
                timeout,
                ..
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(lang, Language::English);
                assert!(no_tables);
                assert!(!no_prose);
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_convert_requires_input() {
        assert!(Cli::try_parse_from(["unscan", "convert"]).is_err());
    }

    #[test]
    fn test_lang_accepts_names_and_defaults_to_farsi() {
        let lang_of = |args: &[&str]| match Cli::try_parse_from(args).unwrap().command {
            Commands::Ocr { lang, .. } => lang,
            _ => panic!("expected ocr"),
        };
        assert_eq!(lang_of(&["unscan", "ocr", "page.png"]), Language::Farsi);
        assert_eq!(lang_of(&["unscan", "ocr", "page.png", "-l", "farsi"]), Language::Farsi);
        assert_eq!(lang_of(&["unscan", "ocr", "page.png", "--lang", "Deu"]), Language::German);
        assert!(Cli::try_parse_from(["unscan", "ocr", "page.png", "-l", "klingon"]).is_err());
    }

    #[test]
    fn test_panicked_worker_is_an_error() {
        let panicked: thread::Result<BatchSummary> = Err(Box::new("worker died"));
        let err = finish_batch(panicked).unwrap_err();
        assert_eq!(err.to_string(), "conversion worker panicked");

        let summary = finish_batch(Ok(BatchSummary::default())).unwrap();
        assert!(summary.is_success());
    }
}
