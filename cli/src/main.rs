//! pdfinsight CLI - outline extraction and section ranking tool

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfinsight::render::{self, ErrorReport};
use pdfinsight::{
    rank_documents, segment_outline, BatchExtractor, BatchOptions, ChunkOptions, DocumentId,
    DocumentOutcome, Error, JsonFormat, MemorySource, OutlineOptions, PageSource, RankOptions,
    Section, TfIdfSimilarity,
};

const LINE_DUMP_SUFFIX: &str = ".lines.json";
const RANKING_FILE: &str = "persona_ranking.json";
const LOG_FILE: &str = "processing.log";

#[derive(Parser)]
#[command(name = "pdfinsight")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract document outlines and rank sections for a persona", long_about = None)]
struct Cli {
    /// Also write logs to processing.log in the output directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a title and heading outline from every document
    Outline {
        /// Directory of *.pdf or *.lines.json inputs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// Worker pool width
        #[arg(long, env = "PDFINSIGHT_MAX_WORKERS", default_value = "8")]
        max_workers: usize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Rank sections across all documents for a persona and a task
    Rank {
        /// Directory of *.pdf or *.lines.json inputs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Persona, e.g. "Investment Analyst"
        #[arg(long, env = "PDFINSIGHT_PERSONA")]
        persona: String,

        /// Job to be done
        #[arg(long, env = "PDFINSIGHT_JOB")]
        job: String,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// Number of sections to keep
        #[arg(long, default_value = "10")]
        top_k: usize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract outlines, then rank if a persona and a job are given
    Run {
        /// Directory of *.pdf or *.lines.json inputs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// Worker pool width
        #[arg(long, env = "PDFINSIGHT_MAX_WORKERS", default_value = "8")]
        max_workers: usize,

        /// Persona for ranking
        #[arg(long, env = "PDFINSIGHT_PERSONA")]
        persona: Option<String>,

        /// Job for ranking
        #[arg(long, env = "PDFINSIGHT_JOB")]
        job: Option<String>,

        /// Number of sections to keep
        #[arg(long, default_value = "10")]
        top_k: usize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let output_dir = match &cli.command {
        Commands::Outline { output, .. }
        | Commands::Rank { output, .. }
        | Commands::Run { output, .. } => Some(output.as_path()),
        Commands::Version => None,
    };
    if let Err(e) = init_logging(cli.log_file, output_dir) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Outline {
            input,
            output,
            max_workers,
            compact,
        } => cmd_outline(&input, &output, max_workers, json_format(compact)),
        Commands::Rank {
            input,
            persona,
            job,
            output,
            top_k,
            compact,
        } => cmd_rank(&input, &output, &persona, &job, top_k, json_format(compact)),
        Commands::Run {
            input,
            output,
            max_workers,
            persona,
            job,
            top_k,
            compact,
        } => cmd_run(
            &input,
            &output,
            max_workers,
            persona.as_deref(),
            job.as_deref(),
            top_k,
            json_format(compact),
        ),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Writes log records to stderr and a file.
struct Tee {
    file: Arc<Mutex<File>>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Ok(mut file) = self.file.lock() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Ok(mut file) = self.file.lock() {
            file.flush()?;
        }
        Ok(())
    }
}

fn init_logging(log_file: bool, output_dir: Option<&Path>) -> CliResult {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let (true, Some(dir)) = (log_file, output_dir) {
        fs::create_dir_all(dir)?;
        let file = File::create(dir.join(LOG_FILE))?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee {
            file: Arc::new(Mutex::new(file)),
        })));
    }

    builder.init();
    Ok(())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

/// Input files in name order.
fn discover_inputs(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    inputs.sort();
    Ok(inputs)
}

fn is_supported(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".pdf") || name.ends_with(LINE_DUMP_SUFFIX)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// File stem used for outputs, with either input suffix removed.
fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let lower = name.to_lowercase();
    for suffix in [LINE_DUMP_SUFFIX, ".pdf"] {
        if lower.ends_with(suffix) {
            return name[..name.len() - suffix.len()].to_string();
        }
    }
    name
}

fn open_source(path: &Path) -> pdfinsight::Result<Box<dyn PageSource>> {
    let name = path.to_string_lossy().to_lowercase();
    if name.ends_with(LINE_DUMP_SUFFIX) {
        return Ok(Box::new(MemorySource::from_json_file(path)?));
    }
    open_pdf(path)
}

#[cfg(feature = "pdf")]
fn open_pdf(path: &Path) -> pdfinsight::Result<Box<dyn PageSource>> {
    Ok(Box::new(pdfinsight::LopdfSource::open(path)?))
}

#[cfg(not(feature = "pdf"))]
fn open_pdf(path: &Path) -> pdfinsight::Result<Box<dyn PageSource>> {
    Err(pdfinsight::Error::Validation(format!(
        "{}: PDF support is not enabled",
        path.display()
    )))
}

struct Inputs {
    /// Opened sources with their output stems
    sources: Vec<Box<dyn PageSource>>,
    stems: Vec<String>,
    /// Files that could not be opened
    failed: Vec<(PathBuf, pdfinsight::Error)>,
}

fn open_inputs(dir: &Path) -> CliResult<Inputs> {
    let paths = discover_inputs(dir)?;
    if paths.is_empty() {
        return Err(format!("No PDF or line dump files found in {}", dir.display()).into());
    }

    let mut inputs = Inputs {
        sources: Vec::new(),
        stems: Vec::new(),
        failed: Vec::new(),
    };
    for path in paths {
        match open_source(&path) {
            Ok(source) => {
                inputs.stems.push(document_stem(&path));
                inputs.sources.push(source);
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", path.display(), e);
                inputs.failed.push((path, e));
            }
        }
    }
    Ok(inputs)
}

fn write_json(path: &Path, json: &str) -> CliResult {
    fs::write(path, json)?;
    Ok(())
}

fn cmd_outline(input: &Path, output: &Path, max_workers: usize, format: JsonFormat) -> CliResult {
    fs::create_dir_all(output)?;
    let inputs = open_inputs(input)?;
    extract_outlines(&inputs, output, max_workers, format)?;
    Ok(())
}

/// Write one outline file per input and return the outcomes in input order.
fn extract_outlines(
    inputs: &Inputs,
    output: &Path,
    max_workers: usize,
    format: JsonFormat,
) -> CliResult<Vec<DocumentOutcome>> {
    for (path, error) in &inputs.failed {
        let stem = document_stem(path);
        let report = render::to_json(&ErrorReport::new(file_name(path), error), format)?;
        write_json(&output.join(format!("{}_outline.json", stem)), &report)?;
        println!("{} {}", "Failed".red(), path.display());
    }

    let pb = ProgressBar::new(inputs.sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let extractor = BatchExtractor::new(
        BatchOptions::new()
            .with_max_workers(max_workers)
            .with_outline(OutlineOptions::default()),
    );
    let (tx, rx) = crossbeam_channel::unbounded();

    let mut outcomes = Vec::with_capacity(inputs.sources.len());
    let mut succeeded = 0usize;
    let mut failed = inputs.failed.len();
    std::thread::scope(|scope| -> CliResult {
        let worker = scope.spawn(|| {
            let result = extractor.run(&inputs.sources, &tx);
            drop(tx);
            result
        });

        for outcome in rx.iter() {
            let stem = &inputs.stems[outcome.index];
            let path = output.join(format!("{}_outline.json", stem));
            let json = match &outcome.result {
                Ok(outline) => {
                    succeeded += 1;
                    render::to_json(outline, format)?
                }
                Err(e) => {
                    failed += 1;
                    render::to_json(&ErrorReport::new(outcome.document.name.clone(), e), format)?
                }
            };
            write_json(&path, &json)?;
            pb.set_message(outcome.document.name.clone());
            pb.inc(1);
            outcomes.push(outcome);
        }

        worker
            .join()
            .map_err(|_| "outline worker panicked")??;
        Ok(())
    })?;
    pb.finish_and_clear();

    println!(
        "{} {} outlines written to {} ({} failed)",
        "Done!".green().bold(),
        succeeded,
        output.display(),
        failed
    );
    outcomes.sort_by_key(|o| o.index);
    Ok(outcomes)
}

fn cmd_rank(
    input: &Path,
    output: &Path,
    persona: &str,
    job: &str,
    top_k: usize,
    format: JsonFormat,
) -> CliResult {
    fs::create_dir_all(output)?;
    let inputs = open_inputs(input)?;
    let outcomes = BatchExtractor::new(BatchOptions::new().with_outline(OutlineOptions::default()))
        .run_collect(&inputs.sources)?;
    rank_inputs(&inputs, outcomes, output, persona, job, top_k, format)
}

/// Sections per document, with unopenable files as failed entries.
fn segment_documents(
    inputs: &Inputs,
    outcomes: Vec<DocumentOutcome>,
    chunk: ChunkOptions,
) -> Vec<(DocumentId, pdfinsight::Result<Vec<Section>>)> {
    let mut documents: Vec<(DocumentId, pdfinsight::Result<Vec<Section>>)> = outcomes
        .into_iter()
        .map(|outcome| {
            let source = &inputs.sources[outcome.index];
            let sections = outcome
                .result
                .and_then(|outline| segment_outline(source, &outline, chunk));
            (outcome.document, sections)
        })
        .collect();
    documents.extend(inputs.failed.iter().map(|(path, error)| {
        (
            DocumentId::new(file_name(path)),
            Err(Error::Other(error.to_string())),
        )
    }));
    documents
}

#[allow(clippy::too_many_arguments)]
fn rank_inputs(
    inputs: &Inputs,
    outcomes: Vec<DocumentOutcome>,
    output: &Path,
    persona: &str,
    job: &str,
    top_k: usize,
    format: JsonFormat,
) -> CliResult {
    println!("{} {}: {}", "Ranking for".cyan(), persona.bold(), job);

    let backend = TfIdfSimilarity::default();
    let options = RankOptions::new().with_top_k(top_k);
    let documents = segment_documents(inputs, outcomes, options.chunk);
    let result = rank_documents(documents, persona, job, &backend, &options)?;

    let path = output.join(RANKING_FILE);
    write_json(&path, &render::to_json(&result, format)?)?;

    for scored in &result.extracted_sections {
        println!(
            "  {:>2}. {} {} ({:.3})",
            scored.rank,
            scored.section.title.bold(),
            format!("[{} p.{}]", scored.section.document, scored.section.start_page).dimmed(),
            scored.relevance_score
        );
    }
    println!(
        "{} {} of {} sections saved to {}",
        "Done!".green().bold(),
        result.extracted_sections.len(),
        result.total_sections,
        path.display()
    );
    Ok(())
}

fn cmd_run(
    input: &Path,
    output: &Path,
    max_workers: usize,
    persona: Option<&str>,
    job: Option<&str>,
    top_k: usize,
    format: JsonFormat,
) -> CliResult {
    fs::create_dir_all(output)?;
    let inputs = open_inputs(input)?;
    let outcomes = extract_outlines(&inputs, output, max_workers, format)?;

    match (persona, job) {
        (Some(persona), Some(job)) => {
            rank_inputs(&inputs, outcomes, output, persona, job, top_k, format)
        }
        _ => {
            log::info!("No persona and job given, skipping ranking");
            Ok(())
        }
    }
}

fn cmd_version() {
    println!("{} {}", "pdfinsight".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document outline extraction and section ranking");
    println!();
    println!("License: MIT");
}
