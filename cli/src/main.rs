//! sectionrank CLI - persona-driven PDF section ranking

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sectionrank::{
    detect_format_from_path, load_input_dir, render, segment_file, JsonFormat, Pipeline,
    RankOptions, Report, SimilarityMode,
};

const DEFAULT_OUTPUT: &str = "output/challenge1b_output.json";

#[derive(Parser)]
#[command(name = "sectionrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rank PDF sections against a persona and job to be done", long_about = None)]
struct Cli {
    /// Input directory with PDFs and one JSON configuration
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output JSON file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    rank: RankArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone)]
struct RankArgs {
    /// Configuration file (defaults to the single JSON file in the input directory)
    #[arg(long, value_name = "FILE", env = "SECTIONRANK_CONFIG")]
    config: Option<PathBuf>,

    /// Number of top sections to report
    #[arg(long, default_value = "5")]
    top_sections: usize,

    /// Refined passages per top section
    #[arg(long, default_value = "1")]
    subsections_per_section: usize,

    /// Maximum characters of each refined passage
    #[arg(long, default_value = "500")]
    max_chars: usize,

    /// Content similarity strategy
    #[arg(long, value_enum, default_value = "cosine")]
    similarity: SimilarityArg,

    /// Process documents in parallel
    #[arg(long)]
    parallel: bool,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the sections of every document in a directory
    Rank {
        /// Input directory with PDFs and one JSON configuration
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output JSON file
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        rank: RankArgs,
    },

    /// Show the sections detected in one PDF
    Segment {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SimilarityArg {
    /// Cosine similarity over term frequencies
    Cosine,
    /// Lightweight Jaccard overlap
    Jaccard,
}

impl From<SimilarityArg> for SimilarityMode {
    fn from(arg: SimilarityArg) -> Self {
        match arg {
            SimilarityArg::Cosine => SimilarityMode::Cosine,
            SimilarityArg::Jaccard => SimilarityMode::Jaccard,
        }
    }
}

impl RankArgs {
    fn options(&self) -> RankOptions {
        RankOptions::new()
            .with_top_sections(self.top_sections)
            .with_subsections_per_section(self.subsections_per_section)
            .with_max_refined_chars(self.max_chars)
            .with_similarity(self.similarity.into())
            .with_parallel(self.parallel)
    }

    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Rank {
            input,
            output,
            rank,
        }) => cmd_rank(&input, output.as_deref(), &rank),
        Some(Commands::Segment { input, json }) => cmd_segment(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: rank if an input directory is provided
            if let Some(input) = cli.input {
                cmd_rank(&input, cli.output.as_deref(), &cli.rank)
            } else {
                println!("{}", "Usage: sectionrank <INPUT_DIR> [OUTPUT]".yellow());
                println!("       sectionrank --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_rank(
    input: &Path,
    output: Option<&Path>,
    args: &RankArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output_path(output);

    // Configuration and option errors are fatal before any document is read
    let options = args.options();
    log::debug!("rank options: {:?}", options);
    let pipeline = Pipeline::new(options)?;
    let batch = load_input_dir(input, args.config.as_deref())?;

    println!("{}: {}", "Persona".bold(), batch.config.persona);
    println!("{}: {}", "Job".bold(), batch.config.job_to_be_done);

    let pb = ProgressBar::new(batch.documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Processing documents...");

    let run = pipeline.run_batch(&batch, |status| {
        pb.set_message(status.document.clone());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let report = Report::from_run(&batch.config.persona, &batch.config.job_to_be_done, run);
    render::write_report(&report, &output, args.format())?;

    print_summary(&report);
    println!("\n{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn output_path(output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn print_summary(report: &Report) {
    println!("\n{}", "Top Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for section in &report.extracted_sections {
        println!(
            "{:>2}. {} {}",
            section.importance_rank,
            section.section_title.bold(),
            format!("({}, page {})", section.document, section.page_number).dimmed()
        );
    }
    if report.extracted_sections.is_empty() {
        println!("{}", "No sections found".yellow());
    }

    let skipped = report.skipped_count();
    if skipped > 0 {
        println!("\n{} {} document(s) skipped", "Warning:".yellow().bold(), skipped);
        for status in report.metadata.documents.iter().filter(|d| !d.succeeded()) {
            println!("  {} {}", "└─".dimmed(), status.document);
        }
    }
    if report.metadata.degraded_scoring {
        println!(
            "{} persona has no keywords; ranked by length and position only",
            "Warning:".yellow().bold()
        );
    }
}

fn cmd_segment(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let sections = segment_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    println!("{}", "Detected Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Sections".bold(), sections.len());
    println!();

    for section in &sections {
        let marker = if section.synthesized_title {
            "(untitled)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "{:>3} {} {} {}",
            section.order_index,
            format!("p{}", section.page_number).dimmed(),
            section.title.bold(),
            marker
        );
        println!("    {} words", section.word_count());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "sectionrank".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Persona-driven PDF section ranking");
    println!();
    println!("License: MIT");
}
