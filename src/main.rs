use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use pagesync::core::config::AlignConfig;
use pagesync::core::model::GapKind;
use pagesync::export::TextExporter;
use pagesync::pipeline::{
    clean_artifacts, export_report, load_align_config, load_sequences, run_alignment,
    PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "pagesync")]
#[command(version, about = "Align two themed page renderings of a document and find extra pages", long_about = None)]
struct Cli {
    /// Log every probe decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Locations {
    /// Primary (light theme) page directory
    #[arg(long, requires = "secondary")]
    primary: Option<PathBuf>,

    /// Secondary (dark theme) page directory
    #[arg(long, requires = "primary")]
    secondary: Option<PathBuf>,

    /// Book id; pages are read from <root>/<book>/pages/{white,black}
    #[arg(long, env = "PAGESYNC_BOOK")]
    book: Option<String>,

    /// Root directory holding rendered books
    #[arg(long, default_value = "out")]
    root: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align the two page collections and report extra pages
    Align {
        #[command(flatten)]
        locations: Locations,

        /// Output directory for alignment.json and alignment.txt
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with alignment tunables
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum similarity for an exact match
        #[arg(long)]
        similarity_threshold: Option<f64>,

        /// Minimum width of a significant difference region
        #[arg(long)]
        min_region_width: Option<u32>,

        /// Minimum height of a significant difference region
        #[arg(long)]
        min_region_height: Option<u32>,

        /// Soft matches tolerate up to this many small regions
        #[arg(long)]
        max_small_regions: Option<usize>,

        /// Pages without a match before seeking back
        #[arg(long)]
        max_backtrack_distance: Option<usize>,

        /// Also evaluate the final primary page
        #[arg(long)]
        evaluate_last_page: bool,

        /// Reset the search radius after soft matches too
        #[arg(long)]
        reset_radius_on_soft_match: bool,

        /// Upper input level of the secondary levels correction (255 = off)
        #[arg(long, default_value_t = 255)]
        level_high: u8,

        /// Per-channel tolerance when comparing raw frames
        #[arg(long, default_value_t = 16)]
        agreement_tolerance: u8,

        /// Write diagnostic images next to the pages
        #[arg(long)]
        artifacts: bool,

        /// Number of recent matches shown in the text report
        #[arg(long, default_value_t = 10)]
        display_window: usize,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show page counts of both collections
    Info {
        #[command(flatten)]
        locations: Locations,
    },

    /// Remove diagnostic images written by earlier runs
    Clean {
        #[command(flatten)]
        locations: Locations,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Align {
            locations,
            output,
            config,
            similarity_threshold,
            min_region_width,
            min_region_height,
            max_small_regions,
            max_backtrack_distance,
            evaluate_last_page,
            reset_radius_on_soft_match,
            level_high,
            agreement_tolerance,
            artifacts,
            display_window,
            quiet,
        } => {
            let mut align = match config {
                Some(path) => load_align_config(&path)?,
                None => AlignConfig::default(),
            };
            if let Some(value) = similarity_threshold {
                align.similarity_threshold = value;
            }
            if let Some(value) = min_region_width {
                align.min_region_width = value;
            }
            if let Some(value) = min_region_height {
                align.min_region_height = value;
            }
            if let Some(value) = max_small_regions {
                align.max_small_region_count = value;
            }
            if let Some(value) = max_backtrack_distance {
                align.max_backtrack_distance = value;
            }
            align.evaluate_last_page |= evaluate_last_page;
            align.reset_radius_on_soft_match |= reset_radius_on_soft_match;

            let mut pipeline = resolve(&locations)?;
            pipeline.align = align;
            pipeline.level_high = level_high;
            pipeline.agreement_tolerance = agreement_tolerance;
            pipeline.write_artifacts = artifacts;
            pipeline.display_window = display_window;
            align_pages(pipeline, output, quiet)
        }
        Commands::Info { locations } => show_info(resolve(&locations)?),
        Commands::Clean { locations } => {
            let pipeline = resolve(&locations)?;
            let removed = clean_artifacts(&pipeline)?;
            println!("[✓] Removed {removed} artifact file(s)");
            Ok(())
        }
    }
}

fn resolve(locations: &Locations) -> Result<PipelineConfig> {
    match (&locations.primary, &locations.secondary, &locations.book) {
        (Some(primary), Some(secondary), _) => {
            Ok(PipelineConfig::new(primary.clone(), secondary.clone()))
        }
        (None, None, Some(book)) => Ok(PipelineConfig::for_book(&locations.root, book)),
        _ => anyhow::bail!(
            "specify --primary and --secondary, or --book (or set PAGESYNC_BOOK)"
        ),
    }
}

fn align_pages(pipeline: PipelineConfig, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    if !quiet {
        println!("[*] Primary: {}", pipeline.primary_dir.display());
        println!("[*] Secondary: {}", pipeline.secondary_dir.display());
        println!("\n[+] Aligning pages...");
    }

    let report = run_alignment(&pipeline).with_context(|| {
        format!(
            "Failed to align {} with {}",
            pipeline.primary_dir.display(),
            pipeline.secondary_dir.display()
        )
    })?;

    if quiet {
        println!(
            "{} matches, {} extra primary, {} extra secondary",
            report.matches.len(),
            report.extra_pages(GapKind::ExtraPrimary).count(),
            report.extra_pages(GapKind::ExtraSecondary).count()
        );
    } else {
        let text = TextExporter::new(PathBuf::new())
            .with_display_window(pipeline.display_window)
            .render(&report);
        println!("\n{text}");
    }

    if let Some(output) = output {
        export_report(&report, &output, pipeline.display_window)
            .with_context(|| format!("Failed to export to: {}", output.display()))?;
        if !quiet {
            println!("[✓] Done! Results saved to: {}", output.display());
        }
    }

    if pipeline.write_artifacts && !quiet {
        println!(
            "[*] To remove artifacts: pagesync clean --primary {} --secondary {}",
            pipeline.primary_dir.display(),
            pipeline.secondary_dir.display()
        );
    }

    Ok(())
}

fn show_info(pipeline: PipelineConfig) -> Result<()> {
    pipeline.validate()?;
    let (primary, secondary) = load_sequences(&pipeline)?;

    println!("Page Collections");
    println!("================");
    for (label, sequence, dir) in [
        ("Primary", &primary, &pipeline.primary_dir),
        ("Secondary", &secondary, &pipeline.secondary_dir),
    ] {
        let range = sequence
            .page_number_range()
            .map(|(lo, hi)| format!("{lo}..={hi}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{label}: {} ({} pages, numbers {range})", dir.display(), sequence.len());
    }

    Ok(())
}
