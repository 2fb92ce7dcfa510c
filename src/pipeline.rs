use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::align::AlignmentEngine;
use crate::core::config::AlignConfig;
use crate::core::error::AlignError;
use crate::core::model::{AlignmentReport, PageSequence, StreamRole};
use crate::export::artifacts::remove_artifacts;
use crate::export::text_export::DEFAULT_DISPLAY_WINDOW;
use crate::export::{ArtifactWriter, Exporter, JsonExporter, TextExporter};
use crate::frames::{AgreementRegionCounter, ImageProbe, SsimOracle, ThemeNormalizer};
use crate::source::{PageDirectory, PageSource};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub primary_dir: PathBuf,
    pub secondary_dir: PathBuf,
    pub align: AlignConfig,
    /// Upper input level of the secondary levels correction.
    pub level_high: u8,
    /// Per-channel tolerance of the agreement mask.
    pub agreement_tolerance: u8,
    pub write_artifacts: bool,
    pub display_window: usize,
}

impl PipelineConfig {
    pub fn new(primary_dir: PathBuf, secondary_dir: PathBuf) -> Self {
        Self {
            primary_dir,
            secondary_dir,
            align: AlignConfig::default(),
            level_high: 255,
            agreement_tolerance: 16,
            write_artifacts: false,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }

    /// Page directories of a book rendered under `<root>/<book>/pages/`.
    pub fn for_book(root: &Path, book: &str) -> Self {
        let pages = root.join(book).join("pages");
        Self::new(pages.join("white"), pages.join("black"))
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        for dir in [&self.primary_dir, &self.secondary_dir] {
            if !dir.is_dir() {
                return Err(AlignError::config(format!(
                    "page directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        if self.level_high == 0 {
            return Err(AlignError::config("level_high must be greater than zero"));
        }
        self.align.validate()
    }
}

/// Tunables from a JSON file; absent keys keep their defaults.
pub fn load_align_config(path: &Path) -> Result<AlignConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AlignConfig = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn load_sequences(config: &PipelineConfig) -> Result<(PageSequence, PageSequence)> {
    let primary = PageDirectory::new(config.primary_dir.clone())
        .load_sequence(StreamRole::Primary)
        .with_context(|| format!("failed to load {}", config.primary_dir.display()))?;
    let secondary = PageDirectory::new(config.secondary_dir.clone())
        .load_sequence(StreamRole::Secondary)
        .with_context(|| format!("failed to load {}", config.secondary_dir.display()))?;
    Ok((primary, secondary))
}

pub fn run_alignment(config: &PipelineConfig) -> Result<AlignmentReport> {
    config.validate()?;
    let (primary, secondary) = load_sequences(config)?;
    info!(
        "aligning {} primary pages with {} secondary pages",
        primary.len(),
        secondary.len()
    );

    let mut probe = ImageProbe::new(
        ThemeNormalizer::new(config.level_high),
        SsimOracle,
        AgreementRegionCounter::new(config.agreement_tolerance),
    );
    if config.write_artifacts {
        probe = probe.with_artifacts(ArtifactWriter::new(
            config.align.min_region_width,
            config.align.min_region_height,
        ));
    }

    let mut engine = AlignmentEngine::new(config.align.clone(), probe);
    let outcome = engine.align(&primary, &secondary)?;
    Ok(outcome.into_report(&primary, &secondary))
}

pub fn export_report(report: &AlignmentReport, output: &Path, display_window: usize) -> Result<()> {
    JsonExporter::new(output.to_path_buf()).export(report)?;
    TextExporter::new(output.to_path_buf())
        .with_display_window(display_window)
        .export(report)?;
    Ok(())
}

/// Remove diagnostic artifacts from both page directories.
pub fn clean_artifacts(config: &PipelineConfig) -> Result<usize> {
    let mut removed = 0;
    for dir in [&config.primary_dir, &config.secondary_dir] {
        let paths = PageDirectory::new(dir.clone()).artifact_paths()?;
        removed += remove_artifacts(&paths)?;
    }
    Ok(removed)
}
