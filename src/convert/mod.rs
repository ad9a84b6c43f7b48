//! Conversion orchestration.
//!
//! A [`Converter`] drives one input at a time through rendering,
//! recognition and assembly, and fans a batch of inputs out over a worker
//! pool. Failures are absorbed as close to their origin as possible: a bad
//! region yields empty text, a bad page is skipped, a bad file is reported
//! in the summary. Nothing aborts the batch.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use unscan::convert::{ConvertOptions, Converter, NoProgress};
//! use unscan::ocr::TesseractCli;
//! use unscan::raster::PdftoppmRenderer;
//! use unscan::Language;
//!
//! let converter = Converter::new(
//!     Arc::new(PdftoppmRenderer::new()),
//!     Arc::new(TesseractCli::new()),
//!     ConvertOptions::new().with_language(Language::English),
//! );
//! let summary = converter.convert_batch(&[PathBuf::from("scan.pdf")], &NoProgress);
//! println!("{} converted, {} failed", summary.succeeded, summary.failed);
//! ```

mod progress;

pub use progress::{ChannelProgress, NoProgress, ProgressEvent, ProgressSink};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;

use crate::assemble::DocumentAssembler;
use crate::error::{Error, Result};
use crate::imaging::{preprocess, TableDetector, TableDetectorConfig};
use crate::language::Language;
use crate::model::{PageContent, RegionText};
use crate::ocr::{RegionTextExtractor, TextRecognizer};
use crate::raster::{PageRenderer, DEFAULT_DPI};
use crate::render::{DocumentWriter, DocxWriter};

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Document language
    pub language: Language,

    /// Directory for output documents; `None` writes next to each input
    pub output_dir: Option<PathBuf>,

    /// Detect and recognize table regions
    pub detect_tables: bool,

    /// Recognize whole-page prose
    pub extract_prose: bool,

    /// Table detector tuning
    pub detector: TableDetectorConfig,

    /// Worker threads for batches; 0 uses the available parallelism
    pub workers: usize,

    /// Page rendering resolution
    pub dpi: u32,

    /// Deadline for each external tool invocation
    pub tool_timeout: Option<Duration>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            output_dir: None,
            detect_tables: true,
            extract_prose: true,
            detector: TableDetectorConfig::default(),
            workers: 0,
            dpi: DEFAULT_DPI,
            tool_timeout: None,
        }
    }
}

impl ConvertOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Write outputs into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.detect_tables = enabled;
        self
    }

    /// Enable or disable whole-page prose recognition.
    pub fn with_prose(mut self, enabled: bool) -> Self {
        self.extract_prose = enabled;
        self
    }

    /// Set the detector configuration.
    pub fn with_detector(mut self, config: TableDetectorConfig) -> Self {
        self.detector = config;
        self
    }

    /// Set the number of batch workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Set the external tool deadline.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }
}

/// Where an input is in its conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStage {
    /// Not started
    #[default]
    Pending,
    /// Counting and rasterizing pages
    Rendering,
    /// Recognizing text page by page
    Extracting,
    /// Building and writing the output document
    Assembling,
    /// Output written and verified
    Done,
    /// Output already existed; nothing was done
    Skipped,
    /// Conversion failed
    Failed,
}

impl FileStage {
    /// Whether the stage is final.
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStage::Done | FileStage::Skipped | FileStage::Failed)
    }
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStage::Pending => "pending",
            FileStage::Rendering => "rendering",
            FileStage::Extracting => "extracting",
            FileStage::Assembling => "assembling",
            FileStage::Done => "done",
            FileStage::Skipped => "skipped",
            FileStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Per-file counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Pages in the source
    pub pages: u32,
    /// Pages rendered and recognized
    pub pages_rendered: u32,
    /// Pages whose rendering failed
    pub pages_failed: u32,
    /// Table regions detected
    pub regions_detected: u32,
    /// Recognition failures (regions and whole-page prose)
    pub regions_failed: u32,
}

impl ConversionStats {
    fn absorb(&mut self, page: &PageStats) {
        self.pages_rendered += 1;
        self.regions_detected += page.regions_detected;
        self.regions_failed += page.recognition_failures;
    }
}

/// Counters for one processed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Table regions detected
    pub regions_detected: u32,
    /// Recognizer failures on this page
    pub recognition_failures: u32,
}

/// Result of converting one input.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    /// Input path
    pub input: PathBuf,
    /// Canonical output path
    pub output: PathBuf,
    /// Terminal stage
    pub stage: FileStage,
    /// Failure reason, for failed files
    pub error: Option<String>,
    /// Counters
    pub stats: ConversionStats,
}

impl ConversionOutcome {
    /// Whether the input ended up with a valid output (written or pre-existing).
    pub fn is_success(&self) -> bool {
        matches!(self.stage, FileStage::Done | FileStage::Skipped)
    }

    /// Whether the input was skipped because its output already existed.
    pub fn is_skipped(&self) -> bool {
        self.stage == FileStage::Skipped
    }
}

/// Aggregate of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Outcomes in input order
    pub outcomes: Vec<ConversionOutcome>,
    /// Files converted or skipped
    pub succeeded: usize,
    /// Files that failed
    pub failed: usize,
    /// Files skipped because their output existed
    pub skipped: usize,
}

impl BatchSummary {
    /// Summarize outcomes.
    pub fn from_outcomes(outcomes: Vec<ConversionOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        Self {
            failed: outcomes.len() - succeeded,
            succeeded,
            skipped,
            outcomes,
        }
    }

    /// Inputs that failed, in input order.
    pub fn failed_paths(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.input.as_path())
            .collect()
    }

    /// Whether every input succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs the scan-to-document pipeline.
pub struct Converter {
    renderer: Arc<dyn PageRenderer>,
    extractor: RegionTextExtractor,
    writer: Arc<dyn DocumentWriter>,
    detector: TableDetector,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter writing `.docx` output.
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        recognizer: Arc<dyn TextRecognizer>,
        options: ConvertOptions,
    ) -> Self {
        Self {
            renderer,
            extractor: RegionTextExtractor::new(recognizer),
            writer: Arc::new(DocxWriter::new()),
            detector: TableDetector::new(options.detector.clone()),
            options,
        }
    }

    /// Use a different document writer.
    pub fn with_writer(mut self, writer: Arc<dyn DocumentWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Active options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Canonical output path: the input's stem with the writer's extension,
    /// in the output directory or next to the input.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        let mut name = PathBuf::from(stem);
        name.set_extension(self.writer.extension());
        match &self.options.output_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }

    /// Recognize one rendered page.
    pub fn process_page(&self, image: &DynamicImage, number: u32) -> (PageContent, PageStats) {
        let language = self.options.language;
        let page = preprocess(image);
        let mut stats = PageStats::default();

        let prose = if self.options.extract_prose {
            let result = self.extractor.extract(&page, language);
            if result.failed {
                stats.recognition_failures += 1;
            }
            result.text
        } else {
            String::new()
        };
        let mut content = PageContent::new(number, prose);

        if self.options.detect_tables {
            let regions = self.detector.detect(&page);
            stats.regions_detected = regions.len() as u32;
            let results = self.extractor.extract_all(&regions, language);
            for (region, result) in regions.iter().zip(results) {
                if result.failed {
                    stats.recognition_failures += 1;
                }
                content.add_table(RegionText::new(region.bounds, result.text));
            }
        }

        log::debug!(
            "page {}: {} regions, {} recognition failures",
            number,
            stats.regions_detected,
            stats.recognition_failures
        );
        (content, stats)
    }

    /// Convert one input. Never fails; the outcome records what happened.
    pub fn convert_file(&self, input: &Path, progress: &dyn ProgressSink) -> ConversionOutcome {
        let mut outcome = ConversionOutcome {
            input: input.to_path_buf(),
            output: self.output_path_for(input),
            stage: FileStage::Pending,
            error: None,
            stats: ConversionStats::default(),
        };

        progress.report(ProgressEvent::FileStarted {
            path: outcome.input.clone(),
            pages: None,
        });
        progress.report(ProgressEvent::Progress {
            path: outcome.input.clone(),
            percent: 0.0,
        });

        if outcome.output.exists() {
            log::info!("{} exists, skipping {}", outcome.output.display(), input.display());
            outcome.stage = FileStage::Skipped;
        } else if let Err(e) = self.run_pipeline(&mut outcome, progress) {
            log::warn!("{} failed during {}: {}", input.display(), outcome.stage, e);
            outcome.error = Some(e.to_string());
            outcome.stage = FileStage::Failed;
        } else {
            log::info!(
                "{} -> {} ({} pages)",
                input.display(),
                outcome.output.display(),
                outcome.stats.pages
            );
            outcome.stage = FileStage::Done;
        }

        progress.report(ProgressEvent::FileFinished {
            path: outcome.input.clone(),
            stage: outcome.stage,
        });
        outcome
    }

    fn enter(&self, outcome: &mut ConversionOutcome, stage: FileStage) {
        log::debug!("{}: {} -> {}", outcome.input.display(), outcome.stage, stage);
        outcome.stage = stage;
    }

    fn run_pipeline(&self, outcome: &mut ConversionOutcome, progress: &dyn ProgressSink) -> Result<()> {
        let input = outcome.input.clone();

        self.enter(outcome, FileStage::Rendering);
        let pages = self.renderer.page_count(&input)?;
        outcome.stats.pages = pages;

        let source = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut assembler = DocumentAssembler::new(self.options.language).with_source(source);

        self.enter(outcome, FileStage::Extracting);
        for number in 1..=pages {
            match self.renderer.render_page(&input, number) {
                Ok(image) => {
                    let (content, stats) = self.process_page(&image, number);
                    outcome.stats.absorb(&stats);
                    assembler.add_page(&content);
                }
                Err(e) => {
                    log::warn!("{}: page {} not rendered: {}", input.display(), number, e);
                    outcome.stats.pages_failed += 1;
                }
            }
            progress.report(ProgressEvent::Progress {
                path: input.clone(),
                percent: number as f32 / pages as f32 * 100.0,
            });
        }

        self.enter(outcome, FileStage::Assembling);
        assembler.set_page_count(pages);
        let document = assembler.finish();

        if let Some(parent) = outcome.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.writer
            .write(&document, &outcome.output)
            .map_err(|e| Error::DocumentWrite(e.to_string()))?;
        self.writer.verify(&outcome.output)?;
        Ok(())
    }

    /// Convert every input, in parallel across files.
    ///
    /// Each output path belongs to the first input that maps to it; later
    /// inputs with the same output fail without being converted.
    pub fn convert_batch(&self, inputs: &[PathBuf], progress: &dyn ProgressSink) -> BatchSummary {
        let owners = self.claim_outputs(inputs);
        let mut builder = rayon::ThreadPoolBuilder::new();
        if self.options.workers > 0 {
            builder = builder.num_threads(self.options.workers);
        }

        let outcomes: Vec<ConversionOutcome> = match builder.build() {
            Ok(pool) => pool.install(|| {
                inputs
                    .par_iter()
                    .zip(&owners)
                    .map(|(input, owner)| self.convert_claimed(input, owner.as_deref(), progress))
                    .collect()
            }),
            Err(e) => {
                log::warn!("worker pool unavailable ({}), converting sequentially", e);
                inputs
                    .iter()
                    .zip(&owners)
                    .map(|(input, owner)| self.convert_claimed(input, owner.as_deref(), progress))
                    .collect()
            }
        };

        let summary = BatchSummary::from_outcomes(outcomes);
        log::info!(
            "batch finished: {} succeeded ({} skipped), {} failed",
            summary.succeeded,
            summary.skipped,
            summary.failed
        );
        summary
    }

    /// For each input, the earlier input that already owns its output path.
    fn claim_outputs(&self, inputs: &[PathBuf]) -> Vec<Option<PathBuf>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        inputs
            .iter()
            .map(|input| match claimed.entry(self.output_path_for(input)) {
                Entry::Occupied(owner) => Some(owner.get().to_path_buf()),
                Entry::Vacant(slot) => {
                    slot.insert(input);
                    None
                }
            })
            .collect()
    }

    fn convert_claimed(
        &self,
        input: &Path,
        owner: Option<&Path>,
        progress: &dyn ProgressSink,
    ) -> ConversionOutcome {
        let Some(owner) = owner else {
            return self.convert_file(input, progress);
        };

        let output = self.output_path_for(input);
        let err = Error::OutputClaimed {
            output: output.clone(),
            owner: owner.to_path_buf(),
        };
        log::warn!("{}: {}", input.display(), err);

        let path = input.to_path_buf();
        progress.report(ProgressEvent::FileStarted {
            path: path.clone(),
            pages: None,
        });
        progress.report(ProgressEvent::Progress {
            path: path.clone(),
            percent: 0.0,
        });
        progress.report(ProgressEvent::FileFinished {
            path: path.clone(),
            stage: FileStage::Failed,
        });
        ConversionOutcome {
            input: path,
            output,
            stage: FileStage::Failed,
            error: Some(err.to_string()),
            stats: ConversionStats::default(),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("extractor", &self.extractor)
            .field("writer", &self.writer.extension())
            .field("options", &self.options)
            .finish()
    }
}
