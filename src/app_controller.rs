use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::document;
use crate::engine::DocumentTranslator;
use crate::file_utils::FileManager;
use crate::translation::{ProgressEvent, ProgressPhase};

// @module: Application controller for document processing

/// Counts of a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Cancels in-flight translations (Ctrl-C)
    cancel: CancellationToken,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Token observed by every translation started by this controller
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn translator(&self) -> Result<DocumentTranslator> {
        let translator = DocumentTranslator::from_config(&self.config)
            .context("Failed to create translator")?
            .with_cancellation(self.cancel.clone());
        Ok(translator)
    }

    /// Translate one document next to itself.
    ///
    /// Returns the output path, or `None` when the output exists and `force_overwrite` is off.
    pub async fn run(&self, input_file: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let multi_progress = MultiProgress::new();
        let translator = self.translator()?;
        self.run_with_progress(&translator, &input_file, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        translator: &DocumentTranslator,
        input_file: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if FileManager::detect_document_format(input_file).is_none() {
            return Err(anyhow!("Unsupported file type (expected .docx or .pptx): {:?}", input_file));
        }

        let output_path = FileManager::generate_output_path(input_file, &self.config.target_language);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, translation already exists (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(None);
        }

        let bytes = FileManager::read_bytes(input_file)?;

        let progress_bar = multi_progress.add(ProgressBar::new(100));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        info!(
            "{}: {} - {}",
            input_file.display(),
            self.config.translation.provider.display_name(),
            self.config
                .translation
                .get_active_provider_config()
                .and_then(|provider| provider.model.clone())
                .unwrap_or_default()
        );

        let (sender, mut receiver) = mpsc::unbounded_channel::<ProgressEvent>();
        let pb = progress_bar.clone();
        let progress_task = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                pb.set_position(u64::from(event.percent_complete));
                pb.set_message(progress_message(&event));
            }
        });

        let result = translator
            .translate(&bytes, &self.config.target_language, &self.config.glossary, Some(sender))
            .await;
        // The sender is dropped with the dispatcher, so the task ends once drained
        let _ = progress_task.await;
        progress_bar.finish_and_clear();

        let translated = result.with_context(|| format!("Failed to translate {}", input_file.display()))?;
        FileManager::write_bytes(&output_path, &translated.bytes)?;

        let stats = translated.stats;
        if stats.failed_units > 0 || stats.degraded_units > 0 {
            warn!(
                "{} of {} paragraphs kept their original text ({} failed, {} empty replies)",
                stats.failed_units + stats.degraded_units,
                stats.total_units,
                stats.failed_units,
                stats.degraded_units
            );
        }
        info!(
            "Success: {} ({} -> {} characters in {})",
            output_path.display(),
            stats.original_chars,
            stats.translated_chars,
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(output_path))
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, processing all documents in a directory.
    /// Documents that already have a translation are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target_language = &self.config.target_language;
        let documents: Vec<PathBuf> = FileManager::find_documents(&input_dir)?
            .into_iter()
            .filter(|path| !FileManager::is_translated_output(path, target_language))
            .collect();

        if documents.is_empty() {
            return Err(anyhow!("No .docx or .pptx files found in directory: {:?}", input_dir));
        }

        let translator = self.translator()?;
        let multi_progress = MultiProgress::new();

        let folder_pb = multi_progress.add(ProgressBar::new(documents.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for document_path in &documents {
            if self.cancel.is_cancelled() {
                warn!("Cancelled, remaining files are left untouched");
                break;
            }

            let file_name = document_path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_with_progress(&translator, document_path, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(_)) => summary.processed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.errors
        );

        Ok(summary)
    }

    /// Replace every slide font of a deck; writes `<stem>_font.pptx` unless `output` is given
    pub fn replace_fonts(input_file: &Path, font: &str, output: Option<PathBuf>) -> Result<PathBuf> {
        let bytes = FileManager::read_bytes(input_file)?;
        let rewritten = document::replace_fonts(&bytes, font)
            .with_context(|| format!("Failed to replace fonts in {}", input_file.display()))?;

        let output_path = output.unwrap_or_else(|| FileManager::generate_output_path(input_file, "font"));
        FileManager::write_bytes(&output_path, &rewritten)?;
        info!("Success: {}", output_path.display());

        Ok(output_path)
    }
}

fn progress_message(event: &ProgressEvent) -> String {
    let preview: String = event
        .text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(40)
        .collect();
    let marker = match event.phase {
        ProgressPhase::Start => "…",
        ProgressPhase::End => "✓",
    };

    format!(
        "{}/{} {} {} → {} chars | {}",
        (event.unit_index + 1).min(event.total_units),
        event.total_units,
        marker,
        event.cumulative_original_chars,
        event.cumulative_translated_chars,
        preview
    )
}
