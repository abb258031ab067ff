/*!
 * Document dispatcher.
 *
 * Drives the translation units of one document through the translation client in
 * index order, accumulates character statistics, and streams ordered progress events.
 * A unit that cannot be translated keeps its original text; only structural document
 * errors and cancellation abort the run.
 */

use futures::future::join_all;
use log::{error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::document::{self, DocumentFormat, FormatPreservingRewriter, TranslationUnit};
use crate::errors::{ProviderError, TranslationError};
use crate::translation::client::{TranslationClient, TranslationOutcome};

/// Lifecycle of a dispatcher run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Running,
    Completed,
    /// The document could not be parsed or written
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Start,
    End,
}

/// Progress notification for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub unit_index: usize,
    pub total_units: usize,
    /// Source text on `Start`, resulting text on `End`
    pub text: String,
    pub cumulative_original_chars: usize,
    pub cumulative_translated_chars: usize,
    pub percent_complete: u8,
}

/// Character statistics of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub total_units: usize,
    pub original_chars: usize,
    pub translated_chars: usize,
    /// Units that kept their original text after a provider error
    pub failed_units: usize,
    /// Units whose provider reply was empty
    pub degraded_units: usize,
}

/// Pacing of a dispatcher run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Units translated together; their requests are in flight at the same time
    pub batch_size: usize,
    /// Pause after each batch except the last; zero for non-interactive callers
    pub min_inter_unit_delay: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 1,
            min_inter_unit_delay: Duration::from_millis(200),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Rewritten document container
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
    pub stats: DispatchStats,
    pub units: Vec<TranslationUnit>,
}

/// Sequential translation driver for one document
#[derive(Debug)]
pub struct Dispatcher {
    client: TranslationClient,
    options: DispatchOptions,
    rewriter: FormatPreservingRewriter,
    progress: Option<UnboundedSender<ProgressEvent>>,
    state: DispatchState,
}

impl Dispatcher {
    pub fn new(client: TranslationClient, options: DispatchOptions) -> Self {
        Self {
            client,
            options,
            rewriter: FormatPreservingRewriter::default(),
            progress: None,
            state: DispatchState::Idle,
        }
    }

    pub fn with_rewriter(mut self, rewriter: FormatPreservingRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Send progress events to `sender`
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Extract, translate and rewrite one document
    pub async fn run(&mut self, bytes: &[u8], system_prompt: &str) -> Result<DispatchOutcome, TranslationError> {
        let (parsed, mut units) = match document::extract_units(bytes) {
            Ok(extracted) => extracted,
            Err(e) => {
                error!("Cannot translate document: {}", e);
                self.state = DispatchState::Failed;
                return Err(e.into());
            }
        };
        info!(
            "Translating {} paragraphs of a {} document with {}",
            units.len(),
            parsed.format(),
            self.client.provider_name()
        );

        let format = parsed.format();
        let stats = self.translate_units(&mut units, system_prompt).await?;

        let bytes = self.rewriter.rewrite(parsed, &units).map_err(|e| {
            error!("Failed to write translated document: {}", e);
            self.state = DispatchState::Failed;
            TranslationError::from(e)
        })?;

        info!(
            "Translated {} paragraphs ({} -> {} characters, {} kept original)",
            stats.total_units, stats.original_chars, stats.translated_chars, stats.failed_units
        );

        Ok(DispatchOutcome {
            bytes,
            format,
            stats,
            units,
        })
    }

    /// Translate `units` in place, in index order
    pub async fn translate_units(
        &mut self,
        units: &mut [TranslationUnit],
        system_prompt: &str,
    ) -> Result<DispatchStats, TranslationError> {
        let total = units.len();
        let batch_size = self.options.batch_size.max(1);
        let cancel = self.client.cancellation_token().clone();
        let mut stats = DispatchStats {
            total_units: total,
            ..DispatchStats::default()
        };

        self.state = DispatchState::Running;

        let mut start = 0;
        while start < total {
            if cancel.is_cancelled() {
                self.state = DispatchState::Cancelled;
                return Err(TranslationError::Cancelled);
            }

            let end = (start + batch_size).min(total);
            let batch = &mut units[start..end];
            let sequential = batch.len() == 1;

            let results: Vec<Result<TranslationOutcome, ProviderError>> = if sequential {
                self.emit(ProgressPhase::Start, start, total, &batch[0], &stats);
                vec![self.client.translate_detailed(&batch[0].original_text, system_prompt).await]
            } else {
                let client = &self.client;
                join_all(
                    batch
                        .iter()
                        .map(|unit| client.translate_detailed(&unit.original_text, system_prompt)),
                )
                .await
            };

            for (offset, (unit, result)) in batch.iter_mut().zip(results).enumerate() {
                let position = start + offset;
                if !sequential {
                    self.emit(ProgressPhase::Start, position, total, unit, &stats);
                }
                if let Err(e) = record(unit, result, &mut stats) {
                    self.state = DispatchState::Cancelled;
                    return Err(e);
                }
                self.emit(ProgressPhase::End, position, total, unit, &stats);
            }

            start = end;
            if start < total && !self.options.min_inter_unit_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.min_inter_unit_delay) => {}
                    _ = cancel.cancelled() => {
                        self.state = DispatchState::Cancelled;
                        return Err(TranslationError::Cancelled);
                    }
                }
            }
        }

        self.state = DispatchState::Completed;
        Ok(stats)
    }

    fn emit(&self, phase: ProgressPhase, position: usize, total: usize, unit: &TranslationUnit, stats: &DispatchStats) {
        let Some(sender) = &self.progress else {
            return;
        };

        let text = match phase {
            ProgressPhase::Start => unit.original_text.clone(),
            ProgressPhase::End => unit.output_text().to_string(),
        };
        let event = ProgressEvent {
            phase,
            unit_index: unit.index,
            total_units: total,
            text,
            cumulative_original_chars: stats.original_chars,
            cumulative_translated_chars: stats.translated_chars,
            percent_complete: percent(position, total),
        };

        // A closed receiver only means nobody is watching
        let _ = sender.send(event);
    }
}

fn percent(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (position * 100 / total).min(100) as u8
}

// Store the outcome of one unit and count it
fn record(
    unit: &mut TranslationUnit,
    result: Result<TranslationOutcome, ProviderError>,
    stats: &mut DispatchStats,
) -> Result<(), TranslationError> {
    match result {
        Ok(outcome) => {
            if outcome.is_degraded() {
                stats.degraded_units += 1;
            }
            unit.translated_text = Some(outcome.into_text());
        }
        Err(ProviderError::Cancelled) => return Err(TranslationError::Cancelled),
        Err(e) => {
            warn!("Paragraph {} keeps its original text: {}", unit.index, e);
            stats.failed_units += 1;
            unit.translated_text = Some(unit.original_text.clone());
        }
    }

    stats.original_chars += unit.original_text.chars().count();
    stats.translated_chars += unit.output_text().chars().count();
    Ok(())
}
