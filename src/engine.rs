/*!
 * Document translation entry point.
 *
 * `DocumentTranslator` takes document bytes, a target language and a glossary and
 * returns the rewritten document with its character statistics. The system prompt
 * is built once per document and shared by every unit.
 */

use log::{debug, info};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::document::{DocumentFormat, FormatPreservingRewriter, TranslationUnit, replace_fonts};
use crate::errors::TranslationError;
use crate::language_utils::display_language;
use crate::translation::{
    DispatchOptions, DispatchStats, Dispatcher, GlossaryItem, ProgressEvent, TranslationClient, build_system_prompt,
};

/// A translated document
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    /// Rewritten container bytes
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
    pub stats: DispatchStats,
    /// Units with their final text
    pub units: Vec<TranslationUnit>,
}

/// Translates whole documents with one provider
#[derive(Debug, Clone)]
pub struct DocumentTranslator {
    client: TranslationClient,
    options: DispatchOptions,
    rewriter: FormatPreservingRewriter,
    replacement_font: Option<String>,
}

impl DocumentTranslator {
    pub fn new(client: TranslationClient, options: DispatchOptions) -> Self {
        Self {
            client,
            options,
            rewriter: FormatPreservingRewriter::default(),
            replacement_font: None,
        }
    }

    /// Build a translator for the active provider of a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, TranslationError> {
        config.validate()?;

        let provider = config.translation.get_active_provider_config().ok_or_else(|| {
            TranslationError::Configuration(format!(
                "Provider {} is not present in available_providers",
                config.translation.provider
            ))
        })?;
        let client = TranslationClient::from_config(provider, &config.translation)?;

        Ok(Self::new(client, config.translation.dispatch_options())
            .with_rewriter(FormatPreservingRewriter::new(config.document.auto_fit_font))
            .with_replacement_font(config.document.replacement_font.clone()))
    }

    pub fn with_rewriter(mut self, rewriter: FormatPreservingRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Typeface applied to slide decks after translation
    pub fn with_replacement_font(mut self, font: Option<String>) -> Self {
        self.replacement_font = font.filter(|font| !font.trim().is_empty());
        self
    }

    /// Abort translation when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.client = self.client.with_cancellation(token);
        self
    }

    /// Translate one document
    pub async fn translate(
        &self,
        bytes: &[u8],
        target_language: &str,
        glossary: &[GlossaryItem],
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<TranslatedDocument, TranslationError> {
        if target_language.trim().is_empty() {
            return Err(TranslationError::Configuration(
                "Target language must not be empty".to_string(),
            ));
        }

        let language = display_language(target_language);
        let system_prompt = build_system_prompt(&language, glossary);
        debug!("System prompt for {}:\n{}", language, system_prompt);

        let mut dispatcher = Dispatcher::new(self.client.clone(), self.options.clone()).with_rewriter(self.rewriter);
        if let Some(sender) = progress {
            dispatcher = dispatcher.with_progress(sender);
        }

        let outcome = dispatcher.run(bytes, &system_prompt).await?;

        let bytes = match (&self.replacement_font, outcome.format) {
            (Some(font), DocumentFormat::Pptx) => {
                info!("Replacing slide fonts with {}", font);
                replace_fonts(&outcome.bytes, font)?
            }
            (Some(_), format) => {
                debug!("Font replacement skipped for {} documents", format);
                outcome.bytes
            }
            (None, _) => outcome.bytes,
        };

        Ok(TranslatedDocument {
            bytes,
            format: outcome.format,
            stats: outcome.stats,
            units: outcome.units,
        })
    }
}
