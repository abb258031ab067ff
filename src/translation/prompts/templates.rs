/*!
 * Prompt templates for document translation.
 *
 * The system instruction does not depend on the text being translated, so it is
 * built once per document and reused for every translation unit.
 */

use serde::{Deserialize, Serialize};

/// A forced terminology mapping, injected verbatim into the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryItem {
    /// Source term as it appears in the document
    pub term: String,

    /// Mandatory translation of the term
    pub translation: String,
}

impl GlossaryItem {
    /// Create a new glossary item.
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
        }
    }

    /// Entries with a blank side are ignored when building prompts.
    pub fn is_usable(&self) -> bool {
        !self.term.trim().is_empty() && !self.translation.trim().is_empty()
    }

    /// The forced-mapping clause for this entry.
    pub fn clause(&self) -> String {
        format!("\"{}\" MUST be translated as \"{}\"", self.term, self.translation)
    }
}

/// System prompt template for document translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for layout-sensitive documents.
    pub const DOCUMENT_TRANSLATOR: &'static str = r#"You are a professional document and presentation translator.
Translate the text provided by the user into the target language.

CRITICAL RULES:
1. Preserve the original meaning accurately.
2. Keep it concise. The translation must stay as close to the original length as possible so the page or slide layout is not disturbed.
3. If the target language usually needs more space, prefer shorter synonyms or standard professional abbreviations.
4. Do not translate punctuation, symbols, numbers or bullet markers. Keep characters such as ! ? . : - • © ® ™ / exactly as they appear.
5. Do not add markdown formatting unless the text asks for it.
6. Return only the translated text, without explanations or notes.

Target Language: {target_language}"#;

    /// Header introducing the forced terminology clauses.
    pub const GLOSSARY_HEADER: &'static str = "TERMINOLOGY GLOSSARY (STRICTLY FOLLOW THESE RULES):\nYou MUST use the translations defined below for the following terms:";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default document translator template.
    pub fn document_translator() -> Self {
        Self::new(Self::DOCUMENT_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, target_language: &str) -> String {
        self.template.replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::document_translator()
    }
}

/// Builder for the per-document system instruction.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    target_language: String,
    glossary: Vec<GlossaryItem>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(target_language: &str) -> Self {
        Self {
            template: PromptTemplate::default(),
            target_language: target_language.to_string(),
            glossary: Vec::new(),
        }
    }

    /// Set the glossary. Order is preserved in the rendered prompt.
    pub fn with_glossary(mut self, glossary: &[GlossaryItem]) -> Self {
        self.glossary = glossary.to_vec();
        self
    }

    /// Replace the rule template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.template.render(&self.target_language);

        let clauses: Vec<String> = self
            .glossary
            .iter()
            .filter(|item| item.is_usable())
            .map(GlossaryItem::clause)
            .collect();

        if !clauses.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(PromptTemplate::GLOSSARY_HEADER);
            for clause in clauses {
                prompt.push_str("\n- ");
                prompt.push_str(&clause);
            }
        }

        prompt
    }
}

/// Build the system instruction for a target language and ordered glossary.
pub fn build_system_prompt(target_language: &str, glossary: &[GlossaryItem]) -> String {
    TranslationPromptBuilder::new(target_language)
        .with_glossary(glossary)
        .build_system_prompt()
}
