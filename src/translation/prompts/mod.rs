/*!
 * Prompt engineering for document translation.
 *
 * This module provides:
 * - The fixed translation rules protecting document layout
 * - Glossary injection as forced term mappings
 */

pub mod templates;

// Re-export main types
pub use templates::{GlossaryItem, PromptTemplate, TranslationPromptBuilder, build_system_prompt};
