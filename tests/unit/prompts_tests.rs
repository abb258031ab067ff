/*!
 * Tests for system prompt construction
 */

use doclingo::translation::prompts::PromptTemplate;
use doclingo::translation::{GlossaryItem, TranslationPromptBuilder, build_system_prompt};

/// Test that every glossary entry becomes a forced mapping clause
#[test]
fn test_buildSystemPrompt_shouldContainEveryGlossaryClause() {
    let glossary = vec![
        GlossaryItem::new("Dashboard", "Tableau de bord"),
        GlossaryItem::new("Sprint", "Sprint"),
        GlossaryItem::new("AI \"agent\"", "agent IA"),
    ];

    let prompt = build_system_prompt("French", &glossary);

    for item in &glossary {
        let clause = format!("\"{}\" MUST be translated as \"{}\"", item.term, item.translation);
        assert!(prompt.contains(&clause), "missing clause: {}", clause);
    }
}

/// Test that the glossary keeps its order in the prompt
#[test]
fn test_buildSystemPrompt_shouldKeepGlossaryOrder() {
    let glossary = vec![GlossaryItem::new("Zeta", "Z"), GlossaryItem::new("Alpha", "A")];

    let prompt = build_system_prompt("German", &glossary);

    let zeta = prompt.find("\"Zeta\"").unwrap();
    let alpha = prompt.find("\"Alpha\"").unwrap();
    assert!(zeta < alpha);
}

/// Test that entries with a blank side are left out
#[test]
fn test_buildSystemPrompt_blankEntries_shouldBeSkipped() {
    let glossary = vec![GlossaryItem::new("  ", "vide"), GlossaryItem::new("Empty", "")];

    let prompt = build_system_prompt("French", &glossary);

    assert!(!prompt.contains("MUST be translated as"));
    assert!(!prompt.contains(PromptTemplate::GLOSSARY_HEADER));
    assert_eq!(prompt, build_system_prompt("French", &[]));
}

/// Test that the rules and the target language are always present
#[test]
fn test_buildSystemPrompt_shouldStateRulesAndTarget() {
    let prompt = build_system_prompt("Japanese", &[]);

    assert!(prompt.contains("Target Language: Japanese"));
    assert!(prompt.contains("Preserve the original meaning"));
    assert!(prompt.contains("Do not translate punctuation"));
    assert!(prompt.contains("markdown"));
    assert!(prompt.contains("without explanations"));
}

/// Test that building twice yields the same prompt
#[test]
fn test_builder_shouldBeDeterministic() {
    let glossary = vec![GlossaryItem::new("Deck", "Présentation")];
    let builder = TranslationPromptBuilder::new("French").with_glossary(&glossary);

    assert_eq!(builder.build_system_prompt(), builder.build_system_prompt());
    assert_eq!(builder.build_system_prompt(), build_system_prompt("French", &glossary));
}

/// Test that a custom template replaces the rules
#[test]
fn test_builder_customTemplate_shouldRenderTargetLanguage() {
    let prompt = TranslationPromptBuilder::new("Italian")
        .with_template(PromptTemplate::new("Translate into {target_language}."))
        .with_glossary(&[GlossaryItem::new("Slide", "Diapositiva")])
        .build_system_prompt();

    assert!(prompt.starts_with("Translate into Italian."));
    assert!(prompt.ends_with("- \"Slide\" MUST be translated as \"Diapositiva\""));
}

/// Test that glossary entries are read from configuration JSON
#[test]
fn test_glossaryItem_shouldDeserializeFromJson() {
    let items: Vec<GlossaryItem> =
        serde_json::from_str(r#"[{"term":"Revenue","translation":"Chiffre d'affaires"}]"#).unwrap();

    assert_eq!(items, vec![GlossaryItem::new("Revenue", "Chiffre d'affaires")]);
}
