// ============================================================
// Layer 3 - Prompt Template
// ============================================================
// The model never sees (entity, text) as two fields. Both are
// rendered into one string:
//
//   What is the sentiment about [ENTITY] <e>Apple</e> in: I love their new iPhone!
//
// Training and serving must render byte-identical strings or
// accuracy silently degrades. There is exactly one renderer,
// PromptTemplate::render, and the trained artifact records which
// template variant it was trained with. The server renders with
// the variant read back from the artifact, not with CURRENT.

use serde::{Deserialize, Serialize};

/// Marker wrapped around the entity name
pub const ENTITY_OPEN:  &str = "<e>";
pub const ENTITY_CLOSE: &str = "</e>";

/// Versioned prompt templates. A new variant is added whenever the
/// rendering changes; old variants stay so old artifacts keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptTemplate {
    /// `What is the sentiment about [ENTITY] <e>{entity}</e> in: {text}`
    EntityTaggedV1,
}

impl PromptTemplate {
    /// Template used by new training runs
    pub const CURRENT: PromptTemplate = PromptTemplate::EntityTaggedV1;

    pub fn render(&self, entity: &str, text: &str) -> String {
        match self {
            PromptTemplate::EntityTaggedV1 => format!(
                "What is the sentiment about [ENTITY] {ENTITY_OPEN}{entity}{ENTITY_CLOSE} in: {text}"
            ),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Render an (entity, text) pair with the current template.
///
/// Example:
///   format_input("Apple", "I love their new iPhone!")
///   → "What is the sentiment about [ENTITY] <e>Apple</e> in: I love their new iPhone!"
#[cfg_attr(not(test), allow(dead_code))]
pub fn format_input(entity: &str, text: &str) -> String {
    PromptTemplate::CURRENT.render(entity, text)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_example() {
        assert_eq!(
            format_input("Apple", "I love their new iPhone!"),
            "What is the sentiment about [ENTITY] <e>Apple</e> in: I love their new iPhone!"
        );
    }

    #[test]
    fn test_entity_wrapped_exactly_once_and_text_verbatim() {
        let cases = [
            ("Apple", "I love their new iPhone!"),
            ("Borderlands", ""),
            ("", "no entity at all"),
            ("Café Ünïcode", "  spaces  and\ttabs\nnewline "),
            ("Microsoft", "Microsoft Microsoft Microsoft"),
        ];
        for (entity, text) in cases {
            let out = format_input(entity, text);
            let tagged = format!("{ENTITY_OPEN}{entity}{ENTITY_CLOSE}");
            assert_eq!(out.matches(&tagged).count(), 1, "entity tag in {out:?}");
            assert!(out.ends_with(text), "text verbatim in {out:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let a = format_input("Nvidia", "GPUs are sold out again");
        let b = format_input("Nvidia", "GPUs are sold out again");
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_input_uses_current_template() {
        assert_eq!(
            format_input("x", "y"),
            PromptTemplate::CURRENT.render("x", "y")
        );
    }
}
