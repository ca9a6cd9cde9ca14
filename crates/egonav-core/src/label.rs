//! Perspective-aware relation labels.
//!
//! Seen from an edge's source, `GOVERNS` reads "governs". Seen from its
//! target the same edge should read "governed by". Known relation types are
//! inverted through a fixed table, which is the source of truth. Anything
//! else goes through [`InverseFallback`].
//!
//! The [`InverseFallback::Heuristic`] branch is lossy: it guesses a passive
//! form from a trailing `s` and produces wrong inflections for irregular
//! verbs ("pays" becomes "payd by"). Extend the table rather than relying on
//! it for relation types that show up often.

use serde::{Deserialize, Serialize};

use crate::model::Edge;

/// Known inversions, keyed by the normalized (lowercase, spaced) label.
const INVERSIONS: &[(&str, &str)] = &[
    ("associated with", "associated with"),
    ("related to", "related to"),
    ("same as", "same as"),
    ("contradicts", "contradicted by"),
    ("governs", "governed by"),
    ("supports", "supported by"),
    ("extends", "extended by"),
    ("implements", "implemented by"),
    ("proposed by", "proposed"),
    ("uses method", "method used by"),
    ("mentioned in", "mentions"),
    ("works for", "employs"),
    ("employed by", "employs"),
    ("located in", "location of"),
    ("part of", "has part"),
    ("member of", "has member"),
    ("owns", "owned by"),
    ("funds", "funded by"),
    ("cites", "cited by"),
    ("influences", "influenced by"),
    ("knows", "known by"),
    ("precedes", "follows"),
    ("follows", "precedes"),
    ("parent of", "child of"),
    ("child of", "parent of"),
    ("subsidiary of", "parent company of"),
];

/// What to do with relation types missing from the inversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InverseFallback {
    /// Best-effort passive form: trailing `s` (not `ss`) becomes `d by`,
    /// anything else gets ` (inverse)` appended.
    #[default]
    Heuristic,
    /// Direction-neutral gloss: `"<label> (reverse)"`.
    Neutral,
}

/// Lowercase `relation_type` and replace `_`/`-` separators with spaces.
#[must_use]
pub fn forward_label(relation_type: &str) -> String {
    relation_type
        .trim()
        .to_lowercase()
        .split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label of `relation_type` read from the target's side.
#[must_use]
pub fn inverse_label(relation_type: &str, fallback: InverseFallback) -> String {
    let forward = forward_label(relation_type);
    if let Some((_, inverse)) = INVERSIONS.iter().find(|(k, _)| *k == forward) {
        return (*inverse).to_string();
    }
    match fallback {
        InverseFallback::Heuristic => {
            if forward.ends_with('s') && !forward.ends_with("ss") {
                format!("{}d by", &forward[..forward.len() - 1])
            } else {
                format!("{forward} (inverse)")
            }
        }
        InverseFallback::Neutral => format!("{forward} (reverse)"),
    }
}

/// True when the inversion of `relation_type` comes from the fixed table.
#[must_use]
pub fn has_known_inverse(relation_type: &str) -> bool {
    let forward = forward_label(relation_type);
    INVERSIONS.iter().any(|(k, _)| *k == forward)
}

/// Label `relation_type` as seen from `perspective` on `edge`.
///
/// The forward form is used when `perspective` is the source, when it is
/// not an endpoint at all (no meaningful direction), and for self-loops.
#[must_use]
pub fn label(
    relation_type: &str,
    perspective: &str,
    edge: &Edge,
    fallback: InverseFallback,
) -> String {
    if edge.target == perspective && edge.source != perspective {
        inverse_label(relation_type, fallback)
    } else {
        forward_label(relation_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, relation: &str) -> Edge {
        Edge {
            id: "e".to_string(),
            source: source.to_string(),
            target: target.to_string(),
            relation_type: relation.to_string(),
            confidence: None,
            support_count: 1,
            support_doc_count: 0,
            evidence: None,
        }
    }

    #[test]
    fn forward_is_lowercase_with_spaces() {
        assert_eq!(forward_label("EMPLOYED_BY"), "employed by");
        assert_eq!(forward_label("uses-method"), "uses method");
        assert_eq!(forward_label("  KNOWS "), "knows");
    }

    #[test]
    fn table_inversions() {
        let h = InverseFallback::Heuristic;
        assert_eq!(inverse_label("GOVERNS", h), "governed by");
        assert_eq!(inverse_label("CONTRADICTS", h), "contradicted by");
        assert_eq!(inverse_label("ASSOCIATED_WITH", h), "associated with");
        assert_eq!(inverse_label("works-for", h), "employs");
    }

    #[test]
    fn heuristic_fallbacks() {
        let h = InverseFallback::Heuristic;
        let founded = inverse_label("FOUNDED", h);
        assert_eq!(founded, "founded (inverse)");
        assert_eq!(inverse_label("FOUNDED", h), founded);
        assert_eq!(inverse_label("ACQUIRES", h), "acquired by");
        assert_eq!(inverse_label("ADDRESSES", h), "addressed by");
        assert_eq!(inverse_label("BYPASS", h), "bypass (inverse)");
        assert!(!has_known_inverse("FOUNDED"));
    }

    #[test]
    fn neutral_fallback_does_not_inflect() {
        assert_eq!(
            inverse_label("ACQUIRES", InverseFallback::Neutral),
            "acquires (reverse)"
        );
        assert_eq!(
            inverse_label("GOVERNS", InverseFallback::Neutral),
            "governed by"
        );
    }

    #[test]
    fn perspective_picks_direction() {
        let e = edge("a", "b", "GOVERNS");
        let h = InverseFallback::Heuristic;
        assert_eq!(label("GOVERNS", "a", &e, h), "governs");
        assert_eq!(label("GOVERNS", "b", &e, h), "governed by");
        assert_eq!(label("GOVERNS", "c", &e, h), "governs");
        let looped = edge("a", "a", "CITES");
        assert_eq!(label("CITES", "a", &looped, h), "cites");
    }
}
