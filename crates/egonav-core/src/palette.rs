//! Colors for entity types, relation types and communities.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::index::GraphIndex;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Unpack `0xRRGGBB`.
    #[allow(clippy::cast_possible_truncation)]
    const fn lit(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

const ENTITY_COLORS: &[(&str, Rgb)] = &[
    ("CONCEPT", Rgb::lit(0x42A5F5)),
    ("THEORY", Rgb::lit(0xAB47BC)),
    ("METHOD", Rgb::lit(0x66BB6A)),
    ("SYSTEM", Rgb::lit(0xFFA726)),
    ("FINDING", Rgb::lit(0xFFEE58)),
    ("RESEARCHER", Rgb::lit(0x26C6DA)),
    ("PHENOMENON", Rgb::lit(0xEF5350)),
    ("PUBLICATION", Rgb::lit(0x78909C)),
    ("FIELD", Rgb::lit(0x8D6E63)),
    ("DATASET", Rgb::lit(0x9CCC65)),
    ("PERSON", Rgb::lit(0x4FC3F7)),
    ("ORGANIZATION", Rgb::lit(0x81C784)),
    ("SHELL_COMPANY", Rgb::lit(0xFFB74D)),
    ("FINANCIAL_INSTRUMENT", Rgb::lit(0xF06292)),
    ("FINANCIAL_ACCOUNT", Rgb::lit(0xF06292)),
    ("GOVERNMENT_AGENCY", Rgb::lit(0xCE93D8)),
    ("LOCATION", Rgb::lit(0xBA68C8)),
    ("DOCUMENT", Rgb::lit(0x90A4AE)),
    ("EVENT", Rgb::lit(0xFFD54F)),
];

const DEFAULT_ENTITY_COLOR: Rgb = Rgb::lit(0xB0BEC5);

const SEMANTIC_EDGE_COLORS: &[(&str, Rgb)] = &[
    ("EXTENDS", Rgb::lit(0xAB47BC)),
    ("PROPOSED_BY", Rgb::lit(0x26C6DA)),
    ("SUPPORTS", Rgb::lit(0x66BB6A)),
    ("CONTRADICTS", Rgb::lit(0xEF5350)),
    ("USES_METHOD", Rgb::lit(0x42A5F5)),
    ("IMPLEMENTS", Rgb::lit(0xFFA726)),
    ("ASSOCIATED_WITH", Rgb::lit(0x78909C)),
    ("MENTIONED_IN", Rgb::lit(0x546E7A)),
];

const EDGE_PALETTE: &[Rgb] = &[
    Rgb::lit(0x4CAF50),
    Rgb::lit(0xFF7043),
    Rgb::lit(0x42A5F5),
    Rgb::lit(0xAB47BC),
    Rgb::lit(0x26A69A),
    Rgb::lit(0xEC407A),
    Rgb::lit(0xFFA726),
    Rgb::lit(0x66BB6A),
    Rgb::lit(0x7E57C2),
    Rgb::lit(0x29B6F6),
    Rgb::lit(0xEF5350),
    Rgb::lit(0x8D6E63),
    Rgb::lit(0x78909C),
    Rgb::lit(0xFFCA28),
    Rgb::lit(0x5C6BC0),
    Rgb::lit(0xD4E157),
    Rgb::lit(0x26C6DA),
    Rgb::lit(0xFF8A65),
    Rgb::lit(0x9CCC65),
    Rgb::lit(0xCE93D8),
];

const COMMUNITY_COLORS: &[Rgb] = &[
    Rgb::lit(0xFF6B6B),
    Rgb::lit(0x4ECDC4),
    Rgb::lit(0x45B7D1),
    Rgb::lit(0x96CEB4),
    Rgb::lit(0xFFEAA7),
    Rgb::lit(0xDDA0DD),
    Rgb::lit(0x98D8C8),
    Rgb::lit(0xF7DC6F),
    Rgb::lit(0xBB8FCE),
    Rgb::lit(0x85C1E9),
    Rgb::lit(0xF0B27A),
    Rgb::lit(0x82E0AA),
];

/// Color assignments for one dataset.
///
/// Relation types without a semantic color and communities without a
/// dataset-provided color take palette slots in sorted order, so the same
/// dataset always gets the same colors.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entities: HashMap<String, Rgb>,
    relations: HashMap<String, Rgb>,
    communities: HashMap<String, Rgb>,
}

impl Palette {
    #[must_use]
    pub fn for_index(index: &GraphIndex, community_colors: &BTreeMap<String, String>) -> Self {
        let entities = index
            .entity_types()
            .into_keys()
            .map(|ty| {
                let color = ENTITY_COLORS
                    .iter()
                    .find(|(k, _)| *k == ty)
                    .map_or(DEFAULT_ENTITY_COLOR, |(_, c)| *c);
                (ty, color)
            })
            .collect();
        let relations = index
            .relation_types()
            .into_keys()
            .enumerate()
            .map(|(i, rel)| {
                let color = SEMANTIC_EDGE_COLORS
                    .iter()
                    .find(|(k, _)| *k == rel)
                    .map_or(EDGE_PALETTE[i % EDGE_PALETTE.len()], |(_, c)| *c);
                (rel, color)
            })
            .collect();
        let communities = index
            .communities()
            .into_keys()
            .enumerate()
            .map(|(i, tag)| {
                let color = community_colors
                    .get(&tag)
                    .and_then(|hex| Rgb::from_hex(hex))
                    .unwrap_or(COMMUNITY_COLORS[i % COMMUNITY_COLORS.len()]);
                (tag, color)
            })
            .collect();
        Self {
            entities,
            relations,
            communities,
        }
    }

    #[must_use]
    pub fn entity(&self, entity_type: &str) -> Rgb {
        self.entities
            .get(entity_type)
            .copied()
            .unwrap_or(DEFAULT_ENTITY_COLOR)
    }

    #[must_use]
    pub fn relation(&self, relation_type: &str) -> Rgb {
        self.relations
            .get(relation_type)
            .copied()
            .unwrap_or(EDGE_PALETTE[0])
    }

    #[must_use]
    pub fn community(&self, tag: &str) -> Rgb {
        self.communities
            .get(tag)
            .copied()
            .unwrap_or(DEFAULT_ENTITY_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#FF6B6B"), Some(Rgb(255, 107, 107)));
        assert_eq!(Rgb::from_hex("4ecdc4"), Some(Rgb(78, 205, 196)));
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
        assert_eq!(Rgb(1, 2, 255).to_string(), "#0102FF");
    }

    #[test]
    fn dataset_colors_win_and_semantic_colors_apply() {
        let ds = Dataset::from_json_str(
            r##"{
                "nodes": [
                    {"id": "a", "entity_type": "PERSON", "community": "c1"},
                    {"id": "b", "entity_type": "ALIEN", "community": "c2"}
                ],
                "links": [{"source": "a", "target": "b", "relation_type": "SUPPORTS"}],
                "community_colors": {"c2": "#010203"}
            }"##,
        )
        .expect("parse");
        let index = GraphIndex::from_dataset(&ds);
        let palette = Palette::for_index(&index, &ds.community_colors);
        assert_eq!(palette.entity("PERSON"), Rgb::lit(0x4FC3F7));
        assert_eq!(palette.entity("ALIEN"), DEFAULT_ENTITY_COLOR);
        assert_eq!(palette.relation("SUPPORTS"), Rgb::lit(0x66BB6A));
        assert_eq!(palette.community("c1"), COMMUNITY_COLORS[0]);
        assert_eq!(palette.community("c2"), Rgb(1, 2, 3));
    }
}
