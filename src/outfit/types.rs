//! Types for outfits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::wardrobe::ClothingItem;

/// A server-computed grouping of clothing items
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outfit {
    /// The item the outfit was built around
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<ClothingItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<ClothingItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<ClothingItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoes: Option<ClothingItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outerwear: Option<ClothingItem>,

    /// Overall match score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Visual similarity component of the score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_similarity: Option<f64>,

    /// Why these items were put together
    #[serde(default)]
    pub explanation: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Outfit {
    /// The pieces present in this outfit, in display order
    pub fn items(&self) -> Vec<(&'static str, &ClothingItem)> {
        [
            ("base", &self.base),
            ("top", &self.top),
            ("bottom", &self.bottom),
            ("shoes", &self.shoes),
            ("outerwear", &self.outerwear),
        ]
        .into_iter()
        .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
        .collect()
    }

    /// Whether the outfit contains no items at all
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Occasion an outfit is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    #[default]
    Casual,
    Formal,
    Party,
}

impl Occasion {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Formal => "formal",
            Self::Party => "party",
        }
    }
}

impl FromStr for Occasion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "formal" => Ok(Self::Formal),
            "party" => Ok(Self::Party),
            other => Err(Error::validation(format!(
                "Unknown occasion '{}' (expected casual, formal or party)",
                other
            ))),
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the outfit generation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOutfitRequest {
    /// The item to build outfits around
    pub base_item_id: i64,

    /// The occasion
    pub occasion: Occasion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outfit_optional_fields() {
        let outfit: Outfit = serde_json::from_value(json!({
            "top": {
                "id": 1, "name": "Tee", "image": "/m/tee.png",
                "clothing_type": "top", "style": "casual"
            },
            "shoes": {
                "id": 2, "name": "Sneakers", "image": "/m/sn.png",
                "clothing_type": "shoes", "style": "sport"
            },
            "explanation": "A stylish look",
            "tags": ["casual", "Outfit of the Day"]
        }))
        .unwrap();

        let slots: Vec<_> = outfit.items().iter().map(|(slot, _)| *slot).collect();
        assert_eq!(slots, vec!["top", "shoes"]);
        assert!(outfit.score.is_none());
        assert_eq!(outfit.tags.len(), 2);
    }

    #[test]
    fn test_outfit_missing_explanation_and_tags() {
        let outfit: Outfit = serde_json::from_value(json!({ "score": 0.8 })).unwrap();
        assert!(outfit.is_empty());
        assert_eq!(outfit.explanation, "");
        assert!(outfit.tags.is_empty());
    }

    #[test]
    fn test_generate_request_body() {
        let body = GenerateOutfitRequest {
            base_item_id: 4,
            occasion: "Party".parse().unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "base_item_id": 4, "occasion": "party" })
        );
    }
}
