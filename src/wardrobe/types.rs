//! Types for wardrobe items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;

/// Category of a clothing item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClothingType {
    Top,
    Bottom,
    Shoes,
    Outerwear,
    Accessory,
    /// A category this client does not know about
    Other(String),
}

impl ClothingType {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Top => "Top",
            Self::Bottom => "Bottom",
            Self::Shoes => "Shoes",
            Self::Outerwear => "Outerwear",
            Self::Accessory => "Accessory",
            Self::Other(other) => other,
        }
    }
}

impl Default for ClothingType {
    fn default() -> Self {
        Self::Top
    }
}

impl From<String> for ClothingType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "shoes" => Self::Shoes,
            "outerwear" => Self::Outerwear,
            "accessory" => Self::Accessory,
            _ => Self::Other(value),
        }
    }
}

impl From<ClothingType> for String {
    fn from(value: ClothingType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ClothingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.to_string()) {
            Self::Other(other) => Err(Error::validation(format!(
                "Unknown clothing type '{}' (expected Top, Bottom, Shoes, Outerwear or Accessory)",
                other
            ))),
            known => Ok(known),
        }
    }
}

impl fmt::Display for ClothingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style of a clothing item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Style {
    Casual,
    Formal,
    Sport,
    Business,
    /// A style this client does not know about
    Other(String),
}

impl Style {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Casual => "casual",
            Self::Formal => "formal",
            Self::Sport => "sport",
            Self::Business => "business",
            Self::Other(other) => other,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::Casual
    }
}

impl From<String> for Style {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "casual" => Self::Casual,
            "formal" => Self::Formal,
            "sport" => Self::Sport,
            "business" => Self::Business,
            _ => Self::Other(value),
        }
    }
}

impl From<Style> for String {
    fn from(value: Style) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.to_string()) {
            Self::Other(other) => Err(Error::validation(format!(
                "Unknown style '{}' (expected casual, formal, sport or business)",
                other
            ))),
            known => Ok(known),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clothing item in the user's wardrobe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    /// The item ID
    pub id: i64,

    /// Owner username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Display name
    pub name: String,

    /// Image URL, absolute or relative to the backend
    pub image: String,

    /// Category
    pub clothing_type: ClothingType,

    /// Style
    pub style: Style,

    /// Dominant color name, computed by the server
    #[serde(default)]
    pub primary_color: Option<String>,

    /// Extracted palette as hex colors, computed by the server
    #[serde(default)]
    pub color_palette: Option<Vec<String>>,

    /// Cosine similarity to the queried item (similar-items endpoint only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

/// Color information of a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// The item ID
    pub id: i64,

    /// Dominant color name
    #[serde(default)]
    pub primary_color: Option<String>,

    /// Palette as hex colors
    #[serde(default)]
    pub color_palette: Option<Vec<String>>,
}

/// An image selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// File name sent with the multipart part
    pub file_name: String,

    /// MIME type, always `image/*`
    pub mime_type: String,

    /// Raw bytes
    pub data: Vec<u8>,
}

impl ImageFile {
    /// Create an image from bytes. The MIME type is derived from the file name.
    pub fn new(file_name: &str, data: Vec<u8>) -> Result<Self, Error> {
        let mime_type = image_mime_type(file_name).ok_or_else(|| {
            Error::validation(format!("'{}' does not look like an image", file_name))
        })?;

        Ok(Self {
            file_name: file_name.to_string(),
            mime_type,
            data,
        })
    }

    /// Read an image from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| Error::validation(format!("'{}' is not a file", path.display())))?;

        // Check the extension before reading a possibly large file
        image_mime_type(&file_name).ok_or_else(|| {
            Error::validation(format!("'{}' does not look like an image", file_name))
        })?;

        let data = tokio::fs::read(path).await?;
        Self::new(&file_name, data)
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        match self.file_name.split_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => self.file_name.clone(),
        }
    }
}

/// MIME type guessed from the file name, if it names an image
fn image_mime_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .iter()
        .find(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
}

/// A new item to add to the wardrobe
#[derive(Debug, Clone, PartialEq)]
pub struct NewClothingItem {
    /// Display name
    pub name: String,

    /// Category
    pub clothing_type: ClothingType,

    /// Style
    pub style: Style,

    /// The photograph
    pub image: ImageFile,
}

impl NewClothingItem {
    /// Create a new item. An empty name falls back to the image file stem.
    pub fn new(name: Option<&str>, clothing_type: ClothingType, style: Style, image: ImageFile) -> Self {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => image.stem(),
        };

        Self {
            name,
            clothing_type,
            style,
            image,
        }
    }
}
