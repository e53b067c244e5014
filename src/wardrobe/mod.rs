//! Wardrobe operations: listing, uploading and inspecting clothing items

mod types;

use reqwest::{multipart, Client};
use std::collections::HashMap;
use url::Url;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use types::*;

/// Message used when the wardrobe endpoint returns an unexpected shape
pub const INVALID_RESPONSE_MESSAGE: &str = "Received an invalid response.";

/// Client for the clothing endpoints
#[derive(Clone)]
pub struct WardrobeClient {
    /// Client options
    options: ClientOptions,

    /// HTTP client used for requests
    client: Client,

    /// Auth client, used for bearer tokens
    auth: Auth,
}

impl WardrobeClient {
    /// Create a new WardrobeClient
    pub(crate) fn new(options: ClientOptions, client: Client, auth: Auth) -> Self {
        Self {
            options,
            client,
            auth,
        }
    }

    fn get_url(&self, path: &str) -> String {
        self.options.api_url(&format!("/clothing{}", path))
    }

    /// List the items in the wardrobe
    pub async fn list(&self) -> Result<Vec<ClothingItem>, Error> {
        self.list_filtered(None).await
    }

    /// List the items in the wardrobe, optionally only those of one primary color
    pub async fn list_filtered(&self, primary_color: Option<&str>) -> Result<Vec<ClothingItem>, Error> {
        let url = self.get_url("/");
        let token = self.auth.access_token().await?;

        let mut request = Fetch::get(&self.client, &url).bearer_auth(&token);

        if let Some(color) = primary_color {
            let mut params = HashMap::new();
            params.insert("primary_color".to_string(), color.to_string());
            request = request.query(params);
        }

        let value = request.execute_value().await?;
        parse_wardrobe(value)
    }

    /// Get a single item
    pub async fn get(&self, id: i64) -> Result<ClothingItem, Error> {
        let url = self.get_url(&format!("/{}/", id));
        let token = self.auth.access_token().await?;

        Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute::<ClothingItem>()
            .await
    }

    /// Upload a new item
    pub async fn upload(&self, item: &NewClothingItem) -> Result<ClothingItem, Error> {
        let url = self.get_url("/");
        let token = self.auth.access_token().await?;

        let image = multipart::Part::bytes(item.image.data.clone())
            .file_name(item.image.file_name.clone())
            .mime_str(&item.image.mime_type)?;

        let form = multipart::Form::new()
            .text("name", item.name.clone())
            .text("clothing_type", item.clothing_type.to_string())
            .text("style", item.style.to_string())
            .part("image", image);

        let created = Fetch::post(&self.client, &url)
            .bearer_auth(&token)
            .multipart(form)
            .execute::<ClothingItem>()
            .await?;

        log::info!("Uploaded '{}' as item {}", created.name, created.id);
        Ok(created)
    }

    /// Delete an item
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        let url = self.get_url(&format!("/{}/", id));
        let token = self.auth.access_token().await?;

        Fetch::delete(&self.client, &url)
            .bearer_auth(&token)
            .execute_empty()
            .await
    }

    /// Get the color palette the server extracted for an item
    pub async fn palette(&self, id: i64) -> Result<ColorPalette, Error> {
        let url = self.get_url(&format!("/{}/palette/", id));
        let token = self.auth.access_token().await?;

        Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute::<ColorPalette>()
            .await
    }

    /// Get items that look similar to `id`, most similar first
    pub async fn similar(&self, id: i64) -> Result<Vec<ClothingItem>, Error> {
        let url = self.get_url(&format!("/{}/similar/", id));
        let token = self.auth.access_token().await?;

        Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute::<Vec<ClothingItem>>()
            .await
    }

    /// Absolute URL for an item's image
    pub fn image_url(&self, item: &ClothingItem) -> String {
        resolve_image_url(&self.options.base_url, &item.image)
    }
}

/// Accept either a bare array or `{ "clothing": [...] }`.
pub fn parse_wardrobe(value: serde_json::Value) -> Result<Vec<ClothingItem>, Error> {
    let items = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => match map.remove("clothing") {
            Some(items @ serde_json::Value::Array(_)) => items,
            _ => return Err(Error::invalid_response(INVALID_RESPONSE_MESSAGE)),
        },
        _ => return Err(Error::invalid_response(INVALID_RESPONSE_MESSAGE)),
    };

    serde_json::from_value(items).map_err(|err| {
        log::warn!("Wardrobe items did not match the expected shape: {}", err);
        Error::invalid_response(INVALID_RESPONSE_MESSAGE)
    })
}

/// Resolve an image path returned by the API against the backend base URL.
///
/// Absolute URLs are returned unchanged.
pub fn resolve_image_url(base_url: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(image)) {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            image.trim_start_matches('/')
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wardrobe_shapes() {
        let item = json!({
            "id": 1, "name": "Tee", "image": "/media/tee.png",
            "clothing_type": "Top", "style": "casual"
        });

        assert_eq!(parse_wardrobe(json!([item.clone()])).unwrap().len(), 1);
        assert_eq!(parse_wardrobe(json!({ "clothing": [item] })).unwrap().len(), 1);
        assert!(parse_wardrobe(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_wardrobe_rejects_other_shapes() {
        for value in [
            json!({ "items": [] }),
            json!({ "clothing": "none" }),
            json!("hello"),
            json!(null),
            json!([{ "unexpected": true }]),
        ] {
            let err = parse_wardrobe(value).unwrap_err();
            assert_eq!(err.user_message("x"), INVALID_RESPONSE_MESSAGE);
        }
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url("http://localhost:8000", "/media/clothes/a.png"),
            "http://localhost:8000/media/clothes/a.png"
        );
        assert_eq!(
            resolve_image_url("http://localhost:8000", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            resolve_image_url("not a url", "media/a.png"),
            "not a url/media/a.png"
        );
    }
}
