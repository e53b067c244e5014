//! Outfit generation and recommendations
//!
//! All scoring happens on the server; these calls only shape requests and
//! validate what comes back.

mod types;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::{extract_api_message, Error};
use crate::fetch::Fetch;
use crate::wardrobe::INVALID_RESPONSE_MESSAGE;

pub use types::*;

/// Client for the outfit endpoints
#[derive(Clone)]
pub struct OutfitClient {
    /// Client options
    options: ClientOptions,

    /// HTTP client used for requests
    client: Client,

    /// Auth client, used for bearer tokens
    auth: Auth,
}

impl OutfitClient {
    /// Create a new OutfitClient
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

    /// Generate outfits around a base item
    pub async fn generate(&self, base_item_id: i64, occasion: Occasion) -> Result<Vec<Outfit>, Error> {
        if base_item_id <= 0 {
            return Err(Error::validation("Please enter a valid base item ID."));
        }

        let url = self.get_url("/generate_outfit/");
        let token = self.auth.access_token().await?;

        let value = Fetch::post(&self.client, &url)
            .bearer_auth(&token)
            .json(&GenerateOutfitRequest {
                base_item_id,
                occasion,
            })?
            .execute_value()
            .await?;

        parse_outfits(value)
    }

    /// Get today's suggested outfit
    pub async fn outfit_of_the_day(&self) -> Result<Outfit, Error> {
        let url = self.get_url("/outfit-of-the-day/");
        let token = self.auth.access_token().await?;

        let value = Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute_value()
            .await?;

        if !value.is_object() {
            return Err(Error::invalid_response(INVALID_RESPONSE_MESSAGE));
        }

        let outfit: Outfit = serde_json::from_value(value.clone())
            .map_err(|_| Error::invalid_response(INVALID_RESPONSE_MESSAGE))?;

        if outfit.is_empty() {
            let message = extract_api_message(&value)
                .unwrap_or_else(|| INVALID_RESPONSE_MESSAGE.to_string());
            return Err(Error::InvalidResponse(message));
        }

        Ok(outfit)
    }

    /// Get recommended outfits for the logged-in user
    pub async fn recommendations(&self) -> Result<Vec<Outfit>, Error> {
        let url = self.get_url("/recommendations/");
        let token = self.auth.access_token().await?;

        let value = Fetch::get(&self.client, &url)
            .bearer_auth(&token)
            .execute_value()
            .await?;

        parse_outfits(value)
    }
}

/// Accept an array of outfits; anything else is reported with the server's
/// `detail` when it sent one.
pub fn parse_outfits(value: serde_json::Value) -> Result<Vec<Outfit>, Error> {
    if !value.is_array() {
        let message =
            extract_api_message(&value).unwrap_or_else(|| INVALID_RESPONSE_MESSAGE.to_string());
        return Err(Error::InvalidResponse(message));
    }

    serde_json::from_value(value).map_err(|err| {
        log::warn!("Outfits did not match the expected shape: {}", err);
        Error::invalid_response(INVALID_RESPONSE_MESSAGE)
    })
}
