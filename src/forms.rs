//! Form submission flows
//!
//! Each form validates its own fields, requires a session where the endpoint
//! does, sends exactly one request, and folds the outcome into a
//! [`SubmissionState`]. Nothing here returns an error: every failure ends up
//! as a message next to the form.

use std::fmt;

use crate::error::Error;
use crate::outfit::{Occasion, Outfit};
use crate::wardrobe::{ClothingItem, ClothingType, ImageFile, NewClothingItem, Style};
use crate::Zyvia;

/// Upload submitted without an image
pub const MISSING_IMAGE_MESSAGE: &str = "Please select an image to upload.";
/// Upload submitted while logged out
pub const UPLOAD_LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to upload clothing.";
/// Item created
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Uploaded successfully! Add another item.";
/// Upload request never reached the server
pub const NETWORK_ERROR_MESSAGE: &str =
    "A network error occurred. Could not connect to the server.";

/// Base item ID missing or not positive
pub const INVALID_BASE_ITEM_MESSAGE: &str = "Please enter a valid base item ID.";
/// Generation requested while logged out
pub const GENERATE_LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to generate outfits.";
/// Generation failed without a server message
pub const GENERATE_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// Username or password left empty
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter your username and password.";
/// Login rejected without a server message
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
/// Login request never reached the server
pub const CONNECT_FAILED_MESSAGE: &str = "Could not connect to the server. Please try again later.";

/// Account created
pub const REGISTER_SUCCESS_MESSAGE: &str = "Registered successfully. You can now log in!";
/// Registration failed without a server message
pub const REGISTER_FAILED_MESSAGE: &str = "Something went wrong";

/// Lifecycle of a single form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Request in flight
    Submitting,
    /// Last submission succeeded
    Success,
    /// Last submission failed; see the message
    Error,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionState {
    /// Where the submission stands
    pub status: SubmissionStatus,
    /// Text shown next to the form, empty when idle
    pub message: String,
}

impl SubmissionState {
    fn submitting(message: &str) -> Self {
        Self {
            status: SubmissionStatus::Submitting,
            message: message.to_string(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == SubmissionStatus::Error
    }
}

/// Adds a photographed item to the wardrobe
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// Optional display name; the image file stem is used when empty
    pub name: Option<String>,
    /// Category, `Top` by default
    pub clothing_type: ClothingType,
    /// Style, `casual` by default
    pub style: Style,
    /// The selected photograph
    pub image: Option<ImageFile>,
    /// The item created by the last successful submission
    pub created: Option<ClothingItem>,
    state: SubmissionState,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an image. Clears a previous result message.
    pub fn set_image(&mut self, image: Option<ImageFile>) {
        self.image = image;
        self.state = SubmissionState::default();
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    fn reset(&mut self) {
        self.name = None;
        self.clothing_type = ClothingType::default();
        self.style = Style::default();
        self.image = None;
    }

    pub async fn submit(&mut self, zyvia: &Zyvia) -> SubmissionState {
        self.state = self.run(zyvia).await;
        self.state.clone()
    }

    async fn run(&mut self, zyvia: &Zyvia) -> SubmissionState {
        let image = match &self.image {
            Some(image) => image.clone(),
            None => return SubmissionState::error(MISSING_IMAGE_MESSAGE),
        };

        if zyvia.session().current().await.is_none() {
            return SubmissionState::error(UPLOAD_LOGIN_REQUIRED_MESSAGE);
        }

        self.state = SubmissionState::submitting("Uploading your item...");

        let item = NewClothingItem::new(
            self.name.as_deref(),
            self.clothing_type.clone(),
            self.style.clone(),
            image,
        );

        match zyvia.wardrobe().upload(&item).await {
            Ok(created) => {
                self.created = Some(created);
                self.reset();
                SubmissionState::success(UPLOAD_SUCCESS_MESSAGE)
            }
            Err(Error::Http(err)) => {
                log::error!("Upload failed: {}", err);
                SubmissionState::error(NETWORK_ERROR_MESSAGE)
            }
            Err(Error::NotLoggedIn) => SubmissionState::error(UPLOAD_LOGIN_REQUIRED_MESSAGE),
            // Field errors arrive as JSON objects; show them verbatim.
            Err(Error::Api { body, message, .. }) => {
                let body = body.trim();
                if serde_json::from_str::<serde_json::Value>(body).is_ok() {
                    SubmissionState::error(body)
                } else if !message.is_empty() {
                    SubmissionState::error(message)
                } else {
                    SubmissionState::error("Upload failed.")
                }
            }
            Err(err) => SubmissionState::error(err.user_message("Upload failed.")),
        }
    }
}

/// Asks the server for outfits built around one item
#[derive(Debug, Clone, Default)]
pub struct GenerateOutfitForm {
    /// ID of the item to build around; must be positive
    pub base_item_id: Option<i64>,
    /// Occasion to dress for
    pub occasion: Occasion,
    /// Outfits returned by the last submission
    pub outfits: Vec<Outfit>,
    state: SubmissionState,
}

impl GenerateOutfitForm {
    pub fn new(base_item_id: Option<i64>, occasion: Occasion) -> Self {
        Self {
            base_item_id,
            occasion,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub async fn submit(&mut self, zyvia: &Zyvia) -> SubmissionState {
        self.state = self.run(zyvia).await;
        self.state.clone()
    }

    async fn run(&mut self, zyvia: &Zyvia) -> SubmissionState {
        let base_item_id = match self.base_item_id {
            Some(id) if id > 0 => id,
            _ => return SubmissionState::error(INVALID_BASE_ITEM_MESSAGE),
        };

        if zyvia.session().current().await.is_none() {
            return SubmissionState::error(GENERATE_LOGIN_REQUIRED_MESSAGE);
        }

        self.state = SubmissionState::submitting("Generating outfits...");
        self.outfits.clear();

        match zyvia.outfits().generate(base_item_id, self.occasion).await {
            Ok(outfits) => {
                let message = match outfits.len() {
                    0 => "No outfits could be generated.".to_string(),
                    1 => "Generated 1 outfit.".to_string(),
                    n => format!("Generated {} outfits.", n),
                };
                self.outfits = outfits;
                SubmissionState::success(message)
            }
            Err(Error::NotLoggedIn) => SubmissionState::error(GENERATE_LOGIN_REQUIRED_MESSAGE),
            Err(err) => {
                log::error!("Outfit generation failed: {}", err);
                SubmissionState::error(err.user_message(GENERATE_FAILED_MESSAGE))
            }
        }
    }
}

/// Signs a user in and stores the session
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Surrounding whitespace is trimmed before sending
    pub username: String,
    /// Cleared after a successful submission
    pub password: String,
    state: SubmissionState,
}

impl LoginForm {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            state: SubmissionState::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub async fn submit(&mut self, zyvia: &Zyvia) -> SubmissionState {
        self.state = self.run(zyvia).await;
        self.state.clone()
    }

    async fn run(&mut self, zyvia: &Zyvia) -> SubmissionState {
        let username = self.username.trim().to_string();
        if username.is_empty() || self.password.is_empty() {
            return SubmissionState::error(MISSING_CREDENTIALS_MESSAGE);
        }

        self.state = SubmissionState::submitting("Logging in...");

        match zyvia.auth().sign_in(&username, &self.password).await {
            Ok(session) => {
                self.password.clear();
                SubmissionState::success(format!("Logged in as {}.", session.username))
            }
            Err(Error::Http(err)) => {
                log::error!("Login failed: {}", err);
                SubmissionState::error(CONNECT_FAILED_MESSAGE)
            }
            Err(err) => {
                log::warn!("Login rejected: {}", err);
                match err {
                    Error::Api { message, .. } if !message.is_empty() => {
                        SubmissionState::error(message)
                    }
                    _ => SubmissionState::error(INVALID_CREDENTIALS_MESSAGE),
                }
            }
        }
    }
}

/// Creates a new account
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Email address, sent as given
    pub email: String,
    /// Surrounding whitespace is trimmed before sending
    pub username: String,
    /// Cleared after a successful submission
    pub password: String,
    state: SubmissionState,
}

impl RegisterForm {
    pub fn new(email: &str, username: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            state: SubmissionState::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub async fn submit(&mut self, zyvia: &Zyvia) -> SubmissionState {
        self.state = self.run(zyvia).await;
        self.state.clone()
    }

    async fn run(&mut self, zyvia: &Zyvia) -> SubmissionState {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return SubmissionState::error(MISSING_CREDENTIALS_MESSAGE);
        }

        self.state = SubmissionState::submitting("Creating your account...");

        match zyvia
            .auth()
            .register(&self.email, self.username.trim(), &self.password)
            .await
        {
            Ok(_) => {
                self.email.clear();
                self.username.clear();
                self.password.clear();
                SubmissionState::success(REGISTER_SUCCESS_MESSAGE)
            }
            Err(err) => {
                log::warn!("Registration failed: {}", err);
                match err {
                    Error::Api { message, .. } if !message.is_empty() => {
                        SubmissionState::error(message)
                    }
                    _ => SubmissionState::error(REGISTER_FAILED_MESSAGE),
                }
            }
        }
    }
}
