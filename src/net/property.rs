//! Property endpoints: browse, owner CRUD, and favourites.

#[cfg(test)]
#[path = "property_test.rs"]
mod property_test;

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::api::{ApiClient, ApiError, require_id, segment_path};
use super::auth::image_part;
use super::types::{FavoriteToggle, ImageUpload, MessageResponse, Property, PropertyDraft};
use crate::validation::property::check_image_count;
use crate::validation::{Checker, Validate};

pub const DATA_FIELD: &str = "data";
pub const IMAGES_FIELD: &str = "images";

/// Sub-routes of `/property` that a listing id must not shadow.
const RESERVED_IDS: [&str; 2] = ["user", "favorites"];

#[derive(Debug, Clone)]
pub struct PropertyService {
    api: ApiClient,
}

impl PropertyService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All public listings.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn list(&self) -> Result<Vec<Property>, ApiError> {
        self.api.get("/property", None).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty or reserved id, otherwise transport, status, or decode errors.
    pub async fn get(&self, id: &str) -> Result<Property, ApiError> {
        self.api.get(&property_path(id, None)?, None).await
    }

    /// Listings owned by the token's user.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn by_owner(&self, token: &str) -> Result<Vec<Property>, ApiError> {
        self.api.get("/property/user", Some(token)).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing draft or too many images,
    /// otherwise transport, status, or decode errors.
    pub async fn create(
        &self,
        token: &str,
        draft: &PropertyDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Property, ApiError> {
        let form = listing_form(draft, images)?;
        tracing::debug!(title = %draft.title, "creating listing");
        self.api
            .send_multipart(Method::POST, "/property", Some(token), form)
            .await
    }

    /// Replace a listing's fields; new images are appended server-side.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing draft or too many images,
    /// otherwise transport, status, or decode errors.
    pub async fn update(
        &self,
        token: &str,
        id: &str,
        draft: &PropertyDraft,
        images: Vec<ImageUpload>,
    ) -> Result<Property, ApiError> {
        let path = property_path(id, None)?;
        let form = listing_form(draft, images)?;
        self.api
            .send_multipart(Method::PUT, &path, Some(token), form)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty or reserved id, otherwise transport or status errors.
    pub async fn delete(&self, token: &str, id: &str) -> Result<MessageResponse, ApiError> {
        self.api
            .delete(&property_path(id, None)?, Some(token))
            .await
    }

    /// The token user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn favorites(&self, token: &str) -> Result<Vec<Property>, ApiError> {
        self.api.get("/property/favorites", Some(token)).await
    }

    /// Flip a listing in or out of the wishlist. The answer is the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty or reserved id, otherwise transport or status errors.
    pub async fn toggle_favorite(&self, token: &str, id: &str) -> Result<FavoriteToggle, ApiError> {
        let path = property_path(id, Some("favorite"))?;
        self.api
            .send_json(
                Method::POST,
                &path,
                Some(token),
                &serde_json::json!({}),
            )
            .await
    }
}

/// `/property/{id}[/{suffix}]` with the id encoded as one path segment.
pub(crate) fn property_path(id: &str, suffix: Option<&str>) -> Result<String, ApiError> {
    let id = require_id(id)?;
    if RESERVED_IDS.contains(&id) {
        return Err(ApiError::InvalidInput(format!("invalid property id: {id}")));
    }
    match suffix {
        Some(suffix) => segment_path(&["property", id, suffix]),
        None => segment_path(&["property", id]),
    }
}

/// Multipart body for create and update: the draft as a JSON `data` part plus image files.
pub(crate) fn listing_form(draft: &PropertyDraft, images: Vec<ImageUpload>) -> Result<Form, ApiError> {
    draft.validate()?;
    Checker::default()
        .check("images", check_image_count(images.len()))
        .finish()?;

    let data = Part::text(serde_json::to_string(draft)?).mime_str("application/json")?;
    let mut form = Form::new().part(DATA_FIELD, data);
    for image in images {
        form = form.part(IMAGES_FIELD, image_part(image)?);
    }
    Ok(form)
}
