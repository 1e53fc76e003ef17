//! Favourited listing ids for the signed-in user.
//!
//! The server owns the wishlist. This set mirrors it: `sync` reloads it
//! wholesale and `toggle` applies whatever state the server reports back,
//! never a locally guessed flip.

#[cfg(test)]
#[path = "wishlist_test.rs"]
mod wishlist_test;

use std::collections::BTreeSet;

use crate::net::api::ApiError;
use crate::net::property::PropertyService;
use crate::net::types::Property;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wishlist {
    ids: BTreeSet<String>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_from<'a>(&mut self, properties: impl IntoIterator<Item = &'a Property>) {
        self.ids = properties.into_iter().map(|p| p.id.clone()).collect();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn apply_toggle(&mut self, id: &str, is_favorite: bool) {
        if is_favorite {
            self.ids.insert(id.to_owned());
        } else {
            self.ids.remove(id);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Stamp `is_favorite` on fetched listings.
    pub fn annotate(&self, properties: &mut [Property]) {
        for property in properties {
            property.is_favorite = Some(self.contains(&property.id));
        }
    }

    /// Reload from the server and return the favourited listings.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors; the set is left untouched.
    pub async fn sync(&mut self, service: &PropertyService, token: &str) -> Result<Vec<Property>, ApiError> {
        let favorites = service.favorites(token).await?;
        self.replace_from(&favorites);
        tracing::debug!(count = self.len(), "wishlist synced");
        Ok(favorites)
    }

    /// Flip one listing and return its new state as reported by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty id, otherwise transport or status errors.
    pub async fn toggle(&mut self, service: &PropertyService, token: &str, id: &str) -> Result<bool, ApiError> {
        let answer = service.toggle_favorite(token, id).await?;
        self.apply_toggle(id.trim(), answer.is_favorite);
        Ok(answer.is_favorite)
    }
}
