//! Wire DTOs for the rentals REST API.
//!
//! DESIGN
//! ======
//! The API speaks camelCase JSON with document-style `_id` keys. Types accept
//! `id` as well so cached copies and fixtures stay readable, and most nested
//! fields default when absent because list endpoints return trimmed documents.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A signed-up account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// Email confirmed through the signup OTP.
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_aadhar_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_owned()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Studio,
    Pg,
    Room,
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub const ALL: [Self; 6] = [Self::Apartment, Self::House, Self::Villa, Self::Studio, Self::Pg, Self::Room];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Villa => "villa",
            Self::Studio => "studio",
            Self::Pg => "pg",
            Self::Room => "room",
            Self::Other => "other",
        }
    }

    /// Single-room listings may advertise zero bedrooms.
    #[must_use]
    pub fn allows_zero_bedrooms(self) -> bool {
        matches!(self, Self::Studio | Self::Pg | Self::Room)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown property type: {s}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Furnishing {
    Furnished,
    SemiFurnished,
    Unfurnished,
}

impl FromStr for Furnishing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "furnished" => Ok(Self::Furnished),
            "semi-furnished" | "semi" => Ok(Self::SemiFurnished),
            "unfurnished" => Ok(Self::Unfurnished),
            other => Err(format!("unknown furnishing: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantPreference {
    Family,
    Bachelors,
    Students,
    Couples,
    Any,
}

impl FromStr for TenantPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "family" => Ok(Self::Family),
            "bachelors" => Ok(Self::Bachelors),
            "students" => Ok(Self::Students),
            "couples" => Ok(Self::Couples),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown tenant preference: {other}")),
        }
    }
}

/// Monthly rent and deposit, in whole rupees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub rent: u64,
    #[serde(default)]
    pub security_deposit: u64,
    #[serde(default)]
    pub negotiable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    /// Map pin for the listing, when both coordinates are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// One-line address for list rows.
    #[must_use]
    pub fn display_line(&self) -> String {
        [self.address.as_str(), self.city.as_str(), self.state.as_str(), self.pincode.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub area_sqft: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnishing: Option<Furnishing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<String>,
}

/// Monthly maintenance charge and whether rent already covers it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintenance {
    #[serde(default)]
    pub included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

/// Listing owner: a bare id, or the owner's profile when the API populates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Id(String),
    Profile(Box<User>),
}

impl Owner {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Profile(user) => &user.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: PropertyType,
    pub price: Price,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub maintenance: Maintenance,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tenant_preferences: Vec<TenantPreference>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Property {
    /// Rent plus maintenance when maintenance is billed separately.
    #[must_use]
    pub fn monthly_total(&self) -> u64 {
        if self.maintenance.included {
            return self.price.rent;
        }
        self.price
            .rent
            .saturating_add(self.maintenance.amount.unwrap_or(0))
    }
}

/// Listing-form payload: everything the owner edits on a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub price: Price,
    pub location: Location,
    pub details: Details,
    #[serde(default)]
    pub maintenance: Maintenance,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tenant_preferences: Vec<TenantPreference>,
}

impl From<&Property> for PropertyDraft {
    fn from(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            description: property.description.clone(),
            property_type: property.property_type,
            price: property.price.clone(),
            location: property.location.clone(),
            details: property.details.clone(),
            maintenance: property.maintenance.clone(),
            amenities: property.amenities.clone(),
            tenant_preferences: property.tenant_preferences.clone(),
        }
    }
}

/// An image file attached to a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from a path name and its bytes; the MIME type follows the extension.
    #[must_use]
    pub fn new(path: &Path, bytes: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("image")
            .to_owned();
        let mime_type = mime_for_path(path).to_owned();
        Self { file_name, mime_type, bytes }
    }
}

#[must_use]
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Returned by signin and OTP verification: the session credential plus its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub is_favorite: bool,
    #[serde(default)]
    pub message: Option<String>,
}
