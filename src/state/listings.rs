//! Browse filters and sort order over fetched listings.
//!
//! Filtering happens client-side on whatever `PropertyService::list`
//! returned. An unset criterion matches everything.

#[cfg(test)]
#[path = "listings_test.rs"]
mod listings_test;

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::net::types::{Furnishing, Property, PropertyType, TenantPreference};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub property_type: Option<PropertyType>,
    /// Inclusive bounds on monthly rent.
    pub min_rent: Option<u64>,
    pub max_rent: Option<u64>,
    /// Exact city, ignoring case and surrounding whitespace.
    pub city: Option<String>,
    /// Case-insensitive substring of title, description, or city.
    pub query: Option<String>,
    pub furnishing: Option<Furnishing>,
    /// Listings open to `any` tenant also match.
    pub tenant: Option<TenantPreference>,
}

impl ListingFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        if self.property_type.is_some_and(|t| t != property.property_type) {
            return false;
        }
        let rent = property.price.rent;
        if self.min_rent.is_some_and(|min| rent < min) || self.max_rent.is_some_and(|max| rent > max) {
            return false;
        }
        if non_blank(self.city.as_deref()).is_some_and(|city| !property.location.city.trim().eq_ignore_ascii_case(city)) {
            return false;
        }
        if let Some(query) = non_blank(self.query.as_deref()) {
            let needle = query.to_lowercase();
            let hit = [&property.title, &property.description, &property.location.city]
                .into_iter()
                .any(|text| text.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.furnishing.is_some() && property.details.furnishing != self.furnishing {
            return false;
        }
        if let Some(tenant) = self.tenant {
            let prefs = &property.tenant_preferences;
            if !prefs.contains(&tenant) && !prefs.contains(&TenantPreference::Any) {
                return false;
            }
        }
        true
    }

    /// Matching listings, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, properties: &'a [Property]) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently created first. Listings whose creation time is missing
    /// or not RFC 3339 go last.
    #[default]
    Newest,
    RentLowToHigh,
    RentHighToLow,
}

impl SortOrder {
    pub const ALL: [Self; 3] = [Self::Newest, Self::RentLowToHigh, Self::RentHighToLow];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::RentLowToHigh => "rent-asc",
            Self::RentHighToLow => "rent-desc",
        }
    }

    /// Stable: ties keep their incoming order.
    pub fn sort(self, listings: &mut [&Property]) {
        match self {
            Self::Newest => listings.sort_by_cached_key(|p| {
                let created = created_at(p);
                (created.is_none(), Reverse(created))
            }),
            Self::RentLowToHigh => listings.sort_by_key(|p| p.price.rent),
            Self::RentHighToLow => listings.sort_by_key(|p| Reverse(p.price.rent)),
        }
    }
}

fn created_at(property: &Property) -> Option<OffsetDateTime> {
    let raw = property.created_at.as_deref()?;
    OffsetDateTime::parse(raw.trim(), &Rfc3339).ok()
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == lowered)
            .ok_or_else(|| format!("unknown sort order: {s} (expected newest, rent-asc, or rent-desc)"))
    }
}

/// Filter then sort, the way the browse screen shows results.
#[must_use]
pub fn browse<'a>(properties: &'a [Property], filter: &ListingFilter, order: SortOrder) -> Vec<&'a Property> {
    let mut shown = filter.apply(properties);
    order.sort(&mut shown);
    shown
}
