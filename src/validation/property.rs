//! Listing form checks.

#[cfg(test)]
#[path = "property_test.rs"]
mod tests;

use super::{Checker, Validate, ValidationErrors, check_pincode, check_required};
use crate::net::types::PropertyDraft;

pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MIN_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 2000;
pub const MAX_IMAGES: usize = 10;

fn check_len(value: &str, label: &str, min: usize, max: usize) -> Result<(), String> {
    check_required(value, label)?;
    let len = value.trim().chars().count();
    if len < min {
        return Err(format!("{label} must be at least {min} characters"));
    }
    if len > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(())
}

fn check_range(value: Option<f64>, label: &str, limit: f64) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > limit => Err(format!("{label} must be between -{limit} and {limit}")),
        _ => Ok(()),
    }
}

/// Uploads are capped per request.
pub fn check_image_count(count: usize) -> Result<(), String> {
    if count > MAX_IMAGES {
        return Err(format!("At most {MAX_IMAGES} images can be uploaded"));
    }
    Ok(())
}

impl Validate for PropertyDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let details = &self.details;
        let location = &self.location;

        let bedrooms = if details.bedrooms == 0 && !self.property_type.allows_zero_bedrooms() {
            Err("At least one bedroom is required".to_owned())
        } else {
            Ok(())
        };
        let bathrooms = if details.bathrooms == 0 {
            Err("At least one bathroom is required".to_owned())
        } else {
            Ok(())
        };
        let area = if details.area_sqft == 0 {
            Err("Area must be greater than 0".to_owned())
        } else {
            Ok(())
        };
        let floor = match (details.floor, details.total_floors) {
            (Some(floor), Some(total)) if floor > total => Err("Floor cannot exceed total floors".to_owned()),
            _ => Ok(()),
        };
        let rent = if self.price.rent == 0 {
            Err("Rent must be greater than 0".to_owned())
        } else {
            Ok(())
        };
        let maintenance = if !self.maintenance.included && self.maintenance.amount.is_none() {
            Err("Maintenance amount is required when not included in rent".to_owned())
        } else {
            Ok(())
        };
        let tenants = if self.tenant_preferences.is_empty() {
            Err("Select at least one tenant preference".to_owned())
        } else {
            Ok(())
        };

        Checker::default()
            .check("title", check_len(&self.title, "Title", TITLE_MIN_LEN, TITLE_MAX_LEN))
            .check(
                "description",
                check_len(&self.description, "Description", DESCRIPTION_MIN_LEN, DESCRIPTION_MAX_LEN),
            )
            .check("price.rent", rent)
            .check("location.address", check_required(&location.address, "Address"))
            .check("location.city", check_required(&location.city, "City"))
            .check("location.state", check_required(&location.state, "State"))
            .check("location.pincode", check_pincode(&location.pincode))
            .check("location.latitude", check_range(location.latitude, "Latitude", 90.0))
            .check("location.longitude", check_range(location.longitude, "Longitude", 180.0))
            .check("details.bedrooms", bedrooms)
            .check("details.bathrooms", bathrooms)
            .check("details.areaSqft", area)
            .check("details.floor", floor)
            .check("maintenance.amount", maintenance)
            .check("tenantPreferences", tenants)
            .finish()
    }
}
