//! Profile edit form.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use serde::{Deserialize, Serialize};

use super::{Checker, Validate, ValidationErrors, check_aadhar, check_name, check_phone, check_pincode, optional};
use crate::net::types::{Address, User};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(default)]
    pub address: Address,
}

impl ProfileForm {
    /// Prefill the form from the signed-in user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            aadhar: user.aadhar.clone(),
            address: user.address.clone().unwrap_or_default(),
        }
    }
}

impl Validate for ProfileForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("firstName", check_name(&self.first_name, "First name"))
            .check("lastName", check_name(&self.last_name, "Last name"))
            .check("phone", optional(self.phone.as_deref(), check_phone))
            .check("aadhar", optional(self.aadhar.as_deref(), check_aadhar))
            .check("address.pincode", optional(self.address.pincode.as_deref(), check_pincode))
            .finish()
    }
}
