//! Form schemas checked before anything is submitted to the API.
//!
//! DESIGN
//! ======
//! Each form type implements [`Validate`]. Checks collect every failing field
//! in declaration order instead of stopping at the first, so a front-end can
//! mark all problems at once. The shared field rules live here; the form
//! types live next to the flow that submits them.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod auth;
pub mod profile;
pub mod property;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub use auth::{ForgotPasswordForm, LoginForm, OtpForm, ResetPasswordForm, SignupForm};
pub use profile::ProfileForm;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 64;
pub const NAME_MAX_LEN: usize = 50;
pub const OTP_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// One failing field and the message to show next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every failing field of a form, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message reported for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.message_for(field).is_some()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A form that can be checked before submission.
pub trait Validate {
    /// # Errors
    ///
    /// Returns every failing field when the form is not submittable.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field failures while a form is checked.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub(crate) fn check(&mut self, field: &'static str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.errors.push(FieldError { field, message });
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ValidationErrors { errors: std::mem::take(&mut self.errors) })
    }
}

fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{label} is required"));
    }
    Ok(())
}

fn digits_only(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Email must look like `local@domain.tld`.
pub fn check_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    required(email, "Email")?;
    if !EMAIL_RE.is_match(email) {
        return Err("Enter a valid email address".to_owned());
    }
    Ok(())
}

/// Password complexity for new passwords (signup and reset).
pub fn check_password(password: &str) -> Result<(), String> {
    required(password, "Password")?;
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(format!("Password must be at least {PASSWORD_MIN_LEN} characters"));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(format!("Password must be at most {PASSWORD_MAX_LEN} characters"));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err("Password must contain at least one uppercase letter".to_owned());
    }
    if !password.chars().any(char::is_lowercase) {
        return Err("Password must contain at least one lowercase letter".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_owned());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        return Err("Password must contain at least one special character".to_owned());
    }
    Ok(())
}

pub fn check_password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    required(confirmation, "Confirm password")?;
    if password != confirmation {
        return Err("Passwords must match".to_owned());
    }
    Ok(())
}

pub fn check_name(value: &str, label: &str) -> Result<(), String> {
    let value = value.trim();
    required(value, label)?;
    if value.chars().count() > NAME_MAX_LEN {
        return Err(format!("{label} must be at most {NAME_MAX_LEN} characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-')
    {
        return Err(format!("{label} can only contain letters"));
    }
    Ok(())
}

/// OTP codes are exactly six digits.
pub fn check_otp(otp: &str) -> Result<(), String> {
    let otp = otp.trim();
    required(otp, "OTP")?;
    if otp.len() != OTP_LEN || !digits_only(otp) {
        return Err(format!("OTP must be {OTP_LEN} digits"));
    }
    Ok(())
}

/// Indian mobile numbers: ten digits starting with 6-9.
pub fn check_phone(phone: &str) -> Result<(), String> {
    let phone = phone.trim();
    if phone.len() != 10 || !digits_only(phone) {
        return Err("Phone number must be 10 digits".to_owned());
    }
    if !matches!(phone.as_bytes()[0], b'6'..=b'9') {
        return Err("Enter a valid mobile number".to_owned());
    }
    Ok(())
}

/// Aadhar numbers: twelve digits, never starting with 0 or 1.
pub fn check_aadhar(aadhar: &str) -> Result<(), String> {
    let aadhar = aadhar.trim();
    if aadhar.len() != 12 || !digits_only(aadhar) {
        return Err("Aadhar number must be 12 digits".to_owned());
    }
    if matches!(aadhar.as_bytes()[0], b'0' | b'1') {
        return Err("Enter a valid Aadhar number".to_owned());
    }
    Ok(())
}

/// Pincodes: six digits, never starting with 0.
pub fn check_pincode(pincode: &str) -> Result<(), String> {
    let pincode = pincode.trim();
    required(pincode, "Pincode")?;
    if pincode.len() != 6 || !digits_only(pincode) {
        return Err("Pincode must be 6 digits".to_owned());
    }
    if pincode.starts_with('0') {
        return Err("Enter a valid pincode".to_owned());
    }
    Ok(())
}

/// Apply `check` only when an optional field has a non-blank value.
pub(crate) fn optional<F>(value: Option<&str>, check: F) -> Result<(), String>
where
    F: Fn(&str) -> Result<(), String>,
{
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => check(v),
        _ => Ok(()),
    }
}

pub(crate) fn check_required(value: &str, label: &str) -> Result<(), String> {
    required(value, label)
}
