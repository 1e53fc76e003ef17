//! Forms for the signup, OTP, login, and password-reset flows.
//!
//! The forms double as request bodies: fields that only exist for the
//! client-side check (password confirmation) are never serialized.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use serde::Serialize;

use super::{
    Checker, Validate, ValidationErrors, check_email, check_name, check_otp, check_password,
    check_password_confirmation, check_required,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl Validate for SignupForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("firstName", check_name(&self.first_name, "First name"))
            .check("lastName", check_name(&self.last_name, "Last name"))
            .check("email", check_email(&self.email))
            .check("password", check_password(&self.password))
            .check(
                "confirmPassword",
                check_password_confirmation(&self.password, &self.confirm_password),
            )
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("email", check_email(&self.email))
            .check("password", check_required(&self.password, "Password"))
            .finish()
    }
}

/// Email verification code entered after signup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OtpForm {
    pub email: String,
    pub otp: String,
}

impl Validate for OtpForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("email", check_email(&self.email))
            .check("otp", check_otp(&self.otp))
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("email", check_email(&self.email))
            .finish()
    }
}

/// New password plus the OTP mailed by the forgot-password step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Checker::default()
            .check("email", check_email(&self.email))
            .check("otp", check_otp(&self.otp))
            .check("newPassword", check_password(&self.password))
            .check(
                "confirmPassword",
                check_password_confirmation(&self.password, &self.confirm_password),
            )
            .finish()
    }
}

impl SignupForm {
    /// Copy with surrounding whitespace removed from names and email.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_ascii_lowercase(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        }
    }
}
