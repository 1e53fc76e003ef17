//! Auth endpoints: signup, OTP verification, signin, password reset, profile.
//!
//! Every form is validated before it leaves the client; a failing form never
//! produces a request.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use super::api::{ApiClient, ApiError};
use super::types::{Address, AuthResponse, ImageUpload, MessageResponse, SignupResponse, User, UserResponse};
use crate::validation::{
    Checker, ForgotPasswordForm, LoginForm, OtpForm, ProfileForm, ResetPasswordForm, SignupForm, Validate,
    check_email,
};

pub const PROFILE_IMAGE_FIELD: &str = "profileImage";

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Register a new account. The server mails an OTP; no session yet.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse, ApiError> {
        let form = form.trimmed();
        form.validate()?;
        self.api
            .send_json(Method::POST, "/auth/signup", None, &form)
            .await
    }

    /// Confirm the signup email with its OTP; the response starts a session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn verify_otp(&self, form: &OtpForm) -> Result<AuthResponse, ApiError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim(), "otp": form.otp.trim() });
        self.api
            .send_json(Method::POST, "/auth/verify", None, &body)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a malformed email, otherwise transport or status errors.
    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        Checker::default()
            .check("email", check_email(email))
            .finish()?;
        let body = json!({ "email": email.trim() });
        self.api
            .send_json(Method::POST, "/auth/resend-otp", None, &body)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn signin(&self, form: &LoginForm) -> Result<AuthResponse, ApiError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim(), "password": form.password });
        self.api
            .send_json(Method::POST, "/auth/signin", None, &body)
            .await
    }

    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors; an expired token is a 401 status.
    pub async fn user_details(&self, token: &str) -> Result<User, ApiError> {
        let response: UserResponse = self.api.get("/auth/user-details", Some(token)).await?;
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<MessageResponse, ApiError> {
        form.validate()?;
        let body = json!({ "email": form.email.trim() });
        self.api
            .send_json(Method::POST, "/auth/forgot-password", None, &body)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<MessageResponse, ApiError> {
        form.validate()?;
        self.api
            .send_json(Method::POST, "/auth/reset-password", None, form)
            .await
    }

    /// Update profile fields, optionally replacing the profile image.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a failing form, otherwise transport or status errors.
    pub async fn update_profile(
        &self,
        token: &str,
        form: &ProfileForm,
        image: Option<ImageUpload>,
    ) -> Result<UserResponse, ApiError> {
        form.validate()?;
        let mut multipart = Form::new();
        for (name, value) in profile_text_fields(form)? {
            multipart = multipart.text(name, value);
        }
        if let Some(image) = image {
            multipart = multipart.part(PROFILE_IMAGE_FIELD, image_part(image)?);
        }
        self.api
            .send_multipart(Method::PUT, "/auth/update", Some(token), multipart)
            .await
    }
}

/// Text parts of the profile multipart body. Blank optional fields are left out.
pub(crate) fn profile_text_fields(form: &ProfileForm) -> Result<Vec<(&'static str, String)>, ApiError> {
    let mut fields = vec![
        ("firstName", form.first_name.trim().to_owned()),
        ("lastName", form.last_name.trim().to_owned()),
    ];
    let optional = [("phone", form.phone.as_deref()), ("aadhar", form.aadhar.as_deref())];
    for (name, value) in optional {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            fields.push((name, value.to_owned()));
        }
    }
    if form.address != Address::default() {
        fields.push(("address", serde_json::to_string(&form.address)?));
    }
    Ok(fields)
}

pub(crate) fn image_part(image: ImageUpload) -> Result<Part, ApiError> {
    Ok(Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.mime_type)?)
}
