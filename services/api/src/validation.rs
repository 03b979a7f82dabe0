//! Input validation utilities

use crate::{
    error::ApiError,
    models::{LoginRequest, RegisterRequest},
};

/// Collects required string fields, remembering every one that is absent
///
/// An empty string counts as missing.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the value of `name`, or record it as missing and yield an empty string
    pub fn take(&mut self, name: &'static str, value: Option<String>) -> String {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Fail with every missing field, in the order they were taken
    pub fn finish(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing_fields(self.missing))
        }
    }
}

/// Registration input with all required fields present
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

/// Validate a registration request
pub fn validate_registration(request: RegisterRequest) -> Result<Registration, ApiError> {
    let mut fields = RequiredFields::new();
    let username = fields.take("username", request.username);
    let password = fields.take("password", request.password);
    let confirm_password = fields.take("confirmPassword", request.confirm_password);
    let first_name = fields.take("firstName", request.first_name);
    let last_name = fields.take("lastName", request.last_name);
    let email = fields.take("email", request.email);
    let mobile = fields.take("mobile", request.mobile);
    fields.finish()?;

    if password != confirm_password {
        return Err(ApiError::validation(
            "Password and confirm password do not match.",
        ));
    }

    Ok(Registration {
        username,
        password,
        first_name,
        last_name,
        email,
        mobile,
    })
}

/// Validate a login request, returning `(username, password)`
pub fn validate_login(request: LoginRequest) -> Result<(String, String), ApiError> {
    let mut fields = RequiredFields::new();
    let username = fields.take("username", request.username);
    let password = fields.take("password", request.password);
    fields.finish()?;

    Ok((username, password))
}
