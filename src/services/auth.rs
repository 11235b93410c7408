//! Login, the admin-action gate, and the simulated sign-up form.
//!
//! DESIGN
//! ======
//! Two fixed accounts exist (`admin`, `student`) plus a separate admin-action
//! secret that unlocks editing regardless of who is logged in. All three
//! secrets come from configuration; an unset secret disables what it guards.
//! Only SHA-256 digests are kept in memory, and comparisons run on digests.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::env_secret;
use crate::error::ErrorCode;
use crate::services::session::Session;

type SecretDigest = [u8; 32];

fn digest(secret: &str) -> SecretDigest {
    Sha256::digest(secret.as_bytes()).into()
}

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    #[must_use]
    pub fn from_username(username: &str) -> Option<Self> {
        match username.trim() {
            "admin" => Some(Self::Admin),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("please enter both username and password")]
    MissingLoginFields,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("incorrect admin password")]
    InvalidAdminPassword,
    #[error("admin actions are not configured")]
    AdminActionDisabled,
    #[error("please fill in all registration fields")]
    MissingSignUpFields,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingLoginFields | Self::MissingSignUpFields => "E_MISSING_FIELDS",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::InvalidAdminPassword => "E_INVALID_ADMIN_PASSWORD",
            Self::AdminActionDisabled => "E_ADMIN_DISABLED",
            Self::InvalidEmail(_) => "E_INVALID_EMAIL",
        }
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

#[derive(Clone, Default)]
pub struct Credentials {
    admin: Option<SecretDigest>,
    student: Option<SecretDigest>,
    admin_action: Option<SecretDigest>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("admin", &self.admin.is_some())
            .field("student", &self.student.is_some())
            .field("admin_action", &self.admin_action.is_some())
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(admin: Option<&str>, student: Option<&str>, admin_action: Option<&str>) -> Self {
        Self { admin: admin.map(digest), student: student.map(digest), admin_action: admin_action.map(digest) }
    }

    /// Load from `ADMIN_PASSWORD`, `STUDENT_PASSWORD`, `ADMIN_ACTION_PASSWORD`.
    #[must_use]
    pub fn from_env() -> Self {
        let admin = env_secret("ADMIN_PASSWORD");
        let student = env_secret("STUDENT_PASSWORD");
        let admin_action = env_secret("ADMIN_ACTION_PASSWORD");
        Self::new(admin.as_deref(), student.as_deref(), admin_action.as_deref())
    }

    /// Warn about every secret that is unset and therefore disabled.
    pub fn log_disabled(&self) {
        if self.admin.is_none() {
            tracing::warn!("ADMIN_PASSWORD not set; admin login disabled");
        }
        if self.student.is_none() {
            tracing::warn!("STUDENT_PASSWORD not set; student login disabled");
        }
        if self.admin_action.is_none() {
            tracing::warn!("ADMIN_ACTION_PASSWORD not set; post editing disabled");
        }
    }

    /// Role for a matching username/password pair.
    #[must_use]
    pub fn verify_login(&self, username: &str, password: &str) -> Option<Role> {
        let role = Role::from_username(username)?;
        let expected = match role {
            Role::Admin => self.admin?,
            Role::Student => self.student?,
        };
        (digest(password) == expected).then_some(role)
    }

    /// Check the admin-action secret.
    ///
    /// # Errors
    ///
    /// `AdminActionDisabled` if no secret is configured, otherwise
    /// `InvalidAdminPassword` on mismatch.
    pub fn verify_admin_action(&self, password: &str) -> Result<(), AuthError> {
        let expected = self.admin_action.ok_or(AuthError::AdminActionDisabled)?;
        if digest(password) == expected { Ok(()) } else { Err(AuthError::InvalidAdminPassword) }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Log `session` in as the matching account. A failed attempt leaves the
/// session untouched.
///
/// # Errors
///
/// `MissingLoginFields` if either field is blank, `InvalidCredentials` if the
/// pair matches neither account.
pub fn login(credentials: &Credentials, session: &mut Session, username: &str, password: &str) -> Result<Role, AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingLoginFields);
    }
    let role = credentials
        .verify_login(username, password)
        .ok_or(AuthError::InvalidCredentials)?;
    session.log_in(role);
    Ok(role)
}

/// Unlock the edit/delete surface for `session`.
///
/// # Errors
///
/// See [`Credentials::verify_admin_action`].
pub fn unlock_admin(credentials: &Credentials, session: &mut Session, password: &str) -> Result<(), AuthError> {
    credentials.verify_admin_action(password)?;
    session.admin_unlocked = true;
    Ok(())
}

/// Acknowledgement for a sign-up request.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpAck {
    pub username: String,
    pub email: String,
    pub message: String,
}

/// Validate a sign-up form. No account is created: the two fixed accounts
/// are the only ones that can log in.
///
/// # Errors
///
/// `MissingSignUpFields` if any field is blank, `InvalidEmail` if the email
/// has no `@` with text on both sides.
pub fn sign_up(username: &str, email: &str, password: &str) -> Result<SignUpAck, AuthError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingSignUpFields);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(AuthError::InvalidEmail(email.to_owned())),
    }
    tracing::info!(username, "sign-up received (not persisted)");
    Ok(SignUpAck {
        username: username.to_owned(),
        email: email.to_owned(),
        message: format!("Account for {username} created! Check {email} for verification."),
    })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
