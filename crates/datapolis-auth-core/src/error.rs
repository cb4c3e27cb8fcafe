//! Auth errors

use thiserror::Error;

/// Authentication and authorization errors
///
/// A closed set of kinds; the request layer maps each one to a transport
/// status via [`AuthError::status_code`] and [`AuthError::error_code`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Signature valid but the token is past its expiry
    #[error("token expired")]
    TokenExpired,

    /// Malformed, forged, or otherwise unverifiable token
    #[error("invalid token")]
    InvalidToken,

    /// Username or email already taken
    #[error("user with this username or email already exists")]
    UserExists,

    /// Referenced identity is absent
    #[error("user not found")]
    UserNotFound,

    /// Actor lacks rights for the requested mutation
    #[error("no permission")]
    NoPermission,

    /// A user tried to deactivate their own account
    #[error("cannot deactivate your own account")]
    CannotDeactivateSelf,

    /// Password does not satisfy the policy
    #[error("password must be at least {min} characters", min = crate::password::MIN_PASSWORD_LENGTH)]
    WeakPassword,

    /// Profile field rejected (blank username, malformed email)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::TokenExpired | Self::InvalidToken => 401,
            Self::NoPermission => 403,
            Self::UserNotFound => 404,
            Self::UserExists => 409,
            Self::CannotDeactivateSelf | Self::WeakPassword | Self::InvalidInput(_) => 400,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::UserExists => "USER_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NoPermission => "NO_PERMISSION",
            Self::CannotDeactivateSelf => "CANNOT_DEACTIVATE_SELF",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the detail of this error must stay server-side
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_)
        )
    }
}

impl From<datapolis_db::DbError> for AuthError {
    fn from(err: datapolis_db::DbError) -> Self {
        match err {
            datapolis_db::DbError::Conflict(constraint) => {
                tracing::debug!(%constraint, "Unique constraint rejected write");
                Self::UserExists
            }
            datapolis_db::DbError::NotFound => Self::UserNotFound,
            other @ datapolis_db::DbError::Sqlx(_) => {
                tracing::error!("Database error: {}", other);
                Self::Database(other.to_string())
            }
        }
    }
}
