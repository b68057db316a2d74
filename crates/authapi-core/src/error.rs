//! Unified application error types for AuthAPI.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The named kinds at the top of
//! [`ErrorKind`] are the precondition failures the API reports to callers;
//! the remaining kinds classify collaborator failures that are passed
//! through verbatim.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// An account with the requested login already exists.
    ExistingLogin,
    /// No account exists for the requested login.
    UnexistingLogin,
    /// The supplied password does not match the stored hash.
    IncorrectPassword,
    /// The request carried no bearer token.
    TokenNotProvided,
    /// The bearer token could not be parsed or its signature is wrong.
    InvalidToken,
    /// The bearer token is past its expiry.
    ExpiredToken,
    /// The token holder may not act on the requested account.
    NoPermission,
    /// The uploaded content type is not on the allow-list.
    TypeNotAllowed,
    /// An object (or destination file) with that name already exists.
    ExistingFile,
    /// The requested object does not exist.
    UnexistingFile,
    /// A generic lookup miss from a collaborator.
    NotFound,
    /// A uniqueness conflict reported by a collaborator's write layer.
    Conflict,
    /// Input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The caller cancelled the request.
    Cancelled,
    /// The request deadline elapsed.
    Timeout,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is one of the named precondition failures reported
    /// to API callers (as opposed to a collaborator failure).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ExistingLogin
                | Self::UnexistingLogin
                | Self::IncorrectPassword
                | Self::TokenNotProvided
                | Self::InvalidToken
                | Self::ExpiredToken
                | Self::NoPermission
                | Self::TypeNotAllowed
                | Self::ExistingFile
                | Self::UnexistingFile
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExistingLogin => write!(f, "EXISTING_LOGIN"),
            Self::UnexistingLogin => write!(f, "UNEXISTING_LOGIN"),
            Self::IncorrectPassword => write!(f, "INCORRECT_PASSWORD"),
            Self::TokenNotProvided => write!(f, "TOKEN_NOT_PROVIDED"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::ExpiredToken => write!(f, "EXPIRED_TOKEN"),
            Self::NoPermission => write!(f, "NO_PERMISSION"),
            Self::TypeNotAllowed => write!(f, "TYPE_NOT_ALLOWED"),
            Self::ExistingFile => write!(f, "EXISTING_FILE"),
            Self::UnexistingFile => write!(f, "UNEXISTING_FILE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout AuthAPI.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if the error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Prefix the message with extra context, keeping kind and source.
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    pub fn existing_login() -> Self {
        Self::new(ErrorKind::ExistingLogin, "user with such login already exists")
    }

    pub fn unexisting_login() -> Self {
        Self::new(ErrorKind::UnexistingLogin, "user with such login does not exist")
    }

    pub fn incorrect_password() -> Self {
        Self::new(ErrorKind::IncorrectPassword, "incorrect password")
    }

    pub fn token_not_provided() -> Self {
        Self::new(ErrorKind::TokenNotProvided, "token was not provided")
    }

    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken, "token is invalid")
    }

    pub fn expired_token() -> Self {
        Self::new(ErrorKind::ExpiredToken, "token is expired")
    }

    pub fn no_permission() -> Self {
        Self::new(ErrorKind::NoPermission, "no permission for such request")
    }

    pub fn type_not_allowed() -> Self {
        Self::new(ErrorKind::TypeNotAllowed, "such file type is not allowed")
    }

    pub fn existing_file() -> Self {
        Self::new(ErrorKind::ExistingFile, "such file already exists")
    }

    pub fn unexisting_file() -> Self {
        Self::new(ErrorKind::UnexistingFile, "such file does not exist")
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
