//! Centralized Error Handling Module
//!
//! Every failure in the desk carries a unique code so operator-facing notices
//! and logs can be correlated.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VALIDATION_xxx: missing required input, rejected before any request
//! - WALLET_xxx / WIZARD_xxx: wrong-state transitions and missing resources
//! - NETWORK_xxx / API_xxx: transport failures and non-2xx responses
//! - CFG_xxx: configuration errors at startup

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Message shown to the operator at the action boundary.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation
            | ErrorKind::NotFound
            | ErrorKind::Conflict
            | ErrorKind::Config => self.message.clone(),
            ErrorKind::Network => format!("{}. Please try again.", self.message),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Coarse error taxonomy used to decide how a failure is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing required field, caught before any network call
    Validation,
    /// Wallet or resource absent
    NotFound,
    /// Action attempted from the wrong state
    Conflict,
    /// Transport failure or unexpected server response
    Network,
    /// Startup configuration problem
    Config,
}

impl ErrorKind {
    /// Whether the operator can simply retry the same action
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors
    // ============================================
    /// Freeze/unfreeze reason is blank
    ValidationBlankReason,
    /// Wallet identifier is blank
    ValidationBlankWallet,
    /// No police station selected
    ValidationNoStation,
    /// Incident description is blank
    ValidationBlankDescription,
    /// Action needs a wallet or dialog that is not open
    ValidationNoSelection,

    // ============================================
    // Not Found Errors
    // ============================================
    /// Wallet does not resolve
    WalletNotFound,
    /// Other resource does not resolve (station, case)
    ResourceNotFound,

    // ============================================
    // Conflict Errors
    // ============================================
    /// Freeze requested on a frozen wallet
    WalletAlreadyFrozen,
    /// Unfreeze requested on an active wallet
    WalletNotFrozen,
    /// Wizard operation not valid in the current step
    WizardWrongStep,
    /// Evidence already attached to the case
    EvidenceSealed,
    /// The same section already has a request in flight
    ActionInFlight,

    // ============================================
    // Network Errors
    // ============================================
    /// Could not connect to the API
    NetworkConnectionFailed,
    /// Request timed out
    NetworkTimeout,
    /// Server rejected the request (4xx not otherwise classified)
    ApiRejected,
    /// Server failed (5xx)
    ApiServerError,
    /// Response body could not be decoded
    ApiInvalidResponse,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationBlankReason => "VALIDATION_BLANK_REASON",
            Self::ValidationBlankWallet => "VALIDATION_BLANK_WALLET",
            Self::ValidationNoStation => "VALIDATION_NO_STATION",
            Self::ValidationBlankDescription => "VALIDATION_BLANK_DESCRIPTION",
            Self::ValidationNoSelection => "VALIDATION_NO_SELECTION",

            Self::WalletNotFound => "WALLET_NOT_FOUND",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",

            Self::WalletAlreadyFrozen => "WALLET_ALREADY_FROZEN",
            Self::WalletNotFrozen => "WALLET_NOT_FROZEN",
            Self::WizardWrongStep => "WIZARD_WRONG_STEP",
            Self::EvidenceSealed => "EVIDENCE_SEALED",
            Self::ActionInFlight => "ACTION_IN_FLIGHT",

            Self::NetworkConnectionFailed => "NETWORK_CONNECTION_FAILED",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::ApiRejected => "API_REJECTED",
            Self::ApiServerError => "API_SERVER_ERROR",
            Self::ApiInvalidResponse => "API_INVALID_RESPONSE",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Map the code onto the surfacing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationBlankReason
            | Self::ValidationBlankWallet
            | Self::ValidationNoStation
            | Self::ValidationBlankDescription
            | Self::ValidationNoSelection => ErrorKind::Validation,

            Self::WalletNotFound | Self::ResourceNotFound => ErrorKind::NotFound,

            Self::WalletAlreadyFrozen
            | Self::WalletNotFrozen
            | Self::WizardWrongStep
            | Self::EvidenceSealed
            | Self::ActionInFlight => ErrorKind::Conflict,

            Self::NetworkConnectionFailed
            | Self::NetworkTimeout
            | Self::ApiRejected
            | Self::ApiServerError
            | Self::ApiInvalidResponse => ErrorKind::Network,

            Self::ConfigInvalidValue => ErrorKind::Config,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Blank freeze/unfreeze reason
    pub fn blank_reason() -> Self {
        Self::new(ErrorCode::ValidationBlankReason, "A reason is required")
    }

    /// Blank wallet identifier
    pub fn blank_wallet() -> Self {
        Self::new(ErrorCode::ValidationBlankWallet, "Please enter a wallet address")
    }

    /// Wallet not found
    pub fn wallet_not_found(address: &str) -> Self {
        Self::new(
            ErrorCode::WalletNotFound,
            format!("Wallet {} not found", address),
        )
    }

    /// Freeze on a frozen wallet
    pub fn already_frozen(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WalletAlreadyFrozen, msg)
    }

    /// Unfreeze on an active wallet
    pub fn not_frozen(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WalletNotFrozen, msg)
    }

    /// Wizard step violation
    pub fn wrong_step(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WizardWrongStep, msg)
    }

    /// Section busy
    pub fn in_flight(section: &str) -> Self {
        Self::new(
            ErrorCode::ActionInFlight,
            format!("{} is already in progress", section),
        )
    }

    /// Invalid config value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::ApiInvalidResponse, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::with_source(ErrorCode::NetworkTimeout, "Request timed out", err)
        } else if err.is_connect() {
            Self::with_source(
                ErrorCode::NetworkConnectionFailed,
                "Could not reach the investigation API",
                err,
            )
        } else if err.is_decode() {
            Self::with_source(ErrorCode::ApiInvalidResponse, "Malformed API response", err)
        } else {
            let message = format!("Request failed: {}", err);
            Self::with_source(ErrorCode::NetworkConnectionFailed, message, err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ApiInvalidResponse, "JSON parse error", err)
    }
}
