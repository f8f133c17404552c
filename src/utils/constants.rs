//! Shared constants: environment variable names, defaults and endpoint paths.
//!
//! Nothing else in the crate hardcodes a URL fragment or an env var name.

// ============================================
// ENVIRONMENT
// ============================================

/// Base URL of the investigation API
pub const ENV_API_URL: &str = "ESCALATION_API_URL";

/// Per-request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "ESCALATION_TIMEOUT_SECS";

/// Poll interval for list views in seconds
pub const ENV_POLL_SECS: &str = "ESCALATION_POLL_SECS";

/// Identity recorded as frozen_by / unfrozen_by / sent_by
pub const ENV_ACTOR: &str = "ESCALATION_ACTOR";

// ============================================
// DEFAULTS
// ============================================

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_SECS: u64 = 30;
pub const DEFAULT_ACTOR: &str = "admin@cybercrime.gov";

pub const USER_AGENT: &str = concat!("escalation-desk/", env!("CARGO_PKG_VERSION"));

/// Dispatched reports kept in the session log
pub const REPORT_LOG_CAPACITY: usize = 20;

// ============================================
// ENDPOINTS (path segments below the base URL)
// ============================================

pub const SEGMENT_WALLETS: &str = "wallets";
pub const PATH_WALLET_SEARCH: [&str; 2] = [SEGMENT_WALLETS, "search"];
pub const PATH_FROZEN_LIST: [&str; 3] = [SEGMENT_WALLETS, "frozen", "list"];
pub const PATH_UNFROZEN_LIST: [&str; 3] = [SEGMENT_WALLETS, "unfrozen", "list"];
pub const SEGMENT_FREEZE: &str = "freeze";
pub const SEGMENT_UNFREEZE: &str = "unfreeze";
