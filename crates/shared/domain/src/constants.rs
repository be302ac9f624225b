//! Domain-level constants.
//!
//! These constants define query limits and authentication conventions.

// =============================================================================
// Resource
// =============================================================================

/// Primary identifier column shared by every resource
pub const PRIMARY_KEY_COLUMN: &str = "id";

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page; larger requests are rejected, not clamped
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Cursor value that denotes the first page
pub const FIRST_PAGE_CURSOR: u64 = 0;

// =============================================================================
// Query limits
// =============================================================================

/// Maximum number of conditions in a single query payload
pub const MAX_CONDITIONS: usize = 20;

/// Maximum number of values accepted by an `in` condition
pub const MAX_IN_VALUES: usize = 100;

/// Maximum number of identifiers in a bulk request
pub const MAX_IDS: usize = 100;

// =============================================================================
// Authentication
// =============================================================================

/// Sentinel value that disables a configured secret
pub const DISABLED_SECRET: &str = "change-me";

/// Default cookie carrying the signed session
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "_app_session";

/// Session key under which Warden stores the signed-in user
pub const WARDEN_USER_KEY: &str = "warden.user.user.key";
