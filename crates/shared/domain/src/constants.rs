//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Platform-wide role that bypasses ownership checks
pub const ROLE_SUPER_ADMIN: &str = "super admin";

// =============================================================================
// Store Membership
// =============================================================================

/// Team member role that may manage store resources
pub const STORE_ROLE_ADMIN: &str = "admin";

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

// =============================================================================
// Shortcodes
// =============================================================================

/// Hours a shortcode stays valid when no expiry is supplied
pub const DEFAULT_SHORTCODE_TTL_HOURS: i64 = 24;

/// Number of digits a freshly generated shortcode starts with
pub const DEFAULT_SHORTCODE_LENGTH: usize = 4;

/// Attempts at a given length before the generator grows the code
pub const SHORTCODE_ATTEMPTS_PER_LENGTH: usize = 10;

// =============================================================================
// Store Quotas
// =============================================================================

/// SMS credits granted to a store when its quota row is first created
pub const DEFAULT_STORE_SMS_CREDITS: i32 = 0;

/// Email credits granted to a store when its quota row is first created
pub const DEFAULT_STORE_EMAIL_CREDITS: i32 = 0;

// =============================================================================
// Notifications
// =============================================================================

/// Notification type emitted after a subscription is created
pub const NOTIFICATION_SUBSCRIPTION_CREATED: &str = "subscription created";

// =============================================================================
// Reviews
// =============================================================================

/// Review subjects a customer may rate a store on
pub const REVIEW_SUBJECTS: &[&str] = &["product", "customer service", "delivery", "payment"];

/// Highest star rating accepted on a review
pub const MAX_REVIEW_RATING: i16 = 5;

/// Lowest star rating accepted on a review
pub const MIN_REVIEW_RATING: i16 = 1;
