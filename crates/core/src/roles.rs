//! Well-known account role constants.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TECHNICIAN: &str = "technician";

/// Role assigned when an account is created without one.
pub const DEFAULT_ROLE: &str = ROLE_TECHNICIAN;
