//! API properties

/// Version of the card API implemented by this crate, formatted as `major.minor`
pub const VERSION: &str = "2.0";

/// Version of the card API implemented by this crate
pub const fn api_version() -> &'static str {
    VERSION
}
