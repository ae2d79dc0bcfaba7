pub mod aladhan;

pub use aladhan::AladhanClient;

/// Sent with every HTTP request.
pub const USER_AGENT: &str = concat!("kiuma/", env!("CARGO_PKG_VERSION"));
