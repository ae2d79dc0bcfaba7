pub mod settings;

pub use settings::{AppConfig, Contact, LocationConfig, TimeSource};
