pub mod admin;
pub mod forms;
pub mod media;
pub mod notifications;
