pub mod header;
pub mod next_prayer;
pub mod notices;
pub mod prayers;
pub mod ramadan;
pub mod statusbar;
