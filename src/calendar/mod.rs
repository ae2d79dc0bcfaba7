pub mod hijri;
pub mod ramadan;

pub use hijri::{HijriDisplay, resolve_hijri};
pub use ramadan::{RamadanStart, RamadanStatus, ramadan_status, resolve_ramadan_start};
