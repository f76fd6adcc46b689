//! Platform project materializers

pub mod android;
pub mod apple;
pub mod windows;
