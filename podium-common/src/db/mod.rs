//! Database bootstrap and settings access

pub mod init;
pub mod seed;
pub mod settings;

pub use init::*;
pub use settings::{get_setting, get_setting_or, set_setting};
