//! Core recipe types and the host driver.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod identity;
pub mod layout;
pub mod lock;
pub mod output;
pub mod recipe;
pub mod settings;
