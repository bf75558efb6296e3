//! Common test utilities: fixture release archives and a mock upstream.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;
