//! CLI command implementations.
//!
//! Each command returns the text to print so the rendering can be tested
//! without capturing stdout.

pub mod cart;
pub mod catalog;
pub mod contact;
