//! Utility modules shared by the lookup services

pub mod doh;
pub mod text;

pub use doh::{DohAnswer, DohClient, DohResponse};
pub use text::{escape_html, truncate_chars};
