//! Utility modules: timeout, text truncation.

pub mod text;
pub mod timeout;
