//! Token route handlers

pub mod me;
pub mod refresh;
