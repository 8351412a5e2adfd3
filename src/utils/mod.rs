// src/utils/mod.rs
//! Helper functions shared across the services.

pub mod canonical;
pub mod crypto;
pub mod text_match;
pub mod validation;
