// src/models/mod.rs
//! Data structures.

pub mod claim;
pub mod credential;
pub mod verification;
pub mod webhook;
