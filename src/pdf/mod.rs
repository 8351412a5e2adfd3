// src/pdf/mod.rs
//! Certificate document pipeline: render, sign, extract.

pub mod extract;
pub mod metadata;
pub mod render;
