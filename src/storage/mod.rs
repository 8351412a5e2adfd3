// src/storage/mod.rs
//! Artifact storage.

pub mod object_store;
