// src/auth/mod.rs
//! Bearer-token authentication.

pub mod session_token;
