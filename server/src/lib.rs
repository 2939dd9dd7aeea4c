//! `Streamroom` Server Library
//!
//! Room directory service and token endpoint for the video chat client.

pub mod api;
pub mod config;
pub mod directory;
pub mod token;
pub mod webhook;
