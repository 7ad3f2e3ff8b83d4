//! Core infrastructure for the maildrip platform.
//!
//! This crate provides:
//! - App state and builder shared by all feature crates
//! - Bearer-token route auth middleware
//! - Secret encryption for credentials at rest
//! - In-memory dispatch job registry

#![forbid(unsafe_code)]

pub mod app;
pub mod crypto;
pub mod jobs;
pub mod prelude;
pub mod route_auth;

pub use app::{App, AppBuilder, AppBuilderOpts, AppState};

// vim: ts=4
