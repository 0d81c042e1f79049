//! Administrative client for the Ghost admin API.
//!
//! [`client::AdminClient`] signs a short-lived admin token from an `id:secret`
//! key and exposes member cleanup and post list/get/copy/update operations.

pub mod cleanup;
pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod token;

pub use client::AdminClient;
pub use error::AdminError;
