//! # irhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON API: remote actions per device/port or per slot, the
//!   device inventory, aggregated health and pool restart
//! - Map request bodies onto [`Remote`](irhub_app::services::remote::Remote)
//!   calls (driving adapter)
//! - Map [`IrHubError`](irhub_domain::error::IrHubError) kinds onto status codes
//!
//! ## Dependency rule
//! Depends on `irhub-app` (for port traits and services) and `irhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
