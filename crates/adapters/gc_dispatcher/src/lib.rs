//! # irhub-adapter-gc-dispatcher
//!
//! HTTP adapter for the dispatch service that fronts Global Caché blasters
//! (GC-100, iTach).
//!
//! ## Responsibilities
//! - `POST {api_base}/press_key?{query}` for each translated key press,
//!   handing the raw body back for the caller's `success` check
//! - `GET {api_base}/health`, decoded into
//!   [`DispatcherHealth`](irhub_domain::health::DispatcherHealth)
//!
//! One request per call; no pooling, no retry.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `irhub-app` and `irhub-domain`.

mod client;
mod config;
mod error;

pub use client::GcDispatcher;
pub use config::DispatcherConfig;
pub use error::DispatcherError;
