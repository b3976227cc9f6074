//! # irhub-app
//!
//! Application layer: use-cases, in-process infrastructure and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HubConnection`: one line-oriented session with the hub
//!   - `ConnectionFactory`: builds hub sessions for the pool
//!   - `Dispatcher`: one-shot HTTP calls to the dispatch service
//! - Provide the **connection pool** that bounds concurrent hub sessions
//! - Provide **devices and ports**: per-port serialization, translation,
//!   transport choice, retry and response checks
//! - Provide the **device registry**, **remotes** and **health probing**
//!
//! ## Dependency rule
//! Depends on `irhub-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod pool;
pub mod ports;
pub mod retry;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
