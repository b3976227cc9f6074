//! # irhub-adapter-telnet
//!
//! Telnet adapter: plain TCP, line-oriented sessions with the IR hub.
//!
//! ## Responsibilities
//! - Implement [`HubConnection`](irhub_app::ports::HubConnection): write one
//!   command line, read reply lines until the framing rule completes
//! - Implement [`ConnectionFactory`](irhub_app::ports::ConnectionFactory) so
//!   the application's connection pool can build and rebuild sessions
//! - Bound connect and per-line read time
//!
//! ## Dependency rule
//! Same as other adapters: depends on `irhub-app` and `irhub-domain`.

mod config;
mod connector;
mod error;
mod transport;

pub use config::TelnetConfig;
pub use connector::TelnetConnector;
pub use error::TelnetError;
pub use transport::TelnetTransport;
