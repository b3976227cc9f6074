//! # irhub-domain
//!
//! Pure domain model for the irhub infrared remote-control service.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, error conventions, timestamps
//! - Define **hardware kinds** (the six supported IR blaster families and their port counts)
//! - Define **commands** (key press, press-and-hold, delay, named group) and their traversal
//! - Define **wire translators** that format a single command for a hardware family
//! - Define **hub queries** and the line-framing rules used to read hub responses
//! - Define **health records** and the parsers for the hub's free-text status output
//! - Define the **device inventory** (configured blocks, slot resolution)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod device;
pub mod framing;
pub mod hardware;
pub mod health;
pub mod hub_query;
pub mod inventory;
pub mod keypad;
pub mod wire;
