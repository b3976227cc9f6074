//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod device;
pub mod device_registry;
pub mod health_probe;
pub mod health_service;
pub mod remote;
pub mod remote_service;
