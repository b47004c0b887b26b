//! API exposure modules
//!
//! Each exposure consumes the registered entity kinds and produces a Router
//! for its protocol.

pub mod rest;

pub use rest::RestExposure;
