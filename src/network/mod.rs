//! HTTP networking module
//!
//! Provides the transport abstraction engines' requests are sent through.

mod client;

pub use client::{HttpClient, Transport, TransportError};
