//! # Service Layer
//!
//! The consumer-facing client: a registry of packet variants plus a
//! perpetually reconnecting connection that dispatches received frames.

pub mod client;

pub use client::Client;
