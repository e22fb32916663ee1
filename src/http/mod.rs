//! HTTP client module
//!
//! Thin wrapper over `reqwest` used by the weather source.
//!
//! A request is attempted exactly once: a transport failure, a timeout, or a
//! non-success status is returned to the caller as-is. There is no retry and no
//! rate limiting.

mod client;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
