//! Service layer module
//!
//! Contains the HTTP transport, error mapper, and client facade

pub mod client;
pub mod error_mapper;
pub mod transport;

pub use client::{Chat, Client, Completions, RequestOptions};
pub use transport::{HttpTransport, RawResponse, Transport, TransportRequest};
