//! Postmark account API

pub mod client;
pub mod error;
pub mod servers;

pub use client::{Client, ClientConfig, DEFAULT_ENDPOINT};
pub use error::ApiError;
pub use servers::{CreateServerRequest, Server, ServersApi};
