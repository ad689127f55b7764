//! HTTP surface for the characterization pipeline.

pub mod http;
pub mod schema;

pub use http::{run, serve, HttpServerConfig};
