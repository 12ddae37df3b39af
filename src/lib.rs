//! pagehttpd - minimal HTTP/1.1 page server
//!
//! Core library: request parsing, routing, response emission and the accept loop.

pub mod config;
pub mod files;
pub mod http;
pub mod router;
pub mod server;
