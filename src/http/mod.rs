//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per connection, no
//! keep-alive, no chunked bodies, `Connection: close` on every response.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Header terminator scan, request line, header fields, form bodies
//! - **`request`**: HTTP request representation
//! - **`response`**: Status table and response construction
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌────────────────┐
//!        │ AwaitingHeader │ ← read until \r\n\r\n
//!        └──────┬─────────┘
//!               │ read error ───────────────┐
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │ HeaderComplete │ ─ INVALID ──────┤
//!        └──────┬─────────┘                 │
//!               │ Content-Length > 0        │
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │  BodyPending   │ ─ read error ───┤
//!        └──────┬─────────┘                 │
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │  BodyComplete  │                 │
//!        └──────┬─────────┘                 │
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │     Routed     │                 │
//!        └──────┬─────────┘                 │
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │  ResponseSent  │                 │
//!        └──────┬─────────┘                 │
//!               ▼                           │
//!        ┌────────────────┐                 │
//!        │     Closed     │ ◄───────────────┘
//!        └────────────────┘
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
