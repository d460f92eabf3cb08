//! API layer - HTTP and SSE entry points.

pub mod http;
pub mod sse;
