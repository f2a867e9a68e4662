//! Inbound adapters translating browser requests into server actions while
//! keeping framework details at the edge.
//!
//! All traffic arrives over HTTP; see [`http`].

pub mod http;
