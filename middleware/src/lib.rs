//! Developool middleware: the asynchronous, callback-based API the mobile
//! application links against.
//!
//! # Architecture
//!
//! ```text
//!   app ──► Middleware::op(args, callback)
//!              │  (returns immediately)
//!              ▼
//!          blocking pool ──► DevelopoolClient::build_* ──► Transport::send
//!              │                                               │
//!              ◄────────── PreparedCall::interpret ◄───────────┘
//!              ▼
//!          callback(ApiResult)   (exactly once, on a worker thread)
//! ```
//!
//! Request construction and response classification live in
//! `developool-core` and do no I/O. This crate adds the HTTP transport,
//! configuration and the dispatch layer.

pub mod config;
pub mod error;
pub mod executor;
pub mod middleware;

pub use config::MiddlewareConfig;
pub use error::MiddlewareError;
pub use executor::{execute, Transport, TransportError, UreqTransport};
pub use middleware::Middleware;

pub use developool_core::{
    ApiError, ApiResult, Education, ErrorKind, PastExperience, Payload, Profile, Project,
    ProjectFilter,
};
