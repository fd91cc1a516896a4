//! Request/response core for the Developool API.
//!
//! # Overview
//! Turns domain operations (authenticate, register, project and profile
//! CRUD) into `HttpRequest` values and turns `HttpResponse` values back into
//! results, without touching the network. The middleware crate executes the
//! round-trip; tests can execute it against anything.
//!
//! # Design
//! - `DevelopoolClient` is stateless; it holds only `base_url`.
//! - `endpoints` and `status` are `const` tables, shared read-only by every
//!   call.
//! - One generic `interpret_response` replaces per-operation parsing: each
//!   operation differs only in the status table it supplies.
//! - Response bodies are handed back verbatim; `Payload::parse` is there for
//!   callers that want typed models.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod status;
pub mod types;

pub use client::{interpret_response, ApiResult, DevelopoolClient, Payload, PreparedCall};
pub use endpoints::{Endpoint, Operation, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use status::{StatusMapping, StatusTable};
pub use types::{Education, PastExperience, Profile, Project, ProjectFilter};
