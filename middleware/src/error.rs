use thiserror::Error;

/// Failures constructing a `Middleware`. Per-call failures are never
/// returned; they reach the callback as `ApiError`.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to start worker runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
