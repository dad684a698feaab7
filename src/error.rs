use thiserror::Error;

/// Errors produced when decoding a serialized workflow canvas payload.
///
/// This is the engine's only fallible surface. Everything downstream of a
/// successful parse follows the degradation policy: malformed user data
/// resolves to empty results or dynamic types, never an error.
#[derive(Error, Debug, Clone)]
pub enum GraphDataError {
    #[error("failed to parse workflow graph JSON: {0}")]
    Json(String),
}
