pub mod canvas;
pub mod node;
pub mod traversal;

pub use canvas::*;
pub use node::*;
pub use traversal::*;

/// Extracts the single `{{ ... }}` reference token from an expression.
///
/// Anything before the first `{{` or after the matching `}}` is ignored;
/// expressions without a delimited token yield `None` and callers degrade.
pub fn reference_token(expression: &str) -> Option<&str> {
    let start = expression.find("{{")? + 2;
    let end = expression[start..].find("}}")? + start;
    let token = expression[start..end].trim();
    (!token.is_empty()).then_some(token)
}
