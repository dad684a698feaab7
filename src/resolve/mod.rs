pub mod context;
pub mod flatten;
pub mod resolver;
pub mod types;

pub use context::*;
pub use flatten::*;
pub use resolver::*;
pub use types::*;
