pub mod definition;
pub mod index;

pub use definition::*;
pub use index::*;
