pub mod metadata;
pub mod resolver;

pub use metadata::*;
pub use resolver::*;
