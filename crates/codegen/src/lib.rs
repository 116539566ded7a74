pub mod generator;
pub mod naming;
pub mod normalizer;
pub mod templates;
pub mod writer;

pub use generator::*;
pub use normalizer::{
    normalize, ColumnPair, NormalizedField, NormalizedFields, RelationshipField, RelationshipKind,
};
pub use templates::TemplateEngine;
pub use writer::*;
