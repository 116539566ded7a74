pub mod config;
pub mod errors;
pub mod specs;

pub use config::{ConfigError, GeneratorConfig, RoutingFormat};
pub use errors::CoreError;
pub use specs::{
    AssociationMapping, AssociationType, EntityMetadata, FieldMapping, JoinColumn,
    MetadataRegistry, MetadataResolver,
};
