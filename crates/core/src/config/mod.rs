pub mod generator_config;
pub mod validation;

pub use generator_config::*;
pub use validation::*;
