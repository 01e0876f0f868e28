pub mod deprecation;
pub mod error;
pub mod identity;
pub mod paths;
pub mod properties;
pub mod resolver;
pub mod runner_config;
pub mod validation;

pub use deprecation::{DEPRECATED_PROPERTIES, translate_deprecated};
pub use error::{Error, Result};
pub use identity::resolve_identity;
pub use resolver::{ConfigurationResolver, ResolvedSession, ResolverInput};
pub use runner_config::RunnerConfig;
