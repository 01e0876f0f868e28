mod configuration;
mod outcome;
mod project;
mod server;

pub use configuration::*;
pub use outcome::*;
pub use project::*;
pub use server::*;
