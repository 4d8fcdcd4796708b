pub mod command;
pub mod config;
pub mod error;
pub mod provision;
pub mod scaffold;
pub mod templates;
pub mod tree;

pub use command::{CommandRunner, SystemRunner};
pub use config::{Args, Config};
pub use error::ScaffoldError;
pub use scaffold::{ProjectScaffolder, ScaffoldSummary};
