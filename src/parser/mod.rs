pub mod command;
pub mod env_vars;
pub mod links;
pub mod text;

use serde::{Deserialize, Serialize};

pub use command::{extract_command, InstallCommand};
pub use env_vars::{extract_env_vars, EnvVarDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub command: InstallCommand,
    pub environment_variables: Vec<EnvVarDescriptor>,
}

/// Mine one catalog entry: README text plus the notes column.
pub fn extract_all(documentation: &str, notes: &str) -> ExtractionResult {
    ExtractionResult {
        command: extract_command(documentation, notes),
        environment_variables: extract_env_vars(documentation),
    }
}
