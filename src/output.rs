use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::parser::{EnvVarDescriptor, ExtractionResult, InstallCommand};

/// One entry of the stars artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsRecord {
    pub link: String,
    pub extension_name: String,
    #[serde(rename = "githubStars")]
    pub github_stars: u64,
}

/// One entry of the installation-instructions artifact. Field order is part
/// of the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionsRecord {
    pub link: String,
    pub is_internal: bool,
    pub instructions: String,
    pub command: InstallCommand,
    pub environment_variables: Vec<EnvVarDescriptor>,
}

impl InstructionsRecord {
    pub fn new(link: String, is_internal: bool, readme: Option<String>, extracted: ExtractionResult) -> Self {
        InstructionsRecord {
            link,
            is_internal,
            instructions: readme.unwrap_or_default(),
            command: extracted.command,
            environment_variables: extracted.environment_variables,
        }
    }
}

/// Write `records` as a pretty-printed JSON array, creating parent dirs.
pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
