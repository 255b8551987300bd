mod catalog;
mod error;
mod github;
mod output;
mod parser;
mod readme;
mod scraper;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::output::InstructionsRecord;
use crate::parser::InstallCommand;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "ext_scraper", about = "Enrich the curated extension catalog with GitHub stars and install metadata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up GitHub stars for every catalog entry
    Stars {
        /// Catalog CSV (default: EXT_INPUT_CSV or input/goose_extensions_curated.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output JSON (default: EXT_STARS_OUTPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch READMEs and mine install commands and environment variables
    Instructions {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output JSON (default: EXT_INSTRUCTIONS_OUTPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stars + instructions in one go
    Run {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Mine a local README without touching the network
    Extract {
        /// Markdown file to mine
        readme: PathBuf,
        /// Free-text notes, checked for install commands before the README
        #[arg(short, long, default_value = "")]
        notes: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stars { input, output } => {
            let mut settings = Settings::load()?;
            override_path(&mut settings.input_csv, input);
            override_path(&mut settings.stars_output, output);
            run_stars(&settings).await
        }
        Commands::Instructions { input, output } => {
            let mut settings = Settings::load()?;
            override_path(&mut settings.input_csv, input);
            override_path(&mut settings.instructions_output, output);
            run_instructions(&settings).await
        }
        Commands::Run { input } => {
            let mut settings = Settings::load()?;
            override_path(&mut settings.input_csv, input);
            let t_stars = Instant::now();
            run_stars(&settings).await?;
            println!("Stars done in {}", format_duration(t_stars.elapsed()));
            run_instructions(&settings).await
        }
        Commands::Extract { readme, notes } => run_extract(&readme, &notes),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Offline mining of a local README; reads no settings.
fn run_extract(readme: &Path, notes: &str) -> anyhow::Result<()> {
    let md = std::fs::read_to_string(readme)
        .with_context(|| format!("Failed to read {}", readme.display()))?;
    let result = parser::extract_all(&md, notes);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn override_path(setting: &mut PathBuf, flag: Option<PathBuf>) {
    if let Some(path) = flag {
        *setting = path;
    }
}

async fn run_stars(settings: &Settings) -> anyhow::Result<()> {
    let entries = catalog::load(&settings.input_csv)?;
    if entries.is_empty() {
        println!("No catalog entries in {}.", settings.input_csv.display());
        return Ok(());
    }
    println!("Looking up stars for {} entries...", entries.len());
    let records = scraper::collect_stars(&entries, settings).await?;
    output::write_json(&settings.stars_output, &records)?;
    println!(
        "Wrote {} results to {}",
        records.len(),
        settings.stars_output.display()
    );
    Ok(())
}

async fn run_instructions(settings: &Settings) -> anyhow::Result<()> {
    let entries = catalog::load(&settings.input_csv)?;
    if entries.is_empty() {
        println!("No catalog entries in {}.", settings.input_csv.display());
        return Ok(());
    }
    println!("Processing {} entries...", entries.len());
    let records = scraper::collect_instructions(&entries, settings).await?;
    output::write_json(&settings.instructions_output, &records)?;
    ExtractCounts::tally(&records).print();
    println!(
        "Processed {} extensions. Results written to {}",
        records.len(),
        settings.instructions_output.display()
    );
    Ok(())
}

struct ExtractCounts {
    readmes: usize,
    commands: usize,
    docker_only: usize,
    env_vars: usize,
}

impl ExtractCounts {
    fn tally(records: &[InstructionsRecord]) -> Self {
        let mut counts = ExtractCounts {
            readmes: 0,
            commands: 0,
            docker_only: 0,
            env_vars: 0,
        };
        for r in records {
            if !r.instructions.is_empty() {
                counts.readmes += 1;
            }
            match r.command {
                InstallCommand::Command(_) => counts.commands += 1,
                InstallCommand::DockerOnly => counts.docker_only += 1,
                InstallCommand::NotFound => {}
            }
            counts.env_vars += r.environment_variables.len();
        }
        counts
    }

    fn print(&self) {
        println!(
            "Found {} READMEs, {} install commands, {} docker-only, {} env vars.",
            self.readmes, self.commands, self.docker_only, self.env_vars,
        );
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_ignores_broken_settings() {
        std::env::set_var("EXT_CONCURRENCY", "not-a-number");
        assert!(Settings::load().is_err());
        let result = run_extract(Path::new("tests/fixtures/weather_server.md"), "");
        std::env::remove_var("EXT_CONCURRENCY");
        assert!(result.is_ok());
    }

    #[test]
    fn extract_reports_missing_file() {
        assert!(run_extract(Path::new("tests/fixtures/missing.md"), "").is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
