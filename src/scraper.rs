use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::catalog::CatalogEntry;
use crate::github::{GithubClient, Lookup};
use crate::output::{InstructionsRecord, StarsRecord};
use crate::parser::{self, links};
use crate::readme;
use crate::settings::Settings;

/// A unique link to mine, with the notes of the first row that named it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub link: String,
    pub notes: String,
}

/// Look up stars for every named entry's first GitHub link. Entries whose
/// lookup fails are left out.
pub async fn collect_stars(entries: &[CatalogEntry], settings: &Settings) -> Result<Vec<StarsRecord>> {
    let mut github = GithubClient::new(settings)?;
    let delay = Duration::from_millis(settings.request_delay_ms);
    let pb = progress_bar(entries.len())?;
    let mut records = Vec::new();

    for entry in entries {
        pb.inc(1);
        if entry.name.is_empty() {
            debug!("Skipping unnamed entry {}", entry.link);
            continue;
        }
        let Some(link) = links::extract_links(&entry.link).into_iter().next() else {
            warn!("No GitHub links found for {}", entry.name);
            continue;
        };
        let Some(repo) = links::github_repo(&link) else {
            warn!("Could not resolve owner/repo for {}", link);
            continue;
        };

        match github.stars(&repo).await {
            Ok(lookup) => {
                if let Lookup::Fetched(n) = lookup {
                    info!("Found {} stars for {}", n, repo);
                    tokio::time::sleep(delay).await;
                }
                records.push(StarsRecord {
                    link,
                    extension_name: entry.name.clone(),
                    github_stars: lookup.stars(),
                });
            }
            Err(e) => warn!("Skipping {}: {}", entry.name, e),
        }
    }

    pb.finish_and_clear();
    info!("Collected stars for {} of {} entries", records.len(), entries.len());
    Ok(records)
}

/// Fetch READMEs and mine install metadata for every unique cleaned link.
pub async fn collect_instructions(
    entries: &[CatalogEntry],
    settings: &Settings,
) -> Result<Vec<InstructionsRecord>> {
    let jobs = plan_jobs(entries);
    info!("{} unique links out of {} entries", jobs.len(), entries.len());

    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(30))
        .build()?;
    let links: Vec<String> = jobs.iter().map(|j| j.link.clone()).collect();
    let readmes = fetch_readmes(&client, links, settings.concurrency).await?;

    Ok(build_records(jobs, readmes))
}

/// Cleaned GitHub link per entry, first occurrence of each link only.
pub fn plan_jobs(entries: &[CatalogEntry]) -> Vec<Job> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|e| {
            let link = links::clean_link(&e.link)?;
            seen.insert(link.clone()).then(|| Job {
                link,
                notes: e.notes.clone(),
            })
        })
        .collect()
}

/// Run extraction over fetched documents; output order follows `jobs`.
pub fn build_records(jobs: Vec<Job>, readmes: Vec<Option<String>>) -> Vec<InstructionsRecord> {
    jobs.into_par_iter()
        .zip(readmes.into_par_iter())
        .map(|(job, readme)| {
            let extracted = parser::extract_all(readme.as_deref().unwrap_or(""), &job.notes);
            let internal = links::is_internal(&job.link);
            InstructionsRecord::new(job.link, internal, readme, extracted)
        })
        .collect()
}

/// Download READMEs concurrently; result `i` belongs to `links[i]`.
async fn fetch_readmes(
    client: &Client,
    links: Vec<String>,
    concurrency: usize,
) -> Result<Vec<Option<String>>> {
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let total = links.len();
    let pb = progress_bar(total)?;

    // Workers send (index, readme); the receive loop restores input order
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, Option<String>)>(concurrency * 2);

    for (idx, link) in links.into_iter().enumerate() {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let readme = readme::fetch_readme(&client, &link).await;
            if readme.is_none() {
                warn!("No README found for {}", link);
            }
            let _ = tx.send((idx, readme)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut readmes = vec![None; total];
    let mut found = 0usize;
    while let Some((idx, readme)) = rx.recv().await {
        if readme.is_some() {
            found += 1;
        }
        readmes[idx] = readme;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Fetched {} READMEs ({} missing)", found, total - found);
    Ok(readmes)
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}
