use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use tracing::info;

const NAME_HEADER: &str = "Extension";
const LINK_HEADER: &str = "Link";
/// The notes column has no stable header name; it is always the fifth.
const NOTES_COLUMN: usize = 4;

/// One curated extension row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    /// Raw link cell; may hold several URLs.
    pub link: String,
    pub notes: String,
}

struct Columns {
    name: usize,
    link: usize,
    notes: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |label: &str, fallback: usize| {
            header
                .iter()
                .position(|h| h.trim() == label)
                .unwrap_or(fallback)
        };
        Columns {
            name: find(NAME_HEADER, 0),
            link: find(LINK_HEADER, 2),
            notes: NOTES_COLUMN,
        }
    }
}

pub fn load(path: &Path) -> Result<Vec<CatalogEntry>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let entries = read_entries(file).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} catalog entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse the spreadsheet export. Metadata rows above the `Extension,...`
/// header are skipped, as are repeated header rows and rows without a link.
/// Nameless rows are kept.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<CatalogEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut columns: Option<Columns> = None;
    let mut entries = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let is_header = record.get(0).map(str::trim) == Some(NAME_HEADER);

        let Some(cols) = &columns else {
            if is_header {
                columns = Some(Columns::from_header(&record));
            }
            continue;
        };
        if is_header {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let name = field(cols.name).trim().to_string();
        let link = field(cols.link);
        if link.trim().is_empty() {
            continue;
        }

        entries.push(CatalogEntry {
            name,
            link,
            notes: field(cols.notes),
        });
    }

    if columns.is_none() {
        bail!("no header row starting with '{}' found", NAME_HEADER);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Goose extensions - curated,,,,
Last updated,2024-12-01,,,
,,,,
Extension,Info,Link,Tester,Notes
Weather,Forecast tools,https://github.com/acme/weather-mcp,sam,\"Install: npx -y @acme/weather-mcp\"
,orphan row,https://github.com/acme/orphan,,
No Link,Missing link,,,
Extension,Info,Link,Tester,Notes
Search,\"Multi-line
info\",\"1. https://github.com/acme/search
2. https://github.com/acme/search-ui\",kim,\"uvx search-server
&& more\"
Short,Ragged row,https://github.com/acme/short
";

    #[test]
    fn skips_metadata_and_invalid_rows() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Weather", "", "Search", "Short"]);
        assert_eq!(entries[1].link, "https://github.com/acme/orphan");
        assert_eq!(entries[0].notes, "Install: npx -y @acme/weather-mcp");
        assert_eq!(entries[0].link, "https://github.com/acme/weather-mcp");
    }

    #[test]
    fn quoted_fields_span_lines() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        assert!(entries[2].link.contains("acme/search-ui"));
        assert_eq!(entries[2].notes, "uvx search-server\n&& more");
    }

    #[test]
    fn ragged_rows_default_to_empty_notes() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        assert_eq!(entries[3].notes, "");
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(read_entries("a,b,c\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let entries = load(file.path()).unwrap();
        assert_eq!(entries.len(), 4);
    }
}
