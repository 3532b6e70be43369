//! Loading posters from a CSV table or a JSON array.
//!
//! The CSV source is tried first. If it cannot be fetched at all the JSON
//! source is used instead; if that fails too, the whole load fails. There is
//! no partial success.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::logging::{log_loaded, log_source_attempt};
use crate::poster::{normalize, Poster, RawPoster};

// =============================================================================
// CSV
// =============================================================================

/// Split delimited text into rows of cells.
///
/// Quoted cells may contain commas, newlines and `""` escapes. A `\r` outside
/// quotes is dropped. Rows made of a single empty cell are skipped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    fn finish_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
        if row.len() > 1 || row.first().map(|c| !c.is_empty()).unwrap_or(false) {
            rows.push(row);
        }
    }

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    cur.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cur.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cur)),
            '\n' => {
                row.push(std::mem::take(&mut cur));
                finish_row(&mut rows, std::mem::take(&mut row));
            }
            '\r' => {}
            _ => cur.push(ch),
        }
    }
    row.push(cur);
    finish_row(&mut rows, row);
    rows
}

/// `10:30-11:00|11:30-12:00` into `(start, end)` text pairs.
pub fn slots_from_cell(cell: &str) -> Vec<(String, String)> {
    cell.trim()
        .split('|')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.split('-').map(str::trim);
            let start = parts.next().unwrap_or_default().to_string();
            let end = parts.next().unwrap_or_default().to_string();
            (start, end)
        })
        .collect()
}

const BOM: char = '\u{feff}';

struct Columns {
    id: Option<usize>,
    title: Option<usize>,
    presenter: Option<usize>,
    category: Option<usize>,
    board: Option<usize>,
    slots: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches(BOM) } else { h.as_str() };
                h.trim().to_lowercase()
            })
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        Self {
            id: find("id"),
            title: find("title"),
            presenter: find("presenter"),
            category: find("category"),
            board: find("board"),
            slots: find("slots"),
        }
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|c| c.trim()).unwrap_or("")
}

/// Posters from a CSV table whose header names the columns in any order.
pub fn posters_from_csv(text: &str) -> Vec<Poster> {
    let rows = parse_csv(text);
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    let cols = Columns::from_header(header);

    body.iter()
        .map(|r| {
            normalize(&RawPoster::from_cells(
                cell(r, cols.id),
                cell(r, cols.title),
                cell(r, cols.presenter),
                cell(r, cols.category),
                cell(r, cols.board),
                slots_from_cell(cell(r, cols.slots)),
            ))
        })
        .filter(|p| {
            !(p.title.is_empty()
                && p.presenter.is_empty()
                && p.board.is_empty()
                && p.category.is_empty()
                && p.id.is_empty())
        })
        .collect()
}

// =============================================================================
// JSON
// =============================================================================

/// Parse a JSON document that must be an array of poster-like objects.
pub fn raw_posters_from_json(text: &str) -> Result<Vec<RawPoster>> {
    let value: Value = serde_json::from_str(text).context("invalid JSON")?;
    let Value::Array(items) = value else {
        bail!("JSON data must be an array ([])");
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

pub fn posters_from_json(text: &str) -> Result<Vec<Poster>> {
    Ok(raw_posters_from_json(text)?.iter().map(normalize).collect())
}

// =============================================================================
// Sources
// =============================================================================

/// Somewhere a data file's text can be fetched from.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_text(&self) -> Result<String>;
    fn describe(&self) -> String;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TextSource for FileSource {
    async fn fetch_text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl TextSource for HttpSource {
    async fn fetch_text(&self) -> Result<String> {
        let resp = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .with_context(|| format!("requesting {}", self.url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("{} returned {}", self.url, status));
        }
        resp.text()
            .await
            .with_context(|| format!("reading body of {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// HTTP(S) URLs are fetched over the network, anything else is a file path.
pub fn source_for(location: &str) -> Box<dyn TextSource> {
    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Box::new(HttpSource::new(url)),
        _ => Box::new(FileSource::new(location)),
    }
}

// =============================================================================
// Load with fallback
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub kind: SourceKind,
    pub source: String,
    pub posters: usize,
    pub sha256: String,
}

pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

fn finish_report(kind: SourceKind, source: &dyn TextSource, text: &str, posters: &[Poster]) -> LoadReport {
    let report = LoadReport {
        kind,
        source: source.describe(),
        posters: posters.len(),
        sha256: sha256_hex(text),
    };
    log_loaded(&report.source, report.posters, &report.sha256);
    report
}

/// CSV first, JSON as fallback. Any JSON failure is fatal.
pub async fn load_posters(
    csv: &dyn TextSource,
    json: &dyn TextSource,
) -> Result<(Vec<Poster>, LoadReport)> {
    match csv.fetch_text().await {
        Ok(text) => {
            log_source_attempt(&csv.describe(), true, "csv");
            let posters = posters_from_csv(&text);
            let report = finish_report(SourceKind::Csv, csv, &text, &posters);
            return Ok((posters, report));
        }
        Err(err) => log_source_attempt(&csv.describe(), false, &format!("{:#}", err)),
    }

    let text = json.fetch_text().await.map_err(|err| {
        log_source_attempt(&json.describe(), false, &format!("{:#}", err));
        anyhow!(
            "could not load {} or {}: {:#}",
            csv.describe(),
            json.describe(),
            err
        )
    })?;
    log_source_attempt(&json.describe(), true, "json");
    let posters = posters_from_json(&text).with_context(|| format!("parsing {}", json.describe()))?;
    let report = finish_report(SourceKind::Json, json, &text, &posters);
    Ok((posters, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_field_with_delimiter_and_newline_is_one_cell() {
        let rows = parse_csv("a,\"x, y\nz\",c\n");
        assert_eq!(rows, vec![vec!["a", "x, y\nz", "c"]]);
    }

    #[test]
    fn doubled_quotes_and_crlf() {
        let rows = parse_csv("\"say \"\"hi\"\"\",2\r\n\r\n3,4");
        assert_eq!(rows, vec![vec!["say \"hi\"", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn blank_lines_skipped_but_comma_rows_kept() {
        let rows = parse_csv("\n\n,\n");
        assert_eq!(rows, vec![vec!["", ""]]);
    }

    #[test]
    fn slots_cell_splits_pairs() {
        assert_eq!(
            slots_from_cell(" 10:30-11:00 | 11:30 - 12:00 ||"),
            vec![
                ("10:30".to_string(), "11:00".to_string()),
                ("11:30".to_string(), "12:00".to_string()),
            ]
        );
        assert_eq!(slots_from_cell("10:30"), vec![("10:30".to_string(), String::new())]);
        assert!(slots_from_cell("  ").is_empty());
    }

    #[test]
    fn header_matched_by_name_with_bom() {
        let text = "\u{feff}Slots,BOARD,Title,category,presenter,id\n\
                    10:30-10:45|10:40-11:00,A-1,Deep sea,Bio,Ann,p1\n\
                    ,,,,,\n\
                    bad-times,A-2,Untimed,Bio,Bo,p2\n";
        let posters = posters_from_csv(text);
        assert_eq!(posters.len(), 2);
        assert_eq!(posters[0].id, "p1");
        assert_eq!(posters[0].board, "A-1");
        assert_eq!(posters[0].presenter, "Ann");
        assert_eq!(posters[0].slots.len(), 2);
        assert!(posters[1].slots.is_empty());
    }

    #[test]
    fn missing_columns_are_empty() {
        let posters = posters_from_csv("title\nOnly a title\n");
        assert_eq!(posters.len(), 1);
        assert_eq!(posters[0].title, "Only a title");
        assert!(posters[0].board.is_empty() && posters[0].slots.is_empty());
        assert!(posters_from_csv("").is_empty());
    }

    #[test]
    fn json_must_be_array() {
        assert!(posters_from_json("{\"title\": \"x\"}").is_err());
        assert!(posters_from_json("not json").is_err());
        let posters = posters_from_json("[{\"title\": \"x\", \"start\": \"10:00\", \"end\": \"10:20\"}, 5]").unwrap();
        assert_eq!(posters.len(), 2);
        assert_eq!(posters[0].slots.len(), 1);
        assert!(posters[1].title.is_empty());
    }

    #[test]
    fn source_for_picks_transport() {
        assert!(source_for("https://example.org/data.csv").describe().starts_with("https://"));
        assert_eq!(source_for("data/data.csv").describe(), "data/data.csv");
    }

    #[test]
    fn sha256_is_hex() {
        let h = sha256_hex("abc");
        assert_eq!(h.len(), 64);
        assert!(h.starts_with("ba7816bf"));
    }
}
