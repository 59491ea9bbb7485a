// Data source adapter: fetch raw text and parse it into a Dataset

use crate::data::Dataset;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to fetch '{location}': {reason}")]
    Fetch { location: String, reason: String },

    #[error("failed to parse data from '{location}': {reason}")]
    Parse { location: String, reason: String },
}

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// Classify a location string: `-` is stdin, `http(s)://` is a URL, anything else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed == "-" {
            Source::Stdin
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::Path(PathBuf::from(trimmed))
        }
    }

    fn looks_like_json(&self) -> bool {
        let name = match self {
            Source::Stdin => return false,
            Source::Url(url) => url.split(&['?', '#'][..]).next().unwrap_or(url).to_string(),
            Source::Path(path) => path.to_string_lossy().into_owned(),
        };
        name.to_ascii_lowercase().ends_with(".json")
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "<stdin>"),
            Source::Url(url) => write!(f, "{}", url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

/// Retrieve and parse a dataset. Makes exactly one attempt.
pub fn load(source: &Source, options: &LoadOptions) -> Result<Dataset, SourceError> {
    let location = source.to_string();
    let (text, mut format) = fetch_text(source, options)?;
    if source.looks_like_json() {
        format = DataFormat::Json;
    }

    log::debug!("fetched {} bytes from {} as {:?}", text.len(), location, format);

    let dataset = parse_text(&text, format).map_err(|reason| SourceError::Parse {
        location: location.clone(),
        reason,
    })?;

    log::info!(
        "loaded {} records with {} columns from {}",
        dataset.len(),
        dataset.headers().len(),
        location
    );

    Ok(dataset)
}

fn fetch_text(source: &Source, options: &LoadOptions) -> Result<(String, DataFormat), SourceError> {
    let fetch_err = |reason: String| SourceError::Fetch {
        location: source.to_string(),
        reason,
    };

    match source {
        Source::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| fetch_err(e.to_string()))?;
            Ok((text, DataFormat::Csv))
        }
        Source::Path(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| fetch_err(e.to_string()))?;
            Ok((text, DataFormat::Csv))
        }
        Source::Url(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(options.timeout)
                .build()
                .map_err(|e| fetch_err(e.to_string()))?;

            let response = client.get(url).send().map_err(|e| fetch_err(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(fetch_err(format!("server responded with status {}", status)));
            }

            let format = match response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
            {
                Some(ct) if ct.contains("json") => DataFormat::Json,
                _ => DataFormat::Csv,
            };

            let text = response.text().map_err(|e| fetch_err(e.to_string()))?;
            Ok((text, format))
        }
    }
}

fn parse_text(text: &str, format: DataFormat) -> Result<Dataset, String> {
    match format {
        DataFormat::Csv => parse_csv(text.as_bytes()).map_err(|e| e.to_string()),
        DataFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
            Dataset::from_json(&value).map_err(|e| e.to_string())
        }
    }
}

/// Parse CSV text whose first row names the columns.
///
/// Rows whose cells are all empty are skipped. Short rows leave their trailing
/// columns absent and cells past the header are ignored.
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for row in rdr.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        rows.push(row.iter().map(str::to_string).collect());
    }

    Ok(Dataset::from_rows(headers, rows))
}
