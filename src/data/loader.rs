use std::collections::BTreeMap;
use std::path::Path;
use std::thread;

use anyhow::{Context, bail};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{CellValue, Dataset, Row};
use crate::config::DashboardConfig;

/// Upstream chart settings, consumed as-is.
pub type ChartConfig = Map<String, JsonValue>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {0}: {1}")]
    Io(String, std::io::Error),
    #[error("fetching {0}: {1}")]
    Http(String, reqwest::Error),
    #[error("parsing {0}: {1:#}")]
    Parse(String, anyhow::Error),
    #[error("chart configuration {0} is not a JSON object")]
    NotAnObject(String),
    #[error("loader worker for {0} panicked")]
    WorkerPanicked(String),
}

/// Everything the dashboard needs before it can start.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    pub chart_configs: Vec<ChartConfig>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Retrieve the dataset and every chart configuration in parallel.
///
/// All retrievals must succeed: the first failure (in source order) is
/// returned and nothing is partially loaded. No retries.
pub fn load_all(config: &DashboardConfig) -> Result<LoadedData, LoadError> {
    let client = http_client()?;
    let chart_sources: Vec<String> = config
        .charts
        .iter()
        .map(|slot| config.chart_config_source(&slot.id))
        .collect();

    log::info!(
        "Fetching dataset {} and {} chart configuration(s)",
        config.dataset_source,
        chart_sources.len()
    );

    thread::scope(|scope| -> Result<LoadedData, LoadError> {
        let dataset_job = scope.spawn(|| load_dataset(&client, &config.dataset_source));
        let chart_jobs: Vec<_> = chart_sources
            .iter()
            .map(|source| {
                let client = &client;
                (source, scope.spawn(move || load_chart_config(client, source)))
            })
            .collect();

        let dataset = dataset_job
            .join()
            .map_err(|_| LoadError::WorkerPanicked(config.dataset_source.clone()))??;

        let mut chart_configs = Vec::with_capacity(chart_jobs.len());
        for (source, job) in chart_jobs {
            let chart = job
                .join()
                .map_err(|_| LoadError::WorkerPanicked(source.clone()))??;
            chart_configs.push(chart);
        }

        Ok(LoadedData {
            dataset,
            chart_configs,
        })
    })
}

/// Load the dataset from a path or URL.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "Region": "EU", "GDP": 100 }, ...]`
/// * anything else – CSV with a header row
pub fn load_dataset(client: &reqwest::blocking::Client, source: &str) -> Result<Dataset, LoadError> {
    let text = read_source(client, source)?;
    let ext = Path::new(source.split(['?', '#']).next().unwrap_or(source))
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "json" => parse_json_records(&text),
        _ => parse_csv(&text),
    };
    let dataset = parsed.map_err(|e| LoadError::Parse(source.to_string(), e))?;
    log::info!(
        "Loaded {} rows with columns {:?} from {source}",
        dataset.len(),
        dataset.column_names
    );
    Ok(dataset)
}

/// Load one chart configuration object from a path or URL.
pub fn load_chart_config(
    client: &reqwest::blocking::Client,
    source: &str,
) -> Result<ChartConfig, LoadError> {
    let text = read_source(client, source)?;
    let value: JsonValue = serde_json::from_str(&text)
        .map_err(|e| LoadError::Parse(source.to_string(), e.into()))?;
    match value {
        JsonValue::Object(map) => Ok(map),
        _ => Err(LoadError::NotAnObject(source.to_string())),
    }
}

pub fn http_client() -> Result<reqwest::blocking::Client, LoadError> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("filter-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LoadError::Http("<client>".to_string(), e))
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn read_source(client: &reqwest::blocking::Client, source: &str) -> Result<String, LoadError> {
    if is_remote(source) {
        client
            .get(source)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| LoadError::Http(source.to_string(), e))
    } else {
        std::fs::read_to_string(source).map_err(|e| LoadError::Io(source.to_string(), e))
    }
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Cells are typed with [`CellValue::parse`].
pub fn parse_csv(text: &str) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut cells = BTreeMap::new();
        for (col_name, value) in headers.iter().zip(record.iter()) {
            cells.insert(col_name.clone(), CellValue::parse(value));
        }
        rows.push(Row(cells));
    }

    Ok(Dataset::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON parser
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "Region": "EU", "GDP": 100 },
///   ...
/// ]
/// ```
pub fn parse_json_records(text: &str) -> anyhow::Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let cells = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(Row(cells));
    }

    Ok(Dataset::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::parse(s),
        JsonValue::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}
