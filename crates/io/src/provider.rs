// Bootstrap data providers: local files and HTTP endpoints

use std::path::{Path, PathBuf};
use std::time::Duration;

use replaygrid_engine::source::{DataProvider, RawRows};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows from a `.json` (array of arrays) or `.csv`/`.tsv`/`.txt` file.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataProvider for FileProvider {
    fn fetch(&self) -> Result<RawRows, String> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let rows = match ext.as_str() {
            "json" => crate::json::import(&self.path),
            "csv" | "txt" => crate::csv::import(&self.path),
            "tsv" => crate::csv::import_with_delimiter(&self.path, b'\t'),
            "" => Err("file has no extension; expected .json or .csv".to_string()),
            other => Err(format!("unsupported data file type: .{}", other)),
        }
        .map_err(|e| format!("{}: {}", self.path.display(), e))?;

        log::debug!("read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Rows from a GET request returning a JSON array of arrays.
pub struct HttpProvider {
    url: String,
    http: reqwest::blocking::Client,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, String> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("rgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| format!("failed to create HTTP client: {}", e))?;
        Ok(Self { url: url.into(), http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DataProvider for HttpProvider {
    fn fetch(&self) -> Result<RawRows, String> {
        log::info!("fetching table data from {}", self.url);

        let resp = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| format!("request to {} failed: {}", self.url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("{} returned HTTP {}", self.url, status.as_u16()));
        }

        let body = resp.text().map_err(|e| format!("failed to read response: {}", e))?;
        let rows = crate::json::parse(&body)?;
        log::debug!("received {} rows from {}", rows.len(), self.url);
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
