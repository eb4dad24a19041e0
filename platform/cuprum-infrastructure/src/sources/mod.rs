use crate::html;
use cuprum_domain::repositories::price_source::PriceTableSource;
use cuprum_domain::value_objects::raw_table::RawTable;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn record_fetch_metrics(kind: &'static str, start: Instant, result: &Result<Vec<RawTable>, String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "cuprum.infra.source.fetch.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("cuprum.infra.source.fetch_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

/// Downloads the price page over HTTP(S) on every call. No retries.
pub struct HttpPriceTableSource {
    pub url: String,
    pub timeout_ms: Option<u64>,
    client: Client,
}

impl HttpPriceTableSource {
    pub fn new(url: String, user_agent: &str, timeout_ms: Option<u64>) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout_ms.map(Duration::from_millis))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            url,
            timeout_ms,
            client,
        })
    }

    fn download(&self) -> Result<String, String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| format!("request to {} failed: {err}", self.url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!(
                "http error from {}: status {}",
                self.url,
                status.as_u16()
            ));
        }
        resp.text()
            .map_err(|err| format!("failed to read body from {}: {err}", self.url))
    }
}

impl PriceTableSource for HttpPriceTableSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_tables(&self) -> Result<Vec<RawTable>, String> {
        let span = tracing::info_span!(
            "infra.source.http",
            url = %self.url,
            timeout_ms = ?self.timeout_ms
        );
        let _enter = span.enter();

        let start = Instant::now();
        let result = self.download().and_then(|body| {
            tracing::debug!(bytes = body.len(), "downloaded price page");
            html::parse_tables(&body)
        });
        record_fetch_metrics("http", start, &result);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "price page fetch failed");
        }
        result
    }
}

/// Reads a saved copy of the price page from disk.
#[derive(Debug, Clone)]
pub struct FilesystemPriceTableSource {
    path: PathBuf,
}

impl FilesystemPriceTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceTableSource for FilesystemPriceTableSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_tables(&self) -> Result<Vec<RawTable>, String> {
        let start = Instant::now();
        let result = fs::read_to_string(&self.path)
            .map_err(|err| format!("failed to read {}: {err}", self.path.display()))
            .and_then(|body| html::parse_tables(&body));
        record_fetch_metrics("file", start, &result);
        result
    }
}
