use cuprum_application::acquisition::fetch_and_clean;
use cuprum_application::config::Config;
use cuprum_application::presentation::{build_presentation, write_table_csv};
use cuprum_application::training::train_and_evaluate;
use cuprum_application::validation::validate;
use cuprum_domain::repositories::price_source::PriceTableSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessMode {
    Train,
    Table,
    Validate,
}

impl HeadlessMode {
    pub fn label(self) -> &'static str {
        match self {
            HeadlessMode::Train => "train",
            HeadlessMode::Table => "table",
            HeadlessMode::Validate => "validate",
        }
    }
}

/// Runs one mode to completion and returns what belongs on stdout.
pub fn run_headless(
    mode: HeadlessMode,
    config: &Config,
    source: &dyn PriceTableSource,
) -> Result<String, String> {
    metrics::counter!("cuprum.app.runs_total", "mode" => mode.label()).increment(1);
    match mode {
        HeadlessMode::Train => {
            let table = fetch_and_clean(source)?;
            let outcome = train_and_evaluate(&table, &config.model)?;
            Ok(format_score(outcome.sqrt_r2))
        }
        HeadlessMode::Table => {
            let table = fetch_and_clean(source)?;
            let presentation = build_presentation(&table, &config.dashboard);
            let mut out = Vec::new();
            write_table_csv(&presentation.table, &mut out)?;
            String::from_utf8(out).map_err(|err| format!("csv output is not utf-8: {err}"))
        }
        HeadlessMode::Validate => {
            let json = validate(source)?;
            serde_json::to_string_pretty(&json)
                .map_err(|err| format!("failed to serialize validation report: {err}"))
        }
    }
}

/// The bare score; NaN when R² is negative.
pub fn format_score(sqrt_r2: f64) -> String {
    format!("{sqrt_r2}")
}
