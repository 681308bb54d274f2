mod defaults;

pub use defaults::DefaultsConfig;

use crate::cli::ScreenArgs;
use crate::error::{CliError, Result};
use molsieve::engine::config::{ProcessorConfig, ProcessorConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialInputConfig {
    column: Option<String>,
    key_column: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    counts: Option<bool>,
    positions: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialProcessingConfig {
    max_queue_size: Option<usize>,
    max_active: Option<usize>,
    search_limit: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialScreenConfig {
    patterns: Option<Vec<String>>,
    input: Option<PartialInputConfig>,
    output: Option<PartialOutputConfig>,
    processing: Option<PartialProcessingConfig>,
}

/// Fully resolved settings of one `screen` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub input: PathBuf,
    pub matched: PathBuf,
    pub unmatched: PathBuf,
    pub summary: Option<PathBuf>,
    pub patterns: Vec<String>,
    pub column: String,
    pub key_column: Option<String>,
    /// Search steps allowed per pattern and row; unbounded when `None`.
    pub search_limit: Option<u64>,
    pub processor: ProcessorConfig,
}

impl PartialScreenConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves every setting. Command-line flags win over `-S` values, which
    /// win over the file, which wins over `defaults`.
    pub fn merge_with_cli(
        mut self,
        args: &ScreenArgs,
        defaults: &DefaultsConfig,
    ) -> Result<ScreenSettings> {
        self.apply_set_values(&args.set_values)?;

        let input = self.input.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();
        let processing = self.processing.take().unwrap_or_default();

        let patterns = if args.patterns.is_empty() {
            self.patterns.unwrap_or_default()
        } else {
            args.patterns.clone()
        };
        if patterns.is_empty() {
            return Err(CliError::Config(
                "At least one pattern is required, via `--pattern` or `patterns` in the config file."
                    .to_string(),
            ));
        }

        let max_active = args
            .max_active
            .or(processing.max_active)
            .unwrap_or(defaults.max_active);
        let max_queue_size = args
            .max_queue_size
            .or(processing.max_queue_size)
            .unwrap_or(max_active.saturating_mul(defaults.queue_factor));

        let search_limit = args.search_limit.or(processing.search_limit);
        if search_limit == Some(0) {
            return Err(CliError::Config(
                "Invalid value for 'search-limit': must be at least 1".to_string(),
            ));
        }

        let processor = ProcessorConfigBuilder::new()
            .max_active_instances(max_active)
            .max_queue_size(max_queue_size)
            .counts(args.counts || output.counts.unwrap_or(defaults.counts))
            .positions(args.positions || output.positions.unwrap_or(defaults.positions))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(ScreenSettings {
            input: args.input.clone(),
            matched: args.matched.clone(),
            unmatched: args.unmatched.clone(),
            summary: args.summary.clone(),
            patterns,
            column: args
                .column
                .clone()
                .or(input.column)
                .unwrap_or_else(|| defaults.column.clone()),
            key_column: args.key_column.clone().or(input.key_column),
            search_limit,
            processor,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "input.column" => {
                    self.input.get_or_insert_with(Default::default).column =
                        Some(value_str.to_string());
                }
                "input.key-column" => {
                    self.input.get_or_insert_with(Default::default).key_column =
                        Some(value_str.to_string());
                }
                "output.counts" => {
                    self.output.get_or_insert_with(Default::default).counts =
                        Some(parse_value(key, value_str)?);
                }
                "output.positions" => {
                    self.output.get_or_insert_with(Default::default).positions =
                        Some(parse_value(key, value_str)?);
                }
                "processing.max-queue-size" => {
                    self.processing
                        .get_or_insert_with(Default::default)
                        .max_queue_size = Some(parse_value(key, value_str)?);
                }
                "processing.max-active" => {
                    self.processing
                        .get_or_insert_with(Default::default)
                        .max_active = Some(parse_value(key, value_str)?);
                }
                "processing.search-limit" => {
                    self.processing
                        .get_or_insert_with(Default::default)
                        .search_limit = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}
