use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Which match details are attached to evaluated records.
///
/// With both flags off, records are only classified (first match wins). With
/// either on, every pattern is evaluated fully and matched records carry
/// per-pattern counts; `positions` additionally attaches the matched atom and
/// bond identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub counts: bool,
    pub positions: bool,
}

impl OutputMode {
    pub fn needs_details(&self) -> bool {
        self.counts || self.positions
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Upper bound on records submitted but not yet finalized.
    pub max_queue_size: usize,
    /// Number of worker threads evaluating records concurrently.
    pub max_active_instances: usize,
    pub output: OutputMode,
    /// Total record count, if known, for progress fractions.
    pub expected_total: Option<u64>,
}

impl ProcessorConfig {
    /// Checks the bounds a run relies on. Both sizes must be at least 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_queue_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_active_instances == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_active_instances",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ProcessorConfigBuilder {
    max_queue_size: Option<usize>,
    max_active_instances: Option<usize>,
    output: OutputMode,
    expected_total: Option<u64>,
}

impl ProcessorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = Some(size);
        self
    }
    pub fn max_active_instances(mut self, count: usize) -> Self {
        self.max_active_instances = Some(count);
        self
    }
    pub fn counts(mut self, enabled: bool) -> Self {
        self.output.counts = enabled;
        self
    }
    pub fn positions(mut self, enabled: bool) -> Self {
        self.output.positions = enabled;
        self
    }
    pub fn expected_total(mut self, total: u64) -> Self {
        self.expected_total = Some(total);
        self
    }

    pub fn build(self) -> Result<ProcessorConfig, ConfigError> {
        let max_queue_size = self
            .max_queue_size
            .ok_or(ConfigError::MissingParameter("max_queue_size"))?;
        let max_active_instances = self
            .max_active_instances
            .ok_or(ConfigError::MissingParameter("max_active_instances"))?;
        let config = ProcessorConfig {
            max_queue_size,
            max_active_instances,
            output: self.output,
            expected_total: self.expected_total,
        };
        config.validate()?;
        Ok(config)
    }
}
