use stockpile_core::bulk_operation::MAX_BATCH_SIZE;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Largest selection a single bulk operation may touch.
    pub max_batch_size: usize,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `BULK_MAX_BATCH_SIZE` | `1000`  |
    ///
    /// Unparseable or zero values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let max_batch_size = match std::env::var("BULK_MAX_BATCH_SIZE") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = MAX_BATCH_SIZE,
                        "BULK_MAX_BATCH_SIZE must be a positive integer, using default",
                    );
                    MAX_BATCH_SIZE
                }
            },
            Err(_) => MAX_BATCH_SIZE,
        };

        Self { max_batch_size }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}
