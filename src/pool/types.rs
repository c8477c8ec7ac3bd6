use std::time::Duration;

/// Acquisition policy attached to a wrapped pool for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolAttributes {
    /// Connection attempts before the last error surfaces. Values below
    /// 1 behave as 1.
    pub retry_count: u32,
    /// Wait between attempts.
    pub retry_interval: Duration,
    /// Probe freshly acquired connections with `validation_sql`.
    pub run_validation_sql: bool,
    /// Cheap liveness query run against each fresh connection.
    pub validation_sql: String,
}

impl Default for PoolAttributes {
    fn default() -> Self {
        Self {
            retry_count: 10,
            retry_interval: Duration::from_millis(250),
            run_validation_sql: true,
            validation_sql: "SELECT 1 FROM DUAL".to_string(),
        }
    }
}
