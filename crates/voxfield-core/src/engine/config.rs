use crate::core::models::field::FieldKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings of a single forward run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardConfig {
    pub field_kind: FieldKind,
    /// Upper bound on the number of worker threads.
    pub max_workers: usize,
    /// Observations per chunk; derived from the point count and worker count when `None`.
    pub chunk_size: Option<usize>,
}

impl ForwardConfig {
    /// Number of workers actually used: `min(available parallelism, max_workers)`, at least 1.
    pub fn worker_count(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        available.min(self.max_workers).max(1)
    }

    /// Chunk size for `points` observations and `workers` workers.
    ///
    /// Without an explicit size, aims for about four chunks per worker.
    pub fn resolved_chunk_size(&self, points: usize, workers: usize) -> usize {
        self.chunk_size
            .unwrap_or_else(|| points.div_ceil(workers.max(1) * 4))
            .max(1)
    }
}

#[derive(Default)]
pub struct ForwardConfigBuilder {
    field_kind: Option<FieldKind>,
    max_workers: Option<usize>,
    chunk_size: Option<usize>,
}

impl ForwardConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_kind(mut self, kind: FieldKind) -> Self {
        self.field_kind = Some(kind);
        self
    }
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    pub fn build(self) -> Result<ForwardConfig, ConfigError> {
        let field_kind = self
            .field_kind
            .ok_or(ConfigError::MissingParameter("field_kind"))?;

        let max_workers = match self.max_workers {
            Some(0) => {
                return Err(ConfigError::InvalidParameter {
                    name: "max_workers",
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };

        if self.chunk_size == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ForwardConfig {
            field_kind,
            max_workers,
            chunk_size: self.chunk_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_field_kind() {
        assert_eq!(
            ForwardConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("field_kind")
        );
    }

    #[test]
    fn build_rejects_zero_workers_and_zero_chunk_size() {
        let err = ForwardConfigBuilder::new()
            .field_kind(FieldKind::Gravity)
            .max_workers(0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "max_workers",
                ..
            }
        ));

        let err = ForwardConfigBuilder::new()
            .field_kind(FieldKind::Gravity)
            .chunk_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "chunk_size",
                ..
            }
        ));
    }

    #[test]
    fn worker_count_is_bounded_by_max_workers() {
        let config = ForwardConfigBuilder::new()
            .field_kind(FieldKind::Magnetic)
            .max_workers(1)
            .build()
            .unwrap();
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn derived_chunk_size_targets_four_chunks_per_worker() {
        let config = ForwardConfigBuilder::new()
            .field_kind(FieldKind::Gravity)
            .build()
            .unwrap();
        assert_eq!(config.resolved_chunk_size(100, 2), 13);
        assert_eq!(config.resolved_chunk_size(3, 8), 1);

        let explicit = ForwardConfig {
            chunk_size: Some(7),
            ..config
        };
        assert_eq!(explicit.resolved_chunk_size(100, 2), 7);
    }
}
