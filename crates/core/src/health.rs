//! Pool health gate

use crate::StoreError;

/// Result of a pool health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolHealth {
    Healthy,
    /// Pool needs attention; `detail` is the health check's report
    Unhealthy { detail: String },
}

impl PoolHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, PoolHealth::Healthy)
    }
}

/// Probe run before a target is touched
pub trait HealthCheck {
    fn check(&self, pool: &str) -> Result<PoolHealth, StoreError>;
}

impl<H: HealthCheck + ?Sized> HealthCheck for &H {
    fn check(&self, pool: &str) -> Result<PoolHealth, StoreError> {
        (**self).check(pool)
    }
}

/// Health check that reports every pool as healthy
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeHealthy;

impl HealthCheck for AssumeHealthy {
    fn check(&self, _pool: &str) -> Result<PoolHealth, StoreError> {
        Ok(PoolHealth::Healthy)
    }
}
