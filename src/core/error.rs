// src/core/error.rs

use thiserror::Error;

/// The only way a scan can be refused. Probe failures never surface here;
/// they are recorded inside the `ScanResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Please enter a domain.")]
    EmptyDomain,
}
