//! Business services sitting between the HTTP boundary and the repositories

use thiserror::Error;

use crate::export::ExportError;
use crate::repositories::RepositoryError;

pub mod booking;
pub mod reporting;

pub use booking::{BookingRules, BookingService, WorkingHours};
pub use reporting::ReportingService;

/// Errors surfaced by the business services
///
/// The HTTP boundary decides the status code for each kind.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A named business rule rejected the request
    #[error("{0}")]
    BusinessRuleViolation(String),

    /// Malformed input caught before any rule was evaluated
    #[error("{0}")]
    ValidationFailure(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;
