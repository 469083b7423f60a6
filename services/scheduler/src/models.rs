//! Domain models for request and response payloads

pub mod appointment;
pub mod event;
pub mod location;
pub mod resource;
pub mod user;

// Re-export for convenience
pub use appointment::{
    Appointment, AppointmentFilter, AppointmentStatus, CreateAppointment, NewAppointment,
    UpdateAppointmentStatus,
};
pub use event::{Event, NewEvent};
pub use location::{Location, NewLocation};
pub use resource::{NewResource, Resource};
pub use user::{NewUser, UpdateUser, User};

use serde::Deserialize;

/// Pagination parameters for plain entity listings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}
