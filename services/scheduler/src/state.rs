//! Application state shared across handlers

use std::sync::Arc;

use config::ConfigError;

use crate::{
    config::Settings,
    repositories::{
        AppointmentRepository, EventRepository, HealthCheck, LocationRepository, Repositories,
        ResourceRepository, UserRepository,
    },
    services::{BookingService, ReportingService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub title: Arc<str>,
    pub users: Arc<dyn UserRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub events: Arc<dyn EventRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub health: Arc<dyn HealthCheck>,
    pub booking: Arc<BookingService>,
    pub reporting: Arc<ReportingService>,
}

impl AppState {
    /// Wire the services on top of the given repositories
    pub fn new(settings: &Settings, repositories: Repositories) -> Result<Self, ConfigError> {
        let booking = BookingService::new(
            repositories.users.clone(),
            repositories.appointments.clone(),
            settings.booking_rules()?,
        );
        let reporting = ReportingService::new(
            repositories.appointments.clone(),
            settings.export.csv_dir.clone(),
        );

        Ok(Self {
            title: Arc::from(settings.app.title.as_str()),
            users: repositories.users,
            resources: repositories.resources,
            locations: repositories.locations,
            events: repositories.events,
            appointments: repositories.appointments,
            health: repositories.health,
            booking: Arc::new(booking),
            reporting: Arc::new(reporting),
        })
    }
}
