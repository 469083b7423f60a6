//! Repositories for database operations
//!
//! Every entity gets one trait with the same capability set (create, get,
//! list, update, delete). PostgreSQL-backed implementations live in the
//! per-entity submodules; [`memory::MemoryStore`] implements all of them in
//! memory for tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{
    Appointment, AppointmentFilter, Event, Location, NewAppointment, NewEvent, NewLocation,
    NewResource, NewUser, Resource, User,
};

pub mod appointment;
pub mod event;
pub mod location;
pub mod memory;
pub mod resource;
pub mod user;

pub use appointment::PgAppointmentRepository;
pub use event::PgEventRepository;
pub use location::PgLocationRepository;
pub use memory::MemoryStore;
pub use resource::PgResourceRepository;
pub use user::PgUserRepository;

/// Error type for repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A store constraint rejected the write (unique email, dangling reference...)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Error occurred during query execution
    #[error("Database query error: {0}")]
    Query(#[source] sqlx::Error),

    /// Store-level failure unrelated to a particular query
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                RepositoryError::Constraint(db.message().to_string())
            }
            other => RepositoryError::Query(other),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> RepositoryResult<User>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<User>>;
    /// Returns `None` when no user has `user.id`
    async fn update(&self, user: &User) -> RepositoryResult<Option<User>>;
    /// Deleting a missing id is a no-op
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// Resource persistence
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn create(&self, resource: &NewResource) -> RepositoryResult<Resource>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<Resource>>;
    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Resource>>;
    async fn update(&self, resource: &Resource) -> RepositoryResult<Option<Resource>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// Location persistence
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &NewLocation) -> RepositoryResult<Location>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<Location>>;
    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Location>>;
    async fn update(&self, location: &Location) -> RepositoryResult<Option<Location>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// Event persistence
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &NewEvent) -> RepositoryResult<Event>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<Event>>;
    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Event>>;
    async fn update(&self, event: &Event) -> RepositoryResult<Option<Event>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// Appointment persistence
///
/// `create` is only called by the booking service, which owns the rule
/// checks.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: &NewAppointment) -> RepositoryResult<Appointment>;
    async fn get(&self, id: i64) -> RepositoryResult<Option<Appointment>>;
    async fn list_by_filter(&self, filter: &AppointmentFilter)
    -> RepositoryResult<Vec<Appointment>>;
    /// Every appointment booked on a resource, regardless of date
    async fn list_by_resource(&self, resource_id: i64) -> RepositoryResult<Vec<Appointment>>;
    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Option<Appointment>>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// Store connectivity check
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> RepositoryResult<bool>;
}

#[derive(Clone)]
struct PgHealth {
    pool: PgPool,
}

#[async_trait]
impl HealthCheck for PgHealth {
    async fn health_check(&self) -> RepositoryResult<bool> {
        common::database::health_check(&self.pool)
            .await
            .map_err(|e| RepositoryError::Internal(e.to_string()))
    }
}

/// The full set of repositories handed to the services and the router
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub events: Arc<dyn EventRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            resources: Arc::new(PgResourceRepository::new(pool.clone())),
            locations: Arc::new(PgLocationRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            appointments: Arc::new(PgAppointmentRepository::new(pool.clone())),
            health: Arc::new(PgHealth { pool }),
        }
    }

    /// In-memory repositories sharing one store
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            resources: store.clone(),
            locations: store.clone(),
            events: store.clone(),
            appointments: store.clone(),
            health: store,
        }
    }
}
