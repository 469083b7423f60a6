//! In-memory repository implementation.
//!
//! [`MemoryStore`] implements every repository trait over plain `Vec`s kept in
//! insertion order, which is the "store order" appointment listings fall back
//! to when no sort key is recognised. It mirrors the relational constraints of
//! the PostgreSQL schema (unique email, appointment references, cascading
//! deletes) so that services behave the same on both stores.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{
    AppointmentRepository, EventRepository, HealthCheck, LocationRepository, RepositoryError,
    RepositoryResult, ResourceRepository, UserRepository,
};
use crate::models::{
    Appointment, AppointmentFilter, Event, Location, NewAppointment, NewEvent, NewLocation,
    NewResource, NewUser, Resource, User,
};

/// In-memory store shared by all repository traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    resources: Vec<Resource>,
    locations: Vec<Location>,
    events: Vec<Event>,
    appointments: Vec<Appointment>,
    last_id: IdCounters,
}

#[derive(Default)]
struct IdCounters {
    user: i64,
    resource: i64,
    location: i64,
    event: i64,
    appointment: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn page<T: Clone>(items: &[T], skip: i64, limit: i64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.iter().skip(skip).take(limit).cloned().collect()
}

fn replace<T: Clone>(items: &mut [T], updated: &T, same: impl Fn(&T) -> bool) -> Option<T> {
    let slot = items.iter_mut().find(|item| same(item))?;
    *slot = updated.clone();
    Some(updated.clone())
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, MemoryData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, MemoryData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut data = self.write()?;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Constraint(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let user = User {
            id: next_id(&mut data.last_id.user),
            name: user.name.clone(),
            email: user.email.clone(),
            is_active: true,
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<User>> {
        Ok(page(&self.read()?.users, skip, limit))
    }

    async fn update(&self, user: &User) -> RepositoryResult<Option<User>> {
        let mut data = self.write()?;
        if data
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::Constraint(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        Ok(replace(&mut data.users, user, |u| u.id == user.id))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.write()?;
        data.users.retain(|u| u.id != id);
        data.appointments.retain(|a| a.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for MemoryStore {
    async fn create(&self, resource: &NewResource) -> RepositoryResult<Resource> {
        let mut data = self.write()?;
        let resource = Resource {
            id: next_id(&mut data.last_id.resource),
            name: resource.name.clone(),
            resource_type: resource.resource_type.clone(),
            availability: true,
        };
        data.resources.push(resource.clone());
        Ok(resource)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Resource>> {
        Ok(self.read()?.resources.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Resource>> {
        Ok(page(&self.read()?.resources, skip, limit))
    }

    async fn update(&self, resource: &Resource) -> RepositoryResult<Option<Resource>> {
        let mut data = self.write()?;
        Ok(replace(&mut data.resources, resource, |r| {
            r.id == resource.id
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.write()?;
        data.resources.retain(|r| r.id != id);
        data.appointments.retain(|a| a.resource_id != id);
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for MemoryStore {
    async fn create(&self, location: &NewLocation) -> RepositoryResult<Location> {
        let mut data = self.write()?;
        let location = Location {
            id: next_id(&mut data.last_id.location),
            name: location.name.clone(),
            capacity: location.capacity,
            description: location.description.clone(),
        };
        data.locations.push(location.clone());
        Ok(location)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Location>> {
        Ok(self.read()?.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Location>> {
        Ok(page(&self.read()?.locations, skip, limit))
    }

    async fn update(&self, location: &Location) -> RepositoryResult<Option<Location>> {
        let mut data = self.write()?;
        Ok(replace(&mut data.locations, location, |l| {
            l.id == location.id
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.write()?;
        data.locations.retain(|l| l.id != id);
        for event in data.events.iter_mut() {
            if event.location_id == Some(id) {
                event.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, event: &NewEvent) -> RepositoryResult<Event> {
        let mut data = self.write()?;
        if let Some(location_id) = event.location_id {
            if !data.locations.iter().any(|l| l.id == location_id) {
                return Err(RepositoryError::Constraint(format!(
                    "location {} does not exist",
                    location_id
                )));
            }
        }

        let event = Event {
            id: next_id(&mut data.last_id.event),
            title: event.title.clone(),
            location_id: event.location_id,
            start_time: event.start_time,
            end_time: event.end_time,
            capacity: event.capacity,
            description: event.description.clone(),
        };
        data.events.push(event.clone());
        Ok(event)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Event>> {
        Ok(self.read()?.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Event>> {
        let mut events = self.read()?.events.clone();
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(page(&events, skip, limit))
    }

    async fn update(&self, event: &Event) -> RepositoryResult<Option<Event>> {
        let mut data = self.write()?;
        Ok(replace(&mut data.events, event, |e| e.id == event.id))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.write()?.events.retain(|e| e.id != id);
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn create(&self, appointment: &NewAppointment) -> RepositoryResult<Appointment> {
        let mut data = self.write()?;
        if !data.users.iter().any(|u| u.id == appointment.user_id) {
            return Err(RepositoryError::Constraint(format!(
                "user {} does not exist",
                appointment.user_id
            )));
        }
        if !data.resources.iter().any(|r| r.id == appointment.resource_id) {
            return Err(RepositoryError::Constraint(format!(
                "resource {} does not exist",
                appointment.resource_id
            )));
        }

        let appointment = Appointment {
            id: next_id(&mut data.last_id.appointment),
            user_id: appointment.user_id,
            resource_id: appointment.resource_id,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            status: appointment.status,
            notes: appointment.notes.clone(),
        };
        data.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Appointment>> {
        Ok(self
            .read()?
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_by_filter(
        &self,
        filter: &AppointmentFilter,
    ) -> RepositoryResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .read()?
            .appointments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();

        if filter.sorted_by_start() {
            // stable, so equal starts keep store order
            appointments.sort_by_key(|a| a.start_time);
        }
        Ok(appointments)
    }

    async fn list_by_resource(&self, resource_id: i64) -> RepositoryResult<Vec<Appointment>> {
        Ok(self
            .read()?
            .appointments
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Option<Appointment>> {
        let mut data = self.write()?;
        Ok(replace(&mut data.appointments, appointment, |a| {
            a.id == appointment.id
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.write()?.appointments.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.read().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (name, email) in [("Ana", "ana@example.com"), ("Bruno", "bruno@example.com")] {
            UserRepository::create(
                &store,
                &NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                },
            )
            .await
            .unwrap();
        }
        ResourceRepository::create(
            &store,
            &NewResource {
                name: "Room A".to_string(),
                resource_type: "room".to_string(),
            },
        )
        .await
        .unwrap();
        store
    }

    async fn book(store: &MemoryStore, user_id: i64, start: NaiveDateTime) -> Appointment {
        AppointmentRepository::create(
            store,
            &NewAppointment {
                user_id,
                resource_id: 1,
                start_time: start,
                end_time: start + chrono::TimeDelta::hours(1),
                status: AppointmentStatus::Scheduled,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_insertion_order() {
        let store = seeded().await;
        let users = UserRepository::list(&store, 0, 100).await.unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(users.iter().all(|u| u.is_active));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let store = seeded().await;
        let result = UserRepository::create(
            &store,
            &NewUser {
                name: "Other Ana".to_string(),
                email: "ana@example.com".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(RepositoryError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_appointment_requires_existing_references() {
        let store = seeded().await;
        let result = AppointmentRepository::create(
            &store,
            &NewAppointment {
                user_id: 1,
                resource_id: 99,
                start_time: at(6, 10),
                end_time: at(6, 11),
                status: AppointmentStatus::Scheduled,
                notes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(RepositoryError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_by_filter_sorts_only_on_start_time() {
        let store = seeded().await;
        book(&store, 1, at(7, 14)).await;
        book(&store, 2, at(6, 9)).await;
        book(&store, 1, at(6, 12)).await;

        let sorted = store
            .list_by_filter(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(sorted.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        let unsorted = store
            .list_by_filter(&AppointmentFilter {
                order_by: "status".to_string(),
                ..AppointmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(
            unsorted.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_list_by_filter_applies_user_and_bounds() {
        let store = seeded().await;
        book(&store, 1, at(6, 9)).await;
        book(&store, 1, at(6, 17)).await;
        book(&store, 1, at(7, 9)).await;
        book(&store, 2, at(6, 10)).await;

        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let filter = AppointmentFilter::for_user(1).between(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_micro_opt(23, 59, 59, 999_999).unwrap(),
        );
        let found = store.list_by_filter(&filter).await.unwrap();
        assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_ids() {
        let store = seeded().await;
        let mut ghost = book(&store, 1, at(6, 9)).await;
        ghost.id = 42;

        assert_eq!(AppointmentRepository::update(&store, &ghost).await.unwrap(), None);
        AppointmentRepository::delete(&store, 42).await.unwrap();
        assert_eq!(
            store.list_by_resource(1).await.unwrap().len(),
            1,
            "deleting an unknown id must not touch other rows"
        );
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_appointments() {
        let store = seeded().await;
        book(&store, 1, at(6, 9)).await;
        book(&store, 2, at(6, 10)).await;

        UserRepository::delete(&store, 1).await.unwrap();

        let remaining = store.list_by_resource(1).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, 2);
    }

    #[tokio::test]
    async fn test_deleting_location_detaches_events() {
        let store = MemoryStore::new();
        let location = LocationRepository::create(
            &store,
            &NewLocation {
                name: "Hall".to_string(),
                capacity: 40,
                description: None,
            },
        )
        .await
        .unwrap();
        let event = EventRepository::create(
            &store,
            &NewEvent {
                title: "Workshop".to_string(),
                location_id: Some(location.id),
                start_time: at(6, 9),
                end_time: at(6, 12),
                capacity: 20,
                description: None,
            },
        )
        .await
        .unwrap();

        LocationRepository::delete(&store, location.id).await.unwrap();

        let event = EventRepository::get(&store, event.id).await.unwrap().unwrap();
        assert_eq!(event.location_id, None);
    }
}
