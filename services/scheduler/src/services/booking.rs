//! Appointment booking rules
//!
//! [`BookingService::create_appointment`] is the only path that creates
//! appointments. Rules are checked in a fixed order and the first failure is
//! reported:
//!
//! 1. the user exists,
//! 2. the user is active,
//! 3. start and computed end fall inside the working-hours window,
//! 4. the user is below the daily booking limit for the start date,
//! 5. the resource has no overlapping appointment (half-open intervals).
//!
//! The overlap scan and the insert run under a per-resource lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, CreateAppointment, NewAppointment,
};
use crate::repositories::{AppointmentRepository, UserRepository};

/// Daily time-of-day window bookings must fit in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if start >= end {
            return Err(format!(
                "working hours start ({}) must be before end ({})",
                start, end
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse `HH:MM` or `HH:MM:SS` bounds
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// `start <= s < end` and `start < e <= end` on the times of day
    pub fn admits(&self, start_time: NaiveDateTime, end_time: NaiveDateTime) -> bool {
        let (s, e) = (start_time.time(), end_time.time());
        self.start <= s && s < self.end && self.start < e && e <= self.end
    }
}

impl fmt::Display for WorkingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("invalid time of day '{}' (expected HH:MM or HH:MM:SS)", value))
}

/// Tunable booking rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRules {
    pub working_hours: WorkingHours,
    /// Maximum appointments per user and calendar day
    pub daily_limit: usize,
}

impl BookingRules {
    pub fn new(working_hours: WorkingHours, daily_limit: usize) -> Self {
        Self {
            working_hours,
            daily_limit,
        }
    }
}

/// First and last representable instant (microsecond precision) of a day
fn day_bounds(date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let end = date.and_hms_micro_opt(23, 59, 59, 999_999)?;
    Some((date.and_time(NaiveTime::MIN), end))
}

/// Appointment booking service
pub struct BookingService {
    users: Arc<dyn UserRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    rules: BookingRules,
    resource_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl BookingService {
    /// Create a new booking service
    pub fn new(
        users: Arc<dyn UserRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        rules: BookingRules,
    ) -> Self {
        Self {
            users,
            appointments,
            rules,
            resource_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    async fn resource_lock(&self, resource_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.resource_locks.lock().await;
        locks.entry(resource_id).or_default().clone()
    }

    /// Drop the map entry once no other booking holds or waits on it
    async fn release_resource_lock(&self, resource_id: i64, lock: Arc<Mutex<()>>) {
        let mut locks = self.resource_locks.lock().await;
        // one reference in the map, one here
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(&resource_id);
        }
    }

    #[cfg(test)]
    async fn lock_entries(&self) -> usize {
        self.resource_locks.lock().await.len()
    }

    /// Validate a booking request against the business rules and persist it
    pub async fn create_appointment(
        &self,
        request: &CreateAppointment,
    ) -> ServiceResult<Appointment> {
        let user = self
            .users
            .get(request.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", request.user_id)))?;

        if !user.is_active {
            warn!("Rejected booking for inactive user {}", user.id);
            return Err(ServiceError::BusinessRuleViolation(format!(
                "User {} is inactive",
                user.id
            )));
        }

        let start_time = request.start_time;
        let end_time = TimeDelta::try_minutes(request.duration_minutes)
            .and_then(|duration| start_time.checked_add_signed(duration))
            .filter(|end| *end > start_time)
            .ok_or_else(|| {
                ServiceError::ValidationFailure(format!(
                    "duration_minutes must be a positive number of minutes, got {}",
                    request.duration_minutes
                ))
            })?;

        let working_hours = self.rules.working_hours;
        if !working_hours.admits(start_time, end_time) {
            warn!(
                "Rejected booking {} - {} outside working hours",
                start_time, end_time
            );
            return Err(ServiceError::BusinessRuleViolation(format!(
                "Appointment outside working hours ({})",
                working_hours
            )));
        }

        let (day_start, day_end) = day_bounds(start_time.date()).ok_or_else(|| {
            ServiceError::ValidationFailure(format!("start_time {} is out of range", start_time))
        })?;
        let same_day = self
            .appointments
            .list_by_filter(&AppointmentFilter::for_user(user.id).between(day_start, day_end))
            .await?;
        if same_day.len() >= self.rules.daily_limit {
            warn!(
                "Rejected booking for user {}: daily limit reached on {}",
                user.id,
                start_time.date()
            );
            return Err(ServiceError::BusinessRuleViolation(format!(
                "User {} reached the daily limit of {} appointments",
                user.id, self.rules.daily_limit
            )));
        }

        let lock = self.resource_lock(request.resource_id).await;
        let created = {
            let _guard = lock.lock().await;
            self.insert_unless_overlapping(NewAppointment {
                user_id: user.id,
                resource_id: request.resource_id,
                start_time,
                end_time,
                status: AppointmentStatus::Scheduled,
                notes: request.notes.clone(),
            })
            .await
        };
        self.release_resource_lock(request.resource_id, lock).await;
        let appointment = created?;

        info!(
            "Booked appointment {} for user {} on resource {} ({} - {})",
            appointment.id, user.id, appointment.resource_id, start_time, end_time
        );
        Ok(appointment)
    }

    /// Resource overlap check and insert; callers hold the resource lock
    async fn insert_unless_overlapping(
        &self,
        appointment: NewAppointment,
    ) -> ServiceResult<Appointment> {
        let booked = self
            .appointments
            .list_by_resource(appointment.resource_id)
            .await?;
        if let Some(conflict) = booked
            .iter()
            .find(|a| a.overlaps(appointment.start_time, appointment.end_time))
        {
            warn!(
                "Rejected booking on resource {}: overlaps appointment {}",
                appointment.resource_id, conflict.id
            );
            return Err(ServiceError::BusinessRuleViolation(format!(
                "Resource {} is already booked from {} to {}",
                appointment.resource_id, conflict.start_time, conflict.end_time
            )));
        }

        Ok(self.appointments.create(&appointment).await?)
    }
}
