//! Appointment model, booking payloads and listing filters

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Done,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Done => "done",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted status is not one of the known values
#[derive(Debug, Error)]
#[error("Unknown appointment status '{0}' (expected scheduled, done or cancelled)")]
pub struct UnknownStatus(pub String);

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "done" => Ok(AppointmentStatus::Done),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Appointment entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub resource_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    /// Half-open interval intersection: touching endpoints do not overlap
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !(end <= self.start_time || start >= self.end_time)
    }

    /// Booked length truncated to whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Booking request as received at the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub user_id: i64,
    pub resource_id: i64,
    pub start_time: NaiveDateTime,
    pub duration_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fully validated appointment ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub user_id: i64,
    pub resource_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatus {
    pub status: String,
}

/// Sort key honoured by [`AppointmentFilter`]
pub const ORDER_BY_START_TIME: &str = "start_time";

/// Query parameters for appointment listing
///
/// `order_by` other than `start_time` leaves rows in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Lower bound on `start_time` (inclusive)
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    /// Upper bound on `end_time` (inclusive)
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default = "default_order_by")]
    pub order_by: String,
}

fn default_order_by() -> String {
    ORDER_BY_START_TIME.to_string()
}

impl Default for AppointmentFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            start: None,
            end: None,
            order_by: default_order_by(),
        }
    }
}

impl AppointmentFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn between(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn sorted_by_start(&self) -> bool {
        self.order_by == ORDER_BY_START_TIME
    }

    /// In-memory evaluation of the filter predicates
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.user_id.is_none_or(|id| appointment.user_id == id)
            && self.start.is_none_or(|start| appointment.start_time >= start)
            && self.end.is_none_or(|end| appointment.end_time <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn appointment(start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
        Appointment {
            id: 1,
            user_id: 1,
            resource_id: 7,
            start_time: start,
            end_time: end,
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }

    #[test]
    fn test_overlap_is_half_open() {
        let existing = appointment(at(10, 0), at(11, 0));

        assert!(existing.overlaps(at(10, 30), at(11, 30)));
        assert!(existing.overlaps(at(9, 0), at(12, 0)));
        assert!(existing.overlaps(at(10, 15), at(10, 45)));
        assert!(!existing.overlaps(at(11, 0), at(12, 0)));
        assert!(!existing.overlaps(at(9, 0), at(10, 0)));
    }

    #[test]
    fn test_duration_truncates_to_whole_minutes() {
        let mut a = appointment(at(10, 0), at(10, 1));
        a.end_time += chrono::TimeDelta::seconds(59);
        assert_eq!(a.duration_minutes(), 1);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "cancelled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("archived".parse::<AppointmentStatus>().is_err());
        assert_eq!(AppointmentStatus::default().to_string(), "scheduled");
    }

    #[test]
    fn test_filter_defaults_to_start_time_order() {
        let filter: AppointmentFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter, AppointmentFilter::default());
        assert!(filter.sorted_by_start());
    }

    #[test]
    fn test_filter_matches_bounds() {
        let a = appointment(at(10, 0), at(11, 0));

        assert!(AppointmentFilter::for_user(1).matches(&a));
        assert!(!AppointmentFilter::for_user(2).matches(&a));
        assert!(
            AppointmentFilter::default()
                .between(at(10, 0), at(11, 0))
                .matches(&a)
        );
        assert!(
            !AppointmentFilter::default()
                .between(at(10, 1), at(12, 0))
                .matches(&a)
        );
        assert!(
            !AppointmentFilter::default()
                .between(at(9, 0), at(10, 59))
                .matches(&a)
        );
    }
}
