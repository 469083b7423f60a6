//! Aggregates and exports over booked appointments

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use super::ServiceResult;
use crate::export::{self, ExportError};
use crate::models::{Appointment, AppointmentFilter};
use crate::repositories::AppointmentRepository;

/// Reporting service
pub struct ReportingService {
    appointments: Arc<dyn AppointmentRepository>,
    export_dir: PathBuf,
}

impl ReportingService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            appointments,
            export_dir: export_dir.into(),
        }
    }

    /// Minutes the user still has booked, evaluated against the local clock
    pub async fn total_reserved_minutes(&self, user_id: i64) -> ServiceResult<i64> {
        self.total_reserved_minutes_at(user_id, Local::now().naive_local())
            .await
    }

    /// Sum of whole-minute durations of the user's appointments ending after `now`
    pub async fn total_reserved_minutes_at(
        &self,
        user_id: i64,
        now: NaiveDateTime,
    ) -> ServiceResult<i64> {
        let appointments = self
            .appointments
            .list_by_filter(&AppointmentFilter::for_user(user_id))
            .await?;

        Ok(appointments
            .iter()
            .filter(|a| a.end_time > now)
            .map(Appointment::duration_minutes)
            .sum())
    }

    /// Write every stored appointment to a timestamped CSV file
    pub async fn export_all(&self) -> ServiceResult<PathBuf> {
        let appointments = self
            .appointments
            .list_by_filter(&AppointmentFilter {
                order_by: String::new(),
                ..AppointmentFilter::default()
            })
            .await?;

        let dir = self.export_dir.clone();
        let path =
            tokio::task::spawn_blocking(move || export::export_to_tabular(&dir, &appointments))
                .await
                .map_err(|e| ExportError::Io(io::Error::other(e)))??;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, NewAppointment, NewResource, NewUser};
    use crate::repositories::{MemoryStore, ResourceRepository, UserRepository};
    use chrono::{NaiveDate, TimeDelta};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for email in ["ana@example.com", "bruno@example.com"] {
            UserRepository::create(
                &store,
                &NewUser {
                    name: email.to_string(),
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

    async fn insert(store: &MemoryStore, user_id: i64, start: NaiveDateTime, end: NaiveDateTime) {
        AppointmentRepository::create(
            store,
            &NewAppointment {
                user_id,
                resource_id: 1,
                start_time: start,
                end_time: end,
                status: AppointmentStatus::Scheduled,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_reserved_minutes_is_zero_without_appointments() {
        let store = store().await;
        let service = ReportingService::new(Arc::new(store), "unused");

        assert_eq!(
            service
                .total_reserved_minutes_at(1, at(6, 9, 0))
                .await
                .unwrap(),
            0
        );
        assert_eq!(service.total_reserved_minutes(999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reserved_minutes_counts_only_appointments_ending_after_now() {
        let store = store().await;
        // already over
        insert(&store, 1, at(5, 10, 0), at(5, 11, 0)).await;
        // ends exactly now
        insert(&store, 1, at(6, 8, 0), at(6, 9, 0)).await;
        // in progress, counted in full
        insert(&store, 1, at(6, 8, 30), at(6, 9, 30)).await;
        // upcoming, 90 minutes and 59 seconds
        insert(
            &store,
            1,
            at(6, 14, 0),
            at(6, 15, 30) + TimeDelta::seconds(59),
        )
        .await;
        // someone else's
        insert(&store, 2, at(6, 16, 0), at(6, 17, 0)).await;

        let service = ReportingService::new(Arc::new(store), "unused");
        let minutes = service
            .total_reserved_minutes_at(1, at(6, 9, 0))
            .await
            .unwrap();

        assert_eq!(minutes, 60 + 90);
    }

    #[tokio::test]
    async fn test_export_all_writes_every_appointment() {
        let store = store().await;
        insert(&store, 1, at(6, 10, 0), at(6, 11, 0)).await;
        insert(&store, 2, at(6, 9, 0), at(6, 9, 30)).await;

        let dir = tempfile::tempdir().unwrap();
        let service = ReportingService::new(Arc::new(store), dir.path());
        let path = service.export_all().await.unwrap();

        assert!(path.starts_with(dir.path()));
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("appointments_") && file_name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
