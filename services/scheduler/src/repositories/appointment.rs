//! Appointment repository for database operations

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{AppointmentRepository, RepositoryResult};
use crate::models::{Appointment, AppointmentFilter, NewAppointment};

const APPOINTMENT_COLUMNS: &str = "id, user_id, resource_id, start_time, end_time, status, notes";

/// PostgreSQL appointment repository
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the SELECT for a listing filter
///
/// Without a recognised `order_by` no ORDER BY clause is emitted.
fn filter_query(filter: &AppointmentFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE TRUE"
    ));

    if let Some(user_id) = filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(start) = filter.start {
        query.push(" AND start_time >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        query.push(" AND end_time <= ").push_bind(end);
    }
    if filter.sorted_by_start() {
        query.push(" ORDER BY start_time");
    }

    query
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn create(&self, appointment: &NewAppointment) -> RepositoryResult<Appointment> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (user_id, resource_id, start_time, end_time, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(appointment.user_id)
        .bind(appointment.resource_id)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn list_by_filter(
        &self,
        filter: &AppointmentFilter,
    ) -> RepositoryResult<Vec<Appointment>> {
        let appointments = filter_query(filter)
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(appointments)
    }

    async fn list_by_resource(&self, resource_id: i64) -> RepositoryResult<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE resource_id = $1"
        ))
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET user_id = $2, resource_id = $3, start_time = $4, end_time = $5,
                status = $6, notes = $7
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(appointment.resource_id)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_filter_query_without_bounds() {
        let filter = AppointmentFilter::default();
        let query = filter_query(&filter);
        assert_eq!(
            query.sql(),
            "SELECT id, user_id, resource_id, start_time, end_time, status, notes \
             FROM appointments WHERE TRUE ORDER BY start_time"
        );
    }

    #[test]
    fn test_filter_query_with_all_bounds_and_unknown_order() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let filter = AppointmentFilter {
            user_id: Some(1),
            start: day.and_hms_opt(0, 0, 0),
            end: day.and_hms_micro_opt(23, 59, 59, 999_999),
            order_by: "status".to_string(),
        };

        let query = filter_query(&filter);
        assert_eq!(
            query.sql(),
            "SELECT id, user_id, resource_id, start_time, end_time, status, notes \
             FROM appointments WHERE TRUE AND user_id = $1 AND start_time >= $2 AND end_time <= $3"
        );
    }
}
