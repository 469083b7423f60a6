//! Event repository for database operations

use async_trait::async_trait;
use sqlx::PgPool;

use super::{EventRepository, RepositoryResult};
use crate::models::{Event, NewEvent};

/// PostgreSQL event repository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: &NewEvent) -> RepositoryResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, location_id, start_time, end_time, capacity, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, location_id, start_time, end_time, capacity, description
            "#,
        )
        .bind(&event.title)
        .bind(event.location_id)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.capacity)
        .bind(&event.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, location_id, start_time, end_time, capacity, description
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, location_id, start_time, end_time, capacity, description
            FROM events
            ORDER BY start_time, id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn update(&self, event: &Event) -> RepositoryResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2, location_id = $3, start_time = $4, end_time = $5,
                capacity = $6, description = $7
            WHERE id = $1
            RETURNING id, title, location_id, start_time, end_time, capacity, description
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(event.location_id)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.capacity)
        .bind(&event.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
