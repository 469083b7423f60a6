//! Location repository for database operations

use async_trait::async_trait;
use sqlx::PgPool;

use super::{LocationRepository, RepositoryResult};
use crate::models::{Location, NewLocation};

/// PostgreSQL location repository
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn create(&self, location: &NewLocation) -> RepositoryResult<Location> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, capacity, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, capacity, description
            "#,
        )
        .bind(&location.name)
        .bind(location.capacity)
        .bind(&location.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, name, capacity, description FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, capacity, description
            FROM locations
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn update(&self, location: &Location) -> RepositoryResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET name = $2, capacity = $3, description = $4
            WHERE id = $1
            RETURNING id, name, capacity, description
            "#,
        )
        .bind(location.id)
        .bind(&location.name)
        .bind(location.capacity)
        .bind(&location.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
