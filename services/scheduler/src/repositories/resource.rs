//! Resource repository for database operations

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepositoryResult, ResourceRepository};
use crate::models::{NewResource, Resource};

/// PostgreSQL resource repository
#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn create(&self, resource: &NewResource) -> RepositoryResult<Resource> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (name, resource_type)
            VALUES ($1, $2)
            RETURNING id, name, resource_type, availability
            "#,
        )
        .bind(&resource.name)
        .bind(&resource.resource_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(resource)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>(
            "SELECT id, name, resource_type, availability FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resource)
    }

    async fn list(&self, skip: i64, limit: i64) -> RepositoryResult<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT id, name, resource_type, availability
            FROM resources
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn update(&self, resource: &Resource) -> RepositoryResult<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET name = $2, resource_type = $3, availability = $4
            WHERE id = $1
            RETURNING id, name, resource_type, availability
            "#,
        )
        .bind(resource.id)
        .bind(&resource.name)
        .bind(&resource.resource_type)
        .bind(resource.availability)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resource)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
