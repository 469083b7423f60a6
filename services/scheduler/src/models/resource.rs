//! Bookable resource model (room, equipment, practitioner...)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Resource entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub resource_type: String,
    pub availability: bool,
}

/// New resource creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub resource_type: String,
}
