//! Location model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Place where an event can happen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub description: Option<String>,
}

/// New location creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_capacity() -> i32 {
    1
}
