use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A tradable instrument. Tickers are stored uppercase; rows are created by
// admin seeding or cached on first lookup of an unknown ticker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stock {
    pub id: Uuid,
    pub ticker: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Stock {
    pub fn new(ticker: String, name: String, logo_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.to_uppercase(),
            name,
            logo_url,
            is_active: true,
            created_at: chrono::Utc::now(),
        }
    }
}
