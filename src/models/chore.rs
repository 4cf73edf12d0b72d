use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Assigned,
    Submitted,
    Approved,
    Rejected,
}

impl AssignmentStatus {
    /// Only submitted work can be reviewed; each assignment reaches a
    /// terminal state exactly once.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, AssignmentStatus::Submitted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chore {
    pub id: Uuid,
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub reward: BigDecimal,
    pub is_recurring: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Chore {
    pub fn new(
        family_id: Uuid,
        title: String,
        description: Option<String>,
        reward: BigDecimal,
        is_recurring: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id,
            title,
            description,
            reward,
            is_recurring,
            created_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChoreAssignment {
    pub id: Uuid,
    pub chore_id: Uuid,
    pub account_id: Uuid,
    pub status: AssignmentStatus,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChoreAssignment {
    pub fn new(chore_id: Uuid, account_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            chore_id,
            account_id,
            status: AssignmentStatus::Assigned,
            submitted_at: None,
            approved_at: None,
            reviewed_by: None,
            created_at: chrono::Utc::now(),
        }
    }
}

// An assignment joined with its chore's title and reward, for review lists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssignmentWithChore {
    pub id: Uuid,
    pub chore_id: Uuid,
    pub account_id: Uuid,
    pub status: AssignmentStatus,
    pub title: String,
    pub reward: BigDecimal,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateChore {
    pub title: String,
    pub description: Option<String>,
    pub reward: BigDecimal,
    #[serde(default)]
    pub is_recurring: bool,
}
