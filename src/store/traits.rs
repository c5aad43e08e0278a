//! The `Store` trait — single async interface for all persistence.
//!
//! Three tables: student profiles (upsert keyed by name), generated game
//! plans, and a progress log. Agents only append; the front-ends read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A student profile as supplied by a front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentProfile {
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub belt: Option<String>,
    pub no_gi_level: Option<String>,
    pub weight: Option<i64>,
    pub goals: Option<String>,
}

/// A stored student row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub created_at: DateTime<Utc>,
}

/// A game plan to persist.
#[derive(Debug, Clone)]
pub struct NewGamePlan {
    pub student: String,
    pub tournament_name: Option<String>,
    pub division: Option<String>,
    pub weight_class: Option<String>,
    pub opponent_style: Option<String>,
    pub plan: String,
}

/// A stored game plan row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlanRecord {
    pub id: i64,
    pub student: String,
    pub tournament_name: Option<String>,
    pub division: Option<String>,
    pub weight_class: Option<String>,
    pub opponent_style: Option<String>,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

/// A progress entry to persist.
#[derive(Debug, Clone)]
pub struct NewProgress {
    pub student: String,
    pub technique: String,
    pub level: String,
    pub notes: String,
}

/// A stored progress row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: i64,
    pub student: String,
    pub technique: String,
    pub level: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic persistence trait.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or update a student profile, keyed by name. Returns the row id.
    async fn upsert_student(&self, profile: &StudentProfile) -> Result<i64, StoreError>;

    /// Look up a student by name.
    async fn get_student(&self, name: &str) -> Result<Option<StudentRecord>, StoreError>;

    /// Save a generated game plan. Returns the row id.
    async fn save_game_plan(&self, plan: &NewGamePlan) -> Result<i64, StoreError>;

    /// Newest-first game plans for a student, up to `limit`.
    async fn game_plans_for(
        &self,
        student: &str,
        limit: usize,
    ) -> Result<Vec<GamePlanRecord>, StoreError>;

    /// Append a progress entry. Returns the row id.
    async fn record_progress(&self, entry: &NewProgress) -> Result<i64, StoreError>;

    /// Newest-first progress entries for a student, up to `limit`.
    async fn progress_for(
        &self,
        student: &str,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>, StoreError>;
}
