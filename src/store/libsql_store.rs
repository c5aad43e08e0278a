//! libSQL backend — async `Store` implementation.
//!
//! Local file or in-memory databases. `libsql::Connection` is `Send + Sync`
//! and safe for concurrent async use, so one connection is shared.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Database as LibSqlDatabase, Value};
use tracing::info;

use crate::error::StoreError;
use crate::store::traits::{
    GamePlanRecord, NewGamePlan, NewProgress, ProgressRecord, Store, StudentProfile, StudentRecord,
};

/// libSQL store.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("failed to create {}: {e}", parent.display())))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;
        let conn = db.connect().map_err(|e| StoreError::Open(e.to_string()))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;
        let conn = db.connect().map_err(|e| StoreError::Open(e.to_string()))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS students (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    age INTEGER,
                    gender TEXT,
                    belt TEXT,
                    no_gi_level TEXT,
                    weight INTEGER,
                    goals TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS game_plans (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    student TEXT NOT NULL,
                    tournament_name TEXT,
                    division TEXT,
                    weight_class TEXT,
                    opponent_style TEXT,
                    plan TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_game_plans_student ON game_plans(student);

                CREATE TABLE IF NOT EXISTS progress_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    student TEXT NOT NULL,
                    technique TEXT NOT NULL,
                    level TEXT NOT NULL,
                    notes TEXT,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_progress_student ON progress_log(student);",
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn query_err(e: libsql::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn opt_text(v: &Option<String>) -> Value {
    match v {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn opt_int(v: &Option<i64>) -> Value {
    match v {
        Some(n) => Value::Integer(*n),
        None => Value::Null,
    }
}

/// Parse an RFC 3339 timestamp written by this store.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn row_to_student(row: &libsql::Row) -> Result<StudentRecord, libsql::Error> {
    Ok(StudentRecord {
        id: row.get(0)?,
        profile: StudentProfile {
            name: row.get(1)?,
            age: row.get(2).ok(),
            gender: row.get(3).ok(),
            belt: row.get(4).ok(),
            no_gi_level: row.get(5).ok(),
            weight: row.get(6).ok(),
            goals: row.get(7).ok(),
        },
        created_at: parse_datetime(&row.get::<String>(8)?),
    })
}

fn row_to_plan(row: &libsql::Row) -> Result<GamePlanRecord, libsql::Error> {
    Ok(GamePlanRecord {
        id: row.get(0)?,
        student: row.get(1)?,
        tournament_name: row.get(2).ok(),
        division: row.get(3).ok(),
        weight_class: row.get(4).ok(),
        opponent_style: row.get(5).ok(),
        plan: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?),
    })
}

fn row_to_progress(row: &libsql::Row) -> Result<ProgressRecord, libsql::Error> {
    Ok(ProgressRecord {
        id: row.get(0)?,
        student: row.get(1)?,
        technique: row.get(2)?,
        level: row.get(3)?,
        notes: row.get::<String>(4).unwrap_or_default(),
        created_at: parse_datetime(&row.get::<String>(5)?),
    })
}

#[async_trait]
impl Store for LibSqlStore {
    async fn upsert_student(&self, profile: &StudentProfile) -> Result<i64, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM students WHERE name = ?1",
                params![profile.name.clone()],
            )
            .await
            .map_err(query_err)?;

        if let Some(row) = rows.next().await.map_err(query_err)? {
            let id: i64 = row.get(0).map_err(query_err)?;
            self.conn
                .execute(
                    "UPDATE students SET age = ?1, gender = ?2, belt = ?3, no_gi_level = ?4,
                     weight = ?5, goals = ?6 WHERE id = ?7",
                    params![
                        opt_int(&profile.age),
                        opt_text(&profile.gender),
                        opt_text(&profile.belt),
                        opt_text(&profile.no_gi_level),
                        opt_int(&profile.weight),
                        opt_text(&profile.goals),
                        id
                    ],
                )
                .await
                .map_err(query_err)?;
            Ok(id)
        } else {
            self.conn
                .execute(
                    "INSERT INTO students (name, age, gender, belt, no_gi_level, weight, goals, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        profile.name.clone(),
                        opt_int(&profile.age),
                        opt_text(&profile.gender),
                        opt_text(&profile.belt),
                        opt_text(&profile.no_gi_level),
                        opt_int(&profile.weight),
                        opt_text(&profile.goals),
                        Utc::now().to_rfc3339()
                    ],
                )
                .await
                .map_err(query_err)?;
            Ok(self.conn.last_insert_rowid())
        }
    }

    async fn get_student(&self, name: &str) -> Result<Option<StudentRecord>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, age, gender, belt, no_gi_level, weight, goals, created_at
                 FROM students WHERE name = ?1",
                params![name],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_student(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn save_game_plan(&self, plan: &NewGamePlan) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO game_plans (student, tournament_name, division, weight_class,
                 opponent_style, plan, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    plan.student.clone(),
                    opt_text(&plan.tournament_name),
                    opt_text(&plan.division),
                    opt_text(&plan.weight_class),
                    opt_text(&plan.opponent_style),
                    plan.plan.clone(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn game_plans_for(
        &self,
        student: &str,
        limit: usize,
    ) -> Result<Vec<GamePlanRecord>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, student, tournament_name, division, weight_class, opponent_style,
                 plan, created_at FROM game_plans WHERE student = ?1
                 ORDER BY id DESC LIMIT ?2",
                params![student, limit as i64],
            )
            .await
            .map_err(query_err)?;

        let mut plans = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            plans.push(row_to_plan(&row).map_err(query_err)?);
        }
        Ok(plans)
    }

    async fn record_progress(&self, entry: &NewProgress) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO progress_log (student, technique, level, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.student.clone(),
                    entry.technique.clone(),
                    entry.level.clone(),
                    entry.notes.clone(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn progress_for(
        &self,
        student: &str,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, student, technique, level, notes, created_at FROM progress_log
                 WHERE student = ?1 ORDER BY id DESC LIMIT ?2",
                params![student, limit as i64],
            )
            .await
            .map_err(query_err)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            entries.push(row_to_progress(&row).map_err(query_err)?);
        }
        Ok(entries)
    }
}
