use super::models::{Goal, Task};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

type GoalRow = (i64, String, String, i64, String);
type TaskRow = (i64, i64, String, i64, String);

/// SQLite database holding goals and their tasks
pub struct GoalDatabase {
    pool: SqlitePool,
}

impl GoalDatabase {
    /// Open (creating if needed) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Use ?mode=rwc to create the database file if it doesn't exist
        let database_url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .context("Failed to connect to database")?;

        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and throwaway runs
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is its own database, so pin exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    /// Create tables and indexes
    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                goal_text TEXT NOT NULL,
                complexity_score INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                goal_id INTEGER NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
                task_text TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_goals_user_id ON goals(user_id)")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_goals_created_at ON goals(created_at DESC)")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_goal_id ON tasks(goal_id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Drop every table and recreate the schema
    pub async fn reset(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS tasks")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS goals")
            .execute(&self.pool)
            .await?;

        Self::migrate(&self.pool).await
    }

    /// Insert a goal and its tasks in one transaction
    pub async fn insert_goal(
        &self,
        user_id: &str,
        goal_text: &str,
        complexity_score: i64,
        task_texts: &[String],
    ) -> Result<Goal> {
        // Stored at microsecond precision
        let created_at = Utc::now().trunc_subsecs(6);
        let created_at_str = format_timestamp(&created_at);

        let mut tx = self.pool.begin().await?;

        let goal_id = sqlx::query(
            r#"
            INSERT INTO goals (user_id, goal_text, complexity_score, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(goal_text)
        .bind(complexity_score)
        .bind(&created_at_str)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let mut tasks = Vec::with_capacity(task_texts.len());
        for (index, task_text) in task_texts.iter().enumerate() {
            let order = index as i64 + 1;
            let task_id = sqlx::query(
                r#"
                INSERT INTO tasks (goal_id, task_text, position, created_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(goal_id)
            .bind(task_text)
            .bind(order)
            .bind(&created_at_str)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            tasks.push(Task {
                id: task_id,
                goal_id,
                task_text: task_text.clone(),
                order,
                created_at,
            });
        }

        tx.commit().await?;

        Ok(Goal {
            id: goal_id,
            user_id: user_id.to_string(),
            goal_text: goal_text.to_string(),
            complexity_score,
            created_at,
            tasks,
        })
    }

    /// List a user's goals, newest first
    pub async fn list_goals(&self, user_id: &str, skip: i64, limit: i64) -> Result<Vec<Goal>> {
        let rows = sqlx::query_as::<_, GoalRow>(
            r#"
            SELECT id, user_id, goal_text, complexity_score, created_at
            FROM goals
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let task_rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT t.id, t.goal_id, t.task_text, t.position, t.created_at
            FROM tasks t
            JOIN goals g ON g.id = t.goal_id
            WHERE g.user_id = ?
            ORDER BY t.goal_id, t.position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut tasks_by_goal: HashMap<i64, Vec<Task>> = HashMap::new();
        for row in task_rows {
            let task = task_from_row(row)?;
            tasks_by_goal.entry(task.goal_id).or_default().push(task);
        }

        rows.into_iter()
            .map(|row| {
                let tasks = tasks_by_goal.remove(&row.0).unwrap_or_default();
                goal_from_row(row, tasks)
            })
            .collect()
    }

    /// Get a goal by ID, only if it belongs to `user_id`
    pub async fn get_goal(&self, user_id: &str, id: i64) -> Result<Option<Goal>> {
        let row = sqlx::query_as::<_, GoalRow>(
            r#"
            SELECT id, user_id, goal_text, complexity_score, created_at
            FROM goals
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tasks = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, goal_id, task_text, position, created_at
            FROM tasks
            WHERE goal_id = ?
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(task_from_row)
        .collect::<Result<Vec<_>>>()?;

        goal_from_row(row, tasks).map(Some)
    }

    /// Delete a goal and its tasks. Returns false when no owned goal matched.
    pub async fn delete_goal(&self, user_id: &str, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query("DELETE FROM tasks WHERE goal_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(deleted > 0)
    }

    #[cfg(test)]
    async fn count_tasks(&self, goal_id: i64) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks WHERE goal_id = ?")
            .bind(goal_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    // Fixed-width so lexical order matches chronological order
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn goal_from_row(row: GoalRow, tasks: Vec<Task>) -> Result<Goal> {
    Ok(Goal {
        id: row.0,
        user_id: row.1,
        goal_text: row.2,
        complexity_score: row.3,
        created_at: row.4.parse().context("Invalid goal created_at")?,
        tasks,
    })
}

fn task_from_row(row: TaskRow) -> Result<Task> {
    Ok(Task {
        id: row.0,
        goal_id: row.1,
        task_text: row.2,
        order: row.3,
        created_at: row.4.parse().context("Invalid task created_at")?,
    })
}
