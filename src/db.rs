use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{BmiRecord, FocusArea, ProgressRecord, User};
use crate::stats::STATS_WINDOW;

/// Handle to the relational store: three tables, with `bmi_records` and
/// `progress_records` keyed back to `users`. Cascade cleanup is an explicit
/// per-table delete inside the user-deletion transaction.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database, migrated and ready. Used by
    /// the integration tests; a pooled `:memory:` URL would hand every
    /// pool connection its own empty database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id BLOB PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                height_cm REAL NOT NULL,
                fitness_goal TEXT NOT NULL,
                workout_preference TEXT NOT NULL,
                diet_preference TEXT NOT NULL,
                focus_areas TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bmi_records (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id),
                weight_kg REAL NOT NULL,
                height_cm REAL NOT NULL,
                bmi_value REAL NOT NULL,
                category TEXT NOT NULL,
                min_healthy_weight REAL NOT NULL,
                max_healthy_weight REAL NOT NULL,
                calculated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS progress_records (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id),
                date TEXT NOT NULL,
                calories_consumed INTEGER,
                calories_burned INTEGER,
                workout_completed INTEGER NOT NULL DEFAULT 0,
                water_intake INTEGER,
                meals_completed INTEGER,
                current_weight REAL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bmi_records_user \
             ON bmi_records(user_id, calculated_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // users

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO users
                (id, email, name, age, gender, weight_kg, height_cm,
                 fitness_goal, workout_preference, diet_preference,
                 focus_areas, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.age)
        .bind(user.gender.as_str())
        .bind(user.weight_kg)
        .bind(user.height_cm)
        .bind(user.fitness_goal.as_str())
        .bind(user.workout_preference.as_str())
        .bind(user.diet_preference.as_str())
        .bind(encode_focus_areas(&user.focus_areas)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    /// Full replace of the mutable profile fields. `email` and
    /// `created_at` stay as registered.
    pub async fn update_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            UPDATE users SET
                name = $2,
                age = $3,
                gender = $4,
                weight_kg = $5,
                height_cm = $6,
                fitness_goal = $7,
                workout_preference = $8,
                diet_preference = $9,
                focus_areas = $10,
                updated_at = $11
            WHERE id = $1
            ",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.age)
        .bind(user.gender.as_str())
        .bind(user.weight_kg)
        .bind(user.height_cm)
        .bind(user.fitness_goal.as_str())
        .bind(user.workout_preference.as_str())
        .bind(user.diet_preference.as_str())
        .bind(encode_focus_areas(&user.focus_areas)?)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes the user and everything it owns. Returns false when no such
    /// user existed.
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bmi_records WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM progress_records WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // bmi ledger

    pub async fn insert_bmi_record(&self, record: &BmiRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO bmi_records
                (id, user_id, weight_kg, height_cm, bmi_value, category,
                 min_healthy_weight, max_healthy_weight, calculated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.weight_kg)
        .bind(record.height_cm)
        .bind(record.bmi_value)
        .bind(record.category.as_str())
        .bind(record.min_healthy_weight)
        .bind(record.max_healthy_weight)
        .bind(record.calculated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn bmi_history(&self, user_id: Uuid) -> Result<Vec<BmiRecord>, sqlx::Error> {
        sqlx::query(
            "SELECT * FROM bmi_records WHERE user_id = $1 ORDER BY calculated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(bmi_from_row)
        .collect()
    }

    pub async fn latest_bmi(&self, user_id: Uuid) -> Result<Option<BmiRecord>, sqlx::Error> {
        sqlx::query(
            "SELECT * FROM bmi_records WHERE user_id = $1 \
             ORDER BY calculated_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| bmi_from_row(&row))
        .transpose()
    }

    // progress journal

    pub async fn progress_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<ProgressRecord>, sqlx::Error> {
        sqlx::query("SELECT * FROM progress_records WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| progress_from_row(&row))
            .transpose()
    }

    /// Insert-or-merge keyed by (user_id, date). On conflict the stored
    /// `id` and `created_at` are left alone; the caller has already merged
    /// field values into `record`.
    pub async fn save_progress(&self, record: &ProgressRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO progress_records
                (id, user_id, date, calories_consumed, calories_burned,
                 workout_completed, water_intake, meals_completed,
                 current_weight, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, date) DO UPDATE SET
                calories_consumed = excluded.calories_consumed,
                calories_burned = excluded.calories_burned,
                workout_completed = excluded.workout_completed,
                water_intake = excluded.water_intake,
                meals_completed = excluded.meals_completed,
                current_weight = excluded.current_weight,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.date)
        .bind(record.calories_consumed)
        .bind(record.calories_burned)
        .bind(record.workout_completed)
        .bind(record.water_intake)
        .bind(record.meals_completed)
        .bind(record.current_weight)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn progress_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ProgressRecord>, sqlx::Error> {
        sqlx::query("SELECT * FROM progress_records WHERE user_id = $1 ORDER BY date DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(progress_from_row)
            .collect()
    }

    pub async fn progress_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProgressRecord>, sqlx::Error> {
        sqlx::query(
            "SELECT * FROM progress_records \
             WHERE user_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date DESC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(progress_from_row)
        .collect()
    }

    /// The statistics window: newest records by date, capped at the window
    /// size.
    pub async fn recent_progress(&self, user_id: Uuid) -> Result<Vec<ProgressRecord>, sqlx::Error> {
        sqlx::query(
            "SELECT * FROM progress_records WHERE user_id = $1 \
             ORDER BY date DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(STATS_WINDOW as i64)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(progress_from_row)
        .collect()
    }

    /// Lifetime completed-workout count over the user's whole history.
    pub async fn count_completed_workouts(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM progress_records \
             WHERE user_id = $1 AND workout_completed = 1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}

fn encode_focus_areas(areas: &[FocusArea]) -> Result<String, sqlx::Error> {
    serde_json::to_string(areas).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let focus_raw: String = row.try_get("focus_areas")?;
    let focus_areas =
        serde_json::from_str(&focus_raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "focus_areas".to_string(),
            source: Box::new(e),
        })?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: parse_column(row, "gender")?,
        weight_kg: row.try_get("weight_kg")?,
        height_cm: row.try_get("height_cm")?,
        fitness_goal: parse_column(row, "fitness_goal")?,
        workout_preference: parse_column(row, "workout_preference")?,
        diet_preference: parse_column(row, "diet_preference")?,
        focus_areas,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn bmi_from_row(row: &SqliteRow) -> Result<BmiRecord, sqlx::Error> {
    Ok(BmiRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        weight_kg: row.try_get("weight_kg")?,
        height_cm: row.try_get("height_cm")?,
        bmi_value: row.try_get("bmi_value")?,
        category: parse_column(row, "category")?,
        min_healthy_weight: row.try_get("min_healthy_weight")?,
        max_healthy_weight: row.try_get("max_healthy_weight")?,
        calculated_at: row.try_get("calculated_at")?,
    })
}

fn progress_from_row(row: &SqliteRow) -> Result<ProgressRecord, sqlx::Error> {
    Ok(ProgressRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: row.try_get("date")?,
        calories_consumed: row.try_get("calories_consumed")?,
        calories_burned: row.try_get("calories_burned")?,
        workout_completed: row.try_get("workout_completed")?,
        water_intake: row.try_get("water_intake")?,
        meals_completed: row.try_get("meals_completed")?,
        current_weight: row.try_get("current_weight")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
