use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, ProgressRecord, ProgressUpdate};
use crate::stats::{summarize, ProgressStats};

#[derive(Debug, Deserialize)]
pub struct ProgressEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub fields: ProgressUpdate,
}

#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn routes(db: Database) -> Router {
    Router::new()
        .route("/progress/update/:user_id", post(update_progress))
        .route("/progress/user/:user_id", get(progress_for_user))
        .route("/progress/user/:user_id/today", get(progress_for_today))
        .route("/progress/user/:user_id/range", get(progress_for_range))
        .route("/progress/user/:user_id/stats", get(progress_stats))
        .with_state(db)
}

/// Find-or-create the day's record, merge only the supplied fields over
/// it, and write the result back. One row per (user, date).
async fn update_progress(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ProgressEntry>,
) -> Result<Json<ApiResponse<ProgressRecord>>> {
    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let now = Utc::now();
    let mut record = db
        .progress_by_date(user_id, body.date)
        .await?
        .unwrap_or_else(|| ProgressRecord::fresh(user_id, body.date, now));

    record.apply(&body.fields, now);
    db.save_progress(&record).await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Progress updated successfully",
        record,
    )))
}

async fn progress_for_user(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ProgressRecord>>>> {
    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let records = db.progress_for_user(user_id).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// Today's stored record, or a transient default one when nothing has
/// been logged yet. The transient record is not persisted.
async fn progress_for_today(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProgressRecord>>> {
    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let now = Utc::now();
    let today = now.date_naive();
    let record = db
        .progress_by_date(user_id, today)
        .await?
        .unwrap_or_else(|| ProgressRecord::fresh(user_id, today, now));

    Ok(Json(ApiResponse::ok(record)))
}

/// Inclusive bounds. No rows match an empty or reversed interval, which
/// is a success with an empty list, not an error. No user-existence
/// check here or on the stats endpoint: an unknown user just has no
/// records.
async fn progress_for_range(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
    Query(range): Query<DateRange>,
) -> Result<Json<ApiResponse<Vec<ProgressRecord>>>> {
    let records = db.progress_in_range(user_id, range.start, range.end).await?;
    Ok(Json(ApiResponse::ok(records)))
}

async fn progress_stats(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProgressStats>>> {
    let recent = db.recent_progress(user_id).await?;
    let lifetime = db.count_completed_workouts(user_id).await?;
    Ok(Json(ApiResponse::ok(summarize(&recent, lifetime))))
}
