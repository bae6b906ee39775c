use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::bmi::BmiAssessment;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, BmiRecord};

#[derive(Debug, Deserialize, Validate)]
pub struct BmiInput {
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height: f64,
}

pub fn routes(db: Database) -> Router {
    Router::new()
        .route("/bmi/calculate/:user_id", post(calculate_bmi))
        .route("/bmi/user/:user_id", get(bmi_history))
        .route("/bmi/latest/:user_id", get(latest_bmi))
        .route("/bmi/quick-calculate", post(quick_calculate))
        .with_state(db)
}

/// Derives and persists a ledger entry at full precision.
async fn calculate_bmi(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<BmiInput>,
) -> Result<(StatusCode, Json<ApiResponse<BmiRecord>>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let assessment = BmiAssessment::compute(body.weight, body.height);
    let record = BmiRecord {
        id: Uuid::new_v4(),
        user_id,
        weight_kg: body.weight,
        height_cm: body.height,
        bmi_value: assessment.bmi_value,
        category: assessment.category,
        min_healthy_weight: assessment.min_healthy_weight,
        max_healthy_weight: assessment.max_healthy_weight,
        calculated_at: Utc::now(),
    };
    db.insert_bmi_record(&record).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "BMI calculated successfully",
            record,
        )),
    ))
}

/// Newest-first ledger for the user; an empty ledger is a success.
async fn bmi_history(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<BmiRecord>>>> {
    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let history = db.bmi_history(user_id).await?;
    Ok(Json(ApiResponse::ok(history)))
}

async fn latest_bmi(
    State(db): State<Database>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BmiRecord>>> {
    db.user_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    // An absent ledger is distinct from an absent user.
    let record = db
        .latest_bmi(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No BMI records found for user".into()))?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Stateless variant: same formulas, one-decimal rounding, nothing stored.
async fn quick_calculate(
    Json(body): Json<BmiInput>,
) -> Result<Json<ApiResponse<BmiAssessment>>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let assessment = BmiAssessment::compute(body.weight, body.height).rounded();
    Ok(Json(ApiResponse::ok(assessment)))
}
