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

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{
    ApiResponse, DietPreference, FitnessGoal, FocusArea, Gender, User, WorkoutPreference,
};

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 120))]
    pub age: i32,
    pub gender: Gender,
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    pub fitness_goal: FitnessGoal,
    pub workout_preference: WorkoutPreference,
    pub diet_preference: DietPreference,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
}

/// Profile update is a full replace of every mutable field; email stays
/// as registered.
#[derive(Debug, Deserialize, Validate)]
pub struct UserProfile {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 120))]
    pub age: i32,
    pub gender: Gender,
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    pub fitness_goal: FitnessGoal,
    pub workout_preference: WorkoutPreference,
    pub diet_preference: DietPreference,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
}

pub fn routes(db: Database) -> Router {
    Router::new()
        .route("/users/register", post(register_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/email/:email", get(get_user_by_email))
        .with_state(db)
}

async fn register_user(
    State(db): State<Database>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if db.email_exists(&body.email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: body.email,
        name: body.name,
        age: body.age,
        gender: body.gender,
        weight_kg: body.weight_kg,
        height_cm: body.height_cm,
        fitness_goal: body.fitness_goal,
        workout_preference: body.workout_preference,
        diet_preference: body.diet_preference,
        focus_areas: body.focus_areas,
        created_at: now,
        updated_at: now,
    };
    db.insert_user(&user).await?;

    tracing::info!("👤 Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "User registered successfully",
            user,
        )),
    ))
}

async fn get_user(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>> {
    let user = db
        .user_by_id(id)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Json(ApiResponse::ok(user)))
}

async fn get_user_by_email(
    State(db): State<Database>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let user = db
        .user_by_email(&email)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Json(ApiResponse::ok(user)))
}

async fn update_user(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(body): Json<UserProfile>,
) -> Result<Json<ApiResponse<User>>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = db
        .user_by_id(id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    user.name = body.name;
    user.age = body.age;
    user.gender = body.gender;
    user.weight_kg = body.weight_kg;
    user.height_cm = body.height_cm;
    user.fitness_goal = body.fitness_goal;
    user.workout_preference = body.workout_preference;
    user.diet_preference = body.diet_preference;
    user.focus_areas = body.focus_areas;
    user.updated_at = Utc::now();

    db.update_user(&user).await?;
    Ok(Json(ApiResponse::ok_with_message(
        "User updated successfully",
        user,
    )))
}

async fn delete_user(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    if !db.delete_user(id).await? {
        return Err(AppError::user_not_found());
    }
    tracing::info!("🗑️ Deleted user {}", id);
    Ok(Json(ApiResponse::message_only("User deleted successfully")))
}
