use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use fittrack_backend::app;
use fittrack_backend::db::Database;
use fittrack_backend::models::{
    DietPreference, FitnessGoal, FocusArea, Gender, User, WorkoutPreference,
};

async fn test_app() -> (Router, Database) {
    let db = Database::in_memory().await.unwrap();
    (app(db.clone()), db)
}

async fn seed_user(db: &Database, email: &str) -> Uuid {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: "Ravi".to_string(),
        age: 34,
        gender: Gender::Male,
        weight_kg: 78.0,
        height_cm: 180.0,
        fitness_goal: FitnessGoal::LoseWeight,
        workout_preference: WorkoutPreference::Gym,
        diet_preference: DietPreference::NonVeg,
        focus_areas: vec![FocusArea::Chest],
        created_at: now,
        updated_at: now,
    };
    db.insert_user(&user).await.unwrap();
    user.id
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn today_without_a_logged_entry_is_not_persisted() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db, "today@example.com").await;

    let (status, body) = get(app, &format!("/progress/user/{user_id}/today")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let today = Utc::now().date_naive();
    assert_eq!(body["data"]["date"], json!(today.format("%Y-%m-%d").to_string()));
    assert_eq!(body["data"]["calories_consumed"], json!(0));
    assert_eq!(body["data"]["workout_completed"], json!(false));
    assert_eq!(body["data"]["current_weight"], Value::Null);

    // The transient record must not have been written through.
    assert!(db.progress_by_date(user_id, today).await.unwrap().is_none());
    assert!(db.progress_for_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reversed_date_range_is_an_empty_success() {
    let (app, db) = test_app().await;
    let user_id = seed_user(&db, "range@example.com").await;

    let (_, logged) = post_json(
        app.clone(),
        &format!("/progress/update/{user_id}"),
        json!({ "date": "2024-06-01", "calories_consumed": 450 }),
    )
    .await;
    assert_eq!(logged["success"], json!(true));

    // start after end matches nothing; that is not invalid input.
    let (status, body) = get(
        app.clone(),
        &format!("/progress/user/{user_id}/range?start=2024-06-05&end=2024-06-01"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!([]));

    // The same bounds the right way round find the record.
    let (status, body) = get(
        app,
        &format!("/progress/user/{user_id}/range?start=2024-06-01&end=2024-06-05"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn range_and_stats_for_an_unknown_user_succeed_empty() {
    let (app, _db) = test_app().await;
    let missing = Uuid::new_v4();

    let (status, body) = get(
        app.clone(),
        &format!("/progress/user/{missing}/range?start=2024-06-01&end=2024-06-05"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = get(app, &format!("/progress/user/{missing}/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total_completed_workouts"], json!(0));
    assert_eq!(body["data"]["avg_calories_consumed"], json!(0));
    assert_eq!(body["data"]["avg_calories_burned"], json!(0));
    assert_eq!(body["data"]["workout_streak_last_30_days"], json!(0));
}

#[tokio::test]
async fn out_of_range_profile_fields_are_rejected() {
    let (app, db) = test_app().await;

    let registration = |age: i64, height: f64| {
        json!({
            "email": "new@example.com",
            "name": "Mina",
            "age": age,
            "gender": "FEMALE",
            "weight_kg": 55.0,
            "height_cm": height,
            "fitness_goal": "STAY_FIT",
            "workout_preference": "BOTH",
            "diet_preference": "VEGAN",
            "focus_areas": ["FULL_BODY"]
        })
    };

    let (status, body) = post_json(app.clone(), "/users/register", registration(0, 162.0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("age"));

    let (status, body) = post_json(app.clone(), "/users/register", registration(31, 20.0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    // Nothing was persisted by the rejected attempts.
    assert!(db.user_by_email("new@example.com").await.unwrap().is_none());

    let (status, body) = post_json(app, "/users/register", registration(31, 162.0)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
}
