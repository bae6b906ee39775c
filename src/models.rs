use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::bmi::BmiCategory;

/// Raised when a stored enum column holds a value outside its domain.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseEnumError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitnessGoal {
    LoseWeight,
    BuildMuscle,
    StayFit,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "LOSE_WEIGHT",
            FitnessGoal::BuildMuscle => "BUILD_MUSCLE",
            FitnessGoal::StayFit => "STAY_FIT",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOSE_WEIGHT" => Ok(FitnessGoal::LoseWeight),
            "BUILD_MUSCLE" => Ok(FitnessGoal::BuildMuscle),
            "STAY_FIT" => Ok(FitnessGoal::StayFit),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutPreference {
    Home,
    Gym,
    Both,
}

impl WorkoutPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutPreference::Home => "HOME",
            WorkoutPreference::Gym => "GYM",
            WorkoutPreference::Both => "BOTH",
        }
    }
}

impl FromStr for WorkoutPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOME" => Ok(WorkoutPreference::Home),
            "GYM" => Ok(WorkoutPreference::Gym),
            "BOTH" => Ok(WorkoutPreference::Both),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DietPreference {
    Veg,
    NonVeg,
    Vegan,
}

impl DietPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            DietPreference::Veg => "VEG",
            DietPreference::NonVeg => "NON_VEG",
            DietPreference::Vegan => "VEGAN",
        }
    }
}

impl FromStr for DietPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VEG" => Ok(DietPreference::Veg),
            "NON_VEG" => Ok(DietPreference::NonVeg),
            "VEGAN" => Ok(DietPreference::Vegan),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusArea {
    Abs,
    Arms,
    Chest,
    Back,
    Legs,
    FullBody,
}

/// A registered account plus the physical and preference attributes every
/// other record hangs off.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub fitness_goal: FitnessGoal,
    pub workout_preference: WorkoutPreference,
    pub diet_preference: DietPreference,
    pub focus_areas: Vec<FocusArea>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of one BMI calculation. Inputs are captured at
/// calculation time and are independent of the user's current profile;
/// derived fields are stored at full precision. Corrections get a new
/// record rather than mutating an old one.
#[derive(Debug, Clone, Serialize)]
pub struct BmiRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi_value: f64,
    pub category: BmiCategory,
    pub min_healthy_weight: f64,
    pub max_healthy_weight: f64,
    pub calculated_at: DateTime<Utc>,
}

/// One user's journal entry for one calendar day. A single row exists per
/// (user_id, date); writes for the same day merge into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub calories_consumed: Option<i32>,
    pub calories_burned: Option<i32>,
    pub workout_completed: bool,
    pub water_intake: Option<i32>,
    pub meals_completed: Option<i32>,
    pub current_weight: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a progress upsert may supply; anything left `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressUpdate {
    pub calories_consumed: Option<i32>,
    pub calories_burned: Option<i32>,
    pub workout_completed: Option<bool>,
    pub water_intake: Option<i32>,
    pub meals_completed: Option<i32>,
    pub current_weight: Option<f64>,
}

impl ProgressRecord {
    /// Default-valued entry for a day with no stored record yet: zero
    /// counts, workout not completed, no weight reading.
    pub fn fresh(user_id: Uuid, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            calories_consumed: Some(0),
            calories_burned: Some(0),
            workout_completed: false,
            water_intake: Some(0),
            meals_completed: Some(0),
            current_weight: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges only the supplied fields over this record and stamps the
    /// write time. `created_at` is never touched.
    pub fn apply(&mut self, update: &ProgressUpdate, now: DateTime<Utc>) {
        if update.calories_consumed.is_some() {
            self.calories_consumed = update.calories_consumed;
        }
        if update.calories_burned.is_some() {
            self.calories_burned = update.calories_burned;
        }
        if let Some(completed) = update.workout_completed {
            self.workout_completed = completed;
        }
        if update.water_intake.is_some() {
            self.water_intake = update.water_intake;
        }
        if update.meals_completed.is_some() {
            self.meals_completed = update.meals_completed;
        }
        if update.current_weight.is_some() {
            self.current_weight = update.current_weight;
        }
        self.updated_at = now;
    }
}

/// Uniform response envelope: success flag, optional human-readable
/// message, payload when there is one.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
