pub mod bmi;
pub mod progress;
pub mod users;
