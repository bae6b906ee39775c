use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::ParseEnumError;

/// WHO-style band a BMI value falls into. Lower bounds are inclusive:
/// 18.5 is NORMAL, 25.0 is OVERWEIGHT, 30.0 is OBESE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn for_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "UNDERWEIGHT",
            BmiCategory::Normal => "NORMAL",
            BmiCategory::Overweight => "OVERWEIGHT",
            BmiCategory::Obese => "OBESE",
        }
    }
}

impl FromStr for BmiCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNDERWEIGHT" => Ok(BmiCategory::Underweight),
            "NORMAL" => Ok(BmiCategory::Normal),
            "OVERWEIGHT" => Ok(BmiCategory::Overweight),
            "OBESE" => Ok(BmiCategory::Obese),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

/// The four derived values for a (weight, height) pair. `compute` keeps
/// full precision; persisted records store it as-is, while the stateless
/// quick-calculate path sends `rounded()` to the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiAssessment {
    pub bmi_value: f64,
    pub category: BmiCategory,
    pub min_healthy_weight: f64,
    pub max_healthy_weight: f64,
}

impl BmiAssessment {
    /// weight in kg, height in cm.
    pub fn compute(weight_kg: f64, height_cm: f64) -> Self {
        let height_m = height_cm / 100.0;
        let bmi = weight_kg / (height_m * height_m);
        Self {
            bmi_value: bmi,
            category: BmiCategory::for_bmi(bmi),
            min_healthy_weight: 18.5 * height_m * height_m,
            max_healthy_weight: 24.9 * height_m * height_m,
        }
    }

    /// Presentation form: every numeric field to one decimal place.
    pub fn rounded(self) -> Self {
        Self {
            bmi_value: round_tenths(self.bmi_value),
            category: self.category,
            min_healthy_weight: round_tenths(self.min_healthy_weight),
            max_healthy_weight: round_tenths(self.max_healthy_weight),
        }
    }
}

/// Round-half-up on the tenths digit.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_assessment_at_70kg_175cm() {
        let rounded = BmiAssessment::compute(70.0, 175.0).rounded();
        assert_eq!(rounded.bmi_value, 22.9);
        assert_eq!(rounded.category, BmiCategory::Normal);
        assert_eq!(rounded.min_healthy_weight, 56.7);
        assert_eq!(rounded.max_healthy_weight, 76.3);
    }

    #[test]
    fn underweight_and_obese_examples() {
        let light = BmiAssessment::compute(45.0, 160.0).rounded();
        assert_eq!(light.bmi_value, 17.6);
        assert_eq!(light.category, BmiCategory::Underweight);

        let heavy = BmiAssessment::compute(95.0, 170.0).rounded();
        assert_eq!(heavy.bmi_value, 32.9);
        assert_eq!(heavy.category, BmiCategory::Obese);
    }

    #[test]
    fn category_lower_bounds_are_inclusive() {
        assert_eq!(BmiCategory::for_bmi(18.499), BmiCategory::Underweight);
        assert_eq!(BmiCategory::for_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(24.999), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(29.999), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn healthy_band_is_ordered_and_scales_with_height_squared() {
        for height_cm in [50.0, 120.0, 175.0, 300.0] {
            let a = BmiAssessment::compute(70.0, height_cm);
            assert!(a.min_healthy_weight < a.max_healthy_weight);

            let height_m = height_cm / 100.0;
            let sq = height_m * height_m;
            assert!((a.min_healthy_weight - 18.5 * sq).abs() < 1e-9);
            assert!((a.max_healthy_weight - 24.9 * sq).abs() < 1e-9);
        }
    }

    #[test]
    fn stored_precision_is_not_rounded() {
        let full = BmiAssessment::compute(70.0, 175.0);
        assert!((full.bmi_value - 70.0 / 3.0625).abs() < 1e-12);
        assert_ne!(full.bmi_value, full.rounded().bmi_value);
    }

    #[test]
    fn tenths_rounding_is_half_up() {
        assert_eq!(round_tenths(22.85), 22.9);
        assert_eq!(round_tenths(22.84), 22.8);
        assert_eq!(round_tenths(17.578125), 17.6);
    }
}
