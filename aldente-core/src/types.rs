//! Typed recipe model read by the walkthrough and used to validate
//! submissions.
//!
//! Field names are part of the wire format shared by the server and every
//! viewer, so they are pinned with serde attributes. Numbers are kept as
//! [`serde_json::Number`] to avoid rewriting `4` as `4.0`. Stored documents
//! are never rewritten from these types; see
//! [`RecipeDocument`](crate::repository::RecipeDocument).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// The whole persisted document: `{ "recipes": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRepository {
    pub recipes: Vec<Recipe>,
}

impl RecipeRepository {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Look up a recipe by name. Names are not unique on write; the first
    /// match wins.
    pub fn find(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// Steps for a recipe, or an empty slice if the name is unknown.
    pub fn steps_for(&self, name: &str) -> &[Step] {
        self.find(name).map(|r| r.steps.as_slice()).unwrap_or(&[])
    }

    /// Recipe names in stored order, as listed on the landing view.
    pub fn names(&self) -> Vec<&str> {
        self.recipes.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn append(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<Number>,
    /// Ingredient entries are free-form; the viewer renders them as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Value>>,
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_number: u32,
    pub total_steps: u32,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Minutes; absent or zero means the step has no timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_duration: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demonstration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpful_tip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    /// Declared timer length in whole seconds. Negative, non-finite, or
    /// missing durations count as no timer.
    pub fn timer_seconds(&self) -> u64 {
        let minutes = self
            .timer_duration
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0);
        if !minutes.is_finite() || minutes <= 0.0 {
            return 0;
        }
        (minutes * 60.0).round() as u64
    }
}

/// Reasons a recipe is rejected at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeValidationError {
    #[error("recipe name is empty")]
    EmptyName,

    #[error("step at position {position} is numbered {found}")]
    StepNumberMismatch { position: usize, found: u32 },

    #[error("step {step} declares {declared} total steps but the recipe has {actual}")]
    TotalStepsMismatch {
        step: u32,
        declared: u32,
        actual: usize,
    },

    #[error("step {step} has an invalid timer duration")]
    InvalidTimerDuration { step: u32 },
}

impl Recipe {
    /// Check the structural invariants the walkthrough relies on: a
    /// non-blank name, contiguous 1-based step numbers, consistent
    /// `totalSteps`, and non-negative timer durations.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyName);
        }

        let actual = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            let position = index + 1;
            if step.step_number as usize != position {
                return Err(RecipeValidationError::StepNumberMismatch {
                    position,
                    found: step.step_number,
                });
            }
            if step.total_steps as usize != actual {
                return Err(RecipeValidationError::TotalStepsMismatch {
                    step: step.step_number,
                    declared: step.total_steps,
                    actual,
                });
            }
            if let Some(duration) = &step.timer_duration {
                let valid = duration
                    .as_f64()
                    .map(|m| m.is_finite() && m >= 0.0)
                    .unwrap_or(false);
                if !valid {
                    return Err(RecipeValidationError::InvalidTimerDuration {
                        step: step.step_number,
                    });
                }
            }
        }

        Ok(())
    }
}
