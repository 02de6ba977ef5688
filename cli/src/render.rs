//! Plain-text rendering of recipes and walkthrough screens.

use aldente_core::{Recipe, Step, TimerState};
use serde_json::Value;
use std::fmt::Write;

/// `mm:ss`, with hours folded into the minutes.
pub fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Ingredients are free-form: strings print as-is, objects as `amount unit
/// name` when those fields exist, anything else as compact JSON.
pub fn ingredient(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let parts: Vec<String> = ["amount", "unit", "name", "item"]
                .iter()
                .filter_map(|k| map.get(*k))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                value.to_string()
            } else {
                parts.join(" ")
            }
        }
        other => other.to_string(),
    }
}

pub fn ingredients(recipe: &Recipe) -> String {
    let mut out = String::new();
    match recipe.ingredients.as_deref() {
        Some(list) if !list.is_empty() => {
            for item in list {
                let _ = writeln!(out, "  - {}", ingredient(item));
            }
        }
        _ => out.push_str("  (no ingredients listed)\n"),
    }
    out
}

pub fn step(step: &Step, timer: Option<&TimerState>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Step {} of {}: {}",
        step.step_number, step.total_steps, step.title
    );
    let _ = writeln!(out, "  {}", step.description);
    if let Some(tip) = &step.helpful_tip {
        let _ = writeln!(out, "  Tip: {}", tip);
    }
    if let Some(demo) = &step.demonstration {
        let _ = writeln!(out, "  Demo: {}", demo);
    }
    if let Some(timer) = timer.filter(|t| t.is_active) {
        let state = if timer.is_paused { "paused" } else { "running" };
        let _ = writeln!(out, "  Timer: {} ({})", clock(timer.time_remaining), state);
    }
    out
}

pub fn recipe(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", recipe.name);
    if let Some(serving) = &recipe.serving_size {
        let _ = writeln!(out, "Serves {}", serving);
    }
    out.push_str("\nIngredients:\n");
    out.push_str(&ingredients(recipe));
    out.push_str("\nSteps:\n");
    for s in &recipe.steps {
        let duration = match s.timer_seconds() {
            0 => String::new(),
            secs => format!(" [{}]", clock(secs)),
        };
        let _ = writeln!(out, "  {}. {}{}", s.step_number, s.title, duration);
    }
    out
}
