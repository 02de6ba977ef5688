use std::fmt;
use thiserror::Error;

/// Screen currently shown to the cook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Start,
    Ingredients,
    Steps,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Landing => "landing",
            View::Start => "start",
            View::Ingredients => "ingredients",
            View::Steps => "steps",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    SelectRecipe(String),
    ShowIngredients,
    Back,
    Continue,
    /// Start, or resume a recipe that was already started.
    Start,
    NavigateHome,
    GoLanding,
}

impl NavAction {
    fn label(&self) -> &'static str {
        match self {
            NavAction::SelectRecipe(_) => "select recipe",
            NavAction::ShowIngredients => "show ingredients",
            NavAction::Back => "back",
            NavAction::Continue => "continue",
            NavAction::Start => "start",
            NavAction::NavigateHome => "navigate home",
            NavAction::GoLanding => "go to landing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("cannot {action} from the {from} view")]
    InvalidTransition { from: View, action: &'static str },

    #[error("step {step} does not exist (recipe has {total} steps)")]
    StepOutOfRange { step: usize, total: usize },

    #[error("recipe name is empty")]
    EmptySelection,
}

/// Which view is shown, which recipe is selected, and where in its steps
/// the cook is. Rejected actions leave every field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    view: View,
    selected_recipe: Option<String>,
    has_started_recipe: bool,
    current_step_index: usize,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected_recipe(&self) -> Option<&str> {
        self.selected_recipe.as_deref()
    }

    pub fn has_started_recipe(&self) -> bool {
        self.has_started_recipe
    }

    /// 0-based index into the selected recipe's steps.
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    /// 1-based number of the current step.
    pub fn current_step_number(&self) -> usize {
        self.current_step_index + 1
    }

    pub fn apply(&mut self, action: NavAction) -> Result<View, NavigationError> {
        let next = match (self.view, &action) {
            (View::Landing, NavAction::SelectRecipe(name)) => {
                if name.trim().is_empty() {
                    return Err(NavigationError::EmptySelection);
                }
                self.selected_recipe = Some(name.clone());
                self.has_started_recipe = false;
                self.current_step_index = 0;
                View::Start
            }
            (View::Start, NavAction::ShowIngredients) => View::Ingredients,
            (View::Ingredients, NavAction::Back) => View::Start,
            (View::Ingredients, NavAction::Continue) | (View::Start, NavAction::Start) => {
                self.has_started_recipe = true;
                View::Steps
            }
            (View::Steps, NavAction::NavigateHome) => View::Start,
            (View::Start, NavAction::Back) | (_, NavAction::GoLanding) => {
                self.selected_recipe = None;
                self.has_started_recipe = false;
                self.current_step_index = 0;
                View::Landing
            }
            (from, action) => {
                return Err(NavigationError::InvalidTransition {
                    from,
                    action: action.label(),
                })
            }
        };

        self.view = next;
        Ok(next)
    }

    /// Advance one step, staying on the last step if already there.
    pub fn next_step(&mut self, total_steps: usize) -> Result<usize, NavigationError> {
        self.require_steps_view("next step")?;
        if self.current_step_index + 1 < total_steps {
            self.current_step_index += 1;
        }
        Ok(self.current_step_index)
    }

    /// Go back one step, staying on the first step if already there.
    pub fn previous_step(&mut self) -> Result<usize, NavigationError> {
        self.require_steps_view("previous step")?;
        self.current_step_index = self.current_step_index.saturating_sub(1);
        Ok(self.current_step_index)
    }

    /// Jump to a 1-based step number.
    pub fn jump_to_step(
        &mut self,
        step_number: usize,
        total_steps: usize,
    ) -> Result<usize, NavigationError> {
        self.require_steps_view("jump to step")?;
        if step_number == 0 || step_number > total_steps {
            return Err(NavigationError::StepOutOfRange {
                step: step_number,
                total: total_steps,
            });
        }
        self.current_step_index = step_number - 1;
        Ok(self.current_step_index)
    }

    fn require_steps_view(&self, action: &'static str) -> Result<(), NavigationError> {
        if self.view == View::Steps {
            Ok(())
        } else {
            Err(NavigationError::InvalidTransition {
                from: self.view,
                action,
            })
        }
    }
}
