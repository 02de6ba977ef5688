use thiserror::Error;

use super::navigation::{NavAction, NavigationError, Navigator, View};
use super::timers::{TimerBoard, TimerError, TimerState};
use crate::types::{Recipe, RecipeRepository, Step};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready(RecipeRepository),
    /// Fetch failed; the message is shown to the cook as-is.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("recipes are not loaded yet")]
    NotLoaded,

    #[error("no recipe named {0:?}")]
    UnknownRecipe(String),
}

/// Everything a viewer needs to walk a cook through a recipe: the loaded
/// repository, navigation, and per-step timers.
///
/// Timers are derived from the selected recipe and rebuilt from scratch
/// whenever the selection or the repository changes.
#[derive(Debug, Clone, Default)]
pub struct WalkthroughSession {
    load: LoadState,
    repository_version: u64,
    navigator: Navigator,
    timers: TimerBoard,
}

impl WalkthroughSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose repository is already available.
    pub fn with_repository(repository: RecipeRepository) -> Self {
        let mut session = Self::new();
        session.finish_loading(Ok(repository));
        session
    }

    pub fn begin_loading(&mut self) {
        self.load = LoadState::Loading;
    }

    /// Record the result of a repository fetch.
    pub fn finish_loading(&mut self, result: Result<RecipeRepository, String>) {
        match result {
            Ok(repository) => {
                self.load = LoadState::Ready(repository);
                self.repository_version += 1;
                self.refresh_timers();
            }
            Err(message) => {
                tracing::warn!(error = %message, "failed to load recipes");
                self.load = LoadState::Failed(message);
            }
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn repository(&self) -> Option<&RecipeRepository> {
        match &self.load {
            LoadState::Ready(repository) => Some(repository),
            _ => None,
        }
    }

    /// Incremented every time a repository finishes loading.
    pub fn repository_version(&self) -> u64 {
        self.repository_version
    }

    pub fn recipe_names(&self) -> Vec<&str> {
        self.repository().map(|r| r.names()).unwrap_or_default()
    }

    pub fn view(&self) -> View {
        self.navigator.view()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        let name = self.navigator.selected_recipe()?;
        self.repository()?.find(name)
    }

    pub fn steps(&self) -> &[Step] {
        self.selected_recipe()
            .map(|r| r.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn step_titles(&self) -> Vec<&str> {
        self.steps().iter().map(|s| s.title.as_str()).collect()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps().get(self.navigator.current_step_index())
    }

    pub fn current_step_number(&self) -> u32 {
        self.navigator.current_step_number() as u32
    }

    pub fn current_timer(&self) -> Option<&TimerState> {
        self.timers.get(self.current_step_number())
    }

    pub fn timers(&self) -> &TimerBoard {
        &self.timers
    }

    pub fn select_recipe(&mut self, name: &str) -> Result<View, SessionError> {
        let repository = self.repository().ok_or(SessionError::NotLoaded)?;
        if repository.find(name).is_none() {
            return Err(SessionError::UnknownRecipe(name.to_string()));
        }
        let view = self
            .navigator
            .apply(NavAction::SelectRecipe(name.to_string()))?;
        self.refresh_timers();
        tracing::debug!(recipe = name, timers = self.timers.len(), "recipe selected");
        Ok(view)
    }

    pub fn show_ingredients(&mut self) -> Result<View, SessionError> {
        Ok(self.navigator.apply(NavAction::ShowIngredients)?)
    }

    pub fn back(&mut self) -> Result<View, SessionError> {
        let view = self.navigator.apply(NavAction::Back)?;
        if view == View::Landing {
            self.timers.clear();
        }
        Ok(view)
    }

    pub fn continue_to_steps(&mut self) -> Result<View, SessionError> {
        Ok(self.navigator.apply(NavAction::Continue)?)
    }

    /// Start the recipe, or resume it if it was started before.
    pub fn start(&mut self) -> Result<View, SessionError> {
        Ok(self.navigator.apply(NavAction::Start)?)
    }

    pub fn navigate_home(&mut self) -> Result<View, SessionError> {
        Ok(self.navigator.apply(NavAction::NavigateHome)?)
    }

    /// Return to the recipe list, dropping the selection and its timers.
    pub fn go_landing(&mut self) -> View {
        // GoLanding is accepted from every view.
        let view = self
            .navigator
            .apply(NavAction::GoLanding)
            .unwrap_or(View::Landing);
        self.timers.clear();
        view
    }

    pub fn next_step(&mut self) -> Result<u32, SessionError> {
        let total = self.steps().len();
        let index = self.navigator.next_step(total)?;
        Ok(index as u32 + 1)
    }

    pub fn previous_step(&mut self) -> Result<u32, SessionError> {
        let index = self.navigator.previous_step()?;
        Ok(index as u32 + 1)
    }

    pub fn jump_to_step(&mut self, step_number: u32) -> Result<u32, SessionError> {
        let total = self.steps().len();
        let index = self.navigator.jump_to_step(step_number as usize, total)?;
        Ok(index as u32 + 1)
    }

    pub fn pause_timer(&mut self, step_number: u32) -> Result<TimerState, SessionError> {
        Ok(self.timers.pause(step_number)?)
    }

    pub fn resume_timer(&mut self, step_number: u32) -> Result<TimerState, SessionError> {
        Ok(self.timers.resume(step_number)?)
    }

    pub fn set_timer_remaining(
        &mut self,
        step_number: u32,
        seconds: u64,
    ) -> Result<TimerState, SessionError> {
        Ok(self.timers.set_remaining(step_number, seconds)?)
    }

    /// Rebuild timers from the selected recipe. Does nothing until a
    /// repository is loaded and a recipe is selected.
    fn refresh_timers(&mut self) {
        let Some(name) = self.navigator.selected_recipe() else {
            return;
        };
        let Some(repository) = self.repository() else {
            return;
        };
        let steps = repository.steps_for(name).to_vec();
        self.timers.reset(&steps);
    }
}
