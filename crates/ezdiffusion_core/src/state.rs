use crate::history::HistoryEntry;
use crate::image::ImageState;
use crate::params::GenerationParameters;
use crate::prefs::{GenerationPrefs, ImagePrefs, Preferences, UiPrefs};
use crate::ui::UiState;
use crate::view_model::AppViewModel;

/// Number of history entries requested after a successful generation.
pub const HISTORY_PAGE_LENGTH: usize = 10;

/// Lifecycle of outstanding generation requests. Settles only when none remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Submitting,
    Refreshing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) params: GenerationParameters,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) ui: UiState,
    pub(crate) image: ImageState,
    pub(crate) phase: GenerationPhase,
    /// Submissions sent to the engine that have not reported back yet.
    pub(crate) in_flight: usize,
    pub(crate) diagnostics: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn image(&self) -> &ImageState {
        &self.image
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn generations_in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn can_generate(&self) -> bool {
        !self.params.prompt.trim().is_empty() && self.params.dimensions.is_positive()
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            generation: GenerationPrefs::capture(&self.params),
            ui: UiPrefs::capture(&self.ui),
            image: ImagePrefs::capture(&self.image),
        }
    }

    pub(crate) fn restore_preferences(&mut self, prefs: &Preferences) {
        prefs.generation.apply(&mut self.params);
        prefs.ui.apply(&mut self.ui);
        prefs.image.apply(&mut self.image);
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self, self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
