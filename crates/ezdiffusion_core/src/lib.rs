//! ezdiffusion core: pure client state (parameter, history, UI and image
//! stores) and the reducer that drives the generation lifecycle.
mod effect;
mod history;
mod image;
mod msg;
mod params;
mod prefs;
mod state;
mod ui;
mod update;
mod view_model;

pub use effect::Effect;
pub use history::{add_pending_item, GenerationResult, HistoryEntry, OpStatus, PENDING_JOB_ID};
pub use image::{
    ImageMsg, ImageRef, ImageSource, ImageState, MaskRef, MAX_BRUSH_SIZE, MAX_PREVIEW_ZOOM,
    MIN_BRUSH_SIZE, MIN_PREVIEW_ZOOM,
};
pub use msg::{GenerationCompletion, Msg};
pub use params::{
    ControlNetParams, ControlNetPatch, Dimensions, DimensionsPatch, GenerationMode,
    GenerationParameters, ImageToImageParams, InpaintParams, LoraParams, LoraPatch, ParamsMsg,
    PipelineOptimizations, PipelineOptimizationsPatch, DEFAULT_BASE_MODEL,
};
pub use prefs::{GenerationPrefs, ImagePrefs, Preferences, UiPrefs};
pub use state::{AppState, GenerationPhase, HISTORY_PAGE_LENGTH};
pub use ui::{
    Modal, ModalKind, Orientation, Panel, PanelVisibility, SafeAreaInsets, SafeAreaInsetsPatch,
    ScreenSize, ThemeMode, Toast, ToastId, ToastKind, ToastRequest, UiMsg, UiState,
    MAX_TEXT_SCALE, MIN_TEXT_SCALE,
};
pub use update::update;
pub use view_model::{AppViewModel, HistoryRowView};
