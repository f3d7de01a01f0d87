use std::path::Path;

use ezd_logging::{ezd_error, ezd_info, ezd_warn};
use ezdiffusion_client::StateFileStore;
use ezdiffusion_core::{
    Dimensions, GenerationPrefs, ImagePrefs, PanelVisibility, PipelineOptimizations, Preferences,
    ThemeMode, UiPrefs,
};
use serde::{Deserialize, Serialize};

const PREFS_FILENAME: &str = ".ezdiffusion_prefs.ron";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedTheme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedGeneration {
    width: u32,
    height: u32,
    inference_steps: u32,
    guidance_scale: f32,
    use_deep_cache: bool,
    deep_cache_interval: Option<u32>,
    deep_cache_branch_id: Option<u32>,
    use_torch_compile: bool,
    base_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedUi {
    theme: PersistedTheme,
    input_panel: bool,
    output_panel: bool,
    control_panel: bool,
    modifier_panel: bool,
    reduce_motion: bool,
    high_contrast: bool,
    text_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedImage {
    brush_size: u32,
    show_mask: bool,
    preview_zoom: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPrefs {
    generation: PersistedGeneration,
    ui: PersistedUi,
    image: PersistedImage,
}

impl From<&Preferences> for PersistedPrefs {
    fn from(prefs: &Preferences) -> Self {
        let generation = &prefs.generation;
        let optimizations = &generation.pipeline_optimizations;
        let ui = &prefs.ui;
        Self {
            generation: PersistedGeneration {
                width: generation.dimensions.width,
                height: generation.dimensions.height,
                inference_steps: generation.inference_steps,
                guidance_scale: generation.guidance_scale,
                use_deep_cache: optimizations.use_deep_cache,
                deep_cache_interval: optimizations.deep_cache_interval,
                deep_cache_branch_id: optimizations.deep_cache_branch_id,
                use_torch_compile: optimizations.use_torch_compile,
                base_model: generation.base_model.clone(),
            },
            ui: PersistedUi {
                theme: match ui.theme {
                    ThemeMode::Light => PersistedTheme::Light,
                    ThemeMode::Dark => PersistedTheme::Dark,
                    ThemeMode::System => PersistedTheme::System,
                },
                input_panel: ui.panels.input,
                output_panel: ui.panels.output,
                control_panel: ui.panels.control,
                modifier_panel: ui.panels.modifier,
                reduce_motion: ui.reduce_motion,
                high_contrast: ui.high_contrast,
                text_scale: ui.text_scale,
            },
            image: PersistedImage {
                brush_size: prefs.image.brush_size,
                show_mask: prefs.image.show_mask,
                preview_zoom: prefs.image.preview_zoom,
            },
        }
    }
}

impl From<PersistedPrefs> for Preferences {
    fn from(stored: PersistedPrefs) -> Self {
        let generation = stored.generation;
        let ui = stored.ui;
        Self {
            generation: GenerationPrefs {
                dimensions: Dimensions {
                    width: generation.width,
                    height: generation.height,
                },
                inference_steps: generation.inference_steps,
                guidance_scale: generation.guidance_scale,
                pipeline_optimizations: PipelineOptimizations {
                    use_deep_cache: generation.use_deep_cache,
                    deep_cache_interval: generation.deep_cache_interval,
                    deep_cache_branch_id: generation.deep_cache_branch_id,
                    use_torch_compile: generation.use_torch_compile,
                },
                base_model: generation.base_model,
            },
            ui: UiPrefs {
                theme: match ui.theme {
                    PersistedTheme::Light => ThemeMode::Light,
                    PersistedTheme::Dark => ThemeMode::Dark,
                    PersistedTheme::System => ThemeMode::System,
                },
                panels: PanelVisibility {
                    input: ui.input_panel,
                    output: ui.output_panel,
                    control: ui.control_panel,
                    modifier: ui.modifier_panel,
                },
                reduce_motion: ui.reduce_motion,
                high_contrast: ui.high_contrast,
                text_scale: ui.text_scale,
            },
            image: ImagePrefs {
                brush_size: stored.image.brush_size,
                show_mask: stored.image.show_mask,
                preview_zoom: stored.image.preview_zoom,
            },
        }
    }
}

/// Returns `None` when nothing usable is on disk; callers keep the defaults.
pub(crate) fn load_preferences(state_dir: &Path) -> Option<Preferences> {
    let store = StateFileStore::new(state_dir);
    let path = store.path_of(PREFS_FILENAME);
    let content = match store.read(PREFS_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            ezd_warn!("Failed to read preferences from {:?}: {}", path, err);
            return None;
        }
    };

    let stored: PersistedPrefs = match ron::from_str(&content) {
        Ok(stored) => stored,
        Err(err) => {
            ezd_warn!("Failed to parse preferences from {:?}: {}", path, err);
            return None;
        }
    };

    ezd_info!("Loaded preferences from {:?}", path);
    Some(stored.into())
}

pub(crate) fn save_preferences(state_dir: &Path, prefs: &Preferences) {
    let stored = PersistedPrefs::from(prefs);
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&stored, pretty) {
        Ok(text) => text,
        Err(err) => {
            ezd_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    let store = StateFileStore::new(state_dir);
    if let Err(err) = store.write(PREFS_FILENAME, &content) {
        ezd_error!("Failed to write preferences to {:?}: {}", state_dir, err);
    }
}
