//! The subset of each store that survives a restart.
use crate::image::ImageState;
use crate::params::{Dimensions, GenerationParameters, PipelineOptimizations};
use crate::ui::{PanelVisibility, ThemeMode, UiState};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrefs {
    pub dimensions: Dimensions,
    pub inference_steps: u32,
    pub guidance_scale: f32,
    pub pipeline_optimizations: PipelineOptimizations,
    pub base_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiPrefs {
    pub theme: ThemeMode,
    pub panels: PanelVisibility,
    pub reduce_motion: bool,
    pub high_contrast: bool,
    pub text_scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrefs {
    pub brush_size: u32,
    pub show_mask: bool,
    pub preview_zoom: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub generation: GenerationPrefs,
    pub ui: UiPrefs,
    pub image: ImagePrefs,
}

impl GenerationPrefs {
    pub fn capture(params: &GenerationParameters) -> Self {
        Self {
            dimensions: params.dimensions,
            inference_steps: params.inference_steps,
            guidance_scale: params.guidance_scale,
            pipeline_optimizations: params.pipeline_optimizations,
            base_model: params.base_model.clone(),
        }
    }

    pub fn apply(&self, params: &mut GenerationParameters) {
        params.dimensions = self.dimensions;
        params.inference_steps = self.inference_steps;
        params.guidance_scale = if self.guidance_scale.is_finite() {
            self.guidance_scale
        } else {
            GenerationParameters::default().guidance_scale
        };
        params.pipeline_optimizations = self.pipeline_optimizations;
        params.base_model = self.base_model.clone();
    }
}

impl UiPrefs {
    pub fn capture(ui: &UiState) -> Self {
        Self {
            theme: ui.theme,
            panels: ui.panels,
            reduce_motion: ui.reduce_motion,
            high_contrast: ui.high_contrast,
            text_scale: ui.text_scale,
        }
    }

    pub fn apply(&self, ui: &mut UiState) {
        ui.theme = self.theme;
        ui.panels = self.panels;
        ui.reduce_motion = self.reduce_motion;
        ui.high_contrast = self.high_contrast;
        ui.text_scale = self
            .text_scale
            .clamp(crate::ui::MIN_TEXT_SCALE, crate::ui::MAX_TEXT_SCALE);
    }
}

impl ImagePrefs {
    pub fn capture(image: &ImageState) -> Self {
        Self {
            brush_size: image.brush_size,
            show_mask: image.show_mask,
            preview_zoom: image.preview_zoom,
        }
    }

    pub fn apply(&self, image: &mut ImageState) {
        image.brush_size = self
            .brush_size
            .clamp(crate::image::MIN_BRUSH_SIZE, crate::image::MAX_BRUSH_SIZE);
        image.show_mask = self.show_mask;
        image.preview_zoom = self
            .preview_zoom
            .clamp(crate::image::MIN_PREVIEW_ZOOM, crate::image::MAX_PREVIEW_ZOOM);
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            generation: GenerationPrefs::capture(&GenerationParameters::default()),
            ui: UiPrefs::capture(&UiState::default()),
            image: ImagePrefs::capture(&ImageState::default()),
        }
    }
}
