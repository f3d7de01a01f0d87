use crate::{AppState, Dimensions, GenerationPhase, OpStatus, PanelVisibility, ThemeMode, Toast};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub prompt: String,
    pub negative_prompt: String,
    pub base_model: String,
    pub dimensions: Dimensions,
    pub inference_steps: u32,
    pub guidance_scale: f32,
    pub seed: Option<u64>,
    pub mode: &'static str,
    pub lora_count: usize,
    pub controlnet_count: usize,
    pub can_generate: bool,
    pub phase: GenerationPhase,
    pub history: Vec<HistoryRowView>,
    pub theme: ThemeMode,
    pub panels: PanelVisibility,
    pub is_loading: bool,
    pub loading_message: String,
    pub toasts: Vec<Toast>,
    pub diagnostics: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRowView {
    pub job_id: String,
    pub prompt: String,
    pub status: OpStatus,
    pub progress: f32,
    pub is_loading: bool,
    pub is_failed: bool,
    pub result_source: Option<String>,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState, dirty: bool) -> Self {
        let params = &state.params;
        Self {
            prompt: params.prompt.clone(),
            negative_prompt: params.negative_prompt.clone().unwrap_or_default(),
            base_model: params.base_model.clone(),
            dimensions: params.dimensions,
            inference_steps: params.inference_steps,
            guidance_scale: params.guidance_scale,
            seed: params.seed,
            mode: params.mode.label(),
            lora_count: params.loras.len(),
            controlnet_count: params.controlnets.len(),
            can_generate: state.can_generate(),
            phase: state.phase,
            history: state
                .history
                .iter()
                .map(|entry| HistoryRowView {
                    job_id: entry.job_id.clone(),
                    prompt: entry.input.prompt.clone(),
                    status: entry.status,
                    progress: entry.progress,
                    is_loading: entry.status.is_active(),
                    is_failed: entry.status.is_failed(),
                    result_source: entry.result.as_ref().map(|r| r.source.clone()),
                })
                .collect(),
            theme: state.ui.theme,
            panels: state.ui.panels,
            is_loading: state.ui.is_loading,
            loading_message: state.ui.loading_message.clone(),
            toasts: state.ui.toasts.clone(),
            diagnostics: state.diagnostics.clone(),
            dirty,
        }
    }
}
