/// Base model used when nothing else has been chosen.
pub const DEFAULT_BASE_MODEL: &str = "Lykon/dreamshaper-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn merged(self, patch: DimensionsPatch) -> Self {
        Self {
            width: patch.width.unwrap_or(self.width),
            height: patch.height.unwrap_or(self.height),
        }
    }
}

/// Partial update for [`Dimensions`]; `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DimensionsPatch {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Generation-time performance toggles, forwarded to the server verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptimizations {
    pub use_deep_cache: bool,
    pub deep_cache_interval: Option<u32>,
    pub deep_cache_branch_id: Option<u32>,
    pub use_torch_compile: bool,
}

impl PipelineOptimizations {
    fn merged(self, patch: PipelineOptimizationsPatch) -> Self {
        Self {
            use_deep_cache: patch.use_deep_cache.unwrap_or(self.use_deep_cache),
            deep_cache_interval: patch
                .deep_cache_interval
                .unwrap_or(self.deep_cache_interval),
            deep_cache_branch_id: patch
                .deep_cache_branch_id
                .unwrap_or(self.deep_cache_branch_id),
            use_torch_compile: patch.use_torch_compile.unwrap_or(self.use_torch_compile),
        }
    }
}

/// Partial update for [`PipelineOptimizations`].
///
/// Nullable fields use `Some(None)` to clear and `None` to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptimizationsPatch {
    pub use_deep_cache: Option<bool>,
    pub deep_cache_interval: Option<Option<u32>>,
    pub deep_cache_branch_id: Option<Option<u32>>,
    pub use_torch_compile: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoraParams {
    pub model: String,
    pub weight_name: String,
    pub tag: Option<String>,
    pub scale: f32,
}

impl LoraParams {
    pub fn new(model: impl Into<String>, weight_name: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            weight_name: weight_name.into(),
            tag: None,
            scale: 0.8,
        }
    }

    fn merged(self, patch: LoraPatch) -> Self {
        Self {
            model: patch.model.unwrap_or(self.model),
            weight_name: patch.weight_name.unwrap_or(self.weight_name),
            tag: patch.tag.unwrap_or(self.tag),
            scale: patch.scale.unwrap_or(self.scale),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoraPatch {
    pub model: Option<String>,
    pub weight_name: Option<String>,
    pub tag: Option<Option<String>>,
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlNetParams {
    /// Guide image, either a URL or a base64 data URI.
    pub guide_image: String,
    pub preprocess_with: Option<String>,
    pub model: Option<String>,
    pub conditioning_scale: f32,
    pub guidance_start: f32,
    pub guidance_end: f32,
    pub strength: f32,
    pub union_control_mode: u8,
}

impl ControlNetParams {
    pub fn new(guide_image: impl Into<String>) -> Self {
        Self {
            guide_image: guide_image.into(),
            preprocess_with: None,
            model: None,
            conditioning_scale: 0.0,
            guidance_start: 0.0,
            guidance_end: 1.0,
            strength: 0.7,
            // canny / lineart / mlsd
            union_control_mode: 3,
        }
    }

    fn merged(self, patch: ControlNetPatch) -> Self {
        Self {
            guide_image: patch.guide_image.unwrap_or(self.guide_image),
            preprocess_with: patch.preprocess_with.unwrap_or(self.preprocess_with),
            model: patch.model.unwrap_or(self.model),
            conditioning_scale: patch.conditioning_scale.unwrap_or(self.conditioning_scale),
            guidance_start: patch.guidance_start.unwrap_or(self.guidance_start),
            guidance_end: patch.guidance_end.unwrap_or(self.guidance_end),
            strength: patch.strength.unwrap_or(self.strength),
            union_control_mode: patch.union_control_mode.unwrap_or(self.union_control_mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlNetPatch {
    pub guide_image: Option<String>,
    pub preprocess_with: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub conditioning_scale: Option<f32>,
    pub guidance_start: Option<f32>,
    pub guidance_end: Option<f32>,
    pub strength: Option<f32>,
    pub union_control_mode: Option<u8>,
}

/// Which server pipeline a request goes to, fixed when the request is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationMode {
    #[default]
    TextToImage,
    ImageToImage {
        starting_image: String,
    },
    Inpaint {
        starting_image: String,
        mask_image: String,
        use_controlnet_union_inpaint: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToImageParams {
    pub starting_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InpaintParams {
    pub starting_image: String,
    pub mask_image: String,
    pub use_controlnet_union_inpaint: bool,
}

impl GenerationMode {
    /// Builds a mode from optional sub-records. Image-to-image wins over inpaint.
    pub fn resolve(
        image_to_image: Option<ImageToImageParams>,
        inpaint: Option<InpaintParams>,
    ) -> Self {
        match (image_to_image, inpaint) {
            (Some(i2i), _) => Self::ImageToImage {
                starting_image: i2i.starting_image,
            },
            (None, Some(inpaint)) => Self::Inpaint {
                starting_image: inpaint.starting_image,
                mask_image: inpaint.mask_image,
                use_controlnet_union_inpaint: inpaint.use_controlnet_union_inpaint,
            },
            (None, None) => Self::TextToImage,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TextToImage => "text-to-image",
            Self::ImageToImage { .. } => "image-to-image",
            Self::Inpaint { .. } => "inpaint",
        }
    }
}

/// The staged (not yet submitted) generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParameters {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub base_model: String,
    pub dimensions: Dimensions,
    pub inference_steps: u32,
    pub guidance_scale: f32,
    pub seed: Option<u64>,
    pub pipeline_optimizations: PipelineOptimizations,
    pub loras: Vec<LoraParams>,
    pub controlnets: Vec<ControlNetParams>,
    pub mode: GenerationMode,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: Some(String::new()),
            base_model: DEFAULT_BASE_MODEL.to_string(),
            dimensions: Dimensions {
                width: 1024,
                height: 1024,
            },
            inference_steps: 20,
            guidance_scale: 7.5,
            seed: None,
            pipeline_optimizations: PipelineOptimizations::default(),
            loras: Vec::new(),
            controlnets: Vec::new(),
            mode: GenerationMode::TextToImage,
        }
    }
}

/// Parameter store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsMsg {
    SetPrompt(String),
    SetNegativePrompt(String),
    SetDimensions(DimensionsPatch),
    SetInferenceSteps(u32),
    SetGuidanceScale(f32),
    SetSeed(Option<u64>),
    SetBaseModel(String),
    SetPipelineOptimizations(PipelineOptimizationsPatch),
    SetMode(GenerationMode),
    AddLora(LoraParams),
    UpdateLora { index: usize, patch: LoraPatch },
    RemoveLora(usize),
    ClearLoras,
    AddControlNet(ControlNetParams),
    UpdateControlNet { index: usize, patch: ControlNetPatch },
    RemoveControlNet(usize),
    ClearControlNets,
    ResetToDefaults,
}

/// Pure parameter reducer. Total: out-of-range list indices are ignored.
pub fn reduce(mut params: GenerationParameters, msg: ParamsMsg) -> GenerationParameters {
    match msg {
        ParamsMsg::SetPrompt(prompt) => params.prompt = prompt,
        ParamsMsg::SetNegativePrompt(negative) => params.negative_prompt = Some(negative),
        ParamsMsg::SetDimensions(patch) => params.dimensions = params.dimensions.merged(patch),
        ParamsMsg::SetInferenceSteps(steps) => params.inference_steps = steps,
        ParamsMsg::SetGuidanceScale(scale) => params.guidance_scale = scale,
        ParamsMsg::SetSeed(seed) => params.seed = seed,
        ParamsMsg::SetBaseModel(model) => params.base_model = model,
        ParamsMsg::SetPipelineOptimizations(patch) => {
            params.pipeline_optimizations = params.pipeline_optimizations.merged(patch);
        }
        ParamsMsg::SetMode(mode) => params.mode = mode,
        ParamsMsg::AddLora(lora) => params.loras.push(lora),
        ParamsMsg::UpdateLora { index, patch } => {
            if let Some(slot) = params.loras.get_mut(index) {
                *slot = slot.clone().merged(patch);
            }
        }
        ParamsMsg::RemoveLora(index) => {
            if index < params.loras.len() {
                params.loras.remove(index);
            }
        }
        ParamsMsg::ClearLoras => params.loras.clear(),
        ParamsMsg::AddControlNet(controlnet) => params.controlnets.push(controlnet),
        ParamsMsg::UpdateControlNet { index, patch } => {
            if let Some(slot) = params.controlnets.get_mut(index) {
                *slot = slot.clone().merged(patch);
            }
        }
        ParamsMsg::RemoveControlNet(index) => {
            if index < params.controlnets.len() {
                params.controlnets.remove(index);
            }
        }
        ParamsMsg::ClearControlNets => params.controlnets.clear(),
        ParamsMsg::ResetToDefaults => params = GenerationParameters::default(),
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_patch_keeps_unspecified_field() {
        let params = reduce(
            GenerationParameters::default(),
            ParamsMsg::SetDimensions(DimensionsPatch {
                width: Some(512),
                height: None,
            }),
        );
        assert_eq!(
            params.dimensions,
            Dimensions {
                width: 512,
                height: 1024
            }
        );
    }

    #[test]
    fn optimization_patch_can_clear_nullable_fields() {
        let params = reduce(
            GenerationParameters::default(),
            ParamsMsg::SetPipelineOptimizations(PipelineOptimizationsPatch {
                use_deep_cache: Some(true),
                deep_cache_interval: Some(Some(3)),
                ..Default::default()
            }),
        );
        let params = reduce(
            params,
            ParamsMsg::SetPipelineOptimizations(PipelineOptimizationsPatch {
                deep_cache_interval: Some(None),
                ..Default::default()
            }),
        );
        assert!(params.pipeline_optimizations.use_deep_cache);
        assert_eq!(params.pipeline_optimizations.deep_cache_interval, None);
    }

    #[test]
    fn resolve_prefers_image_to_image() {
        let mode = GenerationMode::resolve(
            Some(ImageToImageParams {
                starting_image: "a.png".into(),
            }),
            Some(InpaintParams {
                starting_image: "b.png".into(),
                mask_image: "m.png".into(),
                use_controlnet_union_inpaint: false,
            }),
        );
        assert_eq!(
            mode,
            GenerationMode::ImageToImage {
                starting_image: "a.png".into()
            }
        );
        assert_eq!(GenerationMode::resolve(None, None), GenerationMode::TextToImage);
    }
}
