//! JSON shapes exchanged with the generation server and their mapping onto
//! the core types.
use ezdiffusion_core::{
    ControlNetParams, Dimensions, GenerationMode, GenerationParameters, GenerationResult,
    HistoryEntry, ImageToImageParams, InpaintParams, LoraParams, OpStatus, PipelineOptimizations,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ApiError, GenerationAccepted, MemoryInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GenerateRequest {
    pub input: WireParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WireOptimizations {
    pub use_deepcache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepcache_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepcache_branch_id: Option<u32>,
    pub use_torch_compile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireImageToImage {
    pub starting_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireInpaint {
    pub starting_image: String,
    pub mask_image: String,
    #[serde(default)]
    pub use_controlnet_union_inpaint: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireLora {
    pub model: String,
    pub weight_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default = "default_lora_scale")]
    pub scale: f32,
}

fn default_lora_scale() -> f32 {
    0.8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireControlNet {
    pub guide_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocess_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub controlnet_conditioning_scale: f32,
    #[serde(default)]
    pub control_guidance_start: f32,
    #[serde(default = "default_guidance_end")]
    pub control_guidance_end: f32,
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(default = "default_union_mode")]
    pub union_control_mode: u8,
}

fn default_guidance_end() -> f32 {
    1.0
}

fn default_strength() -> f32 {
    0.7
}

fn default_union_mode() -> u8 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireParams {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<WireDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub pipeline_optimizations: WireOptimizations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_to_image: Option<WireImageToImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inpaint: Option<WireInpaint>,
    #[serde(default)]
    pub loras: Vec<WireLora>,
    #[serde(default)]
    pub controlnets: Vec<WireControlNet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum WireStatus {
    Pending,
    Queued,
    InProgress,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireResult {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireGenerationResponse {
    pub job_id: String,
    pub status: WireStatus,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub input: Option<WireParams>,
    #[serde(default)]
    pub result: Option<WireResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireHistoryResponse {
    #[serde(default)]
    pub results: Vec<WireGenerationResponse>,
}

impl From<&GenerationParameters> for WireParams {
    fn from(params: &GenerationParameters) -> Self {
        let (image_to_image, inpaint) = match &params.mode {
            GenerationMode::TextToImage => (None, None),
            GenerationMode::ImageToImage { starting_image } => (
                Some(WireImageToImage {
                    starting_image: starting_image.clone(),
                }),
                None,
            ),
            GenerationMode::Inpaint {
                starting_image,
                mask_image,
                use_controlnet_union_inpaint,
            } => (
                None,
                Some(WireInpaint {
                    starting_image: starting_image.clone(),
                    mask_image: mask_image.clone(),
                    use_controlnet_union_inpaint: *use_controlnet_union_inpaint,
                }),
            ),
        };
        let opts = params.pipeline_optimizations;

        Self {
            prompt: params.prompt.clone(),
            negative_prompt: params
                .negative_prompt
                .clone()
                .filter(|negative| !negative.is_empty()),
            base_model: Some(params.base_model.clone()),
            dimensions: Some(WireDimensions {
                width: params.dimensions.width,
                height: params.dimensions.height,
            }),
            inference_steps: Some(params.inference_steps),
            guidance_scale: Some(params.guidance_scale),
            seed: params.seed,
            pipeline_optimizations: WireOptimizations {
                use_deepcache: opts.use_deep_cache,
                deepcache_interval: opts.deep_cache_interval,
                deepcache_branch_id: opts.deep_cache_branch_id,
                use_torch_compile: opts.use_torch_compile,
            },
            image_to_image,
            inpaint,
            loras: params
                .loras
                .iter()
                .map(|lora| WireLora {
                    model: lora.model.clone(),
                    weight_name: lora.weight_name.clone(),
                    tag: lora.tag.clone(),
                    scale: lora.scale,
                })
                .collect(),
            controlnets: params
                .controlnets
                .iter()
                .map(|cn| WireControlNet {
                    guide_image: cn.guide_image.clone(),
                    preprocess_with: cn.preprocess_with.clone(),
                    model: cn.model.clone(),
                    controlnet_conditioning_scale: cn.conditioning_scale,
                    control_guidance_start: cn.guidance_start,
                    control_guidance_end: cn.guidance_end,
                    strength: cn.strength,
                    union_control_mode: cn.union_control_mode,
                })
                .collect(),
        }
    }
}

impl From<WireParams> for GenerationParameters {
    fn from(wire: WireParams) -> Self {
        let defaults = GenerationParameters::default();
        let mode = GenerationMode::resolve(
            wire.image_to_image.map(|i2i| ImageToImageParams {
                starting_image: i2i.starting_image,
            }),
            wire.inpaint.map(|inpaint| InpaintParams {
                starting_image: inpaint.starting_image,
                mask_image: inpaint.mask_image,
                use_controlnet_union_inpaint: inpaint.use_controlnet_union_inpaint,
            }),
        );
        let opts = wire.pipeline_optimizations;

        Self {
            prompt: wire.prompt,
            negative_prompt: wire.negative_prompt,
            base_model: wire.base_model.unwrap_or(defaults.base_model),
            dimensions: wire
                .dimensions
                .map(|d| Dimensions {
                    width: d.width,
                    height: d.height,
                })
                .unwrap_or(defaults.dimensions),
            inference_steps: wire.inference_steps.unwrap_or(defaults.inference_steps),
            guidance_scale: wire.guidance_scale.unwrap_or(defaults.guidance_scale),
            seed: wire.seed,
            pipeline_optimizations: PipelineOptimizations {
                use_deep_cache: opts.use_deepcache,
                deep_cache_interval: opts.deepcache_interval,
                deep_cache_branch_id: opts.deepcache_branch_id,
                use_torch_compile: opts.use_torch_compile,
            },
            loras: wire
                .loras
                .into_iter()
                .map(|lora| LoraParams {
                    model: lora.model,
                    weight_name: lora.weight_name,
                    tag: lora.tag,
                    scale: lora.scale,
                })
                .collect(),
            controlnets: wire
                .controlnets
                .into_iter()
                .map(|cn| ControlNetParams {
                    guide_image: cn.guide_image,
                    preprocess_with: cn.preprocess_with,
                    model: cn.model,
                    conditioning_scale: cn.controlnet_conditioning_scale,
                    guidance_start: cn.control_guidance_start,
                    guidance_end: cn.control_guidance_end,
                    strength: cn.strength,
                    union_control_mode: cn.union_control_mode,
                })
                .collect(),
            mode,
        }
    }
}

impl From<WireStatus> for OpStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Pending => OpStatus::Pending,
            WireStatus::Queued => OpStatus::Queued,
            WireStatus::InProgress => OpStatus::InProgress,
            WireStatus::Success => OpStatus::Success,
            WireStatus::Failure => OpStatus::Failure,
        }
    }
}

impl From<WireGenerationResponse> for GenerationAccepted {
    fn from(wire: WireGenerationResponse) -> Self {
        Self {
            job_id: wire.job_id,
            status: wire.status.into(),
            result: wire.result.map(|r| GenerationResult { source: r.source }),
        }
    }
}

impl From<WireGenerationResponse> for HistoryEntry {
    fn from(wire: WireGenerationResponse) -> Self {
        Self {
            job_id: wire.job_id,
            input: wire.input.map(Into::into).unwrap_or_default(),
            status: wire.status.into(),
            progress: wire.progress.unwrap_or(0.0).clamp(0.0, 1.0),
            result: wire.result.map(|r| GenerationResult { source: r.source }),
        }
    }
}

impl TryFrom<Value> for MemoryInfo {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(ApiError::new("malformed memory info: expected a JSON object"));
        };
        let device = match fields.remove("device") {
            Some(Value::String(device)) => Some(device),
            Some(other) => Some(other.to_string()),
            None => None,
        };
        let allocated_mb = take_number(&mut fields, "allocated_mb");
        let max_allocated_mb = take_number(&mut fields, "max_allocated_mb");
        let reserved_mb = take_number(&mut fields, "reserved_mb");

        Ok(Self {
            device,
            allocated_mb,
            max_allocated_mb,
            reserved_mb,
            extra: fields,
        })
    }
}

fn take_number(fields: &mut Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key).and_then(Value::as_f64) {
        Some(number) => {
            fields.remove(key);
            Some(number)
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_uses_server_field_names() {
        let params = GenerationParameters {
            prompt: "a cat".into(),
            seed: Some(7),
            mode: GenerationMode::Inpaint {
                starting_image: "data:image/png;base64,AAAA".into(),
                mask_image: "data:image/png;base64,BBBB".into(),
                use_controlnet_union_inpaint: true,
            },
            ..GenerationParameters::default()
        };
        let body = serde_json::to_value(GenerateRequest {
            input: WireParams::from(&params),
        })
        .unwrap();

        assert_eq!(body["input"]["prompt"], "a cat");
        assert_eq!(body["input"]["dimensions"], json!({"width": 1024, "height": 1024}));
        assert_eq!(body["input"]["inference_steps"], 20);
        assert_eq!(body["input"]["seed"], 7);
        assert_eq!(body["input"]["base_model"], "Lykon/dreamshaper-8");
        assert_eq!(body["input"]["inpaint"]["use_controlnet_union_inpaint"], true);
        assert!(body["input"].get("image_to_image").is_none());
        assert!(body["input"].get("negative_prompt").is_none());
    }

    #[test]
    fn history_entry_with_both_references_reads_as_image_to_image() {
        let wire: WireGenerationResponse = serde_json::from_value(json!({
            "job_id": "abc",
            "status": "IN_PROGRESS",
            "progress": 0.4,
            "input": {
                "prompt": "a fox",
                "image_to_image": {"starting_image": "a.png"},
                "inpaint": {"starting_image": "b.png", "mask_image": "m.png"}
            }
        }))
        .unwrap();
        let entry = HistoryEntry::from(wire);

        assert_eq!(entry.status, OpStatus::InProgress);
        assert_eq!(entry.progress, 0.4);
        assert_eq!(
            entry.input.mode,
            GenerationMode::ImageToImage {
                starting_image: "a.png".into()
            }
        );
        assert_eq!(entry.input.inference_steps, 20);
    }

    #[test]
    fn memory_info_keeps_unknown_keys() {
        let info = MemoryInfo::try_from(json!({
            "device": "cuda",
            "allocated_mb": 1024.5,
            "driver": "550.54"
        }))
        .unwrap();
        assert_eq!(info.device.as_deref(), Some("cuda"));
        assert_eq!(info.allocated_mb, Some(1024.5));
        assert_eq!(info.extra.get("driver"), Some(&json!("550.54")));
        assert!(MemoryInfo::try_from(json!("text")).is_err());
    }
}
