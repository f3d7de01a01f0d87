use ezdiffusion_core::{
    update, AppState, ControlNetParams, ControlNetPatch, Dimensions, DimensionsPatch, Effect,
    GenerationMode, GenerationParameters, LoraParams, LoraPatch, Msg, ParamsMsg,
    PipelineOptimizationsPatch,
};
use pretty_assertions::assert_eq;

fn params(state: AppState, msg: ParamsMsg) -> AppState {
    update(state, Msg::Params(msg)).0
}

#[test]
fn setting_width_keeps_height() {
    let state = params(
        AppState::new(),
        ParamsMsg::SetDimensions(DimensionsPatch {
            height: Some(768),
            width: None,
        }),
    );
    let state = params(
        state,
        ParamsMsg::SetDimensions(DimensionsPatch {
            width: Some(640),
            height: None,
        }),
    );

    assert_eq!(
        state.params().dimensions,
        Dimensions {
            width: 640,
            height: 768
        }
    );
}

#[test]
fn optimization_patch_merges() {
    let state = params(
        AppState::new(),
        ParamsMsg::SetPipelineOptimizations(PipelineOptimizationsPatch {
            use_torch_compile: Some(true),
            ..Default::default()
        }),
    );
    let state = params(
        state,
        ParamsMsg::SetPipelineOptimizations(PipelineOptimizationsPatch {
            use_deep_cache: Some(true),
            deep_cache_interval: Some(Some(3)),
            deep_cache_branch_id: Some(Some(0)),
            ..Default::default()
        }),
    );

    let opts = state.params().pipeline_optimizations;
    assert!(opts.use_torch_compile);
    assert!(opts.use_deep_cache);
    assert_eq!(opts.deep_cache_interval, Some(3));
    assert_eq!(opts.deep_cache_branch_id, Some(0));
}

#[test]
fn reset_restores_literal_defaults_after_any_history() {
    let msgs = vec![
        ParamsMsg::SetPrompt("castle".to_string()),
        ParamsMsg::SetNegativePrompt("blurry".to_string()),
        ParamsMsg::SetBaseModel("stabilityai/sdxl".to_string()),
        ParamsMsg::SetSeed(Some(42)),
        ParamsMsg::SetInferenceSteps(50),
        ParamsMsg::SetGuidanceScale(12.0),
        ParamsMsg::AddLora(LoraParams::new("some/lora", "lora.safetensors")),
        ParamsMsg::AddControlNet(ControlNetParams::new("data:image/png;base64,AAAA")),
        ParamsMsg::SetMode(GenerationMode::ImageToImage {
            starting_image: "https://example.com/a.png".to_string(),
        }),
    ];
    let state = msgs.into_iter().fold(AppState::new(), params);
    assert_ne!(state.params(), &GenerationParameters::default());

    let state = params(state, ParamsMsg::ResetToDefaults);
    let defaults = state.params();

    assert_eq!(defaults, &GenerationParameters::default());
    assert_eq!(defaults.prompt, "");
    assert_eq!(defaults.negative_prompt.as_deref(), Some(""));
    assert_eq!(defaults.base_model, "Lykon/dreamshaper-8");
    assert_eq!(
        defaults.dimensions,
        Dimensions {
            width: 1024,
            height: 1024
        }
    );
    assert_eq!(defaults.inference_steps, 20);
    assert_eq!(defaults.guidance_scale, 7.5);
    assert_eq!(defaults.seed, None);
    assert!(defaults.loras.is_empty());
    assert!(defaults.controlnets.is_empty());
    assert_eq!(defaults.mode, GenerationMode::TextToImage);
}

#[test]
fn lora_list_operations() {
    let state = params(
        AppState::new(),
        ParamsMsg::AddLora(LoraParams::new("a/lora", "a.safetensors")),
    );
    let state = params(state, ParamsMsg::AddLora(LoraParams::new("b/lora", "b.safetensors")));
    let state = params(
        state,
        ParamsMsg::UpdateLora {
            index: 1,
            patch: LoraPatch {
                scale: Some(0.5),
                ..Default::default()
            },
        },
    );

    let loras = &state.params().loras;
    assert_eq!(loras.len(), 2);
    assert_eq!(loras[1].model, "b/lora");
    assert_eq!(loras[1].scale, 0.5);
    assert_eq!(loras[0].scale, 0.8);

    let state = params(state, ParamsMsg::RemoveLora(0));
    assert_eq!(state.params().loras[0].model, "b/lora");

    let state = params(state, ParamsMsg::ClearLoras);
    assert!(state.params().loras.is_empty());
}

#[test]
fn out_of_range_modifier_edits_are_ignored() {
    let state = params(
        AppState::new(),
        ParamsMsg::AddControlNet(ControlNetParams::new("https://example.com/edge.png")),
    );
    let before = state.params().clone();

    let state = params(
        state,
        ParamsMsg::UpdateControlNet {
            index: 3,
            patch: ControlNetPatch {
                strength: Some(0.1),
                ..Default::default()
            },
        },
    );
    let state = params(state, ParamsMsg::RemoveControlNet(7));
    let state = params(state, ParamsMsg::RemoveLora(0));

    assert_eq!(state.params(), &before);
}

#[test]
fn controlnet_update_merges_fields() {
    let state = params(
        AppState::new(),
        ParamsMsg::AddControlNet(ControlNetParams::new("https://example.com/edge.png")),
    );
    let state = params(
        state,
        ParamsMsg::UpdateControlNet {
            index: 0,
            patch: ControlNetPatch {
                conditioning_scale: Some(0.9),
                preprocess_with: Some(Some("canny".to_string())),
                ..Default::default()
            },
        },
    );

    let cn = &state.params().controlnets[0];
    assert_eq!(cn.guide_image, "https://example.com/edge.png");
    assert_eq!(cn.conditioning_scale, 0.9);
    assert_eq!(cn.preprocess_with.as_deref(), Some("canny"));
    assert_eq!(cn.strength, 0.7);

    let state = params(state, ParamsMsg::ClearControlNets);
    assert!(state.params().controlnets.is_empty());
}

#[test]
fn prompt_edits_do_not_persist_but_dimensions_do() {
    let (state, effects) = update(
        AppState::new(),
        Msg::Params(ParamsMsg::SetPrompt("a cat".to_string())),
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::Params(ParamsMsg::SetDimensions(DimensionsPatch {
            width: Some(512),
            height: None,
        })),
    );
    assert_eq!(effects, vec![Effect::PersistPreferences(state.preferences())]);
    assert_eq!(state.preferences().generation.dimensions.width, 512);
}

#[test]
fn can_generate_requires_prompt_and_positive_dimensions() {
    let state = AppState::new();
    assert!(!state.can_generate());

    let state = params(state, ParamsMsg::SetPrompt("   ".to_string()));
    assert!(!state.can_generate());

    let state = params(state, ParamsMsg::SetPrompt("a cat".to_string()));
    assert!(state.can_generate());

    let state = params(
        state,
        ParamsMsg::SetDimensions(DimensionsPatch {
            width: Some(0),
            height: None,
        }),
    );
    assert!(!state.can_generate());
}
