//! Line-oriented front end: turns typed commands into reducer messages and
//! renders the view model as plain text.

use std::fmt::Write as _;

use ezdiffusion_core::{
    AppState, AppViewModel, ControlNetParams, ControlNetPatch, DimensionsPatch, GenerationMode,
    GenerationPhase, ImageMsg, ImageRef, ImageSource, LoraParams, LoraPatch, MaskRef, Msg, Panel,
    ParamsMsg, PipelineOptimizationsPatch, ThemeMode, ToastKind, UiMsg,
};

pub const HELP: &str = "\
commands:
  prompt <text>                 set the prompt
  negative [text]               set the negative prompt (empty clears)
  size <w>x<h>                  set output dimensions
  steps <n>                     set inference steps
  guidance <f>                  set guidance scale
  seed <n>|random               fix or clear the seed
  model <name>                  set the base model
  deepcache on|off [interval] [branch]
  compile on|off                toggle torch.compile
  lora add <model> <weights> [scale] | scale <i> <f> | rm <i> | clear
  controlnet add <image> [model] | scale <i> <f> | rm <i> | clear
  image <uri>|output|clear      set the starting image
  mask <uri>|clear              set the inpaint mask
  output <n>                    show history entry n as the output image
  generate                      submit a generation
  history                       reload the first history page
  memory                        query server memory usage
  theme light|dark|system|toggle
  panel input|output|control|modifier [on|off]
  brush <n>                     set mask brush size
  zoom <f>                      set preview zoom
  reset [params]                restore defaults
  show | help | quit";

/// What the app loop should do with one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Show,
    Help,
    Quit,
}

/// Parses one line against the current state. `Err` carries a hint for the user.
pub fn interpret(line: &str, state: &AppState) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let msgs = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(Command::Dispatch(Vec::new())),
        "help" | "?" => return Ok(Command::Help),
        "show" => return Ok(Command::Show),
        "quit" | "exit" => return Ok(Command::Quit),
        "prompt" => vec![params(ParamsMsg::SetPrompt(rest.to_string()))],
        "negative" => vec![params(ParamsMsg::SetNegativePrompt(rest.to_string()))],
        "size" => vec![params(ParamsMsg::SetDimensions(parse_size(rest)?))],
        "steps" => {
            let steps = parse_positive(single(&args, "steps <n>")?, "steps")?;
            vec![params(ParamsMsg::SetInferenceSteps(steps))]
        }
        "guidance" => {
            let scale = parse_float(single(&args, "guidance <f>")?, "guidance")?;
            if scale < 0.0 {
                return Err("guidance must not be negative".to_string());
            }
            vec![params(ParamsMsg::SetGuidanceScale(scale))]
        }
        "seed" => {
            let raw = single(&args, "seed <n>|random")?;
            let seed = if raw.eq_ignore_ascii_case("random") {
                None
            } else {
                Some(
                    raw.parse::<u64>()
                        .map_err(|_| format!("seed must be a whole number, got {raw:?}"))?,
                )
            };
            vec![params(ParamsMsg::SetSeed(seed))]
        }
        "model" => {
            if rest.is_empty() {
                return Err("usage: model <name>".to_string());
            }
            vec![params(ParamsMsg::SetBaseModel(rest.to_string()))]
        }
        "deepcache" => vec![params(ParamsMsg::SetPipelineOptimizations(parse_deepcache(
            &args,
        )?))],
        "compile" => {
            let on = parse_switch(single(&args, "compile on|off")?)?;
            vec![params(ParamsMsg::SetPipelineOptimizations(
                PipelineOptimizationsPatch {
                    use_torch_compile: Some(on),
                    ..PipelineOptimizationsPatch::default()
                },
            ))]
        }
        "lora" => vec![params(parse_lora(&args)?)],
        "controlnet" | "cn" => vec![params(parse_controlnet(&args)?)],
        "image" => vec![parse_image(rest)?],
        "mask" => vec![parse_mask(rest, state)?],
        "output" => {
            let index = parse_index(single(&args, "output <n>")?)?;
            let entry = state
                .history()
                .get(index)
                .ok_or_else(|| format!("no history entry {index}"))?;
            let source = entry
                .result
                .as_ref()
                .ok_or_else(|| format!("history entry {index} has no image"))?;
            vec![Msg::Image(ImageMsg::SetOutputImage(Some(ImageRef::import(
                entry.job_id.clone(),
                source.source.clone(),
                ImageSource::Generated,
            ))))]
        }
        "generate" | "go" => generate(state)?,
        "history" => vec![Msg::RefreshHistoryClicked],
        "memory" => vec![Msg::MemoryInfoClicked],
        "theme" => vec![Msg::Ui(parse_theme(single(&args, "theme light|dark|system|toggle")?)?)],
        "panel" => vec![Msg::Ui(parse_panel(&args)?)],
        "brush" => {
            let size = parse_positive(single(&args, "brush <n>")?, "brush size")?;
            vec![Msg::Image(ImageMsg::SetBrushSize(size))]
        }
        "zoom" => {
            let zoom = parse_float(single(&args, "zoom <f>")?, "zoom")?;
            vec![Msg::Image(ImageMsg::SetPreviewZoom(zoom))]
        }
        "reset" => match args.as_slice() {
            [] => vec![Msg::ResetAll],
            ["params"] => vec![params(ParamsMsg::ResetToDefaults)],
            _ => return Err("usage: reset [params]".to_string()),
        },
        other => return Err(format!("unknown command {other:?}; type help")),
    };
    Ok(Command::Dispatch(msgs))
}

/// Commits the mode implied by the image store, then requests generation.
fn generate(state: &AppState) -> Result<Vec<Msg>, String> {
    if !state.can_generate() {
        return Err("cannot generate: set a prompt and positive dimensions first".to_string());
    }
    let image = state.image();
    let mode = match (&image.input_image, &image.mask) {
        (Some(input), Some(mask)) => GenerationMode::Inpaint {
            starting_image: input.uri.clone(),
            mask_image: mask.uri.clone(),
            use_controlnet_union_inpaint: false,
        },
        (Some(input), None) => GenerationMode::ImageToImage {
            starting_image: input.uri.clone(),
        },
        (None, _) => GenerationMode::TextToImage,
    };
    Ok(vec![params(ParamsMsg::SetMode(mode)), Msg::GenerateClicked])
}

fn params(msg: ParamsMsg) -> Msg {
    Msg::Params(msg)
}

fn single<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    match args {
        [value] => Ok(*value),
        _ => Err(format!("usage: {usage}")),
    }
}

fn parse_positive(raw: &str, what: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("{what} must be a positive whole number, got {raw:?}")),
    }
}

fn parse_float(raw: &str, what: &str) -> Result<f32, String> {
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("{what} must be a number, got {raw:?}")),
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .map_err(|_| format!("index must be a whole number, got {raw:?}"))
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got {raw:?}")),
    }
}

fn parse_size(rest: &str) -> Result<DimensionsPatch, String> {
    let parts: Vec<&str> = rest
        .split(|c: char| c == 'x' || c == 'X' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        [width, height] => Ok(DimensionsPatch {
            width: Some(parse_positive(width, "width")?),
            height: Some(parse_positive(height, "height")?),
        }),
        _ => Err("usage: size <w>x<h>".to_string()),
    }
}

fn parse_deepcache(args: &[&str]) -> Result<PipelineOptimizationsPatch, String> {
    let (switch, tail) = args
        .split_first()
        .ok_or_else(|| "usage: deepcache on|off [interval] [branch]".to_string())?;
    let mut patch = PipelineOptimizationsPatch {
        use_deep_cache: Some(parse_switch(switch)?),
        ..PipelineOptimizationsPatch::default()
    };
    match tail {
        [] => {}
        [interval] => {
            patch.deep_cache_interval = Some(Some(parse_positive(interval, "interval")?));
        }
        [interval, branch] => {
            patch.deep_cache_interval = Some(Some(parse_positive(interval, "interval")?));
            let branch = branch
                .parse::<u32>()
                .map_err(|_| format!("branch must be a whole number, got {branch:?}"))?;
            patch.deep_cache_branch_id = Some(Some(branch));
        }
        _ => return Err("usage: deepcache on|off [interval] [branch]".to_string()),
    }
    Ok(patch)
}

fn parse_lora(args: &[&str]) -> Result<ParamsMsg, String> {
    match args {
        ["add", model, weight_name] => Ok(ParamsMsg::AddLora(LoraParams::new(*model, *weight_name))),
        ["add", model, weight_name, scale] => {
            let mut lora = LoraParams::new(*model, *weight_name);
            lora.scale = parse_float(scale, "scale")?;
            Ok(ParamsMsg::AddLora(lora))
        }
        ["scale", index, scale] => Ok(ParamsMsg::UpdateLora {
            index: parse_index(index)?,
            patch: LoraPatch {
                scale: Some(parse_float(scale, "scale")?),
                ..LoraPatch::default()
            },
        }),
        ["rm", index] => Ok(ParamsMsg::RemoveLora(parse_index(index)?)),
        ["clear"] => Ok(ParamsMsg::ClearLoras),
        _ => Err("usage: lora add <model> <weights> [scale] | scale <i> <f> | rm <i> | clear"
            .to_string()),
    }
}

fn parse_controlnet(args: &[&str]) -> Result<ParamsMsg, String> {
    match args {
        ["add", image] => Ok(ParamsMsg::AddControlNet(ControlNetParams::new(*image))),
        ["add", image, model] => {
            let mut controlnet = ControlNetParams::new(*image);
            controlnet.model = Some(model.to_string());
            Ok(ParamsMsg::AddControlNet(controlnet))
        }
        ["scale", index, scale] => Ok(ParamsMsg::UpdateControlNet {
            index: parse_index(index)?,
            patch: ControlNetPatch {
                conditioning_scale: Some(parse_float(scale, "scale")?),
                ..ControlNetPatch::default()
            },
        }),
        ["rm", index] => Ok(ParamsMsg::RemoveControlNet(parse_index(index)?)),
        ["clear"] => Ok(ParamsMsg::ClearControlNets),
        _ => Err(
            "usage: controlnet add <image> [model] | scale <i> <f> | rm <i> | clear".to_string(),
        ),
    }
}

fn parse_image(rest: &str) -> Result<Msg, String> {
    match rest {
        "" => Err("usage: image <uri>|output|clear".to_string()),
        "clear" => Ok(Msg::Image(ImageMsg::SetInputImage(None))),
        "output" => Ok(Msg::Image(ImageMsg::UseOutputAsInput)),
        uri => Ok(Msg::Image(ImageMsg::SetInputImage(Some(ImageRef::import(
            "input",
            uri,
            ImageSource::Imported,
        ))))),
    }
}

fn parse_mask(rest: &str, state: &AppState) -> Result<Msg, String> {
    let image = state.image();
    match rest {
        "" => Err("usage: mask <uri>|clear".to_string()),
        "clear" => Ok(Msg::Image(ImageMsg::SetMask(None))),
        uri => {
            let (width, height) = image
                .input_image
                .as_ref()
                .map(|input| (input.width, input.height))
                .unwrap_or((0, 0));
            Ok(Msg::Image(ImageMsg::SetMask(Some(MaskRef {
                id: "mask".to_string(),
                uri: uri.to_string(),
                width,
                height,
                brush_size: image.brush_size,
            }))))
        }
    }
}

fn parse_theme(raw: &str) -> Result<UiMsg, String> {
    match raw.to_ascii_lowercase().as_str() {
        "light" => Ok(UiMsg::SetThemeMode(ThemeMode::Light)),
        "dark" => Ok(UiMsg::SetThemeMode(ThemeMode::Dark)),
        "system" => Ok(UiMsg::SetThemeMode(ThemeMode::System)),
        "toggle" => Ok(UiMsg::ToggleTheme),
        _ => Err(format!("unknown theme {raw:?}")),
    }
}

fn parse_panel(args: &[&str]) -> Result<UiMsg, String> {
    let (name, tail) = args
        .split_first()
        .ok_or_else(|| "usage: panel input|output|control|modifier [on|off]".to_string())?;
    let panel = match name.to_ascii_lowercase().as_str() {
        "input" => Panel::Input,
        "output" => Panel::Output,
        "control" => Panel::Control,
        "modifier" => Panel::Modifier,
        other => return Err(format!("unknown panel {other:?}")),
    };
    match tail {
        [] => Ok(UiMsg::TogglePanel(panel)),
        [switch] => Ok(UiMsg::SetPanelVisibility {
            panel,
            visible: parse_switch(switch)?,
        }),
        _ => Err("usage: panel input|output|control|modifier [on|off]".to_string()),
    }
}

/// Renders the whole view as text.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let negative = if view.negative_prompt.is_empty() {
        "-"
    } else {
        view.negative_prompt.as_str()
    };
    let seed = view
        .seed
        .map(|seed| seed.to_string())
        .unwrap_or_else(|| "random".to_string());

    let _ = writeln!(out, "prompt:   {}", view.prompt);
    let _ = writeln!(out, "negative: {negative}");
    let _ = writeln!(
        out,
        "model: {}  size: {}x{}  steps: {}  guidance: {:.1}  seed: {}",
        view.base_model,
        view.dimensions.width,
        view.dimensions.height,
        view.inference_steps,
        view.guidance_scale,
        seed
    );
    let _ = writeln!(
        out,
        "mode: {}  loras: {}  controlnets: {}  theme: {}  ready: {}",
        view.mode,
        view.lora_count,
        view.controlnet_count,
        theme_label(view.theme),
        if view.can_generate { "yes" } else { "no" }
    );
    match view.phase {
        GenerationPhase::Idle => {}
        GenerationPhase::Submitting => out.push_str("generating...\n"),
        GenerationPhase::Refreshing => out.push_str("refreshing history...\n"),
        GenerationPhase::Failed => out.push_str("last generation failed\n"),
    }
    if view.is_loading {
        let _ = writeln!(out, "{}", view.loading_message);
    }

    if view.panels.output {
        if view.history.is_empty() {
            out.push_str("history: (empty)\n");
        } else {
            out.push_str("history:\n");
            for (index, row) in view.history.iter().enumerate() {
                let _ = write!(
                    out,
                    "  [{index}] {:<11} {:>3.0}%  {}",
                    row.status.label(),
                    row.progress * 100.0,
                    row.prompt
                );
                if let Some(source) = &row.result_source {
                    let _ = write!(out, "  -> {source}");
                }
                out.push('\n');
            }
        }
    }

    if let Some(report) = &view.diagnostics {
        let _ = writeln!(out, "memory: {report}");
    }
    for toast in &view.toasts {
        let _ = write!(out, "[{}] {}", toast_label(toast.kind), toast.title);
        if let Some(message) = &toast.message {
            let _ = write!(out, ": {message}");
        }
        out.push('\n');
    }
    out
}

fn theme_label(theme: ThemeMode) -> &'static str {
    match theme {
        ThemeMode::Light => "light",
        ThemeMode::Dark => "dark",
        ThemeMode::System => "system",
    }
}

fn toast_label(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
        ToastKind::Warning => "warn",
        ToastKind::Info => "info",
    }
}
