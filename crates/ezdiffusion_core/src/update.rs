use std::time::Duration;

use ezd_logging::{ezd_debug, ezd_info, ezd_warn};

use crate::history::{self, OpStatus};
use crate::msg::GenerationCompletion;
use crate::state::{GenerationPhase, HISTORY_PAGE_LENGTH};
use crate::ui::{ToastRequest, UiMsg};
use crate::{image, params, ui, AppState, Effect, Msg, ParamsMsg};

/// Pure update function: applies a message to state and returns any effects.
///
/// A `PersistPreferences` effect is appended whenever the message changed a
/// persisted field.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let prefs_before = state.preferences();
    let persist = !matches!(msg, Msg::RestorePreferences(_));

    let mut effects = match msg {
        Msg::Params(params_msg) => {
            state.params = params::reduce(std::mem::take(&mut state.params), params_msg);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Image(image_msg) => {
            state.image = image::reduce(std::mem::take(&mut state.image), image_msg);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Ui(UiMsg::AddToast(request)) => push_toast(&mut state, request),
        Msg::Ui(ui_msg) => {
            state.ui = ui::reduce(std::mem::take(&mut state.ui), ui_msg);
            state.mark_dirty();
            Vec::new()
        }
        Msg::GenerateClicked => {
            let input = state.params.clone();
            ezd_info!(
                "Generation requested mode={} size={}x{} steps={} loras={} controlnets={}",
                input.mode.label(),
                input.dimensions.width,
                input.dimensions.height,
                input.inference_steps,
                input.loras.len(),
                input.controlnets.len()
            );
            if state.in_flight > 0 {
                ezd_debug!(
                    "{} generation(s) still in flight; the placeholder is replaced",
                    state.in_flight
                );
            }
            state.in_flight += 1;
            state.history = history::add_pending_item(
                std::mem::take(&mut state.history),
                input.clone(),
                OpStatus::Pending,
            );
            state.phase = GenerationPhase::Submitting;
            state.mark_dirty();
            vec![Effect::SubmitGeneration { input }]
        }
        Msg::GenerationRefreshing => {
            state.phase = GenerationPhase::Refreshing;
            state.mark_dirty();
            Vec::new()
        }
        Msg::GenerationCompleted { input, completion } => {
            state.in_flight = state.in_flight.saturating_sub(1);
            let settled = match completion {
                GenerationCompletion::Refreshed(entries) => {
                    ezd_info!("Generation done; history replaced with {} entries", entries.len());
                    state.history = entries;
                    GenerationPhase::Idle
                }
                GenerationCompletion::Accepted => {
                    ezd_info!("Generation accepted without result; placeholder kept");
                    GenerationPhase::Idle
                }
                GenerationCompletion::Failed { message } => {
                    ezd_warn!("Generation failed: {}", message);
                    state.history = history::add_pending_item(
                        std::mem::take(&mut state.history),
                        input,
                        OpStatus::Failure,
                    );
                    GenerationPhase::Failed
                }
            };
            state.phase = if state.in_flight == 0 {
                settled
            } else {
                GenerationPhase::Submitting
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::RefreshHistoryClicked => {
            state.ui = ui::reduce(
                std::mem::take(&mut state.ui),
                UiMsg::SetLoading {
                    is_loading: true,
                    message: Some("Loading history...".to_string()),
                },
            );
            state.mark_dirty();
            vec![Effect::FetchHistory {
                offset: 0,
                length: HISTORY_PAGE_LENGTH,
            }]
        }
        Msg::HistoryLoaded(entries) => {
            state.history = entries;
            state.ui = ui::reduce(std::mem::take(&mut state.ui), stop_loading());
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistoryLoadFailed(message) => {
            ezd_warn!("History refresh failed: {}", message);
            state.ui = ui::reduce(std::mem::take(&mut state.ui), stop_loading());
            push_toast(&mut state, ToastRequest::error("Could not load history", message))
        }
        Msg::MemoryInfoClicked => {
            state.ui = ui::reduce(
                std::mem::take(&mut state.ui),
                UiMsg::SetLoading {
                    is_loading: true,
                    message: Some("Loading memory info...".to_string()),
                },
            );
            state.mark_dirty();
            vec![Effect::FetchMemoryInfo]
        }
        Msg::MemoryInfoLoaded(report) => {
            state.diagnostics = Some(report);
            state.ui = ui::reduce(std::mem::take(&mut state.ui), stop_loading());
            state.mark_dirty();
            Vec::new()
        }
        Msg::MemoryInfoFailed(message) => {
            ezd_warn!("Memory info request failed: {}", message);
            state.ui = ui::reduce(std::mem::take(&mut state.ui), stop_loading());
            push_toast(&mut state, ToastRequest::error("Could not load memory info", message))
        }
        Msg::RestorePreferences(prefs) => {
            state.restore_preferences(&prefs);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResetAll => {
            state.params = params::reduce(
                std::mem::take(&mut state.params),
                ParamsMsg::ResetToDefaults,
            );
            state.image = image::reduce(std::mem::take(&mut state.image), image::ImageMsg::Reset);
            state.ui = ui::reduce(std::mem::take(&mut state.ui), UiMsg::Reset);
            state.mark_dirty();
            Vec::new()
        }
    };

    if persist {
        let prefs_after = state.preferences();
        if prefs_after != prefs_before {
            effects.push(Effect::PersistPreferences(prefs_after));
        }
    }

    (state, effects)
}

fn stop_loading() -> UiMsg {
    UiMsg::SetLoading {
        is_loading: false,
        message: None,
    }
}

fn push_toast(state: &mut AppState, request: ToastRequest) -> Vec<Effect> {
    let duration = request.duration.filter(|d| *d > Duration::ZERO);
    let id = state.ui.push_toast(request);
    state.mark_dirty();
    match duration {
        Some(after) => vec![Effect::ExpireToast { id, after }],
        None => Vec::new(),
    }
}
