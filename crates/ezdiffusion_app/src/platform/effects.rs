use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use ezd_logging::{ezd_debug, ezd_info, ezd_warn};
use ezdiffusion_client::{ApiSettings, EngineEvent, EngineHandle, GenerationOutcome};
use ezdiffusion_core::{Effect, GenerationCompletion, Msg, UiMsg};

use super::persistence::save_preferences;

/// Executes reducer effects against the engine, the clock and the disk.
pub struct EffectRunner {
    engine: EngineHandle,
    state_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        settings: ApiSettings,
        state_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> std::io::Result<Self> {
        ezd_info!("Using generation server at {}", settings.base_url);
        let engine = EngineHandle::new(settings)?;
        Ok(Self {
            engine,
            state_dir,
            msg_tx,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitGeneration { input } => {
                    ezd_info!(
                        "SubmitGeneration mode={} prompt_len={} size={}x{}",
                        input.mode.label(),
                        input.prompt.len(),
                        input.dimensions.width,
                        input.dimensions.height
                    );
                    self.engine.submit(input);
                }
                Effect::FetchHistory { offset, length } => {
                    self.engine.fetch_history(offset, length);
                }
                Effect::FetchMemoryInfo => {
                    self.engine.fetch_memory_info();
                }
                Effect::PersistPreferences(prefs) => {
                    save_preferences(&self.state_dir, &prefs);
                }
                Effect::ExpireToast { id, after } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = msg_tx.send(Msg::Ui(UiMsg::RemoveToast(id)));
                    });
                }
            }
        }
    }

    /// Drains engine events that arrived since the last call.
    pub fn drain_events(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(map_event(event));
        }
        msgs
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::GenerationRefreshing => Msg::GenerationRefreshing,
        EngineEvent::GenerationFinished { input, outcome } => {
            let completion = match outcome {
                GenerationOutcome::Refreshed(entries) => GenerationCompletion::Refreshed(entries),
                GenerationOutcome::Accepted(accepted) => {
                    ezd_debug!(
                        "Job {} accepted without a result (status {})",
                        accepted.job_id,
                        accepted.status.label()
                    );
                    GenerationCompletion::Accepted
                }
                GenerationOutcome::Failed(err) => {
                    ezd_warn!("Generation failed: {}", err);
                    GenerationCompletion::Failed {
                        message: err.message,
                    }
                }
            };
            Msg::GenerationCompleted { input, completion }
        }
        EngineEvent::HistoryFetched(Ok(entries)) => Msg::HistoryLoaded(entries),
        EngineEvent::HistoryFetched(Err(err)) => Msg::HistoryLoadFailed(err.message),
        EngineEvent::MemoryInfoFetched(Ok(info)) => Msg::MemoryInfoLoaded(info.to_string()),
        EngineEvent::MemoryInfoFetched(Err(err)) => Msg::MemoryInfoFailed(err.message),
    }
}
