use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ezd_logging::ezd_debug;
use ezdiffusion_core::GenerationParameters;

use crate::generate::run_generation;
use crate::{ApiError, ApiSettings, DiffusionApi, EngineEvent, ReqwestDiffusionApi};

enum EngineCommand {
    Submit { input: GenerationParameters },
    FetchHistory { offset: usize, length: usize },
    FetchMemoryInfo,
}

/// Runs API calls on a background tokio runtime and reports back over a channel.
///
/// Commands are not serialized: overlapping submissions run concurrently.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> io::Result<Self> {
        let api = ReqwestDiffusionApi::new(settings)
            .map_err(|ApiError { message }| io::Error::other(message))?;
        Self::with_api(Arc::new(api))
    }

    pub fn with_api(api: Arc<dyn DiffusionApi>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("ezd-engine")
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
            ezd_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, input: GenerationParameters) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { input });
    }

    pub fn fetch_history(&self, offset: usize, length: usize) {
        let _ = self.cmd_tx.send(EngineCommand::FetchHistory { offset, length });
    }

    pub fn fetch_memory_info(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchMemoryInfo);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn DiffusionApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { input } => {
            let refreshing_tx = event_tx.clone();
            let outcome = run_generation(api, &input, move || {
                let _ = refreshing_tx.send(EngineEvent::GenerationRefreshing);
            })
            .await;
            let _ = event_tx.send(EngineEvent::GenerationFinished { input, outcome });
        }
        EngineCommand::FetchHistory { offset, length } => {
            let result = api.fetch_history(offset, length).await;
            let _ = event_tx.send(EngineEvent::HistoryFetched(result));
        }
        EngineCommand::FetchMemoryInfo => {
            let result = api.fetch_memory_info().await;
            let _ = event_tx.send(EngineEvent::MemoryInfoFetched(result));
        }
    }
}
