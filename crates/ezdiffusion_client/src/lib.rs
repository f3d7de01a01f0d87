//! ezdiffusion client: HTTP adapter for the generation server, the async
//! generation flow, a background engine, and state-file persistence.
mod api;
mod engine;
mod generate;
mod persist;
mod types;
mod wire;

pub use api::{ApiSettings, DiffusionApi, ReqwestDiffusionApi, DEVELOPMENT_BASE_URL, PRODUCTION_BASE_URL};
pub use engine::EngineHandle;
pub use generate::run_generation;
pub use persist::{ensure_state_dir, PersistError, StateFileStore};
pub use types::{
    ApiError, EngineEvent, GenerationAccepted, GenerationOutcome, MemoryInfo, Transport,
};
