use std::fmt;

use ezdiffusion_core::{GenerationMode, GenerationParameters, GenerationResult, HistoryEntry, OpStatus};
use serde_json::{Map, Value};
use thiserror::Error;

/// Every transport failure collapses into this one message-carrying error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Server endpoint a submission is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    TextToImage,
    ImageToImage,
    Inpaint,
}

impl Transport {
    pub fn for_mode(mode: &GenerationMode) -> Self {
        match mode {
            GenerationMode::TextToImage => Self::TextToImage,
            GenerationMode::ImageToImage { .. } => Self::ImageToImage,
            GenerationMode::Inpaint { .. } => Self::Inpaint,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::TextToImage => "/v1/generate/text-to-image",
            Self::ImageToImage => "/v1/generate/image-to-image",
            Self::Inpaint => "/v1/generate/inpaint",
        }
    }
}

/// The server's answer to a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationAccepted {
    pub job_id: String,
    pub status: OpStatus,
    pub result: Option<GenerationResult>,
}

/// Diagnostic record returned by the memory endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryInfo {
    pub device: Option<String>,
    pub allocated_mb: Option<f64>,
    pub max_allocated_mb: Option<f64>,
    pub reserved_mb: Option<f64>,
    /// Keys the client does not know about, kept verbatim.
    pub extra: Map<String, Value>,
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device={}", self.device.as_deref().unwrap_or("unknown"))?;
        if let Some(mb) = self.allocated_mb {
            write!(f, " allocated={mb:.1}MB")?;
        }
        if let Some(mb) = self.max_allocated_mb {
            write!(f, " max_allocated={mb:.1}MB")?;
        }
        if let Some(mb) = self.reserved_mb {
            write!(f, " reserved={mb:.1}MB")?;
        }
        for (key, value) in &self.extra {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Result of one run of the generation flow.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Refreshed(Vec<HistoryEntry>),
    Accepted(GenerationAccepted),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    GenerationRefreshing,
    GenerationFinished {
        input: GenerationParameters,
        outcome: GenerationOutcome,
    },
    HistoryFetched(Result<Vec<HistoryEntry>, ApiError>),
    MemoryInfoFetched(Result<MemoryInfo, ApiError>),
}
