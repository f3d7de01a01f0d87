use crate::{GenerationParameters, HistoryEntry, ImageMsg, ParamsMsg, Preferences, UiMsg};

/// How a submitted generation ended, as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationCompletion {
    /// The server produced a result and the history was re-fetched.
    Refreshed(Vec<HistoryEntry>),
    /// The server accepted the job without a result payload.
    Accepted,
    /// Any transport failure during submit or refresh.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Edit of the staged generation parameters.
    Params(ParamsMsg),
    /// UI store intent (modals, theme, panels, toasts, ...).
    Ui(UiMsg),
    /// Image panel intent (input/output images, mask, brush, zoom).
    Image(ImageMsg),
    /// User triggered generation with the currently staged parameters.
    GenerateClicked,
    /// Engine got a result and is re-fetching history.
    GenerationRefreshing,
    /// Engine finished a submission started with `input`.
    GenerationCompleted {
        input: GenerationParameters,
        completion: GenerationCompletion,
    },
    /// User asked for the server history listing.
    RefreshHistoryClicked,
    HistoryLoaded(Vec<HistoryEntry>),
    HistoryLoadFailed(String),
    /// User asked for server memory diagnostics.
    MemoryInfoClicked,
    MemoryInfoLoaded(String),
    MemoryInfoFailed(String),
    /// Apply preferences loaded from disk at start-up.
    RestorePreferences(Preferences),
    /// Reset parameters, image panel and UI to their defaults.
    ResetAll,
}
