use std::time::Duration;

use crate::{GenerationParameters, Preferences, ToastId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Submit `input`, then refresh history if the server returns a result.
    SubmitGeneration { input: GenerationParameters },
    FetchHistory { offset: usize, length: usize },
    FetchMemoryInfo,
    PersistPreferences(Preferences),
    /// Remove toast `id` once `after` has elapsed.
    ExpireToast { id: ToastId, after: Duration },
}
