use ezd_logging::{ezd_info, ezd_warn};
use ezdiffusion_core::{GenerationParameters, HISTORY_PAGE_LENGTH};

use crate::{DiffusionApi, GenerationOutcome};

/// Network half of a generation: submit, then refresh history when the server
/// returned a result. Never fails; errors come back as [`GenerationOutcome::Failed`].
///
/// `on_refreshing` runs between a successful submit and the history fetch.
pub async fn run_generation(
    api: &dyn DiffusionApi,
    input: &GenerationParameters,
    on_refreshing: impl FnOnce(),
) -> GenerationOutcome {
    let accepted = match api.submit_generation(input).await {
        Ok(accepted) => accepted,
        Err(err) => {
            ezd_warn!("Generation submit failed: {}", err);
            return GenerationOutcome::Failed(err);
        }
    };
    ezd_info!(
        "Generation accepted job_id={} status={} has_result={}",
        accepted.job_id,
        accepted.status.label(),
        accepted.result.is_some()
    );

    if accepted.result.is_none() {
        return GenerationOutcome::Accepted(accepted);
    }

    on_refreshing();
    match api.fetch_history(0, HISTORY_PAGE_LENGTH).await {
        Ok(entries) => GenerationOutcome::Refreshed(entries),
        Err(err) => {
            ezd_warn!("History refresh after generation failed: {}", err);
            GenerationOutcome::Failed(err)
        }
    }
}
