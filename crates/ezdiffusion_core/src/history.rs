use crate::GenerationParameters;

/// Job id reserved for the single client-side placeholder entry.
pub const PENDING_JOB_ID: &str = "temp_pending_job";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    Pending,
    Queued,
    InProgress,
    Success,
    Failure,
}

impl OpStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Queued | Self::InProgress)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failure)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::InProgress => "in progress",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Image reference: URL or data URI.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub job_id: String,
    pub input: GenerationParameters,
    pub status: OpStatus,
    pub progress: f32,
    pub result: Option<GenerationResult>,
}

impl HistoryEntry {
    pub fn is_placeholder(&self) -> bool {
        self.job_id == PENDING_JOB_ID
    }
}

/// Drops any existing placeholder and prepends a fresh one built from `input`.
///
/// At most one placeholder exists afterwards; a second call before the first
/// resolves replaces it rather than queueing another.
pub fn add_pending_item(
    history: Vec<HistoryEntry>,
    input: GenerationParameters,
    status: OpStatus,
) -> Vec<HistoryEntry> {
    let mut next = Vec::with_capacity(history.len() + 1);
    next.push(HistoryEntry {
        job_id: PENDING_JOB_ID.to_string(),
        input,
        status,
        progress: 0.0,
        result: None,
    });
    next.extend(history.into_iter().filter(|entry| !entry.is_placeholder()));
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_entry(job_id: &str) -> HistoryEntry {
        HistoryEntry {
            job_id: job_id.to_string(),
            input: GenerationParameters::default(),
            status: OpStatus::Success,
            progress: 1.0,
            result: Some(GenerationResult {
                source: format!("https://cdn.example.com/{job_id}.png"),
            }),
        }
    }

    #[test]
    fn placeholder_is_prepended_ahead_of_server_entries() {
        let history = vec![server_entry("a"), server_entry("b")];
        let next = add_pending_item(history, GenerationParameters::default(), OpStatus::Pending);

        let ids: Vec<_> = next.iter().map(|e| e.job_id.as_str()).collect();
        assert_eq!(ids, vec![PENDING_JOB_ID, "a", "b"]);
        assert_eq!(next[0].progress, 0.0);
        assert_eq!(next[0].result, None);
    }

    #[test]
    fn only_one_placeholder_survives() {
        let first = GenerationParameters {
            prompt: "first".into(),
            ..Default::default()
        };
        let second = GenerationParameters {
            prompt: "second".into(),
            ..Default::default()
        };
        let history = add_pending_item(vec![server_entry("a")], first, OpStatus::Pending);
        let history = add_pending_item(history, second, OpStatus::Pending);

        let placeholders: Vec<_> = history.iter().filter(|e| e.is_placeholder()).collect();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].input.prompt, "second");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn status_labels() {
        assert!(OpStatus::Queued.is_active());
        assert!(!OpStatus::Success.is_active());
        assert!(OpStatus::Failure.is_failed());
        assert_eq!(OpStatus::InProgress.label(), "in progress");
    }
}
