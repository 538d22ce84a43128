//! Stage events streamed to frontends during long runs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CheckingCache,
    LoadingCachedResult,
    Sweeping,
    SavingResults,
    Interpolating,
    Resampling,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingProject => "Loading project",
            Self::CheckingCache => "Checking cache",
            Self::LoadingCachedResult => "Loading cached run",
            Self::Sweeping => "Sweeping",
            Self::SavingResults => "Saving results",
            Self::Interpolating => "Interpolating",
            Self::Resampling => "Resampling",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub unit_id: String,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn stage(unit_id: &str, stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
