use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_count: usize,
    pub succeeded: usize,
    pub failed: usize,
}
