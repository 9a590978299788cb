use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters submitted with a structure to start a compute job.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobSubmission {
    pub structure_pdb: String,
    pub chain: String,
    pub mutations: String,
}

/// What the server reports for one job.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed {
        #[serde(default)]
        result_files: Vec<String>,
    },
}

#[derive(Clone, Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Blocking client for the remote compute job API.
#[derive(Clone, Debug)]
pub struct JobClient {
    base_url: String,
    client: Client,
}

impl JobClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| format!("Could not build HTTP client: {e}"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn submit(&self, submission: &JobSubmission) -> Result<String, String> {
        let url = format!("{}/jobs", self.base_url);
        let response: SubmitResponse = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .map_err(|e| format!("Could not submit job: {e}"))?
            .error_for_status()
            .map_err(|e| format!("Job submission rejected: {e}"))?
            .json()
            .map_err(|e| format!("Could not parse job submission response: {e}"))?;
        Ok(response.job_id)
    }

    pub fn status(&self, job_id: &str) -> Result<JobStatus, String> {
        let url = format!("{}/jobs/{job_id}", self.base_url);
        self.client
            .get(&url)
            .send()
            .map_err(|e| format!("Could not poll job {job_id}: {e}"))?
            .error_for_status()
            .map_err(|e| format!("Job status query rejected: {e}"))?
            .json()
            .map_err(|e| format!("Could not parse job status for {job_id}: {e}"))
    }

    /// Raw text content of one named result file.
    pub fn fetch_result_file(&self, job_id: &str, filename: &str) -> Result<String, String> {
        let url = format!("{}/jobs/{job_id}/files/{filename}", self.base_url);
        self.client
            .get(&url)
            .send()
            .map_err(|e| format!("Could not fetch result file '{filename}': {e}"))?
            .error_for_status()
            .map_err(|e| format!("Result file '{filename}' not available: {e}"))?
            .text()
            .map_err(|e| format!("Could not read result file '{filename}': {e}"))
    }

    /// Trailing excerpt of the job's log.
    pub fn fetch_log_tail(&self, job_id: &str, lines: usize) -> Result<String, String> {
        let url = format!("{}/jobs/{job_id}/log?lines={lines}", self.base_url);
        self.client
            .get(&url)
            .send()
            .map_err(|e| format!("Could not fetch log for job {job_id}: {e}"))?
            .error_for_status()
            .map_err(|e| format!("Log for job {job_id} not available: {e}"))?
            .text()
            .map_err(|e| format!("Could not read log for job {job_id}: {e}"))
    }
}
