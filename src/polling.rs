use crate::job_api::{JobClient, JobStatus};
use std::thread;
use std::time::Duration;

/// How much of the job log is tailed after each status check.
pub const LOG_TAIL_LINES: usize = 40;

/// Fixed-interval submit→poll→complete driver.
///
/// One check is in flight at a time: the next poll is scheduled only after
/// the previous status round trip and its log fetch have both settled. The
/// loop ends on `completed` (yielding the result filename list) or on the
/// first unrecoverable status-fetch error; a failed log fetch is only a
/// cosmetic loss and does not stop polling. There is no explicit cancel.
#[derive(Clone, Debug)]
pub struct JobPoller {
    interval: Duration,
    max_checks: Option<usize>,
}

impl Default for JobPoller {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_checks: None,
        }
    }
}

impl JobPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_checks: None,
        }
    }

    /// Stop with an error after this many checks instead of waiting forever.
    pub fn with_max_checks(mut self, max_checks: usize) -> Self {
        self.max_checks = Some(max_checks);
        self
    }

    /// Poll the remote API until the job completes. `on_log` receives the
    /// trailing log excerpt after every check.
    pub fn poll_until_complete(
        &self,
        client: &JobClient,
        job_id: &str,
        mut on_log: impl FnMut(&str),
    ) -> Result<Vec<String>, String> {
        self.run(
            || client.status(job_id),
            || client.fetch_log_tail(job_id, LOG_TAIL_LINES),
            &mut on_log,
            job_id,
        )
    }

    /// The state machine itself, with the two fetches abstracted so the loop
    /// semantics can be exercised without a server.
    fn run(
        &self,
        mut check: impl FnMut() -> Result<JobStatus, String>,
        mut tail: impl FnMut() -> Result<String, String>,
        on_log: &mut impl FnMut(&str),
        job_id: &str,
    ) -> Result<Vec<String>, String> {
        let mut checks = 0;
        loop {
            let status = check()?;

            if let Ok(text) = tail() {
                on_log(&text);
            }

            match status {
                JobStatus::Completed { result_files } => return Ok(result_files),
                JobStatus::Pending => {}
            }

            checks += 1;
            if let Some(max) = self.max_checks {
                if checks >= max {
                    return Err(format!("Job {job_id} still pending after {checks} checks"));
                }
            }
            thread::sleep(self.interval);
        }
    }
}
