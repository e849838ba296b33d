use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::{
    foundation::error::{EditError, EditResult},
    jobs::engine::{CancelToken, RenderEngine, RenderRequest},
};

/// Identity of a submitted job.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct JobId(pub u64);

/// Progress report of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// A worker picked the job up.
    Started,
    /// Media was written to the path.
    Completed(PathBuf),
    /// The engine failed.
    Failed(String),
    /// The job was cancelled before it finished.
    Cancelled,
}

impl JobStatus {
    /// `true` for statuses after which no further events arrive.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }
}

/// Message sent from a worker to the editing thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobEvent {
    /// Job the event is about.
    pub id: JobId,
    /// New status.
    pub status: JobStatus,
}

/// Caller's handle on a submitted job.
#[derive(Clone, Debug)]
pub struct JobHandle {
    id: JobId,
    cancel: CancelToken,
}

impl JobHandle {
    /// Job identity.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Request cancellation. Workers notice at their next check; a render that already
    /// finished still reports [`JobStatus::Completed`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct Job {
    id: JobId,
    request: RenderRequest,
    cancel: CancelToken,
}

/// Worker pool running render jobs off the editing thread.
///
/// Workers only write media files; results come back as [`JobEvent`]s which the editing thread
/// consumes with [`JobQueue::try_next_event`] or [`JobQueue::next_event_timeout`].
pub struct JobQueue {
    jobs: Option<Sender<Job>>,
    events: Receiver<JobEvent>,
    workers: Vec<JoinHandle<()>>,
    next_id: u64,
}

impl JobQueue {
    /// Start `workers` threads rendering with `engine`.
    pub fn new(engine: Arc<dyn RenderEngine>, workers: usize) -> EditResult<Self> {
        if workers == 0 {
            return Err(EditError::validation("job queue needs at least one worker"));
        }
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<JobEvent>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let engine = Arc::clone(&engine);
            let job_rx = Arc::clone(&job_rx);
            let event_tx = event_tx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("flowedit-job-{i}"))
                .spawn(move || worker_loop(engine.as_ref(), &job_rx, &event_tx))?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: Some(job_tx),
            events: event_rx,
            workers: handles,
            next_id: 1,
        })
    }

    /// Queue a render job.
    pub fn submit(&mut self, request: RenderRequest) -> EditResult<JobHandle> {
        let id = JobId(self.next_id);
        self.next_id += 1;
        let cancel = CancelToken::new();
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| EditError::job("job queue is shut down"))?;
        jobs.send(Job {
            id,
            request,
            cancel: cancel.clone(),
        })
        .map_err(|_| EditError::job("job workers are not accepting work"))?;
        tracing::debug!(job = id.0, "render job queued");
        Ok(JobHandle { id, cancel })
    }

    /// Next pending event, without blocking.
    pub fn try_next_event(&self) -> Option<JobEvent> {
        self.events.try_recv().ok()
    }

    /// Next event, waiting up to `timeout`.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<JobEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("job worker panicked");
            }
        }
    }
}

fn worker_loop(engine: &dyn RenderEngine, jobs: &Mutex<Receiver<Job>>, events: &Sender<JobEvent>) {
    loop {
        let next = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        let Ok(job) = next else {
            return;
        };
        let status = run_job(engine, &job, events);
        if events.send(JobEvent { id: job.id, status }).is_err() {
            return;
        }
    }
}

#[tracing::instrument(skip_all, fields(job = job.id.0))]
fn run_job(engine: &dyn RenderEngine, job: &Job, events: &Sender<JobEvent>) -> JobStatus {
    if job.cancel.is_cancelled() {
        return JobStatus::Cancelled;
    }
    let _ = events.send(JobEvent {
        id: job.id,
        status: JobStatus::Started,
    });
    match engine.render(&job.request, &job.cancel) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "render job completed");
            JobStatus::Completed(path)
        }
        Err(_) if job.cancel.is_cancelled() => {
            tracing::info!("render job cancelled");
            JobStatus::Cancelled
        }
        Err(e) => {
            tracing::warn!(error = %e, "render job failed");
            JobStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/queue.rs"]
mod tests;
