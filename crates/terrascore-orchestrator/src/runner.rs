//! Bounded worker pool for batch tasks
//!
//! Workers are blocking threads (`spawn_blocking`) pulling from one shared queue.
//! Each worker asks the factory for its own imagery client once, at start, and
//! reuses it for every task it picks up. Task failures and panics become that
//! task's result; they never stop the worker or the batch.

use crate::pipeline::{Pipeline, PipelineMode, TimestampPolicy};
use crate::task::{Task, TaskResult, TaskStatus};
use crate::OrchestratorConfig;
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use terrascore_domain::traits::ImageryServiceFactory;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Runs tasks on up to `parallel` workers
pub struct BatchRunner {
    pipeline: Arc<Pipeline>,
    factory: Arc<dyn ImageryServiceFactory>,
    config: OrchestratorConfig,
}

struct Worker {
    id: usize,
    pipeline: Arc<Pipeline>,
    factory: Arc<dyn ImageryServiceFactory>,
    queue: Arc<Mutex<VecDeque<Task>>>,
    results: mpsc::UnboundedSender<TaskResult>,
    mode: PipelineMode,
    policy: TimestampPolicy,
    delay: Duration,
}

impl BatchRunner {
    /// Create a runner
    pub fn new(
        pipeline: Arc<Pipeline>,
        factory: Arc<dyn ImageryServiceFactory>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            pipeline,
            factory,
            config,
        }
    }

    /// Run every task and return one result per task, in task order
    pub async fn run(
        &self,
        tasks: Vec<Task>,
        mode: PipelineMode,
        policy: TimestampPolicy,
    ) -> Vec<TaskResult> {
        if tasks.is_empty() {
            return Vec::new();
        }
        let workers = self.config.parallel.clamp(1, tasks.len());
        info!(tasks = tasks.len(), workers, "Starting batch");

        let queue = Arc::new(Mutex::new(tasks.iter().cloned().collect::<VecDeque<_>>()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    pipeline: Arc::clone(&self.pipeline),
                    factory: Arc::clone(&self.factory),
                    queue: Arc::clone(&queue),
                    results: tx.clone(),
                    mode,
                    policy,
                    delay: self.config.task_delay(),
                };
                tokio::task::spawn_blocking(move || worker.run())
            })
            .collect();
        drop(tx);

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker terminated abnormally");
            }
        }

        let resolved: HashSet<usize> = results.iter().map(|r| r.index).collect();
        for task in tasks.iter().filter(|t| !resolved.contains(&t.index)) {
            warn!(county_fips = %task.county_fips, window = %task.window, "Task never completed");
            results.push(TaskResult::failed(
                task,
                TaskStatus::Error,
                "task was not completed by any worker",
            ));
        }

        results.sort_by_key(|r| r.index);
        results
    }
}

impl Worker {
    fn run(self) {
        let collector = match self.factory.create() {
            Ok(service) => Ok(self.pipeline.collector(service)),
            Err(e) => {
                error!(worker = self.id, error = %e, "Imagery client creation failed");
                Err(format!("imagery client unavailable: {}", e))
            }
        };

        let mut first = true;
        loop {
            let Ok(mut queue) = self.queue.lock() else {
                error!(worker = self.id, "Task queue poisoned");
                break;
            };
            let Some(task) = queue.pop_front() else {
                break;
            };
            drop(queue);

            if !first && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            first = false;

            let result = match &collector {
                Err(message) => TaskResult::failed(&task, TaskStatus::Error, message),
                Ok(collector) => catch_unwind(AssertUnwindSafe(|| {
                    self.pipeline
                        .run_task(collector, &task, self.mode, self.policy)
                }))
                .unwrap_or_else(|panic| {
                    TaskResult::failed(&task, TaskStatus::Error, panic_message(panic.as_ref()))
                }),
            };

            match result.status {
                TaskStatus::Success => info!(
                    worker = self.id,
                    county_fips = %task.county_fips,
                    window = %task.window,
                    "Task succeeded"
                ),
                status => warn!(
                    worker = self.id,
                    county_fips = %task.county_fips,
                    window = %task.window,
                    status = %status,
                    error = result.error.as_deref().unwrap_or("-"),
                    "Task did not succeed"
                ),
            }

            if self.results.send(result).is_err() {
                break;
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("task panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("task panicked: {}", s)
    } else {
        "task panicked".to_string()
    }
}
