// THEORY:
// The `parallel_pipeline` module runs a logo batch across a worker pool. The
// per-logo analysis is side-effect-free and logos never read each other's
// state, so the batch is embarrassingly parallel: the only shared input is
// the read-only configuration inside the `LogoPipeline`, captured once per
// batch behind an `Arc`.
//
// Key architectural principles:
// 1.  **Dispatcher + Workers**: A single dispatcher task receives index-tagged
//     tasks and distributes them round-robin to per-worker channels. Each
//     worker owns nothing but a handle to the shared pipeline and replies to
//     every task over its own oneshot channel.
// 2.  **Order Restoration**: Workers complete in whatever order the scheduler
//     allows. Every task carries its input index, and results are written
//     back into an index-addressed slot vector, so the report order always
//     matches the input order.
// 3.  **Cooperative Cancellation**: A shared atomic flag is checked once per
//     logo, between tasks. A cancelled batch abandons its remaining work and
//     reports `BatchError::Cancelled`; no partial output escapes, because no
//     logo's analysis depends on another's.
// 4.  **Pool Sizing**: The pool holds one worker per available core. The work
//     is CPU-bound pixel scanning, so more workers than cores would only add
//     scheduling churn.

use crate::error::{BatchError, ConfigError};
use crate::pipeline::{LogoImage, LogoPipeline, LogoReport, NormalizationConfig};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Cooperative cancellation shared between a batch and its caller. Cloning
/// hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. In-flight logos finish or are abandoned; no
    /// further logos start.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// One unit of batch work: a logo, its input position, and the channel its
/// report travels back on.
struct LogoTask {
    index: usize,
    logo: LogoImage,
    cancel: CancelFlag,
    result_sender: oneshot::Sender<(usize, LogoReport)>,
}

struct WorkerPool {
    task_sender: mpsc::UnboundedSender<LogoTask>,
}

impl WorkerPool {
    /// Spawns the dispatcher and one worker per slot. Must be called inside
    /// a tokio runtime.
    fn new(pipeline: Arc<LogoPipeline>, worker_count: usize) -> Self {
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<LogoTask>();

        // Create a single dispatcher that distributes tasks to workers.
        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<LogoTask>())
            .unzip();

        tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        for mut worker_receiver in worker_receivers {
            let worker_pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    if task.cancel.is_cancelled() {
                        // Dropping the sender tells the collector this task
                        // was abandoned.
                        debug!(index = task.index, "abandoning cancelled logo task");
                        continue;
                    }
                    let report = worker_pipeline.normalize_logo(&task.logo);
                    let _ = task.result_sender.send((task.index, report));
                }
            });
        }

        Self { task_sender }
    }

    fn submit(&self, task: LogoTask) -> Result<(), BatchError> {
        self.task_sender
            .send(task)
            .map_err(|_| BatchError::WorkerUnavailable("task channel closed".into()))
    }
}

/// The parallel batch entry point: a `LogoPipeline` behind a worker pool.
pub struct BatchNormalizer {
    pipeline: Arc<LogoPipeline>,
    pool: WorkerPool,
}

impl BatchNormalizer {
    /// Builds the pipeline and spawns its worker pool, one worker per
    /// available core. Must be called inside a tokio runtime.
    pub fn new(config: NormalizationConfig) -> Result<Self, ConfigError> {
        let pipeline = Arc::new(LogoPipeline::new(config)?);
        let worker_count = num_cpus::get().max(1);
        let pool = WorkerPool::new(Arc::clone(&pipeline), worker_count);
        Ok(Self { pipeline, pool })
    }

    pub fn config(&self) -> &NormalizationConfig {
        self.pipeline.config()
    }

    /// Normalizes a batch across the worker pool. Reports come back in input
    /// order regardless of completion order.
    pub async fn normalize_all(
        &self,
        logos: Vec<LogoImage>,
    ) -> Result<Vec<LogoReport>, BatchError> {
        self.normalize_all_with_cancel(logos, CancelFlag::new())
            .await
    }

    /// Like `normalize_all`, with a caller-held cancellation handle. A batch
    /// whose flag is raised before every logo completes reports
    /// `BatchError::Cancelled`.
    pub async fn normalize_all_with_cancel(
        &self,
        logos: Vec<LogoImage>,
        cancel: CancelFlag,
    ) -> Result<Vec<LogoReport>, BatchError> {
        if logos.is_empty() {
            return Ok(Vec::new());
        }
        info!(count = logos.len(), "dispatching logo batch to worker pool");

        let mut receivers = Vec::with_capacity(logos.len());
        for (index, logo) in logos.into_iter().enumerate() {
            let (result_sender, result_receiver) = oneshot::channel();
            self.pool.submit(LogoTask {
                index,
                logo,
                cancel: cancel.clone(),
                result_sender,
            })?;
            receivers.push(result_receiver);
        }

        let mut slots: Vec<Option<LogoReport>> = Vec::new();
        slots.resize_with(receivers.len(), || None);

        for completion in join_all(receivers).await {
            match completion {
                Ok((index, report)) => slots[index] = Some(report),
                // A dropped sender means the task was abandoned: either the
                // batch was cancelled or a worker died underneath it.
                Err(_) if cancel.is_cancelled() => return Err(BatchError::Cancelled),
                Err(_) => {
                    return Err(BatchError::WorkerUnavailable(
                        "a worker dropped its result".into(),
                    ));
                }
            }
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.expect("every completed task wrote its slot"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RasterImage;

    fn solid_black(width: u32, height: u32) -> RasterImage {
        let data: Vec<u8> = [0u8, 0, 0, 255]
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        RasterImage::from_rgba8(width, height, data).unwrap()
    }

    fn batch(sizes: &[(u32, u32)]) -> Vec<LogoImage> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| LogoImage::new(format!("logo-{i}"), solid_black(w, h)))
            .collect()
    }

    #[tokio::test]
    async fn reports_preserve_input_order() {
        let normalizer = BatchNormalizer::new(NormalizationConfig::default()).unwrap();
        let sizes = [(100, 50), (30, 90), (64, 64), (10, 80), (200, 20)];
        let reports = normalizer.normalize_all(batch(&sizes)).await.unwrap();

        assert_eq!(reports.len(), sizes.len());
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.source_id(), format!("logo-{i}"));
            let normalized = report.as_normalized().unwrap();
            assert_eq!(normalized.original_width, sizes[i].0);
            assert_eq!(normalized.original_height, sizes[i].1);
        }
    }

    #[tokio::test]
    async fn parallel_and_sequential_batches_agree() {
        let config = NormalizationConfig::default();
        let normalizer = BatchNormalizer::new(config.clone()).unwrap();
        let pipeline = LogoPipeline::new(config).unwrap();

        let sizes = [(120, 40), (40, 120), (77, 77)];
        let parallel = normalizer.normalize_all(batch(&sizes)).await.unwrap();
        let sequential = pipeline.normalize_all(&batch(&sizes));

        for (left, right) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(
                left.as_normalized().unwrap(),
                right.as_normalized().unwrap()
            );
        }
    }

    #[tokio::test]
    async fn degenerate_logos_are_excluded_in_place() {
        let normalizer = BatchNormalizer::new(NormalizationConfig::default()).unwrap();
        let logos = vec![
            LogoImage::new("good", solid_black(10, 10)),
            LogoImage::new(
                "empty",
                RasterImage::from_rgba8(0, 0, Vec::new()).unwrap(),
            ),
            LogoImage::new("also-good", solid_black(20, 20)),
        ];

        let reports = normalizer.normalize_all(logos).await.unwrap();
        assert!(reports[0].as_normalized().is_some());
        assert!(reports[1].as_normalized().is_none());
        assert_eq!(reports[1].source_id(), "empty");
        assert!(reports[2].as_normalized().is_some());
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let normalizer = BatchNormalizer::new(NormalizationConfig::default()).unwrap();
        let reports = normalizer.normalize_all(Vec::new()).await.unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn pre_cancelled_batch_reports_cancellation() {
        let normalizer = BatchNormalizer::new(NormalizationConfig::default()).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = normalizer
            .normalize_all_with_cancel(batch(&[(50, 50), (60, 60)]), cancel)
            .await;
        assert!(matches!(result, Err(BatchError::Cancelled)));
    }
}
