use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (0 = auto-detect)
    pub max_threads: usize,
    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,
    /// Below this many work items everything runs on the calling thread
    pub parallel_threshold: usize,
    /// Channel buffer size multiplier (buffer = workers * multiplier)
    pub channel_buffer_multiplier: usize,
    /// Progress update frequency (every N items)
    pub progress_update_frequency: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 75,
            parallel_threshold: 32,
            channel_buffer_multiplier: 2,
            progress_update_frequency: 50,
        }
    }
}

/// Generic parallel processor for work distribution
///
/// Every worker owns private state created by an initialiser on its own
/// thread, so that state does not need to be `Send` or `Sync`.
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Calculate optimal number of worker threads
    pub fn calculate_optimal_workers(&self, work_count: usize) -> usize {
        let cpu_cores = num_cpus::get();

        // Apply thread percentage from config
        let percentage = self.config.thread_percentage.clamp(1, 100) as usize;
        let max_by_percentage = std::cmp::max(1, (cpu_cores * percentage) / 100);

        // An explicit thread count wins over the percentage calculation
        let max_workers = if self.config.max_threads > 0 {
            self.config.max_threads
        } else {
            max_by_percentage
        };

        // Don't create more workers than work items
        std::cmp::min(max_workers, work_count.max(1))
    }

    /// Process work items, returning one result per item in input order
    ///
    /// # Arguments
    /// * `work_items` - Items to process
    /// * `init` - Builds per-worker state; runs once on each worker thread
    /// * `worker_fn` - Processes one item with the worker's state
    /// * `progress_label` - Label for progress logging
    pub fn process_with_init<T, R, W, I, F>(
        &self,
        work_items: Vec<T>,
        init: I,
        worker_fn: F,
        progress_label: &str,
    ) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        I: Fn() -> Result<W> + Sync,
        F: Fn(&mut W, T) -> R + Sync,
    {
        let work_count = work_items.len();
        if work_count == 0 {
            return Ok(Vec::new());
        }

        let optimal_workers = self.calculate_optimal_workers(work_count);
        if optimal_workers <= 1 || work_count < self.config.parallel_threshold {
            tracing::debug!("{}: processing {} items sequentially", progress_label, work_count);
            let mut state = init()?;
            return Ok(work_items
                .into_iter()
                .map(|item| worker_fn(&mut state, item))
                .collect());
        }

        tracing::debug!(
            "{}: processing {} items with {} workers",
            progress_label,
            work_count,
            optimal_workers
        );

        // Create bounded channels
        let buffer = optimal_workers * self.config.channel_buffer_multiplier.max(1);
        let (work_tx, work_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) = bounded(buffer);
        let (result_tx, result_rx): (Sender<(usize, R)>, Receiver<(usize, R)>) = bounded(buffer * 2);

        // Shared progress counter and first worker start-up failure
        let progress_counter = AtomicUsize::new(0);
        let init_failure: Mutex<Option<anyhow::Error>> = Mutex::new(None);

        // Use crossbeam::thread::scope for safe borrowing
        let indexed_results = crossbeam::thread::scope(|s| {
            // Spawn worker threads
            for worker_id in 0..optimal_workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let progress_counter = &progress_counter;
                let init_failure = &init_failure;
                let init = &init;
                let worker_fn = &worker_fn;

                s.spawn(move |_| {
                    let mut state = match init() {
                        Ok(state) => state,
                        Err(e) => {
                            tracing::error!("Worker {} failed to start: {:#}", worker_id, e);
                            if let Ok(mut slot) = init_failure.lock() {
                                slot.get_or_insert(e);
                            }
                            return;
                        }
                    };

                    while let Ok((index, work_item)) = work_rx.recv() {
                        let result = worker_fn(&mut state, work_item);

                        // Send result
                        if result_tx.send((index, result)).is_err() {
                            break; // Receiver dropped
                        }

                        // Update progress
                        let current = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                        let frequency = self.config.progress_update_frequency.max(1);
                        if current % frequency == 0 || current == work_count {
                            tracing::debug!(
                                "{}: {}/{} items ({:.1}%) [worker-{}]",
                                progress_label,
                                current,
                                work_count,
                                current as f64 / work_count as f64 * 100.0,
                                worker_id
                            );
                        }
                    }
                });
            }

            // Producer thread: send work to workers
            let work_tx_clone = work_tx.clone();
            s.spawn(move |_| {
                for (index, work_item) in work_items.into_iter().enumerate() {
                    if work_tx_clone.send((index, work_item)).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop the original senders so receivers know when work is done
            drop(work_tx);
            drop(work_rx);
            drop(result_tx);

            // Collector: gather results
            collect_results(result_rx, work_count)
        })
        .map_err(|_| anyhow::anyhow!("Thread panic occurred during parallel processing"))?;

        if let Some(e) = init_failure.into_inner().ok().flatten() {
            return Err(e);
        }

        if indexed_results.len() != work_count {
            anyhow::bail!(
                "{}: only {} of {} items were processed",
                progress_label,
                indexed_results.len(),
                work_count
            );
        }

        // Sort results by original index
        let mut sorted_results = indexed_results;
        sorted_results.sort_by_key(|(index, _)| *index);

        Ok(sorted_results.into_iter().map(|(_, result)| result).collect())
    }
}

/// Collect results from workers
fn collect_results<R>(result_rx: Receiver<(usize, R)>, total_work: usize) -> Vec<(usize, R)> {
    let mut results = Vec::with_capacity(total_work);

    while let Ok(result) = result_rx.recv() {
        results.push(result);

        // Break when all work is processed
        if results.len() >= total_work {
            break;
        }
    }

    results
}
