use super::accumulator;
use super::config::ForwardConfig;
use super::context::ForwardRun;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::field::FieldSample;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Processes one chunk: checks for cancellation, fills the chunk's output slice and reports.
fn process_chunk(
    run: &ForwardRun,
    chunk: usize,
    range_start: usize,
    out: &mut [FieldSample],
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    run.token().check()?;

    panic::catch_unwind(AssertUnwindSafe(|| {
        accumulator::accumulate(run, range_start, out)
    }))
    .map_err(|payload| {
        let message = panic_message(payload);
        warn!(chunk, %message, "Worker panicked.");
        EngineError::WorkerFailed { chunk, message }
    })??;

    reporter.report(Progress::TaskIncrement);
    Ok(())
}

/// Computes every observation of `run`, returning samples in observation order.
///
/// The output vector is allocated up front and split into contiguous chunks; each chunk is
/// written by exactly one worker, so no locking is required. Every observation is summed over
/// the sources in voxel index order, which makes the result bitwise independent of the number
/// of workers and of the chunk size.
///
/// Cancellation is checked before each chunk. The first error stops the remaining chunks and
/// no partial output is returned.
#[instrument(skip_all, name = "forward_scheduler")]
pub(crate) fn execute(
    run: &ForwardRun,
    config: &ForwardConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<FieldSample>, EngineError> {
    execute_on(run, config, config.worker_count(), reporter)
}

/// Runs the chunks on a pool of exactly `workers` threads.
fn execute_on(
    run: &ForwardRun,
    config: &ForwardConfig,
    workers: usize,
    reporter: &ProgressReporter,
) -> Result<Vec<FieldSample>, EngineError> {
    let observations = run.observation_count();
    let workers = workers.max(1);
    let chunk_size = config.resolved_chunk_size(observations, workers);
    let total_chunks = observations.div_ceil(chunk_size);
    debug!(
        observations,
        workers, chunk_size, total_chunks, "Scheduling forward run."
    );

    let mut output = vec![FieldSample::zero(run.kind()); observations];
    reporter.report(Progress::TaskStart {
        total_steps: total_chunks as u64,
    });

    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("voxfield-worker-{index}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
        pool.install(|| {
            output
                .par_chunks_mut(chunk_size)
                .enumerate()
                .try_for_each(|(chunk, out)| {
                    process_chunk(run, chunk, chunk * chunk_size, out, reporter)
                })
        })?;
    }

    #[cfg(not(feature = "parallel"))]
    {
        output
            .chunks_mut(chunk_size)
            .enumerate()
            .try_for_each(|(chunk, out)| {
                process_chunk(run, chunk, chunk * chunk_size, out, reporter)
            })?;
    }

    reporter.report(Progress::TaskFinish);
    Ok(output)
}
