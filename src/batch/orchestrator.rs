//! Batch fan-out: validate every input path up front, drive a fixed
//! pool of workers over a job channel, and collect results back into
//! submission order.

use crate::audio::{self, decode, FeatureExtractor, FeatureVector};
use crate::batch::progress::ProgressTracker;
use crate::error::{BatchError, ExtractError};
use crossbeam_channel as channel;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// What to do with rows that fail after validation passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// First failed row (in input order) aborts the whole batch and
    /// discards completed rows.
    FailFast,
    /// Failed rows are reported in `BatchReport::skipped`; the rest of
    /// the batch survives.
    SkipFailed,
}

/// One completed row, paired with the path it came from.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchRow {
    #[serde(rename = "file")]
    pub path: PathBuf,
    #[serde(flatten)]
    pub features: FeatureVector,
}

/// Outcome of a batch run. `rows` preserves the relative order of the
/// input path list.
#[derive(Debug)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
    pub skipped: Vec<(PathBuf, ExtractError)>,
}

/// Run `job` once per path across a pool of `jobs` worker threads.
///
/// The returned vector is index-aligned with `paths` no matter which
/// worker finishes first: results are written back into their
/// submission slot, not collected in completion order. Every path is
/// checked against the supported-extension set before any worker
/// starts; a single offender rejects the whole batch with zero jobs
/// run. Blocks until all jobs finish; there is no cancellation and no
/// per-job timeout.
///
/// `tracker`, when present, is incremented and notified by the worker
/// that completes each job.
pub fn run_batch<T, F>(
    paths: &[PathBuf],
    jobs: usize,
    tracker: Option<&ProgressTracker>,
    job: F,
) -> Result<Vec<Result<T, ExtractError>>, BatchError>
where
    T: Send,
    F: Fn(&Path) -> Result<T, ExtractError> + Sync,
{
    validate(paths)?;
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let jobs = jobs.max(1);

    let (job_tx, job_rx) = channel::unbounded::<(usize, &Path)>();
    for (index, path) in paths.iter().enumerate() {
        // The receiver is alive until the scope ends; an unbounded
        // send cannot fail here.
        let _ = job_tx.send((index, path.as_path()));
    }
    drop(job_tx);

    let (result_tx, result_rx) = channel::unbounded::<(usize, Result<T, ExtractError>)>();
    let job = &job;

    let mut slots: Vec<Option<Result<T, ExtractError>>> = Vec::new();
    slots.resize_with(paths.len(), || None);

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, path) in job_rx.iter() {
                    let outcome = job(path);
                    if let Some(tracker) = tracker {
                        tracker.increment();
                        tracker.notify();
                    }
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);
        drop(job_rx);

        for (index, outcome) in result_rx.iter() {
            slots[index] = Some(outcome);
        }
    });

    Ok(slots
        .into_iter()
        .map(|slot| slot.expect("every submitted job reports exactly once"))
        .collect())
}

/// Decode and analyze every path, one feature row per file.
pub fn extract_batch(
    paths: &[PathBuf],
    jobs: usize,
    show_progress: bool,
    policy: ErrorPolicy,
) -> Result<BatchReport, BatchError> {
    info!("Batch: {} files, jobs={}", paths.len(), jobs.max(1));

    let tracker = if show_progress {
        ProgressTracker::new(paths.len()).with_observer(|done, total| {
            info!(
                "Completed {:.2}% ({done}/{total})",
                100.0 * done as f32 / total as f32
            );
        })
    } else {
        ProgressTracker::new(paths.len())
    };

    let extractor = FeatureExtractor::new();
    let results = run_batch(paths, jobs, Some(&tracker), |path| {
        let signal = decode(path)?;
        Ok(extractor.extract(&signal))
    })?;

    let mut rows = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (path, outcome) in paths.iter().zip(results) {
        match outcome {
            Ok(features) => rows.push(BatchRow {
                path: path.clone(),
                features,
            }),
            Err(source) => match policy {
                ErrorPolicy::FailFast => {
                    return Err(BatchError::Extraction {
                        path: path.clone(),
                        source,
                    })
                }
                ErrorPolicy::SkipFailed => {
                    warn!("skipping `{}`: {source}", path.display());
                    skipped.push((path.clone(), source));
                }
            },
        }
    }

    info!(
        "Finished batch: {} rows, {} skipped",
        rows.len(),
        skipped.len()
    );
    Ok(BatchReport { rows, skipped })
}

fn validate(paths: &[PathBuf]) -> Result<(), BatchError> {
    let offending: Vec<PathBuf> = paths
        .iter()
        .filter(|p| !audio::is_supported(p))
        .cloned()
        .collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(BatchError::InvalidInput { paths: offending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn wav_paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("track_{i}.wav"))).collect()
    }

    #[test]
    fn results_stay_aligned_with_input_under_jitter() {
        let paths = wav_paths(24);

        let results = run_batch(&paths, 4, None, |path| {
            let millis = rand::thread_rng().gen_range(0..8);
            std::thread::sleep(Duration::from_millis(millis));
            Ok(path.to_string_lossy().into_owned())
        })
        .unwrap();

        assert_eq!(results.len(), paths.len());
        for (path, result) in paths.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap(), &path.to_string_lossy());
        }
    }

    #[test]
    fn single_worker_matches_many_workers() {
        let paths = wav_paths(10);
        let job = |path: &Path| Ok::<_, ExtractError>(path.to_path_buf());

        let serial = run_batch(&paths, 1, None, job).unwrap();
        let parallel = run_batch(&paths, 8, None, job).unwrap();

        let serial: Vec<_> = serial.into_iter().map(Result::unwrap).collect();
        let parallel: Vec<_> = parallel.into_iter().map(Result::unwrap).collect();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn bad_extension_rejects_batch_before_any_work() {
        let mut paths = wav_paths(3);
        paths.insert(2, PathBuf::from("notes.txt"));

        let calls = AtomicUsize::new(0);
        let err = run_batch(&paths, 2, None, |_path| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ExtractError>(())
        })
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        match err {
            BatchError::InvalidInput { paths } => {
                assert_eq!(paths, vec![PathBuf::from("notes.txt")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_completion_is_notified_and_ends_at_100() {
        let paths = wav_paths(5);
        let reported = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&reported);
        let tracker = ProgressTracker::new(paths.len())
            .with_observer(move |done, total| log.lock().unwrap().push((done, total)));

        let results = run_batch(&paths, 3, Some(&tracker), |_path| Ok::<_, ExtractError>(()))
            .unwrap();
        assert_eq!(results.len(), 5);

        let seen = reported.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|&(done, total)| done <= total));
        assert!(seen.iter().any(|&(done, total)| done == total && total == 5));
    }

    #[test]
    fn per_row_failures_are_reported_in_place() {
        let paths = wav_paths(4);

        let results = run_batch(&paths, 2, None, |path| {
            if path.to_string_lossy().contains('2') {
                Err(ExtractError::Decode {
                    path: path.to_path_buf(),
                    reason: "corrupt".into(),
                })
            } else {
                Ok(())
            }
        })
        .unwrap();

        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
        assert!(results[3].is_ok());
    }

    #[test]
    fn empty_batch_returns_empty_result() {
        let results =
            run_batch(&[], 4, None, |_path| Ok::<_, ExtractError>(())).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn zero_jobs_is_clamped_to_one() {
        let paths = wav_paths(3);
        let results =
            run_batch(&paths, 0, None, |path| Ok::<_, ExtractError>(path.to_path_buf())).unwrap();
        assert_eq!(results.len(), 3);
    }
}
