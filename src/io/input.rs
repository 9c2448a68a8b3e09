use super::RunResults;

#[cfg(not(test))]
use log::{info, warn};
use rayon::prelude::*;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
#[cfg(test)]
use std::{println as info, println as warn};

/// Reads every `run*.json` in the given directory. A file that cannot be
/// decoded is logged and skipped; the remaining files are still used.
pub fn read_results_from_dir(input_path: &Path) -> Result<Vec<RunResults>, Box<dyn Error>> {
    let files = find_run_files(input_path)?;
    info!("Reading {} run files from {:#?}.", files.len(), input_path);
    let results = Arc::new(Mutex::new(Vec::with_capacity(files.len())));
    let num_rejected = Arc::new(Mutex::new(0));
    files.par_iter().for_each(|file| {
        match read_results_file(file) {
            Ok(mut runs) => results.lock().unwrap().append(&mut runs),
            Err(e) => {
                warn!("Rejecting {}: {}.", file.display(), e);
                *num_rejected.lock().unwrap() += 1;
            }
        };
    });
    let num_rejected = *num_rejected.lock().unwrap();
    if num_rejected > 0 {
        warn!("Rejected {} of {} run files.", num_rejected, files.len());
    }
    let results = if let Ok(arc) = Arc::try_unwrap(results) {
        if let Ok(mutex) = arc.into_inner() {
            mutex
        } else {
            vec![]
        }
    } else {
        vec![]
    };
    check_consistency(&results);
    Ok(results)
}

/// One simulator invocation writes a `runX.json` holding a list of runs
pub fn read_results_file(file: &Path) -> Result<Vec<RunResults>, Box<dyn Error>> {
    let contents = fs::read_to_string(file)?;
    let runs: Vec<RunResults> = serde_json::from_str(&contents)?;
    Ok(runs)
}

fn find_run_files(input_path: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            file_name.starts_with("run") && file_name.ends_with(".json")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Surfaces drift between a report's payment list and its counters. The
/// report is still aggregated since the counters, not the list, feed the
/// success-rate metric.
fn check_consistency(results: &[RunResults]) {
    let mut violations = 0;
    for run in results {
        for report in &run.reports {
            violations += report.consistency_violations();
        }
    }
    if violations > 0 {
        warn!(
            "Found {} payment count inconsistencies across {} runs.",
            violations,
            results.len()
        );
    }
}
