mod adversaries;
mod anonymity;
mod fees;
mod htlc;
mod path_length;
mod splits;
mod success_rate;

pub use adversaries::*;
pub use anonymity::*;
pub use fees::*;
pub use htlc::*;
pub use path_length::*;
pub use splits::*;
pub use success_rate::*;

use crate::{
    flatten_runs, AdversarySelection, EventStreams, RunResults, Scenario, UndefinedPathPolicy,
};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Amount and scenario identify most aggregation groups
pub type AmountKey = (usize, Scenario);
/// Adversary hit tables additionally separate strategy and population size
pub type AdversaryKey = (usize, Scenario, AdversarySelection, usize);
/// Predecessor guesses are counted per observed hop count
pub type GuessKey = (Scenario, usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    /// The group's denominator was zero or the path too short for the
    /// estimator. Consumers must read this as "insufficient data", not 0.
    #[error("metric undefined for this group")]
    DivisionUndefined,
}

/// Samples contributed to one group key. Events whose value is undefined
/// are counted but never enter the samples, so summary statistics are not
/// biased towards zero.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub samples: Vec<f64>,
    pub undefined: usize,
}

impl Distribution {
    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    pub fn push_undefined(&mut self) {
        self.undefined += 1;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.samples.iter().sum()
    }

    pub fn mean(&self) -> Result<f64, MetricError> {
        if self.samples.is_empty() {
            return Err(MetricError::DivisionUndefined);
        }
        Ok(self.sum() / self.samples.len() as f64)
    }

    pub fn median(&self) -> Result<f64, MetricError> {
        median(&self.samples).ok_or(MetricError::DivisionUndefined)
    }
}

/// Median of the samples; the mean of the middle two for even counts
pub(crate) fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sorted: Vec<OrderedFloat<f64>> = samples.iter().map(|s| OrderedFloat(*s)).sorted().collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid].0)
    } else {
        Some((sorted[mid - 1].0 + sorted[mid].0) / 2.0)
    }
}

/// Every aggregate table of one invocation, handed unmodified to the
/// presentation layer. Rebuilding from the flattened events is the only
/// way to re-aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub success_rates: BTreeMap<AmountKey, f64>,
    pub transactions: BTreeMap<AmountKey, TransactionAggregate>,
    pub htlc_attempts: BTreeMap<AmountKey, HtlcTotals>,
    pub path_lengths: BTreeMap<AmountKey, Distribution>,
    pub path_length_histogram: BTreeMap<(usize, Scenario, usize), usize>,
    pub failed_path_lengths: BTreeMap<AmountKey, Distribution>,
    pub splits: BTreeMap<AmountKey, Distribution>,
    pub adversary_hits: BTreeMap<AdversaryKey, AdversaryTotals>,
    pub attacked_paths: BTreeMap<AttackedPathsKey, usize>,
    pub successful_guess_probabilities: BTreeMap<(Scenario, usize), f64>,
    pub failed_guess_probabilities: BTreeMap<(Scenario, usize), f64>,
}

impl Aggregates {
    /// Flattens all runs and reduces every metric family in one pass over
    /// the event streams.
    pub fn compute(results: &[RunResults], policy: UndefinedPathPolicy) -> Self {
        let streams = flatten_runs(results, policy);
        Self::from_streams(results, &streams)
    }

    pub fn from_streams(results: &[RunResults], streams: &EventStreams) -> Self {
        Self {
            success_rates: median_success_rates(results),
            transactions: aggregate_transactions(&streams.transactions),
            htlc_attempts: aggregate_htlc_attempts(&streams.htlc_attempts),
            path_lengths: aggregate_path_lengths(&streams.path_lengths),
            path_length_histogram: path_length_histogram(&streams.path_lengths),
            failed_path_lengths: aggregate_path_lengths(&streams.failed_path_lengths),
            splits: aggregate_splits(&streams.splits),
            adversary_hits: aggregate_adversary_hits(&streams.adversaries),
            attacked_paths: attacked_paths_histogram(&streams.adversaries),
            successful_guess_probabilities: guess_probabilities(&streams.successful_guesses, true),
            failed_guess_probabilities: guess_probabilities(&streams.failed_guesses, false),
        }
    }
}
