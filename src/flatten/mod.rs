use crate::{
    AdversarySelection, PaymentInfo, PaymentOutcome, Report, RunId, RunResults, Scenario,
};

#[cfg(not(test))]
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
#[cfg(test)]
use std::{println as info, println as warn};

/// What a failed payment without any recorded path contributes to the
/// path-length stream
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UndefinedPathPolicy {
    /// Emit a length-less event so per-payment cardinality is preserved
    #[default]
    Emit,
    /// Drop the payment from the path-length stream entirely
    Skip,
}

impl clap::ValueEnum for UndefinedPathPolicy {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Emit, Self::Skip]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Emit => Some(clap::builder::PossibleValue::new("emit")),
            Self::Skip => Some(clap::builder::PossibleValue::new("skip")),
        }
    }
}

/// Transaction economics of one payment. The fee and time fields of failed
/// payments stay undefined so summary statistics exclude them instead of
/// counting zeroes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub total_fees: Option<usize>,
    pub relative_fees: Option<f64>,
    pub total_time: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathLenEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub path_len: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HtlcEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub total_attempts: usize,
    /// 0 unless the payment succeeded
    pub successful_attempts: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub num_parts: usize,
}

/// One entry per (selection strategy, percentage) pair of a report
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub strategy: AdversarySelection,
    pub percentage: usize,
    pub total_payments: usize,
    pub total_successful: usize,
    pub hits: usize,
    pub successful_hits: usize,
    /// Number of attacked paths -> number of payments
    pub attacked_all: HashMap<usize, usize>,
    pub targeted_success: Option<usize>,
    pub targeted_failed: Option<usize>,
}

/// A path an adversarial hop could run a predecessor guess against
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuessEvent {
    pub run: RunId,
    pub amount: usize,
    pub scenario: Scenario,
    pub path_len: usize,
}

/// Flat per-metric event streams, merged across runs by concatenation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStreams {
    pub transactions: Vec<TransactionEvent>,
    pub htlc_attempts: Vec<HtlcEvent>,
    /// Used paths of successful payments, plus policy-dependent
    /// undefined-length entries for failed payments
    pub path_lengths: Vec<PathLenEvent>,
    /// Every failed path, regardless of the owning payment's outcome
    pub failed_path_lengths: Vec<PathLenEvent>,
    pub splits: Vec<SplitEvent>,
    pub adversaries: Vec<AdversaryEvent>,
    pub successful_guesses: Vec<GuessEvent>,
    pub failed_guesses: Vec<GuessEvent>,
    /// Multi-part payments that had to be skipped for the split stream
    /// because the simulator did not record a part count
    pub skipped_split_payments: usize,
}

impl EventStreams {
    fn merge(mut self, mut other: Self) -> Self {
        self.transactions.append(&mut other.transactions);
        self.htlc_attempts.append(&mut other.htlc_attempts);
        self.path_lengths.append(&mut other.path_lengths);
        self.failed_path_lengths
            .append(&mut other.failed_path_lengths);
        self.splits.append(&mut other.splits);
        self.adversaries.append(&mut other.adversaries);
        self.successful_guesses.append(&mut other.successful_guesses);
        self.failed_guesses.append(&mut other.failed_guesses);
        self.skipped_split_payments += other.skipped_split_payments;
        self
    }
}

/// Flattens all runs into the per-metric event streams. Runs are
/// independent so the order they arrive in never changes the result.
pub fn flatten_runs(results: &[RunResults], policy: UndefinedPathPolicy) -> EventStreams {
    let streams = results
        .par_iter()
        .map(|run| flatten_run(run, policy))
        .reduce(EventStreams::default, EventStreams::merge);
    info!(
        "Flattened {} runs into {} payment events.",
        results.len(),
        streams.transactions.len()
    );
    if streams.skipped_split_payments > 0 {
        warn!(
            "Skipped {} multi-part payments without a part count.",
            streams.skipped_split_payments
        );
    }
    streams
}

fn flatten_run(run: &RunResults, policy: UndefinedPathPolicy) -> EventStreams {
    let mut streams = EventStreams::default();
    for report in &run.reports {
        for payment in &report.payments {
            flatten_payment(&mut streams, run, report, payment, policy);
        }
        flatten_adversaries(&mut streams, run, report);
    }
    streams
}

fn flatten_payment(
    streams: &mut EventStreams,
    run: &RunResults,
    report: &Report,
    payment: &PaymentInfo,
    policy: UndefinedPathPolicy,
) {
    let (run_id, amount, scenario) = (run.run, report.amount, run.scenario);
    streams.htlc_attempts.push(HtlcEvent {
        run: run_id,
        amount,
        scenario,
        total_attempts: payment.htlc_attempts,
        successful_attempts: if payment.succeeded {
            payment.htlc_attempts
        } else {
            0
        },
    });
    match payment.outcome() {
        PaymentOutcome::Succeeded { paths } => {
            let total_fees: usize = paths.iter().map(|p| p.total_fees).sum();
            let total_time: usize = paths.iter().map(|p| p.total_time).sum();
            streams.transactions.push(TransactionEvent {
                run: run_id,
                amount,
                scenario,
                total_fees: Some(total_fees),
                relative_fees: Some(total_fees as f64 / amount as f64),
                total_time: Some(total_time),
            });
            for path in paths {
                streams.path_lengths.push(PathLenEvent {
                    run: run_id,
                    amount,
                    scenario,
                    path_len: Some(path.path_len),
                });
                if (crate::MIN_GUESSABLE_PATH_LEN_SUCCESS..crate::MAX_GUESSABLE_PATH_LEN)
                    .contains(&path.path_len)
                {
                    streams.successful_guesses.push(GuessEvent {
                        run: run_id,
                        amount,
                        scenario,
                        path_len: path.path_len,
                    });
                }
            }
            if scenario.is_multi_part() {
                match payment.num_parts {
                    Some(num_parts) => streams.splits.push(SplitEvent {
                        run: run_id,
                        amount,
                        scenario,
                        num_parts,
                    }),
                    None => streams.skipped_split_payments += 1,
                }
            }
        }
        PaymentOutcome::Failed { attempted_paths } => {
            streams.transactions.push(TransactionEvent {
                run: run_id,
                amount,
                scenario,
                total_fees: None,
                relative_fees: None,
                total_time: None,
            });
            if policy == UndefinedPathPolicy::Emit {
                streams.path_lengths.push(PathLenEvent {
                    run: run_id,
                    amount,
                    scenario,
                    path_len: None,
                });
            }
            for path in attempted_paths {
                if (crate::MIN_GUESSABLE_PATH_LEN_FAILURE..crate::MAX_GUESSABLE_PATH_LEN)
                    .contains(&path.path_len)
                {
                    streams.failed_guesses.push(GuessEvent {
                        run: run_id,
                        amount,
                        scenario,
                        path_len: path.path_len,
                    });
                }
            }
        }
    }
    // Failed paths are tracked for successful payments too since MPP
    // payments can succeed after some parts were re-routed.
    for path in &payment.failed_paths {
        streams.failed_path_lengths.push(PathLenEvent {
            run: run_id,
            amount,
            scenario,
            path_len: Some(path.path_len),
        });
    }
}

fn flatten_adversaries(streams: &mut EventStreams, run: &RunResults, report: &Report) {
    for adversaries in &report.adversaries {
        for statistics in &adversaries.statistics {
            streams.adversaries.push(AdversaryEvent {
                run: run.run,
                amount: report.amount,
                scenario: run.scenario,
                strategy: adversaries.selection_strategy,
                percentage: statistics.percentage,
                total_payments: report.total_num,
                total_successful: report.num_succesful,
                hits: statistics.hits,
                successful_hits: statistics.hits_successful,
                attacked_all: statistics.attacked_all.clone(),
                targeted_success: statistics
                    .targeted_attack
                    .as_ref()
                    .map(|t| t.num_succesful),
                targeted_failed: statistics.targeted_attack.as_ref().map(|t| t.num_failed),
            });
        }
    }
}
