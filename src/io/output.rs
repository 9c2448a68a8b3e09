use crate::{
    stats::{Aggregates, AttackedPathsKey, Distribution},
    adversary_hit_rate, AdversarySelection, Scenario,
};

#[cfg(not(test))]
use log::info;
use serde::Serialize;
use std::{
    error::Error,
    fs::{self, File},
    path::{Path, PathBuf},
};
#[cfg(test)]
use std::println as info;

/// Writes one JSON document per metric family, each an array of rows the
/// plotting side can consume directly.
pub struct Output<'a>(pub &'a Aggregates);

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SuccessRateRow {
    amount: usize,
    scenario: Scenario,
    success_rate: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TransactionRow<'a> {
    amount: usize,
    scenario: Scenario,
    total_fees: &'a Distribution,
    relative_fees: &'a Distribution,
    total_times: &'a Distribution,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct HtlcRow {
    amount: usize,
    scenario: Scenario,
    total_attempts: usize,
    successful_attempts: usize,
    /// Absent when the group saw no attempts at all
    #[serde(skip_serializing_if = "Option::is_none")]
    success_fraction: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PathLengthRow<'a> {
    amount: usize,
    scenario: Scenario,
    path_lens: &'a Distribution,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PathLengthHistogramRow {
    amount: usize,
    scenario: Scenario,
    path_len: usize,
    count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SplitRow<'a> {
    amount: usize,
    scenario: Scenario,
    num_parts: &'a Distribution,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AdversaryRow {
    amount: usize,
    scenario: Scenario,
    strategy: AdversarySelection,
    percentage: usize,
    total_payments: usize,
    total_successful: usize,
    hits: usize,
    successful_hits: usize,
    targeted_success: usize,
    targeted_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hit_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    successful_hit_rate: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AttackedPathsRow<'a> {
    #[serde(flatten)]
    key: &'a AttackedPathsKey,
    num_payments: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GuessRow {
    scenario: Scenario,
    amount: usize,
    probability: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GuessProbabilities {
    successful: Vec<GuessRow>,
    failed: Vec<GuessRow>,
}

impl Output<'_> {
    pub fn write(&self, output_path: PathBuf) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&output_path)?;
        info!("Writing JSON output files to {:#?}/.", output_path);
        let aggregates = self.0;
        to_json_file(&self.success_rate_rows(), &output_path, "success_rate")?;
        to_json_file(&self.transaction_rows(), &output_path, "transaction_fees")?;
        to_json_file(&self.htlc_rows(), &output_path, "htlc_attempts")?;
        to_json_file(
            &path_length_rows(&aggregates.path_lengths),
            &output_path,
            "path_length",
        )?;
        to_json_file(
            &self.path_length_histogram_rows(),
            &output_path,
            "path_length_histogram",
        )?;
        to_json_file(
            &path_length_rows(&aggregates.failed_path_lengths),
            &output_path,
            "failed_path_length",
        )?;
        to_json_file(&self.split_rows(), &output_path, "splits")?;
        to_json_file(&self.adversary_rows(), &output_path, "adversary_hits")?;
        to_json_file(&self.attacked_paths_rows(), &output_path, "attacked_paths")?;
        to_json_file(
            &self.guess_probabilities(),
            &output_path,
            "predecessor_guesses",
        )?;
        Ok(())
    }

    fn success_rate_rows(&self) -> Vec<SuccessRateRow> {
        self.0
            .success_rates
            .iter()
            .map(|((amount, scenario), success_rate)| SuccessRateRow {
                amount: *amount,
                scenario: *scenario,
                success_rate: *success_rate,
            })
            .collect()
    }

    fn transaction_rows(&self) -> Vec<TransactionRow> {
        self.0
            .transactions
            .iter()
            .map(|((amount, scenario), aggregate)| TransactionRow {
                amount: *amount,
                scenario: *scenario,
                total_fees: &aggregate.total_fees,
                relative_fees: &aggregate.relative_fees,
                total_times: &aggregate.total_times,
            })
            .collect()
    }

    fn htlc_rows(&self) -> Vec<HtlcRow> {
        self.0
            .htlc_attempts
            .iter()
            .map(|((amount, scenario), totals)| HtlcRow {
                amount: *amount,
                scenario: *scenario,
                total_attempts: totals.total_attempts,
                successful_attempts: totals.successful_attempts,
                success_fraction: totals.success_fraction().ok(),
            })
            .collect()
    }

    fn path_length_histogram_rows(&self) -> Vec<PathLengthHistogramRow> {
        self.0
            .path_length_histogram
            .iter()
            .map(|((amount, scenario, path_len), count)| PathLengthHistogramRow {
                amount: *amount,
                scenario: *scenario,
                path_len: *path_len,
                count: *count,
            })
            .collect()
    }

    fn split_rows(&self) -> Vec<SplitRow> {
        self.0
            .splits
            .iter()
            .map(|((amount, scenario), num_parts)| SplitRow {
                amount: *amount,
                scenario: *scenario,
                num_parts,
            })
            .collect()
    }

    fn adversary_rows(&self) -> Vec<AdversaryRow> {
        self.0
            .adversary_hits
            .iter()
            .map(|((amount, scenario, strategy, percentage), totals)| AdversaryRow {
                amount: *amount,
                scenario: *scenario,
                strategy: *strategy,
                percentage: *percentage,
                total_payments: totals.total_payments,
                total_successful: totals.total_successful,
                hits: totals.hits,
                successful_hits: totals.successful_hits,
                targeted_success: totals.targeted_success,
                targeted_failed: totals.targeted_failed,
                hit_rate: adversary_hit_rate(totals, true).ok(),
                successful_hit_rate: adversary_hit_rate(totals, false).ok(),
            })
            .collect()
    }

    fn attacked_paths_rows(&self) -> Vec<AttackedPathsRow> {
        self.0
            .attacked_paths
            .iter()
            .map(|(key, num_payments)| AttackedPathsRow {
                key,
                num_payments: *num_payments,
            })
            .collect()
    }

    fn guess_probabilities(&self) -> GuessProbabilities {
        let to_rows = |table: &std::collections::BTreeMap<(Scenario, usize), f64>| {
            table
                .iter()
                .map(|((scenario, amount), probability)| GuessRow {
                    scenario: *scenario,
                    amount: *amount,
                    probability: *probability,
                })
                .collect()
        };
        GuessProbabilities {
            successful: to_rows(&self.0.successful_guess_probabilities),
            failed: to_rows(&self.0.failed_guess_probabilities),
        }
    }
}

fn path_length_rows(
    table: &std::collections::BTreeMap<crate::stats::AmountKey, Distribution>,
) -> Vec<PathLengthRow> {
    table
        .iter()
        .map(|((amount, scenario), path_lens)| PathLengthRow {
            amount: *amount,
            scenario: *scenario,
            path_lens,
        })
        .collect()
}

fn to_json_file<T: Serialize>(
    rows: &T,
    output_path: &Path,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    let mut file_output_path = output_path.to_path_buf();
    file_output_path.push(format!("{}{}", name, ".json"));
    let file = File::create(file_output_path.clone())?;
    serde_json::to_writer_pretty(file, rows)?;
    info!("{} written to {}.", name, file_output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::tests::{failed_payment, path, run_with_payments, successful_payment};
    use crate::UndefinedPathPolicy;

    #[test]
    fn write_all_metric_families() {
        let runs = vec![
            run_with_payments(
                0,
                Scenario::MinFeeMulti,
                1000,
                vec![
                    successful_payment(vec![path(3, 10, 40), path(4, 20, 55)], Some(2)),
                    failed_payment(vec![path(5, 0, 3)]),
                ],
            ),
            run_with_payments(
                1,
                Scenario::MaxProbSingle,
                1000,
                vec![successful_payment(vec![path(3, 5, 20)], None)],
            ),
        ];
        let aggregates = Aggregates::compute(&runs, UndefinedPathPolicy::Emit);
        let dir = tempfile::tempdir().unwrap();
        Output(&aggregates).write(dir.path().to_path_buf()).unwrap();
        for name in [
            "success_rate",
            "transaction_fees",
            "htlc_attempts",
            "path_length",
            "path_length_histogram",
            "failed_path_length",
            "splits",
            "adversary_hits",
            "attacked_paths",
            "predecessor_guesses",
        ] {
            let file = dir.path().join(format!("{}.json", name));
            assert!(file.exists(), "{} missing", name);
            let contents = fs::read_to_string(file).unwrap();
            assert!(serde_json::from_str::<serde_json::Value>(&contents).is_ok());
        }
    }

    #[test]
    fn success_rate_rows_carry_the_group_key() {
        let runs = vec![run_with_payments(
            0,
            Scenario::MaxProbSingle,
            10000,
            vec![successful_payment(vec![path(3, 1, 1)], None)],
        )];
        let aggregates = Aggregates::compute(&runs, UndefinedPathPolicy::Emit);
        let output = Output(&aggregates);
        let rows = output.success_rate_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 10000);
        assert_eq!(rows[0].scenario, Scenario::MaxProbSingle);
        assert_eq!(rows[0].success_rate, 1.0);
    }
}
