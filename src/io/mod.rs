use crate::{AdversarySelection, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod input;
pub mod output;
pub use input::*;
pub use output::*;

/// run and reports, as written by the simulator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub scenario: Scenario,
    pub run: crate::RunId,
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub amount: usize,
    pub total_num: usize,
    pub num_succesful: usize,
    pub payments: Vec<PaymentInfo>,
    /// Absent in simulations run without adversary evaluation
    #[serde(default)]
    pub adversaries: Vec<Adversaries>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub succeeded: bool,
    pub htlc_attempts: usize,
    /// Number of parts this payment has been split into
    pub num_parts: Option<usize>,
    pub used_paths: Vec<PathInfo>,
    pub failed_paths: Vec<PathInfo>,
}

/// Describes the path used by amounts - may or may not have failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    pub path_len: usize,
    /// The aggregated path fees describing how costly the path is
    pub total_fees: usize,
    pub total_time: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Adversaries {
    pub selection_strategy: AdversarySelection,
    pub statistics: Vec<Statistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub percentage: usize,
    /// Number of times an adversary was included a payment path
    pub hits: usize,
    /// Number of times an adversary was included a successful payment path
    pub hits_successful: usize,
    /// Number of attacked paths -> number of payments
    #[serde(default)]
    pub attacked_all: HashMap<usize, usize>,
    #[serde(default)]
    pub targeted_attack: Option<TargetedAttack>,
}

/// Success counts when the selected adversaries are excluded from routing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetedAttack {
    pub num_succesful: usize,
    pub num_failed: usize,
}

/// Sorts a payment's paths into the outcome the metrics care about so
/// downstream aggregation never re-checks the `succeeded` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome<'a> {
    Succeeded { paths: &'a [PathInfo] },
    Failed { attempted_paths: &'a [PathInfo] },
}

impl PaymentInfo {
    pub fn outcome(&self) -> PaymentOutcome {
        if self.succeeded {
            PaymentOutcome::Succeeded {
                paths: &self.used_paths,
            }
        } else {
            PaymentOutcome::Failed {
                attempted_paths: &self.failed_paths,
            }
        }
    }
}

impl Report {
    /// The simulator promises one payment record per issued payment and a
    /// matching success count. Returns the number of inconsistencies so
    /// ingestion can surface drift without dropping the report.
    pub fn consistency_violations(&self) -> usize {
        let mut violations = 0;
        if self.payments.len() != self.total_num {
            violations += 1;
        }
        let succeeded = self.payments.iter().filter(|p| p.succeeded).count();
        if succeeded != self.num_succesful {
            violations += 1;
        }
        if self.num_succesful > self.total_num {
            violations += 1;
        }
        violations
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn path(path_len: usize, total_fees: usize, total_time: usize) -> PathInfo {
        PathInfo {
            path_len,
            total_fees,
            total_time,
        }
    }

    #[test]
    fn outcome_splits_on_success() {
        let payment = PaymentInfo {
            succeeded: true,
            htlc_attempts: 2,
            num_parts: Some(1),
            used_paths: vec![path(3, 10, 5)],
            failed_paths: vec![path(4, 0, 8)],
        };
        assert_eq!(
            payment.outcome(),
            PaymentOutcome::Succeeded {
                paths: &[path(3, 10, 5)]
            }
        );
        let payment = PaymentInfo {
            succeeded: false,
            ..payment
        };
        assert_eq!(
            payment.outcome(),
            PaymentOutcome::Failed {
                attempted_paths: &[path(4, 0, 8)]
            }
        );
    }

    #[test]
    fn report_consistency() {
        let report = Report {
            amount: 1000,
            total_num: 2,
            num_succesful: 1,
            payments: vec![
                PaymentInfo {
                    succeeded: true,
                    htlc_attempts: 1,
                    num_parts: Some(1),
                    used_paths: vec![path(3, 10, 5)],
                    failed_paths: vec![],
                },
                PaymentInfo {
                    succeeded: false,
                    htlc_attempts: 3,
                    num_parts: None,
                    used_paths: vec![],
                    failed_paths: vec![],
                },
            ],
            adversaries: vec![],
        };
        assert_eq!(report.consistency_violations(), 0);
        let mut drifted = report.clone();
        drifted.num_succesful = 2;
        assert_eq!(drifted.consistency_violations(), 1);
        drifted.total_num = 1;
        assert_eq!(drifted.consistency_violations(), 3);
    }

    #[test]
    fn decode_report_json() {
        let raw = r#"
        [{
            "scenario": "MinFeeMulti",
            "run": 7,
            "reports": [{
                "amount": 5000,
                "totalNum": 1,
                "numSuccesful": 1,
                "payments": [{
                    "succeeded": true,
                    "htlcAttempts": 3,
                    "numParts": 2,
                    "usedPaths": [
                        {"pathLen": 3, "totalFees": 12, "totalTime": 40},
                        {"pathLen": 4, "totalFees": 5, "totalTime": 55}
                    ],
                    "failedPaths": []
                }],
                "adversaries": [{
                    "selection_strategy": "HighDegree",
                    "statistics": [{
                        "percentage": 5,
                        "hits": 2,
                        "hits_successful": 1,
                        "attacked_all": {"1": 2},
                        "targeted_attack": {"num_succesful": 0, "num_failed": 1}
                    }]
                }]
            }]
        }]"#;
        let decoded: Vec<RunResults> = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.len(), 1);
        let report = &decoded[0].reports[0];
        assert_eq!(decoded[0].scenario, Scenario::MinFeeMulti);
        assert_eq!(report.payments[0].num_parts, Some(2));
        assert_eq!(report.payments[0].used_paths.len(), 2);
        let stats = &report.adversaries[0].statistics[0];
        assert_eq!(stats.attacked_all.get(&1), Some(&2));
        assert_eq!(
            stats.targeted_attack,
            Some(TargetedAttack {
                num_succesful: 0,
                num_failed: 1,
            })
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        // totalNum absent at the report level
        let raw = r#"
        [{
            "scenario": "MaxProbSingle",
            "run": 0,
            "reports": [{"amount": 100, "numSuccesful": 0, "payments": []}]
        }]"#;
        assert!(serde_json::from_str::<Vec<RunResults>>(raw).is_err());
    }

    #[test]
    fn absent_adversary_section_is_tolerated() {
        let raw = r#"
        [{
            "scenario": "MaxProbSingle",
            "run": 1,
            "reports": [{"amount": 100, "totalNum": 0, "numSuccesful": 0, "payments": []}]
        }]"#;
        let decoded: Vec<RunResults> = serde_json::from_str(raw).unwrap();
        assert!(decoded[0].reports[0].adversaries.is_empty());
    }
}
