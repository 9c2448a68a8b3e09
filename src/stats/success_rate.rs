use super::{AmountKey, MetricError};
use crate::RunResults;

use std::collections::BTreeMap;

/// Fraction of issued payments that completed, in [0, 1]
pub fn success_rate(num_succesful: usize, total_num: usize) -> Result<f64, MetricError> {
    if total_num == 0 {
        return Err(MetricError::DivisionUndefined);
    }
    Ok(num_succesful as f64 / total_num as f64)
}

/// Per-run success rates reduced to their median at each (amount,
/// scenario) key. The median rather than the mean keeps a single bad run
/// from dominating the summary. Reports without any payments contribute
/// no sample, so keys can be absent from the table.
pub fn median_success_rates(results: &[RunResults]) -> BTreeMap<AmountKey, f64> {
    let mut rates_per_key: BTreeMap<AmountKey, Vec<f64>> = BTreeMap::new();
    for run in results {
        for report in &run.reports {
            if let Ok(rate) = success_rate(report.num_succesful, report.total_num) {
                rates_per_key
                    .entry((report.amount, run.scenario))
                    .or_default()
                    .push(rate);
            }
        }
    }
    rates_per_key
        .into_iter()
        .filter_map(|(key, rates)| super::median(&rates).map(|median| (key, median)))
        .collect()
}
