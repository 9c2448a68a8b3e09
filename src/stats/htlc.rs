use super::{AmountKey, MetricError};
use crate::HtlcEvent;

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HtlcTotals {
    pub total_attempts: usize,
    pub successful_attempts: usize,
}

impl HtlcTotals {
    /// Share of HTLC attempts that belonged to a successful payment
    pub fn success_fraction(&self) -> Result<f64, MetricError> {
        if self.total_attempts == 0 {
            return Err(MetricError::DivisionUndefined);
        }
        Ok(self.successful_attempts as f64 / self.total_attempts as f64)
    }
}

pub fn aggregate_htlc_attempts(events: &[HtlcEvent]) -> BTreeMap<AmountKey, HtlcTotals> {
    let mut table: BTreeMap<AmountKey, HtlcTotals> = BTreeMap::new();
    for event in events {
        let entry = table.entry((event.amount, event.scenario)).or_default();
        entry.total_attempts += event.total_attempts;
        entry.successful_attempts += event.successful_attempts;
    }
    table
}
