use super::{AmountKey, Distribution, MetricError};
use crate::TransactionEvent;

use serde::Serialize;
use std::collections::BTreeMap;

/// Fees as a fraction of the transferred amount
pub fn relative_fee(total_fee: usize, amount: usize) -> Result<f64, MetricError> {
    if amount == 0 {
        return Err(MetricError::DivisionUndefined);
    }
    Ok(total_fee as f64 / amount as f64)
}

/// Transaction economics of one (amount, scenario) group. Failed payments
/// appear only in the distributions' undefined counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAggregate {
    pub total_fees: Distribution,
    pub relative_fees: Distribution,
    pub total_times: Distribution,
}

pub fn aggregate_transactions(
    events: &[TransactionEvent],
) -> BTreeMap<AmountKey, TransactionAggregate> {
    let mut table: BTreeMap<AmountKey, TransactionAggregate> = BTreeMap::new();
    for event in events {
        let entry = table.entry((event.amount, event.scenario)).or_default();
        match (event.total_fees, event.relative_fees, event.total_time) {
            (Some(fees), Some(relative), Some(time)) => {
                entry.total_fees.push(fees as f64);
                entry.relative_fees.push(relative);
                entry.total_times.push(time as f64);
            }
            _ => {
                entry.total_fees.push_undefined();
                entry.relative_fees.push_undefined();
                entry.total_times.push_undefined();
            }
        }
    }
    table
}
