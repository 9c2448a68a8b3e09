use super::{AmountKey, Distribution};
use crate::{PathLenEvent, Scenario};

use std::collections::BTreeMap;

/// Full hop-count distribution per (amount, scenario). Length-less events
/// from failed payments only bump the undefined counter.
pub fn aggregate_path_lengths(events: &[PathLenEvent]) -> BTreeMap<AmountKey, Distribution> {
    let mut table: BTreeMap<AmountKey, Distribution> = BTreeMap::new();
    for event in events {
        let entry = table.entry((event.amount, event.scenario)).or_default();
        match event.path_len {
            Some(path_len) => entry.push(path_len as f64),
            None => entry.push_undefined(),
        }
    }
    table
}

/// Binned spread of the same stream: how many paths of each hop count a
/// group saw. Length-less events carry no bin and are left out here.
pub fn path_length_histogram(
    events: &[PathLenEvent],
) -> BTreeMap<(usize, Scenario, usize), usize> {
    let mut table: BTreeMap<(usize, Scenario, usize), usize> = BTreeMap::new();
    for event in events {
        if let Some(path_len) = event.path_len {
            *table
                .entry((event.amount, event.scenario, path_len))
                .or_default() += 1;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn event(amount: usize, scenario: Scenario, path_len: Option<usize>) -> PathLenEvent {
        PathLenEvent {
            run: 0,
            amount,
            scenario,
            path_len,
        }
    }

    #[test]
    fn distribution_per_group() {
        let events = vec![
            event(100, Scenario::MaxProbSingle, Some(3)),
            event(100, Scenario::MaxProbSingle, Some(5)),
            event(100, Scenario::MaxProbSingle, None),
            event(100, Scenario::MinFeeSingle, Some(2)),
        ];
        let table = aggregate_path_lengths(&events);
        let group = &table[&(100, Scenario::MaxProbSingle)];
        assert_eq!(group.len(), 2);
        assert_eq!(group.undefined, 1);
        assert_relative_eq!(group.median().unwrap(), 4.0);
        assert_eq!(table[&(100, Scenario::MinFeeSingle)].undefined, 0);
    }

    #[test]
    fn histogram_counts_each_hop_count() {
        let events = vec![
            event(100, Scenario::MaxProbSingle, Some(3)),
            event(100, Scenario::MaxProbSingle, Some(3)),
            event(100, Scenario::MaxProbSingle, Some(5)),
            event(100, Scenario::MaxProbSingle, None),
        ];
        let table = path_length_histogram(&events);
        assert_eq!(table[&(100, Scenario::MaxProbSingle, 3)], 2);
        assert_eq!(table[&(100, Scenario::MaxProbSingle, 5)], 1);
        assert_eq!(table.len(), 2);
    }
}
