use super::{GuessKey, MetricError};
use crate::{GuessEvent, Scenario};

use std::collections::BTreeMap;

/// Expected fraction of a payment's path an adversary at a uniformly
/// distributed hop position can de-anonymise: the share of observed paths
/// with this hop count, scaled by one over the number of candidate
/// predecessor positions. Failed paths have one position fewer to guess
/// from since the payment never reached the recipient.
pub fn anonymity_probability(
    occurrences: usize,
    total: usize,
    path_len: usize,
    success: bool,
) -> Result<f64, MetricError> {
    let min_len = if success { 2 } else { 3 };
    if total == 0 || path_len < min_len {
        return Err(MetricError::DivisionUndefined);
    }
    let positions = if success { path_len - 1 } else { path_len - 2 };
    Ok((occurrences as f64 / total as f64) * (1.0 / positions as f64))
}

/// Occurrences per (scenario, amount, hop count) and the per-(scenario,
/// amount) totals they are normalised by
pub fn count_guesses(
    events: &[GuessEvent],
) -> (
    BTreeMap<GuessKey, usize>,
    BTreeMap<(Scenario, usize), usize>,
) {
    let mut occurrences: BTreeMap<GuessKey, usize> = BTreeMap::new();
    let mut totals: BTreeMap<(Scenario, usize), usize> = BTreeMap::new();
    for event in events {
        *occurrences
            .entry((event.scenario, event.amount, event.path_len))
            .or_default() += 1;
        *totals.entry((event.scenario, event.amount)).or_default() += 1;
    }
    (occurrences, totals)
}

/// Predecessor-guess score per (scenario, amount): the probability summed
/// over every observed hop count. Only this sum is comparable across
/// scenarios.
pub fn guess_probabilities(
    events: &[GuessEvent],
    success: bool,
) -> BTreeMap<(Scenario, usize), f64> {
    let (occurrences, totals) = count_guesses(events);
    let mut probabilities: BTreeMap<(Scenario, usize), f64> = BTreeMap::new();
    for ((scenario, amount, path_len), count) in occurrences {
        let total = totals[&(scenario, amount)];
        if let Ok(probability) = anonymity_probability(count, total, path_len, success) {
            *probabilities.entry((scenario, amount)).or_default() += probability;
        }
    }
    probabilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn guess(scenario: Scenario, amount: usize, path_len: usize) -> GuessEvent {
        GuessEvent {
            run: 0,
            amount,
            scenario,
            path_len,
        }
    }

    #[test]
    fn probability_for_successful_paths() {
        // one occurrence at three hops out of ten paths
        assert_relative_eq!(anonymity_probability(1, 10, 3, true).unwrap(), 0.05);
        assert_relative_eq!(anonymity_probability(2, 10, 2, true).unwrap(), 0.2);
    }

    #[test]
    fn probability_for_failed_paths() {
        assert_relative_eq!(anonymity_probability(1, 10, 4, false).unwrap(), 0.05);
        assert_eq!(
            anonymity_probability(1, 10, 3, false),
            Err(MetricError::DivisionUndefined)
        );
    }

    #[test]
    fn undefined_for_short_paths_and_empty_totals() {
        assert_eq!(
            anonymity_probability(1, 10, 1, true),
            Err(MetricError::DivisionUndefined)
        );
        assert_eq!(
            anonymity_probability(1, 10, 0, true),
            Err(MetricError::DivisionUndefined)
        );
        assert_eq!(
            anonymity_probability(1, 0, 3, true),
            Err(MetricError::DivisionUndefined)
        );
    }

    #[test]
    fn longer_paths_leak_less() {
        let mut last = f64::MAX;
        for path_len in 2..21 {
            let probability = anonymity_probability(5, 10, path_len, true).unwrap();
            assert!(probability < last);
            last = probability;
        }
    }

    #[test]
    fn score_sums_over_observed_hop_counts() {
        let events = vec![
            guess(Scenario::MaxProbSingle, 1000, 3),
            guess(Scenario::MaxProbSingle, 1000, 3),
            guess(Scenario::MaxProbSingle, 1000, 5),
            guess(Scenario::MinFeeSingle, 1000, 3),
        ];
        let scores = guess_probabilities(&events, true);
        // (2/3) * 1/2 + (1/3) * 1/4
        assert_relative_eq!(
            scores[&(Scenario::MaxProbSingle, 1000)],
            2.0 / 3.0 * 0.5 + 1.0 / 3.0 * 0.25
        );
        // a single observation always scores 1/(len - 1)
        assert_relative_eq!(scores[&(Scenario::MinFeeSingle, 1000)], 0.5);
    }

    #[test]
    fn occurrence_counts_and_totals_agree() {
        let events = vec![
            guess(Scenario::MinFeeMulti, 100, 3),
            guess(Scenario::MinFeeMulti, 100, 4),
            guess(Scenario::MinFeeMulti, 100, 4),
        ];
        let (occurrences, totals) = count_guesses(&events);
        assert_eq!(occurrences[&(Scenario::MinFeeMulti, 100, 4)], 2);
        assert_eq!(totals[&(Scenario::MinFeeMulti, 100)], 3);
        let summed: usize = occurrences.values().sum();
        assert_eq!(summed, totals[&(Scenario::MinFeeMulti, 100)]);
    }
}
