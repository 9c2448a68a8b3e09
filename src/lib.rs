use serde::{Deserialize, Serialize};

pub mod flatten;
pub mod io;
pub mod stats;

pub use flatten::*;
pub use io::*;
pub use stats::*;

pub type RunId = u64;

/// Used paths shorter than this leak nothing a predecessor guess can use
pub(crate) static MIN_GUESSABLE_PATH_LEN_SUCCESS: usize = 3;
/// Failed paths need an extra hop since the recipient never saw the payment
pub(crate) static MIN_GUESSABLE_PATH_LEN_FAILURE: usize = 4;
/// Paths this long or longer are discarded as pathfinding artefacts
pub(crate) static MAX_GUESSABLE_PATH_LEN: usize = 21;

/// Routing-strategy configuration a run was simulated with: the
/// pathfinding objective combined with single or multi-part sending.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scenario {
    MaxProbSingle,
    MaxProbMulti,
    MinFeeSingle,
    MinFeeMulti,
}

/// How the adversarial observer nodes were picked by the simulator
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdversarySelection {
    Random,
    HighBetweenness,
    HighDegree,
}

impl Scenario {
    /// True for scenarios that split payments and report a part count
    pub fn is_multi_part(&self) -> bool {
        matches!(self, Scenario::MaxProbMulti | Scenario::MinFeeMulti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_part_scenarios() {
        assert!(Scenario::MaxProbMulti.is_multi_part());
        assert!(Scenario::MinFeeMulti.is_multi_part());
        assert!(!Scenario::MaxProbSingle.is_multi_part());
        assert!(!Scenario::MinFeeSingle.is_multi_part());
    }

    #[test]
    fn scenario_labels_match_simulator_output() {
        let scenario: Scenario = serde_json::from_str("\"MaxProbSingle\"").unwrap();
        assert_eq!(scenario, Scenario::MaxProbSingle);
        let strategy: AdversarySelection = serde_json::from_str("\"HighBetweenness\"").unwrap();
        assert_eq!(strategy, AdversarySelection::HighBetweenness);
    }
}
