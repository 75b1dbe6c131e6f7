//! Which counties a batch covers

use terrascore_domain::traits::BoundarySource;
use tracing::warn;

/// Counties used when no selection is given: Los Angeles, New York, Cook
pub const DEFAULT_COUNTIES: [&str; 3] = ["06037", "36061", "17031"];

/// A county selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountySelection {
    /// These FIPS codes, in order
    Explicit(Vec<String>),
    /// Every county in the boundary dataset
    All,
    /// Every county of one state
    State(String),
    /// [`DEFAULT_COUNTIES`]
    Default,
}

impl CountySelection {
    /// Build a selection from the command-line flags
    ///
    /// The first of `counties`, `all`, `state` that is set wins. A comma-separated
    /// list is trimmed and empty entries are dropped.
    pub fn from_flags(counties: Option<&str>, all: bool, state: Option<&str>) -> Self {
        if let Some(list) = counties {
            let fips: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            return CountySelection::Explicit(fips);
        }
        if all {
            return CountySelection::All;
        }
        if let Some(state) = state {
            return CountySelection::State(state.trim().to_string());
        }
        CountySelection::Default
    }

    /// Resolve to FIPS codes
    pub fn resolve(&self, boundaries: &dyn BoundarySource) -> Vec<String> {
        let counties = match self {
            CountySelection::Explicit(fips) => fips.clone(),
            CountySelection::All => boundaries.all_fips(),
            CountySelection::State(state) => boundaries.fips_in_state(state),
            CountySelection::Default => DEFAULT_COUNTIES.iter().map(|s| s.to_string()).collect(),
        };
        if counties.is_empty() {
            warn!(selection = ?self, "County selection is empty");
        }
        counties
    }
}
