//! County reference entity

use geo::MultiPolygon;

/// A US county as read from the boundary dataset
///
/// Counties are never mutated by terrascore; they are looked up by FIPS code
/// through a [`crate::traits::BoundarySource`].
#[derive(Debug, Clone, PartialEq)]
pub struct County {
    /// Five-digit county FIPS code (`GEOID`), e.g. "06037"
    pub fips: String,

    /// Human readable county name (`NAME`)
    pub name: String,

    /// Two-digit state FIPS code (`STATEFP`)
    pub state_fips: String,

    /// County boundary in WGS84 longitude/latitude
    pub geometry: MultiPolygon<f64>,
}

impl County {
    /// Create a new county
    pub fn new(
        fips: impl Into<String>,
        name: impl Into<String>,
        state_fips: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        Self {
            fips: fips.into(),
            name: name.into(),
            state_fips: state_fips.into(),
            geometry,
        }
    }

    /// Whether this county belongs to the given state
    pub fn in_state(&self, state_fips: &str) -> bool {
        self.state_fips == state_fips
    }
}
