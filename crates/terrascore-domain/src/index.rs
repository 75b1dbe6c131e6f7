//! Spectral index names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized spectral indices derived from multi-band reflectance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpectralIndex {
    /// Vegetation density
    Ndvi,
    /// Built-up density
    Ndbi,
    /// Surface water
    Ndwi,
    /// Modified water index
    Mndwi,
    /// Bare soil
    Bsi,
    /// Urban extent
    Ui,
    /// Moisture
    Ndmi,
}

impl SpectralIndex {
    /// Every index the collector derives
    pub const ALL: [SpectralIndex; 7] = [
        SpectralIndex::Ndvi,
        SpectralIndex::Ndbi,
        SpectralIndex::Ndwi,
        SpectralIndex::Mndwi,
        SpectralIndex::Bsi,
        SpectralIndex::Ui,
        SpectralIndex::Ndmi,
    ];

    /// Upper-case name as used in sample files ("NDVI", "NDBI", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Ndbi => "NDBI",
            SpectralIndex::Ndwi => "NDWI",
            SpectralIndex::Mndwi => "MNDWI",
            SpectralIndex::Bsi => "BSI",
            SpectralIndex::Ui => "UI",
            SpectralIndex::Ndmi => "NDMI",
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpectralIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NDVI" => Ok(SpectralIndex::Ndvi),
            "NDBI" => Ok(SpectralIndex::Ndbi),
            "NDWI" => Ok(SpectralIndex::Ndwi),
            "MNDWI" => Ok(SpectralIndex::Mndwi),
            "BSI" => Ok(SpectralIndex::Bsi),
            "UI" => Ok(SpectralIndex::Ui),
            "NDMI" => Ok(SpectralIndex::Ndmi),
            other => Err(format!("Unknown spectral index: {}", other)),
        }
    }
}
