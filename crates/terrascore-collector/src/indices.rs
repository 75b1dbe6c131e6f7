//! Spectral indices from band reflectances

use std::collections::BTreeMap;
use terrascore_domain::SpectralIndex;

/// `(a - b) / (a + b)`; undefined when the denominator is zero
pub fn normalized_difference(a: f64, b: f64) -> Option<f64> {
    let sum = a + b;
    if sum == 0.0 {
        return None;
    }
    let value = (a - b) / sum;
    value.is_finite().then_some(value)
}

/// Bands (numerator, denominator) of each plain normalized-difference index
fn band_pair(index: SpectralIndex) -> Option<(&'static str, &'static str)> {
    match index {
        SpectralIndex::Ndvi => Some(("B8", "B4")),
        SpectralIndex::Ndbi => Some(("B11", "B8")),
        SpectralIndex::Ndwi => Some(("B3", "B8")),
        SpectralIndex::Mndwi => Some(("B3", "B11")),
        SpectralIndex::Ui => Some(("B11", "B7")),
        SpectralIndex::Ndmi => Some(("B8", "B11")),
        SpectralIndex::Bsi => None,
    }
}

/// Bare soil index: `((B11 + B4) - (B8 + B2)) / ((B11 + B4) + (B8 + B2))`
fn bare_soil(bands: &BTreeMap<String, f64>) -> Option<f64> {
    let swir = bands.get("B11")?;
    let red = bands.get("B4")?;
    let nir = bands.get("B8")?;
    let blue = bands.get("B2")?;
    normalized_difference(swir + red, nir + blue)
}

/// Every index computable from the given reflectances
///
/// Indices whose bands are missing or whose denominator is zero are left out.
pub fn compute(bands: &BTreeMap<String, f64>) -> BTreeMap<SpectralIndex, f64> {
    let mut out = BTreeMap::new();
    for index in SpectralIndex::ALL {
        let value = match band_pair(index) {
            Some((a, b)) => bands
                .get(a)
                .zip(bands.get(b))
                .and_then(|(a, b)| normalized_difference(*a, *b)),
            None => bare_soil(bands),
        };
        if let Some(value) = value {
            out.insert(index, value);
        }
    }
    out
}
