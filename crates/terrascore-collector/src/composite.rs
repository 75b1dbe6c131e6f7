//! Cloud masking and per-point median compositing

use crate::indices;
use std::collections::BTreeMap;
use terrascore_domain::{PixelObservation, Scene, SpectralIndex};

/// Pixel masking rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudMask {
    /// Pixels with cloud probability at or above this are dropped
    pub probability_threshold: f64,
    /// Divisor applied to raw band values
    pub reflectance_scale: f64,
}

impl CloudMask {
    /// Scaled reflectances of a clear pixel, `None` if the pixel is masked
    pub fn apply(&self, pixel: &PixelObservation) -> Option<BTreeMap<String, f64>> {
        let cloudy = pixel
            .cloud_probability
            .is_some_and(|p| p >= self.probability_threshold);
        if cloudy || pixel.opaque_cloud || pixel.cirrus {
            return None;
        }
        Some(
            pixel
                .reflectance
                .iter()
                .map(|(band, value)| (band.clone(), value / self.reflectance_scale))
                .collect(),
        )
    }
}

/// Median of finite values; `None` when there are none
pub fn median(values: &mut Vec<f64>) -> Option<f64> {
    values.retain(|v| v.is_finite());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Median index values at each point across the clear observations of every scene
///
/// Indices are derived per scene, then reduced to their median. A point with no clear
/// observation in any scene yields `None`.
pub fn median_indices(
    scenes: &[Scene],
    point_count: usize,
    mask: &CloudMask,
) -> Vec<Option<BTreeMap<SpectralIndex, f64>>> {
    (0..point_count)
        .map(|i| {
            let mut stacks: BTreeMap<SpectralIndex, Vec<f64>> = BTreeMap::new();
            for scene in scenes {
                let Some(Some(pixel)) = scene.pixels.get(i) else {
                    continue;
                };
                let Some(bands) = mask.apply(pixel) else {
                    continue;
                };
                for (index, value) in indices::compute(&bands) {
                    stacks.entry(index).or_default().push(value);
                }
            }

            let composite: BTreeMap<SpectralIndex, f64> = stacks
                .into_iter()
                .filter_map(|(index, mut values)| Some((index, median(&mut values)?)))
                .collect();
            (!composite.is_empty()).then_some(composite)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MASK: CloudMask = CloudMask {
        probability_threshold: 50.0,
        reflectance_scale: 10_000.0,
    };

    fn pixel(nir: f64, red: f64) -> PixelObservation {
        PixelObservation::default()
            .with_band("B8", nir)
            .with_band("B4", red)
    }

    fn scene(id: &str, pixels: Vec<Option<PixelObservation>>) -> Scene {
        Scene {
            id: id.to_string(),
            acquired: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            cloud_cover_pct: 5.0,
            pixels,
        }
    }

    #[test]
    fn test_mask_rules() {
        let clear = pixel(3000.0, 1000.0);
        let bands = MASK.apply(&clear).unwrap();
        assert!((bands["B8"] - 0.3).abs() < 1e-12);

        let mut cloudy = clear.clone();
        cloudy.cloud_probability = Some(50.0);
        assert!(MASK.apply(&cloudy).is_none());

        let mut hazy = clear.clone();
        hazy.cloud_probability = Some(49.0);
        assert!(MASK.apply(&hazy).is_some());

        let mut cirrus = clear.clone();
        cirrus.cirrus = true;
        assert!(MASK.apply(&cirrus).is_none());

        let mut opaque = clear;
        opaque.opaque_cloud = true;
        assert!(MASK.apply(&opaque).is_none());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&mut vec![f64::NAN]), None);
    }

    #[test]
    fn test_median_indices() {
        // NDVI per scene at point 0: 0.5, 0.0, (masked)
        let mut masked = pixel(3000.0, 1000.0);
        masked.opaque_cloud = true;
        let scenes = vec![
            scene("a", vec![Some(pixel(3000.0, 1000.0)), None]),
            scene("b", vec![Some(pixel(1000.0, 1000.0)), None]),
            scene("c", vec![Some(masked), None]),
        ];

        let out = median_indices(&scenes, 2, &MASK);
        assert_eq!(out.len(), 2);
        let ndvi = out[0].as_ref().unwrap()[&SpectralIndex::Ndvi];
        assert!((ndvi - 0.25).abs() < 1e-12);
        assert!(out[1].is_none());
    }
}
