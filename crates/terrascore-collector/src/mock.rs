//! Deterministic in-memory imagery service for tests and dry runs
//!
//! Every scripted scene reports the same pixel at every requested point. Scenes are
//! returned exactly as scripted (no cloud filtering, no cap) so callers' own
//! filtering can be observed.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use terrascore_domain::traits::{ImageryService, ImageryServiceFactory};
use terrascore_domain::{ImageryError, ImageryQuery, PixelObservation, Scene};

/// A scripted scene: cloud cover plus the pixel reported at every point
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedScene {
    /// Scene-level cloudy-pixel percentage
    pub cloud_cover_pct: f64,
    /// Observation returned for every point
    pub pixel: PixelObservation,
}

impl ScriptedScene {
    /// A scene with the given cloud cover and pixel
    pub fn new(cloud_cover_pct: f64, pixel: PixelObservation) -> Self {
        Self {
            cloud_cover_pct,
            pixel,
        }
    }
}

/// Clear pixel over a moderately built-up, vegetated surface (raw digital numbers)
pub fn default_pixel() -> PixelObservation {
    PixelObservation {
        cloud_probability: Some(5.0),
        ..Default::default()
    }
    .with_band("B2", 500.0)
    .with_band("B3", 800.0)
    .with_band("B4", 600.0)
    .with_band("B7", 2500.0)
    .with_band("B8", 3000.0)
    .with_band("B11", 2000.0)
}

#[derive(Debug, Default)]
struct Script {
    default_scenes: Vec<ScriptedScene>,
    per_county: HashMap<String, Vec<ScriptedScene>>,
    no_imagery: HashSet<String>,
    failing: HashSet<String>,
    queried: Vec<String>,
}

/// Scripted imagery service
///
/// Clones share one script and one call log.
#[derive(Debug, Clone)]
pub struct MockImageryService {
    script: Arc<Mutex<Script>>,
}

impl Default for MockImageryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageryService {
    /// Three clear scenes of [`default_pixel`] for every county
    pub fn new() -> Self {
        let scenes = [2.0, 8.0, 15.0]
            .into_iter()
            .map(|cloud| ScriptedScene::new(cloud, default_pixel()))
            .collect();
        Self::with_default_scenes(scenes)
    }

    /// Use these scenes for every county without its own script
    pub fn with_default_scenes(scenes: Vec<ScriptedScene>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                default_scenes: scenes,
                ..Default::default()
            })),
        }
    }

    /// Script the scenes returned for one county
    pub fn with_scenes(self, county_fips: &str, scenes: Vec<ScriptedScene>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.per_county.insert(county_fips.to_string(), scenes);
        }
        self
    }

    /// Return no scenes for a county
    pub fn with_no_imagery(self, county_fips: &str) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.no_imagery.insert(county_fips.to_string());
        }
        self
    }

    /// Fail every query for a county with a communication error
    pub fn with_failure(self, county_fips: &str) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.failing.insert(county_fips.to_string());
        }
        self
    }

    /// Number of queries received
    pub fn call_count(&self) -> usize {
        self.script.lock().map(|s| s.queried.len()).unwrap_or(0)
    }

    /// County of every query received, in order
    pub fn queried_counties(&self) -> Vec<String> {
        self.script.lock().map(|s| s.queried.clone()).unwrap_or_default()
    }
}

impl ImageryService for MockImageryService {
    fn query(&self, query: &ImageryQuery) -> Result<Vec<Scene>, ImageryError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ImageryError::Other("mock script poisoned".to_string()))?;
        script.queried.push(query.county_fips.clone());

        if script.failing.contains(&query.county_fips) {
            return Err(ImageryError::Communication(format!(
                "scripted failure for {}",
                query.county_fips
            )));
        }
        if script.no_imagery.contains(&query.county_fips) {
            return Ok(Vec::new());
        }

        let scripted = script
            .per_county
            .get(&query.county_fips)
            .unwrap_or(&script.default_scenes);

        Ok(scripted
            .iter()
            .enumerate()
            .map(|(i, s)| Scene {
                id: format!("MOCK_{}_{}", query.county_fips, i),
                acquired: scene_date(query.start_date, query.end_date, i),
                cloud_cover_pct: s.cloud_cover_pct,
                pixels: vec![Some(s.pixel.clone()); query.points.len()],
            })
            .collect())
    }
}

/// Spread acquisition dates over the window
fn scene_date(start: NaiveDate, end: NaiveDate, i: usize) -> NaiveDate {
    let span = (end - start).num_days().max(0);
    let offset = if span == 0 { 0 } else { (i as i64 * 5) % (span + 1) };
    start + chrono::Duration::days(offset)
}

/// Hands out clients sharing one [`MockImageryService`] script
#[derive(Debug, Clone)]
pub struct MockImageryFactory {
    service: MockImageryService,
    fail_create: bool,
    created: Arc<AtomicUsize>,
}

impl MockImageryFactory {
    /// A factory over a scripted service
    pub fn new(service: MockImageryService) -> Self {
        Self {
            service,
            fail_create: false,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A factory whose `create` always fails authentication
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::new(MockImageryService::new())
        }
    }

    /// The shared service
    pub fn service(&self) -> &MockImageryService {
        &self.service
    }

    /// Number of clients created so far
    pub fn create_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ImageryServiceFactory for MockImageryFactory {
    fn create(&self) -> Result<Box<dyn ImageryService>, ImageryError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(ImageryError::Authentication(
                "mock credentials rejected".to_string(),
            ));
        }
        Ok(Box::new(self.service.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};

    fn query(county: &str) -> ImageryQuery {
        ImageryQuery {
            county_fips: county.to_string(),
            region: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)],
            points: vec![point!(x: 0.5, y: 0.2), point!(x: 0.6, y: 0.3)],
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            max_cloud_pct: 30.0,
            bands: vec!["B4".to_string(), "B8".to_string()],
            max_scenes: 10,
        }
    }

    #[test]
    fn test_default_script() {
        let mock = MockImageryService::new();
        let scenes = mock.query(&query("06037")).unwrap();
        assert_eq!(scenes.len(), 3);
        assert!(scenes.iter().all(|s| s.pixels.len() == 2));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_no_imagery_and_failure() {
        let mock = MockImageryService::new()
            .with_no_imagery("36061")
            .with_failure("17031");
        assert!(mock.query(&query("36061")).unwrap().is_empty());
        assert!(matches!(
            mock.query(&query("17031")),
            Err(ImageryError::Communication(_))
        ));
        assert_eq!(mock.queried_counties(), vec!["36061", "17031"]);
    }

    #[test]
    fn test_factory_shares_script() {
        let factory = MockImageryFactory::new(MockImageryService::new());
        let a = factory.create().unwrap();
        let b = factory.create().unwrap();
        a.query(&query("06037")).unwrap();
        b.query(&query("06037")).unwrap();
        assert_eq!(factory.service().call_count(), 2);
        assert_eq!(factory.create_count(), 2);

        assert!(matches!(
            MockImageryFactory::failing().create(),
            Err(ImageryError::Authentication(_))
        ));
    }
}
