//! The Imagery Collector

use crate::composite::{median_indices, CloudMask};
use crate::geometry;
use crate::{CollectorConfig, CollectorError};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terrascore_domain::timestamp::COLLECTION_STAMP_FORMAT;
use terrascore_domain::traits::{BoundarySource, ImageryService};
use terrascore_domain::{CollectionMetadata, ImageryQuery, IndexSample, SampleSet, Scene};
use tracing::{debug, info, warn};

/// Result of a successful collection
#[derive(Debug, Clone)]
pub struct SampleSetHandle {
    /// The `{county_fips}_samples.geojson` file
    pub sample_path: PathBuf,
    /// The `metadata.json` file
    pub metadata_path: PathBuf,
    /// The samples as written
    pub samples: SampleSet,
    /// The metadata as written
    pub metadata: CollectionMetadata,
}

/// Collects spectral index samples for counties
///
/// Each collector owns one imagery client; workers running in parallel each build
/// their own collector around a client from an
/// [`ImageryServiceFactory`](terrascore_domain::traits::ImageryServiceFactory).
pub struct ImageryCollector {
    config: CollectorConfig,
    boundaries: Arc<dyn BoundarySource>,
    service: Box<dyn ImageryService>,
}

impl ImageryCollector {
    /// Create a collector
    pub fn new(
        config: CollectorConfig,
        boundaries: Arc<dyn BoundarySource>,
        service: Box<dyn ImageryService>,
    ) -> Self {
        Self {
            config,
            boundaries,
            service,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect samples for a county over `[start_date, end_date]`
    ///
    /// Returns `Ok(None)` when no scene qualifies. Fails with
    /// [`CollectorError::CountyNotFound`] for an unknown FIPS code.
    pub fn collect(
        &self,
        county_fips: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<SampleSetHandle>, CollectorError> {
        self.collect_at(county_fips, start_date, end_date, Local::now().naive_local())
    }

    /// [`collect`](Self::collect) with an explicit collection time
    pub fn collect_at(
        &self,
        county_fips: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        collected_at: NaiveDateTime,
    ) -> Result<Option<SampleSetHandle>, CollectorError> {
        let county = self
            .boundaries
            .county(county_fips)
            .ok_or_else(|| CollectorError::CountyNotFound(county_fips.to_string()))?;

        info!(
            county_fips = %county_fips,
            start_date = %start_date,
            end_date = %end_date,
            "Collecting imagery"
        );

        let plan = geometry::plan(&county.geometry, &self.config).ok_or_else(|| {
            CollectorError::Boundaries(format!("County {} has an empty geometry", county_fips))
        })?;
        debug!(
            county_fips = %county_fips,
            regions = plan.centers.len(),
            points = plan.points.len(),
            "Sampling plan ready"
        );

        let query = ImageryQuery {
            county_fips: county_fips.to_string(),
            region: plan.region,
            points: plan.points.clone(),
            start_date,
            end_date,
            max_cloud_pct: self.config.max_cloud_pct,
            bands: self.config.bands.clone(),
            max_scenes: self.config.max_scenes,
        };
        let scenes = self.select_scenes(self.service.query(&query)?);

        info!(county_fips = %county_fips, image_count = scenes.len(), "Found scenes");
        if scenes.is_empty() {
            warn!(county_fips = %county_fips, "No suitable scenes found");
            return Ok(None);
        }

        let mask = CloudMask {
            probability_threshold: self.config.cloud_probability_threshold,
            reflectance_scale: self.config.reflectance_scale,
        };
        let mut samples = SampleSet::default();
        for (point, values) in plan
            .points
            .iter()
            .zip(median_indices(&scenes, plan.points.len(), &mask))
        {
            // points masked in every scene are dropped
            let Some(values) = values else {
                continue;
            };
            samples.push(IndexSample {
                longitude: point.x(),
                latitude: point.y(),
                values,
            });
        }

        let metadata = CollectionMetadata {
            county_fips: county.fips.clone(),
            county_name: county.name.clone(),
            state_fips: county.state_fips.clone(),
            start_date,
            end_date,
            collection_timestamp: collected_at.format(COLLECTION_STAMP_FORMAT).to_string(),
            image_count: scenes.len(),
        };

        let handle = self.write_output(samples, metadata)?;
        info!(
            county_fips = %county_fips,
            samples = handle.samples.len(),
            path = %handle.sample_path.display(),
            "Collected samples"
        );
        Ok(Some(handle))
    }

    /// Drop scenes over the cloud threshold, clearest first, capped
    fn select_scenes(&self, mut scenes: Vec<Scene>) -> Vec<Scene> {
        scenes.retain(|s| s.cloud_cover_pct <= self.config.max_cloud_pct);
        scenes.sort_by(|a, b| a.cloud_cover_pct.total_cmp(&b.cloud_cover_pct));
        scenes.truncate(self.config.max_scenes);
        scenes
    }

    fn write_output(
        &self,
        samples: SampleSet,
        metadata: CollectionMetadata,
    ) -> Result<SampleSetHandle, CollectorError> {
        let base = format!("{}_{}", metadata.county_fips, metadata.collection_timestamp);
        let dir = create_unique_dir(&self.config.raw_dir, &base)?;

        let sample_path = dir.join(format!("{}_samples.geojson", metadata.county_fips));
        fs::write(&sample_path, serde_json::to_string_pretty(&samples.to_geojson())?)?;

        let metadata_path = dir.join("metadata.json");
        fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

        Ok(SampleSetHandle {
            sample_path,
            metadata_path,
            samples,
            metadata,
        })
    }
}

/// Create `{root}/{base}`, or `{base}_2`, `{base}_3`, ... if it already exists
fn create_unique_dir(root: &Path, base: &str) -> Result<PathBuf, CollectorError> {
    fs::create_dir_all(root)?;
    let mut attempt = 1;
    loop {
        let name = if attempt == 1 {
            base.to_string()
        } else {
            format!("{}_{}", base, attempt)
        };
        let dir = root.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
