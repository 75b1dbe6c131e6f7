//! Score computation and metrics record output

use crate::stats::{clamp01, percentile};
use crate::{MetricsRecord, ProcessorConfig, ProcessorError, ScoreError};
use std::fs;
use std::path::{Path, PathBuf};
use terrascore_domain::{CollectionMetadata, IndexSample, SampleSet, ScoreSet, SpectralIndex};
use tracing::{debug, info, warn};

/// Turns sample sets into scored metrics records
///
/// Scoring is a pure function of the samples and the configuration; the only side
/// effect of [`process`](Self::process) is writing the record file.
pub struct MetricsProcessor {
    config: ProcessorConfig,
}

impl MetricsProcessor {
    /// Create a processor
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Create a processor writing into `dir` instead of the configured directory
    pub fn with_output_dir(config: ProcessorConfig, dir: impl Into<PathBuf>) -> Self {
        Self::new(config.with_processed_dir(dir))
    }

    /// The active configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Compute the three scores for a sample set
    pub fn compute_scores(&self, samples: &SampleSet) -> Result<ScoreSet, ScoreError> {
        if samples.is_empty() {
            return Err(ScoreError::EmptySampleSet);
        }
        let missing = samples.missing_bands(&self.config.required_indices);
        if !missing.is_empty() {
            return Err(ScoreError::MissingIndices(missing));
        }

        let obsolescence = self.obsolescence(samples)?;
        let growth = self.growth_potential(samples)?;
        Ok(ScoreSet::new(Some(obsolescence), Some(growth)))
    }

    fn obsolescence(&self, samples: &SampleSet) -> Result<f64, ScoreError> {
        let diffs: Vec<f64> = samples
            .samples
            .iter()
            .filter_map(|s| Some(s.get(SpectralIndex::Ndbi)? - s.get(SpectralIndex::Ndvi)?))
            .collect();

        let p = percentile(&diffs, self.config.percentile).ok_or_else(|| {
            ScoreError::MissingIndices(unpopulated(
                samples,
                &[SpectralIndex::Ndbi, SpectralIndex::Ndvi],
            ))
        })?;
        Ok(clamp01((p + 1.0) / 2.0))
    }

    fn growth_potential(&self, samples: &SampleSet) -> Result<f64, ScoreError> {
        let values: Vec<f64> = samples
            .samples
            .iter()
            .filter_map(|s| self.growth_term(s))
            .collect();

        let p = percentile(&values, self.config.percentile).ok_or_else(|| {
            ScoreError::MissingIndices(unpopulated(
                samples,
                &[
                    SpectralIndex::Ndvi,
                    SpectralIndex::Ndbi,
                    SpectralIndex::Ndwi,
                    SpectralIndex::Mndwi,
                ],
            ))
        })?;
        Ok(clamp01(p))
    }

    fn growth_term(&self, sample: &IndexSample) -> Option<f64> {
        let ndvi = sample.get(SpectralIndex::Ndvi)?;
        let ndbi = sample.get(SpectralIndex::Ndbi)?;
        let water = match (sample.get(SpectralIndex::Ndwi), sample.get(SpectralIndex::Mndwi)) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => return None,
        };

        let veg = 1.0 - 2.0 * (ndvi - self.config.vegetation_peak).abs();
        let built = 1.0 - 2.0 * (ndbi - self.config.built_peak).abs();
        Some(
            self.config.vegetation_weight * veg
                + self.config.built_weight * built
                + self.config.water_weight * clamp01(water),
        )
    }

    /// Score a sample set and write its metrics record
    ///
    /// Returns `Ok(None)` when the set cannot be scored (empty, or required indices
    /// missing); errors are reserved for I/O.
    pub fn process(
        &self,
        samples: &SampleSet,
        metadata: &CollectionMetadata,
    ) -> Result<Option<MetricsRecord>, ProcessorError> {
        let scores = match self.compute_scores(samples) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(county_fips = %metadata.county_fips, reason = %e, "Sample set not scored");
                return Ok(None);
            }
        };

        let record = MetricsRecord::new(metadata, scores, samples.len());
        let path = self.write_record(&record)?;

        info!(
            county_fips = %record.county_fips,
            obsolescence = ?record.metrics.obsolescence_score,
            growth_potential = ?record.metrics.growth_potential_score,
            path = %path.display(),
            "Processed metrics"
        );
        Ok(Some(record))
    }

    /// Where a record is (or would be) written
    pub fn record_path(&self, record: &MetricsRecord) -> PathBuf {
        self.config.processed_dir.join(record.file_name())
    }

    fn write_record(&self, record: &MetricsRecord) -> Result<PathBuf, ProcessorError> {
        fs::create_dir_all(&self.config.processed_dir)?;
        let path = self.record_path(record);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        Ok(path)
    }

    /// Process a raw sample file from disk
    ///
    /// Without an explicit metadata path, `metadata.json` next to the sample file is
    /// used.
    pub fn process_file(
        &self,
        sample_path: &Path,
        metadata_path: Option<&Path>,
    ) -> Result<Option<MetricsRecord>, ProcessorError> {
        let metadata_path = match metadata_path {
            Some(path) => path.to_path_buf(),
            None => sample_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("metadata.json"),
        };
        debug!(
            sample_path = %sample_path.display(),
            metadata_path = %metadata_path.display(),
            "Processing sample file"
        );

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(sample_path)?)?;
        let samples = SampleSet::from_geojson(&raw).map_err(ProcessorError::InvalidSamples)?;
        let metadata: CollectionMetadata =
            serde_json::from_str(&fs::read_to_string(&metadata_path)?)?;

        self.process(&samples, &metadata)
    }

    /// Process many sample files, skipping the ones that fail or cannot be scored
    pub fn process_bulk<P: AsRef<Path>>(&self, sample_paths: &[P]) -> Vec<MetricsRecord> {
        let mut records = Vec::new();
        for path in sample_paths {
            let path = path.as_ref();
            match self.process_file(path, None) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!(sample_path = %path.display(), error = %e, "Skipping sample file");
                }
            }
        }
        info!(
            processed = records.len(),
            total = sample_paths.len(),
            "Bulk processing complete"
        );
        records
    }
}

/// Indices among `indices` that no sample carries a value for
fn unpopulated(samples: &SampleSet, indices: &[SpectralIndex]) -> Vec<SpectralIndex> {
    indices
        .iter()
        .copied()
        .filter(|index| samples.samples.iter().all(|s| s.get(*index).is_none()))
        .collect()
}
