use serde::{Deserialize, Serialize};

use crate::Catalog;

/// A file in a blob storage container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub path: String,
    pub blob_storage_container: String,
}

impl BlobRef {
    pub fn new(path: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            blob_storage_container: container.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtPrior {
    pub mean: f64,
    pub sd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpPrior {
    pub alpha_sd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    pub rt: RtPrior,
    pub gp: GpPrior,
}

/// Options passed through to the Stan sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerOpts {
    pub cores: u32,
    pub chains: u32,
    pub iter_warmup: u32,
    pub iter_sampling: u32,
    pub adapt_delta: f64,
    pub max_treedepth: u32,
}

/// Model settings shared by every task in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub seed: u64,
    pub horizon: u32,
    pub priors: Priors,
    pub sampler_opts: SamplerOpts,
    pub config_version: String,
    pub quantile_width: Vec<f64>,
    pub model: String,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            seed: 42,
            horizon: 14,
            priors: Priors {
                rt: RtPrior { mean: 1.0, sd: 0.2 },
                gp: GpPrior { alpha_sd: 0.01 },
            },
            sampler_opts: SamplerOpts {
                cores: 4,
                chains: 4,
                iter_warmup: 5000,
                // 1000 draws per chain
                iter_sampling: 4000,
                adapt_delta: 0.99,
                max_treedepth: 12,
            },
            config_version: "1.0".to_owned(),
            quantile_width: vec![0.5, 0.95],
            model: "EpiNow2".to_owned(),
        }
    }
}

/// Everything the generator needs that isn't a per-run argument.
///
/// This is passed explicitly through every call rather than read from globals,
/// so tests can swap in their own reference sets and containers.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Recognized units and diseases.
    pub catalog: Catalog,
    /// Container that generated batches are written to.
    pub config_container: String,
    /// Default container for input data.
    pub data_container: String,
    /// Default container for model output.
    pub output_container: String,
    /// Parameter estimates (generation interval, delays, right truncation).
    pub param_estimates: BlobRef,
    /// Prefix of per-report-date exclusion files in the data container.
    pub outliers_prefix: String,
    /// Default days between the earliest reference date and the report date.
    pub lookback_days: u64,
    /// Shared model settings.
    pub model: ModelParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::nssp(),
            config_container: "rt-epinow2-config".to_owned(),
            data_container: "nssp-etl".to_owned(),
            output_container: "nssp-rt-testing".to_owned(),
            param_estimates: BlobRef::new("prod.parquet", "prod-param-estimates"),
            outliers_prefix: "outliers-v2".to_owned(),
            lookback_days: 56,
            model: ModelParams::default(),
        }
    }
}

impl GeneratorConfig {
    /// Data path used when none is supplied: `gold/<report_date>.parquet`.
    pub fn default_data_path(&self, report_date: chrono::NaiveDate) -> String {
        format!("gold/{report_date}.parquet")
    }

    /// Exclusions file checked for during backfills: `<prefix>/<report_date>.csv`.
    pub fn outliers_path(&self, report_date: chrono::NaiveDate) -> String {
        format!("{}/{report_date}.csv", self.outliers_prefix)
    }
}
