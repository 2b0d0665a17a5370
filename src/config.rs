use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bkt::{BktParams, MasteryEstimator};
use crate::error::{BktError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub params: BktParams,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            params: BktParams::default(),
            log_level: default_log_level(),
        }
    }
}

impl EstimatorConfig {
    /// Read `BKT_P_L0`, `BKT_P_T`, `BKT_P_G`, `BKT_P_S` and `RUST_LOG`, after
    /// loading `.env` when one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BktParams::default();
        let read = |key: &str, default: f64| -> Result<f64> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| BktError::Config(format!("{key} is not a number: {raw:?}"))),
            }
        };

        let params = BktParams::new(
            read("BKT_P_L0", defaults.p_l0)?,
            read("BKT_P_T", defaults.p_t)?,
            read("BKT_P_G", defaults.p_g)?,
            read("BKT_P_S", defaults.p_s)?,
        )?;

        let log_level = lookup("RUST_LOG").unwrap_or_else(default_log_level);

        debug!(
            p_l0 = params.p_l0,
            p_t = params.p_t,
            p_g = params.p_g,
            p_s = params.p_s,
            "loaded estimator config"
        );

        Ok(Self { params, log_level })
    }

    pub fn estimator(&self) -> MasteryEstimator {
        MasteryEstimator::new(self.params)
    }
}
