//! Configuration loading.
//!
//! Scheduling parameters can come from defaults, a TOML file, and
//! `PLANNER_*` environment variables, merged in that order:
//!
//! ```toml
//! num_days = 5
//! min_gap_minutes = 10
//! working_hours_limit = 6
//! window_start = 900
//! window_end = 1730
//! strategy = "balanced-work"
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CalendarParams, StrategyKind, Time24};

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of consecutive days to plan.
    pub num_days: usize,
    /// Minimum buffer between blocks (minutes).
    pub min_gap_minutes: u32,
    /// Maximum non-break hours per day.
    pub working_hours_limit: u32,
    /// Daily window start, `HHMM`.
    pub window_start: u32,
    /// Daily window end, `HHMM`.
    pub window_end: u32,
    /// Strategy tag.
    pub strategy: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            num_days: 7,
            min_gap_minutes: 15,
            working_hours_limit: 8,
            window_start: 800,
            window_end: 1800,
            strategy: StrategyKind::EarliestFit.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Loads defaults, then `path` (if any), then `PLANNER_*` variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("PLANNER_"));
        Ok(figment.extract()?)
    }

    /// Parses a TOML document over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()?)
    }

    /// Validates and converts into calendar parameters.
    pub fn calendar_params(&self) -> Result<CalendarParams> {
        CalendarParams::new(
            self.min_gap_minutes,
            self.working_hours_limit,
            Time24::from_hhmm(self.window_start)?,
            Time24::from_hhmm(self.window_end)?,
            self.strategy.parse()?,
        )
    }
}
