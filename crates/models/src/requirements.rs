use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chainmetric_core::{Document, DomainError, DomainResult, Entity, Validate, ValueObject};

use crate::metric::Metric;

/// Inclusive bounds a single metric must stay within.
///
/// An absent bound places no constraint on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(
        rename = "minThreshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_threshold: Option<f64>,
    #[serde(
        rename = "maxThreshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_threshold: Option<f64>,
}

impl Requirement {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min_threshold: Some(min),
            max_threshold: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min_threshold: Some(min),
            max_threshold: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min_threshold: None,
            max_threshold: Some(max),
        }
    }

    /// Whether a reading satisfies every present bound.
    pub fn admits(&self, value: f64) -> bool {
        self.min_threshold.is_none_or(|min| value >= min)
            && self.max_threshold.is_none_or(|max| value <= max)
    }
}

impl ValueObject for Requirement {}

/// Per-metric requirements; inserting a metric again replaces its entry.
pub type RequirementsMap = BTreeMap<Metric, Requirement>;

/// Measurement requirements attached to one asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: RequirementsMap,
}

impl Requirements {
    pub fn for_asset(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            ..Self::default()
        }
    }

    /// Builder-style variant of [`Requirements::set`].
    pub fn with(mut self, metric: impl Into<Metric>, requirement: Requirement) -> Self {
        self.set(metric, requirement);
        self
    }

    /// Sets the requirement for a metric, returning the one it replaced.
    pub fn set(&mut self, metric: impl Into<Metric>, requirement: Requirement) -> Option<Requirement> {
        self.metrics.insert(metric.into(), requirement)
    }

    pub fn get(&self, metric: &str) -> Option<&Requirement> {
        self.metrics.get(metric)
    }
}

impl Document for Requirements {}

impl Entity for Requirements {
    const NAMESPACE: &'static str = "requirements";
    const KIND: &'static str = "requirement";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Validate for Requirements {
    fn validate(&self) -> DomainResult<()> {
        if self.asset_id.trim().is_empty() {
            return Err(DomainError::required("asset_id"));
        }

        for (metric, requirement) in &self.metrics {
            let bounds = [requirement.min_threshold, requirement.max_threshold];
            if bounds.iter().flatten().any(|b| !b.is_finite()) {
                return Err(DomainError::validation(format!(
                    "{metric}: thresholds must be finite"
                )));
            }

            if let (Some(min), Some(max)) = (requirement.min_threshold, requirement.max_threshold) {
                if min > max {
                    return Err(DomainError::validation(format!(
                        "{metric}: minThreshold {min} exceeds maxThreshold {max}"
                    )));
                }
            }
        }

        Ok(())
    }
}
