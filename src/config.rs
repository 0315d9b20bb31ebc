//! # Labeling Configuration
//!
//! The configuration file maps stable label identifiers to display
//! metadata and, per item kind, to the rule deciding whether the label
//! applies. Rules are kept in file order because the engine processes
//! them in that order.
//!
//! Referential integrity is checked up front: a rule, fallback entry,
//! or skip setting that names an unknown identifier aborts the run
//! before any mutation is attempted.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::conditions::{Condition, IssueCondition, PrCondition};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{section} references unknown label id \"{label}\"")]
    UnknownLabel { section: &'static str, label: String },

    #[error("invalid pattern \"{pattern}\" in {section} rule \"{label}\": {source}")]
    BadPattern {
        section: &'static str,
        label: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// Display metadata for one label; the map key is its identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    pub colour: String,
    #[serde(default)]
    pub description: String,
}

/// Activation rule for one label on one item kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRule<C> {
    /// How many conditions must match for the label to be desired.
    pub requires: u32,
    pub conditions: Vec<C>,
}

/// Labels applied when too few substantive labels are desired.
///
/// Either a bare list (activation threshold 1) or a list with an
/// explicit threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fallback {
    Labels(Vec<String>),
    Thresholded {
        labels: Vec<String>,
        #[serde(alias = "activationThreshold")]
        activation_threshold: u32,
    },
}

impl Fallback {
    #[must_use]
    pub fn labels(&self) -> &[String] {
        match self {
            Self::Labels(labels) | Self::Thresholded { labels, .. } => labels,
        }
    }

    /// Non-fallback count at or below which fallback labels activate.
    #[must_use]
    pub fn activation_threshold(&self) -> u32 {
        match self {
            Self::Labels(_) => 1,
            Self::Thresholded {
                activation_threshold,
                ..
            } => *activation_threshold,
        }
    }
}

/// The full labeling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub labels: IndexMap<String, LabelSpec>,
    #[serde(default)]
    pub issue: IndexMap<String, LabelRule<IssueCondition>>,
    pub issue_fallback: Fallback,
    #[serde(default)]
    pub pr: IndexMap<String, LabelRule<PrCondition>>,
    pub pr_fallback: Fallback,
    /// Identifier of the label that disables automated labeling.
    pub skip_labeling: String,
}

impl Config {
    /// Load a configuration file, JSON by default, YAML by extension.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = match path.extension().and_then(OsStr::to_str) {
            Some("yaml" | "yml") => serde_yaml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };

        Ok(config)
    }

    /// Check referential integrity of label identifiers and condition
    /// patterns. Must pass before any item is processed.
    ///
    /// # Errors
    /// Returns the first unknown label id or malformed pattern found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, rule) in &self.issue {
            self.check_label(id, "issue")?;
            check_conditions("issue", id, &rule.conditions)?;
        }
        for (id, rule) in &self.pr {
            self.check_label(id, "pr")?;
            check_conditions("pr", id, &rule.conditions)?;
        }
        for id in self.issue_fallback.labels() {
            self.check_label(id, "issue_fallback")?;
        }
        for id in self.pr_fallback.labels() {
            self.check_label(id, "pr_fallback")?;
        }
        self.check_label(&self.skip_labeling, "skip_labeling")?;
        Ok(())
    }

    /// Label id to display name table, built once per run.
    #[must_use]
    pub fn display_names(&self) -> HashMap<String, String> {
        self.labels
            .iter()
            .map(|(id, spec)| (id.clone(), spec.name.clone()))
            .collect()
    }

    fn check_label(&self, id: &str, section: &'static str) -> Result<(), ConfigError> {
        if self.labels.contains_key(id) {
            Ok(())
        } else {
            Err(ConfigError::UnknownLabel {
                section,
                label: id.to_string(),
            })
        }
    }
}

fn check_conditions<C: Condition>(
    section: &'static str,
    label: &str,
    conditions: &[C],
) -> Result<(), ConfigError> {
    for condition in conditions {
        // Unknown kinds are tolerated at runtime but flagged here,
        // otherwise a typo is indistinguishable from a non-match.
        if condition.is_unknown() {
            warn!("{section} rule \"{label}\" has a condition of unknown type, it will never match");
        }
        if let Some(pattern) = condition.pattern() {
            Regex::new(pattern).map_err(|source| ConfigError::BadPattern {
                section,
                label: label.to_string(),
                pattern: pattern.to_string(),
                source: Box::new(source),
            })?;
        }
    }
    Ok(())
}
