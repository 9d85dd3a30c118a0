//! Addon manifest model and validation.
//!
//! The manifest is the public identity of an addon: it names the addon and
//! declares which resource kinds it answers queries for. It is validated and
//! serialized exactly once, at addon construction; every `/manifest.json`
//! response afterwards reuses the same cached byte buffer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Hard ceiling on the serialized manifest, in bytes.
///
/// Addon directories reject manifests larger than this, so exceeding it is a
/// configuration error at construction time rather than a request-time
/// surprise.
pub const MAX_MANIFEST_BYTES: usize = 8192;

/// Addon manifest as exchanged on `/manifest.json`.
///
/// Unknown fields are kept in `rest` so a manifest round-trips without
/// dropping protocol extensions this crate does not model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resource kinds this addon serves ("stream", "meta", ...).
    pub resources: Vec<String>,
    /// Content types the addon understands ("movie", "series", ...).
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, rename = "idPrefixes", skip_serializing_if = "Vec::is_empty")]
    pub id_prefixes: Vec<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Lint(String),
    #[error("manifest is {0} bytes, exceeds the {MAX_MANIFEST_BYTES} byte limit")]
    TooLarge(usize),
    #[error("manifest serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of running lint rules against a manifest.
///
/// Errors are fatal to construction; warnings are surfaced through tracing
/// and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Pluggable manifest lint rule set.
///
/// The dispatch core treats validation as a black box: it only cares whether
/// the report is valid and what the first error says. Integrators can swap in
/// a stricter rule set via [`crate::Addon::with_validator`].
pub trait ManifestValidator: Send + Sync {
    fn validate(&self, manifest: &Manifest) -> LintReport;
}

/// Built-in structural rules: required identity fields, at least one
/// declared resource, no duplicate resource kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLinter;

impl ManifestValidator for DefaultLinter {
    fn validate(&self, manifest: &Manifest) -> LintReport {
        let mut report = LintReport::default();

        if manifest.id.is_empty() {
            report.error("manifest.id must be a non-empty string");
        }
        if manifest.version.is_empty() {
            report.error("manifest.version must be a non-empty string");
        }
        if manifest.name.is_empty() {
            report.error("manifest.name must be a non-empty string");
        }
        if manifest.resources.is_empty() {
            report.error("manifest.resources must declare at least one resource kind");
        }

        let mut seen = std::collections::HashSet::new();
        for resource in &manifest.resources {
            if resource.is_empty() {
                report.error("manifest.resources must not contain empty kinds");
            }
            if !seen.insert(resource.as_str()) {
                report.error(format!("duplicate resource kind '{resource}' in manifest"));
            }
        }

        if manifest.types.is_empty() {
            report.warn("manifest.types is empty; clients cannot filter by content type");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_manifest() -> Manifest {
        serde_json::from_value(json!({
            "id": "org.example.addon",
            "version": "1.0.0",
            "name": "Example Addon",
            "resources": ["stream", "meta"],
            "types": ["movie"]
        }))
        .unwrap()
    }

    #[test]
    fn default_linter_accepts_valid_manifest() {
        let report = DefaultLinter.validate(&sample_manifest());
        assert!(report.valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn default_linter_rejects_missing_id() {
        let mut manifest = sample_manifest();
        manifest.id.clear();

        let report = DefaultLinter.validate(&manifest);
        assert!(!report.valid());
        assert_eq!(report.errors[0], "manifest.id must be a non-empty string");
    }

    #[test]
    fn default_linter_rejects_no_resources() {
        let mut manifest = sample_manifest();
        manifest.resources.clear();

        let report = DefaultLinter.validate(&manifest);
        assert!(!report.valid());
    }

    #[test]
    fn default_linter_rejects_duplicate_resources() {
        let mut manifest = sample_manifest();
        manifest.resources = vec!["stream".into(), "stream".into()];

        let report = DefaultLinter.validate(&manifest);
        assert!(report.errors.iter().any(|e| e.contains("duplicate")));
    }

    #[test]
    fn default_linter_warns_on_empty_types() {
        let mut manifest = sample_manifest();
        manifest.types.clear();

        let report = DefaultLinter.validate(&manifest);
        assert!(report.valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn manifest_keeps_unknown_fields() {
        let manifest: Manifest = serde_json::from_value(json!({
            "id": "org.example.addon",
            "version": "1.0.0",
            "name": "Example Addon",
            "resources": ["stream"],
            "behaviorHints": { "configurable": true }
        }))
        .unwrap();

        assert!(manifest.rest.contains_key("behaviorHints"));

        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back["behaviorHints"]["configurable"], json!(true));
    }

    #[test]
    fn serialization_is_deterministic() {
        let manifest = sample_manifest();
        let a = serde_json::to_vec(&manifest).unwrap();
        let b = serde_json::to_vec(&manifest).unwrap();
        assert_eq!(a, b);
    }
}
