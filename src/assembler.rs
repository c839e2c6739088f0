//! Projections of an [`AuditResult`] for display and export.

use serde::Serialize;

use crate::error::AuditError;
use crate::model::{AuditResult, ClassifiedProperty, MapBucket, UNPROTECTED_BUCKET};

/// Which partitions an audit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditMode {
    /// Both partitions
    #[default]
    Audit,
    ProtectedOnly,
    UnprotectedOnly,
}

impl AuditMode {
    /// Pick the mode from CLI flags.
    ///
    /// Both flags together is a usage error. A single-map audit is always
    /// `ProtectedOnly`: there is no global remainder for one map.
    pub fn resolve(
        map: Option<&str>,
        show_protected: bool,
        show_unprotected: bool,
    ) -> Result<Self, AuditError> {
        if show_protected && show_unprotected {
            return Err(AuditError::Usage(
                "--protected and --unprotected are mutually exclusive".to_string(),
            ));
        }
        if map.is_some() {
            return Ok(AuditMode::ProtectedOnly);
        }
        Ok(if show_protected {
            AuditMode::ProtectedOnly
        } else if show_unprotected {
            AuditMode::UnprotectedOnly
        } else {
            AuditMode::Audit
        })
    }

    pub fn needs_protected(&self) -> bool {
        !matches!(self, AuditMode::UnprotectedOnly)
    }

    pub fn needs_unprotected(&self) -> bool {
        !matches!(self, AuditMode::ProtectedOnly)
    }
}

/// Classification column of the flat audit export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Protected,
    Unprotected,
}

/// One row of the flat audit export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditRow {
    pub status: Status,
    pub shield_map: String,
    pub property_name: String,
    pub hostnames: String,
}

/// One row of the protected-only view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProtectedRow {
    pub shield_map: String,
    pub property_name: String,
    pub hostnames: String,
}

/// One row of the unprotected-only view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnprotectedRow {
    pub property_name: String,
    pub hostnames: String,
}

/// Property inside a nested bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NestedProperty {
    pub property_name: String,
    pub hostnames: Vec<String>,
}

/// Bucket shape shared by both partitions in nested output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NestedBucket {
    pub shield_map: String,
    pub properties: Vec<NestedProperty>,
}

/// Nested audit document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NestedReport {
    pub protected: Vec<NestedBucket>,
    pub unprotected: Vec<NestedBucket>,
}

/// Mode-specific shape of a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditView {
    Audit(NestedReport),
    ProtectedOnly(Vec<ProtectedRow>),
    UnprotectedOnly(Vec<UnprotectedRow>),
}

/// Shape `result` for `mode`
pub fn assemble(result: &AuditResult, mode: AuditMode) -> AuditView {
    match mode {
        AuditMode::Audit => AuditView::Audit(nested_report(result)),
        AuditMode::ProtectedOnly => AuditView::ProtectedOnly(protected_rows(result)),
        AuditMode::UnprotectedOnly => AuditView::UnprotectedOnly(unprotected_rows(result)),
    }
}

/// Both partitions with the unprotected list wrapped in a synthetic bucket
pub fn nested_report(result: &AuditResult) -> NestedReport {
    let unprotected = MapBucket {
        shield_map: UNPROTECTED_BUCKET.to_string(),
        properties: result.unprotected.clone(),
    };
    NestedReport {
        protected: result.protected.iter().map(nested_bucket).collect(),
        unprotected: vec![nested_bucket(&unprotected)],
    }
}

fn nested_bucket(bucket: &MapBucket) -> NestedBucket {
    NestedBucket {
        shield_map: bucket.shield_map.clone(),
        properties: bucket
            .properties
            .iter()
            .map(|p| NestedProperty {
                property_name: p.display_name(),
                hostnames: p.hostnames.clone(),
            })
            .collect(),
    }
}

/// Flat rows for the tabular audit export
pub fn audit_rows(result: &AuditResult) -> Vec<AuditRow> {
    let protected = result.protected.iter().flat_map(|bucket| {
        bucket.properties.iter().map(move |p| AuditRow {
            status: Status::Protected,
            shield_map: bucket.shield_map.clone(),
            property_name: p.display_name(),
            hostnames: p.joined_hostnames(),
        })
    });
    let unprotected = result.unprotected.iter().map(|p| AuditRow {
        status: Status::Unprotected,
        shield_map: String::new(),
        property_name: p.display_name(),
        hostnames: p.joined_hostnames(),
    });
    protected.chain(unprotected).collect()
}

fn protected_rows(result: &AuditResult) -> Vec<ProtectedRow> {
    result
        .protected
        .iter()
        .flat_map(|bucket| {
            bucket.properties.iter().map(move |p| ProtectedRow {
                shield_map: bucket.shield_map.clone(),
                property_name: p.display_name(),
                hostnames: p.joined_hostnames(),
            })
        })
        .collect()
}

fn unprotected_rows(result: &AuditResult) -> Vec<UnprotectedRow> {
    result
        .unprotected
        .iter()
        .map(|p: &ClassifiedProperty| UnprotectedRow {
            property_name: p.display_name(),
            hostnames: p.joined_hostnames(),
        })
        .collect()
}
