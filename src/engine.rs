//! The measurement engine as seen by the listener.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CovtermError, Result};
use crate::model::{ReportNode, SuiteReport};

/// The class under test and the source file measurement is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestResource {
    pub src_class: String,
    pub src_file: String,
}

pub trait CoverageEngine {
    /// Begin measuring, restricted to `resource`'s source file.
    fn start(&mut self, resource: &TestResource) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Everything measured so far.
    fn report(&self) -> Result<SuiteReport>;
}

/// Engine backed by a previously collected report tree. Starting a test
/// case marks its source file as measured; `report` returns the subset of the
/// tree that was measured at least once.
#[derive(Debug)]
pub struct SnapshotEngine {
    snapshot: SuiteReport,
    measured: BTreeSet<String>,
    active: Option<TestResource>,
}

impl SnapshotEngine {
    pub fn new(snapshot: SuiteReport) -> Self {
        Self {
            snapshot,
            measured: BTreeSet::new(),
            active: None,
        }
    }

    /// Load the snapshot from `path`. A missing file means there is nothing
    /// to measure with.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CovtermError::MeasurementUnavailable(format!(
                "missing coverage snapshot {}",
                path.display()
            )));
        }
        Ok(Self::new(crate::ingest::load_report(path)?))
    }

    pub fn is_measuring(&self) -> bool {
        self.active.is_some()
    }
}

impl CoverageEngine for SnapshotEngine {
    fn start(&mut self, resource: &TestResource) -> Result<()> {
        debug!(class = %resource.src_class, file = %resource.src_file, "start measurement");
        self.measured.insert(resource.src_file.clone());
        self.active = Some(resource.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(resource) = self.active.take() {
            debug!(class = %resource.src_class, "stop measurement");
        }
        Ok(())
    }

    fn report(&self) -> Result<SuiteReport> {
        let children = self
            .snapshot
            .root
            .files()
            .into_iter()
            .filter(|file| self.measured.contains(&file.path))
            .map(|file| ReportNode::File(file.clone()))
            .collect();
        let path = match &self.snapshot.root {
            ReportNode::Directory { path, .. } => path.clone(),
            ReportNode::File(_) => String::new(),
        };
        Ok(SuiteReport::from_root(ReportNode::Directory { path, children }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileNode;

    fn snapshot() -> SuiteReport {
        let children = ["src/A.php", "src/B.php"]
            .into_iter()
            .map(|p| ReportNode::File(FileNode::new(p)))
            .collect();
        SuiteReport::from_root(ReportNode::Directory {
            path: "src".into(),
            children,
        })
    }

    fn resource(file: &str) -> TestResource {
        TestResource {
            src_class: "Acme\\A".into(),
            src_file: file.into(),
        }
    }

    #[test]
    fn test_report_only_measured_files() {
        let mut engine = SnapshotEngine::new(snapshot());
        assert!(engine.report().unwrap().root.files().is_empty());

        engine.start(&resource("src/B.php")).unwrap();
        assert!(engine.is_measuring());
        engine.stop().unwrap();
        assert!(!engine.is_measuring());

        let report = engine.report().unwrap();
        let paths: Vec<_> = report.root.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, ["src/B.php"]);
    }

    #[test]
    fn test_open_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotEngine::open(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CovtermError::MeasurementUnavailable(_)));
        assert!(err.to_string().starts_with("Code coverage disabled (missing coverage snapshot"));
    }
}
