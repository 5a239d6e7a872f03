//! In-memory representation of a coverage engine's report tree, plus the
//! read-only projections the renderer derives from it. The tree is what the
//! engine hands over; everything below `LineStatus` is rebuilt on every
//! render call and never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Compute a coverage percentage, returning 0.0 when the total is zero.
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Raw per-line entry as supplied by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLine {
    /// Explicit `null`: the line is not executable.
    Unmeasured,
    /// Plain hit count.
    Hits(u64),
    /// Identifiers of the test cases that executed the line.
    Tests(Vec<String>),
    /// Anything else the engine emitted.
    Malformed(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodNode {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub executable_lines: u64,
    pub executed_lines: u64,
    #[serde(default)]
    pub ccn: f64,
    #[serde(default)]
    pub crap: f64,
}

/// A class or trait declared in a file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassNode {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub methods: Vec<MethodNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileNode {
    pub path: String,
    /// 1-based line number to raw entry. Lines missing from the map were
    /// never seen by the engine.
    #[serde(default, deserialize_with = "line_map")]
    pub lines: BTreeMap<u32, RawLine>,
    #[serde(default)]
    pub classes: Vec<ClassNode>,
}

impl FileNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            lines: BTreeMap::new(),
            classes: Vec::new(),
        }
    }
}

// JSON object keys are always strings; parse them here so the tree can stay
// internally tagged. Keys that are not line numbers are dropped, which leaves
// whatever line they meant uncoverable.
fn line_map<'de, D>(deserializer: D) -> Result<BTreeMap<u32, RawLine>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, RawLine>::deserialize(deserializer)?;
    let mut lines = BTreeMap::new();
    for (key, value) in raw {
        match key.trim().parse::<u32>() {
            Ok(line) => {
                lines.insert(line, value);
            }
            Err(_) => debug!("Ignoring coverage entry with invalid line number '{key}'"),
        }
    }
    Ok(lines)
}

/// A node of the engine's report tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportNode {
    Directory {
        path: String,
        #[serde(default)]
        children: Vec<ReportNode>,
    },
    File(FileNode),
}

impl ReportNode {
    /// All file nodes below this one, depth-first in document order.
    #[must_use]
    pub fn files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        self.visit_files(&mut |file| out.push(file));
        out
    }

    pub fn visit_files<'a>(&'a self, visit: &mut dyn FnMut(&'a FileNode)) {
        match self {
            ReportNode::File(file) => visit(file),
            ReportNode::Directory { children, .. } => {
                for child in children {
                    child.visit_files(visit);
                }
            }
        }
    }
}

impl Default for ReportNode {
    fn default() -> Self {
        ReportNode::Directory {
            path: String::new(),
            children: Vec::new(),
        }
    }
}

/// Suite-wide counters shown in the summary block. Counters missing from a
/// dump read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SuiteTotals {
    pub tested_classes: u64,
    pub classes: u64,
    pub tested_methods: u64,
    pub methods: u64,
    pub executed_lines: u64,
    pub executable_lines: u64,
}

impl SuiteTotals {
    /// Count totals straight from a tree, for dumps that do not carry them.
    #[must_use]
    pub fn tally(root: &ReportNode) -> Self {
        let mut totals = SuiteTotals::default();
        root.visit_files(&mut |file| {
            for raw in file.lines.values() {
                match raw {
                    RawLine::Hits(hits) => {
                        totals.executable_lines += 1;
                        if *hits > 0 {
                            totals.executed_lines += 1;
                        }
                    }
                    RawLine::Tests(tests) => {
                        totals.executable_lines += 1;
                        if !tests.is_empty() {
                            totals.executed_lines += 1;
                        }
                    }
                    RawLine::Unmeasured | RawLine::Malformed(_) => {}
                }
            }

            for class in &file.classes {
                let mut executable = 0;
                let mut executed = 0;
                for method in class.methods.iter().filter(|m| m.executable_lines > 0) {
                    totals.methods += 1;
                    executable += method.executable_lines;
                    executed += method.executed_lines;
                    if MethodStat::from(method).is_fully_covered() {
                        totals.tested_methods += 1;
                    }
                }
                totals.classes += 1;
                if executed == executable {
                    totals.tested_classes += 1;
                }
            }
        });
        totals
    }
}

/// The complete input of one render call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SuiteReport {
    #[serde(default)]
    pub totals: Option<SuiteTotals>,
    pub root: ReportNode,
}

impl SuiteReport {
    /// Wrap a tree, tallying its totals.
    #[must_use]
    pub fn from_root(root: ReportNode) -> Self {
        let totals = SuiteTotals::tally(&root);
        Self {
            totals: Some(totals),
            root,
        }
    }

    /// Totals supplied with the report, or tallied from the tree.
    #[must_use]
    pub fn totals(&self) -> SuiteTotals {
        self.totals
            .unwrap_or_else(|| SuiteTotals::tally(&self.root))
    }
}

/// Coverage status of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Uncoverable,
    Covered { hits: u64 },
    Uncovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageRecord {
    pub line_number: u32,
    pub status: LineStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodStat {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub executable_lines: u64,
    pub executed_lines: u64,
    pub ccn: f64,
    pub crap: f64,
}

impl MethodStat {
    /// `None` for methods without executable lines.
    #[must_use]
    pub fn coverage_percent(&self) -> Option<f64> {
        (self.executable_lines > 0).then(|| percent(self.executed_lines, self.executable_lines))
    }

    /// Only an exact match counts. An engine claiming more executed than
    /// executable lines is reported and treated as not covered.
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        if self.executed_lines > self.executable_lines {
            debug!(
                "Method {} reports {} executed of {} executable lines",
                self.name, self.executed_lines, self.executable_lines
            );
        }
        self.executable_lines > 0 && self.executed_lines == self.executable_lines
    }
}

impl From<&MethodNode> for MethodStat {
    fn from(node: &MethodNode) -> Self {
        Self {
            name: node.name.clone(),
            start_line: node.start_line,
            end_line: node.end_line,
            executable_lines: node.executable_lines,
            executed_lines: node.executed_lines,
            ccn: node.ccn,
            crap: node.crap,
        }
    }
}

/// Per-class aggregate over the methods that have executable lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassStat {
    pub qualified_name: String,
    /// Path of the file that declared the class.
    pub file: String,
    pub methods: Vec<MethodStat>,
    pub methods_covered: u64,
    pub method_count: u64,
    pub statements_covered: u64,
    pub statement_count: u64,
}

impl ClassStat {
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.methods_covered >= self.method_count
    }
}

/// A file's classified lines and (if readable) its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: String,
    pub source_lines: Option<Vec<String>>,
    pub records: Vec<CoverageRecord>,
}
