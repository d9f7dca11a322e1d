//! Run orchestration: discover files, analyze them, consult the advisory
//! collaborator once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::advisory::{self, is_sentinel, AdvisoryCollaborator, CategorizedFindings};
use crate::analysis::{
    AnalysisReport, ComplianceAnalyzer, Diagnostic, DiagnosticCategory, FileReport, Severity,
};
use crate::config::Config;
use crate::rules::{self, lookup, Technology, TechnologyRuleSet};
use crate::scan::Position;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "build",
    "node_modules",
    "vendor",
    "Pods",
    "DerivedData",
    "target",
];

/// Where source files come from.
pub trait SourceStore {
    /// Files to consider, in a stable order.
    fn list(&self) -> anyhow::Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> anyhow::Result<String>;

    /// Path as shown in reports.
    fn display_path(&self, path: &Path) -> String {
        path.to_string_lossy().to_string()
    }
}

/// Source files under a directory (or a single file) on disk.
pub struct FsStore {
    root: PathBuf,
    excluded: GlobSet,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(root: P, excluded_paths: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
            builder.add(glob);
        }

        Ok(Self {
            root: root.as_ref().to_path_buf(),
            excluded: builder.build()?,
        })
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.is_match(self.relative(path)) || self.excluded.is_match(path)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(rules::for_extension)
        .is_some()
}

impl SourceStore for FsStore {
    fn list(&self) -> anyhow::Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
            })
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_file() && is_supported(path) && !self.is_excluded(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn read(&self, path: &Path) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn display_path(&self, path: &Path) -> String {
        let relative = self.relative(path);
        if relative.as_os_str().is_empty() {
            path.to_string_lossy().to_string()
        } else {
            relative.to_string_lossy().to_string()
        }
    }
}

/// Whether a file is worth analyzing: it mentions the facade or calls the
/// initializer.
pub fn is_candidate(rules: &TechnologyRuleSet, source: &str) -> bool {
    source.contains(rules.facade_root())
        || source.contains(&format!("{}(", rules.initialization.method))
}

/// Drives analysis over a project.
pub struct Runner {
    default_technology: Technology,
    technology_override: Option<Technology>,
    advisory: Option<Box<dyn AdvisoryCollaborator>>,
}

impl Runner {
    pub fn new(config: &Config) -> Self {
        Self {
            default_technology: config.default_technology,
            technology_override: None,
            advisory: None,
        }
    }

    /// Force one technology for every file.
    pub fn technology(mut self, technology: Option<Technology>) -> Self {
        self.technology_override = technology;
        self
    }

    /// Attach an advisory collaborator, consulted once per run.
    pub fn advisory(mut self, collaborator: Box<dyn AdvisoryCollaborator>) -> Self {
        self.advisory = Some(collaborator);
        self
    }

    pub fn technology_for(&self, file_name: &str) -> Technology {
        self.technology_override
            .unwrap_or_else(|| rules::classify_or(file_name, self.default_technology))
    }

    /// Analyze a single file's text.
    pub fn analyze_source(&self, file_name: &str, source: &str) -> FileReport {
        let technology = self.technology_for(file_name);
        let analyzer = ComplianceAnalyzer::new(lookup(technology));
        let analysis = analyzer.analyze_source(file_name, source);

        debug!(
            file = file_name,
            technology = %technology,
            mode = %analysis.mode,
            initialized = analysis.initialized,
            diagnostics = analysis.diagnostics.len(),
            "analyzed file"
        );

        FileReport {
            path: file_name.to_string(),
            technology,
            mode: analysis.mode,
            initialized: analysis.initialized,
            diagnostics: analysis.diagnostics,
        }
    }

    /// Analyze every candidate file in the store, then run the advisory
    /// exchange if a collaborator is attached.
    pub fn run(&self, store: &dyn SourceStore) -> anyhow::Result<AnalysisReport> {
        let mut report = AnalysisReport::new();
        let mut project_code = String::new();
        let mut seen: BTreeMap<Technology, usize> = BTreeMap::new();

        for path in store.list()? {
            let shown = store.display_path(&path);
            let source = match store.read(&path) {
                Ok(source) => source,
                Err(e) => {
                    warn!(file = %shown, error = %e, "skipping unreadable file");
                    continue;
                }
            };
            report.scanned += 1;

            let technology = self.technology_for(&shown);
            if !is_candidate(lookup(technology), &source) {
                debug!(file = %shown, "no SDK usage, skipping");
                continue;
            }

            *seen.entry(technology).or_default() += 1;
            project_code.push_str(&format!("\n// File: {}\n{}\n", shown, source));
            report.files.push(self.analyze_source(&shown, &source));
        }

        let technology = dominant(&seen).unwrap_or(self.default_technology);
        report.project.extend(project_diagnostic(lookup(technology), &report.files));

        if let Some(collaborator) = &self.advisory {
            let rules = lookup(technology);
            let runtime = tokio::runtime::Runtime::new()?;
            let findings = runtime.block_on(advisory::advise(
                collaborator.as_ref(),
                rules,
                &project_code,
            ));
            report.advisory = Some(findings);
        }

        Ok(report)
    }
}

/// Project-level initialization finding.
///
/// A project without any SDK usage, or one where no file calls the
/// initializer, gets a single `missing_initialization` error. It is left out
/// when a file already carries that error.
pub fn project_diagnostic(rules: &TechnologyRuleSet, files: &[FileReport]) -> Option<Diagnostic> {
    let reported = files
        .iter()
        .flat_map(|f| &f.diagnostics)
        .any(|d| d.category == DiagnosticCategory::MissingInitialization);
    if reported || files.iter().any(|f| f.initialized) {
        return None;
    }

    let message = if files.is_empty() {
        "No Mapp SDK code found in the project".to_string()
    } else {
        format!(
            "Missing SDK initialization: {}() not found in any file",
            rules.qualified_initializer()
        )
    };

    Some(
        Diagnostic::new(
            Severity::Error,
            DiagnosticCategory::MissingInitialization,
            Position::ORIGIN,
            message,
        )
        .with_suggestion(rules.initialization.example),
    )
}

/// Most frequent technology; ties go to the earlier one.
fn dominant(seen: &BTreeMap<Technology, usize>) -> Option<Technology> {
    let mut best: Option<(Technology, usize)> = None;
    for (&tech, &count) in seen {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tech, count));
        }
    }
    best.map(|(tech, _)| tech)
}

/// Project-level diagnostics derived from advisory findings.
///
/// Critical issues become warnings and missing implementations become info;
/// placeholder entries are skipped.
pub fn advisory_diagnostics(findings: &CategorizedFindings) -> Vec<Diagnostic> {
    let critical = findings
        .critical_issues
        .iter()
        .filter(|e| !is_sentinel(e))
        .map(|e| {
            Diagnostic::new(
                Severity::Warning,
                DiagnosticCategory::AdvisoryCritical,
                Position::ORIGIN,
                e.as_str(),
            )
        });
    let missing = findings
        .missing_implementations
        .iter()
        .filter(|e| !is_sentinel(e))
        .map(|e| {
            Diagnostic::new(
                Severity::Info,
                DiagnosticCategory::AdvisoryMissing,
                Position::ORIGIN,
                e.as_str(),
            )
        });
    critical.chain(missing).collect()
}
