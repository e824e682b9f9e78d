use serde::Serialize;
use tracing::{info, warn};

use crate::transform::Codemod;
use crate::warning::Warning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub filename: String,
    pub updated: bool,
    /// Rewritten source, present only when the file changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn updated(&self) -> usize {
        self.files.iter().filter(|f| f.updated).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.files.iter().flat_map(|f| &f.warnings)
    }

    pub fn summary(&self) -> String {
        format!("{}/{} files updated", self.updated(), self.total())
    }
}

impl Codemod {
    /// Transform every `(filename, source)` pair in order. A file that fails
    /// is recorded with its error and does not stop the rest.
    pub fn transform_all<I, N, S>(&self, files: I) -> BatchReport
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut report = BatchReport::default();
        for (filename, source) in files {
            let filename = filename.as_ref();
            let file = match self.transform(filename, source.as_ref()) {
                Ok(out) => FileReport {
                    filename: filename.to_string(),
                    updated: out.changed,
                    source: out.changed.then_some(out.source),
                    warnings: out.warnings,
                    error: None,
                },
                Err(e) => {
                    warn!(file = filename, error = %e, "codemod failed");
                    FileReport {
                        filename: filename.to_string(),
                        updated: false,
                        source: None,
                        warnings: vec![],
                        error: Some(e.to_string()),
                    }
                }
            };
            report.files.push(file);
        }
        info!("{}", report.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodemodConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn failing_files_do_not_stop_the_batch() {
        let codemod = Codemod::new(CodemodConfig::default()).unwrap();
        let report = codemod.transform_all([
            ("a.tsx", "import { Box } from 'braid-design-system';\n<Box background='card' />;\n"),
            ("broken.tsx", "const = ;"),
            ("c.ts", "export const x = 1;\n"),
            (
                "vars.ts",
                "import { vars } from 'braid-design-system';\nconst { standard } = vars.borderColor;\n",
            ),
        ]);

        assert_eq!(report.summary(), "1/4 files updated");
        assert_eq!(
            report.files[0].source.as_deref(),
            Some("import { Box } from 'braid-design-system';\n<Box background='surface' />;\n")
        );
        let failed: Vec<&str> = report.failures().map(|f| f.filename.as_str()).collect();
        assert_eq!(failed, ["broken.tsx", "vars.ts"]);
        assert_eq!(report.files[2].source, None);
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn serializes_reports() {
        let report = BatchReport {
            files: vec![FileReport {
                filename: "a.tsx".into(),
                updated: false,
                source: None,
                warnings: vec![],
                error: Some("failed to parse a.tsx: Unexpected token".into()),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "files": [{
                    "filename": "a.tsx",
                    "updated": false,
                    "warnings": [],
                    "error": "failed to parse a.tsx: Unexpected token",
                }]
            })
        );
    }
}
