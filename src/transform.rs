use std::{path::PathBuf, sync::Arc};

use regex::Regex;
use swc_core::{
    common::{
        comments::SingleThreadedComments, sync::Lrc, FileName, Globals, Mark, SourceFile,
        SourceMap, GLOBALS,
    },
    ecma::{
        ast::{EsVersion, Module},
        codegen::{text_writer::JsWriter, Config, Emitter},
        parser::{
            error::Error as ParserError, lexer::Lexer, EsSyntax, Parser, StringInput, Syntax,
            TsSyntax,
        },
        transforms::base::resolver,
        visit::{VisitMutWith, VisitWith},
    },
};
use tracing::debug;

use crate::bindings::{Bindings, TrackedNames};
use crate::config::CodemodConfig;
use crate::error::CodemodError;
use crate::resolver::Resolver;
use crate::rewrite::RewriteSet;
use crate::visitors::{DeprecationVisitor, ThemeVars};
use crate::warning::{FrameSource, Warning};

/// Decides whether a rewritten file may be re-emitted by the printer.
pub type FormatFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub source: String,
    pub changed: bool,
    pub warnings: Vec<Warning>,
}

impl TransformOutput {
    fn unchanged(source: &str) -> Self {
        Self { source: source.to_string(), changed: false, warnings: vec![] }
    }
}

// -----------------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------------

pub(crate) struct ParsedModule {
    pub cm: Lrc<SourceMap>,
    pub fm: Lrc<SourceFile>,
    pub module: Module,
    pub comments: SingleThreadedComments,
}

pub(crate) fn syntax_for(filename: &str) -> Syntax {
    if filename.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax { tsx: true, ..Default::default() })
    } else if [".ts", ".mts", ".cts"].iter().any(|ext| filename.ends_with(ext)) {
        Syntax::Typescript(TsSyntax { dts: filename.ends_with(".d.ts"), ..Default::default() })
    } else {
        Syntax::Es(EsSyntax { jsx: true, ..Default::default() })
    }
}

fn parse_error(filename: &str, e: &ParserError) -> CodemodError {
    CodemodError::Parse { filename: filename.to_string(), message: e.kind().msg().to_string() }
}

/// Parse `source` and resolve its scopes. Must run inside a `GLOBALS` scope.
pub(crate) fn parse(filename: &str, source: &str) -> Result<ParsedModule, CodemodError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        Lrc::new(FileName::Real(PathBuf::from(filename))),
        source.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let syntax = syntax_for(filename);
    let is_ts = syntax.typescript();

    let lexer = Lexer::new(syntax, EsVersion::latest(), StringInput::from(&*fm), Some(&comments));
    let mut parser = Parser::new_from(lexer);
    let mut module = parser.parse_module().map_err(|e| parse_error(filename, &e))?;
    if let Some(e) = parser.take_errors().first() {
        return Err(parse_error(filename, e));
    }

    module.visit_mut_with(&mut resolver(Mark::new(), Mark::new(), is_ts));
    Ok(ParsedModule { cm, fm, module, comments })
}

#[cfg(test)]
pub(crate) fn with_module<R>(filename: &str, source: &str, f: impl FnOnce(&ParsedModule) -> R) -> R {
    GLOBALS.set(&Globals::new(), || {
        let parsed = parse(filename, source).expect("test source parses");
        f(&parsed)
    })
}

fn print(filename: &str, parsed: &ParsedModule) -> Result<String, CodemodError> {
    let mut buf = vec![];
    {
        let mut writer = JsWriter::new(parsed.cm.clone(), "\n", &mut buf, None);
        writer.set_indent_str("  ");
        let mut emitter = Emitter {
            cfg: Config::default(),
            comments: Some(&parsed.comments),
            cm: parsed.cm.clone(),
            wr: writer,
        };
        emitter
            .emit_module(&parsed.module)
            .map_err(|source| CodemodError::Emit { filename: filename.to_string(), source })?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// -----------------------------------------------------------------------------
// Driver
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct Codemod {
    config: CodemodConfig,
    package: Regex,
    format_filter: FormatFilter,
}

impl Codemod {
    pub fn new(config: CodemodConfig) -> Result<Self, CodemodError> {
        let package = Regex::new(&config.package_pattern)?;
        let excluded = config.reformat_exclude.clone();
        let format_filter: FormatFilter =
            Arc::new(move |filename: &str| !excluded.iter().any(|suffix| filename.ends_with(suffix.as_str())));
        Ok(Self { config, package, format_filter })
    }

    /// Replace the suffix-based reformat exclusion with a custom predicate.
    pub fn with_format_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.format_filter = Arc::new(filter);
        self
    }

    pub fn transform(&self, filename: &str, source: &str) -> Result<TransformOutput, CodemodError> {
        GLOBALS.set(&Globals::new(), || self.transform_module(filename, source))
    }

    fn transform_module(&self, filename: &str, source: &str) -> Result<TransformOutput, CodemodError> {
        let mut parsed = parse(filename, source)?;
        let table = &self.config.deprecations;
        let vars_export = self.config.vars_export.as_str();

        let tracked = TrackedNames::collect(&parsed.module, &self.package, table, vars_export);
        if tracked.is_empty() {
            return Ok(TransformOutput::unchanged(source));
        }

        let frames = FrameSource::new(filename, source, &parsed.cm);
        let bindings = Bindings::collect(&parsed.module);
        let findings = {
            let theme = ThemeVars::collect(&parsed.module, &tracked, table, vars_export, &frames)?;
            let resolver = Resolver::new(table, &bindings, &frames);
            let mut visitor = DeprecationVisitor::new(resolver, &tracked, theme, &frames);
            parsed.module.visit_with(&mut visitor);
            visitor.into_findings()
        };

        let mut rewrites = RewriteSet::default();
        for rewrite in findings.rewrites {
            rewrites.insert(rewrite);
        }

        let output = if rewrites.is_empty() {
            source.to_string()
        } else if self.config.reformat && (self.format_filter)(filename) {
            rewrites.apply(&mut parsed.module);
            print(filename, &parsed)?
        } else {
            rewrites.splice(source, parsed.fm.start_pos)
        };

        debug!(
            file = filename,
            rewrites = rewrites.len(),
            warnings = findings.warnings.len(),
            "transformed module"
        );
        Ok(TransformOutput {
            changed: output != source,
            source: output,
            warnings: findings.warnings,
        })
    }
}
