use std::fmt;

use serde::Serialize;
use swc_core::common::{SourceMap, Span};

use crate::code_frame::{render_code_frame, SourceSpan};
use crate::error::CodemodError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Value comes from another module.
    UntraceableImport,
    /// Object key computed from a non-literal expression.
    UntraceableProperty,
    /// Theme variable accessed with a non-literal computed key.
    UntraceableMember,
    /// Variable is assigned again after its declaration.
    Reassigned,
    /// Variable is bound by an array, rest or computed-key pattern.
    UntraceableBinding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where a traced value is consumed: `prop` is unset for spreads and call arguments.
#[derive(Debug, Clone, Copy)]
pub struct Usage<'a> {
    pub owner: &'a str,
    pub prop: Option<&'a str>,
    pub span: Span,
}

impl Usage<'_> {
    fn describe(&self, variable: &str) -> String {
        match self.prop {
            Some(prop) => format!(
                "Variable `{variable}` is assigned to the {prop} prop of {}",
                self.owner
            ),
            None => format!("Variable `{variable}` is passed to {}", self.owner),
        }
    }
}

// -----------------------------------------------------------------------------
// Rendering against one source file
// -----------------------------------------------------------------------------

pub struct FrameSource<'a> {
    pub filename: &'a str,
    pub code: &'a str,
    pub cm: &'a SourceMap,
}

impl<'a> FrameSource<'a> {
    pub fn new(filename: &'a str, code: &'a str, cm: &'a SourceMap) -> Self {
        Self { filename, code, cm }
    }

    pub fn locate(&self, span: Span) -> Option<SourceSpan> {
        if span.is_dummy() {
            return None;
        }
        let lo = self.cm.lookup_char_pos(span.lo());
        let hi = self.cm.lookup_char_pos(span.hi());
        Some(SourceSpan {
            start_line: lo.line,
            start_column: lo.col.0,
            end_line: hi.line,
            end_column: hi.col.0,
        })
    }

    pub fn frame(&self, span: Span) -> String {
        self.locate(span)
            .map(|s| render_code_frame(self.code, s))
            .unwrap_or_default()
    }

    pub fn untraceable_import(
        &self,
        variable: &str,
        imported: &str,
        import_source: &str,
        import_span: Span,
        usage: Usage<'_>,
    ) -> Warning {
        let message = format!(
            "Untraceable import: {file}\n\n\
             {described}, but is imported from '{import_source}'.\n\
             You should check that there are no usages of deprecated values in that file.\n\n\
             Imported as `{imported}` at\n{import_frame}\n\n\
             Used at\n{used}",
            file = self.filename,
            described = usage.describe(variable),
            import_frame = self.frame(import_span),
            used = self.frame(usage.span),
        );
        Warning { kind: WarningKind::UntraceableImport, message }
    }

    pub fn untraceable_property(&self, owner: &str, key_span: Span) -> Warning {
        let message = format!(
            "Untraceable computed object property:\n  {file}\n\n\
             The following object is being spread onto '{owner}' and contains computed properties.\n\
             You should check that there are no usages of deprecated properties in this object.\n\n\
             {frame}",
            file = self.filename,
            frame = self.frame(key_span),
        );
        Warning { kind: WarningKind::UntraceableProperty, message }
    }

    pub fn untraceable_member(&self, prop_span: Span) -> Warning {
        let message = format!(
            "Untraceable computed object property:\n  {file}\n\n\
             You should check that there are no usages of deprecated properties in this object.\n\n\
             {frame}",
            file = self.filename,
            frame = self.frame(prop_span),
        );
        Warning { kind: WarningKind::UntraceableMember, message }
    }

    pub fn reassigned(&self, variable: &str, usage: Usage<'_>, assignments: &[Span]) -> Warning {
        let sites = assignments
            .iter()
            .map(|s| self.frame(*s))
            .collect::<Vec<_>>()
            .join("\n\n");
        let message = format!(
            "Untraceable reassignment: {file}\n\n\
             {described}, but is reassigned after it is declared.\n\
             Only its initial value was checked for deprecated values.\n\n\
             Reassigned at\n{sites}",
            file = self.filename,
            described = usage.describe(variable),
        );
        Warning { kind: WarningKind::Reassigned, message }
    }

    pub fn untraceable_binding(&self, variable: &str, pattern_span: Span, usage: Usage<'_>) -> Warning {
        let message = format!(
            "Untraceable variable: {file}\n\n\
             {described}, but its value comes from a pattern that cannot be followed.\n\
             You should check that it does not hold deprecated values.\n\n\
             Declared at\n{declared}\n\n\
             Used at\n{used}",
            file = self.filename,
            described = usage.describe(variable),
            declared = self.frame(pattern_span),
            used = self.frame(usage.span),
        );
        Warning { kind: WarningKind::UntraceableBinding, message }
    }

    pub fn untraceable_object_key(&self, key_span: Span) -> CodemodError {
        let message = format!(
            "Untraceable object key:\n  {file}\n\n\
             You should check that there are no usages of deprecated properties in this object.\n\n\
             {frame}",
            file = self.filename,
            frame = self.frame(key_span),
        );
        CodemodError::UntraceableObjectKey {
            filename: self.filename.to_string(),
            message,
        }
    }
}
