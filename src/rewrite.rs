use std::collections::BTreeMap;

use swc_core::{
    common::{BytePos, Span, Spanned},
    ecma::{
        ast::{IdentName, Module, Str},
        visit::{VisitMut, VisitMutWith},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// New value for a string literal; quotes are kept as written.
    StringValue(String),
    /// New value for a JSX attribute string, which has no escape sequences.
    JsxAttrValue(String),
    /// New name for a member property identifier.
    IdentName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub span: Span,
    pub replacement: Replacement,
}

impl Rewrite {
    pub fn string(s: &Str, value: &str) -> Self {
        Self { span: s.span, replacement: Replacement::StringValue(value.to_string()) }
    }

    pub fn jsx_attr(s: &Str, value: &str) -> Self {
        Self { span: s.span, replacement: Replacement::JsxAttrValue(value.to_string()) }
    }

    pub fn ident(name: &IdentName, value: &str) -> Self {
        Self { span: name.span(), replacement: Replacement::IdentName(value.to_string()) }
    }
}

/// Rewrites keyed by start position. The first rewrite recorded for a node wins.
#[derive(Debug, Default)]
pub struct RewriteSet {
    by_pos: BTreeMap<BytePos, Rewrite>,
}

impl RewriteSet {
    pub fn insert(&mut self, rewrite: Rewrite) -> bool {
        if self.by_pos.contains_key(&rewrite.span.lo()) {
            return false;
        }
        self.by_pos.insert(rewrite.span.lo(), rewrite);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_pos.len()
    }

    fn get(&self, span: Span) -> Option<&Replacement> {
        self.by_pos
            .get(&span.lo())
            .filter(|r| r.span.hi() == span.hi())
            .map(|r| &r.replacement)
    }

    /// Splice every rewrite into `source`, leaving all other bytes untouched.
    /// `start_pos` is the position of the first byte of `source` in the source map.
    pub fn splice(&self, source: &str, start_pos: BytePos) -> String {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for rewrite in self.by_pos.values() {
            let (Some(start), Some(end)) = (
                rewrite.span.lo().0.checked_sub(start_pos.0),
                rewrite.span.hi().0.checked_sub(start_pos.0),
            ) else {
                continue;
            };
            let (start, end) = (start as usize, end as usize);
            if rewrite.span.is_dummy()
                || start < cursor
                || end > source.len()
                || !source.is_char_boundary(start)
                || !source.is_char_boundary(end)
            {
                continue;
            }
            out.push_str(&source[cursor..start]);
            match &rewrite.replacement {
                Replacement::StringValue(value) => {
                    let quote = match source[start..end].chars().next() {
                        Some(q @ ('"' | '\'')) => q,
                        _ => '\'',
                    };
                    out.push(quote);
                    push_escaped(&mut out, value, quote);
                    out.push(quote);
                }
                Replacement::JsxAttrValue(value) => push_jsx_attr(&mut out, value, &source[start..end]),
                Replacement::IdentName(name) => out.push_str(name),
            }
            cursor = end;
        }
        out.push_str(&source[cursor..]);
        out
    }

    /// Apply every rewrite to the syntax tree, for callers that re-print it.
    pub fn apply(&self, module: &mut Module) {
        module.visit_mut_with(&mut ApplyRewrites { set: self });
    }
}

fn push_escaped(out: &mut String, value: &str, quote: char) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

/// JSX attribute strings cannot escape their quote: switch to the other quote,
/// or to an expression container when the value holds both.
fn push_jsx_attr(out: &mut String, value: &str, original: &str) {
    let written = match original.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => '"',
    };
    let quote = [written, if written == '"' { '\'' } else { '"' }]
        .into_iter()
        .find(|q| !value.contains(*q));
    match quote {
        Some(q) => {
            out.push(q);
            out.push_str(value);
            out.push(q);
        }
        None => {
            out.push_str("{'");
            push_escaped(out, value, '\'');
            out.push_str("'}");
        }
    }
}

struct ApplyRewrites<'a> {
    set: &'a RewriteSet,
}

impl VisitMut for ApplyRewrites<'_> {
    fn visit_mut_str(&mut self, s: &mut Str) {
        if let Some(Replacement::StringValue(value) | Replacement::JsxAttrValue(value)) =
            self.set.get(s.span)
        {
            s.value = value.clone().into();
            s.raw = None;
        }
    }

    fn visit_mut_ident_name(&mut self, n: &mut IdentName) {
        if let Some(Replacement::IdentName(name)) = self.set.get(n.span) {
            n.sym = name.clone().into();
        }
    }
}
