use swc_core::{
    common::{Span, Spanned},
    ecma::ast::*,
};
use tracing::error;

use crate::bindings::{member_key, static_prop_key, BindingKind, Bindings};
use crate::deprecations::DeprecationTable;
use crate::rewrite::Rewrite;
use crate::warning::{FrameSource, Usage, Warning};

/// Hops a single candidate may take through bindings before tracing gives up.
pub const MAX_TRACE_DEPTH: usize = 10;

// -----------------------------------------------------------------------------
// Findings
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Findings {
    pub rewrites: Vec<Rewrite>,
    pub warnings: Vec<Warning>,
}

impl Findings {
    pub fn rewrite(rewrite: Rewrite) -> Self {
        Self { rewrites: vec![rewrite], warnings: vec![] }
    }

    pub fn warning(warning: Warning) -> Self {
        Self { rewrites: vec![], warnings: vec![warning] }
    }

    pub fn merge(&mut self, other: Findings) {
        self.rewrites.extend(other.rewrites);
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty() && self.warnings.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Trace context
// -----------------------------------------------------------------------------

/// Where a candidate value ends up. `prop` is unset until a deprecated prop
/// name has been seen, as for spread attributes and call arguments.
#[derive(Debug, Clone)]
pub struct TraceContext<'a> {
    pub owner: &'a str,
    pub prop: Option<String>,
    pub site: Span,
    pub depth: usize,
}

impl<'a> TraceContext<'a> {
    pub fn new(owner: &'a str, prop: Option<&str>, site: Span) -> Self {
        Self { owner, prop: prop.map(str::to_string), site, depth: 0 }
    }

    pub fn nested(&self) -> Self {
        Self { depth: self.depth + 1, ..self.clone() }
    }

    pub fn with_prop(&self, prop: String, site: Span) -> Self {
        Self { prop: Some(prop), site, ..self.clone() }
    }

    fn usage(&self) -> Usage<'_> {
        Usage { owner: self.owner, prop: self.prop.as_deref(), span: self.site }
    }
}

// -----------------------------------------------------------------------------
// Value classification
// -----------------------------------------------------------------------------

/// The shapes a traced value can take. Anything else is opaque and ignored.
#[derive(Debug, Clone, Copy)]
pub enum ValueNode<'e> {
    StringLiteral(&'e Str),
    Identifier(&'e Ident),
    Object(&'e ObjectLit),
    Member(&'e MemberExpr),
    Conditional(&'e CondExpr),
    Logical(&'e Expr, &'e Expr),
    Array(&'e ArrayLit),
    Opaque,
}

impl<'e> ValueNode<'e> {
    pub fn classify(expr: &'e Expr) -> Self {
        match expr {
            Expr::Lit(Lit::Str(s)) => ValueNode::StringLiteral(s),
            Expr::Ident(i) => ValueNode::Identifier(i),
            Expr::Object(o) => ValueNode::Object(o),
            Expr::Member(m) => ValueNode::Member(m),
            Expr::Cond(c) => ValueNode::Conditional(c),
            Expr::Bin(b)
                if matches!(
                    b.op,
                    BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
                ) =>
            {
                ValueNode::Logical(&b.left, &b.right)
            }
            Expr::Array(a) => ValueNode::Array(a),
            // wrappers that do not change the runtime value
            Expr::Paren(p) => Self::classify(&p.expr),
            Expr::TsAs(e) => Self::classify(&e.expr),
            Expr::TsSatisfies(e) => Self::classify(&e.expr),
            Expr::TsNonNull(e) => Self::classify(&e.expr),
            Expr::TsConstAssertion(e) => Self::classify(&e.expr),
            Expr::TsTypeAssertion(e) => Self::classify(&e.expr),
            _ => ValueNode::Opaque,
        }
    }
}

// -----------------------------------------------------------------------------
// Resolver
// -----------------------------------------------------------------------------

pub struct Resolver<'a> {
    table: &'a DeprecationTable,
    bindings: &'a Bindings,
    frames: &'a FrameSource<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        table: &'a DeprecationTable,
        bindings: &'a Bindings,
        frames: &'a FrameSource<'a>,
    ) -> Self {
        Self { table, bindings, frames }
    }

    pub fn table(&self) -> &'a DeprecationTable {
        self.table
    }

    fn replacement(&self, s: &Str, owner: &str, prop: &str) -> Option<String> {
        if !self.table.is_deprecated(owner, prop) {
            return None;
        }
        let old = s.value.to_string();
        let new = self.table.replacement(owner, prop, &old);
        (new != old).then(|| new.to_string())
    }

    /// Rewrite `s` when it is a deprecated value of `owner.prop`.
    pub fn rewrite_literal(&self, s: &Str, owner: &str, prop: &str) -> Findings {
        match self.replacement(s, owner, prop) {
            Some(new) => Findings::rewrite(Rewrite::string(s, &new)),
            None => Findings::default(),
        }
    }

    /// Like [`Resolver::rewrite_literal`] for a string written directly as a
    /// JSX attribute value.
    pub fn rewrite_jsx_attr(&self, s: &Str, owner: &str, prop: &str) -> Findings {
        match self.replacement(s, owner, prop) {
            Some(new) => Findings::rewrite(Rewrite::jsx_attr(s, &new)),
            None => Findings::default(),
        }
    }

    /// Follow `expr` to the string literals it may evaluate to.
    pub fn trace(&self, expr: &Expr, ctx: &TraceContext<'_>) -> Findings {
        if self.exceeded(ctx) {
            return Findings::default();
        }
        match ValueNode::classify(expr) {
            ValueNode::StringLiteral(s) => match &ctx.prop {
                Some(prop) => self.rewrite_literal(s, ctx.owner, prop),
                None => Findings::default(),
            },
            ValueNode::Identifier(i) => self.trace_ident(i, ctx),
            ValueNode::Object(o) => self.trace_object(o, ctx),
            ValueNode::Member(m) => self.trace_member(m, ctx),
            ValueNode::Conditional(c) => {
                let mut out = self.trace(&c.cons, ctx);
                out.merge(self.trace(&c.alt, ctx));
                out
            }
            ValueNode::Logical(left, right) => {
                let mut out = self.trace(left, ctx);
                out.merge(self.trace(right, ctx));
                out
            }
            ValueNode::Array(a) => {
                let mut out = Findings::default();
                for el in a.elems.iter().flatten() {
                    out.merge(self.trace(&el.expr, ctx));
                }
                out
            }
            ValueNode::Opaque => Findings::default(),
        }
    }

    fn exceeded(&self, ctx: &TraceContext<'_>) -> bool {
        if ctx.depth < MAX_TRACE_DEPTH {
            return false;
        }
        error!(
            file = self.frames.filename,
            owner = ctx.owner,
            prop = ?ctx.prop,
            "too many recursions while tracing a value, giving up"
        );
        true
    }

    /// Import warnings only matter where a deprecated value could flow.
    fn is_relevant(&self, ctx: &TraceContext<'_>) -> bool {
        match &ctx.prop {
            Some(prop) => self.table.is_deprecated(ctx.owner, prop),
            None => true,
        }
    }

    fn trace_ident(&self, ident: &Ident, ctx: &TraceContext<'_>) -> Findings {
        self.follow_ident(ident, &[], ctx)
    }

    /// Trace the value of `ident`, or the value under `path` inside it.
    fn follow_ident(&self, ident: &Ident, path: &[String], ctx: &TraceContext<'_>) -> Findings {
        let Some(binding) = self.bindings.get(&ident.to_id()) else {
            return Findings::default();
        };
        let mut out = Findings::default();
        match &binding.kind {
            BindingKind::Local { init: Some(init) } => {
                out.merge(self.reassignment_warning(ident, ctx));
                match (ValueNode::classify(init), &ctx.prop) {
                    (ValueNode::StringLiteral(s), Some(prop)) if path.is_empty() => {
                        out.merge(self.rewrite_literal(s, ctx.owner, prop));
                    }
                    _ => out.merge(self.trace_at(init, path, &ctx.nested())),
                }
            }
            BindingKind::Local { init: None } => {
                let reassigned = self.reassignment_warning(ident, ctx);
                if reassigned.is_empty() {
                    out.merge(self.untraceable_binding(ident, binding.def_span, ctx));
                } else {
                    out.merge(reassigned);
                }
            }
            BindingKind::Destructured { key, init, fallback } => {
                out.merge(self.reassignment_warning(ident, ctx));
                match init {
                    Some(init) => {
                        let full = [std::slice::from_ref(key), path].concat();
                        out.merge(self.trace_property(init, &full, &ctx.nested()));
                    }
                    None => out.merge(self.untraceable_binding(ident, binding.def_span, ctx)),
                }
                if let Some(fallback) = fallback {
                    out.merge(self.trace_at(fallback, path, &ctx.nested()));
                }
            }
            BindingKind::Import { source, imported } => {
                if self.is_relevant(ctx) {
                    out.warnings.push(self.frames.untraceable_import(
                        &ident.sym,
                        imported,
                        source,
                        binding.def_span,
                        ctx.usage(),
                    ));
                }
            }
            BindingKind::Untraceable => {
                out.merge(self.untraceable_binding(ident, binding.def_span, ctx));
            }
            BindingKind::Declared => {}
        }
        out
    }

    fn untraceable_binding(&self, ident: &Ident, def_span: Span, ctx: &TraceContext<'_>) -> Findings {
        if !self.is_relevant(ctx) {
            return Findings::default();
        }
        Findings::warning(self.frames.untraceable_binding(&ident.sym, def_span, ctx.usage()))
    }

    fn reassignment_warning(&self, ident: &Ident, ctx: &TraceContext<'_>) -> Findings {
        let sites = self.bindings.reassignments(&ident.to_id());
        if sites.is_empty() || !self.is_relevant(ctx) {
            return Findings::default();
        }
        Findings::warning(self.frames.reassigned(&ident.sym, ctx.usage(), sites))
    }

    /// The context a property value is traced in, or `None` when the key
    /// neither names a deprecated prop nor sits under one.
    fn property_context<'c>(
        &self,
        ctx: &TraceContext<'c>,
        key: String,
        site: Span,
    ) -> Option<TraceContext<'c>> {
        if self.table.is_deprecated(ctx.owner, &key) {
            Some(ctx.with_prop(key, site))
        } else if ctx.prop.is_some() {
            Some(ctx.clone())
        } else {
            None
        }
    }

    fn trace_object(&self, obj: &ObjectLit, ctx: &TraceContext<'_>) -> Findings {
        let mut out = Findings::default();
        for prop in &obj.props {
            match prop {
                PropOrSpread::Spread(s) => out.merge(self.trace(&s.expr, ctx)),
                PropOrSpread::Prop(p) => match &**p {
                    Prop::KeyValue(kv) => match static_prop_key(&kv.key) {
                        Some(key) => {
                            let site = Span::new(kv.key.span().lo(), kv.value.span().hi());
                            if let Some(next) = self.property_context(ctx, key, site) {
                                out.merge(self.trace(&kv.value, &next));
                            }
                        }
                        None if matches!(kv.key, PropName::Computed(_)) => {
                            out.warnings
                                .push(self.frames.untraceable_property(ctx.owner, kv.key.span()));
                        }
                        None => {}
                    },
                    Prop::Shorthand(ident) => {
                        if let Some(next) =
                            self.property_context(ctx, ident.sym.to_string(), ident.span)
                        {
                            out.merge(self.trace_ident(ident, &next));
                        }
                    }
                    _ => {}
                },
            }
        }
        out
    }

    fn trace_member(&self, m: &MemberExpr, ctx: &TraceContext<'_>) -> Findings {
        match (member_key(&m.prop), &m.prop) {
            (Some(key), _) => self.trace_property(&m.obj, &[key], &ctx.nested()),
            (None, MemberProp::Computed(c)) if self.is_relevant(ctx) => {
                Findings::warning(self.frames.untraceable_member(c.span))
            }
            (None, _) => Findings::default(),
        }
    }

    fn trace_at(&self, expr: &Expr, path: &[String], ctx: &TraceContext<'_>) -> Findings {
        if path.is_empty() {
            self.trace(expr, ctx)
        } else {
            self.trace_property(expr, path, ctx)
        }
    }

    /// Trace the value stored under the key `path` in whatever object `obj`
    /// refers to. `path` runs outermost key first, as in `obj.a.b`.
    fn trace_property(&self, obj: &Expr, path: &[String], ctx: &TraceContext<'_>) -> Findings {
        if self.exceeded(ctx) {
            return Findings::default();
        }
        let Some((key, rest)) = path.split_first() else {
            return self.trace(obj, ctx);
        };
        match ValueNode::classify(obj) {
            ValueNode::Object(o) => {
                // later keys overwrite earlier ones at runtime
                for prop in o.props.iter().rev() {
                    let PropOrSpread::Prop(p) = prop else { continue };
                    match &**p {
                        Prop::KeyValue(kv) if static_prop_key(&kv.key).as_ref() == Some(key) => {
                            return self.trace_at(&kv.value, rest, ctx);
                        }
                        Prop::Shorthand(ident) if &*ident.sym == key.as_str() => {
                            return self.follow_ident(ident, rest, ctx);
                        }
                        _ => {}
                    }
                }
                // not written out, so it can only come from a spread
                let mut out = Findings::default();
                for prop in o.props.iter().rev() {
                    if let PropOrSpread::Spread(s) = prop {
                        out.merge(self.trace_property(&s.expr, path, &ctx.nested()));
                    }
                }
                out
            }
            ValueNode::Identifier(ident) => self.follow_ident(ident, path, ctx),
            ValueNode::Member(inner) => match (member_key(&inner.prop), &inner.prop) {
                (Some(inner_key), _) => {
                    let full = [std::slice::from_ref(&inner_key), path].concat();
                    self.trace_property(&inner.obj, &full, &ctx.nested())
                }
                (None, MemberProp::Computed(c)) if self.is_relevant(ctx) => {
                    Findings::warning(self.frames.untraceable_member(c.span))
                }
                (None, _) => Findings::default(),
            },
            ValueNode::Conditional(c) => {
                let mut out = self.trace_property(&c.cons, path, ctx);
                out.merge(self.trace_property(&c.alt, path, ctx));
                out
            }
            ValueNode::Logical(left, right) => {
                let mut out = self.trace_property(left, path, ctx);
                out.merge(self.trace_property(right, path, ctx));
                out
            }
            _ => Findings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::with_module;
    use crate::rewrite::Replacement;
    use crate::warning::WarningKind;
    use swc_core::common::DUMMY_SP;

    /// Initializer of `const candidate = ...`.
    fn candidate(module: &Module) -> &Expr {
        module
            .body
            .iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => Some(&var.decls),
                _ => None,
            })
            .flatten()
            .find(|d| matches!(&d.name, Pat::Ident(b) if &*b.id.sym == "candidate"))
            .and_then(|d| d.init.as_deref())
            .expect("candidate declaration")
    }

    fn trace(code: &str, prop: Option<&str>) -> Findings {
        with_module("test.tsx", code, |parsed| {
            let bindings = Bindings::collect(&parsed.module);
            let table = DeprecationTable::default();
            let frames = FrameSource::new("test.tsx", code, &parsed.cm);
            let resolver = Resolver::new(&table, &bindings, &frames);
            resolver.trace(candidate(&parsed.module), &TraceContext::new("Box", prop, DUMMY_SP))
        })
    }

    fn new_values(findings: &Findings) -> Vec<String> {
        findings
            .rewrites
            .iter()
            .map(|r| match &r.replacement {
                Replacement::StringValue(v)
                | Replacement::JsxAttrValue(v)
                | Replacement::IdentName(v) => v.clone(),
            })
            .collect()
    }

    #[test]
    fn classifies_through_wrappers() {
        with_module("test.ts", "const candidate = ('card' as const)!;", |parsed| {
            let expr = candidate(&parsed.module);
            assert!(matches!(ValueNode::classify(expr), ValueNode::StringLiteral(_)));
        });
    }

    #[test]
    fn follows_locals_and_both_branches() {
        let code = "
            const a = 'card';
            const b = cond ? a : 'input';
            const candidate = b ?? 'selection';
        ";
        let findings = trace(code, Some("background"));
        assert_eq!(new_values(&findings), ["surface", "surface", "formAccentSoft"]);
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn binds_prop_from_object_keys() {
        let code = "
            const shadow = 'borderFormHover';
            const candidate = { background: { mobile: 'card', desktop: 'input' }, boxShadow: shadow, padding: 'card' };
        ";
        let findings = trace(code, None);
        assert_eq!(new_values(&findings), ["surface", "surface", "borderFormAccent"]);
    }

    #[test]
    fn reads_destructured_and_member_values() {
        let code = "
            const styles = { bg: 'inputDisabled', nested: { tone: 'card' } };
            const { bg } = styles;
            const candidate = [bg, styles.nested['tone']];
        ";
        let findings = trace(code, Some("background"));
        assert_eq!(new_values(&findings), ["neutralSoft", "surface"]);
    }

    #[test]
    fn follows_keys_through_spreads_and_defaults() {
        let code = "
            const inner = { nested: { tone: 'card' } };
            const styles = { ...inner };
            const { fallback = 'selection' } = styles;
            const candidate = [styles.nested.tone, fallback];
        ";
        let findings = trace(code, Some("background"));
        assert_eq!(new_values(&findings), ["surface", "formAccentSoft"]);
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn ignores_props_that_are_not_deprecated() {
        let findings = trace("import x from './x'; const candidate = x;", Some("padding"));
        assert!(findings.is_empty());
    }

    #[test]
    fn warns_on_imports_and_reassignments() {
        let code = "
            import { tone } from './tone';
            let local = 'card';
            local = 'input';
            const candidate = cond ? tone : local;
        ";
        let findings = trace(code, Some("background"));
        assert_eq!(new_values(&findings), ["surface"]);
        let kinds: Vec<_> = findings.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, [WarningKind::UntraceableImport, WarningKind::Reassigned]);
        assert!(findings.warnings[0].message.contains("imported from './tone'"));
        assert!(findings.warnings[0].message.contains("Imported as `tone` at"));
    }

    #[test]
    fn warns_on_bindings_that_cannot_be_followed() {
        let code = "
            const [first] = ['card'];
            const { a, ...rest } = { a: 1 };
            let later;
            const candidate = [first, rest.bg, later];
        ";
        let findings = trace(code, Some("background"));
        assert!(findings.rewrites.is_empty());
        let kinds: Vec<_> = findings.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, [WarningKind::UntraceableBinding; 3]);
        assert!(trace(code, Some("padding")).is_empty());
    }

    #[test]
    fn warns_on_computed_keys() {
        let code = "const key = k(); const candidate = { [key]: 'card', ['background']: 'card' };";
        let findings = trace(code, None);
        assert_eq!(new_values(&findings), ["surface"]);
        assert_eq!(findings.warnings.len(), 1);
        assert_eq!(findings.warnings[0].kind, WarningKind::UntraceableProperty);
    }
}
