//! Finds deprecated token usages in one traversal: props of tracked
//! components, arguments of tracked style functions and member chains into
//! the theme variables object.

use swc_core::{
    common::Spanned,
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};

use crate::bindings::TrackedNames;
use crate::resolver::{Findings, Resolver, TraceContext};
use crate::warning::FrameSource;

mod theme_vars;

pub use theme_vars::ThemeVars;


pub struct DeprecationVisitor<'a> {
    resolver: Resolver<'a>,
    tracked: &'a TrackedNames,
    theme: ThemeVars<'a>,
    frames: &'a FrameSource<'a>,
    findings: Findings,
}

impl<'a> DeprecationVisitor<'a> {
    pub fn new(
        resolver: Resolver<'a>,
        tracked: &'a TrackedNames,
        theme: ThemeVars<'a>,
        frames: &'a FrameSource<'a>,
    ) -> Self {
        Self { resolver, tracked, theme, frames, findings: Findings::default() }
    }

    pub fn into_findings(self) -> Findings {
        self.findings
    }

    /// Canonical owner of `<Local>` or `<Namespace.Name>`.
    fn element_owner(&self, name: &JSXElementName) -> Option<String> {
        match name {
            JSXElementName::Ident(i) => self.tracked.owner(&i.to_id()).map(str::to_string),
            JSXElementName::JSXMemberExpr(JSXMemberExpr { obj: JSXObject::Ident(ns), prop, .. }) => {
                self.namespaced_owner(ns, &prop.sym)
            }
            _ => None,
        }
    }

    /// Canonical owner of `local(...)` or `Namespace.name(...)`.
    fn callee_owner(&self, callee: &Callee) -> Option<String> {
        let Callee::Expr(expr) = callee else { return None };
        match &**expr {
            Expr::Ident(i) => self.tracked.owner(&i.to_id()).map(str::to_string),
            Expr::Member(MemberExpr { obj, prop: MemberProp::Ident(prop), .. }) => match &**obj {
                Expr::Ident(ns) => self.namespaced_owner(ns, &prop.sym),
                _ => None,
            },
            _ => None,
        }
    }

    fn namespaced_owner(&self, ns: &Ident, name: &str) -> Option<String> {
        (self.tracked.is_namespace(&ns.to_id()) && self.resolver.table().has_owner(name))
            .then(|| name.to_string())
    }

    fn element_attrs(&self, owner: &str, attrs: &[JSXAttrOrSpread]) -> Findings {
        let mut out = Findings::default();
        for attr in attrs {
            match attr {
                JSXAttrOrSpread::JSXAttr(a) => {
                    let JSXAttrName::Ident(name) = &a.name else { continue };
                    let prop: &str = &name.sym;
                    match &a.value {
                        Some(JSXAttrValue::Lit(Lit::Str(s))) => {
                            out.merge(self.resolver.rewrite_jsx_attr(s, owner, prop));
                        }
                        Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
                            expr: JSXExpr::Expr(expr),
                            ..
                        })) if self.resolver.table().is_deprecated(owner, prop) => {
                            let ctx = TraceContext::new(owner, Some(prop), a.span);
                            out.merge(self.resolver.trace(expr, &ctx));
                        }
                        _ => {}
                    }
                }
                JSXAttrOrSpread::SpreadElement(spread) => {
                    let ctx = TraceContext::new(owner, None, spread.expr.span());
                    out.merge(self.resolver.trace(&spread.expr, &ctx));
                }
            }
        }
        out
    }

    fn call_args(&self, owner: &str, args: &[ExprOrSpread]) -> Findings {
        let mut out = Findings::default();
        for arg in args {
            let ctx = TraceContext::new(owner, None, arg.expr.span());
            out.merge(self.resolver.trace(&arg.expr, &ctx));
        }
        out
    }
}

impl Visit for DeprecationVisitor<'_> {
    fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
        if let Some(owner) = self.element_owner(&n.name) {
            let found = self.element_attrs(&owner, &n.attrs);
            self.findings.merge(found);
        }
        n.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(owner) = self.callee_owner(&n.callee) {
            let found = self.call_args(&owner, &n.args);
            self.findings.merge(found);
        }
        n.visit_children_with(self);
    }

    fn visit_member_expr(&mut self, n: &MemberExpr) {
        let Some(found) = self.theme.walk(n, self.frames) else {
            n.visit_children_with(self);
            return;
        };
        self.findings.merge(found);

        // the chain itself is done; only computed keys can hold more usages
        let mut current = n;
        loop {
            if let MemberProp::Computed(c) = &current.prop {
                c.expr.visit_with(self);
            }
            match &*current.obj {
                Expr::Member(inner) => current = inner,
                _ => break,
            }
        }
    }
}
