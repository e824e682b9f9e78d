use std::collections::{HashMap, HashSet};

use regex::Regex;
use swc_core::{
    common::{Span, Spanned},
    ecma::{
        ast::*,
        utils::find_pat_ids,
        visit::{Visit, VisitWith},
    },
};

use crate::deprecations::DeprecationTable;

// -----------------------------------------------------------------------------
// Key helpers
// -----------------------------------------------------------------------------

/// Name of an object key when it is statically known: `a`, `'a'` or `['a']`.
pub(crate) fn static_prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Computed(c) => match &*c.expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
            _ => None,
        },
        PropName::Num(_) | PropName::BigInt(_) => None,
    }
}

/// `obj.key` or `obj['key']`.
pub(crate) fn member_key(prop: &MemberProp) -> Option<String> {
    match prop {
        MemberProp::Ident(i) => Some(i.sym.to_string()),
        MemberProp::Computed(c) => match &*c.expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
            _ => None,
        },
        MemberProp::PrivateName(_) => None,
    }
}

pub(crate) fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(i) => i.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

// -----------------------------------------------------------------------------
// Binding table
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum BindingKind {
    /// `const x = init`
    Local { init: Option<Box<Expr>> },
    /// `const { key: x } = init` / `const { key = fallback } = init`
    Destructured { key: String, init: Option<Box<Expr>>, fallback: Option<Box<Expr>> },
    Import { source: String, imported: String },
    /// Pattern bindings that cannot be followed: array elements, rest
    /// elements, computed keys and nested patterns.
    Untraceable,
    /// Functions and classes.
    Declared,
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub def_span: Span,
    pub kind: BindingKind,
}

/// Bindings of one module keyed by resolved identifier, plus the sites where
/// each identifier is assigned after its declaration.
#[derive(Debug, Default)]
pub struct Bindings {
    map: HashMap<Id, Binding>,
    reassignments: HashMap<Id, Vec<Span>>,
}

impl Bindings {
    pub fn collect(module: &Module) -> Self {
        let mut out = Self::default();
        module.visit_with(&mut BindingCollector { out: &mut out });
        out
    }

    pub fn get(&self, id: &Id) -> Option<&Binding> {
        self.map.get(id)
    }

    pub fn reassignments(&self, id: &Id) -> &[Span] {
        self.reassignments.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[cfg(test)]
    pub(crate) fn find(&self, name: &str) -> Option<&Binding> {
        self.map.iter().find(|(id, _)| &*id.0 == name).map(|(_, b)| b)
    }
}

struct BindingCollector<'a> {
    out: &'a mut Bindings,
}

impl BindingCollector<'_> {
    fn insert(&mut self, ident: &Ident, kind: BindingKind) {
        self.out.map.insert(ident.to_id(), Binding { def_span: ident.span, kind });
    }

    fn reassigned(&mut self, ident: &Ident, span: Span) {
        self.out.reassignments.entry(ident.to_id()).or_default().push(span);
    }

    fn untraceable(&mut self, pat: &Pat) {
        for ident in find_pat_ids::<_, Ident>(pat) {
            self.insert(&ident, BindingKind::Untraceable);
        }
    }

    fn object_pattern(&mut self, o: &ObjectPat, init: &Option<Box<Expr>>) {
        for prop in &o.props {
            match prop {
                ObjectPatProp::KeyValue(kv) => match (static_prop_key(&kv.key), &*kv.value) {
                    (Some(key), Pat::Ident(b)) => {
                        let kind = BindingKind::Destructured { key, init: init.clone(), fallback: None };
                        self.insert(&b.id, kind);
                    }
                    (Some(key), Pat::Assign(a)) => match &*a.left {
                        Pat::Ident(b) => {
                            let kind = BindingKind::Destructured {
                                key,
                                init: init.clone(),
                                fallback: Some(a.right.clone()),
                            };
                            self.insert(&b.id, kind);
                        }
                        left => self.untraceable(left),
                    },
                    (_, value) => self.untraceable(value),
                },
                ObjectPatProp::Assign(a) => {
                    let kind = BindingKind::Destructured {
                        key: a.key.id.sym.to_string(),
                        init: init.clone(),
                        fallback: a.value.clone(),
                    };
                    self.insert(&a.key.id, kind);
                }
                ObjectPatProp::Rest(r) => self.untraceable(&r.arg),
            }
        }
    }
}

impl Visit for BindingCollector<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        match &d.name {
            Pat::Ident(b) => self.insert(&b.id, BindingKind::Local { init: d.init.clone() }),
            Pat::Object(o) => self.object_pattern(o, &d.init),
            other => self.untraceable(other),
        }
        d.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.insert(&n.ident, BindingKind::Declared);
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.insert(&n.ident, BindingKind::Declared);
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ImportDecl) {
        let source = n.src.value.to_string();
        for s in &n.specifiers {
            let (local, imported) = match s {
                ImportSpecifier::Named(named) => (
                    &named.local,
                    named
                        .imported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| named.local.sym.to_string()),
                ),
                ImportSpecifier::Default(def) => (&def.local, "default".to_string()),
                ImportSpecifier::Namespace(ns) => (&ns.local, "*".to_string()),
            };
            let kind = BindingKind::Import { source: source.clone(), imported };
            self.out.map.insert(local.to_id(), Binding { def_span: s.span(), kind });
        }
    }

    fn visit_assign_expr(&mut self, n: &AssignExpr) {
        match &n.left {
            AssignTarget::Simple(SimpleAssignTarget::Ident(b)) => self.reassigned(&b.id, n.span),
            // `[a, b] = pair` and `({ a } = other)`
            AssignTarget::Pat(pat) => {
                for ident in find_pat_ids::<_, Ident>(pat) {
                    self.reassigned(&ident, n.span);
                }
            }
            _ => {}
        }
        n.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, n: &UpdateExpr) {
        if let Expr::Ident(i) = &*n.arg {
            self.reassigned(i, n.span);
        }
        n.visit_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Tracked imports
// -----------------------------------------------------------------------------

/// Local names bound to tracked exports of the design-system package.
#[derive(Debug, Default)]
pub struct TrackedNames {
    owners: HashMap<Id, String>,
    namespaces: HashSet<Id>,
    vars: Vec<Id>,
}

impl TrackedNames {
    pub fn collect(
        module: &Module,
        package: &Regex,
        table: &DeprecationTable,
        vars_export: &str,
    ) -> Self {
        let mut out = Self::default();
        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item else { continue };
            if decl.type_only || !package.is_match(&decl.src.value) {
                continue;
            }
            for s in &decl.specifiers {
                match s {
                    ImportSpecifier::Named(named) if !named.is_type_only => {
                        let imported = named
                            .imported
                            .as_ref()
                            .map(module_export_name)
                            .unwrap_or_else(|| named.local.sym.to_string());
                        if imported == vars_export {
                            out.vars.push(named.local.to_id());
                        } else if table.has_owner(&imported) {
                            out.owners.insert(named.local.to_id(), imported);
                        }
                    }
                    ImportSpecifier::Namespace(ns) => {
                        out.namespaces.insert(ns.local.to_id());
                    }
                    _ => {}
                }
            }
        }
        out
    }

    pub fn owner(&self, id: &Id) -> Option<&str> {
        self.owners.get(id).map(String::as_str)
    }

    pub fn is_namespace(&self, id: &Id) -> bool {
        self.namespaces.contains(id)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Id> {
        self.namespaces.iter()
    }

    pub fn vars(&self) -> &[Id] {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.namespaces.is_empty() && self.vars.is_empty()
    }
}
