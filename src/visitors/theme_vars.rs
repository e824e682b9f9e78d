use std::collections::{HashMap, HashSet};

use swc_core::{
    common::{Span, Spanned},
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};
use tracing::debug;

use crate::bindings::{member_key, static_prop_key, TrackedNames};
use crate::deprecations::{DeprecationNode, DeprecationTable};
use crate::error::CodemodError;
use crate::resolver::{Findings, MAX_TRACE_DEPTH};
use crate::rewrite::Rewrite;
use crate::warning::FrameSource;

/// The theme-variables import and every local alias of a group inside it,
/// each mapped to its path from the root of the variables object.
/// `Ns.vars` off a namespace import of the package is a root too.
#[derive(Debug, Default)]
pub struct ThemeVars<'a> {
    root: Option<&'a DeprecationNode>,
    vars_export: &'a str,
    namespaces: HashSet<Id>,
    aliases: HashMap<Id, Vec<String>>,
}

impl<'a> ThemeVars<'a> {
    pub fn collect(
        module: &Module,
        tracked: &TrackedNames,
        table: &'a DeprecationTable,
        vars_export: &'a str,
        frames: &FrameSource<'_>,
    ) -> Result<Self, CodemodError> {
        let mut theme = Self {
            root: table.scope(vars_export),
            vars_export,
            namespaces: tracked.namespaces().cloned().collect(),
            aliases: HashMap::new(),
        };
        if theme.root.is_none() || (tracked.vars().is_empty() && theme.namespaces.is_empty()) {
            return Ok(theme);
        }
        for id in tracked.vars() {
            theme.aliases.insert(id.clone(), vec![]);
        }

        // aliases of aliases need another pass
        for pass in 0..MAX_TRACE_DEPTH {
            let mut collector = AliasCollector { theme: &theme, frames, found: vec![], error: None };
            module.visit_with(&mut collector);
            let AliasCollector { found, error, .. } = collector;
            if let Some(err) = error {
                return Err(err);
            }
            let before = theme.aliases.len();
            for (id, path) in found {
                theme.aliases.entry(id).or_insert(path);
            }
            if theme.aliases.len() == before {
                debug!(passes = pass + 1, aliases = before, "theme variable aliases settled");
                break;
            }
        }
        Ok(theme)
    }

    /// Path of `expr` from the variables root when it is an alias or a static
    /// member chain off one.
    fn static_path(&self, expr: &Expr) -> Option<Vec<String>> {
        if let Some(path) = self.root_path(expr) {
            return Some(path);
        }
        match expr {
            Expr::Member(m) => {
                let mut path = self.static_path(&m.obj)?;
                path.push(member_key(&m.prop)?);
                Some(path)
            }
            Expr::Paren(p) => self.static_path(&p.expr),
            _ => None,
        }
    }

    /// Path of an alias, or the empty path for `Ns.vars`.
    fn root_path(&self, expr: &Expr) -> Option<Vec<String>> {
        match expr {
            Expr::Ident(i) => self.aliases.get(&i.to_id()).cloned(),
            Expr::Member(MemberExpr { obj, prop, .. }) => match &**obj {
                Expr::Ident(ns)
                    if self.namespaces.contains(&ns.to_id())
                        && member_key(prop).as_deref() == Some(self.vars_export) =>
                {
                    Some(vec![])
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn group_at(&self, path: &[String]) -> Option<&'a DeprecationNode> {
        self.root?.descend(path).filter(|node| node.as_group().is_some())
    }

    /// Rename the leaf of a member chain rooted at an alias or at `Ns.vars`.
    /// `None` when the chain does not start at one.
    pub fn walk(&self, m: &MemberExpr, frames: &FrameSource<'_>) -> Option<Findings> {
        let mut props = vec![&m.prop];
        let mut obj = &*m.obj;
        let root = loop {
            if let Some(path) = self.root_path(obj) {
                break path;
            }
            match obj {
                Expr::Member(inner) => {
                    props.push(&inner.prop);
                    obj = &inner.obj;
                }
                _ => return None,
            }
        };
        let mut node = self.group_at(&root)?;

        let mut out = Findings::default();
        for prop in props.into_iter().rev() {
            let Some(key) = member_key(prop) else {
                if let MemberProp::Computed(c) = prop {
                    out.warnings.push(frames.untraceable_member(c.span));
                }
                break;
            };
            match node.get(&key) {
                Some(DeprecationNode::Rename(new)) => {
                    out.rewrites.extend(leaf_rewrite(prop, new));
                    break;
                }
                Some(child) => node = child,
                None => break,
            }
        }
        Some(out)
    }
}

fn leaf_rewrite(prop: &MemberProp, new: &str) -> Option<Rewrite> {
    match prop {
        MemberProp::Ident(i) => Some(Rewrite::ident(i, new)),
        MemberProp::Computed(c) => match &*c.expr {
            Expr::Lit(Lit::Str(s)) => Some(Rewrite::string(s, new)),
            _ => None,
        },
        MemberProp::PrivateName(_) => None,
    }
}

// -----------------------------------------------------------------------------
// Alias collection
// -----------------------------------------------------------------------------

struct AliasCollector<'t, 'a> {
    theme: &'t ThemeVars<'a>,
    frames: &'t FrameSource<'t>,
    found: Vec<(Id, Vec<String>)>,
    error: Option<CodemodError>,
}

impl<'a> AliasCollector<'_, 'a> {
    fn bind(&mut self, pat: &Pat, path: Vec<String>, node: &'a DeprecationNode) {
        match pat {
            Pat::Ident(b) => self.found.push((b.id.to_id(), path)),
            Pat::Object(o) => {
                for prop in &o.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            let Some(key) = static_prop_key(&kv.key) else { continue };
                            if let Some(child) = self.child(node, &key, kv.key.span()) {
                                self.bind(&kv.value, extend(&path, key), child);
                            }
                        }
                        ObjectPatProp::Assign(a) => {
                            let key = a.key.id.sym.to_string();
                            if self.child(node, &key, a.key.id.span).is_some() {
                                self.found.push((a.key.id.to_id(), extend(&path, key)));
                            }
                        }
                        ObjectPatProp::Rest(r) => {
                            if let Pat::Ident(b) = &*r.arg {
                                self.found.push((b.id.to_id(), path.clone()));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// The group under `key`. Destructuring a renamed leaf cannot be rewritten
    /// in place and fails the file.
    fn child(&mut self, node: &'a DeprecationNode, key: &str, key_span: Span) -> Option<&'a DeprecationNode> {
        match node.get(key)? {
            DeprecationNode::Rename(_) => {
                if self.error.is_none() {
                    self.error = Some(self.frames.untraceable_object_key(key_span));
                }
                None
            }
            child => Some(child),
        }
    }
}

fn extend(path: &[String], key: String) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(key);
    path
}

impl Visit for AliasCollector<'_, '_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let Some(init) = &d.init {
            if let Some(path) = self.theme.static_path(init) {
                if let Some(node) = self.theme.group_at(&path) {
                    self.bind(&d.name, path, node);
                }
            }
        }
        d.visit_children_with(self);
    }
}
