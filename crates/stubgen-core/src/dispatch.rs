//! Visitation-protocol codegen: dispatch tables and request containers.
//!
//! For every method with parameters the engine synthesizes a request
//! container exposing three operations to code it does not control:
//!
//! - *visit-all*: run an action over every field in declaration order,
//!   reassigning each field to the action's return value. Trivial
//!   (value-like) fields are guarded by the `runOnAll` flag so the fast
//!   path skips them; non-trivial fields are always visited.
//! - *visit-by-name*: apply the action to the single field with the given
//!   source name, reporting whether the name matched.
//! - *apply-defaults*: assign each declared initializer to its field when
//!   the field still holds the unset sentinel.
//!
//! Rather than runtime reflection, the generated dispatch is driven by an
//! explicit ordered table built once per container: one entry per
//! parameter carrying the wire name, the case-converted member identifier,
//! the declared type and the rendered default. Identifier collisions
//! introduced by case conversion are detected here, while the table is
//! built, and abort generation for the offending target.

use log::debug;

use crate::backend::{AttributeFilter, Formatter};
use crate::error::{Error, Result};
use crate::ir::{expand_comments, Method, Parameter, Type};
use crate::writer::SourceWriter;

/// One row of a request container's dispatch table.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    /// Wire name: the IDL parameter name, used for dispatch-by-name
    pub source_name: String,
    /// Case-converted member identifier in the target language
    pub ident: String,
    pub ty: Type,
    /// Value-like fields are skipped unless a full pass is requested
    pub trivial: bool,
    /// Rendered default expression, including any cast prefix
    pub default_expr: Option<String>,
    pub doc_lines: Vec<String>,
    pub attribute_line: String,
}

/// The ordered field set of one request container, closed at generation
/// time.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    /// Identifier of the generated container type
    pub container_ident: String,
    pub entries: Vec<FieldEntry>,
}

impl DispatchTable {
    /// Build the table for a method, in parameter declaration order.
    ///
    /// `scope` names the enclosing entity (`Service.Method`) for error
    /// reporting. Fails with `IdentifierCollision` when two parameters
    /// case-convert to the same member identifier, and propagates
    /// `UnrepresentableLiteral` from default rendering.
    pub fn build(
        scope: &str,
        method: &Method,
        fmt: &dyn Formatter,
        filter: &AttributeFilter,
    ) -> Result<Self> {
        let type_ident = fmt.render_identifier(&method.name, fmt.type_convention());
        let container_ident = format!("{}Request", type_ident);
        let mut entries: Vec<FieldEntry> = Vec::with_capacity(method.parameters.len());

        for param in &method.parameters {
            let entry = Self::build_entry(scope, param, fmt, filter)?;
            if let Some(existing) = entries.iter().find(|e| e.ident == entry.ident) {
                return Err(Error::IdentifierCollision {
                    scope: format!("{} parameters", scope),
                    first: existing.source_name.clone(),
                    second: entry.source_name.clone(),
                    rendered: entry.ident,
                });
            }
            entries.push(entry);
        }

        debug!(
            "dispatch table for {}: {} field(s)",
            container_ident,
            entries.len()
        );
        Ok(Self {
            container_ident,
            entries,
        })
    }

    fn build_entry(
        scope: &str,
        param: &Parameter,
        fmt: &dyn Formatter,
        filter: &AttributeFilter,
    ) -> Result<FieldEntry> {
        let default_expr = match &param.initializer {
            Some(value) => {
                let literal = fmt.render_literal(&param.ty, value)?;
                Some(format!("{}{}", fmt.cast_prefix(&param.ty), literal))
            }
            None => None,
        };
        let ident = fmt.render_identifier(&param.name, fmt.member_convention());
        if ident.is_empty() {
            return Err(Error::contract(format!(
                "identifier for {}.{} rendered empty",
                scope, param.name
            )));
        }
        Ok(FieldEntry {
            source_name: param.name.clone(),
            ident,
            ty: param.ty.clone(),
            trivial: param.ty.is_trivial(),
            default_expr,
            doc_lines: expand_comments(&param.comments),
            attribute_line: fmt.render_attribute_list(&param.attributes, filter),
        })
    }

    /// Entries visited by a selective pass (`runOnAll` false).
    pub fn non_trivial_entries(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter().filter(|e| !e.trivial)
    }

    pub fn lookup(&self, source_name: &str) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| e.source_name == source_name)
    }
}

/// The field reassignment statement shared by visit-all and
/// visit-by-name: `field = cast(action(name, tag, field, auxData));`
fn visit_statement(fmt: &dyn Formatter, entry: &FieldEntry) -> String {
    let access = fmt.field_access(&entry.ident);
    let call = format!(
        "action({:?}, {}, {}, auxData)",
        entry.source_name,
        fmt.type_tag(&entry.ty),
        access
    );
    format!("{} = {};", access, fmt.cast(&entry.ty, &call))
}

/// Emit the request-container definition for a built dispatch table.
pub fn emit_request_container(
    w: &mut SourceWriter,
    fmt: &dyn Formatter,
    table: &DispatchTable,
) -> Result<()> {
    w.open(&require(
        fmt.container_header(&table.container_ident),
        "container header",
    )?);

    for entry in &table.entries {
        w.raw(&fmt.render_doc(&entry.doc_lines, w.indent_level()));
        if !entry.attribute_line.is_empty() {
            w.line(&entry.attribute_line);
        }
        let decl = require(
            fmt.field_declaration(&entry.ident, &entry.ty),
            "field declaration",
        )?;
        w.line(&format!("{};", decl));
    }

    w.blank();
    emit_visit_all(w, fmt, table)?;
    w.blank();
    emit_visit_by_name(w, fmt, table)?;
    w.blank();
    emit_apply_defaults(w, fmt, table)?;

    w.close();
    Ok(())
}

fn emit_visit_all(w: &mut SourceWriter, fmt: &dyn Formatter, table: &DispatchTable) -> Result<()> {
    w.open(&require(fmt.visit_all_signature(), "visit-all signature")?);
    for entry in &table.entries {
        let stmt = visit_statement(fmt, entry);
        if entry.trivial {
            w.line(&format!("if (runOnAll) {}", stmt));
        } else {
            w.line(&stmt);
        }
    }
    w.close();
    Ok(())
}

fn emit_visit_by_name(
    w: &mut SourceWriter,
    fmt: &dyn Formatter,
    table: &DispatchTable,
) -> Result<()> {
    w.open(&require(
        fmt.visit_by_name_signature(),
        "visit-by-name signature",
    )?);
    w.open("switch (name)");
    for entry in &table.entries {
        w.line(&format!(
            "case {:?}: {} return true;",
            entry.source_name,
            visit_statement(fmt, entry)
        ));
    }
    w.line("default: return false;");
    w.close();
    w.close();
    Ok(())
}

fn emit_apply_defaults(
    w: &mut SourceWriter,
    fmt: &dyn Formatter,
    table: &DispatchTable,
) -> Result<()> {
    w.open(&require(
        fmt.apply_defaults_signature(),
        "apply-defaults signature",
    )?);
    for entry in &table.entries {
        if let Some(default) = &entry.default_expr {
            let access = fmt.field_access(&entry.ident);
            w.line(&format!(
                "if ({}) {} = {};",
                fmt.unset_check(&access),
                access,
                default
            ));
        }
    }
    w.close();
    Ok(())
}

/// Reject empty backend fragments where the IR demands content.
pub(crate) fn require(fragment: String, what: &str) -> Result<String> {
    if fragment.trim().is_empty() {
        Err(Error::contract(format!("{} rendered empty", what)))
    } else {
        Ok(fragment)
    }
}
