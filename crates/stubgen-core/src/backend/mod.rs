//! Target-language backends: the formatter contract and its implementations.
//!
//! Each backend supplies the per-language rendering operations the engine
//! calls while projecting the IR into source text. The engine never
//! special-cases a target internally; every language-specific decision
//! flows through the [`Formatter`] trait. The contract's core is the five
//! pure operations of the formatter contract (type syntax, literal syntax,
//! identifier casing, attribute syntax, doc-comment syntax); the remaining
//! methods cover the target's declaration and statement surface, playing
//! the role of the per-language template set in classic generators.

pub mod csharp;
pub mod typescript;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::ir::{Attribute, Type, Value};

/// Identifier casing conventions a formatter can be asked to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseConvention {
    /// `user_id` becomes `UserId`
    Pascal,
    /// `user_id` becomes `userId`
    Camel,
    /// Source spelling kept as-is
    Preserve,
}

/// Scope-based attribute filtering, owned by the generation run.
///
/// An attribute survives the filter when it carries no scope or when its
/// scope matches one of the enabled scopes, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AttributeFilter {
    scopes: Vec<String>,
}

impl AttributeFilter {
    pub fn new(scopes: &[String]) -> Self {
        Self {
            scopes: scopes.to_vec(),
        }
    }

    pub fn matches(&self, attr: &Attribute) -> bool {
        attr.scope.is_empty()
            || self
                .scopes
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&attr.scope))
    }

    /// Attributes surviving the filter, relative order preserved.
    pub fn apply<'a>(&self, attrs: &'a [Attribute]) -> Vec<&'a Attribute> {
        attrs.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Per-target rendering operations consumed by the engine.
///
/// Implementations must be pure: total over the IR sub-model, free of side
/// effects, and deterministic. Fallible operations return the dedicated
/// error kinds (`UnrepresentableLiteral`); an empty fragment where the IR
/// demands content is reported by the engine as a contract violation.
pub trait Formatter: Send + Sync {
    /// Backend name; also the key into the IR's namespace map.
    fn name(&self) -> &'static str;

    /// Extension of generated files, without the leading dot.
    fn file_extension(&self) -> &'static str;

    /// Casing convention for generated member identifiers.
    fn member_convention(&self) -> CaseConvention;

    /// Casing convention for generated type identifiers (controllers,
    /// clients, request containers).
    fn type_convention(&self) -> CaseConvention {
        CaseConvention::Pascal
    }

    /// Whether request containers may be declared inside the controller
    /// class body. Targets without nested class declarations get their
    /// containers ahead of the controller instead.
    fn nests_containers(&self) -> bool {
        true
    }

    // --- formatter contract core ---

    /// Target-syntax type expression.
    fn render_type(&self, ty: &Type) -> String;

    /// Target-syntax literal for a default-value expression.
    fn render_literal(&self, ty: &Type, value: &Value) -> Result<String>;

    /// Case-convert a source identifier.
    fn render_identifier(&self, name: &str, convention: CaseConvention) -> String;

    /// Attributes surviving the filter, rendered on one line; empty string
    /// when none survive.
    fn render_attribute_list(&self, attrs: &[Attribute], filter: &AttributeFilter) -> String;

    /// Doc-comment block for normalized lines, fully indented at `indent`
    /// levels; empty string for empty input.
    fn render_doc(&self, lines: &[String], indent: usize) -> String;

    // --- dispatch-statement surface ---

    /// Type tag passed to visitation actions, e.g. `typeof(int?)` or a
    /// quoted tag string.
    fn type_tag(&self, ty: &Type) -> String;

    /// Prefix forcing a literal to the declared type where the target's
    /// literal syntax is too wide (e.g. `(float)` before a float32 default).
    fn cast_prefix(&self, ty: &Type) -> String {
        let _ = ty;
        String::new()
    }

    /// Coerce an expression to the declared field type.
    fn cast(&self, ty: &Type, expr: &str) -> String;

    /// Expression reading or writing a container field from inside the
    /// container's own methods.
    fn field_access(&self, ident: &str) -> String;

    /// Expression testing whether a field still holds the unset sentinel.
    fn unset_check(&self, access: &str) -> String;

    // --- declaration surface ---

    /// Banner and import lines opening a generated file.
    fn file_header(&self, filename: &str) -> Vec<String>;

    /// Lines opening the target namespace; empty when the target has none.
    fn namespace_open(&self, namespace: &str) -> Vec<String>;

    fn namespace_close(&self) -> Vec<String>;

    /// Class-header line for a service controller extending `base`.
    fn controller_header(&self, service_ident: &str, base: &str) -> String;

    /// Class-header line for a service client proxy.
    fn client_header(&self, service_ident: &str) -> String;

    /// Class-header line for a request container.
    fn container_header(&self, container_ident: &str) -> String;

    /// Field declaration inside a request container, without the
    /// terminating semicolon.
    fn field_declaration(&self, ident: &str, ty: &Type) -> String;

    fn visit_all_signature(&self) -> String;

    fn visit_by_name_signature(&self) -> String;

    fn apply_defaults_signature(&self) -> String;

    /// Signature of the generated server entry point for a method.
    fn entry_signature(&self, method_ident: &str, returns: &Type) -> String;

    /// Signature of a generated client proxy method.
    fn client_method_signature(
        &self,
        method_ident: &str,
        params: &[(String, Type)],
        returns: &Type,
    ) -> String;

    // --- statement surface ---

    /// Statement deserializing the raw request into `requestData`.
    fn deserialize_statement(&self, container_ident: &str) -> String;

    /// Expression invoking the business-logic collaborator positionally.
    fn business_call(&self, method_ident: &str, args: &[String]) -> String;

    /// Statement forwarding a client proxy call over the transport.
    fn invoke_statement(
        &self,
        service_name: &str,
        method_name: &str,
        returns: &Type,
        args: &[String],
    ) -> String;
}

/// The targets this build of the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// C# MVC-style controller and client proxy
    #[default]
    CSharp,
    /// TypeScript client stub and controller skeleton
    TypeScript,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" => Ok(BackendKind::CSharp),
            "typescript" => Ok(BackendKind::TypeScript),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl BackendKind {
    /// Returns the backend identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::TypeScript => "typescript",
        }
    }

    /// Returns an iterator over all available backends
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::CSharp, Self::TypeScript].iter().copied()
    }

    /// Formatter instance for this backend.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self {
            Self::CSharp => Box::new(csharp::CSharpFormatter),
            Self::TypeScript => Box::new(typescript::TypeScriptFormatter),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(BackendKind::CSharp.as_str(), "csharp");
        assert_eq!(BackendKind::TypeScript.as_str(), "typescript");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("csharp".parse::<BackendKind>().unwrap(), BackendKind::CSharp);
        assert_eq!(
            "TypeScript".parse::<BackendKind>().unwrap(),
            BackendKind::TypeScript
        );
        assert!("cobol".parse::<BackendKind>().is_err());
        assert!("".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BackendKind::CSharp), "csharp");
        assert_eq!(format!("{}", BackendKind::TypeScript), "typescript");
    }

    #[test]
    fn test_all() {
        let kinds: Vec<_> = BackendKind::all().collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&BackendKind::CSharp));
        assert!(kinds.contains(&BackendKind::TypeScript));
    }

    #[test]
    fn test_attribute_filter() {
        use crate::ir::Attribute;
        let attrs = vec![
            Attribute {
                name: "Log".to_string(),
                parameters: Vec::new(),
                scope: String::new(),
            },
            Attribute {
                name: "Auth".to_string(),
                parameters: Vec::new(),
                scope: "server".to_string(),
            },
            Attribute {
                name: "Retry".to_string(),
                parameters: Vec::new(),
                scope: "client".to_string(),
            },
        ];

        let filter = AttributeFilter::new(&["Server".to_string()]);
        let kept: Vec<_> = filter.apply(&attrs).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(kept, vec!["Log", "Auth"]);
    }
}
