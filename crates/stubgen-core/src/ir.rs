//! Intermediate representation of a service-interface description.
//!
//! The IR is the typed tree handed to the rendering engine by a front-end:
//! services grouping methods, methods carrying parameters, and the type,
//! attribute and comment sub-models attached to each node. It is pure data
//! plus invariants; the engine never mutates it.
//!
//! An `Idl` document can be built programmatically or deserialized from a
//! JSON/YAML file. Either way it must pass [`Idl::validate`] before being
//! handed to the engine — the engine assumes validated input and fails
//! fatally otherwise.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// An IDL type: a primitive, a user-defined name, or a parameterized
/// container. Map keys are restricted to primitive types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Bool,
    Byte,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Datetime,
    Decimal,
    Char,
    Binary,
    /// No return value; only valid as a method return type
    Void,
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    /// Reference to a user-defined structure by name
    Named(String),
    /// Reference to a user-defined enumeration by name
    Enum(String),
}

impl Type {
    /// Returns true if the type is one of the scalar primitives.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::Byte
                | Type::Int8
                | Type::Int16
                | Type::Int32
                | Type::Int64
                | Type::Float32
                | Type::Float64
                | Type::String
                | Type::Datetime
                | Type::Decimal
                | Type::Char
        )
    }

    /// Trivial types are value-like: safe to skip during selective
    /// visitation because they carry no nested structure. Enumerations
    /// count as value-like; lists, maps and user-defined structures are
    /// non-trivial and always visited.
    pub fn is_trivial(&self) -> bool {
        self.is_primitive() || matches!(self, Type::Binary | Type::Enum(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Type::List(_) | Type::Map(_, _))
    }

    pub fn is_int(&self) -> bool {
        matches!(
            self,
            Type::Byte | Type::Int8 | Type::Int16 | Type::Int32 | Type::Int64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float32 | Type::Float64)
    }

    /// Tag name for use by serializers: `ListOfInt32`, `MapOfStringToUser`.
    pub fn tag_name(&self) -> String {
        match self {
            Type::List(v) => format!("ListOf{}", v.tag_name()),
            Type::Map(k, v) => format!("MapOf{}To{}", k.tag_name(), v.tag_name()),
            Type::Named(name) | Type::Enum(name) => name.clone(),
            other => {
                let mut chars = other.idl_name().chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                }
            }
        }
    }

    /// The IDL-source spelling of a non-container type.
    pub fn idl_name(&self) -> &str {
        match self {
            Type::Bool => "bool",
            Type::Byte => "byte",
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::String => "string",
            Type::Datetime => "datetime",
            Type::Decimal => "decimal",
            Type::Char => "char",
            Type::Binary => "binary",
            Type::Void => "void",
            Type::List(_) => "list",
            Type::Map(_, _) => "map",
            Type::Named(name) | Type::Enum(name) => name,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List(v) => write!(f, "list<{}>", v),
            Type::Map(k, v) => write!(f, "map<{},{}>", k, v),
            other => write!(f, "{}", other.idl_name()),
        }
    }
}

/// A literal value appearing in the IR: default-value expressions and
/// attribute parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Char(char),
    /// Reference to a constant or enumeration value, e.g. `Status.Active`
    Ref(String),
}

impl Value {
    /// Checks that the value is assignable to the given declared type.
    pub fn assignable_to(&self, ty: &Type) -> bool {
        match self {
            Value::Int(_) => ty.is_int(),
            Value::Float(_) => ty.is_float(),
            Value::Bool(_) => matches!(ty, Type::Bool),
            Value::Str(_) => matches!(ty, Type::String),
            Value::Char(_) => matches!(ty, Type::Char),
            // References are resolved by the front-end; any non-container
            // type may be initialized from one.
            Value::Ref(_) => !ty.is_collection() && !ty.is_void(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::Ref(v) => write!(f, "{}", v),
        }
    }
}

/// A name/value pair used for attribute parameters. The name is optional:
/// positional attribute arguments carry only a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    #[serde(default)]
    pub name: Option<String>,
    pub value: Value,
}

/// A named decoration attached to a method or parameter. Attributes carry
/// ordered parameter pairs and a scope used for output filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Pair>,
    #[serde(default)]
    pub scope: String,
}

/// A method parameter: name, type, optional default-value initializer,
/// attributes and documentation comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub initializer: Option<Value>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A service method: return type, ordered parameters, attributes and
/// documentation comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default = "default_returns")]
    pub returns: Type,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub comments: Vec<String>,
}

fn default_returns() -> Type {
    Type::Void
}

impl Method {
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// A named group of methods forming one web-service interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Root of the IR: the parsed interface description for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idl {
    /// Name of the source IDL file the tree was produced from
    #[serde(default)]
    pub filename: String,

    /// Target-language namespace map, keyed by backend name
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,

    #[serde(default)]
    pub services: Vec<Service>,
}

impl Idl {
    /// Load an IR document from a JSON or YAML file, selected by extension.
    /// The loaded tree is validated before being returned.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let idl: Idl = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        idl.validate()?;
        Ok(idl)
    }

    /// Namespace configured for a backend, or the built-in fallback.
    pub fn namespace_for(&self, backend: &str) -> &str {
        self.namespaces
            .get(backend)
            .map(String::as_str)
            .unwrap_or("Generated")
    }

    /// Check the structural invariants the rendering engine relies on.
    ///
    /// Name uniqueness is case-insensitive, matching the IDL front-end:
    /// two parameters differing only in case would be ambiguous on the
    /// wire. Violations are reported with the offending entity path.
    pub fn validate(&self) -> Result<()> {
        let mut seen_services: Vec<&str> = Vec::new();
        for service in &self.services {
            if lookup_ci(&seen_services, &service.name) {
                return Err(Error::invalid_ir(&service.name, "service redefined"));
            }
            seen_services.push(&service.name);
            self.validate_service(service)?;
        }
        Ok(())
    }

    fn validate_service(&self, service: &Service) -> Result<()> {
        let mut seen_methods: Vec<&str> = Vec::new();
        for method in &service.methods {
            let path = format!("{}.{}", service.name, method.name);
            if lookup_ci(&seen_methods, &method.name) {
                return Err(Error::invalid_ir(path, "method redefined"));
            }
            seen_methods.push(&method.name);
            self.validate_method(service, method)?;
        }
        Ok(())
    }

    fn validate_method(&self, service: &Service, method: &Method) -> Result<()> {
        check_type(
            &method.returns,
            &format!("{}.{}", service.name, method.name),
        )?;
        let mut seen_params: Vec<&str> = Vec::new();
        for param in &method.parameters {
            let path = format!("{}.{}.{}", service.name, method.name, param.name);
            if lookup_ci(&seen_params, &param.name) {
                return Err(Error::invalid_ir(path, "parameter redefined"));
            }
            seen_params.push(&param.name);
            if param.ty.is_void() {
                return Err(Error::invalid_ir(path, "void is not a parameter type"));
            }
            check_type(&param.ty, &path)?;
            if let Some(init) = &param.initializer {
                if !init.assignable_to(&param.ty) {
                    return Err(Error::invalid_ir(
                        path,
                        format!("initializer {} is not assignable to {}", init, param.ty),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn lookup_ci(seen: &[&str], name: &str) -> bool {
    seen.iter().any(|s| s.eq_ignore_ascii_case(name))
}

fn check_type(ty: &Type, path: &str) -> Result<()> {
    match ty {
        Type::List(v) => check_type(v, path),
        Type::Map(k, v) => {
            if !k.is_primitive() {
                return Err(Error::invalid_ir(
                    path,
                    format!("map key type {} is not primitive", k),
                ));
            }
            check_type(v, path)
        }
        Type::Named(name) | Type::Enum(name) if name.is_empty() => {
            Err(Error::invalid_ir(path, "empty type reference"))
        }
        _ => Ok(()),
    }
}

/// Expand raw comment strings into normalized documentation lines.
///
/// A single comment may carry embedded line breaks; each becomes its own
/// line. Lines are trimmed, and blank lines are dropped at the edges of a
/// multi-line comment but kept in its interior.
pub fn expand_comments(comments: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    for comment in comments {
        let tokens: Vec<&str> = comment.split('\n').collect();
        if tokens.len() > 1 {
            for (index, token) in tokens.iter().enumerate() {
                let trimmed = token.trim();
                if !trimmed.is_empty() || (index != 0 && index < tokens.len() - 1) {
                    lines.push(trimmed.to_string());
                }
            }
        } else {
            lines.push(comment.trim().to_string());
        }
    }
    lines
}
