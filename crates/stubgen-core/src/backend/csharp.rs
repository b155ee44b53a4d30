//! C# backend: MVC-style controller skeletons and client proxies.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{AttributeFilter, CaseConvention, Formatter};
use crate::error::{Error, Result};
use crate::ir::{Attribute, Pair, Type, Value};
use crate::utils::{to_camel_case, to_pascal_case};

/// Mapping of IDL primitive names to C# type names.
static CSHARP_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("bool", "bool"),
        ("byte", "byte"),
        ("int8", "sbyte"),
        ("int16", "short"),
        ("int32", "int"),
        ("int64", "long"),
        ("float32", "float"),
        ("float64", "double"),
        ("string", "string"),
        ("datetime", "DateTime"),
        ("decimal", "decimal"),
        ("char", "char"),
    ])
});

#[derive(Debug, Clone, Copy)]
pub struct CSharpFormatter;

impl CSharpFormatter {
    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Str(v) => format!("{:?}", v),
            Value::Char(v) => format!("'{}'", v.escape_default()),
            Value::Ref(v) => v.clone(),
        }
    }

    fn attribute_parameter(&self, pair: &Pair) -> String {
        match &pair.name {
            Some(name) => format!("{} = {}", name, self.value_literal(&pair.value)),
            None => self.value_literal(&pair.value),
        }
    }
}

impl Formatter for CSharpFormatter {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn member_convention(&self) -> CaseConvention {
        CaseConvention::Pascal
    }

    fn render_type(&self, ty: &Type) -> String {
        match ty {
            Type::List(v) => format!("List<{}>", self.render_type(v)),
            Type::Map(k, v) => format!(
                "Dictionary<{},{}>",
                CSHARP_TYPES.get(k.idl_name()).copied().unwrap_or("string"),
                self.render_type(v)
            ),
            Type::Binary => "byte[]".to_string(),
            Type::Void => "void".to_string(),
            Type::Named(name) => name.clone(),
            // Enums are value types: nullable like the primitives
            Type::Enum(name) => format!("{}?", name),
            Type::String => "string".to_string(),
            // Value types are nullable so the unset sentinel exists
            primitive => format!(
                "{}?",
                CSHARP_TYPES
                    .get(primitive.idl_name())
                    .copied()
                    .unwrap_or("object")
            ),
        }
    }

    fn render_literal(&self, ty: &Type, value: &Value) -> Result<String> {
        // C# has no datetime literal syntax
        if matches!(ty, Type::Datetime) && !matches!(value, Value::Ref(_)) {
            return Err(Error::UnrepresentableLiteral {
                target: self.name().to_string(),
                type_name: ty.to_string(),
                value: value.to_string(),
            });
        }
        Ok(self.value_literal(value))
    }

    fn render_identifier(&self, name: &str, convention: CaseConvention) -> String {
        match convention {
            CaseConvention::Pascal => to_pascal_case(name),
            CaseConvention::Camel => to_camel_case(name),
            CaseConvention::Preserve => name.to_string(),
        }
    }

    fn render_attribute_list(&self, attrs: &[Attribute], filter: &AttributeFilter) -> String {
        let kept = filter.apply(attrs);
        if kept.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = kept
            .iter()
            .map(|a| {
                if a.parameters.is_empty() {
                    a.name.clone()
                } else {
                    let params: Vec<String> = a
                        .parameters
                        .iter()
                        .map(|p| self.attribute_parameter(p))
                        .collect();
                    format!("{}({})", a.name, params.join(", "))
                }
            })
            .collect();
        format!("[{}]", rendered.join(", "))
    }

    fn render_doc(&self, lines: &[String], indent: usize) -> String {
        if lines.is_empty() {
            return String::new();
        }
        let pad = "    ".repeat(indent);
        let mut out = format!("{}/// <summary>\n", pad);
        for line in lines {
            if line.is_empty() {
                out.push_str(&format!("{}///\n", pad));
            } else {
                out.push_str(&format!("{}/// {}\n", pad, line));
            }
        }
        out.push_str(&format!("{}/// </summary>\n", pad));
        out
    }

    fn type_tag(&self, ty: &Type) -> String {
        format!("typeof({})", self.render_type(ty))
    }

    fn cast_prefix(&self, ty: &Type) -> String {
        if matches!(ty, Type::Float32) {
            "(float)".to_string()
        } else {
            String::new()
        }
    }

    fn cast(&self, ty: &Type, expr: &str) -> String {
        format!("({}) {}", self.render_type(ty), expr)
    }

    fn field_access(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn unset_check(&self, access: &str) -> String {
        format!("{} == null", access)
    }

    fn file_header(&self, filename: &str) -> Vec<String> {
        vec![
            "// <auto-generated />".to_string(),
            "// AUTO-GENERATED FILE - DO NOT MODIFY".to_string(),
            format!("// Generated from {}", filename),
            String::new(),
            "using System;".to_string(),
            "using System.Collections.Generic;".to_string(),
            String::new(),
        ]
    }

    fn namespace_open(&self, namespace: &str) -> Vec<String> {
        vec![format!("namespace {}", namespace), "{".to_string()]
    }

    fn namespace_close(&self) -> Vec<String> {
        vec!["}".to_string()]
    }

    fn controller_header(&self, service_ident: &str, base: &str) -> String {
        format!(
            "public partial class {}Controller : {}<I{}>",
            service_ident, base, service_ident
        )
    }

    fn client_header(&self, service_ident: &str) -> String {
        format!("public partial class {}Client : ServiceClient", service_ident)
    }

    fn container_header(&self, container_ident: &str) -> String {
        format!("class {} : IServiceRequest", container_ident)
    }

    fn field_declaration(&self, ident: &str, ty: &Type) -> String {
        format!("public {} {}", self.render_type(ty), ident)
    }

    fn visit_all_signature(&self) -> String {
        "public void RunOnChildren<T>(ModelAction<T> action, T auxData, bool runOnAll = true)"
            .to_string()
    }

    fn visit_by_name_signature(&self) -> String {
        "public bool RunOnChild<T>(string name, ModelAction<T> action, T auxData)".to_string()
    }

    fn apply_defaults_signature(&self) -> String {
        "public void SetDefaults()".to_string()
    }

    fn entry_signature(&self, method_ident: &str, returns: &Type) -> String {
        format!("public {} {}()", self.render_type(returns), method_ident)
    }

    fn client_method_signature(
        &self,
        method_ident: &str,
        params: &[(String, Type)],
        returns: &Type,
    ) -> String {
        let rendered: Vec<String> = params
            .iter()
            .map(|(name, ty)| format!("{} {}", self.render_type(ty), to_camel_case(name)))
            .collect();
        format!(
            "public {} {}({})",
            self.render_type(returns),
            method_ident,
            rendered.join(", ")
        )
    }

    fn deserialize_statement(&self, container_ident: &str) -> String {
        format!(
            "var requestData = DeserializeRequest<{}>();",
            container_ident
        )
    }

    fn business_call(&self, method_ident: &str, args: &[String]) -> String {
        format!("m_businessLogic.{}({})", method_ident, args.join(", "))
    }

    fn invoke_statement(
        &self,
        service_name: &str,
        method_name: &str,
        returns: &Type,
        args: &[String],
    ) -> String {
        let arg_array = if args.is_empty() {
            "new object[] { }".to_string()
        } else {
            format!("new object[] {{ {} }}", args.join(", "))
        };
        if returns.is_void() {
            format!(
                "Invoke({:?}, {:?}, {});",
                service_name, method_name, arg_array
            )
        } else {
            format!(
                "return Invoke<{}>({:?}, {:?}, {});",
                self.render_type(returns),
                service_name,
                method_name,
                arg_array
            )
        }
    }
}
