//! TypeScript backend: client stubs and controller skeletons.
//!
//! Members are camelCased and the unset sentinel is `null`. Attributes have
//! no native TypeScript syntax, so surviving attributes are rendered as a
//! comment line ahead of the decorated member.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{AttributeFilter, CaseConvention, Formatter};
use crate::error::{Error, Result};
use crate::ir::{Attribute, Pair, Type, Value};
use crate::utils::{to_camel_case, to_pascal_case};

/// Mapping of IDL primitive names to TypeScript type names.
static TYPESCRIPT_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("bool", "boolean"),
        ("byte", "number"),
        ("int8", "number"),
        ("int16", "number"),
        ("int32", "number"),
        ("int64", "number"),
        ("float32", "number"),
        ("float64", "number"),
        ("string", "string"),
        ("datetime", "Date"),
        ("decimal", "string"),
        ("char", "string"),
    ])
});

#[derive(Debug, Clone, Copy)]
pub struct TypeScriptFormatter;

impl TypeScriptFormatter {
    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Str(v) => format!("{:?}", v),
            Value::Char(v) => format!("{:?}", v.to_string()),
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

impl Formatter for TypeScriptFormatter {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn member_convention(&self) -> CaseConvention {
        CaseConvention::Camel
    }

    // Class bodies cannot contain class declarations
    fn nests_containers(&self) -> bool {
        false
    }

    fn render_type(&self, ty: &Type) -> String {
        match ty {
            Type::List(v) => format!("{}[]", self.render_type(v)),
            Type::Map(k, v) => format!(
                "Map<{},{}>",
                TYPESCRIPT_TYPES
                    .get(k.idl_name())
                    .copied()
                    .unwrap_or("string"),
                self.render_type(v)
            ),
            Type::Binary => "Uint8Array".to_string(),
            Type::Void => "void".to_string(),
            Type::Named(name) | Type::Enum(name) => name.clone(),
            primitive => TYPESCRIPT_TYPES
                .get(primitive.idl_name())
                .copied()
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    fn render_literal(&self, ty: &Type, value: &Value) -> Result<String> {
        // No literal syntax for Date, and a number literal would silently
        // truncate an arbitrary-precision decimal
        if matches!(ty, Type::Datetime | Type::Decimal) && !matches!(value, Value::Ref(_)) {
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
        format!("// [{}]", rendered.join(", "))
    }

    fn render_doc(&self, lines: &[String], indent: usize) -> String {
        if lines.is_empty() {
            return String::new();
        }
        let pad = "    ".repeat(indent);
        let mut out = format!("{}/**\n", pad);
        for line in lines {
            if line.is_empty() {
                out.push_str(&format!("{} *\n", pad));
            } else {
                out.push_str(&format!("{} * {}\n", pad, line));
            }
        }
        out.push_str(&format!("{} */\n", pad));
        out
    }

    fn type_tag(&self, ty: &Type) -> String {
        format!("{:?}", ty.to_string())
    }

    fn cast(&self, ty: &Type, expr: &str) -> String {
        format!("{} as {} | null", expr, self.render_type(ty))
    }

    fn field_access(&self, ident: &str) -> String {
        format!("this.{}", ident)
    }

    fn unset_check(&self, access: &str) -> String {
        format!("{} === null", access)
    }

    fn file_header(&self, filename: &str) -> Vec<String> {
        vec![
            "// AUTO-GENERATED FILE - DO NOT MODIFY".to_string(),
            format!("// Generated from {}", filename),
            String::new(),
        ]
    }

    fn namespace_open(&self, _namespace: &str) -> Vec<String> {
        // Modules are file-scoped; nothing to open
        Vec::new()
    }

    fn namespace_close(&self) -> Vec<String> {
        Vec::new()
    }

    fn controller_header(&self, service_ident: &str, base: &str) -> String {
        format!(
            "export class {}Controller extends {}<I{}>",
            service_ident, base, service_ident
        )
    }

    fn client_header(&self, service_ident: &str) -> String {
        format!("export class {}Client extends ServiceClient", service_ident)
    }

    fn container_header(&self, container_ident: &str) -> String {
        format!("class {} implements ServiceRequest", container_ident)
    }

    fn field_declaration(&self, ident: &str, ty: &Type) -> String {
        format!("{}: {} | null = null", ident, self.render_type(ty))
    }

    fn visit_all_signature(&self) -> String {
        "runOnChildren(action: ModelAction, auxData: unknown, runOnAll: boolean = true): void"
            .to_string()
    }

    fn visit_by_name_signature(&self) -> String {
        "runOnChild(name: string, action: ModelAction, auxData: unknown): boolean".to_string()
    }

    fn apply_defaults_signature(&self) -> String {
        "setDefaults(): void".to_string()
    }

    fn entry_signature(&self, method_ident: &str, returns: &Type) -> String {
        format!("{}(): {}", method_ident, self.render_type(returns))
    }

    fn client_method_signature(
        &self,
        method_ident: &str,
        params: &[(String, Type)],
        returns: &Type,
    ) -> String {
        let rendered: Vec<String> = params
            .iter()
            .map(|(name, ty)| format!("{}: {}", to_camel_case(name), self.render_type(ty)))
            .collect();
        format!(
            "{}({}): Promise<{}>",
            method_ident,
            rendered.join(", "),
            self.render_type(returns)
        )
    }

    fn deserialize_statement(&self, container_ident: &str) -> String {
        format!(
            "const requestData = this.deserializeRequest<{}>();",
            container_ident
        )
    }

    fn business_call(&self, method_ident: &str, args: &[String]) -> String {
        format!("this.businessLogic.{}({})", method_ident, args.join(", "))
    }

    fn invoke_statement(
        &self,
        service_name: &str,
        method_name: &str,
        _returns: &Type,
        args: &[String],
    ) -> String {
        format!(
            "return this.invoke({:?}, {:?}, [{}]);",
            service_name,
            method_name,
            args.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_type() {
        let f = TypeScriptFormatter;
        assert_eq!(f.render_type(&Type::Int32), "number");
        assert_eq!(f.render_type(&Type::Bool), "boolean");
        assert_eq!(
            f.render_type(&Type::List(Box::new(Type::String))),
            "string[]"
        );
        assert_eq!(f.render_type(&Type::Named("User".to_string())), "User");
    }

    #[test]
    fn test_decimal_literal_unrepresentable() {
        let f = TypeScriptFormatter;
        let err = f
            .render_literal(&Type::Decimal, &Value::Str("300.24".into()))
            .unwrap_err();
        assert!(matches!(err, Error::UnrepresentableLiteral { .. }));
    }

    #[test]
    fn test_type_tag_is_quoted_idl_name() {
        let f = TypeScriptFormatter;
        assert_eq!(f.type_tag(&Type::Int32), "\"int32\"");
        assert_eq!(
            f.type_tag(&Type::List(Box::new(Type::Int32))),
            "\"list<int32>\""
        );
    }

    #[test]
    fn test_member_convention_is_camel() {
        let f = TypeScriptFormatter;
        assert_eq!(
            f.render_identifier("include_deleted", f.member_convention()),
            "includeDeleted"
        );
    }
}
