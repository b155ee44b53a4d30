//! The rendering engine: projects a validated IR tree into per-target
//! source files.
//!
//! For each service the engine emits one controller file (server role)
//! and/or one client-stub file (client role). All target-specific syntax
//! flows through the backend's [`Formatter`]; the engine owns traversal
//! order, the dispatch-table construction, the visitation-protocol shape
//! and the state-machine ordering of the generated entry points
//! (deserialize, apply defaults, dispatch).
//!
//! Generation is purely functional over the borrowed IR: identical input
//! and backend always produce byte-identical output.

use std::path::PathBuf;

use log::{info, warn};

use crate::backend::{AttributeFilter, BackendKind, Formatter};
use crate::config::Config;
use crate::dispatch::{emit_request_container, require, DispatchTable};
use crate::error::{Error, Result};
use crate::ir::{expand_comments, Idl, Method, Service};
use crate::writer::SourceWriter;

/// One generated source file, not yet written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub source: String,
}

/// Generate all files for one target language.
///
/// File writing is left to the caller; the returned sources are ordered by
/// service, controller before client.
pub fn generate(idl: &Idl, kind: BackendKind, config: &Config) -> Result<Vec<GeneratedFile>> {
    let fmt = kind.formatter();
    let filter = AttributeFilter::new(&config.scopes);
    let mut files = Vec::new();

    for service in &idl.services {
        if config.gen_server {
            files.push(render_service_file(
                idl,
                service,
                fmt.as_ref(),
                &filter,
                config,
                Role::Server,
            )?);
        }
        if config.gen_client {
            files.push(render_service_file(
                idl,
                service,
                fmt.as_ref(),
                &filter,
                config,
                Role::Client,
            )?);
        }
    }

    info!(
        "generated {} file(s) for target {}",
        files.len(),
        fmt.name()
    );
    Ok(files)
}

/// Generate for several targets, isolating failures per target.
///
/// A failure rendering one target never aborts the others; all per-target
/// failures are reported together alongside the files that did succeed.
pub fn generate_all(
    idl: &Idl,
    kinds: &[BackendKind],
    config: &Config,
) -> (Vec<GeneratedFile>, Vec<(BackendKind, Error)>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();
    for &kind in kinds {
        match generate(idl, kind, config) {
            Ok(mut generated) => files.append(&mut generated),
            Err(err) => {
                warn!("target {} failed: {}", kind, err);
                failures.push((kind, err));
            }
        }
    }
    (files, failures)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Server,
    Client,
}

impl Role {
    fn file_suffix(&self) -> &'static str {
        match self {
            Role::Server => "Controller",
            Role::Client => "Client",
        }
    }
}

fn render_service_file(
    idl: &Idl,
    service: &Service,
    fmt: &dyn Formatter,
    filter: &AttributeFilter,
    config: &Config,
    role: Role,
) -> Result<GeneratedFile> {
    let mut w = SourceWriter::new();
    w.lines(&fmt.file_header(&idl.filename));

    let ns_open = fmt.namespace_open(idl.namespace_for(fmt.name()));
    let in_namespace = !ns_open.is_empty();
    if in_namespace {
        w.lines(&ns_open);
        w.indent();
    }

    match role {
        Role::Server => emit_controller(&mut w, service, fmt, filter, config)?,
        Role::Client => emit_client(&mut w, service, fmt, filter)?,
    }

    if in_namespace {
        w.dedent();
        w.lines(&fmt.namespace_close());
    }

    let service_ident = fmt.render_identifier(&service.name, fmt.type_convention());
    let file_name = format!(
        "{}{}.{}",
        service_ident,
        role.file_suffix(),
        fmt.file_extension()
    );
    Ok(GeneratedFile {
        path: PathBuf::from(&config.output_dir).join(file_name),
        source: w.into_string(),
    })
}

fn emit_controller(
    w: &mut SourceWriter,
    service: &Service,
    fmt: &dyn Formatter,
    filter: &AttributeFilter,
    config: &Config,
) -> Result<()> {
    let service_ident = service_ident(service, fmt)?;

    let mut tables = Vec::with_capacity(service.methods.len());
    for method in &service.methods {
        tables.push(build_table(service, method, fmt, filter)?);
    }

    // Containers nest inside the controller where the target allows it;
    // otherwise they precede the controller declaration.
    if !fmt.nests_containers() {
        for table in tables.iter().flatten() {
            emit_request_container(w, fmt, table)?;
            w.blank();
        }
    }

    w.raw(&fmt.render_doc(&expand_comments(&service.comments), w.indent_level()));
    w.open(&require(
        fmt.controller_header(&service_ident, config.base_controller()),
        "controller header",
    )?);

    let mut first = true;
    for (method, table) in service.methods.iter().zip(&tables) {
        if !first {
            w.blank();
        }
        first = false;
        if fmt.nests_containers() {
            if let Some(table) = table {
                emit_request_container(w, fmt, table)?;
                w.blank();
            }
        }
        emit_controller_method(w, method, table.as_ref(), fmt, filter)?;
    }

    w.close();
    Ok(())
}

fn build_table(
    service: &Service,
    method: &Method,
    fmt: &dyn Formatter,
    filter: &AttributeFilter,
) -> Result<Option<DispatchTable>> {
    if !method.has_parameters() {
        return Ok(None);
    }
    let scope = format!("{}.{}", service.name, method.name);
    Ok(Some(DispatchTable::build(&scope, method, fmt, filter)?))
}

fn emit_controller_method(
    w: &mut SourceWriter,
    method: &Method,
    table: Option<&DispatchTable>,
    fmt: &dyn Formatter,
    filter: &AttributeFilter,
) -> Result<()> {
    let method_ident = fmt.render_identifier(&method.name, fmt.member_convention());

    w.raw(&fmt.render_doc(&expand_comments(&method.comments), w.indent_level()));
    let attr_line = fmt.render_attribute_list(&method.attributes, filter);
    if !attr_line.is_empty() {
        w.line(&attr_line);
    }

    // Entry point: deserialize, apply defaults, dispatch - in that order.
    // Straight-line emission keeps the container state machine valid by
    // construction.
    w.open(&require(
        fmt.entry_signature(&method_ident, &method.returns),
        "entry signature",
    )?);
    let args = match table {
        Some(table) => {
            w.line(&fmt.deserialize_statement(&table.container_ident));
            let apply_ident = fmt.render_identifier("set_defaults", fmt.member_convention());
            w.line(&format!("requestData.{}();", apply_ident));
            table
                .entries
                .iter()
                .map(|e| format!("requestData.{}", e.ident))
                .collect()
        }
        None => Vec::new(),
    };
    let call = fmt.business_call(&method_ident, &args);
    if method.returns.is_void() {
        w.line(&format!("{};", call));
    } else {
        w.line(&format!("return {};", call));
    }
    w.close();
    Ok(())
}

fn emit_client(
    w: &mut SourceWriter,
    service: &Service,
    fmt: &dyn Formatter,
    filter: &AttributeFilter,
) -> Result<()> {
    let service_ident = service_ident(service, fmt)?;
    w.raw(&fmt.render_doc(&expand_comments(&service.comments), w.indent_level()));

    w.open(&require(
        fmt.client_header(&service_ident),
        "client header",
    )?);

    let mut first = true;
    for method in &service.methods {
        if !first {
            w.blank();
        }
        first = false;

        // Same parameter-scope collision rules as the request container
        let _ = build_table(service, method, fmt, filter)?;

        let method_ident = fmt.render_identifier(&method.name, fmt.member_convention());
        w.raw(&fmt.render_doc(&expand_comments(&method.comments), w.indent_level()));
        let attr_line = fmt.render_attribute_list(&method.attributes, filter);
        if !attr_line.is_empty() {
            w.line(&attr_line);
        }

        let params: Vec<_> = method
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();
        w.open(&require(
            fmt.client_method_signature(&method_ident, &params, &method.returns),
            "client method signature",
        )?);
        let args: Vec<String> = method
            .parameters
            .iter()
            .map(|p| fmt.render_identifier(&p.name, crate::backend::CaseConvention::Camel))
            .collect();
        w.line(&fmt.invoke_statement(&service.name, &method.name, &method.returns, &args));
        w.close();
    }

    w.close();
    Ok(())
}

/// Case-convert the service name, checking sibling collisions in the
/// method scope along the way.
fn service_ident(service: &Service, fmt: &dyn Formatter) -> Result<String> {
    let ident = require(
        fmt.render_identifier(&service.name, fmt.type_convention()),
        "service identifier",
    )?;

    let mut seen: Vec<(String, &str)> = Vec::new();
    for method in &service.methods {
        let rendered = fmt.render_identifier(&method.name, fmt.member_convention());
        if let Some((_, first)) = seen.iter().find(|(r, _)| *r == rendered) {
            return Err(Error::IdentifierCollision {
                scope: format!("{} methods", service.name),
                first: (*first).to_string(),
                second: method.name.clone(),
                rendered,
            });
        }
        seen.push((rendered, &method.name));
    }
    Ok(ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Parameter, Type, Value};
    use std::collections::BTreeMap;

    fn sample_idl() -> Idl {
        Idl {
            filename: "users.babel".to_string(),
            namespaces: BTreeMap::from([(
                "csharp".to_string(),
                "Example.Users".to_string(),
            )]),
            services: vec![Service {
                name: "UserService".to_string(),
                comments: vec!["Manages user records.".to_string()],
                attributes: Vec::new(),
                methods: vec![Method {
                    name: "GetUser".to_string(),
                    returns: Type::Named("User".to_string()),
                    parameters: vec![
                        Parameter {
                            name: "id".to_string(),
                            ty: Type::Int32,
                            initializer: None,
                            attributes: Vec::new(),
                            comments: vec!["User identifier.".to_string()],
                        },
                        Parameter {
                            name: "include_deleted".to_string(),
                            ty: Type::Bool,
                            initializer: Some(Value::Bool(false)),
                            attributes: Vec::new(),
                            comments: Vec::new(),
                        },
                    ],
                    attributes: Vec::new(),
                    comments: vec!["Gets a user by id.".to_string()],
                }],
            }],
        }
    }

    fn server_config() -> Config {
        let mut config = Config::new("users.json", "out");
        config.gen_client = true;
        config
    }

    #[test]
    fn test_generation_is_deterministic() {
        let idl = sample_idl();
        let config = server_config();
        let a = generate(&idl, BackendKind::CSharp, &config).unwrap();
        let b = generate(&idl, BackendKind::CSharp, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_file_per_service_and_role() {
        let idl = sample_idl();
        let config = server_config();
        let files = generate(&idl, BackendKind::CSharp, &config).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(
            files[0].path,
            PathBuf::from("out").join("UserServiceController.cs")
        );
        assert_eq!(
            files[1].path,
            PathBuf::from("out").join("UserServiceClient.cs")
        );
    }

    #[test]
    fn test_controller_entry_point_ordering() {
        let idl = sample_idl();
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let controller = &files[0].source;

        assert!(controller.contains("namespace Example.Users"));
        assert!(controller
            .contains("public partial class UserServiceController : ServiceController<IUserService>"));

        // State machine: deserialize, then defaults, then dispatch
        let deserialize = controller
            .find("var requestData = DeserializeRequest<GetUserRequest>();")
            .unwrap();
        let defaults = controller.find("requestData.SetDefaults();").unwrap();
        let dispatch = controller
            .find("return m_businessLogic.GetUser(requestData.Id, requestData.IncludeDeleted);")
            .unwrap();
        assert!(deserialize < defaults && defaults < dispatch);
    }

    #[test]
    fn test_client_stub_forwards_positionally() {
        let idl = sample_idl();
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let client = &files[1].source;

        assert!(client.contains("public partial class UserServiceClient : ServiceClient"));
        assert!(client.contains("public User GetUser(int? id, bool? includeDeleted)"));
        assert!(client.contains(
            "return Invoke<User>(\"UserService\", \"GetUser\", new object[] { id, includeDeleted });"
        ));
    }

    #[test]
    fn test_zero_method_service_emits_empty_construct() {
        let mut idl = sample_idl();
        idl.services[0].methods.clear();
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let controller = &files[0].source;
        assert!(controller.contains("public partial class UserServiceController"));
        assert!(!controller.contains("Request"));
        assert!(!controller.contains("DeserializeRequest"));
    }

    #[test]
    fn test_parameterless_method_has_no_container() {
        let mut idl = sample_idl();
        idl.services[0].methods[0].parameters.clear();
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let controller = &files[0].source;
        assert!(!controller.contains("GetUserRequest"));
        assert!(controller.contains("return m_businessLogic.GetUser();"));
    }

    #[test]
    fn test_void_method_returns_nothing() {
        let mut idl = sample_idl();
        idl.services[0].methods[0].returns = Type::Void;
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let controller = &files[0].source;
        assert!(controller.contains("public void GetUser()"));
        assert!(controller
            .contains("m_businessLogic.GetUser(requestData.Id, requestData.IncludeDeleted);"));
        assert!(!controller.contains("return m_businessLogic"));
    }

    #[test]
    fn test_typescript_target() {
        let idl = sample_idl();
        let files = generate(&idl, BackendKind::TypeScript, &server_config()).unwrap();
        assert_eq!(
            files[0].path,
            PathBuf::from("out").join("UserServiceController.ts")
        );
        let controller = &files[0].source;
        // No namespace construct in the TypeScript output
        assert!(!controller.contains("namespace"));
        assert!(controller.contains("export class UserServiceController"));
        assert!(controller.contains("requestData.setDefaults();"));
        assert!(controller.contains(
            "return this.businessLogic.getUser(requestData.id, requestData.includeDeleted);"
        ));

        // Class bodies cannot nest class declarations: the container must
        // precede the controller
        let container = controller.find("class GetUserRequest").unwrap();
        let class_decl = controller.find("export class UserServiceController").unwrap();
        assert!(container < class_decl);
    }

    #[test]
    fn test_type_names_stay_pascal_for_camel_member_targets() {
        let mut idl = sample_idl();
        idl.services[0].name = "user_service".to_string();
        idl.services[0].methods[0].name = "get_user".to_string();
        let files = generate(&idl, BackendKind::TypeScript, &server_config()).unwrap();
        assert_eq!(
            files[0].path,
            PathBuf::from("out").join("UserServiceController.ts")
        );
        let controller = &files[0].source;
        assert!(controller.contains(
            "export class UserServiceController extends ServiceController<IUserService>"
        ));
        assert!(controller.contains("class GetUserRequest implements ServiceRequest"));
        // Members keep the target's camel convention
        assert!(controller.contains("getUser(): User"));
    }

    #[test]
    fn test_csharp_container_nests_in_controller() {
        let idl = sample_idl();
        let files = generate(&idl, BackendKind::CSharp, &server_config()).unwrap();
        let controller = &files[0].source;
        let class_decl = controller
            .find("public partial class UserServiceController")
            .unwrap();
        let container = controller.find("class GetUserRequest").unwrap();
        assert!(class_decl < container);
    }

    #[test]
    fn test_client_only_generation_detects_collisions() {
        let mut idl = sample_idl();
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "user_id".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "userId".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });

        let mut config = Config::new("users.json", "out");
        config.gen_server = false;
        config.gen_client = true;
        let err = generate(&idl, BackendKind::CSharp, &config).unwrap_err();
        assert!(matches!(err, Error::IdentifierCollision { .. }));
    }

    #[test]
    fn test_partial_failure_isolated_per_target() {
        let mut idl = sample_idl();
        // Force a collision under both shipped conventions
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "user_id".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "userId".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });

        let config = server_config();
        let (files, failures) = generate_all(
            &idl,
            &[BackendKind::CSharp, BackendKind::TypeScript],
            &config,
        );
        assert!(files.is_empty());
        assert_eq!(failures.len(), 2);
        assert!(failures
            .iter()
            .all(|(_, e)| matches!(e, Error::IdentifierCollision { .. })));
    }

    #[test]
    fn test_collision_free_target_still_succeeds() {
        let mut idl = sample_idl();
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "user_id".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });
        idl.services[0].methods[0].parameters.push(Parameter {
            name: "userId".to_string(),
            ty: Type::Int32,
            initializer: None,
            attributes: Vec::new(),
            comments: Vec::new(),
        });

        // The colliding pair is valid IR (names differ beyond case), so
        // validation passes and only case-converting targets fail.
        assert!(idl.validate().is_ok());
        let err = generate(&idl, BackendKind::CSharp, &server_config()).unwrap_err();
        assert!(matches!(err, Error::IdentifierCollision { .. }));

        // A target whose member convention preserves source spelling does
        // not collide on the same pair.
        let fmt = preserving::PreservingFormatter;
        let table = DispatchTable::build(
            "UserService.GetUser",
            &idl.services[0].methods[0],
            &fmt,
            &AttributeFilter::default(),
        )
        .unwrap();
        assert_eq!(table.entries.len(), 4);
    }

    mod preserving {
        use crate::backend::csharp::CSharpFormatter;
        use crate::backend::{AttributeFilter, CaseConvention, Formatter};
        use crate::ir::{Attribute, Type, Value};

        /// C# syntax with `Preserve` member casing, for collision tests.
        pub struct PreservingFormatter;

        impl Formatter for PreservingFormatter {
            fn name(&self) -> &'static str {
                "csharp-preserve"
            }
            fn file_extension(&self) -> &'static str {
                CSharpFormatter.file_extension()
            }
            fn member_convention(&self) -> CaseConvention {
                CaseConvention::Preserve
            }
            fn render_type(&self, ty: &Type) -> String {
                CSharpFormatter.render_type(ty)
            }
            fn render_literal(&self, ty: &Type, value: &Value) -> crate::Result<String> {
                CSharpFormatter.render_literal(ty, value)
            }
            fn render_identifier(&self, name: &str, convention: CaseConvention) -> String {
                CSharpFormatter.render_identifier(name, convention)
            }
            fn render_attribute_list(
                &self,
                attrs: &[Attribute],
                filter: &AttributeFilter,
            ) -> String {
                CSharpFormatter.render_attribute_list(attrs, filter)
            }
            fn render_doc(&self, lines: &[String], indent: usize) -> String {
                CSharpFormatter.render_doc(lines, indent)
            }
            fn type_tag(&self, ty: &Type) -> String {
                CSharpFormatter.type_tag(ty)
            }
            fn cast(&self, ty: &Type, expr: &str) -> String {
                CSharpFormatter.cast(ty, expr)
            }
            fn field_access(&self, ident: &str) -> String {
                CSharpFormatter.field_access(ident)
            }
            fn unset_check(&self, access: &str) -> String {
                CSharpFormatter.unset_check(access)
            }
            fn file_header(&self, filename: &str) -> Vec<String> {
                CSharpFormatter.file_header(filename)
            }
            fn namespace_open(&self, namespace: &str) -> Vec<String> {
                CSharpFormatter.namespace_open(namespace)
            }
            fn namespace_close(&self) -> Vec<String> {
                CSharpFormatter.namespace_close()
            }
            fn controller_header(&self, service_ident: &str, base: &str) -> String {
                CSharpFormatter.controller_header(service_ident, base)
            }
            fn client_header(&self, service_ident: &str) -> String {
                CSharpFormatter.client_header(service_ident)
            }
            fn container_header(&self, container_ident: &str) -> String {
                CSharpFormatter.container_header(container_ident)
            }
            fn field_declaration(&self, ident: &str, ty: &Type) -> String {
                CSharpFormatter.field_declaration(ident, ty)
            }
            fn visit_all_signature(&self) -> String {
                CSharpFormatter.visit_all_signature()
            }
            fn visit_by_name_signature(&self) -> String {
                CSharpFormatter.visit_by_name_signature()
            }
            fn apply_defaults_signature(&self) -> String {
                CSharpFormatter.apply_defaults_signature()
            }
            fn entry_signature(&self, method_ident: &str, returns: &Type) -> String {
                CSharpFormatter.entry_signature(method_ident, returns)
            }
            fn client_method_signature(
                &self,
                method_ident: &str,
                params: &[(String, Type)],
                returns: &Type,
            ) -> String {
                CSharpFormatter.client_method_signature(method_ident, params, returns)
            }
            fn deserialize_statement(&self, container_ident: &str) -> String {
                CSharpFormatter.deserialize_statement(container_ident)
            }
            fn business_call(&self, method_ident: &str, args: &[String]) -> String {
                CSharpFormatter.business_call(method_ident, args)
            }
            fn invoke_statement(
                &self,
                service_name: &str,
                method_name: &str,
                returns: &Type,
                args: &[String],
            ) -> String {
                CSharpFormatter.invoke_statement(service_name, method_name, returns, args)
            }
        }
    }
}
