//! Swagger 2.0 reader.
//!
//! The shared store is built first: the base endpoint, global media types,
//! shared parameters and responses, security schemes, tags and definitions.
//! Each path then becomes a [`Resource`] whose requests point into the store.

use indexmap::IndexMap;
use serde_json::{json, Number, Value};

use super::Parser;
use crate::auth::{ApiKeyAuth, ApiKeyLocation, Auth, BasicAuth, OAuth2Auth, OAuth2Flow, Scope};
use crate::constraint::Constraint;
use crate::container::ParameterContainer;
use crate::error::ParseError;
use crate::loader::load_document_str;
use crate::model::{
    Api, Contact, Group, GroupChild, Info, Interface, License, Request, Resource, Response,
};
use crate::parameter::{Location, Parameter, ParameterValue};
use crate::reference::{deep_merge, Indirect, RefType, Reference};
use crate::store::Store;
use crate::types::Format;
use crate::url::Url;

const FORMAT_NAME: &str = "swagger";

const METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

/// Methods whose requests may carry a body, and so a request `Content-Type`.
const BODY_METHODS: &[&str] = &["post", "put", "patch", "delete", "options"];

const BASE_ENDPOINT: &str = "base";
const GLOBAL_CONSUMES: &str = "globalConsumes";
const GLOBAL_PRODUCES: &str = "globalProduces";
const REQUEST_MEDIA_TYPE: &str = "apiRequestMediaType";
const RESPONSE_MEDIA_TYPE: &str = "apiResponseMediaType";
const CONTENT_TYPE: &str = "Content-Type";

fn score(document: &Value) -> f64 {
    let present = |key: &str| document.get(key).is_some_and(|v| !v.is_null());
    let mut score = 0.0;
    if present("swagger") {
        score += 0.25;
    }
    if document.get("swagger").and_then(Value::as_str) == Some("2.0") {
        score += 0.25;
    }
    if present("info") {
        score += 0.25;
    }
    if present("paths") {
        score += 0.25;
    }
    score
}

fn invalid(message: &str) -> ParseError {
    ParseError::InvalidDocument {
        format: FORMAT_NAME,
        message: message.into(),
    }
}

/// Reads Swagger 2.0 documents, in JSON or YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerParser;

impl Parser for SwaggerParser {
    fn format(&self) -> Format {
        Format::Swagger
    }

    fn detect(&self, content: &str) -> f64 {
        load_document_str(content).map_or(0.0, |doc| score(&doc))
    }

    fn api_name(&self, content: &str) -> Option<String> {
        let document = load_document_str(content).ok()?;
        string(document.get("info")?, "title")
    }

    fn parse(&self, content: &str) -> Result<Api, ParseError> {
        let document = load_document_str(content)?;
        if !document.is_object() {
            return Err(invalid("top level is not an object"));
        }
        if document.get("swagger").is_none() {
            return Err(invalid("missing `swagger` field"));
        }

        let api = build_api(&document);
        tracing::debug!(
            resources = api.resources.len(),
            definitions = api.store.constraint.len(),
            "parsed swagger document"
        );
        Ok(api)
    }
}

// === Document accessors ===

fn string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn strings(value: &Value, key: &str) -> Vec<String> {
    array(value, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn entries<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = (&'a String, &'a Value)> {
    value.get(key).and_then(Value::as_object).into_iter().flatten()
}

/// Operation objects of a path item, with their lowercase method.
fn operations(item: &Value) -> impl Iterator<Item = (String, &Value)> {
    item.as_object()
        .into_iter()
        .flatten()
        .map(|(method, operation)| (method.to_lowercase(), operation))
        .filter(|(method, _)| METHODS.contains(&method.as_str()))
}

fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        _ => None,
    }
}

fn with_colon(scheme: &str) -> String {
    if scheme.ends_with(':') {
        scheme.to_string()
    } else {
        format!("{scheme}:")
    }
}

fn braces() -> Vec<String> {
    vec!["{".into(), "}".into()]
}

// === Api ===

fn build_api(swagger: &Value) -> Api {
    let store = build_store(swagger);
    let resources: IndexMap<String, Resource> = entries(swagger, "paths")
        .map(|(path, item)| (path.clone(), build_resource(&store, swagger, path, item)))
        .collect();
    let group = build_group(&resources);

    Api {
        info: swagger.get("info").map(build_info).unwrap_or_default(),
        store,
        resources,
        group: Some(group),
    }
}

fn build_info(info: &Value) -> Info {
    Info {
        title: string(info, "title"),
        description: string(info, "description"),
        tos: string(info, "termsOfService"),
        contact: info.get("contact").map(|contact| Contact {
            name: string(contact, "name"),
            url: string(contact, "url"),
            email: string(contact, "email"),
        }),
        license: info.get("license").map(|license| License {
            name: string(license, "name"),
            url: string(license, "url"),
        }),
        version: string(info, "version"),
    }
}

/// Group per path, each listing its requests by method.
fn build_group(resources: &IndexMap<String, Resource>) -> Group {
    let children = resources
        .iter()
        .map(|(path, resource)| {
            let mut group = Group::named(path.as_str());
            group.id = Some(path.clone());
            group.children = resource
                .methods
                .iter()
                .filter_map(|(method, request)| {
                    Some((method.clone(), GroupChild::Request(request.id.clone()?)))
                })
                .collect();
            (path.clone(), GroupChild::Group(group))
        })
        .collect();

    Group {
        description: Some("All the requests".into()),
        children,
        ..Default::default()
    }
}

// === Store ===

fn build_store(swagger: &Value) -> Store {
    let mut store = Store::default();
    store
        .endpoint
        .insert(BASE_ENDPOINT.into(), shared_endpoint(swagger));

    let consumes = strings(swagger, "consumes");
    if !consumes.is_empty() {
        let mut parameter = content_type_param(consumes, "request");
        parameter.uuid = Some(GLOBAL_CONSUMES.into());
        parameter.interfaces.insert(
            REQUEST_MEDIA_TYPE.into(),
            Reference::new(RefType::Interface, REQUEST_MEDIA_TYPE),
        );
        store.parameter.insert(GLOBAL_CONSUMES.into(), parameter);
        store.interface.insert(
            REQUEST_MEDIA_TYPE.into(),
            media_type_interface(REQUEST_MEDIA_TYPE, "request"),
        );
    }

    let produces = strings(swagger, "produces");
    if !produces.is_empty() {
        let mut parameter = content_type_param(produces, "response");
        parameter.uuid = Some(GLOBAL_PRODUCES.into());
        parameter.interfaces.insert(
            RESPONSE_MEDIA_TYPE.into(),
            Reference::new(RefType::Interface, RESPONSE_MEDIA_TYPE),
        );
        store.parameter.insert(GLOBAL_PRODUCES.into(), parameter);
        store.interface.insert(
            RESPONSE_MEDIA_TYPE.into(),
            media_type_interface(RESPONSE_MEDIA_TYPE, "response"),
        );
    }

    for (name, param) in entries(swagger, "parameters") {
        let uuid = format!("#/parameters/{name}");
        let mut parameter = convert_parameter(param);
        parameter.uuid = Some(uuid.clone());
        store.parameter.insert(uuid, parameter);
    }

    for (name, response) in entries(swagger, "responses") {
        match convert_response(None, response) {
            Indirect::Direct(response) => {
                store.response.insert(format!("#/responses/{name}"), response);
            }
            Indirect::Ref(reference) => {
                tracing::debug!(response = %name, target = %reference, "skipping shared response alias");
            }
        }
    }

    for requirement in array(swagger, "security") {
        for name in requirement.as_object().into_iter().flat_map(|r| r.keys()) {
            store.interface.insert(
                name.clone(),
                Interface {
                    name: Some(name.clone()),
                    uuid: Some(name.clone()),
                    level: Some("auth".into()),
                    ..Default::default()
                },
            );
        }
    }

    for (name, definition) in entries(swagger, "securityDefinitions") {
        match convert_auth(name, definition) {
            Some(auth) => {
                store.auth.insert(name.clone(), auth);
            }
            None => tracing::warn!(
                auth = %name,
                kind = ?definition.get("type"),
                "unsupported security definition skipped"
            ),
        }
    }

    for tag in array(swagger, "tags") {
        if let Some(name) = string(tag, "name") {
            let description = string(tag, "description");
            store
                .interface
                .insert(name.clone(), tag_interface(&name, description));
        }
    }
    for (_, item) in entries(swagger, "paths") {
        for (_, operation) in operations(item) {
            for tag in strings(operation, "tags") {
                if !store.interface.contains_key(&tag) {
                    let interface = tag_interface(&tag, None);
                    store.interface.insert(tag, interface);
                }
            }
        }
    }

    for (name, schema) in entries(swagger, "definitions") {
        store
            .constraint
            .insert(name.clone(), Constraint::JsonSchema(schema.clone()));
    }

    store
}

/// The api-wide endpoint: `schemes`, `host` and `basePath`.
fn shared_endpoint(swagger: &Value) -> Url {
    let mut schemes = strings(swagger, "schemes");
    if schemes.is_empty() {
        schemes.push("http".into());
    }
    let host = string(swagger, "host").unwrap_or_else(|| "localhost".into());
    let base_path = string(swagger, "basePath").unwrap_or_else(|| "/".into());

    Url::from_parts(
        schemes.iter().map(|s| with_colon(s)).collect(),
        &host,
        &base_path,
    )
}

fn content_type_param(media_types: Vec<String>, direction: &str) -> Parameter {
    Parameter {
        location: Some(Location::Headers),
        key: Some(CONTENT_TYPE.into()),
        name: Some("Content Type Header".into()),
        param_type: Some("string".into()),
        required: true,
        description: Some(format!("describes the media type of the {direction}")),
        constraints: vec![Constraint::Enum(
            media_types.into_iter().map(Value::String).collect(),
        )],
        ..Default::default()
    }
}

fn media_type_interface(name: &str, direction: &str) -> Interface {
    Interface {
        name: Some(name.into()),
        uuid: Some(name.into()),
        level: Some(direction.into()),
        description: Some(format!(
            "defines the common media type of {direction}s in the API."
        )),
        ..Default::default()
    }
}

fn tag_interface(tag: &str, description: Option<String>) -> Interface {
    Interface {
        name: Some(tag.into()),
        uuid: Some(tag.into()),
        level: Some("request".into()),
        description,
        ..Default::default()
    }
}

fn convert_auth(name: &str, definition: &Value) -> Option<Auth> {
    let description = string(definition, "description");
    let auth_name = Some(name.to_string());

    let auth = match definition.get("type").and_then(Value::as_str)? {
        "basic" => Auth::Basic(BasicAuth {
            description,
            auth_name,
            ..Default::default()
        }),
        "apiKey" => Auth::ApiKey(ApiKeyAuth {
            description,
            auth_name,
            name: string(definition, "name"),
            location: match definition.get("in").and_then(Value::as_str) {
                Some("header") => Some(ApiKeyLocation::Header),
                Some("query") => Some(ApiKeyLocation::Query),
                _ => None,
            },
            ..Default::default()
        }),
        "oauth2" => Auth::OAuth2(OAuth2Auth {
            description,
            auth_name,
            flow: definition
                .get("flow")
                .and_then(Value::as_str)
                .and_then(OAuth2Flow::parse),
            authorization_url: string(definition, "authorizationUrl"),
            token_url: string(definition, "tokenUrl"),
            scopes: entries(definition, "scopes")
                .map(|(key, value)| Scope {
                    key: key.clone(),
                    value: value.as_str().map(str::to_string),
                })
                .collect(),
        }),
        _ => return None,
    };
    Some(auth)
}

// === Parameters ===

fn map_location(location: &str) -> Option<Location> {
    match location.to_lowercase().as_str() {
        "path" => Some(Location::Path),
        "header" => Some(Location::Headers),
        "query" => Some(Location::Queries),
        "body" | "formdata" => Some(Location::Body),
        _ => None,
    }
}

fn convert_parameter(param: &Value) -> Parameter {
    let source_location = param.get("in").and_then(Value::as_str);
    let name = string(param, "name");

    let mut parameter = Parameter {
        location: source_location.and_then(map_location),
        key: if source_location == Some("body") {
            None
        } else {
            name.clone()
        },
        name,
        param_type: string(param, "type"),
        format: string(param, "format"),
        default: param.get("default").filter(|v| !v.is_null()).cloned(),
        required: param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        description: string(param, "description"),
        constraints: constraints_of(param),
        ..Default::default()
    };

    if parameter.param_type.as_deref() == Some("array") {
        if let Some(items) = param.get("items").filter(|items| items.is_object()) {
            parameter.value = Some(ParameterValue::Items(Box::new(convert_parameter(items))));
        }
    }
    parameter
}

fn constraints_of(param: &Value) -> Vec<Constraint> {
    param
        .as_object()
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| constraint_for(param, key, value))
        .collect()
}

/// Constraint for one field of a parameter object.
///
/// The boolean `exclusiveMinimum`/`exclusiveMaximum` flags only switch the
/// variant produced for `minimum`/`maximum`.
fn constraint_for(param: &Value, key: &str, value: &Value) -> Option<Constraint> {
    let flag = |name: &str| param.get(name).and_then(Value::as_bool).unwrap_or(false);

    let constraint = match key {
        "minimum" if flag("exclusiveMinimum") => Constraint::ExclusiveMinimum(number(value)?),
        "minimum" => Constraint::Minimum(number(value)?),
        "maximum" if flag("exclusiveMaximum") => Constraint::ExclusiveMaximum(number(value)?),
        "maximum" => Constraint::Maximum(number(value)?),
        "multipleOf" => Constraint::MultipleOf(number(value)?),
        "minLength" => Constraint::MinimumLength(value.as_u64()?),
        "maxLength" => Constraint::MaximumLength(value.as_u64()?),
        "pattern" => Constraint::Pattern(value.as_str()?.to_string()),
        "minItems" => Constraint::MinimumItems(value.as_u64()?),
        "maxItems" => Constraint::MaximumItems(value.as_u64()?),
        "uniqueItems" => Constraint::UniqueItems(value.as_bool()?),
        "enum" => Constraint::Enum(value.as_array()?.clone()),
        "schema" => Constraint::JsonSchema(value.clone()),
        _ => return None,
    };
    Some(constraint)
}

/// Container of an operation's parameters.
///
/// The first parameter seen for a location and key wins, so operation-level
/// parameters shadow the path-level ones appended after them.
fn parameter_container(store: &Store, params: &[&Value]) -> ParameterContainer {
    params
        .iter()
        .enumerate()
        .fold(ParameterContainer::default(), |container, (index, param)| {
            if let Some(uri) = param.get("$ref").and_then(Value::as_str) {
                let Some(location) = store.parameter.get(uri).and_then(|p| p.location) else {
                    tracing::warn!(reference = %uri, "dropping unresolved parameter reference");
                    return container;
                };
                if container.block(location).contains_key(uri) {
                    return container;
                }
                return container.with(location, uri, Reference::new(RefType::Parameter, uri));
            }

            let parameter = convert_parameter(param);
            let Some(location) = parameter.location else {
                tracing::warn!(parameter = ?parameter.name, "dropping parameter without a known location");
                return container;
            };
            let key = parameter
                .name
                .clone()
                .unwrap_or_else(|| format!("param{index}"));
            if container.block(location).contains_key(&key) {
                return container;
            }
            container.with(location, key, parameter)
        })
}

fn with_consumes(store: &Store, operation: &Value, container: ParameterContainer) -> ParameterContainer {
    if operation.get("consumes").is_none() && store.parameter.contains_key(GLOBAL_CONSUMES) {
        return container.with(
            Location::Headers,
            GLOBAL_CONSUMES,
            Reference::new(RefType::Parameter, GLOBAL_CONSUMES),
        );
    }

    let consumes = strings(operation, "consumes");
    if consumes.is_empty() {
        return container;
    }
    container.with(
        Location::Headers,
        CONTENT_TYPE,
        content_type_param(consumes, "request"),
    )
}

/// Response `Content-Type` of an operation: its own `produces`, or the global one.
fn produces_entry(store: &Store, operation: &Value) -> Option<(String, Indirect<Parameter>)> {
    if operation.get("produces").is_none() && store.parameter.contains_key(GLOBAL_PRODUCES) {
        return Some((
            GLOBAL_PRODUCES.into(),
            Reference::new(RefType::Parameter, GLOBAL_PRODUCES).into(),
        ));
    }

    let produces = strings(operation, "produces");
    if produces.is_empty() {
        return None;
    }
    Some((
        CONTENT_TYPE.into(),
        content_type_param(produces, "response").into(),
    ))
}

// === Responses ===

fn convert_response(code: Option<&str>, response: &Value) -> Indirect<Response> {
    if let Some(uri) = response.get("$ref").and_then(Value::as_str) {
        let reference = Reference::new(RefType::Response, uri);
        return match code {
            Some(code) => reference.with_overlay(json!({ "code": code })).into(),
            None => reference.into(),
        };
    }

    let mut parameters = ParameterContainer::default();
    if let Some(schema) = response.get("schema") {
        let body = Parameter {
            location: Some(Location::Body),
            constraints: vec![Constraint::JsonSchema(schema.clone())],
            ..Default::default()
        };
        parameters = parameters.with(Location::Body, "body", body);
    }
    for (name, header) in entries(response, "headers") {
        let mut parameter = convert_parameter(header);
        parameter.location = Some(Location::Headers);
        parameter.key = Some(name.clone());
        parameter.name = Some(name.clone());
        parameters = parameters.with(Location::Headers, name.clone(), parameter);
    }

    Indirect::Direct(Response {
        code: code.map(str::to_string),
        description: string(response, "description"),
        examples: response.get("examples").cloned(),
        parameters,
        ..Default::default()
    })
}

/// Add the response `Content-Type` header, through the overlay for references.
fn add_produces(entry: &mut Indirect<Response>, key: &str, header: &Indirect<Parameter>) {
    match entry {
        Indirect::Direct(response) => {
            response
                .parameters
                .headers
                .insert(key.to_string(), header.clone());
        }
        Indirect::Ref(reference) => {
            let header = serde_json::to_value(header).unwrap_or(Value::Null);
            let patch = json!({ "parameters": { "headers": { key: header } } });
            let overlay = reference.overlay.get_or_insert_with(|| json!({}));
            deep_merge(overlay, &patch);
        }
    }
}

fn operation_responses(store: &Store, operation: &Value) -> IndexMap<String, Indirect<Response>> {
    let produces = produces_entry(store, operation);
    entries(operation, "responses")
        .map(|(code, response)| {
            let mut entry = convert_response(Some(code), response);
            if let Some((key, header)) = &produces {
                add_produces(&mut entry, key, header);
            }
            (code.clone(), entry)
        })
        .collect()
}

// === Resources ===

fn build_resource(store: &Store, swagger: &Value, path: &str, item: &Value) -> Resource {
    let shared: Vec<&Value> = array(item, "parameters").iter().collect();
    let methods = operations(item)
        .map(|(method, operation)| {
            let request = build_request(store, swagger, path, &method, operation, &shared);
            (method, request)
        })
        .collect();

    Resource {
        uuid: Some(path.to_string()),
        path: Url::path(path, &braces()),
        endpoints: store
            .endpoint
            .keys()
            .map(|uuid| (uuid.clone(), Reference::new(RefType::Endpoint, uuid.as_str())))
            .collect(),
        methods,
        ..Default::default()
    }
}

fn build_request(
    store: &Store,
    swagger: &Value,
    path: &str,
    method: &str,
    operation: &Value,
    shared: &[&Value],
) -> Request {
    let mut params: Vec<&Value> = array(operation, "parameters").iter().collect();
    params.extend_from_slice(shared);

    let mut parameters = parameter_container(store, &params);
    if BODY_METHODS.contains(&method) {
        parameters = with_consumes(store, operation, parameters);
    }

    let security = operation
        .get("security")
        .or_else(|| swagger.get("security"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    Request {
        id: Some(string(operation, "operationId").unwrap_or_else(|| format!("{method} {path}"))),
        name: string(operation, "summary"),
        description: string(operation, "description"),
        method: Some(method.to_string()),
        endpoints: operation_endpoints(store, operation),
        parameters,
        auths: auth_references(store, security),
        responses: operation_responses(store, operation),
        interfaces: strings(operation, "tags")
            .into_iter()
            .map(|tag| {
                let reference = Reference::new(RefType::Interface, tag.as_str());
                (tag, reference)
            })
            .collect(),
        ..Default::default()
    }
}

/// References to every shared endpoint, overriding the schemes when the
/// operation declares its own.
fn operation_endpoints(store: &Store, operation: &Value) -> IndexMap<String, Reference> {
    let protocol: Option<Vec<String>> = operation
        .get("schemes")
        .map(|_| strings(operation, "schemes").iter().map(|s| with_colon(s)).collect());

    store
        .endpoint
        .keys()
        .map(|uuid| {
            let reference = Reference::new(RefType::Endpoint, uuid.as_str());
            let reference = match &protocol {
                Some(protocol) => reference.with_overlay(json!({ "protocol": protocol })),
                None => reference,
            };
            (uuid.clone(), reference)
        })
        .collect()
}

/// One auth reference per scheme named in the security requirements.
///
/// OAuth2 references carry an overlay restricting the scopes to the required ones.
fn auth_references(store: &Store, requirements: &[Value]) -> Vec<Indirect<Auth>> {
    requirements
        .iter()
        .filter_map(Value::as_object)
        .flatten()
        .map(|(name, required)| -> Indirect<Auth> {
            let reference = Reference::new(RefType::Auth, name.as_str());
            let Some(Auth::OAuth2(oauth)) = store.auth.get(name) else {
                return reference.into();
            };

            let scopes: Vec<Scope> = required
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(|key| {
                    oauth
                        .scopes
                        .iter()
                        .find(|scope| scope.key == key)
                        .cloned()
                        .unwrap_or_else(|| Scope::new(key))
                })
                .collect();
            reference
                .with_overlay(json!({ "scopes": scopes }))
                .into()
        })
        .collect()
}
