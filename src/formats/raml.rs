//! RAML 1.0 writer.
//!
//! Named schemas become RAML data types when the dependency graph says they
//! (and everything they reference) can be expressed natively. The others are
//! demoted to a raw JSON-Schema string with their dependencies inlined.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::Serializer;
use crate::auth::{ApiKeyLocation, Auth, OAuth2Flow};
use crate::constraint::Constraint;
use crate::container::ParameterContainer;
use crate::error::SerializeError;
use crate::graph::{ref_name, SchemaGraph};
use crate::model::{Api, Request, Resource, Response};
use crate::parameter::{Parameter, ParameterValue, SchemaOptions};
use crate::reference::Indirect;
use crate::store::Store;
use crate::types::Format;
use crate::url::Url;

const HEADER: &str = "#%RAML 1.0";

const CONTENT_TYPE: &str = "Content-Type";

const ANY_MEDIA_TYPE: &str = "*/*";

/// JSON-Schema keywords carried over unchanged into a data type.
const FACETS: &[&str] = &[
    "minProperties",
    "maxProperties",
    "discriminator",
    "discriminatorValue",
    "uniqueItems",
    "minItems",
    "maxItems",
    "pattern",
    "minLength",
    "maxLength",
    "maximum",
    "minimum",
    "multipleOf",
    "enum",
    "default",
    "description",
];

/// Writes an [`Api`] as a RAML 1.0 document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RamlSerializer;

impl Serializer for RamlSerializer {
    fn format(&self) -> Format {
        Format::Raml
    }

    fn serialize(&self, api: &Api) -> Result<String, SerializeError> {
        let document = document(api);
        let yaml = serde_yaml::to_string(&document)?;
        Ok(format!("{HEADER}\n{yaml}"))
    }

    fn validate(&self, content: &str) -> f64 {
        if content.starts_with(HEADER) {
            1.0
        } else if content.starts_with("#%RAML") {
            0.5
        } else {
            0.0
        }
    }

    fn demoted(&self, api: &Api) -> Vec<String> {
        SchemaGraph::from_store(&api.store).demoted()
    }
}

fn insert_some(target: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        target.insert(key.to_string(), value);
    }
}

fn non_empty(map: Map<String, Value>) -> Option<Value> {
    (!map.is_empty()).then_some(Value::Object(map))
}

fn document(api: &Api) -> Value {
    let mut root = Map::new();
    root.insert(
        "title".into(),
        json!(api.info.title.as_deref().unwrap_or("Untitled API")),
    );
    insert_some(&mut root, "description", api.info.description.clone().map(Value::String));
    insert_some(&mut root, "version", api.info.version.clone().map(Value::String));

    let base = api.store.endpoint.values().next();
    insert_some(&mut root, "baseUri", base.map(|url| json!(url.href())));
    insert_some(&mut root, "baseUriParameters", base.and_then(base_uri_parameters));
    insert_some(&mut root, "protocols", base.and_then(|url| protocols(&url.protocol)));

    let graph = SchemaGraph::from_store(&api.store);
    insert_some(&mut root, "types", non_empty(data_types(&graph)));
    let traits = traits(api);
    let schemes = security_schemes(&api.store);
    insert_some(&mut root, "traits", non_empty(traits.clone()));
    insert_some(&mut root, "securitySchemes", non_empty(schemes.clone()));

    let names = Names {
        traits: &traits,
        schemes: &schemes,
    };
    for (path, resource) in &api.resources {
        let uri = if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        };
        root.insert(uri, resource_declaration(api, resource, &names));
    }

    Value::Object(root)
}

// === Data types ===

/// Type declarations for every named schema.
fn data_types(graph: &SchemaGraph) -> Map<String, Value> {
    graph
        .nodes()
        .map(|node| {
            let declaration = if graph.is_transitively_convertible(&node.name) {
                data_type(&node.schema)
            } else {
                tracing::warn!(schema = %node.name, "schema demoted to raw JSON");
                Value::String(graph.dump_raw(&node.name, &node.schema))
            };
            (node.name.clone(), declaration)
        })
        .collect()
}

/// RAML base type of a schema, inferred from its keywords when `type` is absent.
fn base_type(schema: &Value) -> String {
    let has = |keys: &[&str]| keys.iter().any(|key| schema.get(key).is_some());

    match schema.get("type").and_then(Value::as_str) {
        Some("null") => "nil".into(),
        Some(declared) => declared.into(),
        None if has(&[
            "properties",
            "minProperties",
            "maxProperties",
            "discriminator",
            "discriminatorValue",
        ]) =>
        {
            "object".into()
        }
        None if has(&["items", "uniqueItems", "minItems", "maxItems"]) => "array".into(),
        None if has(&["pattern", "maxLength", "minLength"]) => "string".into(),
        None if has(&["minimum", "maximum", "multipleOf"]) => "number".into(),
        None => "any".into(),
    }
}

/// Type expressions for a schema: `Pet`, `Pet[]`, `(A | B)[]`, ...
fn type_names(schema: &Value) -> Vec<String> {
    if let Some(uri) = schema.get("$ref").and_then(Value::as_str) {
        return vec![ref_name(uri)];
    }

    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        return all_of.iter().flat_map(type_names).collect();
    }
    if let Some(any_of) = schema.get("anyOf").and_then(Value::as_array) {
        let union: Vec<String> = any_of.iter().flat_map(type_names).collect();
        return vec![union.join(" | ")];
    }

    match schema.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(type_names)
            .map(|name| format!("({name})[]"))
            .collect(),
        Some(items @ Value::Object(_)) => type_names(items)
            .into_iter()
            .map(|name| {
                if name.contains('|') {
                    format!("({name})[]")
                } else {
                    format!("{name}[]")
                }
            })
            .collect(),
        _ => vec![base_type(schema)],
    }
}

/// RAML type declaration for a JSON-Schema.
fn data_type(schema: &Value) -> Value {
    let mut declaration = Map::new();

    let names = type_names(schema);
    let type_value = match names.as_slice() {
        [single] => json!(single),
        _ => json!(names),
    };
    declaration.insert("type".into(), type_value);

    for facet in FACETS {
        if let Some(value) = schema.get(*facet) {
            declaration.insert((*facet).to_string(), value.clone());
        }
    }
    if let Some(additional) = schema.get("additionalProperties").filter(|v| v.is_boolean()) {
        declaration.insert("additionalProperties".into(), additional.clone());
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect();

        let properties: Map<String, Value> = properties
            .iter()
            .map(|(name, property)| {
                let mut property = data_type(property);
                if let Value::Object(obj) = &mut property {
                    obj.insert("required".into(), json!(required.contains(&name.as_str())));
                }
                (name.clone(), property)
            })
            .collect();
        if !properties.is_empty() {
            declaration.insert("properties".into(), Value::Object(properties));
        }
    }

    Value::Object(declaration)
}

// === Api-level declarations ===

fn protocols(protocol: &[String]) -> Option<Value> {
    let valid: Vec<String> = protocol
        .iter()
        .map(|p| p.trim_end_matches(':').to_uppercase())
        .filter(|p| p == "HTTP" || p == "HTTPS")
        .collect();
    (!valid.is_empty()).then(|| json!(valid))
}

/// Named parameters for the variables of the base endpoint.
fn base_uri_parameters(url: &Url) -> Option<Value> {
    let parameters: Map<String, Value> = [&url.host, &url.pathname]
        .into_iter()
        .flatten()
        .filter_map(|component| match &component.parameter.value {
            Some(ParameterValue::Sequence(sequence)) => Some(sequence),
            _ => None,
        })
        .flatten()
        .filter_map(|param| {
            let key = param.key.clone()?;
            let mut declaration = data_type(&param.json_schema(&SchemaOptions::new()));
            if let Value::Object(obj) = &mut declaration {
                obj.remove("default");
            }
            Some((key, declaration))
        })
        .collect();
    non_empty(parameters)
}

/// Request-level interfaces implemented by at least one request, declared as traits.
fn traits(api: &Api) -> Map<String, Value> {
    let used: Vec<&String> = api.requests().flat_map(|r| r.interfaces.keys()).collect();
    api.store
        .interface
        .iter()
        .filter(|(name, interface)| {
            interface.level.as_deref() == Some("request") && used.contains(name)
        })
        .map(|(name, interface)| {
            let mut declaration = Map::new();
            insert_some(
                &mut declaration,
                "usage",
                interface.description.clone().map(Value::String),
            );
            (name.clone(), Value::Object(declaration))
        })
        .collect()
}

fn security_schemes(store: &Store) -> Map<String, Value> {
    store
        .auth
        .iter()
        .map(|(name, auth)| (name.clone(), security_scheme(auth)))
        .collect()
}

fn security_scheme(auth: &Auth) -> Value {
    let mut scheme = Map::new();
    let kind = match auth {
        Auth::Basic(_) => "Basic Authentication",
        Auth::Digest(_) => "Digest Authentication",
        Auth::ApiKey(_) => "Pass Through",
        Auth::OAuth1(_) => "OAuth 1.0",
        Auth::OAuth2(_) => "OAuth 2.0",
        Auth::Hawk(_) => "x-hawk",
        Auth::AwsSig4(_) => "x-aws-sig4",
        Auth::Ntlm(_) => "x-ntlm",
        Auth::Negotiate(_) => "x-negotiate",
        Auth::Custom(_) => "x-custom",
    };
    scheme.insert("type".into(), json!(kind));
    insert_some(&mut scheme, "description", auth.description().map(|d| json!(d)));

    match auth {
        Auth::ApiKey(api_key) => {
            let block = match api_key.location {
                Some(ApiKeyLocation::Header) => Some("headers"),
                Some(ApiKeyLocation::Query) => Some("queryParameters"),
                None => None,
            };
            if let (Some(block), Some(name)) = (block, &api_key.name) {
                scheme.insert(
                    "describedBy".into(),
                    json!({ block: { name.as_str(): { "type": "string" } } }),
                );
            }
        }
        Auth::OAuth1(oauth) => {
            scheme.insert(
                "settings".into(),
                json!({
                    "requestTokenUri": oauth.request_token_uri,
                    "authorizationUri": oauth.authorization_uri,
                    "tokenCredentialsUri": oauth.token_credentials_uri,
                }),
            );
        }
        Auth::OAuth2(oauth) => {
            let grant = oauth.flow.map(|flow| match flow {
                OAuth2Flow::AccessCode => "authorization_code",
                OAuth2Flow::Implicit => "implicit",
                OAuth2Flow::Application => "client_credentials",
                OAuth2Flow::Password => "password",
            });
            let mut settings = Map::new();
            settings.insert("authorizationUri".into(), json!(oauth.authorization_url));
            settings.insert("accessTokenUri".into(), json!(oauth.token_url));
            let grants: Vec<&str> = grant.into_iter().collect();
            settings.insert("authorizationGrants".into(), json!(grants));
            if !oauth.scopes.is_empty() {
                let scopes: Vec<&str> = oauth.scopes.iter().map(|s| s.key.as_str()).collect();
                settings.insert("scopes".into(), json!(scopes));
            }
            scheme.insert("settings".into(), Value::Object(settings));
        }
        Auth::Hawk(hawk) => {
            scheme.insert(
                "settings".into(),
                json!({ "id": hawk.id, "algorithm": hawk.algorithm }),
            );
        }
        Auth::AwsSig4(aws) => {
            scheme.insert(
                "settings".into(),
                json!({ "region": aws.region, "service": aws.service }),
            );
        }
        _ => {}
    }

    Value::Object(scheme)
}

// === Resources ===

/// Names declared at the top level that methods may point to.
struct Names<'a> {
    traits: &'a Map<String, Value>,
    schemes: &'a Map<String, Value>,
}

fn resource_declaration(api: &Api, resource: &Resource, names: &Names<'_>) -> Value {
    let mut declaration = Map::new();
    insert_some(
        &mut declaration,
        "description",
        resource.description.clone().map(Value::String),
    );

    // RAML declares uri parameters per resource; the first method to name one wins.
    let mut uri_parameters = Map::new();
    for request in resource.methods.values() {
        let parameters = request.parameters.resolve(&api.store);
        for (name, declaration) in named_parameters(&parameters.path, &api.store) {
            uri_parameters.entry(name).or_insert(declaration);
        }
    }
    insert_some(&mut declaration, "uriParameters", non_empty(uri_parameters));

    for (method, request) in &resource.methods {
        declaration.insert(method.clone(), method_declaration(api, request, names));
    }
    Value::Object(declaration)
}

fn method_declaration(api: &Api, request: &Request, names: &Names<'_>) -> Value {
    let store = &api.store;
    let parameters = request.parameters.resolve(store);

    let mut declaration = Map::new();
    insert_some(&mut declaration, "displayName", request.name.clone().map(Value::String));
    insert_some(
        &mut declaration,
        "description",
        request.description.clone().map(Value::String),
    );
    insert_some(
        &mut declaration,
        "queryParameters",
        non_empty(named_parameters(&parameters.queries, store)),
    );
    insert_some(
        &mut declaration,
        "headers",
        non_empty(named_parameters(&parameters.headers, store)),
    );
    insert_some(&mut declaration, "body", request_body(request, &parameters, store));
    insert_some(&mut declaration, "protocols", request_protocols(request, store));

    let is: Vec<&String> = request
        .interfaces
        .keys()
        .filter(|name| names.traits.contains_key(name.as_str()))
        .collect();
    if !is.is_empty() {
        declaration.insert("is".into(), json!(is));
    }

    let secured_by = secured_by(request, names);
    if !secured_by.is_empty() {
        declaration.insert("securedBy".into(), Value::Array(secured_by));
    }

    let responses: Map<String, Value> = request
        .responses
        .iter()
        .filter_map(|(code, entry)| {
            let response = entry.resolve(store)?;
            Some((code.clone(), response_declaration(&response, store)))
        })
        .collect();
    insert_some(&mut declaration, "responses", non_empty(responses));

    Value::Object(declaration)
}

fn response_declaration(response: &Response, store: &Store) -> Value {
    let parameters = response.parameters.resolve(store);

    let mut declaration = Map::new();
    insert_some(
        &mut declaration,
        "description",
        response.description.clone().map(Value::String),
    );
    insert_some(
        &mut declaration,
        "headers",
        non_empty(named_parameters(&parameters.headers, store)),
    );
    insert_some(
        &mut declaration,
        "body",
        body_for_media_types(&parameters, &media_types(&parameters), store),
    );
    Value::Object(declaration)
}

fn schema_options(store: &Store) -> SchemaOptions<'_> {
    SchemaOptions::new().store(store)
}

/// Named parameter declarations of a resolved block. `Content-Type` is
/// expressed through the body media types instead.
fn named_parameters(
    block: &IndexMap<String, Indirect<Parameter>>,
    store: &Store,
) -> Map<String, Value> {
    block
        .iter()
        .filter_map(|(key, entry)| Some((key, entry.as_direct()?)))
        .filter(|(_, param)| param.key.as_deref() != Some(CONTENT_TYPE))
        .map(|(key, param)| {
            let name = param.key.clone().unwrap_or_else(|| key.clone());
            (name, named_parameter(param, store))
        })
        .collect()
}

fn named_parameter(param: &Parameter, store: &Store) -> Value {
    let mut declaration = data_type(&param.json_schema(&schema_options(store)));
    if let Value::Object(obj) = &mut declaration {
        obj.insert("required".into(), json!(param.required));
        if let Some(description) = &param.description {
            obj.insert("description".into(), json!(description));
        }
        if let Some(name) = &param.name {
            if param.key.as_ref() != Some(name) {
                obj.insert("displayName".into(), json!(name));
            }
        }
    }
    declaration
}

/// Media types allowed by the `Content-Type` header of a resolved container.
fn media_types(parameters: &ParameterContainer) -> Vec<String> {
    parameters
        .headers
        .values()
        .filter_map(Indirect::as_direct)
        .filter(|param| param.key.as_deref() == Some(CONTENT_TYPE))
        .flat_map(|param| param.constraints.iter())
        .filter_map(|constraint| match constraint {
            Constraint::Enum(values) => Some(values),
            _ => None,
        })
        .flatten()
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect()
}

/// Body of a request. Contexts keyed by a `Content-Type` each give one media
/// type with the body parameters applicable to it.
fn request_body(
    request: &Request,
    parameters: &ParameterContainer,
    store: &Store,
) -> Option<Value> {
    let mut bodies = Map::new();
    for context in &request.contexts {
        let media_type = context
            .constraints
            .iter()
            .find(|param| param.key.as_deref() == Some(CONTENT_TYPE))
            .and_then(Parameter::effective_default)
            .and_then(Value::as_str);
        let Some(media_type) = media_type else {
            continue;
        };
        let filtered = context.filter(parameters);
        if let Some(body) = body_type(&filtered, store) {
            bodies.insert(media_type.to_string(), body);
        }
    }
    if !bodies.is_empty() {
        return Some(Value::Object(bodies));
    }

    body_for_media_types(parameters, &media_types(parameters), store)
}

fn body_for_media_types(
    parameters: &ParameterContainer,
    media_types: &[String],
    store: &Store,
) -> Option<Value> {
    let body = body_type(parameters, store)?;
    let mut bodies = Map::new();
    if media_types.is_empty() {
        bodies.insert(ANY_MEDIA_TYPE.into(), body);
    } else {
        for media_type in media_types {
            bodies.insert(media_type.clone(), body.clone());
        }
    }
    Some(Value::Object(bodies))
}

/// One body parameter gives its own type; several become the properties of an object.
fn body_type(parameters: &ParameterContainer, store: &Store) -> Option<Value> {
    let params: Vec<(&String, &Parameter)> = parameters
        .body
        .iter()
        .filter_map(|(key, entry)| Some((key, entry.as_direct()?)))
        .collect();

    match params.as_slice() {
        [] => None,
        [(_, param)] => Some(data_type(&param.json_schema(&schema_options(store)))),
        _ => {
            let properties: Map<String, Value> = params
                .iter()
                .map(|(key, param)| {
                    let name = param.key.clone().unwrap_or_else(|| (*key).clone());
                    (name, named_parameter(param, store))
                })
                .collect();
            Some(json!({ "type": "object", "properties": properties }))
        }
    }
}

/// Protocols of the first endpoint the request overrides.
fn request_protocols(request: &Request, store: &Store) -> Option<Value> {
    request
        .endpoints
        .values()
        .filter(|reference| reference.overlay.is_some())
        .filter_map(|reference| reference.resolve::<Url>(store))
        .find_map(|url| protocols(&url.protocol))
}

/// Security schemes of a request, with the OAuth2 scopes it requires.
fn secured_by(request: &Request, names: &Names<'_>) -> Vec<Value> {
    request
        .auths
        .iter()
        .filter_map(Indirect::as_reference)
        .filter(|reference| names.schemes.contains_key(&reference.uuid))
        .map(|reference| {
            let scopes: Vec<&str> = reference
                .overlay
                .as_ref()
                .and_then(|overlay| overlay.get("scopes"))
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|scope| scope.get("key").and_then(Value::as_str))
                .collect();
            if scopes.is_empty() {
                json!(reference.uuid)
            } else {
                json!({ reference.uuid.as_str(): { "scopes": scopes } })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{Parser, SwaggerParser};

    const PETSTORE: &str = r##"{
        "swagger": "2.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "host": "petstore.example.com",
        "basePath": "/v1",
        "schemes": ["https"],
        "produces": ["application/json"],
        "tags": [{ "name": "pets", "description": "Pet operations" }],
        "securityDefinitions": {
            "petstore_auth": {
                "type": "oauth2",
                "flow": "accessCode",
                "authorizationUrl": "https://example.com/oauth",
                "tokenUrl": "https://example.com/token",
                "scopes": { "read:pets": "read pets" }
            },
            "api_key": { "type": "apiKey", "name": "X-Api-Key", "in": "header" }
        },
        "paths": {
            "/pets/{petId}": {
                "get": {
                    "summary": "Find a pet",
                    "tags": ["pets"],
                    "security": [{ "petstore_auth": ["read:pets"] }, { "api_key": [] }],
                    "parameters": [
                        { "name": "petId", "in": "path", "type": "integer", "required": true },
                        { "name": "fields", "in": "query", "type": "string", "maxLength": 40 }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/Pet" } }
                        }
                    }
                }
            }
        },
        "definitions": {
            "Pet": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "tag": { "$ref": "#/definitions/Tag" }
                }
            },
            "Tag": { "type": "string", "minLength": 1 },
            "Shape": { "oneOf": [{ "$ref": "#/definitions/Tag" }, { "type": "integer" }] }
        }
    }"##;

    fn raml() -> (String, Value) {
        let api = SwaggerParser.parse(PETSTORE).unwrap();
        let output = RamlSerializer.serialize(&api).unwrap();
        let body = output.strip_prefix(HEADER).unwrap();
        let yaml: Value = serde_yaml::from_str(body).unwrap();
        (output, yaml)
    }

    #[test]
    fn header_and_api_fields() {
        let (output, doc) = raml();
        assert!(output.starts_with("#%RAML 1.0\n"));
        assert_eq!(doc["title"], json!("Petstore"));
        assert_eq!(doc["version"], json!("1.0.0"));
        assert_eq!(doc["baseUri"], json!("https://petstore.example.com/v1"));
        assert_eq!(doc["protocols"], json!(["HTTPS"]));
        assert_eq!(doc["traits"]["pets"]["usage"], json!("Pet operations"));
    }

    #[test]
    fn convertible_types_are_declared() {
        let (_, doc) = raml();
        let pet = &doc["types"]["Pet"];
        assert_eq!(pet["type"], json!("object"));
        assert_eq!(pet["properties"]["name"]["required"], json!(true));
        assert_eq!(pet["properties"]["tag"]["type"], json!("Tag"));
        assert_eq!(pet["properties"]["tag"]["required"], json!(false));
        assert_eq!(doc["types"]["Tag"], json!({ "type": "string", "minLength": 1 }));
    }

    #[test]
    fn demoted_types_are_raw_json() {
        let (_, doc) = raml();
        let raw = doc["types"]["Shape"].as_str().unwrap();
        let schema: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(schema["definitions"]["Tag"]["minLength"], json!(1));

        let api = SwaggerParser.parse(PETSTORE).unwrap();
        assert_eq!(RamlSerializer.demoted(&api), vec!["Shape"]);
    }

    #[test]
    fn methods_and_responses() {
        let (_, doc) = raml();
        let resource = &doc["/pets/{petId}"];
        assert_eq!(resource["uriParameters"]["petId"]["type"], json!("integer"));

        let get = &resource["get"];
        assert_eq!(get["displayName"], json!("Find a pet"));
        assert_eq!(get["queryParameters"]["fields"]["maxLength"], json!(40));
        assert_eq!(get["is"], json!(["pets"]));
        assert_eq!(
            get["securedBy"],
            json!([{ "petstore_auth": { "scopes": ["read:pets"] } }, "api_key"])
        );
        assert_eq!(
            get["responses"]["200"]["body"]["application/json"]["type"],
            json!("Pet[]")
        );
        assert!(get["responses"]["200"].get("headers").is_none());
    }

    #[test]
    fn security_schemes_by_kind() {
        let (_, doc) = raml();
        let oauth = &doc["securitySchemes"]["petstore_auth"];
        assert_eq!(oauth["type"], json!("OAuth 2.0"));
        assert_eq!(
            oauth["settings"]["authorizationGrants"],
            json!(["authorization_code"])
        );
        assert_eq!(oauth["settings"]["accessTokenUri"], json!("https://example.com/token"));

        let api_key = &doc["securitySchemes"]["api_key"];
        assert_eq!(api_key["type"], json!("Pass Through"));
        assert_eq!(
            api_key["describedBy"]["headers"]["X-Api-Key"]["type"],
            json!("string")
        );
    }

    #[test]
    fn type_inference() {
        assert_eq!(base_type(&json!({ "properties": {} })), "object");
        assert_eq!(base_type(&json!({ "minItems": 1 })), "array");
        assert_eq!(base_type(&json!({ "pattern": "^a" })), "string");
        assert_eq!(base_type(&json!({ "maximum": 3 })), "number");
        assert_eq!(base_type(&json!({ "type": "null" })), "nil");
        assert_eq!(base_type(&json!({})), "any");
    }

    #[test]
    fn type_expressions() {
        assert_eq!(
            type_names(&json!({ "items": { "anyOf": [{ "$ref": "#/definitions/A" }, { "type": "string" }] } })),
            vec!["(A | string)[]"]
        );
        assert_eq!(
            type_names(&json!({ "items": [{ "$ref": "#/definitions/A" }, { "type": "integer" }] })),
            vec!["(A)[]", "(integer)[]"]
        );
        assert_eq!(
            type_names(&json!({ "allOf": [{ "$ref": "#/definitions/A" }, { "$ref": "#/definitions/B" }] })),
            vec!["A", "B"]
        );
    }

    #[test]
    fn validation_scores() {
        assert_eq!(RamlSerializer.validate("#%RAML 1.0\ntitle: x\n"), 1.0);
        assert_eq!(RamlSerializer.validate("#%RAML 0.8\ntitle: x\n"), 0.5);
        assert_eq!(RamlSerializer.validate("swagger: '2.0'"), 0.0);
    }
}
