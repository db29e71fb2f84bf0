//! Integration tests for the parse, resolve and serialize pipeline.

use api_flow::formats::{InternalParser, InternalSerializer, RamlSerializer, SwaggerParser};
use api_flow::{
    convert, detect, parse, Constraint, Context, ConvertError, ConvertOptions, Format, Indirect,
    LateResolutionReference, Location, Parameter, ParameterContainer, Parser, RefType, Reference,
    SchemaGraph, SchemaOptions, Serializer, Store,
};
use serde_json::{json, Value};

const PETSTORE: &str = r##"{
    "swagger": "2.0",
    "info": { "title": "Petstore", "version": "1.0.0", "description": "Sample pets API" },
    "host": "petstore.example.com",
    "basePath": "/v1",
    "schemes": ["https"],
    "consumes": ["application/json"],
    "produces": ["application/json"],
    "parameters": {
        "limit": { "name": "limit", "in": "query", "type": "integer", "maximum": 100 }
    },
    "paths": {
        "/pets": {
            "get": {
                "operationId": "listPets",
                "parameters": [{ "$ref": "#/parameters/limit" }],
                "responses": {
                    "200": {
                        "description": "pets",
                        "schema": { "type": "array", "items": { "$ref": "#/definitions/Pet" } }
                    }
                }
            },
            "post": {
                "operationId": "createPet",
                "parameters": [
                    { "name": "pet", "in": "body", "required": true, "schema": { "$ref": "#/definitions/Pet" } }
                ],
                "responses": { "201": { "description": "created" } }
            }
        }
    },
    "definitions": {
        "Pet": {
            "type": "object",
            "required": ["id", "name"],
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "name": { "type": "string" },
                "category": { "$ref": "#/definitions/Category" }
            }
        },
        "Category": {
            "type": "object",
            "properties": { "name": { "type": "string" } }
        }
    }
}"##;

const POLYMORPHIC: &str = r##"{
    "swagger": "2.0",
    "info": { "title": "Shapes", "version": "1" },
    "paths": {},
    "definitions": {
        "Circle": { "type": "object", "properties": { "radius": { "type": "number" } } },
        "Shape": { "oneOf": [{ "$ref": "#/definitions/Circle" }, { "type": "string" }] },
        "Drawing": { "type": "object", "properties": { "shape": { "$ref": "#/definitions/Shape" } } }
    }
}"##;

// === Pipeline ===

mod pipeline {
    use super::*;

    #[test]
    fn swagger_is_detected_first() {
        let detections = detect(PETSTORE);
        assert_eq!(detections[0].format, Format::Swagger);
        assert_eq!(detections[0].version, "v2.0");
        assert_eq!(detections[0].score, 1.0);
    }

    #[test]
    fn internal_output_round_trips_exactly() {
        let internal = convert(PETSTORE, &ConvertOptions::new(Format::Internal)).unwrap();
        assert_eq!(detect(&internal)[0].format, Format::Internal);

        let api = InternalParser.parse(&internal).unwrap();
        let again = InternalSerializer.serialize(&api).unwrap();
        assert_eq!(internal, again);
    }

    #[test]
    fn internal_output_keeps_the_model() {
        let original = SwaggerParser.parse(PETSTORE).unwrap();
        let internal = InternalSerializer.serialize(&original).unwrap();
        let parsed = parse(&internal, None).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.info.title.as_deref(), Some("Petstore"));
        assert_eq!(parsed.requests().count(), 2);
    }

    #[test]
    fn named_schema_fragment_is_byte_identical() {
        let pet = r#"{"type":"object","required":["name"],"properties":{"name":{"type":"string"},"id":{"type":"integer","format":"int64"}}}"#;
        let source = format!(
            r#"{{"swagger":"2.0","info":{{"title":"Pets"}},"paths":{{}},"definitions":{{"Pet":{}}}}}"#,
            pet
        );

        let schema_text = |api: &api_flow::Api| match &api.store.constraint["Pet"] {
            Constraint::JsonSchema(schema) => serde_json::to_string(schema).unwrap(),
            other => panic!("expected a JSON-Schema constraint, got {:?}", other),
        };

        let parsed = SwaggerParser.parse(&source).unwrap();
        assert_eq!(schema_text(&parsed), pet);

        let internal = InternalSerializer.serialize(&parsed).unwrap();
        let reparsed = InternalParser.parse(&internal).unwrap();
        assert_eq!(schema_text(&reparsed), pet);
    }

    #[test]
    fn explicit_source_format_skips_detection() {
        let options = ConvertOptions::new(Format::Raml).from(Format::Internal);
        let result = convert(PETSTORE, &options);
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }

    #[test]
    fn swagger_is_not_a_target() {
        let result = convert(PETSTORE, &ConvertOptions::new(Format::Swagger));
        assert!(matches!(
            result,
            Err(ConvertError::UnsupportedTarget {
                format: Format::Swagger
            })
        ));
    }

    #[test]
    fn yaml_sources_are_accepted() {
        let yaml = "swagger: '2.0'\ninfo:\n  title: Tiny\n  version: '1'\npaths: {}\n";
        let raml = convert(yaml, &ConvertOptions::new(Format::Raml)).unwrap();
        assert!(raml.contains("title: Tiny"));
    }
}

// === RAML output ===

mod raml_output {
    use super::*;

    fn raml_document(content: &str) -> Value {
        let raml = convert(content, &ConvertOptions::new(Format::Raml)).unwrap();
        assert_eq!(RamlSerializer.validate(&raml), 1.0);
        let body = raml.split_once('\n').map(|(_, rest)| rest).unwrap();
        serde_yaml::from_str(body).unwrap()
    }

    #[test]
    fn named_schemas_become_types() {
        let doc = raml_document(PETSTORE);
        assert_eq!(doc["types"]["Pet"]["properties"]["category"]["type"], json!("Category"));
        assert_eq!(doc["types"]["Pet"]["properties"]["id"]["minimum"], json!(1));
        assert_eq!(doc["types"]["Category"]["type"], json!("object"));
    }

    #[test]
    fn shared_parameters_are_resolved_into_methods() {
        let doc = raml_document(PETSTORE);
        let limit = &doc["/pets"]["get"]["queryParameters"]["limit"];
        assert_eq!(limit["type"], json!("integer"));
        assert_eq!(limit["maximum"], json!(100));
    }

    #[test]
    fn request_bodies_use_consumed_media_types() {
        let doc = raml_document(PETSTORE);
        let body = &doc["/pets"]["post"]["body"];
        assert_eq!(body["application/json"]["type"], json!("Pet"));
        assert!(doc["/pets"]["post"].get("headers").is_none());
    }

    #[test]
    fn demotion_spreads_to_dependents() {
        let doc = raml_document(POLYMORPHIC);
        assert_eq!(doc["types"]["Circle"]["type"], json!("object"));
        assert!(doc["types"]["Shape"].is_string());
        assert!(doc["types"]["Drawing"].is_string());

        let drawing: Value = serde_json::from_str(doc["types"]["Drawing"].as_str().unwrap()).unwrap();
        assert!(drawing["definitions"].get("Shape").is_some());
        assert!(drawing["definitions"].get("Circle").is_some());
    }

    #[test]
    fn strict_mode_reports_demoted_schemas() {
        let options = ConvertOptions::new(Format::Raml).strict(true);
        match convert(POLYMORPHIC, &options) {
            Err(ConvertError::Demoted { names }) => {
                assert_eq!(names, vec!["Shape".to_string(), "Drawing".to_string()]);
            }
            other => panic!("expected demotion error, got {:?}", other),
        }

        assert!(convert(PETSTORE, &options).is_ok());
    }

    #[test]
    fn dependency_graph_matches_output() {
        let api = parse(POLYMORPHIC, None).unwrap();
        let graph = SchemaGraph::from_store(&api.store);
        assert!(graph.is_transitively_convertible("Circle"));
        assert!(!graph.is_transitively_convertible("Drawing"));
        assert_eq!(graph.demoted(), RamlSerializer.demoted(&api));
    }
}

// === Store resolution ===

mod store_resolution {
    use super::*;

    #[test]
    fn overlay_customizes_a_shared_parameter() {
        let mut store = Store::default();
        store.parameter.insert(
            "limit".into(),
            Parameter::new("limit", "integer").located(Location::Queries),
        );

        let container = ParameterContainer::default().with(
            Location::Queries,
            "limit",
            Reference::new(RefType::Parameter, "limit").with_overlay(json!({ "default": 20 })),
        );

        let resolved = container.resolve(&store);
        let limit = resolved.queries["limit"].as_direct().unwrap();
        assert_eq!(limit.default, Some(json!(20)));
        assert_eq!(store.parameter["limit"].default, None);
    }

    #[test]
    fn unresolved_references_are_dropped() {
        let container = ParameterContainer::default()
            .with(Location::Headers, "auth", Reference::new(RefType::Parameter, "missing"))
            .with(Location::Headers, "accept", Parameter::new("Accept", "string"));

        let resolved = container.resolve(&Store::default());
        assert_eq!(resolved.len(), 1);
        assert!(resolved.headers.contains_key("accept"));
    }

    #[test]
    fn references_to_other_registries_do_not_resolve() {
        let mut store = Store::default();
        store
            .parameter
            .insert("shared".into(), Parameter::new("shared", "string"));

        let entry: Indirect<Parameter> = Reference::new(RefType::Auth, "shared").into();
        assert!(entry.resolve(&store).is_none());
    }

    #[test]
    fn schema_constraints_resolve_to_json_schema() {
        let store = Store::default().with_constraint(
            "Pet",
            Constraint::JsonSchema(json!({ "type": "object", "required": ["name"] })),
        );
        let value = Reference::new(RefType::Constraint, "Pet")
            .resolve_value(&store)
            .unwrap();
        assert_eq!(value["required"], json!(["name"]));
    }
}

// === Context filtering ===

mod context_filtering {
    use super::*;

    fn content_type(media_type: &str) -> Parameter {
        Parameter::new("Content-Type", "string").with_constraint(Constraint::Enum(vec![json!(media_type)]))
    }

    fn mode(media_type: &str) -> Context {
        Context::new(vec![
            Parameter::new("Content-Type", "string").with_default(json!(media_type))
        ])
    }

    #[test]
    fn body_parameters_follow_the_media_type() {
        let container = ParameterContainer::default()
            .with(
                Location::Body,
                "json",
                Parameter::new("payload", "object").applicable_in(content_type("application/json")),
            )
            .with(
                Location::Body,
                "form",
                Parameter::new("field", "string")
                    .applicable_in(content_type("application/x-www-form-urlencoded")),
            )
            .with(Location::Body, "any", Parameter::new("trace", "string"));

        let as_json = mode("application/json").filter(&container);
        assert_eq!(
            as_json.body.keys().collect::<Vec<_>>(),
            vec!["json", "any"]
        );

        let as_form = mode("application/x-www-form-urlencoded").filter(&container);
        assert_eq!(as_form.body.keys().collect::<Vec<_>>(), vec!["form", "any"]);
    }

    #[test]
    fn schema_of_a_constrained_parameter() {
        let param = Parameter::new("count", "integer")
            .with_constraint(Constraint::Minimum(1.into()))
            .with_constraint(Constraint::Maximum(10.into()));

        let schema = param.json_schema(&SchemaOptions::new());
        assert_eq!(schema["type"], json!("integer"));
        assert_eq!(schema["minimum"], json!(1));
        assert_eq!(schema["maximum"], json!(10));
        assert!(param.validate(&json!(5)));
        assert!(!param.validate(&json!(11)));
    }
}

// === Templates ===

mod templates {
    use super::*;

    #[test]
    fn chained_variables_expand() {
        let variables = vec![
            LateResolutionReference::variable("host", "{{domain}}:{{port}}"),
            LateResolutionReference::variable("domain", "api.example.com"),
            LateResolutionReference::variable("port", "8443"),
        ];
        let url = LateResolutionReference::new("https://{{host}}/v1").evaluate(&variables);
        assert_eq!(url.value.as_deref(), Some("https://api.example.com:8443/v1"));
        assert!(url.resolved);
    }

    #[test]
    fn unknown_variables_stay_verbatim() {
        let url = LateResolutionReference::new("{{scheme}}://{{host}}")
            .evaluate(&[LateResolutionReference::variable("host", "localhost")]);
        assert_eq!(url.value.as_deref(), Some("{{scheme}}://localhost"));
    }
}
