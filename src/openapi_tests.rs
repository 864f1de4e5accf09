use crate::schemas::ApiDoc;
use utoipa::OpenApi;
use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

fn object_properties(name: &str) -> Vec<String> {
    let openapi = ApiDoc::openapi();
    let components = openapi.components.expect("components");
    match components.schemas.get(name) {
        Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
        _ => panic!("{name} should be an object schema"),
    }
}

#[test]
fn test_openapi_schema_generation() {
    let openapi = ApiDoc::openapi();

    let components = openapi.components.as_ref().expect("components");
    for name in ["ErrorResponse", "HealthResponse", "OrderResponse", "ProductForm"] {
        assert!(components.schemas.contains_key(name), "missing schema {name}");
    }
    assert!(components.security_schemes.contains_key("bearer"));

    assert!(serde_json::to_string(&openapi).is_ok());
}

#[test]
fn test_error_response_schema_structure() {
    let properties = object_properties("ErrorResponse");
    for field in ["error", "code", "success", "fields"] {
        assert!(properties.iter().any(|p| p == field), "missing {field}");
    }
}

#[test]
fn test_order_routes_are_documented() {
    let openapi = ApiDoc::openapi();
    let paths = &openapi.paths.paths;

    let orders = paths.get("/api/v1/orders").expect("orders path");
    assert!(orders.operations.contains_key(&PathItemType::Get));
    assert!(orders.operations.contains_key(&PathItemType::Post));

    let order = paths.get("/api/v1/orders/{order_id}").expect("order path");
    let get = order.operations.get(&PathItemType::Get).expect("get order");
    assert!(get.responses.responses.contains_key("403"));
    assert!(get.responses.responses.contains_key("404"));

    assert!(paths.contains_key("/api/v1/orders/{order_id}/status"));
}

#[test]
fn test_error_responses_reference_correct_schema() {
    let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

    assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
    assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
}
