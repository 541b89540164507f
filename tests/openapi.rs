use dropship_api::routes::doc::ApiDoc;
use utoipa::OpenApi;

#[test]
fn cj_routes_and_payload_schema_are_documented() {
    let doc = serde_json::to_value(ApiDoc::openapi()).expect("openapi json");

    assert_eq!(doc["components"]["schemas"]["CjPayload"]["type"], "object");
    for path in [
        "/api/cj/connect",
        "/api/cj/products",
        "/api/cj/products/{product_id}",
        "/api/cj/categories",
        "/api/cj/import",
        "/api/cj/balance",
        "/api/cj/shipping",
    ] {
        assert!(doc["paths"].get(path).is_some(), "{path} missing from docs");
    }
    assert!(doc["components"]["securitySchemes"].get("bearer_auth").is_some());
}
