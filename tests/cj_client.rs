//! `CjClient` against a local wiremock server: token exchange, envelope
//! handling and query parameters for the catalog and order endpoints.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropship_api::cj::{
    CjClient, CjError, CreateOrderRequest, OrderLine, ShippingAddress,
};

const PREFIX: &str = "/api2.0/v1";

fn client_for(server: &MockServer) -> CjClient {
    CjClient::with_base_url(&format!("{}{PREFIX}", server.uri()), 5)
        .expect("failed to build test CjClient")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 200,
        "result": true,
        "message": "Success",
        "data": data,
        "requestId": "req-1"
    }))
}

#[tokio::test]
async fn access_token_is_exchanged_with_api_key_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/authentication/getAccessToken")))
        .and(header("CJ-Access-Token", "key-123"))
        .respond_with(ok(json!({ "accessToken": "tok-abc", "expiresIn": 3600 })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server).get_access_token("key-123").await.unwrap();
    assert_eq!(token.access_token, "tok-abc");
    assert_eq!(token.expires_in, Some(3600));
}

#[tokio::test]
async fn missing_expiry_is_left_to_the_caller() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/authentication/getAccessToken")))
        .respond_with(ok(json!({ "accessToken": "tok-abc" })))
        .mount(&server)
        .await;

    let token = client_for(&server).get_access_token("key").await.unwrap();
    assert_eq!(token.expires_in, None);
}

#[tokio::test]
async fn invalid_api_key_code_is_an_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/authentication/getAccessToken")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1600001,
            "result": false,
            "message": "Invalid API key",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_access_token("bad").await.unwrap_err();
    assert!(matches!(err, CjError::Api { code: 1600001, .. }));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn http_401_is_an_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shopping/pay/getBalance")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).balance("expired").await.unwrap_err();
    assert!(matches!(err, CjError::Http(_)));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn list_products_sends_paging_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/product/list")))
        .and(header("CJ-Access-Token", "tok"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "20"))
        .respond_with(ok(json!({ "list": [{ "pid": "P1" }], "total": 21 })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client_for(&server).list_products("tok", 2, 20).await.unwrap();
    assert_eq!(data["list"][0]["pid"], "P1");
    assert_eq!(data["total"], 21);
}

#[tokio::test]
async fn search_products_uses_keyword_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/product/query")))
        .and(query_param("keyword", "lamp"))
        .respond_with(ok(json!({ "list": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client_for(&server)
        .search_products("tok", "lamp", 1, 20)
        .await
        .unwrap();
    assert!(data["list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn non_success_code_surfaces_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/product/getCategory")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1600100,
            "result": false,
            "message": "Param error",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).categories("tok").await.unwrap_err();
    assert_eq!(err.to_string(), "CJ API error 1600100: Param error");
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn create_order_posts_camel_case_body() {
    let server = MockServer::start().await;

    let order = CreateOrderRequest {
        products: vec![OrderLine {
            product_id: "CJ-1".into(),
            variant_id: None,
            quantity: 2,
        }],
        shipping_address: ShippingAddress {
            full_name: Some("Ana Reyes".into()),
            phone: Some("0917".into()),
            address: Some("Cebu City".into()),
            country_code: Some("PH".into()),
            country: Some("Philippines".into()),
        },
        shipping_method: "standard".into(),
        pay_type: 3,
    };

    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/shopping/order/createOrder")))
        .and(body_json(json!({
            "products": [{ "productId": "CJ-1", "variantId": null, "quantity": 2 }],
            "shippingAddress": {
                "fullName": "Ana Reyes",
                "phone": "0917",
                "address": "Cebu City",
                "countryCode": "PH",
                "country": "Philippines"
            },
            "shippingMethod": "standard",
            "payType": 3
        })))
        .respond_with(ok(json!({
            "orderId": "O-1",
            "orderNumber": "N-1",
            "orderAmount": "25.40"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server).create_order("tok", &order).await.unwrap();
    assert_eq!(created.order_id.as_deref(), Some("O-1"));
    assert_eq!(created.order_amount.unwrap().to_string(), "25.40");
}

#[tokio::test]
async fn list_orders_decodes_page_and_tolerates_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shopping/order/queryById")))
        .and(query_param("pageNo", "1"))
        .and(query_param("pageSize", "50"))
        .respond_with(ok(json!({
            "list": [{
                "orderId": "O-9",
                "orderStatus": "SHIPPED",
                "trackingNumber": "TRK9",
                "orderAmount": 12.5
            }]
        })))
        .mount(&server)
        .await;

    let page = client_for(&server).list_orders("tok", 1, 50).await.unwrap();
    assert_eq!(page.list.len(), 1);
    assert_eq!(page.list[0].order_status.as_deref(), Some("SHIPPED"));

    let empty = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shopping/order/queryById")))
        .respond_with(ok(serde_json::Value::Null))
        .mount(&empty)
        .await;

    let page = client_for(&empty).list_orders("tok", 1, 50).await.unwrap();
    assert!(page.list.is_empty());
}

#[tokio::test]
async fn shipping_rates_pass_product_and_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/logistic/freightCalculate")))
        .and(query_param("productId", "CJ-1"))
        .and(query_param("country", "PH"))
        .respond_with(ok(json!([{ "logisticName": "CJPacket", "logisticPrice": 3.2 }])))
        .mount(&server)
        .await;

    let rates = client_for(&server)
        .shipping_rates("tok", "CJ-1", "PH")
        .await
        .unwrap();
    assert_eq!(rates[0]["logisticName"], "CJPacket");
}
