//! Client behaviour against a mocked store API.

use joia_client::{ApiClient, ApiConfig, AuthSession, ProductForm};
use joia_core::{
    CheckoutForm, Credentials, MemoryStore, NewOrder, ProductQuery, ShopError, TokenPair,
    TokenStore,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, pair: Option<(&str, &str)>) -> ApiClient {
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    if let Some((access, refresh)) = pair {
        tokens.save_pair(&TokenPair {
            access: access.into(),
            refresh: refresh.into(),
        });
    }
    ApiClient::new(ApiConfig::new(server.uri()), tokens).unwrap()
}

fn user_json(is_staff: bool) -> serde_json::Value {
    json!({
        "id": 1,
        "username": "ana@joia.com",
        "email": "ana@joia.com",
        "first_name": "Ana",
        "last_name": "Souza",
        "is_staff": is_staff
    })
}

fn product_json(id: u64, promo: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Joia {}", id),
        "slug": format!("joia-{}", id),
        "base_price": "100.00",
        "promotional_price": promo,
        "images": [],
        "attributes": []
    })
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("a1", "r1")));
    let user = client.me().await.unwrap();
    assert_eq!(user.display_name(), "Ana Souza");
}

#[tokio::test]
async fn test_401_refreshes_and_replays_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .and(body_json(json!({ "refresh": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(true)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("stale", "r1")));
    let user = client.me().await.unwrap();

    assert!(user.is_staff);
    assert_eq!(client.tokens().access_token().as_deref(), Some("fresh"));
    assert_eq!(client.tokens().refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is invalid" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("stale", "expired")));
    let err = client.orders().await.unwrap_err();

    assert!(matches!(err, ShopError::SessionExpired));
    assert!(!client.tokens().is_authenticated());
    assert!(client.tokens().refresh_token().is_none());
}

#[tokio::test]
async fn test_401_without_refresh_token_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client.orders().await.unwrap_err();
    assert!(matches!(err, ShopError::Unauthorized(_)));
}

#[tokio::test]
async fn test_replayed_request_is_not_refreshed_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("stale", "r1")));
    let err = client.orders().await.unwrap_err();
    assert!(matches!(err, ShopError::Unauthorized(_)));
    assert_eq!(err.user_message(), "Faça login para continuar.");
    assert_eq!(client.tokens().access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_api_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Estoque insuficiente." })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let mut cart = joia_core::Cart::new();
    cart.add(
        joia_core::CartItem::from_product(&serde_json::from_value(product_json(1, None)).unwrap()),
    )
    .unwrap();
    let form = CheckoutForm {
        name: "Ana".into(),
        email: "ana@joia.com".into(),
        address: "Rua A, 1".into(),
        ..Default::default()
    };
    let order = NewOrder::from_cart(&cart, &form).unwrap();

    let err = client.create_order(&order).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.user_message(), "Estoque insuficiente.");
}

#[tokio::test]
async fn test_catalog_reads_degrade_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/9/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    assert!(client.products().await.is_empty());
    assert!(client.offers().await.is_empty());
    assert!(client.product(9).await.is_none());
    assert!(client.categories().await.is_empty());
}

#[tokio::test]
async fn test_catalog_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("category__slug", "aneis"))
        .and(query_param("base_price__gt", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(3, None)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("ordering", "-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json(5, None),
            product_json(4, None)
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories/"))
        .and(query_param("show_on_home", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Anéis", "slug": "aneis", "show_on_home": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let query = ProductQuery::new().category("aneis").min_price("100");
    assert_eq!(client.filtered_products(&query).await.len(), 1);
    assert_eq!(client.new_arrivals().await[0].id, 5);
    assert_eq!(client.home_categories().await[0].slug, "aneis");
}

#[tokio::test]
async fn test_offers_and_related_filtered_client_side() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json(1, Some("80.00")),
            product_json(2, None),
            product_json(3, Some("0.00")),
            product_json(4, None),
            product_json(5, None),
            product_json(6, None)
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let offers = client.offers().await;
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].id, 1);

    let related = client.related_products(2).await;
    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|p| p.id != 2));
}

#[tokio::test]
async fn test_login_stores_tokens_and_loads_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(body_json(json!({ "username": "ana@joia.com", "password": "Joia2024!" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(true)))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let user = client
        .login(&Credentials::new(" ANA@joia.com", "Joia2024!"))
        .await
        .unwrap()
        .unwrap();

    assert!(user.is_staff);
    assert_eq!(client.tokens().refresh_token().as_deref(), Some("r1"));

    let session = AuthSession::restore(&client).await;
    assert!(session.is_staff());

    client.logout();
    assert_eq!(AuthSession::restore(&client).await, AuthSession::default());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client
        .login(&Credentials::new("ana@joia.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::InvalidCredentials));
    assert_eq!(err.user_message(), "Email ou senha incorretos.");
    assert!(!client.tokens().is_authenticated());
}

#[tokio::test]
async fn test_restore_keeps_tokens_when_profile_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("a1", "r1")));
    let session = AuthSession::restore(&client).await;
    assert!(session.authenticated);
    assert!(session.user.is_none());
    assert!(client.tokens().is_authenticated());
}

#[tokio::test]
async fn test_create_product_sends_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products/"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json(10, None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(("a1", "r1")));
    let form = ProductForm {
        name: "Colar".into(),
        base_price: "250".into(),
        ..Default::default()
    };
    let product = client.create_product(&form).await.unwrap();
    assert_eq!(product.id, 10);

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"base_price\""));
    assert!(body.contains("250.00"));
}
