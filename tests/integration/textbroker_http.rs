//! Textbroker client against a local mock HTTP server.

use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use claimbot::platforms::textbroker::TextbrokerClient;
use claimbot::platforms::OrderPlatform;
use claimbot::types::ListingItem;

const LISTING_HTML: &str = r#"
<div class="box-wrapper">
  <table>
    <tr id="tr_101">
      <td><a class="headline_prev" id="101">Article voyage</a></td>
      <td id="earnings"><strong>8.40 - 12.60€</strong></td>
    </tr>
    <tr id="tr_102">
      <td><a class="headline_prev" id="102">Fiche produit</a></td>
      <td id="earnings"><strong>20.00 - 31.50€</strong></td>
    </tr>
  </table>
</div>
"#;

fn client(server: &MockServer) -> TextbrokerClient {
    TextbrokerClient::new(
        &server.uri(),
        "claimbot-test/1.0",
        "author@example.com".into(),
        SecretString::new("s3cret".into()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_client_full_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/login/ajax_context:1/"))
        .and(header("user-agent", "claimbot-test/1.0"))
        .and(body_string_contains("params%5B0%5D%5Bvalue%5D=author%40example.com"))
        .and(body_string_contains("params%5B1%5D%5Bvalue%5D=s3cret"))
        .and(body_string_contains("params%5B2%5D%5Bvalue%5D=author"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=abc123; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/order-search.ajax.php"))
        .and(query_param("search_headline", "1"))
        .and(query_param("order_type_open_order_4", "1"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("cookie", "PHPSESSID=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_HTML))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/a/inc/headlines_common/show_headline.php"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("cookie", "PHPSESSID=abc123"))
        .and(body_string_contains("id=102"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div>ok</div>"))
        .expect(1)
        .mount(&server)
        .await;

    let tb = client(&server);
    tb.login().await.unwrap();

    let items = tb.list_orders().await.unwrap();
    assert_eq!(
        items,
        vec![
            ListingItem::new("101", "8.40 - 12.60€"),
            ListingItem::new("102", "20.00 - 31.50€"),
        ]
    );

    tb.claim_order("102").await.unwrap();
}

#[tokio::test]
async fn test_login_rejected_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/login/ajax_context:1/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client(&server).login().await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("403"), "{msg}");
    assert!(msg.contains("forbidden"), "{msg}");
}

#[tokio::test]
async fn test_listing_server_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/order-search.ajax.php"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server).list_orders().await.unwrap_err();
    assert!(format!("{err:#}").contains("502"));
}

#[tokio::test]
async fn test_listing_without_rows_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/order-search.ajax.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<div class="box-wrapper">Aucune commande trouvée</div>"#),
        )
        .mount(&server)
        .await;

    assert!(client(&server).list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_claim_rejected_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a/inc/headlines_common/show_headline.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).claim_order("101").await.is_err());
}

#[tokio::test]
async fn test_unreachable_server_is_error() {
    let server = MockServer::start().await;
    let tb = client(&server);
    drop(server);

    assert!(tb.login().await.is_err());
}
