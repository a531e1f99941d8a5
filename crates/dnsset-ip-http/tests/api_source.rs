//! HTTP-level tests for the external-API IP source

use dnsset_core::traits::IpSource;
use dnsset_core::Error;
use dnsset_ip_http::ApiIpSource;
use std::net::IpAddr;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source(server: &MockServer) -> ApiIpSource {
    ApiIpSource::with_endpoints(
        format!("{}/v4", server.uri()),
        format!("{}/v6", server.uri()),
    )
    .unwrap()
}

#[tokio::test]
async fn each_family_uses_its_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("198.51.100.23\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v6"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::23\n"))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&server).await;

    assert_eq!(
        source.get_ipv4().await.unwrap(),
        "198.51.100.23".parse::<IpAddr>().unwrap()
    );
    assert_eq!(
        source.get_ipv6().await.unwrap(),
        "2001:db8::23".parse::<IpAddr>().unwrap()
    );
}

#[tokio::test]
async fn wrong_family_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::23"))
        .mount(&server)
        .await;

    let result = source(&server).await.get_ipv4().await;

    assert!(matches!(result, Err(Error::InvalidResponse(_))));
}

#[tokio::test]
async fn http_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = source(&server).await.get_ipv6().await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let source = ApiIpSource::with_endpoints("http://127.0.0.1:9/v4", "http://127.0.0.1:9/v6").unwrap();

    let result = source.get_ipv4().await;

    assert!(matches!(result, Err(Error::Transport(_))));
}
