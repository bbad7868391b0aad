//! HTTP transport tests against a local mock server.

use digital_archive::prelude::*;
use digital_archive::transport::{HttpTransport, Transport};
use digital_archive::utils::HttpClient;
use mockito::Matcher;
use std::sync::Arc;

fn transport(server: &mockito::ServerGuard) -> HttpTransport {
    HttpTransport::with_client(Arc::new(HttpClient::new().unwrap()), &server.url())
}

#[tokio::test]
async fn test_search_sends_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/srv/subject.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("term".into(), "Soviet China".into()),
            Matcher::UrlEncoded("itemsPerPage".into(), "200".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"list":[{"id":2229,"name":"Soviet Union--Foreign relations--China"}]}"#)
        .create_async()
        .await;

    let archive = Archive::with_transport(Arc::new(transport(&server)));
    let results = Subject::search(&archive, SearchFilters::new().with("name", "Soviet China"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(results.count(), 1);
    assert_eq!(results.first().map(|s| s.id.as_str()), Some("2229"));
}

#[tokio::test]
async fn test_get_record() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/srv/repository/3.json")
        .with_status(200)
        .with_body(r#"{"id":"3","name":"Hoover Institution","uri":"/srv/repository/3.json"}"#)
        .create_async()
        .await;

    let value = transport(&server).get("repository", "3").await.unwrap();
    mock.assert_async().await;

    let repository = Repository::from_json(value).unwrap();
    assert_eq!(repository.name, "Hoover Institution");
}

#[tokio::test]
async fn test_missing_record() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/srv/subject/0.json")
        .with_status(404)
        .create_async()
        .await;

    let err = transport(&server).get("subject", "0").await.unwrap_err();
    match err {
        ArchiveError::NoSuchResource { endpoint, status, .. } => {
            assert_eq!(endpoint, "subject");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_asset_bytes_and_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/download/31.html")
        .with_status(200)
        .with_body("<p>Telegram</p>")
        .create_async()
        .await;
    server
        .mock("GET", "/download/32.pdf")
        .with_status(500)
        .create_async()
        .await;

    let transport = transport(&server);
    let bytes = transport.get_asset("download/31.html").await.unwrap();
    assert_eq!(bytes, b"<p>Telegram</p>".to_vec());

    let err = transport.get_asset("/download/32.pdf").await.unwrap_err();
    assert!(matches!(err, ArchiveError::ApiServer { status: 500, .. }));
}

#[tokio::test]
async fn test_date_range() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/srv/record/date_range.json")
        .with_status(200)
        .with_body(r#"{"begin":"18500101","end":"20180101"}"#)
        .create_async()
        .await;

    let range = transport(&server).date_range().await.unwrap();
    assert_eq!(range.begin, "18500101");
    assert_eq!(range.end, "20180101");
}
