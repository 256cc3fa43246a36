//! End-to-end pipeline tests: search pages in, links file on disk out.

use std::collections::BTreeSet;
use std::time::Duration;

use linkharvest_core::{Harvester, HostTally, Resolver, client, output};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_page(ids: &[u32]) -> String {
    let anchors: String = ids
        .iter()
        .map(|id| format!(r#"<a href="?p=page&type=1&id={id}">Album {id}</a>"#))
        .collect();
    format!("<html><body><mainbar>{anchors}</mainbar></body></html>")
}

async fn mount_search_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("p", "search"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_album_redirect(server: &MockServer, id: u32, location: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(format!("id={id}&source")))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", location))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pipeline_spec_scenario_keeps_only_the_mirror_link() {
    let server = MockServer::start().await;
    mount_search_page(&server, 0, search_page(&[42, 43, 44])).await;
    mount_search_page(&server, 1, search_page(&[])).await;
    mount_search_page(&server, 2, search_page(&[])).await;

    mount_album_redirect(&server, 42, "https://mega.nz/file/abc").await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("id=43&source"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_album_redirect(&server, 44, "https://example.com/file").await;

    let base = Url::parse(&server.uri()).expect("mock server uri should parse");
    let keyword = "c107%20touhou";

    let harvester = Harvester::new(client::search_client(&base), base.clone())
        .with_page_delay(Duration::ZERO);
    let harvested = harvester.harvest(keyword).await;
    assert_eq!(harvested.ids, vec!["42", "43", "44"]);

    let resolver = Resolver::new(client::resolve_client(&base), base);
    let summary = resolver.resolve_all(&harvested.ids).await;

    let expected: BTreeSet<String> =
        [String::from("https://mega.nz/file/abc")].into_iter().collect();
    assert_eq!(summary.mirrors, expected);

    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join(output::output_filename(keyword));
    assert_eq!(
        file.file_name().and_then(|name| name.to_str()),
        Some("links_c107_touhou.txt")
    );
    output::write_links(&file, &summary.mirrors).expect("links file written");
    assert_eq!(
        std::fs::read_to_string(&file).expect("links file readable"),
        "https://mega.nz/file/abc"
    );
}

#[tokio::test]
async fn test_pipeline_sorts_links_across_hosts_and_tallies_them() {
    let server = MockServer::start().await;
    mount_search_page(&server, 0, search_page(&[1, 2])).await;
    mount_search_page(&server, 1, search_page(&[3])).await;
    mount_search_page(&server, 2, search_page(&[3])).await;
    mount_search_page(&server, 3, search_page(&[3])).await;

    mount_album_redirect(&server, 1, "https://pixeldrain.com/u/abcd").await;
    mount_album_redirect(&server, 2, "https://mega.nz/file/abc").await;
    mount_album_redirect(&server, 3, "https://drive.google.com/open?id=1").await;

    let base = Url::parse(&server.uri()).expect("mock server uri should parse");
    let harvester = Harvester::new(client::search_client(&base), base.clone())
        .with_page_delay(Duration::ZERO);
    let harvested = harvester.harvest("rts22").await;
    assert_eq!(harvested.ids, vec!["1", "2", "3"]);

    let resolver = Resolver::new(client::resolve_client(&base), base);
    let summary = resolver.resolve_all(&harvested.ids).await;

    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join(output::output_filename("rts22"));
    output::write_links(&file, &summary.mirrors).expect("links file written");

    assert_eq!(
        std::fs::read_to_string(&file).expect("links file readable"),
        "https://drive.google.com/open?id=1\n\
         https://mega.nz/file/abc\n\
         https://pixeldrain.com/u/abcd"
    );

    let tally = HostTally::from_links(&summary.mirrors);
    assert_eq!(tally.summary(), "Mega(1), Mediafire(0), GD(1), PD(1)");
}
