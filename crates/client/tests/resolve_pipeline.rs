mod stub;

use std::sync::Arc;

use serde_json::json;
use stub::{Route, Stub};
use titlefix_client::fetch::{FetchConfig, Fetcher};
use titlefix_client::{Dispatch, EmbedClient, LocalParser, TitleResolver, on_message};
use titlefix_core::{AppConfig, CacheDb, ParserMode};

fn config(stub: &Stub) -> AppConfig {
    AppConfig {
        timeout_ms: 5_000,
        parser_mode: ParserMode::Local,
        language: Some("ja".into()),
        oembed_endpoint: stub.url("/oembed"),
        use_system_proxy: false,
        ..Default::default()
    }
}

async fn resolver(stub: &Stub) -> TitleResolver {
    let cache = CacheDb::open_in_memory().await.unwrap();
    TitleResolver::new(cache, &config(stub)).unwrap()
}

fn shift_jis(html: &str) -> Vec<u8> {
    encoding_rs::SHIFT_JIS.encode(html).0.into_owned()
}

#[tokio::test]
async fn shift_jis_page_is_resolved_and_cached() {
    let html = "<html><head><title>\n  日本語の\nタイトル  \n</title></head><body>本文</body></html>";
    let stub = Stub::spawn(vec![("/sjis", Route::html("text/html; charset=Shift_JIS", shift_jis(html)))]);
    let resolver = resolver(&stub).await;
    let url = stub.url("/sjis");

    let first = resolver.resolve_tracked(&url).await;
    assert_eq!(first.title.as_deref(), Some("日本語の タイトル"));
    first.write.expect("cache write scheduled").await.unwrap();

    assert_eq!(resolver.cache().get_title(&url).await.unwrap().as_deref(), Some("日本語の タイトル"));

    let second = resolver.resolve_tracked(&url).await;
    assert_eq!(second.title.as_deref(), Some("日本語の タイトル"));
    assert!(second.write.is_none());
    assert_eq!(stub.hits("/sjis"), 1);
}

#[tokio::test]
async fn euc_jp_page_through_parser_delegate() {
    let html = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=EUC-JP"><title>委譲パーサー</title></head></html>"#;
    let body = encoding_rs::EUC_JP.encode(html).0.into_owned();
    let stub = Stub::spawn(vec![("/euc", Route::html("text/html", body))]);

    let cache = CacheDb::open_in_memory().await.unwrap();
    let config = AppConfig { parser_mode: ParserMode::Delegate, ..config(&stub) };
    let resolver = TitleResolver::new(cache, &config).unwrap();

    assert_eq!(resolver.resolve(&stub.url("/euc")).await.as_deref(), Some("委譲パーサー"));
}

#[tokio::test]
async fn pdf_is_never_fetched_or_cached() {
    let stub = Stub::spawn(vec![("/paper.pdf", Route::html("application/pdf", b"%PDF-1.4".to_vec()))]);
    let resolver = resolver(&stub).await;

    let resolution = resolver.resolve_tracked(&stub.url("/paper.pdf")).await;
    assert_eq!(resolution.title, None);
    assert!(resolution.write.is_none());
    assert_eq!(stub.total_hits(), 0);
    assert_eq!(resolver.cache().count().await.unwrap(), 0);
}

#[tokio::test]
async fn status_post_uses_embed_api() {
    let embed = json!({
        "url": "https://twitter.com/someone/status/1234",
        "author_name": "Someone",
        "html": "<blockquote class=\"twitter-tweet\"><p lang=\"ja\" dir=\"ltr\">一行目<br>二行目</p>&mdash; Someone (@someone)</blockquote>",
    });
    let stub = Stub::spawn(vec![("/oembed", Route::json(&embed))]);
    let resolver = resolver(&stub).await;
    let status_url = "https://twitter.com/someone/status/1234";

    let resolution = resolver.resolve_tracked(status_url).await;
    assert_eq!(resolution.title.as_deref(), Some("一行目\n二行目\n— Someone (@someone)"));
    resolution.write.unwrap().await.unwrap();

    assert_eq!(stub.hits("/oembed"), 1);
    let request = url::Url::parse(&stub.url(&stub.requests()[0])).unwrap();
    let pairs: Vec<(String, String)> = request.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("url".into(), status_url.into())));
    assert!(pairs.contains(&("omit_script".into(), "t".into())));
    assert!(pairs.contains(&("lang".into(), "ja".into())));

    assert_eq!(
        resolver.cache().get_title(status_url).await.unwrap().as_deref(),
        Some("一行目\n二行目\n— Someone (@someone)")
    );
}

#[tokio::test]
async fn embed_payload_without_html_is_absent() {
    let stub = Stub::spawn(vec![("/oembed", Route::json(&json!({ "error": "not found" })))]);
    let fetcher = Fetcher::new(FetchConfig { use_system_proxy: false, ..Default::default() }).unwrap();
    let embed = EmbedClient::new(fetcher, &stub.url("/oembed"), "en").unwrap();

    let title = embed
        .lookup("https://twitter.com/someone/status/1", &LocalParser)
        .await
        .unwrap();
    assert_eq!(title, None);
}

#[tokio::test]
async fn unknown_encoding_is_cached_as_absent() {
    let stub = Stub::spawn(vec![("/latin1", Route::html("text/html; charset=ISO-8859-1", b"<title>Caf\xe9</title>".to_vec()))]);
    let resolver = resolver(&stub).await;
    let url = stub.url("/latin1");

    let first = resolver.resolve_tracked(&url).await;
    assert_eq!(first.title, None);
    first.write.unwrap().await.unwrap();

    let entry = resolver.cache().get_entry(&url).await.unwrap().expect("absent title cached");
    assert_eq!(entry.title, None);

    assert_eq!(resolver.resolve(&url).await, None);
    assert_eq!(stub.hits("/latin1"), 1);
}

#[tokio::test]
async fn http_error_degrades_to_absent() {
    let stub = Stub::spawn(vec![("/gone", Route::status(404))]);
    let resolver = resolver(&stub).await;

    let resolution = resolver.resolve_tracked(&stub.url("/gone")).await;
    assert_eq!(resolution.title, None);
    resolution.write.unwrap().await.unwrap();
    assert_eq!(resolver.cache().count().await.unwrap(), 1);
}

#[tokio::test]
async fn resolve_is_idempotent() {
    let stub = Stub::spawn(vec![("/page", Route::html("text/html; charset=utf-8", "<title>Same Every Time</title>"))]);
    let resolver = resolver(&stub).await;
    let url = stub.url("/page");

    let first = resolver.resolve_tracked(&url).await;
    first.write.unwrap().await.unwrap();
    for _ in 0..3 {
        assert_eq!(resolver.resolve(&url).await, first.title);
    }
    assert_eq!(stub.hits("/page"), 1);
}

#[tokio::test]
async fn listener_dispatch_end_to_end() {
    let stub = Stub::spawn(vec![("/page", Route::html("text/html; charset=UTF-8", "<title>Via Listener</title>"))]);
    let cache = CacheDb::open_in_memory().await.unwrap();
    let fetcher = Fetcher::new(FetchConfig { use_system_proxy: false, ..Default::default() }).unwrap();
    let embed = EmbedClient::new(fetcher.clone(), &stub.url("/oembed"), "en").unwrap();
    let resolver = TitleResolver::with_parts(cache, fetcher, embed, Arc::new(LocalParser));

    let message = json!({ "target": "background", "type": "getTitle", "url": stub.url("/page") });
    assert_eq!(on_message(&resolver, &message).await, Dispatch::Handled(Some("Via Listener".into())));

    let foreign = json!({ "target": "offscreen", "type": "queryTitle", "html": "<title>x</title>" });
    assert_eq!(on_message(&resolver, &foreign).await, Dispatch::Ignored);
    assert_eq!(stub.total_hits(), 1);
}

#[tokio::test]
async fn embed_non_json_is_error() {
    let stub = Stub::spawn(vec![("/oembed", Route::html("text/html", "<html>maintenance</html>"))]);
    let fetcher = Fetcher::new(FetchConfig { use_system_proxy: false, ..Default::default() }).unwrap();
    let embed = EmbedClient::new(fetcher, &stub.url("/oembed"), "en").unwrap();

    let result = embed.lookup("https://x.com/someone/status/1", &LocalParser).await;
    assert!(matches!(result, Err(titlefix_core::Error::EmbedFailed(_))), "got {result:?}");
}

#[tokio::test]
async fn cache_write_failure_does_not_affect_response() {
    let stub = Stub::spawn(vec![("/page", Route::html("text/html; charset=utf-8", "<title>Still Served</title>"))]);
    let resolver = resolver(&stub).await;
    let url = stub.url("/page");

    resolver.cache().clone().close().await.unwrap();

    let resolution = resolver.resolve_tracked(&url).await;
    assert_eq!(resolution.title.as_deref(), Some("Still Served"));
    resolution.write.expect("cache write scheduled").await.unwrap();

    assert_eq!(resolver.resolve(&url).await.as_deref(), Some("Still Served"));
    assert_eq!(stub.hits("/page"), 2);
}
