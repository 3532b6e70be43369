use std::fs;

use posterboard::ingest::{load_posters, FileSource, HttpSource, SourceKind, TextSource};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const CSV: &str = "id,title,presenter,category,board,slots\n\
    1,\"Reefs, kelp and\nseagrass\",Ann,Bio,B-1,10:30-10:45|11:30-11:40\n\
    2,Catalysis,Ben,Chem,C-1,11:00-11:15\n";

const JSON: &str = r#"[
  {"id": "9", "title": "From JSON", "presenter": "Jo", "category": "Phys", "board": "P-1",
   "slots": [{"start": "11:00", "end": "11:20"}]},
  {"id": "10", "title": "Legacy", "presenter": "Lu", "category": "Phys", "board": "P-2",
   "start": "10:40", "end": "10:50"}
]"#;

#[tokio::test]
async fn csv_is_preferred_when_present() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.csv"), CSV).unwrap();
    fs::write(dir.path().join("data.json"), JSON).unwrap();

    let csv = FileSource::new(dir.path().join("data.csv"));
    let json = FileSource::new(dir.path().join("data.json"));
    let (posters, report) = load_posters(&csv, &json).await.unwrap();

    assert_eq!(report.kind, SourceKind::Csv);
    assert_eq!(report.posters, 2);
    assert_eq!(report.sha256.len(), 64);
    assert_eq!(posters[0].title, "Reefs, kelp and\nseagrass");
    assert_eq!(posters[0].slots.len(), 2);
}

#[tokio::test]
async fn falls_back_to_json_when_csv_missing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.json"), JSON).unwrap();

    let csv = FileSource::new(dir.path().join("data.csv"));
    let json = FileSource::new(dir.path().join("data.json"));
    let (posters, report) = load_posters(&csv, &json).await.unwrap();

    assert_eq!(report.kind, SourceKind::Json);
    assert_eq!(posters.len(), 2);
    assert_eq!(posters[1].slots.len(), 1);
    assert_eq!(posters[1].slots[0].start(), 640);
}

#[tokio::test]
async fn both_sources_missing_is_fatal() {
    let dir = TempDir::new().unwrap();
    let csv = FileSource::new(dir.path().join("data.csv"));
    let json = FileSource::new(dir.path().join("data.json"));
    let err = load_posters(&csv, &json).await.unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("data.csv") && msg.contains("data.json"), "{}", msg);
}

#[tokio::test]
async fn non_array_json_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.json"), r#"{"posters": []}"#).unwrap();
    let csv = FileSource::new(dir.path().join("data.csv"));
    let json = FileSource::new(dir.path().join("data.json"));
    let err = load_posters(&csv, &json).await.unwrap_err();
    assert!(format!("{:#}", err).contains("array"));
}

/// Serve a single request with a fixed status line and body.
async fn serve_once(status: &'static str, body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut req = [0u8; 1024];
        let _ = stream.read(&mut req).await;
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(resp.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });
    Url::parse(&format!("http://{}/data.csv", addr)).unwrap()
}

#[tokio::test]
async fn http_error_status_falls_back_to_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.json"), JSON).unwrap();

    let csv = HttpSource::new(serve_once("404 Not Found", "").await);
    assert!(csv.fetch_text().await.is_err());

    let csv = HttpSource::new(serve_once("404 Not Found", "").await);
    let json = FileSource::new(dir.path().join("data.json"));
    let (posters, report) = load_posters(&csv, &json).await.unwrap();
    assert_eq!(report.kind, SourceKind::Json);
    assert_eq!(posters.len(), 2);
}

#[tokio::test]
async fn http_source_reads_csv_body() {
    let dir = TempDir::new().unwrap();
    let csv = HttpSource::new(serve_once("200 OK", CSV).await);
    let json = FileSource::new(dir.path().join("data.json"));
    let (posters, report) = load_posters(&csv, &json).await.unwrap();
    assert_eq!(report.kind, SourceKind::Csv);
    assert!(report.source.starts_with("http://127.0.0.1:"));
    assert_eq!(posters.len(), 2);
}
