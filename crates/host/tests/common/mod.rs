//! Common test utilities
//!
//! [`TestHarness`] lays out a small file store in a temp directory, writes
//! a record snapshot next to it and builds the router over both:
//!
//! - game 1 "Harness" at turn 12; slot 1 is "a", slot 2 is "b"
//! - backups for turn 10 (with specification files) and turn 11 (none on disk)
//! - ship list "plist" (everything published) and "pick" (only hullspec.dat)
#![allow(dead_code)] // Not every test file uses every helper

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use game_host_server::api::{app, AppState};
use game_host_server::filer::LocalFileService;
use game_host_server::records::load_store;
use game_host_vfs::ServiceRoot;
use tempfile::TempDir;
use tower::ServiceExt;

pub const RECORDS: &str = r#"{
    "games": [{
        "id": 1,
        "name": "Harness",
        "directory": "games/0001",
        "turn": 12,
        "slots": [
            {"number": 1, "history": [{"action": "push", "turn": 1, "user": "a"}]},
            {"number": 2, "history": [{"action": "push", "turn": 1, "user": "b"}]}
        ],
        "turns": [
            {"turn": 10, "has_specification": true},
            {"turn": 11, "has_specification": true}
        ]
    }],
    "tools": [
        {"kind": "shiplist", "id": "plist", "description": "Standard ships", "path": "shiplists/plist"},
        {"kind": "shiplist", "id": "pick", "description": "Hulls only", "path": "shiplists/plist", "files": "hullspec.dat"}
    ]
}"#;

const FILES: [(&str, &str); 11] = [
    ("games/0001/out/all/race.nm", "races"),
    ("games/0001/out/all/planet.nm", "planets"),
    ("games/0001/out/1/player1.rst", "rst1"),
    ("games/0001/out/2/player2.rst", "rst2"),
    ("games/0001/in/player1.trn", "trn1"),
    ("games/0001/backup/10/hullspec.dat", "hulls10"),
    ("games/0001/backup/10/player1.rst", "r1-10"),
    ("games/0001/backup/10/player1.trn", "t1-10"),
    ("games/0001/backup/10/player2.rst", "r2-10"),
    ("shiplists/plist/hullspec.dat", "hulls"),
    ("shiplists/plist/pconfig.src.frag", "% frag"),
];

pub struct TestHarness {
    pub tmp_dir: TempDir,
    pub app: Router,
}

impl TestHarness {
    pub fn new() -> anyhow::Result<Self> {
        let tmp_dir = tempfile::tempdir()?;
        let store_dir = tmp_dir.path().join("files");
        for (path, content) in FILES {
            write(&store_dir, path, content)?;
        }
        write(tmp_dir.path(), "records.json", RECORDS)?;

        let files = LocalFileService::new(&store_dir)?;
        let store = load_store(&tmp_dir.path().join("records.json"))?;
        let root = ServiceRoot::new(Arc::new(files), Arc::new(store));
        let app = app(AppState::new(root));
        Ok(Self { tmp_dir, app })
    }

    /// Write a file into the file store
    pub fn write_file(&self, path: &str, content: &str) -> std::io::Result<()> {
        write(&self.tmp_dir.path().join("files"), path, content)
    }

    /// Send a GET request, return status and raw body
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    /// Send a GET request and parse the body as JSON
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Child names from a directory response
    pub async fn names(&self, uri: &str) -> Vec<String> {
        let (status, json) = self.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {json}");
        json.as_array()
            .unwrap()
            .iter()
            .map(|info| info["name"].as_str().unwrap().to_string())
            .collect()
    }
}

fn write(base: &Path, path: &str, content: &str) -> std::io::Result<()> {
    let target = base.join(path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, content)
}
