mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::Fixture;
use game_host_protocol::{
    ContentInfoMap, Credential, FileInfo, FileService, RemoteError, RemoteResult,
};
use game_host_vfs::{
    load_specification, Item, ItemError, Label, MemoryGameStore, RootItem, ServiceRoot, Session,
    StoreSnapshot, ToolItem, ToolKind, ToolRecord,
};

fn tool(kind: ToolKind, id: &str, path: &str, files: Option<&str>) -> ToolRecord {
    ToolRecord {
        kind,
        id: id.to_string(),
        description: format!("{id} tool"),
        path: path.to_string(),
        files: files.map(str::to_string),
    }
}

fn tools() -> Vec<ToolRecord> {
    vec![
        tool(ToolKind::Tool, "all", "tools/t", None),
        tool(ToolKind::Tool, "none", "tools/t", Some("")),
        tool(ToolKind::Tool, "one", "tools/t", Some("b.txt")),
        tool(ToolKind::Tool, "gone", "tools/t", Some("missing.txt")),
        tool(ToolKind::Tool, "two", "tools/t", Some("a.txt, c.txt, missing.txt")),
        tool(ToolKind::Tool, "locked", "tools/locked", Some("a.txt,b.txt")),
        tool(ToolKind::Tool, "locked1", "tools/locked", Some("a.txt")),
        tool(ToolKind::ShipList, "plist", "shiplists/plist", None),
        tool(ToolKind::ShipList, "pick", "shiplists/plist", Some("hullspec.dat")),
    ]
}

async fn fixture() -> Fixture {
    let fixture = Fixture::with(Vec::new(), tools());
    for name in ["a.txt", "b.txt", "c.txt"] {
        fixture.files.insert_file(&format!("tools/t/{name}"), name.as_bytes());
        fixture.files.insert_file(&format!("tools/locked/{name}"), b"secret");
    }
    fixture.files.insert_file("tools/t/sub/inner.txt", b"inner");
    fixture.files.insert_file("shiplists/plist/hullspec.dat", b"hulls");
    fixture.files.insert_file("shiplists/plist/pconfig.src.frag", b"% partial");
    fixture.files.insert_file("shiplists/plist/pconfig.src.bak", b"old");

    fixture
        .files
        .set_permissions(&Credential::Admin, "tools/t", "u", "rl")
        .await
        .unwrap();
    fixture
        .files
        .set_permissions(&Credential::Admin, "shiplists/plist", "u", "rl")
        .await
        .unwrap();
    fixture.files.clear_calls();
    fixture
}

#[tokio::test]
async fn unrestricted_tool_lists_regular_files() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    assert_eq!(
        fixture.names(&u, "tool/all").await.unwrap(),
        vec!["a.txt", "b.txt", "c.txt"]
    );
    let item = fixture.item(&u, "tool/all/b.txt").await.unwrap();
    assert_eq!(item.content(&u).await.unwrap(), b"b.txt");

    let info = fixture.item(&u, "tool/all").await.unwrap().info(&u).await.unwrap();
    assert_eq!(info.label, Label::Tool);
    assert_eq!(info.tool_name.as_deref(), Some("all tool"));
}

#[tokio::test]
async fn empty_restriction_publishes_nothing() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    let item = fixture.item(&u, "tool/none").await.unwrap();
    fixture.files.clear_calls();
    assert!(item.list_content(&u).await.unwrap().is_empty());
    assert!(fixture.files.calls().is_empty());
}

#[tokio::test]
async fn single_name_restriction_uses_one_stat() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    assert_eq!(fixture.names(&u, "tool/one").await.unwrap(), vec!["b.txt"]);
    assert_eq!(fixture.files.call_count("stat"), 1);
    assert_eq!(fixture.files.call_count("list"), 0);

    // missing file is an empty result, not an error
    assert!(fixture.names(&u, "tool/gone").await.unwrap().is_empty());
    // permission problems are still reported
    assert!(matches!(
        fixture.names(&u, "tool/locked1").await,
        Err(ItemError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn multi_name_restriction_filters_one_listing() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    assert_eq!(
        fixture.names(&u, "tool/two").await.unwrap(),
        vec!["a.txt", "c.txt"]
    );
    assert_eq!(fixture.files.call_count("list"), 1);
    assert!(fixture.item(&u, "tool/two/b.txt").await.err().unwrap().is_not_found());

    assert!(matches!(
        fixture.names(&u, "tool/locked").await,
        Err(ItemError::PermissionDenied(_))
    ));
    // admin may read what the user may not
    assert_eq!(
        fixture.names(&fixture.session(""), "tool/locked").await.unwrap(),
        vec!["a.txt", "b.txt"]
    );
}

#[tokio::test]
async fn tool_roots_list_records_of_their_kind() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    assert_eq!(
        fixture.names(&u, "shiplist").await.unwrap(),
        vec!["pick", "plist"]
    );
    assert_eq!(fixture.names(&u, "tool").await.unwrap().len(), 7);
    assert!(fixture.item(&u, "tool/plist").await.err().unwrap().is_not_found());
    assert!(fixture.item(&u, "tools").await.err().unwrap().is_not_found());
    assert!(RootItem.list_content(&u).await.is_err());
}

/// File service where every call fails
struct BrokenService;

#[async_trait]
impl FileService for BrokenService {
    async fn list(&self, _who: &Credential, _dir: &str) -> RemoteResult<ContentInfoMap> {
        Err(RemoteError::from_status_text("500 Connection reset"))
    }

    async fn stat(&self, _who: &Credential, _path: &str) -> RemoteResult<FileInfo> {
        Err(RemoteError::from_status_text("500 Connection reset"))
    }

    async fn get(&self, _who: &Credential, _path: &str) -> RemoteResult<Vec<u8>> {
        Err(RemoteError::from_status_text("500 Connection reset"))
    }
}

#[tokio::test]
async fn remote_failures_propagate() {
    let store = MemoryGameStore::from_snapshot(StoreSnapshot {
        games: Vec::new(),
        tools: tools(),
    });
    let root = ServiceRoot::new(Arc::new(BrokenService), Arc::new(store));
    let session = Session::admin(Arc::new(root));

    // listing, filtered listing and single-file lookup alike
    for files in [None, Some("a.txt, b.txt"), Some("a.txt")] {
        let item = ToolItem::new(tool(ToolKind::Tool, "x", "tools/t", files));
        let err = item.list_content(&session).await.err().unwrap();
        assert_eq!(err, ItemError::Remote("500 Connection reset".into()), "{files:?}");
    }
}

#[tokio::test]
async fn specification_reads_fragments_and_skips_missing() {
    let fixture = fixture().await;
    let u = fixture.session("u");

    let files = load_specification(
        &u,
        ToolKind::ShipList,
        "plist",
        &["hullspec.dat", "pconfig.src", "engspec.dat"],
    )
    .await
    .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files["hullspec.dat"], b"hulls");
    assert_eq!(files["pconfig.src"], b"% partial");

    let picked = load_specification(&u, ToolKind::ShipList, "pick", &["hullspec.dat", "pconfig.src"])
        .await
        .unwrap();
    assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["hullspec.dat"]);

    assert!(load_specification(&u, ToolKind::Tool, "plist", &["x"])
        .await
        .err().unwrap()
        .is_not_found());
    assert!(matches!(
        load_specification(&u, ToolKind::Tool, "locked", &["a.txt"]).await,
        Err(ItemError::Remote(_))
    ));
}
