use super::*;
use chrono::{DateTime, TimeZone, Utc};
use orgraph_core::{Comment, PositionMap, Vec2};
use proptest::prelude::*;
use std::time::Instant;

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 5, 10, 0, 0).unwrap()
}

fn memory_store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

#[test]
fn test_sqlite_key_value_round_trip() -> Result<(), StorageError> {
    let storage = Storage::new_in_memory()?;
    assert_eq!(storage.get("missing")?, None);

    storage.set("node_positions_business", "[]")?;
    storage.set("node_positions_business", "[1]")?;
    storage.set("node_comments_business_staff_1", "[]")?;
    assert_eq!(storage.get("node_positions_business")?.as_deref(), Some("[1]"));

    let keys = storage.keys_with_prefix("node_comments_")?;
    assert_eq!(keys, vec!["node_comments_business_staff_1".to_string()]);

    storage.remove("node_positions_business")?;
    assert_eq!(storage.get("node_positions_business")?, None);

    storage.clear()?;
    assert!(storage.keys_with_prefix("")?.is_empty());
    Ok(())
}

#[test]
fn test_prefix_lookup_treats_underscore_literally() -> Result<(), StorageError> {
    let storage = Storage::new_in_memory()?;
    storage.set("node_comments_legal_1", "[]")?;
    storage.set("nodeXcomments_legal_2", "[]")?;
    assert_eq!(storage.keys_with_prefix("node_comments")?.len(), 1);
    Ok(())
}

#[test]
fn test_schema_version_is_recorded() -> Result<(), StorageError> {
    let storage = Storage::new_in_memory()?;
    let version: i64 = storage
        .conn
        .lock()
        .query_row("PRAGMA user_version", [], |row| row.get(0))?;
    assert_eq!(version, SCHEMA_VERSION as i64);
    Ok(())
}

#[test]
fn test_newer_schema_version_is_rejected() -> Result<(), StorageError> {
    let dir = tempfile::tempdir().map_err(|e| StorageError::Other(e.to_string()))?;
    let path = dir.path().join("orgraph.db");
    {
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "user_version", (SCHEMA_VERSION + 1).to_string())?;
    }
    assert!(matches!(Storage::open(&path), Err(StorageError::Other(_))));
    Ok(())
}

#[test]
fn test_positions_survive_reopen() -> Result<(), StorageError> {
    let dir = tempfile::tempdir().map_err(|e| StorageError::Other(e.to_string()))?;
    let path = dir.path().join("orgraph.db");
    {
        let store = PositionStore::new(Arc::new(Storage::open(&path)?));
        store.save(
            StructureType::Business,
            &[PositionRecord::new("staff_1", Vec2::new(120.0, -40.5))],
        )?;
    }
    let store = PositionStore::new(Arc::new(Storage::open(&path)?));
    let loaded = store.load(StructureType::Business);
    assert_eq!(loaded.get(&NodeId::from("staff_1")), Some(&Vec2::new(120.0, -40.5)));
    Ok(())
}

#[test]
fn test_positions_save_overwrites_whole_structure() -> Result<(), StorageError> {
    let store = PositionStore::new(memory_store());
    store.save(
        StructureType::Business,
        &[
            PositionRecord::new("a", Vec2::new(1.0, 2.0)),
            PositionRecord::new("b", Vec2::new(3.0, 4.0)),
        ],
    )?;
    store.save(
        StructureType::Business,
        &[PositionRecord::new("a", Vec2::new(5.0, 6.0))],
    )?;

    let loaded = store.load(StructureType::Business);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(&NodeId::from("a")), Some(&Vec2::new(5.0, 6.0)));
    Ok(())
}

#[test]
fn test_positions_are_partitioned_by_structure() -> Result<(), StorageError> {
    let store = PositionStore::new(memory_store());
    store.save(
        StructureType::Legal,
        &[PositionRecord::new("1", Vec2::new(10.0, 10.0))],
    )?;
    assert!(store.load(StructureType::Business).is_empty());
    assert!(store.load(StructureType::Territorial).is_empty());
    assert_eq!(store.load(StructureType::Legal).len(), 1);

    store.clear(StructureType::Legal)?;
    assert!(store.load(StructureType::Legal).is_empty());
    Ok(())
}

#[test]
fn test_positions_blob_matches_console_format() -> Result<(), StorageError> {
    let kv = memory_store();
    let store = PositionStore::new(kv.clone());
    store.save(
        StructureType::Territorial,
        &[PositionRecord::new("7", Vec2::new(300.0, 180.0))],
    )?;
    let blob = kv.get("node_positions_territorial")?.unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&blob)?;
    assert_eq!(value[0]["id"], "7");
    assert_eq!(value[0]["position"]["x"], 300.0);
    assert_eq!(value[0]["position"]["y"], 180.0);
    Ok(())
}

#[test]
fn test_corrupt_positions_load_empty() -> Result<(), StorageError> {
    let kv = memory_store();
    kv.set("node_positions_business", "{not json")?;
    let store = PositionStore::new(kv);
    assert!(store.load(StructureType::Business).is_empty());
    Ok(())
}

#[test]
fn test_non_finite_positions_are_dropped() -> Result<(), StorageError> {
    let store = PositionStore::new(memory_store());
    store.save(
        StructureType::Business,
        &[
            PositionRecord::new("ok", Vec2::new(1.0, 1.0)),
            PositionRecord::new("nan", Vec2::new(f32::NAN, 0.0)),
            PositionRecord::new("inf", Vec2::new(0.0, f32::INFINITY)),
        ],
    )?;
    let loaded = store.load(StructureType::Business);
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains_key(&NodeId::from("ok")));
    Ok(())
}

#[test]
fn test_comments_append_in_order() -> Result<(), StorageError> {
    let store = CommentStore::new(memory_store()).with_clock(fixed_clock);
    let node = NodeId::from("staff_3");

    let first = store.add_comment(&node, StructureType::Business, "  Prepare report ")?;
    store.add_comment(&node, StructureType::Business, "Call back")?;
    assert_eq!(first.text, "Prepare report");
    assert!(!first.completed);
    assert_eq!(first.date, fixed_clock());

    let comments = store.load_comments(&node, StructureType::Business);
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Prepare report", "Call back"]);
    assert!(store.load_comments(&node, StructureType::Legal).is_empty());
    Ok(())
}

#[test]
fn test_blank_comment_is_rejected() -> Result<(), StorageError> {
    let store = CommentStore::new(memory_store());
    let node = NodeId::from("staff_3");
    assert!(matches!(
        store.add_comment(&node, StructureType::Business, "   "),
        Err(StorageError::EmptyComment)
    ));
    assert!(store.load_comments(&node, StructureType::Business).is_empty());
    Ok(())
}

#[test]
fn test_toggle_flips_only_completed() -> Result<(), StorageError> {
    let store = CommentStore::new(memory_store()).with_clock(fixed_clock);
    let node = NodeId::from("div_2");
    store.add_comment(&node, StructureType::Business, "a")?;
    store.add_comment(&node, StructureType::Business, "b")?;

    let toggled = store.toggle_comment(&node, StructureType::Business, 1)?;
    assert!(toggled.completed);
    assert_eq!(toggled.text, "b");
    assert_eq!(toggled.date, fixed_clock());

    let comments = store.load_comments(&node, StructureType::Business);
    assert!(!comments[0].completed);
    assert!(comments[1].completed);

    store.toggle_comment(&node, StructureType::Business, 1)?;
    assert!(!store.load_comments(&node, StructureType::Business)[1].completed);
    Ok(())
}

#[test]
fn test_toggle_out_of_range_is_error() -> Result<(), StorageError> {
    let store = CommentStore::new(memory_store());
    let node = NodeId::from("div_2");
    store.add_comment(&node, StructureType::Business, "a")?;
    let err = store.toggle_comment(&node, StructureType::Business, 4);
    assert!(matches!(
        err,
        Err(StorageError::CommentIndex { index: 4, len: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_legacy_string_comments_are_upgraded() -> Result<(), StorageError> {
    let kv = memory_store();
    kv.set(
        "node_comments_business_staff_9",
        r#"["old note", {"text": "new", "completed": true, "date": "2023-01-01T00:00:00Z"}]"#,
    )?;
    let store = CommentStore::new(kv.clone()).with_clock(fixed_clock);
    let node = NodeId::from("staff_9");

    let comments = store.load_comments(&node, StructureType::Business);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "old note");
    assert!(!comments[0].completed);
    assert_eq!(comments[0].date, fixed_clock());
    assert!(comments[1].completed);

    let blob = kv.get("node_comments_business_staff_9")?.unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&blob)?;
    assert_eq!(value[0]["text"], "old note");
    Ok(())
}

#[test]
fn test_corrupt_comments_load_empty() -> Result<(), StorageError> {
    let kv = memory_store();
    kv.set("node_comments_business_x", "42")?;
    let store = CommentStore::new(kv);
    assert!(
        store
            .load_comments(&NodeId::from("x"), StructureType::Business)
            .is_empty()
    );
    Ok(())
}

#[test]
fn test_merge_prefers_non_empty_in_memory() {
    let in_memory = vec![Comment::new("live", fixed_clock())];
    let persisted = vec![Comment::new("saved", fixed_clock())];

    assert_eq!(
        merge_comments(in_memory.clone(), persisted.clone()),
        in_memory
    );
    assert_eq!(merge_comments(Vec::new(), persisted.clone()), persisted);
}

#[test]
fn test_writer_waits_for_quiet_period() -> Result<(), StorageError> {
    let store = PositionStore::new(memory_store());
    let mut writer = PositionWriter::new(store.clone());
    let start = Instant::now();

    let mut positions = PositionMap::new();
    positions.insert(NodeId::from("a"), Vec2::new(1.0, 1.0));
    writer.schedule(StructureType::Business, positions.clone(), start)?;

    positions.insert(NodeId::from("a"), Vec2::new(2.0, 2.0));
    let later = start + Duration::from_millis(300);
    writer.schedule(StructureType::Business, positions, later)?;

    assert!(!writer.flush_due(start + Duration::from_millis(600))?);
    assert!(store.load(StructureType::Business).is_empty());

    assert!(writer.flush_due(later + writer.quiet_period())?);
    assert!(!writer.is_pending());
    assert_eq!(
        store.load(StructureType::Business).get(&NodeId::from("a")),
        Some(&Vec2::new(2.0, 2.0))
    );
    Ok(())
}

#[test]
fn test_writer_flushes_previous_structure_on_switch() -> Result<(), StorageError> {
    let store = PositionStore::new(memory_store());
    let mut writer = PositionWriter::new(store.clone());
    let now = Instant::now();

    let mut business = PositionMap::new();
    business.insert(NodeId::from("staff_1"), Vec2::new(0.0, 0.0));
    writer.schedule(StructureType::Business, business, now)?;

    let mut legal = PositionMap::new();
    legal.insert(NodeId::from("1"), Vec2::new(5.0, 5.0));
    writer.schedule(StructureType::Legal, legal, now)?;

    assert_eq!(store.load(StructureType::Business).len(), 1);
    assert!(store.load(StructureType::Legal).is_empty());

    writer.flush()?;
    assert_eq!(store.load(StructureType::Legal).len(), 1);
    Ok(())
}

proptest! {
    #[test]
    fn prop_position_round_trip(
        entries in proptest::collection::hash_map(
            "[a-z0-9_]{1,12}",
            (-400_000i32..400_000, -400_000i32..400_000),
            0..40,
        )
    ) {
        let store = PositionStore::new(memory_store());
        let saved: PositionMap = entries
            .into_iter()
            .map(|(id, (x, y))| (NodeId::new(id), Vec2::new(x as f32 / 4.0, y as f32 / 4.0)))
            .collect();
        store.save_map(StructureType::Business, &saved).unwrap();
        prop_assert_eq!(store.load(StructureType::Business), saved);
    }
}
