use orgraph_api::{DivisionDto, FunctionalRelationDto, OrgType, OrganizationDto, Record, StaffDto};
use orgraph_core::{
    EdgeId, EdgeOrigin, NodeId, NodePatch, RecordKind, RecordRef, RelationKind, StructureType,
    Vec2,
};
use orgraph_events::{Event, EventBus, MutationKind};
use orgraph_storage::{CommentStore, MemoryStore, PositionRecord, PositionStore, SharedStore};
use orgraph_sync::{BackendOp, MemoryBackend, NodeDraft, SyncCoordinator, SyncError};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const ORG: i64 = 1;

fn division(id: i64, name: &str, parent_id: Option<i64>) -> Record {
    Record::Division(DivisionDto {
        id,
        name: name.to_string(),
        code: None,
        description: None,
        organization_id: Some(ORG),
        parent_id,
        is_active: true,
    })
}

fn staff(id: i64, name: &str, division_id: Option<i64>, manager_id: Option<i64>) -> Record {
    Record::Staff(StaffDto {
        id,
        division_id,
        manager_id,
        organization_id: Some(ORG),
        ..StaffDto::from_display_name(name)
    })
}

fn relation(id: i64, manager: i64, subordinate: i64, kind: &str) -> Record {
    Record::FunctionalRelation(FunctionalRelationDto {
        id,
        manager_id: manager,
        subordinate_id: subordinate,
        relation_type: kind.to_string(),
        description: Some("Quarterly launch".to_string()),
        is_active: true,
    })
}

fn organization(id: i64, name: &str, org_type: OrgType, parent_id: Option<i64>) -> Record {
    Record::Organization(OrganizationDto {
        id,
        name: name.to_string(),
        code: None,
        description: None,
        org_type,
        is_active: true,
        parent_id,
    })
}

/// Two divisions, three staff members, one project relation. Produces five
/// nodes and six edges in the business view.
fn seeded(backend: MemoryBackend) -> MemoryBackend {
    backend.seed_all([
        division(1, "Head office", None),
        division(2, "Sales", Some(1)),
        staff(10, "Ivanov Ivan", Some(1), None),
        staff(11, "Petrov Petr", Some(2), Some(10)),
        staff(12, "Sidorov Sergey", Some(2), None),
        relation(20, 10, 12, "PROJECT"),
    ]);
    backend
}

struct Fixture {
    backend: Arc<MemoryBackend>,
    coordinator: SyncCoordinator<MemoryBackend>,
    bus: EventBus,
    kv: SharedStore,
}

impl Fixture {
    fn new(backend: MemoryBackend) -> Self {
        let kv: SharedStore = Arc::new(MemoryStore::new());
        let backend = Arc::new(backend);
        let bus = EventBus::new();
        let coordinator = SyncCoordinator::new(
            backend.clone(),
            PositionStore::new(kv.clone()),
            CommentStore::new(kv.clone()),
            bus.clone(),
        );
        Self {
            backend,
            coordinator,
            bus,
            kv,
        }
    }

    async fn loaded(backend: MemoryBackend) -> anyhow::Result<Self> {
        let fixture = Self::new(seeded(backend));
        fixture
            .coordinator
            .load_view(StructureType::Business, Some(ORG))
            .await?;
        fixture.bus.drain();
        Ok(fixture)
    }

    fn staff_record(&self, id: i64) -> StaffDto {
        self.backend
            .record(RecordRef::new(RecordKind::Staff, id))
            .and_then(|record| record.as_staff().cloned())
            .expect("staff record")
    }
}

fn has_failure(events: &[Event], wanted: MutationKind) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::MutationFailed { kind, .. } if *kind == wanted))
}

fn has_commit(events: &[Event], wanted: MutationKind) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::MutationCommitted { kind, .. } if *kind == wanted))
}

fn label(value: &str) -> NodePatch {
    NodePatch {
        label: Some(value.to_string()),
        ..NodePatch::default()
    }
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_view_builds_business_graph() -> anyhow::Result<()> {
    let fixture = Fixture::new(seeded(MemoryBackend::new()));
    let report = fixture
        .coordinator
        .load_view(StructureType::Business, Some(ORG))
        .await?;

    assert!(report.is_complete());
    assert_eq!(report.node_count, 5);
    assert_eq!(report.edge_count, 6);

    let snapshot = fixture.coordinator.snapshot();
    assert_eq!(snapshot.structure, StructureType::Business);
    let relation_edge = snapshot.edge(&EdgeId::from("20")).expect("relation edge");
    assert_eq!(relation_edge.relation_kind, RelationKind::Project);
    assert_eq!(relation_edge.label.as_deref(), Some("Quarterly launch"));

    assert_eq!(fixture.coordinator.administrative_edges().len(), 5);
    assert_eq!(fixture.coordinator.functional_edges().len(), 1);

    let sidorov = fixture.coordinator.node(&NodeId::from("staff_12")).expect("node");
    assert_eq!(sidorov.functional_connections.len(), 1);
    assert_eq!(sidorov.functional_connections[0].name, "Ivanov I.");
    assert_eq!(sidorov.tertiary_label.as_deref(), Some("Sales"));

    let events = fixture.bus.drain();
    assert_eq!(events.first(), Some(&Event::LoadingChanged { busy: true }));
    assert_eq!(events.last(), Some(&Event::LoadingChanged { busy: false }));
    assert!(events.contains(&Event::ViewLoaded {
        structure: StructureType::Business,
        node_count: 5,
        edge_count: 6,
    }));
    Ok(())
}

#[tokio::test]
async fn test_saved_positions_win_over_layout() -> anyhow::Result<()> {
    let fixture = Fixture::new(seeded(MemoryBackend::new()));
    PositionStore::new(fixture.kv.clone()).save(
        StructureType::Business,
        &[PositionRecord::new("staff_10", Vec2::new(5.0, 7.0))],
    )?;

    fixture
        .coordinator
        .load_view(StructureType::Business, Some(ORG))
        .await?;
    let positions = fixture.coordinator.positions();
    assert_eq!(positions[&NodeId::from("staff_10")], Vec2::new(5.0, 7.0));
    assert_ne!(positions[&NodeId::from("staff_11")], Vec2::new(5.0, 7.0));
    Ok(())
}

#[tokio::test]
async fn test_partial_fetch_failure_still_builds_graph() -> anyhow::Result<()> {
    let backend = seeded(MemoryBackend::new());
    backend.fail(BackendOp::List, RecordKind::FunctionalRelation);
    let fixture = Fixture::new(backend);

    let report = fixture
        .coordinator
        .load_view(StructureType::Business, Some(ORG))
        .await?;
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, RecordKind::FunctionalRelation);
    assert_eq!(report.node_count, 5);
    assert_eq!(report.edge_count, 5);

    let events = fixture.bus.drain();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::FetchFailed { collection, .. } if collection == "functional_relation"
    )));
    assert!(events.iter().any(|event| matches!(event, Event::ShowError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_load_legal_view_keeps_only_legal_entities() -> anyhow::Result<()> {
    let backend = MemoryBackend::new();
    backend.seed_all([
        organization(30, "Photomatrix", OrgType::LegalEntity, None),
        organization(31, "Photomatrix Service", OrgType::LegalEntity, Some(30)),
        organization(32, "Moscow office", OrgType::Location, None),
    ]);
    let fixture = Fixture::new(backend);

    let report = fixture.coordinator.load_view(StructureType::Legal, None).await?;
    assert_eq!(report.node_count, 2);
    let snapshot = fixture.coordinator.snapshot();
    let edge = snapshot.edge(&EdgeId::from("legal_edge_31")).expect("parent link");
    assert_eq!(edge.from.as_str(), "30");
    assert_eq!(edge.origin, EdgeOrigin::OrganizationParent { child: 31 });
    Ok(())
}

#[tokio::test]
async fn test_load_empty_organization() -> anyhow::Result<()> {
    let fixture = Fixture::new(MemoryBackend::new());

    let report = fixture
        .coordinator
        .load_view(StructureType::Business, Some(ORG))
        .await?;
    assert!(report.is_complete());
    assert_eq!(report.node_count, 0);
    assert_eq!(report.edge_count, 0);

    let snapshot = fixture.coordinator.snapshot();
    assert!(snapshot.nodes.is_empty());
    assert!(snapshot.edges.is_empty());
    let events = fixture.bus.drain();
    assert!(!events.iter().any(|event| matches!(event, Event::MutationFailed { .. })));
    Ok(())
}

// ============================================================================
// Node mutations
// ============================================================================

#[tokio::test]
async fn test_add_node_replaces_temporary_id() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;

    let draft = NodeDraft::new_at(StructureType::Business, Vec2::new(100.0, 40.0)).with_parent("div_2");
    let persisted = fixture.coordinator.add_node(draft).await?;
    assert_eq!(persisted.as_str(), "staff_21");

    let node = fixture.coordinator.node(&persisted).expect("created node");
    assert_eq!(node.origin, Some(RecordRef::new(RecordKind::Staff, 21)));
    assert_eq!(node.position, Vec2::new(100.0, 40.0));
    assert_eq!(node.comments.len(), 1);
    assert_eq!(node.comments[0].text, "New employee added");

    let snapshot = fixture.coordinator.snapshot();
    assert!(snapshot.nodes.iter().all(|node| !node.is_pending()));
    let edge = snapshot.edge(&EdgeId::from("staff_div_21")).expect("parent edge");
    assert_eq!(edge.from.as_str(), "div_2");
    assert_eq!(edge.origin, EdgeOrigin::StaffDivision { staff: 21 });

    assert_eq!(fixture.staff_record(21).division_id, Some(2));

    let events = fixture.bus.drain();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::NodeIdResolved { persisted, .. } if persisted.as_str() == "staff_21"
    )));
    assert!(has_commit(&events, MutationKind::AddNode));
    Ok(())
}

#[tokio::test]
async fn test_add_node_rolls_back_on_failure() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    fixture.backend.fail(BackendOp::Create, RecordKind::Staff);
    let before = fixture.coordinator.snapshot();

    let draft = NodeDraft::new_at(StructureType::Business, Vec2::ZERO).with_parent("div_2");
    let err = fixture.coordinator.add_node(draft).await.unwrap_err();
    assert!(matches!(err, SyncError::Backend(_)));
    assert!(!err.is_silent());

    assert_eq!(fixture.coordinator.snapshot(), before);
    assert!(has_failure(&fixture.bus.drain(), MutationKind::AddNode));
    Ok(())
}

#[tokio::test]
async fn test_update_node_sends_patched_record() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;

    fixture
        .coordinator
        .update_node(&NodeId::from("staff_10"), label("Smirnov Ivan"))
        .await?;
    let node = fixture.coordinator.node(&NodeId::from("staff_10")).expect("node");
    assert_eq!(node.label, "Smirnov Ivan");
    assert_eq!(fixture.staff_record(10).last_name, "Smirnov");
    assert_eq!(fixture.staff_record(10).division_id, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_update_node_rolls_back_on_failure() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    fixture.backend.fail(BackendOp::Update, RecordKind::Staff);

    let result = fixture
        .coordinator
        .update_node(&NodeId::from("staff_10"), label("Smirnov Ivan"))
        .await;
    assert!(result.is_err());

    let node = fixture.coordinator.node(&NodeId::from("staff_10")).expect("node");
    assert_eq!(node.label, "Ivanov I.");
    assert_eq!(fixture.staff_record(10).last_name, "Ivanov");
    assert!(has_failure(&fixture.bus.drain(), MutationKind::UpdateNode));
    Ok(())
}

#[tokio::test]
async fn test_delete_node_cascades_and_rolls_back() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    let before = fixture.coordinator.snapshot();
    let ivanov = NodeId::from("staff_10");

    fixture.backend.fail(BackendOp::Delete, RecordKind::Staff);
    assert!(fixture.coordinator.delete_node(&ivanov).await.is_err());
    assert_eq!(fixture.coordinator.snapshot(), before);

    fixture.backend.heal();
    fixture.coordinator.delete_node(&ivanov).await?;
    let snapshot = fixture.coordinator.snapshot();
    assert_eq!(snapshot.nodes.len(), 4);
    assert!(snapshot.edges.iter().all(|edge| !edge.touches(&ivanov)));

    let sidorov = snapshot.node(&NodeId::from("staff_12")).expect("node");
    assert!(sidorov.functional_connections.is_empty());
    assert!(
        fixture
            .backend
            .record(RecordRef::new(RecordKind::FunctionalRelation, 20))
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_missing_node_is_silent() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    let err = fixture
        .coordinator
        .delete_node(&NodeId::from("staff_999"))
        .await
        .unwrap_err();
    assert!(err.is_silent());
    assert!(fixture.bus.drain().iter().all(|event| !matches!(event, Event::MutationFailed { .. })));
    Ok(())
}

// ============================================================================
// Edge mutations
// ============================================================================

#[tokio::test]
async fn test_self_loop_is_rejected_without_side_effects() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    let before = fixture.coordinator.snapshot();
    let id = NodeId::from("staff_10");

    let err = fixture
        .coordinator
        .add_edge(&id, &id, RelationKind::Functional)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SelfLoop(_)));
    assert!(err.is_silent());
    assert_eq!(fixture.coordinator.snapshot(), before);
    assert!(fixture.bus.drain().is_empty());
    assert!(fixture.backend.calls().iter().all(|call| call.op != BackendOp::Create));
    Ok(())
}

#[tokio::test]
async fn test_staff_edge_creates_functional_relation() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;

    let id = fixture
        .coordinator
        .add_edge(
            &NodeId::from("staff_11"),
            &NodeId::from("staff_12"),
            RelationKind::Mentoring,
        )
        .await?;
    assert_eq!(id.as_str(), "21");

    let record = fixture
        .backend
        .record(RecordRef::new(RecordKind::FunctionalRelation, 21))
        .expect("relation record");
    let relation = record.as_relation().expect("relation");
    assert_eq!(relation.relation_type, "MENTORING");
    assert_eq!((relation.manager_id, relation.subordinate_id), (11, 12));

    let functional = fixture.coordinator.functional_edges();
    let edge = functional.iter().find(|edge| edge.id == id).expect("edge");
    assert_eq!(edge.origin, EdgeOrigin::Relation { id: 21 });

    let petrov = fixture.coordinator.node(&NodeId::from("staff_11")).expect("node");
    assert_eq!(petrov.functional_connections.len(), 1);
    assert_eq!(petrov.functional_connections[0].kind, RelationKind::Mentoring);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_edge_is_rolled_back() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    let before = fixture.coordinator.snapshot();

    let err = fixture
        .coordinator
        .add_edge(
            &NodeId::from("div_1"),
            &NodeId::from("staff_12"),
            RelationKind::Department,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Unsupported(_)));
    assert_eq!(fixture.coordinator.snapshot(), before);
    assert!(has_failure(&fixture.bus.drain(), MutationKind::AddEdge));
    Ok(())
}

#[tokio::test]
async fn test_delete_parent_link_clears_child_field() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;

    fixture
        .coordinator
        .delete_edge(&EdgeId::from("staff_manager_11"))
        .await?;
    let petrov = fixture.staff_record(11);
    assert_eq!(petrov.manager_id, None);
    assert_eq!(petrov.division_id, Some(2));
    assert!(
        fixture
            .coordinator
            .snapshot()
            .edge(&EdgeId::from("staff_manager_11"))
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_relation_edge_deletes_record() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;

    fixture.backend.fail(BackendOp::Delete, RecordKind::FunctionalRelation);
    assert!(fixture.coordinator.delete_edge(&EdgeId::from("20")).await.is_err());
    assert!(fixture.coordinator.snapshot().edge(&EdgeId::from("20")).is_some());

    fixture.backend.heal();
    fixture.coordinator.delete_edge(&EdgeId::from("20")).await?;
    assert!(
        fixture
            .backend
            .record(RecordRef::new(RecordKind::FunctionalRelation, 20))
            .is_none()
    );
    assert!(fixture.coordinator.functional_edges().is_empty());
    Ok(())
}

// ============================================================================
// Ordering and staleness
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_same_node_mutations_are_serialized() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;
    let id = NodeId::from("staff_10");

    let (first, second) = tokio::join!(
        fixture.coordinator.update_node(&id, label("Smirnov Ivan")),
        fixture.coordinator.update_node(&id, label("Kuznetsov Ivan")),
    );
    first?;
    second?;

    let updates: Vec<_> = fixture
        .backend
        .calls()
        .into_iter()
        .filter(|call| call.op == BackendOp::Update)
        .collect();
    assert_eq!(updates.len(), 2);
    assert!(updates[1].started >= updates[0].finished);
    assert_eq!(fixture.staff_record(10).last_name, "Kuznetsov");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_different_nodes_mutate_concurrently() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;

    let ivanov = NodeId::from("staff_10");
    let petrov = NodeId::from("staff_11");

    let (first, second) = tokio::join!(
        fixture.coordinator.update_node(&ivanov, label("Smirnov Ivan")),
        fixture.coordinator.update_node(&petrov, label("Orlov Petr")),
    );
    first?;
    second?;

    let updates: Vec<_> = fixture
        .backend
        .calls()
        .into_iter()
        .filter(|call| call.op == BackendOp::Update)
        .collect();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].started, updates[1].started);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_edge_delete_holds_endpoint_nodes() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;
    fixture.backend.fail(BackendOp::Delete, RecordKind::FunctionalRelation);
    let edge = EdgeId::from("20");
    let sidorov = NodeId::from("staff_12");

    let (edge_result, node_result) = tokio::join!(fixture.coordinator.delete_edge(&edge), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        fixture.coordinator.delete_node(&sidorov).await
    });
    assert!(edge_result.is_err());
    node_result?;

    let snapshot = fixture.coordinator.snapshot();
    assert!(!snapshot.contains_node(&sidorov));
    assert!(snapshot.edge(&edge).is_none());
    assert!(
        snapshot
            .edges
            .iter()
            .all(|edge| snapshot.contains_node(&edge.from) && snapshot.contains_node(&edge.to))
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_edge_and_update_on_pending_node_do_not_deadlock() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;
    let coordinator = &fixture.coordinator;
    let sidorov = NodeId::from("staff_12");

    let draft = NodeDraft::new_at(StructureType::Business, Vec2::ZERO);
    let queued = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let temporary = coordinator
            .snapshot()
            .nodes
            .into_iter()
            .find(|node| node.is_pending())
            .map(|node| node.id)
            .expect("pending node");
        tokio::join!(
            coordinator.add_edge(&temporary, &sidorov, RelationKind::Project),
            coordinator.update_node(&temporary, label("Kuznetsov Kirill")),
        )
    };
    let (created, (edge, updated)) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(coordinator.add_node(draft), queued) },
    )
    .await?;
    let persisted = created?;
    let edge = edge?;
    updated?;

    let snapshot = coordinator.snapshot();
    let edge = snapshot.edge(&edge).expect("relation edge");
    assert_eq!(edge.from, persisted);
    assert_eq!(edge.to, sidorov);
    assert_eq!(fixture.staff_record(21).last_name, "Kuznetsov");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_temporary_id_resolves_for_queued_calls() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;
    let coordinator = &fixture.coordinator;

    let draft = NodeDraft::new_at(StructureType::Business, Vec2::ZERO);
    let (created, renamed) = tokio::join!(coordinator.add_node(draft), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let temporary = coordinator
            .snapshot()
            .nodes
            .into_iter()
            .find(|node| node.is_pending())
            .map(|node| node.id)
            .expect("pending node");
        let result = coordinator.update_node(&temporary, label("Kuznetsov Kirill")).await;
        (temporary, result)
    });
    let persisted = created?;
    let (temporary, result) = renamed;
    result?;

    assert!(temporary.as_str().starts_with("tmp_"));
    assert_eq!(coordinator.resolve_node(&temporary), persisted);
    assert_eq!(coordinator.node(&temporary).map(|node| node.id), Some(persisted.clone()));
    assert_eq!(fixture.staff_record(21).last_name, "Kuznetsov");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new().with_latency(Duration::from_millis(100))).await?;
    let coordinator = &fixture.coordinator;

    let draft = NodeDraft::new_at(StructureType::Business, Vec2::ZERO);
    let (created, reloaded) = tokio::join!(coordinator.add_node(draft), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.load_view(StructureType::Business, Some(ORG)).await
    });
    assert!(matches!(created, Err(SyncError::Stale)));
    reloaded?;

    let snapshot = coordinator.snapshot();
    assert!(snapshot.nodes.iter().all(|node| !node.is_pending()));
    let events = fixture.bus.drain();
    assert!(!has_commit(&events, MutationKind::AddNode));
    assert!(!has_failure(&events, MutationKind::AddNode));
    Ok(())
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_comments_survive_reload() -> anyhow::Result<()> {
    let fixture = Fixture::loaded(MemoryBackend::new()).await?;
    let id = NodeId::from("staff_10");

    fixture.coordinator.add_comment(&id, "Prepare quarterly report")?;
    fixture.coordinator.add_comment(&id, "Review budget")?;
    let toggled = fixture.coordinator.toggle_comment(&id, 0)?;
    assert!(toggled.completed);

    let err = fixture.coordinator.add_comment(&id, "   ").unwrap_err();
    assert!(err.is_silent());
    assert!(fixture.coordinator.toggle_comment(&id, 5).is_err());

    fixture
        .coordinator
        .load_view(StructureType::Business, Some(ORG))
        .await?;
    let node = fixture.coordinator.node(&id).expect("node");
    let texts: Vec<&str> = node.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Prepare quarterly report", "Review budget"]);
    assert!(node.comments[0].completed);
    assert!(!node.comments[1].completed);
    Ok(())
}

proptest! {
    #[test]
    fn prop_self_loops_never_change_state(index in 0usize..5) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let fixture = Fixture::loaded(MemoryBackend::new()).await.unwrap();
            let before = fixture.coordinator.snapshot();
            let id = before.nodes[index].id.clone();
            for kind in RelationKind::ALL {
                let result = fixture.coordinator.add_edge(&id, &id, kind).await;
                prop_assert!(matches!(result, Err(SyncError::SelfLoop(_))));
            }
            prop_assert_eq!(fixture.coordinator.snapshot(), before);
            Ok(())
        })?;
    }
}
