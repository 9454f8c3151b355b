use stemma_core::{
    AttributePatch, Edge, Error, GraphModel, GraphSnapshot, Node, PersonAttributes, Point, Relation,
};

fn person(id: &str, label: &str) -> Node {
    Node::new(
        id,
        PersonAttributes {
            label: label.to_string(),
            family_name: "Doe".to_string(),
            ..Default::default()
        },
    )
}

fn parent_child(id: &str, source: &str, target: &str) -> Edge {
    Edge::new(id, source, target, Relation::ParentChild)
}

#[test]
fn add_node_inserts_node_and_edges_atomically() {
    let mut g = GraphModel::new();
    g.add_node(person("r", "Root"), vec![]).unwrap();
    g.add_node(person("c", "Child"), vec![parent_child("e1", "r", "c")])
        .unwrap();

    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn add_node_rejects_edges_referencing_unknown_nodes() {
    let mut g = GraphModel::new();
    g.add_node(person("r", "Root"), vec![]).unwrap();

    let err = g
        .add_node(person("c", "Child"), vec![parent_child("e1", "ghost", "c")])
        .unwrap_err();
    assert!(matches!(err, Error::UnknownNode { id } if id == "ghost"));

    // Nothing was applied.
    assert_eq!(g.node_count(), 1);
    assert_eq!(g.edge_count(), 0);
    assert!(!g.contains_node("c"));
}

#[test]
fn add_node_accepts_edges_touching_the_node_being_added() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();
    g.add_node(
        person("b", "B"),
        vec![Edge::new("s1", "a", "b", Relation::Spouse)],
    )
    .unwrap();

    assert_eq!(g.spouse_of("a"), Some("b"));
    assert_eq!(g.spouse_of("b"), Some("a"));
}

#[test]
fn connect_rejects_unknown_endpoints() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();

    let err = g.connect("a", "ghost", Relation::ParentChild).unwrap_err();
    assert!(matches!(err, Error::UnknownNode { id } if id == "ghost"));
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn connect_rejects_a_second_spouse_edge() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();
    g.add_node(person("b", "B"), vec![]).unwrap();
    g.add_node(person("c", "C"), vec![]).unwrap();
    g.connect("a", "b", Relation::Spouse).unwrap();

    let err = g.connect("a", "c", Relation::Spouse).unwrap_err();
    assert!(matches!(err, Error::SpouseConflict { id } if id == "a"));

    // The existing pairing is untouched.
    assert_eq!(g.spouse_of("a"), Some("b"));
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn update_node_attributes_merges_only_provided_fields() {
    let mut g = GraphModel::new();
    let mut node = person("a", "A");
    node.attributes.notes = "keep me".to_string();
    g.add_node(node, vec![]).unwrap();

    g.update_node_attributes(
        "a",
        AttributePatch {
            label: Some("Alice".to_string()),
            tags: Some(vec!["Living".to_string(), "Root".to_string()]),
            ..Default::default()
        },
    )
    .unwrap();

    let node = g.node("a").unwrap();
    assert_eq!(node.attributes.label, "Alice");
    assert_eq!(node.attributes.notes, "keep me");
    assert_eq!(node.attributes.tags_joined(), "Living, Root");
}

#[test]
fn update_node_attributes_fails_on_absent_id() {
    let mut g = GraphModel::new();
    let err = g
        .update_node_attributes("ghost", AttributePatch::default())
        .unwrap_err();
    assert!(matches!(err, Error::NodeNotFound { id } if id == "ghost"));
}

#[test]
fn update_node_attributes_does_not_touch_positions() {
    let mut g = GraphModel::new();
    let node = person("a", "A").with_manual_position(Point::new(10.0, 20.0));
    g.add_node(node, vec![]).unwrap();

    g.update_node_attributes(
        "a",
        AttributePatch {
            label: Some("Moved?".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let node = g.node("a").unwrap();
    assert_eq!(node.position, Point::new(10.0, 20.0));
    assert_eq!(node.manual_position, Some(Point::new(10.0, 20.0)));
}

#[test]
fn delete_node_cascades_to_incident_edges() {
    let mut g = GraphModel::new();
    g.add_node(person("r", "Root"), vec![]).unwrap();
    g.add_node(person("c", "Child"), vec![parent_child("e1", "r", "c")])
        .unwrap();
    g.add_node(person("g", "Grandchild"), vec![parent_child("e2", "c", "g")])
        .unwrap();

    assert!(g.delete_node("c"));
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn delete_node_is_a_noop_on_absent_id() {
    let mut g = GraphModel::new();
    g.add_node(person("r", "Root"), vec![]).unwrap();
    assert!(!g.delete_node("ghost"));
    assert_eq!(g.node_count(), 1);
}

#[test]
fn set_manual_position_pins_and_moves_the_node() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();
    g.set_manual_position("a", Point::new(400.0, 50.0)).unwrap();

    let node = g.node("a").unwrap();
    assert_eq!(node.position, Point::new(400.0, 50.0));
    assert_eq!(node.manual_position, Some(Point::new(400.0, 50.0)));
}

#[test]
fn clearing_a_pin_lets_automatic_positions_apply_again() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();
    g.set_manual_position("a", Point::new(400.0, 50.0)).unwrap();

    let mut positions = rustc_hash::FxHashMap::default();
    positions.insert("a".to_string(), Point::new(10.0, 20.0));

    // Pinned: the automatic position is ignored.
    g.apply_positions(&positions);
    assert_eq!(g.node("a").unwrap().position, Point::new(400.0, 50.0));

    g.clear_manual_position("a").unwrap();
    g.apply_positions(&positions);
    assert_eq!(g.node("a").unwrap().position, Point::new(10.0, 20.0));
}

#[test]
fn set_collapsed_is_idempotent_where_toggle_flips() {
    let mut g = GraphModel::new();
    g.add_node(person("a", "A"), vec![]).unwrap();

    g.set_collapsed("a", true).unwrap();
    g.set_collapsed("a", true).unwrap();
    assert!(g.node("a").unwrap().attributes.collapsed);

    assert!(!g.toggle_collapsed("a").unwrap());
    assert!(g.toggle_collapsed("a").unwrap());
}

#[test]
fn snapshot_restore_round_trips_without_derived_fields() {
    let mut g = GraphModel::new();
    g.add_node(person("r", "Root"), vec![]).unwrap();
    g.add_node(person("c", "Child"), vec![parent_child("e1", "r", "c")])
        .unwrap();
    g.toggle_collapsed("r").unwrap();

    let mut levels = rustc_hash::FxHashMap::default();
    levels.insert("c".to_string(), 7);
    g.apply_levels(&levels);

    let snapshot = GraphSnapshot::capture(&g);

    let mut restored = GraphModel::new();
    restored.restore(&snapshot);

    // User state survives; derived level comes back zeroed.
    assert!(restored.node("r").unwrap().attributes.collapsed);
    assert_eq!(restored.node("c").unwrap().level, 0);
    assert_eq!(restored.edge_count(), 1);
    assert_eq!(GraphSnapshot::capture(&restored).nodes, snapshot.nodes);
}

#[test]
fn persisted_view_serializes_camel_case_without_derived_fields() {
    let mut g = GraphModel::new();
    let mut node = person("a", "A");
    node.attributes.date_of_birth = "01-02-1934".to_string();
    node.level = 3;
    g.add_node(node, vec![]).unwrap();

    let snapshot = GraphSnapshot::capture(&g);
    let json = serde_json::to_value(&snapshot).unwrap();
    let node = &json["nodes"][0];

    assert_eq!(node["kind"], "person");
    assert_eq!(node["attributes"]["dateOfBirth"], "01-02-1934");
    assert!(node.get("level").is_none());
    assert!(node["attributes"].get("level").is_none());
    assert!(node.get("manualPosition").is_none());
}
