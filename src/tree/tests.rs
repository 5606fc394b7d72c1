//! Tests for the variation diff data model.

use super::*;

fn line(n: i32) -> DiffLineNumber {
    DiffLineNumber::new(n, n, n)
}

fn var(name: &str) -> Formula {
    Formula::var(name)
}

fn add(
    diff: &mut VariationDiff,
    parent: NodeId,
    diff_type: DiffType,
    node_type: NodeType,
    start: i32,
    formula: Option<Formula>,
) -> NodeId {
    let id = diff
        .create_node(
            diff_type,
            node_type,
            line(start).restrict_to(diff_type),
            line(start + 1).restrict_to(diff_type),
            formula,
            vec![format!("line {}", start)],
        )
        .unwrap();
    diff.add_below(id, parent, parent).unwrap();
    id
}

/// root -> IF A -> ELIF B -> ELSE -> { artifact, IF C }
fn chain() -> (VariationDiff, [NodeId; 5]) {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let non = DiffType::Unchanged;
    let if_a = add(&mut diff, root, non, NodeType::If, 1, Some(var("A")));
    let elif_b = add(&mut diff, if_a, non, NodeType::Elif, 2, Some(var("B")));
    let else_ = add(&mut diff, elif_b, non, NodeType::Else, 3, None);
    let code = add(&mut diff, else_, non, NodeType::Artifact, 4, None);
    let if_c = add(&mut diff, else_, non, NodeType::If, 5, Some(var("C")));
    (diff, [if_a, elif_b, else_, code, if_c])
}

#[test]
fn test_new_diff_has_only_the_root() {
    let diff = VariationDiff::new();
    let root = diff.node(diff.root());

    assert_eq!(diff.node_count(), 1);
    assert!(root.is_if());
    assert_eq!(root.diff_type(), DiffType::Unchanged);
    assert_eq!(root.formula(), Some(&Formula::True));
    assert_eq!(root.parent(Time::Before), None);
    assert_eq!(root.parent(Time::After), None);
    assert_eq!(root.id(), 16);
    assert!(diff.check_consistency().is_ok());
}

#[test]
fn test_add_below_links_only_existing_times() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let added = add(&mut diff, root, DiffType::Added, NodeType::Artifact, 1, None);
    let removed = add(&mut diff, root, DiffType::Removed, NodeType::Artifact, 2, None);
    let unchanged = add(&mut diff, root, DiffType::Unchanged, NodeType::Artifact, 3, None);

    assert_eq!(diff.parent(added, Time::Before), None);
    assert_eq!(diff.parent(added, Time::After), Some(root));
    assert_eq!(diff.parent(removed, Time::Before), Some(root));
    assert_eq!(diff.parent(removed, Time::After), None);
    assert_eq!(diff.children(root, Time::Before), &[removed, unchanged]);
    assert_eq!(diff.children(root, Time::After), &[added, unchanged]);
    assert_eq!(diff.all_children(root), vec![removed, unchanged, added]);
    assert!(diff.check_consistency().is_ok());
}

#[test]
fn test_add_child_rejects_invalid_edges() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let added = add(&mut diff, root, DiffType::Added, NodeType::Artifact, 1, None);

    assert_eq!(
        diff.add_child(root, added, Time::Before),
        Err(ConsistencyError::NotExistingAt {
            node: added,
            time: Time::Before
        })
    );
    assert_eq!(
        diff.add_child(root, added, Time::After),
        Err(ConsistencyError::AlreadyHasParent {
            node: added,
            time: Time::After
        })
    );
    assert_eq!(
        diff.add_child(added, root, Time::After),
        Err(ConsistencyError::RootHasParent)
    );
}

#[test]
fn test_create_node_requires_formula_exactly_for_conditions() {
    let mut diff = VariationDiff::new();
    let from = line(1);

    let missing = diff.create_node(DiffType::Added, NodeType::If, from, from, None, vec![]);
    assert!(matches!(
        missing,
        Err(ConsistencyError::FormulaMismatch { expected: true, .. })
    ));

    let extra = diff.create_node(
        DiffType::Added,
        NodeType::Else,
        from,
        from,
        Some(var("A")),
        vec![],
    );
    assert!(matches!(
        extra,
        Err(ConsistencyError::FormulaMismatch { expected: false, .. })
    ));
    assert_eq!(diff.node_count(), 1);
}

#[test]
fn test_remove_child_detaches_both_directions() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let node = add(&mut diff, root, DiffType::Unchanged, NodeType::Artifact, 1, None);

    assert!(diff.remove_child(root, node, Time::Before));
    assert!(!diff.remove_child(root, node, Time::Before));
    assert_eq!(diff.parent(node, Time::Before), None);
    assert!(diff.children(root, Time::Before).is_empty());

    // unchanged node with only an after-parent
    assert!(matches!(
        diff.check_consistency(),
        Err(ConsistencyError::ParentsContradictDiffType { .. })
    ));
}

#[test]
fn test_check_consistency_rejects_else_below_artifact() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let code = add(&mut diff, root, DiffType::Unchanged, NodeType::Artifact, 1, None);
    let else_ = add(&mut diff, code, DiffType::Unchanged, NodeType::Else, 2, None);

    assert_eq!(
        diff.check_consistency(),
        Err(ConsistencyError::InvalidChainParent {
            node: else_,
            node_type: NodeType::Else,
            time: Time::Before,
        })
    );
}

#[test]
fn test_preorder_depth_and_if_node() {
    let (diff, [if_a, elif_b, else_, code, if_c]) = chain();
    let root = diff.root();

    assert_eq!(
        diff.preorder(Time::Before),
        vec![root, if_a, elif_b, else_, code, if_c]
    );
    assert_eq!(diff.preorder(Time::After), diff.preorder(Time::Before));
    assert_eq!(diff.preorder_all().len(), diff.node_count());

    assert_eq!(diff.depth(root, Time::After), Some(0));
    assert_eq!(diff.depth(code, Time::After), Some(4));
    assert_eq!(diff.if_node(code, Time::Before), Some(if_a));
    assert_eq!(diff.if_node(if_c, Time::Before), Some(if_c));
    assert!(diff.node(code).is_leaf());
    assert!(!diff.node(else_).is_leaf());
}

#[test]
fn test_preorder_separates_timelines() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let added_if = add(&mut diff, root, DiffType::Added, NodeType::If, 1, Some(var("A")));
    let moved = diff
        .create_node(
            DiffType::Unchanged,
            NodeType::Artifact,
            line(2),
            line(3),
            None,
            vec![],
        )
        .unwrap();
    diff.add_below(moved, root, added_if).unwrap();

    assert_eq!(diff.preorder(Time::Before), vec![root, moved]);
    assert_eq!(diff.preorder(Time::After), vec![root, added_if, moved]);
    assert_eq!(diff.depth(moved, Time::Before), Some(1));
    assert_eq!(diff.depth(moved, Time::After), Some(2));
    assert_eq!(diff.depth(added_if, Time::Before), None);
    assert!(diff.check_consistency().is_ok());
}

#[test]
fn test_feature_mappings_of_a_chain() {
    let (diff, [if_a, elif_b, else_, code, _]) = chain();
    let t = Time::After;

    assert_eq!(diff.feature_mapping(if_a, t), Some(var("A")));
    assert_eq!(
        diff.feature_mapping(elif_b, t),
        Some(Formula::And(vec![var("B"), Formula::not(var("A"))]))
    );
    let else_mapping = Formula::And(vec![Formula::not(var("B")), Formula::not(var("A"))]);
    assert_eq!(diff.feature_mapping(else_, t), Some(else_mapping.clone()));
    assert_eq!(diff.feature_mapping(code, t), Some(else_mapping));
}

#[test]
fn test_presence_conditions_include_outer_nesting() {
    let (diff, [if_a, _, else_, code, if_c]) = chain();
    let t = Time::Before;
    let not_a = Formula::not(var("A"));
    let not_b = Formula::not(var("B"));

    assert_eq!(
        diff.presence_condition(if_a, t),
        Some(Formula::And(vec![Formula::True, var("A")]))
    );
    let else_condition = vec![not_b.clone(), not_a.clone(), Formula::True];
    assert_eq!(
        diff.presence_condition(else_, t),
        Some(Formula::And(else_condition.clone()))
    );
    assert_eq!(
        diff.presence_condition(code, t),
        Some(Formula::And(else_condition))
    );
    assert_eq!(
        diff.presence_condition(if_c, t),
        Some(Formula::And(vec![not_b, not_a, Formula::True, var("C")]))
    );
    assert_eq!(diff.presence_condition(diff.root(), t), Some(Formula::True));
}

#[test]
fn test_projections_of_missing_nodes_are_none() {
    let mut diff = VariationDiff::new();
    let root = diff.root();
    let added = add(&mut diff, root, DiffType::Added, NodeType::Artifact, 1, None);

    assert_eq!(diff.feature_mapping(added, Time::Before), None);
    assert_eq!(diff.presence_condition(added, Time::Before), None);
    assert_eq!(diff.feature_mapping(added, Time::After), Some(Formula::True));
}

#[test]
fn test_packed_ids_round_trip() {
    for node_type in NodeType::ALL {
        for diff_type in DiffType::ALL {
            for from_in_diff in [-1, 0, 1, 41, 100_000] {
                let id = DecodedId::encode(node_type, diff_type, from_in_diff);
                let decoded = DecodedId::decode(id).unwrap();
                assert_eq!(decoded.node_type, node_type);
                assert_eq!(decoded.diff_type, diff_type);
                assert_eq!(decoded.from_in_diff, from_in_diff);
                assert_eq!(decoded.id(), id);
            }
        }
    }
}

#[test]
fn test_packed_id_layout() {
    // line 3 -> (3 + 1) << 6, REMOVED = 1 << 3, ELIF = 2
    assert_eq!(DecodedId::encode(NodeType::Elif, DiffType::Removed, 3), 256 + 8 + 2);
    // ordinal 7 is neither a node type nor a diff type
    assert_eq!(DecodedId::decode(7), None);
    assert_eq!(DecodedId::decode(7 << 3), None);
}

#[test]
fn test_node_type_keywords_and_tags() {
    assert_eq!(NodeType::from_keyword("if"), Some(NodeType::If));
    assert_eq!(NodeType::from_keyword("elif"), Some(NodeType::Elif));
    assert_eq!(NodeType::from_keyword("else"), Some(NodeType::Else));
    assert_eq!(NodeType::from_keyword("endif"), None);
    assert!(NodeType::Else.is_annotation());
    assert!(!NodeType::Else.is_conditional_annotation());
    assert!(!NodeType::Artifact.is_annotation());
    for node_type in NodeType::ALL {
        assert_eq!(NodeType::from_tag(node_type.as_str()), Some(node_type));
    }
}
