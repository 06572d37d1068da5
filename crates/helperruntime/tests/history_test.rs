mod common;

use common::test_graph;
use helpercore::{FieldRef, Position};
use helperruntime::{Connect, Create, Delete, History, Move, SetOption};

#[test]
fn test_undo_redo_reproduces_dataset() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "seed").unwrap();
    let mut history = History::new();

    let create = Create::new("double", Position::new(40.0, 10.0));
    let created = create.id().to_string();
    history.perform(&mut graph, Box::new(create)).unwrap();

    let connect = Connect::new(
        &graph,
        FieldRef::new(created.clone(), "value"),
        Some(FieldRef::new("seed", "value")),
    ).unwrap();
    history.perform(&mut graph, Box::new(connect)).unwrap();
    let edited = graph.dataset();

    assert!(history.undo(&mut graph).unwrap());
    assert!(history.undo(&mut graph).unwrap());
    assert!(!graph.contains(&created));
    assert!(graph.record("seed").unwrap().output.is_empty());

    assert!(history.redo(&mut graph).unwrap());
    assert!(history.redo(&mut graph).unwrap());
    assert_eq!(graph.dataset(), edited);
}

#[test]
fn test_undo_and_redo_at_the_ends_do_nothing() {
    let mut graph = test_graph();
    let mut history = History::new();

    assert!(!history.undo(&mut graph).unwrap());
    assert!(!history.redo(&mut graph).unwrap());

    history.perform(&mut graph, Box::new(Create::new("constant", Position::default()))).unwrap();

    assert!(!history.redo(&mut graph).unwrap());
    assert!(history.can_undo());
}

#[test]
fn test_record_discards_redo_branch() {
    let mut graph = test_graph();
    let mut history = History::new();

    history.perform(&mut graph, Box::new(Create::new("constant", Position::default()))).unwrap();
    history.perform(&mut graph, Box::new(Create::new("double", Position::default()))).unwrap();
    history.undo(&mut graph).unwrap();
    assert!(history.can_redo());

    history.perform(&mut graph, Box::new(Create::new("sum", Position::default()))).unwrap();

    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);
    assert_eq!(graph.nodes_of_type("double").count(), 0);
    assert_eq!(graph.nodes_of_type("sum").count(), 1);
}

#[test]
fn test_record_does_not_execute() {
    let mut graph = test_graph();
    let mut history = History::new();

    history.record(Box::new(Create::new("constant", Position::default())));

    assert!(graph.is_empty());
    assert!(history.undo(&mut graph).unwrap());
    assert!(history.redo(&mut graph).unwrap());
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_delete_undo_restores_every_connection() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("constant", "b").unwrap();
    graph.create_node_with_id("sum", "s").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    graph.create_node_with_id("sink", "out").unwrap();
    graph.set_position("s", Position::new(3.0, 4.0)).unwrap();
    graph.connect("a", "value", "s", "left").unwrap();
    graph.connect("b", "value", "s", "right").unwrap();
    graph.connect("s", "value", "d", "value").unwrap();
    graph.connect("s", "value", "out", "value").unwrap();
    let before = graph.dataset();
    let mut history = History::new();

    let delete = Delete::new(&graph, "s").unwrap();
    history.perform(&mut graph, Box::new(delete)).unwrap();
    assert!(!graph.contains("s"));
    assert!(graph.record("a").unwrap().output.is_empty());
    assert!(graph.record("d").unwrap().input.is_empty());

    history.undo(&mut graph).unwrap();

    assert_eq!(graph.dataset(), before);
}

#[test]
fn test_move_swaps_position() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.set_position("a", Position::new(1.0, 2.0)).unwrap();
    let mut history = History::new();

    let action = Move::new(&graph, "a", Position::new(50.0, 60.0)).unwrap();
    history.perform(&mut graph, Box::new(action)).unwrap();
    assert_eq!(graph.get_node("a").unwrap().position(), Position::new(50.0, 60.0));

    history.undo(&mut graph).unwrap();
    assert_eq!(graph.get_node("a").unwrap().position(), Position::new(1.0, 2.0));
}

#[test]
fn test_connect_undo_restores_prior_supplier() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "old").unwrap();
    graph.create_node_with_id("constant", "new").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    graph.connect("old", "value", "d", "value").unwrap();
    let before = graph.dataset();
    let mut history = History::new();

    let action = Connect::new(&graph, FieldRef::new("d", "value"), Some(FieldRef::new("new", "value"))).unwrap();
    history.perform(&mut graph, Box::new(action)).unwrap();
    assert_eq!(graph.supplier("d", "value"), Some(FieldRef::new("new", "value")));

    history.undo(&mut graph).unwrap();
    assert_eq!(graph.dataset(), before);
}

#[test]
fn test_connect_to_nothing_disconnects() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    graph.connect("a", "value", "d", "value").unwrap();
    let mut history = History::new();

    let action = Connect::new(&graph, FieldRef::new("d", "value"), None).unwrap();
    history.perform(&mut graph, Box::new(action)).unwrap();
    assert_eq!(graph.supplier("d", "value"), None);

    history.undo(&mut graph).unwrap();
    assert_eq!(graph.supplier("d", "value"), Some(FieldRef::new("a", "value")));
}

#[test]
fn test_set_option_undo_restores_unset_state() {
    let mut graph = test_graph();
    graph.create_node_with_id("pass", "p").unwrap();
    let before = graph.dataset();
    let mut history = History::new();

    let action = SetOption::new(&graph, "p", "label", "renamed").unwrap();
    history.perform(&mut graph, Box::new(action)).unwrap();
    assert_eq!(graph.get_node("p").unwrap().option("label"), "renamed");

    history.undo(&mut graph).unwrap();
    assert_eq!(graph.dataset(), before);

    history.redo(&mut graph).unwrap();
    assert_eq!(graph.get_node("p").unwrap().explicit_option("label"), Some("renamed"));
}

#[test]
fn test_failed_perform_is_not_recorded() {
    let mut graph = test_graph();
    graph.create_node_with_id("text", "t").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    let mut history = History::new();

    let action = Connect::new(&graph, FieldRef::new("d", "value"), Some(FieldRef::new("t", "text"))).unwrap();
    let result = history.perform(&mut graph, Box::new(action));

    assert!(result.is_err());
    assert!(history.is_empty());
}
