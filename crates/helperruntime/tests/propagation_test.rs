mod common;

use common::test_graph;
use helpercore::{GraphError, NodeStatus, Value, WalkEventKind};

#[tokio::test]
async fn test_walk_doubles_bootstrapper_value() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "five").unwrap();
    graph.create_node_with_id("double", "twice").unwrap();
    graph.create_node_with_id("sink", "out").unwrap();
    graph.connect("five", "value", "twice", "value").unwrap();
    graph.connect("twice", "value", "out", "value").unwrap();

    let summary = graph.walk().await.unwrap();

    assert_eq!(summary.bootstrappers, 1);
    assert_eq!(summary.processed, 3);
    assert_eq!(graph.get_node("twice").unwrap().input("value"), Some(&Value::Number(5.0)));
    assert_eq!(graph.get_node("out").unwrap().input("value"), Some(&Value::Number(10.0)));
}

#[tokio::test]
async fn test_node_waits_for_every_required_input() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("sum", "s").unwrap();
    graph.connect("a", "value", "s", "left").unwrap();

    graph.walk().await.unwrap();

    let sum = graph.get_node("s").unwrap();
    assert_eq!(sum.status(), NodeStatus::Partial);
    assert!(sum.outputs().is_empty());
}

#[tokio::test]
async fn test_optional_input_does_not_block() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("constant", "b").unwrap();
    graph.create_node_with_id("sum", "s").unwrap();
    graph.set_option("b", "value", "1").unwrap();
    graph.connect("a", "value", "s", "left").unwrap();
    graph.connect("b", "value", "s", "right").unwrap();

    graph.walk().await.unwrap();

    let sum = graph.get_node("s").unwrap();
    assert_eq!(sum.status(), NodeStatus::Complete);
    assert_eq!(sum.output("value"), Some(&Value::Number(6.0)));
}

#[tokio::test]
async fn test_failure_aborts_only_its_cascade() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "bad-seed").unwrap();
    graph.create_node_with_id("fail", "broken").unwrap();
    graph.create_node_with_id("sink", "never").unwrap();
    graph.connect("bad-seed", "value", "broken", "value").unwrap();
    graph.connect("broken", "value", "never", "value").unwrap();

    graph.create_node_with_id("constant", "good-seed").unwrap();
    graph.create_node_with_id("double", "twice").unwrap();
    graph.connect("good-seed", "value", "twice", "value").unwrap();

    let result = graph.walk().await;

    match result {
        Err(GraphError::Processing { node_id, node_type, .. }) => {
            assert_eq!(node_id, "broken");
            assert_eq!(node_type, "fail");
        }
        other => panic!("expected processing failure, got {:?}", other),
    }
    assert_eq!(graph.get_node("bad-seed").unwrap().output("value"), Some(&Value::Number(5.0)));
    assert_eq!(graph.get_node("never").unwrap().input("value"), None);
    assert_eq!(graph.get_node("twice").unwrap().output("value"), Some(&Value::Number(10.0)));
}

#[tokio::test]
async fn test_bad_option_surfaces_as_processing_failure() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.set_option("a", "value", "not a number").unwrap();

    let result = graph.walk().await;

    assert!(matches!(result, Err(GraphError::Processing { .. })));
}

#[tokio::test]
async fn test_rewalk_replaces_previous_values() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    graph.connect("a", "value", "d", "value").unwrap();

    graph.walk().await.unwrap();
    graph.set_option("a", "value", "21").unwrap();
    graph.walk().await.unwrap();

    assert_eq!(graph.get_node("d").unwrap().output("value"), Some(&Value::Number(42.0)));
}

#[tokio::test]
async fn test_entry_seed_reaches_consumers() {
    let mut graph = test_graph();
    graph.create_node_with_id("pass", "p").unwrap();
    graph.create_node_with_id("sink", "out").unwrap();
    graph.connect("p", "value", "out", "value").unwrap();
    graph.set_input("p", "value", "seeded").unwrap();

    let processed = graph.propagate("p").await.unwrap();

    assert_eq!(processed, 2);
    assert_eq!(graph.get_node("out").unwrap().input("value"), Some(&Value::from("seeded")));
}

#[tokio::test]
async fn test_walk_emits_events() {
    let mut graph = test_graph();
    graph.create_node_with_id("constant", "a").unwrap();
    graph.create_node_with_id("double", "d").unwrap();
    graph.connect("a", "value", "d", "value").unwrap();
    let mut events = graph.subscribe_events();

    graph.walk().await.unwrap();

    let mut completed = Vec::new();
    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        match event.kind {
            WalkEventKind::NodeCompleted { node_id, .. } => completed.push(node_id),
            WalkEventKind::Finished { success, processed, .. } => {
                assert!(success);
                assert_eq!(processed, 2);
                finished = true;
            }
            _ => {}
        }
    }
    assert_eq!(completed, vec!["a".to_string(), "d".to_string()]);
    assert!(finished);
}
