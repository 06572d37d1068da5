mod common;

use common::{empty_fetcher, MemoryFetcher, EMPTY_PAGE, SEARCH_PAGE};
use helpercore::{GraphError, HelperDefinition, NodeRecord};
use helpernodes::{
    courier_registry, load_definition, player_registry, save_definition, Courier, MediaBinding, MediaResult,
    Player,
};
use std::sync::Arc;

const BUNNY_SEARCH: &str = "https://media.test/search?q=big%20buck";
const NOTHING_SEARCH: &str = "https://media.test/search?q=nothing";

fn build_courier(fetcher: Arc<MemoryFetcher>) -> Courier {
    let mut courier = Courier::new("media.test", Arc::new(courier_registry(fetcher)));
    let graph = courier.graph_mut();

    for (node_type, id) in [
        ("request", "req"),
        ("convert", "enc"),
        ("string-create", "base"),
        ("string-join", "address"),
        ("content", "page"),
        ("selector", "hit"),
        ("property", "href"),
        ("property", "label"),
        ("mediaUrl", "out"),
        ("mediaTitle", "title"),
    ] {
        graph.create_node_with_id(node_type, id).unwrap();
    }

    graph.set_option("base", "value", "https://media.test/search?q=").unwrap();
    graph.set_option("hit", "selectors", "a.result").unwrap();
    graph.set_option("href", "key", "href").unwrap();
    graph.set_option("label", "key", "textContent").unwrap();

    graph.connect("req", "query", "enc", "text").unwrap();
    graph.connect("base", "value", "address", "left").unwrap();
    graph.connect("enc", "result", "address", "right").unwrap();
    graph.connect("address", "result", "page", "url").unwrap();
    graph.connect("page", "root", "hit", "root").unwrap();
    graph.connect("hit", "found", "href", "target").unwrap();
    graph.connect("hit", "found", "label", "target").unwrap();
    graph.connect("href", "value", "out", "url").unwrap();
    graph.connect("label", "value", "title", "title").unwrap();

    courier
}

fn fetcher() -> Arc<MemoryFetcher> {
    Arc::new(
        MemoryFetcher::default()
            .with_page(BUNNY_SEARCH, SEARCH_PAGE)
            .with_page(NOTHING_SEARCH, EMPTY_PAGE),
    )
}

#[tokio::test]
async fn test_courier_finds_media() {
    let fetcher = fetcher();
    let mut courier = build_courier(Arc::clone(&fetcher));

    let found = courier.find("big buck").await.unwrap();

    assert_eq!(
        found,
        Some(MediaResult {
            url: "https://media.test/watch/42".to_string(),
            title: Some("Big Buck Bunny".to_string()),
        })
    );
    assert_eq!(fetcher.requests(), vec![BUNNY_SEARCH.to_string()]);
}

#[tokio::test]
async fn test_courier_forgets_previous_results() {
    let mut courier = build_courier(fetcher());

    assert!(courier.find("big buck").await.unwrap().is_some());
    assert_eq!(courier.find("nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_courier_surfaces_fetch_failures() {
    let mut courier = build_courier(fetcher());

    let result = courier.find("unknown").await;

    assert!(matches!(result, Err(GraphError::Processing { ref node_id, .. }) if node_id == "page"));
}

#[tokio::test]
async fn test_courier_definition_survives_storage() {
    let fetcher = fetcher();
    let courier = build_courier(Arc::clone(&fetcher));
    let definition = courier.definition();
    let path = std::env::temp_dir().join(format!("helper-courier-{}.json", std::process::id()));

    save_definition(&path, &definition).await.unwrap();
    let loaded = load_definition(&path).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, definition);

    let mut restored = Courier::from_definition(&loaded, Arc::new(courier_registry(fetcher))).unwrap();
    assert_eq!(restored.name(), "media.test");
    assert_eq!(restored.graph().len(), 10);
    let found = restored.find("big buck").await.unwrap().unwrap();
    assert_eq!(found.url, "https://media.test/watch/42");
}

#[test]
fn test_courier_rejects_unknown_node_types() {
    let mut definition = HelperDefinition::new("broken");
    definition.nodes.insert("x".to_string(), NodeRecord::new("teleport"));

    let result = Courier::from_definition(&definition, Arc::new(courier_registry(empty_fetcher())));

    assert!(matches!(result, Err(GraphError::UnknownNodeType(ref t)) if t == "teleport"));
}

fn build_player(name: &str, pattern: &str) -> Player {
    let mut player = Player::new(name, Arc::new(player_registry(empty_fetcher())));
    let graph = player.graph_mut();

    graph.create_node_with_id("player", "page").unwrap();
    graph.create_node_with_id("string-create", "media").unwrap();
    graph.create_node_with_id("string-create", "ads").unwrap();
    graph.create_node_with_id("player.result", "result").unwrap();

    graph.set_option("media", "value", "video.main").unwrap();
    graph.set_option("ads", "value", "div.ad, iframe.promo").unwrap();
    graph.set_option("result", "urlPattern", pattern).unwrap();
    graph.connect("media", "value", "result", "mediaSelectors").unwrap();
    graph.connect("ads", "value", "result", "adSelectors").unwrap();

    player
}

#[tokio::test]
async fn test_player_binding() {
    let mut player = build_player("media.test", r"^https://media\.test/watch/");

    let binding = player.binding("https://media.test/watch/42").await.unwrap();

    assert_eq!(
        binding,
        Some(MediaBinding {
            media_selectors: "video.main".to_string(),
            ad_selectors: Some("div.ad, iframe.promo".to_string()),
        })
    );
}

#[test]
fn test_player_selection_by_pattern() {
    let players = vec![
        build_player("elsewhere", r"^https://elsewhere\.test/"),
        build_player("broken", "(unclosed"),
        build_player("media.test", r"^https://media\.test/watch/"),
    ];

    assert!(players[2].matches("https://media.test/watch/42").unwrap());
    assert!(players[1].matches("https://media.test/watch/42").is_err());

    let chosen = Player::select(&players, "https://media.test/watch/42").unwrap();
    assert_eq!(chosen.name(), "media.test");
    assert!(Player::select(&players, "https://unknown.test/").is_none());
}

#[test]
fn test_player_without_result_node_matches_nothing() {
    let player = Player::new("empty", Arc::new(player_registry(empty_fetcher())));

    assert_eq!(player.url_pattern(), None);
    assert!(!player.matches("https://media.test/").unwrap());
}
