mod common;

use common::empty_fetcher;
use helpercore::{HelperError, NodeRecord};
use helpernodes::{player_registry, HelperStore, Player};
use std::path::PathBuf;
use std::sync::Arc;

fn store_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("helper-store-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_ids_come_from_simplified_names() {
    assert_eq!(HelperStore::id_for("Vidéo Site").unwrap(), "video%20site");
    assert_eq!(HelperStore::id_for("media.test").unwrap(), "media.test");
}

#[tokio::test]
async fn test_create_load_and_delete() {
    let dir = store_dir("create");
    let store = HelperStore::new(&dir);

    let (id, created) = store.create("Media Test").await.unwrap();
    assert_eq!(id, "media%20test");
    assert_eq!(created.name, "Media Test");
    assert!(created.nodes.is_empty());

    let mut loaded = store.load(&id).await.unwrap();
    assert_eq!(loaded, created);

    loaded.nodes.insert("page".to_string(), NodeRecord::new("player"));
    store.save(&id, &loaded).await.unwrap();
    assert_eq!(store.load(&id).await.unwrap().nodes.len(), 1);

    assert!(matches!(store.create("media test").await, Err(HelperError::AlreadyExists(ref taken)) if taken == &id));

    store.delete(&id).await.unwrap();
    assert!(!store.exists(&id).await.unwrap());
    assert!(matches!(store.load(&id).await, Err(HelperError::Io(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_duplicate_takes_the_next_free_copy() {
    let dir = store_dir("duplicate");
    let store = HelperStore::new(&dir);
    let (id, _) = store.create("media").await.unwrap();

    let (first, first_def) = store.duplicate(&id).await.unwrap();
    let (second, second_def) = store.duplicate(&id).await.unwrap();

    assert_eq!(first, "media_copy_1");
    assert_eq!(first_def.name, "media - Copy (1)");
    assert_eq!(second, "media_copy_2");
    assert_eq!(second_def.name, "media - Copy (2)");
    assert_eq!(store.all_ids().await.unwrap(), vec!["media", "media_copy_1", "media_copy_2"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_all_skips_foreign_and_broken_files() {
    let dir = store_dir("all");
    let store = HelperStore::new(&dir);
    assert!(store.all_ids().await.unwrap().is_empty());

    store.create("alpha").await.unwrap();
    store.create("beta").await.unwrap();
    std::fs::write(dir.join("notes.txt"), "not a helper").unwrap();
    std::fs::write(dir.join("broken.json"), "{").unwrap();

    assert_eq!(store.all_ids().await.unwrap(), vec!["alpha", "beta", "broken"]);

    let all = store.all().await.unwrap();
    let names: Vec<&str> = all.iter().map(|(_, d)| d.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_ids_cannot_leave_the_directory() {
    let store = HelperStore::new(store_dir("escape"));

    assert!(matches!(store.load("../outside").await, Err(HelperError::InvalidId(_))));
    assert!(matches!(store.delete("").await, Err(HelperError::InvalidId(_))));
}

#[tokio::test]
async fn test_stored_players_are_selectable() {
    let dir = store_dir("players");
    let store = HelperStore::new(&dir);
    let registry = Arc::new(player_registry(empty_fetcher()));

    let mut player = Player::new("media.test", Arc::clone(&registry));
    let graph = player.graph_mut();
    graph.create_node_with_id("player.result", "result").unwrap();
    graph.set_option("result", "urlPattern", r"^https://media\.test/").unwrap();
    store.save("media.test", &player.definition()).await.unwrap();

    let players: Vec<Player> = store.all()
        .await
        .unwrap()
        .iter()
        .map(|(_, definition)| Player::from_definition(definition, Arc::clone(&registry)).unwrap())
        .collect();

    let chosen = Player::select(&players, "https://media.test/watch/1").unwrap();
    assert_eq!(chosen.name(), "media.test");

    std::fs::remove_dir_all(&dir).unwrap();
}
