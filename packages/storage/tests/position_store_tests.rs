// ABOUTME: Integration tests for saved positions and preferences
// ABOUTME: Merge semantics, isolation between diagrams, bulk import/export and one-shot templates

use diagram_core::{find_template, Position, PositionOverrides};
use diagram_storage::positions::AllPositions;
use diagram_storage::{LocalStore, PositionStore, Preferences};
use pretty_assertions::assert_eq;

async fn setup() -> (LocalStore, PositionStore) {
    let store = LocalStore::open_in_memory().await.unwrap();
    (store.clone(), PositionStore::new(store))
}

#[tokio::test]
async fn test_save_merges_into_existing_map() {
    let (_, positions) = setup().await;

    positions
        .save("d1", "a", Position::new(1.0, 2.0))
        .await
        .unwrap();
    positions
        .save("d1", "b", Position::new(3.0, 4.0))
        .await
        .unwrap();
    positions
        .save("d1", "a", Position::new(5.0, 6.0))
        .await
        .unwrap();

    let loaded = positions.load("d1").await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["a"], Position::new(5.0, 6.0));
    assert_eq!(loaded["b"], Position::new(3.0, 4.0));
}

#[tokio::test]
async fn test_diagrams_are_isolated() {
    let (_, positions) = setup().await;
    positions
        .save("d1", "a", Position::new(1.0, 1.0))
        .await
        .unwrap();

    assert!(positions.load("d2").await.unwrap().is_empty());
    assert!(positions.clear("d1").await.unwrap());
    assert!(positions.load("d1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_entry_reads_as_empty() {
    let (store, positions) = setup().await;
    store
        .set("diagram-positions-broken", "{not json")
        .await
        .unwrap();

    assert!(positions.load("broken").await.unwrap().is_empty());

    // The next save replaces the unreadable entry
    positions
        .save("broken", "x", Position::new(0.0, 0.0))
        .await
        .unwrap();
    assert_eq!(positions.load("broken").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_export_import_all() {
    let (_, positions) = setup().await;
    let mut batch = PositionOverrides::new();
    batch.insert("a".to_string(), Position::new(10.0, 20.0));
    batch.insert("b".to_string(), Position::new(30.0, 40.0));
    positions.save_many("first.json", &batch).await.unwrap();
    positions
        .save("second.json", "c", Position::new(1.0, 1.0))
        .await
        .unwrap();

    let exported = positions.load_all().await.unwrap();
    assert_eq!(
        exported.keys().cloned().collect::<Vec<_>>(),
        vec!["first.json".to_string(), "second.json".to_string()]
    );

    let (_, fresh) = setup().await;
    fresh.save_all(&exported).await.unwrap();
    assert_eq!(fresh.load_all().await.unwrap(), exported);
}

#[tokio::test]
async fn test_save_all_replaces_listed_diagrams() {
    let (_, positions) = setup().await;
    positions
        .save("d", "old", Position::new(0.0, 0.0))
        .await
        .unwrap();

    let mut import = AllPositions::new();
    let mut replacement = PositionOverrides::new();
    replacement.insert("new".to_string(), Position::new(1.0, 1.0));
    import.insert("d".to_string(), replacement.clone());
    positions.save_all(&import).await.unwrap();

    assert_eq!(positions.load("d").await.unwrap(), replacement);
}

#[tokio::test]
async fn test_preferences_defaults_and_updates() {
    let store = LocalStore::open_in_memory().await.unwrap();
    let prefs = Preferences::new(store);

    assert_eq!(prefs.selected_diagram().await.unwrap(), None);
    assert!(!prefs.show_coordinates().await.unwrap());

    prefs.set_selected_diagram("IMC-chatbot.json").await.unwrap();
    prefs.set_show_coordinates(true).await.unwrap();
    prefs.set_window_title("Ops Wall").await.unwrap();

    assert_eq!(
        prefs.selected_diagram().await.unwrap().as_deref(),
        Some("IMC-chatbot.json")
    );
    assert!(prefs.show_coordinates().await.unwrap());
    assert_eq!(
        prefs.window_title().await.unwrap().as_deref(),
        Some("Ops Wall")
    );
}

#[tokio::test]
async fn test_pending_template_consumed_once() {
    let store = LocalStore::open_in_memory().await.unwrap();
    let prefs = Preferences::new(store.clone());
    let template = find_template("microservices").unwrap();

    prefs.set_pending_template(&template.config).await.unwrap();
    assert_eq!(
        prefs.take_pending_template().await.unwrap(),
        Some(template.config)
    );
    assert_eq!(prefs.take_pending_template().await.unwrap(), None);

    store.set("pendingTemplate", "garbage").await.unwrap();
    assert_eq!(prefs.take_pending_template().await.unwrap(), None);
    assert_eq!(store.get("pendingTemplate").await.unwrap(), None);
}
