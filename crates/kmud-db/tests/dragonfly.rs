//! Integration tests for the `Dragonfly` store backend.
//!
//! These tests require a live Dragonfly instance. Run with:
//!
//! ```bash
//! docker run --rm -d -p 6379:6379 --name kmud-dragonfly docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p kmud-db --test dragonfly -- --ignored
//! docker stop kmud-dragonfly
//! ```
//!
//! Each test uses its own key namespace and drops what it created.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::Arc;
use std::time::Duration;

use kmud_db::{
    Collection, Database, DbError, Document, DragonflyStore, Entity, Filter, Store, Update,
};
use kmud_types::{EntityKind, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

async fn connect(namespace: &str) -> DragonflyStore {
    let store = DragonflyStore::connect(DRAGONFLY_URL, namespace)
        .await
        .expect("Failed to connect to Dragonfly -- is Docker running?");
    for collection in Collection::ALL {
        store
            .drop_collection(collection)
            .await
            .expect("Failed to drop collection");
    }
    store
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance on localhost:6379"]
async fn dragonfly_upsert_find_and_remove() {
    let store = connect("kmud-test-crud").await;
    let rock = ObjectId::new();
    let sword = ObjectId::new();

    store
        .upsert_id(Collection::Items, rock, json!({ "name": "Rock" }))
        .await
        .expect("Failed to upsert");
    store
        .upsert_id(Collection::Items, sword, json!({ "name": "Sword" }))
        .await
        .expect("Failed to upsert");
    store
        .upsert_id(Collection::Items, rock, json!({ "name": "Boulder" }))
        .await
        .expect("Failed to replace");

    let found: Vec<serde_json::Value> = store
        .find(Collection::Items, &Filter::eq("name", "Boulder"))
        .await
        .expect("Failed to find")
        .collect();
    assert_eq!(found, vec![json!({ "_id": rock.to_string(), "name": "Boulder" })]);
    assert_eq!(store.count(Collection::Items, &Filter::all()).await.unwrap(), 2);

    store.remove_id(Collection::Items, rock).await.unwrap();
    store.remove_id(Collection::Items, rock).await.unwrap();
    let removed = store
        .remove(Collection::Items, &Filter::eq("name", "Sword"))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.count(Collection::Items, &Filter::all()).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance on localhost:6379"]
async fn dragonfly_partial_updates() {
    let store = connect("kmud-test-update").await;
    let id = ObjectId::new();

    let missing = store
        .update_id(Collection::Rooms, id, &Update::set("title", "Hall"))
        .await;
    assert!(matches!(missing, Err(DbError::NotFound { .. })));

    store
        .upsert_id(Collection::Rooms, id, json!({ "title": "Hall", "items": [] }))
        .await
        .unwrap();
    store
        .update_id(Collection::Rooms, id, &Update::push("items", "torch"))
        .await
        .unwrap();
    store
        .update_id(Collection::Rooms, id, &Update::set("title", "Great Hall"))
        .await
        .unwrap();

    let doc: serde_json::Value = store
        .find(Collection::Rooms, &Filter::eq("items", "torch"))
        .await
        .unwrap()
        .one()
        .unwrap()
        .expect("Expected the updated room");
    assert_eq!(doc["title"], "Great Hall");

    store.drop_collection(Collection::Rooms).await.unwrap();
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance on localhost:6379"]
async fn dragonfly_write_back_round_trip() {
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Banner {
        name: String,
    }

    impl Document for Banner {
        const KIND: EntityKind = EntityKind::Zone;
    }

    let store = connect("kmud-test-write-back").await;
    let db = Database::init(Arc::new(store.clone()));

    let banner = Entity::create(
        &db,
        Banner {
            name: "Old".to_owned(),
        },
    )
    .await;
    banner.set(|b| &mut b.name, "New".to_owned()).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while db.stats().processed() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Committer did not drain");

    let records = db.retrieve_all::<Banner>().await.unwrap();
    assert_eq!(records, vec![banner.snapshot().await]);

    db.delete_object(&banner).await.unwrap();
    assert!(db.retrieve_all::<Banner>().await.unwrap().is_empty());
}
