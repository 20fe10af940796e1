//! End-to-end resource operations on the in-memory backend.

use docrest::{memory::InMemoryConnection, prelude::*};
use bson::doc;
use serde_json::{Value, json};

#[derive(Model)]
#[model(name = "Person", collection = "people", database = "crm")]
pub struct Person;

#[derive(Model)]
pub struct AuditEntry;

async fn manager() -> DocumentManager<Person, InMemoryConnection> {
    DocumentManager::new(
        InMemoryConnection::builder().build().await.unwrap(),
        ManagerConfig::builder()
            .with_id_field("id")
            .with_exclude_fields(["password"])
            .build(),
    )
    .await
    .unwrap()
}

async fn seed(manager: &DocumentManager<Person, InMemoryConnection>) {
    for (name, age) in [
        ("Kate", 33), ("Jack", 55), ("Bob", 20), ("Jane", 41), ("Ivan", 28), ("Alice", 30),
        ("Hank", 62), ("Dora", 19), ("Carl", 47), ("Gina", 36), ("Eve", 25),
    ] {
        manager
            .create(doc! { "name": name, "age": age, "password": "secret" })
            .await
            .unwrap();
    }
}

fn names(values: &[Value]) -> Vec<&str> {
    values
        .iter()
        .map(|value| value["name"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Model Derive Tests
// ============================================================================

#[test]
fn test_derive_uses_attributes() {
    assert_eq!(Person::model_name(), "Person");
    assert_eq!(Person::collection_name(), "people");
    assert_eq!(Person::database_name(), Some("crm"));
}

#[test]
fn test_derive_defaults() {
    assert_eq!(AuditEntry::model_name(), "AuditEntry");
    assert_eq!(AuditEntry::collection_name(), "auditentry");
    assert_eq!(AuditEntry::database_name(), None);
}

#[tokio::test]
async fn test_model_without_database_needs_namespace() {
    let connection = InMemoryConnection::new();

    let missing = DocumentManager::<AuditEntry, _>::new(connection.clone(), ManagerConfig::default()).await;
    assert!(matches!(missing, Err(ManagerError::Configuration(_))));

    let manager = DocumentManager::<AuditEntry, _>::new(
        connection.clone(),
        ManagerConfig::builder().with_namespace("audit", "entries").build(),
    )
    .await
    .unwrap();

    assert_eq!(manager.model_info().namespace.to_string(), "audit.entries");
    assert_eq!(connection.registered_models().await.len(), 1);
}

// ============================================================================
// CRUD Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_retrieve_by_id() {
    let manager = manager().await;

    let created = manager
        .create(doc! { "name": "Jack", "age": 55, "password": "secret" })
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    assert_eq!(id.len(), 24);
    assert_eq!(created, json!({ "id": id, "name": "Jack", "age": 55 }));

    let retrieved = manager.retrieve(&doc! { "id": id.as_str() }, None).await.unwrap();
    assert_eq!(retrieved, created);
}

#[tokio::test]
async fn test_retrieve_unknown_id_is_empty() {
    let manager = manager().await;
    seed(&manager).await;

    let by_valid_id = manager.retrieve(&doc! { "id": "123456789012123456789012" }, None).await.unwrap();
    let by_invalid_id = manager.retrieve(&doc! { "id": "not-an-id" }, None).await.unwrap();

    assert_eq!(by_valid_id, json!({}));
    assert_eq!(by_invalid_id, json!({}));
}

#[tokio::test]
async fn test_update_merges_fields() {
    let manager = manager().await;
    seed(&manager).await;

    let updated = manager
        .update(&doc! { "nameRegex": "^ja" }, doc! { "team": "blue" })
        .await
        .unwrap();

    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|value| value["team"] == "blue" && value.get("password").is_none()));

    let (blue, meta) = manager.retrieve_all(&doc! { "team": "blue" }, None).await.unwrap();
    assert_eq!(meta.count, 2);
    assert_eq!(names(&blue), vec!["Jack", "Jane"]);
}

#[tokio::test]
async fn test_delete_removes_matches() {
    let manager = manager().await;
    seed(&manager).await;

    let deleted = manager
        .delete(&doc! { "age": { "$gte": 50 } })
        .await
        .unwrap();

    assert_eq!(deleted, json!({}));
    assert_eq!(manager.retrieve_all(&doc! {}, None).await.unwrap().1.count, 9);
    assert_eq!(manager.retrieve(&doc! { "name": "Hank" }, None).await.unwrap(), json!({}));
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_regex_lookup_is_case_insensitive() {
    let manager = manager().await;
    seed(&manager).await;

    let (matched, meta) = manager.retrieve_all(&doc! { "nameRegex": "JA" }, None).await.unwrap();

    assert_eq!(meta.count, 2);
    assert_eq!(names(&matched), vec!["Jack", "Jane"]);
}

#[tokio::test]
async fn test_list_lookup_matches_any() {
    let manager = manager().await;
    seed(&manager).await;

    let (matched, _) = manager
        .retrieve_all(&doc! { "name": ["Eve", "Bob", "Zed"] }, None)
        .await
        .unwrap();

    assert_eq!(names(&matched), vec!["Bob", "Eve"]);
}

#[tokio::test]
async fn test_raw_query_narrows_lookup() {
    let manager = manager().await;
    seed(&manager).await;

    let (matched, _) = manager
        .retrieve_all(&doc! { "nameRegex": "a" }, Some(doc! { "age": { "$lt": 30 } }))
        .await
        .unwrap();

    assert_eq!(names(&matched), vec!["Ivan", "Dora"]);
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_retrieve_list_middle_page() {
    let manager = manager().await;
    seed(&manager).await;

    let (payload, meta) = manager
        .retrieve_list(doc! { "size": 2, "page": 2, "sort": "name,asc" }, None)
        .await
        .unwrap();

    assert_eq!(names(&payload.data), vec!["Eve", "Gina"]);
    assert_eq!(
        payload.into_resource_properties("people")["page"],
        json!({ "size": 2, "totalElements": 11, "totalPages": 6, "number": 2 })
    );
    assert_eq!(
        meta.to_value(manager.config()),
        json!({
            "links": {
                "next": { "page": 3, "size": 2 },
                "prev": { "page": 1, "size": 2 },
                "first": { "page": 0, "size": 2 },
                "last": { "page": 5, "size": 2 },
            }
        })
    );
}

#[tokio::test]
async fn test_retrieve_list_descending_last_page() {
    let manager = manager().await;
    seed(&manager).await;

    let (payload, meta) = manager
        .retrieve_list(doc! { "size": "5", "page": "2", "sort": "age,desc" }, None)
        .await
        .unwrap();

    assert_eq!(names(&payload.data), vec!["Dora"]);
    assert_eq!(payload.page_object.page.total_pages, 3);
    assert_eq!(meta.links.next, None);
    assert_eq!(meta.links.last, None);
    assert_eq!(meta.links.prev, Some(PageLink { page: 1, size: 5 }));
}

#[tokio::test]
async fn test_retrieve_list_with_filters_and_resource_properties() {
    let manager = manager().await;
    seed(&manager).await;

    let (payload, _) = manager
        .retrieve_list(doc! { "nameRegex": "^[a-d]", "sort": "name,asc" }, None)
        .await
        .unwrap();
    let properties = payload.into_resource_properties("people");

    assert_eq!(
        properties["people"]
            .as_array()
            .unwrap()
            .iter()
            .map(|person| person["name"].as_str().unwrap())
            .collect::<Vec<_>>(),
        vec!["Alice", "Bob", "Carl", "Dora"]
    );
    assert_eq!(properties["page"]["totalElements"], 4);
    assert_eq!(properties["page"]["size"], 10);
}

#[tokio::test]
async fn test_retrieve_list_empty_collection() {
    let manager = manager().await;

    let (payload, meta) = manager.retrieve_list(doc! {}, None).await.unwrap();

    assert!(payload.data.is_empty());
    assert_eq!(payload.page_object.page.total_pages, 0);
    assert_eq!(meta.links.last, Some(PageLink { page: -1, size: 10 }));
}

#[tokio::test]
async fn test_retrieve_list_uses_configured_argument_names() {
    let manager = DocumentManager::<Person, _>::new(
        InMemoryConnection::new(),
        ManagerConfig::builder()
            .with_query_args("p", "per_page", "order")
            .with_default_page_size(3)
            .build(),
    )
    .await
    .unwrap();
    seed(&manager).await;

    let (payload, meta) = manager
        .retrieve_list(doc! { "p": 1, "order": "age,asc" }, None)
        .await
        .unwrap();

    assert_eq!(names(&payload.data), vec!["Ivan", "Alice", "Kate"]);
    assert_eq!(
        meta.to_value(manager.config())["links"]["next"],
        json!({ "p": 2, "per_page": 3 })
    );
}
