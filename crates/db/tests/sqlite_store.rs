use maintai_db::models::machine::{CreateMachine, UpdateMachine};
use maintai_db::models::security_event::CreateSecurityEvent;
use chrono::{Duration, TimeZone, Utc};
use maintai_db::{open_store, MachineRepo, MaintenanceRecordRepo, SecurityEventRepo, SqliteStore};

fn machine(identifier: &str) -> CreateMachine {
    CreateMachine {
        identifier: identifier.to_string(),
        name: identifier.to_string(),
        machine_type: "Press".to_string(),
        status: None,
        efficiency: Some(80),
        temperature: None,
        vibration: None,
        last_maintenance: None,
    }
}

/// Rows written through one handle are visible after the file is reopened.
#[tokio::test]
async fn rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.db");

    let first = {
        let store = SqliteStore::open(&path).await.unwrap();
        let created = store.create_machine(&machine("PRESS-002")).await.unwrap();
        store
            .update_machine(
                created.id,
                &UpdateMachine {
                    efficiency: Some(64),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
    };

    let reopened = SqliteStore::open(&path).await.unwrap();
    let found = reopened.find_machine(first.id).await.unwrap().unwrap();
    assert_eq!(found, first);
    assert_eq!(found.efficiency, 64);
}

/// Identities continue from where the previous process left off.
#[tokio::test]
async fn identities_continue_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.db");

    {
        let store = SqliteStore::open(&path).await.unwrap();
        store.create_machine(&machine("A-1")).await.unwrap();
        store.create_machine(&machine("B-2")).await.unwrap();
    }

    let store = SqliteStore::open(&path).await.unwrap();
    let third = store.create_machine(&machine("C-3")).await.unwrap();
    assert_eq!(third.id, 3);
    assert_eq!(store.list_machines().await.unwrap().len(), 3);
}

/// A missing parent directory is created on open.
#[tokio::test]
async fn open_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("fleet.db");

    let store = SqliteStore::open(&path).await.unwrap();
    store.health_check().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn open_store_selects_backend() {
    let memory = open_store(None).await.unwrap();
    assert!(memory.list_machines().await.unwrap().is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.db");
    let url = format!("sqlite:{}", path.display());

    {
        let store = open_store(Some(&url)).await.unwrap();
        store
            .create_security_event(&CreateSecurityEvent {
                event_type: "login".to_string(),
                description: "admin logged in".to_string(),
                ip_address: None,
                username: Some("admin".to_string()),
                severity: None,
            })
            .await
            .unwrap();
    }

    // A bare path reaches the same file.
    let store = open_store(path.to_str()).await.unwrap();
    let events = store.list_security_events(None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "login");
}

#[tokio::test]
async fn memory_url_shares_one_database() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.create_machine(&machine("CNC-001")).await.unwrap();
    assert_eq!(store.list_machines().await.unwrap().len(), 1);
}

/// Rows sharing a creation stamp list in insertion order, after any newer row.
#[tokio::test]
async fn equal_timestamps_list_in_insertion_order() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let stamp = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    for (kind, created_at) in [
        ("login", stamp),
        ("logout", stamp),
        ("failed_login", stamp),
        ("security_scan", stamp + Duration::minutes(5)),
    ] {
        sqlx::query(
            "INSERT INTO security_events (event_type, description, severity, created_at)
             VALUES (?1, ?2, 'info', ?3)",
        )
        .bind(kind)
        .bind(format!("{kind} observed"))
        .bind(created_at)
        .execute(store.pool())
        .await
        .unwrap();
    }

    let ids: Vec<i64> = store
        .list_security_events(None)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![4, 1, 2, 3]);

    let recent: Vec<i64> = store
        .list_security_events(Some(2))
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(recent, vec![4, 1]);
}

#[tokio::test]
async fn tied_records_list_in_insertion_order() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let stamp = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

    for description in ["belt", "spindle", "coolant"] {
        sqlx::query(
            "INSERT INTO maintenance_records (kind, description, technician, created_at)
             VALUES ('repair', ?1, 'Jane Smith', ?2)",
        )
        .bind(description)
        .bind(stamp)
        .execute(store.pool())
        .await
        .unwrap();
    }

    let ids: Vec<i64> = store
        .list_maintenance_records(None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
