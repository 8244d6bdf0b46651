//! Demo data for a fresh store.

use chrono::{Duration, Utc};
use maintai_core::machine::{STATUS_MAINTENANCE, STATUS_OPERATIONAL, STATUS_WARNING};
use maintai_core::maintenance::{KIND_INSPECTION, KIND_REPAIR, KIND_SCHEDULED, STATUS_COMPLETED};
use maintai_core::roles::ROLE_ADMIN;
use maintai_core::security::{
    EVENT_ACCESS_DENIED, EVENT_FAILED_LOGIN, EVENT_LOGIN, EVENT_SECURITY_SCAN, SEVERITY_HIGH,
    SEVERITY_INFO, SEVERITY_WARNING,
};

use crate::error::RepoError;
use crate::models::account::CreateAccount;
use crate::models::machine::CreateMachine;
use crate::models::maintenance_record::{CreateMaintenanceRecord, UpdateMaintenanceRecord};
use crate::models::security_event::CreateSecurityEvent;
use crate::repositories::{
    AccountRepo, MachineRepo, MaintenanceRecordRepo, Repository, SecurityEventRepo,
};

/// Username of the seeded administrator. Its presence marks a seeded store.
pub const ADMIN_USERNAME: &str = "admin";

/// (identifier, name, type, status, efficiency, temperature, vibration, days since service)
const DEMO_MACHINES: &[(&str, &str, &str, &str, i32, f64, f64, i64)] = &[
    ("CNC-001", "CNC Machine 001", "CNC", STATUS_OPERATIONAL, 87, 72.0, 2.1, 15),
    ("PRESS-002", "Hydraulic Press 002", "Press", STATUS_WARNING, 65, 89.0, 4.8, 30),
    ("ROBOT-003", "Robotic Arm 003", "Robot", STATUS_OPERATIONAL, 92, 68.0, 1.5, 10),
    ("CONV-004", "Conveyor Belt 004", "Conveyor", STATUS_MAINTENANCE, 0, 25.0, 0.0, 0),
    ("DRILL-005", "Drill Press 005", "Drill", STATUS_OPERATIONAL, 81, 75.0, 2.8, 17),
];

/// Populate an empty store with a small demo fleet.
///
/// Returns `false` without writing anything if the admin account already
/// exists, so calling it on every start is safe.
pub async fn seed_if_empty(repo: &dyn Repository) -> Result<bool, RepoError> {
    if repo.find_account_by_username(ADMIN_USERNAME).await?.is_some() {
        tracing::info!("Store already seeded");
        return Ok(false);
    }

    let now = Utc::now();

    let admin = repo
        .create_account(&CreateAccount {
            username: ADMIN_USERNAME.to_string(),
            password: "password".to_string(),
            role: Some(ROLE_ADMIN.to_string()),
        })
        .await?;
    tracing::info!(username = %admin.username, "Created admin account");

    let mut machine_ids = Vec::with_capacity(DEMO_MACHINES.len());
    for &(identifier, name, machine_type, status, efficiency, temperature, vibration, days) in
        DEMO_MACHINES
    {
        let machine = repo
            .create_machine(&CreateMachine {
                identifier: identifier.to_string(),
                name: name.to_string(),
                machine_type: machine_type.to_string(),
                status: Some(status.to_string()),
                efficiency: Some(efficiency),
                temperature: Some(temperature),
                vibration: Some(vibration),
                last_maintenance: Some(now - Duration::days(days)),
            })
            .await?;
        machine_ids.push(machine.id);
    }
    tracing::info!(count = machine_ids.len(), "Created demo machines");

    let records = [
        CreateMaintenanceRecord {
            machine_id: machine_ids.first().copied(),
            kind: KIND_SCHEDULED.to_string(),
            description: "Scheduled maintenance on CNC-001".to_string(),
            technician: "John Doe".to_string(),
            status: None,
            scheduled_date: Some(now - Duration::days(1)),
            cost: Some(1200.0),
        },
        CreateMaintenanceRecord {
            machine_id: machine_ids.get(1).copied(),
            kind: KIND_REPAIR.to_string(),
            description: "Temperature warning on PRESS-002".to_string(),
            technician: "Jane Smith".to_string(),
            status: None,
            scheduled_date: Some(now + Duration::days(1)),
            cost: Some(3200.0),
        },
        CreateMaintenanceRecord {
            machine_id: machine_ids.get(2).copied(),
            kind: KIND_INSPECTION.to_string(),
            description: "Safety inspection on ROBOT-003".to_string(),
            technician: "Mike Johnson".to_string(),
            status: None,
            scheduled_date: Some(now + Duration::days(7)),
            cost: Some(800.0),
        },
    ];
    let mut record_ids = Vec::with_capacity(records.len());
    for input in &records {
        record_ids.push(repo.create_maintenance_record(input).await?.id);
    }

    // The CNC service already happened; completion is only ever recorded
    // through an explicit update.
    if let Some(&first) = record_ids.first() {
        repo.update_maintenance_record(
            first,
            &UpdateMaintenanceRecord {
                status: Some(STATUS_COMPLETED.to_string()),
                completed_date: Some(now - Duration::days(1)),
                ..Default::default()
            },
        )
        .await?;
    }
    tracing::info!(count = record_ids.len(), "Created demo maintenance records");

    let events = [
        (EVENT_SECURITY_SCAN, "Security scan completed", None, "system", SEVERITY_INFO),
        (
            EVENT_FAILED_LOGIN,
            "Failed login attempt with invalid credentials",
            Some("192.168.1.50"),
            "unknown",
            SEVERITY_WARNING,
        ),
        (
            EVENT_ACCESS_DENIED,
            "Unauthorized access attempt to machine control panel",
            Some("192.168.1.75"),
            "guest",
            SEVERITY_HIGH,
        ),
        (EVENT_LOGIN, "User admin logged in", Some("192.168.1.100"), ADMIN_USERNAME, SEVERITY_INFO),
    ];
    for (event_type, description, ip_address, username, severity) in events {
        repo.create_security_event(&CreateSecurityEvent {
            event_type: event_type.to_string(),
            description: description.to_string(),
            ip_address: ip_address.map(str::to_string),
            username: Some(username.to_string()),
            severity: Some(severity.to_string()),
        })
        .await?;
    }
    tracing::info!(count = events.len(), "Created demo security events");

    Ok(true)
}
