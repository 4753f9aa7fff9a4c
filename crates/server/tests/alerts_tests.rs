//! Alert aggregation over a realistic vehicle list.

mod common;

use common::{VehicleSeed, create_test_db, insert_vehicle, iso_offset};
use fleet_tracker::alerts::{Severity, compute_alert_records, compute_alerts};
use fleet_tracker::expiry::TrackedDocument;
use fleet_tracker::store;
use time::macros::date;

#[tokio::test]
async fn upcoming_insurance_only() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Ford"),
            model: Some("Transit"),
            insurance_date: Some(&iso_offset(today, 5)),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    let alerts = compute_alerts(&vehicles, today);
    assert_eq!(alerts, vec!["📅 Ford Transit - insurance ends in 5 days"]);
}

#[tokio::test]
async fn expired_inspection() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("VW"),
            model: Some("Crafter"),
            inspection_date: Some(&iso_offset(today, -3)),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    let records = compute_alert_records(&vehicles, today, 30);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].document, TrackedDocument::Inspection);
    assert_eq!(records[0].severity, Severity::Expired);
    assert_eq!(records[0].days_remaining, -3);
    assert_eq!(
        compute_alerts(&vehicles, today),
        vec!["❌ VW Crafter - no valid technical inspection!"]
    );
}

#[tokio::test]
async fn far_future_dates_produce_nothing() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Iveco"),
            insurance_date: Some(&iso_offset(today, 31)),
            inspection_date: Some(&iso_offset(today, 200)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    assert!(compute_alerts(&vehicles, today).is_empty());
}

#[tokio::test]
async fn alerts_do_not_need_a_reminder_address() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Opel"),
            model: Some("Vivaro"),
            insurance_date: Some(&iso_offset(today, 2)),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    assert_eq!(compute_alerts(&vehicles, today).len(), 1);
}

#[tokio::test]
async fn due_today_counts_as_expired() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Ford"),
            insurance_date: Some("2026-03-10"),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    assert_eq!(
        compute_alerts(&vehicles, today),
        vec!["⚠️ Ford - insurance has expired!"]
    );
}

#[tokio::test]
async fn order_follows_vehicles_then_documents() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    let older = insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("First"),
            insurance_date: Some(&iso_offset(today, 1)),
            inspection_date: Some(&iso_offset(today, 2)),
            ..Default::default()
        },
    )
    .await;
    let newer = insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Second"),
            inspection_date: Some(&iso_offset(today, -1)),
            insurance_date: Some("garbage"),
            ..Default::default()
        },
    )
    .await;

    let vehicles = store::all_vehicles(&db).await.unwrap();
    let records = compute_alert_records(&vehicles, today, 30);
    let order: Vec<_> = records.iter().map(|r| (r.vehicle_id, r.document)).collect();
    assert_eq!(
        order,
        vec![
            (newer.id, TrackedDocument::Inspection),
            (older.id, TrackedDocument::Insurance),
            (older.id, TrackedDocument::Inspection),
        ]
    );
}

#[tokio::test]
async fn repeated_computation_is_identical() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    for offset in [-10, 0, 4, 30, 31] {
        insert_vehicle(
            &db,
            VehicleSeed {
                brand: Some("Fleet"),
                insurance_date: Some(&iso_offset(today, offset)),
                inspection_date: Some(&iso_offset(today, -offset)),
                ..Default::default()
            },
        )
        .await;
    }

    let vehicles = store::all_vehicles(&db).await.unwrap();
    assert_eq!(
        compute_alerts(&vehicles, today),
        compute_alerts(&vehicles, today)
    );
}
