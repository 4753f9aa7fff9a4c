//! Daily reminder scan against an in-memory database and a recording notifier.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingNotifier, VehicleSeed, create_test_db, insert_vehicle, iso_offset};
use fleet_tracker::expiry::TrackedDocument;
use fleet_tracker::reminders::{ReminderDispatcher, ReminderPolicy, TriggerMode};
use fleet_tracker::store;
use sea_orm::Database;
use time::macros::date;

fn dispatcher(
    db: sea_orm::DatabaseConnection,
    notifier: Arc<RecordingNotifier>,
) -> (Arc<sea_orm::DatabaseConnection>, ReminderDispatcher) {
    let db = Arc::new(db);
    let dispatcher = ReminderDispatcher::new(
        db.clone(),
        notifier,
        ReminderPolicy::default(),
        Duration::from_secs(5),
    );
    (db, dispatcher)
}

#[tokio::test]
async fn overdue_inspection_is_mailed() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    let v = insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("VW"),
            model: Some("Crafter"),
            inspection_date: Some(&iso_offset(today, -3)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::new();
    let (db, dispatcher) = dispatcher(db, notifier.clone());

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.sent, 1);
    assert_eq!(summary.failed, 0);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "fleet@example.com");
    assert_eq!(
        sent[0].subject,
        "⚠️ DEADLINE PASSED: VW Crafter - Technical inspection"
    );
    assert!(sent[0].body.contains("overdue by 3 days"));

    let log = store::reminders_for_vehicle(&db, v.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].document, TrackedDocument::Inspection.as_str());
    assert_eq!(log[0].days_remaining, -3);
}

#[tokio::test]
async fn nothing_is_sent_outside_the_threshold() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Iveco"),
            insurance_date: Some(&iso_offset(today, 45)),
            inspection_date: Some(&iso_offset(today, 11)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::new();
    let (_db, dispatcher) = dispatcher(db, notifier.clone());

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.sent, 0);
    assert!(notifier.attempts().is_empty());
}

#[tokio::test]
async fn vehicles_without_recipient_are_skipped() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    for email in [None, Some("   ")] {
        insert_vehicle(
            &db,
            VehicleSeed {
                brand: Some("Opel"),
                insurance_date: Some(&iso_offset(today, 2)),
                reminder_email: email,
                ..Default::default()
            },
        )
        .await;
    }
    let notifier = RecordingNotifier::new();
    let (_db, dispatcher) = dispatcher(db, notifier.clone());

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.vehicles_scanned, 2);
    assert_eq!(summary.skipped_without_recipient, 2);
    assert!(notifier.attempts().is_empty());
}

#[tokio::test]
async fn failed_send_does_not_stop_the_scan() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    // Vehicles are scanned newest first, so `a` (inserted last) goes first.
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("B"),
            insurance_date: Some(&iso_offset(today, 1)),
            reminder_email: Some("b@example.com"),
            ..Default::default()
        },
    )
    .await;
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("A"),
            insurance_date: Some(&iso_offset(today, 0)),
            inspection_date: Some(&iso_offset(today, 3)),
            reminder_email: Some("a@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::failing_for(&["a@example.com"]);
    let (_db, dispatcher) = dispatcher(db, notifier.clone());

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.sent, 1);
    assert_eq!(
        notifier.attempts(),
        vec!["a@example.com", "a@example.com", "b@example.com"]
    );
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "b@example.com");
    assert!(sent[0].subject.starts_with("🔔 Upcoming deadline"));
}

#[tokio::test]
async fn one_message_per_document_per_scan() {
    let db = create_test_db().await;
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Ford"),
            insurance_date: Some(&iso_offset(today, 0)),
            inspection_date: Some(&iso_offset(today, 10)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::new();
    let (_db, dispatcher) = dispatcher(db, notifier.clone());

    dispatcher.run_daily_reminder_scan(today).await.unwrap();
    let subjects: Vec<_> = notifier.sent().into_iter().map(|m| m.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "🔥 DUE TODAY: Ford - Insurance",
            "🔔 Upcoming deadline: Ford - Technical inspection",
        ]
    );

    // No suppression: the next scan mails the same documents again.
    dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(notifier.sent().len(), 4);
}

#[tokio::test]
async fn exact_day_trigger_only_fires_on_threshold() {
    let db = Arc::new(create_test_db().await);
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Ford"),
            insurance_date: Some(&iso_offset(today, 10)),
            inspection_date: Some(&iso_offset(today, -2)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::new();
    let dispatcher = ReminderDispatcher::new(
        db,
        notifier.clone(),
        ReminderPolicy {
            threshold_days: 10,
            trigger: TriggerMode::ExactDay,
        },
        Duration::from_secs(5),
    );

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.sent, 1);
    assert!(notifier.sent()[0].subject.ends_with("Insurance"));
}

#[tokio::test]
async fn slow_relay_times_out() {
    let db = Arc::new(create_test_db().await);
    let today = date!(2026 - 03 - 10);
    insert_vehicle(
        &db,
        VehicleSeed {
            brand: Some("Ford"),
            insurance_date: Some(&iso_offset(today, 1)),
            reminder_email: Some("fleet@example.com"),
            ..Default::default()
        },
    )
    .await;
    let notifier = RecordingNotifier::slow(Duration::from_secs(2));
    let dispatcher = ReminderDispatcher::new(
        db,
        notifier.clone(),
        ReminderPolicy::default(),
        Duration::from_millis(50),
    );

    let summary = dispatcher.run_daily_reminder_scan(today).await.unwrap();
    assert_eq!(summary.failed, 1);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn store_failure_aborts_the_scan() {
    // No tables: the vehicle query fails.
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let notifier = RecordingNotifier::new();
    let (_db, dispatcher) = dispatcher(db, notifier.clone());

    assert!(
        dispatcher
            .run_daily_reminder_scan(date!(2026 - 03 - 10))
            .await
            .is_err()
    );
    assert!(notifier.attempts().is_empty());
}
