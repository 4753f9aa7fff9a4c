use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fleet_tracker::alerts::compute_alerts;
use fleet_tracker::entity::vehicle;
use fleet_tracker::expiry::days_remaining;
use fleet_tracker::reminders::ReminderPolicy;
use time::macros::date;

// CI-friendly benchmark configuration
fn is_ci_mode() -> bool {
    std::env::var("CI").is_ok() || std::env::var("QUICK_BENCH").is_ok()
}

fn fleet(size: i32) -> Vec<vehicle::Model> {
    let today = date!(2026 - 03 - 10);
    (0..size)
        .map(|id| vehicle::Model {
            id,
            brand: Some("Ford".into()),
            model_name: Some(format!("Transit {id}")),
            plate: None,
            vin: None,
            year: None,
            garage: Some(format!("Garage {}", id % 7)),
            note: None,
            image_path: None,
            policy_number: None,
            insurance_date: Some((today + time::Duration::days((id % 90 - 30) as i64)).to_string()),
            inspection_date: (id % 3 != 0)
                .then(|| (today + time::Duration::days((id % 400) as i64)).to_string()),
            reminder_email: Some("fleet@example.com".into()),
            created_on: today,
        })
        .collect()
}

fn benchmark_alerts(c: &mut Criterion) {
    let today = date!(2026 - 03 - 10);
    let sizes: &[i32] = if is_ci_mode() { &[100] } else { &[100, 1_000, 10_000] };

    for &size in sizes {
        let vehicles = fleet(size);
        c.bench_function(&format!("compute_alerts_{size}"), |b| {
            b.iter(|| black_box(compute_alerts(black_box(&vehicles), today)));
        });
    }
}

fn benchmark_reminder_decisions(c: &mut Criterion) {
    let today = date!(2026 - 03 - 10);
    let policy = ReminderPolicy::default();
    let vehicles = fleet(1_000);

    c.bench_function("reminder_decisions_1000", |b| {
        b.iter(|| {
            for v in &vehicles {
                let days = days_remaining(v.insurance_date.as_deref(), today);
                black_box(policy.decide(days));
            }
        });
    });
}

criterion_group!(benches, benchmark_alerts, benchmark_reminder_decisions);
criterion_main!(benches);
