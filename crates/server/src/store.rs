//! Vehicle record store.
//!
//! The only place that talks to the `vehicle`, `mileage_log` and `reminder_log`
//! tables. Callers receive canonical entity models and never deal with column
//! naming.

use chrono_tz::Tz;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use time::{Date, OffsetDateTime};

use crate::entity::{mileage_log, reminder_log, vehicle};
use crate::error::StoreError;
use crate::expiry::{TrackedDocument, parse_due_date};

/// File names the legacy front end sends when no photo was picked.
const PLACEHOLDER_IMAGES: &[&str] = &["fred.jpg"];

#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub garage: Option<String>,
}

/// Partial update of descriptive fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub plate: Option<String>,
    pub vin: Option<String>,
    pub year: Option<String>,
    pub garage: Option<String>,
    pub note: Option<String>,
    pub image_path: Option<String>,
}

/// Tracked-document settings, replaced as a whole.
#[derive(Debug, Clone, Default)]
pub struct ReminderSettings {
    pub insurance_date: Option<Date>,
    pub inspection_date: Option<Date>,
    pub reminder_email: Option<String>,
    pub policy_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMileageEntry {
    pub mileage: i64,
    pub action: String,
    pub event_date: Date,
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_placeholder_image(path: &str) -> bool {
    let path = path.trim();
    path.is_empty() || PLACEHOLDER_IMAGES.iter().any(|p| path.ends_with(p))
}

/// All vehicles, newest first.
#[tracing::instrument(skip_all)]
pub async fn all_vehicles(db: &DatabaseConnection) -> Result<Vec<vehicle::Model>, StoreError> {
    Ok(vehicle::Entity::find()
        .order_by_desc(vehicle::Column::Id)
        .all(db)
        .await?)
}

#[tracing::instrument(skip(db))]
pub async fn vehicle_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<vehicle::Model>, StoreError> {
    Ok(vehicle::Entity::find_by_id(id).one(db).await?)
}

async fn existing_vehicle(db: &DatabaseConnection, id: i32) -> Result<vehicle::Model, StoreError> {
    vehicle_by_id(db, id)
        .await?
        .ok_or(StoreError::VehicleNotFound(id))
}

/// Distinct non-empty garages in order of first appearance.
pub fn garages_of(vehicles: &[vehicle::Model]) -> Vec<String> {
    let mut garages: Vec<String> = Vec::new();
    for garage in vehicles
        .iter()
        .filter_map(|v| v.garage.as_deref())
        .map(str::trim)
        .filter(|g| !g.is_empty())
    {
        if !garages.iter().any(|g| g == garage) {
            garages.push(garage.to_string());
        }
    }
    garages
}

#[tracing::instrument(skip_all)]
pub async fn unique_garages(db: &DatabaseConnection) -> Result<Vec<String>, StoreError> {
    Ok(garages_of(&all_vehicles(db).await?))
}

#[tracing::instrument(skip(db))]
pub async fn create_vehicle(
    db: &DatabaseConnection,
    new: NewVehicle,
    created_on: Date,
) -> Result<vehicle::Model, StoreError> {
    let model = vehicle::ActiveModel {
        brand: Set(new.brand.and_then(non_blank)),
        model_name: Set(new.model.and_then(non_blank)),
        garage: Set(new.garage.and_then(non_blank)),
        created_on: Set(created_on),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Applies `changes` on top of the stored record.
///
/// An empty or placeholder image path keeps the stored photo.
#[tracing::instrument(skip(db))]
pub async fn update_vehicle(
    db: &DatabaseConnection,
    id: i32,
    changes: VehicleChanges,
) -> Result<vehicle::Model, StoreError> {
    let existing = existing_vehicle(db, id).await?;
    let mut model: vehicle::ActiveModel = existing.clone().into();

    if let Some(brand) = changes.brand {
        model.brand = Set(non_blank(brand));
    }
    if let Some(name) = changes.model {
        model.model_name = Set(non_blank(name));
    }
    if let Some(plate) = changes.plate {
        model.plate = Set(non_blank(plate));
    }
    if let Some(vin) = changes.vin {
        model.vin = Set(non_blank(vin));
    }
    if let Some(year) = changes.year {
        model.year = Set(non_blank(year));
    }
    if let Some(garage) = changes.garage {
        model.garage = Set(non_blank(garage));
    }
    if let Some(note) = changes.note {
        model.note = Set(non_blank(note));
    }
    if let Some(image) = changes.image_path.filter(|p| !is_placeholder_image(p)) {
        model.image_path = Set(non_blank(image));
    }

    if !model.is_changed() {
        return Ok(existing);
    }
    Ok(model.update(db).await?)
}

#[tracing::instrument(skip(db, settings), fields(has_email = settings.reminder_email.is_some()))]
pub async fn update_reminders(
    db: &DatabaseConnection,
    id: i32,
    settings: ReminderSettings,
) -> Result<vehicle::Model, StoreError> {
    let existing = existing_vehicle(db, id).await?;
    let mut model: vehicle::ActiveModel = existing.into();
    model.insurance_date = Set(settings.insurance_date.map(|d| d.to_string()));
    model.inspection_date = Set(settings.inspection_date.map(|d| d.to_string()));
    model.reminder_email = Set(settings.reminder_email.and_then(non_blank));
    model.policy_number = Set(settings.policy_number.and_then(non_blank));
    Ok(model.update(db).await?)
}

#[tracing::instrument(skip(db))]
pub async fn set_vehicle_image(
    db: &DatabaseConnection,
    id: i32,
    image_path: String,
) -> Result<vehicle::Model, StoreError> {
    let existing = existing_vehicle(db, id).await?;
    let mut model: vehicle::ActiveModel = existing.into();
    model.image_path = Set(Some(image_path));
    Ok(model.update(db).await?)
}

/// ISO form of a stored due date when it differs from `raw`; `None` when the value
/// is already canonical or cannot be parsed.
fn canonical_due_date(raw: Option<&str>, tz: Tz) -> Option<String> {
    let raw = raw?;
    let canonical = parse_due_date(raw, tz)?.to_string();
    (canonical != raw).then_some(canonical)
}

/// Rewrites stored due dates carrying a time or offset as plain `YYYY-MM-DD` dates
/// in `tz`. Returns the number of vehicles changed.
#[tracing::instrument(skip(db))]
pub async fn normalize_due_dates(db: &DatabaseConnection, tz: Tz) -> Result<u64, StoreError> {
    let mut changed = 0;
    for v in all_vehicles(db).await? {
        let insurance = canonical_due_date(v.insurance_date.as_deref(), tz);
        let inspection = canonical_due_date(v.inspection_date.as_deref(), tz);
        if insurance.is_none() && inspection.is_none() {
            continue;
        }
        let id = v.id;
        let mut model: vehicle::ActiveModel = v.into();
        if let Some(date) = insurance {
            model.insurance_date = Set(Some(date));
        }
        if let Some(date) = inspection {
            model.inspection_date = Set(Some(date));
        }
        model.update(db).await?;
        tracing::info!(
            name = "store.due_dates.normalized",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            vehicle_id = id,
            message = "Stored due dates rewritten as local calendar dates"
        );
        changed += 1;
    }
    Ok(changed)
}

/// Deletes a vehicle together with its mileage log. Returns `false` if it did not exist.
#[tracing::instrument(skip(db))]
pub async fn delete_vehicle(db: &DatabaseConnection, id: i32) -> Result<bool, StoreError> {
    let txn = db.begin().await?;
    mileage_log::Entity::delete_many()
        .filter(mileage_log::Column::VehicleId.eq(id))
        .exec(&txn)
        .await?;
    let result = vehicle::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(result.rows_affected > 0)
}

#[tracing::instrument(skip(db, entry), fields(mileage = entry.mileage))]
pub async fn add_mileage_entry(
    db: &DatabaseConnection,
    vehicle_id: i32,
    entry: NewMileageEntry,
) -> Result<mileage_log::Model, StoreError> {
    existing_vehicle(db, vehicle_id).await?;
    let model = mileage_log::ActiveModel {
        vehicle_id: Set(vehicle_id),
        mileage: Set(entry.mileage),
        action: Set(entry.action.trim().to_string()),
        event_date: Set(entry.event_date),
        date_added: Set(OffsetDateTime::now_utc()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Log entries of one vehicle, most recent event first, ties by newest insert.
#[tracing::instrument(skip(db))]
pub async fn mileage_entries(
    db: &DatabaseConnection,
    vehicle_id: i32,
) -> Result<Vec<mileage_log::Model>, StoreError> {
    Ok(mileage_log::Entity::find()
        .filter(mileage_log::Column::VehicleId.eq(vehicle_id))
        .order_by_desc(mileage_log::Column::EventDate)
        .order_by_desc(mileage_log::Column::Id)
        .all(db)
        .await?)
}

/// Every log entry of the fleet, in the same per-vehicle order as [`mileage_entries`].
#[tracing::instrument(skip_all)]
pub async fn all_mileage_entries(
    db: &DatabaseConnection,
) -> Result<Vec<mileage_log::Model>, StoreError> {
    Ok(mileage_log::Entity::find()
        .order_by_asc(mileage_log::Column::VehicleId)
        .order_by_desc(mileage_log::Column::EventDate)
        .order_by_desc(mileage_log::Column::Id)
        .all(db)
        .await?)
}

#[tracing::instrument(skip(db, recipient))]
pub async fn record_reminder(
    db: &DatabaseConnection,
    vehicle_id: i32,
    document: TrackedDocument,
    recipient: &str,
    days_remaining: i64,
) -> Result<reminder_log::Model, StoreError> {
    let model = reminder_log::ActiveModel {
        vehicle_id: Set(vehicle_id),
        document: Set(document.as_str().to_string()),
        recipient: Set(recipient.to_string()),
        days_remaining: Set(days_remaining.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
        sent_at: Set(OffsetDateTime::now_utc()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Reminder e-mails sent for one vehicle, most recent first.
#[tracing::instrument(skip(db))]
pub async fn reminders_for_vehicle(
    db: &DatabaseConnection,
    vehicle_id: i32,
) -> Result<Vec<reminder_log::Model>, StoreError> {
    Ok(reminder_log::Entity::find()
        .filter(reminder_log::Column::VehicleId.eq(vehicle_id))
        .order_by_desc(reminder_log::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_with_garage(id: i32, garage: Option<&str>) -> vehicle::Model {
        vehicle::Model {
            id,
            brand: None,
            model_name: None,
            plate: None,
            vin: None,
            year: None,
            garage: garage.map(str::to_string),
            note: None,
            image_path: None,
            policy_number: None,
            insurance_date: None,
            inspection_date: None,
            reminder_email: None,
            created_on: time::macros::date!(2026 - 01 - 01),
        }
    }

    #[test]
    fn garages_are_distinct_in_first_seen_order() {
        let vehicles = vec![
            vehicle_with_garage(3, Some("North")),
            vehicle_with_garage(2, None),
            vehicle_with_garage(1, Some(" ")),
            vehicle_with_garage(4, Some("South")),
            vehicle_with_garage(5, Some("North")),
        ];
        assert_eq!(garages_of(&vehicles), vec!["North", "South"]);
    }

    #[test]
    fn placeholder_images_are_recognised() {
        assert!(is_placeholder_image(""));
        assert!(is_placeholder_image("/img/fred.jpg"));
        assert!(!is_placeholder_image("1718000000000.jpg"));
    }

    #[test]
    fn blank_values_become_none() {
        assert_eq!(non_blank("  ".into()), None);
        assert_eq!(non_blank(" VW ".into()), Some("VW".into()));
    }
}
