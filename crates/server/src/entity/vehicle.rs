use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::Date;
use utoipa::ToSchema;

/// A fleet vehicle with its two tracked document dates.
///
/// Document dates are kept as ISO strings; rows written before input validation
/// may hold anything, which the expiry evaluator treats as "not tracked".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "vehicle")]
#[schema(as = Vehicle)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: Option<String>,
    #[sea_orm(column_name = "model")]
    #[serde(rename = "model")]
    pub model_name: Option<String>,
    pub plate: Option<String>,
    pub vin: Option<String>,
    pub year: Option<String>,
    pub garage: Option<String>,
    pub note: Option<String>,
    pub image_path: Option<String>,
    pub policy_number: Option<String>,
    pub insurance_date: Option<String>,
    pub inspection_date: Option<String>,
    pub reminder_email: Option<String>,
    #[schema(value_type = String, format = Date)]
    pub created_on: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mileage_log::Entity")]
    MileageLog,
}

impl Related<super::mileage_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MileageLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// "Brand Model", falling back to the id when both are missing.
    pub fn display_name(&self) -> String {
        let name = [self.brand.as_deref(), self.model_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            format!("Vehicle #{}", self.id)
        } else {
            name
        }
    }

    /// Reminder address, if one is configured and not blank.
    pub fn reminder_recipient(&self) -> Option<&str> {
        self.reminder_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
