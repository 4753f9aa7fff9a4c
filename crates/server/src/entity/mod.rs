pub mod mileage_log;
pub mod reminder_log;
pub mod vehicle;
