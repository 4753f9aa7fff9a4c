use goose::prelude::*;
use std::env;

fn bearer_token() -> String {
    env::var("FLEET_TOKEN").unwrap_or_default()
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

async fn authorized_get(user: &mut GooseUser, path: &str) -> TransactionResult {
    let request_builder = user
        .get_request_builder(&GooseMethod::Get, path)?
        .bearer_auth(bearer_token());
    let goose_request = GooseRequest::builder()
        .set_request_builder(request_builder)
        .build();
    let _goose_metrics = user.request(goose_request).await?;
    Ok(())
}

async fn get_dashboard(user: &mut GooseUser) -> TransactionResult {
    authorized_get(user, "/api/dashboard").await
}

async fn get_alerts(user: &mut GooseUser) -> TransactionResult {
    authorized_get(user, "/api/alerts").await
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    if env::var("FLEET_TOKEN").is_err() {
        println!("No FLEET_TOKEN set; authenticated scenarios will receive 401 responses");
    }

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(
            scenario!("FleetDashboard")
                .register_transaction(transaction!(get_dashboard))
                .register_transaction(transaction!(get_alerts)),
        )
        .execute()
        .await?;

    Ok(())
}
