use anyhow::Context;
use mpesa_server::{
	config::AppConfig,
	db_client::db_client,
	payment_gateway::MpesaClient,
	payments::{self, AppState},
	transactions,
};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = AppConfig::from_env()?;
	log::info!("starting with {:?}", config.credentials);

	let db = db_client(&config.db).await.context("unable to reach the database")?;
	transactions::ensure_schema(&db).await.context("unable to create transactions table")?;
	drop(db);

	let state = AppState {
		gateway: MpesaClient::new(config.credentials),
		db: config.db,
		checkout: config.checkout,
	};
	let app = payments::router(state).layer(CorsLayer::permissive());

	let listener = tokio::net::TcpListener::bind(config.bind_addr.trim())
		.await
		.with_context(|| format!("unable to bind {}", config.bind_addr))?;
	log::info!("listening on {}", config.bind_addr);
	axum::serve(listener, app).await?;
	Ok(())
}
