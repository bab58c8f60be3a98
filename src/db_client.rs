use tokio_postgres::{Client, NoTls};

#[derive(Clone)]
pub struct DbConfig {
	pub host: String,
	pub user: String,
	pub password: String,
	pub dbname: String,
}

impl DbConfig {
	fn connection_string(&self) -> String {
		let mut config = format!("host={} user={} dbname={}", self.host, self.user, self.dbname);
		if !self.password.is_empty() {
			config.push_str(&format!(" password={}", self.password));
		}
		config
	}
}

impl std::fmt::Debug for DbConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DbConfig")
			.field("host", &self.host)
			.field("user", &self.user)
			.field("dbname", &self.dbname)
			.finish_non_exhaustive()
	}
}

/// Opens a connection for the lifetime of one request. The background
/// connection task ends once the returned client is dropped.
pub async fn db_client(config: &DbConfig) -> Result<Client, tokio_postgres::Error> {
	let (client, connection) = tokio_postgres::connect(&config.connection_string(), NoTls).await?;

	tokio::spawn(async move {
		if let Err(e) = connection.await {
			log::error!("database connection error: {}", e);
		}
	});

	Ok(client)
}
