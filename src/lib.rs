pub mod config;
pub mod db_client;
pub mod payment_gateway;
pub mod payments;
pub mod transactions;
