pub mod finnhub;
pub mod db_init;
pub mod alert_monitor;

pub mod engine;
pub mod transition;
pub mod notify;
pub mod registry;
pub mod email;

pub mod auth_service;
pub mod alerts_service;
pub mod stocks_service;
