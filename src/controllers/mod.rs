pub mod home_controller;
pub mod auth_controller;
pub mod alerts_controller;
pub mod stocks_controller;
pub mod tasks_controller;
pub mod realtime_controller;
