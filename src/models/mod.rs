pub mod user;
pub mod alert;
pub mod alert_history;
pub mod event;

pub use user::{CurrentUser, User};
pub use alert::{Alert, Direction};
pub use alert_history::AlertHistory;
pub use event::AlertEvent;
