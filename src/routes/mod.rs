mod account;
mod auth;
mod health_check;

pub use account::{change_password, get_current_user, update_account};
pub use auth::{login, logout, refresh, register};
pub use health_check::health_check;
