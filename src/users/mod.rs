/// User records and their persistence
///
/// `UserStore` is the only way handlers and the token lifecycle touch
/// stored users. Postgres backs it in production; the in-memory store
/// backs tests and local runs without a database.

mod in_memory;
mod model;
mod postgres;
mod store;

pub use in_memory::InMemoryUserStore;
pub use model::{NewUser, User, UserResponse};
pub use postgres::PgUserStore;
pub use store::UserStore;
