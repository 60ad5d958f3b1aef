pub mod auth_handlers;
pub mod hr_handlers;
pub mod user_handlers;

pub use auth_handlers::auth_routes;
pub use hr_handlers::hr_routes;
pub use user_handlers::user_routes;
