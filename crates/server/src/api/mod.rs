pub mod handlers;
pub mod meals;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
