pub mod error;
pub mod handlers;
pub mod health;
pub mod routes;
pub mod server;
pub mod state;

pub use error::*;
pub use handlers::*;
pub use health::*;
pub use routes::*;
pub use server::*;
pub use state::*;
