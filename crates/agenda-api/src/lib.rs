pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod tls;

pub use server::run;
pub use state::AppState;
pub use tls::{LetsEncryptConfig, TlsConfig};

// Re-export commonly used types
pub use agenda_core::*;
