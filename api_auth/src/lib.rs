pub mod client;
pub mod listener;
pub mod refresh;
pub mod session;
pub mod transport;

pub mod services {
    pub mod auth;
}

pub mod dtos {
    pub mod auth;
}

pub use client::ApiClient;
pub use listener::{LoginRedirect, SessionListener};
pub use session::SessionStore;
pub use transport::{ReqwestTransport, Transport};
