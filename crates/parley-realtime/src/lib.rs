pub mod auth;
pub mod dispatcher;
pub mod transport;

pub use auth::{AuthError, Session};
pub use dispatcher::{Dispatcher, private_channel};
pub use transport::{Envelope, LocalTransport, Transport, TransportError};
