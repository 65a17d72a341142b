use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::dispatcher::{Dispatcher, private_channel};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid session at all.
    #[error("not authenticated")]
    Unauthenticated,

    /// Valid session, but it may not subscribe to this channel.
    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The authenticated identity behind a subscription request, as established
/// by the embedding application's auth layer. Never built from
/// client-supplied data.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
}

impl<T: Transport> Dispatcher<T> {
    /// Gate a private-channel subscription: a session may only subscribe to
    /// its own channel. `requested_user_id` and `channel` come from the
    /// client and are trusted for nothing beyond comparison against the
    /// session; the signed channel name must be the session's own.
    pub fn authorize_subscription(
        &self,
        session: Option<&Session>,
        requested_user_id: Uuid,
        channel: &str,
        socket_id: &str,
    ) -> Result<String, AuthError> {
        let session = session.ok_or(AuthError::Unauthenticated)?;

        if session.user_id != requested_user_id {
            return Err(AuthError::Unauthorized);
        }

        if channel != private_channel(session.user_id) {
            return Err(AuthError::Unauthorized);
        }

        let auth_payload = json!({
            "user_id": session.user_id,
            "user_info": { "name": session.name },
        })
        .to_string();

        Ok(self
            .transport()
            .sign_subscription(channel, socket_id, &auth_payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LocalTransport;

    fn dispatcher() -> Dispatcher<LocalTransport> {
        Dispatcher::new(LocalTransport::new("key", "secret"))
    }

    #[test]
    fn a_session_may_subscribe_to_its_own_channel() {
        let d = dispatcher();
        let user_id = Uuid::new_v4();
        let session = Session {
            user_id,
            name: "Alice".into(),
        };

        let token = d
            .authorize_subscription(
                Some(&session),
                user_id,
                &crate::private_channel(user_id),
                "socket-1",
            )
            .unwrap();
        assert!(token.starts_with("key:"));
    }

    #[test]
    fn someone_elses_channel_is_denied() {
        let d = dispatcher();
        let session = Session {
            user_id: Uuid::new_v4(),
            name: "Alice".into(),
        };
        let other = Uuid::new_v4();

        let result = d.authorize_subscription(
            Some(&session),
            other,
            &crate::private_channel(other),
            "socket-1",
        );
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[test]
    fn a_matching_id_with_a_foreign_channel_name_is_denied() {
        let d = dispatcher();
        let user_id = Uuid::new_v4();
        let session = Session {
            user_id,
            name: "Alice".into(),
        };

        let result = d.authorize_subscription(
            Some(&session),
            user_id,
            &crate::private_channel(Uuid::new_v4()),
            "socket-1",
        );
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[test]
    fn no_session_is_unauthenticated_not_unauthorized() {
        let d = dispatcher();
        let user_id = Uuid::new_v4();

        let result = d.authorize_subscription(
            None,
            user_id,
            &crate::private_channel(user_id),
            "socket-1",
        );
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }
}
