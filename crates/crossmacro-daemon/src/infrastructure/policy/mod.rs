//! PolicyKit-backed authorization for the `org.crossmacro.capture` action.
//!
//! # What is PolicyKit? (for beginners)
//!
//! PolicyKit (`polkit`) is the standard Linux mechanism for letting an
//! unprivileged process ask a privileged one "is this specific caller
//! allowed to do this specific thing right now?" — without the privileged
//! process needing to know anything about users, groups, or passwords
//! itself. The daemon just hands the caller's uid and an action name to
//! `polkitd` over D-Bus and gets back yes/no. The actual policy (which
//! users, which groups, whether to prompt) lives in the `.policy` XML file
//! installed alongside the daemon.

use async_trait::async_trait;
use zbus::Connection;
use zvariant::Value;

use crate::application::session::Authorizer;

/// Action id checked against the installed polkit policy file.
pub const CAPTURE_ACTION_ID: &str = "org.crossmacro.capture";

/// Authorizes via the `org.freedesktop.PolicyKit1.Authority` D-Bus service.
pub struct PolicyKitAuthorizer {
    connection: Connection,
}

impl PolicyKitAuthorizer {
    /// Connects to the system bus. This is the only fallible step; once
    /// connected, `authorize` treats any D-Bus error as a denial rather
    /// than propagating it, since a broken polkit is a security-relevant
    /// failure and must fail closed.
    pub async fn connect() -> zbus::Result<Self> {
        let connection = Connection::system().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl Authorizer for PolicyKitAuthorizer {
    async fn authorize(&self, uid: u32) -> bool {
        let subject = (
            "unix-process",
            {
                let mut details = std::collections::HashMap::new();
                details.insert("uid", Value::from(uid as i32));
                details
            },
        );
        let details: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();

        let result = self
            .connection
            .call_method(
                Some("org.freedesktop.PolicyKit1"),
                "/org/freedesktop/PolicyKit1/Authority",
                Some("org.freedesktop.PolicyKit1.Authority"),
                "CheckAuthorization",
                &(subject, CAPTURE_ACTION_ID, details, 0u32, ""),
            )
            .await;

        match result {
            Ok(reply) => reply
                .body()
                .deserialize::<(bool, bool, std::collections::HashMap<String, String>)>()
                .map(|(is_authorized, _is_challenge, _details)| is_authorized)
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
pub mod tests_support {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Always returns a fixed decision; used by session state machine tests.
    pub struct FixedAuthorizer(pub AtomicBool);

    impl FixedAuthorizer {
        pub fn allow() -> Self {
            Self(AtomicBool::new(true))
        }

        pub fn deny() -> Self {
            Self(AtomicBool::new(false))
        }
    }

    #[async_trait]
    impl Authorizer for FixedAuthorizer {
        async fn authorize(&self, _uid: u32) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }
}
