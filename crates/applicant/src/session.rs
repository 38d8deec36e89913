use tracing::info;

use crate::backend::Identity;
use crate::error::ApplicationError;

/// The signed-in identity of this process, if any.
///
/// Only [`Accounts`](crate::account::Accounts) establishes or ends a session;
/// everything else receives it by reference and only reads it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn restored(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// The identity, or `AuthenticationRequired`.
    pub fn require(&self) -> Result<&Identity, ApplicationError> {
        self.identity
            .as_ref()
            .ok_or(ApplicationError::AuthenticationRequired)
    }

    pub(crate) fn establish(&mut self, identity: Identity) {
        info!(uid = %identity.uid, "session established");
        self.identity = Some(identity);
    }

    pub(crate) fn end(&mut self) -> Option<Identity> {
        let identity = self.identity.take();
        if let Some(identity) = &identity {
            info!(uid = %identity.uid, "session ended");
        }
        identity
    }
}
