mod account;
mod apply;
mod config;
mod feed;
mod profile;

use std::io::{BufRead, Write};

use applicant::{
    Accounts, ApplicationError, Applications, Collections, Feeds, Profiles, Session,
};
use backend::Backend;
use color_eyre::Result;
use tracing::debug;

use crate::cli::Cmd;
use crate::errors::user_error;
use crate::prompt::Prompt;
use crate::session_store::SessionStore;

pub use config::run as run_config;

/// Flows wired to one backend.
pub struct Services {
    pub accounts: Accounts,
    pub applications: Applications,
    pub profiles: Profiles,
    pub feeds: Feeds,
    pub sessions: SessionStore,
}

impl Services {
    pub fn new(backend: Backend, collections: &Collections, sessions: SessionStore) -> Self {
        Self {
            accounts: Accounts::new(backend.identity.clone(), backend.store.clone(), collections),
            applications: Applications::new(backend.store.clone(), collections),
            profiles: Profiles::new(backend.store.clone(), collections),
            feeds: Feeds::new(backend.store, collections),
            sessions,
        }
    }

    /// The stored session, resumed against the identity provider.
    pub async fn session(&self) -> Result<Session> {
        let Some(stored) = self.sessions.load()? else {
            return Ok(Session::anonymous());
        };
        let session = self.accounts.resume(stored.clone()).await.map_err(user_error)?;
        if let Some(identity) = session.identity().filter(|identity| **identity != stored) {
            debug!(uid = %identity.uid, "refreshed stored session");
            self.sessions.save(identity)?;
        }
        Ok(session)
    }

    /// Like [`Services::session`], but an anonymous session is an error.
    pub async fn signed_in(&self) -> Result<Session> {
        let session = self.session().await?;
        if !session.is_signed_in() {
            return Err(user_error(ApplicationError::AuthenticationRequired));
        }
        Ok(session)
    }
}

/// Run every command except `config`, which needs no backend.
pub async fn run<R: BufRead, W: Write>(
    cmd: Cmd,
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    match cmd {
        Cmd::Register => account::register(services, prompt).await,
        Cmd::Login => account::login(services, prompt).await,
        Cmd::Logout => account::logout(services, prompt).await,
        Cmd::Whoami => account::whoami(services, prompt).await,
        Cmd::Apply { variant } => apply::apply(variant, services, prompt).await,
        Cmd::Status => apply::status(services, prompt).await,
        Cmd::Profile { action } => profile::run(action, services, prompt).await,
        Cmd::Feed => feed::list(services, prompt).await,
        Cmd::Respond { vacancy_id } => feed::respond(&vacancy_id, services, prompt).await,
        Cmd::About => feed::about(prompt),
        // Handled before a backend is connected.
        Cmd::Config { .. } => Ok(()),
    }
}
