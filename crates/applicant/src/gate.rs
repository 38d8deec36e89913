use tracing::debug;

use crate::error::ApplicationError;
use crate::forms::ApplicationForm;
use crate::session::Session;
use crate::submission::Applications;
use crate::wizard::Wizard;

/// Open the wizard for the signed-in applicant.
///
/// Reads the applicant's submission exactly once. An existing submission opens
/// the wizard straight in its status view; otherwise it starts on step one.
/// Nothing is re-checked later; open a new wizard to see a changed status.
pub async fn open_wizard<F: ApplicationForm>(
    session: &Session,
    applications: &Applications,
) -> Result<Wizard<F>, ApplicationError> {
    let identity = session.require()?;
    match applications.find(identity).await? {
        Some(record) => {
            debug!(uid = %identity.uid, status = %record.status, "existing submission");
            Ok(Wizard::submitted(record.status))
        }
        None => Ok(Wizard::new()),
    }
}
