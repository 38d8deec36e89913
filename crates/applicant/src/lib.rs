//! Applicant-side logic of the Columbus work-and-travel client.
//!
//! The heart of the crate is the application [`wizard`]: a typed form walked
//! step by step, each step gated by [`validate`], ending in a single
//! submission. [`gate::open_wizard`] decides on entry whether the applicant
//! sees the wizard or the status of an earlier submission.
//!
//! Persistence and authentication go through the traits in [`backend`];
//! implementations live in the `backend` crate.

pub mod account;
pub mod backend;
pub mod collections;
pub mod error;
pub mod feed;
pub mod field;
pub mod format;
pub mod forms;
pub mod gate;
pub mod profile;
pub mod session;
pub mod submission;
pub mod validate;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use account::{Accounts, LoginForm, RegistrationField, RegistrationForm};
pub use backend::{Document, Identity, IdentityProvider, Query, RecordStore};
pub use collections::Collections;
pub use error::{ApplicationError, AuthError, StoreError};
pub use feed::{Feed, Feeds, HIGHLIGHTS, NewsItem, Vacancy};
pub use field::{Choice, FieldKind, FieldValue, Fields, FormField, FormValues};
pub use forms::{
    ApplicationForm, ConsultationField, ConsultationForm, EnrollmentField, EnrollmentForm,
    StepDefinition,
};
pub use gate::open_wizard;
pub use profile::{ProfileEditor, Profiles, UserProfile};
pub use session::Session;
pub use submission::{ApplicationStatus, Applications, SubmissionRecord, SubmitOutcome};
pub use validate::ValidationErrors;
pub use wizard::{Advance, Transition, Wizard, WizardState};
