use std::sync::Arc;

use tracing::{info, warn};

use crate::account::RegistrationForm;
use crate::backend::{Document, RecordStore};
use crate::collections::Collections;
use crate::error::{ApplicationError, StoreError};
use crate::field::Fields;
use crate::session::Session;

const PROFILE_INCOMPLETE: &str = "Пожалуйста, заполните все поля.";

/// The stored profile of a user (`users/{uid}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub city: String,
    pub created_at: Option<String>,
}

impl UserProfile {
    pub fn from_registration(form: &RegistrationForm, created_at: String) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            phone_number: form.phone_number.clone(),
            email: form.email.clone(),
            city: form.city.clone(),
            created_at: Some(created_at),
        }
    }

    pub fn from_document(document: &Document) -> Self {
        Self {
            first_name: document.text_or_empty("firstName"),
            last_name: document.text_or_empty("lastName"),
            phone_number: document.text_or_empty("phoneNumber"),
            email: document.text_or_empty("email"),
            city: document.text_or_empty("city"),
            created_at: document.text("createdAt").map(str::to_string),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("firstName".into(), self.first_name.as_str().into());
        fields.insert("lastName".into(), self.last_name.as_str().into());
        fields.insert("phoneNumber".into(), self.phone_number.as_str().into());
        fields.insert("email".into(), self.email.as_str().into());
        fields.insert("city".into(), self.city.as_str().into());
        if let Some(created_at) = &self.created_at {
            fields.insert("createdAt".into(), created_at.as_str().into());
        }
        fields
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Edits the two user-editable profile fields: phone and city.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    loaded: UserProfile,
    pub phone_number: String,
    pub city: String,
}

impl ProfileEditor {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            phone_number: profile.phone_number.clone(),
            city: profile.city.clone(),
            loaded: profile,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.phone_number != self.loaded.phone_number || self.city != self.loaded.city
    }

    /// Drop the edits.
    pub fn cancel(&mut self) {
        self.phone_number = self.loaded.phone_number.clone();
        self.city = self.loaded.city.clone();
    }

    /// The loaded profile with the edits applied.
    pub fn merged(&self) -> Result<UserProfile, ApplicationError> {
        if self.phone_number.is_empty() || self.city.is_empty() {
            return Err(ApplicationError::Invalid(PROFILE_INCOMPLETE.to_string()));
        }
        Ok(UserProfile {
            phone_number: self.phone_number.clone(),
            city: self.city.clone(),
            ..self.loaded.clone()
        })
    }
}

#[derive(Clone)]
pub struct Profiles {
    store: Arc<dyn RecordStore>,
    collection: String,
}

impl Profiles {
    pub fn new(store: Arc<dyn RecordStore>, collections: &Collections) -> Self {
        Self {
            store,
            collection: collections.users.clone(),
        }
    }

    pub async fn load(&self, session: &Session) -> Result<UserProfile, ApplicationError> {
        let identity = session.require()?;
        match self.store.get_record(&self.collection, &identity.uid).await {
            Ok(Some(document)) => Ok(UserProfile::from_document(&document)),
            Ok(None) => {
                warn!(uid = %identity.uid, "no profile record");
                Err(ApplicationError::ProfileMissing)
            }
            Err(err) => {
                warn!(uid = %identity.uid, error = %err, "failed to load profile");
                Err(err.into())
            }
        }
    }

    /// Validate and write the edits. Only `phoneNumber` and `city` are sent;
    /// every other key of the stored record is left as it is. On success the
    /// editor holds the saved profile.
    pub async fn save(
        &self,
        session: &Session,
        editor: &mut ProfileEditor,
    ) -> Result<UserProfile, ApplicationError> {
        let identity = session.require()?;
        let merged = editor.merged()?;
        let mut edits = Fields::new();
        edits.insert("phoneNumber".into(), merged.phone_number.as_str().into());
        edits.insert("city".into(), merged.city.as_str().into());
        match self
            .store
            .update_record(&self.collection, &identity.uid, edits)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                warn!(uid = %identity.uid, "no profile record to update");
                return Err(ApplicationError::ProfileMissing);
            }
            Err(err) => {
                warn!(uid = %identity.uid, error = %err, "failed to save profile");
                return Err(err.into());
            }
        }
        info!(uid = %identity.uid, "profile updated");
        *editor = ProfileEditor::new(merged.clone());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Identity;
    use crate::field::FieldValue;
    use crate::testing::FakeStore;
    use pretty_assertions::assert_eq;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: "Айгерим".into(),
            last_name: "Садыкова".into(),
            phone_number: "+77001234567".into(),
            email: "aigerim@columbus.kz".into(),
            city: "Алматы".into(),
            created_at: Some("2024-05-01T10:00:00.000Z".into()),
        }
    }

    fn setup() -> (Arc<FakeStore>, Profiles, Session) {
        let store = Arc::new(FakeStore::default());
        store.insert("users", "u1", profile().to_fields());
        let profiles = Profiles::new(store.clone(), &Collections::default());
        (store, profiles, Session::restored(Identity::new("u1", "a@b.kz")))
    }

    #[test]
    fn cancel_restores_loaded_values() {
        let mut editor = ProfileEditor::new(profile());
        editor.city = "Тараз".into();
        assert!(editor.is_dirty());
        editor.cancel();
        assert!(!editor.is_dirty());
        assert_eq!(editor.city, "Алматы");
    }

    #[test]
    fn both_fields_are_required() {
        let mut editor = ProfileEditor::new(profile());
        editor.phone_number.clear();
        assert!(matches!(editor.merged(), Err(ApplicationError::Invalid(_))));
    }

    #[tokio::test]
    async fn load_and_save() {
        let (store, profiles, session) = setup();
        let loaded = profiles.load(&session).await.unwrap();
        assert_eq!(loaded, profile());
        assert_eq!(loaded.full_name(), "Айгерим Садыкова");

        let mut editor = ProfileEditor::new(loaded);
        editor.city = "Тараз".into();
        let saved = profiles.save(&session, &mut editor).await.unwrap();
        assert_eq!(saved.city, "Тараз");
        assert_eq!(saved.first_name, "Айгерим");
        assert!(!editor.is_dirty());

        let stored = UserProfile::from_document(&Document::new(
            "u1",
            store.fields("users", "u1").unwrap(),
        ));
        assert_eq!(stored, saved);
    }

    #[tokio::test]
    async fn save_keeps_keys_the_profile_does_not_model() {
        let (store, profiles, session) = setup();
        let mut stored = profile().to_fields();
        stored.insert("avatar".into(), "avatars/u1.png".into());
        stored.insert("staffNote".into(), "звонили 12.05".into());
        store.insert("users", "u1", stored);

        let mut editor = ProfileEditor::new(profiles.load(&session).await.unwrap());
        editor.city = "Шымкент".into();
        profiles.save(&session, &mut editor).await.unwrap();

        let fields = store.fields("users", "u1").unwrap();
        assert_eq!(fields.get("avatar"), Some(&FieldValue::from("avatars/u1.png")));
        assert_eq!(fields.get("staffNote"), Some(&FieldValue::from("звонили 12.05")));
        assert_eq!(fields.get("city"), Some(&FieldValue::from("Шымкент")));
        assert_eq!(fields.get("firstName"), Some(&FieldValue::from("Айгерим")));
    }

    #[tokio::test]
    async fn failed_save_keeps_the_edits() {
        let (store, profiles, session) = setup();
        let mut editor = ProfileEditor::new(profile());
        editor.city = "Тараз".into();
        store.fail_writes(true);

        assert!(matches!(
            profiles.save(&session, &mut editor).await,
            Err(ApplicationError::Transient(_))
        ));
        assert!(editor.is_dirty());
        assert_eq!(
            store.fields("users", "u1").unwrap().get("city"),
            Some(&FieldValue::from("Алматы"))
        );
    }

    #[tokio::test]
    async fn missing_profile() {
        let (store, profiles, _) = setup();
        let session = Session::restored(Identity::new("u2", "b@b.kz"));
        assert!(matches!(
            profiles.load(&session).await,
            Err(ApplicationError::ProfileMissing)
        ));

        let mut editor = ProfileEditor::new(profile());
        editor.city = "Тараз".into();
        assert!(matches!(
            profiles.save(&session, &mut editor).await,
            Err(ApplicationError::ProfileMissing)
        ));
        assert_eq!(store.fields("users", "u2"), None);
    }
}
