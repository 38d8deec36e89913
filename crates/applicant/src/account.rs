//! Registration, sign-in and sign-out.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::backend::{Identity, IdentityProvider, RecordStore};
use crate::collections::Collections;
use crate::error::ApplicationError;
use crate::field::{Choice, FieldKind, FieldValue, FormField, FormValues};
use crate::format::{COUNTRY_PREFIX, format};
use crate::profile::UserProfile;
use crate::session::Session;
use crate::validate::{ValidationErrors, validate_fields};

pub const KAZAKHSTAN_CITIES: &[Choice] = &[
    Choice::plain("Алматы"),
    Choice::plain("Нур-Султан"),
    Choice::plain("Шымкент"),
    Choice::plain("Караганда"),
    Choice::plain("Актобе"),
    Choice::plain("Тараз"),
    Choice::plain("Павлодар"),
    Choice::plain("Усть-Каменогорск"),
    Choice::plain("Семей"),
    Choice::plain("Костанай"),
    Choice::plain("Атырау"),
    Choice::plain("Кызылорда"),
    Choice::plain("Уральск"),
    Choice::plain("Петропавловск"),
    Choice::plain("Актау"),
    Choice::plain("Темиртау"),
    Choice::plain("Туркестан"),
];

const PASSWORD_MISMATCH: &str = "Пароли не совпадают";
const LOGIN_INCOMPLETE: &str = "Пожалуйста, заполните все поля";

/// Cities whose name contains `query`, ignoring case.
pub fn filter_cities(query: &str) -> Vec<&'static str> {
    let needle = query.to_lowercase();
    KAZAKHSTAN_CITIES
        .iter()
        .map(|city| city.value)
        .filter(|city| city.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    FirstName,
    LastName,
    PhoneNumber,
    Email,
    City,
    Password,
    ConfirmPassword,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::PhoneNumber,
        Self::Email,
        Self::City,
        Self::Password,
        Self::ConfirmPassword,
    ];
}

impl FormField for RegistrationField {
    fn key(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::City => "city",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::FirstName | Self::LastName => FieldKind::Text,
            Self::PhoneNumber => FieldKind::CompactPhone,
            Self::Email => FieldKind::Email,
            Self::City => FieldKind::Choice(KAZAKHSTAN_CITIES),
            Self::Password | Self::ConfirmPassword => FieldKind::Secret,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FirstName => "Введите имя",
            Self::LastName => "Введите фамилию",
            Self::PhoneNumber => "Введите номер телефона",
            Self::Email => "Введите почту",
            Self::City => "Выберите город",
            Self::Password => "Введите пароль",
            Self::ConfirmPassword => "Подтвердите пароль",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Self::FirstName => "Введите имя",
            Self::LastName => "Введите фамилию",
            Self::PhoneNumber => "Введите корректный номер телефона (начинается с +7)",
            Self::Email => "Введите корректный адрес электронной почты",
            Self::City => "Выберите город",
            Self::Password => "Введите пароль",
            Self::ConfirmPassword => "Подтвердите пароль",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Self::PhoneNumber => "Введите корректный номер телефона (начинается с +7)",
            Self::Email => "Введите корректный адрес электронной почты",
            Self::City => "Выберите город",
            _ => "Неверный формат",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub city: String,
    pub password: String,
    pub confirm_password: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone_number: COUNTRY_PREFIX.to_string(),
            email: String::new(),
            city: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

impl RegistrationForm {
    /// Store typed input, applying the phone rule.
    pub fn set_input(&mut self, field: RegistrationField, raw: &str) {
        let previous = self.value(field);
        let value = format(field.kind(), raw, previous.as_text());
        self.set(field, value.into());
    }

    /// Presence and format of every field, then the password confirmation.
    pub fn validate(&self) -> ValidationErrors<RegistrationField> {
        let mut errors = validate_fields(
            self,
            &RegistrationField::ALL[..RegistrationField::ALL.len() - 1],
        );
        if self.password != self.confirm_password {
            errors.push(RegistrationField::ConfirmPassword, PASSWORD_MISMATCH);
        }
        errors
    }
}

impl FormValues for RegistrationForm {
    type Field = RegistrationField;

    fn value(&self, field: RegistrationField) -> FieldValue {
        let text = match field {
            RegistrationField::FirstName => &self.first_name,
            RegistrationField::LastName => &self.last_name,
            RegistrationField::PhoneNumber => &self.phone_number,
            RegistrationField::Email => &self.email,
            RegistrationField::City => &self.city,
            RegistrationField::Password => &self.password,
            RegistrationField::ConfirmPassword => &self.confirm_password,
        };
        FieldValue::Text(text.clone())
    }

    fn set(&mut self, field: RegistrationField, value: FieldValue) {
        let text = value.as_text().to_string();
        match field {
            RegistrationField::FirstName => self.first_name = text,
            RegistrationField::LastName => self.last_name = text,
            RegistrationField::PhoneNumber => self.phone_number = text,
            RegistrationField::Email => self.email = text,
            RegistrationField::City => self.city = text,
            RegistrationField::Password => self.password = text,
            RegistrationField::ConfirmPassword => self.confirm_password = text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ApplicationError::Invalid(LOGIN_INCOMPLETE.to_string()));
        }
        Ok(())
    }
}

/// Account flows. The only place a [`Session`] is established or ended.
#[derive(Clone)]
pub struct Accounts {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn RecordStore>,
    users: String,
}

impl Accounts {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn RecordStore>,
        collections: &Collections,
    ) -> Self {
        Self {
            identity,
            store,
            users: collections.users.clone(),
        }
    }

    /// Create the account and its profile record.
    ///
    /// The session is established as soon as the provider accepts the
    /// account. A failed profile write is reported but does not undo that.
    pub async fn register(
        &self,
        session: &mut Session,
        form: &RegistrationForm,
    ) -> Result<Identity, ApplicationError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(errors.into_error());
        }

        let identity = self
            .identity
            .sign_up(&form.email, &form.password)
            .await
            .map_err(|err| {
                warn!(error = %err, "sign-up failed");
                ApplicationError::from(err)
            })?;
        session.establish(identity.clone());

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let profile = UserProfile::from_registration(form, created_at);
        if let Err(err) = self
            .store
            .put_record(&self.users, &identity.uid, profile.to_fields())
            .await
        {
            warn!(uid = %identity.uid, error = %err, "failed to store profile");
            return Err(err.into());
        }

        info!(uid = %identity.uid, "account registered");
        Ok(identity)
    }

    pub async fn sign_in(
        &self,
        session: &mut Session,
        form: &LoginForm,
    ) -> Result<Identity, ApplicationError> {
        form.validate()?;
        let identity = self
            .identity
            .sign_in(&form.email, &form.password)
            .await
            .map_err(|err| {
                warn!(error = %err, "sign-in failed");
                ApplicationError::from(err)
            })?;
        session.establish(identity.clone());
        Ok(identity)
    }

    /// End the session. The local session is gone even if the provider call fails.
    pub async fn sign_out(&self, session: &mut Session) {
        if let Some(identity) = session.end() {
            if let Err(err) = self.identity.sign_out(&identity).await {
                warn!(uid = %identity.uid, error = %err, "provider sign-out failed");
            }
        }
    }

    /// Turn an identity persisted by an earlier run into a live session.
    pub async fn resume(&self, identity: Identity) -> Result<Session, ApplicationError> {
        let identity = self.identity.resume(identity).await.map_err(|err| {
            warn!(error = %err, "could not resume session");
            ApplicationError::from(err)
        })?;
        Ok(Session::restored(identity))
    }
}
