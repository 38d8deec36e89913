use thiserror::Error;

/// Failures reported by the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("email already in use")]
    EmailInUse,

    #[error("password too weak")]
    WeakPassword,

    #[error("no account for this email")]
    NotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("invalid email")]
    InvalidEmail,

    #[error("network error: {0}")]
    Network(String),

    #[error("identity provider error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Message shown to the applicant.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::EmailInUse => "Этот email уже зарегистрирован.",
            AuthError::WeakPassword => "Пароль слишком слабый.",
            AuthError::NotFound => "Пользователь не найден.",
            AuthError::WrongPassword => "Неправильный пароль.",
            AuthError::InvalidEmail => "Неверный формат электронной почты.",
            AuthError::Network(_) => "Проблема с сетью. Проверьте подключение.",
            AuthError::Unknown(_) => "Что-то пошло не так. Попробуйте ещё раз.",
        }
    }
}

/// Failures reported by the record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("record store error: {0}")]
    Unknown(String),

    #[error("malformed record {id}: {message}")]
    Malformed { id: String, message: String },

    #[error("no record {collection}/{id}")]
    NotFound { collection: String, id: String },
}

/// Everything a user-facing flow can fail with.
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Client-side validation failed; the summary is ready to show.
    #[error("{0}")]
    Invalid(String),

    #[error("not signed in")]
    AuthenticationRequired,

    #[error("application already submitted (status: {status})")]
    DuplicateSubmission { status: String },

    #[error(transparent)]
    Transient(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("profile not found")]
    ProfileMissing,

    #[error("already responded to this vacancy")]
    AlreadyResponded,

    #[error("a submission is already in flight")]
    Busy,

    #[error("the wizard has already been submitted")]
    WizardClosed,
}

impl ApplicationError {
    /// Message shown to the applicant.
    pub fn user_message(&self) -> String {
        match self {
            ApplicationError::Invalid(summary) => summary.clone(),
            ApplicationError::AuthenticationRequired => {
                "Вы должны войти в систему.".to_string()
            }
            ApplicationError::DuplicateSubmission { status } => {
                format!("Заявка уже отправлена. Статус вашей заявки: {status}")
            }
            ApplicationError::Transient(_) => {
                "Не удалось связаться с сервером. Попробуйте позже.".to_string()
            }
            ApplicationError::Auth(err) => err.user_message().to_string(),
            ApplicationError::ProfileMissing => "Данные пользователя не найдены.".to_string(),
            ApplicationError::AlreadyResponded => {
                "Вы уже откликнулись на эту вакансию.".to_string()
            }
            ApplicationError::Busy => "Подождите, заявка отправляется.".to_string(),
            ApplicationError::WizardClosed => {
                "Для изменения заявки обратитесь в поддержку.".to_string()
            }
        }
    }

    /// Whether retrying the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApplicationError::Transient(_)
                | ApplicationError::Auth(AuthError::Network(_))
                | ApplicationError::Busy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_are_retryable() {
        let err = ApplicationError::from(StoreError::Network("timeout".into()));
        assert!(err.is_retryable());
        assert!(!ApplicationError::AuthenticationRequired.is_retryable());
        assert!(!ApplicationError::from(AuthError::WrongPassword).is_retryable());
    }

    #[test]
    fn duplicate_message_carries_status() {
        let err = ApplicationError::DuplicateSubmission {
            status: "Одобрено".into(),
        };
        assert!(err.user_message().ends_with("Одобрено"));
    }
}
