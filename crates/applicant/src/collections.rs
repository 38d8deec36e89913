use serde::{Deserialize, Serialize};
use settings::Settings;

/// Names of the collections in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collections {
    /// Wizard submissions, keyed by identity id.
    pub applicants: String,
    /// User profiles, keyed by identity id.
    pub users: String,
    pub vacancies: String,
    pub news: String,
    /// Vacancy responses.
    pub applications: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            applicants: "applicants".into(),
            users: "users".into(),
            vacancies: "vacancies".into(),
            news: "news".into(),
            applications: "applications".into(),
        }
    }
}

impl Settings for Collections {
    const SECTION: &'static str = "collections";
}
