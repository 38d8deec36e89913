use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::backend::{Document, Query, RecordStore};
use crate::collections::Collections;
use crate::error::{ApplicationError, StoreError};
use crate::field::Fields;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vacancy {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl Vacancy {
    fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            title: document.text_or_empty("title"),
            description: document.text_or_empty("description"),
            image: document.text("image").map(str::to_string),
        }
    }
}

impl NewsItem {
    fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            title: document.text_or_empty("title"),
            description: document.text_or_empty("description"),
            image: document.text("image").map(str::to_string),
        }
    }
}

/// A card of the static "about the program" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub const HIGHLIGHTS: [Highlight; 5] = [
    Highlight {
        title: "12 ЛЕТ",
        subtitle: "Мы занимаемся оформлением и отправкой студентов по программе Work and Travel USA",
    },
    Highlight {
        title: "КАЧЕСТВО",
        subtitle: "Лучшие условия и поддержка студентов на каждом этапе программы.",
    },
    Highlight {
        title: "ОПЫТ",
        subtitle: "Тысячи успешных историй студентов по всему миру.",
    },
    Highlight {
        title: "СЕРТИФИКАТЫ",
        subtitle: "Официально аккредитованный партнер программы Work and Travel.",
    },
    Highlight {
        title: "ПОДДЕРЖКА",
        subtitle: "Мы на связи 24/7 для ваших вопросов и помощи.",
    },
];

/// Everything shown on the start screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub vacancies: Vec<Vacancy>,
    pub news: Vec<NewsItem>,
    responded: BTreeSet<String>,
}

impl Feed {
    pub fn has_responded(&self, vacancy_id: &str) -> bool {
        self.responded.contains(vacancy_id)
    }

    pub fn vacancy(&self, vacancy_id: &str) -> Option<&Vacancy> {
        self.vacancies.iter().find(|v| v.id == vacancy_id)
    }

    pub fn mark_responded(&mut self, vacancy_id: impl Into<String>) {
        self.responded.insert(vacancy_id.into());
    }
}

#[derive(Clone)]
pub struct Feeds {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl Feeds {
    pub fn new(store: Arc<dyn RecordStore>, collections: &Collections) -> Self {
        Self {
            store,
            collections: collections.clone(),
        }
    }

    /// Vacancies, news and the vacancies this user already responded to.
    /// Without a signed-in user the feed is empty and nothing is read.
    pub async fn load(&self, session: &Session) -> Result<Feed, ApplicationError> {
        let Some(identity) = session.identity() else {
            return Ok(Feed::default());
        };

        let vacancies = self.list(&self.collections.vacancies, &Query::all()).await?;
        let news = self.list(&self.collections.news, &Query::all()).await?;
        let responses = self
            .list(
                &self.collections.applications,
                &Query::all().eq("userId", identity.uid.as_str()),
            )
            .await?;

        Ok(Feed {
            vacancies: vacancies.iter().map(Vacancy::from_document).collect(),
            news: news.iter().map(NewsItem::from_document).collect(),
            responded: responses
                .iter()
                .filter_map(|doc| doc.text("vacancyId").map(str::to_string))
                .collect(),
        })
    }

    /// Record a response to a vacancy, once per user and vacancy.
    ///
    /// Like wizard submissions this is a check followed by a separate write.
    pub async fn respond(
        &self,
        session: &Session,
        vacancy_id: &str,
    ) -> Result<String, ApplicationError> {
        let identity = session.require()?;
        let existing = self
            .list(
                &self.collections.applications,
                &Query::all()
                    .eq("userId", identity.uid.as_str())
                    .eq("vacancyId", vacancy_id),
            )
            .await?;
        if !existing.is_empty() {
            return Err(ApplicationError::AlreadyResponded);
        }

        let mut fields = Fields::new();
        fields.insert("userId".into(), identity.uid.as_str().into());
        fields.insert("vacancyId".into(), vacancy_id.into());
        fields.insert(
            "createdAt".into(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );

        let id = self
            .store
            .create_record(&self.collections.applications, fields)
            .await
            .map_err(|err| {
                warn!(uid = %identity.uid, vacancy_id, error = %err, "failed to record response");
                err
            })?;
        info!(uid = %identity.uid, vacancy_id, "vacancy response recorded");
        Ok(id)
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.store
            .query_records(collection, query)
            .await
            .inspect_err(|err| warn!(collection, error = %err, "query failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Identity;
    use crate::testing::FakeStore;
    use pretty_assertions::assert_eq;

    fn vacancy(title: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), title.into());
        fields.insert("description".into(), "Лето в США".into());
        fields
    }

    fn setup() -> (Arc<FakeStore>, Feeds, Session) {
        let store = Arc::new(FakeStore::default());
        store.insert("vacancies", "v1", vacancy("Спасатель"));
        store.insert("vacancies", "v2", vacancy("Официант"));
        store.insert("news", "n1", vacancy("Набор открыт"));
        let feeds = Feeds::new(store.clone(), &Collections::default());
        (store, feeds, Session::restored(Identity::new("u1", "a@b.kz")))
    }

    #[tokio::test]
    async fn anonymous_feed_is_empty() {
        let (store, feeds, _) = setup();
        let feed = feeds.load(&Session::anonymous()).await.unwrap();
        assert_eq!(feed, Feed::default());
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn respond_once_per_vacancy() {
        let (store, feeds, session) = setup();

        let feed = feeds.load(&session).await.unwrap();
        assert_eq!(feed.vacancies.len(), 2);
        assert_eq!(feed.news[0].title, "Набор открыт");
        assert!(!feed.has_responded("v1"));

        feeds.respond(&session, "v1").await.unwrap();
        assert!(matches!(
            feeds.respond(&session, "v1").await,
            Err(ApplicationError::AlreadyResponded)
        ));
        feeds.respond(&session, "v2").await.unwrap();
        assert_eq!(store.count("applications"), 2);

        let feed = feeds.load(&session).await.unwrap();
        assert!(feed.has_responded("v1"));
        assert!(feed.has_responded("v2"));
    }

    #[tokio::test]
    async fn respond_requires_identity() {
        let (store, feeds, _) = setup();
        assert!(matches!(
            feeds.respond(&Session::anonymous(), "v1").await,
            Err(ApplicationError::AuthenticationRequired)
        ));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn five_highlights() {
        assert_eq!(HIGHLIGHTS.len(), 5);
        assert!(HIGHLIGHTS.iter().all(|h| !h.title.is_empty()));
    }
}
