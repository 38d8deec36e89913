use std::io::{BufRead, Write};

use applicant::{ApplicationError, HIGHLIGHTS};
use color_eyre::{Result, eyre::eyre};

use super::Services;
use crate::errors::user_error;
use crate::prompt::Prompt;

pub async fn list<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let session = services.session().await?;
    if !session.is_signed_in() {
        prompt.say("Войдите, чтобы увидеть вакансии и новости.")?;
        return about(prompt);
    }
    let feed = services.feeds.load(&session).await.map_err(user_error)?;

    prompt.say("Вакансии")?;
    if feed.vacancies.is_empty() {
        prompt.say("  Пока нет вакансий.")?;
    }
    for vacancy in &feed.vacancies {
        let marker = if feed.has_responded(&vacancy.id) {
            " (вы откликнулись)"
        } else {
            ""
        };
        prompt.say(format_args!("  [{}] {}{marker}", vacancy.id, vacancy.title))?;
        if !vacancy.description.is_empty() {
            prompt.say(format_args!("      {}", vacancy.description))?;
        }
    }

    prompt.say("\nНовости")?;
    if feed.news.is_empty() {
        prompt.say("  Пока нет новостей.")?;
    }
    for item in &feed.news {
        prompt.say(format_args!("  {}", item.title))?;
        if !item.description.is_empty() {
            prompt.say(format_args!("      {}", item.description))?;
        }
    }
    Ok(())
}

pub async fn respond<R: BufRead, W: Write>(
    vacancy_id: &str,
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let session = services.signed_in().await?;
    let feed = services.feeds.load(&session).await.map_err(user_error)?;
    let Some(vacancy) = feed.vacancy(vacancy_id) else {
        return Err(eyre!("Вакансия {vacancy_id} не найдена."));
    };
    if feed.has_responded(vacancy_id) {
        return Err(user_error(ApplicationError::AlreadyResponded));
    }

    services
        .feeds
        .respond(&session, vacancy_id)
        .await
        .map_err(user_error)?;
    prompt.say(format_args!("Вы откликнулись на вакансию «{}».", vacancy.title))
}

pub fn about<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>) -> Result<()> {
    prompt.say("Columbus Work and Travel")?;
    for highlight in HIGHLIGHTS {
        prompt.say(format_args!("  {}: {}", highlight.title, highlight.subtitle))?;
    }
    Ok(())
}
