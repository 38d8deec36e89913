use std::io::{BufRead, Write};

use applicant::account::filter_cities;
use applicant::{
    Choice, FieldKind, FormField, LoginForm, RegistrationField, RegistrationForm, Session,
};
use color_eyre::Result;
use tracing::warn;

use super::Services;
use crate::errors::user_error;
use crate::prompt::{BACK, Prompt};

const NOT_SIGNED_IN: &str = "Вы не вошли в систему.";

pub async fn register<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    prompt.say("Регистрация")?;
    let mut form = RegistrationForm::default();
    let mut pending: Vec<RegistrationField> = RegistrationField::ALL.to_vec();

    loop {
        for field in pending.drain(..) {
            let input = ask(field, prompt)?;
            form.set_input(field, &input);
        }
        let errors = form.validate();
        if errors.is_empty() {
            break;
        }
        prompt.say(errors.summary())?;
        pending = errors.fields().collect();
        if pending.contains(&RegistrationField::ConfirmPassword)
            && !pending.contains(&RegistrationField::Password)
        {
            pending.insert(pending.len() - 1, RegistrationField::Password);
        }
    }

    let mut session = Session::anonymous();
    let result = services.accounts.register(&mut session, &form).await;
    // The account exists even when the profile write failed.
    if let Some(identity) = session.identity() {
        services.sessions.save(identity)?;
    }
    result.map_err(user_error)?;
    prompt.say("Регистрация прошла успешно!")?;
    Ok(())
}

pub async fn login<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let email = prompt.line("Почта")?;
    let password = prompt.secret("Пароль")?;
    let form = LoginForm::new(email, password);

    let mut session = Session::anonymous();
    let identity = services
        .accounts
        .sign_in(&mut session, &form)
        .await
        .map_err(user_error)?;
    services.sessions.save(&identity)?;
    prompt.say(format_args!("Добро пожаловать, {}!", identity.email))?;
    Ok(())
}

pub async fn logout<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    if services.sessions.load()?.is_none() {
        return prompt.say(NOT_SIGNED_IN);
    }
    match services.session().await {
        Ok(mut session) => services.accounts.sign_out(&mut session).await,
        Err(err) => warn!(error = %err, "could not resume session for sign-out"),
    }
    services.sessions.clear()?;
    prompt.say("Вы вышли из аккаунта.")
}

pub async fn whoami<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    match services.sessions.load()? {
        Some(identity) => prompt.say(format_args!("{} ({})", identity.email, identity.uid)),
        None => prompt.say(NOT_SIGNED_IN),
    }
}

fn ask<R: BufRead, W: Write>(field: RegistrationField, prompt: &mut Prompt<R, W>) -> Result<String> {
    match field.kind() {
        FieldKind::Secret => prompt.secret(field.label()),
        FieldKind::Choice(_) => ask_city(field.label(), prompt),
        _ => prompt.line(field.label()),
    }
}

/// Search the city list by fragment; a unique or exact match is taken as is.
fn ask_city<R: BufRead, W: Write>(label: &str, prompt: &mut Prompt<R, W>) -> Result<String> {
    loop {
        let query = prompt.line(label)?;
        if query.is_empty() {
            return Ok(query);
        }
        let matches = filter_cities(&query);
        let needle = query.to_lowercase();
        if let Some(exact) = matches.iter().find(|city| city.to_lowercase() == needle) {
            return Ok(exact.to_string());
        }
        match matches.as_slice() {
            [] => prompt.say("Город не найден")?,
            [only] => return Ok(only.to_string()),
            several => {
                let options: Vec<Choice> = several.iter().map(|&city| Choice::plain(city)).collect();
                let picked = prompt.choose("Уточните город", &options)?;
                if !picked.is_empty() && picked != BACK {
                    return Ok(picked);
                }
            }
        }
    }
}
