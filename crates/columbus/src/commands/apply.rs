use std::io::{BufRead, Write};

use applicant::{
    Advance, ApplicationError, ApplicationForm, ApplicationStatus, ConsultationForm, EnrollmentForm, FieldKind,
    FieldValue, FormField, FormValues, Session, Wizard, WizardState, open_wizard,
};
use color_eyre::Result;

use super::Services;
use crate::cli::Variant;
use crate::errors::user_error;
use crate::prompt::{BACK, Prompt};

pub async fn apply<R: BufRead, W: Write>(
    variant: Variant,
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let session = services.signed_in().await?;
    match variant {
        Variant::Consultation => run_wizard::<ConsultationForm, _, _>(&session, services, prompt).await,
        Variant::Enrollment => run_wizard::<EnrollmentForm, _, _>(&session, services, prompt).await,
    }
}

pub async fn status<R: BufRead, W: Write>(
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let session = services.signed_in().await?;
    let Some(identity) = session.identity() else {
        return Ok(());
    };
    let record = services
        .applications
        .find(identity)
        .await
        .map_err(|err| user_error(err.into()))?;
    match record {
        Some(record) => {
            show_status(&record.status, prompt)?;
            if let Some(submitted_at) = record.submitted_at {
                prompt.say(format_args!("Отправлена: {submitted_at}"))?;
            }
            Ok(())
        }
        None => prompt.say("Заявка ещё не отправлена. Заполните её командой `columbus apply`."),
    }
}

async fn run_wizard<F, R, W>(
    session: &Session,
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()>
where
    F: ApplicationForm,
    R: BufRead,
    W: Write,
{
    let mut wizard = open_wizard::<F>(session, &services.applications)
        .await
        .map_err(user_error)?;
    // After a failed submit the answers stand; only the write is repeated.
    let mut resubmit = false;

    loop {
        let index = match wizard.state() {
            WizardState::Submitted(status) => return show_status(status, prompt),
            WizardState::Step(index) => *index,
        };
        let Some(step) = wizard.current_step() else {
            return Ok(());
        };

        if !resubmit {
            prompt.say(format_args!(
                "\nШаг {} из {}. {}",
                index + 1,
                F::step_count(),
                step.prompt
            ))?;
            let mut back = false;
            for &field in step.fields {
                if !fill(&mut wizard, field, prompt)? {
                    back = true;
                    break;
                }
            }
            if back {
                if !wizard.retreat() {
                    prompt.say("Это первый шаг.")?;
                }
                continue;
            }
        }
        resubmit = false;

        match wizard.advance(&services.applications, session).await {
            Ok(Advance::Rejected(errors)) => prompt.say(errors.summary())?,
            Ok(Advance::Moved { .. }) => {}
            Ok(Advance::Submitted(_)) => prompt.say("Заявка успешно отправлена!")?,
            Ok(Advance::Duplicate(status)) => {
                let duplicate = ApplicationError::DuplicateSubmission {
                    status: status.to_string(),
                };
                prompt.say(duplicate.user_message())?;
            }
            Err(err) if err.is_retryable() => {
                prompt.say(err.user_message())?;
                if !prompt.confirm("Повторить отправку?")? {
                    return Err(user_error(err));
                }
                resubmit = true;
            }
            Err(err) => return Err(user_error(err)),
        }
    }
}

/// Ask for one field. `false` means the applicant asked to go back.
fn fill<F, R, W>(wizard: &mut Wizard<F>, field: F::Field, prompt: &mut Prompt<R, W>) -> Result<bool>
where
    F: ApplicationForm,
    R: BufRead,
    W: Write,
{
    let current = wizard.form().value(field);
    let value = match field.kind() {
        FieldKind::Flag => FieldValue::Flag(prompt.confirm(field.label())?),
        FieldKind::Choice(options) => {
            let answer = prompt.choose(field.label(), options)?;
            if answer == BACK {
                return Ok(false);
            }
            if answer.is_empty() && !current.is_blank() {
                return Ok(true);
            }
            FieldValue::Text(answer)
        }
        _ => {
            let label = if current.is_blank() {
                field.label().to_string()
            } else {
                format!("{} [{}]", field.label(), current.as_text())
            };
            let answer = prompt.line(&label)?;
            if answer == BACK {
                return Ok(false);
            }
            if answer.is_empty() && !current.is_blank() {
                return Ok(true);
            }
            FieldValue::Text(answer)
        }
    };

    wizard.clear_field(field);
    if let Some(stored) = wizard.set_field(field, value) {
        if matches!(field.kind(), FieldKind::Phone | FieldKind::Date) && !stored.is_blank() {
            prompt.say(format_args!("  {}", stored.as_text()))?;
        }
    }
    Ok(true)
}

fn show_status<R: BufRead, W: Write>(
    status: &ApplicationStatus,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    prompt.say("Спасибо за регистрацию!")?;
    prompt.say(format_args!("Статус вашей заявки: {status}"))?;
    prompt.say("Для изменения заявки обратитесь в поддержку.")
}
