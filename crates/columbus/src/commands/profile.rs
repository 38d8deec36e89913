use std::io::{BufRead, Write};

use applicant::{FieldKind, ProfileEditor, UserProfile, format::format};
use color_eyre::Result;

use super::Services;
use crate::cli::ProfileAction;
use crate::errors::user_error;
use crate::prompt::Prompt;

pub async fn run<R: BufRead, W: Write>(
    action: ProfileAction,
    services: &Services,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    let session = services.signed_in().await?;
    let profile = services.profiles.load(&session).await.map_err(user_error)?;

    match action {
        ProfileAction::Show => show(&profile, prompt),
        ProfileAction::Edit => {
            let mut editor = ProfileEditor::new(profile);
            prompt.say("Оставьте поле пустым, чтобы не менять его.")?;

            let phone = prompt.line(&format!("Телефон [{}]", editor.phone_number))?;
            if !phone.is_empty() {
                editor.phone_number = format(FieldKind::CompactPhone, &phone, &editor.phone_number);
            }
            let city = prompt.line(&format!("Город [{}]", editor.city))?;
            if !city.is_empty() {
                editor.city = city;
            }

            if !editor.is_dirty() {
                return prompt.say("Изменений нет.");
            }
            if !prompt.confirm("Сохранить изменения?")? {
                editor.cancel();
                return prompt.say("Изменения отменены.");
            }
            let saved = services
                .profiles
                .save(&session, &mut editor)
                .await
                .map_err(user_error)?;
            prompt.say("Данные обновлены.")?;
            show(&saved, prompt)
        }
    }
}

fn show<R: BufRead, W: Write>(profile: &UserProfile, prompt: &mut Prompt<R, W>) -> Result<()> {
    prompt.say(profile.full_name())?;
    prompt.say(format_args!("Телефон: {}", profile.phone_number))?;
    prompt.say(format_args!("Почта:   {}", profile.email))?;
    prompt.say(format_args!("Город:   {}", profile.city))
}
