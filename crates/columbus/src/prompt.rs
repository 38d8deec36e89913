//! Line-oriented terminal input.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use applicant::Choice;
use color_eyre::{Result, eyre::bail};

/// Typed at any wizard prompt to go back one step.
pub const BACK: &str = "<";

pub struct Prompt<R, W> {
    input: R,
    output: W,
    /// Read secrets from the terminal without echo instead of from `input`.
    tty_secrets: bool,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
            tty_secrets: true,
        }
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Everything, secrets included, comes from `input`.
    pub fn scripted(input: R, output: W) -> Self {
        Self {
            input,
            output,
            tty_secrets: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// One trimmed line. Closed input is an error.
    pub fn line(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            bail!("input closed");
        }
        Ok(buf.trim().to_string())
    }

    pub fn secret(&mut self, label: &str) -> Result<String> {
        if self.tty_secrets {
            self.output.flush()?;
            return Ok(rpassword::prompt_password(format!("{label}: "))?);
        }
        self.line(label)
    }

    /// Pick one of `options` by number or by value. An empty answer returns
    /// an empty string and is left to validation.
    pub fn choose(&mut self, label: &str, options: &[Choice]) -> Result<String> {
        self.say(label)?;
        for (index, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", index + 1, option.label)?;
        }
        loop {
            let answer = self.line("Номер")?;
            if answer.is_empty() || answer == BACK {
                return Ok(answer);
            }
            if let Some(option) = pick(&answer, options) {
                return Ok(option.value.to_string());
            }
            self.say(format_args!("Выберите номер от 1 до {}", options.len()))?;
        }
    }

    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        loop {
            let answer = self.line(&format!("{label} (д/н)"))?.to_lowercase();
            match answer.as_str() {
                "д" | "да" | "y" | "yes" => return Ok(true),
                "н" | "нет" | "n" | "no" => return Ok(false),
                _ => self.say("Ответьте «д» или «н»")?,
            }
        }
    }
}

fn pick<'a>(answer: &str, options: &'a [Choice]) -> Option<&'a Choice> {
    if let Ok(number) = answer.parse::<usize>() {
        return number.checked_sub(1).and_then(|index| options.get(index));
    }
    let answer = answer.to_lowercase();
    options.iter().find(|option| {
        option.value.to_lowercase() == answer || option.label.to_lowercase() == answer
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use applicant::forms::LANGUAGES;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn scripted(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::scripted(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn lines_are_trimmed_and_eof_is_an_error() {
        let mut prompt = scripted("  КазНУ \n");
        assert_eq!(prompt.line("ВУЗ").unwrap(), "КазНУ");
        assert!(prompt.line("ВУЗ").is_err());
    }

    #[test]
    fn choice_by_number_or_value() {
        let mut prompt = scripted("7\n2\nказахский\n\n");
        assert_eq!(prompt.choose("Язык", LANGUAGES).unwrap(), "Русский");
        assert_eq!(prompt.choose("Язык", LANGUAGES).unwrap(), "Казахский");
        assert_eq!(prompt.choose("Язык", LANGUAGES).unwrap(), "");

        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert!(output.contains("  1) Казахский"));
        assert!(output.contains("Выберите номер от 1 до 2"));
    }

    #[test]
    fn confirm_repeats_until_answered() {
        let mut prompt = scripted("может\nД\n");
        assert!(prompt.confirm("Согласны?").unwrap());
    }
}
