use std::io::Cursor;
use std::sync::Arc;

use applicant::{Collections, FieldValue, Fields};
use backend::{Backend, MemoryBackend};
use color_eyre::Result;
use columbus::cli::{Cmd, ProfileAction, Variant};
use columbus::commands::{self, Services};
use columbus::prompt::Prompt;
use columbus::session_store::SessionStore;
use tempfile::TempDir;

const REGISTRATION: &str = "Аружан\nСерикова\n+77001234567\naru@mail.kz\nалматы\nsecret1\nsecret1\n";

const CONSULTATION: &str = "Серикова Аружан\nКазНУ\n2\n87001234567\n1\n2\n2\n2\n";

struct Client {
    services: Services,
    memory: Arc<MemoryBackend>,
    _dir: TempDir,
}

impl Client {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let memory = Arc::new(MemoryBackend::new());
        let services = Services::new(
            Backend::shared(memory.clone()),
            &Collections::default(),
            SessionStore::new(dir.path().join("session.json")),
        );
        Self {
            services,
            memory,
            _dir: dir,
        }
    }

    async fn run(&self, cmd: Cmd, input: &str) -> (Result<()>, String) {
        let mut prompt = Prompt::scripted(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let result = commands::run(cmd, &self.services, &mut prompt).await;
        let output = String::from_utf8(prompt.into_output()).unwrap();
        (result, output)
    }

    async fn registered() -> Self {
        let client = Self::new();
        let (result, output) = client.run(Cmd::Register, REGISTRATION).await;
        result.unwrap();
        assert!(output.contains("Регистрация прошла успешно!"));
        client
    }
}

fn consultation() -> Cmd {
    Cmd::Apply {
        variant: Variant::Consultation,
    }
}

#[tokio::test]
async fn register_apply_and_check_status() {
    let client = Client::registered().await;

    let (result, output) = client.run(Cmd::Whoami, "").await;
    result.unwrap();
    assert!(output.contains("aru@mail.kz"));

    let (result, output) = client.run(consultation(), CONSULTATION).await;
    result.unwrap();
    assert!(output.contains("Шаг 1 из 8. Ваше ФИО"));
    assert!(output.contains("+7 (700) 123-45-67"));
    assert!(output.contains("Заявка успешно отправлена!"));
    assert!(output.contains("Статус вашей заявки: В ожидании"));
    assert_eq!(client.memory.count("applicants").await, 1);

    let (result, output) = client.run(Cmd::Status, "").await;
    result.unwrap();
    assert!(output.contains("Статус вашей заявки: В ожидании"));

    // The gate short-circuits; no step is shown and no input is read.
    let (result, output) = client.run(consultation(), "").await;
    result.unwrap();
    assert!(!output.contains("Шаг 1"));
    assert!(output.contains("Для изменения заявки обратитесь в поддержку."));
}

#[tokio::test]
async fn empty_step_is_asked_again() {
    let client = Client::registered().await;

    let input = format!("\n{CONSULTATION}");
    let (result, output) = client.run(consultation(), &input).await;
    result.unwrap();
    assert!(output.contains("Заполните все необходимые поля:\nВведите ваше ФИО"));
    assert_eq!(output.matches("Шаг 1 из 8").count(), 2);
}

#[tokio::test]
async fn going_back_keeps_answers() {
    let client = Client::registered().await;

    // Step 2 answered with "<", step 1 confirmed with an empty line.
    let input = "Серикова Аружан\n<\n\nКазНУ\n2\n87001234567\n1\n2\n2\n2\n";
    let (result, output) = client.run(consultation(), input).await;
    result.unwrap();
    assert!(output.contains("[Серикова Аружан]"));
    assert!(output.contains("Заявка успешно отправлена!"));
}

#[tokio::test]
async fn enrollment_collects_consent() {
    let client = Client::registered().await;

    let input = "Серикова Аружан\n01022003\n87001234567\nКазНУ\n3\n2\nд\n";
    let (result, output) = client
        .run(
            Cmd::Apply {
                variant: Variant::Enrollment,
            },
            input,
        )
        .await;
    result.unwrap();
    assert!(output.contains("01.02.2003"));
    assert!(output.contains("Шаг 7 из 7"));
    assert!(output.contains("Заявка успешно отправлена!"));
}

#[tokio::test]
async fn vacancy_response_only_once() {
    let client = Client::registered().await;
    let mut vacancy = Fields::new();
    vacancy.insert("title".into(), FieldValue::from("Lifeguard"));
    client.memory.seed("vacancies", "v1", vacancy).await.unwrap();

    let respond = || Cmd::Respond {
        vacancy_id: "v1".into(),
    };
    let (result, output) = client.run(respond(), "").await;
    result.unwrap();
    assert!(output.contains("«Lifeguard»"));

    let (result, _) = client.run(respond(), "").await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Вы уже откликнулись на эту вакансию."
    );

    let (result, output) = client.run(Cmd::Feed, "").await;
    result.unwrap();
    assert!(output.contains("[v1] Lifeguard (вы откликнулись)"));

    let (result, _) = client
        .run(
            Cmd::Respond {
                vacancy_id: "v9".into(),
            },
            "",
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn profile_edit_changes_the_city() {
    let client = Client::registered().await;

    let (result, output) = client
        .run(
            Cmd::Profile {
                action: ProfileAction::Edit,
            },
            "\nШымкент\nд\n",
        )
        .await;
    result.unwrap();
    assert!(output.contains("Данные обновлены."));

    let (result, output) = client
        .run(
            Cmd::Profile {
                action: ProfileAction::Show,
            },
            "",
        )
        .await;
    result.unwrap();
    assert!(output.contains("Город:   Шымкент"));
    assert!(output.contains("Телефон: +77001234567"));
}

#[tokio::test]
async fn logout_requires_signing_in_again() {
    let client = Client::registered().await;

    let (result, output) = client.run(Cmd::Logout, "").await;
    result.unwrap();
    assert!(output.contains("Вы вышли из аккаунта."));

    let (result, _) = client.run(consultation(), CONSULTATION).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Вы должны войти в систему."
    );

    let (result, output) = client.run(Cmd::Login, "aru@mail.kz\nsecret1\n").await;
    result.unwrap();
    assert!(output.contains("Добро пожаловать, aru@mail.kz!"));

    let (result, _) = client.run(Cmd::Login, "aru@mail.kz\nwrong-password\n").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn registration_asks_again_for_bad_fields() {
    let client = Client::new();

    // Mismatched confirmation: both passwords are asked again.
    let input = "Аружан\nСерикова\n+77001234567\naru@mail.kz\nалматы\nsecret1\nsecret2\nsecret1\nsecret1\n";
    let (result, output) = client.run(Cmd::Register, input).await;
    result.unwrap();
    assert!(output.contains("Пароли не совпадают"));
    assert!(output.contains("Регистрация прошла успешно!"));
}
