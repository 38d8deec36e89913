use crate::field::{Choice, FieldKind, FieldValue, FormField, FormValues};
use crate::forms::{ApplicationForm, StepDefinition};

pub const COURSES: &[Choice] = &[
    Choice::plain("1 курс"),
    Choice::plain("2 курс"),
    Choice::plain("3 курс"),
    Choice::plain("4 курс"),
    Choice::plain("Послевузовое обучение (магистратура, интернатура)"),
    Choice::plain("Я не студент ВУЗа"),
];

pub const CITIES: &[Choice] = &[
    Choice::plain("Алматы"),
    Choice::plain("Астана"),
    Choice::plain("Шымкент"),
    Choice::plain("Караганда"),
    Choice::plain("Другой город"),
];

pub const ADDITIONAL_CONSULTATION: &[Choice] = &[
    Choice::new("Да", "Да, есть вопросы, хотел бы уточнить некоторые моменты"),
    Choice::new("Нет", "Нет, готов к регистрации"),
];

pub const LANGUAGES: &[Choice] = &[Choice::plain("Казахский"), Choice::plain("Русский")];

pub const CONSULTATION_METHODS: &[Choice] = &[
    Choice::plain("Текстовым сообщением"),
    Choice::new("Звонком", "Посредством звонка от координатора"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultationField {
    FullName,
    University,
    Course,
    PhoneNumber,
    City,
    AdditionalConsultation,
    PreferredLanguage,
    ConsultationMethod,
}

impl FormField for ConsultationField {
    fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::University => "university",
            Self::Course => "course",
            Self::PhoneNumber => "phoneNumber",
            Self::City => "city",
            Self::AdditionalConsultation => "additionalConsultation",
            Self::PreferredLanguage => "preferredLanguage",
            Self::ConsultationMethod => "consultationMethod",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::FullName | Self::University => FieldKind::Text,
            Self::PhoneNumber => FieldKind::Phone,
            Self::Course => FieldKind::Choice(COURSES),
            Self::City => FieldKind::Choice(CITIES),
            Self::AdditionalConsultation => FieldKind::Choice(ADDITIONAL_CONSULTATION),
            Self::PreferredLanguage => FieldKind::Choice(LANGUAGES),
            Self::ConsultationMethod => FieldKind::Choice(CONSULTATION_METHODS),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FullName => "Введите ваше ФИО",
            Self::University => "Введите название университета",
            Self::Course => "Курс",
            Self::PhoneNumber => "+7 (___) ___-__-__",
            Self::City => "Город",
            Self::AdditionalConsultation => "Консультация",
            Self::PreferredLanguage => "Язык",
            Self::ConsultationMethod => "Способ связи",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Self::FullName => "Введите ваше ФИО",
            Self::University => "Введите название университета",
            Self::Course => "Выберите текущий курс",
            Self::PhoneNumber => "Введите номер телефона",
            Self::City => "Выберите город",
            Self::AdditionalConsultation => "Выберите вариант",
            Self::PreferredLanguage => "Выберите язык",
            Self::ConsultationMethod => "Выберите способ консультации",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Self::PhoneNumber => "Неверный формат номера (пример: +7 (700) 123-45-67)",
            _ => "Выберите вариант из списка",
        }
    }
}

/// Consultation request: who the applicant is and how to reach them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationForm {
    pub full_name: String,
    pub university: String,
    pub course: String,
    pub phone_number: String,
    pub city: String,
    pub additional_consultation: String,
    pub preferred_language: String,
    pub consultation_method: String,
}

impl ConsultationForm {
    fn slot(&mut self, field: ConsultationField) -> &mut String {
        match field {
            ConsultationField::FullName => &mut self.full_name,
            ConsultationField::University => &mut self.university,
            ConsultationField::Course => &mut self.course,
            ConsultationField::PhoneNumber => &mut self.phone_number,
            ConsultationField::City => &mut self.city,
            ConsultationField::AdditionalConsultation => &mut self.additional_consultation,
            ConsultationField::PreferredLanguage => &mut self.preferred_language,
            ConsultationField::ConsultationMethod => &mut self.consultation_method,
        }
    }
}

impl FormValues for ConsultationForm {
    type Field = ConsultationField;

    fn value(&self, field: ConsultationField) -> FieldValue {
        let text = match field {
            ConsultationField::FullName => &self.full_name,
            ConsultationField::University => &self.university,
            ConsultationField::Course => &self.course,
            ConsultationField::PhoneNumber => &self.phone_number,
            ConsultationField::City => &self.city,
            ConsultationField::AdditionalConsultation => &self.additional_consultation,
            ConsultationField::PreferredLanguage => &self.preferred_language,
            ConsultationField::ConsultationMethod => &self.consultation_method,
        };
        FieldValue::Text(text.clone())
    }

    fn set(&mut self, field: ConsultationField, value: FieldValue) {
        *self.slot(field) = value.as_text().to_string();
    }
}

impl ApplicationForm for ConsultationForm {
    const VARIANT: &'static str = "consultation";

    const STEPS: &'static [StepDefinition<ConsultationField>] = &[
        StepDefinition {
            prompt: "Ваше ФИО",
            fields: &[ConsultationField::FullName],
        },
        StepDefinition {
            prompt: "В каком ВУЗе вы обучаетесь?",
            fields: &[ConsultationField::University],
        },
        StepDefinition {
            prompt: "На каком вы сейчас курсе обучения?",
            fields: &[ConsultationField::Course],
        },
        StepDefinition {
            prompt: "Ваши контакты (номер телефона)",
            fields: &[ConsultationField::PhoneNumber],
        },
        StepDefinition {
            prompt: "Выберите свой город, чтобы с вами связался координатор",
            fields: &[ConsultationField::City],
        },
        StepDefinition {
            prompt: "Нужна ли вам дополнительная консультация перед регистрацией?",
            fields: &[ConsultationField::AdditionalConsultation],
        },
        StepDefinition {
            prompt: "На каком языке хотели бы получить консультацию?",
            fields: &[ConsultationField::PreferredLanguage],
        },
        StepDefinition {
            prompt: "Выберите удобный способ для получения консультации",
            fields: &[ConsultationField::ConsultationMethod],
        },
    ];
}
