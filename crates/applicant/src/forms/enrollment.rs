use crate::field::{FieldKind, FieldValue, FormField, FormValues};
use crate::forms::consultation::{CITIES, COURSES};
use crate::forms::{ApplicationForm, StepDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentField {
    FullName,
    BirthDate,
    PhoneNumber,
    University,
    Course,
    City,
    Consent,
}

impl FormField for EnrollmentField {
    fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::BirthDate => "birthDate",
            Self::PhoneNumber => "phoneNumber",
            Self::University => "university",
            Self::Course => "course",
            Self::City => "city",
            Self::Consent => "consent",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::FullName | Self::University => FieldKind::Text,
            Self::BirthDate => FieldKind::Date,
            Self::PhoneNumber => FieldKind::Phone,
            Self::Course => FieldKind::Choice(COURSES),
            Self::City => FieldKind::Choice(CITIES),
            Self::Consent => FieldKind::Flag,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FullName => "Введите ваше ФИО",
            Self::BirthDate => "ДД.ММ.ГГГГ",
            Self::PhoneNumber => "+7 (___) ___-__-__",
            Self::University => "Введите название университета",
            Self::Course => "Курс",
            Self::City => "Город",
            Self::Consent => "Я согласен на обработку персональных данных",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Self::FullName => "Введите ваше ФИО",
            Self::BirthDate => "Введите дату рождения",
            Self::PhoneNumber => "Введите номер телефона",
            Self::University => "Введите название университета",
            Self::Course => "Выберите текущий курс",
            Self::City => "Выберите город",
            Self::Consent => "Необходимо согласие на обработку данных",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Self::BirthDate => "Неверный формат даты (пример: 01.02.2003)",
            Self::PhoneNumber => "Неверный формат номера (пример: +7 (700) 123-45-67)",
            _ => "Выберите вариант из списка",
        }
    }
}

/// Program enrollment: personal data plus consent to its processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentForm {
    pub full_name: String,
    pub birth_date: String,
    pub phone_number: String,
    pub university: String,
    pub course: String,
    pub city: String,
    pub consent: bool,
}

impl FormValues for EnrollmentForm {
    type Field = EnrollmentField;

    fn value(&self, field: EnrollmentField) -> FieldValue {
        match field {
            EnrollmentField::FullName => self.full_name.as_str().into(),
            EnrollmentField::BirthDate => self.birth_date.as_str().into(),
            EnrollmentField::PhoneNumber => self.phone_number.as_str().into(),
            EnrollmentField::University => self.university.as_str().into(),
            EnrollmentField::Course => self.course.as_str().into(),
            EnrollmentField::City => self.city.as_str().into(),
            EnrollmentField::Consent => FieldValue::Flag(self.consent),
        }
    }

    fn set(&mut self, field: EnrollmentField, value: FieldValue) {
        let text = value.as_text().to_string();
        match field {
            EnrollmentField::FullName => self.full_name = text,
            EnrollmentField::BirthDate => self.birth_date = text,
            EnrollmentField::PhoneNumber => self.phone_number = text,
            EnrollmentField::University => self.university = text,
            EnrollmentField::Course => self.course = text,
            EnrollmentField::City => self.city = text,
            EnrollmentField::Consent => self.consent = value.as_flag(),
        }
    }
}

impl ApplicationForm for EnrollmentForm {
    const VARIANT: &'static str = "enrollment";

    const STEPS: &'static [StepDefinition<EnrollmentField>] = &[
        StepDefinition {
            prompt: "Ваше ФИО",
            fields: &[EnrollmentField::FullName],
        },
        StepDefinition {
            prompt: "Дата рождения",
            fields: &[EnrollmentField::BirthDate],
        },
        StepDefinition {
            prompt: "Ваши контакты (номер телефона)",
            fields: &[EnrollmentField::PhoneNumber],
        },
        StepDefinition {
            prompt: "В каком ВУЗе вы обучаетесь?",
            fields: &[EnrollmentField::University],
        },
        StepDefinition {
            prompt: "На каком вы сейчас курсе обучения?",
            fields: &[EnrollmentField::Course],
        },
        StepDefinition {
            prompt: "Ваш город",
            fields: &[EnrollmentField::City],
        },
        StepDefinition {
            prompt: "Согласие на обработку персональных данных",
            fields: &[EnrollmentField::Consent],
        },
    ];
}
