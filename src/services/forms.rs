use chrono::{DateTime, Local, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashSet;
use std::fmt::{self, Write};
use thiserror::Error;

use crate::config::Contact;
use crate::config::settings::ContactsConfig;
use crate::db::StoreError;
use crate::db::repository::Repository;
use crate::models::{
    AcademicLevel, Enrollment, NotificationCategory, Program, Question, QuestionCategory,
    Subscription,
};

/// Characters left alone by a URI component encoder.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Key of the catch-all teacher entry.
pub const ALL_TEACHERS: &str = "all";

#[derive(Error, Debug)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("please select at least one {0}")]
    NothingSelected(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("no contact address configured for '{0}'")]
    NoRecipient(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An email ready for the user's mail client.
#[derive(Debug, Clone, PartialEq)]
pub struct MailDraft {
    pub recipient: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn mailto(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            utf8_percent_encode(&self.subject, URI_COMPONENT),
            utf8_percent_encode(&self.body, URI_COMPONENT)
        )
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_email(value: &str) -> Result<String, FormError> {
    let email = required("email", value)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid && !email.contains(char::is_whitespace) {
        Ok(email)
    } else {
        Err(FormError::InvalidEmail(email))
    }
}

fn footer(body: &mut String, kind: &str, now: DateTime<Utc>) -> fmt::Result {
    writeln!(body, "---")?;
    writeln!(body, "This {} was submitted through the KIUMA terminal board.", kind)?;
    writeln!(
        body,
        "Submitted on: {}",
        now.with_timezone(&Local).format("%d/%m/%Y %H:%M")
    )
}

// ─── Question ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    pub subject: String,
    pub content: String,
    pub category: Option<QuestionCategory>,
    /// Directory key; anything unknown goes to all teachers.
    pub teacher: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

fn resolve_teacher(contacts: &ContactsConfig, key: Option<&str>) -> Result<(String, Contact), FormError> {
    let directory = contacts.teacher_directory();
    let key = key.map(|k| k.trim().to_lowercase()).unwrap_or_default();
    if let Some(contact) = directory.get(&key) {
        return Ok((key, contact.clone()));
    }
    if !key.is_empty() {
        log::info!("unknown teacher '{}', addressing all teachers", key);
    }
    directory
        .get(ALL_TEACHERS)
        .map(|c| (ALL_TEACHERS.to_string(), c.clone()))
        .ok_or_else(|| FormError::NoRecipient(ALL_TEACHERS.to_string()))
}

fn question_body(q: &Question, to: &Contact) -> String {
    let mut body = String::new();
    // Writing into a String cannot fail
    write_question(&mut body, q, to).ok();
    body
}

fn write_question(body: &mut String, q: &Question, to: &Contact) -> fmt::Result {
    writeln!(body, "Assalamu Alaikum {},\n", to.name)?;
    writeln!(body, "I hope this message finds you in good health and Iman.\n")?;
    writeln!(body, "I have a question about the Deen that I would like to ask:\n")?;
    writeln!(body, "---")?;
    writeln!(body, "QUESTION SUBJECT: {}\n", q.subject)?;
    if let Some(category) = q.category {
        writeln!(body, "CATEGORY: {}\n", category.label())?;
    }
    writeln!(body, "QUESTION:\n{}\n", q.content)?;
    writeln!(body, "---\n")?;
    writeln!(body, "MY INFORMATION:")?;
    if let Some(name) = &q.name {
        writeln!(body, "Name: {}", name)?;
    }
    writeln!(body, "Email: {}", q.email)?;
    if let Some(phone) = &q.phone {
        writeln!(body, "Phone: {}", phone)?;
    }
    writeln!(body)?;
    writeln!(body, "I would be grateful if you could provide guidance on this matter.\n")?;
    writeln!(body, "Jazakallahu Khairan.\n")?;
    footer(body, "question", q.submitted_at)
}

/// Validate, record and draft a question to the chosen teacher.
pub fn submit_question(
    repo: &dyn Repository,
    contacts: &ContactsConfig,
    form: &QuestionForm,
    now: DateTime<Utc>,
) -> Result<MailDraft, FormError> {
    let subject = required("subject", &form.subject)?;
    let content = required("question", &form.content)?;
    let email = required_email(&form.email)?;
    let (teacher, contact) = resolve_teacher(contacts, form.teacher.as_deref())?;

    let question = Question {
        id: None,
        subject,
        content,
        category: form.category,
        teacher,
        name: optional(form.name.as_deref()),
        email,
        phone: optional(form.phone.as_deref()),
        submitted_at: now,
    };

    let draft = MailDraft {
        recipient: contact.name.clone(),
        to: contact.email.clone(),
        subject: format!("Question About Deen: {}", question.subject),
        body: question_body(&question, &contact),
    };
    repo.add_question(&question)?;
    Ok(draft)
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EnrollmentForm {
    pub programs: Vec<Program>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub level: Option<AcademicLevel>,
    pub year: Option<String>,
    pub message: Option<String>,
}

fn enrollment_body(e: &Enrollment, program: Program) -> String {
    let mut body = String::new();
    write_enrollment(&mut body, e, program).ok();
    body
}

fn write_enrollment(body: &mut String, e: &Enrollment, program: Program) -> fmt::Result {
    writeln!(body, "Assalamu Alaikum,\n")?;
    writeln!(body, "I hope this message finds you in good health and Iman.\n")?;
    writeln!(body, "I would like to enroll in the following program:\n")?;
    writeln!(body, "---")?;
    writeln!(body, "PROGRAM: {}\n", program.label())?;
    writeln!(body, "MY INFORMATION:")?;
    writeln!(body, "Name: {}", e.name)?;
    writeln!(body, "Email: {}", e.email)?;
    writeln!(body, "Phone: {}", e.phone)?;
    writeln!(body, "Academic Level: {}", e.level.label())?;
    if let Some(year) = &e.year {
        writeln!(body, "Year/Class: {}", year)?;
    }
    writeln!(body)?;
    if let Some(message) = &e.message {
        writeln!(body, "ADDITIONAL MESSAGE:\n{}\n", message)?;
    }
    writeln!(body, "---\n")?;
    writeln!(
        body,
        "I am committed to attending the program and following all guidelines provided.\n"
    )?;
    writeln!(
        body,
        "I would appreciate your confirmation and any further instructions regarding enrollment.\n"
    )?;
    writeln!(body, "Jazakallahu Khairan.\n")?;
    footer(body, "enrollment request", e.submitted_at)
}

/// Validate and record an enrollment; one draft per selected programme,
/// each addressed to that programme's department.
pub fn submit_enrollment(
    repo: &dyn Repository,
    contacts: &ContactsConfig,
    form: &EnrollmentForm,
    now: DateTime<Utc>,
) -> Result<Vec<MailDraft>, FormError> {
    if form.programs.is_empty() {
        return Err(FormError::NothingSelected("program"));
    }
    let name = required("name", &form.name)?;
    let email = required_email(&form.email)?;
    let phone = required("phone", &form.phone)?;
    let level = form.level.ok_or(FormError::Missing("academic level"))?;

    let mut seen = HashSet::new();
    let programs: Vec<Program> = form
        .programs
        .iter()
        .copied()
        .filter(|p| seen.insert(*p))
        .collect();

    let enrollment = Enrollment {
        id: None,
        programs,
        name,
        email,
        phone,
        level,
        year: optional(form.year.as_deref()),
        message: optional(form.message.as_deref()),
        submitted_at: now,
    };

    let departments = contacts.department_directory();
    let drafts = enrollment
        .programs
        .iter()
        .map(|program| {
            let dept = departments
                .get(program.as_str())
                .ok_or_else(|| FormError::NoRecipient(program.as_str().to_string()))?;
            Ok(MailDraft {
                recipient: dept.name.clone(),
                to: dept.email.clone(),
                subject: format!("Program Enrollment Request: {}", program.label()),
                body: enrollment_body(&enrollment, *program),
            })
        })
        .collect::<Result<Vec<_>, FormError>>()?;

    repo.add_enrollment(&enrollment)?;
    Ok(drafts)
}

// ─── Subscription ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SubscriptionForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub categories: Vec<NotificationCategory>,
}

pub fn submit_subscription(
    repo: &dyn Repository,
    form: &SubscriptionForm,
    now: DateTime<Utc>,
) -> Result<Subscription, FormError> {
    if form.categories.is_empty() {
        return Err(FormError::NothingSelected("notification type"));
    }
    let mut subscription = Subscription {
        id: None,
        name: required("name", &form.name)?,
        email: required_email(&form.email)?,
        phone: optional(form.phone.as_deref()),
        categories: form.categories.clone(),
        subscribed_at: now,
        active: true,
    };
    subscription.id = Some(repo.add_subscription(&subscription)?);
    Ok(subscription)
}

// ─── Contact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

fn write_contact(
    body: &mut String,
    message: &str,
    name: &str,
    email: &str,
    phone: Option<&str>,
    now: DateTime<Utc>,
) -> fmt::Result {
    writeln!(body, "Assalamu Alaikum,\n")?;
    writeln!(body, "{}\n", message)?;
    writeln!(body, "---")?;
    writeln!(body, "Name: {}", name)?;
    writeln!(body, "Email: {}", email)?;
    if let Some(phone) = phone {
        writeln!(body, "Phone: {}", phone)?;
    }
    writeln!(body)?;
    footer(body, "message", now)
}

/// Draft a message to the general office. Nothing is recorded.
pub fn compose_contact(
    contacts: &ContactsConfig,
    form: &ContactForm,
    now: DateTime<Utc>,
) -> Result<MailDraft, FormError> {
    let name = required("name", &form.name)?;
    let email = required_email(&form.email)?;
    let message = required("message", &form.message)?;
    let subject = optional(form.subject.as_deref())
        .unwrap_or_else(|| format!("Message from {}", name));

    let phone = optional(form.phone.as_deref());
    let mut body = String::new();
    write_contact(&mut body, &message, &name, &email, phone.as_deref(), now).ok();

    Ok(MailDraft {
        recipient: "KIUMA Office".to_string(),
        to: contacts.office_email.clone(),
        subject,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::SqliteRepository;

    fn repo() -> SqliteRepository {
        SqliteRepository::in_memory().unwrap()
    }

    fn question() -> QuestionForm {
        QuestionForm {
            subject: "Witr prayer".to_string(),
            content: "Is it obligatory?".to_string(),
            category: Some(QuestionCategory::Fiqh),
            teacher: Some("prof-twaib".to_string()),
            name: Some("  ".to_string()),
            email: "student@example.com".to_string(),
            phone: None,
        }
    }

    #[test]
    fn mailto_encodes_like_a_uri_component() {
        let draft = MailDraft {
            recipient: "x".to_string(),
            to: "a@b.ug".to_string(),
            subject: "Question About Deen: Zakat & Sadaqah?".to_string(),
            body: "Line one\nLine (two)".to_string(),
        };
        assert_eq!(
            draft.mailto(),
            "mailto:a@b.ug?subject=Question%20About%20Deen%3A%20Zakat%20%26%20Sadaqah%3F\
             &body=Line%20one%0ALine%20(two)"
        );
    }

    #[test]
    fn question_goes_to_the_chosen_teacher_and_is_recorded() {
        let r = repo();
        let draft = submit_question(&r, &ContactsConfig::default(), &question(), Utc::now()).unwrap();
        assert_eq!(draft.to, "prof.twaib@kiuma.ac.ug");
        assert_eq!(draft.subject, "Question About Deen: Witr prayer");
        assert!(draft.body.contains("CATEGORY: Fiqh (Jurisprudence)"));
        assert!(!draft.body.contains("Name:"));

        let stored = r.list_questions().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].teacher, "prof-twaib");
        assert_eq!(stored[0].name, None);
    }

    #[test]
    fn unknown_teacher_falls_back_to_all() {
        let r = repo();
        let mut form = question();
        form.teacher = Some("nobody".to_string());
        let draft = submit_question(&r, &ContactsConfig::default(), &form, Utc::now()).unwrap();
        assert_eq!(draft.to, "teachers@kiuma.ac.ug");
    }

    #[test]
    fn blank_fields_are_rejected_and_nothing_is_written() {
        let r = repo();
        let mut form = question();
        form.content = "   ".to_string();
        assert!(matches!(
            submit_question(&r, &ContactsConfig::default(), &form, Utc::now()),
            Err(FormError::Missing("question"))
        ));

        let mut form = question();
        form.email = "not-an-email".to_string();
        assert!(matches!(
            submit_question(&r, &ContactsConfig::default(), &form, Utc::now()),
            Err(FormError::InvalidEmail(_))
        ));
        assert!(r.list_questions().unwrap().is_empty());
    }

    #[test]
    fn enrollment_drafts_one_mail_per_department() {
        let r = repo();
        let form = EnrollmentForm {
            programs: vec![Program::Fiqh, Program::Mentorship],
            name: "Hamza".to_string(),
            email: "hamza@example.com".to_string(),
            phone: "0700 000 000".to_string(),
            level: Some(AcademicLevel::Undergraduate),
            year: Some("Year 2".to_string()),
            message: None,
        };
        let drafts = submit_enrollment(&r, &ContactsConfig::default(), &form, Utc::now()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].to, "fiqh@kiuma.ac.ug");
        assert_eq!(drafts[1].to, "mentorship@kiuma.ac.ug");
        assert!(drafts[1].subject.ends_with("Student Mentorship"));
        assert!(drafts[0].body.contains("Year/Class: Year 2"));
        assert_eq!(r.list_enrollments().unwrap().len(), 1);
    }

    #[test]
    fn repeated_programs_draft_once_in_first_seen_order() {
        let r = repo();
        let form = EnrollmentForm {
            programs: vec![Program::Fiqh, Program::Tafsir, Program::Fiqh],
            name: "Hamza".to_string(),
            email: "hamza@example.com".to_string(),
            phone: "0700 000 000".to_string(),
            level: Some(AcademicLevel::Undergraduate),
            year: None,
            message: None,
        };
        let drafts = submit_enrollment(&r, &ContactsConfig::default(), &form, Utc::now()).unwrap();
        let to: Vec<&str> = drafts.iter().map(|d| d.to.as_str()).collect();
        assert_eq!(to, ["fiqh@kiuma.ac.ug", "tafsir@kiuma.ac.ug"]);
        assert_eq!(
            r.list_enrollments().unwrap()[0].programs,
            vec![Program::Fiqh, Program::Tafsir]
        );
    }

    #[test]
    fn enrollment_needs_a_program_and_level() {
        let r = repo();
        let mut form = EnrollmentForm {
            programs: vec![],
            name: "Hamza".to_string(),
            email: "hamza@example.com".to_string(),
            phone: "0700".to_string(),
            level: None,
            year: None,
            message: None,
        };
        assert!(matches!(
            submit_enrollment(&r, &ContactsConfig::default(), &form, Utc::now()),
            Err(FormError::NothingSelected("program"))
        ));
        form.programs.push(Program::Tafsir);
        assert!(matches!(
            submit_enrollment(&r, &ContactsConfig::default(), &form, Utc::now()),
            Err(FormError::Missing("academic level"))
        ));
    }

    #[test]
    fn subscription_is_stored_active() {
        let r = repo();
        let form = SubscriptionForm {
            name: "Maryam".to_string(),
            email: "maryam@example.com".to_string(),
            phone: Some(String::new()),
            categories: vec![NotificationCategory::Ramadan],
        };
        let sub = submit_subscription(&r, &form, Utc::now()).unwrap();
        assert!(sub.active);
        assert!(sub.id.is_some());
        assert_eq!(sub.phone, None);

        let empty = SubscriptionForm {
            categories: vec![],
            ..form
        };
        assert!(matches!(
            submit_subscription(&r, &empty, Utc::now()),
            Err(FormError::NothingSelected(_))
        ));
    }

    #[test]
    fn contact_goes_to_the_office() {
        let form = ContactForm {
            name: "Ali".to_string(),
            email: "ali@example.com".to_string(),
            phone: None,
            subject: None,
            message: "When is the next open day?".to_string(),
        };
        let draft = compose_contact(&ContactsConfig::default(), &form, Utc::now()).unwrap();
        assert_eq!(draft.to, "info@kiuma.ac.ug");
        assert_eq!(draft.subject, "Message from Ali");
        assert!(draft.body.starts_with(
            "Assalamu Alaikum,\n\nWhen is the next open day?\n\n---\nName: Ali\nEmail: ali@example.com\n\n---\n"
        ));
        assert!(!draft.body.contains("Phone:"));
        assert!(draft.body.contains("Submitted on: "));

        let blank = ContactForm {
            message: "\n\t ".to_string(),
            ..form
        };
        assert!(matches!(
            compose_contact(&ContactsConfig::default(), &blank, Utc::now()),
            Err(FormError::Missing("message"))
        ));
    }
}
