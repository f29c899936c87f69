//! Student registration form: admin and online rule tables, online aliases
//! and defaults, and the typed column mapping.

use chrono::NaiveDate;
use uuid::Uuid;

use edunexus_core::forms::{parse_choice, title_case};
use edunexus_core::{Check, FieldRule, FormData};
use edunexus_models::{RegistrationType, StudentStatus};

use crate::utils::sql::Column;

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];
pub const CATEGORIES: &[&str] = &["General", "OBC", "SC", "ST", "EWS", "Other"];

/// File parts accepted on registration and full update.
pub const FILE_FIELDS: &[&str] = &["photo", "id_proof", "qualification_proof"];
/// File parts accepted by the exam paper upload.
pub const EXAM_PAPER_FIELDS: &[&str] = &["question_paper", "answer_sheet"];

pub const ONLINE_DEFAULT_FEE: &str = "150";
pub const ONLINE_DEFAULT_DURATION: &str = "6 Months";

const MOBILE: &[Check] = &[Check::MinDigits(10)];
const PINCODE: &[Check] = &[Check::MinDigits(6), Check::ExactLen(6)];

pub const ADMIN_RULES: &[FieldRule] = &[
    FieldRule::required("enrollment_no", "Enrollment number").with(&[Check::MaxLen(32)]),
    FieldRule::required("roll_no", "Roll number").with(&[Check::MaxLen(32)]),
    FieldRule::required("student_name", "Student name"),
    FieldRule::required("father_name", "Father's name"),
    FieldRule::optional("mother_name", "Mother's name"),
    FieldRule::required("dob", "Date of birth").with(&[Check::PastDate]),
    FieldRule::required("gender", "Gender").with(&[Check::OneOf(GENDERS)]),
    FieldRule::optional("category", "Category").with(&[Check::OneOf(CATEGORIES)]),
    FieldRule::required("mobile", "Mobile").with(MOBILE),
    FieldRule::optional("email", "Email").with(&[Check::Email]),
    FieldRule::required("address", "Address"),
    FieldRule::required("state", "State"),
    FieldRule::optional("pincode", "Pincode").with(PINCODE),
    FieldRule::required("course_id", "Course"),
    FieldRule::required("centre_code", "Centre code"),
    FieldRule::required("admission_date", "Admission date").with(&[Check::Date]),
    FieldRule::required("total_fee", "Total fee").with(&[Check::NonNegative]),
    FieldRule::optional("paid_fee", "Paid fee").with(&[Check::NonNegative]),
    FieldRule::optional("student_status", "Student status").with(&[Check::OneOf(StudentStatus::NAMES)]),
];

/// Public form. Identifiers are generated; fee, duration and admission date
/// get defaults before validation.
pub const ONLINE_RULES: &[FieldRule] = &[
    FieldRule::optional("enrollment_no", "Enrollment number").with(&[Check::MaxLen(32)]),
    FieldRule::optional("roll_no", "Roll number").with(&[Check::MaxLen(32)]),
    FieldRule::required("student_name", "Student name"),
    FieldRule::required("dob", "Date of birth").with(&[Check::PastDate]),
    FieldRule::optional("gender", "Gender").with(&[Check::OneOf(GENDERS)]),
    FieldRule::optional("category", "Category").with(&[Check::OneOf(CATEGORIES)]),
    FieldRule::required("mobile", "Mobile").with(MOBILE),
    FieldRule::optional("email", "Email").with(&[Check::Email]),
    FieldRule::optional("pincode", "Pincode").with(PINCODE),
    FieldRule::required("admission_date", "Admission date").with(&[Check::Date]),
    FieldRule::required("total_fee", "Total fee").with(&[Check::NonNegative]),
    FieldRule::optional("paid_fee", "Paid fee").with(&[Check::NonNegative]),
];

pub const ONLINE_ALIASES: &[(&str, &str)] = &[
    ("name", "student_name"),
    ("full_name", "student_name"),
    ("fathers_name", "father_name"),
    ("mothers_name", "mother_name"),
    ("date_of_birth", "dob"),
    ("phone", "mobile"),
    ("contact_no", "mobile"),
    ("qualification", "education"),
    ("course", "course_id"),
    ("centre", "centre_code"),
    ("center_code", "centre_code"),
    ("enrollment_number", "enrollment_no"),
    ("roll_number", "roll_no"),
    ("fees", "total_fee"),
    ("total_fees", "total_fee"),
    ("course_fee", "total_fee"),
    ("admission_on", "admission_date"),
];

pub const ONLINE_FILE_ALIASES: &[(&str, &str)] = &[
    ("student_photo", "photo"),
    ("image", "photo"),
    ("aadhar_card", "id_proof"),
    ("marksheet", "qualification_proof"),
];

/// Fills the online defaults for fields the applicant left blank.
pub fn apply_online_defaults(form: &mut FormData, today: NaiveDate) {
    if !form.contains("total_fee") {
        form.set("total_fee", ONLINE_DEFAULT_FEE);
    }
    if !form.contains("duration") {
        form.set("duration", ONLINE_DEFAULT_DURATION);
    }
    if !form.contains("admission_date") {
        form.set("admission_date", today.format("%Y-%m-%d").to_string());
    }
}

/// Value spelled the way `options` spells it, if it is one of them.
fn option_case(form: &FormData, key: &str, options: &[&str]) -> Option<String> {
    let value = form.get(key)?;
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(value))
        .map(|o| o.to_string())
}

/// Course id check that the rule table cannot express.
pub fn course_id_error(form: &FormData) -> Option<&'static str> {
    match form.get("course_id") {
        Some(raw) if raw.parse::<Uuid>().is_err() => Some("Course must be a valid course id"),
        _ => None,
    }
}

pub fn initial_status(form: &FormData, registration_type: RegistrationType) -> StudentStatus {
    option_case(form, "student_status", StudentStatus::NAMES)
        .and_then(|s| parse_choice(&s))
        .unwrap_or(match registration_type {
            RegistrationType::Admin => StudentStatus::Active,
            RegistrationType::Online => StudentStatus::Pending,
        })
}

/// Profile columns shared by create and full-form update, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub student_name: String,
    pub mobile: String,
    columns: Vec<(&'static str, Column)>,
}

impl StudentFields {
    pub fn from_form(form: &FormData) -> Self {
        let text = |key: &str| Column::Text(form.text(key));
        let place = |key: &str| Column::Text(form.get(key).map(title_case));

        let columns = vec![
            ("student_name", text("student_name")),
            ("father_name", text("father_name")),
            ("mother_name", text("mother_name")),
            ("dob", Column::Date(form.date("dob"))),
            ("gender", Column::Text(option_case(form, "gender", GENDERS))),
            ("category", Column::Text(option_case(form, "category", CATEGORIES))),
            ("mobile", text("mobile")),
            ("email", Column::Text(form.get("email").map(str::to_ascii_lowercase))),
            ("education", text("education")),
            ("address", text("address")),
            ("city", place("city")),
            ("district", place("district")),
            ("state", place("state")),
            ("pincode", text("pincode")),
            ("course_id", Column::Uuid(form.number::<Uuid>("course_id"))),
            ("centre_code", text("centre_code")),
            ("session", text("session")),
            ("admission_date", Column::Date(form.date("admission_date"))),
            ("duration", text("duration")),
            ("total_fee", Column::Real(Some(form.number("total_fee").unwrap_or(0.0)))),
            ("paid_fee", Column::Real(Some(form.number("paid_fee").unwrap_or(0.0)))),
        ];

        Self {
            student_name: form.text_or("student_name", ""),
            mobile: form.text_or("mobile", ""),
            columns,
        }
    }

    pub fn columns(&self) -> &[(&'static str, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(c, _)| *c == name).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_core::validate_rules;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn admin_form_requires_dates_and_identifiers() {
        let errors = validate_rules(&FormData::new(), ADMIN_RULES, today());
        for field in ["enrollment_no", "roll_no", "dob", "admission_date", "course_id"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn unparseable_dates_are_errors_for_required_fields() {
        let form = FormData::from_pairs([("dob", "31/02/2001"), ("admissionDate", "2025-13-01")]);
        let errors = validate_rules(&form, ADMIN_RULES, today());
        assert_eq!(errors.get("dob"), Some("Date of birth must be a valid date (YYYY-MM-DD)"));
        assert_eq!(
            errors.get("admission_date"),
            Some("Admission date must be a valid date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn online_defaults_fill_only_blank_fields() {
        let mut form = FormData::from_pairs([
            ("name", "Asha Verma"),
            ("dateOfBirth", "2004-08-15"),
            ("phone", "9123456780"),
            ("fees", ""),
        ]);
        form.apply_aliases(ONLINE_ALIASES);
        apply_online_defaults(&mut form, today());

        assert_eq!(form.get("total_fee"), Some("150"));
        assert_eq!(form.get("duration"), Some("6 Months"));
        assert_eq!(form.get("admission_date"), Some("2025-06-01"));
        assert!(validate_rules(&form, ONLINE_RULES, today()).is_empty());

        let mut form = FormData::from_pairs([("totalFee", "900"), ("duration", "1 Year")]);
        apply_online_defaults(&mut form, today());
        assert_eq!(form.get("total_fee"), Some("900"));
        assert_eq!(form.get("duration"), Some("1 Year"));
    }

    #[test]
    fn course_id_must_be_a_uuid() {
        let form = FormData::from_pairs([("courseId", "web-design")]);
        assert!(course_id_error(&form).is_some());
        let form = FormData::from_pairs([("courseId", Uuid::new_v4().to_string())]);
        assert!(course_id_error(&form).is_none());
        assert!(course_id_error(&FormData::new()).is_none());
    }

    #[test]
    fn status_defaults_by_registration_type() {
        let form = FormData::new();
        assert_eq!(initial_status(&form, RegistrationType::Admin), StudentStatus::Active);
        assert_eq!(initial_status(&form, RegistrationType::Online), StudentStatus::Pending);

        let form = FormData::from_pairs([("studentStatus", "completed")]);
        assert_eq!(initial_status(&form, RegistrationType::Online), StudentStatus::Completed);
    }

    #[test]
    fn choices_take_canonical_spelling() {
        let form = FormData::from_pairs([
            ("gender", "female"),
            ("category", "obc"),
            ("state", "uttar pradesh"),
            ("totalFee", "1200.50"),
        ]);
        let fields = StudentFields::from_form(&form);
        assert_eq!(fields.column("gender"), Some(&Column::Text(Some("Female".into()))));
        assert_eq!(fields.column("category"), Some(&Column::Text(Some("OBC".into()))));
        assert_eq!(fields.column("state"), Some(&Column::Text(Some("Uttar Pradesh".into()))));
        assert_eq!(fields.column("total_fee"), Some(&Column::Real(Some(1200.5))));
        assert_eq!(fields.column("paid_fee"), Some(&Column::Real(Some(0.0))));
    }
}
