//! Centre registration form: rule tables, online field aliases and the
//! mapping from [`FormData`] onto typed column values.

use edunexus_core::forms::title_case;
use edunexus_core::{Check, FieldRule, FormData};

use crate::utils::sql::Column;

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];
pub const YES_NO: &[&str] = &["Yes", "No", "True", "False", "1", "0", "Y", "N", "On", "Off"];

pub const FILE_FIELDS: &[&str] = &[
    "owner_photo",
    "centre_photo",
    "id_proof",
    "address_proof",
    "signature",
];

const FLAG_CHECK: &[Check] = &[Check::OneOf(YES_NO)];
const MOBILE: &[Check] = &[Check::MinDigits(10)];
const PINCODE: &[Check] = &[Check::MinDigits(6), Check::ExactLen(6)];

/// Full form used by admins on create and by every update.
pub const ADMIN_RULES: &[FieldRule] = &[
    FieldRule::required("centre_name", "Centre name"),
    FieldRule::required("centre_code", "Centre code").with(&[Check::MaxLen(32)]),
    FieldRule::required("login_id", "Login ID").with(&[Check::MaxLen(32)]),
    FieldRule::optional("password", "Password").with(&[Check::MaxLen(72)]),
    FieldRule::required("owner_name", "Owner name"),
    FieldRule::optional("father_name", "Father's name"),
    FieldRule::optional("dob", "Date of birth").with(&[Check::PastDate]),
    FieldRule::optional("gender", "Gender").with(&[Check::OneOf(GENDERS)]),
    FieldRule::optional("email", "Email").with(&[Check::Email]),
    FieldRule::required("mobile", "Mobile").with(MOBILE),
    FieldRule::optional("alternate_mobile", "Alternate mobile").with(MOBILE),
    FieldRule::optional("pan_no", "PAN").with(&[Check::ExactLen(10)]),
    FieldRule::optional("aadhar_no", "Aadhar number").with(&[Check::MinDigits(12), Check::ExactLen(12)]),
    FieldRule::optional("pincode", "Pincode").with(PINCODE),
    FieldRule::required("centre_address", "Centre address"),
    FieldRule::required("centre_city", "Centre city"),
    FieldRule::required("centre_state", "Centre state"),
    FieldRule::optional("centre_pincode", "Centre pincode").with(PINCODE),
    FieldRule::optional("theory_room", "Theory room").with(FLAG_CHECK),
    FieldRule::optional("practical_room", "Practical room").with(FLAG_CHECK),
    FieldRule::optional("internet", "Internet").with(FLAG_CHECK),
    FieldRule::optional("reception", "Reception").with(FLAG_CHECK),
    FieldRule::optional("toilet", "Toilet").with(FLAG_CHECK),
    FieldRule::optional("power_backup", "Power backup").with(FLAG_CHECK),
    FieldRule::optional("computer_count", "Number of computers").with(&[Check::NonNegative]),
    FieldRule::optional("centre_area", "Centre area").with(&[Check::Positive]),
    FieldRule::optional("staff_count", "Number of staff").with(&[Check::NonNegative]),
    FieldRule::optional("offers_computer", "Computer courses").with(FLAG_CHECK),
    FieldRule::optional("offers_vocational", "Vocational courses").with(FLAG_CHECK),
    FieldRule::optional("offers_language", "Language courses").with(FLAG_CHECK),
    FieldRule::optional("offers_typing", "Typing courses").with(FLAG_CHECK),
];

/// Public application form. Identifiers and password are generated when absent.
pub const ONLINE_RULES: &[FieldRule] = &[
    FieldRule::required("centre_name", "Centre name"),
    FieldRule::optional("centre_code", "Centre code").with(&[Check::MaxLen(32)]),
    FieldRule::optional("login_id", "Login ID").with(&[Check::MaxLen(32)]),
    FieldRule::optional("password", "Password").with(&[Check::MaxLen(72)]),
    FieldRule::required("owner_name", "Owner name"),
    FieldRule::optional("dob", "Date of birth").with(&[Check::PastDate]),
    FieldRule::optional("gender", "Gender").with(&[Check::OneOf(GENDERS)]),
    FieldRule::optional("email", "Email").with(&[Check::Email]),
    FieldRule::required("mobile", "Mobile").with(MOBILE),
    FieldRule::optional("alternate_mobile", "Alternate mobile").with(MOBILE),
    FieldRule::optional("pan_no", "PAN").with(&[Check::ExactLen(10)]),
    FieldRule::optional("aadhar_no", "Aadhar number").with(&[Check::MinDigits(12), Check::ExactLen(12)]),
    FieldRule::optional("pincode", "Pincode").with(PINCODE),
    FieldRule::required("centre_address", "Centre address"),
    FieldRule::optional("centre_pincode", "Centre pincode").with(PINCODE),
    FieldRule::optional("computer_count", "Number of computers").with(&[Check::NonNegative]),
    FieldRule::optional("centre_area", "Centre area").with(&[Check::Positive]),
    FieldRule::optional("staff_count", "Number of staff").with(&[Check::NonNegative]),
];

/// Alternate names used by the public application form (already snake_cased).
pub const ONLINE_ALIASES: &[(&str, &str)] = &[
    ("center_name", "centre_name"),
    ("center_code", "centre_code"),
    ("center_address", "centre_address"),
    ("center_city", "centre_city"),
    ("center_district", "centre_district"),
    ("center_state", "centre_state"),
    ("center_pincode", "centre_pincode"),
    ("center_area", "centre_area"),
    ("director_name", "owner_name"),
    ("owner", "owner_name"),
    ("phone", "mobile"),
    ("contact_no", "mobile"),
    ("whatsapp", "alternate_mobile"),
    ("qualification", "education"),
    ("pan", "pan_no"),
    ("aadhar", "aadhar_no"),
    ("aadhaar_no", "aadhar_no"),
    ("no_of_computers", "computer_count"),
    ("total_computers", "computer_count"),
    ("area", "centre_area"),
    ("no_of_staff", "staff_count"),
    ("username", "login_id"),
];

pub const ONLINE_FILE_ALIASES: &[(&str, &str)] = &[
    ("photo", "owner_photo"),
    ("director_photo", "owner_photo"),
    ("center_photo", "centre_photo"),
    ("aadhar_card", "id_proof"),
    ("address_document", "address_proof"),
];

/// Profile columns shared by create and full-form update, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CentreFields {
    pub centre_name: String,
    pub owner_name: String,
    pub mobile: String,
    columns: Vec<(&'static str, Column)>,
}

impl CentreFields {
    pub fn from_form(form: &FormData) -> Self {
        let text = |key: &str| Column::Text(form.text(key));
        let flag = |key: &str| Column::Flag(form.flag(key));

        let columns = vec![
            ("centre_name", text("centre_name")),
            ("owner_name", text("owner_name")),
            ("father_name", text("father_name")),
            ("dob", Column::Date(form.date("dob"))),
            ("gender", Column::Text(form.title_case("gender"))),
            ("email", Column::Text(form.get("email").map(str::to_ascii_lowercase))),
            ("mobile", text("mobile")),
            ("alternate_mobile", text("alternate_mobile")),
            ("pan_no", Column::Text(form.get("pan_no").map(str::to_ascii_uppercase))),
            ("aadhar_no", text("aadhar_no")),
            ("education", text("education")),
            ("address", text("address")),
            ("city", Column::Text(form.get("city").map(title_case))),
            ("district", Column::Text(form.get("district").map(title_case))),
            ("state", Column::Text(form.get("state").map(title_case))),
            ("pincode", text("pincode")),
            ("centre_address", text("centre_address")),
            ("centre_city", Column::Text(form.get("centre_city").map(title_case))),
            ("centre_district", Column::Text(form.get("centre_district").map(title_case))),
            ("centre_state", Column::Text(form.get("centre_state").map(title_case))),
            ("centre_pincode", text("centre_pincode")),
            ("theory_room", flag("theory_room")),
            ("practical_room", flag("practical_room")),
            ("internet", flag("internet")),
            ("reception", flag("reception")),
            ("toilet", flag("toilet")),
            ("power_backup", flag("power_backup")),
            ("computer_count", Column::Int(form.number("computer_count"))),
            ("centre_area", Column::Real(form.number("centre_area"))),
            ("staff_count", Column::Int(form.number("staff_count"))),
            ("offers_computer", flag("offers_computer")),
            ("offers_vocational", flag("offers_vocational")),
            ("offers_language", flag("offers_language")),
            ("offers_typing", flag("offers_typing")),
        ];

        Self {
            centre_name: form.text_or("centre_name", ""),
            owner_name: form.text_or("owner_name", ""),
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
    use chrono::NaiveDate;
    use edunexus_core::validate_rules;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn empty_admin_form_lists_every_required_field() {
        let errors = validate_rules(&FormData::new(), ADMIN_RULES, today());
        let required: Vec<&str> = ADMIN_RULES
            .iter()
            .filter(|r| r.required)
            .map(|r| r.field)
            .collect();
        assert_eq!(errors.len(), required.len());
        for field in required {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn online_form_does_not_require_identifiers() {
        let mut form = FormData::from_pairs([
            ("centerName", "Sunrise Computers"),
            ("directorName", "Meena Iyer"),
            ("phone", "9876543210"),
            ("centerAddress", "12 Station Road"),
        ]);
        form.apply_aliases(ONLINE_ALIASES);
        assert!(validate_rules(&form, ONLINE_RULES, today()).is_empty());
        assert_eq!(form.get("owner_name"), Some("Meena Iyer"));
    }

    #[test]
    fn shape_errors_use_field_labels() {
        let form = FormData::from_pairs([("mobile", "12345"), ("panNo", "ABC")]);
        let errors = validate_rules(&form, ADMIN_RULES, today());
        assert_eq!(errors.get("mobile"), Some("Mobile must be at least 10 digits"));
        assert_eq!(errors.get("pan_no"), Some("PAN must be exactly 10 characters"));
    }

    #[test]
    fn bad_flag_values_are_reported() {
        let form = FormData::from_pairs([("internet", "sometimes")]);
        let errors = validate_rules(&form, ADMIN_RULES, today());
        assert!(errors.contains("internet"));
    }

    #[test]
    fn fields_are_normalized() {
        let form = FormData::from_pairs([
            ("centreName", "  Alpha Institute "),
            ("gender", "FEMALE"),
            ("panNo", "abcde1234f"),
            ("email", "Owner@Example.COM"),
            ("internet", "Yes"),
            ("toilet", "no"),
            ("computerCount", "15"),
            ("centreArea", "450.5"),
            ("dob", "not-a-date"),
        ]);
        let fields = CentreFields::from_form(&form);
        assert_eq!(fields.centre_name, "Alpha Institute");
        assert_eq!(fields.column("gender"), Some(&Column::Text(Some("Female".into()))));
        assert_eq!(fields.column("pan_no"), Some(&Column::Text(Some("ABCDE1234F".into()))));
        assert_eq!(fields.column("email"), Some(&Column::Text(Some("owner@example.com".into()))));
        assert_eq!(fields.column("internet"), Some(&Column::Flag(true)));
        assert_eq!(fields.column("toilet"), Some(&Column::Flag(false)));
        assert_eq!(fields.column("computer_count"), Some(&Column::Int(Some(15))));
        assert_eq!(fields.column("centre_area"), Some(&Column::Real(Some(450.5))));
        // optional date that fails to parse becomes absent
        assert_eq!(fields.column("dob"), Some(&Column::Date(None)));
    }
}
