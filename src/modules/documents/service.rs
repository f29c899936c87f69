use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use edunexus_core::AppError;
use edunexus_core::file_storage::{FileStorage, StorageError};
use edunexus_models::{Student, StudentId};

use crate::modules::students::service::{StudentScope, StudentService};

use super::grade::Outcome;
use super::pdf::{Font, Page, or_na};

const INSTITUTE: &str = "EduNexus Institute";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    AdmitCard,
    Certificate,
    IdCard,
}

impl DocumentKind {
    pub fn slug(self) -> &'static str {
        match self {
            DocumentKind::AdmitCard => "admit-card",
            DocumentKind::Certificate => "certificate",
            DocumentKind::IdCard => "id-card",
        }
    }
}

pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct DocumentService;

impl DocumentService {
    #[instrument(skip(db, storage))]
    pub async fn generate(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: StudentId,
        kind: DocumentKind,
        scope: StudentScope<'_>,
    ) -> Result<GeneratedDocument, AppError> {
        let student = StudentService::get(db, id, scope).await?;
        let photo = Self::load_photo(storage.as_ref(), student.photo.as_deref()).await;
        let file_name = format!("{}-{}.pdf", kind.slug(), student.enrollment_no);

        let bytes = tokio::task::spawn_blocking(move || render(kind, &student, photo.as_deref()))
            .await
            .map_err(AppError::internal)??;

        edunexus_observability::track_document_generated(kind.slug());
        info!(student_id = %id, kind = kind.slug(), size = bytes.len(), "Document generated");
        Ok(GeneratedDocument { file_name, bytes })
    }

    /// A missing or unreadable photo is not an error; the page gets a placeholder.
    async fn load_photo(storage: &dyn FileStorage, key: Option<&str>) -> Option<Vec<u8>> {
        let key = key?;
        match storage.read(key).await {
            Ok(bytes) => Some(bytes),
            Err(StorageError::NotFound) => {
                warn!(key = %key, "Student photo missing from storage");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Student photo could not be read");
                None
            }
        }
    }
}

pub fn render(kind: DocumentKind, student: &Student, photo: Option<&[u8]>) -> Result<Vec<u8>, AppError> {
    let page = match kind {
        DocumentKind::AdmitCard => admit_card(student, photo),
        DocumentKind::Certificate => certificate(student, photo),
        DocumentKind::IdCard => id_card(student, photo),
    };
    page.finish()
}

fn date(d: chrono::NaiveDate) -> String {
    d.format("%d-%m-%Y").to_string()
}

/// A4 portrait.
fn admit_card(student: &Student, photo: Option<&[u8]>) -> Page {
    let mut page = Page::new(595, 842);
    page.line_width(2);
    page.rect(30, 30, 535, 782);
    page.line_width(1);

    page.text_centered(Font::Bold, 20, 780, INSTITUTE);
    page.text_centered(Font::Bold, 16, 750, "ADMIT CARD");
    page.line(40, 735, 555, 735);

    page.photo(photo, 445, 590, 100, 125);

    let dob = date(student.dob);
    let rows = [
        ("Student Name:", student.student_name.as_str()),
        ("Enrollment No:", student.enrollment_no.as_str()),
        ("Roll No:", student.roll_no.as_str()),
        ("Father's Name:", or_na(student.father_name.as_deref())),
        ("Date of Birth:", dob.as_str()),
        ("Course:", or_na(student.course_name.as_deref())),
        ("Centre Code:", or_na(student.centre_code.as_deref())),
        ("Session:", or_na(student.session.as_deref())),
    ];
    let mut y = 700;
    for (label, value) in rows {
        page.field(11, 50, y, label, value);
        y -= 20;
    }

    y -= 20;
    page.text(Font::Bold, 12, 50, y, "Examination Schedule");
    y -= 8;
    page.line(50, y, 545, y);
    y -= 16;
    for (x, header) in [(50, "Subject"), (300, "Full Marks"), (380, "Date"), (470, "Time")] {
        page.text(Font::Bold, 10, x, y, header);
    }
    y -= 16;

    if student.admit_subjects.is_empty() {
        page.text(Font::Regular, 10, 50, y, NOT_SCHEDULED);
        y -= 16;
    }
    for subject in student.admit_subjects.iter() {
        if y < 120 {
            break;
        }
        page.text(Font::Regular, 10, 50, y, &subject.name);
        page.text(Font::Regular, 10, 300, y, &subject.full_marks.to_string());
        page.text(Font::Regular, 10, 380, y, or_na(subject.exam_date.as_deref()));
        page.text(Font::Regular, 10, 470, y, or_na(subject.exam_time.as_deref()));
        y -= 16;
    }

    page.text(Font::Regular, 9, 50, 90, "Bring this admit card to every examination.");
    page.line(400, 80, 545, 80);
    page.text(Font::Regular, 9, 430, 66, "Controller of Exams");
    page
}

const NOT_SCHEDULED: &str = "Subjects not yet scheduled";

/// A4 landscape.
fn certificate(student: &Student, photo: Option<&[u8]>) -> Page {
    let mut page = Page::new(842, 595);
    page.line_width(4);
    page.rect(20, 20, 802, 555);
    page.line_width(1);
    page.rect(30, 30, 782, 535);

    page.text_centered(Font::Bold, 28, 520, INSTITUTE);
    page.text_centered(Font::Bold, 22, 480, "CERTIFICATE OF COMPLETION");
    page.photo(photo, 700, 400, 80, 100);

    page.text_centered(Font::Regular, 13, 430, "This is to certify that");
    page.text_centered(Font::Bold, 20, 400, &student.student_name);
    page.text_centered(
        Font::Regular,
        13,
        370,
        &format!(
            "son/daughter of {}, Enrollment No. {}",
            or_na(student.father_name.as_deref()),
            student.enrollment_no
        ),
    );
    page.text_centered(
        Font::Regular,
        13,
        345,
        &format!(
            "has completed the course {} ({})",
            or_na(student.course_name.as_deref()),
            or_na(student.duration.as_deref())
        ),
    );
    page.text_centered(
        Font::Regular,
        13,
        320,
        &format!("at centre {}", or_na(student.centre_code.as_deref())),
    );

    let outcome = Outcome::from_marks(&student.marks);
    page.text_centered(
        Font::Bold,
        14,
        280,
        &format!(
            "Marks: {} / {}   Percentage: {}   Result: {}",
            outcome.obtained,
            outcome.full,
            outcome.percentage_label(),
            outcome.result_label()
        ),
    );

    page.field(11, 60, 90, "Date of Admission:", &date(student.admission_date));
    page.field(11, 60, 70, "Session:", or_na(student.session.as_deref()));
    page.line(620, 90, 780, 90);
    page.text(Font::Regular, 10, 665, 75, "Director");
    page
}

/// CR80 card size.
fn id_card(student: &Student, photo: Option<&[u8]>) -> Page {
    let mut page = Page::new(243, 153);
    page.rect(3, 3, 237, 147);
    page.text_centered(Font::Bold, 10, 136, INSTITUTE);
    page.text_centered(Font::Bold, 7, 126, "STUDENT IDENTITY CARD");
    page.line(6, 120, 237, 120);

    page.photo(photo, 10, 40, 60, 75);

    let rows = [
        ("Name:", student.student_name.as_str()),
        ("Enroll:", student.enrollment_no.as_str()),
        ("Roll:", student.roll_no.as_str()),
        ("Course:", or_na(student.course_name.as_deref())),
        ("Centre:", or_na(student.centre_code.as_deref())),
        ("Mobile:", student.mobile.as_str()),
    ];
    let mut y = 106;
    for (label, value) in rows {
        page.field(7, 78, y, label, value);
        y -= 12;
    }
    page.text(Font::Regular, 6, 10, 20, &format!("DOB: {}", date(student.dob)));
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use edunexus_models::{AdmitSubject, RegistrationType, StudentStatus, SubjectMark};
    use sqlx::types::Json;

    fn student() -> Student {
        let now = Utc::now();
        Student {
            id: StudentId::new(),
            registration_type: RegistrationType::Admin,
            enrollment_no: "ENR-1001".into(),
            roll_no: "R-1".into(),
            student_name: "Asha Verma".into(),
            father_name: None,
            mother_name: None,
            dob: NaiveDate::from_ymd_opt(2004, 8, 15).unwrap(),
            gender: Some("Female".into()),
            category: None,
            mobile: "9123456780".into(),
            email: None,
            education: None,
            address: None,
            city: None,
            district: None,
            state: None,
            pincode: None,
            course_id: None,
            course_name: None,
            centre_code: Some("CEN-001".into()),
            session: None,
            admission_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            duration: None,
            total_fee: 1000.0,
            paid_fee: 0.0,
            admit_subjects: Json(vec![AdmitSubject {
                name: "Computer Fundamentals".into(),
                full_marks: 100,
                exam_date: Some("2025-06-01".into()),
                exam_time: None,
            }]),
            marks: Json(vec![SubjectMark {
                name: "Computer Fundamentals".into(),
                full_marks: 100,
                obtained: Some(72),
            }]),
            photo: None,
            id_proof: None,
            qualification_proof: None,
            question_paper: None,
            answer_sheet: None,
            admit_issued: true,
            marksheet_issued: true,
            certificate_issued: false,
            semester_issued: false,
            student_status: StudentStatus::Active,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn kinds_parse_from_path_segments() {
        let kind: DocumentKind = serde_json::from_str(r#""admit-card""#).unwrap();
        assert_eq!(kind, DocumentKind::AdmitCard);
        let kind: DocumentKind = serde_json::from_str(r#""id-card""#).unwrap();
        assert_eq!(kind.slug(), "id-card");
        assert!(serde_json::from_str::<DocumentKind>(r#""marksheet""#).is_err());
    }

    #[test]
    fn every_kind_renders_with_missing_fields() {
        let student = student();
        for kind in [DocumentKind::AdmitCard, DocumentKind::Certificate, DocumentKind::IdCard] {
            let pdf = render(kind, &student, None).unwrap();
            assert!(pdf.starts_with(b"%PDF"), "{} is not a PDF", kind.slug());
        }
    }

    #[test]
    fn admit_card_without_subjects_still_renders() {
        let mut student = student();
        student.admit_subjects = Json(vec![]);
        assert!(render(DocumentKind::AdmitCard, &student, None).is_ok());
    }
}
