//! # EduNexus Models
//!
//! Domain entities and request/response DTOs for the EduNexus API.
//!
//! Entities derive `sqlx::FromRow` for Postgres reads, `serde` for the JSON
//! surface and `utoipa::ToSchema` for the OpenAPI document. Multipart forms
//! (centre and student registration, uploads) are not modelled as DTOs here;
//! they are parsed into [`edunexus_core::FormData`] and checked against rule
//! tables in the API crate.
//!
//! # Modules
//!
//! - [`centres`]: Centres, their lifecycle enums and renewal DTOs
//! - [`students`]: Students, admit subjects and marks
//! - [`courses`]: Categories and courses
//! - [`deliveries`]: Study-material consignments
//! - [`live_classes`], [`online_exams`]: Scheduled teaching and exams
//! - [`notices`], [`messages`], [`media`], [`pages`], [`library`],
//!   [`enquiries`], [`careers`], [`fees`]: Simple records

pub mod auth;
pub mod careers;
pub mod centres;
pub mod common;
pub mod courses;
pub mod deliveries;
pub mod enquiries;
pub mod fees;
pub mod ids;
pub mod library;
pub mod live_classes;
pub mod media;
pub mod messages;
pub mod notices;
pub mod online_exams;
pub mod pages;
pub mod students;
pub mod users;

pub use auth::{
    CentreLoginRequest, Claims, LoginResponse, Role, StaffLoginRequest, StudentLoginRequest,
};
pub use common::{MessageResponse, PublishStatus};
pub use ids::{CategoryId, CentreId, CourseId, DeliveryId, StudentId, UserId};

pub use centres::{
    ApproveCentreDto, Centre, CentreFilterParams, CentreRegistrationResponse, CentreSource,
    CentreStatus, PaginatedCentresResponse, RenewalStatus, RestoreCentreDto, SetRenewalDto,
    UpdateCentreStatusDto,
};

pub use students::{
    AdmitSubject, IssueFlagsDto, PaginatedStudentsResponse, RegistrationType, SetAdmitSubjectsDto,
    SetMarksDto, Student, StudentFilterParams, StudentStatus, SubjectMark, UpdateStudentStatusDto,
};

pub use courses::{
    Category, Course, CourseFilterParams, CourseSubject, CreateCategoryDto, CreateCourseDto,
    PaginatedCoursesResponse, UpdateCategoryDto, UpdateCourseDto,
};

pub use deliveries::{
    CreateDeliveryDto, Delivery, DeliveryFilterParams, DeliveryStatus,
    PaginatedDeliveriesResponse, UpdateDeliveryDto,
};

pub use users::{CreateUserDto, User};
