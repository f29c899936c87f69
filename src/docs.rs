use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use edunexus_auth::Role;
use edunexus_core::{PaginationMeta, PaginationParams};
use edunexus_models::{
    careers, enquiries, fees, library, live_classes, media, messages, notices, online_exams, pages,
};
use edunexus_models::{
    AdmitSubject, ApproveCentreDto, Category, Centre, CentreFilterParams, CentreLoginRequest,
    CentreRegistrationResponse, CentreSource, CentreStatus, Course, CourseFilterParams,
    CourseSubject, CreateCategoryDto, CreateCourseDto, CreateDeliveryDto, CreateUserDto, Delivery,
    DeliveryFilterParams, DeliveryStatus, IssueFlagsDto, LoginResponse, MessageResponse,
    PaginatedCentresResponse, PaginatedCoursesResponse, PaginatedDeliveriesResponse,
    PaginatedStudentsResponse, PublishStatus, RegistrationType, RenewalStatus, RestoreCentreDto,
    SetAdmitSubjectsDto, SetMarksDto, SetRenewalDto, StaffLoginRequest, Student,
    StudentFilterParams, StudentLoginRequest, StudentStatus, SubjectMark, UpdateCategoryDto,
    UpdateCentreStatusDto, UpdateCourseDto, UpdateDeliveryDto, UpdateStudentStatusDto, User,
};

use crate::modules::auth::controller::{ErrorResponse, SessionResponse};
use crate::modules::documents::service::DocumentKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_staff,
        crate::modules::auth::controller::login_centre,
        crate::modules::auth::controller::login_student,
        crate::modules::auth::controller::current_session,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::delete_user,
        crate::modules::centres::controller::register_centre,
        crate::modules::centres::controller::apply_centre,
        crate::modules::centres::controller::list_centres,
        crate::modules::centres::controller::list_deleted_centres,
        crate::modules::centres::controller::get_centre,
        crate::modules::centres::controller::get_my_centre,
        crate::modules::centres::controller::update_centre,
        crate::modules::centres::controller::delete_centre,
        crate::modules::centres::controller::restore_centre,
        crate::modules::centres::controller::approve_centre,
        crate::modules::centres::controller::update_centre_status,
        crate::modules::centres::controller::set_centre_renewal,
        crate::modules::centres::controller::renew_centre,
        crate::modules::centres::controller::expire_centre,
        crate::modules::students::controller::register_student,
        crate::modules::students::controller::apply_student,
        crate::modules::students::controller::list_students,
        crate::modules::students::controller::list_deleted_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::get_my_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::restore_student,
        crate::modules::students::controller::set_admit_subjects,
        crate::modules::students::controller::set_marks,
        crate::modules::students::controller::set_issue_flags,
        crate::modules::students::controller::update_student_status,
        crate::modules::students::controller::upload_exam_papers,
        crate::modules::documents::controller::download_student_document,
        crate::modules::courses::controller::create_category,
        crate::modules::courses::controller::list_categories,
        crate::modules::courses::controller::get_category,
        crate::modules::courses::controller::update_category,
        crate::modules::courses::controller::delete_category,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::restore_course,
        crate::modules::deliveries::controller::create_delivery,
        crate::modules::deliveries::controller::list_deliveries,
        crate::modules::deliveries::controller::get_delivery,
        crate::modules::deliveries::controller::track_delivery,
        crate::modules::deliveries::controller::update_delivery,
        crate::modules::deliveries::controller::delete_delivery,
        crate::modules::live_classes::controller::create_live_class,
        crate::modules::live_classes::controller::list_live_classes,
        crate::modules::live_classes::controller::get_live_class,
        crate::modules::live_classes::controller::update_live_class,
        crate::modules::live_classes::controller::delete_live_class,
        crate::modules::online_exams::controller::create_online_exam,
        crate::modules::online_exams::controller::list_online_exams,
        crate::modules::online_exams::controller::get_online_exam,
        crate::modules::online_exams::controller::update_online_exam,
        crate::modules::online_exams::controller::delete_online_exam,
        crate::modules::notices::controller::create_notice,
        crate::modules::notices::controller::list_notices,
        crate::modules::notices::controller::list_all_notices,
        crate::modules::notices::controller::get_notice,
        crate::modules::notices::controller::update_notice,
        crate::modules::notices::controller::delete_notice,
        crate::modules::messages::controller::create_message,
        crate::modules::messages::controller::list_messages,
        crate::modules::messages::controller::get_message,
        crate::modules::messages::controller::update_message_status,
        crate::modules::messages::controller::delete_message,
        crate::modules::fees::controller::create_fee,
        crate::modules::fees::controller::list_fees,
        crate::modules::fees::controller::get_fee,
        crate::modules::fees::controller::update_fee,
        crate::modules::fees::controller::delete_fee,
        crate::modules::careers::controller::apply_for_job,
        crate::modules::careers::controller::list_applications,
        crate::modules::careers::controller::get_application,
        crate::modules::careers::controller::update_application_status,
        crate::modules::careers::controller::delete_application,
        crate::modules::enquiries::controller::create_contact,
        crate::modules::enquiries::controller::list_contacts,
        crate::modules::enquiries::controller::update_contact_status,
        crate::modules::enquiries::controller::delete_contact,
        crate::modules::enquiries::controller::create_feedback,
        crate::modules::enquiries::controller::list_feedback,
        crate::modules::enquiries::controller::list_all_feedback,
        crate::modules::enquiries::controller::update_feedback_status,
        crate::modules::enquiries::controller::delete_feedback,
        crate::modules::media::controller::create_gallery_item,
        crate::modules::media::controller::list_gallery,
        crate::modules::media::controller::list_all_gallery,
        crate::modules::media::controller::update_gallery_item,
        crate::modules::media::controller::delete_gallery_item,
        crate::modules::media::controller::create_slider,
        crate::modules::media::controller::list_sliders,
        crate::modules::media::controller::list_all_sliders,
        crate::modules::media::controller::update_slider,
        crate::modules::media::controller::delete_slider,
        crate::modules::pages::controller::create_page,
        crate::modules::pages::controller::list_pages,
        crate::modules::pages::controller::get_page,
        crate::modules::pages::controller::update_page,
        crate::modules::pages::controller::delete_page,
        crate::modules::pages::controller::create_team_member,
        crate::modules::pages::controller::list_team,
        crate::modules::pages::controller::list_all_team,
        crate::modules::pages::controller::update_team_member,
        crate::modules::pages::controller::delete_team_member,
        crate::modules::library::controller::create_book,
        crate::modules::library::controller::list_books,
        crate::modules::library::controller::list_all_books,
        crate::modules::library::controller::get_book,
        crate::modules::library::controller::update_book,
        crate::modules::library::controller::delete_book,
        crate::modules::library::controller::create_download,
        crate::modules::library::controller::list_downloads,
        crate::modules::library::controller::list_all_downloads,
        crate::modules::library::controller::update_download,
        crate::modules::library::controller::delete_download,
    ),
    components(
        schemas(
            Role,
            ErrorResponse,
            SessionResponse,
            MessageResponse,
            PublishStatus,
            PaginationMeta,
            PaginationParams,
            StaffLoginRequest,
            CentreLoginRequest,
            StudentLoginRequest,
            LoginResponse,
            User,
            CreateUserDto,
            Centre,
            CentreSource,
            CentreStatus,
            RenewalStatus,
            CentreRegistrationResponse,
            CentreFilterParams,
            PaginatedCentresResponse,
            SetRenewalDto,
            RestoreCentreDto,
            UpdateCentreStatusDto,
            ApproveCentreDto,
            Student,
            RegistrationType,
            StudentStatus,
            AdmitSubject,
            SubjectMark,
            StudentFilterParams,
            PaginatedStudentsResponse,
            SetAdmitSubjectsDto,
            SetMarksDto,
            UpdateStudentStatusDto,
            IssueFlagsDto,
            DocumentKind,
            Category,
            CreateCategoryDto,
            UpdateCategoryDto,
            Course,
            CourseSubject,
            CreateCourseDto,
            UpdateCourseDto,
            CourseFilterParams,
            PaginatedCoursesResponse,
            Delivery,
            DeliveryStatus,
            CreateDeliveryDto,
            UpdateDeliveryDto,
            DeliveryFilterParams,
            PaginatedDeliveriesResponse,
            live_classes::LiveClass,
            live_classes::CreateLiveClassDto,
            live_classes::UpdateLiveClassDto,
            live_classes::LiveClassFilterParams,
            live_classes::PaginatedLiveClassesResponse,
            online_exams::OnlineExam,
            online_exams::ExamStatus,
            online_exams::CreateOnlineExamDto,
            online_exams::UpdateOnlineExamDto,
            online_exams::PaginatedOnlineExamsResponse,
            notices::Notice,
            notices::PaginatedNoticesResponse,
            messages::Message,
            messages::MessageStatus,
            messages::MessageFilterParams,
            messages::UpdateMessageStatusDto,
            messages::PaginatedMessagesResponse,
            fees::Fee,
            fees::FeeStatus,
            fees::CreateFeeDto,
            fees::UpdateFeeDto,
            fees::FeeFilterParams,
            fees::PaginatedFeesResponse,
            careers::JobApplication,
            careers::ApplicationStatus,
            careers::JobApplicationFilterParams,
            careers::UpdateApplicationStatusDto,
            careers::PaginatedJobApplicationsResponse,
            enquiries::Contact,
            enquiries::EnquiryStatus,
            enquiries::CreateContactDto,
            enquiries::ContactFilterParams,
            enquiries::UpdateContactStatusDto,
            enquiries::PaginatedContactsResponse,
            enquiries::Feedback,
            enquiries::CreateFeedbackDto,
            enquiries::UpdatePublishStatusDto,
            enquiries::PaginatedFeedbackResponse,
            media::GalleryItem,
            media::Slider,
            media::PaginatedGalleryResponse,
            pages::Page,
            pages::CreatePageDto,
            pages::UpdatePageDto,
            pages::TeamMember,
            library::Book,
            library::Download,
            library::BookFilterParams,
            library::PaginatedBooksResponse,
            library::PaginatedDownloadsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Staff, centre and student login"),
        (name = "Users", description = "Admin and staff accounts"),
        (name = "Centres", description = "Centre registration, approval, renewal and trash"),
        (name = "Students", description = "Student registration, results and trash"),
        (name = "Documents", description = "Admit card, certificate and ID card PDFs"),
        (name = "Courses", description = "Course categories and courses"),
        (name = "Deliveries", description = "Study material consignments"),
        (name = "Live Classes", description = "Scheduled online classes"),
        (name = "Online Exams", description = "Online examinations"),
        (name = "Notices", description = "Public notices"),
        (name = "Messages", description = "Centre to head office messages"),
        (name = "Fees", description = "Fee receipts"),
        (name = "Careers", description = "Job applications"),
        (name = "Enquiries", description = "Contact enquiries and feedback"),
        (name = "Media", description = "Gallery and home page sliders"),
        (name = "Pages", description = "Content pages and team members"),
        (name = "Library", description = "E-books and downloads")
    ),
    info(
        title = "EduNexus API",
        version = "0.1.0",
        description = "Institute management REST API: centres, students, courses, documents and site content.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
