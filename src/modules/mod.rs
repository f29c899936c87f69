pub mod auth;
pub mod careers;
pub mod centres;
pub mod courses;
pub mod deliveries;
pub mod documents;
pub mod enquiries;
pub mod fees;
pub mod library;
pub mod live_classes;
pub mod media;
pub mod messages;
pub mod notices;
pub mod online_exams;
pub mod pages;
pub mod students;
pub mod users;
