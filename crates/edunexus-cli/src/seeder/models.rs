//! Generated rows and seeding configuration.

use chrono::NaiveDate;
use edunexus_models::courses::CourseSubject;
use edunexus_models::{CategoryId, CourseId};

pub const SEED_PREFIX: &str = "SEED-";

pub struct CategorySeed {
    pub id: CategoryId,
    pub name: String,
    pub code: String,
}

pub struct CourseSeed {
    pub id: CourseId,
    pub category_id: CategoryId,
    pub name: String,
    pub code: String,
    pub duration: &'static str,
    pub fee: f64,
    pub subjects: Vec<CourseSubject>,
}

pub struct CentreSeed {
    pub centre_name: String,
    pub centre_code: String,
    pub login_id: String,
    pub owner_name: String,
    pub mobile: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

pub struct StudentSeed {
    pub enrollment_no: String,
    pub roll_no: String,
    pub student_name: String,
    pub father_name: String,
    pub dob: NaiveDate,
    pub gender: &'static str,
    pub mobile: String,
    pub course_id: CourseId,
    pub centre_code: String,
    pub session: String,
    pub admission_date: NaiveDate,
    pub duration: &'static str,
    pub total_fee: f64,
}

#[derive(Clone)]
pub struct SeedConfig {
    pub categories: usize,
    pub courses_per_category: usize,
    pub centres: usize,
    pub students_per_centre: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            categories: 4,
            courses_per_category: 3,
            centres: 5,
            students_per_centre: 20,
        }
    }
}

impl SeedConfig {
    pub fn new(centres: usize) -> Self {
        Self {
            centres,
            ..Default::default()
        }
    }

    pub fn with_catalog(mut self, categories: usize, courses_per_category: usize) -> Self {
        self.categories = categories;
        self.courses_per_category = courses_per_category;
        self
    }

    pub fn with_students(mut self, students_per_centre: usize) -> Self {
        self.students_per_centre = students_per_centre;
        self
    }

    pub fn total_students(&self) -> usize {
        self.centres * self.students_per_centre
    }
}
