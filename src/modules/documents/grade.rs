//! Result computation printed on the certificate.

use edunexus_models::SubjectMark;

const THRESHOLDS: &[(f64, char)] = &[(80.0, 'A'), (70.0, 'B'), (60.0, 'C'), (50.0, 'D'), (33.0, 'E')];

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub obtained: i64,
    pub full: i64,
    pub percentage: f64,
    /// `None` means the student failed.
    pub grade: Option<char>,
}

impl Outcome {
    pub fn from_marks(marks: &[SubjectMark]) -> Self {
        let full: i64 = marks.iter().map(|m| i64::from(m.full_marks)).sum();
        let obtained: i64 = marks.iter().filter_map(|m| m.obtained).map(i64::from).sum();
        let percentage = if full > 0 {
            obtained as f64 / full as f64 * 100.0
        } else {
            0.0
        };
        let grade = THRESHOLDS
            .iter()
            .find(|(min, _)| percentage >= *min)
            .map(|(_, g)| *g);

        Self {
            obtained,
            full,
            percentage,
            grade,
        }
    }

    pub fn result_label(&self) -> String {
        match self.grade {
            Some(g) => format!("Pass (Grade {})", g),
            None => "Fail".to_string(),
        }
    }

    pub fn percentage_label(&self) -> String {
        format!("{:.2}%", self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(full: i32, obtained: Option<i32>) -> SubjectMark {
        SubjectMark {
            name: "Subject".into(),
            full_marks: full,
            obtained,
        }
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        let cases = [
            (80, "Pass (Grade A)"),
            (79, "Pass (Grade B)"),
            (70, "Pass (Grade B)"),
            (60, "Pass (Grade C)"),
            (50, "Pass (Grade D)"),
            (33, "Pass (Grade E)"),
            (32, "Fail"),
            (0, "Fail"),
        ];
        for (obtained, expected) in cases {
            let outcome = Outcome::from_marks(&[mark(100, Some(obtained))]);
            assert_eq!(outcome.result_label(), expected, "obtained {}", obtained);
        }
    }

    #[test]
    fn percentage_sums_across_subjects() {
        let outcome = Outcome::from_marks(&[mark(100, Some(90)), mark(50, Some(30))]);
        assert_eq!(outcome.obtained, 120);
        assert_eq!(outcome.full, 150);
        assert_eq!(outcome.percentage_label(), "80.00%");
        assert_eq!(outcome.grade, Some('A'));
    }

    #[test]
    fn missing_marks_count_as_zero() {
        let outcome = Outcome::from_marks(&[mark(100, Some(40)), mark(100, None)]);
        assert_eq!(outcome.percentage, 20.0);
        assert_eq!(outcome.result_label(), "Fail");
    }

    #[test]
    fn no_subjects_is_a_fail() {
        let outcome = Outcome::from_marks(&[]);
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.result_label(), "Fail");
    }
}
