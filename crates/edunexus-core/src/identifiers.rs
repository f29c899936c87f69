//! Identifier and credential generation.
//!
//! Candidates combine a millisecond timestamp, a random suffix and, when a
//! mobile number is available, its last four digits. Candidates are never
//! checked ahead of time: the insert that stores them is the reservation,
//! and a unique violation on a generated column makes
//! [`reserve_with_retry`] try again with fresh candidates.

use std::future::Future;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{error, warn};

use crate::errors::AppError;

pub const MAX_IDENTIFIER_ATTEMPTS: u32 = 3;

pub const ONLINE_ENROLLMENT_PREFIX: &str = "ONL-EN-";
pub const ONLINE_ROLL_PREFIX: &str = "ONL-RN-";
pub const CENTRE_CODE_PREFIX: &str = "CEN-";
pub const CENTRE_LOGIN_PREFIX: &str = "CTR";

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Outcome of one insert attempt with generated identifiers.
#[derive(Debug)]
pub enum Reservation<T> {
    Reserved(T),
    /// A generated identifier was already taken; carries the violated constraint.
    Collision(String),
}

/// Last four digits of a contact number, if it has that many.
pub fn contact_fragment(mobile: Option<&str>) -> Option<String> {
    let digits: String = mobile?.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() >= 4).then(|| digits[digits.len() - 4..].to_string())
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

fn candidate(prefix: &str, mobile: Option<&str>, now: DateTime<Utc>) -> String {
    // Last 8 digits of the millisecond clock keep the value short.
    let stamp = now.timestamp_millis().rem_euclid(100_000_000);
    match contact_fragment(mobile) {
        Some(fragment) => format!("{}{:08}{}{}", prefix, stamp, fragment, random_suffix(3)),
        None => format!("{}{:08}{}", prefix, stamp, random_suffix(4)),
    }
}

pub fn enrollment_candidate(mobile: Option<&str>, now: DateTime<Utc>) -> String {
    candidate(ONLINE_ENROLLMENT_PREFIX, mobile, now)
}

pub fn roll_candidate(mobile: Option<&str>, now: DateTime<Utc>) -> String {
    candidate(ONLINE_ROLL_PREFIX, mobile, now)
}

pub fn centre_code_candidate(now: DateTime<Utc>) -> String {
    candidate(CENTRE_CODE_PREFIX, None, now)
}

pub fn login_id_candidate(mobile: Option<&str>, now: DateTime<Utc>) -> String {
    candidate(CENTRE_LOGIN_PREFIX, mobile, now)
}

/// Random password handed back once to an online applicant.
pub fn temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Runs `attempt` until it reserves its identifiers, at most
/// [`MAX_IDENTIFIER_ATTEMPTS`] times.
///
/// Every collision is logged. Exhaustion yields a 409 `identifier_exhausted`
/// error. Errors returned by `attempt` itself abort immediately.
pub async fn reserve_with_retry<T, F, Fut>(identifier: &str, mut attempt: F) -> Result<T, AppError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Reservation<T>, AppError>>,
{
    for n in 1..=MAX_IDENTIFIER_ATTEMPTS {
        match attempt(n).await? {
            Reservation::Reserved(value) => return Ok(value),
            Reservation::Collision(constraint) => {
                warn!(
                    identifier = %identifier,
                    attempt = n,
                    max_attempts = MAX_IDENTIFIER_ATTEMPTS,
                    constraint = %constraint,
                    "Generated identifier already taken"
                );
            }
        }
    }

    error!(
        identifier = %identifier,
        attempts = MAX_IDENTIFIER_ATTEMPTS,
        "Identifier allocation exhausted"
    );
    Err(AppError::identifier_exhausted(identifier, MAX_IDENTIFIER_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn contact_fragment_takes_last_four_digits() {
        assert_eq!(contact_fragment(Some("98765 43210")), Some("3210".to_string()));
        assert_eq!(contact_fragment(Some("12")), None);
        assert_eq!(contact_fragment(None), None);
    }

    #[test]
    fn online_candidates_carry_prefixes() {
        let enrollment = enrollment_candidate(Some("9876543210"), fixed_now());
        let roll = roll_candidate(Some("9876543210"), fixed_now());
        assert!(enrollment.starts_with("ONL-EN-"));
        assert!(roll.starts_with("ONL-RN-"));
        assert_ne!(enrollment, roll);
        assert!(enrollment.contains("3210"));
    }

    #[test]
    fn candidates_without_mobile_still_have_suffix() {
        let code = centre_code_candidate(fixed_now());
        assert!(code.starts_with("CEN-"));
        assert_eq!(code.len(), "CEN-".len() + 8 + 4);
    }

    #[test]
    fn temporary_password_is_alphanumeric() {
        let password = temporary_password();
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn reserve_returns_first_success() {
        let result = reserve_with_retry("roll number", |n| async move {
            if n < 2 {
                Ok(Reservation::Collision("students_roll_no_key".to_string()))
            } else {
                Ok(Reservation::Reserved(n))
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
    }

    #[tokio::test]
    async fn reserve_gives_up_after_three_attempts() {
        let mut calls = 0;
        let result: Result<(), AppError> = reserve_with_retry("enrollment number", |_| {
            calls += 1;
            async { Ok(Reservation::Collision("students_enrollment_no_key".to_string())) }
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, Some("identifier_exhausted"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn reserve_propagates_attempt_errors() {
        let result: Result<(), AppError> = reserve_with_retry("centre code", |_| async {
            Err(AppError::bad_request(anyhow::anyhow!("boom")))
        })
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
