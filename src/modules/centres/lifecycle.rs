//! Centre lifecycle transitions.
//!
//! Two independent axes: `status` (Active/Inactive/Pending/Deleted) and the
//! renewal window (`renewal_from`, `renewal_to`, `renewal_status`,
//! `renewed_at`). Status changes never touch the renewal window and renewal
//! operations never touch status. Everything here is pure; the service loads
//! the row under a lock, applies one of these and writes it back.

use anyhow::anyhow;
use chrono::{DateTime, Duration, Months, Utc};

use edunexus_core::{AppError, FieldErrors};
use edunexus_models::{Centre, CentreSource, CentreStatus, RenewalStatus};

/// Length of one renewal term.
pub const RENEWAL_TERM: Months = Months::new(24);

pub fn add_term(at: DateTime<Utc>) -> DateTime<Utc> {
    at.checked_add_months(RENEWAL_TERM)
        .unwrap_or(at + Duration::days(730))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub status: RenewalStatus,
    pub renewed_at: Option<DateTime<Utc>>,
}

impl RenewalWindow {
    pub fn of(centre: &Centre) -> Self {
        Self {
            from: centre.renewal_from,
            to: centre.renewal_to,
            status: centre.renewal_status,
            renewed_at: centre.renewed_at,
        }
    }
}

/// Window given to every new centre: one term starting now, never renewed.
pub fn initial_window(now: DateTime<Utc>) -> RenewalWindow {
    RenewalWindow {
        from: now,
        to: add_term(now),
        status: RenewalStatus::Active,
        renewed_at: None,
    }
}

/// Admin-created centres start live; online applications wait for review.
pub fn initial_status(source: CentreSource) -> (CentreStatus, bool) {
    match source {
        CentreSource::Admin => (CentreStatus::Active, true),
        CentreSource::Online => (CentreStatus::Pending, false),
    }
}

/// Explicit window. `from` must be strictly in the future and before `to`.
pub fn set_renewal(
    centre: &mut Centre,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    if from <= now {
        errors.add("renewal_from", "Renewal start date must be in the future");
    }
    if to <= from {
        errors.add("renewal_to", "Renewal end date must be after the start date");
    }
    errors.into_result()?;

    centre.renewal_from = from;
    centre.renewal_to = to;
    centre.renewal_status = RenewalStatus::Active;
    centre.renewed_at = Some(now);
    Ok(())
}

/// Extends the current window by one term, whatever state the centre is in.
pub fn renew(centre: &mut Centre, now: DateTime<Utc>) {
    centre.renewal_to = add_term(centre.renewal_to);
    centre.renewal_status = RenewalStatus::Active;
    centre.renewed_at = Some(now);
}

pub fn expire(centre: &mut Centre) {
    centre.renewal_status = RenewalStatus::Expired;
}

pub fn soft_delete(centre: &mut Centre, now: DateTime<Utc>) {
    centre.status = CentreStatus::Deleted;
    centre.deleted_at = Some(now);
}

pub fn restore(centre: &mut Centre, status: Option<CentreStatus>) -> Result<(), AppError> {
    let status = status.unwrap_or(CentreStatus::Active);
    if status == CentreStatus::Deleted {
        return Err(AppError::bad_request(anyhow!(
            "A centre cannot be restored into the Deleted status"
        )));
    }
    centre.status = status;
    centre.deleted_at = None;
    Ok(())
}

pub fn approve(centre: &mut Centre, approved: bool) {
    centre.approved = approved;
}

/// Direct status change. Deletion goes through [`soft_delete`] so that
/// `deleted_at` stays consistent.
pub fn set_status(centre: &mut Centre, status: CentreStatus) -> Result<(), AppError> {
    if status == CentreStatus::Deleted {
        return Err(AppError::bad_request(anyhow!(
            "Use the delete endpoint to delete a centre"
        )));
    }
    centre.status = status;
    if centre.deleted_at.is_some() {
        centre.deleted_at = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use edunexus_models::CentreId;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn centre(now: DateTime<Utc>) -> Centre {
        let window = initial_window(now);
        let (status, approved) = initial_status(CentreSource::Admin);
        Centre {
            id: CentreId::new(),
            centre_name: "Alpha Institute".into(),
            centre_code: "CEN-001".into(),
            login_id: "alpha".into(),
            password: String::new(),
            owner_name: "Ravi Kumar".into(),
            father_name: None,
            dob: None,
            gender: None,
            email: None,
            mobile: "9876543210".into(),
            alternate_mobile: None,
            pan_no: None,
            aadhar_no: None,
            education: None,
            address: None,
            city: None,
            district: None,
            state: None,
            pincode: None,
            centre_address: Some("12 Main Road".into()),
            centre_city: None,
            centre_district: None,
            centre_state: None,
            centre_pincode: None,
            theory_room: false,
            practical_room: false,
            internet: true,
            reception: false,
            toilet: false,
            power_backup: false,
            computer_count: Some(10),
            centre_area: None,
            staff_count: None,
            offers_computer: true,
            offers_vocational: false,
            offers_language: false,
            offers_typing: false,
            owner_photo: None,
            centre_photo: None,
            id_proof: None,
            address_proof: None,
            signature: None,
            source: CentreSource::Admin,
            status,
            approved,
            renewal_from: window.from,
            renewal_to: window.to,
            renewal_status: window.status,
            renewed_at: window.renewed_at,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn initial_window_spans_two_years() {
        let now = at(2025, 3, 1);
        let window = initial_window(now);
        assert_eq!(window.from, now);
        assert_eq!(window.to, at(2027, 3, 1));
        assert_eq!(window.status, RenewalStatus::Active);
        assert_eq!(window.renewed_at, None);
    }

    #[test]
    fn initial_status_depends_on_source() {
        assert_eq!(initial_status(CentreSource::Admin), (CentreStatus::Active, true));
        assert_eq!(initial_status(CentreSource::Online), (CentreStatus::Pending, false));
    }

    #[test]
    fn renew_after_expire_adds_exactly_two_years() {
        let mut c = centre(at(2024, 1, 10));
        expire(&mut c);
        assert_eq!(c.renewal_status, RenewalStatus::Expired);

        let before = c.renewal_to;
        let now = at(2026, 5, 5);
        renew(&mut c, now);
        assert_eq!(c.renewal_status, RenewalStatus::Active);
        assert_eq!(c.renewal_to, add_term(before));
        assert_eq!(c.renewal_to, at(2028, 1, 10));
        assert_eq!(c.renewed_at, Some(now));
    }

    #[test]
    fn renew_works_on_deleted_centre_and_keeps_status() {
        let mut c = centre(at(2024, 1, 10));
        soft_delete(&mut c, at(2024, 6, 1));
        renew(&mut c, at(2024, 7, 1));
        assert_eq!(c.status, CentreStatus::Deleted);
        assert_eq!(c.renewal_to, at(2028, 1, 10));
    }

    #[test]
    fn soft_delete_and_restore_leave_renewal_untouched() {
        let mut c = centre(at(2024, 1, 10));
        expire(&mut c);
        let window = RenewalWindow::of(&c);

        soft_delete(&mut c, at(2024, 2, 1));
        assert_eq!(c.status, CentreStatus::Deleted);
        assert_eq!(c.deleted_at, Some(at(2024, 2, 1)));
        assert_eq!(RenewalWindow::of(&c), window);

        restore(&mut c, None).unwrap();
        assert_eq!(c.status, CentreStatus::Active);
        assert_eq!(c.deleted_at, None);
        assert_eq!(RenewalWindow::of(&c), window);
    }

    #[test]
    fn restore_into_requested_status() {
        let mut c = centre(at(2024, 1, 10));
        soft_delete(&mut c, at(2024, 2, 1));
        restore(&mut c, Some(CentreStatus::Inactive)).unwrap();
        assert_eq!(c.status, CentreStatus::Inactive);

        assert!(restore(&mut c, Some(CentreStatus::Deleted)).is_err());
    }

    #[test]
    fn set_renewal_requires_future_start_before_end() {
        let now = at(2025, 1, 1);
        let mut c = centre(now);

        let err = set_renewal(&mut c, at(2024, 12, 1), at(2026, 1, 1), now).unwrap_err();
        assert!(err.fields.as_ref().unwrap().contains("renewal_from"));

        let err = set_renewal(&mut c, at(2025, 2, 1), at(2025, 2, 1), now).unwrap_err();
        assert!(err.fields.as_ref().unwrap().contains("renewal_to"));

        // both problems are reported together
        let err = set_renewal(&mut c, now, at(2024, 1, 1), now).unwrap_err();
        assert_eq!(err.fields.as_ref().unwrap().len(), 2);

        c.renewal_status = RenewalStatus::Expired;
        set_renewal(&mut c, at(2025, 2, 1), at(2027, 2, 1), now).unwrap();
        assert_eq!(c.renewal_from, at(2025, 2, 1));
        assert_eq!(c.renewal_to, at(2027, 2, 1));
        assert_eq!(c.renewal_status, RenewalStatus::Active);
        assert_eq!(c.renewed_at, Some(now));
    }

    #[test]
    fn approval_is_independent_of_status() {
        let mut c = centre(at(2024, 1, 10));
        soft_delete(&mut c, at(2024, 2, 1));
        approve(&mut c, false);
        assert!(!c.approved);
        assert_eq!(c.status, CentreStatus::Deleted);
    }

    #[test]
    fn status_change_cannot_delete() {
        let mut c = centre(at(2024, 1, 10));
        assert!(set_status(&mut c, CentreStatus::Deleted).is_err());
        set_status(&mut c, CentreStatus::Inactive).unwrap();
        assert_eq!(c.status, CentreStatus::Inactive);
    }

    #[test]
    fn leap_day_term_clamps_to_month_end() {
        assert_eq!(add_term(at(2024, 2, 29)), at(2026, 2, 28));
    }
}
