/// Input validation rules
///
/// Pure, fail-fast checks over raw form input. Each check returns the first
/// violated rule; its `Display` text is the notice shown to the caller.
use crate::complaints::{
    Category, ComplaintUpdate, NewComplaint, Priority, Status, MAX_DESCRIPTION_LENGTH,
};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_HOSTEL_BLOCK_LENGTH: usize = 30;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_STAFF_ASSIGNED_LENGTH: usize = 100;
pub const MAX_REMARKS_LENGTH: usize = 1000;

lazy_static! {
    static ref ROLL_NUMBER: Regex = Regex::new(r"^4127[0-9]+$").unwrap();
    static ref ROOM_NUMBER: Regex = Regex::new(r"^[A-Za-z0-9/-]{1,20}$").unwrap();
}

/// A violated input rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a valid roll number that starts with 4127 and contains only digits.")]
    InvalidRollNumber,

    #[error("Admin username must be at least 3 characters.")]
    UsernameTooShort,

    #[error("Admin password must be at least 8 characters and include letters and numbers.")]
    WeakPassword,

    #[error("Please select a valid complaint category.")]
    InvalidCategory,

    #[error("Please select a valid priority.")]
    InvalidPriority,

    #[error("Hostel block is required.")]
    HostelBlockRequired,

    #[error("Hostel block must be 30 characters or less.")]
    HostelBlockTooLong,

    #[error("Room number is required.")]
    RoomNumberRequired,

    #[error("Room number can contain letters, numbers, '-' or '/'.")]
    InvalidRoomNumber,

    #[error("Complaint description is required.")]
    DescriptionRequired,

    #[error("Complaint description must be at least 10 characters.")]
    DescriptionTooShort,

    #[error("Complaint description must be under 500 characters.")]
    DescriptionTooLong,

    #[error("Invalid complaint ID.")]
    InvalidComplaintId,

    #[error("Invalid status selected.")]
    InvalidStatus,

    #[error("Invalid priority selected.")]
    InvalidUpdatePriority,

    #[error("Staff assigned must be 100 characters or less.")]
    StaffAssignedTooLong,

    #[error("Remarks must be 1000 characters or less.")]
    RemarksTooLong,
}

/// Raw complaint form as submitted by a student
#[derive(Debug, Clone, Default)]
pub struct ComplaintSubmission<'a> {
    pub hostel_block: &'a str,
    pub room_number: &'a str,
    pub category: &'a str,
    pub priority: &'a str,
    pub description: &'a str,
}

/// Raw update form as submitted by an admin
#[derive(Debug, Clone, Default)]
pub struct ComplaintUpdateForm<'a> {
    pub complaint_id: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub staff_assigned: &'a str,
    pub remarks: &'a str,
}

/// Validated registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRegistration {
    pub username: String,
    pub password: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Check a student roll number, returning it trimmed.
///
/// There is no roster lookup: any roll number of the right shape is an identity.
pub fn validate_roll_number(raw: &str) -> Result<String, ValidationError> {
    let roll_number = raw.trim();
    if !ROLL_NUMBER.is_match(roll_number) {
        return Err(ValidationError::InvalidRollNumber);
    }
    Ok(roll_number.to_string())
}

/// Check admin registration input. The password is taken verbatim.
pub fn validate_admin_registration(
    username: &str,
    password: &str,
) -> Result<AdminRegistration, ValidationError> {
    let username = username.trim();
    if char_len(username) < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if char_len(password) < MIN_PASSWORD_LENGTH || !has_letter || !has_digit {
        return Err(ValidationError::WeakPassword);
    }

    Ok(AdminRegistration {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Check a complaint submission in field order, stopping at the first failure.
///
/// The active-complaint quota is not checked here; it needs the store and runs
/// only once every syntactic rule has passed.
pub fn validate_complaint_submission(
    form: &ComplaintSubmission<'_>,
) -> Result<NewComplaint, ValidationError> {
    let category =
        Category::parse(form.category.trim()).ok_or(ValidationError::InvalidCategory)?;
    let priority =
        Priority::parse(form.priority.trim()).ok_or(ValidationError::InvalidPriority)?;

    let hostel_block = form.hostel_block.trim();
    if hostel_block.is_empty() {
        return Err(ValidationError::HostelBlockRequired);
    }
    if char_len(hostel_block) > MAX_HOSTEL_BLOCK_LENGTH {
        return Err(ValidationError::HostelBlockTooLong);
    }

    let room_number = form.room_number.trim().to_uppercase();
    if room_number.is_empty() {
        return Err(ValidationError::RoomNumberRequired);
    }
    if !ROOM_NUMBER.is_match(&room_number) {
        return Err(ValidationError::InvalidRoomNumber);
    }

    let description = form.description.trim();
    if description.is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }
    if char_len(description) < MIN_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooShort);
    }
    if char_len(description) > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong);
    }

    Ok(NewComplaint {
        hostel_block: hostel_block.to_string(),
        room_number,
        category,
        priority,
        description: description.to_string(),
    })
}

/// Check an administrative update.
pub fn validate_complaint_update(
    form: &ComplaintUpdateForm<'_>,
) -> Result<ComplaintUpdate, ValidationError> {
    let complaint_id = parse_complaint_id(form.complaint_id.trim())?;
    let status = Status::parse(form.status.trim()).ok_or(ValidationError::InvalidStatus)?;
    let priority =
        Priority::parse(form.priority.trim()).ok_or(ValidationError::InvalidUpdatePriority)?;

    let staff_assigned = form.staff_assigned.trim();
    if char_len(staff_assigned) > MAX_STAFF_ASSIGNED_LENGTH {
        return Err(ValidationError::StaffAssignedTooLong);
    }
    let remarks = form.remarks.trim();
    if char_len(remarks) > MAX_REMARKS_LENGTH {
        return Err(ValidationError::RemarksTooLong);
    }

    Ok(ComplaintUpdate {
        complaint_id,
        status,
        priority,
        staff_assigned: staff_assigned.to_string(),
        remarks: remarks.to_string(),
    })
}

fn parse_complaint_id(raw: &str) -> Result<i64, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidComplaintId);
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidComplaintId),
    }
}
