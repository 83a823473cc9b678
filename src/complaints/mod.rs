/// Complaint domain
///
/// Complaint records, their closed value sets, and the managers that
/// create, update and list them.

pub mod filter;
pub mod manager;

pub use filter::{ComplaintFilter, FilterValue, StatusSummary};
pub use manager::ComplaintManager;

use chrono::{DateTime, Utc};

/// Maximum number of Pending / In Progress complaints a student may hold at once
pub const MAX_ACTIVE_COMPLAINTS: i64 = 5;

/// Longest accepted complaint description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A fixed set of labels stored as their exact spelling
pub trait ClosedSet: Copy + Sized + 'static {
    fn label(&self) -> &'static str;
    fn from_label(s: &str) -> Option<Self>;
}

/// A closed-set column as read back from the store.
///
/// Rows written by other tools may hold spellings outside the set; they are
/// kept verbatim so the row still renders and sorts after every known value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored<T> {
    Known(T),
    Other(String),
}

impl<T: ClosedSet> Stored<T> {
    pub fn from_raw(raw: String) -> Self {
        match T::from_label(&raw) {
            Some(value) => Stored::Known(value),
            None => Stored::Other(raw),
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Stored::Known(value) => Some(*value),
            Stored::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Stored::Known(value) => value.label(),
            Stored::Other(raw) => raw,
        }
    }
}

impl<T> From<T> for Stored<T> {
    fn from(value: T) -> Self {
        Stored::Known(value)
    }
}

/// Complaint category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ElectricalFault,
    RoomRelated,
    Food,
    Water,
    Bathroom,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ElectricalFault,
        Category::RoomRelated,
        Category::Food,
        Category::Water,
        Category::Bathroom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ElectricalFault => "Electrical Fault",
            Category::RoomRelated => "Room Related",
            Category::Food => "Food",
            Category::Water => "Water",
            Category::Bathroom => "Bathroom",
        }
    }

    /// Exact, case-sensitive match against the stored spelling
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Complaint status
///
/// Any status may follow any other; admins are trusted to move complaints freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Resolved];

    /// Statuses that count against a student's quota
    pub const ACTIVE: [Status; 2] = [Status::Pending, Status::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Position in the admin dashboard ordering
    pub fn rank(&self) -> i64 {
        match self {
            Status::Pending => 1,
            Status::InProgress => 2,
            Status::Resolved => 3,
        }
    }
}

/// Complaint priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Position in the admin dashboard ordering (most urgent first)
    pub fn rank(&self) -> i64 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl ClosedSet for Category {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn from_label(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

impl ClosedSet for Status {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn from_label(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

impl ClosedSet for Priority {
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn from_label(s: &str) -> Option<Self> {
        Self::parse(s)
    }
}

/// Complaint record as shown on dashboards.
///
/// The owner's roll number is a query key only and is never loaded into this
/// struct, so neither dashboard can expose it.
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: i64,
    pub hostel_block: String,
    pub room_number: String,
    pub category: Stored<Category>,
    pub priority: Stored<Priority>,
    pub description: String,
    pub status: Stored<Status>,
    pub staff_assigned: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated complaint submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub hostel_block: String,
    pub room_number: String,
    pub category: Category,
    pub priority: Priority,
    pub description: String,
}

/// A validated administrative update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintUpdate {
    pub complaint_id: i64,
    pub status: Status,
    pub priority: Priority,
    pub staff_assigned: String,
    pub remarks: String,
}
