/// HTML pages
///
/// Every page is rendered server-side from plain strings. All user-supplied
/// text passes through `html_escape` before it reaches the markup.
use crate::{
    complaints::{
        filter::ALL, Category, Complaint, ComplaintFilter, Priority, Status, StatusSummary, Stored,
        MAX_ACTIVE_COMPLAINTS, MAX_DESCRIPTION_LENGTH,
    },
    config::BrandingConfig,
    validation::{MAX_HOSTEL_BLOCK_LENGTH, MAX_REMARKS_LENGTH, MAX_STAFF_ASSIGNED_LENGTH},
};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_safe};
use std::fmt::Write;

const STYLE: &str = r#"
:root { --bg: #f5f7fb; --card: #ffffff; --text: #1a202c; --muted: #4a5568; --primary: #0f4c81; --success: #0f7a4f; --border: #d9e2ec; }
* { box-sizing: border-box; }
body { margin: 0; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: linear-gradient(180deg, #eef3fb 0%, #f8fafc 100%); color: var(--text); }
.container { max-width: 1000px; margin: 24px auto; padding: 0 16px; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 16px; margin-bottom: 16px; box-shadow: 0 2px 6px rgba(15, 76, 129, 0.08); }
.card.narrow { max-width: 520px; }
h1, h2, h3 { margin-top: 0; }
label { display: block; margin-bottom: 6px; font-weight: 600; }
input, select, textarea { width: 100%; padding: 10px; border: 1px solid #b9c6d3; border-radius: 8px; margin-bottom: 12px; font: inherit; }
textarea { min-height: 90px; resize: vertical; }
button, .btn { display: inline-block; background: var(--primary); color: #fff; border: none; border-radius: 8px; padding: 10px 14px; cursor: pointer; text-decoration: none; font-weight: 600; }
.btn-secondary { background: #4a5568; }
.btn-success { background: var(--success); }
.action-row { display: flex; gap: 10px; flex-wrap: wrap; }
.nav { background: #102a43; color: #fff; padding: 12px 16px; display: flex; gap: 12px; align-items: center; flex-wrap: wrap; }
.nav a { color: #fff; text-decoration: none; margin-right: 12px; font-weight: 600; }
.nav-title { font-weight: 700; }
.brand-header { background: #fff; border: 1px solid var(--border); border-radius: 12px; margin-bottom: 16px; display: flex; overflow: hidden; }
.brand-logo { width: 100%; height: auto; display: block; object-fit: cover; }
.alert { border-radius: 8px; padding: 10px; margin-bottom: 12px; border: 1px solid #b7d7c9; background: #e8f6ee; color: #1e5631; }
.table-wrap { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid var(--border); padding: 10px; text-align: left; vertical-align: top; }
th { background: #eef3fb; }
.small { color: var(--muted); font-size: 0.9rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 16px; }
.status-pending { color: #a16207; font-weight: 700; }
.status-inprogress { color: #1d4ed8; font-weight: 700; }
.status-resolved { color: #166534; font-weight: 700; }
.priority-low { color: #166534; font-weight: 700; }
.priority-medium { color: #a16207; font-weight: 700; }
.priority-high { color: #b91c1c; font-weight: 700; }
.chip { display: inline-block; padding: 4px 8px; border-radius: 999px; background: #eef3fb; border: 1px solid #d9e2ec; font-size: 0.86rem; margin-right: 6px; }
"#;

/// CSS class for a status cell
pub fn status_class(status: Status) -> &'static str {
    match status {
        Status::Pending => "status-pending",
        Status::InProgress => "status-inprogress",
        Status::Resolved => "status-resolved",
    }
}

/// CSS class for a priority cell
pub fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "priority-high",
        Priority::Medium => "priority-medium",
        Priority::Low => "priority-low",
    }
}

/// Class for a stored status; unrecognized values render like a resolved complaint
fn stored_status_class(status: &Stored<Status>) -> &'static str {
    status.known().map_or("status-resolved", status_class)
}

/// Class for a stored priority; unrecognized values render like a low priority
fn stored_priority_class(priority: &Stored<Priority>) -> &'static str {
    priority.known().map_or("priority-low", priority_class)
}

/// Navigation bar entry
enum Nav<'a> {
    Link(&'a str, &'a str),
    Title(&'a str),
}

fn layout(branding: &BrandingConfig, title: &str, nav: &[Nav<'_>], content: &str) -> String {
    let mut nav_html = String::new();
    for item in nav {
        match item {
            Nav::Link(href, label) => {
                let _ = write!(
                    nav_html,
                    r#"<a href="{}">{}</a>"#,
                    encode_double_quoted_attribute(href),
                    encode_safe(label)
                );
            }
            Nav::Title(label) => {
                let _ = write!(nav_html, r#"<span class="nav-title">{}</span>"#, encode_safe(label));
            }
        }
    }

    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | {system}</title>
  <style>{style}</style>
</head>
<body>
  <div class="nav">{nav}</div>
  <div class="container">
    <div class="brand-header">
      <img class="brand-logo" src="{logo}" alt="{college} logo">
    </div>
    {content}
  </div>
</body>
</html>
"#,
        title = encode_safe(title),
        system = encode_safe(&branding.system_name),
        style = STYLE,
        nav = nav_html,
        logo = encode_double_quoted_attribute(&branding.logo_url),
        college = encode_double_quoted_attribute(&branding.college_name),
        content = content,
    )
}

fn notices_html(notices: &[String]) -> String {
    notices
        .iter()
        .map(|n| format!(r#"<div class="alert">{}</div>"#, encode_safe(n)))
        .collect()
}

fn options<'a>(
    values: impl IntoIterator<Item = &'a str>,
    selected: Option<&str>,
) -> String {
    values
        .into_iter()
        .map(|value| {
            let marker = if Some(value) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{v}"{marker}>{label}</option>"#,
                v = encode_double_quoted_attribute(value),
                marker = marker,
                label = encode_safe(value),
            )
        })
        .collect()
}

fn display_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => encode_safe(v).into_owned(),
        _ => "-".to_string(),
    }
}

/// Landing page with links to both portals
pub fn index(branding: &BrandingConfig) -> String {
    let content = format!(
        r#"<div class="card">
      <h2>{college}</h2>
      <p class="small">{system}</p>
      <p class="small">Students can raise complaints and track status. Admin can manage all complaints.</p>
      <a class="btn" href="/student/login">Student Login</a>
      <a class="btn btn-secondary" href="/admin/login">Admin Login</a>
    </div>"#,
        college = encode_safe(&branding.college_name),
        system = encode_safe(&branding.system_name),
    );
    layout(branding, "Hostel Portal", &[Nav::Title("Portal")], &content)
}

pub fn student_login(branding: &BrandingConfig, notices: &[String]) -> String {
    let content = format!(
        r#"<div class="card narrow">
      <h2>Student Login</h2>
      <p class="small">Use your unique roll number (must start with 4127).</p>
      {notices}
      <form method="post" action="/student/login">
        <label for="roll_number">Roll Number</label>
        <input id="roll_number" name="roll_number" type="text" required placeholder="4127...">
        <button type="submit">Login</button>
      </form>
    </div>"#,
        notices = notices_html(notices),
    );
    layout(
        branding,
        "Student Login",
        &[Nav::Link("/", "Home"), Nav::Title("Student Portal")],
        &content,
    )
}

fn student_history(complaints: &[Complaint]) -> String {
    if complaints.is_empty() {
        return r#"<p class="small">No complaints filed yet.</p>"#.to_string();
    }

    let mut rows = String::new();
    for c in complaints {
        let _ = write!(
            rows,
            r#"<tr><td>{id}</td><td>{block}</td><td>{room}</td><td>{category}</td><td class="{pclass}">{priority}</td><td>{description}</td><td class="{sclass}">{status}</td><td>{staff}</td><td>{remarks}</td><td>{created}</td><td>{updated}</td></tr>"#,
            id = c.id,
            block = encode_safe(&c.hostel_block),
            room = encode_safe(&c.room_number),
            category = encode_safe(c.category.as_str()),
            pclass = stored_priority_class(&c.priority),
            priority = encode_safe(c.priority.as_str()),
            description = encode_safe(&c.description),
            sclass = stored_status_class(&c.status),
            status = encode_safe(c.status.as_str()),
            staff = or_dash(c.staff_assigned.as_deref()),
            remarks = or_dash(c.remarks.as_deref()),
            created = display_time(&c.created_at),
            updated = display_time(&c.updated_at),
        );
    }

    format!(
        r#"<div class="table-wrap"><table>
        <thead><tr><th>ID</th><th>Block</th><th>Room</th><th>Category</th><th>Priority</th><th>Description</th><th>Status</th><th>Assigned Staff</th><th>Admin Remarks</th><th>Created</th><th>Last Updated</th></tr></thead>
        <tbody>{rows}</tbody>
      </table></div>"#
    )
}

/// Student dashboard: submission form plus the student's own history, newest first
pub fn student_dashboard(
    branding: &BrandingConfig,
    roll_number: &str,
    notices: &[String],
    complaints: &[Complaint],
) -> String {
    let content = format!(
        r#"<div class="card">
      <h2>Welcome, {roll}</h2>
      <p class="small">File complaints and track status/history. Maximum active complaints allowed: {max_active}.</p>
    </div>
    <div class="grid">
      <div class="card">
        <h3>File New Complaint</h3>
        {notices}
        <form method="post" action="/student/dashboard">
          <label for="hostel_block">Hostel Block</label>
          <input id="hostel_block" name="hostel_block" type="text" required maxlength="{max_block}" placeholder="e.g. A Block">
          <label for="room_number">Room Number</label>
          <input id="room_number" name="room_number" type="text" required maxlength="20" placeholder="e.g. 102 or B-204">
          <label for="category">Category</label>
          <select id="category" name="category" required><option value="">Select category</option>{categories}</select>
          <label for="priority">Priority</label>
          <select id="priority" name="priority" required><option value="">Select priority</option>{priorities}</select>
          <label for="description">Complaint Details</label>
          <textarea id="description" name="description" required maxlength="{max_desc}" placeholder="Explain the issue clearly (10 to {max_desc} characters)"></textarea>
          <button class="btn btn-success" type="submit">Submit Complaint</button>
        </form>
      </div>
      <div class="card">
        <h3>Your Complaint History</h3>
        {history}
      </div>
    </div>"#,
        roll = encode_safe(roll_number),
        max_active = MAX_ACTIVE_COMPLAINTS,
        notices = notices_html(notices),
        max_block = MAX_HOSTEL_BLOCK_LENGTH,
        categories = options(Category::ALL.iter().map(|c| c.as_str()), None),
        priorities = options(Priority::ALL.iter().map(|p| p.as_str()), None),
        max_desc = MAX_DESCRIPTION_LENGTH,
        history = student_history(complaints),
    );
    layout(
        branding,
        "Student Dashboard",
        &[
            Nav::Link("/", "Home"),
            Nav::Title("Student Portal"),
            Nav::Link("/student/logout", "Logout"),
        ],
        &content,
    )
}

pub fn admin_login(branding: &BrandingConfig, notices: &[String]) -> String {
    let content = format!(
        r#"<div class="card narrow">
      <h2>Admin Login</h2>
      <p class="small">Login using admin username and password.</p>
      {notices}
      <form method="post" action="/admin/login">
        <label for="username">Username</label>
        <input id="username" name="username" type="text" required>
        <label for="password">Password</label>
        <input id="password" name="password" type="password" required>
        <div class="action-row">
          <button type="submit">Login</button>
          <a class="btn btn-secondary" href="/admin/register">Create Admin</a>
        </div>
      </form>
    </div>"#,
        notices = notices_html(notices),
    );
    layout(
        branding,
        "Admin Login",
        &[Nav::Link("/", "Home"), Nav::Title("Admin Portal")],
        &content,
    )
}

pub fn admin_register(branding: &BrandingConfig, notices: &[String]) -> String {
    let content = format!(
        r#"<div class="card narrow">
      <h2>Create Admin Account</h2>
      {notices}
      <form method="post" action="/admin/register">
        <label for="username">Admin Username</label>
        <input id="username" name="username" type="text" required>
        <label for="password">Admin Password</label>
        <input id="password" name="password" type="password" required>
        <button type="submit">Create Admin</button>
      </form>
    </div>"#,
        notices = notices_html(notices),
    );
    layout(
        branding,
        "Create Admin",
        &[
            Nav::Link("/", "Home"),
            Nav::Link("/admin/login", "Admin Login"),
            Nav::Title("Create Admin"),
        ],
        &content,
    )
}

/// Everything the admin dashboard shows. Complaints never carry the filer's roll number.
pub struct AdminDashboard<'a> {
    pub admin_username: &'a str,
    pub complaints: &'a [Complaint],
    pub summary: StatusSummary,
    pub filter: ComplaintFilter,
}

fn filter_select(id: &str, label: &str, values: &[&'static str], selected: &str) -> String {
    format!(
        r#"<label for="{id}">{label}</label>
        <select id="{id}" name="{id}">{options}</select>"#,
        id = id,
        label = label,
        options = options(std::iter::once(ALL).chain(values.iter().copied()), Some(selected)),
    )
}

fn update_form(complaint: &Complaint, filter: &ComplaintFilter) -> String {
    format!(
        r#"<form method="post" action="/admin/dashboard">
          <input type="hidden" name="complaint_id" value="{id}">
          <input type="hidden" name="status_filter" value="{sf}">
          <input type="hidden" name="category_filter" value="{cf}">
          <input type="hidden" name="priority_filter" value="{pf}">
          <label>Status</label>
          <select name="status" required>{statuses}</select>
          <label>Priority</label>
          <select name="priority" required>{priorities}</select>
          <label>Assign Staff</label>
          <input type="text" name="staff_assigned" maxlength="{max_staff}" value="{staff}" placeholder="e.g. Electrician Ravi">
          <label>Remarks</label>
          <textarea name="remarks" maxlength="{max_remarks}" placeholder="Add remarks">{remarks}</textarea>
          <button type="submit">Update</button>
        </form>"#,
        id = complaint.id,
        sf = encode_double_quoted_attribute(filter.status_label()),
        cf = encode_double_quoted_attribute(filter.category_label()),
        pf = encode_double_quoted_attribute(filter.priority_label()),
        statuses = options(
            Status::ALL.iter().map(|s| s.as_str()),
            Some(complaint.status.as_str())
        ),
        priorities = options(
            Priority::ALL.iter().map(|p| p.as_str()),
            Some(complaint.priority.as_str())
        ),
        max_staff = MAX_STAFF_ASSIGNED_LENGTH,
        staff = encode_double_quoted_attribute(complaint.staff_assigned.as_deref().unwrap_or("")),
        max_remarks = MAX_REMARKS_LENGTH,
        remarks = encode_safe(complaint.remarks.as_deref().unwrap_or("")),
    )
}

/// Admin dashboard: summary chips, filters, and one update form per complaint
pub fn admin_dashboard(
    branding: &BrandingConfig,
    notices: &[String],
    view: &AdminDashboard<'_>,
) -> String {
    let filter = &view.filter;
    let statuses: Vec<&'static str> = Status::ALL.iter().map(|s| s.as_str()).collect();
    let categories: Vec<&'static str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let priorities: Vec<&'static str> = Priority::ALL.iter().map(|p| p.as_str()).collect();

    let table = if view.complaints.is_empty() {
        r#"<p class="small">No complaints available.</p>"#.to_string()
    } else {
        let mut rows = String::new();
        for c in view.complaints {
            let _ = write!(
                rows,
                r#"<tr><td>{id}</td><td>{block}</td><td>{room}</td><td>{category}</td><td class="{pclass}">{priority}</td><td>{description}</td><td class="{sclass}">{status}</td><td>{staff}</td><td>{remarks}</td><td>{created}</td><td>{updated}</td><td>{form}</td></tr>"#,
                id = c.id,
                block = encode_safe(&c.hostel_block),
                room = encode_safe(&c.room_number),
                category = encode_safe(c.category.as_str()),
                pclass = stored_priority_class(&c.priority),
                priority = encode_safe(c.priority.as_str()),
                description = encode_safe(&c.description),
                sclass = stored_status_class(&c.status),
                status = encode_safe(c.status.as_str()),
                staff = or_dash(c.staff_assigned.as_deref()),
                remarks = or_dash(c.remarks.as_deref()),
                created = display_time(&c.created_at),
                updated = display_time(&c.updated_at),
                form = update_form(c, filter),
            );
        }
        format!(
            r#"<div class="table-wrap"><table>
        <thead><tr><th>ID</th><th>Block</th><th>Room</th><th>Category</th><th>Priority</th><th>Description</th><th>Status</th><th>Assigned Staff</th><th>Remarks</th><th>Created</th><th>Last Updated</th><th>Actions</th></tr></thead>
        <tbody>{rows}</tbody>
      </table></div>"#
        )
    };

    let content = format!(
        r#"<div class="card">
      <h2>All Complaints</h2>
      <p class="small">Student identity is hidden in admin view.</p>
      <p>
        <span class="chip">Pending: {pending}</span>
        <span class="chip">In Progress: {in_progress}</span>
        <span class="chip">Resolved: {resolved}</span>
        <span class="chip">Visible (Filtered): {visible}</span>
      </p>
      <form method="get" action="/admin/dashboard">
        {status_select}
        {category_select}
        {priority_select}
        <button type="submit" class="btn btn-secondary">Apply Filters</button>
      </form>
      {notices}
      {table}
    </div>"#,
        pending = view.summary.get(Status::Pending),
        in_progress = view.summary.get(Status::InProgress),
        resolved = view.summary.get(Status::Resolved),
        visible = view.complaints.len(),
        status_select = filter_select("status_filter", "Filter by Status", &statuses, filter.status_label()),
        category_select = filter_select("category_filter", "Filter by Category", &categories, filter.category_label()),
        priority_select = filter_select("priority_filter", "Filter by Priority", &priorities, filter.priority_label()),
        notices = notices_html(notices),
        table = table,
    );

    let portal = format!("Admin Portal ({})", view.admin_username);
    layout(
        branding,
        "Admin Dashboard",
        &[
            Nav::Link("/", "Home"),
            Nav::Title(&portal),
            Nav::Link("/admin/logout", "Logout"),
        ],
        &content,
    )
}

/// Standalone error page; used where no branding is at hand
pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        r#"<div class="card narrow">
      <h2>{code} {reason}</h2>
      <div class="alert">{message}</div>
      <a class="btn" href="/">Back to portal</a>
    </div>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = encode_safe(message),
    );
    layout(
        &BrandingConfig::default(),
        "Error",
        &[Nav::Link("/", "Home")],
        &content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn complaint(id: i64, status: Status, priority: Priority) -> Complaint {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        Complaint {
            id,
            hostel_block: "Block A".to_string(),
            room_number: "B-204".to_string(),
            category: Category::Water.into(),
            priority: priority.into(),
            description: "Tap <b>leaking</b> since Monday".to_string(),
            status: status.into(),
            staff_assigned: Some(String::new()),
            remarks: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_class_mappings() {
        assert_eq!(status_class(Status::Pending), "status-pending");
        assert_eq!(status_class(Status::InProgress), "status-inprogress");
        assert_eq!(status_class(Status::Resolved), "status-resolved");
        assert_eq!(priority_class(Priority::High), "priority-high");
        assert_eq!(priority_class(Priority::Medium), "priority-medium");
        assert_eq!(priority_class(Priority::Low), "priority-low");
    }

    #[test]
    fn test_unknown_stored_values_use_fallback_classes() {
        let mut legacy = complaint(3, Status::Pending, Priority::High);
        legacy.status = Stored::Other("Closed".to_string());
        legacy.priority = Stored::Other("Urgent".to_string());

        let html = student_dashboard(&BrandingConfig::default(), "41270001", &[], &[legacy]);
        assert!(html.contains(r#"<td class="status-resolved">Closed</td>"#));
        assert!(html.contains(r#"<td class="priority-low">Urgent</td>"#));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = student_dashboard(
            &BrandingConfig::default(),
            "41270001",
            &["<script>alert(1)</script>".to_string()],
            &[complaint(1, Status::Pending, Priority::High)],
        );
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tap &lt;b&gt;leaking"));
        assert!(!html.contains("<b>leaking"));
        assert!(html.contains("2024-03-01 09:30:00"));
    }

    #[test]
    fn test_empty_states() {
        let branding = BrandingConfig::default();
        assert!(student_dashboard(&branding, "41270001", &[], &[]).contains("No complaints filed yet."));

        let view = AdminDashboard {
            admin_username: "warden",
            complaints: &[],
            summary: StatusSummary::default(),
            filter: ComplaintFilter::default(),
        };
        let html = admin_dashboard(&branding, &[], &view);
        assert!(html.contains("No complaints available."));
        assert!(html.contains("Visible (Filtered): 0"));
        assert!(html.contains("Admin Portal (warden)"));
    }

    #[test]
    fn test_admin_dashboard_carries_filters_and_selection() {
        let complaints = vec![complaint(7, Status::InProgress, Priority::Low)];
        let view = AdminDashboard {
            admin_username: "warden",
            complaints: &complaints,
            summary: StatusSummary {
                pending: 2,
                in_progress: 1,
                resolved: 4,
            },
            filter: ComplaintFilter::from_raw(Some("In Progress"), None, Some("Low")),
        };
        let html = admin_dashboard(&BrandingConfig::default(), &[], &view);

        assert!(html.contains(r#"<span class="chip">Resolved: 4</span>"#));
        assert!(html.contains(r#"<input type="hidden" name="status_filter" value="In Progress">"#));
        assert!(html.contains(r#"<input type="hidden" name="category_filter" value="All">"#));
        assert!(html.contains(r#"<option value="In Progress" selected>In Progress</option>"#));
        assert!(html.contains(r#"<td class="priority-low">Low</td>"#));
    }

    #[test]
    fn test_error_page_shows_status() {
        let html = error_page(StatusCode::NOT_FOUND, "Page not found.");
        assert!(html.contains("404 Not Found"));
        assert!(html.contains("Page not found."));
    }
}
