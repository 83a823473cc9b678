/// Complaint lifecycle
///
/// Students create complaints (subject to the active-complaint quota);
/// admins overwrite status, priority, staff and remarks. Complaints are
/// never deleted.
use super::{
    filter::{dashboard_order_by, ComplaintFilter, StatusSummary},
    Category, Complaint, ComplaintUpdate, NewComplaint, Priority, Status, Stored,
    MAX_ACTIVE_COMPLAINTS,
};
use crate::{
    db::{format_timestamp, parse_timestamp},
    error::{AppError, AppResult},
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

const COMPLAINT_COLUMNS: &str = "id, hostel_block, room_number, category, priority, description, \
     status, staff_assigned, remarks, created_at, updated_at";

/// Complaint manager
#[derive(Clone)]
pub struct ComplaintManager {
    db: SqlitePool,
}

impl ComplaintManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Number of Pending / In Progress complaints filed by a student
    pub async fn active_count(&self, roll_number: &str) -> AppResult<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM complaints
            WHERE roll_number = ? AND status IN (?, ?)
            "#,
        )
        .bind(roll_number)
        .bind(Status::ACTIVE[0].as_str())
        .bind(Status::ACTIVE[1].as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(row.get("total"))
    }

    /// File a validated complaint for a student.
    ///
    /// Rejected with `QuotaExceeded` (and nothing written) when the student
    /// already holds `MAX_ACTIVE_COMPLAINTS` active complaints.
    pub async fn create(&self, roll_number: &str, complaint: &NewComplaint) -> AppResult<Complaint> {
        let active = self.active_count(roll_number).await?;
        if active >= MAX_ACTIVE_COMPLAINTS {
            info!(active, "complaint rejected: active quota reached");
            debug!(roll_number, "quota rejection owner");
            return Err(AppError::QuotaExceeded {
                limit: MAX_ACTIVE_COMPLAINTS,
            });
        }

        let now = Utc::now();
        let timestamp = format_timestamp(&now);

        let result = sqlx::query(
            r#"
            INSERT INTO complaints (
                roll_number, hostel_block, room_number, category, priority,
                description, status, staff_assigned, remarks, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, '', '', ?, ?)
            "#,
        )
        .bind(roll_number)
        .bind(&complaint.hostel_block)
        .bind(&complaint.room_number)
        .bind(complaint.category.as_str())
        .bind(complaint.priority.as_str())
        .bind(&complaint.description)
        .bind(Status::Pending.as_str())
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&self.db)
        .await?;

        let created = Complaint {
            id: result.last_insert_rowid(),
            hostel_block: complaint.hostel_block.clone(),
            room_number: complaint.room_number.clone(),
            category: complaint.category.into(),
            priority: complaint.priority.into(),
            description: complaint.description.clone(),
            status: Status::Pending.into(),
            staff_assigned: Some(String::new()),
            remarks: Some(String::new()),
            created_at: now,
            updated_at: now,
        };

        info!(
            complaint_id = created.id,
            category = created.category.as_str(),
            priority = created.priority.as_str(),
            "complaint created"
        );
        debug!(complaint_id = created.id, roll_number, "complaint owner");

        Ok(created)
    }

    /// Overwrite the admin-managed fields of a complaint (last write wins).
    ///
    /// Any status may follow any other. Returns whether a complaint matched;
    /// an unknown id changes nothing and is not an error.
    pub async fn update(&self, update: &ComplaintUpdate) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE complaints
            SET status = ?, priority = ?, staff_assigned = ?, remarks = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.priority.as_str())
        .bind(&update.staff_assigned)
        .bind(&update.remarks)
        .bind(format_timestamp(&Utc::now()))
        .bind(update.complaint_id)
        .execute(&self.db)
        .await?;

        let matched = result.rows_affected() > 0;
        if matched {
            info!(
                complaint_id = update.complaint_id,
                status = update.status.as_str(),
                priority = update.priority.as_str(),
                "complaint updated"
            );
        } else {
            warn!(complaint_id = update.complaint_id, "update matched no complaint");
        }

        Ok(matched)
    }

    /// Get complaint by ID
    pub async fn get(&self, id: i64) -> AppResult<Option<Complaint>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM complaints WHERE id = ?",
            COMPLAINT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(parse_complaint).transpose()
    }

    /// A student's own complaints, newest first
    pub async fn list_for_student(&self, roll_number: &str) -> AppResult<Vec<Complaint>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM complaints WHERE roll_number = ? ORDER BY id DESC",
            COMPLAINT_COLUMNS
        ))
        .bind(roll_number)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(parse_complaint).collect()
    }

    /// Admin dashboard listing: filtered, then ordered by status rank,
    /// priority rank and newest first
    pub async fn list_for_admin(&self, filter: &ComplaintFilter) -> AppResult<Vec<Complaint>> {
        let (where_clause, params) = filter.where_clause();
        let sql = format!(
            "SELECT {} FROM complaints {} {}",
            COMPLAINT_COLUMNS,
            where_clause,
            dashboard_order_by()
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.db).await?;

        rows.iter().map(parse_complaint).collect()
    }

    /// Per-status totals over every complaint, ignoring any filter
    pub async fn status_summary(&self) -> AppResult<StatusSummary> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM complaints GROUP BY status")
            .fetch_all(&self.db)
            .await?;

        let mut summary = StatusSummary::default();
        for row in rows {
            let status: String = row.get("status");
            match Status::parse(&status) {
                Some(status) => summary.record(status, row.get("total")),
                None => warn!(status = %status, "complaints with unknown status left out of summary"),
            }
        }

        Ok(summary)
    }
}

fn parse_complaint(row: &sqlx::sqlite::SqliteRow) -> AppResult<Complaint> {
    let id: i64 = row.get("id");
    let category: Stored<Category> = Stored::from_raw(row.get("category"));
    let priority: Stored<Priority> = Stored::from_raw(row.get("priority"));
    let status: Stored<Status> = Stored::from_raw(row.get("status"));
    if category.known().is_none() || priority.known().is_none() || status.known().is_none() {
        debug!(
            complaint_id = id,
            category = category.as_str(),
            priority = priority.as_str(),
            status = status.as_str(),
            "complaint holds a value outside the known sets"
        );
    }

    let created_at_str: String = row.get("created_at");
    let created_at = parse_timestamp(&created_at_str)?;

    // Rows older than the updated_at column are backfilled at migration time
    let updated_at = match row.get::<Option<String>, _>("updated_at") {
        Some(raw) => parse_timestamp(&raw)?,
        None => created_at,
    };

    Ok(Complaint {
        id,
        hostel_block: row.get("hostel_block"),
        room_number: row.get("room_number"),
        category,
        priority,
        description: row.get("description"),
        status,
        staff_assigned: row.get("staff_assigned"),
        remarks: row.get("remarks"),
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    const ROLL: &str = "41270001";

    fn water_complaint() -> NewComplaint {
        NewComplaint {
            hostel_block: "Block A".to_string(),
            room_number: "A-101".to_string(),
            category: Category::Water,
            priority: Priority::Medium,
            description: "No water in the bathroom since morning".to_string(),
        }
    }

    fn set_status(id: i64, status: Status, priority: Priority) -> ComplaintUpdate {
        ComplaintUpdate {
            complaint_id: id,
            status,
            priority,
            staff_assigned: String::new(),
            remarks: String::new(),
        }
    }

    async fn total_complaints(manager: &ComplaintManager) -> i64 {
        sqlx::query("SELECT COUNT(*) AS total FROM complaints")
            .fetch_one(&manager.db)
            .await
            .unwrap()
            .get("total")
    }

    #[tokio::test]
    async fn test_create_round_trips() {
        let manager = ComplaintManager::new(test_pool().await);

        let created = manager.create(ROLL, &water_complaint()).await.unwrap();
        assert_eq!(created.status, Stored::Known(Status::Pending));
        assert_eq!(created.created_at, created.updated_at);

        let listed = manager.list_for_student(ROLL).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let fetched = manager.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.hostel_block, "Block A");
        assert_eq!(fetched.room_number, "A-101");
        assert_eq!(fetched.category, Stored::Known(Category::Water));
        assert_eq!(fetched.priority, Stored::Known(Priority::Medium));
        assert_eq!(fetched.staff_assigned.as_deref(), Some(""));
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_quota_blocks_sixth_active_complaint() {
        let manager = ComplaintManager::new(test_pool().await);

        for _ in 0..MAX_ACTIVE_COMPLAINTS {
            manager.create(ROLL, &water_complaint()).await.unwrap();
        }
        let err = manager.create(ROLL, &water_complaint()).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { limit: 5 }));
        assert_eq!(total_complaints(&manager).await, 5);

        // Other students are unaffected
        manager.create("41270002", &water_complaint()).await.unwrap();
    }

    #[tokio::test]
    async fn test_resolving_frees_exactly_one_slot() {
        let manager = ComplaintManager::new(test_pool().await);

        let mut ids = Vec::new();
        for _ in 0..MAX_ACTIVE_COMPLAINTS {
            ids.push(manager.create(ROLL, &water_complaint()).await.unwrap().id);
        }
        assert_eq!(manager.active_count(ROLL).await.unwrap(), 5);

        // In Progress still counts
        manager
            .update(&set_status(ids[0], Status::InProgress, Priority::High))
            .await
            .unwrap();
        assert_eq!(manager.active_count(ROLL).await.unwrap(), 5);

        manager
            .update(&set_status(ids[1], Status::Resolved, Priority::High))
            .await
            .unwrap();
        assert_eq!(manager.active_count(ROLL).await.unwrap(), 4);

        manager.create(ROLL, &water_complaint()).await.unwrap();
        assert!(manager.create(ROLL, &water_complaint()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_overwrites_and_allows_reopening() {
        let manager = ComplaintManager::new(test_pool().await);
        let created = manager.create(ROLL, &water_complaint()).await.unwrap();

        let resolve = ComplaintUpdate {
            complaint_id: created.id,
            status: Status::Resolved,
            priority: Priority::High,
            staff_assigned: "Ravi".to_string(),
            remarks: "Valve replaced".to_string(),
        };
        assert!(manager.update(&resolve).await.unwrap());

        let reopen = ComplaintUpdate {
            status: Status::Pending,
            ..resolve.clone()
        };
        assert!(manager.update(&reopen).await.unwrap());

        let stored = manager.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Stored::Known(Status::Pending));
        assert_eq!(stored.priority, Stored::Known(Priority::High));
        assert_eq!(stored.staff_assigned.as_deref(), Some("Ravi"));
        assert_eq!(stored.remarks.as_deref(), Some("Valve replaced"));
        assert_eq!(stored.description, created.description);
        assert_eq!(stored.created_at, created.created_at);
        assert!(stored.updated_at >= stored.created_at);

        // Owner is untouched
        assert_eq!(manager.list_for_student(ROLL).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_changes_nothing() {
        let manager = ComplaintManager::new(test_pool().await);
        let created = manager.create(ROLL, &water_complaint()).await.unwrap();

        let matched = manager
            .update(&set_status(created.id + 100, Status::Resolved, Priority::Low))
            .await
            .unwrap();
        assert!(!matched);

        let stored = manager.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
        assert_eq!(total_complaints(&manager).await, 1);
    }

    #[tokio::test]
    async fn test_admin_listing_order() {
        let manager = ComplaintManager::new(test_pool().await);

        let mut ids = Vec::new();
        for i in 0..10 {
            let roll = format!("4127{:04}", i);
            ids.push(manager.create(&roll, &water_complaint()).await.unwrap().id);
        }
        // ids are 1..=10; shape the three complaints the ordering is about
        let (id3, id7, id10) = (ids[2], ids[6], ids[9]);
        manager.update(&set_status(id10, Status::Resolved, Priority::High)).await.unwrap();
        manager.update(&set_status(id3, Status::Pending, Priority::Low)).await.unwrap();
        manager.update(&set_status(id7, Status::Pending, Priority::High)).await.unwrap();
        for id in ids.iter().copied().filter(|id| ![id3, id7, id10].contains(id)) {
            manager.update(&set_status(id, Status::Resolved, Priority::Low)).await.unwrap();
        }

        let listed: Vec<i64> = manager
            .list_for_admin(&ComplaintFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();

        let pos = |id: i64| listed.iter().position(|x| *x == id).unwrap();
        assert!(pos(id7) < pos(id3));
        assert!(pos(id3) < pos(id10));
        assert_eq!(&listed[..3], &[id7, id3, id10]);
    }

    #[tokio::test]
    async fn test_unknown_stored_values_load_and_sort_last() {
        let manager = ComplaintManager::new(test_pool().await);

        let closed = manager.create(ROLL, &water_complaint()).await.unwrap();
        let resolved = manager.create(ROLL, &water_complaint()).await.unwrap();
        let pending = manager.create(ROLL, &water_complaint()).await.unwrap();
        manager
            .update(&set_status(resolved.id, Status::Resolved, Priority::Low))
            .await
            .unwrap();
        sqlx::query("UPDATE complaints SET status = 'Closed', priority = 'Urgent' WHERE id = ?")
            .bind(closed.id)
            .execute(&manager.db)
            .await
            .unwrap();

        let listed = manager.list_for_admin(&ComplaintFilter::default()).await.unwrap();
        assert_eq!(
            listed.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![pending.id, resolved.id, closed.id]
        );
        let last = &listed[2];
        assert_eq!(last.status, Stored::Other("Closed".to_string()));
        assert_eq!(last.priority, Stored::Other("Urgent".to_string()));

        let history = manager.list_for_student(ROLL).await.unwrap();
        assert_eq!(history.len(), 3);

        // Unknown statuses are neither active nor summarized
        assert_eq!(manager.active_count(ROLL).await.unwrap(), 1);
        assert_eq!(
            manager.status_summary().await.unwrap(),
            StatusSummary {
                pending: 1,
                in_progress: 0,
                resolved: 1
            }
        );
    }

    #[tokio::test]
    async fn test_admin_filters_are_conjunctive() {
        let manager = ComplaintManager::new(test_pool().await);

        let water = manager.create(ROLL, &water_complaint()).await.unwrap();
        let food = manager
            .create(
                ROLL,
                &NewComplaint {
                    category: Category::Food,
                    ..water_complaint()
                },
            )
            .await
            .unwrap();
        let resolved_water = manager.create(ROLL, &water_complaint()).await.unwrap();
        manager
            .update(&set_status(resolved_water.id, Status::Resolved, Priority::Medium))
            .await
            .unwrap();

        let filter = ComplaintFilter::from_raw(Some("Pending"), Some("Water"), None);
        let listed = manager.list_for_admin(&filter).await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![water.id]);

        let invalid = ComplaintFilter::from_raw(Some("Pending"), Some("Laundry"), None);
        let only_status = ComplaintFilter::from_raw(Some("Pending"), None, None);
        let listed_invalid = manager.list_for_admin(&invalid).await.unwrap();
        assert_eq!(listed_invalid, manager.list_for_admin(&only_status).await.unwrap());
        assert_eq!(
            listed_invalid.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![food.id, water.id]
        );
    }

    #[tokio::test]
    async fn test_status_summary_ignores_filters() {
        let manager = ComplaintManager::new(test_pool().await);
        assert_eq!(manager.status_summary().await.unwrap(), StatusSummary::default());

        let a = manager.create(ROLL, &water_complaint()).await.unwrap();
        let b = manager.create(ROLL, &water_complaint()).await.unwrap();
        manager.create(ROLL, &water_complaint()).await.unwrap();
        manager.update(&set_status(a.id, Status::InProgress, Priority::Low)).await.unwrap();
        manager.update(&set_status(b.id, Status::Resolved, Priority::Low)).await.unwrap();

        let summary = manager.status_summary().await.unwrap();
        assert_eq!(
            summary,
            StatusSummary {
                pending: 1,
                in_progress: 1,
                resolved: 1
            }
        );
    }
}
