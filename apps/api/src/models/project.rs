use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Review,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::Review,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Review => "review",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
        }
    }

    /// Work that still occupies the assigned employees.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ProjectStatus::Planning | ProjectStatus::InProgress | ProjectStatus::Review
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown project status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown priority '{s}'"))
    }
}

/// Raw `projects` row. Assignments live in `project_assignments`.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub manager_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub progress: i16,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment row joined with the employee name.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub project_id: Uuid,
    pub employee_id: Uuid,
    pub name: String,
}

/// An assigned employee as one (id, name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedEmployee {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub manager_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: u8,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub tags: Vec<String>,
    pub assigned_employees: Vec<AssignedEmployee>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn from_row(
        row: ProjectRow,
        assigned_employees: Vec<AssignedEmployee>,
    ) -> anyhow::Result<Self> {
        Ok(Project {
            id: row.id,
            manager_id: row.manager_id,
            title: row.title,
            description: row.description,
            status: row.status.parse()?,
            priority: row.priority.parse()?,
            progress: row.progress.clamp(0, 100) as u8,
            deadline: row.deadline,
            budget: row.budget,
            tags: row.tags,
            assigned_employees,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub fn is_assigned(&self, employee_id: Uuid) -> bool {
        self.assigned_employees.iter().any(|a| a.id == employee_id)
    }

    /// Deadline has passed and the project is not finished.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != ProjectStatus::Completed && self.deadline.is_some_and(|d| d < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
        let parsed: ProjectStatus = serde_json::from_str(r#""on-hold""#).unwrap();
        assert_eq!(parsed, ProjectStatus::OnHold);
    }

    #[test]
    fn test_status_str_matches_serde_name() {
        for status in ProjectStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json.as_str().unwrap(), status.as_str());
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_priority_parse_rejects_unknown() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_overdue_ignores_completed_projects() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut project = Project {
            id: Uuid::new_v4(),
            manager_id: Uuid::new_v4(),
            title: "Billing rewrite".to_string(),
            description: String::new(),
            status: ProjectStatus::InProgress,
            priority: Priority::High,
            progress: 40,
            deadline: NaiveDate::from_ymd_opt(2025, 5, 1),
            budget: None,
            tags: vec![],
            assigned_employees: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(project.is_overdue(today));
        project.status = ProjectStatus::Completed;
        assert!(!project.is_overdue(today));
    }
}
