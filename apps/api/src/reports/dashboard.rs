use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::employee::{Availability, Employee};
use crate::models::project::{Project, ProjectStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub projects_by_status: BTreeMap<String, usize>,
    pub active_projects: usize,
    /// Mean progress across all projects, one decimal.
    pub average_progress: f64,
    pub total_employees: usize,
    pub employees_by_availability: BTreeMap<String, usize>,
}

pub fn dashboard_stats(projects: &[Project], employees: &[Employee]) -> DashboardStats {
    let mut projects_by_status: BTreeMap<String, usize> = ProjectStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for p in projects {
        *projects_by_status.entry(p.status.as_str().to_string()).or_default() += 1;
    }

    let mut employees_by_availability: BTreeMap<String, usize> = Availability::ALL
        .iter()
        .map(|a| (a.as_str().to_string(), 0))
        .collect();
    for e in employees {
        *employees_by_availability
            .entry(e.availability.as_str().to_string())
            .or_default() += 1;
    }

    let average_progress = if projects.is_empty() {
        0.0
    } else {
        let sum: u32 = projects.iter().map(|p| u32::from(p.progress)).sum();
        (f64::from(sum) / projects.len() as f64 * 10.0).round() / 10.0
    };

    DashboardStats {
        total_projects: projects.len(),
        projects_by_status,
        active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
        average_progress,
        total_employees: employees.len(),
        employees_by_availability,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::project::Priority;
    use crate::recommendation::scoring::fixtures::employee;

    fn project(status: ProjectStatus, progress: u8) -> Project {
        Project {
            id: Uuid::new_v4(),
            manager_id: Uuid::new_v4(),
            title: "P".to_string(),
            description: String::new(),
            status,
            priority: Priority::Low,
            progress,
            deadline: None,
            budget: None,
            tags: vec![],
            assigned_employees: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_counts_and_average() {
        let projects = vec![
            project(ProjectStatus::Completed, 100),
            project(ProjectStatus::InProgress, 45),
            project(ProjectStatus::OnHold, 0),
        ];
        let employees = vec![
            employee("Ada", vec![], Availability::Available),
            employee("Ben", vec![], Availability::Available),
            employee("Cy", vec![], Availability::Unavailable),
        ];

        let stats = dashboard_stats(&projects, &employees);
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.projects_by_status["review"], 0);
        assert_eq!(stats.average_progress, 48.3);
        assert_eq!(stats.employees_by_availability["available"], 2);
        assert_eq!(stats.employees_by_availability["limited"], 0);
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = dashboard_stats(&[], &[]);
        assert_eq!(stats.average_progress, 0.0);
        assert_eq!(stats.projects_by_status.len(), ProjectStatus::ALL.len());
    }
}
