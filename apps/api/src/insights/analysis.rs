//! Deterministic workforce analysis.
//!
//! `WorkforceMetrics` is computed from plain data so it can be tested without
//! a database, fed to the model as context, and turned into fallback insights
//! when the model is unavailable.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::insights::{Insight, InsightPayload, Severity};
use crate::models::employee::{Availability, Employee};
use crate::models::project::{Project, ProjectStatus};
use crate::recommendation::scoring::skills_match;

/// Active assignments at or above this count flag an employee as overloaded.
pub const OVER_ALLOCATION_THRESHOLD: i64 = 3;
const TOP_UNCOVERED_SKILLS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub title: String,
    pub deadline: Option<NaiveDate>,
}

impl From<&Project> for ProjectRef {
    fn from(p: &Project) -> Self {
        ProjectRef {
            id: p.id,
            title: p.title.clone(),
            deadline: p.deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeLoad {
    pub id: Uuid,
    pub name: String,
    pub active_projects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill: String,
    /// Active projects asking for it.
    pub projects: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkforceMetrics {
    pub total_projects: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    /// Percentage of projects completed, one decimal.
    pub completion_rate: f64,
    pub overdue: Vec<ProjectRef>,
    pub stalled: Vec<ProjectRef>,
    pub unstaffed: Vec<ProjectRef>,
    pub over_allocated: Vec<EmployeeLoad>,
    pub idle_available: Vec<EmployeeLoad>,
    pub uncovered_skills: Vec<SkillDemand>,
}

pub fn compute_metrics(
    projects: &[Project],
    employees: &[Employee],
    active_counts: &HashMap<Uuid, i64>,
    today: NaiveDate,
) -> WorkforceMetrics {
    let mut status_breakdown: BTreeMap<String, usize> = ProjectStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for p in projects {
        *status_breakdown.entry(p.status.as_str().to_string()).or_default() += 1;
    }

    let completed = status_breakdown
        .get(ProjectStatus::Completed.as_str())
        .copied()
        .unwrap_or(0);
    let completion_rate = if projects.is_empty() {
        0.0
    } else {
        (completed as f64 / projects.len() as f64 * 1000.0).round() / 10.0
    };

    let overdue = projects
        .iter()
        .filter(|p| p.is_overdue(today))
        .map(ProjectRef::from)
        .collect();
    let stalled = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::OnHold)
        .map(ProjectRef::from)
        .collect();
    let unstaffed = projects
        .iter()
        .filter(|p| p.status.is_active() && p.assigned_employees.is_empty())
        .map(ProjectRef::from)
        .collect();

    let load = |e: &Employee| EmployeeLoad {
        id: e.id,
        name: e.name.clone(),
        active_projects: active_counts.get(&e.id).copied().unwrap_or(0),
    };
    let mut over_allocated: Vec<EmployeeLoad> = employees
        .iter()
        .map(load)
        .filter(|l| l.active_projects >= OVER_ALLOCATION_THRESHOLD)
        .collect();
    over_allocated.sort_by(|a, b| b.active_projects.cmp(&a.active_projects));

    let idle_available = employees
        .iter()
        .filter(|e| e.availability == Availability::Available)
        .map(load)
        .filter(|l| l.active_projects == 0)
        .collect();

    WorkforceMetrics {
        total_projects: projects.len(),
        status_breakdown,
        completion_rate,
        overdue,
        stalled,
        unstaffed,
        over_allocated,
        idle_available,
        uncovered_skills: uncovered_skills(projects, employees),
    }
}

/// Tags requested by active projects that no available employee covers,
/// most requested first.
fn uncovered_skills(projects: &[Project], employees: &[Employee]) -> Vec<SkillDemand> {
    let mut demand: Vec<(String, String, usize)> = Vec::new();
    for p in projects.iter().filter(|p| p.status.is_active()) {
        for tag in &p.tags {
            let key = tag.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            match demand.iter_mut().find(|(k, _, _)| *k == key) {
                Some((_, _, count)) => *count += 1,
                None => demand.push((key, tag.trim().to_string(), 1)),
            }
        }
    }

    let available_skills: Vec<String> = employees
        .iter()
        .filter(|e| e.availability == Availability::Available)
        .flat_map(|e| e.skills.iter().map(|s| s.name.trim().to_lowercase()))
        .collect();

    let mut uncovered: Vec<SkillDemand> = demand
        .into_iter()
        .filter(|(key, _, _)| !available_skills.iter().any(|s| skills_match(s, key)))
        .map(|(_, skill, projects)| SkillDemand { skill, projects })
        .collect();
    uncovered.sort_by(|a, b| b.projects.cmp(&a.projects));
    uncovered.truncate(TOP_UNCOVERED_SKILLS);
    uncovered
}

fn names<T>(items: &[T], label: impl Fn(&T) -> &str) -> String {
    const SHOWN: usize = 3;
    let shown: Vec<&str> = items.iter().take(SHOWN).map(|item| label(item)).collect();
    let rest = items.len().saturating_sub(SHOWN);
    if rest > 0 {
        format!("{} and {rest} more", shown.join(", "))
    } else {
        shown.join(", ")
    }
}

/// Rule-based insights used whenever the model cannot answer.
pub fn fallback_insights(metrics: &WorkforceMetrics) -> InsightPayload {
    let mut insights = Vec::new();

    if !metrics.overdue.is_empty() {
        insights.push(Insight {
            severity: Severity::Critical,
            title: format!("{} overdue project(s)", metrics.overdue.len()),
            detail: format!(
                "Past deadline and not completed: {}.",
                names(&metrics.overdue, |p| p.title.as_str())
            ),
        });
    }
    if !metrics.unstaffed.is_empty() {
        insights.push(Insight {
            severity: Severity::Warning,
            title: format!("{} active project(s) without staff", metrics.unstaffed.len()),
            detail: format!(
                "No one is assigned to {}.",
                names(&metrics.unstaffed, |p| p.title.as_str())
            ),
        });
    }
    if !metrics.over_allocated.is_empty() {
        insights.push(Insight {
            severity: Severity::Warning,
            title: format!("{} over-allocated employee(s)", metrics.over_allocated.len()),
            detail: format!(
                "{} carry {OVER_ALLOCATION_THRESHOLD} or more active projects.",
                names(&metrics.over_allocated, |e| e.name.as_str())
            ),
        });
    }
    if !metrics.stalled.is_empty() {
        insights.push(Insight {
            severity: Severity::Warning,
            title: format!("{} project(s) on hold", metrics.stalled.len()),
            detail: format!(
                "Review whether {} can resume or should be closed.",
                names(&metrics.stalled, |p| p.title.as_str())
            ),
        });
    }
    if !metrics.uncovered_skills.is_empty() {
        insights.push(Insight {
            severity: Severity::Info,
            title: "Skill gaps in active work".to_string(),
            detail: format!(
                "No available employee lists {}.",
                names(&metrics.uncovered_skills, |s| s.skill.as_str())
            ),
        });
    }
    if !metrics.idle_available.is_empty() {
        insights.push(Insight {
            severity: Severity::Info,
            title: format!(
                "{} available employee(s) without projects",
                metrics.idle_available.len()
            ),
            detail: format!(
                "{} could take on new work.",
                names(&metrics.idle_available, |e| e.name.as_str())
            ),
        });
    }

    let summary = if metrics.total_projects == 0 {
        "No projects yet. Create a project to start tracking delivery.".to_string()
    } else {
        format!(
            "{} project(s), {:.1}% completed, {} overdue, {} unstaffed.",
            metrics.total_projects,
            metrics.completion_rate,
            metrics.overdue.len(),
            metrics.unstaffed.len()
        )
    };

    InsightPayload { summary, insights }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::employee::ProficiencyLevel;
    use crate::models::project::{AssignedEmployee, Priority};
    use crate::recommendation::scoring::fixtures::{employee, skill};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn project(title: &str, status: ProjectStatus, tags: &[&str]) -> Project {
        Project {
            id: Uuid::new_v4(),
            manager_id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            progress: 0,
            deadline: None,
            budget: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            assigned_employees: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn staffed(mut p: Project, e: &Employee) -> Project {
        p.assigned_employees.push(AssignedEmployee {
            id: e.id,
            name: e.name.clone(),
        });
        p
    }

    #[test]
    fn test_status_breakdown_and_completion_rate() {
        let projects = vec![
            project("A", ProjectStatus::Completed, &[]),
            project("B", ProjectStatus::InProgress, &[]),
            project("C", ProjectStatus::Planning, &[]),
        ];
        let m = compute_metrics(&projects, &[], &HashMap::new(), today());
        assert_eq!(m.total_projects, 3);
        assert_eq!(m.status_breakdown["completed"], 1);
        assert_eq!(m.status_breakdown["on-hold"], 0);
        assert_eq!(m.completion_rate, 33.3);
    }

    #[test]
    fn test_empty_portfolio() {
        let m = compute_metrics(&[], &[], &HashMap::new(), today());
        assert_eq!(m.completion_rate, 0.0);
        let payload = fallback_insights(&m);
        assert!(payload.insights.is_empty());
        assert!(payload.summary.starts_with("No projects yet"));
    }

    #[test]
    fn test_overdue_stalled_and_unstaffed() {
        let ada = employee("Ada", vec![], Availability::Available);
        let mut late = staffed(project("Late", ProjectStatus::InProgress, &[]), &ada);
        late.deadline = NaiveDate::from_ymd_opt(2025, 5, 1);
        let mut done_late = project("Done", ProjectStatus::Completed, &[]);
        done_late.deadline = NaiveDate::from_ymd_opt(2025, 5, 1);
        let held = project("Held", ProjectStatus::OnHold, &[]);
        let empty = project("Empty", ProjectStatus::Planning, &[]);

        let m = compute_metrics(&[late, done_late, held, empty], &[ada], &HashMap::new(), today());
        let titles = |refs: &[ProjectRef]| refs.iter().map(|p| p.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&m.overdue), vec!["Late"]);
        assert_eq!(titles(&m.stalled), vec!["Held"]);
        // on-hold is not active, so only the planning project counts
        assert_eq!(titles(&m.unstaffed), vec!["Empty"]);
    }

    #[test]
    fn test_over_allocated_and_idle_employees() {
        let busy = employee("Busy", vec![], Availability::Limited);
        let idle = employee("Idle", vec![], Availability::Available);
        let off = employee("Off", vec![], Availability::Unavailable);
        let counts = HashMap::from([(busy.id, 3)]);

        let m = compute_metrics(&[], &[busy.clone(), idle, off], &counts, today());
        assert_eq!(m.over_allocated.len(), 1);
        assert_eq!(m.over_allocated[0].id, busy.id);
        assert_eq!(m.idle_available.len(), 1);
        assert_eq!(m.idle_available[0].name, "Idle");
    }

    #[test]
    fn test_uncovered_skills_ignore_unavailable_holders() {
        let rustacean = employee(
            "Ferris",
            vec![skill("Rust", ProficiencyLevel::Expert, 6)],
            Availability::Unavailable,
        );
        let reactor = employee(
            "Ada",
            vec![skill("React", ProficiencyLevel::Advanced, 3)],
            Availability::Available,
        );
        let projects = vec![
            project("P1", ProjectStatus::InProgress, &["Rust", "react.js"]),
            project("P2", ProjectStatus::Planning, &["rust", "Kafka"]),
            project("P3", ProjectStatus::Completed, &["Kafka"]),
        ];

        let m = compute_metrics(&projects, &[rustacean, reactor], &HashMap::new(), today());
        assert_eq!(
            m.uncovered_skills,
            vec![
                SkillDemand {
                    skill: "Rust".to_string(),
                    projects: 2,
                },
                SkillDemand {
                    skill: "Kafka".to_string(),
                    projects: 1,
                },
            ]
        );
    }

    #[test]
    fn test_fallback_orders_critical_first() {
        let ada = employee("Ada", vec![], Availability::Available);
        let mut late = project("Late", ProjectStatus::Review, &[]);
        late.deadline = NaiveDate::from_ymd_opt(2025, 1, 1);
        let m = compute_metrics(&[late], &[ada], &HashMap::new(), today());

        let payload = fallback_insights(&m);
        assert_eq!(payload.insights[0].severity, Severity::Critical);
        assert!(payload.insights[0].detail.contains("Late"));
        assert!(payload.summary.contains("1 overdue"));
    }

    #[test]
    fn test_names_truncates_long_lists() {
        let refs: Vec<SkillDemand> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| SkillDemand {
                skill: s.to_string(),
                projects: 1,
            })
            .collect();
        assert_eq!(names(&refs, |s| s.skill.as_str()), "a, b, c and 2 more");
    }
}
