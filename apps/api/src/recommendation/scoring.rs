//! Fallback scorer: deterministic employee-to-project ranking used whenever
//! the AI path fails or returns nothing usable.
//!
//! Algorithm:
//! 1. Normalize required skills (trim, lowercase, drop blanks).
//! 2. A requirement is covered when any employee skill contains it, or it
//!    contains the employee skill (case-insensitive, either direction).
//! 3. skill_ratio = covered / max(required, 1)
//! 4. score = min(100, round(skill_ratio × 70 + availability bonus))
//!    with bonus 30 / 15 / 0 for available / limited / unavailable.
//! 5. Stable sort, highest score first.

use crate::models::employee::{Availability, Employee, EmployeeSummary, ProficiencyLevel, Skill};
use crate::recommendation::{Recommendation, RecommendationSource};

pub const SKILL_WEIGHT: f64 = 70.0;
pub const MAX_SCORE: u32 = 100;
/// Years on a single skill that earn the seniority flag.
pub const SENIOR_YEARS: u32 = 5;

pub fn availability_bonus(availability: Availability) -> f64 {
    match availability {
        Availability::Available => 30.0,
        Availability::Limited => 15.0,
        Availability::Unavailable => 0.0,
    }
}

/// Loose, bidirectional containment. Both sides must already be lowercase.
pub(crate) fn skills_match(employee_skill: &str, requirement: &str) -> bool {
    !employee_skill.is_empty()
        && (employee_skill.contains(requirement) || requirement.contains(employee_skill))
}

fn normalize_requirements(required_skills: &[String]) -> Vec<String> {
    required_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Scores one employee against already-normalized requirements.
fn score_employee(employee: &Employee, requirements: &[String]) -> Recommendation {
    let lowered: Vec<String> = employee
        .skills
        .iter()
        .map(|s| s.name.trim().to_lowercase())
        .collect();

    let covered = requirements
        .iter()
        .filter(|req| lowered.iter().any(|skill| skills_match(skill, req)))
        .count();

    // Employee skills, in profile order, that satisfied at least one requirement.
    let matched: Vec<&Skill> = employee
        .skills
        .iter()
        .zip(&lowered)
        .filter(|(_, skill)| requirements.iter().any(|req| skills_match(skill, req)))
        .map(|(s, _)| s)
        .collect();

    let skill_ratio = covered as f64 / requirements.len().max(1) as f64;
    let raw = skill_ratio * SKILL_WEIGHT + availability_bonus(employee.availability);
    let score = (raw.round() as u32).min(MAX_SCORE);

    let reasons = build_reasons(employee, requirements, covered, &matched);

    Recommendation {
        employee: EmployeeSummary::from(employee),
        score,
        matched_skills: matched.iter().map(|s| s.name.clone()).collect(),
        reasons,
        availability_status: employee.availability.label().to_string(),
        source: RecommendationSource::Fallback,
    }
}

fn build_reasons(
    employee: &Employee,
    requirements: &[String],
    covered: usize,
    matched: &[&Skill],
) -> Vec<String> {
    let mut reasons = Vec::new();

    if requirements.is_empty() {
        reasons.push("No required skills specified; ranked by availability".to_string());
    } else if covered == 0 {
        reasons.push(format!(
            "No matching skills for {} required skill(s)",
            requirements.len()
        ));
    } else {
        let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();
        reasons.push(format!(
            "Matches {covered} of {} required skills: {}",
            requirements.len(),
            names.join(", ")
        ));
    }

    reasons.push(match employee.availability {
        Availability::Available => "Currently available for new work".to_string(),
        Availability::Limited => "Limited availability".to_string(),
        Availability::Unavailable => "Currently unavailable".to_string(),
    });

    // Relevant skills are the matched ones; with no requirements every skill counts.
    let relevant: Vec<&Skill> = if requirements.is_empty() {
        employee.skills.iter().collect()
    } else {
        matched.to_vec()
    };
    let senior = relevant
        .iter()
        .filter(|s| s.years_of_experience >= SENIOR_YEARS || s.level == ProficiencyLevel::Expert)
        .max_by_key(|s| s.years_of_experience);
    if let Some(skill) = senior {
        reasons.push(format!(
            "Senior-level expertise in {} ({} years)",
            skill.name, skill.years_of_experience
        ));
    }

    reasons
}

/// Ranks every employee against the required skills. Never fails and always
/// returns exactly one recommendation per input employee.
pub fn fallback_recommendations(
    required_skills: &[String],
    employees: &[Employee],
) -> Vec<Recommendation> {
    let requirements = normalize_requirements(required_skills);
    let mut recommendations: Vec<Recommendation> = employees
        .iter()
        .map(|e| score_employee(e, &requirements))
        .collect();
    // sort_by is stable: ties keep input order.
    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    recommendations
}


#[cfg(test)]
mod tests {
    use super::fixtures::{employee, skill};
    use super::*;

    fn req(skills: &[&str]) -> Vec<String> {
        skills.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_worked_example_react_node() {
        let a = employee(
            "Alice",
            vec![skill("React (expert)", ProficiencyLevel::Expert, 3)],
            Availability::Available,
        );
        let b = employee(
            "Bob",
            vec![skill("Python", ProficiencyLevel::Advanced, 4)],
            Availability::Limited,
        );

        let recs = fallback_recommendations(&req(&["React", "Node"]), &[b.clone(), a.clone()]);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].employee.id, a.id);
        assert_eq!(recs[0].score, 65);
        assert_eq!(recs[0].matched_skills, vec!["React (expert)".to_string()]);
        assert_eq!(recs[1].employee.id, b.id);
        assert_eq!(recs[1].score, 15);
        assert!(recs[1].matched_skills.is_empty());
    }

    #[test]
    fn test_no_match_and_unavailable_scores_zero() {
        let e = employee(
            "Carol",
            vec![skill("COBOL", ProficiencyLevel::Expert, 20)],
            Availability::Unavailable,
        );
        let recs = fallback_recommendations(&req(&["Rust"]), &[e]);
        assert_eq!(recs[0].score, 0);
        assert!(!recs[0].reasons.is_empty(), "reasons are present even at zero");
    }

    #[test]
    fn test_empty_requirements_use_availability_only() {
        let employees = vec![
            employee("A", vec![], Availability::Available),
            employee("L", vec![], Availability::Limited),
            employee("U", vec![], Availability::Unavailable),
        ];
        let recs = fallback_recommendations(&[], &employees);
        let scores: Vec<u32> = recs.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![30, 15, 0]);
    }

    #[test]
    fn test_blank_requirements_are_ignored() {
        let e = employee(
            "Dana",
            vec![skill("Go", ProficiencyLevel::Advanced, 2)],
            Availability::Limited,
        );
        let recs = fallback_recommendations(&req(&["  ", ""]), &[e]);
        assert_eq!(recs[0].score, 15);
    }

    #[test]
    fn test_full_match_and_available_caps_at_100() {
        let e = employee(
            "Eve",
            vec![
                skill("Rust", ProficiencyLevel::Expert, 6),
                skill("PostgreSQL", ProficiencyLevel::Advanced, 4),
            ],
            Availability::Available,
        );
        let recs = fallback_recommendations(&req(&["rust", "postgresql"]), &[e]);
        assert_eq!(recs[0].score, 100);
    }

    #[test]
    fn test_scores_always_within_bounds() {
        let employees = vec![
            employee(
                "Many",
                vec![
                    skill("Rust", ProficiencyLevel::Expert, 9),
                    skill("Rust async", ProficiencyLevel::Advanced, 3),
                    skill("Tokio", ProficiencyLevel::Advanced, 3),
                ],
                Availability::Available,
            ),
            employee("None", vec![], Availability::Unavailable),
        ];
        for requirements in [req(&[]), req(&["rust"]), req(&["rust", "tokio", "axum", "sql"])] {
            for rec in fallback_recommendations(&requirements, &employees) {
                assert!(rec.score <= MAX_SCORE, "score {} out of range", rec.score);
            }
        }
    }

    #[test]
    fn test_matching_is_case_insensitive_and_bidirectional() {
        // Employee skill contains requirement.
        let a = employee(
            "A",
            vec![skill("ReactJS", ProficiencyLevel::Advanced, 2)],
            Availability::Unavailable,
        );
        // Requirement contains employee skill.
        let b = employee(
            "B",
            vec![skill("react", ProficiencyLevel::Advanced, 2)],
            Availability::Unavailable,
        );
        let recs = fallback_recommendations(&req(&["REACT"]), &[a]);
        assert_eq!(recs[0].score, 70);
        let recs = fallback_recommendations(&req(&["React.js"]), &[b]);
        assert_eq!(recs[0].score, 70);
    }

    #[test]
    fn test_java_matches_javascript_loosely() {
        let e = employee(
            "Js",
            vec![skill("JavaScript", ProficiencyLevel::Advanced, 3)],
            Availability::Unavailable,
        );
        let recs = fallback_recommendations(&req(&["Java"]), &[e]);
        assert_eq!(recs[0].score, 70);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let employees: Vec<Employee> = ["first", "second", "third"]
            .iter()
            .map(|n| employee(n, vec![], Availability::Limited))
            .collect();
        let recs = fallback_recommendations(&req(&["Kafka"]), &employees);
        let ids: Vec<_> = recs.iter().map(|r| r.employee.id).collect();
        let expected: Vec<_> = employees.iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_partial_ratio_rounds() {
        let e = employee(
            "Third",
            vec![skill("Rust", ProficiencyLevel::Advanced, 2)],
            Availability::Unavailable,
        );
        // 1/3 × 70 = 23.33 → 23
        let recs = fallback_recommendations(&req(&["Rust", "Go", "Zig"]), &[e]);
        assert_eq!(recs[0].score, 23);
    }

    #[test]
    fn test_seniority_flag_from_years_on_matched_skill() {
        let e = employee(
            "Vet",
            vec![
                skill("Kubernetes", ProficiencyLevel::Advanced, 7),
                skill("Excel", ProficiencyLevel::Expert, 15),
            ],
            Availability::Available,
        );
        let recs = fallback_recommendations(&req(&["kubernetes"]), &[e]);
        let senior: Vec<_> = recs[0]
            .reasons
            .iter()
            .filter(|r| r.starts_with("Senior-level"))
            .collect();
        assert_eq!(senior.len(), 1);
        assert!(senior[0].contains("Kubernetes"), "got {}", senior[0]);
    }

    #[test]
    fn test_one_result_per_employee_and_fallback_source() {
        let employees: Vec<Employee> = (0..7)
            .map(|i| employee(&format!("E{i}"), vec![], Availability::Available))
            .collect();
        let recs = fallback_recommendations(&req(&["anything"]), &employees);
        assert_eq!(recs.len(), employees.len());
        assert!(recs
            .iter()
            .all(|r| r.source == RecommendationSource::Fallback));
        assert!(recs.iter().all(|r| r.availability_status == "Available"));
    }
}
