// Prompt constants and builders for employee recommendations.

use crate::llm_client::prompts::{fill_template, ID_FIDELITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::models::employee::Employee;

pub fn recommendation_system() -> String {
    format!(
        "You are an experienced engineering resource manager. You match employees to \
         projects based on their skills, experience and availability. {JSON_ONLY_SYSTEM}"
    )
}

/// Replace `{title}`, `{description}`, `{required_skills}` and `{candidates}`.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Recommend the best employees for this project.

PROJECT
Title: {title}
Description: {description}
Required skills: {required_skills}

CANDIDATES (one per line: id | name | position | department | availability | skills)
{candidates}

Return a JSON object with this EXACT schema:
{
  "recommendations": [
    {
      "employeeId": "<candidate id>",
      "score": 85,
      "matchedSkills": ["React"],
      "reasons": ["Five years of React on customer-facing apps"]
    }
  ]
}

Rules:
- score is an integer from 0 to 100.
- Weigh skill fit first, then availability: "unavailable" candidates should score low.
- Order recommendations from best to worst and include at most 10.
"#;

fn format_candidate(employee: &Employee) -> String {
    let skills: Vec<String> = employee
        .skills
        .iter()
        .map(|s| format!("{} ({:?}, {}y)", s.name, s.level, s.years_of_experience))
        .collect();
    format!(
        "{} | {} | {} | {} | {} | {}",
        employee.id,
        employee.name,
        employee.position.as_deref().unwrap_or("-"),
        employee.department.as_deref().unwrap_or("-"),
        employee.availability,
        if skills.is_empty() {
            "none listed".to_string()
        } else {
            skills.join(", ")
        }
    )
}

pub fn build_recommendation_prompt(
    title: &str,
    description: &str,
    required_skills: &[String],
    candidates: &[Employee],
) -> String {
    let required = if required_skills.is_empty() {
        "none specified".to_string()
    } else {
        required_skills.join(", ")
    };
    let lines: Vec<String> = candidates.iter().map(format_candidate).collect();
    let candidates = lines.join("\n");

    let prompt = fill_template(
        RECOMMENDATION_PROMPT_TEMPLATE,
        &[
            ("title", title),
            ("description", description),
            ("required_skills", required.as_str()),
            ("candidates", candidates.as_str()),
        ],
    );
    format!("{prompt}\n{ID_FIDELITY_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::{Availability, ProficiencyLevel};
    use crate::recommendation::scoring::fixtures::{employee, skill};

    #[test]
    fn test_prompt_contains_every_candidate_id() {
        let a = employee(
            "Ada",
            vec![skill("Rust", ProficiencyLevel::Expert, 8)],
            Availability::Available,
        );
        let b = employee("Ben", vec![], Availability::Unavailable);
        let prompt = build_recommendation_prompt(
            "Ledger service",
            "Double-entry ledger",
            &["Rust".to_string()],
            &[a.clone(), b.clone()],
        );
        assert!(prompt.contains(&a.id.to_string()));
        assert!(prompt.contains(&b.id.to_string()));
        assert!(prompt.contains("Rust (Expert, 8y)"));
        assert!(prompt.contains("none listed"));
        assert!(prompt.contains("unavailable"));
        assert!(!prompt.contains("{candidates}"));
    }

    #[test]
    fn test_prompt_marks_missing_requirements() {
        let prompt = build_recommendation_prompt("T", "D", &[], &[]);
        assert!(prompt.contains("Required skills: none specified"));
    }

    #[test]
    fn test_placeholder_in_title_stays_literal() {
        let ada = employee("Ada", vec![], Availability::Available);
        let prompt = build_recommendation_prompt("{candidates}", "{title}", &[], &[ada.clone()]);
        assert!(prompt.contains("Title: {candidates}"));
        assert!(prompt.contains("Description: {title}"));
        assert_eq!(prompt.matches(&ada.id.to_string()).count(), 1);
    }

    #[test]
    fn test_system_prompt_demands_json() {
        let system = recommendation_system();
        assert!(system.starts_with("You are an experienced engineering resource manager."));
        assert!(system.contains(JSON_ONLY_SYSTEM));
    }
}
