use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: ProficiencyLevel,
    #[serde(default)]
    pub years_of_experience: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    Limited,
    Unavailable,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::Available,
        Availability::Limited,
        Availability::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Limited => "limited",
            Availability::Unavailable => "unavailable",
        }
    }

    /// Human-readable label shown next to a recommendation.
    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Limited => "Limited availability",
            Availability::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Availability::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown availability '{s}'"))
    }
}

/// Raw `employees` row.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Json<Vec<Skill>>,
    pub availability: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<Skill>,
    pub availability: Availability,
    pub department: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = anyhow::Error;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            name: row.name,
            email: row.email,
            skills: row.skills.0,
            availability: row.availability.parse()?,
            department: row.department,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Compact employee reference embedded in recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        EmployeeSummary {
            id: e.id,
            name: e.name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            position: e.position.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_round_trips_through_str() {
        for a in Availability::ALL {
            assert_eq!(a.as_str().parse::<Availability>().unwrap(), a);
        }
        assert!("busy".parse::<Availability>().is_err());
    }

    #[test]
    fn test_skill_defaults_when_fields_missing() {
        let skill: Skill = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        assert_eq!(skill.level, ProficiencyLevel::Intermediate);
        assert_eq!(skill.years_of_experience, 0);
    }
}
