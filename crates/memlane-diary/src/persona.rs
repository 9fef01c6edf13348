//! Agent persona descriptions and decision lines.

use serde::{Deserialize, Serialize};

use crate::sections::tagged_body;

const DECISION_MARKERS: [&str; 6] = ["decided", "choose", "selected", "opted", "I will", "I have"];

/// An agent description split into its tagged parts.
///
/// Descriptions without `<backstory>`, `<behaviour>`, or `<objective>` tags
/// leave every part empty; render `raw` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub backstory: Option<String>,
    pub behaviour: Option<String>,
    /// Bullet items when the objective uses `-` bullets, else one item.
    pub objectives: Vec<String>,
    pub raw: String,
}

impl Persona {
    pub fn is_structured(&self) -> bool {
        self.backstory.is_some() || self.behaviour.is_some() || !self.objectives.is_empty()
    }
}

pub fn parse_persona(description: &str) -> Persona {
    let raw = description.to_string();
    if !description.contains('<') || !description.contains('>') {
        return Persona {
            raw,
            ..Persona::default()
        };
    }

    let part = |tag| {
        tagged_body(description, tag)
            .filter(|body| !body.is_empty())
            .map(str::to_string)
    };

    let objectives = match part("objective") {
        Some(objective) if objective.contains('-') => objective
            .split('-')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(objective) => vec![objective],
        None => Vec::new(),
    };

    Persona {
        backstory: part("backstory"),
        behaviour: part("behaviour"),
        objectives,
        raw,
    }
}

/// Trimmed lines that read like a decision. Markers are case-sensitive.
pub fn key_decisions(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| DECISION_MARKERS.iter().any(|m| line.contains(m)))
        .map(|line| line.trim().to_string())
        .collect()
}
