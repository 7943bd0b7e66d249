use serde::{Deserialize, Serialize};

/// Optional background a student can share alongside slider values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracurriculars: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_state_preference: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

impl StudentProfile {
    /// Labelled, non-empty profile lines in a stable order
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();
        if let Some(gpa) = self.gpa {
            lines.push(("GPA", format!("{gpa}")));
        }
        if let Some(sat) = self.sat {
            lines.push(("SAT", sat.to_string()));
        }
        push_text(&mut lines, "Area of interest / Major", &self.major);
        push_text(&mut lines, "Current location", &self.location);
        push_text(&mut lines, "Sports & Extracurriculars", &self.extracurriculars);
        if let Some(in_state) = self.in_state_preference {
            let pref = if in_state { "in-state" } else { "out-of-state" };
            lines.push(("Tuition preference", pref.to_string()));
        }
        push_text(&mut lines, "What they want", &self.free_text);
        lines
    }
}

fn push_text(lines: &mut Vec<(&'static str, String)>, label: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        lines.push((label, v.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_skips_blank_fields() {
        let profile = StudentProfile {
            gpa: Some(3.7),
            major: Some("Computer Science".to_string()),
            location: Some("   ".to_string()),
            in_state_preference: Some(false),
            ..Default::default()
        };
        let lines = profile.describe();
        assert_eq!(
            lines,
            vec![
                ("GPA", "3.7".to_string()),
                ("Area of interest / Major", "Computer Science".to_string()),
                ("Tuition preference", "out-of-state".to_string()),
            ]
        );
    }
}
