//! Review gate: promotion of AI-drafted values into canonical fields.
//!
//! Each entity kind has an explicit schema of independently optional fields.
//! A field is copied into the canonical record iff it is present in the
//! payload AND its name appears in the reviewer's `approved_fields` list;
//! everything else is ignored. The research bookkeeping stamp
//! (`last_deep_research_at` / `last_deep_research_summary`) is written
//! unconditionally — it records that a review happened, it is not canonical
//! data. This gate is the only writer of canonical fields; the job pipeline
//! itself never touches them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::operator::TerminalOperator;
use crate::port::Port;
use crate::terminal::Terminal;

fn approved(fields: &[String], name: &str) -> bool {
    fields.iter().any(|f| f == name)
}

/// Reviewed update for a port.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortReview {
    pub name: Option<String>,
    pub country: Option<String>,
    pub locode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub port_authority: Option<String>,
    pub governance_model: Option<String>,
    pub isps_compliant: Option<bool>,
    pub strategic_notes: Option<String>,
    pub annual_teu: Option<u64>,
    pub last_deep_research_at: Option<DateTime<Utc>>,
    pub last_deep_research_summary: Option<String>,
}

impl PortReview {
    /// Apply the approved subset of this review to `port`.
    ///
    /// Returns the names of the fields that were actually written.
    pub fn apply_to(&self, port: &mut Port, approved_fields: &[String]) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if approved(approved_fields, "name") {
            if let Some(v) = &self.name {
                port.name = v.clone();
                applied.push("name");
            }
        }
        if approved(approved_fields, "country") {
            if let Some(v) = &self.country {
                port.country = v.clone();
                applied.push("country");
            }
        }
        if approved(approved_fields, "locode") {
            if let Some(v) = &self.locode {
                port.locode = Some(v.clone());
                applied.push("locode");
            }
        }
        if approved(approved_fields, "latitude") {
            if let Some(v) = self.latitude {
                port.latitude = Some(v);
                applied.push("latitude");
            }
        }
        if approved(approved_fields, "longitude") {
            if let Some(v) = self.longitude {
                port.longitude = Some(v);
                applied.push("longitude");
            }
        }
        if approved(approved_fields, "port_authority") {
            if let Some(v) = &self.port_authority {
                port.port_authority = Some(v.clone());
                applied.push("port_authority");
            }
        }
        if approved(approved_fields, "governance_model") {
            if let Some(v) = &self.governance_model {
                port.governance_model = Some(v.clone());
                applied.push("governance_model");
            }
        }
        if approved(approved_fields, "isps_compliant") {
            if let Some(v) = self.isps_compliant {
                port.isps_compliant = Some(v);
                applied.push("isps_compliant");
            }
        }
        if approved(approved_fields, "strategic_notes") {
            if let Some(v) = &self.strategic_notes {
                port.strategic_notes = Some(v.clone());
                applied.push("strategic_notes");
            }
        }
        if approved(approved_fields, "annual_teu") {
            if let Some(v) = self.annual_teu {
                port.annual_teu = Some(v);
                applied.push("annual_teu");
            }
        }

        stamp(
            &mut port.research.last_deep_research_at,
            &mut port.research.last_deep_research_summary,
            self.last_deep_research_at,
            self.last_deep_research_summary.clone(),
        );

        applied
    }
}

/// Reviewed update for a terminal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerminalReview {
    pub name: Option<String>,
    pub operator_name: Option<String>,
    pub berth_count: Option<u32>,
    pub quay_length_m: Option<u32>,
    pub max_draft_m: Option<f64>,
    pub annual_capacity_teu: Option<u64>,
    pub cargo_types: Option<Vec<String>>,
    pub last_deep_research_at: Option<DateTime<Utc>>,
    pub last_deep_research_summary: Option<String>,
}

impl TerminalReview {
    pub fn apply_to(
        &self,
        terminal: &mut Terminal,
        approved_fields: &[String],
    ) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if approved(approved_fields, "name") {
            if let Some(v) = &self.name {
                terminal.name = v.clone();
                applied.push("name");
            }
        }
        if approved(approved_fields, "operator_name") {
            if let Some(v) = &self.operator_name {
                terminal.operator_name = Some(v.clone());
                applied.push("operator_name");
            }
        }
        if approved(approved_fields, "berth_count") {
            if let Some(v) = self.berth_count {
                terminal.berth_count = Some(v);
                applied.push("berth_count");
            }
        }
        if approved(approved_fields, "quay_length_m") {
            if let Some(v) = self.quay_length_m {
                terminal.quay_length_m = Some(v);
                applied.push("quay_length_m");
            }
        }
        if approved(approved_fields, "max_draft_m") {
            if let Some(v) = self.max_draft_m {
                terminal.max_draft_m = Some(v);
                applied.push("max_draft_m");
            }
        }
        if approved(approved_fields, "annual_capacity_teu") {
            if let Some(v) = self.annual_capacity_teu {
                terminal.annual_capacity_teu = Some(v);
                applied.push("annual_capacity_teu");
            }
        }
        if approved(approved_fields, "cargo_types") {
            if let Some(v) = &self.cargo_types {
                terminal.cargo_types = v.clone();
                applied.push("cargo_types");
            }
        }

        stamp(
            &mut terminal.research.last_deep_research_at,
            &mut terminal.research.last_deep_research_summary,
            self.last_deep_research_at,
            self.last_deep_research_summary.clone(),
        );

        applied
    }
}

/// Reviewed update for a terminal operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorReview {
    pub name: Option<String>,
    pub headquarters_country: Option<String>,
    pub parent_company: Option<String>,
    pub countries_of_operation: Option<Vec<String>>,
    pub strategic_notes: Option<String>,
    pub last_deep_research_at: Option<DateTime<Utc>>,
    pub last_deep_research_summary: Option<String>,
}

impl OperatorReview {
    pub fn apply_to(
        &self,
        operator: &mut TerminalOperator,
        approved_fields: &[String],
    ) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if approved(approved_fields, "name") {
            if let Some(v) = &self.name {
                operator.name = v.clone();
                applied.push("name");
            }
        }
        if approved(approved_fields, "headquarters_country") {
            if let Some(v) = &self.headquarters_country {
                operator.headquarters_country = Some(v.clone());
                applied.push("headquarters_country");
            }
        }
        if approved(approved_fields, "parent_company") {
            if let Some(v) = &self.parent_company {
                operator.parent_company = Some(v.clone());
                applied.push("parent_company");
            }
        }
        if approved(approved_fields, "countries_of_operation") {
            if let Some(v) = &self.countries_of_operation {
                operator.countries_of_operation = v.clone();
                applied.push("countries_of_operation");
            }
        }
        if approved(approved_fields, "strategic_notes") {
            if let Some(v) = &self.strategic_notes {
                operator.strategic_notes = Some(v.clone());
                applied.push("strategic_notes");
            }
        }

        stamp(
            &mut operator.research.last_deep_research_at,
            &mut operator.research.last_deep_research_summary,
            self.last_deep_research_at,
            self.last_deep_research_summary.clone(),
        );

        applied
    }
}

/// Bookkeeping stamp: written on every apply, approved or not.
fn stamp(
    at_slot: &mut Option<DateTime<Utc>>,
    summary_slot: &mut Option<String>,
    at: Option<DateTime<Utc>>,
    summary: Option<String>,
) {
    *at_slot = Some(at.unwrap_or_else(Utc::now));
    *summary_slot = Some(summary.unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterId;
    use crate::port::PortId;
    use quayside_core::EntityId;

    fn test_port() -> Port {
        let mut port = Port::new(
            ClusterId::new(EntityId::new()),
            "Port of Rotterdam",
            "Netherlands",
        );
        port.port_authority = Some("Port of Rotterdam Authority".to_string());
        port
    }

    #[test]
    fn only_approved_fields_are_applied() {
        let mut port = test_port();
        let review = PortReview {
            strategic_notes: Some("largest European container hub".to_string()),
            port_authority: Some("should not land".to_string()),
            ..Default::default()
        };

        let applied = review.apply_to(&mut port, &["strategic_notes".to_string()]);

        assert_eq!(applied, vec!["strategic_notes"]);
        assert_eq!(
            port.strategic_notes.as_deref(),
            Some("largest European container hub")
        );
        assert_eq!(
            port.port_authority.as_deref(),
            Some("Port of Rotterdam Authority")
        );
    }

    #[test]
    fn approved_but_absent_fields_are_skipped() {
        let mut port = test_port();
        let review = PortReview::default();

        let applied = review.apply_to(&mut port, &["locode".to_string()]);

        assert!(applied.is_empty());
        assert_eq!(port.locode, None);
    }

    #[test]
    fn unknown_approved_names_gate_nothing() {
        let mut port = test_port();
        let review = PortReview {
            locode: Some("NLRTM".to_string()),
            ..Default::default()
        };

        let applied = review.apply_to(&mut port, &["no_such_field".to_string()]);

        assert!(applied.is_empty());
        assert_eq!(port.locode, None);
    }

    #[test]
    fn bookkeeping_stamp_is_unconditional() {
        let mut port = test_port();
        let review = PortReview {
            last_deep_research_summary: Some("reviewed summary".to_string()),
            ..Default::default()
        };

        review.apply_to(&mut port, &[]);

        assert!(port.research.last_deep_research_at.is_some());
        assert_eq!(
            port.research.last_deep_research_summary.as_deref(),
            Some("reviewed summary")
        );
    }

    #[test]
    fn stamp_defaults_when_payload_omits_them() {
        let mut port = test_port();
        PortReview::default().apply_to(&mut port, &[]);

        assert!(port.research.last_deep_research_at.is_some());
        assert_eq!(port.research.last_deep_research_summary.as_deref(), Some(""));
    }

    #[test]
    fn terminal_list_fields_replace_wholesale() {
        let mut terminal = Terminal::new(
            PortId::new(EntityId::new()),
            "Euromax",
            crate::terminal::TerminalType::Container,
        );
        terminal.cargo_types = vec!["containers".to_string()];

        let review = TerminalReview {
            cargo_types: Some(vec!["containers".to_string(), "reefer".to_string()]),
            ..Default::default()
        };
        let applied = review.apply_to(&mut terminal, &["cargo_types".to_string()]);

        assert_eq!(applied, vec!["cargo_types"]);
        assert_eq!(terminal.cargo_types.len(), 2);
    }
}
