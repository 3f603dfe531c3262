/// One question of the audit battery, tied to the policy section it probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditQuery {
    pub query_text: &'static str,
    pub policy_section: &'static str,
}

impl AuditQuery {
    pub const fn new(query_text: &'static str, policy_section: &'static str) -> Self {
        Self {
            query_text,
            policy_section,
        }
    }
}

/// The fixed battery driven by the report, in report order.
pub const AUDIT_QUERIES: [AuditQuery; 10] = [
    AuditQuery::new("What are the access control policies?", "4.4"),
    AuditQuery::new("How does the policy address encryption?", "4.34"),
    AuditQuery::new("What are the vulnerability management procedures?", "4.16"),
    AuditQuery::new("What is the incident response plan?", "4.33"),
    AuditQuery::new("How are passwords managed?", "4.5"),
    AuditQuery::new("What are the logging and monitoring policies?", "4.12"),
    AuditQuery::new("What is the data retention policy?", "4.20"),
    AuditQuery::new("How is supplier risk managed?", "4.29"),
    AuditQuery::new("What is the physical security policy?", "4.7"),
    AuditQuery::new("How does the organization ensure business continuity?", "4.25"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplianceConfig;

    const SHIPPED_MAPPING: &str = include_str!("../../../data/mappings/compliance_mapping.json");

    #[test]
    fn battery_sections_are_unique() {
        let mut sections: Vec<&str> = AUDIT_QUERIES.iter().map(|q| q.policy_section).collect();
        sections.sort_unstable();
        sections.dedup();
        assert_eq!(sections.len(), AUDIT_QUERIES.len());
    }

    #[test]
    fn shipped_mapping_covers_every_battery_section() {
        let config: ComplianceConfig = serde_json::from_str(SHIPPED_MAPPING).unwrap();
        for query in &AUDIT_QUERIES {
            let mapping = config
                .mapping_for(query.policy_section)
                .unwrap_or_else(|| panic!("section {} not mapped", query.policy_section));
            assert_eq!(mapping.policy_section_prefix, query.policy_section);
            assert!(mapping.clause_count() > 0);
        }
    }

    #[test]
    fn shipped_mapping_enhances_every_battery_query() {
        let config: ComplianceConfig = serde_json::from_str(SHIPPED_MAPPING).unwrap();
        for query in &AUDIT_QUERIES {
            assert!(
                config.enhancement_for(query.query_text).is_some(),
                "no enhancement for {:?}",
                query.query_text
            );
        }
    }
}
