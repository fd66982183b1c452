//! Control mapping: risks to their declared controls.

use riskmap_interchange::Catalog;
use tracing::debug;

/// Controls of every risk, in risk order, first occurrence keeping its
/// position. Risks missing from the catalog contribute nothing.
pub fn map_controls(risk_ids: &[String], catalog: &Catalog) -> Vec<String> {
    let mut controls: Vec<String> = Vec::new();
    for risk_id in risk_ids {
        let Some(risk) = catalog.risk(risk_id) else {
            debug!(risk = %risk_id, "risk not in catalog");
            continue;
        };
        for control in &risk.controls {
            if !controls.contains(control) {
                controls.push(control.clone());
            }
        }
    }
    controls
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_first_occurrence_order() {
        let catalog = Catalog::from_json(
            &json!({ "risks": [
                { "id": "R1", "controls": ["c2", "c1"] },
                { "id": "R2", "controls": ["c1", "c3"] }
            ]}),
            &serde_json::Value::Null,
            &serde_json::Value::Null,
        )
        .unwrap();
        let risks = vec!["R1".to_string(), "R2".to_string(), "R9".to_string()];
        assert_eq!(map_controls(&risks, &catalog), vec!["c2", "c1", "c3"]);
    }
}
