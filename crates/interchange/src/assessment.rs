//! Self-assessment configuration: the persona question, risk questions and
//! the tier scoring model.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::error::ConfigError;
use crate::inventory::{array, opt_str, required_str, string_list};
use crate::values::Value;

/// Persona selection question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaQuestion {
    pub id: Option<String>,
    pub text: Option<String>,
    /// Persona ids offered as options.
    pub options: Vec<String>,
}

/// A risk question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: Option<String>,
    /// Personas the question applies to. Empty means every persona.
    pub personas: Vec<String>,
    /// Answer labels that make the question's risks relevant.
    pub relevance: Vec<Value>,
    pub risks: Vec<String>,
    /// Offered answer labels.
    pub answers: Vec<String>,
}

impl Question {
    pub fn applies_to(&self, selected_personas: &[String]) -> bool {
        self.personas.is_empty() || self.personas.iter().any(|p| selected_personas.contains(p))
    }
}

// ──────────────────────────────────────────────
// Tier model
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierLevel {
    pub label: String,
    /// Ordinal; higher is more restrictive.
    pub value: i64,
}

/// Raise the baseline when the gated question's answer is in `if_answer_in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineGate {
    pub question_id: String,
    pub if_answer_in: Vec<Value>,
    pub then_tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineConfig {
    pub default_tier: Option<String>,
    /// Gate question ids in evaluation order.
    pub gate_order: Vec<String>,
    /// Declared gates, in declared order.
    pub gates: Vec<BaselineGate>,
}

impl BaselineConfig {
    pub fn gate(&self, question_id: &str) -> Option<&BaselineGate> {
        self.gates.iter().find(|g| g.question_id == question_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierUseCase {
    pub id: String,
    pub label: Option<String>,
    pub baseline_tier: Option<String>,
}

impl TierUseCase {
    /// Selections may name a use case by id or by label.
    pub fn is_selected_by(&self, selection: &str) -> bool {
        self.id == selection || self.label.as_deref() == Some(selection)
    }
}

/// A tier question tagged with the driver and/or control it measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierQuestion {
    pub id: String,
    pub text: Option<String>,
    pub driver: Option<String>,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierKey {
    Driver(String),
    Control(String),
}

/// `{driver|control, in_answers}`. A condition with neither key never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCondition {
    pub key: Option<TierKey>,
    pub in_answers: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationRule {
    pub id: Option<String>,
    pub text: Option<String>,
    pub combinator: Combinator,
    pub conditions: Vec<TierCondition>,
    pub set_minimum_tier: Option<String>,
}

impl EscalationRule {
    /// Name reported when the rule fires: `text`, else `id`, else position.
    pub fn display_name(&self, index: usize) -> String {
        self.text
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| format!("escalationRules[{}]", index))
    }
}

/// Driver -> question and control -> question, first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct TierQuestionIndex<'a> {
    drivers: BTreeMap<&'a str, &'a str>,
    controls: BTreeMap<&'a str, &'a str>,
}

impl<'a> TierQuestionIndex<'a> {
    fn new(config: &'a TierConfig) -> Self {
        let mut drivers = BTreeMap::new();
        let mut controls = BTreeMap::new();
        for q in &config.questions {
            if let Some(d) = &q.driver {
                drivers.entry(d.as_str()).or_insert(q.id.as_str());
            }
            if let Some(c) = &q.control {
                controls.entry(c.as_str()).or_insert(q.id.as_str());
            }
        }
        TierQuestionIndex { drivers, controls }
    }

    pub fn question_for(&self, key: &TierKey) -> Option<&'a str> {
        match key {
            TierKey::Driver(d) => self.drivers.get(d.as_str()).copied(),
            TierKey::Control(c) => self.controls.get(c.as_str()).copied(),
        }
    }
}

/// Tier scoring configuration. Empty `tiers` means scoring is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierConfig {
    pub tiers: Vec<TierLevel>,
    pub baseline: BaselineConfig,
    pub use_cases: Vec<TierUseCase>,
    pub questions: Vec<TierQuestion>,
    pub escalation_rules: Vec<EscalationRule>,
}

impl TierConfig {
    pub fn is_configured(&self) -> bool {
        !self.tiers.is_empty()
    }

    pub fn tier_value(&self, label: &str) -> Option<i64> {
        self.tiers.iter().find(|t| t.label == label).map(|t| t.value)
    }

    /// Reverse lookup: the first declared label carrying `value`.
    pub fn tier_label(&self, value: i64) -> Option<&str> {
        self.tiers
            .iter()
            .find(|t| t.value == value)
            .map(|t| t.label.as_str())
    }

    pub fn lowest_tier(&self) -> Option<&TierLevel> {
        self.tiers.iter().min_by_key(|t| t.value)
    }

    /// Driver and control lookup over the declared questions.
    pub fn question_index(&self) -> TierQuestionIndex<'_> {
        TierQuestionIndex::new(self)
    }

    pub fn from_json(v: &Json) -> Result<Self, ConfigError> {
        if v.is_null() {
            return Ok(TierConfig::default());
        }

        let tiers = array(v, "tiers", "vayu")?
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let section = format!("vayu.tiers[{}]", i);
                let value = t
                    .get("value")
                    .and_then(Json::as_i64)
                    .ok_or_else(|| ConfigError::shape(&section, "'value' must be an integer"))?;
                Ok(TierLevel {
                    label: required_str(t, "label", &section)?,
                    value,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let baseline = match v.get("baseline") {
            None | Some(Json::Null) => BaselineConfig::default(),
            Some(b) => parse_baseline(b)?,
        };

        let use_cases = array(v, "useCases", "vayu")?
            .iter()
            .enumerate()
            .map(|(i, u)| {
                Ok(TierUseCase {
                    id: required_str(u, "id", &format!("vayu.useCases[{}]", i))?,
                    label: opt_str(u, "label"),
                    baseline_tier: opt_str(u, "baselineTier"),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let questions = array(v, "questions", "vayu")?
            .iter()
            .enumerate()
            .map(|(i, q)| {
                Ok(TierQuestion {
                    id: required_str(q, "id", &format!("vayu.questions[{}]", i))?,
                    text: opt_str(q, "text"),
                    driver: opt_str(q, "driver"),
                    control: opt_str(q, "control"),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let escalation_rules = array(v, "escalationRules", "vayu")?
            .iter()
            .enumerate()
            .map(|(i, r)| parse_escalation_rule(&format!("vayu.escalationRules[{}]", i), r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TierConfig {
            tiers,
            baseline,
            use_cases,
            questions,
            escalation_rules,
        })
    }
}

fn parse_baseline(v: &Json) -> Result<BaselineConfig, ConfigError> {
    let gates = match v.get("gates") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Object(m)) => m
            .iter()
            .map(|(question_id, g)| {
                let section = format!("vayu.baseline.gates.{}", question_id);
                Ok(BaselineGate {
                    question_id: question_id.clone(),
                    if_answer_in: answer_list(&section, g, "if_answer_in")?,
                    then_tier: required_str(g, "then_tier", &section)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?,
        Some(_) => {
            return Err(ConfigError::shape(
                "vayu.baseline",
                "'gates' must be an object keyed by question id",
            ))
        }
    };

    // Without an explicit order, gates run in declared order.
    let gate_order = if v.get("gateOrder").is_some() {
        string_list(v, "gateOrder")
    } else {
        gates.iter().map(|g| g.question_id.clone()).collect()
    };

    Ok(BaselineConfig {
        default_tier: opt_str(v, "defaultTier"),
        gate_order,
        gates,
    })
}

fn answer_list(section: &str, v: &Json, key: &str) -> Result<Vec<Value>, ConfigError> {
    array(v, key, section)?
        .iter()
        .map(|a| Value::from_json(key, a))
        .collect()
}

fn parse_escalation_rule(section: &str, v: &Json) -> Result<EscalationRule, ConfigError> {
    let when = v.get("when").unwrap_or(&Json::Null);
    let (combinator, items) = if when.get("all").is_some() {
        (Combinator::All, array(when, "all", section)?)
    } else {
        (Combinator::Any, array(when, "any", section)?)
    };

    let conditions = items
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let cond_section = format!("{}.when[{}]", section, i);
            let key = match (opt_str(c, "driver"), opt_str(c, "control")) {
                (Some(d), _) => Some(TierKey::Driver(d)),
                (None, Some(control)) => Some(TierKey::Control(control)),
                (None, None) => None,
            };
            Ok(TierCondition {
                key,
                in_answers: answer_list(&cond_section, c, "in_answers")?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(EscalationRule {
        id: opt_str(v, "id"),
        text: opt_str(v, "text"),
        combinator,
        conditions,
        set_minimum_tier: v
            .get("then")
            .and_then(|t| t.get("set_minimum_tier"))
            .and_then(Json::as_str)
            .map(str::to_string),
    })
}

// ──────────────────────────────────────────────
// Self-assessment
// ──────────────────────────────────────────────

/// The parsed `self-assessment` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfAssessment {
    pub persona_question: PersonaQuestion,
    pub questions: Vec<Question>,
    pub tier: TierConfig,
}

impl SelfAssessment {
    /// Accepts the document either wrapped in `selfAssessment` or bare.
    pub fn from_json(v: &Json) -> Result<Self, ConfigError> {
        if v.is_null() {
            return Ok(SelfAssessment::default());
        }
        let root = v.get("selfAssessment").unwrap_or(v);

        let persona_question = match root.get("personas") {
            None | Some(Json::Null) => PersonaQuestion::default(),
            Some(p) => PersonaQuestion {
                id: opt_str(p, "id"),
                text: opt_str(p, "text"),
                options: option_ids(p),
            },
        };

        let questions = array(root, "questions", "selfAssessment")?
            .iter()
            .enumerate()
            .map(|(i, q)| parse_question(&format!("selfAssessment.questions[{}]", i), q))
            .collect::<Result<Vec<_>, _>>()?;

        let tier_json = root.get("vayu").or_else(|| v.get("vayu")).unwrap_or(&Json::Null);

        Ok(SelfAssessment {
            persona_question,
            questions,
            tier: TierConfig::from_json(tier_json)?,
        })
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Persona options are either plain ids or `{id, ...}` objects.
fn option_ids(v: &Json) -> Vec<String> {
    v.get("options")
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|o| match o {
                    Json::String(s) => Some(s.clone()),
                    other => opt_str(other, "id"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_question(section: &str, v: &Json) -> Result<Question, ConfigError> {
    let id = required_str(v, "id", section)?;
    let relevance = array(v, "relevance", section)?
        .iter()
        .map(|r| Value::from_json(&id, r))
        .collect::<Result<Vec<_>, _>>()?;
    let answers = match v.get("answers") {
        Some(Json::Array(items)) => items
            .iter()
            .filter_map(|a| match a {
                Json::String(s) => Some(s.clone()),
                Json::Bool(_) => Value::from_json(&id, a).ok().map(|v| v.to_answer_label()),
                other => opt_str(other, "label"),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(Question {
        text: opt_str(v, "text"),
        personas: string_list(v, "personas"),
        relevance,
        risks: string_list(v, "risks"),
        answers,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tier_fixture() -> serde_json::Value {
        json!({
            "tiers": [
                { "label": "low", "value": 1 },
                { "label": "medium", "value": 2 },
                { "label": "high", "value": 3 }
            ],
            "baseline": {
                "defaultTier": "low",
                "gates": {
                    "vayuPublicFacing": { "if_answer_in": [true], "then_tier": "medium" },
                    "vayuAutomated": { "if_answer_in": ["Yes"], "then_tier": "high" }
                }
            },
            "useCases": [{ "id": "automatedDecisioning", "label": "Automated decisioning", "baselineTier": "high" }],
            "questions": [{ "id": "vayuAutonomy", "driver": "autonomy" }],
            "escalationRules": [{
                "id": "autonomy",
                "text": "High autonomy",
                "when": { "all": [{ "driver": "autonomy", "in_answers": ["Yes"] }] },
                "then": { "set_minimum_tier": "high" }
            }]
        })
    }

    #[test]
    fn parses_tier_config() {
        let tier = TierConfig::from_json(&tier_fixture()).unwrap();
        assert!(tier.is_configured());
        assert_eq!(tier.tier_value("medium"), Some(2));
        assert_eq!(tier.tier_label(3), Some("high"));
        assert_eq!(tier.lowest_tier().map(|t| t.label.as_str()), Some("low"));
        assert_eq!(tier.baseline.gate_order, vec!["vayuPublicFacing", "vayuAutomated"]);
        assert!(tier.use_cases[0].is_selected_by("Automated decisioning"));
        let index = tier.question_index();
        assert_eq!(
            index.question_for(&TierKey::Driver("autonomy".into())),
            Some("vayuAutonomy")
        );
        assert_eq!(index.question_for(&TierKey::Control("missing".into())), None);
        let rule = &tier.escalation_rules[0];
        assert_eq!(rule.combinator, Combinator::All);
        assert_eq!(rule.set_minimum_tier.as_deref(), Some("high"));
        assert_eq!(rule.display_name(0), "High autonomy");
    }

    #[test]
    fn explicit_gate_order_is_kept() {
        let mut cfg = tier_fixture();
        cfg["baseline"]["gateOrder"] = json!(["vayuAutomated"]);
        let tier = TierConfig::from_json(&cfg).unwrap();
        assert_eq!(tier.baseline.gate_order, vec!["vayuAutomated"]);
    }

    #[test]
    fn non_integer_tier_value_is_an_error() {
        let err = TierConfig::from_json(&json!({ "tiers": [{ "label": "low", "value": "one" }] }))
            .unwrap_err();
        assert!(err.to_string().contains("vayu.tiers[0]"));
    }

    #[test]
    fn parses_wrapped_self_assessment() {
        let sa = SelfAssessment::from_json(&json!({
            "selfAssessment": {
                "personas": { "id": "personas", "options": ["personaModelCreator", { "id": "personaModelConsumer" }] },
                "questions": [{
                    "id": "q1",
                    "personas": ["personaModelCreator"],
                    "relevance": ["Yes"],
                    "risks": ["DP", "MST"]
                }],
                "vayu": tier_fixture()
            }
        }))
        .unwrap();
        assert_eq!(
            sa.persona_question.options,
            vec!["personaModelCreator", "personaModelConsumer"]
        );
        let q = sa.question("q1").unwrap();
        assert_eq!(q.risks, vec!["DP", "MST"]);
        assert!(q.applies_to(&["personaModelCreator".to_string()]));
        assert!(!q.applies_to(&["personaModelConsumer".to_string()]));
        assert!(sa.tier.is_configured());
    }

    #[test]
    fn question_without_personas_applies_to_all() {
        let sa = SelfAssessment::from_json(&json!({ "questions": [{ "id": "q" }] })).unwrap();
        assert!(sa.questions[0].applies_to(&[]));
        assert!(!sa.tier.is_configured());
    }
}
