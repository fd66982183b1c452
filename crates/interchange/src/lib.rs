//! riskmap-interchange: typed configuration model for the risk map engine.
//!
//! Raw YAML/JSON documents are read once, passed through a single key-alias
//! normalization pass, and parsed into closed types (`Condition`, `FlagRule`,
//! `FactRule`, `RoutingEntry`, `TierConfig`, ...). Structural problems are
//! reported here as [`ConfigError`]; the evaluation engine downstream never
//! fails.

pub mod assessment;
pub mod catalog;
pub mod condition;
pub mod error;
pub mod inventory;
pub mod load;
pub mod normalize;
pub mod routing;
pub mod session;
pub mod values;

pub use assessment::{
    BaselineConfig, BaselineGate, Combinator, EscalationRule, PersonaQuestion, Question,
    SelfAssessment, TierCondition, TierConfig, TierKey, TierLevel, TierQuestion, TierQuestionIndex,
    TierUseCase,
};
pub use catalog::{Catalog, ControlEntry, PersonaEntry, RiskEntry};
pub use condition::{parse_condition, Condition, Operator, Predicate};
pub use error::ConfigError;
pub use inventory::{
    DEFAULT_RELEVANCE, DisplayRule, FieldDecl, FlagRule, InventorySchema, RepeatingBlockDecl, RequirednessPolicy,
    StepDecl, StepStateDecl,
};
pub use load::{load_config_dir, load_session, read_document, RiskMapConfig};
pub use normalize::{canonical_key, normalize_keys, normalize_top_level};
pub use routing::{AnswerDefault, FactRule, QuestionRule, RoutingConfig, RoutingEntry, UseCasePrefill};
pub use session::AssessmentSession;
pub use values::{
    answer_in, answer_matches, record_from_json, Answers, FactMap, FlagMap, Record,
    RepeatingBlockSet, Value, ValueMap,
};
