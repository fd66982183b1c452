//! Atomic predicate evaluation against a single flat record.
//!
//! Missing keys read as absent. Unknown operators never match.

use riskmap_interchange::{Operator, Predicate, Record, Value};

static ABSENT: Value = Value::Null;

/// Apply `op` to a looked-up value. `None` is an absent value.
pub fn eval_operator(op: &Operator, value: Option<&Value>) -> bool {
    let value = value.unwrap_or(&ABSENT);
    match op {
        Operator::Exists(expected) => value.is_present() == *expected,
        Operator::Equals(expected) => value == expected,
        Operator::NotEquals(expected) => value != expected,
        Operator::In(candidates) => candidates.contains(value),
        Operator::Includes(item) => match value {
            Value::List(items) => items.contains(item),
            scalar => scalar == item,
        },
        Operator::IncludesAny(candidates) => match value {
            Value::List(items) => items.iter().any(|i| candidates.contains(i)),
            scalar => candidates.contains(scalar),
        },
        Operator::Unknown => false,
    }
}

/// Flags and facts only honor `equals` and `in`.
pub fn eval_scalar_operator(op: &Operator, value: Option<&Value>) -> bool {
    match op {
        Operator::Equals(_) | Operator::In(_) => eval_operator(op, value),
        _ => false,
    }
}

/// Evaluate a predicate against `record[pred.key]`.
pub fn eval_predicate(pred: &Predicate, record: &Record) -> bool {
    eval_operator(&pred.op, record.get(&pred.key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn pred(key: &str, op: Operator) -> Predicate {
        Predicate {
            key: key.to_string(),
            op,
        }
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn exists_treats_empty_values_as_absent() {
        let r = record(&[("a", Value::from("")), ("b", list(&[])), ("c", Value::from("x"))]);
        assert!(!eval_predicate(&pred("a", Operator::Exists(true)), &r));
        assert!(eval_predicate(&pred("b", Operator::Exists(false)), &r));
        assert!(eval_predicate(&pred("c", Operator::Exists(true)), &r));
        assert!(eval_predicate(&pred("missing", Operator::Exists(false)), &r));
    }

    #[test]
    fn equality_and_membership() {
        let r = record(&[("creator", Value::from("Acme Corp"))]);
        assert!(eval_predicate(&pred("creator", Operator::Equals(Value::from("Acme Corp"))), &r));
        assert!(eval_predicate(&pred("creator", Operator::NotEquals(Value::from("Other"))), &r));
        assert!(eval_predicate(
            &pred("creator", Operator::In(vec![Value::from("x"), Value::from("Acme Corp")])),
            &r
        ));
        // absent != "Other"
        assert!(eval_predicate(&pred("missing", Operator::NotEquals(Value::from("Other"))), &r));
        assert!(!eval_predicate(&pred("missing", Operator::Equals(Value::from("Other"))), &r));
    }

    #[test]
    fn includes_handles_lists_and_scalars() {
        let r = record(&[("tags", list(&["pii", "finance"])), ("single", Value::from("pii"))]);
        assert!(eval_predicate(&pred("tags", Operator::Includes(Value::from("pii"))), &r));
        assert!(!eval_predicate(&pred("tags", Operator::Includes(Value::from("hr"))), &r));
        assert!(eval_predicate(&pred("single", Operator::Includes(Value::from("pii"))), &r));
        assert!(eval_predicate(
            &pred("tags", Operator::IncludesAny(vec![Value::from("hr"), Value::from("finance")])),
            &r
        ));
        assert!(eval_predicate(
            &pred("single", Operator::IncludesAny(vec![Value::from("pii")])),
            &r
        ));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let r = record(&[("a", Value::Bool(true))]);
        assert!(!eval_predicate(&pred("a", Operator::Unknown), &r));
    }

    #[test]
    fn scalar_dialect_ignores_other_operators() {
        let v = Value::Bool(true);
        assert!(eval_scalar_operator(&Operator::Equals(Value::Bool(true)), Some(&v)));
        assert!(eval_scalar_operator(&Operator::In(vec![Value::Bool(true)]), Some(&v)));
        assert!(!eval_scalar_operator(&Operator::Exists(true), Some(&v)));
        assert!(!eval_scalar_operator(&Operator::Includes(Value::Bool(true)), Some(&v)));
    }
}
