use crate::db::ledger::LedgerError;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluate a selector object against one JSON document.
///
/// Fields are matched by name (dotted paths descend into nested objects).
/// A bare value means equality; an object of `$`-operators applies each
/// operator. Missing fields match nothing except `{"$exists": false}`.
pub(super) fn matches(selector: &Map<String, Value>, doc: &Value) -> Result<bool, LedgerError> {
    for (key, condition) in selector {
        let matched = match key.as_str() {
            "$and" => combinator(condition, doc, true)?,
            "$or" => combinator(condition, doc, false)?,
            op if op.starts_with('$') => {
                return Err(LedgerError::InvalidQuery(format!(
                    "unknown combinator '{op}'"
                )));
            }
            field => field_matches(lookup(doc, field), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn combinator(condition: &Value, doc: &Value, all: bool) -> Result<bool, LedgerError> {
    let Value::Array(clauses) = condition else {
        return Err(LedgerError::InvalidQuery(
            "combinator expects an array of selectors".to_string(),
        ));
    };

    for clause in clauses {
        let Value::Object(clause) = clause else {
            return Err(LedgerError::InvalidQuery(
                "combinator clause must be an object".to_string(),
            ));
        };
        let hit = matches(clause, doc)?;
        if hit != all {
            return Ok(hit);
        }
    }

    Ok(all)
}

fn field_matches(field: Option<&Value>, condition: &Value) -> Result<bool, LedgerError> {
    let operators = match condition {
        Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => ops,
        _ => return Ok(field == Some(condition)),
    };

    for (op, operand) in operators {
        if !operator_matches(field, op, operand)? {
            return Ok(false);
        }
    }

    Ok(true)
}

fn operator_matches(field: Option<&Value>, op: &str, operand: &Value) -> Result<bool, LedgerError> {
    if op == "$exists" {
        let Value::Bool(expected) = operand else {
            return Err(LedgerError::InvalidQuery(
                "$exists expects a boolean".to_string(),
            ));
        };
        return Ok(field.is_some() == *expected);
    }

    let Some(field) = field else {
        return Ok(false);
    };

    let result = match op {
        "$eq" => field == operand,
        "$ne" => field != operand,
        "$gt" => compare(field, operand) == Some(Ordering::Greater),
        "$gte" => matches!(
            compare(field, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "$lt" => compare(field, operand) == Some(Ordering::Less),
        "$lte" => matches!(
            compare(field, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        "$in" => {
            let Value::Array(options) = operand else {
                return Err(LedgerError::InvalidQuery("$in expects an array".to_string()));
            };
            options.contains(field)
        }
        other => {
            return Err(LedgerError::InvalidQuery(format!(
                "unknown operator '{other}'"
            )));
        }
    };

    Ok(result)
}

// Same-type ordering only; mixed types never compare.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}
