//! Parsing of the compact query clauses accepted by `create-query`.

use crate::api::queries::{Calculation, Having, Order, QueryFilter};
use crate::error::{ApiError, ApiResult};
use serde_json::Value;

/// Filter operators that never carry a value.
const NO_VALUE_OPS: [&str; 2] = ["exists", "does-not-exist"];

/// Parses `"column op [value]"`. The value is everything after the operator,
/// so it may contain spaces.
pub fn parse_filter(raw: &str) -> ApiResult<QueryFilter> {
    let mut parts = raw.trim().splitn(3, ' ');
    let (Some(column), Some(op)) = (parts.next(), parts.next()) else {
        return Err(ApiError::validation(format!(
            "invalid filter {raw:?}: expected \"column op [value]\""
        )));
    };
    if column.is_empty() || op.is_empty() {
        return Err(ApiError::validation(format!(
            "invalid filter {raw:?}: expected \"column op [value]\""
        )));
    }

    let mut filter = QueryFilter {
        column: column.to_string(),
        op: op.to_string(),
        value: None,
    };
    if NO_VALUE_OPS.contains(&op) {
        return Ok(filter);
    }

    match parts.next().map(str::trim) {
        Some(value) if !value.is_empty() => {
            filter.value = Some(typed_value(value));
            Ok(filter)
        }
        _ => Err(ApiError::validation(format!(
            "invalid filter {raw:?}: operator {op:?} requires a value"
        ))),
    }
}

/// Numbers and booleans go over the wire as JSON numbers and booleans;
/// everything else stays a string. A number is only coerced when its JSON
/// form is exactly the input, so `00501` or a 20-digit ID stays a string.
pub fn typed_value(raw: &str) -> Value {
    let number = if let Ok(n) = raw.parse::<i64>() {
        Some(Value::from(n))
    } else if let Ok(n) = raw.parse::<u64>() {
        Some(Value::from(n))
    } else {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
    };
    if let Some(number) = number
        && number.to_string() == raw
    {
        return number;
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Parses `"<column|OP|OP(column)> [asc|desc]"`.
pub fn parse_order(raw: &str) -> ApiResult<Order> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    let (target, direction) = match fields.as_slice() {
        [target] => (*target, None),
        [target, dir] => {
            let dir = dir.to_lowercase();
            if dir != "asc" && dir != "desc" {
                return Err(ApiError::validation(format!(
                    "invalid order {raw:?}: direction must be asc or desc"
                )));
            }
            (*target, Some(dir))
        }
        _ => {
            return Err(ApiError::validation(format!(
                "invalid order {raw:?}: expected \"<column|OP|OP(column)> [asc|desc]\""
            )));
        }
    };

    let mut order = Order {
        order: direction,
        ..Order::default()
    };
    match split_calculation(target, raw)? {
        (op, Some(column)) => {
            order.op = Some(op);
            order.column = Some(column);
        }
        (op, None) if is_calculation_op(&op) => order.op = Some(op),
        (column, None) => order.column = Some(column),
    }
    Ok(order)
}

/// Parses `"OP[(column)] <op> <value>"`, e.g. `"COUNT > 10"` or
/// `"AVG(duration_ms) >= 250"`.
pub fn parse_having(raw: &str) -> ApiResult<Having> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    let [target, op, value] = fields.as_slice() else {
        return Err(ApiError::validation(format!(
            "invalid having {raw:?}: expected \"OP[(column)] <op> <value>\""
        )));
    };
    let (calculate_op, column) = split_calculation(target, raw)?;
    Ok(Having {
        calculate_op,
        column,
        op: (*op).to_string(),
        value: typed_value(value),
    })
}

/// Pairs each `--calculation-op` with its `--calculation-column`. Columns are
/// optional as a whole, but when given there must be one per op; an empty
/// column means none.
pub fn calculations(ops: &[String], columns: &[String]) -> ApiResult<Vec<Calculation>> {
    if ops.is_empty() {
        return Err(ApiError::validation(
            "at least one --calculation-op is required",
        ));
    }
    if !columns.is_empty() && columns.len() != ops.len() {
        return Err(ApiError::validation(format!(
            "number of --calculation-column values ({}) must match --calculation-op values ({})",
            columns.len(),
            ops.len()
        )));
    }

    Ok(ops
        .iter()
        .enumerate()
        .map(|(i, op)| Calculation {
            op: op.clone(),
            column: columns.get(i).filter(|c| !c.is_empty()).cloned(),
            name: None,
        })
        .collect())
}

/// A relative range may be anchored by one end, but not by both.
pub fn validate_time_window(
    time_range: Option<u64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
) -> ApiResult<()> {
    if time_range.is_some() && start_time.is_some() && end_time.is_some() {
        return Err(ApiError::validation(
            "--time-range cannot be combined with both --start-time and --end-time",
        ));
    }
    if let (Some(start), Some(end)) = (start_time, end_time)
        && start > end
    {
        return Err(ApiError::validation(format!(
            "--start-time ({start}) must not be after --end-time ({end})"
        )));
    }
    Ok(())
}

fn split_calculation(target: &str, raw: &str) -> ApiResult<(String, Option<String>)> {
    let Some((op, rest)) = target.split_once('(') else {
        return Ok((target.to_string(), None));
    };
    let column = rest.strip_suffix(')').ok_or_else(|| {
        ApiError::validation(format!("invalid clause {raw:?}: unbalanced parentheses"))
    })?;
    if op.is_empty() || column.is_empty() {
        return Err(ApiError::validation(format!(
            "invalid clause {raw:?}: expected OP(column)"
        )));
    }
    Ok((op.to_uppercase(), Some(column.to_string())))
}

fn is_calculation_op(token: &str) -> bool {
    matches!(
        token,
        "COUNT"
            | "CONCURRENCY"
            | "SUM"
            | "AVG"
            | "COUNT_DISTINCT"
            | "MAX"
            | "MIN"
            | "HEATMAP"
            | "RATE_AVG"
            | "RATE_SUM"
            | "RATE_MAX"
    ) || (token.starts_with('P') && token.len() > 1 && token[1..].chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_value_keeps_spaces_and_is_typed() {
        let f = parse_filter("name = GET /api/users").unwrap();
        assert_eq!(f.column, "name");
        assert_eq!(f.op, "=");
        assert_eq!(f.value, Some(json!("GET /api/users")));

        assert_eq!(parse_filter("duration_ms > 100").unwrap().value, Some(json!(100)));
        assert_eq!(parse_filter("ratio < 0.5").unwrap().value, Some(json!(0.5)));
        assert_eq!(parse_filter("error = true").unwrap().value, Some(json!(true)));
    }

    #[test]
    fn values_that_would_change_as_numbers_stay_strings() {
        assert_eq!(typed_value("00501"), json!("00501"));
        assert_eq!(
            typed_value("12345678901234567890"),
            json!("12345678901234567890")
        );
        assert_eq!(typed_value("99999999999999999999999"), json!("99999999999999999999999"));
        assert_eq!(typed_value("1.50"), json!("1.50"));
        assert_eq!(typed_value("18446744073709551615"), json!(18446744073709551615u64));
        assert_eq!(typed_value("-42"), json!(-42));
        assert_eq!(
            parse_having("COUNT > 007").unwrap().value,
            json!("007")
        );
    }

    #[test]
    fn valueless_operators() {
        let f = parse_filter("trace.parent_id does-not-exist").unwrap();
        assert_eq!(f.op, "does-not-exist");
        assert_eq!(f.value, None);
        assert_eq!(parse_filter("user.id exists").unwrap().value, None);
    }

    #[test]
    fn filter_errors() {
        let err = parse_filter("duration_ms >").unwrap_err();
        assert!(err.to_string().contains("requires a value"));
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(parse_filter("lonely").is_err());
        assert!(parse_filter("").is_err());
    }

    #[test]
    fn orders() {
        assert_eq!(
            parse_order("COUNT desc").unwrap(),
            Order {
                column: None,
                op: Some("COUNT".into()),
                order: Some("desc".into()),
            }
        );
        assert_eq!(
            parse_order("P99(duration_ms)").unwrap(),
            Order {
                column: Some("duration_ms".into()),
                op: Some("P99".into()),
                order: None,
            }
        );
        assert_eq!(
            parse_order("service.name ASC").unwrap(),
            Order {
                column: Some("service.name".into()),
                op: None,
                order: Some("asc".into()),
            }
        );
        assert!(parse_order("COUNT sideways").is_err());
        assert!(parse_order("AVG(duration_ms").is_err());
    }

    #[test]
    fn havings() {
        let h = parse_having("AVG(duration_ms) >= 250").unwrap();
        assert_eq!(h.calculate_op, "AVG");
        assert_eq!(h.column.as_deref(), Some("duration_ms"));
        assert_eq!(h.op, ">=");
        assert_eq!(h.value, json!(250));

        let h = parse_having("COUNT > 10").unwrap();
        assert_eq!(h.column, None);
        assert!(parse_having("COUNT >").is_err());
    }

    #[test]
    fn calculation_arity() {
        let ops = vec!["COUNT".to_string(), "P99".to_string()];
        let err = calculations(&ops, &["duration_ms".to_string()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of --calculation-column values (1) must match --calculation-op values (2)"
        );

        let calcs = calculations(&ops, &[String::new(), "duration_ms".to_string()]).unwrap();
        assert_eq!(calcs[0].column, None);
        assert_eq!(calcs[1].column.as_deref(), Some("duration_ms"));

        let calcs = calculations(&ops, &[]).unwrap();
        assert!(calcs.iter().all(|c| c.column.is_none()));
        assert!(calculations(&[], &[]).is_err());
    }

    #[test]
    fn time_window() {
        assert!(validate_time_window(Some(3600), None, None).is_ok());
        assert!(validate_time_window(Some(3600), Some(100), None).is_ok());
        assert!(validate_time_window(None, Some(100), Some(200)).is_ok());
        assert!(validate_time_window(Some(3600), Some(100), Some(200)).is_err());
        let err = validate_time_window(None, Some(200), Some(100)).unwrap_err();
        assert!(err.to_string().contains("must not be after"));
    }
}
