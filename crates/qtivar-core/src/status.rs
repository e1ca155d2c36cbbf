//! Attempted/completed status derived from current and default values.

use std::fmt;

use serde::Serialize;

use crate::model::{InteractionType, Value};
use crate::variable::Variable;

/// Navigation status of one response or of a whole item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    /// Rendered as the empty string.
    NotAttempted,
    Attempted,
    Completed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::NotAttempted => "",
            ResponseStatus::Attempted => "attempted",
            ResponseStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answered slots and the number of slots expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCount {
    pub found: usize,
    pub all: usize,
}

/// Count answered slots that differ from the default.
///
/// The denominator is `max_choices` when set, otherwise the length of the
/// answer list.
pub fn count_responses(variable: &Variable) -> ResponseCount {
    let default = variable.default_value();
    let (found, length) = match variable.value() {
        None => (0, 0),
        Some(Value::Scalar(s)) => {
            let unchanged = matches!(default, Some(Value::Scalar(d)) if d == s);
            (usize::from(!unchanged), 1)
        }
        Some(Value::List(items)) => {
            let defaults: Vec<_> = default.map(Value::slots).unwrap_or_default();
            let found = items
                .iter()
                .flatten()
                .filter(|item| !defaults.contains(&Some(item)))
                .count();
            (found, items.len())
        }
    };
    let all = match variable.max_choices() {
        0 => length,
        n => n as usize,
    };
    ResponseCount { found, all }
}

/// Status of a single response variable.
pub fn response_status(variable: &Variable) -> ResponseStatus {
    let ResponseCount { found, all } = count_responses(variable);
    if found > 0 && found == all {
        ResponseStatus::Completed
    } else if all > 0 && found > 0 {
        ResponseStatus::Attempted
    } else {
        ResponseStatus::NotAttempted
    }
}

/// Whether a sub-response is a choice interaction allowing several selections.
fn is_multi_choice(variable: &Variable) -> bool {
    variable.interaction() == Some(InteractionType::Choice) && variable.max_choices() > 1
}

/// Combine the statuses of the responses of one item.
///
/// An item with several responses counts as completed once none of them is
/// untouched, unless one of them is a multi-selection choice interaction.
pub fn aggregate_status<'a>(responses: impl IntoIterator<Item = &'a Variable>) -> ResponseStatus {
    let entries: Vec<(ResponseStatus, bool)> = responses
        .into_iter()
        .map(|v| (response_status(v), is_multi_choice(v)))
        .collect();
    if entries.is_empty() {
        return ResponseStatus::NotAttempted;
    }

    let all_completed = entries.iter().all(|(s, _)| *s == ResponseStatus::Completed);
    let none_untouched = entries
        .iter()
        .all(|(s, _)| *s != ResponseStatus::NotAttempted);
    let no_multi_choice = entries.iter().all(|(_, multi)| !multi);

    if all_completed || (entries.len() > 1 && none_untouched && no_multi_choice) {
        ResponseStatus::Completed
    } else if entries.iter().any(|(s, _)| *s != ResponseStatus::NotAttempted) {
        ResponseStatus::Attempted
    } else {
        ResponseStatus::NotAttempted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseType, Cardinality, Scalar};
    use crate::registry::TypeRegistry;
    use crate::variable::VariableSpec;

    fn choice(id: &str, cardinality: Cardinality, max_choices: u32) -> Variable {
        let spec = VariableSpec::response(id.parse().unwrap(), cardinality, BaseType::Identifier)
            .with_max_choices(max_choices)
            .with_interaction(InteractionType::Choice);
        Variable::create(spec, &TypeRegistry::new()).unwrap()
    }

    fn select(var: &mut Variable, ids: &[&str]) {
        let value = Value::list(ids.iter().map(|s| Scalar::Identifier(s.to_string())));
        var.set_value(Some(value), &TypeRegistry::new()).unwrap();
    }

    #[test]
    fn single_choice_goes_straight_to_completed() {
        let mut var = choice("item1.RESP", Cardinality::Single, 1);
        assert_eq!(response_status(&var), ResponseStatus::NotAttempted);
        var.set_value(Some(Scalar::Identifier("A".into()).into()), &TypeRegistry::new())
            .unwrap();
        assert_eq!(response_status(&var), ResponseStatus::Completed);
    }

    #[test]
    fn multiple_choice_counts_against_max_choices() {
        let mut var = choice("item1.RESP", Cardinality::Multiple, 3);
        select(&mut var, &["A"]);
        assert_eq!(response_status(&var), ResponseStatus::Attempted);
        select(&mut var, &["A", "B", "C"]);
        assert_eq!(response_status(&var), ResponseStatus::Completed);
        select(&mut var, &[]);
        assert_eq!(response_status(&var), ResponseStatus::NotAttempted);
    }

    #[test]
    fn unbounded_uses_answer_length() {
        let mut var = choice("item1.RESP", Cardinality::Multiple, 0);
        select(&mut var, &["A", "B"]);
        assert_eq!(count_responses(&var), ResponseCount { found: 2, all: 2 });
        assert_eq!(response_status(&var), ResponseStatus::Completed);
    }

    #[test]
    fn default_elements_do_not_count() {
        let spec = VariableSpec::response(
            "item1.ORDER".parse().unwrap(),
            Cardinality::Ordered,
            BaseType::Identifier,
        )
        .with_default(Value::list([
            Scalar::Identifier("A".into()),
            Scalar::Identifier("B".into()),
        ]));
        let mut var = Variable::create(spec, &TypeRegistry::new()).unwrap();
        assert_eq!(response_status(&var), ResponseStatus::NotAttempted);
        select(&mut var, &["B", "C"]);
        assert_eq!(count_responses(&var), ResponseCount { found: 1, all: 2 });
        assert_eq!(response_status(&var), ResponseStatus::Attempted);
    }

    #[test]
    fn single_equal_to_default_is_untouched() {
        let spec = VariableSpec::response(
            "item1.R".parse().unwrap(),
            Cardinality::Single,
            BaseType::Integer,
        )
        .with_default(Scalar::Integer(5));
        let mut var = Variable::create(spec, &TypeRegistry::new()).unwrap();
        assert_eq!(response_status(&var), ResponseStatus::NotAttempted);
        var.set_value(Some(Scalar::Integer(6).into()), &TypeRegistry::new())
            .unwrap();
        assert_eq!(response_status(&var), ResponseStatus::Completed);
    }

    #[test]
    fn aggregate_rules() {
        let mut a = choice("item1.A", Cardinality::Single, 1);
        let mut b = choice("item1.B", Cardinality::Multiple, 0);
        assert_eq!(aggregate_status([&a, &b]), ResponseStatus::NotAttempted);

        a.set_value(Some(Scalar::Identifier("X".into()).into()), &TypeRegistry::new())
            .unwrap();
        assert_eq!(aggregate_status([&a, &b]), ResponseStatus::Attempted);

        select(&mut b, &["Y"]);
        assert_eq!(aggregate_status([&a, &b]), ResponseStatus::Completed);
    }

    #[test]
    fn multi_choice_blocks_lenient_completion() {
        let mut a = choice("item1.A", Cardinality::Single, 1);
        let mut b = choice("item1.B", Cardinality::Multiple, 3);
        a.set_value(Some(Scalar::Identifier("X".into()).into()), &TypeRegistry::new())
            .unwrap();
        select(&mut b, &["Y"]);
        assert_eq!(aggregate_status([&a, &b]), ResponseStatus::Attempted);
        select(&mut b, &["Y", "Z", "W"]);
        assert_eq!(aggregate_status([&a, &b]), ResponseStatus::Completed);
    }

    #[test]
    fn empty_item_is_not_attempted() {
        assert_eq!(aggregate_status(std::iter::empty()), ResponseStatus::NotAttempted);
        assert_eq!(ResponseStatus::NotAttempted.to_string(), "");
        assert_eq!(ResponseStatus::Completed.to_string(), "completed");
    }
}
