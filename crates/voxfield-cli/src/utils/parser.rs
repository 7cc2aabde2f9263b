use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Splits a `KEY=VALUE` override into its trimmed key and value.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignment(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }
    Ok((key, value))
}

/// Parses the value of an override.
pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses a comma-separated triplet such as `50,50,25`.
pub fn parse_triplet<T: FromStr + Copy>(key: &str, value: &str) -> Result<[T; 3], ParseError> {
    let invalid = || ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let parts = value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|part| part.trim().parse::<T>().map_err(|_| invalid()))
        .collect::<Result<Vec<T>, _>>()?;
    match parts.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_split_on_first_equals_sign() {
        assert_eq!(
            parse_assignment("compute.field = magnetic").unwrap(),
            ("compute.field", "magnetic")
        );
        assert_eq!(parse_assignment("a=b=c").unwrap(), ("a", "b=c"));
    }

    #[test]
    fn assignment_without_equals_or_parts_is_rejected() {
        assert_eq!(
            parse_assignment("compute.field").unwrap_err(),
            ParseError::InvalidAssignment("compute.field".to_string())
        );
        assert!(matches!(
            parse_assignment("=3").unwrap_err(),
            ParseError::EmptyComponent { component: "key", .. }
        ));
        assert!(matches!(
            parse_assignment("compute.chunk-size=").unwrap_err(),
            ParseError::EmptyComponent {
                component: "value",
                ..
            }
        ));
    }

    #[test]
    fn value_parse_failure_names_the_key() {
        assert_eq!(parse_value::<usize>("compute.max-workers", "4").unwrap(), 4);
        assert_eq!(
            parse_value::<usize>("compute.max-workers", "four").unwrap_err(),
            ParseError::InvalidValue {
                key: "compute.max-workers".to_string(),
                value: "four".to_string()
            }
        );
    }

    #[test]
    fn triplets_accept_optional_brackets() {
        assert_eq!(
            parse_triplet::<f64>("model.cell-size", "[50, 50, 25.5]").unwrap(),
            [50.0, 50.0, 25.5]
        );
        assert_eq!(
            parse_triplet::<usize>("model.dimensions", "4,5,6").unwrap(),
            [4, 5, 6]
        );
        assert!(parse_triplet::<usize>("model.dimensions", "4,5").is_err());
        assert!(parse_triplet::<f64>("model.origin", "1,x,3").is_err());
    }
}
