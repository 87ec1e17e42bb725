use crate::error::ValidationError;

pub(super) fn parse_non_negative_seconds(s: &str) -> Result<f64, ValidationError> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber {
            value: s.to_owned(),
            source: err,
        })?;
    if value < 0.0 || !value.is_finite() {
        return Err(ValidationError::NegativeNumber {
            value: s.to_owned(),
        });
    }
    Ok(value)
}

pub(super) fn parse_positive_seconds(s: &str) -> Result<f64, ValidationError> {
    let value = parse_non_negative_seconds(s)?;
    if value == 0.0 {
        return Err(ValidationError::IntervalZero);
    }
    Ok(value)
}

pub(super) fn parse_bool_env(s: &str) -> Result<bool, ValidationError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" | "" => Ok(false),
        _ => Err(ValidationError::Message(format!(
            "Invalid boolean '{}'. Expected true/false, yes/no, on/off, or 1/0.",
            s
        ))),
    }
}
