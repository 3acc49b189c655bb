use std::time::Duration;

use super::types::PositiveUsize;
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::VisualDescriptor;
use crate::summary::TimeWindow;

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

pub(super) fn parse_visual(s: &str) -> AppResult<VisualDescriptor> {
    s.parse::<VisualDescriptor>().map_err(AppError::from)
}

pub(super) fn parse_time_window(s: &str) -> AppResult<TimeWindow> {
    s.parse::<TimeWindow>().map_err(AppError::from)
}

pub(super) fn parse_page_load_ms(s: &str) -> AppResult<f64> {
    parse_duration_ms(s, "page load time")
}

pub(super) fn parse_render_ms(s: &str) -> AppResult<f64> {
    parse_duration_ms(s, "render time")
}

fn parse_duration_ms(s: &str, field: &'static str) -> AppResult<f64> {
    let invalid = || {
        AppError::validation(ValidationError::InvalidDurationMs {
            field,
            value: s.to_owned(),
        })
    };
    let value: f64 = s.trim().parse().map_err(|_err| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

pub(crate) fn parse_report_name(s: &str) -> AppResult<String> {
    let name = s.trim();
    if name.is_empty() {
        return Err(AppError::validation(ValidationError::EmptyReportName));
    }
    Ok(name.to_owned())
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

/// Parses `<number>[ms|s|m|h]`; a bare number is seconds.
///
/// # Errors
///
/// Returns an error for empty, malformed, overflowing, or zero durations.
pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
