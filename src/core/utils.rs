use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use super::{
    models::{
        Percent,
        Position,
    },
    PointLearnError,
};

/// Stable key used to match catalog words against stored progress.
pub fn word_key(word: &str) -> String {
    word.trim().to_lowercase()
}

/// "washing machine" -> "Washing machine"
pub fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// "washing machine" -> "Washing Machine"
pub fn capitalize_tokens(word: &str) -> String {
    word.split(' ').map(capitalize_first).collect::<Vec<_>>().join(" ")
}

/// Recovers the spoken word from an asset reference such as `audio/washing_machine.MP3`.
pub fn word_from_reference(reference: &str) -> String {
    let file_name = reference.rsplit(['/', '\\']).next().unwrap_or(reference);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    stem.replace('_', " ").trim().to_string()
}

/// A raw coordinate as authored: either a number or a string such as `"30.07%"`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

impl From<f64> for RawCoordinate {
    fn from(value: f64) -> Self {
        RawCoordinate::Number(value)
    }
}

impl From<&str> for RawCoordinate {
    fn from(value: &str) -> Self {
        RawCoordinate::Text(value.to_string())
    }
}

fn percentage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*%?\s*$").expect("static regex is valid")
    })
}

/// Parses a raw coordinate into a number, `None` when it is not numeric.
pub fn parse_coordinate(raw: &RawCoordinate) -> Option<f64> {
    match raw {
        RawCoordinate::Number(value) if value.is_finite() => Some(*value),
        RawCoordinate::Number(_) => None,
        RawCoordinate::Text(text) => {
            percentage_regex().captures(text).and_then(|captures| captures[1].parse::<f64>().ok())
        }
    }
}

/// Turns an authored position into a valid one.
///
/// A non-numeric axis becomes 50 on its own. If either axis is numeric but outside
/// `[0, 100]` the whole position falls back to the centre. Both cases log a warning.
pub fn sanitize_position(word: &str, x: &RawCoordinate, y: &RawCoordinate) -> Position {
    let parsed_x = parse_coordinate(x);
    let parsed_y = parse_coordinate(y);

    if parsed_x.is_none() || parsed_y.is_none() {
        warn!("Unparseable hotspot position for {}: x={:?}, y={:?}", word, x, y);
    }

    let x_value = parsed_x.unwrap_or(Percent::MIDPOINT.value());
    let y_value = parsed_y.unwrap_or(Percent::MIDPOINT.value());

    match (Percent::new(x_value), Percent::new(y_value)) {
        (Some(x), Some(y)) => Position { x, y },
        _ => {
            warn!(
                "Invalid hotspot position for {}: x={}%, y={}%, using centre",
                word, x_value, y_value
            );
            Position::CENTER
        }
    }
}

/// Parses `"1200x1600"` into `(1200.0, 1600.0)`.
pub fn parse_size(text: &str) -> Result<(f64, f64), PointLearnError> {
    let (width, height) = text
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| PointLearnError::InvalidSize(text.to_string()))?;

    let width: f64 =
        width.trim().parse().map_err(|_| PointLearnError::InvalidSize(text.to_string()))?;
    let height: f64 =
        height.trim().parse().map_err(|_| PointLearnError::InvalidSize(text.to_string()))?;

    if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
        return Err(PointLearnError::InvalidSize(text.to_string()));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logging::capture::capture_logs;

    #[test]
    fn test_word_key() {
        assert_eq!(word_key("  Washing Machine "), "washing machine");
        assert_eq!(word_key("oven"), "oven");
    }

    #[test]
    fn test_capitalization() {
        assert_eq!(capitalize_first("washing MACHINE"), "Washing machine");
        assert_eq!(capitalize_tokens("dirty coffee"), "Dirty Coffee");
        assert_eq!(capitalize_tokens(""), "");
    }

    #[test]
    fn test_word_from_reference() {
        assert_eq!(word_from_reference("src/assets/audio/washing_machine.MP3"), "washing machine");
        assert_eq!(word_from_reference("Bench.mp3"), "Bench");
        assert_eq!(word_from_reference("audio\\tray_table.mp3"), "tray table");
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(&"30.07%".into()), Some(30.07));
        assert_eq!(parse_coordinate(&" 12 ".into()), Some(12.0));
        assert_eq!(parse_coordinate(&"-10%".into()), Some(-10.0));
        assert_eq!(parse_coordinate(&"abc".into()), None);
        assert_eq!(parse_coordinate(&RawCoordinate::Number(44.5)), Some(44.5));
        assert_eq!(parse_coordinate(&RawCoordinate::Number(f64::NAN)), None);
    }

    #[test]
    fn test_out_of_range_position_falls_back_to_centre() {
        let (position, logs) =
            capture_logs(|| sanitize_position("oven", &"150%".into(), &"-10%".into()));
        assert_eq!(position, Position::CENTER);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Invalid hotspot position for oven"));

        let position = sanitize_position("oven", &"30%".into(), &"101%".into());
        assert_eq!(position, Position::CENTER);
    }

    #[test]
    fn test_valid_and_partial_positions() {
        let (position, logs) =
            capture_logs(|| sanitize_position("oven", &"30.07%".into(), &"27.50%".into()));
        assert!(logs.is_empty());
        assert_eq!(position.x.value(), 30.07);
        assert_eq!(position.y.value(), 27.5);

        let position = sanitize_position("oven", &"n/a".into(), &"20%".into());
        assert_eq!(position.x.value(), 50.0);
        assert_eq!(position.y.value(), 20.0);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1200x1600").unwrap(), (1200.0, 1600.0));
        assert_eq!(parse_size("600 X 1000").unwrap(), (600.0, 1000.0));
        assert!(parse_size("600").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("axb").is_err());
    }
}
