//! Output formatting utilities

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Pretty JSON for a report
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Metres with one decimal, or kilometres past 10 km
pub fn format_length(metres: f64) -> String {
    if metres >= 10_000.0 {
        format!("{:.2} km", metres / 1000.0)
    } else {
        format!("{:.1} m", metres)
    }
}

/// Node ids joined with arrows
pub fn format_walk<T: std::fmt::Display>(nodes: &[T]) -> String {
    nodes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("whatever"), OutputFormat::Table);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(12.34), "12.3 m");
        assert_eq!(format_length(12_500.0), "12.50 km");
    }

    #[test]
    fn test_format_walk() {
        assert_eq!(format_walk(&[1, 2, 3]), "1 -> 2 -> 3");
        assert_eq!(format_walk::<u32>(&[]), "");
    }
}
