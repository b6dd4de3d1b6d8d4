//! Shared helper functions for CLI commands.

use crate::annotator::is_reserved_field;
use crate::models::ClassDetails;

/// Truncate a string to `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `KEY=VALUE` pair for pass-through annotator parameters.
/// Keys owned by a named option or by the request itself are rejected.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    if is_reserved_field(key) {
        return Err(format!(
            "'{}' cannot be set with --param; use its own flag",
            key
        ));
    }
    Ok((key.to_string(), value.to_string()))
}

/// One tab-separated line describing a resolved class.
pub fn format_class_line(document: usize, details: &ClassDetails) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        document,
        details.id,
        details.pref_label.as_deref().unwrap_or("-"),
        details.ontology_acronym().unwrap_or("-"),
        details
            .distance
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassLinks;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Amyotrophic lateral sclerosis", 10), "Amyotro...");
        assert_eq!(truncate("é".repeat(12).as_str(), 5), "éé...");
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("display_links=false"),
            Ok(("display_links".to_string(), "false".to_string()))
        );
        assert_eq!(
            parse_key_value("a=b=c"),
            Ok(("a".to_string(), "b=c".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("longest_only=false").is_err());
        assert!(parse_key_value("apikey=other").is_err());
    }

    #[test]
    fn test_format_class_line() {
        let details = ClassDetails {
            id: "http://purl.bioontology.org/ontology/MESH/D000690".to_string(),
            pref_label: Some("Amyotrophic Lateral Sclerosis".to_string()),
            links: ClassLinks {
                self_link: None,
                ontology: Some("http://data.bioontology.org/ontologies/MESH".to_string()),
            },
            distance: Some(1),
        };
        assert_eq!(
            format_class_line(2, &details),
            "2\thttp://purl.bioontology.org/ontology/MESH/D000690\tAmyotrophic Lateral Sclerosis\tMESH\t1"
        );
    }
}
