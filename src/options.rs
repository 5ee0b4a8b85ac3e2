//! Per-field conversion options.

use crate::format::FormatSpec;

/// Options attached to one column when a record type registers its fields.
///
/// Setters return `&mut Self` so a registration reads as one statement:
///
/// ```ignore
/// schema
///     .column("birthday", |p| &p.birthday, |p| &mut p.birthday)
///     .time_layout("%Y-%m-%d")
///     .time_zone("Europe/Paris");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    null: Option<String>,
    format: Option<FormatSpec>,
    time_layout: Option<String>,
    time_zone: Option<String>,
    separator: Option<String>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text that stands for an absent value in an `Option` field.
    pub fn null(&mut self, token: impl Into<String>) -> &mut Self {
        self.null = Some(token.into());
        self
    }

    /// printf-style pattern used when rendering the value (or each list
    /// element).
    pub fn format(&mut self, spec: &str) -> &mut Self {
        self.format = Some(FormatSpec::parse(spec));
        self
    }

    /// chrono strftime pattern for timestamp fields.
    pub fn time_layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.time_layout = Some(layout.into());
        self
    }

    /// IANA zone name, only consulted together with a time layout.
    pub fn time_zone(&mut self, zone: impl Into<String>) -> &mut Self {
        self.time_zone = Some(zone.into());
        self
    }

    /// Joins and splits list fields. An empty separator means one element per
    /// character.
    pub fn separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn null_token(&self) -> Option<&str> {
        self.null.as_deref()
    }

    pub fn format_spec(&self) -> Option<&FormatSpec> {
        self.format.as_ref()
    }

    pub fn layout(&self) -> Option<&str> {
        self.time_layout.as_deref()
    }

    pub fn zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    pub fn list_separator(&self) -> &str {
        self.separator.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_chain_and_getters_default() {
        let mut options = FieldOptions::new();
        assert_eq!(options.null_token(), None);
        assert_eq!(options.list_separator(), "");

        options.null("NULL").separator(";").time_layout("%Y").time_zone("UTC");
        assert_eq!(options.null_token(), Some("NULL"));
        assert_eq!(options.list_separator(), ";");
        assert_eq!(options.layout(), Some("%Y"));
        assert_eq!(options.zone(), Some("UTC"));
        assert!(options.format_spec().is_none());

        options.format("%.2f");
        assert_eq!(options.format_spec().map(FormatSpec::as_str), Some("%.2f"));
    }
}
