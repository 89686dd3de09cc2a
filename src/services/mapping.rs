use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{error, info};

use crate::clients::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{MappingRule, NewSheetMappingTemplate, SheetMapping, SheetMappingTemplate};

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+(.)?").expect("separator pattern is valid"));

/// `"Order Date"` → `"orderDate"`: separator runs are dropped and the next
/// character upper-cased, then the first character is lower-cased.
pub fn to_camel_case(source: &str) -> String {
    let joined = SEPARATORS.replace_all(source, |caps: &Captures| {
        caps.get(1)
            .map(|c| c.as_str().to_uppercase())
            .unwrap_or_default()
    });

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One empty rule per source column.
pub fn default_mapping(source_columns: &[String]) -> SheetMapping {
    SheetMapping {
        mappings: source_columns.iter().map(MappingRule::unmapped).collect(),
        ignore_unmapped: false,
    }
}

/// Appends an empty rule for every live column the mapping does not cover.
/// Existing rules are kept as they are.
pub fn reconcile(mut mapping: SheetMapping, source_columns: &[String]) -> SheetMapping {
    for column in source_columns {
        if !mapping.mappings.iter().any(|m| &m.source == column) {
            mapping.mappings.push(MappingRule::unmapped(column.clone()));
        }
    }
    mapping
}

/// Mapping rules of one sheet being edited, plus the templates on offer.
#[derive(Debug, Clone)]
pub struct MappingEditor {
    sheet_id: i64,
    source_columns: Vec<String>,
    mapping: SheetMapping,
    templates: Vec<SheetMappingTemplate>,
    load_error: Option<String>,
}

impl MappingEditor {
    pub fn from_parts(
        sheet_id: i64,
        source_columns: Vec<String>,
        mapping: Option<SheetMapping>,
        templates: Vec<SheetMappingTemplate>,
    ) -> Self {
        let mapping = match mapping {
            Some(m) => reconcile(m, &source_columns),
            None => default_mapping(&source_columns),
        };
        Self {
            sheet_id,
            source_columns,
            mapping,
            templates,
            load_error: None,
        }
    }

    /// Fetches the sheet's mapping and the template list side by side. A
    /// failed load falls back to the default ruleset; the error is kept.
    pub async fn load(api: &ApiClient, sheet_id: i64, source_columns: Vec<String>) -> Self {
        let (mapping, templates) = tokio::join!(api.get_mapping(sheet_id), api.list_templates());

        let mut load_error = None;
        let mapping = mapping.unwrap_or_else(|e| {
            error!("Failed to load mapping for sheet {}: {}", sheet_id, e);
            load_error = Some(e.to_string());
            None
        });
        let templates = templates.unwrap_or_else(|e| {
            error!("Failed to load mapping templates: {}", e);
            if load_error.is_none() {
                load_error = Some(e.to_string());
            }
            Vec::new()
        });

        let mut editor = Self::from_parts(sheet_id, source_columns, mapping, templates);
        editor.load_error = load_error;
        editor
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    pub fn mapping(&self) -> &SheetMapping {
        &self.mapping
    }

    pub fn templates(&self) -> &[SheetMappingTemplate] {
        &self.templates
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Fills every empty destination from its source name. Returns how many
    /// rules were filled.
    pub fn auto_fill(&mut self) -> usize {
        let mut filled = 0;
        for rule in self.mapping.mappings.iter_mut().filter(|r| r.destination.is_empty()) {
            rule.destination = to_camel_case(&rule.source);
            filled += 1;
        }
        filled
    }

    pub fn set_destination(&mut self, source: &str, destination: &str) -> Result<()> {
        let rule = self
            .mapping
            .mappings
            .iter_mut()
            .find(|r| r.source == source)
            .ok_or_else(|| AppError::InvalidInput(format!("no rule for column {}", source)))?;
        rule.destination = destination.trim().to_string();
        Ok(())
    }

    pub fn set_ignore_unmapped(&mut self, ignore: bool) {
        self.mapping.ignore_unmapped = ignore;
    }

    pub fn reset_to_default(&mut self) {
        self.mapping = default_mapping(&self.source_columns);
    }

    pub fn find_template(&self, name_or_id: &str) -> Option<&SheetMappingTemplate> {
        let id = name_or_id.parse::<i64>().ok();
        self.templates
            .iter()
            .find(|t| Some(t.id) == id || t.name == name_or_id)
    }

    /// Template payload for the current rules. Name uniqueness is the
    /// backend's call; only a blank name is refused here.
    pub fn new_template(&self, name: &str, description: Option<&str>) -> Result<NewSheetMappingTemplate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("template name is required".to_string()));
        }
        Ok(NewSheetMappingTemplate {
            name: name.to_string(),
            description: description.map(str::to_string).filter(|d| !d.trim().is_empty()),
            mapping_definition: self.mapping.clone(),
        })
    }

    pub async fn save_as_template(
        &mut self,
        api: &ApiClient,
        name: &str,
        description: Option<&str>,
    ) -> Result<SheetMappingTemplate> {
        let template = self.new_template(name, description)?;
        let created = api.create_template(&template).await?;
        info!("Saved mapping template {} ({})", created.name, created.id);
        self.templates.push(created.clone());
        Ok(created)
    }

    /// The backend's answer replaces the local rules; nothing is merged.
    pub async fn apply_template(&mut self, api: &ApiClient, template_id: i64) -> Result<()> {
        let mapping = api.apply_template(self.sheet_id, template_id).await?;
        info!("Applied template {} to sheet {}", template_id, self.sheet_id);
        self.mapping = mapping;
        Ok(())
    }

    pub async fn save(&self, api: &ApiClient) -> Result<SheetMapping> {
        let saved = api.save_mapping(self.sheet_id, &self.mapping).await?;
        info!("Saved mapping for sheet {}", self.sheet_id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn camel_case_examples() {
        assert_eq!(to_camel_case("Order Date"), "orderDate");
        assert_eq!(to_camel_case("customer_id"), "customerId");
        assert_eq!(to_camel_case("  Total (EUR) "), "totalEUR");
        assert_eq!(to_camel_case("ID"), "iD");
        assert_eq!(to_camel_case("2024 sales"), "2024Sales");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn missing_live_column_is_appended_empty() {
        let loaded = SheetMapping {
            mappings: vec![MappingRule { source: "A".into(), destination: "alpha".into() }],
            ignore_unmapped: true,
        };
        let editor = MappingEditor::from_parts(1, cols(&["A", "Z"]), Some(loaded), Vec::new());
        assert_eq!(
            editor.mapping().mappings,
            vec![
                MappingRule { source: "A".into(), destination: "alpha".into() },
                MappingRule::unmapped("Z"),
            ]
        );
        assert!(editor.mapping().ignore_unmapped);
    }

    #[test]
    fn rules_for_vanished_columns_are_kept() {
        let loaded = SheetMapping {
            mappings: vec![MappingRule { source: "Old".into(), destination: "old".into() }],
            ignore_unmapped: false,
        };
        let editor = MappingEditor::from_parts(1, cols(&["New"]), Some(loaded), Vec::new());
        assert_eq!(editor.mapping().mappings.len(), 2);
    }

    #[test]
    fn absent_mapping_becomes_default_ruleset() {
        let editor = MappingEditor::from_parts(1, cols(&["A", "B"]), None, Vec::new());
        assert_eq!(editor.mapping(), &default_mapping(&cols(&["A", "B"])));
    }

    #[test]
    fn auto_fill_only_touches_empty_destinations() {
        let loaded = SheetMapping {
            mappings: vec![
                MappingRule { source: "Order Date".into(), destination: String::new() },
                MappingRule { source: "Keep Me".into(), destination: "foo".into() },
            ],
            ignore_unmapped: false,
        };
        let mut editor = MappingEditor::from_parts(1, Vec::new(), Some(loaded), Vec::new());
        assert_eq!(editor.auto_fill(), 1);
        assert_eq!(editor.mapping().mappings[0].destination, "orderDate");
        assert_eq!(editor.mapping().mappings[1].destination, "foo");
    }

    #[test]
    fn blank_template_name_is_refused_locally() {
        let editor = MappingEditor::from_parts(1, cols(&["A"]), None, Vec::new());
        assert!(matches!(editor.new_template("   ", None), Err(AppError::InvalidInput(_))));
        let template = editor.new_template(" Monthly ", Some("")).unwrap();
        assert_eq!(template.name, "Monthly");
        assert_eq!(template.description, None);
    }

    #[test]
    fn set_destination_requires_known_source() {
        let mut editor = MappingEditor::from_parts(1, cols(&["A"]), None, Vec::new());
        editor.set_destination("A", " alpha ").unwrap();
        assert_eq!(editor.mapping().mappings[0].destination, "alpha");
        assert!(editor.set_destination("B", "beta").is_err());
    }

    #[test]
    fn templates_are_found_by_id_or_name() {
        let template = SheetMappingTemplate {
            id: 4,
            name: "Sales".into(),
            description: None,
            mapping_definition_json: "{}".into(),
        };
        let editor = MappingEditor::from_parts(1, Vec::new(), None, vec![template]);
        assert_eq!(editor.find_template("4").map(|t| t.id), Some(4));
        assert_eq!(editor.find_template("Sales").map(|t| t.id), Some(4));
        assert!(editor.find_template("Other").is_none());
    }
}
