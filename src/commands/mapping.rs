use clap::{Args, Subcommand};

use super::{find_sheet, AppState};
use crate::error::{AppError, Result};
use crate::models::SheetMapping;
use crate::services::MappingEditor;

#[derive(Args)]
pub struct SheetArgs {
    pub file_id: i64,
    /// Sheet id, defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<i64>,
}

#[derive(Subcommand)]
pub enum MappingCommand {
    /// Print the current rules
    Show(SheetArgs),
    /// Change rules and save them
    Edit {
        #[command(flatten)]
        target: SheetArgs,
        /// Fill empty destinations from the column names
        #[arg(long)]
        auto_fill: bool,
        /// `SOURCE=destination`, repeatable
        #[arg(long = "map", value_name = "SOURCE=DEST")]
        maps: Vec<String>,
        #[arg(long, conflicts_with = "keep_unmapped")]
        ignore_unmapped: bool,
        #[arg(long)]
        keep_unmapped: bool,
        /// Start over from the empty default ruleset
        #[arg(long)]
        reset: bool,
    },
    /// Replace the rules with a template's
    Apply {
        #[command(flatten)]
        target: SheetArgs,
        /// Template id or name
        template: String,
    },
}

#[derive(Subcommand)]
pub enum TemplatesCommand {
    List,
    /// Save a sheet's current rules as a template
    Create {
        #[command(flatten)]
        source: SheetArgs,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

fn print_mapping(mapping: &SheetMapping) {
    let width = mapping.mappings.iter().map(|r| r.source.chars().count()).max().unwrap_or(0);
    for rule in &mapping.mappings {
        let destination = if rule.destination.is_empty() { "(unmapped)" } else { rule.destination.as_str() };
        println!("  {:<width$} -> {}", rule.source, destination, width = width);
    }
    println!("  ignore unmapped columns: {}", mapping.ignore_unmapped);
}

async fn open_editor(state: &AppState, target: &SheetArgs) -> Result<MappingEditor> {
    let api = state.authed()?;
    let sheet = find_sheet(api, target.file_id, target.sheet).await?;
    let editor = MappingEditor::load(api, sheet.id, sheet.headers()).await;
    if let Some(err) = editor.load_error() {
        println!("Could not load everything ({}), starting from defaults", err);
    }
    println!("Mapping of sheet {} ({})", sheet.sheet_name, sheet.id);
    Ok(editor)
}

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(source, destination)| (source.trim(), destination.trim()))
        .ok_or_else(|| AppError::InvalidInput(format!("expected SOURCE=DEST, got {}", raw)))
}

pub async fn run(state: &AppState, command: MappingCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        MappingCommand::Show(target) => {
            let editor = open_editor(state, &target).await?;
            print_mapping(editor.mapping());
        }
        MappingCommand::Edit {
            target,
            auto_fill,
            maps,
            ignore_unmapped,
            keep_unmapped,
            reset,
        } => {
            let mut editor = open_editor(state, &target).await?;
            if reset {
                editor.reset_to_default();
            }
            for raw in &maps {
                let (source, destination) = split_assignment(raw)?;
                editor.set_destination(source, destination)?;
            }
            if auto_fill {
                let filled = editor.auto_fill();
                println!("Filled {} destinations", filled);
            }
            if ignore_unmapped || keep_unmapped {
                editor.set_ignore_unmapped(ignore_unmapped);
            }
            let saved = editor.save(api).await?;
            println!("Saved");
            print_mapping(&saved);
        }
        MappingCommand::Apply { target, template } => {
            let mut editor = open_editor(state, &target).await?;
            let template_id = editor
                .find_template(&template)
                .map(|t| t.id)
                .ok_or_else(|| AppError::NotFound(format!("template {}", template)))?;
            editor.apply_template(api, template_id).await?;
            print_mapping(editor.mapping());
        }
    }
    Ok(())
}

pub async fn run_templates(state: &AppState, command: TemplatesCommand) -> Result<()> {
    let api = state.authed()?;
    match command {
        TemplatesCommand::List => {
            let templates = api.list_templates().await?;
            if templates.is_empty() {
                println!("No templates yet");
            }
            for template in templates {
                let rules = template.definition().map(|d| d.mappings.len()).unwrap_or(0);
                println!(
                    "{:>5}  {:<24}  {:>3} rules  {}",
                    template.id,
                    template.name,
                    rules,
                    template.description.as_deref().unwrap_or("")
                );
            }
        }
        TemplatesCommand::Create { source, name, description } => {
            let mut editor = open_editor(state, &source).await?;
            let created = editor.save_as_template(api, &name, description.as_deref()).await?;
            println!("Template {} saved with id {}", created.name, created.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(split_assignment("Order Date = orderDate").unwrap(), ("Order Date", "orderDate"));
        assert_eq!(split_assignment("a=b=c").unwrap(), ("a", "b=c"));
        assert!(split_assignment("nothing").is_err());
    }
}
