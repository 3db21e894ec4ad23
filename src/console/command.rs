//! Console command grammar.
//!
//! One line is one command. Node references (`<node>`) are resolved later by
//! the workspace: `#n`, a full id, or a unique label.
//!
//! ```text
//! add <label> [| <description> [| <parent>]]
//! edit <node> label|desc <text>
//! move <node> <x> <y>
//! settings key|model|max <value>
//! ```

use std::path::PathBuf;

use crate::settings::Model;

pub const HELP: &str = "\
Graph
  topic <name>                      start a new graph around a root topic
  add <label> [| desc [| parent]]   add a concept (parent: selected node, else root)
  edit <node> label|desc <text>     change a label or description
  rm <node>                         remove a node (its children stay, unattached)
  accept <node> / reject <node>     settle an AI suggestion
  move <node> <x> <y>               reposition a node
  select [<node>]                   select a node (no argument clears)
  undo / redo
AI
  expand [<node>]                   suggest related concepts (default: selected, else root)
  mece [<node>]                     check the children of a node for gaps and overlaps
  resources [<node>]                find learning resources
Sessions
  save / sessions / new
  load <#n|id> / delete <#n|id>
  export [<dir>]                    write {title}.json
View
  show [<node>|mece|suggestions]    graph overview with the open panel, one node,
                                    or open the MECE / suggestions panel
  settings [key <KEY>|model <name>|max <n>]
  help / quit

<node> is #n from `show`, a node id, or an exact label.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Label,
    Description,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowTarget {
    Graph,
    Node(String),
    Mece,
    Suggestions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    Show,
    /// Empty clears the stored key.
    ApiKey(String),
    Model(Model),
    MaxSuggestions(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Topic(String),
    Add { label: String, description: String, parent: Option<String> },
    Edit { node: String, field: EditField, value: String },
    Remove(String),
    Accept(String),
    Reject(String),
    Move { node: String, x: f64, y: f64 },
    Select(Option<String>),
    Expand(Option<String>),
    Mece(Option<String>),
    Resources(Option<String>),
    Undo,
    Redo,
    Save,
    Sessions,
    Load(String),
    Delete(String),
    New,
    Export(Option<PathBuf>),
    Show(ShowTarget),
    Settings(SettingsCommand),
    Help,
    Quit,
}

/// Parse one non-empty input line.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err("empty command".into()),
        "topic" => required(rest, "usage: topic <name>").map(Command::Topic),
        "add" => parse_add(rest),
        "edit" => parse_edit(rest),
        "rm" | "remove" => required(rest, "usage: rm <node>").map(Command::Remove),
        "accept" => required(rest, "usage: accept <node>").map(Command::Accept),
        "reject" => required(rest, "usage: reject <node>").map(Command::Reject),
        "move" => parse_move(rest),
        "select" => Ok(Command::Select(match rest {
            "" | "none" => None,
            r => Some(r.to_string()),
        })),
        "expand" => Ok(Command::Expand(optional(rest))),
        "mece" => Ok(Command::Mece(optional(rest))),
        "resources" | "res" => Ok(Command::Resources(optional(rest))),
        "undo" => no_args(rest, Command::Undo),
        "redo" => no_args(rest, Command::Redo),
        "save" => no_args(rest, Command::Save),
        "sessions" | "ls" => no_args(rest, Command::Sessions),
        "load" => required(rest, "usage: load <#n|id>").map(Command::Load),
        "delete" => required(rest, "usage: delete <#n|id>").map(Command::Delete),
        "new" => no_args(rest, Command::New),
        "export" => Ok(Command::Export(optional(rest).map(PathBuf::from))),
        "show" => Ok(Command::Show(match rest {
            "" => ShowTarget::Graph,
            r if r.eq_ignore_ascii_case("mece") => ShowTarget::Mece,
            r if r.eq_ignore_ascii_case("suggestions") => ShowTarget::Suggestions,
            r => ShowTarget::Node(r.to_string()),
        })),
        "settings" | "set" => parse_settings(rest).map(Command::Settings),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

fn parse_add(rest: &str) -> Result<Command, String> {
    let mut parts = rest.splitn(3, '|').map(str::trim);
    let label = parts.next().unwrap_or_default();
    if label.is_empty() {
        return Err("usage: add <label> [| description [| parent]]".into());
    }
    let description = parts.next().unwrap_or_default().to_string();
    let parent = parts.next().and_then(optional);
    Ok(Command::Add { label: label.to_string(), description, parent })
}

fn parse_edit(rest: &str) -> Result<Command, String> {
    const USAGE: &str = "usage: edit <node> label|desc <text>";
    // The node reference may itself contain spaces, so look for the field
    // keyword from the right.
    let words: Vec<&str> = rest.split_whitespace().collect();
    let at = words
        .iter()
        .rposition(|w| field_of(w).is_some())
        .filter(|&i| i > 0)
        .ok_or(USAGE)?;
    let field = field_of(words[at]).ok_or(USAGE)?;
    let value = words[at + 1..].join(" ");
    if field == EditField::Label && value.is_empty() {
        return Err("a label cannot be empty".into());
    }
    Ok(Command::Edit { node: words[..at].join(" "), field, value })
}

fn field_of(word: &str) -> Option<EditField> {
    match word.to_ascii_lowercase().as_str() {
        "label" => Some(EditField::Label),
        "desc" | "description" => Some(EditField::Description),
        _ => None,
    }
}

fn parse_move(rest: &str) -> Result<Command, String> {
    const USAGE: &str = "usage: move <node> <x> <y>";
    let mut words = rest.rsplitn(3, char::is_whitespace);
    let y = words.next().and_then(|w| w.parse::<f64>().ok());
    let x = words.next().and_then(|w| w.parse::<f64>().ok());
    let node = words.next().map(str::trim).filter(|n| !n.is_empty());
    match (node, x, y) {
        (Some(node), Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
            Ok(Command::Move { node: node.to_string(), x, y })
        }
        _ => Err(USAGE.into()),
    }
}

fn parse_settings(rest: &str) -> Result<SettingsCommand, String> {
    let (key, value) = match rest.split_once(char::is_whitespace) {
        Some((k, v)) => (k, v.trim()),
        None => (rest, ""),
    };
    match key.to_ascii_lowercase().as_str() {
        "" => Ok(SettingsCommand::Show),
        "key" => Ok(SettingsCommand::ApiKey(value.to_string())),
        "model" => value.parse::<Model>().map(SettingsCommand::Model),
        "max" => value
            .parse::<u32>()
            .map(SettingsCommand::MaxSuggestions)
            .map_err(|_| "usage: settings max <1-10>".to_string()),
        other => Err(format!("unknown setting: {other} (key, model, max)")),
    }
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    optional(rest).ok_or_else(|| usage.to_string())
}

fn optional(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn no_args(rest: &str, command: Command) -> Result<Command, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("unexpected argument: {rest}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands() {
        assert_eq!(parse("undo"), Ok(Command::Undo));
        assert_eq!(parse("  REDO "), Ok(Command::Redo));
        assert_eq!(parse("ls"), Ok(Command::Sessions));
        assert_eq!(parse("q"), Ok(Command::Quit));
        assert_eq!(parse("help"), Ok(Command::Help));
        assert!(parse("save now").is_err());
        assert!(parse("frobnicate").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn topic_keeps_the_whole_tail() {
        assert_eq!(parse("topic Product-Market Fit"), Ok(Command::Topic("Product-Market Fit".into())));
        assert!(parse("topic").is_err());
    }

    #[test]
    fn add_with_optional_description_and_parent() {
        assert_eq!(
            parse("add Anchoring"),
            Ok(Command::Add { label: "Anchoring".into(), description: String::new(), parent: None })
        );
        assert_eq!(
            parse("add Anchoring | First price seen | #2"),
            Ok(Command::Add {
                label: "Anchoring".into(),
                description: "First price seen".into(),
                parent: Some("#2".into()),
            })
        );
        assert_eq!(
            parse("add Decoy || Pricing"),
            Ok(Command::Add { label: "Decoy".into(), description: String::new(), parent: Some("Pricing".into()) })
        );
        assert!(parse("add | desc").is_err());
    }

    #[test]
    fn edit_splits_on_last_field_keyword() {
        assert_eq!(
            parse("edit Price Anchoring label Anchoring Effect"),
            Ok(Command::Edit {
                node: "Price Anchoring".into(),
                field: EditField::Label,
                value: "Anchoring Effect".into(),
            })
        );
        assert_eq!(
            parse("edit #3 desc"),
            Ok(Command::Edit { node: "#3".into(), field: EditField::Description, value: String::new() })
        );
        assert!(parse("edit #3 label").is_err());
        assert!(parse("edit label x").is_err());
        assert!(parse("edit #3").is_err());
    }

    #[test]
    fn move_takes_two_coordinates() {
        assert_eq!(
            parse("move Market Size 120 -40.5"),
            Ok(Command::Move { node: "Market Size".into(), x: 120.0, y: -40.5 })
        );
        assert!(parse("move #2 10").is_err());
        assert!(parse("move #2 ten 20").is_err());
        assert!(parse("move #2 NaN 20").is_err());
    }

    #[test]
    fn optional_node_targets() {
        assert_eq!(parse("expand"), Ok(Command::Expand(None)));
        assert_eq!(parse("expand #4"), Ok(Command::Expand(Some("#4".into()))));
        assert_eq!(parse("mece Pricing"), Ok(Command::Mece(Some("Pricing".into()))));
        assert_eq!(parse("res"), Ok(Command::Resources(None)));
        assert_eq!(parse("select"), Ok(Command::Select(None)));
        assert_eq!(parse("select none"), Ok(Command::Select(None)));
        assert_eq!(parse("select #1"), Ok(Command::Select(Some("#1".into()))));
    }

    #[test]
    fn show_targets() {
        assert_eq!(parse("show"), Ok(Command::Show(ShowTarget::Graph)));
        assert_eq!(parse("show MECE"), Ok(Command::Show(ShowTarget::Mece)));
        assert_eq!(parse("show suggestions"), Ok(Command::Show(ShowTarget::Suggestions)));
        assert_eq!(parse("show #2"), Ok(Command::Show(ShowTarget::Node("#2".into()))));
    }

    #[test]
    fn sessions_and_export() {
        assert_eq!(parse("load #1"), Ok(Command::Load("#1".into())));
        assert!(parse("delete").is_err());
        assert_eq!(parse("export"), Ok(Command::Export(None)));
        assert_eq!(parse("export /tmp/out"), Ok(Command::Export(Some(PathBuf::from("/tmp/out")))));
    }

    #[test]
    fn settings_subcommands() {
        assert_eq!(parse("settings"), Ok(Command::Settings(SettingsCommand::Show)));
        assert_eq!(
            parse("settings key sk-abc"),
            Ok(Command::Settings(SettingsCommand::ApiKey("sk-abc".into())))
        );
        assert_eq!(parse("settings key"), Ok(Command::Settings(SettingsCommand::ApiKey(String::new()))));
        assert_eq!(parse("set model gpt-4o"), Ok(Command::Settings(SettingsCommand::Model(Model::Gpt4o))));
        assert_eq!(parse("settings max 7"), Ok(Command::Settings(SettingsCommand::MaxSuggestions(7))));
        assert!(parse("settings model gpt-2").is_err());
        assert!(parse("settings max many").is_err());
        assert!(parse("settings colour blue").is_err());
    }
}
