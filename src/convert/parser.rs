//! PlantUML C4 source parsing
//!
//! Line-oriented: every meaningful line is a macro call such as
//! `Person(alias, "Label")` or `Rel(from, to, "Uses")`; boundary blocks
//! nest with braces. Preprocessor lines, comments and styling directives
//! carry no diagram content and are skipped.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::ConvertError;

/// C4 abstraction level of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Person,
    System,
    Container,
    Component,
}

/// Rendered outline of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Plain,
    Database,
    Queue,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub alias: String,
    pub label: String,
    /// Technology argument of Container/Component macros
    pub technology: Option<String>,
    pub kind: ElementKind,
    pub shape: Shape,
    pub external: bool,
    /// Index into `Diagram::boundaries` of the innermost enclosing boundary
    pub boundary: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Boundary {
    pub alias: String,
    pub label: String,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
    pub technology: Option<String>,
    pub bidirectional: bool,
}

#[derive(Debug, Default)]
pub struct Diagram {
    pub elements: Vec<Element>,
    pub boundaries: Vec<Boundary>,
    pub relations: Vec<Relation>,
}

/// What an alias was declared as
enum AliasTarget {
    Element(usize),
    Boundary(usize),
}

enum RelKind {
    Forward,
    Back,
    Bidirectional,
}

/// Parse C4 PlantUML source into a diagram model
pub fn parse(source: &str) -> Result<Diagram, ConvertError> {
    let mut diagram = Diagram::default();
    let mut aliases: HashMap<String, AliasTarget> = HashMap::new();
    // Stack of open boundary blocks (indices into diagram.boundaries)
    let mut stack: Vec<usize> = Vec::new();
    // Boundary declared without a same-line brace, waiting for "{"
    let mut pending_boundary: Option<usize> = None;
    let mut last_line = 0;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = raw.trim();

        if should_ignore(line) {
            continue;
        }

        if line == "{" {
            match pending_boundary.take() {
                Some(boundary) => stack.push(boundary),
                None => return Err(parse_err(line_no, "unexpected '{'")),
            }
            continue;
        }
        if let Some(boundary) = pending_boundary {
            let alias = &diagram.boundaries[boundary].alias;
            return Err(parse_err(
                line_no,
                &format!("expected '{{' to open boundary '{alias}'"),
            ));
        }
        if line == "}" {
            if stack.pop().is_none() {
                return Err(parse_err(line_no, "unmatched '}'"));
            }
            continue;
        }

        let Some(caps) = macro_re().captures(line) else {
            return Err(parse_err(line_no, &format!("unrecognized line '{line}'")));
        };
        let name = &caps["name"];
        let args = split_args(&caps["args"]);
        let opens_block = caps.name("brace").is_some();

        if let Some((kind, shape, external)) = element_kind(name) {
            let (alias, label) = alias_and_label(name, &args, line_no)?;
            register_alias(&mut aliases, &alias, AliasTarget::Element(diagram.elements.len()), line_no)?;
            let technology = match kind {
                ElementKind::Container | ElementKind::Component => args.get(2).cloned(),
                ElementKind::Person | ElementKind::System => None,
            };
            diagram.elements.push(Element {
                alias,
                label,
                technology,
                kind,
                shape,
                external,
                boundary: stack.last().copied(),
            });
        } else if is_boundary(name) {
            let (alias, label) = alias_and_label(name, &args, line_no)?;
            let boundary = diagram.boundaries.len();
            register_alias(&mut aliases, &alias, AliasTarget::Boundary(boundary), line_no)?;
            diagram.boundaries.push(Boundary {
                alias,
                label,
                parent: stack.last().copied(),
            });
            if opens_block {
                stack.push(boundary);
            } else {
                pending_boundary = Some(boundary);
            }
        } else if let Some(rel_kind) = relation_kind(name) {
            if args.len() < 2 {
                return Err(parse_err(
                    line_no,
                    &format!("{name} expects source and destination aliases"),
                ));
            }
            let mut from = resolve_element(&aliases, &args[0], line_no)?;
            let mut to = resolve_element(&aliases, &args[1], line_no)?;
            if matches!(rel_kind, RelKind::Back) {
                std::mem::swap(&mut from, &mut to);
            }
            diagram.relations.push(Relation {
                from,
                to,
                label: args.get(2).cloned().filter(|label| !label.is_empty()),
                technology: args.get(3).cloned().filter(|tech| !tech.is_empty()),
                bidirectional: matches!(rel_kind, RelKind::Bidirectional),
            });
        } else if is_cosmetic(name) {
            // Styling/tag/layout-hint macros carry no diagram content
        } else {
            return Err(parse_err(line_no, &format!("unknown directive '{name}'")));
        }
    }

    if let Some(boundary) = pending_boundary {
        let alias = &diagram.boundaries[boundary].alias;
        return Err(parse_err(
            last_line,
            &format!("expected '{{' to open boundary '{alias}'"),
        ));
    }
    if let Some(&open) = stack.last() {
        let alias = &diagram.boundaries[open].alias;
        return Err(parse_err(last_line, &format!("unclosed boundary '{alias}'")));
    }
    if diagram.elements.is_empty() {
        return Err(ConvertError::EmptyDiagram);
    }

    Ok(diagram)
}

fn parse_err(line: usize, message: &str) -> ConvertError {
    ConvertError::Parse {
        line,
        message: message.to_string(),
    }
}

fn macro_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<args>.*)\)\s*(?P<brace>\{)?\s*$")
            .expect("macro regex is valid")
    })
}

/// Lines without diagram content: blanks, comments, preprocessor
/// directives, titles and global layout switches
fn should_ignore(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('\'')
        || line.starts_with("/'")
        || line.starts_with('@')
        || line.starts_with('!')
        || line.starts_with("title")
        || line.starts_with("caption")
        || line.starts_with("scale")
        || line.starts_with("skinparam")
        || line.starts_with("LAYOUT_")
        || line.starts_with("SHOW_")
        || line.starts_with("HIDE_")
}

/// Element macro name -> (kind, shape, external)
fn element_kind(name: &str) -> Option<(ElementKind, Shape, bool)> {
    let external = name.ends_with("_Ext");
    let base = name.strip_suffix("_Ext").unwrap_or(name);
    let (kind, shape) = match base {
        "Person" => (ElementKind::Person, Shape::Plain),
        "System" => (ElementKind::System, Shape::Plain),
        "SystemDb" => (ElementKind::System, Shape::Database),
        "SystemQueue" => (ElementKind::System, Shape::Queue),
        "Container" => (ElementKind::Container, Shape::Plain),
        "ContainerDb" => (ElementKind::Container, Shape::Database),
        "ContainerQueue" => (ElementKind::Container, Shape::Queue),
        "Component" => (ElementKind::Component, Shape::Plain),
        "ComponentDb" => (ElementKind::Component, Shape::Database),
        "ComponentQueue" => (ElementKind::Component, Shape::Queue),
        _ => return None,
    };
    Some((kind, shape, external))
}

fn is_boundary(name: &str) -> bool {
    matches!(
        name,
        "Boundary" | "System_Boundary" | "Container_Boundary" | "Enterprise_Boundary"
    )
}

fn relation_kind(name: &str) -> Option<RelKind> {
    if name == "Rel_Back" || name == "Rel_Back_Neighbor" {
        return Some(RelKind::Back);
    }
    if name == "BiRel" || name.starts_with("BiRel_") {
        return Some(RelKind::Bidirectional);
    }
    if name == "Rel" || name.starts_with("Rel_") {
        return Some(RelKind::Forward);
    }
    None
}

/// Macros that only affect styling or layout hints, never the model
fn is_cosmetic(name: &str) -> bool {
    name.starts_with("AddElementTag")
        || name.starts_with("AddRelTag")
        || name.starts_with("AddBoundaryTag")
        || name.starts_with("UpdateElementStyle")
        || name.starts_with("UpdateRelStyle")
        || name.starts_with("UpdateBoundaryStyle")
        || name.starts_with("Lay_")
        || name == "SetPropertyHeader"
        || name == "WithoutPropertyHeader"
        || name == "AddProperty"
}

fn alias_and_label(
    name: &str,
    args: &[String],
    line_no: usize,
) -> Result<(String, String), ConvertError> {
    let Some(alias) = args.first().filter(|alias| !alias.is_empty()) else {
        return Err(parse_err(line_no, &format!("{name} expects an alias")));
    };
    // A missing label falls back to the alias, matching PlantUML's rendering
    let label = args
        .get(1)
        .filter(|label| !label.is_empty())
        .unwrap_or(alias);
    Ok((alias.clone(), label.clone()))
}

fn register_alias(
    aliases: &mut HashMap<String, AliasTarget>,
    alias: &str,
    target: AliasTarget,
    line_no: usize,
) -> Result<(), ConvertError> {
    if aliases.insert(alias.to_string(), target).is_some() {
        return Err(parse_err(line_no, &format!("duplicate alias '{alias}'")));
    }
    Ok(())
}

fn resolve_element(
    aliases: &HashMap<String, AliasTarget>,
    alias: &str,
    line_no: usize,
) -> Result<usize, ConvertError> {
    match aliases.get(alias) {
        Some(AliasTarget::Element(index)) => Ok(*index),
        Some(AliasTarget::Boundary(_)) => Err(parse_err(
            line_no,
            &format!("relation endpoint '{alias}' is a boundary, not an element"),
        )),
        None => Err(parse_err(
            line_no,
            &format!("relation references undeclared element '{alias}'"),
        )),
    }
}

/// Split macro arguments on top-level commas, respecting quotes and
/// nested parentheses, then strip surrounding quotes. Named arguments
/// (`$tags="..."`) are dropped so positional indexing stays stable.
fn split_args(raw: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_quotes && depth == 0 => {
                pieces.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !pieces.is_empty() {
        pieces.push(current);
    }

    pieces
        .iter()
        .map(|piece| piece.trim())
        .filter(|piece| !piece.starts_with('$'))
        .map(unquote)
        .collect()
}

fn unquote(raw: &str) -> String {
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elements_and_relation() {
        let diagram = parse(
            "@startuml\nPerson(user, \"Customer\")\nSystem(shop, \"Web Shop\")\nRel(user, shop, \"Buys from\")\n@enduml",
        )
        .unwrap();

        assert_eq!(diagram.elements.len(), 2);
        assert_eq!(diagram.elements[0].alias, "user");
        assert_eq!(diagram.elements[0].label, "Customer");
        assert_eq!(diagram.elements[0].kind, ElementKind::Person);
        assert_eq!(diagram.elements[1].kind, ElementKind::System);

        assert_eq!(diagram.relations.len(), 1);
        assert_eq!(diagram.relations[0].from, 0);
        assert_eq!(diagram.relations[0].to, 1);
        assert_eq!(diagram.relations[0].label.as_deref(), Some("Buys from"));
    }

    #[test]
    fn test_parse_external_and_database_variants() {
        let diagram = parse(
            "System_Ext(mail, \"Mail Server\")\nSystemDb(db, \"Orders DB\")\nContainerQueue(q, \"Bus\", \"Kafka\")",
        )
        .unwrap();

        assert!(diagram.elements[0].external);
        assert_eq!(diagram.elements[0].shape, Shape::Plain);
        assert!(!diagram.elements[1].external);
        assert_eq!(diagram.elements[1].shape, Shape::Database);
        assert_eq!(diagram.elements[2].shape, Shape::Queue);
        assert_eq!(diagram.elements[2].technology.as_deref(), Some("Kafka"));
    }

    #[test]
    fn test_container_technology_argument() {
        let diagram = parse("Container(api, \"API\", \"Rust\", \"Backend service\")").unwrap();
        assert_eq!(diagram.elements[0].technology.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_person_third_argument_is_description_not_technology() {
        let diagram = parse("Person(u, \"User\", \"A person\")").unwrap();
        assert_eq!(diagram.elements[0].technology, None);
    }

    #[test]
    fn test_boundary_membership_and_nesting() {
        let diagram = parse(
            "System_Boundary(outer, \"Outer\") {\nContainer_Boundary(inner, \"Inner\") {\nComponent(c, \"Comp\")\n}\nContainer(api, \"API\", \"Rust\")\n}\nPerson(u, \"User\")",
        )
        .unwrap();

        assert_eq!(diagram.boundaries.len(), 2);
        assert_eq!(diagram.boundaries[0].parent, None);
        assert_eq!(diagram.boundaries[1].parent, Some(0));
        // c sits in the inner boundary, api in the outer, u in none
        assert_eq!(diagram.elements[0].boundary, Some(1));
        assert_eq!(diagram.elements[1].boundary, Some(0));
        assert_eq!(diagram.elements[2].boundary, None);
    }

    #[test]
    fn test_boundary_brace_on_next_line() {
        let diagram = parse("System_Boundary(b, \"B\")\n{\nSystem(s, \"S\")\n}").unwrap();
        assert_eq!(diagram.elements[0].boundary, Some(0));
    }

    #[test]
    fn test_ignored_lines() {
        let diagram = parse(
            "@startuml\n!include <C4/C4_Container>\n' a comment\ntitle My Diagram\nLAYOUT_WITH_LEGEND()\nSHOW_PERSON_OUTLINE()\nskinparam backgroundColor white\nSystem(s, \"S\")\n@enduml",
        )
        .unwrap();
        assert_eq!(diagram.elements.len(), 1);
    }

    #[test]
    fn test_cosmetic_macros_are_skipped() {
        let diagram = parse(
            "AddElementTag(\"hot\", $bgColor=\"red\")\nLay_D(a, b)\nSystem(a, \"A\")\nSystem(b, \"B\")",
        )
        .unwrap();
        assert_eq!(diagram.elements.len(), 2);
        assert!(diagram.relations.is_empty());
    }

    #[test]
    fn test_quoted_label_with_comma_and_parens() {
        let diagram = parse("System(s, \"Orders, invoices (and more)\")").unwrap();
        assert_eq!(diagram.elements[0].label, "Orders, invoices (and more)");
    }

    #[test]
    fn test_named_arguments_are_dropped() {
        let diagram = parse("System(s, \"S\", $tags=\"hot\")\nPerson(u, \"U\")\nRel(u, s, \"Uses\", $tags=\"x\")").unwrap();
        assert_eq!(diagram.relations[0].label.as_deref(), Some("Uses"));
        assert_eq!(diagram.relations[0].technology, None);
    }

    #[test]
    fn test_rel_back_swaps_endpoints() {
        let diagram = parse("System(a, \"A\")\nSystem(b, \"B\")\nRel_Back(a, b, \"Notifies\")").unwrap();
        assert_eq!(diagram.relations[0].from, 1);
        assert_eq!(diagram.relations[0].to, 0);
    }

    #[test]
    fn test_birel_sets_bidirectional() {
        let diagram = parse("System(a, \"A\")\nSystem(b, \"B\")\nBiRel(a, b, \"Syncs\")").unwrap();
        assert!(diagram.relations[0].bidirectional);
    }

    #[test]
    fn test_relation_to_unknown_alias() {
        let err = parse("System(a, \"A\")\nRel(a, ghost, \"Uses\")").unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_relation_to_boundary_is_rejected() {
        let err =
            parse("System_Boundary(b, \"B\") {\nSystem(s, \"S\")\n}\nRel(s, b, \"Uses\")").unwrap_err();
        assert!(err.to_string().contains("boundary"));
    }

    #[test]
    fn test_duplicate_alias() {
        let err = parse("System(a, \"A\")\nPerson(a, \"Again\")").unwrap_err();
        assert!(err.to_string().contains("duplicate alias 'a'"));
    }

    #[test]
    fn test_unclosed_boundary() {
        let err = parse("System_Boundary(b, \"B\") {\nSystem(s, \"S\")").unwrap_err();
        assert!(err.to_string().contains("unclosed boundary 'b'"));
    }

    #[test]
    fn test_unmatched_closing_brace() {
        let err = parse("System(s, \"S\")\n}").unwrap_err();
        assert!(err.to_string().contains("unmatched '}'"));
    }

    #[test]
    fn test_empty_input() {
        let err = parse("@startuml\n@enduml").unwrap_err();
        assert_eq!(err, ConvertError::EmptyDiagram);
    }

    #[test]
    fn test_unrecognized_line_reports_line_number() {
        let err = parse("System(s, \"S\")\nnot a macro at all").unwrap_err();
        assert_eq!(
            err,
            ConvertError::Parse {
                line: 2,
                message: "unrecognized line 'not a macro at all'".to_string()
            }
        );
    }

    #[test]
    fn test_split_args_handles_quotes() {
        assert_eq!(
            split_args("a, \"hello, world\", \"x (y)\""),
            vec!["a", "hello, world", "x (y)"]
        );
        assert!(split_args("").is_empty());
    }
}
