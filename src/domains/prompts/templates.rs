//! Prompt templates module.
//!
//! Templates use a small mustache-like syntax:
//! - `{{name}}` is replaced with the value of `name` (empty if unset)
//! - `{{#if name}}...{{/if}}` keeps its body only if `name` is set and non-empty
//! - `{{#if name}}...{{else}}...{{/if}}` picks one of two bodies
//!
//! Conditionals may nest.

use std::collections::HashMap;

use rmcp::model::PromptArgument;

use super::error::PromptError;

/// A prompt template that can be instantiated with arguments.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The unique name of the prompt.
    pub name: String,

    /// A description of what the prompt does.
    pub description: Option<String>,

    /// The arguments that this prompt accepts.
    pub arguments: Vec<PromptArgument>,

    /// The template source.
    pub template: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        name: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

enum Tag<'a> {
    If(&'a str),
    Else,
    EndIf,
    Var(&'a str),
}

fn classify(tag: &str) -> Tag<'_> {
    let tag = tag.trim();
    if let Some(name) = tag.strip_prefix("#if ") {
        Tag::If(name.trim())
    } else if tag == "else" {
        Tag::Else
    } else if tag == "/if" {
        Tag::EndIf
    } else {
        Tag::Var(tag)
    }
}

/// One open `{{#if}}` while parsing.
struct Frame {
    name: String,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

fn parse(source: &str) -> Result<Vec<Node>, PromptError> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut rest = source;

    fn current<'a>(root: &'a mut Vec<Node>, stack: &'a mut [Frame]) -> &'a mut Vec<Node> {
        match stack.last_mut() {
            Some(frame) => frame.otherwise.as_mut().unwrap_or(&mut frame.then),
            None => root,
        }
    }

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            current(&mut root, &mut stack).push(Node::Text(rest[..open].to_string()));
        }
        let after = &rest[open + 2..];
        let close = after
            .find("}}")
            .ok_or_else(|| PromptError::template("unclosed '{{' tag"))?;

        match classify(&after[..close]) {
            Tag::If(name) => stack.push(Frame {
                name: name.to_string(),
                then: Vec::new(),
                otherwise: None,
            }),
            Tag::Else => {
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| PromptError::template("{{else}} outside {{#if}}"))?;
                if frame.otherwise.is_some() {
                    return Err(PromptError::template("duplicate {{else}}"));
                }
                frame.otherwise = Some(Vec::new());
            }
            Tag::EndIf => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| PromptError::template("{{/if}} without {{#if}}"))?;
                let node = Node::If {
                    name: frame.name,
                    then: frame.then,
                    otherwise: frame.otherwise.unwrap_or_default(),
                };
                current(&mut root, &mut stack).push(node);
            }
            Tag::Var(name) => {
                current(&mut root, &mut stack).push(Node::Var(name.to_string()));
            }
        }
        rest = &after[close + 2..];
    }

    if !stack.is_empty() {
        return Err(PromptError::template("missing {{/if}}"));
    }
    if !rest.is_empty() {
        root.push(Node::Text(rest.to_string()));
    }
    Ok(root)
}

fn render_nodes(nodes: &[Node], arguments: &HashMap<String, String>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                if let Some(value) = arguments.get(name) {
                    out.push_str(value);
                }
            }
            Node::If {
                name,
                then,
                otherwise,
            } => {
                let is_set = arguments.get(name).is_some_and(|v| !v.is_empty());
                render_nodes(if is_set { then } else { otherwise }, arguments, out);
            }
        }
    }
}

fn collect_names(nodes: &[Node], names: &mut Vec<String>) {
    let mut add = |name: &String, names: &mut Vec<String>| {
        if !names.contains(name) {
            names.push(name.clone());
        }
    };
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Var(name) => add(name, names),
            Node::If {
                name,
                then,
                otherwise,
            } => {
                add(name, names);
                collect_names(then, names);
                collect_names(otherwise, names);
            }
        }
    }
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        arguments: Vec<PromptArgument>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            arguments,
            template: template.into(),
        }
    }

    /// Check that the template is well formed.
    pub fn validate(&self) -> Result<(), PromptError> {
        parse(&self.template).map(|_| ())
    }

    /// Render the template with the given arguments.
    pub fn render(&self, arguments: &HashMap<String, String>) -> Result<String, PromptError> {
        let nodes = parse(&self.template)?;
        let mut out = String::with_capacity(self.template.len());
        render_nodes(&nodes, arguments, &mut out);
        Ok(out)
    }

    /// Every argument name the template refers to, in order of appearance.
    pub fn placeholders(&self) -> Result<Vec<String>, PromptError> {
        let nodes = parse(&self.template)?;
        let mut names = Vec::new();
        collect_names(&nodes, &mut names);
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(source: &str) -> PromptTemplate {
        PromptTemplate::new("test", None, vec![], source)
    }

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let result = template("Hello, {{name}}!").render(&args(&[("name", "World")])).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_missing_placeholder_renders_empty() {
        assert_eq!(template("[{{ missing }}]").render(&args(&[])).unwrap(), "[]");
    }

    #[test]
    fn test_conditional_with_value() {
        let t = template("Hello{{#if name}}, {{name}}{{/if}}!");
        assert_eq!(t.render(&args(&[("name", "World")])).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_conditional_without_value() {
        let t = template("Hello{{#if name}}, {{name}}{{/if}}!");
        assert_eq!(t.render(&args(&[])).unwrap(), "Hello!");
        assert_eq!(t.render(&args(&[("name", "")])).unwrap(), "Hello!");
    }

    #[test]
    fn test_conditional_with_else() {
        let t = template("Hello, {{#if name}}{{name}}{{else}}stranger{{/if}}!");
        assert_eq!(t.render(&args(&[])).unwrap(), "Hello, stranger!");
    }

    #[test]
    fn test_nested_conditionals() {
        let t = template("{{#if a}}A{{#if b}}B{{else}}-{{/if}}{{else}}none{{/if}}.");
        assert_eq!(t.render(&args(&[("a", "1"), ("b", "1")])).unwrap(), "AB.");
        assert_eq!(t.render(&args(&[("a", "1")])).unwrap(), "A-.");
        assert_eq!(t.render(&args(&[("b", "1")])).unwrap(), "none.");
    }

    #[test]
    fn test_malformed_templates() {
        let sources = [
            "{{#if a}}x",
            "x{{/if}}",
            "{{else}}",
            "{{name",
            "{{#if a}}{{else}}{{else}}{{/if}}",
        ];
        for source in sources {
            let result = template(source).validate();
            assert!(matches!(result, Err(PromptError::Template(_))), "{}", source);
        }
    }

    #[test]
    fn test_placeholders() {
        let t = template(
            "{{location}} in {{#if units}}{{units}}{{else}}{{fallback}}{{/if}} {{location}}",
        );
        assert_eq!(
            t.placeholders().unwrap(),
            vec!["location", "units", "fallback"]
        );
    }
}
