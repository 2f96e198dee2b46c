//! Format templates
//!
//! A template such as `substringof({1},{0})` names a grammar function and,
//! through its positional placeholders, the order in which the call-site
//! arguments appear in the grammar. Placeholders must form a permutation of
//! the call's argument indexes so the mapping can be reversed.

use std::sync::OnceLock;

use regex::Regex;

fn call_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^([a-z][a-z0-9_]*)\((.*)\)$").expect("valid template pattern"))
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"^\{(\d+)\}$").expect("valid placeholder pattern"))
}

/// Parsed format template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    text: String,
    grammar_name: String,
    /// `argument_order[i]` is the call argument that fills grammar position `i`
    argument_order: Vec<usize>,
}

impl FormatTemplate {
    /// Parses `text` for a member taking `argument_count` call arguments
    /// (receiver included). Returns the reason on failure.
    pub fn parse(text: &str, argument_count: usize) -> Result<Self, String> {
        let captures = call_shape()
            .captures(text.trim())
            .ok_or_else(|| "expected the form name({0},...)".to_string())?;
        let grammar_name = captures[1].to_string();
        let inner = captures[2].trim();

        let mut argument_order = Vec::new();
        if !inner.is_empty() {
            for part in inner.split(',') {
                let part = part.trim();
                let index: usize = placeholder()
                    .captures(part)
                    .and_then(|c| c[1].parse().ok())
                    .ok_or_else(|| format!("unparsable placeholder '{}'", part))?;
                if index >= argument_count {
                    return Err(format!(
                        "placeholder {{{}}} out of range for {} argument(s)",
                        index, argument_count
                    ));
                }
                if argument_order.contains(&index) {
                    return Err(format!("placeholder {{{}}} used twice", index));
                }
                argument_order.push(index);
            }
        }

        if argument_order.len() != argument_count {
            return Err(format!(
                "{} placeholder(s) for {} argument(s)",
                argument_order.len(),
                argument_count
            ));
        }

        Ok(Self {
            text: text.trim().to_string(),
            grammar_name,
            argument_order,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn grammar_name(&self) -> &str {
        &self.grammar_name
    }

    pub fn argument_order(&self) -> &[usize] {
        &self.argument_order
    }

    /// Renders the grammar call from already rendered call-site arguments
    pub fn render(&self, call_args: &[String]) -> String {
        let mut out = String::with_capacity(self.grammar_name.len() + 2 + call_args.iter().map(String::len).sum::<usize>());
        out.push_str(&self.grammar_name);
        out.push('(');
        for (position, &index) in self.argument_order.iter().enumerate() {
            if position > 0 {
                out.push(',');
            }
            out.push_str(&call_args[index]);
        }
        out.push(')');
        out
    }

    /// Reorders grammar-positional items back into call-site order
    pub fn to_call_order<T>(&self, grammar_args: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(grammar_args.len()).collect();
        for (position, arg) in grammar_args.into_iter().enumerate() {
            slots[self.argument_order[position]] = Some(arg);
        }
        slots.into_iter().flatten().collect()
    }

    /// Reorders call-site items into grammar order
    pub fn to_grammar_order<'a, T>(&self, call_args: &'a [T]) -> Vec<&'a T> {
        self.argument_order.iter().map(|&i| &call_args[i]).collect()
    }
}
