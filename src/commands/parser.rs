//! Slash-command tokenizer and argument parser

use std::collections::BTreeMap;

/// A command line split into its command word and raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased first token, including the leading `/`
    pub command: String,
    pub args: Vec<String>,
}

/// Flag value: `-x value` or a bare `-x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Value(String),
    Set,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub flags: BTreeMap<String, FlagValue>,
    /// Last bare token
    pub path: Option<String>,
}

impl ParsedArgs {
    pub fn has(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    pub fn value(&self, flag: &str) -> Option<&str> {
        match self.flags.get(flag)? {
            FlagValue::Value(v) => Some(v),
            FlagValue::Set => None,
        }
    }
}

/// Split on whitespace, keeping double- or single-quoted runs together
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || (c == '\'' && !in_token) => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Parse a command line; `None` when the input holds no tokens
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let mut tokens = tokenize(input.trim()).into_iter();
    let command = tokens.next()?.to_lowercase();
    Some(ParsedCommand {
        command,
        args: tokens.collect(),
    })
}

/// `-x` takes the following non-flag token as its value, else it is just set;
/// any other token becomes `path`
pub fn parse_args(args: &[String]) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if let Some(key) = arg.strip_prefix('-') {
            let value = match iter.peek() {
                Some(next) if !next.starts_with('-') => {
                    let v = FlagValue::Value((*next).clone());
                    iter.next();
                    v
                }
                _ => FlagValue::Set,
            };
            parsed.flags.insert(key.to_string(), value);
        } else {
            parsed.path = Some(arg.clone());
        }
    }
    parsed
}
