// file: src/scaffold/template.rs
// description: placeholder substitution with line-level conditional blocks
// reference: {{key}} values and {{#if flag}}/{{/if}} sections

use crate::error::{RefServeError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{([a-z][a-z0-9_]*)\}\}").expect("invalid placeholder regex");
    static ref IF_RE: Regex =
        Regex::new(r"^\s*\{\{#if ([a-z][a-z0-9_]*)\}\}\s*$").expect("invalid if regex");
    static ref ENDIF_RE: Regex = Regex::new(r"^\s*\{\{/if\}\}\s*$").expect("invalid endif regex");
}

/// Small template engine for generated project files. Substitutes
/// `{{key}}` placeholders and includes the lines between
/// `{{#if flag}}` and `{{/if}}` only when the flag is set. Conditional
/// markers must stand on their own line; blocks may nest.
pub struct TemplateEngine {
    values: HashMap<String, String>,
    flags: HashMap<String, bool>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            flags: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_flag(mut self, key: &str, value: bool) -> Self {
        self.flags.insert(key.to_string(), value);
        self
    }

    pub fn render(&self, template: &str) -> Result<String> {
        let mut output = String::new();
        // Stack of active conditional flags; a line is emitted only
        // when every enclosing block is true.
        let mut stack: Vec<bool> = Vec::new();

        for (line_no, line) in template.lines().enumerate() {
            if let Some(captures) = IF_RE.captures(line) {
                let flag = &captures[1];
                let value = *self.flags.get(flag).ok_or_else(|| {
                    RefServeError::Scaffold(format!(
                        "unknown template flag '{}' at line {}",
                        flag,
                        line_no + 1
                    ))
                })?;
                stack.push(value);
                continue;
            }

            if ENDIF_RE.is_match(line) {
                stack.pop().ok_or_else(|| {
                    RefServeError::Scaffold(format!(
                        "unmatched {{{{/if}}}} at line {}",
                        line_no + 1
                    ))
                })?;
                continue;
            }

            if stack.iter().all(|active| *active) {
                output.push_str(&self.substitute(line, line_no + 1)?);
                output.push('\n');
            }
        }

        if !stack.is_empty() {
            return Err(RefServeError::Scaffold(
                "unclosed {{#if}} block in template".to_string(),
            ));
        }

        Ok(output)
    }

    fn substitute(&self, line: &str, line_no: usize) -> Result<String> {
        let mut result = String::with_capacity(line.len());
        let mut last_end = 0;

        for captures in PLACEHOLDER_RE.captures_iter(line) {
            let full = captures.get(0).expect("capture 0 always present");
            let key = &captures[1];
            let value = self.values.get(key).ok_or_else(|| {
                RefServeError::Scaffold(format!(
                    "unknown template placeholder '{}' at line {}",
                    key, line_no
                ))
            })?;

            result.push_str(&line[last_end..full.start()]);
            result.push_str(value);
            last_end = full.end();
        }

        result.push_str(&line[last_end..]);
        Ok(result)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
