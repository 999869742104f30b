//! Message templates attached to an invocation for the logging side effect.
//!
//! Templates use `{}` or `{name}` holes that are filled positionally from the
//! argument list. `{{` and `}}` produce literal braces. Holes without a matching
//! argument are left in the output untouched, so a short argument list never
//! loses text.

use std::borrow::Cow;
use std::fmt;

/// Template used when an invocation carries no message of its own.
pub const DEFAULT_TEMPLATE: &str = "Error caught by faultless: {error}";

/// Message template plus positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    template: Option<Cow<'static, str>>,
    args: Vec<String>,
}

impl Diagnostic {
    /// Message with `template` and no arguments yet.
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self { template: Some(template.into()), args: Vec::new() }
    }

    /// Append one positional argument.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Append several positional arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        self.args.extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref().filter(|t| !t.is_empty())
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render the template, if one is set.
    pub fn render(&self) -> Option<String> {
        self.template().map(|t| render_template(t, &self.args))
    }
}

/// Fill `{}` / `{name}` holes in `template` from `args`, in order.
pub fn render_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = args.iter();
    let mut chars = template.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => match template[idx..].find('}') {
                Some(len) => {
                    let hole = &template[idx..=idx + len];
                    match next_arg.next() {
                        Some(value) => out.push_str(value),
                        None => out.push_str(hole),
                    }
                    // skip the rest of the hole
                    while let Some((pos, _)) = chars.peek() {
                        if *pos > idx + len {
                            break;
                        }
                        chars.next();
                    }
                }
                None => out.push('{'),
            },
            other => out.push(other),
        }
    }
    out
}
