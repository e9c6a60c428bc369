//! Display templates such as `y={m}x+{n}`.

use crate::error::{FitLabError, Result};
use crate::utils::format_significant;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A format string whose `{name}` placeholders are replaced by fitted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTemplate {
    text: String,
    segments: Vec<Segment>,
}

impl DisplayTemplate {
    /// Parse a template. Unbalanced or empty braces are a configuration error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(FitLabError::Configuration(format!(
                    "template '{}' has an unmatched '}}'",
                    text
                )));
            }
            let close = rest[open..].find('}').map(|i| open + i).ok_or_else(|| {
                FitLabError::Configuration(format!("template '{}' has an unclosed '{{'", text))
            })?;
            let name = rest[open + 1..close].trim();
            if name.is_empty() || name.contains('{') {
                return Err(FitLabError::Configuration(format!(
                    "template '{}' has an invalid placeholder",
                    text
                )));
            }
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            segments.push(Segment::Placeholder(name.to_string()));
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// True when the placeholder set equals `names` as a set.
    pub fn matches_parameters(&self, names: &[String]) -> bool {
        let placeholders = self.placeholders();
        placeholders.len() == names.len() && names.iter().all(|n| placeholders.contains(&n.as_str()))
    }

    /// Substitute `values` (ordered like `names`) with `figures` significant figures.
    ///
    /// A negative value after a literal `+` folds the two signs into `-`.
    pub fn render(&self, names: &[String], values: &[f64], figures: usize) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match names.iter().position(|n| n == name) {
                    Some(i) if i < values.len() => {
                        let value = values[i];
                        if value < 0.0 && out.ends_with('+') {
                            out.pop();
                            out.push('-');
                            out.push_str(&format_significant(-value, figures));
                        } else {
                            out.push_str(&format_significant(value, figures));
                        }
                    }
                    _ => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
            }
        }
        out
    }

    /// Read the substituted values back out of a rendered string, ordered like
    /// `names`. Returns `None` if the text does not follow this template.
    pub fn parse_values(&self, rendered: &str, names: &[String]) -> Option<Vec<f64>> {
        let mut values: Vec<Option<f64>> = vec![None; names.len()];
        let mut rest = rendered;
        let mut sign = 1.0;

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => match self.signed_head(i) {
                    Some(head) => {
                        rest = rest.strip_prefix(head)?;
                        sign = if rest.starts_with('-') { -1.0 } else { 1.0 };
                        rest = rest.strip_prefix(['+', '-'])?;
                    }
                    None => rest = rest.strip_prefix(text.as_str())?,
                },
                Segment::Placeholder(name) => {
                    let end = match self.segments.get(i + 1) {
                        Some(Segment::Literal(next)) => match self.signed_head(i + 1) {
                            Some(head) => signed_literal_start(rest, head)?,
                            None => rest.get(1..)?.find(next.as_str())? + 1,
                        },
                        _ => rest.len(),
                    };
                    let value: f64 = rest[..end].parse().ok()?;
                    if let Some(slot) = names.iter().position(|n| n == name) {
                        values[slot].get_or_insert(sign * value);
                    }
                    sign = 1.0;
                    rest = &rest[end..];
                }
            }
        }

        if rest.is_empty() {
            values.into_iter().collect()
        } else {
            None
        }
    }

    /// For a literal ending in `+` right before a placeholder, the text in
    /// front of that `+`, which `render` may have turned into `-`.
    fn signed_head(&self, index: usize) -> Option<&str> {
        match (self.segments.get(index), self.segments.get(index + 1)) {
            (Some(Segment::Literal(text)), Some(Segment::Placeholder(_))) => text.strip_suffix('+'),
            _ => None,
        }
    }
}

/// Offset of the first `head` followed by a sign, skipping the leading
/// character and exponent signs such as the `-` in `1e-7`.
fn signed_literal_start(rest: &str, head: &str) -> Option<usize> {
    (1..rest.len()).find(|&p| {
        rest.is_char_boundary(p)
            && rest[p..]
                .strip_prefix(head)
                .is_some_and(|after| after.starts_with(['+', '-']))
            && !(head.is_empty() && rest[..p].ends_with(['e', 'E']))
    })
}
