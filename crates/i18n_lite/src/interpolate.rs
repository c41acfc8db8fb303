use std::borrow::Cow;
use std::fmt::Write;

use crate::vars::Variables;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute `{{name}}` placeholders in `template` with values from `vars`.
///
/// - Whitespace inside the delimiters is ignored: `{{ name }}` reads `name`.
/// - Names missing from `vars` keep their placeholder text verbatim.
/// - Substituted values are not scanned again.
/// - An unterminated `{{` is literal text.
///
/// Templates without placeholders are returned borrowed.
pub fn interpolate<'a>(template: &'a str, vars: &Variables) -> Cow<'a, str> {
    if template.is_empty() || !template.contains(OPEN) {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let Some(end) = after_open.find(CLOSE) else {
            // No closing delimiter anywhere after this point.
            out.push_str(&rest[start..]);
            return Cow::Owned(out);
        };

        let placeholder = &rest[start..start + OPEN.len() + end + CLOSE.len()];
        let token = after_open[..end].trim();

        match vars.get(token) {
            Some(value) if !token.is_empty() => {
                // Writing into a String cannot fail.
                let _ = write!(out, "{value}");
            }
            _ => out.push_str(placeholder),
        }

        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}
