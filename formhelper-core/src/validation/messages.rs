//! Positional message templates.

use crate::config::LanguageConfig;
use crate::validation::violation::ViolationKind;

/// Substitute `{0}`, `{1}`, ... with the given arguments.
///
/// Placeholders without a matching argument are left as written, so a
/// template that only uses `{0}` renders the same whatever is passed after it.
#[must_use]
pub fn render_message(template: &str, args: &[&str]) -> String {
    let mut out: String = String::with_capacity(template.len() + 16);
    let mut rest: &str = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after: &str = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            args.get(index).map(|arg| (arg, close))
        });

        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Template for a violation kind.
#[must_use]
pub fn template_for(language: &LanguageConfig, kind: ViolationKind) -> &str {
    match kind {
        ViolationKind::SizeExceeded => &language.file_size_overload,
        ViolationKind::CountExceeded => &language.file_count_overload,
    }
}
