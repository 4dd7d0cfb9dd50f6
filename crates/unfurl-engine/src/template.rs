//! Command templating with `<name>` placeholder substitution.
//!
//! Substitution is literal and single-pass: the template is scanned once,
//! left to right, and recognized placeholders are swapped for their values.
//! Substituted values are never rescanned, so a vault path containing
//! `<text>` stays exactly that. Unrecognized placeholders are left verbatim.
//!
//! Recognized placeholders:
//!
//! | token                         | value                                  |
//! |-------------------------------|----------------------------------------|
//! | `<text>`                      | matched content, shell-escaped         |
//! | `<text_raw>`                  | matched content, untouched             |
//! | `<vault_path>`                | workspace root                         |
//! | `<file_name>` / `<note_name>` | active file name                       |
//! | `<file_path>` / `<note_path>` | active file absolute path              |
//! | `<inner_path>`                | active file's directory, vault-relative|
//! | `<scripts_path>`              | scripts directory                      |

use unfurl_core::{ExpandError, ExpansionContext, Result};

/// How file-scoped placeholders behave when no file is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingFilePolicy {
    /// Fail the render with [`ExpandError::NoActiveContext`].
    Strict,
    /// Substitute the empty string.
    Permissive,
}

#[derive(Clone, Copy)]
enum Token {
    Text,
    TextRaw,
    VaultPath,
    FileName,
    FilePath,
    InnerPath,
    ScriptsPath,
}

const TOKENS: &[(&str, Token)] = &[
    ("<text>", Token::Text),
    ("<text_raw>", Token::TextRaw),
    ("<vault_path>", Token::VaultPath),
    ("<file_name>", Token::FileName),
    ("<note_name>", Token::FileName),
    ("<file_path>", Token::FilePath),
    ("<note_path>", Token::FilePath),
    ("<inner_path>", Token::InnerPath),
    ("<scripts_path>", Token::ScriptsPath),
];

/// Render a command template.
///
/// `text` is the matched content; pass `None` when rendering a spawn command,
/// which leaves the text placeholders verbatim for the process to see.
pub fn render(
    template: &str,
    text: Option<&str>,
    ctx: &ExpansionContext,
    policy: MissingFilePolicy,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        for (token, kind) in TOKENS {
            if tail.starts_with(token) {
                if let Some(value) = value_for(*kind, token, text, ctx, policy)? {
                    out.push_str(&value);
                    rest = &tail[token.len()..];
                    continue 'scan;
                }
                // recognized but no text supplied: fall through, keep verbatim
                break;
            }
        }
        out.push('<');
        rest = &tail[1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Value for one recognized token, or `None` to leave it verbatim.
fn value_for(
    kind: Token,
    token: &str,
    text: Option<&str>,
    ctx: &ExpansionContext,
    policy: MissingFilePolicy,
) -> Result<Option<String>> {
    match kind {
        Token::Text => Ok(text.map(shell_escape)),
        Token::TextRaw => Ok(text.map(String::from)),
        Token::VaultPath => Ok(Some(ctx.vault_path.clone())),
        Token::ScriptsPath => Ok(Some(ctx.scripts_path.clone())),
        Token::FileName => file_scoped(ctx.file_name.as_deref(), token, policy),
        Token::FilePath => file_scoped(ctx.file_path.as_deref(), token, policy),
        Token::InnerPath => file_scoped(ctx.inner_path.as_deref(), token, policy),
    }
}

fn file_scoped(
    value: Option<&str>,
    token: &str,
    policy: MissingFilePolicy,
) -> Result<Option<String>> {
    match (value, policy) {
        (Some(v), _) => Ok(Some(v.to_string())),
        (None, MissingFilePolicy::Permissive) => Ok(Some(String::new())),
        (None, MissingFilePolicy::Strict) => Err(ExpandError::NoActiveContext {
            placeholder: token.trim_matches(['<', '>']).to_string(),
        }),
    }
}

/// Wrap text in single quotes for a POSIX shell, escaping embedded quotes.
///
/// Each `'` becomes `'"'"'`: close the quote, emit a double-quoted quote,
/// reopen. The receiving shell sees the literal byte sequence.
#[must_use]
pub fn shell_escape(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\"'\"'"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn full_ctx() -> ExpansionContext {
        ExpansionContext {
            vault_path: "/vault".to_string(),
            file_name: Some("note.md".to_string()),
            file_path: Some("/vault/daily/note.md".to_string()),
            inner_path: Some("daily".to_string()),
            scripts_path: "/vault/.scripts".to_string(),
        }
    }

    fn no_file_ctx() -> ExpansionContext {
        ExpansionContext {
            vault_path: "/vault".to_string(),
            scripts_path: "/vault/.scripts".to_string(),
            ..ExpansionContext::default()
        }
    }

    #[test]
    fn every_placeholder_substitutes_exactly_once() {
        let template = "<text> <text_raw> <vault_path> <file_name> <note_name> \
                        <file_path> <note_path> <inner_path> <scripts_path>";
        let out = render(template, Some("hi"), &full_ctx(), MissingFilePolicy::Strict).unwrap();
        assert_eq!(
            out,
            "'hi' hi /vault note.md note.md /vault/daily/note.md /vault/daily/note.md \
             daily /vault/.scripts"
        );
        assert!(!out.contains('<'));
    }

    #[test]
    fn single_quote_escaping() {
        let out = render("echo <text>", Some("it's"), &full_ctx(), MissingFilePolicy::Strict)
            .unwrap();
        assert_eq!(out, r#"echo 'it'"'"'s'"#);
    }

    #[test]
    fn text_raw_is_not_escaped() {
        let out = render("echo <text_raw>", Some("it's"), &full_ctx(), MissingFilePolicy::Strict)
            .unwrap();
        assert_eq!(out, "echo it's");
    }

    #[test]
    fn unrecognized_placeholder_left_verbatim() {
        let out = render("run <unknown> <text>", Some("x"), &full_ctx(), MissingFilePolicy::Strict)
            .unwrap();
        assert_eq!(out, "run <unknown> 'x'");
    }

    #[test]
    fn no_text_leaves_text_placeholders_verbatim() {
        let out = render(
            "python3 <scripts_path>/main.py <text>",
            None,
            &full_ctx(),
            MissingFilePolicy::Permissive,
        )
        .unwrap();
        assert_eq!(out, "python3 /vault/.scripts/main.py <text>");
    }

    #[test]
    fn substituted_values_are_never_rescanned() {
        let ctx = ExpansionContext {
            vault_path: "/v/<text>/x".to_string(),
            ..full_ctx()
        };
        let out = render("<vault_path>", Some("boom"), &ctx, MissingFilePolicy::Strict).unwrap();
        assert_eq!(out, "/v/<text>/x");
    }

    #[test]
    fn strict_mode_fails_on_missing_file() {
        let err = render("cat <file_path>", Some("x"), &no_file_ctx(), MissingFilePolicy::Strict)
            .unwrap_err();
        assert_matches!(err, ExpandError::NoActiveContext { placeholder } if placeholder == "file_path");
    }

    #[test]
    fn permissive_mode_substitutes_empty_for_missing_file() {
        let out = render(
            "cat <file_path> <file_name>",
            Some("x"),
            &no_file_ctx(),
            MissingFilePolicy::Permissive,
        )
        .unwrap();
        assert_eq!(out, "cat  ");
    }

    #[test]
    fn non_file_placeholders_ignore_policy() {
        let out = render("<vault_path>", None, &no_file_ctx(), MissingFilePolicy::Strict).unwrap();
        assert_eq!(out, "/vault");
    }

    #[test]
    fn lone_angle_bracket_is_literal() {
        let out = render("if a < b then <text>", Some("y"), &full_ctx(), MissingFilePolicy::Strict)
            .unwrap();
        assert_eq!(out, "if a < b then 'y'");
    }

    #[test]
    fn trailing_open_bracket_is_literal() {
        let out = render("end <", Some("y"), &full_ctx(), MissingFilePolicy::Strict).unwrap();
        assert_eq!(out, "end <");
    }

    #[test]
    fn note_aliases_share_file_fields() {
        let out = render("<note_name>|<note_path>", None, &full_ctx(), MissingFilePolicy::Strict)
            .unwrap();
        assert_eq!(out, "note.md|/vault/daily/note.md");
    }

    #[test]
    fn shell_escape_plain_text() {
        assert_eq!(shell_escape("hello"), "'hello'");
    }

    #[test]
    fn shell_escape_embedded_quote() {
        assert_eq!(shell_escape("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn shell_escape_only_quotes() {
        assert_eq!(shell_escape("'"), r#"''"'"''"#);
    }
}
