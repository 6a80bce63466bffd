//! Recipe line interpolation.
//!
//! Substitutes `$in` (the resolved file prerequisites) and `$out` (the target
//! name) into recipe lines, shell-quoting each path. `$$` escapes a literal
//! dollar sign. Tokens touching identifier characters on either side
//! (`a$in`, `$input`) and tokens inside backtick command substitution are
//! left untouched. Substitution happens at execution time, after glob
//! prerequisites have been expanded against the live filesystem.

use camino::Utf8PathBuf;
use shell_quote::{QuoteRefExt, Sh};
use thiserror::Error;

/// Errors raised while interpolating a recipe line.
#[derive(Debug, Error)]
pub enum InterpError {
    /// The substituted line does not lex as a shell command.
    #[error("recipe line is not a valid shell command: {snippet}")]
    InvalidCommand {
        /// Leading portion of the offending line.
        snippet: String,
    },
}

/// Returns `true` when the command contains an odd number of backticks.
fn has_unmatched_backticks(s: &str) -> bool {
    s.chars().filter(|&c| c == '`').count().rem_euclid(2) != 0
}

/// Substitute `$in` and `$out` into `template` and validate the result.
///
/// # Errors
///
/// Returns [`InterpError::InvalidCommand`] when the substituted line has
/// unmatched backticks or fails shell lexing.
pub fn interpolate(
    template: &str,
    inputs: &[Utf8PathBuf],
    output: &str,
) -> Result<String, InterpError> {
    let ins = inputs
        .iter()
        .map(|path| quote(path.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    let out = quote(output);
    let substituted = substitute(template, &ins, &out);
    if has_unmatched_backticks(&substituted) || shlex::split(&substituted).is_none() {
        let snippet = substituted.chars().take(160).collect();
        return Err(InterpError::InvalidCommand { snippet });
    }
    Ok(substituted)
}

fn quote(s: &str) -> String {
    // Inputs are UTF-8 paths, and shell quoting should preserve that.
    let bytes: Vec<u8> = s.quoted(Sh);
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug_assert!(false, "shell quoting produced non UTF-8 bytes: {err}");
            String::from_utf8_lossy(&err.into_bytes()).into_owned()
        }
    }
}

/// Returns whether `ch` is a valid identifier character.
fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Checks if `token` matches `chars` starting at `pos` and sits between word
/// boundaries, so `$input` and `a$in` are left alone while `$in.txt` is
/// substituted.
fn token_at(chars: &[char], pos: usize, token: &str) -> bool {
    let matches = token
        .chars()
        .enumerate()
        .all(|(off, ch)| matches!(chars.get(pos + off), Some(c) if *c == ch));
    // `pos` points past the `$`; the preceding boundary is the character
    // before it. wrapping_sub makes a token at the start of the line pass.
    let prev_ok = chars
        .get(pos.wrapping_sub(2))
        .is_none_or(|c| !is_identifier_char(*c));
    let next_ok = chars
        .get(pos + token.chars().count())
        .is_none_or(|c| !is_identifier_char(*c));
    matches && prev_ok && next_ok
}

fn substitute(template: &str, ins: &str, out: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut result = String::with_capacity(template.len());
    let mut pos = 0;
    let mut in_backticks = false;
    while let Some(&ch) = chars.get(pos) {
        if ch == '`' {
            in_backticks = !in_backticks;
            result.push(ch);
            pos += 1;
            continue;
        }
        if ch == '$' && !in_backticks {
            if matches!(chars.get(pos + 1), Some('$')) {
                result.push('$');
                pos += 2;
                continue;
            }
            if token_at(&chars, pos + 1, "in") {
                result.push_str(ins);
                pos += 3;
                continue;
            }
            if token_at(&chars, pos + 1, "out") {
                result.push_str(out);
                pos += 4;
                continue;
            }
        }
        result.push(ch);
        pos += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_inputs_and_output() {
        let result = substitute("plot.py $in > $out", "a.txt b.txt", "graph.png");
        assert_eq!(result, "plot.py a.txt b.txt > graph.png");
    }

    #[test]
    fn leaves_longer_identifiers_alone() {
        assert_eq!(substitute("echo $input", "a", "b"), "echo $input");
        assert_eq!(substitute("echo $output", "a", "b"), "echo $output");
    }

    #[test]
    fn requires_a_boundary_before_the_token() {
        assert_eq!(substitute("echo a$in", "x", "y"), "echo a$in");
        assert_eq!(substitute("echo 1$out", "x", "y"), "echo 1$out");
    }

    #[test]
    fn leaves_backtick_substitution_verbatim() {
        assert_eq!(
            substitute("echo `cat $in` done", "x", "y"),
            "echo `cat $in` done"
        );
    }

    #[test]
    fn double_dollar_escapes() {
        assert_eq!(substitute("echo $$in", "a", "b"), "echo $in");
    }

    #[test]
    fn empty_inputs_substitute_to_nothing() {
        let line = interpolate("plot.py $in", &[], "plot").expect("interpolate");
        assert_eq!(line, "plot.py ");
    }

    #[test]
    fn unmatched_backtick_is_rejected() {
        let err = interpolate("echo `oops", &[], "x").expect_err("invalid");
        assert!(matches!(err, InterpError::InvalidCommand { .. }));
    }
}
