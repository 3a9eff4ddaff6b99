//! `{name}` placeholder expansion.
//!
//! A single pass over the input:
//! - `{{` and `}}` produce literal braces,
//! - `${...}` is a server-side request variable and is copied verbatim,
//! - `{name}` (an identifier) is replaced from the environment,
//! - any other brace is literal.

/// A placeholder that has no value in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved(pub String);

/// Expands placeholders in `input`.
///
/// Unknown placeholders are left verbatim unless `strict` is set, in which
/// case the first one is reported.
pub fn expand<'a, F>(input: &str, strict: bool, lookup: F) -> Result<String, Unresolved>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match (bytes[i], next) {
            (b'{', Some(b'{')) | (b'}', Some(b'}')) => {
                out.push_str(&input[literal_start..i]);
                out.push(char::from(bytes[i]));
                i += 2;
                literal_start = i;
            }
            (b'$', Some(b'{')) => {
                i = input[i + 2..]
                    .find('}')
                    .map_or(bytes.len(), |offset| i + 2 + offset + 1);
            }
            (b'{', _) => {
                let len = identifier_len(&bytes[i + 1..]);
                if len > 0 && bytes.get(i + 1 + len) == Some(&b'}') {
                    let name = &input[i + 1..i + 1 + len];
                    match lookup(name) {
                        Some(value) => {
                            out.push_str(&input[literal_start..i]);
                            out.push_str(value);
                            literal_start = i + len + 2;
                        }
                        None if strict => return Err(Unresolved(name.to_string())),
                        None => {}
                    }
                    i += len + 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    out.push_str(&input[literal_start..]);
    Ok(out)
}

fn identifier_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(first) if first.is_ascii_alphabetic() || *first == b'_' => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
        _ => 0,
    }
}
