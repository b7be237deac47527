//! Tolerant reader for Valve KeyValues text (`.acf`, `.vdf`, `app_info_print`).

use crate::SteamCmdError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Block(Vec<(String, Value)>),
}

impl Value {
    /// Follow `path` through nested blocks. Keys compare case-insensitively.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |value, key| match value {
            Value::Block(entries) => entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            Value::Str(_) => None,
        })
    }

    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        match self.get(path)? {
            Value::Str(s) => Some(s),
            Value::Block(_) => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Text(String),
    Open,
    Close,
}

/// Parse a document into a root block.
pub fn parse(text: &str) -> Result<Value, SteamCmdError> {
    let tokens = tokenize(text)?;
    let mut tokens = tokens.into_iter();
    let root = parse_block(&mut tokens, true)?;
    Ok(Value::Block(root))
}

/// Parse the block that starts at the first `"<key>"` followed by `{`.
pub fn parse_from_key(text: &str, key: &str) -> Result<Value, SteamCmdError> {
    let needle = format!("\"{key}\"");
    let start = text
        .match_indices(&needle)
        .map(|(idx, _)| idx)
        .find(|idx| {
            text[idx + needle.len()..]
                .trim_start()
                .starts_with('{')
        })
        .ok_or_else(|| SteamCmdError::Vdf(format!("no block named {key}")))?;

    parse(&text[start..])
}

fn parse_block(
    tokens: &mut impl Iterator<Item = Token>,
    top_level: bool,
) -> Result<Vec<(String, Value)>, SteamCmdError> {
    let mut entries = vec![];

    loop {
        let key = match tokens.next() {
            Some(Token::Text(key)) => key,
            Some(Token::Close) if !top_level => return Ok(entries),
            None if top_level => return Ok(entries),
            Some(Token::Close) => {
                // app_info_print output can trail off after the block we want.
                return Ok(entries);
            }
            Some(Token::Open) => return Err(SteamCmdError::Vdf("block without a key".into())),
            None => return Err(SteamCmdError::Vdf("unclosed block".into())),
        };

        match tokens.next() {
            Some(Token::Text(value)) => entries.push((key, Value::Str(value))),
            Some(Token::Open) => entries.push((key, Value::Block(parse_block(tokens, false)?))),
            Some(Token::Close) | None => {
                return Err(SteamCmdError::Vdf(format!("key {key} has no value")))
            }
        }

        if top_level && matches!(entries.last(), Some((_, Value::Block(_)))) {
            // A single root block is all any Steam file holds.
            return Ok(entries);
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, SteamCmdError> {
    let mut tokens = vec![];
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => tokens.push(Token::Open),
            '}' => tokens.push(Token::Close),
            '"' => {
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other) => s.push(other),
                            None => return Err(SteamCmdError::Vdf("dangling escape".into())),
                        },
                        Some(other) => s.push(other),
                        None => return Err(SteamCmdError::Vdf("unterminated string".into())),
                    }
                }
                tokens.push(Token::Text(s));
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {}
            c => {
                let mut s = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '{' || next == '}' || next == '"' {
                        break;
                    }
                    s.push(next);
                    chars.next();
                }
                tokens.push(Token::Text(s));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
"AppState"
{
	"appid"		"1690800"
	"name"		"Satisfactory Dedicated Server"
	"buildid"		"16287459"
	"InstalledDepots"
	{
		"1690802"
		{
			"manifest"		"5429345930150180286"
		}
	}
}
"#;

    #[test]
    fn reads_nested_values() {
        let doc = parse(MANIFEST).unwrap();
        assert_eq!(doc.get_str(&["AppState", "buildid"]), Some("16287459"));
        assert_eq!(doc.get_str(&["appstate", "BUILDID"]), Some("16287459"));
        assert_eq!(
            doc.get_str(&["AppState", "InstalledDepots", "1690802", "manifest"]),
            Some("5429345930150180286")
        );
        assert_eq!(doc.get_str(&["AppState", "InstalledDepots"]), None);
    }

    #[test]
    fn skips_comments_and_escapes() {
        let doc = parse("// header\n\"a\" { \"b\" \"x\\\"y\" }").unwrap();
        assert_eq!(doc.get_str(&["a", "b"]), Some("x\"y"));
    }

    #[test]
    fn unclosed_block_is_an_error() {
        assert!(parse("\"a\" { \"b\" \"c\"").is_err());
    }

    #[test]
    fn finds_block_inside_noisy_output() {
        let output = "Redirecting stderr to 'logs/stderr.txt'\n\
            AppID : 427520, change number : 1/0, last change : Thu Jan  1 1970\n\
            \"427520\"\n{\n\t\"common\"\n\t{\n\t\t\"name\"\t\"Factorio\"\n\t}\n}\n\
            Unloading Steam API...OK\n";

        let doc = parse_from_key(output, "427520").unwrap();
        assert_eq!(doc.get_str(&["427520", "common", "name"]), Some("Factorio"));
    }
}
