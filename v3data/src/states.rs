//! State region definitions (`map_data/state_regions/*.txt`).
//!
//! The files are Paradox script:
//! ```text
//! STATE_SVEALAND = {
//!     id = 1
//!     provinces = { "x5F2A3D" "xC0FFEE" }
//!     traits = { "state_trait_good_soils" }
//! }
//! ```
//! Only the state name and its `provinces` list matter here; every other
//! field is skipped.

use crate::color::RegionId;
use crate::error::LoadError;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use walkdir::WalkDir;

/// One named state and the regions that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRegion {
    /// State name without the `STATE_` prefix.
    pub name: String,
    pub provinces: Vec<RegionId>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    LeftBrace,
    RightBrace,
    Equals,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
            Token::LeftBrace => write!(f, "'{{'"),
            Token::RightBrace => write!(f, "'}}'"),
            Token::Equals => write!(f, "'='"),
        }
    }
}

/// A syntax problem, with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntaxError {
    line: u64,
    reason: String,
}

impl SyntaxError {
    fn new(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

fn tokenize(contents: &str) -> Result<Vec<(Token, u64)>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut line = 1u64;
    let mut chars = contents.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&nc) = chars.peek() {
                    if nc == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '{' => {
                tokens.push((Token::LeftBrace, line));
                chars.next();
            }
            '}' => {
                tokens.push((Token::RightBrace, line));
                chars.next();
            }
            '=' => {
                tokens.push((Token::Equals, line));
                chars.next();
            }
            '"' => {
                let start = line;
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                for nc in chars.by_ref() {
                    if nc == '"' {
                        closed = true;
                        break;
                    }
                    if nc == '\n' {
                        line += 1;
                    }
                    s.push(nc);
                }
                if !closed {
                    return Err(SyntaxError::new(start, "unterminated string"));
                }
                tokens.push((Token::Quoted(s), start));
            }
            _ => {
                let mut s = String::new();
                while let Some(&nc) = chars.peek() {
                    if nc.is_whitespace() || matches!(nc, '=' | '{' | '}' | '#' | '"') {
                        break;
                    }
                    s.push(nc);
                    chars.next();
                }
                tokens.push((Token::Word(s), line));
            }
        }
    }
    Ok(tokens)
}

struct Cursor {
    tokens: Vec<(Token, u64)>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> u64 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Result<Token, SyntaxError> {
        let line = self.line();
        let tok = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| SyntaxError::new(line, "unexpected end of file"))?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        let line = self.line();
        let tok = self.next()?;
        if tok == expected {
            Ok(())
        } else {
            Err(SyntaxError::new(
                line,
                format!("expected {}, found {}", expected, tok),
            ))
        }
    }

    /// Skips one value: a scalar, or a brace block including nested blocks.
    fn skip_value(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        match self.next()? {
            Token::Word(_) | Token::Quoted(_) => Ok(()),
            Token::LeftBrace => {
                let mut depth = 1usize;
                while depth > 0 {
                    match self.next()? {
                        Token::LeftBrace => depth += 1,
                        Token::RightBrace => depth -= 1,
                        _ => {}
                    }
                }
                Ok(())
            }
            other => Err(SyntaxError::new(
                line,
                format!("expected a value, found {}", other),
            )),
        }
    }
}

fn parse_province_list(cursor: &mut Cursor) -> Result<Vec<RegionId>, SyntaxError> {
    cursor.expect(Token::LeftBrace)?;
    let mut provinces = Vec::new();
    loop {
        let line = cursor.line();
        match cursor.next()? {
            Token::RightBrace => return Ok(provinces),
            Token::Quoted(key) | Token::Word(key) => {
                let id = key
                    .parse::<RegionId>()
                    .map_err(|e| SyntaxError::new(line, format!("bad province key: {}", e)))?;
                provinces.push(id);
            }
            other => {
                return Err(SyntaxError::new(
                    line,
                    format!("unexpected {} in province list", other),
                ));
            }
        }
    }
}

/// Parses the body of one state block, after its opening brace.
fn parse_state_body(cursor: &mut Cursor) -> Result<Vec<RegionId>, SyntaxError> {
    let mut provinces = Vec::new();
    loop {
        let line = cursor.line();
        match cursor.next()? {
            Token::RightBrace => return Ok(provinces),
            Token::Word(key) | Token::Quoted(key) => {
                if cursor.peek() != Some(&Token::Equals) {
                    // Bare value inside the block, e.g. a list item
                    continue;
                }
                cursor.next()?;
                if key == "provinces" {
                    provinces.extend(parse_province_list(cursor)?);
                } else {
                    cursor.skip_value()?;
                }
            }
            Token::LeftBrace => {
                // Anonymous nested block
                cursor.pos -= 1;
                cursor.skip_value()?;
            }
            Token::Equals => {
                return Err(SyntaxError::new(line, "assignment without a key"));
            }
        }
    }
}

fn parse_states(contents: &str) -> Result<Vec<StateRegion>, SyntaxError> {
    let mut cursor = Cursor {
        tokens: tokenize(contents)?,
        pos: 0,
    };
    let mut states = Vec::new();

    while cursor.peek().is_some() {
        let line = cursor.line();
        let name = match cursor.next()? {
            Token::Word(name) => name,
            other => {
                return Err(SyntaxError::new(
                    line,
                    format!("expected a state name, found {}", other),
                ));
            }
        };
        cursor.expect(Token::Equals)?;

        if cursor.peek() == Some(&Token::LeftBrace) {
            cursor.next()?;
            let provinces = parse_state_body(&mut cursor)?;
            if !provinces.is_empty() {
                states.push(StateRegion {
                    name: name.strip_prefix("STATE_").unwrap_or(&name).to_string(),
                    provinces,
                });
            }
        } else {
            cursor.skip_value()?;
        }
    }

    Ok(states)
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    let file = File::open(path).map_err(LoadError::io(path))?;
    // UTF-8 with BOM sniffing; the game ships these with a BOM.
    let mut reader = BufReader::new(DecodeReaderBytesBuilder::new().build(file));
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(LoadError::io(path))?;
    Ok(contents)
}

/// Parses a single state region file.
pub fn load_state_file(path: &Path) -> Result<Vec<StateRegion>, LoadError> {
    let contents = read_text(path)?;
    parse_states(&contents).map_err(|e| LoadError::malformed(path, e.line, e.reason))
}

/// Parses every file in a state regions directory, in file-name order.
///
/// A region listed by more than one state keeps the last definition seen.
pub fn load_state_regions(dir: &Path) -> Result<Vec<StateRegion>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::SourceNotFound(dir.to_path_buf()));
    }

    let mut states = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let parsed = load_state_file(entry.path())?;
        log::debug!(
            "{}: {} states",
            entry.path().display().to_string().replace('\\', "/"),
            parsed.len()
        );
        states.extend(parsed);
    }

    log::info!(
        "Loaded {} states with {} provinces",
        states.len(),
        states.iter().map(|s| s.provinces.len()).sum::<usize>()
    );
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
# Scandinavia
STATE_SVEALAND = {
    id = 1
    subsistence_building = "building_subsistence_farms"
    provinces = { "x5F2A3D" "xC0FFEE" }
    traits = { "state_trait_good_soils" }
    city = "x5F2A3D"
    arable_resources = { "bg_wheat_farms" "bg_livestock_ranches" }
    capped_resources = {
        bg_logging = 12
    }
    resource = {
        type = "bg_gold_fields"
        undiscovered_amount = 2
    }
}

STATE_NORRLAND = {
    id = 2
    provinces = { "x010203" }
}
"#;

    #[test]
    fn test_parse_states_extracts_names_and_provinces() {
        let states = parse_states(SAMPLE).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].name, "SVEALAND");
        assert_eq!(
            states[0].provinces,
            vec![
                "5F2A3D".parse::<RegionId>().unwrap(),
                "C0FFEE".parse::<RegionId>().unwrap()
            ]
        );
        assert_eq!(states[1].name, "NORRLAND");
        assert_eq!(states[1].provinces.len(), 1);
    }

    #[test]
    fn test_parse_states_unbalanced_braces_is_fatal() {
        let err = parse_states("STATE_A = { provinces = { \"x000001\" }").unwrap_err();
        assert!(err.reason.contains("end of file"), "{}", err.reason);
    }

    #[test]
    fn test_parse_states_bad_province_key_reports_line() {
        let err = parse_states("STATE_A = {\n  provinces = { \"xZZZZZZ\" }\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("bad province key"));
    }

    #[test]
    fn test_parse_states_unterminated_string() {
        let err = parse_states("STATE_A = { provinces = { \"x000001 } }").unwrap_err();
        assert!(err.reason.contains("unterminated"));
    }

    #[test]
    fn test_load_state_regions_reads_directory() {
        let dir = tempdir().unwrap();
        let mut a = File::create(dir.path().join("00_a.txt")).unwrap();
        write!(a, "STATE_A = {{ provinces = {{ \"x000001\" }} }}").unwrap();
        let mut b = File::create(dir.path().join("01_b.txt")).unwrap();
        // BOM-prefixed file
        b.write_all(b"\xEF\xBB\xBFSTATE_B = { provinces = { \"x000002\" \"x000003\" } }")
            .unwrap();

        let states = load_state_regions(dir.path()).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].name, "A");
        assert_eq!(states[1].name, "B");
        assert_eq!(states[1].provinces.len(), 2);
    }

    #[test]
    fn test_load_state_regions_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_state_regions(&missing),
            Err(LoadError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_load_state_file_malformed_carries_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        std::fs::write(&path, "STATE_A = { provinces = { ").unwrap();
        match load_state_file(&path) {
            Err(LoadError::Malformed { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }
}
