use super::Coder;
use crate::core::{Container, Result, StoreError, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Flat `"key"=>"value"` text, the hstore layout. Every value is stored as
/// text (or `NULL`); typed keys re-cast them on load.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueCoder;

fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            chars: raw.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(StoreError::Coder(format!(
                "expected '{}' in key-value text, found '{}'",
                expected, c
            ))),
            None => Err(StoreError::Coder(format!(
                "expected '{}' in key-value text, found end of input",
                expected
            ))),
        }
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => match self.chars.next() {
                    Some(c) => out.push(c),
                    None => return Err(StoreError::Coder("dangling escape".to_string())),
                },
                Some('"') => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(StoreError::Coder("unterminated string".to_string())),
            }
        }
    }

    fn value(&mut self) -> Result<Value> {
        if self.chars.peek() == Some(&'"') {
            return self.quoted().map(Value::Text);
        }
        let word: String = std::iter::from_fn(|| self.chars.next_if(|c| c.is_ascii_alphabetic())).collect();
        if word.eq_ignore_ascii_case("null") {
            Ok(Value::Null)
        } else {
            Err(StoreError::Coder(format!("unexpected bare word '{}'", word)))
        }
    }

    fn parse(mut self) -> Result<Container> {
        let mut map = Container::new();
        self.skip_whitespace();
        while self.chars.peek().is_some() {
            let key = self.quoted()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.expect('>')?;
            self.skip_whitespace();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_whitespace();
            if self.chars.peek().is_some() {
                self.expect(',')?;
                self.skip_whitespace();
            }
        }
        Ok(map)
    }
}

impl Coder for KeyValueCoder {
    fn name(&self) -> &'static str {
        "key_value"
    }

    fn dump(&self, value: &Value) -> Result<String> {
        let map = value.as_map().ok_or_else(|| {
            StoreError::Coder(format!(
                "key-value coder can only dump maps, got {}",
                value.type_name()
            ))
        })?;

        let pairs: Vec<String> = map
            .iter()
            .map(|(key, value)| match value.to_store_text() {
                Some(text) => format!("{}=>{}", quote(key), quote(&text)),
                None => format!("{}=>NULL", quote(key)),
            })
            .collect();
        Ok(pairs.join(", "))
    }

    fn load(&self, raw: &str) -> Result<Value> {
        Parser::new(raw).parse().map(Value::Map)
    }
}
