// src/builtins/context.rs

use std::borrow::Cow;
use std::collections::BTreeMap;

use super::value::NaslValue;

/// Arguments of one builtin call: positional values plus named ones.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<NaslValue>,
    named: BTreeMap<String, NaslValue>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<NaslValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument.
    pub fn named(mut self, key: impl Into<String>, value: impl Into<NaslValue>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Named argument, treating `Null` as absent.
    pub fn get_by_name(&self, key: &str) -> Option<&NaslValue> {
        self.named.get(key).filter(|v| **v != NaslValue::Null)
    }

    pub fn get_by_num(&self, idx: usize) -> Option<&NaslValue> {
        self.positional.get(idx).filter(|v| **v != NaslValue::Null)
    }

    pub fn get_str_by_name(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get_by_name(key)?.to_str()
    }

    pub fn get_bytes_by_name(&self, key: &str) -> Option<Cow<'_, [u8]>> {
        self.get_by_name(key)?.to_bytes()
    }

    pub fn get_int_by_name(&self, key: &str, default: i64) -> i64 {
        self.get_by_name(key)
            .and_then(NaslValue::to_int)
            .unwrap_or(default)
    }

    pub fn get_str_by_num(&self, idx: usize) -> Option<Cow<'_, str>> {
        self.get_by_num(idx)?.to_str()
    }

    pub fn get_int_by_num(&self, idx: usize, default: i64) -> i64 {
        self.get_by_num(idx)
            .and_then(NaslValue::to_int)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_fall_back_to_defaults() {
        let args = CallArgs::new()
            .arg("file.txt")
            .named("fp", 5i64)
            .named("mode", NaslValue::Null);

        assert_eq!(args.get_str_by_num(0).as_deref(), Some("file.txt"));
        assert_eq!(args.get_int_by_name("fp", -1), 5);
        assert_eq!(args.get_int_by_name("length", 0), 0);
        assert!(args.get_str_by_name("mode").is_none());
        assert_eq!(args.get_int_by_num(3, -1), -1);
    }
}
