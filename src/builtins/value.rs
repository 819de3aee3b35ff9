// src/builtins/value.rs

//! Minimal view of the interpreter's value model.
//!
//! Only what the unsafe builtins consume or produce is modelled: integers,
//! strings, binary data and arrays with sparse indexed slots plus named
//! entries.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

use crate::exec::ArgList;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NaslValue {
    /// Undefined variable or empty array slot.
    #[default]
    Null,
    Int(i64),
    String(String),
    /// Byte string; may hold NUL bytes and non-UTF-8 data.
    Data(Vec<u8>),
    Array(NaslArray),
}

impl NaslValue {
    /// String form of a scalar, as the interpreter converts values for
    /// concatenation. `None` for `Null` and arrays.
    pub fn to_bytes(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            NaslValue::Null | NaslValue::Array(_) => None,
            NaslValue::Int(i) => Some(Cow::Owned(i.to_string().into_bytes())),
            NaslValue::String(s) => Some(Cow::Borrowed(s.as_bytes())),
            NaslValue::Data(d) => Some(Cow::Borrowed(d)),
        }
    }

    /// Lossy text form of a scalar.
    pub fn to_str(&self) -> Option<Cow<'_, str>> {
        match self.to_bytes()? {
            Cow::Borrowed(b) => Some(String::from_utf8_lossy(b)),
            Cow::Owned(b) => Some(Cow::Owned(String::from_utf8_lossy(&b).into_owned())),
        }
    }

    /// Integer form. Strings are read like C `atoi`: optional sign, leading
    /// digits, anything else ignored (no digits gives 0).
    pub fn to_int(&self) -> Option<i64> {
        match self {
            NaslValue::Null | NaslValue::Array(_) => None,
            NaslValue::Int(i) => Some(*i),
            NaslValue::String(s) => Some(atoi(s.as_bytes())),
            NaslValue::Data(d) => Some(atoi(d)),
        }
    }

    /// Size as the interpreter reports it for strings and data.
    pub fn byte_len(&self) -> usize {
        self.to_bytes().map(|b| b.len()).unwrap_or(0)
    }

    pub fn as_array(&self) -> Option<&NaslArray> {
        match self {
            NaslValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            NaslValue::Null => "null",
            NaslValue::Int(_) => "int",
            NaslValue::String(_) => "string",
            NaslValue::Data(_) => "data",
            NaslValue::Array(_) => "array",
        }
    }
}

impl From<i64> for NaslValue {
    fn from(i: i64) -> Self {
        NaslValue::Int(i)
    }
}

impl From<&str> for NaslValue {
    fn from(s: &str) -> Self {
        NaslValue::String(s.to_string())
    }
}

impl From<String> for NaslValue {
    fn from(s: String) -> Self {
        NaslValue::String(s)
    }
}

impl From<Vec<u8>> for NaslValue {
    fn from(d: Vec<u8>) -> Self {
        NaslValue::Data(d)
    }
}

impl From<NaslArray> for NaslValue {
    fn from(a: NaslArray) -> Self {
        NaslValue::Array(a)
    }
}

fn atoi(bytes: &[u8]) -> i64 {
    let s = bytes.trim_ascii_start();
    let (neg, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let n = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0')));
    if neg { n.wrapping_neg() } else { n }
}

/// Array with sparse indexed slots and named entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaslArray {
    indexed: Vec<NaslValue>,
    named: BTreeMap<String, NaslValue>,
}

impl NaslArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set slot `idx`, growing the array with `Null` holes as needed.
    pub fn set(&mut self, idx: usize, value: impl Into<NaslValue>) -> &mut Self {
        if idx >= self.indexed.len() {
            self.indexed.resize(idx + 1, NaslValue::Null);
        }
        self.indexed[idx] = value.into();
        self
    }

    pub fn push(&mut self, value: impl Into<NaslValue>) -> &mut Self {
        self.indexed.push(value.into());
        self
    }

    pub fn set_named(&mut self, key: impl Into<String>, value: impl Into<NaslValue>) -> &mut Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, idx: usize) -> Option<&NaslValue> {
        self.indexed.get(idx)
    }

    pub fn get_named(&self, key: &str) -> Option<&NaslValue> {
        self.named.get(key)
    }

    /// One past the highest indexed slot.
    pub fn max_index(&self) -> usize {
        self.indexed.len()
    }

    pub fn has_named(&self) -> bool {
        !self.named.is_empty()
    }

    /// Turn the indexed slots into a child argument list.
    ///
    /// Scalars become arguments (integers in decimal, strings and data as
    /// raw bytes). `Null` slots and nested arrays leave a hole. Named
    /// entries are carried over by key only, so the launcher can warn.
    pub fn to_arg_list(&self) -> ArgList {
        let mut args = ArgList::new();
        for slot in &self.indexed {
            match slot.to_bytes() {
                Some(bytes) => {
                    args.push(OsString::from_vec(bytes.into_owned()));
                }
                None => {
                    args.push_hole();
                }
            }
        }
        for key in self.named.keys() {
            args.push_named(key.clone());
        }
        args
    }
}

impl<V: Into<NaslValue>> FromIterator<V> for NaslArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            indexed: iter.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }
}
