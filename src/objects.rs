use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// A heap-allocated runtime object. Strings are the only kind this version
/// of the language allocates, but the enum is the extension point for the
/// object kinds that come later (functions, closures).
#[derive(Clone)]
pub enum Object {
  Str(Rc<StrObj>),
}

/// An immutable string object. The hash is computed once, at allocation,
/// and reused by every table lookup the string participates in.
pub struct StrObj {
  pub data: String,
  pub hash: u32,
}

impl StrObj {
  pub fn new(data: String) -> StrObj {
    let hash = hash_bytes(data.as_bytes());
    StrObj { data, hash }
  }
}

/// 32-bit FNV-1a over a byte sequence.
pub fn hash_bytes(bytes: &[u8]) -> u32 {
  let mut hash = 2166136261u32;

  for byte in bytes {
    hash ^= *byte as u32;
    hash = hash.wrapping_mul(16777619);
  }

  hash
}

impl PartialEq for Object {
  /// Since strings are interned, byte-equal strings share one allocation
  /// and the identity check settles almost every comparison.
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Object::Str(a), Object::Str(b)) => Rc::ptr_eq(a, b) || a.data == b.data,
    }
  }
}

impl Display for Object {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Object::Str(s) => write!(f, "{}", s.data),
    }
  }
}

impl Debug for Object {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Object::Str(s) => write!(f, "'{}'", s.data),
    }
  }
}
