use std::rc::Rc;

use crate::objects::StrObj;
use crate::value::Value;

const TABLE_MAX_LOAD: f64 = 0.75;

/// A slot is in one of three states:
/// - empty: `key == None` and `value == Nil`
/// - tombstone: `key == None` and `value == Bool(true)`
/// - occupied: `key == Some(..)`
///
/// Tombstones keep probe chains intact after a deletion.
#[derive(Clone)]
struct Entry {
  key: Option<Rc<StrObj>>,
  value: Value,
}

/// An open-addressed, linear-probe hash table keyed by interned string
/// objects. Keys compare by identity; interning guarantees that byte-equal
/// strings share one allocation, so this is sound.
pub struct Table {
  /// The number of occupied slots plus tombstones.
  len: usize,
  entries: Vec<Entry>,
}

impl Table {
  pub fn new() -> Table {
    Table {
      len: 0,
      entries: Vec::new(),
    }
  }

  fn cap(&self) -> usize {
    self.entries.len()
  }

  /// Looks up the value stored under the given key.
  pub fn get(&self, key: &Rc<StrObj>) -> Option<Value> {
    if self.len == 0 {
      return None;
    }

    let entry = &self.entries[find_entry(&self.entries, key)];
    entry.key.as_ref()?;

    Some(entry.value.clone())
  }

  /// Inserts or overwrites the value stored under the given key. Returns
  /// true when the key was not previously present.
  pub fn set(&mut self, key: Rc<StrObj>, value: Value) -> bool {
    if self.len + 1 > (self.cap() as f64 * TABLE_MAX_LOAD) as usize {
      let new_cap = grow_capacity(self.cap());
      self.adjust_capacity(new_cap);
    }

    let idx = find_entry(&self.entries, &key);
    let entry = &mut self.entries[idx];
    let is_new_key = entry.key.is_none();

    // Only a truly empty slot grows the count. A reused tombstone is
    // already accounted for.
    if is_new_key && matches!(entry.value, Value::Nil) {
      self.len += 1;
    }

    entry.key = Some(key);
    entry.value = value;

    is_new_key
  }

  /// Removes the entry stored under the given key, leaving a tombstone in
  /// its slot. Returns true when something was actually removed.
  pub fn delete(&mut self, key: &Rc<StrObj>) -> bool {
    if self.len == 0 {
      return false;
    }

    let idx = find_entry(&self.entries, key);
    let entry = &mut self.entries[idx];

    if entry.key.is_none() {
      return false;
    }

    entry.key = None;
    entry.value = Value::Bool(true);

    true
  }

  /// Probes for a key whose payload matches the given bytes. This is the
  /// lookup the string interner needs: it compares by content, because at
  /// this point no interned object exists yet to compare identities with.
  pub fn find_string(&self, data: &str, hash: u32) -> Option<Rc<StrObj>> {
    if self.len == 0 {
      return None;
    }

    let cap = self.cap();
    let mut index = hash as usize % cap;

    loop {
      let entry = &self.entries[index];

      match &entry.key {
        Some(key) => {
          if key.hash == hash && key.data.len() == data.len() && key.data == data {
            return Some(Rc::clone(key));
          }
        }
        // A truly empty slot ends the probe chain; a tombstone does not.
        None if matches!(entry.value, Value::Nil) => return None,
        None => {}
      }

      index = (index + 1) % cap;
    }
  }

  /// Rebuilds the table into a fresh array of the given capacity. Occupied
  /// entries are rehashed; tombstones are dropped, so the count is rebuilt
  /// from scratch.
  fn adjust_capacity(&mut self, new_cap: usize) {
    let mut entries = vec![
      Entry {
        key: None,
        value: Value::Nil,
      };
      new_cap
    ];

    self.len = 0;
    for entry in self.entries.iter() {
      if let Some(key) = &entry.key {
        let dest = find_entry(&entries, key);
        entries[dest] = Entry {
          key: Some(Rc::clone(key)),
          value: entry.value.clone(),
        };
        self.len += 1;
      }
    }

    self.entries = entries;
  }
}

impl Default for Table {
  fn default() -> Self {
    Self::new()
  }
}

/// Finds the slot the given key lives in, or the slot it should be inserted
/// into: the first tombstone passed on the probe path if there was one,
/// otherwise the empty slot that ended the probe.
fn find_entry(entries: &[Entry], key: &Rc<StrObj>) -> usize {
  let cap = entries.len();
  let mut index = key.hash as usize % cap;
  let mut tombstone: Option<usize> = None;

  loop {
    let entry = &entries[index];

    match &entry.key {
      None => {
        if matches!(entry.value, Value::Nil) {
          return tombstone.unwrap_or(index);
        }

        if tombstone.is_none() {
          tombstone = Some(index);
        }
      }
      Some(k) if Rc::ptr_eq(k, key) => return index,
      Some(_) => {}
    }

    index = (index + 1) % cap;
  }
}

/// The capacity ladder: 0 jumps straight to 8, everything else doubles.
fn grow_capacity(cap: usize) -> usize {
  if cap < 8 {
    8
  } else {
    cap * 2
  }
}
