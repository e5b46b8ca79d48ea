//! Typed view of the `slider_mapping` section
//!
//! Users write slots as a bare string, a list of strings, or a list mixing
//! strings with numbers and booleans. Everything is coerced once on load into
//! [`SliderSlot`]; entries that cannot be coerced are kept verbatim.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Names bound to one slider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliderSlot {
    Empty,
    Names(Vec<String>),
}

impl SliderSlot {
    /// Coerce a raw YAML slot value, or explain why it can't be.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(SliderSlot::Empty),
            Value::Sequence(items) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Null => continue,
                        other => names.push(scalar_to_string(other).ok_or_else(|| {
                            format!("list element {:?} is not a scalar", other)
                        })?),
                    }
                }
                Ok(SliderSlot::Names(names))
            }
            other => scalar_to_string(other)
                .map(|name| SliderSlot::Names(vec![name]))
                .ok_or_else(|| format!("value {:?} is neither a name nor a list", other)),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            SliderSlot::Empty => &[],
            SliderSlot::Names(names) => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| n == name)
    }

    fn remove(&mut self, name: &str) -> bool {
        match self {
            SliderSlot::Empty => false,
            SliderSlot::Names(names) => {
                let before = names.len();
                names.retain(|n| n != name);
                names.len() != before
            }
        }
    }

    fn push(&mut self, name: &str) {
        match self {
            SliderSlot::Empty => *self = SliderSlot::Names(vec![name.to_string()]),
            SliderSlot::Names(names) => names.push(name.to_string()),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            SliderSlot::Empty => Value::Null,
            SliderSlot::Names(names) => {
                Value::Sequence(names.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn key_to_index(key: &Value) -> Option<u32> {
    match key {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Slot { key: Value, index: u32, slot: SliderSlot },
    /// Left exactly as found
    Malformed {
        key: Value,
        index: Option<u32>,
        value: Value,
    },
}

/// Ordered slider mapping, keeping each slot's original key
#[derive(Debug, Clone, Default)]
pub struct SliderMapping {
    entries: Vec<Entry>,
}

impl SliderMapping {
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let entries = mapping
            .iter()
            .map(|(key, value)| {
                let index = key_to_index(key);
                let coerced = index
                    .ok_or_else(|| format!("key {:?} is not a slider index", key))
                    .and_then(|index| SliderSlot::from_value(value).map(|slot| (index, slot)));

                match coerced {
                    Ok((index, slot)) => Entry::Slot {
                        key: key.clone(),
                        index,
                        slot,
                    },
                    Err(reason) => {
                        warn!("Skipping malformed slider_mapping entry: {}", reason);
                        Entry::Malformed {
                            key: key.clone(),
                            index,
                            value: value.clone(),
                        }
                    }
                }
            })
            .collect();

        Self { entries }
    }

    /// Remove `name` from every slot. Returns the indices it was removed from.
    ///
    /// Malformed lists lose matching string elements; everything else in
    /// them stays as found.
    pub fn remove_everywhere(&mut self, name: &str) -> Vec<u32> {
        let mut removed_from = Vec::new();
        for entry in &mut self.entries {
            let (index, removed) = match entry {
                Entry::Slot { index, slot, .. } => (Some(*index), slot.remove(name)),
                Entry::Malformed {
                    index,
                    value: Value::Sequence(items),
                    ..
                } => {
                    let before = items.len();
                    items.retain(|item| item.as_str() != Some(name));
                    (*index, items.len() != before)
                }
                Entry::Malformed { .. } => (None, false),
            };
            if let (Some(index), true) = (index, removed) {
                removed_from.push(index);
            }
        }
        removed_from
    }

    /// Append `name` to the slot for `index`, creating it at the end if needed.
    ///
    /// A malformed entry for `index` is replaced in place by the new slot.
    pub fn append(&mut self, index: u32, name: &str) {
        let position = self.entries.iter().position(|entry| match entry {
            Entry::Slot { index: i, .. } => *i == index,
            Entry::Malformed { index: i, .. } => *i == Some(index),
        });

        let Some(position) = position else {
            self.entries.push(Entry::Slot {
                key: Value::Number(index.into()),
                index,
                slot: SliderSlot::Names(vec![name.to_string()]),
            });
            return;
        };

        let replacement = match &mut self.entries[position] {
            Entry::Slot { slot, .. } => {
                slot.push(name);
                return;
            }
            Entry::Malformed { key, value, .. } => {
                warn!("Replacing malformed slider {} entry {:?}", index, value);
                Entry::Slot {
                    key: key.clone(),
                    index,
                    slot: SliderSlot::Names(vec![name.to_string()]),
                }
            }
        };
        self.entries[position] = replacement;
    }

    pub fn slot(&self, index: u32) -> Option<&SliderSlot> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Slot { index: i, slot, .. } if *i == index => Some(slot),
            _ => None,
        })
    }

    /// Coerced bindings by slider index. Malformed entries are left out.
    pub fn bindings(&self) -> BTreeMap<u32, Vec<String>> {
        let mut bindings: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for entry in &self.entries {
            if let Entry::Slot { index, slot, .. } = entry {
                bindings
                    .entry(*index)
                    .or_default()
                    .extend(slot.names().iter().cloned());
            }
        }
        bindings
    }

    pub fn to_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Slot { key, slot, .. } => (key.clone(), slot.to_value()),
                Entry::Malformed { key, value, .. } => (key.clone(), value.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> SliderMapping {
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        SliderMapping::from_mapping(&mapping)
    }

    #[test]
    fn test_bare_string_is_single_element_list() {
        let slot = SliderSlot::from_value(&Value::String("foo.exe".to_string())).unwrap();
        assert_eq!(slot, SliderSlot::Names(vec!["foo.exe".to_string()]));
    }

    #[test]
    fn test_mixed_list_coerces_to_strings() {
        let value: Value = serde_yaml::from_str("[master, 42, true, null, 1.5]").unwrap();
        let slot = SliderSlot::from_value(&value).unwrap();
        assert_eq!(slot.names(), ["master", "42", "true", "1.5"]);
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let value: Value = serde_yaml::from_str("[a, [b]]").unwrap();
        assert!(SliderSlot::from_value(&value).is_err());
        let value: Value = serde_yaml::from_str("{a: b}").unwrap();
        assert!(SliderSlot::from_value(&value).is_err());
    }

    #[test]
    fn test_malformed_entries_round_trip() {
        let map = mapping("0: master\nknobs: {a: 1}\n2: [x, {y: z}]\n");

        assert_eq!(map.bindings().len(), 1);
        let out = map.to_mapping();
        let knobs = out.get(Value::String("knobs".to_string())).unwrap();
        assert_eq!(knobs, &serde_yaml::from_str::<Value>("{a: 1}").unwrap());
        assert!(out.get(Value::Number(2.into())).unwrap().is_sequence());
    }

    #[test]
    fn test_string_keys_are_indices() {
        let map = mapping("\"3\": spotify\n");
        assert!(map.slot(3).unwrap().contains("spotify"));

        let out = map.to_mapping();
        assert!(out.contains_key(Value::String("3".to_string())));
    }

    #[test]
    fn test_remove_and_append() {
        let mut map = mapping("1: [foo.exe, bar.exe]\n2: foo.exe\n");

        assert_eq!(map.remove_everywhere("foo.exe"), vec![1, 2]);
        map.append(4, "foo.exe");
        map.append(1, "baz.exe");

        let bindings = map.bindings();
        assert_eq!(bindings[&1], vec!["bar.exe", "baz.exe"]);
        assert!(bindings[&2].is_empty());
        assert_eq!(bindings[&4], vec!["foo.exe"]);
    }

    #[test]
    fn test_remove_reaches_into_malformed_lists() {
        let mut map = mapping("1: [foo.exe, {x: y}]\n2: {foo.exe: 1}\n");

        assert_eq!(map.remove_everywhere("foo.exe"), vec![1]);

        let out = map.to_mapping();
        assert_eq!(
            out.get(Value::Number(1.into())).unwrap(),
            &serde_yaml::from_str::<Value>("[{x: y}]").unwrap()
        );
        assert_eq!(
            out.get(Value::Number(2.into())).unwrap(),
            &serde_yaml::from_str::<Value>("{foo.exe: 1}").unwrap()
        );
    }

    #[test]
    fn test_append_replaces_malformed_target() {
        let mut map = mapping("0: {a: 1}\n1: {b: 2}\n");
        map.append(0, "vlc");

        let out = map.to_mapping();
        assert_eq!(out.len(), 2);
        assert_eq!(map.slot(0).unwrap().names(), ["vlc"]);
        assert!(out.get(Value::Number(1.into())).unwrap().is_mapping());
    }

    #[test]
    fn test_empty_slot_serializes_as_null() {
        let mut map = mapping("0:\n");
        assert_eq!(map.slot(0), Some(&SliderSlot::Empty));
        assert_eq!(map.to_mapping().get(Value::Number(0.into())), Some(&Value::Null));

        map.append(0, "discord");
        assert_eq!(map.slot(0).unwrap().names(), ["discord"]);
    }
}
