use std::fmt;
use std::fmt::Formatter;

use log::*;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Result, WashError};

/// Value stored under a result key.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Null,
    Text(String),
    /// One entry per context item: result nodes for nested context expressions,
    /// scalars for a data query fanned out over several nodes.
    List(Vec<ResultValue>),
    Node(ResultNode),
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Null => write!(f, "Null"),
            ResultValue::Text(_) => write!(f, "Text"),
            ResultValue::List(list) => write!(f, "List(length = {})", list.len()),
            ResultValue::Node(node) => write!(f, "Node(keys = {})", node.len()),
        }
    }
}

impl From<String> for ResultValue {
    fn from(text: String) -> Self {
        ResultValue::Text(text)
    }
}

impl From<Option<String>> for ResultValue {
    fn from(text: Option<String>) -> Self {
        text.map(ResultValue::Text).unwrap_or(ResultValue::Null)
    }
}

impl From<ResultNode> for ResultValue {
    fn from(node: ResultNode) -> Self {
        ResultValue::Node(node)
    }
}

impl ResultValue {
    /// Merges `new` into `self`. Nodes combine their attributes, lists of equal
    /// length merge element-wise, anything else is replaced by the new value.
    pub fn merge(&mut self, new: ResultValue) -> Result<()> {
        match (self, new) {
            (ResultValue::Node(existing), ResultValue::Node(new)) => existing.merge(new),
            (ResultValue::List(existing), ResultValue::List(new)) => {
                if existing.len() != new.len() {
                    return Err(WashError::runtime(format!(
                        "cannot merge a list of {} item(s) into a list of {} item(s)",
                        new.len(),
                        existing.len()
                    )));
                }
                for (existing_item, new_item) in existing.iter_mut().zip(new) {
                    existing_item.merge(new_item)?;
                }
                Ok(())
            }
            (slot, new) => {
                trace!("replacing {} with {}", slot, new);
                *slot = new;
                Ok(())
            }
        }
    }
}

/// One object of the result tree. Keys keep their insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultNode {
    attributes: Vec<(String, ResultValue)>,
}

impl ResultNode {
    pub fn new() -> Self {
        ResultNode::default()
    }

    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Adds `value` under `key`, merging with a value already stored there.
    pub fn add(&mut self, key: &str, value: ResultValue) -> Result<()> {
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some((_, existing)) => existing.merge(value),
            None => {
                self.attributes.push((key.to_string(), value));
                Ok(())
            }
        }
    }

    pub fn merge(&mut self, other: ResultNode) -> Result<()> {
        for (key, value) in other.attributes {
            self.add(&key, value)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| WashError::runtime(err.to_string()))
    }
}

impl Serialize for ResultValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ResultValue::Null => serializer.serialize_unit(),
            ResultValue::Text(text) => serializer.serialize_str(text),
            ResultValue::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for value in list {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            ResultValue::Node(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for ResultNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
