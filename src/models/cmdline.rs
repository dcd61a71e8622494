use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::Number;

/// Kernel command line parameters, keyed by parameter name.
/// Keys serialize in sorted order.
pub type Cmdline = BTreeMap<String, CmdlineValue>;

/// Value of a single command line parameter.
///
/// The service never interprets these; the tree only has to survive the
/// trip from the descriptor file to the chainloader unchanged.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CmdlineValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<CmdlineValue>),
    Map(BTreeMap<String, CmdlineValue>),
}

impl CmdlineValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CmdlineValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CmdlineValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CmdlineValue {
    fn from(s: &str) -> Self {
        CmdlineValue::String(s.to_owned())
    }
}

impl From<String> for CmdlineValue {
    fn from(s: String) -> Self {
        CmdlineValue::String(s)
    }
}

impl From<bool> for CmdlineValue {
    fn from(b: bool) -> Self {
        CmdlineValue::Bool(b)
    }
}

impl From<i64> for CmdlineValue {
    fn from(n: i64) -> Self {
        CmdlineValue::Number(n.into())
    }
}

impl From<u64> for CmdlineValue {
    fn from(n: u64) -> Self {
        CmdlineValue::Number(n.into())
    }
}

impl From<Vec<CmdlineValue>> for CmdlineValue {
    fn from(list: Vec<CmdlineValue>) -> Self {
        CmdlineValue::List(list)
    }
}

impl From<BTreeMap<String, CmdlineValue>> for CmdlineValue {
    fn from(map: BTreeMap<String, CmdlineValue>) -> Self {
        CmdlineValue::Map(map)
    }
}

struct CmdlineValueVisitor;

impl<'de> Visitor<'de> for CmdlineValueVisitor {
    type Value = CmdlineValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CmdlineValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CmdlineValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(CmdlineValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(CmdlineValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(CmdlineValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Number::from_f64(v)
            .map(CmdlineValue::Number)
            .ok_or_else(|| E::custom(format!("{v} is not a finite number")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(CmdlineValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(CmdlineValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            list.push(value);
        }
        Ok(CmdlineValue::List(list))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, CmdlineValue>()? {
            entries.insert(key, value);
        }
        Ok(CmdlineValue::Map(entries))
    }
}

impl<'de> Deserialize<'de> for CmdlineValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CmdlineValueVisitor)
    }
}
