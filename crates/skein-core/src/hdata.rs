// Copyright 2026 The Skein Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reflection surfaces (spec §4.J): `hdata` exposes core structures to
//! plugins generically by field name, with a schema gating which fields a
//! plugin may write; `infolist` is the flat, point-in-time snapshot form
//! used when a plugin wants to enumerate rather than navigate.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

/// One field value, typed loosely enough to cover everything a reflected
/// structure exposes (spec GLOSSARY "hdata value").
#[derive(Debug, Clone, PartialEq)]
pub enum HdataValue {
    Char(char),
    Integer(i64),
    Long(i64),
    String(String),
    Pointer(u64),
    Time(i64),
}

impl HdataValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            HdataValue::Integer(v) | HdataValue::Long(v) | HdataValue::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HdataValue::String(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HdataField {
    pub name: &'static str,
    pub writable: bool,
}

/// The field list for one reflected structure kind (e.g. `"buffer"`,
/// `"window"`). Built once at startup and consulted on every `hdata_get`/
/// `hdata_update` call.
#[derive(Debug, Clone)]
pub struct HdataSchema {
    pub name: &'static str,
    pub fields: Vec<HdataField>,
}

impl HdataSchema {
    pub fn new(name: &'static str, fields: Vec<HdataField>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&HdataField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        self.field(name).map(|f| f.writable).unwrap_or(false)
    }
}

/// The set of schemas the embedder has registered, keyed by structure
/// name (spec §4.J "hdata_new").
#[derive(Default)]
pub struct HdataRegistry {
    schemas: HashMap<&'static str, HdataSchema>,
}

impl HdataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: HdataSchema) {
        self.schemas.insert(schema.name, schema);
    }

    pub fn get(&self, name: &str) -> Option<&HdataSchema> {
        self.schemas.get(name)
    }
}

/// Implemented by any structure a plugin can reach through `hdata` (spec
/// §4.J). `get_field`/`set_field` work purely by name so the registry
/// doesn't need to know the concrete Rust type.
pub trait HdataObject {
    fn hdata_name(&self) -> &'static str;
    fn get_field(&self, name: &str) -> Option<HdataValue>;
    fn set_field(&mut self, name: &str, value: HdataValue) -> EngineResult<()>;
}

/// Reads a field by name, the schema only used to validate `name` exists
/// (spec §4.J "hdata_get").
pub fn hdata_get(registry: &HdataRegistry, object: &dyn HdataObject, field: &str) -> EngineResult<HdataValue> {
    let schema = registry
        .get(object.hdata_name())
        .ok_or_else(|| EngineError::NotFound(format!("hdata schema: {}", object.hdata_name())))?;
    if schema.field(field).is_none() {
        return Err(EngineError::NotFound(format!("hdata field: {field}")));
    }
    object.get_field(field).ok_or_else(|| EngineError::NotFound(format!("hdata field value: {field}")))
}

/// Writes a field by name, rejecting the write before it reaches the
/// object if the schema doesn't mark that field writable (spec §4.J
/// "hdata_update... only fields explicitly marked writable may be set").
pub fn hdata_update(registry: &HdataRegistry, object: &mut dyn HdataObject, field: &str, value: HdataValue) -> EngineResult<()> {
    let schema = registry
        .get(object.hdata_name())
        .ok_or_else(|| EngineError::NotFound(format!("hdata schema: {}", object.hdata_name())))?;
    if !schema.is_writable(field) {
        return Err(EngineError::Validation(format!("field not writable: {field}")));
    }
    object.set_field(field, value)
}

/// One row of a flat infolist snapshot (spec §4.J "infolist").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfolistItem {
    pub fields: BTreeMap<String, HdataValue>,
}

impl InfolistItem {
    pub fn set(&mut self, name: &str, value: HdataValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&HdataValue> {
        self.fields.get(name)
    }
}

/// A point-in-time, name-addressed snapshot of a collection (spec §4.J:
/// "unlike hdata, an infolist is a copy — mutating it never touches the
/// live structure").
#[derive(Debug, Clone, Default)]
pub struct Infolist {
    pub name: String,
    pub items: Vec<InfolistItem>,
}

impl Infolist {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), items: Vec::new() }
    }

    pub fn push_item(&mut self) -> &mut InfolistItem {
        self.items.push(InfolistItem::default());
        self.items.last_mut().unwrap()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        number: i64,
        name: String,
    }

    impl HdataObject for Dummy {
        fn hdata_name(&self) -> &'static str {
            "dummy"
        }

        fn get_field(&self, name: &str) -> Option<HdataValue> {
            match name {
                "number" => Some(HdataValue::Integer(self.number)),
                "name" => Some(HdataValue::String(self.name.clone())),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: HdataValue) -> EngineResult<()> {
            match (name, value) {
                ("name", HdataValue::String(s)) => {
                    self.name = s;
                    Ok(())
                }
                _ => Err(EngineError::Validation("unsupported field/value pair".into())),
            }
        }
    }

    fn registry() -> HdataRegistry {
        let mut reg = HdataRegistry::new();
        reg.register(HdataSchema::new(
            "dummy",
            vec![HdataField { name: "number", writable: false }, HdataField { name: "name", writable: true }],
        ));
        reg
    }

    #[test]
    fn get_field_round_trips() {
        let reg = registry();
        let d = Dummy { number: 7, name: "x".to_string() };
        assert_eq!(hdata_get(&reg, &d, "number").unwrap(), HdataValue::Integer(7));
    }

    #[test]
    fn update_rejects_non_writable_field() {
        let reg = registry();
        let mut d = Dummy { number: 7, name: "x".to_string() };
        let err = hdata_update(&reg, &mut d, "number", HdataValue::Integer(9)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(d.number, 7);
    }

    #[test]
    fn update_writable_field_succeeds() {
        let reg = registry();
        let mut d = Dummy { number: 7, name: "x".to_string() };
        hdata_update(&reg, &mut d, "name", HdataValue::String("y".to_string())).unwrap();
        assert_eq!(d.name, "y");
    }

    #[test]
    fn infolist_builds_rows() {
        let mut list = Infolist::new("dummy");
        list.push_item().set("number", HdataValue::Integer(1));
        list.push_item().set("number", HdataValue::Integer(2));
        assert_eq!(list.len(), 2);
        assert_eq!(list.items[1].get("number"), Some(&HdataValue::Integer(2)));
    }
}
