//! Static structured-lookup table
//!
//! Stands in for the external structured-lookup service behind the
//! `JTxxxxx` template tokens. Ships the known machine-room and station
//! entries; unknown tokens are an explicit `None` so the resolver
//! keeps them literal.

use noc_common::placeholder::StructuredLookup;
use serde_json::{json, Value};
use std::collections::HashMap;

pub struct StaticLookupTable {
    entries: HashMap<String, Value>,
}

impl StaticLookupTable {
    pub fn with_defaults() -> Self {
        let mut entries = HashMap::new();
        // JT00012 - machine room code
        entries.insert(
            "JT00012".to_string(),
            json!({"room_id": "002017032644148100001082", "room_name": "南头机房"}),
        );
        // JT00013 - station code
        entries.insert(
            "JT00013".to_string(),
            json!({"station_id": "440106040010002750", "station_name": "南头站"}),
        );
        Self { entries }
    }

    pub fn insert(&mut self, token: &str, value: Value) {
        self.entries.insert(token.to_string(), value);
    }
}

impl StructuredLookup for StaticLookupTable {
    fn fetch(&self, token: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.entries.get(token).cloned())
    }
}
