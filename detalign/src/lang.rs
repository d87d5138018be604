//! Language defaults compiled in from `configs/`.

use std::{collections::HashMap, sync::Arc};

use lazy_static::lazy_static;

use crate::features::RelationSets;

lazy_static! {
    static ref RELATION_CONFIGS: HashMap<String, Arc<RelationSets>> = {
        serde_json::from_slice(include_bytes!(concat!(
            env!("OUT_DIR"),
            "/",
            "relations_configs.json"
        )))
        .expect("relation configs must be valid JSON")
    };
}

/// Gets the relation sets for the language code.
pub fn relation_sets(lang_code: &str) -> Option<Arc<RelationSets>> {
    RELATION_CONFIGS.get(lang_code).cloned()
}

/// Lists the language codes which have a configuration.
pub fn lang_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = RELATION_CONFIGS.keys().map(|x| x.as_str()).collect();
    codes.sort_unstable();
    codes
}
