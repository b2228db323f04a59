use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tags(IndexMap<String, String>);

impl From<Option<HashMap<String, String>>> for Tags {
    fn from(value: Option<HashMap<String, String>>) -> Self {
        let Some(tags) = value else {
            return Tags::default();
        };

        let mut tags: Vec<(String, String)> = tags.into_iter().collect();
        tags.sort();
        Tags(tags.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Tags {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// From a pair of tag sets, determine the keys to pass to UntagResource and the tags to pass to TagResource
pub fn tag_diff(old_tags: &Tags, new_tags: &Tags) -> (Vec<String>, HashMap<String, String>) {
    let untag_keys: Vec<String> = old_tags.0.keys().filter(|k| !new_tags.0.contains_key(*k)).cloned().collect();

    let new_tagset: HashMap<String, String> = new_tags
        .0
        .iter()
        .filter(|(k, v)| old_tags.0.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    (untag_keys, new_tagset)
}
