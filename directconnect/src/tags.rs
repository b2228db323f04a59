use anyhow::Context;
use aws_sdk_directconnect::types::Tag;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tags(IndexMap<String, String>);

impl From<Option<Vec<Tag>>> for Tags {
    fn from(value: Option<Vec<Tag>>) -> Self {
        let Some(mut tags) = value else {
            return Tags::default();
        };

        tags.sort_by(|a, b| a.key.cmp(&b.key));
        Tags(tags.into_iter().map(|t| (t.key, t.value.unwrap_or_default())).collect())
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

    pub fn to_vec(&self) -> anyhow::Result<Vec<Tag>> {
        self.0
            .iter()
            .map(|(k, v)| {
                Tag::builder()
                    .key(k)
                    .value(v)
                    .build()
                    .with_context(|| format!("Invalid tag `{k}`"))
            })
            .collect()
    }
}

// From a pair of tag sets, determine the keys to pass to UntagResource and the tags to pass to TagResource
pub fn tag_diff(old_tags: &Tags, new_tags: &Tags) -> anyhow::Result<(Vec<String>, Vec<Tag>)> {
    let untag_keys: Vec<String> = old_tags.0.keys().filter(|k| !new_tags.0.contains_key(*k)).cloned().collect();

    let mut new_tagset = Vec::new();
    for (key, new_value) in &new_tags.0 {
        if old_tags.0.get(key) != Some(new_value) {
            new_tagset.push(Tag::builder().key(key).value(new_value).build()?);
        }
    }

    Ok((untag_keys, new_tagset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_tags_are_sorted_and_valueless_tags_kept() {
        let tags: Tags = Some(vec![
            Tag::builder().key("team").value("network").build().unwrap(),
            Tag::builder().key("env").build().unwrap(),
        ])
        .into();

        let keys: Vec<&String> = tags.0.keys().collect();
        assert_eq!(keys, ["env", "team"]);
        assert_eq!(tags.0["env"], "");
    }

    #[test]
    fn diff_splits_removals_and_upserts() {
        let old: Tags = [("env", "dev"), ("team", "network"), ("stale", "1")].into_iter().collect();
        let new: Tags = [("env", "prod"), ("team", "network"), ("owner", "ops")].into_iter().collect();

        let (untag, tag) = tag_diff(&old, &new).unwrap();

        assert_eq!(untag, vec![String::from("stale")]);
        let mut upserts: Vec<(&str, Option<&str>)> = tag.iter().map(|t| (t.key.as_str(), t.value.as_deref())).collect();
        upserts.sort();
        assert_eq!(upserts, vec![("env", Some("prod")), ("owner", Some("ops"))]);
    }

    #[test]
    fn equal_sets_ignore_order() {
        let a: Tags = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: Tags = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(tag_diff(&a, &b).unwrap(), (Vec::new(), Vec::new()));
    }
}
