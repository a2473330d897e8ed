//! Label and annotation vocabularies
//!
//! Machine API encodes the machine role in the value of a
//! `machine.openshift.io/cluster-api-machine-role` label, Cluster API encodes
//! it in the key of a `node-role.kubernetes.io/<role>` label. The cluster
//! identifier and the delete-machine annotation are renamed. Labels carrying
//! instance type, region and zone are dropped: converters read those values
//! from the provider configuration instead.
//!
//! All translators return `None` for empty input so that a missing map stays
//! missing after a round trip.

use std::collections::BTreeMap;

use machine_crds::{capi, mapi};

type StringMap = BTreeMap<String, String>;

const MAPI_LABEL_SKIP_SET: [&str; 3] = [
    mapi::INSTANCE_TYPE_LABEL,
    mapi::REGION_LABEL,
    mapi::ZONE_LABEL,
];

const MAPI_ANNOTATION_SKIP_SET: [&str; 1] = [mapi::INSTANCE_STATE_ANNOTATION];

const CAPI_LABEL_SKIP_SET: [&str; 3] = [
    capi::MACHINE_SET_NAME_LABEL,
    capi::MACHINE_DEPLOYMENT_NAME_LABEL,
    capi::MACHINE_TEMPLATE_HASH_LABEL,
];

fn non_empty(map: StringMap) -> Option<StringMap> {
    if map.is_empty() { None } else { Some(map) }
}

/// Translate Machine API labels into Cluster API labels.
///
/// A role or type label with an empty value is dropped: its Cluster API form
/// would be the key `node-role.kubernetes.io/`, which is not a valid label
/// key.
pub fn mapi_labels_to_capi(labels: Option<&StringMap>) -> Option<StringMap> {
    let labels = labels?;
    let mut out = StringMap::new();

    for (key, value) in labels {
        match key.as_str() {
            mapi::MACHINE_ROLE_LABEL | mapi::MACHINE_TYPE_LABEL => {
                if !value.is_empty() {
                    out.insert(
                        format!("{}/{}", capi::NODE_ROLE_LABEL_PREFIX, value),
                        String::new(),
                    );
                }
            }
            mapi::CLUSTER_ID_LABEL => {
                out.insert(capi::CLUSTER_NAME_LABEL.to_string(), value.clone());
            }
            k if MAPI_LABEL_SKIP_SET.contains(&k) => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    non_empty(out)
}

/// Translate Machine API annotations into Cluster API annotations.
pub fn mapi_annotations_to_capi(annotations: Option<&StringMap>) -> Option<StringMap> {
    let annotations = annotations?;
    let mut out = StringMap::new();

    for (key, value) in annotations {
        match key.as_str() {
            mapi::DELETE_MACHINE_ANNOTATION => {
                out.insert(capi::DELETE_MACHINE_ANNOTATION.to_string(), value.clone());
            }
            k if MAPI_ANNOTATION_SKIP_SET.contains(&k) => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    non_empty(out)
}

/// Translate Cluster API labels back into Machine API labels.
///
/// A `node-role.kubernetes.io/<role>` label sets both the role and the type
/// label to `<role>`; with several node-role labels the last one in key
/// order wins.
pub fn capi_labels_to_mapi(labels: Option<&StringMap>) -> Option<StringMap> {
    let labels = labels?;
    let mut out = StringMap::new();
    let role_prefix = format!("{}/", capi::NODE_ROLE_LABEL_PREFIX);

    for (key, value) in labels {
        if let Some(role) = key.strip_prefix(&role_prefix) {
            out.insert(mapi::MACHINE_ROLE_LABEL.to_string(), role.to_string());
            out.insert(mapi::MACHINE_TYPE_LABEL.to_string(), role.to_string());
            continue;
        }

        match key.as_str() {
            capi::CLUSTER_NAME_LABEL => {
                out.insert(mapi::CLUSTER_ID_LABEL.to_string(), value.clone());
            }
            k if CAPI_LABEL_SKIP_SET.contains(&k) => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    non_empty(out)
}

/// Translate Cluster API annotations back into Machine API annotations.
pub fn capi_annotations_to_mapi(annotations: Option<&StringMap>) -> Option<StringMap> {
    let annotations = annotations?;
    let out: StringMap = annotations
        .iter()
        .map(|(key, value)| {
            let key = if key == capi::DELETE_MACHINE_ANNOTATION {
                mapi::DELETE_MACHINE_ANNOTATION.to_string()
            } else {
                key.clone()
            };
            (key, value.clone())
        })
        .collect();

    non_empty(out)
}

/// Merge node-bound labels (MAPI `spec.metadata.labels`) into `target`.
pub fn propagate_node_labels(target: &mut Option<StringMap>, node_labels: Option<&StringMap>) {
    merge_into(target, node_labels);
}

/// Merge node-bound annotations (MAPI `spec.metadata.annotations`) into `target`.
pub fn propagate_node_annotations(
    target: &mut Option<StringMap>,
    node_annotations: Option<&StringMap>,
) {
    merge_into(target, node_annotations);
}

fn merge_into(target: &mut Option<StringMap>, source: Option<&StringMap>) {
    let Some(source) = source.filter(|s| !s.is_empty()) else {
        return;
    };
    let target = target.get_or_insert_with(StringMap::new);
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Union of `maps`; on key collisions later maps win.
pub fn merge_maps(maps: &[Option<&StringMap>]) -> Option<StringMap> {
    let mut out = StringMap::new();
    for map in maps.iter().flatten() {
        for (key, value) in *map {
            out.insert(key.clone(), value.clone());
        }
    }
    non_empty(out)
}
