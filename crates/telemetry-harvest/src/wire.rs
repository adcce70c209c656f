// Copyright 2025-Present the telemetry-harvester authors
// SPDX-License-Identifier: Apache-2.0

//! Canonical JSON shape shipped at the transport boundary.
//!
//! One batch per transmission: an array holding a single document with a
//! `common` block describing the origin entity and a `logs` sequence of
//! records. Optional record fields are omitted, not nulled.

use serde::Serialize;

/// Fixed-per-batch attributes describing the reporting entity and host.
#[derive(Debug, Clone, Serialize)]
pub struct CommonAttributes {
    #[serde(rename = "entity.name")]
    pub entity_name: String,
    #[serde(rename = "entity.type")]
    pub entity_type: String,
    #[serde(rename = "entity.guid", skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<String>,
    pub hostname: String,
    #[serde(rename = "plugin.type")]
    pub plugin_type: String,
}

pub const ENTITY_TYPE_SERVICE: &str = "SERVICE";
pub const PLUGIN_TYPE: &str = "telemetry-rust-agent";

impl CommonAttributes {
    pub fn new(
        entity_name: impl Into<String>,
        entity_guid: Option<String>,
        hostname: impl Into<String>,
    ) -> Self {
        CommonAttributes {
            entity_name: entity_name.into(),
            entity_type: ENTITY_TYPE_SERVICE.to_string(),
            entity_guid,
            hostname: hostname.into(),
            plugin_type: PLUGIN_TYPE.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CommonBlock<'a> {
    attributes: &'a CommonAttributes,
}

#[derive(Serialize)]
struct BatchDocument<'a, E> {
    common: CommonBlock<'a>,
    logs: &'a [E],
}

/// Serializes one harvest batch into the canonical wire document.
pub fn encode<E: Serialize>(
    common: &CommonAttributes,
    events: &[E],
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&[BatchDocument {
        common: CommonBlock { attributes: common },
        logs: events,
    }])
}
