//! Phase catalog loaded from the `phases:` mapping of the config.
//!
//! Loading is lenient: a field that is absent or has the wrong type is
//! treated as not found, logged, and replaced by its default. An id with
//! no metadata is simply absent. Nothing here returns an error.

use std::collections::{BTreeMap, HashMap};

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::config::ForgeConfig;

use super::phase::{
    DependencySpec, PackageSpec, Phase, PhaseConfig, PhaseId, PhaseMetadata, PrereqMode,
    MAX_PHASE_ID,
};

/// Immutable catalog of phases keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PhaseRegistry {
    phases: BTreeMap<PhaseId, Phase>,
}

impl PhaseRegistry {
    /// Build the registry from a loaded configuration.
    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::from_mapping(&config.phases, config.settings.default_timeout)
    }

    /// Build the registry from a raw `phases:` mapping.
    pub fn from_mapping(mapping: &Mapping, default_timeout: u64) -> Self {
        let mut phases = BTreeMap::new();

        for (key, value) in mapping {
            let Some(id) = parse_phase_id(key) else {
                warn!("Ignoring phase entry with non-numeric id: {:?}", key);
                continue;
            };
            if id > MAX_PHASE_ID {
                warn!(
                    "Ignoring phase {}: ids above {} are never probed",
                    id, MAX_PHASE_ID
                );
                continue;
            }
            if let Some(phase) = parse_phase(id, value, default_timeout) {
                phases.insert(id, phase);
            }
        }

        Self { phases }
    }

    /// Build a registry directly from typed phases.
    pub fn from_phases(phases: impl IntoIterator<Item = Phase>) -> Self {
        Self {
            phases: phases.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Probe `0..=MAX_PHASE_ID` and return the ids that exist, ascending.
    pub fn discover(&self) -> Vec<PhaseId> {
        (0..=MAX_PHASE_ID)
            .filter(|id| self.phases.contains_key(id))
            .collect()
    }

    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.get(&id)
    }

    pub fn metadata(&self, id: PhaseId) -> Option<&PhaseMetadata> {
        self.phases.get(&id).map(|p| &p.metadata)
    }

    pub fn config(&self, id: PhaseId) -> Option<&PhaseConfig> {
        self.phases.get(&id).map(|p| &p.config)
    }

    /// Script keys in declared order; empty for an unknown id.
    pub fn scripts(&self, id: PhaseId) -> &[String] {
        self.phases
            .get(&id)
            .map(|p| p.scripts.as_slice())
            .unwrap_or(&[])
    }

    /// Package list; empty for an unknown id.
    pub fn packages(&self, id: PhaseId) -> &[PackageSpec] {
        self.phases
            .get(&id)
            .map(|p| p.packages.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate phases in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Script keys declared by more than one phase, with the phases using them.
    ///
    /// Completion state is keyed globally, so such scripts share one entry.
    pub fn duplicate_script_keys(&self) -> Vec<(String, Vec<PhaseId>)> {
        let mut owners: HashMap<&str, Vec<PhaseId>> = HashMap::new();
        for phase in self.phases.values() {
            for key in &phase.scripts {
                let ids = owners.entry(key.as_str()).or_default();
                if !ids.contains(&phase.id) {
                    ids.push(phase.id);
                }
            }
        }

        let mut dups: Vec<_> = owners
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(key, ids)| (key.to_string(), ids))
            .collect();
        dups.sort();
        dups
    }
}

fn parse_phase_id(key: &Value) -> Option<PhaseId> {
    match key {
        Value::Number(n) => n.as_u64().and_then(|n| PhaseId::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_phase(id: PhaseId, value: &Value, default_timeout: u64) -> Option<Phase> {
    let map = match value {
        Value::Mapping(map) => map,
        Value::Null => {
            debug!("Phase {} has no metadata; treating as absent", id);
            return None;
        }
        other => {
            warn!("Phase {} metadata is not a mapping ({:?}); skipping", id, other);
            return None;
        }
    };

    let fields = Fields { id, map };

    let metadata = PhaseMetadata {
        name: fields
            .string("name")
            .unwrap_or_else(|| format!("phase-{}", id)),
        description: fields.string("description").unwrap_or_default(),
    };

    let mut config = PhaseConfig::with_timeout(default_timeout);
    if let Some(enabled) = fields.bool("enabled") {
        config.enabled = enabled;
    }
    if let Some(timeout) = fields.positive_u64("timeout") {
        config.timeout_secs = timeout;
    }
    if let Some(mode) = fields.parsed::<PrereqMode>("prereq_mode") {
        config.prereq_mode = mode;
    }
    if let Some(docker) = fields.bool("docker_required") {
        config.docker_required = docker;
    }
    if let Some(retries) = fields.u64("retries") {
        config.retries = u32::try_from(retries).unwrap_or(u32::MAX);
    }
    config.dependencies = fields.list("dependencies", parse_dependency);

    Some(Phase {
        id,
        metadata,
        config,
        scripts: fields.list("scripts", |v| v.as_str().map(str::to_string)),
        packages: fields.list("packages", parse_package),
    })
}

fn parse_dependency(value: &Value) -> Option<DependencySpec> {
    match value {
        Value::String(command) => Some(DependencySpec::new(command.clone(), "")),
        Value::Mapping(map) => {
            let command = map.get("command")?.as_str()?;
            let hint = map.get("hint").and_then(Value::as_str).unwrap_or("");
            Some(DependencySpec::new(command, hint))
        }
        _ => None,
    }
}

fn parse_package(value: &Value) -> Option<PackageSpec> {
    match value {
        Value::String(name) => Some(PackageSpec {
            name: name.clone(),
            version: None,
            enabled: true,
        }),
        Value::Mapping(map) => {
            let name = map.get("name")?.as_str()?.to_string();
            let version = map.get("version").and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
            let enabled = map.get("enabled").and_then(Value::as_bool).unwrap_or(true);
            Some(PackageSpec {
                name,
                version,
                enabled,
            })
        }
        _ => None,
    }
}

/// Typed, lenient field lookups on one phase entry.
struct Fields<'a> {
    id: PhaseId,
    map: &'a Mapping,
}

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn malformed(&self, key: &str, value: &Value) {
        warn!(
            "Phase {} field '{}' is malformed ({:?}); using default",
            self.id, key, value
        );
    }

    fn string(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            other => {
                self.malformed(key, other);
                None
            }
        }
    }

    fn bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            other => {
                self.malformed(key, other);
                None
            }
        }
    }

    fn u64(&self, key: &str) -> Option<u64> {
        let value = self.get(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.malformed(key, value);
        }
        parsed
    }

    fn positive_u64(&self, key: &str) -> Option<u64> {
        match self.u64(key)? {
            0 => {
                self.malformed(key, &Value::from(0));
                None
            }
            n => Some(n),
        }
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        let parsed = value.as_str().and_then(|s| s.parse().ok());
        if parsed.is_none() {
            self.malformed(key, value);
        }
        parsed
    }

    fn list<T>(&self, key: &str, parse: impl Fn(&Value) -> Option<T>) -> Vec<T> {
        let Some(value) = self.get(key) else {
            return Vec::new();
        };
        let Some(items) = value.as_sequence() else {
            self.malformed(key, value);
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let parsed = parse(item);
                if parsed.is_none() {
                    warn!(
                        "Phase {} has an unreadable '{}' entry ({:?}); skipping it",
                        self.id, key, item
                    );
                }
                parsed
            })
            .collect()
    }
}
