//! Engine configuration.
//!
//! Typed defaults plus JSON overrides: callers hand in a (possibly partial) JSON object which is
//! deep-merged over the defaults before being deserialized, so `{"layout": {"rankSep": 80}}`
//! changes one field and keeps the rest.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stepgraph_layout::RankDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    /// Cyclic style-class palette, indexed by call depth (or DAG level).
    pub palette: Vec<String>,
    pub playback: PlaybackConfig,
    pub ingest: IngestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            palette: default_palette(),
            playback: PlaybackConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

fn default_palette() -> Vec<String> {
    [
        "node-blue",
        "node-green",
        "node-orange",
        "node-purple",
        "node-teal",
        "node-pink",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub direction: RankDir,
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between siblings inside a rank.
    pub node_sep: f64,
    /// Gap between consecutive ranks.
    pub rank_sep: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: RankDir::TB,
            node_width: 120.0,
            node_height: 40.0,
            node_sep: 40.0,
            rank_sep: 60.0,
            margin_x: 0.0,
            margin_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackConfig {
    pub interval_ms: u64,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            min_speed: 0.25,
            max_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    pub strict: bool,
}

impl EngineConfig {
    /// Defaults with `overrides` deep-merged on top.
    pub fn from_overrides(overrides: &Value) -> Result<Self> {
        let mut cfg = Self::default();
        cfg.merge(overrides)?;
        Ok(cfg)
    }

    pub fn merge(&mut self, overrides: &Value) -> Result<()> {
        if !overrides.is_object() && !overrides.is_null() {
            return Err(Error::Config {
                message: "config overrides must be a JSON object".to_string(),
            });
        }
        let mut base = serde_json::to_value(&*self)?;
        deep_merge_value(&mut base, overrides);
        let cfg: Self = serde_json::from_value(base).map_err(|err| Error::Config {
            message: err.to_string(),
        })?;
        cfg.validate()?;
        *self = cfg;
        Ok(())
    }

    /// Sets one value addressed by a dotted camelCase path, e.g. `layout.rankSep`.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) -> Result<()> {
        let mut cur = value;
        for seg in dotted_path.split('.').rev() {
            let mut parent = Map::new();
            parent.insert(seg.to_string(), cur);
            cur = Value::Object(parent);
        }
        self.merge(&cur)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::Config {
                message: message.to_string(),
            })
        };
        if self.palette.is_empty() {
            return invalid("palette must not be empty");
        }
        let l = &self.layout;
        for v in [l.node_width, l.node_height, l.node_sep, l.rank_sep] {
            if !(v.is_finite() && v >= 0.0) {
                return invalid("layout sizes must be finite and non-negative");
            }
        }
        let p = &self.playback;
        if !(p.min_speed > 0.0 && p.min_speed <= p.max_speed && p.max_speed.is_finite()) {
            return invalid("playback speeds must satisfy 0 < minSpeed <= maxSpeed");
        }
        if p.interval_ms == 0 {
            return invalid("playback.intervalMs must be positive");
        }
        Ok(())
    }

    /// Style class for a depth/level, cycling through the palette.
    pub fn style_class(&self, depth: i64) -> String {
        let len = self.palette.len().max(1) as i64;
        let ix = depth.rem_euclid(len) as usize;
        self.palette.get(ix).cloned().unwrap_or_default()
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overrides_change_only_named_fields() {
        let cfg = EngineConfig::from_overrides(&json!({
            "layout": { "rankSep": 80, "direction": "LR" },
            "unknownKey": true
        }))
        .unwrap();
        assert_eq!(cfg.layout.rank_sep, 80.0);
        assert_eq!(cfg.layout.direction, RankDir::LR);
        assert_eq!(cfg.layout.node_sep, 40.0);
        assert_eq!(cfg.palette.len(), 6);
    }

    #[test]
    fn set_value_accepts_dotted_paths() {
        let mut cfg = EngineConfig::default();
        cfg.set_value("playback.intervalMs", json!(250)).unwrap();
        cfg.set_value("ingest.strict", json!(true)).unwrap();
        assert_eq!(cfg.playback.interval_ms, 250);
        assert!(cfg.ingest.strict);
    }

    #[test]
    fn rejected_overrides_leave_the_config_untouched() {
        let mut cfg = EngineConfig::default();
        cfg.set_value("layout.rankSep", json!(90)).unwrap();
        let before = cfg.clone();

        assert!(cfg.set_value("palette", json!([])).is_err());
        assert!(cfg.set_value("layout.nodeSep", json!(-5)).is_err());
        assert!(
            cfg.merge(&json!({ "layout": { "rankSep": 10 }, "playback": { "minSpeed": 0 } }))
                .is_err()
        );
        assert_eq!(cfg, before);
        assert_eq!(cfg.palette.len(), 6);
    }

    #[test]
    fn wrong_types_and_invalid_values_are_config_errors() {
        let err = EngineConfig::from_overrides(&json!({ "layout": { "nodeSep": "wide" } }))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = EngineConfig::from_overrides(&json!({ "palette": [] })).unwrap_err();
        assert_eq!(err.to_string(), "Invalid config: palette must not be empty");

        let err = EngineConfig::from_overrides(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn style_class_cycles_through_the_palette() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.style_class(0), "node-blue");
        assert_eq!(cfg.style_class(6), "node-blue");
        assert_eq!(cfg.style_class(7), "node-green");
        assert_eq!(cfg.style_class(-1), "node-pink");
    }
}
