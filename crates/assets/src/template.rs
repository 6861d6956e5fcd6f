use autorunner_common::{ExitSuffix, Lane, TemplateId, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::TemplateError;

/// Axis-aligned collision box in a block's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorBox {
    pub min: Vec3,
    pub max: Vec3,
    /// Collision layer bits, see [`autorunner_common::layers`].
    pub layer: u32,
}

/// A set of optional props (coins, barriers) of which one is kept per placed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationGroup {
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// A reusable track segment prefab.
///
/// Anchors and waypoints are expressed in the block's local frame. The `In`
/// anchor is where the block attaches to the chain; exits are `Out` for
/// blocks with `outs <= 1` and `OutL`/`OutR` for forks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub name: String,
    /// 0 = dead end / straight continuation marker, 1 = straight exit, 2+ = fork.
    pub outs: u32,
    pub anchors: BTreeMap<ExitSuffix, Transform>,
    /// Waypoint groups keyed by name, e.g. `CenterIn`, `LeftOutR`.
    pub paths: BTreeMap<String, Vec<Vec3>>,
    #[serde(default)]
    pub floor: Vec<FloorBox>,
    #[serde(default)]
    pub groups: Vec<DecorationGroup>,
}

impl BlockTemplate {
    pub fn new(name: impl Into<String>, outs: u32) -> Self {
        Self {
            name: name.into(),
            outs,
            anchors: BTreeMap::new(),
            paths: BTreeMap::new(),
            floor: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Content-addressed id: first 8 bytes of the SHA-256 of the name.
    pub fn id(&self) -> TemplateId {
        template_id(&self.name)
    }

    pub fn is_fork(&self) -> bool {
        self.outs >= 2
    }

    pub fn is_dead_end(&self) -> bool {
        self.outs == 0
    }

    /// Exits in probe order.
    pub fn exits(&self) -> &'static [ExitSuffix] {
        ExitSuffix::exits_for(self.outs)
    }

    pub fn anchor(&self, suffix: ExitSuffix) -> Option<&Transform> {
        self.anchors.get(&suffix)
    }

    pub fn path(&self, lane: Lane, suffix: ExitSuffix) -> Option<&[Vec3]> {
        self.paths
            .get(&lane.group_name(suffix))
            .map(|points| points.as_slice())
    }

    /// Path suffixes a walk over this block can ask for.
    pub fn path_suffixes(&self) -> Vec<ExitSuffix> {
        let mut suffixes = vec![ExitSuffix::In];
        if !self.is_dead_end() {
            suffixes.extend_from_slice(self.exits());
        }
        suffixes
    }

    /// Check that every anchor and path group the generator and the path
    /// walk will ask for is present.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let required_anchors = std::iter::once(&ExitSuffix::In).chain(self.exits());
        for suffix in required_anchors {
            if !self.anchors.contains_key(suffix) {
                return Err(TemplateError::MissingAnchor {
                    template: self.name.clone(),
                    anchor: suffix.as_str().to_string(),
                });
            }
        }
        for suffix in self.path_suffixes() {
            for lane in Lane::ALL {
                let group = lane.group_name(suffix);
                if !self.paths.contains_key(&group) {
                    return Err(TemplateError::MissingPath {
                        template: self.name.clone(),
                        group,
                    });
                }
            }
        }
        Ok(())
    }
}

pub fn template_id(name: &str) -> TemplateId {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    TemplateId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> BlockTemplate {
        let mut t = BlockTemplate::new("Straight", 1);
        t.anchors.insert(ExitSuffix::In, Transform::IDENTITY);
        t.anchors
            .insert(ExitSuffix::Out, Transform::from_position(Vec3::NEG_X * 10.0));
        for lane in Lane::ALL {
            t.paths.insert(lane.group_name(ExitSuffix::In), vec![Vec3::ZERO]);
            t.paths.insert(lane.group_name(ExitSuffix::Out), vec![Vec3::NEG_X]);
        }
        t
    }

    #[test]
    fn id_is_content_addressed() {
        assert_eq!(straight().id(), template_id("Straight"));
        assert_ne!(template_id("Straight"), template_id("Fork"));
    }

    #[test]
    fn complete_template_validates() {
        assert!(straight().validate().is_ok());
    }

    #[test]
    fn missing_exit_anchor_is_reported() {
        let mut t = straight();
        t.outs = 2;
        let err = t.validate().unwrap_err();
        assert!(matches!(err, TemplateError::MissingAnchor { ref anchor, .. } if anchor == "OutR"));
    }

    #[test]
    fn missing_path_group_is_reported() {
        let mut t = straight();
        t.paths.remove("RightOut");
        let err = t.validate().unwrap_err();
        assert!(matches!(err, TemplateError::MissingPath { ref group, .. } if group == "RightOut"));
    }

    #[test]
    fn dead_end_needs_only_entry_paths() {
        let mut t = straight();
        t.outs = 0;
        for lane in Lane::ALL {
            t.paths.remove(&lane.group_name(ExitSuffix::Out));
        }
        assert!(t.validate().is_ok());
        assert_eq!(t.path_suffixes(), vec![ExitSuffix::In]);
    }
}
