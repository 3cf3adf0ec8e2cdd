use std::fmt;

use gpuviz_protocol::{Pose, Vec3};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named camera viewpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPosition {
    pub name: String,
    pub description: String,
    pub position: Vec3,
    pub target: Vec3,
}

impl ViewPosition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        position: Vec3,
        target: Vec3,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            position,
            target,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.target)
    }
}

/// Ordered mapping from view key to [`ViewPosition`].
///
/// Insertion order is the tab order. Registries are built once at start-up
/// and only read afterwards. Serialized as a JSON object whose key order is
/// kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRegistry {
    entries: Vec<(String, ViewPosition)>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view. A key that is already present is replaced in place
    /// so the tab order stays stable.
    pub fn insert(&mut self, key: impl Into<String>, view: ViewPosition) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = view;
        } else {
            self.entries.push((key, view));
        }
    }

    pub fn with(mut self, key: impl Into<String>, view: ViewPosition) -> Self {
        self.insert(key, view);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ViewPosition> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ViewPosition)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn first_key(&self) -> Option<&str> {
        self.keys().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The visualization page's tabs.
    pub fn visualize_defaults() -> Self {
        let origin = Vec3::ZERO;
        Self::new()
            .with(
                "overview",
                ViewPosition::new(
                    "Overview",
                    "Compare different GPU sizes and form factors",
                    Vec3::new(0.0, 2.0, 5.0),
                    origin,
                ),
            )
            .with(
                "server",
                ViewPosition::new(
                    "Server Setup",
                    "Explore typical server configurations",
                    Vec3::new(5.0, 2.0, 5.0),
                    origin,
                ),
            )
            .with(
                "warehouse",
                ViewPosition::new(
                    "Warehouse",
                    "View warehouse-scale computing",
                    Vec3::new(10.0, 5.0, 10.0),
                    origin,
                ),
            )
            .with(
                "comparison",
                ViewPosition::new(
                    "Comparison",
                    "Compare compute, memory, bandwidth and efficiency side by side",
                    Vec3::new(-9.0, 7.0, 10.0),
                    Vec3::new(0.0, 1.0, 3.0),
                ),
            )
            .with(
                "idle",
                ViewPosition::new(
                    "Idle Compute",
                    "See what consumer hardware could contribute while idle",
                    Vec3::new(1.2, 0.8, 1.6),
                    Vec3::new(0.2, 0.3, 0.0),
                ),
            )
    }
}

// --- Serde (hand-rolled so object key order survives) ---

impl Serialize for ViewRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for ViewRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = ViewRegistry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of view key to view position")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ViewRegistry, A::Error> {
                let mut registry = ViewRegistry::new();
                while let Some((key, view)) = map.next_entry::<String, ViewPosition>()? {
                    registry.insert(key, view);
                }
                Ok(registry)
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_tab_order() {
        let views = ViewRegistry::visualize_defaults();
        let keys: Vec<_> = views.keys().collect();
        assert_eq!(
            keys,
            vec!["overview", "server", "warehouse", "comparison", "idle"]
        );
        assert_eq!(views.first_key(), Some("overview"));
    }

    #[test]
    fn lookup_by_key() {
        let views = ViewRegistry::visualize_defaults();
        let warehouse = views.get("warehouse").map(ViewPosition::pose);
        assert_eq!(
            warehouse,
            Some(Pose::new(Vec3::new(10.0, 5.0, 10.0), Vec3::ZERO))
        );
        assert!(views.get("datacenter").is_none());
    }

    #[test]
    fn insert_replaces_without_reordering() {
        let mut views = ViewRegistry::visualize_defaults();
        views.insert(
            "overview",
            ViewPosition::new("Close", "", Vec3::new(0.0, 1.0, 2.0), Vec3::ZERO),
        );
        assert_eq!(views.len(), 5);
        assert_eq!(views.first_key(), Some("overview"));
        assert_eq!(views.get("overview").map(|v| v.name.as_str()), Some("Close"));
    }

    #[test]
    fn deserializes_object_in_document_order() {
        let json = r#"{
            "zeta": {"name": "Z", "description": "", "position": [0, 1, 2], "target": [0, 0, 0]},
            "alpha": {"name": "A", "description": "", "position": [3, 4, 5], "target": [0, 0, 0]}
        }"#;
        let views: ViewRegistry = serde_json::from_str(json).unwrap_or_default();
        let keys: Vec<_> = views.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(
            views.get("alpha").map(|v| v.position),
            Some(Vec3::new(3.0, 4.0, 5.0))
        );
    }

    #[test]
    fn serde_roundtrip_preserves_order() {
        let views = ViewRegistry::visualize_defaults();
        let json = serde_json::to_string(&views).unwrap_or_default();
        let back: ViewRegistry = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back, views);
    }
}
