//! Colour maps for scalar heat maps.

use std::collections::HashMap;

use glam::Vec3;

/// A colour map for mapping scalar values to colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Colour map name.
    pub name: String,
    /// Colour samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new colour map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Samples the colour map at a given value (0 to 1).
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self.colors.len() {
            0 => Vec3::ZERO,
            1 => self.colors[0],
            len => {
                let n = len - 1;
                let idx = ((t * n as f32).floor() as usize).min(n - 1);
                let frac = t * n as f32 - idx as f32;
                self.colors[idx].lerp(self.colors[idx + 1], frac)
            }
        }
    }

    /// Colours `values` after normalising them to `bounds` (or to their own
    /// range when `None`).
    pub fn map(&self, values: &[f32], bounds: Option<(f32, f32)>) -> Vec<Vec3> {
        let (lo, hi) = bounds.unwrap_or_else(|| {
            values
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        });
        let span = hi - lo;
        values
            .iter()
            .map(|&v| {
                let t = if span > f32::EPSILON { (v - lo) / span } else { 0.0 };
                self.sample(t)
            })
            .collect()
    }
}

/// Registry of named colour maps.
#[derive(Default)]
pub struct ColorMapRegistry {
    color_maps: HashMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Creates a registry holding the default colour maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(ColorMap::new(
            "viridis",
            vec![
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.457),
                Vec3::new(0.253, 0.265, 0.529),
                Vec3::new(0.206, 0.371, 0.553),
                Vec3::new(0.163, 0.471, 0.558),
                Vec3::new(0.127, 0.566, 0.550),
                Vec3::new(0.134, 0.658, 0.517),
                Vec3::new(0.266, 0.749, 0.440),
                Vec3::new(0.477, 0.821, 0.318),
                Vec3::new(0.741, 0.873, 0.150),
                Vec3::new(0.993, 0.906, 0.144),
            ],
        ));

        self.register(ColorMap::new(
            "reds",
            vec![
                Vec3::new(1.000, 0.961, 0.941),
                Vec3::new(0.988, 0.733, 0.631),
                Vec3::new(0.984, 0.416, 0.290),
                Vec3::new(0.796, 0.094, 0.114),
                Vec3::new(0.404, 0.000, 0.051),
            ],
        ));

        self.register(ColorMap::new(
            "coolwarm",
            vec![
                Vec3::new(0.230, 0.299, 0.754),
                Vec3::new(0.552, 0.690, 0.996),
                Vec3::new(0.866, 0.866, 0.866),
                Vec3::new(0.956, 0.604, 0.486),
                Vec3::new(0.706, 0.016, 0.150),
            ],
        ));
    }

    /// Registers a colour map, replacing any map of the same name.
    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Gets a colour map by name.
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }

    /// Gets a colour map by name, falling back to viridis.
    pub fn get_or_default(&self, name: &str) -> Option<&ColorMap> {
        self.get(name).or_else(|| {
            log::warn!("unknown colour map '{name}', using viridis");
            self.get("viridis")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        let registry = ColorMapRegistry::new();
        let viridis = registry.get("viridis").unwrap();
        assert_eq!(viridis.sample(0.0), viridis.colors[0]);
        assert!(viridis.sample(1.0).distance(viridis.colors[10]) < 1e-6);
        assert!(viridis.sample(7.0).distance(viridis.colors[10]) < 1e-6);
    }

    #[test]
    fn test_map_uses_value_range() {
        let map = ColorMap::new("bw", vec![Vec3::ZERO, Vec3::ONE]);
        let colors = map.map(&[2.0, 3.0, 4.0], None);
        assert_eq!(colors[0], Vec3::ZERO);
        assert!(colors[1].distance(Vec3::splat(0.5)) < 1e-6);
        assert_eq!(colors[2], Vec3::ONE);

        let flat = map.map(&[1.0, 1.0], None);
        assert_eq!(flat, vec![Vec3::ZERO; 2]);
    }

    #[test]
    fn test_fixed_bounds_clamp() {
        let map = ColorMap::new("bw", vec![Vec3::ZERO, Vec3::ONE]);
        let colors = map.map(&[-5.0, 10.0], Some((0.0, 1.0)));
        assert_eq!(colors, vec![Vec3::ZERO, Vec3::ONE]);
    }

    #[test]
    fn test_unknown_falls_back() {
        let registry = ColorMapRegistry::new();
        assert_eq!(registry.get_or_default("magma").unwrap().name, "viridis");
    }
}
