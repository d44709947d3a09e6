//! Segment interpolation curves.
//!
//! Each portamento segment names its curve by a short id from the `PBM`
//! field. The four stock curves are installed by default; custom curves can
//! be registered under fresh ids.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};

/// Id of the default slow-in/slow-out curve (the empty string).
pub const CURVE_S: &str = "";
/// Id of the straight-line curve.
pub const CURVE_LINEAR: &str = "s";
/// Id of the late half of the S shape.
pub const CURVE_R: &str = "r";
/// Id of the early half of the S shape.
pub const CURVE_J: &str = "j";

/// The ids every editor understands.
pub const STOCK_CURVE_TYPES: &[&str] = &[CURVE_S, CURVE_LINEAR, CURVE_R, CURVE_J];

/// A curve evaluates `(time_ms, segment_length_ms, magnitude)` to an offset
/// in 10-cent units. `time` is relative to the segment start; the result
/// should run from 0 toward `magnitude` as time crosses the segment.
pub type CurveFn = Arc<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>;

fn bound(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// The stock S curve.
///
/// The cosine argument runs over `[0, 1]` radian, not `[0, pi]`, a much
/// flatter arc than a textbook raised cosine. Rendered audio depends on this
/// exact shape, so it stays as is.
pub fn s_curve(time: f64, length: f64, magnitude: f64) -> f64 {
    (1.0 - (bound(time, 0.0, length) / length).cos()) / 2.0 * magnitude
}

/// Straight-line interpolation.
pub fn linear(time: f64, length: f64, magnitude: f64) -> f64 {
    bound(time, 0.0, length) / length * magnitude
}

/// Late half of [`s_curve`]: fast start, eased end.
pub fn r_curve(time: f64, length: f64, magnitude: f64) -> f64 {
    s_curve(time + length, length * 2.0, magnitude * 2.0) - magnitude
}

/// Early half of [`s_curve`]: eased start, fast end.
pub fn j_curve(time: f64, length: f64, magnitude: f64) -> f64 {
    s_curve(time, length * 2.0, magnitude * 2.0)
}

/// Registry of interpolation curves, keyed by `PBM` id.
///
/// `Default` installs the stock curves. Ids are write-once: re-registering
/// an existing id is an error, so a project's rendering cannot change under
/// it. Handles are cheap clones sharing one table.
#[derive(Clone)]
pub struct CurveRegistry {
    curves: Arc<RwLock<HashMap<String, CurveFn>>>,
}

impl CurveRegistry {
    /// Create a registry with no curves at all.
    pub fn empty() -> Self {
        Self {
            curves: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The process-wide default registry with the stock curves.
    pub fn global() -> &'static CurveRegistry {
        static GLOBAL: OnceLock<CurveRegistry> = OnceLock::new();
        GLOBAL.get_or_init(CurveRegistry::default)
    }

    /// Register a curve under a fresh id.
    ///
    /// The id ends up inside the comma-separated `PBM` field, so it may not
    /// contain commas or whitespace.
    pub fn register<F>(&self, id: impl Into<String>, curve: F) -> Result<()>
    where
        F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        let id = id.into();
        if id.contains(',') || id.contains(char::is_whitespace) {
            return Err(Error::CurveRegistration(format!(
                "curve id {id:?} contains a separator character"
            )));
        }
        let mut curves = self.curves.write();
        if curves.contains_key(&id) {
            return Err(Error::CurveRegistration(format!(
                "curve type {id:?} is already registered"
            )));
        }
        curves.insert(id, Arc::new(curve));
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.curves.read().contains_key(id)
    }

    /// All registered ids.
    pub fn ids(&self) -> Vec<String> {
        self.curves.read().keys().cloned().collect()
    }

    /// Fetch a curve handle by id.
    pub fn get(&self, id: &str) -> Option<CurveFn> {
        self.curves.read().get(id).cloned()
    }

    /// Evaluate the curve registered under `id`.
    pub fn sample(&self, id: &str, time: f64, length: f64, magnitude: f64) -> Result<f64> {
        let curve = self
            .get(id)
            .ok_or_else(|| Error::UnknownCurveType(id.to_string()))?;
        Ok(curve(time, length, magnitude))
    }
}

impl Default for CurveRegistry {
    fn default() -> Self {
        let mut curves: HashMap<String, CurveFn> = HashMap::new();
        curves.insert(CURVE_S.to_string(), Arc::new(s_curve));
        curves.insert(CURVE_LINEAR.to_string(), Arc::new(linear));
        curves.insert(CURVE_R.to_string(), Arc::new(r_curve));
        curves.insert(CURVE_J.to_string(), Arc::new(j_curve));
        Self {
            curves: Arc::new(RwLock::new(curves)),
        }
    }
}

impl std::fmt::Debug for CurveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = self.ids();
        ids.sort();
        f.debug_struct("CurveRegistry").field("ids", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stock_curves_at_endpoints() {
        assert_relative_eq!(s_curve(0.0, 100.0, 30.0), 0.0);
        // full-length S reaches (1 - cos(1)) / 2 of the magnitude, not all of
        // it; the shallow arc is intentional
        let end = (1.0 - 1.0_f64.cos()) / 2.0 * 30.0;
        assert_relative_eq!(s_curve(100.0, 100.0, 30.0), end);
        // time clamps to the segment
        assert_relative_eq!(s_curve(250.0, 100.0, 30.0), end);
        assert_relative_eq!(s_curve(-10.0, 100.0, 30.0), 0.0);

        assert_relative_eq!(linear(0.0, 100.0, 30.0), 0.0);
        assert_relative_eq!(linear(50.0, 100.0, 30.0), 15.0);
        assert_relative_eq!(linear(100.0, 100.0, 30.0), 30.0);
        assert_relative_eq!(linear(900.0, 100.0, 30.0), 30.0);
    }

    #[test]
    fn test_half_curves_are_halves_of_s() {
        for t in [0.0, 25.0, 60.0, 100.0] {
            assert_relative_eq!(j_curve(t, 100.0, 30.0), s_curve(t, 200.0, 60.0));
            assert_relative_eq!(
                r_curve(t, 100.0, 30.0),
                s_curve(t + 100.0, 200.0, 60.0) - 30.0
            );
        }
        // the halves meet: R starts where J leaves off, one magnitude lower
        assert_relative_eq!(
            r_curve(0.0, 100.0, 30.0),
            j_curve(100.0, 100.0, 30.0) - 30.0
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = CurveRegistry::default();
        for id in STOCK_CURVE_TYPES {
            assert!(reg.contains(id), "missing stock curve {id:?}");
        }
        assert_relative_eq!(reg.sample("s", 50.0, 100.0, 30.0).unwrap(), 15.0);
    }

    #[test]
    fn test_register_custom_curve() {
        let reg = CurveRegistry::default();
        reg.register("step", |time, length, magnitude| {
            if time >= length / 2.0 {
                magnitude
            } else {
                0.0
            }
        })
        .unwrap();
        assert_relative_eq!(reg.sample("step", 10.0, 100.0, 30.0).unwrap(), 0.0);
        assert_relative_eq!(reg.sample("step", 80.0, 100.0, 30.0).unwrap(), 30.0);
    }

    #[test]
    fn test_register_rejects_existing_and_bad_ids() {
        let reg = CurveRegistry::default();
        assert!(reg.register("s", linear).is_err());
        assert!(reg.register("a,b", linear).is_err());
        assert!(reg.register("a b", linear).is_err());
    }

    #[test]
    fn test_unknown_curve_type() {
        let reg = CurveRegistry::default();
        assert!(matches!(
            reg.sample("zz", 0.0, 1.0, 1.0),
            Err(Error::UnknownCurveType(id)) if id == "zz"
        ));
    }
}
