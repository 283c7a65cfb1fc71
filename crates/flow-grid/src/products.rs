//! Product catalog: how each supported quantity is colored and animated.
//!
//! A product bundles the overlay color scale, display units and particle
//! tuning for one data layer. The catalog mirrors the upstream data
//! services: GFS-derived atmospheric layers plus OSCAR ocean currents.

use flow_common::style::{ColorScale, IntensityRamp, SegmentedColorScale, INTENSITY_SCALE_STEP};

/// The quantities the core can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductKind {
    Wind,
    Temperature,
    AirDensity,
    WindPowerDensity,
    MeanSeaLevelPressure,
    TotalPrecipitableWater,
    OceanCurrents,
}

/// Particle animation tuning for a vector product.
#[derive(Debug, Clone, Copy)]
pub struct ParticleTuning {
    /// How fast particles move on screen, scaled by viewport height.
    /// Arbitrary value chosen for aesthetics.
    pub velocity_scale: f64,
    /// Speed at which particle color intensity saturates.
    pub max_intensity: f64,
}

impl ParticleTuning {
    /// Trail color ramp for this product, bucketed up to `max_intensity`.
    pub fn intensity_ramp(&self) -> IntensityRamp {
        IntensityRamp::grayscale(INTENSITY_SCALE_STEP, self.max_intensity)
    }
}

/// One display unit with its conversion from the product's native unit.
#[derive(Clone, Copy)]
pub struct UnitDescriptor {
    pub label: &'static str,
    pub conversion: fn(f64) -> f64,
    pub precision: usize,
}

impl std::fmt::Debug for UnitDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitDescriptor")
            .field("label", &self.label)
            .field("precision", &self.precision)
            .finish()
    }
}

/// Format a scalar in the given unit.
pub fn format_scalar(value: f64, unit: &UnitDescriptor) -> String {
    format!("{:.*}", unit.precision, (unit.conversion)(value))
}

/// Format a vector as into-the-wind cardinal degrees plus magnitude,
/// rounded to the nearest 5°.
pub fn format_vector(u: f64, v: f64, magnitude: f64, unit: &UnitDescriptor) -> String {
    let d = (-u).atan2(-v).to_degrees();
    let wd = (((d + 360.0) % 360.0 / 5.0).round() * 5.0) as i64 % 360;
    format!("{}° @ {}", wd, format_scalar(magnitude, unit))
}

/// A renderable product: color scale, units and particle behavior.
#[derive(Debug, Clone)]
pub struct Product {
    pub kind: ProductKind,
    /// Scalar range covered by the color scale.
    pub scale_bounds: (f64, f64),
    pub scale: ColorScale,
    pub units: Vec<UnitDescriptor>,
    /// Present only for vector products that drive the animation.
    pub particles: Option<ParticleTuning>,
}

impl Product {
    pub fn wind() -> Self {
        Self {
            kind: ProductKind::Wind,
            scale_bounds: (0.0, 100.0),
            scale: ColorScale::ExtendedSinebow { max: 100.0 },
            units: vec![
                UnitDescriptor { label: "km/h", conversion: |x| x * 3.6, precision: 0 },
                UnitDescriptor { label: "m/s", conversion: |x| x, precision: 1 },
                UnitDescriptor { label: "kn", conversion: |x| x * 1.943844, precision: 0 },
                UnitDescriptor { label: "mph", conversion: |x| x * 2.236936, precision: 0 },
            ],
            particles: Some(ParticleTuning {
                velocity_scale: 1.0 / 60000.0,
                max_intensity: 17.0,
            }),
        }
    }

    pub fn temperature() -> Self {
        Self {
            kind: ProductKind::Temperature,
            scale_bounds: (193.0, 328.0),
            scale: ColorScale::Segmented(SegmentedColorScale::new(&[
                (193.0, [37, 4, 42]),
                (206.0, [41, 10, 130]),
                (219.0, [81, 40, 40]),
                (233.15, [192, 37, 149]), // -40 C/F
                (255.372, [70, 215, 215]), // 0 F
                (273.15, [21, 84, 187]),  // 0 C
                (275.15, [24, 132, 14]),  // just above 0 C
                (291.0, [247, 251, 59]),
                (298.0, [235, 167, 21]),
                (311.0, [230, 71, 39]),
                (328.0, [88, 27, 67]),
            ])),
            units: vec![
                UnitDescriptor { label: "°C", conversion: |x| x - 273.15, precision: 1 },
                UnitDescriptor { label: "°F", conversion: |x| x * 9.0 / 5.0 - 459.67, precision: 1 },
                UnitDescriptor { label: "K", conversion: |x| x, precision: 1 },
            ],
            particles: None,
        }
    }

    pub fn air_density() -> Self {
        Self {
            kind: ProductKind::AirDensity,
            scale_bounds: (0.0, 1.5),
            scale: ColorScale::Sinebow { max: 1.5 },
            units: vec![UnitDescriptor { label: "kg/m³", conversion: |x| x, precision: 2 }],
            particles: None,
        }
    }

    pub fn wind_power_density() -> Self {
        Self {
            kind: ProductKind::WindPowerDensity,
            scale_bounds: (0.0, 80000.0),
            scale: ColorScale::Segmented(SegmentedColorScale::new(&[
                (0.0, [15, 4, 96]),
                (250.0, [30, 8, 180]),
                (1000.0, [121, 102, 2]),
                (2000.0, [118, 161, 66]),
                (4000.0, [50, 102, 219]),
                (8000.0, [19, 131, 193]),
                (16000.0, [59, 204, 227]),
                (64000.0, [241, 1, 45]),
                (80000.0, [243, 0, 241]),
            ])),
            units: vec![
                UnitDescriptor { label: "kW/m²", conversion: |x| x / 1000.0, precision: 1 },
                UnitDescriptor { label: "W/m²", conversion: |x| x, precision: 0 },
            ],
            particles: None,
        }
    }

    pub fn mean_sea_level_pressure() -> Self {
        Self {
            kind: ProductKind::MeanSeaLevelPressure,
            scale_bounds: (92000.0, 105000.0),
            scale: ColorScale::Segmented(SegmentedColorScale::new(&[
                (92000.0, [40, 0, 0]),
                (95000.0, [187, 60, 31]),
                (96500.0, [137, 32, 30]),
                (98000.0, [16, 1, 43]),
                (100500.0, [36, 1, 93]),
                (101300.0, [241, 254, 18]),
                (103000.0, [228, 246, 223]),
                (105000.0, [255, 255, 255]),
            ])),
            units: vec![
                UnitDescriptor { label: "hPa", conversion: |x| x / 100.0, precision: 0 },
                UnitDescriptor { label: "mmHg", conversion: |x| x / 133.322387415, precision: 0 },
                UnitDescriptor { label: "inHg", conversion: |x| x / 3386.389, precision: 1 },
            ],
            particles: None,
        }
    }

    pub fn total_precipitable_water() -> Self {
        Self {
            kind: ProductKind::TotalPrecipitableWater,
            scale_bounds: (0.0, 70.0),
            scale: ColorScale::Segmented(SegmentedColorScale::new(&[
                (0.0, [230, 165, 30]),
                (10.0, [120, 100, 95]),
                (20.0, [40, 44, 92]),
                (30.0, [21, 13, 193]),
                (40.0, [75, 63, 235]),
                (60.0, [25, 255, 255]),
                (70.0, [150, 255, 255]),
            ])),
            units: vec![UnitDescriptor { label: "kg/m²", conversion: |x| x, precision: 3 }],
            particles: None,
        }
    }

    pub fn ocean_currents() -> Self {
        Self {
            kind: ProductKind::OceanCurrents,
            scale_bounds: (0.0, 1.5),
            scale: ColorScale::Segmented(SegmentedColorScale::new(&[
                (0.0, [10, 25, 68]),
                (0.15, [10, 25, 250]),
                (0.4, [24, 255, 93]),
                (0.65, [255, 233, 102]),
                (1.0, [255, 233, 15]),
                (1.5, [255, 15, 15]),
            ])),
            units: vec![
                UnitDescriptor { label: "m/s", conversion: |x| x, precision: 2 },
                UnitDescriptor { label: "km/h", conversion: |x| x * 3.6, precision: 1 },
                UnitDescriptor { label: "kn", conversion: |x| x * 1.943844, precision: 1 },
                UnitDescriptor { label: "mph", conversion: |x| x * 2.236936, precision: 1 },
            ],
            particles: Some(ParticleTuning {
                velocity_scale: 1.0 / 4400.0,
                max_intensity: 0.7,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_has_particles() {
        let p = Product::wind();
        let tuning = p.particles.unwrap();
        assert!((tuning.max_intensity - 17.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_particle_tuning_builds_trail_ramp() {
        let tuning = Product::wind().particles.unwrap();
        let ramp = tuning.intensity_ramp();
        assert!(!ramp.is_empty());
        // Saturates at the product's max intensity.
        assert_eq!(ramp.index_for(17.0), ramp.len() - 1);
        assert_eq!(ramp.index_for(1000.0), ramp.len() - 1);
    }

    #[test]
    fn test_scale_clamps_to_bounds() {
        let p = Product::temperature();
        let below = p.scale.gradient(0.0, 255);
        let at_min = p.scale.gradient(193.0, 255);
        assert_eq!(below, at_min);
        let above = p.scale.gradient(1000.0, 255);
        let at_max = p.scale.gradient(328.0, 255);
        assert_eq!(above, at_max);
    }

    #[test]
    fn test_format_scalar_units() {
        let p = Product::wind();
        let kmh = &p.units[0];
        assert_eq!(format_scalar(10.0, kmh), "36");
        let ms = &p.units[1];
        assert_eq!(format_scalar(10.0, ms), "10.0");
    }

    #[test]
    fn test_format_vector_cardinal_degrees() {
        let p = Product::wind();
        // Wind blowing toward the east comes from the west (270°).
        let s = format_vector(10.0, 0.0, 10.0, &p.units[1]);
        assert_eq!(s, "270° @ 10.0");
    }
}
