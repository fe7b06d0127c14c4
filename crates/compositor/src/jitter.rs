//! Sub-pixel sample offsets for accumulation passes.
//!
//! The tables are the classic accumulation-buffer sample sets: each offset
//! lies inside the unit pixel centred on the origin, so every coordinate is
//! within `[-0.5, 0.5]`.

use sceneconfig::ConfigError;

/// Sample count used for depth of field when anti-aliasing is off.
pub const DOF_SAMPLES: u32 = 8;

/// Offset of one accumulation pass, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JitterPoint {
    pub x: f32,
    pub y: f32,
}

impl JitterPoint {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

const fn p(x: f32, y: f32) -> JitterPoint {
    JitterPoint::new(x, y)
}

static J2: [JitterPoint; 2] = [p(0.246490, 0.249999), p(-0.246490, -0.249999)];

static J4: [JitterPoint; 4] = [
    p(-0.208147, 0.353730),
    p(0.203849, -0.353780),
    p(-0.292626, -0.149945),
    p(0.296924, 0.149994),
];

static J8: [JitterPoint; 8] = [
    p(-0.334818, 0.435331),
    p(0.286438, -0.393495),
    p(0.459462, 0.141540),
    p(-0.414498, -0.192829),
    p(-0.183790, 0.082102),
    p(-0.079263, -0.317383),
    p(0.102254, 0.299133),
    p(0.164216, -0.054399),
];

static J15: [JitterPoint; 15] = [
    p(0.285561, 0.188437),
    p(0.360176, -0.065688),
    p(-0.111751, 0.275019),
    p(-0.055918, -0.215197),
    p(-0.080231, -0.470965),
    p(0.138721, 0.409168),
    p(0.384120, 0.458500),
    p(-0.454968, 0.134088),
    p(0.179271, -0.331196),
    p(-0.307049, -0.364927),
    p(0.105354, -0.010099),
    p(-0.154180, 0.021794),
    p(-0.370135, -0.116425),
    p(0.451636, -0.300013),
    p(-0.370610, 0.387504),
];

static J24: [JitterPoint; 24] = [
    p(0.030245, 0.136384),
    p(0.018865, -0.348867),
    p(-0.350114, -0.472309),
    p(0.222181, 0.149524),
    p(-0.393670, -0.266873),
    p(0.404568, 0.230436),
    p(0.098381, 0.465337),
    p(0.462671, 0.442116),
    p(0.400373, -0.212720),
    p(-0.409988, 0.263345),
    p(-0.115878, -0.001981),
    p(0.348425, -0.009237),
    p(-0.464016, 0.066467),
    p(-0.138674, -0.468006),
    p(0.144932, -0.022780),
    p(-0.250195, 0.150161),
    p(-0.181400, -0.264219),
    p(0.196097, -0.234139),
    p(-0.311082, -0.078815),
    p(0.268379, 0.366778),
    p(-0.040601, 0.327109),
    p(-0.234392, 0.354659),
    p(-0.003102, -0.154402),
    p(0.297997, -0.417965),
];

static J66: [JitterPoint; 66] = [
    p(0.266377, -0.218171),
    p(-0.170919, -0.429368),
    p(0.047356, -0.387135),
    p(-0.430063, 0.363413),
    p(-0.221638, -0.313768),
    p(0.124758, -0.197109),
    p(-0.400021, 0.482195),
    p(0.247882, 0.152010),
    p(-0.286709, -0.470214),
    p(-0.426790, 0.004977),
    p(-0.361249, -0.104549),
    p(-0.040643, 0.123453),
    p(-0.189296, 0.438963),
    p(-0.453521, -0.299889),
    p(0.408216, -0.457699),
    p(0.328973, -0.101914),
    p(-0.055540, -0.477952),
    p(0.194421, 0.453510),
    p(0.404051, 0.224974),
    p(0.310136, 0.419700),
    p(-0.021743, 0.403898),
    p(-0.466210, 0.248839),
    p(0.341369, 0.081490),
    p(0.124156, -0.016859),
    p(-0.461321, -0.176661),
    p(0.013210, 0.234401),
    p(0.174258, -0.311854),
    p(0.294061, 0.263364),
    p(-0.114836, 0.328189),
    p(0.041206, -0.106205),
    p(0.079227, 0.345021),
    p(-0.109319, -0.242380),
    p(0.425005, -0.332397),
    p(0.009146, 0.015098),
    p(-0.339084, -0.355707),
    p(-0.224596, -0.189548),
    p(0.083475, 0.117028),
    p(0.295962, -0.334699),
    p(0.452998, 0.025397),
    p(0.206511, -0.104668),
    p(0.447544, -0.096004),
    p(-0.108006, -0.002471),
    p(-0.380810, 0.130036),
    p(-0.242440, 0.186934),
    p(-0.200363, 0.070863),
    p(-0.344844, -0.230814),
    p(0.408660, 0.345826),
    p(-0.233016, 0.305203),
    p(0.158475, -0.430762),
    p(0.486972, 0.139163),
    p(-0.301610, 0.009319),
    p(0.282245, -0.458671),
    p(0.482046, 0.443890),
    p(-0.121527, 0.210223),
    p(-0.477606, -0.424878),
    p(-0.083941, -0.121440),
    p(-0.345773, 0.253779),
    p(0.234646, 0.034549),
    p(0.394102, -0.210901),
    p(-0.312571, 0.397656),
    p(0.200906, 0.333293),
    p(0.018703, -0.261792),
    p(-0.209349, -0.065383),
    p(0.076248, 0.478538),
    p(-0.073036, -0.355064),
    p(0.145087, 0.221726),
];

/// Returns the offsets for an `samples`-pass accumulation.
pub fn lookup(samples: u32) -> Result<&'static [JitterPoint], ConfigError> {
    match samples {
        2 => Ok(&J2),
        4 => Ok(&J4),
        8 => Ok(&J8),
        15 => Ok(&J15),
        24 => Ok(&J24),
        66 => Ok(&J66),
        other => Err(ConfigError::UnsupportedSampleCount(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneconfig::SUPPORTED_SAMPLE_COUNTS;

    #[test]
    fn every_supported_count_has_a_table_of_that_length() {
        for samples in SUPPORTED_SAMPLE_COUNTS {
            let table = lookup(samples).expect("supported table");
            assert_eq!(table.len(), samples as usize, "table for {samples}");
        }
    }

    #[test]
    fn offsets_stay_inside_the_pixel() {
        for samples in SUPPORTED_SAMPLE_COUNTS {
            for point in lookup(samples).unwrap() {
                assert!(point.x.abs() <= 0.5 && point.y.abs() <= 0.5, "{point:?}");
            }
        }
    }

    #[test]
    fn unsupported_counts_are_configuration_errors() {
        for samples in [0, 1, 3, 16, 65, 100] {
            let err = lookup(samples).unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedSampleCount(n) if n == samples));
        }
    }

    #[test]
    fn scaling_is_componentwise() {
        let scaled = JitterPoint::new(0.3, -0.6).scaled(0.5);
        assert!((scaled.x - 0.15).abs() < 1e-6);
        assert!((scaled.y + 0.3).abs() < 1e-6);
    }
}
