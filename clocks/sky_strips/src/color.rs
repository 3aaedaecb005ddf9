//! Color module - RGB anchors and blending
//!
//! Sky colors are plain 8-bit RGB triples blended channel by channel.

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Named sky anchors shared by the fixed table and the altitude paths
pub mod palette {
    use super::Rgb;

    pub const DEEP_NIGHT: Rgb = Rgb::new(11, 16, 38);
    pub const TWILIGHT_INDIGO: Rgb = Rgb::new(46, 44, 104);
    pub const DAWN_RED: Rgb = Rgb::new(184, 74, 72);
    pub const DAWN_ORANGE: Rgb = Rgb::new(244, 140, 70);
    pub const DAWN_GOLD: Rgb = Rgb::new(250, 198, 106);
    pub const SKY_BLUE: Rgb = Rgb::new(108, 172, 228);
    pub const AFTERNOON_GOLD: Rgb = Rgb::new(242, 186, 94);
    pub const DUSK_ORANGE: Rgb = Rgb::new(234, 118, 60);
    pub const DUSK_PURPLE: Rgb = Rgb::new(110, 62, 120);
}

/// Per-channel linear interpolation; `t` is clamped to [0, 1]
pub fn lerp(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb {
        r: channel(c1.r, c2.r),
        g: channel(c1.g, c2.g),
        b: channel(c1.b, c2.b),
    }
}

/// Hermite ease: clamps to [0, 1] then applies t²(3 - 2t)
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::palette::*;
    use super::*;
    use proptest::prelude::*;

    fn rgb_strategy() -> impl Strategy<Value = Rgb> {
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(DEEP_NIGHT, SKY_BLUE, 0.0), DEEP_NIGHT);
        assert_eq!(lerp(DEEP_NIGHT, SKY_BLUE, 1.0), SKY_BLUE);
    }

    #[test]
    fn test_lerp_rounds_to_nearest() {
        let mid = lerp(Rgb::new(0, 0, 0), Rgb::new(255, 1, 3), 0.5);
        assert_eq!(mid, Rgb::new(128, 1, 2));
    }

    #[test]
    fn test_smoothstep_shape() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
        assert!(smoothstep(0.25) < 0.25);
    }

    proptest! {
        #[test]
        fn lerp_of_identical_colors_is_identity(c in rgb_strategy(), t in 0.0f64..=1.0) {
            prop_assert_eq!(lerp(c, c, t), c);
        }

        #[test]
        fn lerp_endpoints_hold_for_any_pair(a in rgb_strategy(), b in rgb_strategy()) {
            prop_assert_eq!(lerp(a, b, 0.0), a);
            prop_assert_eq!(lerp(a, b, 1.0), b);
        }

        #[test]
        fn smoothstep_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(smoothstep(lo) <= smoothstep(hi) + 1e-12);
        }
    }
}
