// sRGB <-> linear lookup tables so the host can flatten RGBA output onto a
// background without calling powf per pixel.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), index = (linear * 4095).round()
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn to_srgb(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Mix one channel of `fg` over `bg` with coverage `alpha` (0..=255), in linear light.
    #[inline]
    pub fn over(&self, fg: u8, bg: u8, alpha: u8) -> u8 {
        match alpha {
            0 => bg,
            255 => fg,
            a => {
                let a = a as f32 / 255.0;
                self.to_srgb(a * self.to_linear(fg) + (1.0 - a) * self.to_linear(bg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_round_trip_endpoints() {
        let lut = GammaLut::new();
        assert_eq!(lut.to_srgb(lut.to_linear(0)), 0);
        assert_eq!(lut.to_srgb(lut.to_linear(255)), 255);
    }

    #[test]
    fn over_respects_full_and_zero_coverage() {
        let lut = GammaLut::new();
        assert_eq!(lut.over(200, 10, 255), 200);
        assert_eq!(lut.over(200, 10, 0), 10);
        let half = lut.over(255, 0, 128);
        // Linear-light mixing lands well above the naive sRGB midpoint.
        assert!(half > 170, "got {half}");
    }
}
