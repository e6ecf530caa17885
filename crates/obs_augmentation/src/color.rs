//! RGB/HSV conversion on batched tensors.
//!
//! Both directions operate on `[N, 3, H, W]` float tensors with channel
//! values in `[0, 1]`. Hue is stored normalized to `[0, 1)`.

use tch::Tensor;

/// Numerical-stability epsilon added to denominators.
pub const HSV_EPS: f64 = 1e-8;

/// Converts an RGB batch to HSV.
///
/// Standard max/min/delta formulation. Hue is computed branch-wise by
/// which channel holds the per-pixel maximum (ties resolved in favor of
/// the later branch: red, then green, then blue), forced to 0 where the
/// maximum is 0, and divided by 6 into `[0, 1)`. Saturation is
/// `delta / (max + eps)`, forced to 0 where the maximum is 0. Value is
/// the maximum itself.
pub fn rgb_to_hsv(rgb: &Tensor) -> Tensor {
    let r = rgb.select(1, 0);
    let g = rgb.select(1, 1);
    let b = rgb.select(1, 2);

    let cmax = rgb.amax([1], false);
    let cmin = rgb.amin([1], false);
    let delta = &cmax - &cmin;
    let denom = &delta + HSV_EPS;

    let hue_r = ((&g - &b) / &denom).remainder(6.0);
    let hue_g = (&b - &r) / &denom + 2.0;
    let hue_b = (&r - &g) / &denom + 4.0;

    let mut hue = cmax.zeros_like();
    hue = hue_r.where_self(&cmax.eq_tensor(&r), &hue);
    hue = hue_g.where_self(&cmax.eq_tensor(&g), &hue);
    hue = hue_b.where_self(&cmax.eq_tensor(&b), &hue);
    hue = hue.zeros_like().where_self(&cmax.eq(0.0), &hue);
    let hue = hue / 6.0;

    let saturation = &delta / (&cmax + HSV_EPS);
    let saturation = saturation
        .zeros_like()
        .where_self(&cmax.eq(0.0), &saturation);

    Tensor::stack(&[hue, saturation, cmax], 1)
}

/// Converts an HSV batch back to RGB.
///
/// Sector-based reconstruction over the six 60-degree hue sectors:
/// chroma `c = value * saturation`, cross term
/// `x = c * (1 - |(hue / 60) mod 2 - 1|)`, offset `m = value - c`. Each
/// sector assigns `c` and `x` to its pair of channels, then `m` is added
/// to all three. Input channels are clamped to `[0, 1]` first and the
/// output is clamped the same way.
pub fn hsv_to_rgb(hsv: &Tensor) -> Tensor {
    let hsv = hsv.clamp(0.0, 1.0);
    let hue = hsv.select(1, 0) * 360.0;
    let saturation = hsv.select(1, 1);
    let value = hsv.select(1, 2);

    let c = &value * &saturation;
    let x = &c * (((&hue / 60.0).remainder(2.0) - 1.0).abs() * -1.0 + 1.0);
    let m = (&value - &c).unsqueeze(1);

    let kind = hsv.kind();
    let sector = |lo: f64, hi: f64| hue.ge(lo).logical_and(&hue.lt(hi)).to_kind(kind);

    let s0 = sector(0.0, 60.0);
    let s1 = sector(60.0, 120.0);
    let s2 = sector(120.0, 180.0);
    let s3 = sector(180.0, 240.0);
    let s4 = sector(240.0, 300.0);
    let s5 = sector(300.0, 360.0);

    let red = &c * (&s0 + &s5) + &x * (&s1 + &s4);
    let green = &c * (&s1 + &s2) + &x * (&s0 + &s3);
    let blue = &c * (&s3 + &s4) + &x * (&s2 + &s5);

    (Tensor::stack(&[red, green, blue], 1) + m).clamp(0.0, 1.0)
}
