//! Energy readers (brightness, luma, RGBA, custom) and the built-in
//! scalar energy functions (norm, sum-of-absolutes, x-only gradient,
//! null), plus the gradient helpers they share.

use std::sync::Arc;

use crate::pixel::{get_rgbcol, PixelBuffer};
use crate::rwindow::{MaterializedWindow, RWindow, SampleSource};
use crate::types::{EnergyBuiltin, ImageType};

/// Opaque user data threaded through to a custom energy function.
pub type EnergyExtra = Arc<dyn std::any::Any + Send + Sync>;

/// A caller-supplied energy function: `(x, y, w, h, window, extra) -> energy`.
pub type EnergyFn = Arc<dyn Fn(u32, u32, u32, u32, &MaterializedWindow, &EnergyExtra) -> f64 + Send + Sync>;

/// `sqrt(gx^2 + gy^2)`.
pub fn grad_norm(gx: f64, gy: f64) -> f64 {
    (gx * gx + gy * gy).sqrt()
}

/// `(|gx| + |gy|) / 2`.
pub fn grad_sumabs(gx: f64, gy: f64) -> f64 {
    (gx.abs() + gy.abs()) / 2.0
}

/// `|gx|`.
pub fn grad_xabs(gx: f64, _gy: f64) -> f64 {
    gx.abs()
}

/// Central difference in the interior, forward/backward at the
/// boundary of the *visible* image (`w`, `h`), independent of the
/// underlying reading window's own zero-fill boundary.
pub fn gradient<S: SampleSource>(win: &RWindow, src: &S, x: u32, y: u32, w: u32, h: u32, ch: u32) -> (f64, f64) {
    let gx = if x == 0 {
        win.read(src, 1, 0, ch) - win.read(src, 0, 0, ch)
    } else if x + 1 >= w {
        win.read(src, 0, 0, ch) - win.read(src, -1, 0, ch)
    } else {
        (win.read(src, 1, 0, ch) - win.read(src, -1, 0, ch)) / 2.0
    };
    let gy = if y == 0 {
        win.read(src, 0, 1, ch) - win.read(src, 0, 0, ch)
    } else if y + 1 >= h {
        win.read(src, 0, 0, ch) - win.read(src, 0, -1, ch)
    } else {
        (win.read(src, 0, 1, ch) - win.read(src, 0, -1, ch)) / 2.0
    };
    (gx, gy)
}

/// Evaluate one of the built-in energy functions over the window
/// centered (by an earlier `fill`) on `(x, y)` of a `w x h` visible
/// image.
pub fn compute_builtin<S: SampleSource>(
    builtin: EnergyBuiltin,
    win: &RWindow,
    src: &S,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> f64 {
    if builtin == EnergyBuiltin::Null {
        return 0.0;
    }
    let (gx, gy) = gradient(win, src, x, y, w, h, 0);
    match builtin {
        EnergyBuiltin::GradNorm => grad_norm(gx, gy),
        EnergyBuiltin::GradSumAbs => grad_sumabs(gx, gy),
        EnergyBuiltin::GradXabs => grad_xabs(gx, gy),
        EnergyBuiltin::Null => 0.0,
    }
}

/// Brightness reader: a single scalar per pixel, averaging the
/// RGB-equivalent channels (after CMY/CMYK compositing) or reading
/// the lone gray channel, alpha-weighted when an alpha channel is
/// configured.
pub fn read_brightness(
    buf: &PixelBuffer,
    p: usize,
    channels: u32,
    image_type: ImageType,
    alpha_channel: Option<u32>,
    black_channel: Option<u32>,
) -> f64 {
    let val = match image_type {
        ImageType::Grey | ImageType::GreyA => buf.get_norm(p * channels as usize),
        ImageType::Custom => read_brightness_custom(buf, p, channels, alpha_channel, black_channel),
        _ => {
            let mut sum = 0.0;
            for ch in 0..3 {
                sum += get_rgbcol(buf, p, channels, image_type, ch, black_channel);
            }
            sum / 3.0
        }
    };
    weight_by_alpha(buf, p, channels, alpha_channel, val)
}

fn read_brightness_custom(
    buf: &PixelBuffer,
    p: usize,
    channels: u32,
    alpha_channel: Option<u32>,
    black_channel: Option<u32>,
) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for ch in 0..channels {
        if Some(ch) == alpha_channel || Some(ch) == black_channel {
            continue;
        }
        sum += buf.get_norm(p * channels as usize + ch as usize);
        count += 1;
    }
    let avg = if count > 0 { sum / count as f64 } else { 0.0 };
    match black_channel {
        Some(k_ch) => {
            let k = buf.get_norm(p * channels as usize + k_ch as usize);
            (1.0 - k) * (1.0 - avg)
        }
        None => avg,
    }
}

/// Luma reader: `0.2126 R + 0.7152 G + 0.0722 B` on the RGB-equivalent
/// channels, alpha-weighted when present.
pub fn read_luma(
    buf: &PixelBuffer,
    p: usize,
    channels: u32,
    image_type: ImageType,
    alpha_channel: Option<u32>,
    black_channel: Option<u32>,
) -> f64 {
    let val = match image_type {
        ImageType::Grey | ImageType::GreyA => buf.get_norm(p * channels as usize),
        _ => {
            let r = get_rgbcol(buf, p, channels, image_type, 0, black_channel);
            let g = get_rgbcol(buf, p, channels, image_type, 1, black_channel);
            let b = get_rgbcol(buf, p, channels, image_type, 2, black_channel);
            0.2126 * r + 0.7152 * g + 0.0722 * b
        }
    };
    weight_by_alpha(buf, p, channels, alpha_channel, val)
}

fn weight_by_alpha(buf: &PixelBuffer, p: usize, channels: u32, alpha_channel: Option<u32>, val: f64) -> f64 {
    match alpha_channel {
        Some(a) => val * buf.get_norm(p * channels as usize + a as usize),
        None => val,
    }
}

/// RGBA reader: raw channel `ch` (0..4), no compositing.
pub fn read_rgba(buf: &PixelBuffer, p: usize, channels: u32, ch: u32) -> f64 {
    buf.get_norm(p * channels as usize + ch as usize)
}

/// Custom reader: raw channel `ch` (0..channels), no compositing.
pub fn read_custom(buf: &PixelBuffer, p: usize, channels: u32, ch: u32) -> f64 {
    buf.get_norm(p * channels as usize + ch as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_null_is_always_zero() {
        struct Zero;
        impl SampleSource for Zero {
            fn sample(&self, _x: i32, _y: i32, _ch: u32) -> Option<f64> {
                Some(42.0)
            }
        }
        let win = RWindow::new(1, 1, false);
        let src = Zero;
        assert_eq!(compute_builtin(EnergyBuiltin::Null, &win, &src, 0, 0, 4, 4), 0.0);
    }

    #[test]
    fn xabs_matches_forward_difference_at_left_edge() {
        struct Ramp;
        impl SampleSource for Ramp {
            fn sample(&self, x: i32, y: i32, _ch: u32) -> Option<f64> {
                if x < 0 || y < 0 {
                    None
                } else {
                    Some(x as f64)
                }
            }
        }
        let mut win = RWindow::new(1, 1, false);
        let src = Ramp;
        win.fill(&src, 0, 0);
        let e = compute_builtin(EnergyBuiltin::GradXabs, &win, &src, 0, 0, 4, 4);
        assert!((e - 1.0).abs() < 1e-9);
    }

    #[test]
    fn grey_brightness_reads_single_channel() {
        let buf = PixelBuffer::U8(vec![0x80]);
        let v = read_brightness(&buf, 0, 1, ImageType::Grey, None, None);
        assert!((v - 0x80 as f64 / 0xFF as f64).abs() < 1e-9);
    }

    #[test]
    fn rgb_brightness_averages_three_channels() {
        let buf = PixelBuffer::U8(vec![0xFF, 0x00, 0x00]);
        let v = read_brightness(&buf, 0, 3, ImageType::Rgb, None, None);
        assert!((v - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn alpha_weights_brightness_to_zero_when_transparent() {
        let buf = PixelBuffer::U8(vec![0xFF, 0x00]);
        let v = read_brightness(&buf, 0, 2, ImageType::GreyA, Some(1), None);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn luma_weights_green_heaviest() {
        let red = PixelBuffer::U8(vec![0xFF, 0x00, 0x00]);
        let green = PixelBuffer::U8(vec![0x00, 0xFF, 0x00]);
        let lr = read_luma(&red, 0, 3, ImageType::Rgb, None, None);
        let lg = read_luma(&green, 0, 3, ImageType::Rgb, None, None);
        assert!(lg > lr);
    }
}
