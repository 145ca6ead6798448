//! Small enumerations shared by the rest of the crate.

/// Physical sample format of one channel of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColDepth {
    /// 8-bit unsigned, normalized by 255.
    U8,
    /// 16-bit unsigned, normalized by 65535.
    U16,
    /// 32-bit float, already in `[0, 1]`.
    F32,
    /// 64-bit float, already in `[0, 1]`.
    F64,
}

/// Semantic meaning of a pixel's channels, used by the brightness and
/// luma energy readers and by the pixel codec's `get_rgbcol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Single gray channel.
    Grey,
    /// Gray + alpha.
    GreyA,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    RgbA,
    /// Cyan, magenta, yellow (subtractive).
    Cmy,
    /// Cyan, magenta, yellow, black.
    Cmyk,
    /// Cyan, magenta, yellow, black, alpha.
    CmykA,
    /// Anything else: channel semantics are caller-defined.
    Custom,
}

impl ImageType {
    /// Infer an image type from a channel count, matching the
    /// library's `new()` defaulting rule (1=GREY, 2=GREYA, 3=RGB,
    /// 4=RGBA, 5=CMYKA, anything else=CUSTOM).
    pub fn from_channel_count(channels: u32) -> ImageType {
        match channels {
            1 => ImageType::Grey,
            2 => ImageType::GreyA,
            3 => ImageType::Rgb,
            4 => ImageType::RgbA,
            5 => ImageType::CmykA,
            _ => ImageType::Custom,
        }
    }

    /// Whether this image type is one of the subtractive CMY(K)
    /// family, which the pixel codec and brightness reader treat
    /// specially.
    pub fn is_subtractive(self) -> bool {
        matches!(self, ImageType::Cmy | ImageType::Cmyk | ImageType::CmykA)
    }
}

/// Which axis the resize driver tackles first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOrder {
    /// Resize width, then height.
    WidthFirst,
    /// Resize height, then width.
    HeightFirst,
}

/// Built-in energy functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyBuiltin {
    /// `sqrt(gx^2 + gy^2)`.
    GradNorm,
    /// `(|gx| + |gy|) / 2`.
    GradSumAbs,
    /// `|gx|`.
    GradXabs,
    /// Always zero; useful to isolate the effect of rigidity.
    Null,
}

/// Which reader feeds the energy function's reading window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderType {
    /// A single brightness scalar per pixel.
    Brightness,
    /// Rec. 709 luma.
    Luma,
    /// Four raw channels (RGBA), alpha not pre-multiplied.
    Rgba,
    /// `channels` raw channel values, caller interprets them.
    Custom,
}
