// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate image;

use clap::{App, Arg};
use image::{GenericImageView, RgbaImage};

use lqr_rs::{CarverBuilder, ColDepth, EnergyBuiltin, PixelBuffer, ResizeOrder};

fn parse_energy(name: &str) -> EnergyBuiltin {
    match name {
        "grad-sumabs" => EnergyBuiltin::GradSumAbs,
        "grad-xabs" => EnergyBuiltin::GradXabs,
        "null" => EnergyBuiltin::Null,
        _ => EnergyBuiltin::GradNorm,
    }
}

fn main() {
    env_logger::init();

    let matches = App::new("lqr-resize")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware image resizing (seam carving / liquid rescale)")
        .arg(Arg::with_name("input").help("The image to resize").required(true).index(1))
        .arg(Arg::with_name("output").help("Where to write the result").required(true).index(2))
        .arg(Arg::with_name("width").long("width").takes_value(true).help("Target width (defaults to the input width)"))
        .arg(Arg::with_name("height").long("height").takes_value(true).help("Target height (defaults to the input height)"))
        .arg(Arg::with_name("rigidity").long("rigidity").takes_value(true).default_value("0.0"))
        .arg(
            Arg::with_name("energy")
                .long("energy")
                .takes_value(true)
                .possible_values(&["grad-norm", "grad-sumabs", "grad-xabs", "null"])
                .default_value("grad-norm"),
        )
        .arg(
            Arg::with_name("height-first")
                .long("height-first")
                .help("Resize height before width instead of the default width-first order"),
        )
        .get_matches();

    let input_path = matches.value_of("input").unwrap();
    let output_path = matches.value_of("output").unwrap();

    let image = image::open(input_path).expect("could not open input image");
    let (w, h) = image.dimensions();
    let rgba = image.to_rgba();
    let data = rgba.into_raw();

    let target_w: u32 = matches.value_of("width").map(|v| v.parse().expect("invalid --width")).unwrap_or(w);
    let target_h: u32 = matches.value_of("height").map(|v| v.parse().expect("invalid --height")).unwrap_or(h);
    let rigidity: f32 = matches.value_of("rigidity").unwrap().parse().expect("invalid --rigidity");
    let energy = parse_energy(matches.value_of("energy").unwrap());

    let buffer = PixelBuffer::U8(data);
    let mut carver = CarverBuilder::new(buffer, w, h, 4)
        .col_depth(ColDepth::U8)
        .delta_x(1)
        .rigidity(rigidity)
        .energy_builtin(energy)
        .alpha_channel(3)
        .resize_order(if matches.is_present("height-first") { ResizeOrder::HeightFirst } else { ResizeOrder::WidthFirst })
        .build()
        .expect("could not build carver");

    carver.resize(target_w, target_h).expect("resize failed");

    let mut out = vec![0u8; (carver.width() * carver.height() * 4) as usize];
    while let Some((x, y, px)) = carver.scan() {
        let base = ((y * carver.width() + x) * 4) as usize;
        out[base..base + 4].copy_from_slice(px);
    }

    RgbaImage::from_raw(carver.width(), carver.height(), out)
        .expect("output buffer had the wrong size")
        .save(output_path)
        .expect("could not write output image");
}
