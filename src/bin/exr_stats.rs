use voxpath::io::exr_utils::read_exr_from_file;
use voxpath::math::constants::Float;
use voxpath::math::spectrum::RGBSpectrum;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image.exr>", args[0]);
        std::process::exit(1);
    }

    let img = read_exr_from_file(&args[1]).unwrap_or_else(|e| {
        eprintln!("failed to read {}: {}", args[1], e);
        std::process::exit(1);
    });

    let mut min = RGBSpectrum::uniform(Float::INFINITY);
    let mut max = RGBSpectrum::uniform(Float::NEG_INFINITY);
    let mut sum = (0.0f64, 0.0f64, 0.0f64);
    let mut non_finite = 0usize;

    for p in img.pixels.iter() {
        if !(p.r().is_finite() && p.g().is_finite() && p.b().is_finite()) {
            non_finite += 1;
            continue;
        }
        min = RGBSpectrum::new(min.r().min(p.r()), min.g().min(p.g()), min.b().min(p.b()));
        max = RGBSpectrum::new(max.r().max(p.r()), max.g().max(p.g()), max.b().max(p.b()));
        sum.0 += p.r() as f64;
        sum.1 += p.g() as f64;
        sum.2 += p.b() as f64;
    }

    let n = img.pixels.len().max(1) as f64;
    println!("Size: {}x{} ({} pixels)", img.width, img.height, img.pixels.len());
    println!("Min RGB: {:.6}, {:.6}, {:.6}", min.r(), min.g(), min.b());
    println!("Max RGB: {:.6}, {:.6}, {:.6}", max.r(), max.g(), max.b());
    println!("Mean RGB: {:.6}, {:.6}, {:.6}", sum.0 / n, sum.1 / n, sum.2 / n);
    if non_finite > 0 {
        println!("Non-finite pixels: {}", non_finite);
    }
}
