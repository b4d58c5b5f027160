use voxpath::core::scene_loader::load_scene;
use voxpath::integrators::albedo::incident_direction;
use voxpath::integrators::lobe::render_lobe;
use voxpath::io::exr_utils::write_exr_to_file;
use voxpath::math::constants::Float;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <material-id> <output.exr> [--theta DEG] [--size N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let material_id = &args[2];
    let output_path = &args[3];

    let mut theta: Float = 45.0;
    let mut size: usize = 256;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--theta" => {
                i += 1;
                theta = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(theta);
            }
            "--size" => {
                i += 1;
                size = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(size);
            }
            _ => {}
        }
        i += 1;
    }

    let scene = load_scene(scene_path).unwrap_or_else(|e| {
        eprintln!("failed to load {}: {}", scene_path, e);
        std::process::exit(1);
    });
    let offset = scene.material_offset(material_id).unwrap_or_else(|| {
        eprintln!("no bsdf with id '{}' in {}", material_id, scene_path);
        std::process::exit(1);
    });

    log::info!("Rendering lobe of '{}' at {} degrees, {}x{} pixels.", material_id, theta, size, size);
    let image = render_lobe(&scene.dispatcher(), offset, incident_direction(theta), size);

    if let Err(e) = write_exr_to_file(&image, size, size, output_path) {
        eprintln!("failed to write {}: {}", output_path, e);
        std::process::exit(1);
    }
}
