// Copyright 2020 TwoCookingMice

use voxpath::core::scene_loader::load_scene_with_settings;
use voxpath::integrators::albedo::{estimate_albedo_parallel, incident_direction, AlbedoJob};
use voxpath::math::constants::Float;

use console::style;
use std::env;

const DEFAULT_SAMPLES: u32 = 4096;
const INCIDENT_ANGLES: [Float; 4] = [0.0, 30.0, 60.0, 80.0];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <scene.xml> [--samples N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut samples_override: Option<u32> = None;
    let mut seed_override: Option<u32> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                samples_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--seed" => {
                i += 1;
                seed_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            other => log::warn!("Ignoring unknown argument: {}.", other),
        }
        i += 1;
    }

    let load_result = match load_scene_with_settings(input_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}: {}", style("error:").red().bold(), input_path, e);
            std::process::exit(1);
        }
    };

    let scene = load_result.scene;
    let samples = samples_override.or(load_result.samples).unwrap_or(DEFAULT_SAMPLES);
    let seed = seed_override.or(load_result.seed).unwrap_or(0);

    let (xres, yres, zres) = scene.volume().resolution();
    log::info!("Volume {}x{}x{}: {} voxels occupied.", xres, yres, zres, scene.volume().occupied_count());

    let mut jobs = Vec::new();
    for (_, offset) in scene.material_ids() {
        for theta in INCIDENT_ANGLES.iter() {
            jobs.push(AlbedoJob { offset: *offset, wo: incident_direction(*theta) });
        }
    }
    log::info!("Estimating albedo for {} materials with {} samples per query.",
               scene.material_ids().len(), samples);

    let albedos = estimate_albedo_parallel(scene.materials(), &jobs, samples, seed, true);

    let mut header = format!("{:<16} {:<8}", "material", "type");
    for theta in INCIDENT_ANGLES.iter() {
        header.push_str(&format!(" {:>22}", format!("{}°", theta)));
    }
    println!("{}", style(header).bold());

    let dispatcher = scene.dispatcher();
    for (row, (id, offset)) in scene.material_ids().iter().enumerate() {
        let type_name = dispatcher.material_type(*offset).map(|t| t.name()).unwrap_or("unknown");
        let mut line = format!("{:<16} {:<8}", style(id).cyan(), type_name);
        for column in 0..INCIDENT_ANGLES.len() {
            let albedo = &albedos[row * INCIDENT_ANGLES.len() + column];
            let cell = format!("{:.3} {:.3} {:.3}", albedo.r(), albedo.g(), albedo.b());
            if albedo.max_component() > 1.0 {
                line.push_str(&format!(" {:>22}", style(cell).red()));
            } else {
                line.push_str(&format!(" {:>22}", cell));
            }
        }
        println!("{}", line);
    }
}
