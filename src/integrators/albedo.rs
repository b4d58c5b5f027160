// Copyright @yucwang 2026

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::material_data::{MaterialData, MaterialOffset};
use crate::core::rng::RngCursor;
use crate::materials::BSDFDispatcher;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;

/// One directional albedo query: a material record and an outgoing direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AlbedoJob {
    pub offset: MaterialOffset,
    pub wo: Vector3f,
}

/// Local direction at `theta_degrees` from the normal, in the xz plane.
pub fn incident_direction(theta_degrees: Float) -> Vector3f {
    let theta = theta_degrees.max(0.0).min(90.0) * PI / 180.0;
    Vector3f::new(theta.sin(), 0.0, theta.cos())
}

/// Estimates the fraction of light reflected towards `wo` (a white furnace
/// test for a single bounce). Invalid samples count as zero.
pub fn estimate_albedo<D: MaterialData + ?Sized>(dispatcher: &BSDFDispatcher<'_, D>,
                                                 offset: MaterialOffset,
                                                 wo: Vector3f,
                                                 samples: u32,
                                                 rng: &mut RngCursor) -> RGBSpectrum {
    if samples == 0 {
        return RGBSpectrum::default();
    }

    let mut sum = RGBSpectrum::default();
    for _ in 0..samples {
        let sample = dispatcher.sample(offset, wo, rng);
        if sample.pdf <= 0.0 {
            continue;
        }
        sum += sample.value * (sample.wi.z.abs() / sample.pdf);
    }
    sum / samples as Float
}

/// Runs `estimate_albedo` for every job on all available cores. Job `i` draws
/// from its own cursor stream, so results do not depend on scheduling.
pub fn estimate_albedo_parallel<D: MaterialData + Sync + ?Sized>(data: &D,
                                                                 jobs: &[AlbedoJob],
                                                                 samples: u32,
                                                                 seed: u32,
                                                                 show_progress: bool) -> Vec<RGBSpectrum> {
    let total_jobs = jobs.len();
    let dispatcher = BSDFDispatcher::new(data);

    let progress = if show_progress {
        ProgressBar::new(total_jobs as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} queries")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let next_job = AtomicUsize::new(0);
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total_jobs.max(1));
    let (tx, rx) = mpsc::channel::<(usize, RGBSpectrum)>();
    let mut output = vec![RGBSpectrum::default(); total_jobs];

    log::debug!("Estimating {} albedo queries on {} threads.", total_jobs, thread_count);

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_job = &next_job;
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let job_index = next_job.fetch_add(1, Ordering::Relaxed);
                    if job_index >= total_jobs {
                        break;
                    }
                    let job = jobs[job_index];
                    let mut rng = RngCursor::for_pixel(job_index as u32, 0, seed);
                    let albedo = estimate_albedo(&dispatcher, job.offset, job.wo, samples, &mut rng);
                    if tx.send((job_index, albedo)).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for _ in 0..total_jobs {
            if let Ok((job_index, albedo)) = rx.recv() {
                output[job_index] = albedo;
                progress.inc(1);
            }
        }
    });
    progress.finish_and_clear();

    output
}
