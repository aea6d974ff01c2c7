use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nalgebra::Point3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use terra_sim_core::{ParticleSystem, SimConfig, SphereMesh, Terrain, TriMesh};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Terrain and particle simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "terra-sim-demo")]
#[command(about = "Fault-plane terrain and bouncing particle demo", long_about = None)]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for terrain and particles
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain cells per side
    #[arg(long)]
    divisions: Option<usize>,

    /// Number of fault passes
    #[arg(long)]
    iterations: Option<u32>,

    /// Number of particles to spawn
    #[arg(short, long)]
    particles: Option<usize>,

    /// Simulation duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,

    /// Time step in seconds
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 1.0)]
    report_interval: f32,

    /// Sphere tessellation level used to draw particles
    #[arg(long, default_value_t = 3)]
    sphere_subdivisions: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> anyhow::Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(divisions) = args.divisions {
        config.terrain.grid.divisions = divisions;
    }
    if let Some(iterations) = args.iterations {
        config.terrain.fault.iterations = iterations;
    }
    if let Some(count) = args.particles {
        config.particle_count = count;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn report_terrain(terrain: &Terrain) -> anyhow::Result<()> {
    let mesh = terrain.mesh();
    println!(
        "Terrain: {} vertices, {} triangles, {} edges",
        mesh.num_vertices(),
        mesh.num_triangles(),
        terrain.edges().len()
    );
    println!(
        "Heights: min {:.4}, max {:.4}",
        terrain.min_height(),
        terrain.max_height()
    );

    // Same bounds a viewer would use to frame the terrain
    let surface = TriMesh::from_buffers(&mesh.position_data(), &mesh.index_data())
        .context("rebuilding terrain as a triangle mesh")?;
    let aabb = surface.aabb();
    let fit = surface.canonical_transform();
    let corner = fit.transform_point(&Point3::from(aabb.max));
    println!(
        "Bounds: [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}], fitted corner ({:.3}, {:.3}, {:.3})",
        aabb.min.x, aabb.min.y, aabb.min.z, aabb.max.x, aabb.max.y, aabb.max.z, corner.x, corner.y, corner.z
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    anyhow::ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "dt must be finite and positive, got {}",
        args.dt
    );
    anyhow::ensure!(
        args.report_interval > 0.0,
        "report interval must be positive, got {}",
        args.report_interval
    );

    let config = load_config(&args)?;

    println!("=== Terrain Particle Demo ===\n");
    println!("Seed: {}", config.seed);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let terrain = Terrain::build(&config.terrain, &mut rng).context("building terrain")?;
    report_terrain(&terrain)?;

    let sphere = SphereMesh::new(args.sphere_subdivisions);
    println!("Particle sphere: {} triangles\n", sphere.num_triangles());

    let mut system =
        ParticleSystem::new(config.particles, config.seed).context("creating particle system")?;
    system
        .spawn(config.particle_count)
        .context("spawning particles")?;
    info!(count = system.len(), "spawned particles");

    println!("Running simulation...\n");
    println!("Time(s) | Settled | Collisions | Mean free speed");
    println!("--------|---------|------------|----------------");

    let mut time = 0.0;
    let mut next_report = 0.0;
    while time < args.duration {
        system.step(args.dt);
        time += args.dt;

        if time >= next_report {
            let stats = system.stats();
            println!(
                "{:7.2} | {:7} | {:10} | {:15.3}",
                time, stats.settled, stats.total_collisions, stats.mean_free_speed
            );
            next_report += args.report_interval;
        }

        if system.settled_count() == system.len() {
            break;
        }
    }

    let stats = system.stats();
    println!("\n=== Simulation Complete ===");
    println!("Simulated time: {:.2}s", stats.simulation_time);
    println!("Particles settled: {}/{}", stats.settled, stats.count);
    println!("Total wall collisions: {}", stats.total_collisions);

    for (i, p) in system.particles().iter().enumerate() {
        let pos = p.position();
        println!(
            "  #{i:<3} r={:.3} pos=({:+.3}, {:+.3}, {:+.3}) {:?}",
            p.radius(),
            pos.x,
            pos.y,
            pos.z,
            p.state()
        );
    }

    Ok(())
}
