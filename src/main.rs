//! Lifelike CLI - Run simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use lifelike::{
    compute::{GameRule, Grid, GridStats},
    pattern::{GridLoader, PatternFile},
    schema::SimulationConfig,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Run a Life-like cellular automaton from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  generations  Overrides the configured generation count");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let mut config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.generations = generations;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    // Pattern paths are relative to the config file
    let pattern_path = match config_path.parent() {
        Some(dir) if config.pattern.is_relative() => dir.join(&config.pattern),
        _ => config.pattern.clone(),
    };

    let pattern = PatternFile::load(&pattern_path, config.format).unwrap_or_else(|e| {
        eprintln!("Error loading pattern: {}", e);
        std::process::exit(1);
    });

    let grid = match config.fixed_size() {
        Some((width, height)) => Grid::with_size_and_loader(width, height, &pattern),
        None => Grid::from_loader(&pattern),
    };
    let mut grid = grid.unwrap_or_else(|e| {
        eprintln!("Error initializing grid: {}", e);
        std::process::exit(1);
    });

    let rule = config
        .rule_override()
        .ok()
        .flatten()
        .or_else(|| pattern.game_rule())
        .unwrap_or_else(GameRule::conway);

    let generations = config.generations;

    println!("Lifelike Simulation");
    println!("===================");
    println!("Pattern: {} ({:?})", pattern_path.display(), pattern.format());
    println!("Grid: {}x{}", grid.width(), grid.height());
    println!("Rule: {}", rule);
    println!("Generations: {}", generations);
    println!(
        "Mode: {}",
        if config.parallel { "parallel" } else { "sequential" }
    );
    println!();

    let initial_stats = GridStats::from_grid(&grid);
    println!("Initial state:");
    println!("  Population: {}", initial_stats.population);
    println!("  Density: {:.4}", initial_stats.density);
    println!();

    // Run simulation
    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..generations {
        let advanced = if config.parallel {
            grid.advance_generation(&rule)
        } else {
            grid.advance_generation_sequential(&rule)
        };
        if let Err(e) = advanced {
            eprintln!("Error advancing generation: {}", e);
            std::process::exit(1);
        }

        // Print progress every 10%
        if (i + 1) % (generations / 10).max(1) == 0 {
            let stats = GridStats::from_grid(&grid);
            let elapsed = start.elapsed().as_secs_f32();
            let gens_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Generation {}/{}: population={}, density={:.4}, {:.1} gen/s",
                stats.generation, generations, stats.population, stats.density, gens_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = GridStats::from_grid(&grid);

    println!();
    println!("Final state:");
    println!("  Generation: {}", final_stats.generation);
    println!("  Population: {}", final_stats.population);
    println!("  Density: {:.4}", final_stats.density);
    println!();
    println!(
        "Time: {:.2}s ({:.1} gen/s)",
        elapsed.as_secs_f32(),
        generations as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
