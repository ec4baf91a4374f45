use clap::Parser;
use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::path::PathBuf;

use overworld::area::{Area, AreaBounds, AreaConfig, AreaHooks, ScatterPattern, ScatterRule};
use overworld::events::WorldEvent;
use overworld::export;
use overworld::factory::SequentialFactory;
use overworld::heightfield::HeightFieldParams;
use overworld::seeds::WorldSeeds;
use overworld::spawn::{AiType, ContentTables, SpawnDefinition, SubtypeConfig};
use overworld::terrain::ElevationBand;
use overworld::types::{AreaId, BiomeTag, Faction, InstanceId, PlayerId, SpawnKind, Weather};
use overworld::world::WorldOrchestrator;

#[derive(Parser, Debug)]
#[command(name = "overworld")]
#[command(about = "Run the persistent world core: terrain generation plus area spawn simulation")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Physical world extent along each axis
    #[arg(long, default_value = "512.0")]
    world_size: f32,

    /// Height-field resolution (cells per axis)
    #[arg(long, default_value = "128")]
    resolution: usize,

    /// Number of simulation ticks to run
    #[arg(short, long, default_value = "300")]
    ticks: u32,

    /// Simulated seconds per tick
    #[arg(long, default_value = "1.0")]
    dt: f32,

    /// Remove a random live instance every N ticks (0 = never)
    #[arg(long, default_value = "7")]
    kill_interval: u32,

    /// Export height/biome PNGs and a world report to this directory
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let master = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(master);
    println!("Generating world with seed: {}", master);
    println!("{}", seeds);

    let params = HeightFieldParams {
        world_size: args.world_size,
        resolution: args.resolution,
        ..HeightFieldParams::default()
    };

    println!("Generating terrain ({}x{} samples)...", args.resolution + 1, args.resolution + 1);
    let mut world = WorldOrchestrator::new(
        params,
        seeds,
        demo_tables(),
        Box::new(SequentialFactory::new()),
    );

    let grid = world.height_field().snapshot();
    println!(
        "Elevation range: {:.1} to {:.1}",
        grid.min_height(),
        grid.max_height()
    );
    print_band_distribution(&grid);

    println!("Registering areas...");
    for area in demo_areas(args.world_size) {
        let name = area.name().to_string();
        match world.register_area(area) {
            Ok(id) => {
                let registered = world.registry().area(id).unwrap();
                println!(
                    "  {} '{}': {} spawn pools",
                    id,
                    name,
                    registered.pools().count()
                );
            }
            Err(e) => eprintln!("  failed to register '{}': {}", name, e),
        }
    }
    world.set_weather(AreaId(3), Weather::Fog);

    // One wandering player orbiting the world center, crossing area borders
    let player = PlayerId(1);
    world.track_player(player, Vec3::ZERO);

    println!("Running {} ticks (dt {:.1})...", args.ticks, args.dt);
    let mut kill_rng = ChaCha8Rng::seed_from_u64(master ^ 0x6b696c6c);
    let mut live: HashSet<InstanceId> = HashSet::new();
    let mut spawned_total = 0u64;
    let mut removed_total = 0u64;
    let mut transitions = 0u64;

    for tick in 0..args.ticks {
        let angle = tick as f32 * 0.02;
        let orbit = args.world_size * 0.12;
        world.set_player_position(
            player,
            Vec3::new(angle.cos() * orbit, 0.0, angle.sin() * orbit),
        );

        world.update(args.dt);

        for event in world.drain_events() {
            match event {
                WorldEvent::InstanceSpawned { instance, .. } => {
                    live.insert(instance);
                    spawned_total += 1;
                }
                WorldEvent::InstanceDespawned { instance, .. } => {
                    live.remove(&instance);
                }
                WorldEvent::AreaEntered { .. } | WorldEvent::AreaExited { .. } => {
                    transitions += 1;
                }
                WorldEvent::SurfaceChanged => {}
            }
        }

        // Simulate kills/consumption so respawn timers get exercised
        if args.kill_interval > 0 && tick % args.kill_interval == 0 && !live.is_empty() {
            let victims: Vec<InstanceId> = live.iter().copied().collect();
            let victim = victims[kill_rng.gen_range(0..victims.len())];
            if world.notify_instance_removed(victim) {
                removed_total += 1;
            }
        }
    }

    println!();
    println!("Simulation finished at tick {}", world.tick());
    println!(
        "  {} spawned, {} removed, {} live, {} area transitions",
        spawned_total,
        removed_total,
        live.len(),
        transitions
    );
    for area in world.registry().iter() {
        println!(
            "  {} '{}': {} live across {} pools",
            area.id(),
            area.name(),
            area.live_count(),
            area.pools().count()
        );
    }

    println!();
    println!("Recent log:");
    for entry in world.log().recent(10) {
        println!("  [{:>5}] {} {}", entry.tick, entry.category.label(), entry.message);
    }

    if let Some(dir) = args.export {
        if let Err(e) = run_export(&world, &dir) {
            eprintln!("Export failed: {}", e);
            std::process::exit(1);
        }
        println!("Exported maps and report to {}", dir.display());
    }
}

fn run_export(world: &WorldOrchestrator, dir: &PathBuf) -> Result<(), overworld::error::WorldError> {
    std::fs::create_dir_all(dir)?;
    let grid = world.height_field().snapshot();
    export::export_height_png(&grid, dir.join("height.png"))?;
    export::export_band_png(&grid, dir.join("biomes.png"))?;
    export::write_world_report(world, dir.join("report.txt"))?;
    Ok(())
}

/// Sample a coarse band distribution across the grid.
fn print_band_distribution(grid: &overworld::heightfield::HeightGrid) {
    let mut counts = [0usize; 6];
    let mut total = 0usize;
    for (_, _, h) in grid.iter() {
        let idx = match ElevationBand::classify(h) {
            ElevationBand::DeepWater => 0,
            ElevationBand::ShallowWater => 1,
            ElevationBand::Sand => 2,
            ElevationBand::Grass => 3,
            ElevationBand::Mountain => 4,
            ElevationBand::Snow => 5,
        };
        counts[idx] += 1;
        total += 1;
    }
    let bands = [
        ElevationBand::DeepWater,
        ElevationBand::ShallowWater,
        ElevationBand::Sand,
        ElevationBand::Grass,
        ElevationBand::Mountain,
        ElevationBand::Snow,
    ];
    for (band, count) in bands.iter().zip(counts.iter()) {
        println!(
            "  {:>13}: {:>5.1}%",
            band.label(),
            100.0 * *count as f64 / total as f64
        );
    }
}

/// In-code demo content tables; real hosts load these from JSON.
fn demo_tables() -> ContentTables {
    let mut tables = ContentTables::new();

    tables.insert(
        SpawnKind::Enemy,
        "gnoll",
        SubtypeConfig {
            level: 3,
            base_health: 60.0,
            base_attack_power: 8.0,
            base_armor: 2.0,
            respawn_time: 45.0,
            ai_type: AiType::Aggressive,
        },
    );
    tables.insert(
        SpawnKind::Enemy,
        "wolf",
        SubtypeConfig {
            level: 2,
            base_health: 40.0,
            base_attack_power: 6.0,
            base_armor: 1.0,
            respawn_time: 30.0,
            ai_type: AiType::Defensive,
        },
    );
    tables.insert(
        SpawnKind::Enemy,
        "ashen_wyrm",
        SubtypeConfig {
            level: 12,
            base_health: 900.0,
            base_attack_power: 60.0,
            base_armor: 20.0,
            respawn_time: 600.0,
            ai_type: AiType::Aggressive,
        },
    );
    tables.insert(
        SpawnKind::Npc,
        "trader",
        SubtypeConfig {
            level: 1,
            base_health: 80.0,
            base_attack_power: 0.0,
            base_armor: 0.0,
            respawn_time: 120.0,
            ai_type: AiType::Passive,
        },
    );
    tables.insert(
        SpawnKind::Npc,
        "patrol_guard",
        SubtypeConfig {
            level: 5,
            base_health: 120.0,
            base_attack_power: 14.0,
            base_armor: 6.0,
            respawn_time: 90.0,
            ai_type: AiType::Patrol,
        },
    );
    tables.insert(SpawnKind::Resource, "copper_vein", SubtypeConfig::inert(180.0));
    tables.insert(SpawnKind::Resource, "herb_patch", SubtypeConfig::inert(90.0));
    tables.insert(SpawnKind::Structure, "watchtower", SubtypeConfig::inert(0.0));
    tables.insert(SpawnKind::Structure, "ruined_shrine", SubtypeConfig::inert(0.0));

    tables
}

/// Three demo areas around the central landmass.
fn demo_areas(world_size: f32) -> Vec<Area> {
    let r = world_size * 0.1;

    let meadows = Area::new(AreaConfig {
        id: AreaId(1),
        name: "Harbor Meadows".to_string(),
        bounds: AreaBounds::Circle {
            center: Vec3::new(world_size * 0.08, 0.0, 0.0),
            radius: r,
        },
        level_range: (1, 3),
        faction: Faction::Friendly,
        biome: BiomeTag::Plains,
        fixed_spawns: vec![
            SpawnDefinition::new(SpawnKind::Structure, "watchtower", Vec3::new(world_size * 0.08, 0.0, 0.0)),
        ],
        scatter_rules: vec![
            ScatterRule {
                kind: SpawnKind::Npc,
                subtypes: vec!["trader".to_string()],
                count: 2,
                max_count: 1,
                pattern: ScatterPattern::Single,
                respawn_override: None,
            },
            ScatterRule {
                kind: SpawnKind::Npc,
                subtypes: vec!["patrol_guard".to_string()],
                count: 2,
                max_count: 1,
                pattern: ScatterPattern::Patrol {
                    waypoints: 4,
                    radius: 10.0,
                },
                respawn_override: None,
            },
            ScatterRule {
                kind: SpawnKind::Resource,
                subtypes: vec!["herb_patch".to_string()],
                count: 4,
                max_count: 1,
                pattern: ScatterPattern::Single,
                respawn_override: None,
            },
        ],
    })
    .with_hooks(AreaHooks {
        on_enter: Some(Box::new(|player, desc| {
            println!("  >> player {} enters {} ({:?})", player.0, desc.name, desc.weather);
        })),
        on_exit: None,
    });

    let hills = Area::new(AreaConfig {
        id: AreaId(2),
        name: "Gnoll Hills".to_string(),
        bounds: AreaBounds::Circle {
            center: Vec3::new(-world_size * 0.08, 0.0, world_size * 0.06),
            radius: r,
        },
        level_range: (2, 6),
        faction: Faction::Hostile,
        biome: BiomeTag::Highlands,
        fixed_spawns: Vec::new(),
        scatter_rules: vec![
            ScatterRule {
                kind: SpawnKind::Enemy,
                subtypes: vec!["gnoll".to_string(), "wolf".to_string()],
                count: 6,
                max_count: 2,
                pattern: ScatterPattern::Single,
                respawn_override: None,
            },
            ScatterRule {
                kind: SpawnKind::Enemy,
                subtypes: vec!["gnoll".to_string()],
                count: 1,
                max_count: 3,
                pattern: ScatterPattern::Ambush { guard_radius: 12.0 },
                respawn_override: Some(60.0),
            },
            ScatterRule {
                kind: SpawnKind::Resource,
                subtypes: vec!["copper_vein".to_string()],
                count: 3,
                max_count: 1,
                pattern: ScatterPattern::Single,
                respawn_override: None,
            },
        ],
    });

    let roost = Area::new(AreaConfig {
        id: AreaId(3),
        name: "The Ashen Roost".to_string(),
        bounds: AreaBounds::Rect {
            min: Vec2::new(-world_size * 0.02, -world_size * 0.18),
            max: Vec2::new(world_size * 0.14, -world_size * 0.04),
        },
        level_range: (10, 14),
        faction: Faction::Contested,
        biome: BiomeTag::Tundra,
        fixed_spawns: vec![SpawnDefinition::new(
            SpawnKind::Structure,
            "ruined_shrine",
            Vec3::new(world_size * 0.06, 0.0, -world_size * 0.11),
        )],
        scatter_rules: vec![ScatterRule {
            kind: SpawnKind::Enemy,
            subtypes: vec!["ashen_wyrm".to_string()],
            count: 1,
            max_count: 1,
            pattern: ScatterPattern::Rare,
            respawn_override: Some(600.0),
        }],
    });

    vec![meadows, hills, roost]
}
