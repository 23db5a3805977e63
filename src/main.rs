//! Dismemberment demo
//!
//! Loads a rules file, spawns one authoritative skeleton with a replica
//! attached, and fires a seeded barrage of point and radial damage at it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dismemberment::core::types::{BoneHealth, BoneId, InstigatorId, SimTime};
use dismemberment::propagate::{BoneObservers, PhysicsLog};
use dismemberment::{
    BoneHealthQuery, DismembermentWorld, PointDamageEvent, RadialDamageEvent, Result, RulesFile,
    Skeleton,
};
use glam::Vec3;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Seeded dismemberment barrage against a single rig
#[derive(Parser, Debug)]
#[command(name = "dismemberment")]
#[command(about = "Fire a seeded damage barrage at a skeleton and report what broke")]
struct Args {
    /// Rules file (TOML); the bundled humanoid rig if omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulation ticks
    #[arg(long, default_value_t = 200)]
    ticks: u32,

    /// Seconds of real time per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Serialize)]
struct BreakLine {
    bone: BoneId,
    sequence: u64,
    instigators: usize,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct DemoResult {
    seed: u64,
    ticks: u32,
    sim_time: SimTime,
    point_hits: u32,
    blasts: u32,
    breaks: Vec<BreakLine>,
    health: Vec<BoneHealth>,
    regenerations_restored: usize,
    regenerations_pending: usize,
    physics_directives: usize,
    replica_broken: Vec<BoneId>,
    replica_notifications: usize,
    replica_in_sync: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dismemberment=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let rules = match &args.rules {
        Some(path) => RulesFile::load(path)?,
        None => RulesFile::humanoid()?,
    };
    rules.validate();

    let mut world = DismembermentWorld::new(rules.catalog());
    let physics = PhysicsLog::new();
    let id = world.spawn(Skeleton::new(rules.bones.clone(), rules.static_geometry(), physics.clone()));

    let mut replica = match world.get_mut(id) {
        Some(skeleton) => skeleton.attach_replica(PhysicsLog::new()),
        None => return Ok(()),
    };
    let replica_notifications = Arc::new(Mutex::new(0usize));
    count_breaks(replica.observers_mut(), Arc::clone(&replica_notifications));

    let targets: Vec<BoneId> = rules
        .bones
        .iter()
        .flat_map(|rule| std::iter::once(rule.bone.clone()).chain(rule.proxy_bones.iter().cloned()))
        .collect();
    let damage_types: Vec<_> = rules.damage_types.iter().map(|t| t.id.clone()).collect();
    let instigators: Vec<InstigatorId> = (0..3)
        .map(|_| InstigatorId(Uuid::from_u128(rng.gen())))
        .collect();
    let reference = rules
        .geometry
        .as_ref()
        .map(|g| g.reference_point)
        .unwrap_or(Vec3::ZERO);

    tracing::info!(seed, bones = rules.bones.len(), "Starting barrage");

    let mut point_hits = 0;
    let mut blasts = 0;
    let mut restored = 0;

    for _ in 0..args.ticks {
        let (Some(damage_type), Some(instigator)) =
            (damage_types.choose(&mut rng), instigators.choose(&mut rng))
        else {
            break;
        };

        if rng.gen_bool(0.15) {
            let direction = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let event = RadialDamageEvent {
                damage: rng.gen_range(10.0..60.0),
                damage_type: damage_type.clone(),
                origin: reference + direction.normalize_or_zero() * rng.gen_range(0.5..2.5),
                instigator: *instigator,
            };
            world.radial_damage(id, &event)?;
            blasts += 1;
        } else if let Some(bone) = targets.choose(&mut rng) {
            let Some(surface) = world.get(id).map(|s| s.damage_surface()) else {
                break;
            };
            let event = PointDamageEvent {
                damage: rng.gen_range(5.0..35.0),
                instigator: *instigator,
                hit_location: reference,
                hit_surface: surface,
                bone: bone.clone(),
                direction: Vec3::new(0.0, 0.0, -1.0),
                damage_type: damage_type.clone(),
            };
            world.point_damage(id, &event)?;
            point_hits += 1;
        }

        restored += world.advance(args.dt).restored;
        replica.pump();
    }

    let Some(skeleton) = world.get(id) else {
        return Ok(());
    };
    let result = DemoResult {
        seed,
        ticks: args.ticks,
        sim_time: world.clock().now(),
        point_hits,
        blasts,
        breaks: skeleton
            .break_history()
            .iter()
            .map(|event| BreakLine {
                bone: event.bone.clone(),
                sequence: event.sequence,
                instigators: event.instigators.len(),
            })
            .collect(),
        health: skeleton.all_bone_health(),
        regenerations_restored: restored,
        regenerations_pending: world.scheduler().pending(),
        physics_directives: physics.len(),
        replica_broken: replica.dismembered_bones(),
        replica_notifications: replica_notifications.lock().map(|n| *n).unwrap_or_default(),
        replica_in_sync: replica.dismembered_bones() == skeleton.dismembered_bones()
            && replica.all_bone_health() == skeleton.all_bone_health(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text(&result),
    }

    Ok(())
}

fn count_breaks(observers: &mut BoneObservers, counter: Arc<Mutex<usize>>) {
    observers.on_broken(move |_| {
        if let Ok(mut count) = counter.lock() {
            *count += 1;
        }
    });
}

fn print_text(result: &DemoResult) {
    println!("=== DISMEMBERMENT ===");
    println!(
        "seed {}  ticks {}  sim time {:.2}s  point hits {}  blasts {}",
        result.seed, result.ticks, result.sim_time, result.point_hits, result.blasts
    );
    println!();
    println!("Breaks:");
    if result.breaks.is_empty() {
        println!("  (none)");
    }
    for line in &result.breaks {
        println!("  #{:<3} {:<12} {} instigator(s)", line.sequence, line.bone, line.instigators);
    }
    println!();
    println!("Health:");
    for entry in &result.health {
        println!("  {:<12} {:>6.1}", entry.bone, entry.health);
    }
    println!();
    println!(
        "regeneration: {} restored, {} pending",
        result.regenerations_restored, result.regenerations_pending
    );
    println!(
        "replica: {} broken, {} notifications, in sync: {}",
        result.replica_broken.len(),
        result.replica_notifications,
        result.replica_in_sync
    );
}
