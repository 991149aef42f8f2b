use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use roadnav::cache::{GraphCache, DEFAULT_CACHE_FOLDER};
use roadnav::{BuildOptions, RoadNetwork};

#[derive(Debug, thiserror::Error)]
enum BuildError {
    #[error("tables: {0}")]
    Tables(#[from] roadnav::loader::Error),

    #[error("network: {0}")]
    Network(#[from] roadnav::IngestError),

    #[error("cache: {0}")]
    Cache(#[from] roadnav::cache::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] BuildError);

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Source {
    /// The path to the raw node & edge tables (JSON, optionally gzip- or bzip2-compressed)
    tables: PathBuf,

    /// Only use nodes inside "min_lon,min_lat,max_lon,max_lat"
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: Option<[f64; 4]>,

    /// Cache the built network under this name
    #[arg(long)]
    cache_name: Option<String>,

    /// Directory with cached networks
    #[arg(long, default_value = DEFAULT_CACHE_FOLDER)]
    cache_dir: PathBuf,

    /// Assume the default speed limit for malformed ones instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Find a route between two points and print it as GeoJSON
    #[command(allow_negative_numbers = true)]
    Route {
        #[command(flatten)]
        source: Source,

        /// Longitude of the start point
        start_lon: f64,

        /// Latitude of the start point
        start_lat: f64,

        /// Longitude of the end point
        end_lon: f64,

        /// Latitude of the end point
        end_lat: f64,

        #[arg(long, value_enum, default_value_t = Algorithm::Astar)]
        algorithm: Algorithm,
    },

    /// Compare A* against uniform-cost search on random queries
    Compare {
        #[command(flatten)]
        source: Source,

        /// Number of random queries
        #[arg(long, default_value_t = 200)]
        count: usize,

        /// Seed of the query generator
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Astar,
    Ucs,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let mut logger = colog::default_builder();
    logger.filter_level(log::LevelFilter::Info);
    logger.parse_default_env();
    logger.init();

    match Cli::parse().command {
        Command::Route {
            source,
            start_lon,
            start_lat,
            end_lon,
            end_lat,
            algorithm,
        } => {
            let g = load_graph(&source)?;
            route(&g, (start_lon, start_lat), (end_lon, end_lat), algorithm)
        }

        Command::Compare {
            source,
            count,
            seed,
        } => {
            let g = load_graph(&source)?;
            let bbox = source.bbox.unwrap_or_else(|| network_bbox(&g));
            compare(&g, bbox, count, seed)
        }
    }
}

fn parse_bbox(s: &str) -> Result<[f64; 4], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 4 values, got {}", v.len()))
}

fn load_graph(source: &Source) -> Result<RoadNetwork, GraphLoadError> {
    let build = || build_graph(&source.tables, source.bbox, source.lenient);
    let result = match &source.cache_name {
        Some(name) => GraphCache::with_folder(&source.cache_dir, name.as_str()).load_or_build(build),
        None => build(),
    };
    result.map_err(|e| GraphLoadError(source.tables.clone(), e))
}

fn build_graph(
    path: &Path,
    bbox: Option<[f64; 4]>,
    lenient: bool,
) -> Result<RoadNetwork, BuildError> {
    let options = roadnav::loader::Options {
        bbox: bbox.unwrap_or([0.0; 4]),
        ..roadnav::loader::Options::default()
    };
    let tables = roadnav::loader::read_tables_from_file(&options, path)?;
    let build_options = BuildOptions {
        strict_speed_limits: !lenient,
    };
    Ok(RoadNetwork::build(tables.nodes, tables.edges, &build_options)?)
}

fn find_path(
    g: &RoadNetwork,
    from_id: i64,
    to_id: i64,
    algorithm: Algorithm,
) -> Result<Option<roadnav::Path>, roadnav::SearchError> {
    match algorithm {
        Algorithm::Astar => roadnav::find_path_astar(g, from_id, to_id),
        Algorithm::Ucs => roadnav::find_path_ucs(g, from_id, to_id),
    }
}

fn route(
    g: &RoadNetwork,
    start: (f64, f64),
    end: (f64, f64),
    algorithm: Algorithm,
) -> Result<(), Box<dyn Error>> {
    let start = g.nearest_node(RoadNetwork::mercator(start.0, start.1))?;
    let end = g.nearest_node(RoadNetwork::mercator(end.0, end.1))?;
    info!("start: {start}");
    info!("destination: {end}");

    let path = match find_path(g, start.id, end.id, algorithm)? {
        Some(path) => path,
        None => {
            warn!("no route between {} and {}", start.id, end.id);
            return Ok(());
        }
    };
    let minutes = roadnav::path_time_estimate(g, &path.elements) * 60.0;

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{\"minutes\": {minutes}}},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut coords = path.geometry(g).into_iter().peekable();
    while let Some([lon, lat]) = coords.next() {
        let suffix = if coords.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", lon, lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn network_bbox(g: &RoadNetwork) -> [f64; 4] {
    g.nodes().iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |[min_lon, min_lat, max_lon, max_lat], n| {
            [
                min_lon.min(n.lon),
                min_lat.min(n.lat),
                max_lon.max(n.lon),
                max_lat.max(n.lat),
            ]
        },
    )
}

struct Trial {
    elapsed: Duration,
    minutes: f64,
}

fn timed_trial(
    g: &RoadNetwork,
    from_id: i64,
    to_id: i64,
    algorithm: Algorithm,
) -> Result<Option<Trial>, roadnav::SearchError> {
    let started = Instant::now();
    let path = find_path(g, from_id, to_id, algorithm)?;
    let elapsed = started.elapsed();
    Ok(path.map(|p| Trial {
        elapsed,
        minutes: roadnav::path_time_estimate(g, &p.elements) * 60.0,
    }))
}

fn compare(g: &RoadNetwork, bbox: [f64; 4], count: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let [min_lon, min_lat, max_lon, max_lat] = bbox;
    if !(min_lon < max_lon && min_lat < max_lat) {
        return Err(format!("empty bounding box: {bbox:?}").into());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut results: Vec<(Trial, Trial)> = Vec::with_capacity(count);

    for query in 1..=count {
        let start = g.nearest_node(RoadNetwork::mercator(
            rng.gen_range(min_lon..max_lon),
            rng.gen_range(min_lat..max_lat),
        ))?;
        let end = g.nearest_node(RoadNetwork::mercator(
            rng.gen_range(min_lon..max_lon),
            rng.gen_range(min_lat..max_lat),
        ))?;

        let astar = timed_trial(g, start.id, end.id, Algorithm::Astar)?;
        let ucs = timed_trial(g, start.id, end.id, Algorithm::Ucs)?;
        match (astar, ucs) {
            (Some(astar), Some(ucs)) => {
                println!(
                    "#{query}: A* {:.6}s {:.6}min | UCS {:.6}s {:.6}min",
                    astar.elapsed.as_secs_f64(),
                    astar.minutes,
                    ucs.elapsed.as_secs_f64(),
                    ucs.minutes,
                );
                results.push((astar, ucs));
            }
            _ => println!("#{query}: NO PATH FOUND ({} -> {})", start.id, end.id),
        }
    }

    let found = results.len();
    println!(
        "{found} successful queries, {} without a path due to disconnected nodes",
        count - found
    );
    if found == 0 {
        return Ok(());
    }

    let n = found as f64;
    let average = |values: Vec<f64>| values.iter().sum::<f64>() / n;
    let astar_secs = average(results.iter().map(|(a, _)| a.elapsed.as_secs_f64()).collect());
    let ucs_secs = average(results.iter().map(|(_, u)| u.elapsed.as_secs_f64()).collect());
    let astar_minutes = average(results.iter().map(|(a, _)| a.minutes).collect());
    let ucs_minutes = average(results.iter().map(|(_, u)| u.minutes).collect());
    let astar_faster = results.iter().filter(|(a, u)| a.elapsed < u.elapsed).count();

    println!("A* average runtime: {astar_secs:.6}s, UCS average runtime: {ucs_secs:.6}s");
    println!(
        "A* average time to arrival: {astar_minutes:.6}min, UCS average time to arrival: {ucs_minutes:.6}min"
    );
    println!(
        "A* was faster than UCS in {:.2}% of queries",
        astar_faster as f64 / n * 100.0
    );
    println!(
        "A* routes were on average {:.6}min slower than UCS routes",
        astar_minutes - ucs_minutes
    );

    Ok(())
}
