use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use nearest_poi::{self, osm, Bounds, Crs, Graph, Position, RouteProvider};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] nearest_poi::Error);

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare straight-line and shortest path distances to the nearest destination
    Compare(CompareArgs),

    /// Print routes from clicked points to all destinations
    Explore(ExploreArgs),
}

#[derive(Args)]
struct GraphArgs {
    /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
    osm_file: PathBuf,

    /// Type of the street network to load
    #[arg(long, default_value = "walk", value_parser = ["walk", "bike", "drive"])]
    network: String,

    /// Only load nodes within "min_lon,min_lat,max_lon,max_lat"
    #[arg(long)]
    bbox: Option<Bounds>,

    /// Seed for all random choices
    #[arg(long, default_value_t = 100)]
    seed: u64,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Number of sources to generate
    #[arg(long, default_value_t = 1000)]
    sources: usize,

    /// Number of destinations to generate, unless --destination-tag is used
    #[arg(long, default_value_t = 5)]
    destinations: usize,

    /// Use OSM nodes and ways with this tag as destinations, e.g. "leisure=park,nature_reserve".
    /// May be repeated.
    #[arg(long = "destination-tag")]
    destination_tags: Vec<osm::TagFilter>,

    /// Draw uniformly distributed points from the bbox (or the graph extent),
    /// instead of sampling graph nodes
    #[arg(long)]
    random_in_bbox: bool,

    /// Coordinate reference system for straight-line distances, e.g. EPSG:32630 or EPSG:3857.
    /// Defaults to the UTM zone of the network.
    #[arg(long)]
    crs: Option<Crs>,

    /// Number of histogram bins
    #[arg(long, default_value_t = 20)]
    bins: usize,

    /// Also write GeoJSON files with points and connections into this directory
    #[arg(long)]
    geojson: Option<PathBuf>,
}

#[derive(Args)]
struct ExploreArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Destination as "lat,lon"; if none are provided (and no --destination-tag is used),
    /// 5 random graph nodes are used
    #[arg(long = "destination")]
    destinations: Vec<Position>,

    /// Use OSM nodes and ways with this tag as destinations, e.g. "leisure=park,nature_reserve".
    /// May be repeated.
    #[arg(long = "destination-tag")]
    destination_tags: Vec<osm::TagFilter>,

    /// Clicked point as "lat,lon"; if none are provided, a random node is selected
    #[arg(long = "click")]
    clicks: Vec<Position>,

    /// Precompute paths from all nodes to all destinations up front
    #[arg(long)]
    precompute: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Compare(args) => compare(args),
        Command::Explore(args) => explore(args),
    }
}

fn load_graph(args: &GraphArgs) -> Result<Graph, GraphLoadError> {
    let mut g = Graph::default();
    let profile = osm::Profile::by_name(&args.network).unwrap_or(&osm::WALK_PROFILE);
    let options = osm::Options {
        profile,
        file_format: osm::FileFormat::Unknown,
        bbox: args.bbox,
    };
    match osm::add_features_from_file(&mut g, &options, &args.osm_file) {
        Ok(()) => {
            g.retain_largest_component();
            Ok(g)
        }
        Err(e) => Err(GraphLoadError(args.osm_file.clone(), e.into())),
    }
}

/// Loads destinations matching any of the tag filters from the OSM file.
fn load_points_of_interest(
    args: &GraphArgs,
    filters: &[osm::TagFilter],
) -> Result<Vec<Position>, GraphLoadError> {
    let options = osm::PoiOptions {
        filters,
        file_format: osm::FileFormat::Unknown,
        bbox: args.bbox,
    };
    let points = osm::points_of_interest_from_file(&options, &args.osm_file)
        .map_err(|e| GraphLoadError(args.osm_file.clone(), e.into()))?;
    if points.is_empty() {
        return Err(GraphLoadError(args.osm_file.clone(), nearest_poi::Error::NoDestinations));
    }
    Ok(points)
}

fn sample_positions(g: &Graph, n: usize, seed: u64) -> Result<Vec<Position>, nearest_poi::Error> {
    Ok(nearest_poi::sample_nodes(g, n, seed)?
        .iter()
        .map(|n| n.position())
        .collect())
}

fn network_crs(g: &Graph) -> Result<Crs, nearest_poi::Error> {
    Crs::utm_for_positions(g.iter().map(|n| n.position())).ok_or(nearest_poi::Error::EmptyGraph)
}

fn compare(args: CompareArgs) -> Result<(), Box<dyn Error>> {
    let g = load_graph(&args.graph)?;
    let seed = args.graph.seed;

    let bbox = args.graph.bbox.or_else(|| g.bounds()).unwrap_or(Bounds::DERBY);
    let sources = if args.random_in_bbox {
        nearest_poi::random_positions(bbox, args.sources, seed)
    } else {
        sample_positions(&g, args.sources, seed)?
    };
    let destinations = if !args.destination_tags.is_empty() {
        load_points_of_interest(&args.graph, &args.destination_tags)?
    } else if args.random_in_bbox {
        nearest_poi::random_positions(bbox, args.destinations, seed.wrapping_add(1))
    } else {
        sample_positions(&g, args.destinations, seed.wrapping_add(1))?
    };
    log::info!(
        "matching {} sources with {} destinations",
        sources.len(),
        destinations.len()
    );

    let network_crs = network_crs(&g)?;
    let straight_line_crs = args.crs.unwrap_or(network_crs);
    let assignments = nearest_poi::closest_straight_line(&sources, &destinations, straight_line_crs)?;
    let straight: Vec<f64> = assignments.iter().map(|a| a.distance).collect();

    let snapper = nearest_poi::Snapper::new(&g, network_crs)?;
    let routes = nearest_poi::closest_by_network(
        &g,
        &snapper,
        &sources,
        &destinations,
        nearest_poi::DEFAULT_STEP_LIMIT,
    )?;
    let network: Vec<f64> = routes.iter().flatten().map(|r| r.distance).collect();

    let report = json!({
        "straight_line_crs": straight_line_crs.to_string(),
        "network_crs": snapper.crs().to_string(),
        "sources": sources.len(),
        "destinations": destinations.len(),
        "unreachable_sources": routes.iter().filter(|r| r.is_none()).count(),
        "straight_lines": {
            "stats": nearest_poi::DistanceStats::from_distances(straight.iter().copied()),
            "histogram": nearest_poi::Histogram::new(straight.iter().copied(), args.bins),
        },
        "shortest_paths": {
            "stats": nearest_poi::DistanceStats::from_distances(network.iter().copied()),
            "histogram": nearest_poi::Histogram::new(network.iter().copied(), args.bins),
        },
        "comparison": nearest_poi::DistanceComparison::new(
            "Straight Lines",
            straight.iter().copied(),
            "Shortest Path",
            network.iter().copied(),
        ),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(dir) = args.geojson {
        use nearest_poi::geojson;

        fs::create_dir_all(&dir)?;
        write_json(&dir.join("sources.geojson"), &geojson::points_collection(&sources, "source"))?;
        write_json(
            &dir.join("destinations.geojson"),
            &geojson::points_collection(&destinations, "destination"),
        )?;
        write_json(
            &dir.join("straight_lines.geojson"),
            &geojson::connections_collection(&sources, &destinations, &assignments),
        )?;
        write_json(
            &dir.join("shortest_paths.geojson"),
            &geojson::network_routes_collection(&g, &sources, &destinations, &routes),
        )?;
        log::info!("GeoJSON files written to {}", dir.display());
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn explore(args: ExploreArgs) -> Result<(), Box<dyn Error>> {
    let g = load_graph(&args.graph)?;
    let seed = args.graph.seed;
    let snapper = nearest_poi::Snapper::new(&g, network_crs(&g)?)?;

    let destinations = if !args.destinations.is_empty() {
        args.destinations
    } else if !args.destination_tags.is_empty() {
        load_points_of_interest(&args.graph, &args.destination_tags)?
    } else {
        sample_positions(&g, 5, seed.wrapping_add(1))?
    };
    let destination_nodes = snapper.snap_all(&destinations)?;

    if args.precompute {
        let table = nearest_poi::DistanceTable::compute(
            &g,
            &destination_nodes,
            nearest_poi::DEFAULT_STEP_LIMIT,
        )?;
        run_explorer(&g, snapper, table, &args.clicks, seed)
    } else {
        let live =
            nearest_poi::LiveSearch::new(&g, destination_nodes, nearest_poi::DEFAULT_STEP_LIMIT);
        run_explorer(&g, snapper, live, &args.clicks, seed)
    }
}

fn run_explorer<P: RouteProvider>(
    g: &Graph,
    snapper: nearest_poi::Snapper,
    provider: P,
    clicks: &[Position],
    seed: u64,
) -> Result<(), Box<dyn Error>> {
    let clicks = snapper.projection().project_all(clicks)?;
    let mut explorer = nearest_poi::RouteExplorer::new(g, snapper, provider);

    if clicks.is_empty() {
        let selection = explorer.select_random(seed)?;
        println!("{}", serde_json::to_string(&nearest_poi::geojson::routes_collection(g, selection))?);
        return Ok(());
    }

    for [x, y] in clicks {
        if let Some(selection) = explorer.on_click(Some(x), Some(y))? {
            println!("{}", serde_json::to_string(&nearest_poi::geojson::routes_collection(g, selection))?);
        }
    }

    Ok(())
}
