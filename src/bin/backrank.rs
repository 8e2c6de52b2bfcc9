use std::process;

use backrank::pagerank::{read_edges, PageRank};
use backrank::{Configuration, Context, Result};
use clap::{value_t, App, Arg, ArgMatches};

const EDGE_FILE: &str = "EDGE_FILE";
const ITERATIONS: &str = "iterations";
const PARTITIONS: &str = "partitions";
const TOP: &str = "top";
const TOLERANCE: &str = "tolerance";

fn argv<'a>() -> ArgMatches<'a> {
    App::new("backrank")
        .about("Ranks the nodes of a directed graph with back-edge PageRank")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name(EDGE_FILE)
                .required(true)
                .help("Edge list, one `source target` pair per line"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long("iterations")
                .short("n")
                .takes_value(true)
                .help("Number of rounds, defaults to BACKRANK_ITERATIONS"),
        )
        .arg(
            Arg::with_name(PARTITIONS)
                .long("partitions")
                .short("p")
                .takes_value(true)
                .help("Number of partitions, defaults to BACKRANK_DEFAULT_PARTITIONS"),
        )
        .arg(
            Arg::with_name(TOP)
                .long("top")
                .short("k")
                .takes_value(true)
                .help("Only print the heaviest K nodes"),
        )
        .arg(
            Arg::with_name(TOLERANCE)
                .long("tolerance")
                .takes_value(true)
                .help("Stop early once no weight moves by this much in a round"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = Configuration::get()?;
    let context = Context::with_config(config)?;

    let iterations = if matches.is_present(ITERATIONS) {
        value_t!(matches, ITERATIONS, usize).unwrap_or_else(|e| e.exit())
    } else {
        config.iterations
    };
    let partitions = if matches.is_present(PARTITIONS) {
        value_t!(matches, PARTITIONS, usize).unwrap_or_else(|e| e.exit())
    } else {
        context.default_parallelism()
    };

    let edges = read_edges(matches.value_of(EDGE_FILE).unwrap_or_default())?;
    let mut engine = PageRank::with_partitions(&context, edges, partitions)?;
    if matches.is_present(TOLERANCE) {
        let tolerance = value_t!(matches, TOLERANCE, f64).unwrap_or_else(|e| e.exit());
        engine.run_until(iterations, tolerance)?;
    } else {
        engine.run(iterations)?;
    }

    let ranking = if matches.is_present(TOP) {
        engine.top(value_t!(matches, TOP, usize).unwrap_or_else(|e| e.exit()))?
    } else {
        engine.ranking()?
    };
    for (id, weight) in ranking {
        println!("{} {}", id, weight);
    }
    log::info!(
        "ranked {} node(s) in {} round(s)",
        engine.num_nodes(),
        engine.rounds()
    );
    Ok(())
}

fn main() {
    let matches = argv();
    if let Err(err) = run(&matches) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
