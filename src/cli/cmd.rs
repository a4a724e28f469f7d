use {
    crate::cli::{
        configuration::{self, Configuration},
        logger,
    },
    clap::ArgMatches,
    colored::{ColoredString, Colorize},
    kart::{
        source::{ConsoleSource, FileSource, LineSource},
        QueryMetrics, QueryRunner,
    },
    std::{io, path::Path},
    stopwatch::Stopwatch,
};

static DEFAULT_GRAMMAR_PATH: &str = "grammar.txt";

pub fn check(matches: &ArgMatches) {
    let mut sw = Stopwatch::new();
    sw.start();

    let config = match matches.value_of("config") {
        None => Configuration::default(),
        Some(config_path) => match configuration::read_configuration(Path::new(config_path)) {
            Ok(config) => config,
            Err(err) => logger::fatal(&format!(
                "Error loading configuration {}: {}",
                config_path, err
            )),
        },
    };

    let log_file = setting(matches, "logfile", &config.log_file);
    let log_level = setting(matches, "loglevel", &config.log_level);
    logger::init(log_file.as_deref(), log_level.as_deref());

    let grammar_path = setting(matches, "grammar", &config.grammar)
        .unwrap_or_else(|| DEFAULT_GRAMMAR_PATH.to_string());

    let runner = match QueryRunner::build(&mut FileSource::new(Path::new(&grammar_path))) {
        Ok(runner) => runner,
        Err(err) => logger::fatal(&format!(
            "Error loading grammar {}: {}",
            &grammar_path, err
        )),
    };

    info!("Loaded grammar {}", &grammar_path);

    let mut queries: Box<dyn LineSource> = match setting(matches, "queries", &config.queries) {
        None => Box::new(ConsoleSource),
        Some(queries_path) => {
            info!("Reading queries from {}", &queries_path);
            Box::new(FileSource::new(Path::new(&queries_path)))
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let metrics = match runner.run(&mut *queries, &mut out) {
        Ok(metrics) => metrics,
        Err(err) => logger::fatal(&format!("Error answering queries: {}", err)),
    };

    sw.stop();
    print_final_status(sw.elapsed_ms(), &metrics, matches.is_present("verbose"));
}

/// Command line values take precedence over configuration values.
fn setting(matches: &ArgMatches, name: &str, configured: &Option<String>) -> Option<String> {
    match matches.value_of(name) {
        Some(value) => Some(value.to_string()),
        None => configured.clone(),
    }
}

fn print_final_status(elapsed_ms: i64, metrics: &QueryMetrics, verbose: bool) {
    let mut accepted_msg: ColoredString = format!("{} accepted", metrics.accepted).normal();
    if metrics.accepted > 0 {
        accepted_msg = accepted_msg.bright_green()
    }

    let mut rejected_msg = format!("{} rejected", metrics.rejected).normal();
    if metrics.rejected > 0 {
        rejected_msg = rejected_msg.yellow()
    }

    let mut malformed_msg = format!("{} malformed", metrics.malformed).normal();
    if metrics.malformed > 0 {
        malformed_msg = malformed_msg.bright_red()
    }

    let status = format!(
        "COMPLETE: {}ms : {} queries, {}, {}, {}",
        elapsed_ms, metrics.total, accepted_msg, rejected_msg, malformed_msg
    );

    if verbose {
        logger::info(&status);
    } else {
        info!("{}", status);
    }
}
