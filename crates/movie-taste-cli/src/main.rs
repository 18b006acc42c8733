//! `movie-taste` — drive the movie-taste network from the command line.
//!
//! ```text
//! USAGE:
//!   movie-taste catalog                         List viewer profiles and movies
//!   movie-taste predict [--profile P] [...]     One forward pass
//!   movie-taste train --profile P [...]         Animate a transition toward P
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use movie_taste_core::display::{appreciation_percent, slider_value, ConnectionStyle, NeuronColor};
use movie_taste_core::{
    find_movie, Activations, Session, TickerExit, TransitionTicker, VizConfig, MOVIES,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "movie-taste",
    about = "Toy neural network predicting movie appreciation",
    version
)]
struct Cli {
    /// JSON config file; missing fields take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the synthetic training error.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the viewer profiles and example movies.
    Catalog,
    /// Run one forward pass and show the network.
    Predict {
        /// Viewer profile whose weights to load.
        #[arg(long)]
        profile: Option<String>,
        /// Example movie whose scores to use as inputs.
        #[arg(long, conflicts_with_all = ["action", "romance"])]
        movie: Option<String>,
        /// Action score in [0, 1].
        #[arg(long)]
        action: Option<f64>,
        /// Romance score in [0, 1].
        #[arg(long)]
        romance: Option<f64>,
        /// Print the session snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Animate the weights from their initial values toward a profile.
    Train {
        #[arg(long)]
        profile: String,
        #[arg(long)]
        movie: Option<String>,
        /// Override the delay between ticks.
        #[arg(long)]
        period_ms: Option<u64>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        Cmd::Catalog => cmd_catalog(&config),
        Cmd::Predict {
            profile,
            movie,
            action,
            romance,
            json,
        } => cmd_predict(config, profile, movie, action, romance, json),
        Cmd::Train {
            profile,
            movie,
            period_ms,
            json,
        } => {
            if let Some(ms) = period_ms {
                config.tick_period_ms = ms;
            }
            cmd_train(config, &profile, movie, json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<VizConfig> {
    let Some(path) = path else {
        return Ok(VizConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = VizConfig::from_json_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

fn cmd_catalog(config: &VizConfig) -> Result<()> {
    println!("Viewer profiles ({:?}):", config.profile_set);
    for p in config.profile_set.profiles() {
        println!("  {} {:<18} {}", p.icon, p.name, p.description);
        println!(
            "       hidden weights {:?}  output weights {:?}",
            p.weights1, p.weights2
        );
    }
    println!();
    println!("Movies:");
    for m in &MOVIES {
        println!(
            "  {} {:<18} action {:.2}  romance {:.2}  ({})",
            m.icon, m.name, m.action, m.romance, m.description
        );
    }
    Ok(())
}

fn cmd_predict(
    config: VizConfig,
    profile: Option<String>,
    movie: Option<String>,
    action: Option<f64>,
    romance: Option<f64>,
    json: bool,
) -> Result<()> {
    let profile_set = config.profile_set;
    let mut session = Session::try_new(config)?;

    if let Some(name) = profile {
        session.select_profile(profile_set.find_profile(&name)?);
    }
    if let Some(name) = movie {
        session.select_movie(find_movie(&name)?);
    }
    if let Some(a) = action {
        session.set_action(slider_value(a));
    }
    if let Some(r) = romance {
        session.set_romance(slider_value(r));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        print_network(&session);
    }
    Ok(())
}

fn cmd_train(config: VizConfig, profile: &str, movie: Option<String>, json: bool) -> Result<()> {
    let target = config.profile_set.find_profile(profile)?;
    let mut session = Session::try_new(config)?;
    if let Some(name) = movie {
        session.select_movie(find_movie(&name)?);
    }
    // Mark the profile current without jumping to its weights, so the
    // transition has a gap to close.
    let start = *session.weights();
    session.select_profile(target);
    session.set_weights(start);

    let session = Arc::new(Mutex::new(session));
    let ticker = TransitionTicker::spawn_with(&session, move |report| {
        if !json {
            println!(
                "tick {:>2}  error {:.4}  output {:.4}  ({} left)",
                report.iteration, report.error, report.activations.output, report.remaining
            );
        }
    })?;
    let exit = ticker.wait();
    if exit != TickerExit::Completed {
        anyhow::bail!("transition did not complete: {exit:?}");
    }

    let session = session.lock().unwrap_or_else(PoisonError::into_inner);
    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        println!();
        print_network(&session);
    }
    Ok(())
}

fn print_network(session: &Session) {
    let inputs = session.inputs();
    let net = session.weights();
    let Activations { hidden, output } = session.activations();

    println!(
        "Profile: {}",
        session.current_profile().map_or("(none)", |p| p.name)
    );
    println!(
        "Inputs:  action {:.2} [{}]  romance {:.2} [{}]",
        inputs[0],
        NeuronColor::for_activation(inputs[0]).to_css(),
        inputs[1],
        NeuronColor::for_activation(inputs[1]).to_css(),
    );
    for (i, row) in net.w_ih.iter().enumerate() {
        for (j, &w) in row.iter().enumerate() {
            let style = ConnectionStyle::for_weight(w);
            println!(
                "  input {j} -> hidden {i}: {w:+.3}  ({} , width {:.2})",
                style.css_color(),
                style.width
            );
        }
    }
    for (i, h) in hidden.iter().enumerate() {
        println!("Hidden {i}: {h:.2} [{}]", NeuronColor::for_activation(*h).to_css());
    }
    for (i, &w) in net.w_ho.iter().enumerate() {
        let style = ConnectionStyle::for_weight(w);
        println!(
            "  hidden {i} -> output: {w:+.3}  ({} , width {:.2})",
            style.css_color(),
            style.width
        );
    }
    println!(
        "Output:  {output:.2} [{}]",
        NeuronColor::for_activation(output).to_css()
    );
    println!("Appreciation score: {}", appreciation_percent(output));
    println!("Recommendation: {}", session.recommendation());
}
