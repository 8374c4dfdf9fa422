//! BESS quote entry point: CLI wiring and config-driven quote generation.

use std::process;

use tracing_subscriber::EnvFilter;

use bess_quote::config::QuoteConfig;
use bess_quote::io::export::{export_cash_flows, export_line_items};
use bess_quote::profiles::Vertical;
use bess_quote::quote::generate_quote;

mod cli;

fn list_verticals() {
    for v in Vertical::ALL {
        let p = v.profile();
        println!(
            "{:<16} {:<28} {:>8} kW per {}",
            v.key(),
            p.name,
            p.power_density_kw,
            p.unit_field
        );
    }
}

#[cfg(feature = "api")]
fn serve(port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(bess_quote::api::AppState {
        pricing: bess_quote::cost::PriceTable::new(),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(bess_quote::api::serve(state, addr)) {
        eprintln!("error: server failed: {e}");
        process::exit(1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bess_quote=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        cli::print_usage();
        return;
    }

    if cli.list_verticals {
        list_verticals();
        return;
    }

    #[cfg(feature = "api")]
    if cli.serve {
        serve(cli.port);
        return;
    }

    // --scenario takes priority, then --preset, then the default preset
    let mut config = if let Some(ref path) = cli.scenario {
        QuoteConfig::from_toml_file(path)
    } else {
        QuoteConfig::from_preset(cli.preset.as_deref().unwrap_or("hotel_midscale"))
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(objective) = cli.objective {
        config.sizing.objective = objective;
    }
    if let Some(hours) = cli.duration_hours {
        config.sizing.duration_hours = Some(hours);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let quote = match generate_quote(&config.into_request()) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{quote}");

    if let Some(ref path) = cli.cashflow_out {
        if let Err(e) = export_cash_flows(&quote.financials.cash_flows, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Cash flows written to {}", path.display());
    }
    if let Some(ref path) = cli.line_items_out {
        if let Err(e) = export_line_items(&quote.costs.line_items, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Line items written to {}", path.display());
    }
}
