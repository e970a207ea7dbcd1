use clap::{Parser, Subcommand};
use event_locator::config::GeoConfig;
use event_locator::location::{
    haversine_km, supported_city_names, CityResolver, Coordinate, FixedPositionSource,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Event Locator: turn coordinates and addresses into supported city names.
///
/// Examples:
///   locator city --at 59.3725,18.0002
///   locator city --at 57.78,11.99 --allowed Stockholm,Göteborg,Malmö
///   locator geocode "Götaplatsen, Göteborg"
///   locator reverse --at 55.605,13.0038
///   locator distance 59.33,18.07 57.71,11.97
///   locator whereami
///   locator serve --port 8080
#[derive(Parser)]
#[command(name = "locator", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    geo: GeoConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Address → coordinate.
    Geocode {
        address: String,
    },
    /// Coordinate → formatted address.
    Reverse {
        /// "lat,lng"
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        at: Coordinate,
    },
    /// Coordinate (or current position) → supported city.
    City {
        /// "lat,lng"; the current position is used when omitted.
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        at: Option<Coordinate>,

        /// Comma-separated allow-list. Defaults to every supported city.
        #[arg(long, value_delimiter = ',')]
        allowed: Vec<String>,
    },
    /// Great-circle distance between two "lat,lng" points.
    Distance {
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,
    },
    /// Current position of this machine.
    Whereami,
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected 'lat,lng', got '{}'", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("Bad latitude '{}': {}", lat, e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("Bad longitude '{}': {}", lng, e))?;
    let coord = Coordinate::new(lat, lng);
    if !coord.is_valid() {
        return Err("Invalid coordinates. Lat: -90..90, Lng: -180..180".into());
    }
    Ok(coord)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let client = cli.geo.build_client().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    });

    match cli.command {
        Command::Geocode { address } => match client.geocode_address(&address).await {
            Some(coord) => println!("{}\t{}", coord.latitude, coord.longitude),
            None => exit_not_found(&format!("No coordinate for '{}'", address)),
        },

        Command::Reverse { at } => match client.reverse_geocode(at).await {
            Some(address) => println!("{}", address),
            None => exit_not_found(&format!("No address at {}", at)),
        },

        Command::City { at, allowed } => {
            let client = match at {
                Some(coord) => client.with_position_source(Arc::new(FixedPositionSource::new(coord))),
                None => client,
            };
            let position = client.get_current_position().await.unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let allowed = if allowed.is_empty() { supported_city_names() } else { allowed };
            let resolver = CityResolver::new(client);
            match resolver.reverse_geocode_city_match(position.coordinate, &allowed).await {
                Some(m) => {
                    eprintln!("  \u{1F4CD} {} (via {} '{}')", position.coordinate, m.rule, m.candidate);
                    println!("{}", m.city);
                }
                None => exit_not_found(&format!("No supported city at {}", position.coordinate)),
            }
        }

        Command::Distance { from, to } => {
            println!("{:.1}", haversine_km(from, to));
        }

        Command::Whereami => match client.get_current_position().await {
            Ok(position) => {
                let json = serde_json::to_string_pretty(&position).unwrap_or_else(|e| e.to_string());
                println!("{}", json);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Command::Serve { host, port } => {
            let resolver = CityResolver::new(client);
            if let Err(e) = event_locator::server::start(&host, port, resolver).await {
                eprintln!("Error: Cannot serve on {}:{}: {}", host, port, e);
                std::process::exit(1);
            }
        }
    }
}

fn exit_not_found(msg: &str) -> ! {
    eprintln!("{}", msg);
    std::process::exit(3);
}
