use std::path::PathBuf;

use clap::Args;

/// Where the HTTP server finds its files and which port it binds.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Directory of static assets served at `/`
    #[arg(long, env = "RIDE_FLOW_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Flow CSV served at `/data`
    #[arg(
        long,
        env = "RIDE_FLOW_CSV_PATH",
        default_value = "data/pickup_dropoff_flows.csv"
    )]
    pub csv_path: PathBuf,

    /// Port to listen on
    #[arg(short, long, env = "RIDE_FLOW_PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            csv_path: PathBuf::from("data/pickup_dropoff_flows.csv"),
            port: 3000,
        }
    }
}
