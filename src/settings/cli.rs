use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "tollgate", about = "Token issuance and revocation service")]
pub struct Cli {
    /// Path to a TOML settings file. Defaults to settings/dev.toml in debug builds.
    #[arg(long)]
    pub settings: Option<String>,
}
