//! Command-line flags.

use clap::Parser;

/// TradeHub marketplace server.
///
/// Everything except the flags below is configured through environment
/// variables (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "tradehub", version, about)]
pub struct Cli {
    /// Populate demo users, items, a trade and an offer when the user
    /// table is empty, then serve as usual.
    #[arg(long)]
    pub seed: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn seed_flag_parses() {
        Cli::command().debug_assert();
        assert!(Cli::parse_from(["tradehub", "--seed"]).seed);
        assert!(!Cli::parse_from(["tradehub"]).seed);
    }
}
