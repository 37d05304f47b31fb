// Command line module
// Parses the arguments of the dinners-web binary

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Parser)]
#[command(name = "dinners-web", version)]
#[command(about = "Serves the dinners page and its data file", long_about = None)]
pub struct Cli {
    /// Config file path, without the `.toml` extension
    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub config: String,
}
