// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolfetch::commands::list::ListCommand;
use toolfetch::commands::update::UpdateCommand;
use toolfetch::config::ToolfetchConfig;
use toolfetch::error::{Result, format_error_chain, get_exit_code};
use toolfetch::logging;

#[derive(Parser)]
#[command(name = "toolfetch")]
#[command(
    author,
    version,
    about = "Keeps external media tools installed and up to date",
    long_about = None
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./toolfetch.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per tool
    #[arg(long, value_name = "DIR", global = true)]
    install_root: Option<PathBuf>,

    /// Token for the GitHub API, raises the rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    github_token: Option<String>,

    /// Disable progress indicators
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install missing tools and update outdated ones
    #[command(visible_alias = "u")]
    Update {
        /// Number of tools processed in parallel
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        /// Only check the named tools (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,

        /// Reinstall even when the installed version is current
        #[arg(short, long)]
        force: bool,
    },

    /// Show each tool's installed version and executable
    #[command(visible_alias = "ls")]
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<ToolfetchConfig> {
    let mut config = ToolfetchConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.install_root {
        config.install_root = root.clone();
    }
    if let Some(token) = &cli.github_token {
        config.github.token = Some(token.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let result: Result<()> = (|| {
        let config = load_config(&cli)?;
        match &cli.command {
            Commands::Update { jobs, only, force } => {
                let command = UpdateCommand::new(&config, cli.no_progress)?;
                command.execute(*jobs, only, *force)
            }
            Commands::List { json } => {
                let command = ListCommand::new(&config)?;
                command.execute(*json)
            }
        }
    })();

    if let Err(e) = result {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }
}
