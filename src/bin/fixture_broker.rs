// Copyright 2025 jonefeewang@gmail.com
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

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fixture_broker::{setup_local_tracing, AppResult, FixtureBroker, FixtureConfig, Scenario};
use tokio::runtime;

#[derive(Parser)]
#[command(version, about)]
pub struct CommandLine {
    /// path to config file
    #[arg(short, long)]
    pub conf: Option<PathBuf>,
    /// port to listen on, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,
    /// response scenario to serve, overrides the config file
    #[arg(short, long, value_enum)]
    pub scenario: Option<Scenario>,
    #[command(subcommand)]
    pub command: Option<Command>,
    /// log level (v: info, vv: debug, vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// print the effective configuration and exit
    PrintConfig,
}

fn main() -> AppResult<()> {
    let commandline = CommandLine::parse();

    //setup config
    let mut fixture_config = FixtureConfig::set_up_config(commandline.conf.as_deref())?;
    if let Some(port) = commandline.port {
        fixture_config.network.port = port;
    }
    if let Some(scenario) = commandline.scenario {
        fixture_config.fixture.scenario = scenario;
    }

    if let Some(Command::PrintConfig) = commandline.command {
        print!("{}", fixture_config.to_toml()?);
        return Ok(());
    }

    let _worker_guard = setup_local_tracing(commandline.verbose, fixture_config.log.dir.as_deref())?;

    // startup tokio runtime
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

    let broker = FixtureBroker::new(fixture_config);
    broker.start(&rt)?;

    Ok(())
}
