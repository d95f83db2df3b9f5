use clap::Parser;
use minihub::{
    config::HubConfig,
    mini_app::ViewAction,
    router::{CellType, MainViewModel},
    HubError, HubResult, MiniHub,
};
use std::{path::PathBuf, str::FromStr};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "minihub.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Toggle,
    Open(usize),
    Back,
    Say(String),
    Act(usize, ViewAction),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = HubError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let row = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| HubError::invalid_input("command", line))
        };
        match head {
            "list" | "ls" => Ok(Command::List),
            "toggle" => Ok(Command::Toggle),
            "open" => Ok(Command::Open(row(rest)?)),
            "back" => Ok(Command::Back),
            "say" if !rest.is_empty() => Ok(Command::Say(rest.to_string())),
            "act" => {
                let (index, action) = rest
                    .split_once(' ')
                    .ok_or_else(|| HubError::invalid_input("command", line))?;
                Ok(Command::Act(row(index)?, action.parse()?))
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(HubError::invalid_input("command", line)),
        }
    }
}

const HELP: &str = "\
commands:
  list                 show the mini-app list
  toggle               switch between compact and interactive rows
  open <row>           open a mini-app full screen
  back                 close the open mini-app
  say <text>           send text to the open mini-app
  act <row> <action>   send erase | refresh | select <n> to a row's widget
  quit";

async fn print_list(root: &MainViewModel) {
    println!("== {} ({}) ==", root.title(), root.density_mode());
    for index in 0..root.number_of_rows() {
        let Some(row) = root.row(index).await else {
            continue;
        };
        match (row.cell_type, row.interactive_view) {
            (CellType::Interactive, Some(view)) => {
                print!("{:>2}. {}", index, view.frame());
            }
            _ => println!(
                "{:>2}. {} - {}",
                index, row.model.app_name, row.model.app_description
            ),
        }
    }
}

async fn execute(hub: &MiniHub, command: Command) -> HubResult<bool> {
    let root = hub.root().await?;
    match command {
        Command::List => print_list(&root).await,
        Command::Toggle => {
            root.toggle_density_mode();
            print_list(&root).await;
        }
        Command::Open(row) => {
            if hub.open(row).await? {
                let frame = hub
                    .navigation()
                    .with_top(|entry| entry.screen.frame())
                    .await?;
                if let Some(frame) = frame {
                    print!("{}", frame);
                }
            } else {
                println!("No mini-app at row {}", row);
            }
        }
        Command::Back => match hub.back().await {
            Some(title) => {
                println!("Closed {}", title);
                print_list(&root).await;
            }
            None => println!("Already at the list"),
        },
        Command::Say(text) => print!("{}", hub.say(&text).await?),
        Command::Act(row, action) => print!("{}", hub.act(row, &action).await?),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

async fn run(cli: &Cli) -> HubResult<()> {
    let config = if cli.config.exists() {
        HubConfig::from_file(&cli.config)?
    } else {
        // Default config
        HubConfig::default()
    };

    info!("config loaded.");

    debug!("config: {:?}", config);

    let hub = MiniHub::new(config).await?;
    let root = hub.start().await;
    print_list(&root).await;
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let keep_going = match line.parse::<Command>() {
            Ok(command) => execute(&hub, command).await.unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                true
            }),
            Err(e) => {
                eprintln!("{} (type 'help')", e);
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    hub.shutdown().await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
