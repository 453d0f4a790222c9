//! Terminal front end: list the games, autoplay one, or play one by hand.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_games::menu::{find_entry, launch, CATALOG};
use party_games::{AppConfig, Autoplay, AutoplayConfig, DeviceType, GameKind, PlayerCount, SessionConfig};

const USAGE: &str = "\
usage: party-games <command> [options]

commands:
  list                     show the game catalog
  play <game>              let random players run a whole session
  interactive <game>       pick moves yourself; 't' lets time pass, 'q' quits

options:
  --players N              2 to 4
  --device computer|phone
  --seed S

<game> is a menu id (1, 5, 10, ...) or a name such as word_chain.";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Play(GameKind),
    Interactive(GameKind),
}

#[derive(Debug)]
struct Options {
    command: Command,
    players: Option<usize>,
    device: Option<DeviceType>,
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    let config = AppConfig::load();

    match options.command {
        Command::List => list(options.players.unwrap_or(config.default_players.get())),
        Command::Play(kind) => {
            let session = session_for(&options, &config)?;
            play(kind, &session, &config);
            Ok(())
        }
        Command::Interactive(kind) => {
            let session = session_for(&options, &config)?;
            interactive(kind, &session, &config)
        }
    }
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn parse_game(value: &str) -> anyhow::Result<GameKind> {
    if let Ok(id) = value.parse::<u32>() {
        return find_entry(id)
            .map(|entry| entry.kind)
            .with_context(|| format!("no game with menu id {id}"));
    }
    Ok(value.parse::<GameKind>()?)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Options> {
    let mut args = args.into_iter();
    let command = args.next().context("missing command")?;
    let mut game = None;
    let mut players = None;
    let mut device = None;
    let mut seed = None;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--players" => {
                let n = value("--players")?.parse().context("--players must be a number")?;
                players = Some(PlayerCount::new(n)?.get());
            }
            "--device" => device = Some(value("--device")?.parse()?),
            "--seed" => seed = Some(value("--seed")?.parse().context("--seed must be a number")?),
            other if other.starts_with("--") => bail!("unknown option {other}"),
            other if game.is_none() => game = Some(parse_game(other)?),
            other => bail!("unexpected argument {other}"),
        }
    }

    let command = match command.as_str() {
        "list" => Command::List,
        "play" => Command::Play(game.context("play needs a game")?),
        "interactive" => Command::Interactive(game.context("interactive needs a game")?),
        other => bail!("unknown command {other}"),
    };
    Ok(Options {
        command,
        players,
        device,
        seed,
    })
}

fn session_for(options: &Options, config: &AppConfig) -> anyhow::Result<SessionConfig> {
    let mut session = config.session();
    if let Some(players) = options.players {
        session.players = PlayerCount::new(players)?;
    }
    if let Some(device) = options.device {
        session.device = device;
    }
    if let Some(seed) = options.seed {
        session.seed = seed;
    }
    Ok(session)
}

fn list(players: usize) -> anyhow::Result<()> {
    println!("Games for {players} players:");
    for entry in CATALOG.iter().filter(|entry| entry.supports(players)) {
        println!("{:>4}  {:<16} {}", entry.id, entry.title(), entry.description);
    }
    Ok(())
}

fn play(kind: GameKind, session: &SessionConfig, config: &AppConfig) {
    info!(game = kind.name(), players = %session.players, device = %session.device, seed = session.seed, "autoplaying");
    let mut game = launch(kind, session);
    let mut autoplay = Autoplay::new(AutoplayConfig::from_app(config), session.seed);
    let report = autoplay.run(game.as_mut());
    print!("{report}");
}

fn interactive(kind: GameKind, session: &SessionConfig, config: &AppConfig) -> anyhow::Result<()> {
    let tick = Duration::from_millis(config.tick_ms.max(1));
    let mut game = launch(kind, session);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        println!("\n{}", game.status());
        for (player, score) in game.scoreboard().iter() {
            println!("  {player}: {score}");
        }
        let moves = game.moves();
        for (index, label) in moves.iter().enumerate() {
            println!("  [{index}] {label}");
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        match line.trim() {
            "q" => return Ok(()),
            "t" | "" => game.tick(tick),
            input => {
                let played = match input.parse::<usize>() {
                    Ok(index) => game.play_move(index).map(drop),
                    Err(_) => game.play_named(input),
                };
                if let Err(err) = played {
                    println!("{err}");
                }
            }
        }
    }

    if let Some(result) = game.outcome() {
        println!("\n{result}");
    }
    for entry in game.log() {
        println!("{entry}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_play() {
        let options = parse_args(args("play word_chain --players 3 --seed 8 --device phone")).unwrap();
        assert_eq!(options.command, Command::Play(GameKind::WordChain));
        assert_eq!(options.players, Some(3));
        assert_eq!(options.seed, Some(8));
        assert_eq!(options.device, Some(DeviceType::Phone));
    }

    #[test]
    fn test_parse_menu_id() {
        let options = parse_args(args("interactive 70")).unwrap();
        assert_eq!(options.command, Command::Interactive(GameKind::ReactionBattle));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args("")).is_err());
        assert!(parse_args(args("play")).is_err());
        assert!(parse_args(args("play chess")).is_err());
        assert!(parse_args(args("play 3")).is_err());
        assert!(parse_args(args("list --players 5")).is_err());
        assert!(parse_args(args("list --seed")).is_err());
    }
}
