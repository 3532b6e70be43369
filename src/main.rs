use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::io::BufReader;
use tokio::time::{interval, Duration, MissedTickBehavior};

use posterboard::app::{App, Reply};
use posterboard::command::{parse_command, read_command_line};
use posterboard::config::Config;
use posterboard::ingest::{load_posters, source_for};
use posterboard::logging::{log, obj, v_str, Domain, Level};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let once = std::env::args().skip(1).any(|a| a == "--once");

    let csv = source_for(&cfg.csv_location);
    let json_src = source_for(&cfg.json_location);
    let (posters, report) = match load_posters(csv.as_ref(), json_src.as_ref()).await {
        Ok(loaded) => loaded,
        Err(err) => {
            log(
                Level::Error,
                Domain::System,
                "load_failed",
                obj(&[("msg", v_str(&format!("{:#}", err)))]),
            );
            eprintln!("failed to load poster data: {:#}", err);
            eprintln!("set POSTER_CSV / POSTER_JSON to readable files or http(s) URLs");
            std::process::exit(1);
        }
    };

    let mut app = App::from_config(&cfg, posters)?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("source", v_str(&report.source)),
            ("posters", json!(report.posters)),
            ("session", v_str(&app.session().label())),
            ("tick_secs", json!(cfg.tick_secs)),
        ]),
    );

    print!("{}", app.render());
    if once {
        return Ok(());
    }
    println!("(type help for commands)");

    let mut rng = StdRng::from_entropy();
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut pending = Vec::new();
    let mut ticker = interval(Duration::from_secs(cfg.tick_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!("{}", app.on_tick());
            }
            line = read_command_line(&mut stdin, &mut pending) => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        eprintln!("error: reading input: {:#}", err);
                        break;
                    }
                };
                match parse_command(&line).and_then(|cmd| app.handle(cmd, &mut rng)) {
                    Ok(Reply::Redraw) => print!("{}", app.render()),
                    Ok(Reply::Print(text)) => println!("{}", text),
                    Ok(Reply::Quit) => break,
                    Err(err) => eprintln!("error: {:#}", err),
                }
            }
        }
    }

    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
