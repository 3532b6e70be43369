//! Line commands standing in for the dashboard's controls.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line: redraw.
    Refresh,
    Search(String),
    ClearSearch,
    ToggleCategory(String),
    /// `None` clears the bound.
    From(Option<String>),
    To(Option<String>),
    /// `None` toggles.
    ActiveOnly(Option<bool>),
    Timeline(Option<bool>),
    SetClock(String),
    ClearClock,
    Apply(PathBuf),
    Json,
    Export(PathBuf),
    Demo,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <text>        filter by title / presenter / board
  clear                clear the search
  cat <name>           toggle a category
  from [HH:MM]         lower time bound (no argument clears)
  to [HH:MM]           upper time bound (no argument clears)
  active [on|off]      only posters presenting now
  timeline [on|off]    show per-poster timelines
  clock [HH:MM|off]    fix the clock, or return to real time
  apply <file>         replace data with a JSON array from a file
  json                 print the current data as JSON
  export <file>        write the current data as JSON
  demo                 fill in random demo times
  reset                clear all filters
  help                 this text
  quit                 exit";

fn switch(arg: &str) -> Result<Option<bool>> {
    match arg.to_lowercase().as_str() {
        "" => Ok(None),
        "on" | "true" | "yes" | "1" => Ok(Some(true)),
        "off" | "false" | "no" | "0" => Ok(Some(false)),
        other => bail!("expected on or off, got {:?}", other),
    }
}

fn non_empty(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}

fn required<'a>(name: &str, arg: &'a str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!("{} needs an argument", name);
    }
    Ok(arg)
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((w, rest)) => (w, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_lowercase().as_str() {
        "" => Command::Refresh,
        "search" | "q" => Command::Search(arg.to_string()),
        "clear" => Command::ClearSearch,
        "cat" => Command::ToggleCategory(required(word, arg)?.to_string()),
        "from" => Command::From(non_empty(arg)),
        "to" => Command::To(non_empty(arg)),
        "active" => Command::ActiveOnly(switch(arg)?),
        "timeline" => Command::Timeline(switch(arg)?),
        "clock" => match arg.to_lowercase().as_str() {
            "" | "off" | "real" => Command::ClearClock,
            _ => Command::SetClock(arg.to_string()),
        },
        "apply" => Command::Apply(PathBuf::from(required(word, arg)?)),
        "json" => Command::Json,
        "export" => Command::Export(PathBuf::from(required(word, arg)?)),
        "demo" => Command::Demo,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {:?} (try help)", other),
    };
    Ok(cmd)
}

/// Next input line with the line ending stripped; `None` at end of input.
///
/// Bytes that are not UTF-8 are replaced, so a garbled line becomes an
/// unknown command instead of ending the session. `buf` holds a partly read
/// line across calls, which keeps this usable inside `select!`.
pub async fn read_command_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let n = reader.read_until(b'\n', buf).await?;
    if n == 0 && buf.is_empty() {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string();
    buf.clear();
    Ok(Some(line))
}
