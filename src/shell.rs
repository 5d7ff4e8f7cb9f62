use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands;
use crate::state::AppState;

const HELP: &str = "\
Commands:
  show                 redraw the current lesson
  next | prev          move to the next / previous lesson
  go <id>              jump to a lesson by number
  tab <name|1-5>       vocabulary, phrases, grammar, dialogue, exercises
  play <n>             speak item n of the current tab
  say <text>           speak any text
  stop                 drop audio that is still queued
  answer <n> <text>    answer exercise n
  check | reset        check all answers / clear them
  lessons | status | settings | version
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    Next,
    Previous,
    GoTo(u32),
    Tab(String),
    Play(usize),
    Say(String),
    Stop,
    Answer(usize, String),
    Check,
    Reset,
    Lessons,
    Status,
    Settings,
    Version,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_lowercase().as_str() {
        "show" | "s" => ShellCommand::Show,
        "next" | "n" => ShellCommand::Next,
        "prev" | "previous" | "p" => ShellCommand::Previous,
        "go" | "lesson" => ShellCommand::GoTo(parse_number(rest, "go <lesson id>")?),
        "tab" | "t" => {
            if rest.is_empty() {
                return Err("usage: tab <name|1-5>".into());
            }
            ShellCommand::Tab(rest.to_string())
        }
        "play" => ShellCommand::Play(if rest.is_empty() { 1 } else { parse_number(rest, "play <n>")? }),
        "say" => {
            if rest.is_empty() {
                return Err("usage: say <text>".into());
            }
            ShellCommand::Say(rest.to_string())
        }
        "stop" => ShellCommand::Stop,
        "answer" | "a" => {
            let (number, text) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: answer <n> <text>")?;
            ShellCommand::Answer(parse_number(number, "answer <n> <text>")?, text.trim().to_string())
        }
        "check" => ShellCommand::Check,
        "reset" => ShellCommand::Reset,
        "lessons" | "list" => ShellCommand::Lessons,
        "status" => ShellCommand::Status,
        "settings" => ShellCommand::Settings,
        "version" => ShellCommand::Version,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}', type help", other)),
    };
    Ok(Some(cmd))
}

fn parse_number<T: std::str::FromStr>(s: &str, usage: &str) -> Result<T, String> {
    s.trim().parse().map_err(|_| format!("usage: {}", usage))
}

/// Runs one command. Returns `false` when the shell should exit.
pub fn dispatch(state: &Arc<AppState>, cmd: ShellCommand) -> bool {
    let output = match cmd {
        ShellCommand::Show => Ok(commands::lessons::show(state)),
        ShellCommand::Next => commands::lessons::next_lesson(state),
        ShellCommand::Previous => commands::lessons::previous_lesson(state),
        ShellCommand::GoTo(id) => commands::lessons::go_to_lesson(state, id),
        ShellCommand::Tab(name) => commands::lessons::select_tab(state, &name),
        ShellCommand::Play(n) => commands::tts::play_item(state, n).map(|_| "Speaking...".to_string()),
        ShellCommand::Say(text) => commands::tts::speak_text(state, text).map(|_| "Speaking...".to_string()),
        ShellCommand::Stop => commands::tts::stop_speaking(state),
        ShellCommand::Answer(n, text) => commands::exercises::answer(state, n, &text),
        ShellCommand::Check => Ok(commands::exercises::check(state)),
        ShellCommand::Reset => Ok(commands::exercises::reset(state)),
        ShellCommand::Lessons => Ok(commands::lessons::list_lessons(state)),
        ShellCommand::Status => Ok(commands::settings::get_status(state)),
        ShellCommand::Settings => commands::settings::get_settings(state),
        ShellCommand::Version => Ok(commands::settings::get_app_version()),
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Quit => return false,
    };

    match output {
        Ok(text) => println!("{}", text),
        Err(e) => println!("! {}", e),
    }
    true
}

pub async fn run_shell(state: Arc<AppState>) -> Result<()> {
    println!("{}", commands::lessons::show(&state));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(Some(cmd)) => {
                if !dispatch(&state, cmd) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => println!("! {}", e),
        }
    }

    tracing::info!("Shell closed");
    Ok(())
}
