//! Line commands accepted on stdin while the slideshow runs.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{unbounded, Receiver};

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Next,
    Previous,
    Space,
    /// One-based slide number, as shown on the counter.
    Goto(usize),
    Hide,
    Show,
    Pause,
    Resume,
    Random,
    Preset(String),
    Effect(String),
    Set(String, f32),
    Status,
    Quit,
}

pub const HELP: &str = "commands: next|n, prev|p, space, goto N, hide, show, pause, resume, \
random, preset NAME, effect NAME, set KEY VALUE, status, quit|q";

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".into());
    };
    let rest: Vec<&str> = parts.collect();
    let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("n" | "next", []) => ShellCommand::Next,
        ("p" | "prev" | "previous", []) => ShellCommand::Previous,
        ("space", []) => ShellCommand::Space,
        ("goto", [number]) => {
            let number: usize = number
                .parse()
                .map_err(|_| format!("invalid slide number '{number}'"))?;
            if number == 0 {
                return Err("slide numbers start at 1".into());
            }
            ShellCommand::Goto(number)
        }
        ("hide", []) => ShellCommand::Hide,
        ("show", []) => ShellCommand::Show,
        ("pause", []) => ShellCommand::Pause,
        ("resume", []) => ShellCommand::Resume,
        ("random", []) => ShellCommand::Random,
        ("preset", [name @ ..]) if !name.is_empty() => ShellCommand::Preset(name.join(" ")),
        ("effect", [name]) => ShellCommand::Effect(name.to_string()),
        ("set", [key, value]) => {
            let value: f32 = value
                .parse()
                .map_err(|_| format!("invalid value '{value}' for {key}"))?;
            ShellCommand::Set(key.to_string(), value)
        }
        ("status", []) => ShellCommand::Status,
        ("q" | "quit" | "exit", []) => ShellCommand::Quit,
        _ => return Err(format!("unrecognised command '{}'; {HELP}", line.trim())),
    };
    Ok(command)
}

/// Reads stdin on its own thread. Unparseable lines are logged and skipped;
/// the channel disconnects at end of input.
pub fn spawn_stdin_reader() -> Receiver<ShellCommand> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("slidewall-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!(%err, "ignoring command"),
                }
            }
            tracing::debug!("stdin closed");
        });
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "failed to spawn stdin reader; commands disabled");
    }
    rx
}
