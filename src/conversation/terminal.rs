// src/conversation/terminal.rs
// Line-oriented conversation view

use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{BackendClient, ConversationSession, ModeContext, Reply};
use crate::voice::{VoiceInput, VoiceOutcome};

const HELP: &str = "Type a message and press Enter.
  /mode chat|memory|music   switch what we talk about
  /voice                    speak instead of typing
  /stop                     stop listening
  /quit                     leave";

const PROMPT: &str = "> ";

/// User input, one line at a time.
///
/// The stdin reader only calls `readline` when a line is requested, so no
/// prompt is left open after the loop ends.
pub struct LineReader {
    requests: Option<std_mpsc::Sender<()>>,
    lines: mpsc::Receiver<String>,
    pending: bool,
}

impl LineReader {
    /// Read from the terminal with rustyline, keeping history in
    /// `~/.memory-lane/history`.
    pub fn stdin() -> Result<Self> {
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(), String>>();
        let (request_tx, request_rx) = std_mpsc::channel::<()>();
        let (line_tx, line_rx) = mpsc::channel(1);

        // A plain thread: a blocking task would hold up runtime shutdown.
        std::thread::spawn(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => {
                    let _ = ready_tx.send(Ok(()));
                    editor
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            let history_path = history_path();
            if let Some(path) = &history_path {
                if path.exists() {
                    let _ = editor.load_history(path);
                }
            }

            while request_rx.recv().is_ok() {
                let line = loop {
                    match editor.readline(PROMPT) {
                        Ok(line) => break Some(line),
                        Err(ReadlineError::Interrupted) => {
                            println!("^C");
                            continue;
                        }
                        Err(ReadlineError::Eof) => break None,
                        Err(e) => {
                            warn!("Readline error: {}", e);
                            break None;
                        }
                    }
                };
                let Some(line) = line else { break };

                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }

            if let Some(path) = &history_path {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                let _ = editor.save_history(path);
            }
        });

        ready_rx
            .recv()
            .context("Line editor thread exited")?
            .map_err(|e| anyhow!("Could not open the terminal: {e}"))?;

        Ok(Self {
            requests: Some(request_tx),
            lines: line_rx,
            pending: false,
        })
    }

    /// Fixed input, for tests and scripted sessions.
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            let _ = tx.try_send(line);
        }
        Self {
            requests: None,
            lines: rx,
            pending: false,
        }
    }

    /// Next line, or `None` once input has ended. Cancel-safe: a line
    /// requested by a dropped call is returned by the next one.
    pub async fn next_line(&mut self) -> Option<String> {
        if !self.pending {
            if let Some(requests) = &self.requests {
                let _ = requests.send(());
            }
            self.pending = true;
        }
        let line = self.lines.recv().await;
        self.pending = false;
        line
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".memory-lane").join("history"))
}

#[derive(Debug, PartialEq)]
enum Command {
    Say(String),
    Mode(Result<ModeContext, String>),
    Voice,
    Stop,
    Help,
    Quit,
    Nothing,
}

fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line.to_string());
    };

    let (cmd, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match cmd.to_lowercase().as_str() {
        "mode" => Command::Mode(arg.parse()),
        "voice" | "listen" => Command::Voice,
        "stop" => Command::Stop,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "bye" => Command::Quit,
        _ => Command::Help,
    }
}

fn greeting(mode: ModeContext) -> &'static str {
    match mode {
        ModeContext::GeneralChat => "Hello! I'm here to keep you company. What would you like to talk about?",
        ModeContext::MemoryRecall => "Hello! Let's take a walk down memory lane. What would you like to remember?",
        ModeContext::Music => "Hello! Let's find some music you'll enjoy. What are you in the mood for?",
    }
}

fn render_reply<W: Write>(out: &mut W, reply: &Reply) -> std::io::Result<()> {
    writeln!(out, "\nAssistant: {}", reply.text)?;
    if !reply.suggestions.is_empty() {
        writeln!(out, "You could try:")?;
        for (i, suggestion) in reply.suggestions.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, suggestion)?;
        }
    }
    writeln!(out)?;
    out.flush()
}

/// Wait for the session while still reading input, so `/stop` can cancel it.
async fn listen<W: Write>(
    voice: &VoiceInput,
    lines: &mut LineReader,
    out: &mut W,
) -> Result<Option<String>> {
    let session = match voice.start_listening() {
        Ok(session) => session,
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(None);
        }
    };
    debug!(session = session.id(), "Listening from terminal");
    writeln!(out, "Listening... (type /stop to cancel)")?;
    out.flush()?;

    let pending = session.outcome();
    tokio::pin!(pending);
    let mut input_closed = false;
    let outcome = loop {
        tokio::select! {
            outcome = &mut pending => break outcome,
            line = lines.next_line(), if !input_closed => match line {
                Some(line) if parse_line(&line) == Command::Stop => {
                    voice.stop_listening();
                }
                Some(_) => writeln!(out, "Still listening. Type /stop to cancel.")?,
                None => {
                    input_closed = true;
                    voice.stop_listening();
                }
            },
        }
    };

    match outcome {
        VoiceOutcome::Recognized(text) => {
            writeln!(out, "You said: {text}")?;
            Ok(Some(text))
        }
        VoiceOutcome::Failed(reason) => {
            writeln!(out, "{}", reason.user_message())?;
            Ok(None)
        }
        VoiceOutcome::Cancelled => {
            writeln!(out, "Stopped listening.")?;
            Ok(None)
        }
    }
}

/// Run the view over arbitrary input and output. Returns the finished session.
pub async fn run_with_io<W: Write>(
    mut lines: LineReader,
    mut out: W,
    client: &BackendClient,
    mode: ModeContext,
    voice: &VoiceInput,
) -> Result<ConversationSession> {
    let mut session = ConversationSession::new(mode);

    writeln!(out, "{}", greeting(mode))?;
    writeln!(out, "(Type /help for options.)\n")?;
    out.flush()?;

    while let Some(line) = lines.next_line().await {
        let text = match parse_line(&line) {
            Command::Nothing => continue,
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Command::Stop => {
                if !voice.stop_listening() {
                    writeln!(out, "I wasn't listening.")?;
                }
                continue;
            }
            Command::Mode(Ok(new_mode)) => {
                session.set_mode(new_mode);
                debug!(mode = new_mode.label(), "Mode switched");
                writeln!(out, "{}", greeting(new_mode))?;
                continue;
            }
            Command::Mode(Err(e)) => {
                writeln!(out, "{e}")?;
                continue;
            }
            Command::Voice => match listen(voice, &mut lines, &mut out).await? {
                Some(text) => text,
                None => continue,
            },
            Command::Say(text) => text,
        };

        let reply = session.submit(client, &text).await;
        render_reply(&mut out, &reply)?;
    }

    voice.stop_listening();
    writeln!(out, "Goodbye! It was lovely talking with you.")?;
    out.flush()?;
    Ok(session)
}

/// Run the view on the terminal.
pub async fn run(client: &BackendClient, mode: ModeContext, voice: &VoiceInput) -> Result<()> {
    run_with_io(LineReader::stdin()?, std::io::stdout(), client, mode, voice).await?;
    Ok(())
}
