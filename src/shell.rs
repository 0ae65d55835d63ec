use crate::{
    App,
    actions::Command,
    forms::{EventForm, LoginForm, RegisterForm, VenueForm},
    views::{self, ActionKind, MessageKind, Screen},
};
use thiserror::Error;

// --- Input Parsing ---

/// Input
///
/// One line typed at the prompt, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A fragment edit, e.g. `#/dashboard/events`.
    Fragment(String),
    /// Choose the numbered action of the current screen (1-based).
    Follow(usize),
    Command(Command),
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unterminated quote")]
    UnterminatedQuote,
    #[error("Unknown command: {0}. Type 'help' for the list of commands.")]
    UnknownCommand(String),
    #[error("Unknown field '{field}'. Usage: {usage}")]
    UnknownField { field: String, usage: &'static str },
    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Navigation:
  #/<path>          go to a fragment (e.g. #/dashboard/events)
  <number>          choose one of the numbered actions on screen
Account:
  login <email> <password>
  register <name> <email> <password>
  logout
Events:
  event-create title=.. description=.. date=YYYY-MM-DD time=HH:MM venue=<id> capacity=<n>
  event-edit [id] [field=value ...]
  event-delete [id]   event-join [id]   event-leave [id]
Venues:
  venue-create name=.. location=.. capacity=<n>
  venue-edit [id] [field=value ...]
  venue-delete [id]
Other:
  help   quit
Values containing spaces can be quoted: title=\"Rust Meetup\".
When [id] is left out, the id of the current screen is used.";

/// Splits a line into words with POSIX shell quoting rules.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    shell_words::split(line).map_err(|_| ParseError::UnterminatedQuote)
}

/// parse
///
/// Classifies a line. `current_id` fills in the id of commands that leave it out.
pub fn parse(line: &str, current_id: Option<&str>) -> Result<Input, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Input::Empty);
    }
    if trimmed.starts_with('#') {
        return Ok(Input::Fragment(trimmed.to_string()));
    }
    if let Ok(n) = trimmed.parse::<usize>() {
        return Ok(Input::Follow(n));
    }

    let tokens = tokenize(trimmed)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(Input::Empty);
    };

    let command = match name.as_str() {
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "login" => match args {
            [email, password] => Command::Login(LoginForm {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => return Err(ParseError::Usage(views::LOGIN_USAGE)),
        },
        "register" => match args {
            [name, email, password] => Command::Register(RegisterForm {
                name: name.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            _ => return Err(ParseError::Usage(views::REGISTER_USAGE)),
        },
        "logout" => Command::Logout,
        "event-create" => Command::CreateEvent(event_form(args, views::EVENT_CREATE_USAGE)?),
        "event-edit" => {
            let (id, fields) = split_id(args, current_id, views::EVENT_EDIT_USAGE)?;
            Command::UpdateEvent {
                id,
                form: event_form(fields, views::EVENT_EDIT_USAGE)?,
            }
        }
        "event-delete" => Command::DeleteEvent(single_id(args, current_id, "event-delete [id]")?),
        "event-join" => Command::JoinEvent(single_id(args, current_id, "event-join [id]")?),
        "event-leave" => Command::LeaveEvent(single_id(args, current_id, "event-leave [id]")?),
        "venue-create" => Command::CreateVenue(venue_form(args, views::VENUE_CREATE_USAGE)?),
        "venue-edit" => {
            let (id, fields) = split_id(args, current_id, views::VENUE_EDIT_USAGE)?;
            Command::UpdateVenue {
                id,
                form: venue_form(fields, views::VENUE_EDIT_USAGE)?,
            }
        }
        "venue-delete" => Command::DeleteVenue(single_id(args, current_id, "venue-delete [id]")?),
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Input::Command(command))
}

/// Takes a leading positional id, falling back to the current one.
fn split_id<'a>(
    args: &'a [String],
    current_id: Option<&str>,
    usage: &'static str,
) -> Result<(String, &'a [String]), ParseError> {
    match args.split_first() {
        Some((first, rest)) if !first.contains('=') => Ok((first.clone(), rest)),
        _ => current_id
            .map(|id| (id.to_string(), args))
            .ok_or(ParseError::Usage(usage)),
    }
}

fn single_id(
    args: &[String],
    current_id: Option<&str>,
    usage: &'static str,
) -> Result<String, ParseError> {
    match args {
        [id] => Ok(id.clone()),
        [] => current_id
            .map(str::to_string)
            .ok_or(ParseError::Usage(usage)),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn fields<'a>(
    args: &'a [String],
    usage: &'static str,
) -> impl Iterator<Item = Result<(&'a str, String), ParseError>> {
    args.iter().map(move |arg| {
        arg.split_once('=')
            .map(|(key, value)| (key, value.to_string()))
            .ok_or(ParseError::Usage(usage))
    })
}

fn event_form(args: &[String], usage: &'static str) -> Result<EventForm, ParseError> {
    let mut form = EventForm::default();
    for field in fields(args, usage) {
        let (key, value) = field?;
        let slot = match key {
            "title" => &mut form.title,
            "description" => &mut form.description,
            "date" => &mut form.date,
            "time" => &mut form.time,
            "venue" => &mut form.venue,
            "capacity" => &mut form.capacity,
            other => {
                return Err(ParseError::UnknownField {
                    field: other.to_string(),
                    usage,
                });
            }
        };
        *slot = Some(value);
    }
    Ok(form)
}

fn venue_form(args: &[String], usage: &'static str) -> Result<VenueForm, ParseError> {
    let mut form = VenueForm::default();
    for field in fields(args, usage) {
        let (key, value) = field?;
        let slot = match key {
            "name" => &mut form.name,
            "location" => &mut form.location,
            "capacity" => &mut form.capacity,
            other => {
                return Err(ParseError::UnknownField {
                    field: other.to_string(),
                    usage,
                });
            }
        };
        *slot = Some(value);
    }
    Ok(form)
}

// --- Output ---

/// Plain-text rendering of a screen, actions numbered from 1.
pub fn format_screen(screen: &Screen) -> String {
    let mut out = format!("\n== {} ==\n", screen.title);
    for line in &screen.body {
        out.push_str(line);
        out.push('\n');
    }
    if let Some(message) = &screen.message {
        let tag = match message.kind {
            MessageKind::Success => "OK",
            MessageKind::Alert => "!!",
        };
        out.push_str(&format!("[{tag}] {}\n", message.text));
    }
    if !screen.actions.is_empty() {
        out.push('\n');
        for (i, action) in screen.actions.iter().enumerate() {
            out.push_str(&format!("  {}) {}\n", i + 1, action.label));
        }
    }
    out
}

// --- Readline Thread ---

#[derive(Debug)]
enum ReadlineEvent {
    Line(String),
    Eof,
}

/// LineReader
///
/// Owns a dedicated OS thread running `rustyline`. The thread reads one line per
/// prompt it is sent, so confirmations and regular input share the same editor.
struct LineReader {
    prompts: std::sync::mpsc::Sender<String>,
    lines: tokio::sync::mpsc::UnboundedReceiver<ReadlineEvent>,
}

impl LineReader {
    fn spawn() -> Self {
        let (prompt_tx, prompt_rx) = std::sync::mpsc::channel::<String>();
        let (line_tx, line_rx) = tokio::sync::mpsc::unbounded_channel();

        if let Err(e) = std::thread::Builder::new()
            .name("events-portal-readline".into())
            .spawn(move || {
                let config = rustyline::Config::builder().auto_add_history(true).build();
                let mut rl = match rustyline::DefaultEditor::with_config(config) {
                    Ok(editor) => editor,
                    Err(e) => {
                        tracing::error!("Failed to create readline editor: {e}");
                        let _ = line_tx.send(ReadlineEvent::Eof);
                        return;
                    }
                };

                while let Ok(prompt) = prompt_rx.recv() {
                    let event = loop {
                        match rl.readline(&prompt) {
                            Ok(line) => break ReadlineEvent::Line(line),
                            // Ctrl+C clears the line.
                            Err(rustyline::error::ReadlineError::Interrupted) => continue,
                            Err(rustyline::error::ReadlineError::Eof) => break ReadlineEvent::Eof,
                            Err(e) => {
                                tracing::error!("Readline error: {e}");
                                break ReadlineEvent::Eof;
                            }
                        }
                    };
                    let eof = matches!(event, ReadlineEvent::Eof);
                    if line_tx.send(event).is_err() || eof {
                        break;
                    }
                }
            })
        {
            tracing::error!("failed to spawn readline thread: {e}");
        }

        Self {
            prompts: prompt_tx,
            lines: line_rx,
        }
    }

    /// Shows `prompt` and waits for the answer. `None` on EOF or a dead thread.
    async fn read(&mut self, prompt: &str) -> Option<String> {
        self.prompts.send(prompt.to_string()).ok()?;
        match self.lines.recv().await {
            Some(ReadlineEvent::Line(line)) => Some(line),
            Some(ReadlineEvent::Eof) | None => None,
        }
    }

    async fn confirm(&mut self, question: &str) -> bool {
        self.read(&format!("{question} [y/N] "))
            .await
            .is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

// --- Loop ---

/// run
///
/// Interactive loop: show the current screen, read a line, apply it.
pub async fn run(mut app: App) {
    let mut reader = LineReader::spawn();

    print!("{}", format_screen(app.start().await));
    println!("Type 'help' for commands.");

    loop {
        let prompt = format!("{}> ", app.location());
        let Some(line) = reader.read(&prompt).await else {
            tracing::debug!("readline: EOF or channel closed");
            break;
        };

        let input = match parse(&line, app.current_param()) {
            Ok(input) => input,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match input {
            Input::Empty => {}
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Fragment(fragment) => {
                if let Some(screen) = app.on_fragment_change(&fragment).await {
                    print!("{}", format_screen(screen));
                }
            }
            Input::Follow(n) => {
                let Some(kind) = app
                    .screen()
                    .and_then(|s| n.checked_sub(1).and_then(|i| s.actions.get(i)))
                    .map(|a| a.kind.clone())
                else {
                    println!("No action numbered {n}.");
                    continue;
                };
                match kind {
                    ActionKind::Navigate(fragment) => {
                        print!("{}", format_screen(app.navigate_to(&fragment).await));
                    }
                    ActionKind::Invoke(command) => run_command(&mut app, &mut reader, command).await,
                    ActionKind::Form(usage) => println!("Usage: {usage}"),
                }
            }
            Input::Command(command) => run_command(&mut app, &mut reader, command).await,
        }
    }

    tracing::info!("shell closed");
}

async fn run_command(app: &mut App, reader: &mut LineReader, command: Command) {
    if let Some(question) = command.confirmation() {
        if !reader.confirm(question).await {
            println!("Cancelled.");
            return;
        }
    }
    print!("{}", format_screen(app.execute(command).await));
}
