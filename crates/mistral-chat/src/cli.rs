//! CLI (Command Line Interface) mode
//!
//! An interactive REPL over a single chat session, for use without a browser.

use mc_core::{ChatOrchestrator, Message, Role, Session};
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings, MenuBuilder,
    Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use std::borrow::Cow;
use tracing::info;

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/exit", "Quit"),
    ("/quit", "Quit"),
    ("/clear", "Clear chat history"),
    ("/history", "Show chat history"),
];

/// Longest preview printed per message by /history
const PREVIEW_CHARS: usize = 100;

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                ..Suggestion::default()
            })
            .collect()
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// What the REPL should do after a line was read
#[derive(Debug, PartialEq, Eq)]
enum CommandAction {
    /// Not a command: send it to the model
    Chat,
    /// Command handled, read the next line
    Continue,
    /// Leave the REPL
    Exit,
}

/// Result of one REPL line
#[derive(Debug)]
enum LineOutcome {
    /// Blank line or command; nothing to print
    Handled,
    /// Leave the REPL
    Exit,
    /// Assistant reply to a chat line
    Reply(Message),
}

/// Run CLI interactive mode
pub async fn run_cli(orchestrator: ChatOrchestrator) -> anyhow::Result<()> {
    let mut session = Session::new();
    info!("Starting CLI mode, session {}", session.id);

    print_welcome(&orchestrator);

    let mut keybindings = default_keybindings();

    // Trigger completion on '/' key
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => match process_line(&line, &orchestrator, &mut session).await {
                LineOutcome::Exit => break,
                LineOutcome::Handled => continue,
                LineOutcome::Reply(reply) => println!("\n{}\n", reply.content()),
            },
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => break,
            Err(err) => {
                eprintln!("\n❌ Error: {}\n", err);
                break;
            }
        }
    }

    println!("\n👋 Goodbye!\n");
    Ok(())
}

/// Dispatch one line: commands are matched trimmed, chat text goes to the model as typed
async fn process_line(line: &str, orchestrator: &ChatOrchestrator, session: &mut Session) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Handled;
    }

    match handle_command(trimmed, orchestrator, session) {
        CommandAction::Exit => LineOutcome::Exit,
        CommandAction::Continue => LineOutcome::Handled,
        CommandAction::Chat => {
            println!("{}", Style::new().dimmed().paint("Thinking..."));
            LineOutcome::Reply(orchestrator.chat(session, line).await)
        }
    }
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    // Tab key triggers completion
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    // Esc key clears/closes menus
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

/// Handle special commands (/exit, /clear, /help, /history)
fn handle_command(input: &str, orchestrator: &ChatOrchestrator, session: &mut Session) -> CommandAction {
    let lower = input.to_lowercase();

    match lower.as_str() {
        "/exit" | "/quit" | "/q" => CommandAction::Exit,
        "/clear" => {
            orchestrator.clear_history(session);
            println!("\n✅ Chat history cleared.\n");
            CommandAction::Continue
        }
        "/help" | "/?" => {
            print_help();
            CommandAction::Continue
        }
        "/history" => {
            print_history(session.transcript());
            CommandAction::Continue
        }
        _ if lower.starts_with('/') => {
            eprintln!("\n❓ Unknown command: {}. Type /help for the list of commands.\n", input);
            CommandAction::Continue
        }
        _ => CommandAction::Chat,
    }
}

/// Print welcome message
fn print_welcome(orchestrator: &ChatOrchestrator) {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          🤖 Mistral AI Chat Assistant                      ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  Type a message and press Enter to chat                    ║");
    println!("║  Commands: /help, /exit, /clear, /history                  ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    match (orchestrator.model_name(), orchestrator.init_error()) {
        (Some(model), _) => println!("Model: {}\n", model),
        (None, Some(e)) => eprintln!(
            "{}\n",
            Color::Red.paint(format!("Error initializing Mistral model: {}", e))
        ),
        (None, None) => {}
    }
}

/// Print help message
fn print_help() {
    println!();
    println!("📖 Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {} - {}", cmd, desc);
    }
    println!();
}

/// One-line preview of a message for /history
fn preview(message: &Message) -> String {
    let text = message.content().replace('\n', " ");
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text
    }
}

/// Print conversation history
fn print_history(messages: &[Message]) {
    println!();
    println!("📜 Chat history ({} messages):", messages.len());
    println!("{}", "─".repeat(50));

    for (i, msg) in messages.iter().enumerate() {
        let role = match msg.role() {
            Role::User => "👤 You",
            Role::Assistant => "🤖 AI",
        };
        println!("{}. {}: {}", i + 1, role, preview(msg));
    }

    println!("{}", "─".repeat(50));
    println!();
}
