//! Interactive console chat.
//!
//! Each stdin line is a message from one user. `/name` lines are commands,
//! a bare number picks an option of the last prompt, and stages that take a
//! list collect lines until a blank one.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use focusmate_core::{
    Assistant, ChoiceOption, CoreError, DialogStage, FocusKind, Inbound, Language, Reply,
    TextReportRenderer, TokioTimer, UserId,
};

use super::load_config;
use crate::console::ConsoleTransport;
use crate::render::render;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Reply(Reply),
    /// Nothing to print; waiting for more input.
    Continue,
    /// Input the console could not interpret.
    Unknown(String),
    Quit,
}

pub struct ChatSession {
    user: UserId,
    assistant: Assistant,
    /// Options of the last prompt, picked by 1-based number.
    options: Vec<ChoiceOption>,
    buffer: Vec<String>,
}

impl ChatSession {
    pub fn new(user: UserId, assistant: Assistant) -> Self {
        Self {
            user,
            assistant,
            options: Vec::new(),
            buffer: Vec::new(),
        }
    }

    /// A multi-line answer is being collected.
    pub fn collecting(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn input(&mut self, line: &str, now: DateTime<Utc>) -> Result<Outcome, CoreError> {
        let trimmed = line.trim();
        if let Some(command) = trimmed.strip_prefix('/') {
            self.buffer.clear();
            return self.command(command, now);
        }

        if self.collecting() {
            if trimmed.is_empty() {
                let text = std::mem::take(&mut self.buffer).join("\n");
                return self.send(Inbound::Text(text), now);
            }
            self.buffer.push(trimmed.to_string());
            return Ok(Outcome::Continue);
        }
        if trimmed.is_empty() {
            return Ok(Outcome::Continue);
        }

        if let Some(option) = self.pick(trimmed) {
            return self.send(Inbound::Choice(option.choice), now);
        }
        if self
            .assistant
            .dialog_stage(self.user)
            .is_some_and(DialogStage::takes_lines)
        {
            self.buffer.push(trimmed.to_string());
            return Ok(Outcome::Continue);
        }
        self.send(Inbound::text(trimmed), now)
    }

    fn pick(&self, input: &str) -> Option<ChoiceOption> {
        let n: usize = input.parse().ok()?;
        n.checked_sub(1).and_then(|i| self.options.get(i)).cloned()
    }

    fn send(&mut self, input: Inbound, now: DateTime<Utc>) -> Result<Outcome, CoreError> {
        let reply = self.assistant.handle(self.user, input, now)?;
        Ok(self.remember(reply))
    }

    fn remember(&mut self, reply: Reply) -> Outcome {
        self.options = reply.options().to_vec();
        Outcome::Reply(reply)
    }

    fn command(&mut self, command: &str, now: DateTime<Utc>) -> Result<Outcome, CoreError> {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        let (user, today) = (self.user, now.date_naive());
        let a = &self.assistant;

        let reply = match name {
            "start" => a.start_onboarding(user)?,
            "language" if arg.is_empty() => a.language_menu(),
            "language" => match Language::from_code(arg) {
                Some(language) => a.set_language(user, language)?,
                None => return Ok(Outcome::Unknown(format!("unknown language: {arg}"))),
            },
            "add" => a.add_tasks(user)?,
            "habits" => a.show_habits(user, today)?,
            "check" if arg.is_empty() => a.show_habits(user, today)?,
            "check" => a.check_off_habit(user, arg, today)?,
            "pomodoro" if arg.is_empty() => a.show_focus_menu(user)?,
            "pomodoro" => match FocusKind::from_keyword(arg) {
                Some(kind) => a.start_focus(user, kind, now)?,
                None => return Ok(Outcome::Unknown(format!("unknown session kind: {arg}"))),
            },
            "status" => a.show_status(user, today)?,
            "export" => a.export_report(user, today)?,
            "help" => a.show_help(),
            "cancel" => {
                a.abandon_dialog(user);
                self.options.clear();
                return Ok(Outcome::Continue);
            }
            "quit" | "exit" => return Ok(Outcome::Quit),
            other => return Ok(Outcome::Unknown(format!("unknown command: /{other}"))),
        };
        Ok(self.remember(reply))
    }
}

pub fn run(user: UserId, config_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = load_config(config_path)?;
    let store = config.open_store()?;

    // Focus timers sleep on this runtime while stdin blocks the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;
    let timer = Arc::new(TokioTimer::new(runtime.handle().clone()));
    let assistant = Assistant::new(
        &config,
        store,
        Arc::new(ConsoleTransport),
        timer,
        Box::new(TextReportRenderer),
    );
    let mut session = ChatSession::new(user, assistant);
    tracing::info!(user, backend = ?config.storage.backend, "chat started");

    println!("Focusmate. Type /start to begin or /help for commands.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", if session.collecting() { "... " } else { "> " });
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        match session.input(&line?, Utc::now()) {
            Ok(Outcome::Reply(reply)) => {
                if let Reply::Report(doc) = &reply {
                    std::fs::write(&doc.file_name, &doc.bytes)?;
                }
                println!("{}", render(&reply));
            }
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Unknown(message)) => eprintln!("{message}"),
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusmate_core::{
        Choice, Config, DialogError, ManualTimer, MemoryProfileStore, MemoryTransport, Recurrence,
    };

    fn session() -> ChatSession {
        let assistant = Assistant::new(
            &Config::default(),
            Arc::new(MemoryProfileStore::default()),
            Arc::new(MemoryTransport::new()),
            Arc::new(ManualTimer::new()),
            Box::new(TextReportRenderer),
        );
        ChatSession::new(1, assistant)
    }

    fn reply(outcome: Outcome) -> Reply {
        match outcome {
            Outcome::Reply(reply) => reply,
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[test]
    fn numbered_pick_sends_the_choice_token() {
        let mut s = session();
        s.input("/start", Utc::now()).unwrap();
        let r = reply(s.input("1", Utc::now()).unwrap());
        assert_eq!(r, Reply::Welcome { language: Language::En });
    }

    #[test]
    fn list_stages_collect_until_blank_line() {
        let mut s = session();
        s.input("/add", Utc::now()).unwrap();
        assert_eq!(s.input("Buy milk", Utc::now()).unwrap(), Outcome::Continue);
        assert!(s.collecting());
        assert_eq!(s.input("Call dentist", Utc::now()).unwrap(), Outcome::Continue);
        match reply(s.input("", Utc::now()).unwrap()) {
            Reply::CategoryPrompt { total, .. } => assert_eq!(total, 2),
            other => panic!("unexpected {other:?}"),
        }

        // Work, Personal, Health, Skip
        s.input("2", Utc::now()).unwrap();
        match reply(s.input("3", Utc::now()).unwrap()) {
            Reply::TimePrompt { task } => assert_eq!(task, "Buy milk"),
            other => panic!("unexpected {other:?}"),
        }
        // No options at the time prompt: numbers are text.
        match reply(s.input("30", Utc::now()).unwrap()) {
            Reply::CategoryPrompt { position, .. } => assert_eq!(position, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn recurrence_options_map_to_tokens() {
        let mut s = session();
        s.input("/add", Utc::now()).unwrap();
        s.input("Stretch", Utc::now()).unwrap();
        s.input("", Utc::now()).unwrap();
        s.input("4", Utc::now()).unwrap();
        assert_eq!(
            s.pick("1").map(|o| o.choice),
            Some(Choice::Recurrence(Recurrence::Daily))
        );
        assert!(s.pick("0").is_none());
        assert!(s.pick("9").is_none());
    }

    #[test]
    fn commands_and_errors() {
        let mut s = session();
        assert_eq!(s.input("/quit", Utc::now()).unwrap(), Outcome::Quit);
        assert!(matches!(
            s.input("/dance", Utc::now()).unwrap(),
            Outcome::Unknown(_)
        ));
        assert!(matches!(
            s.input("/pomodoro nap", Utc::now()).unwrap(),
            Outcome::Unknown(_)
        ));
        let err = s.input("hello", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Dialog(DialogError::NoActiveDialog { user: 1 })
        ));

        let r = reply(s.input("/pomodoro short", Utc::now()).unwrap());
        assert!(matches!(r, Reply::FocusStarted { minutes: 5, .. }));
        let r = reply(s.input("/language ar", Utc::now()).unwrap());
        assert_eq!(r, Reply::LanguageChanged { language: Language::Ar });
    }

    #[test]
    fn cancel_drops_the_dialog() {
        let mut s = session();
        s.input("/add", Utc::now()).unwrap();
        s.input("Half typed", Utc::now()).unwrap();
        assert_eq!(s.input("/cancel", Utc::now()).unwrap(), Outcome::Continue);
        assert!(!s.collecting());
        assert!(s.input("anything", Utc::now()).is_err());
    }
}
