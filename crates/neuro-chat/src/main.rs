//! A terminal chat with a study companion, backed by a hosted model.
//!
//! Type a message and press Enter to chat. `/report` writes an analysis of
//! the conversation to `analysis_report.pdf`, `/quit` exits.

#[macro_use]
extern crate tracing;

mod config;
mod render;

use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use neuro_chat_core::{ChatSession, ChatSessionBuilder};
use neuro_chat_openai_model::OpenAIProvider;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::config::{API_KEY_VAR, Config};

const GREETING: &str = "Hello! I'm NeuroAi's chatbot. I'm here to help you \
    with your learning journey and make it as enjoyable and effective as \
    possible. How are you feeling today about your studies?";

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    Quit,
    Report,
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Command::Empty,
            "/quit" | "/exit" => Command::Quit,
            "/report" => Command::Report,
            _ => Command::Message(line),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Some(config) = Config::from_env() else {
        eprintln!("{API_KEY_VAR} environment variable is not set");
        return;
    };
    debug!("loaded {config:?}");

    let model_provider = OpenAIProvider::new(config.provider_config());
    let (delta_tx, mut delta_rx) = mpsc::unbounded_channel::<String>();
    let mut session = ChatSessionBuilder::with_model_provider(model_provider)
        .with_greeting(GREETING)
        .on_delta(move |delta| {
            delta_tx.send(delta.to_owned()).ok();
        })
        .build();

    println!("🤖 Study Chat 🗣️  (/report to save an analysis, /quit to exit)\n");
    for message in session.conversation() {
        render::print_message(message);
    }

    let mut stdin = io::BufReader::new(io::stdin());
    loop {
        print!("> ");
        render::flush();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Report => save_report(&session).await,
            Command::Message(text) => {
                chat_turn(&mut session, text, &mut delta_rx).await;
            }
        }
    }
}

async fn chat_turn(
    session: &mut ChatSession,
    text: &str,
    delta_rx: &mut mpsc::UnboundedReceiver<String>,
) {
    let mut reply = StreamedReply::new();
    let mut submit = pin!(session.submit(text));
    let result = loop {
        select! {
            result = &mut submit => break result,
            Some(delta) = delta_rx.recv() => reply.push(&delta),
            _ = sleep(TICK) => reply.tick(),
        }
    };
    // Deltas are queued before the turn resolves, some may still wait.
    while let Ok(delta) = delta_rx.try_recv() {
        reply.push(&delta);
    }
    reply.finish();

    match result {
        Ok(reply) if reply.trim().is_empty() => {
            render::print_notice(
                "(empty reply, the model provider may be unavailable)",
            );
        }
        Ok(_) => {}
        Err(err) => render::print_error(&format!("Error: {err}")),
    }
    println!();
}

/// An assistant reply being printed as it streams in.
struct StreamedReply {
    progress_bar: Option<ProgressBar>,
    started: bool,
}

impl StreamedReply {
    fn new() -> Self {
        Self {
            progress_bar: Some(spinner("🤔 Thinking...")),
            started: false,
        }
    }

    fn tick(&self) {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.inc(1);
        }
    }

    fn push(&mut self, delta: &str) {
        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        if !self.started {
            render::start_streamed_reply();
            self.started = true;
        }
        render::print_delta(delta);
    }

    fn finish(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        if self.started {
            println!();
        }
    }
}

async fn save_report(session: &ChatSession) {
    let result =
        with_spinner("📝 Writing report...", session.generate_report()).await;
    let document = match result {
        Ok(document) => document,
        Err(err) => {
            render::print_error(&format!("Error generating report: {err}"));
            return;
        }
    };

    match tokio::fs::write(document.filename(), document.bytes()).await {
        Ok(()) => render::print_notice(&format!(
            "Report saved to {} ({}, {} bytes)",
            document.filename(),
            document.mime(),
            document.bytes().len()
        )),
        Err(err) => {
            render::print_error(&format!("Error saving report: {err}"));
        }
    }
    println!();
}

async fn with_spinner<F: Future>(message: &'static str, fut: F) -> F::Output {
    let progress_bar = spinner(message);
    let mut fut = pin!(fut);
    let output = loop {
        select! {
            output = &mut fut => break output,
            _ = sleep(TICK) => progress_bar.inc(1),
        }
    };
    progress_bar.finish_and_clear();
    output
}

fn spinner(message: &'static str) -> ProgressBar {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message(message);
    progress_bar
}

async fn read_line(
    stdin: &mut io::BufReader<io::Stdin>,
) -> Option<String> {
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("   \n"), Command::Empty);
        assert_eq!(Command::parse("/quit\n"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse(" /report "), Command::Report);
        assert_eq!(
            Command::parse("  I can't focus\n"),
            Command::Message("I can't focus")
        );
        assert_eq!(
            Command::parse("/reports please"),
            Command::Message("/reports please")
        );
    }
}
