//! Terminal presentation. Everything here is a pure function of
//! [`ChatState`]; no chat logic lives in this module.

use chrono::{DateTime, Utc};

use parlor_types::{Chat, Message, Role};

use crate::controller::ChatState;

pub const USER_ICON: &str = "🧑";
pub const BOT_ICON: &str = "🤖";

/// The input box stops growing past this many rows.
pub const MAX_ROWS: usize = 8;

const MIN_BUBBLE: usize = 16;

// -- Messages --

/// User bubbles sit on the right with the icon after them, assistant
/// bubbles on the left with the icon before them.
pub fn render_message(message: &Message, width: usize) -> String {
    let bubble = (width * 7 / 10).max(MIN_BUBBLE);
    let icon = match message.role {
        Role::User => USER_ICON,
        Role::Assistant => BOT_ICON,
    };

    wrap(&message.content, bubble)
        .iter()
        .enumerate()
        .map(|(i, line)| {
            // Continuation lines get blank space where the icon was
            let icon = if i == 0 { icon } else { "  " };
            match message.role {
                Role::User => {
                    let pad = width.saturating_sub(line.chars().count() + 3);
                    format!("{}{} {}", " ".repeat(pad), line, icon)
                }
                Role::Assistant => format!("{} {}", icon, line),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..width).collect());
            }

            let len = line.chars().count();
            if len > 0 && len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }

    lines
}

pub fn render_conversation(state: &ChatState, width: usize) -> String {
    let mut blocks: Vec<String> = match &state.current {
        Some(thread) if !thread.messages.is_empty() => thread
            .messages
            .iter()
            .map(|m| render_message(m, width))
            .collect(),
        _ => vec![
            "Welcome to AI Chat".to_string(),
            "Start a conversation with the AI assistant. Ask anything you'd like to know.".to_string(),
        ],
    };

    if state.loading {
        blocks.push(format!("{} Thinking...", BOT_ICON));
    }

    blocks.join("\n\n")
}

// -- Sidebar --

pub fn render_sidebar(state: &ChatState, now: DateTime<Utc>) -> String {
    let mut out = String::from("Recent Chats\n");

    if state.chats.is_empty() {
        out.push_str("  No chats yet");
        return out;
    }

    let current = state.current.as_ref().map(|t| t.chat.id);
    let rows: Vec<String> = state
        .chats
        .iter()
        .enumerate()
        .map(|(i, chat)| sidebar_row(i + 1, chat, Some(chat.id) == current, now))
        .collect();
    out.push_str(&rows.join("\n"));
    out
}

fn sidebar_row(position: usize, chat: &Chat, selected: bool, now: DateTime<Utc>) -> String {
    let marker = if selected { '>' } else { ' ' };
    format!(
        "{} {}. {} ({})",
        marker,
        position,
        chat.title,
        relative_time(chat.updated_at, now)
    )
}

/// Human distance between two instants with an "ago"/"in" suffix, using the
/// same buckets as date-fns `formatDistanceToNow`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = distance_in_words(seconds.unsigned_abs());
    if seconds < 0 {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn distance_in_words(seconds: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 1_440;
    const MONTH: u64 = 43_200;

    let minutes = (seconds + 30) / 60;
    match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        m if m < 45 => format!("{} minutes", m),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < DAY => format!("about {} hours", (m + HOUR / 2) / HOUR),
        m if m < 2_520 => "1 day".to_string(),
        m if m < MONTH => format!("{} days", (m + DAY / 2) / DAY),
        m if m < 2 * MONTH => match (m + MONTH / 2) / MONTH {
            1 => "about 1 month".to_string(),
            n => format!("about {} months", n),
        },
        m => {
            let months = m / MONTH;
            if months < 12 {
                return format!("{} months", ((m + MONTH / 2) / MONTH).max(2));
            }

            let years = months / 12;
            let plural = |n: u64| if n == 1 { "year" } else { "years" };
            match months % 12 {
                r if r < 3 => format!("about {} {}", years, plural(years)),
                r if r < 9 => format!("over {} {}", years, plural(years)),
                _ => format!("almost {} years", years + 1),
            }
        }
    }
}

// -- Screen --

pub fn render_screen(state: &ChatState, now: DateTime<Utc>, width: usize) -> String {
    let rule = "-".repeat(width);
    let mut out = vec![
        "AI Chat Interface".to_string(),
        rule.clone(),
        render_sidebar(state, now),
        rule.clone(),
        render_conversation(state, width),
        rule,
    ];
    if let Some(notice) = &state.notice {
        out.push(format!("! {}", notice));
    }
    out.join("\n")
}

// -- Input --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter { shift: bool },
    Backspace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    Edited,
    Submit(String),
    Ignored,
}

/// Auto-growing message input. Enter submits, Shift+Enter starts a new
/// line. Submitting is refused while disabled.
#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    disabled: bool,
}

impl Composer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn can_submit(&self) -> bool {
        !self.disabled && !self.text.trim().is_empty()
    }

    /// Visible height in rows.
    pub fn rows(&self) -> usize {
        self.text.split('\n').count().clamp(1, MAX_ROWS)
    }

    pub fn handle_key(&mut self, key: Key) -> ComposerEvent {
        match key {
            Key::Char(c) => {
                self.text.push(c);
                ComposerEvent::Edited
            }
            Key::Backspace => match self.text.pop() {
                Some(_) => ComposerEvent::Edited,
                None => ComposerEvent::Ignored,
            },
            Key::Enter { shift: true } => {
                self.text.push('\n');
                ComposerEvent::Edited
            }
            Key::Enter { shift: false } if self.can_submit() => {
                ComposerEvent::Submit(std::mem::take(&mut self.text))
            }
            Key::Enter { shift: false } => ComposerEvent::Ignored,
        }
    }
}

/// Input prompt. Continuation lines show the row count, which stops at
/// [`MAX_ROWS`] like the input box.
pub fn render_prompt(composer: &Composer) -> String {
    if composer.disabled {
        return "(waiting) > ".to_string();
    }
    match composer.rows() {
        1 if composer.text.is_empty() => "> ".to_string(),
        1 => ". ".to_string(),
        rows => format!("{}/{} . ", rows, MAX_ROWS),
    }
}

/// Slash commands understood by the terminal client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The "new chat" button.
    New,
    Chats,
    /// Open the n-th chat of the sidebar, counting from 1.
    Open(usize),
    Help,
    Quit,
}

impl Command {
    /// `None` means the line is message text, not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();

        let command = match (parts.next(), parts.next()) {
            (Some("new"), None) => Self::New,
            (Some("chats"), None) => Self::Chats,
            (Some("open"), Some(n)) => match n.parse() {
                Ok(n) if n > 0 => Self::Open(n),
                _ => Self::Help,
            },
            (Some("quit" | "exit"), None) => Self::Quit,
            _ => Self::Help,
        };
        Some(command)
    }
}

pub const HELP: &str = "Commands: /new  /chats  /open <n>  /quit\nEnd a line with \\ to continue the message on the next line.";
