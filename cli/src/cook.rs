//! Interactive walkthrough on the terminal.
//!
//! Timers tick on wall-clock time measured between commands: every time a
//! line is read, the elapsed time since the previous one is taken off each
//! running timer.

use aldente_core::{SessionError, View, WalkthroughSession};
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recipe name, or its 1-based position in the list.
    Select(String),
    Ingredients,
    Start,
    Continue,
    Back,
    Next,
    Previous,
    Jump(u32),
    Pause,
    Resume,
    Home,
    Landing,
    Reload,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "select" | "open" if !rest.is_empty() => Command::Select(rest.to_string()),
        "i" | "ingredients" => Command::Ingredients,
        "s" | "start" | "resume-recipe" => Command::Start,
        "c" | "continue" => Command::Continue,
        "b" | "back" => Command::Back,
        "n" | "next" | "" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "step" | "j" | "jump" => {
            let number = rest
                .parse()
                .map_err(|_| format!("expected a step number, got {:?}", rest))?;
            Command::Jump(number)
        }
        "pause" => Command::Pause,
        "resume" | "go" => Command::Resume,
        "h" | "home" => Command::Home,
        "l" | "landing" | "recipes" => Command::Landing,
        "r" | "reload" => Command::Reload,
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => {
            // A bare number on the landing view picks a recipe.
            if other.chars().all(|c| c.is_ascii_digit()) {
                Command::Select(other.to_string())
            } else {
                return Err(format!("unknown command {:?} (try \"help\")", line));
            }
        }
    };
    Ok(command)
}

/// Take `seconds` off every running timer. Timers that reach zero are
/// paused; their step numbers are returned.
pub fn advance_timers(session: &mut WalkthroughSession, seconds: u64) -> Vec<u32> {
    if seconds == 0 {
        return Vec::new();
    }
    let running: Vec<(u32, u64)> = session
        .timers()
        .states()
        .iter()
        .filter(|(_, t)| t.is_running())
        .map(|(n, t)| (*n, t.time_remaining))
        .collect();

    let mut finished = Vec::new();
    for (step, remaining) in running {
        let left = remaining.saturating_sub(seconds);
        if session.set_timer_remaining(step, left).is_err() {
            continue;
        }
        if left == 0 {
            let _ = session.pause_timer(step);
            finished.push(step);
        }
    }
    finished
}

/// Converts wall-clock gaps into whole seconds, carrying the remainder.
#[derive(Debug)]
pub struct Countdown {
    last: Instant,
    carry: Duration,
}

impl Countdown {
    pub fn new(now: Instant) -> Self {
        Self {
            last: now,
            carry: Duration::ZERO,
        }
    }

    /// Whole seconds elapsed since the previous tick.
    pub fn tick(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now;
        let seconds = elapsed.as_secs();
        self.carry = elapsed - Duration::from_secs(seconds);
        seconds
    }
}

fn resolve_selection(session: &WalkthroughSession, arg: &str) -> String {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => session
            .recipe_names()
            .get(n - 1)
            .map(|s| s.to_string())
            .unwrap_or_else(|| arg.to_string()),
        _ => arg.to_string(),
    }
}

fn screen(session: &WalkthroughSession) -> String {
    if session.is_loading() {
        return "Loading recipes...\n".to_string();
    }
    if let Some(error) = session.error() {
        return format!("Could not load recipes: {}\n(r)eload or (q)uit\n", error);
    }

    match session.view() {
        View::Landing => {
            let names = session.recipe_names();
            if names.is_empty() {
                return "No recipes yet.\n".to_string();
            }
            let mut out = String::from("Recipes:\n");
            for (i, name) in names.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, name));
            }
            out.push_str("Pick one by number or `select <name>`.\n");
            out
        }
        View::Start => {
            let name = session.selected_recipe().map(|r| r.name.as_str()).unwrap_or("");
            let start = if session.navigator().has_started_recipe() {
                "(s)tart again where you left off"
            } else {
                "(s)tart"
            };
            format!(
                "{}\n{} steps\n(i)ngredients, {}, (b)ack\n",
                name,
                session.steps().len(),
                start
            )
        }
        View::Ingredients => match session.selected_recipe() {
            Some(recipe) => format!(
                "Ingredients for {}:\n{}(c)ontinue, (b)ack\n",
                recipe.name,
                render::ingredients(recipe)
            ),
            None => String::new(),
        },
        View::Steps => match session.current_step() {
            Some(step) => format!(
                "{}(n)ext, (p)rev, step <n>, pause, resume, (h)ome, (l)anding\n",
                render::step(step, session.current_timer())
            ),
            None => "This recipe has no steps. (h)ome or (l)anding\n".to_string(),
        },
    }
}

const HELP: &str = "\
Commands:
  <number> | select <name>   pick a recipe from the list
  i, ingredients             show ingredients
  s, start                   start or resume cooking
  c, continue                continue from ingredients to the steps
  b, back                    go back
  n, next / p, prev          move between steps
  step <n>                   jump to a step
  pause / resume             control the current step's timer
  h, home                    back to the recipe's start screen
  l, landing                 back to the recipe list
  r, reload                  reload recipes (resets timers)
  q, quit
";

/// Apply one command. Returns `Ok(false)` when the cook asked to quit.
async fn dispatch(session: &mut WalkthroughSession, command: Command) -> Result<bool> {
    let outcome: Result<(), SessionError> = match command {
        Command::Quit => return Ok(false),
        Command::Help => {
            print!("{}", HELP);
            return Ok(true);
        }
        Command::Reload => {
            load_into(session).await;
            Ok(())
        }
        Command::Select(arg) => {
            let name = resolve_selection(session, &arg);
            session.select_recipe(&name).map(|_| ())
        }
        Command::Ingredients => session.show_ingredients().map(|_| ()),
        Command::Start => session.start().map(|_| ()),
        Command::Continue => session.continue_to_steps().map(|_| ()),
        Command::Back => session.back().map(|_| ()),
        Command::Next => session.next_step().map(|_| ()),
        Command::Previous => session.previous_step().map(|_| ()),
        Command::Jump(n) => session.jump_to_step(n).map(|_| ()),
        Command::Pause => session
            .pause_timer(session.current_step_number())
            .map(|_| ()),
        Command::Resume => session
            .resume_timer(session.current_step_number())
            .map(|_| ()),
        Command::Home => session.navigate_home().map(|_| ()),
        Command::Landing => {
            session.go_landing();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        println!("{}", e);
    }
    Ok(true)
}

async fn load_into(session: &mut WalkthroughSession) {
    session.begin_loading();
    let result = crate::load_repository().await.map_err(|e| format!("{:#}", e));
    session.finish_loading(result);
}

pub async fn run(initial: Option<&str>) -> Result<()> {
    let mut session = WalkthroughSession::new();
    load_into(&mut session).await;

    if let Some(name) = initial {
        if let Err(e) = session.select_recipe(name) {
            println!("{}", e);
        }
    }
    print!("{}", screen(&session));

    let mut countdown = Countdown::new(Instant::now());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        for step in advance_timers(&mut session, countdown.tick(Instant::now())) {
            println!("Timer for step {} is done!", step);
        }

        match parse_command(&line) {
            Ok(command) => {
                if !dispatch(&mut session, command).await? {
                    break;
                }
            }
            Err(message) => println!("{}", message),
        }
        print!("{}", screen(&session));
    }

    Ok(())
}
