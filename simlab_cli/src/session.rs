//! Interactive wizard session.
//!
//! One line per command; the tab bar is printed after every change.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use simlab_core::checklists::{DebriefingModel, DebriefingTemplate};
use simlab_core::equipment::EquipmentItem;
use simlab_core::form::{Field, HistoryFlag, ListField};
use simlab_core::frames::{Frame, FrameId, ParameterSet, Transition};
use simlab_core::storage::ScenarioRepository;
use simlab_core::{PublishOutcome, Tab, Wizard};
use uuid::Uuid;

pub const HELP: &str = "\
  set <field> <text>              edit a form field (title, patient_name, ...)
  flag <name> on|off              patient history flag (diabetes, smoker, ...)
  objective <list> <text>         add a technical/non_technical objective
  drop-objective <list> <text>    remove an objective
  equip <kind> [quantity]         add an equipment item
  unequip <id>                    remove an equipment item
  frame <title>                   add a frame
  drop-frame <F#>                 remove a frame
  move-frame <F#> <position>      reorder (position starts at 1)
  copy-frame <F#>                 duplicate a frame
  vitals <F#> key=value ...       hr sys dia rr spo2 temp etco2 glucose rhythm
  link <F#> <F#> <trigger>        add a transition
  unlink <F#> <F#>                remove a transition
  debrief <model>|none            gas, pearls, teamgains, 3d
  phase <phase> <text>            fill a debriefing phase
  next | prev | go <tab>          navigate
  status | review | show          inspect
  save | publish | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(Field, String),
    Flag(HistoryFlag, bool),
    AddObjective(ListField, String),
    RemoveObjective(ListField, String),
    AddEquipment { kind: String, quantity: u32 },
    RemoveEquipment(Uuid),
    AddFrame(String),
    RemoveFrame(FrameId),
    MoveFrame(FrameId, usize),
    DuplicateFrame(FrameId),
    Vitals(FrameId, Vec<(String, String)>),
    Link(FrameId, FrameId, String),
    Unlink(FrameId, FrameId),
    Debrief(Option<DebriefingModel>),
    Phase(String, String),
    Next,
    Previous,
    Go(Tab),
    Status,
    Review,
    Show,
    Save,
    Publish,
    Help,
    Quit,
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        bail!("missing {}", what);
    }
    Ok(value)
}

fn list_field(raw: &str) -> Result<ListField> {
    ListField::from_key(raw).ok_or_else(|| anyhow!("unknown objective list '{}'", raw))
}

fn frame_id(raw: &str) -> Result<FrameId> {
    Ok(FrameId::parse(require(raw, "frame id")?)?)
}

pub fn parse_command(line: &str) -> Result<Command> {
    let (verb, rest) = split_word(line);
    let command = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (key, value) = split_word(rest);
            let field = Field::from_key(key).ok_or_else(|| anyhow!("unknown field '{}'", key))?;
            Command::Set(field, value.to_string())
        }
        "flag" => {
            let (key, value) = split_word(rest);
            let flag = HistoryFlag::from_key(key).ok_or_else(|| anyhow!("unknown history flag '{}'", key))?;
            let on = match value.to_ascii_lowercase().as_str() {
                "on" | "yes" | "true" | "sim" => true,
                "off" | "no" | "false" | "nao" => false,
                other => bail!("expected on/off, got '{}'", other),
            };
            Command::Flag(flag, on)
        }
        "objective" => {
            let (list, text) = split_word(rest);
            Command::AddObjective(list_field(list)?, require(text, "objective text")?.to_string())
        }
        "drop-objective" => {
            let (list, text) = split_word(rest);
            Command::RemoveObjective(list_field(list)?, require(text, "objective text")?.to_string())
        }
        "equip" => {
            let words: Vec<&str> = rest.split_whitespace().collect();
            let (kind, quantity) = match words.split_last() {
                Some((last, head)) if !head.is_empty() && last.chars().all(|c| c.is_ascii_digit()) => {
                    (head.join(" "), EquipmentItem::parse_quantity(last)?)
                }
                _ => (require(rest, "equipment kind")?.to_string(), 1),
            };
            Command::AddEquipment { kind, quantity }
        }
        "unequip" => {
            let id = Uuid::parse_str(require(rest, "equipment id")?).context("invalid equipment id")?;
            Command::RemoveEquipment(id)
        }
        "frame" => Command::AddFrame(require(rest, "frame title")?.to_string()),
        "drop-frame" => Command::RemoveFrame(frame_id(rest)?),
        "copy-frame" => Command::DuplicateFrame(frame_id(rest)?),
        "move-frame" => {
            let (id, position) = split_word(rest);
            let position: usize = position.parse().context("position must be a number")?;
            if position == 0 {
                bail!("positions start at 1");
            }
            Command::MoveFrame(frame_id(id)?, position - 1)
        }
        "vitals" => {
            let (id, pairs) = split_word(rest);
            let mut values = Vec::new();
            for pair in pairs.split_whitespace() {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected key=value, got '{}'", pair))?;
                values.push((key.to_ascii_lowercase(), value.to_string()));
            }
            if values.is_empty() {
                bail!("no values given");
            }
            Command::Vitals(frame_id(id)?, values)
        }
        "link" => {
            let (from, rest) = split_word(rest);
            let (to, trigger) = split_word(rest);
            Command::Link(frame_id(from)?, frame_id(to)?, trigger.to_string())
        }
        "unlink" => {
            let (from, to) = split_word(rest);
            Command::Unlink(frame_id(from)?, frame_id(to)?)
        }
        "debrief" => match rest.to_ascii_lowercase().as_str() {
            "none" | "" => Command::Debrief(None),
            other => Command::Debrief(Some(DebriefingModel::parse(other)?)),
        },
        "phase" => {
            let (phase, text) = split_word(rest);
            Command::Phase(require(phase, "phase name")?.to_string(), text.to_string())
        }
        "next" => Command::Next,
        "prev" | "previous" => Command::Previous,
        "go" => Command::Go(Tab::from_key(rest).ok_or_else(|| anyhow!("unknown tab '{}'", rest))?),
        "status" => Command::Status,
        "review" => Command::Review,
        "show" => Command::Show,
        "save" => Command::Save,
        "publish" => Command::Publish,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{}' (try 'help')", other),
    };
    Ok(command)
}

fn apply_vitals(params: &mut ParameterSet, values: &[(String, String)]) -> Result<()> {
    fn number(raw: &str) -> Result<u32> {
        raw.parse().with_context(|| format!("'{}' is not a whole number", raw))
    }
    for (key, value) in values {
        match key.as_str() {
            "hr" => params.heart_rate_bpm = Some(number(value)?),
            "sys" => params.systolic_mmhg = Some(number(value)?),
            "dia" => params.diastolic_mmhg = Some(number(value)?),
            "rr" => params.respiratory_rate_rpm = Some(number(value)?),
            "spo2" => params.spo2_percent = Some(number(value)?),
            "temp" => {
                params.temperature_c =
                    Some(value.parse().with_context(|| format!("'{}' is not a temperature", value))?)
            }
            "etco2" => params.etco2_mmhg = Some(number(value)?),
            "glucose" => params.glucose_mg_dl = Some(number(value)?),
            "rhythm" => params.rhythm = Some(value.replace('_', " ")),
            other => bail!("unknown vital '{}'", other),
        }
    }
    Ok(())
}

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Apply one command to the session, printing its result.
pub fn execute<R: ScenarioRepository>(wizard: &mut Wizard, repo: &mut R, command: Command) -> Result<Flow> {
    match command {
        Command::Set(field, value) => wizard.scenario_mut().set_field(field, value),
        Command::Flag(flag, on) => wizard.scenario_mut().set_history_flag(flag, on),
        Command::AddObjective(list, text) => {
            if !wizard.scenario_mut().add_to_list(list, text) {
                println!("Objective already listed.");
            }
        }
        Command::RemoveObjective(list, text) => {
            let removed = wizard.scenario_mut().remove_from_list(list, |item| item == text);
            println!("Removed {} objective(s).", removed);
        }
        Command::AddEquipment { kind, quantity } => {
            let id = wizard
                .scenario_mut()
                .add_equipment(EquipmentItem::new(kind).with_quantity(quantity));
            println!("Equipment {}", id);
        }
        Command::RemoveEquipment(id) => {
            if wizard.scenario_mut().remove_equipment(&id).is_none() {
                bail!("no equipment item {}", id);
            }
        }
        Command::AddFrame(title) => {
            let id = wizard.scenario_mut().add_frame(Frame::new(title));
            println!("Added frame {}", id);
        }
        Command::RemoveFrame(id) => {
            if wizard.scenario_mut().remove_frame(id).is_none() {
                bail!("no frame {}", id);
            }
        }
        Command::MoveFrame(id, index) => wizard.scenario_mut().move_frame(id, index)?,
        Command::DuplicateFrame(id) => {
            let copy = wizard.scenario_mut().duplicate_frame(id)?;
            println!("Added frame {}", copy);
        }
        Command::Vitals(id, values) => {
            let frame = wizard.scenario().frame(id).ok_or_else(|| anyhow!("no frame {}", id))?;
            let mut params = frame.parameters.clone().unwrap_or_default();
            apply_vitals(&mut params, &values)?;
            if let Some(frame) = wizard.scenario_mut().frame_mut(id) {
                frame.parameters = Some(params);
            }
        }
        Command::Link(from, to, trigger) => {
            wizard.scenario_mut().add_transition(from, Transition::new(to, trigger))?
        }
        Command::Unlink(from, to) => {
            if !wizard.scenario_mut().remove_transition(from, to) {
                bail!("no transition {} -> {}", from, to);
            }
        }
        Command::Debrief(model) => wizard
            .scenario_mut()
            .set_debriefing(model.map(DebriefingTemplate::blank)),
        Command::Phase(phase, text) => {
            let scenario = wizard.scenario_mut();
            let template = scenario
                .debriefing
                .as_mut()
                .ok_or_else(|| anyhow!("choose a debriefing model first"))?;
            template.set_phase(&phase, text)?;
            scenario.touch();
        }
        Command::Next => {
            let tab = wizard.next()?;
            println!("Now on {}", tab.display_name());
        }
        Command::Previous => {
            let tab = wizard.previous();
            println!("Now on {}", tab.display_name());
        }
        Command::Go(tab) => {
            wizard.select(tab)?;
        }
        Command::Status => {}
        Command::Review => print_review(wizard),
        Command::Show => println!("{}", serde_json::to_string_pretty(wizard.scenario())?),
        Command::Save => {
            let id = wizard.save_draft(repo)?;
            println!("Draft saved: {}", id);
        }
        Command::Publish => match wizard.publish(repo)? {
            PublishOutcome::Published(id) => println!("Published {}", id),
            PublishOutcome::Blocked(_) => {
                println!("Draft saved, but the scenario cannot be published yet:");
                print_review(wizard);
            }
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(Flow::Stop),
    }
    Ok(Flow::Continue)
}

pub fn print_tab_bar(wizard: &Wizard) {
    let bar: Vec<String> = wizard
        .statuses()
        .iter()
        .map(|(tab, status)| format!("{} {}", status.symbol(), tab.display_name()))
        .collect();
    println!("{}", bar.join("  "));
}

pub fn print_review(wizard: &Wizard) {
    let report = wizard.review();
    for tab in &report.tabs {
        let mark = if tab.is_valid() { "ok" } else { "--" };
        println!("  [{}] {}", mark, tab.tab.display_name());
        for issue in &tab.issues {
            println!("        {}", issue);
        }
    }
    if report.is_publishable() {
        println!("Ready to publish.");
    }
}

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return None;
    }

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

/// Run the prompt loop until `quit` or end of input.
pub fn run<R: ScenarioRepository>(wizard: &mut Wizard, repo: &mut R) -> Result<()> {
    println!("Editing scenario {} (type 'help' for commands)", wizard.scenario().id());
    print_tab_bar(wizard);

    while let Some(line) = prompt_line(&format!("[{}] > ", wizard.active_tab().key())) {
        if line.is_empty() {
            continue;
        }
        let outcome = parse_command(&line).and_then(|command| execute(wizard, repo, command));
        match outcome {
            Ok(Flow::Stop) => break,
            Ok(Flow::Continue) => print_tab_bar(wizard),
            Err(e) => println!("Error: {}", e),
        }
    }

    if wizard.is_dirty() {
        println!("Unsaved changes were discarded (use 'save' to keep them).");
    }
    Ok(())
}
