use std::collections::HashMap;
use std::env;
use std::fmt::Write as _;

use log::info;
use serde::Serialize;

use crate::classdef::{parse_universe, resolve, ResolvedUniverse};
use crate::error::LoadError;
use crate::loadout::Loadout;
use crate::parallel::{instantiate_units, WorkerPool};
use crate::rng::Rng;
use crate::settings::{load_settings, EngineSettings, DEFAULT_SETTINGS_PATH, SETTINGS_PATH_ENV};
use crate::source::load_universe_file;
use crate::validate::{validate_universe, ValidationSeverity};

const USAGE: &str = "usage: loadout <resolve|instantiate|check|classes> <file> [args]";

/// Largest batch `instantiate` accepts in one run.
pub const MAX_UNITS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Resolve,
    Instantiate,
    Check,
    Classes,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("resolve") => Some(Command::Resolve),
        Some("instantiate") => Some(Command::Instantiate),
        Some("check") => Some(Command::Check),
        Some("classes") => Some(Command::Classes),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let Some(path) = args.get(2) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let settings = match load_engine_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("settings error: {err}");
            return 1;
        }
    };

    match command {
        Command::Resolve => handle_resolve(path, &settings),
        Command::Instantiate => handle_instantiate(path, args, &settings),
        Command::Check => handle_check(path, &settings),
        Command::Classes => handle_classes(path, &settings),
    }
}

fn load_engine_settings() -> Result<EngineSettings, LoadError> {
    let path = env::var(SETTINGS_PATH_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    load_settings(path)
}

fn load_resolved(path: &str, settings: &EngineSettings) -> Result<ResolvedUniverse, LoadError> {
    let text = load_universe_file(path)?;
    let universe = parse_universe(&text, &settings.parse)?;
    let resolved = resolve(&universe)?;
    info!("resolved {} class(es) from '{path}'", resolved.len());
    Ok(resolved)
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn handle_resolve(path: &str, settings: &EngineSettings) -> i32 {
    match load_resolved(path, settings) {
        Ok(universe) => print_json(&universe.table()),
        Err(err) => {
            eprintln!("resolve failed: {err}");
            1
        }
    }
}

#[derive(Serialize)]
struct InstantiateOutput<'a> {
    class: &'a str,
    seed: u64,
    units: Vec<Loadout>,
}

fn handle_instantiate(path: &str, args: &[String], settings: &EngineSettings) -> i32 {
    let Some(class_name) = args.get(3) else {
        eprintln!("usage: loadout instantiate <file> <class> [count] [seed]");
        return 2;
    };
    let count = parse_usize_arg(args.get(4), "count", 1);
    if count > MAX_UNITS {
        eprintln!("count {count} exceeds the maximum of {MAX_UNITS} units");
        return 2;
    }
    let seed = match args.get(5) {
        Some(raw) => parse_u64_arg(Some(raw), "seed", 0),
        None => match Rng::entropy_seed() {
            Ok(seed) => seed,
            Err(err) => {
                eprintln!("failed to seed random source: {err}");
                return 1;
            }
        },
    };

    let universe = match load_resolved(path, settings) {
        Ok(universe) => universe,
        Err(err) => {
            eprintln!("resolve failed: {err}");
            return 1;
        }
    };
    let Some(class) = universe.get(class_name) else {
        eprintln!("unknown class '{class_name}'");
        return 1;
    };

    let pool = WorkerPool::with_workers(settings.workers);
    let units = instantiate_units(class, count, seed, &settings.loadout, &pool);
    print_json(&InstantiateOutput {
        class: &class.name,
        seed,
        units,
    })
}

fn handle_check(path: &str, settings: &EngineSettings) -> i32 {
    let universe = match load_resolved(path, settings) {
        Ok(universe) => universe,
        Err(err) => {
            eprintln!("check failed: {err}");
            return 1;
        }
    };
    let report = validate_universe(&universe, &settings.loadout);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!(
            "check failed: {} error(s), {} warning(s)",
            report.count(ValidationSeverity::Error),
            report.count(ValidationSeverity::Warning)
        );
        1
    } else {
        println!(
            "check passed: {} class(es), {} warning(s)",
            universe.len(),
            report.count(ValidationSeverity::Warning)
        );
        0
    }
}

fn handle_classes(path: &str, settings: &EngineSettings) -> i32 {
    let universe = match load_resolved(path, settings) {
        Ok(universe) => universe,
        Err(err) => {
            eprintln!("classes failed: {err}");
            return 1;
        }
    };
    print!("{}", render_tree(&universe));
    0
}

/// Indented inheritance tree, roots first, children in declaration order.
pub fn render_tree(universe: &ResolvedUniverse) -> String {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots = Vec::new();
    for class in universe.iter() {
        match class.parent() {
            Some(parent) => children.entry(parent).or_default().push(&class.name),
            None => roots.push(class.name.as_str()),
        }
    }

    let mut out = String::new();
    let mut stack: Vec<(&str, usize)> = roots.into_iter().rev().map(|r| (r, 0)).collect();
    while let Some((name, depth)) = stack.pop() {
        let display = universe.get(name).map(|c| c.display_name()).unwrap_or("");
        let _ = if display.is_empty() {
            writeln!(out, "{}{name}", "  ".repeat(depth))
        } else {
            writeln!(out, "{}{name} ({display})", "  ".repeat(depth))
        };
        if let Some(kids) = children.get(name) {
            stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
        }
    }
    out
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classdef::resolve_text;
    use crate::settings::ParseSettings;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_command_recognises_subcommands() {
        assert_eq!(parse_command(&args(&["loadout", "resolve"])), Some(Command::Resolve));
        assert_eq!(
            parse_command(&args(&["loadout", "instantiate"])),
            Some(Command::Instantiate)
        );
        assert_eq!(parse_command(&args(&["loadout", "serve"])), None);
        assert_eq!(parse_command(&args(&["loadout"])), None);
    }

    #[test]
    fn tree_nests_children_under_parents() {
        let universe = resolve_text(
            r#"
            class baseMan { displayName = "Unarmed"; };
            class rm : baseMan { displayName = "Rifleman"; };
            class ar : rm {};
            class medic : baseMan {};
            "#,
            &ParseSettings::default(),
        )
        .unwrap();
        assert_eq!(
            render_tree(&universe),
            "baseMan (Unarmed)\n  rm (Rifleman)\n    ar (Rifleman)\n  medic (Unarmed)\n"
        );
    }

    #[test]
    fn invalid_numeric_args_fall_back_to_defaults() {
        let bad = "many".to_string();
        assert_eq!(parse_usize_arg(Some(&bad), "count", 1), 1);
        assert_eq!(parse_usize_arg(None, "count", 3), 3);
        let seed = "17".to_string();
        assert_eq!(parse_u64_arg(Some(&seed), "seed", 0), 17);
    }
}
