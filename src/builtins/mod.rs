use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use once_cell::sync::Lazy;
use strum::{EnumIter, IntoEnumIterator};

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

pub mod cat;
pub mod cd;
pub mod clear;
pub mod cpu;
pub mod help;
pub mod ls;
pub mod memory;
pub mod mkdir;
pub mod processes;
pub mod pwd;
pub mod rm;

#[async_trait]
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    async fn execute(
        &self,
        session: &mut Session,
        config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError>;
}

/// The registry, in the order `help` and suggestions list it.
#[enum_dispatch]
#[derive(EnumIter)]
pub enum BuiltinCommands {
    Clear(clear::Clear),
    Pwd(pwd::Pwd),
    Ls(ls::Ls),
    Cd(cd::Cd),
    Mkdir(mkdir::Mkdir),
    Rm(rm::Rm),
    Cpu(cpu::Cpu),
    Memory(memory::Memory),
    Processes(processes::Processes),
    Help(help::Help),
    Cat(cat::Cat),
}

pub static BUILTIN_NAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| BuiltinCommands::iter().map(|cmd| cmd.name()).collect());

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }

    pub fn names() -> &'static [&'static str] {
        &BUILTIN_NAMES
    }
}

/// Builtin arguments split into flags and operands. `--` ends flag parsing.
#[derive(Debug, Default)]
pub struct Args<'a> {
    short: Vec<char>,
    long: Vec<&'a str>,
    pub operands: Vec<&'a str>,
}

impl<'a> Args<'a> {
    pub fn parse(args: &'a [String]) -> Self {
        let mut parsed = Self::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            if arg == "--" {
                parsed.operands.extend(args.by_ref().map(String::as_str));
            } else if let Some(name) = arg.strip_prefix("--") {
                parsed.long.push(name);
            } else if arg.len() > 1 && arg.starts_with('-') {
                parsed.short.extend(arg.chars().skip(1));
            } else {
                parsed.operands.push(arg);
            }
        }

        parsed
    }

    pub fn has(&self, short: char) -> bool {
        self.short.contains(&short)
    }

    pub fn has_long(&self, long: &str) -> bool {
        self.long.iter().any(|name| *name == long)
    }

    pub fn require_operands(&self, command: &'static str) -> Result<&[&'a str], ShellError> {
        if self.operands.is_empty() {
            Err(crate::parse::ParseError::MissingOperand { command }.into())
        } else {
            Ok(&self.operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn registry_order_is_stable() {
        assert_eq!(
            BuiltinCommands::names(),
            &[
                "clear",
                "pwd",
                "ls",
                "cd",
                "mkdir",
                "rm",
                "cpu",
                "memory",
                "processes",
                "help",
                "cat"
            ]
        );
    }

    #[test]
    fn lookup_by_name() {
        assert!(BuiltinCommands::from_name("cat").is_some());
        assert!(BuiltinCommands::from_name("echo").is_none());
        assert!(BuiltinCommands::from_name("CAT").is_none());
    }

    #[test]
    fn combined_short_flags_split() {
        let raw = args(&["-rf", "dir", "-l"]);
        let parsed = Args::parse(&raw);

        assert!(parsed.has('r'));
        assert!(parsed.has('f'));
        assert!(parsed.has('l'));
        assert_eq!(parsed.operands, vec!["dir"]);
    }

    #[test]
    fn double_dash_ends_flags() {
        let raw = args(&["--recursive", "--", "-weird"]);
        let parsed = Args::parse(&raw);

        assert!(parsed.has_long("recursive"));
        assert_eq!(parsed.operands, vec!["-weird"]);
    }

    #[test]
    fn lone_dash_is_an_operand() {
        let raw = args(&["-"]);
        assert_eq!(Args::parse(&raw).operands, vec!["-"]);
    }
}
