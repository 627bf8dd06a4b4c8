// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command-line parser for UNIX-like flags and parameters.
//!
//! Declare typed slots before processing: named flags and values, required
//! and optional positional parameters, and one trailing list capturing the
//! rest. [`CommandLineParser::process`] then walks `argv` and returns a
//! positive value when it handled `--help` or `--version` itself, zero on
//! success, and a negative value after reporting an error; `--` terminates
//! option parsing.
//!
//! ```
//! use mcore::cli::CommandLineParser;
//!
//! let mut parser = CommandLineParser::new("lnktest", "1.2");
//! parser.set_description("C12 link tester");
//! parser.declare_flag('s', "save", "Save temporary data");
//! parser.declare_named_int('c', "count", "cnt", "Device count", 1);
//! parser.declare_string("port", "Port to open");
//! let args = ["lnktest", "-c", "3", "COM1"].map(String::from);
//! assert_eq!(parser.process(&args), 0);
//! assert_eq!(parser.int("count"), Some(3));
//! assert_eq!(parser.positional("port"), Some("COM1".to_string()));
//! assert_eq!(parser.flag("save"), Some(false));
//! ```

use crate::error::{MError, MErrorCode, MResult};

/// Width of the help output.
const HELP_OUTPUT_LINE_LENGTH: usize = 80;
/// Column where help descriptions start.
const HELP_OUTPUT_BORDER: usize = 20;

#[derive(Clone, Debug, PartialEq)]
enum SlotValue {
    Flag(bool),
    Bool(bool),
    Int(i32),
    UInt(u32),
    Double(f64),
    Str(String),
}

impl SlotValue {
    fn type_label(&self) -> &'static str {
        match self {
            SlotValue::Flag(_) => "",
            SlotValue::Bool(_) => "bool",
            SlotValue::Int(_) => "int",
            SlotValue::UInt(_) => "uint",
            SlotValue::Double(_) => "number",
            SlotValue::Str(_) => "string",
        }
    }

    fn assign(&mut self, text: &str) -> MResult<()> {
        *self = match self {
            SlotValue::Flag(_) | SlotValue::Bool(_) => SlotValue::Bool(parse_bool(text)?),
            SlotValue::Int(_) => SlotValue::Int(crate::variant::Variant::from(text).as_int()?),
            SlotValue::UInt(_) => SlotValue::UInt(crate::variant::Variant::from(text).as_uint()?),
            SlotValue::Double(_) => {
                SlotValue::Double(crate::variant::Variant::from(text).as_double()?)
            }
            SlotValue::Str(_) => SlotValue::Str(text.to_string()),
        };
        Ok(())
    }
}

fn parse_bool(text: &str) -> MResult<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(MError::software(
            MErrorCode::BadConversion,
            format!("Could not convert '{}' to bool", crate::error::visualize_str(text)),
        )),
    }
}

struct NamedSlot {
    short: char,
    long: String,
    label: String,
    description: String,
    value: SlotValue,
}

struct PositionalSlot {
    label: String,
    description: String,
    /// Declared type, used as the parse shape.
    shape: SlotValue,
    value: Option<SlotValue>,
    default: Option<SlotValue>,
}

/// Typed-slot argv parser.
pub struct CommandLineParser {
    program_name: String,
    version: String,
    description: String,
    copyright: String,
    named: Vec<NamedSlot>,
    positional: Vec<PositionalSlot>,
    /// Label and storage of the trailing catch-all list, when declared.
    trailing: Option<(String, Vec<String>)>,
}

impl CommandLineParser {
    pub fn new(program_name: &str, version: &str) -> Self {
        CommandLineParser {
            program_name: program_name.to_string(),
            version: version.to_string(),
            description: String::new(),
            copyright: String::new(),
            named: Vec::new(),
            positional: Vec::new(),
            trailing: None,
        }
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn set_copyright(&mut self, copyright: &str) {
        self.copyright = copyright.to_string();
    }

    // Named slots -------------------------------------------------------

    /// A presence flag: `-s` or `--save`.
    pub fn declare_flag(&mut self, short: char, long: &str, description: &str) {
        self.named.push(NamedSlot {
            short,
            long: long.to_string(),
            label: String::new(),
            description: description.to_string(),
            value: SlotValue::Flag(false),
        });
    }

    pub fn declare_named_bool(&mut self, short: char, long: &str, label: &str, description: &str, default: bool) {
        self.declare_named(short, long, label, description, SlotValue::Bool(default));
    }

    pub fn declare_named_int(&mut self, short: char, long: &str, label: &str, description: &str, default: i32) {
        self.declare_named(short, long, label, description, SlotValue::Int(default));
    }

    pub fn declare_named_uint(&mut self, short: char, long: &str, label: &str, description: &str, default: u32) {
        self.declare_named(short, long, label, description, SlotValue::UInt(default));
    }

    pub fn declare_named_double(&mut self, short: char, long: &str, label: &str, description: &str, default: f64) {
        self.declare_named(short, long, label, description, SlotValue::Double(default));
    }

    pub fn declare_named_string(&mut self, short: char, long: &str, label: &str, description: &str, default: &str) {
        self.declare_named(short, long, label, description, SlotValue::Str(default.to_string()));
    }

    fn declare_named(&mut self, short: char, long: &str, label: &str, description: &str, value: SlotValue) {
        self.named.push(NamedSlot {
            short,
            long: long.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            value,
        });
    }

    // Positional slots --------------------------------------------------

    pub fn declare_bool(&mut self, label: &str, description: &str) {
        self.declare_positional(label, description, SlotValue::Bool(false), None);
    }

    pub fn declare_int(&mut self, label: &str, description: &str) {
        self.declare_positional(label, description, SlotValue::Int(0), None);
    }

    pub fn declare_uint(&mut self, label: &str, description: &str) {
        self.declare_positional(label, description, SlotValue::UInt(0), None);
    }

    pub fn declare_double(&mut self, label: &str, description: &str) {
        self.declare_positional(label, description, SlotValue::Double(0.0), None);
    }

    pub fn declare_string(&mut self, label: &str, description: &str) {
        self.declare_positional(label, description, SlotValue::Str(String::new()), None);
    }

    pub fn declare_optional_int(&mut self, label: &str, description: &str, default: i32) {
        self.declare_positional(label, description, SlotValue::Int(0), Some(SlotValue::Int(default)));
    }

    pub fn declare_optional_string(&mut self, label: &str, description: &str, default: &str) {
        self.declare_positional(
            label,
            description,
            SlotValue::Str(String::new()),
            Some(SlotValue::Str(default.to_string())),
        );
    }

    fn declare_positional(&mut self, label: &str, description: &str, shape: SlotValue, default: Option<SlotValue>) {
        self.positional.push(PositionalSlot {
            label: label.to_string(),
            description: description.to_string(),
            shape,
            value: None,
            default,
        });
    }

    /// Capture everything after the declared positionals.
    pub fn declare_rest(&mut self, label: &str) {
        self.trailing = Some((label.to_string(), Vec::new()));
    }

    // Results -----------------------------------------------------------

    /// State of a flag or named bool after processing.
    pub fn flag(&self, long: &str) -> Option<bool> {
        match self.named_value(long)? {
            SlotValue::Flag(b) | SlotValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn int(&self, long: &str) -> Option<i32> {
        match self.named_value(long)? {
            SlotValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn uint(&self, long: &str) -> Option<u32> {
        match self.named_value(long)? {
            SlotValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn double(&self, long: &str) -> Option<f64> {
        match self.named_value(long)? {
            SlotValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string(&self, long: &str) -> Option<String> {
        match self.named_value(long)? {
            SlotValue::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// A positional value by its label, rendered as text.
    pub fn positional(&self, label: &str) -> Option<String> {
        let slot = self.positional.iter().find(|s| s.label == label)?;
        let value = slot.value.as_ref().or(slot.default.as_ref())?;
        Some(match value {
            SlotValue::Flag(b) | SlotValue::Bool(b) => i32::from(*b).to_string(),
            SlotValue::Int(v) => v.to_string(),
            SlotValue::UInt(v) => v.to_string(),
            SlotValue::Double(v) => v.to_string(),
            SlotValue::Str(v) => v.clone(),
        })
    }

    /// The trailing catch-all list.
    pub fn rest(&self) -> &[String] {
        self.trailing.as_ref().map_or(&[], |(_, values)| values)
    }

    fn named_value(&self, long: &str) -> Option<&SlotValue> {
        self.named.iter().find(|s| s.long == long).map(|s| &s.value)
    }

    // Processing --------------------------------------------------------

    /// Walk `argv`. Returns a positive value when help or version were
    /// handled, zero on success, and a negative value after reporting an
    /// error to the standard error stream.
    pub fn process(&mut self, argv: &[String]) -> i32 {
        match self.do_process(argv) {
            Ok(handled) => {
                if handled {
                    1
                } else {
                    0
                }
            }
            Err(error) => {
                eprintln!("{}: {}", self.program_name, error.message());
                eprintln!("Try '{} --help' for more information", self.program_name);
                -1
            }
        }
    }

    fn do_process(&mut self, argv: &[String]) -> MResult<bool> {
        if self.program_name.is_empty() {
            if let Some(first) = argv.first() {
                self.program_name = first.clone();
            }
        }
        let mut positional_at = 0usize;
        let mut options_done = false;
        let mut i = 1;
        while i < argv.len() {
            let arg = &argv[i];
            i += 1;
            if !options_done && arg == "--" {
                options_done = true;
                continue;
            }
            if !options_done && arg == "--help" {
                self.print_help();
                return Ok(true);
            }
            if !options_done && arg == "--version" {
                self.print_version();
                return Ok(true);
            }
            if !options_done && arg.starts_with("--") {
                let (name, inline_value) = match arg[2..].split_once('=') {
                    Some((name, value)) => (name.to_string(), Some(value.to_string())),
                    None => (arg[2..].to_string(), None),
                };
                self.assign_named(&name, inline_value, argv, &mut i)?;
                continue;
            }
            if !options_done && arg.len() >= 2 && arg.starts_with('-') && arg != "-" {
                let short = arg.chars().nth(1).expect("length checked");
                let name = self
                    .named
                    .iter()
                    .find(|s| s.short == short)
                    .map(|s| s.long.clone())
                    .ok_or_else(|| unknown_option(arg))?;
                let inline_value = if arg.len() > 2 {
                    Some(arg[2..].trim_start_matches('=').to_string())
                } else {
                    None
                };
                self.assign_named(&name, inline_value, argv, &mut i)?;
                continue;
            }
            // A positional parameter
            if positional_at < self.positional.len() {
                let mut value = self.positional[positional_at].shape.clone();
                value.assign(arg)?;
                self.positional[positional_at].value = Some(value);
                positional_at += 1;
            } else if let Some((_, values)) = self.trailing.as_mut() {
                values.push(arg.clone());
            } else {
                return Err(MError::software(
                    MErrorCode::UnknownItem,
                    format!("Unexpected argument '{}'", arg),
                ));
            }
        }

        // Every required positional must have arrived
        for slot in &self.positional {
            if slot.value.is_none() && slot.default.is_none() {
                return Err(MError::software(
                    MErrorCode::UnknownItem,
                    format!("Required parameter '{}' is missing", slot.label),
                ));
            }
        }
        Ok(false)
    }

    fn assign_named(
        &mut self,
        name: &str,
        inline_value: Option<String>,
        argv: &[String],
        i: &mut usize,
    ) -> MResult<()> {
        let at = self
            .named
            .iter()
            .position(|s| s.long == name)
            .ok_or_else(|| unknown_option(&format!("--{}", name)))?;
        if matches!(self.named[at].value, SlotValue::Flag(_)) {
            if inline_value.is_some() {
                return Err(MError::software(
                    MErrorCode::UnknownItem,
                    format!("Option '--{}' does not take a value", name),
                ));
            }
            self.named[at].value = SlotValue::Flag(true);
            return Ok(());
        }
        let text = match inline_value {
            Some(value) => value,
            None => {
                if *i >= argv.len() {
                    return Err(MError::software(
                        MErrorCode::UnknownItem,
                        format!("Option '--{}' requires a value", name),
                    ));
                }
                let value = argv[*i].clone();
                *i += 1;
                value
            }
        };
        self.named[at].value.assign(&text)
    }

    // Help and version --------------------------------------------------

    fn print_version(&self) {
        println!("{} version {}", self.program_name, self.version);
        if !self.copyright.is_empty() {
            println!("{}", self.copyright);
        }
    }

    fn print_help(&self) {
        if !self.description.is_empty() {
            println!("{}", self.description);
        }
        let mut usage = format!("Usage: {} [options]", self.program_name);
        for slot in &self.positional {
            if slot.default.is_some() {
                usage.push_str(&format!(" [{}]", slot.label));
            } else {
                usage.push_str(&format!(" <{}>", slot.label));
            }
        }
        if let Some((label, _)) = &self.trailing {
            usage.push_str(&format!(" [{}...]", label));
        }
        println!("{}", usage);
        println!("Options:");
        for slot in &self.named {
            let mut line = format!("  -{}, --{}", slot.short, slot.long);
            let label = if slot.label.is_empty() {
                slot.value.type_label()
            } else {
                &slot.label
            };
            if !label.is_empty() {
                line.push_str(&format!(" <{}>", label));
            }
            if line.len() < HELP_OUTPUT_BORDER {
                line.push_str(&" ".repeat(HELP_OUTPUT_BORDER - line.len()));
            } else {
                line.push(' ');
            }
            line.push_str(&slot.description);
            line.truncate(HELP_OUTPUT_LINE_LENGTH);
            println!("{}", line);
        }
        println!("  --help              Print this help and exit");
        println!("  --version           Print the version and exit");
    }
}

#[track_caller]
fn unknown_option(option: &str) -> MError {
    MError::software(
        MErrorCode::UnknownItem,
        format!("Unknown option '{}'", option),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_and_named_values() {
        let mut parser = CommandLineParser::new("reader", "3.0");
        parser.declare_flag('s', "save", "Save temporary data");
        parser.declare_named_int('c', "count", "cnt", "Device count", 1);
        parser.declare_named_string('f', "config", "file", "Configuration file path", "");
        let code = parser.process(&args(&["reader", "-s", "--count", "5", "--config=dev.ini"]));
        assert_eq!(code, 0);
        assert_eq!(parser.flag("save"), Some(true));
        assert_eq!(parser.int("count"), Some(5));
        assert_eq!(parser.string("config"), Some("dev.ini".to_string()));
    }

    #[test]
    fn test_defaults_survive() {
        let mut parser = CommandLineParser::new("reader", "3.0");
        parser.declare_named_int('c', "count", "cnt", "Device count", 7);
        parser.declare_flag('s', "save", "Save");
        assert_eq!(parser.process(&args(&["reader"])), 0);
        assert_eq!(parser.int("count"), Some(7));
        assert_eq!(parser.flag("save"), Some(false));
    }

    #[test]
    fn test_positionals_and_rest() {
        let mut parser = CommandLineParser::new("copy", "1.0");
        parser.declare_string("source", "Source from which to copy");
        parser.declare_string("destination", "Where to copy");
        parser.declare_rest("extras");
        let code = parser.process(&args(&["copy", "a.txt", "b.txt", "x", "y"]));
        assert_eq!(code, 0);
        assert_eq!(parser.positional("source"), Some("a.txt".to_string()));
        assert_eq!(parser.positional("destination"), Some("b.txt".to_string()));
        assert_eq!(parser.rest(), ["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_missing_required_reported() {
        let mut parser = CommandLineParser::new("copy", "1.0");
        parser.declare_string("source", "Source");
        assert!(parser.process(&args(&["copy"])) < 0);
    }

    #[test]
    fn test_unknown_option_reported() {
        let mut parser = CommandLineParser::new("tool", "1.0");
        assert!(parser.process(&args(&["tool", "--bogus"])) < 0);
        assert!(parser.process(&args(&["tool", "-z"])) < 0);
    }

    #[test]
    fn test_help_and_version_handled() {
        let mut parser = CommandLineParser::new("tool", "1.0");
        assert!(parser.process(&args(&["tool", "--help"])) > 0);
        assert!(parser.process(&args(&["tool", "--version"])) > 0);
    }

    #[test]
    fn test_double_dash_terminates_options() {
        let mut parser = CommandLineParser::new("tool", "1.0");
        parser.declare_flag('s', "save", "Save");
        parser.declare_string("name", "A name");
        let code = parser.process(&args(&["tool", "--", "-s"]));
        assert_eq!(code, 0);
        assert_eq!(parser.flag("save"), Some(false));
        assert_eq!(parser.positional("name"), Some("-s".to_string()));
    }

    #[test]
    fn test_bad_value_reported() {
        let mut parser = CommandLineParser::new("tool", "1.0");
        parser.declare_named_int('c', "count", "cnt", "Count", 0);
        assert!(parser.process(&args(&["tool", "--count", "many"])) < 0);
    }
}
