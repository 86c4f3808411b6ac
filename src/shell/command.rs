//! Command line parsing

use crate::alerts::AlertMetric;

use super::error::ShellError;

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch every registered device, or the one with this label
    Fetch { label: Option<String> },

    Add { address: String, label: String },

    Remove { address: String },

    List,

    /// Interactive: prompts for a device and the metrics to plot
    Chart,

    /// Interactive: prompts for a device and prints its full reading
    Stats,

    SetAlert { metric: AlertMetric, value: String },

    Alerts,

    /// Scan the given prefixes, or the configured ones when empty
    Autofind { ranges: Vec<String> },

    Help { topic: Option<String> },

    Quit,

    /// Blank line
    Empty,
}

pub struct CommandHelp {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "fetch",
        usage: "fetch [hostname]",
        summary: "Fetch and display data from all miners or a specific one",
    },
    CommandHelp {
        name: "add",
        usage: "add <IP_ADDRESS> <HOSTNAME>",
        summary: "Add a miner to the list",
    },
    CommandHelp {
        name: "remove",
        usage: "remove <IP_ADDRESS>",
        summary: "Remove a miner from the list",
    },
    CommandHelp {
        name: "list",
        usage: "list",
        summary: "List all miners",
    },
    CommandHelp {
        name: "chart",
        usage: "chart",
        summary: "Live charts for power, voltage, hash rate, temperature and/or shares",
    },
    CommandHelp {
        name: "stats",
        usage: "stats",
        summary: "Display the full API output for a selected miner",
    },
    CommandHelp {
        name: "set_alert",
        usage: "set_alert <metric> <value>",
        summary: "Set an alert threshold (hashRate, fanSpeed, bestShare)",
    },
    CommandHelp {
        name: "alerts",
        usage: "alerts",
        summary: "Show the configured alert thresholds",
    },
    CommandHelp {
        name: "autofind",
        usage: "autofind [prefix...]",
        summary: "Scan address ranges and add every miner that answers",
    },
    CommandHelp {
        name: "help",
        usage: "help [command]",
        summary: "List commands, or show usage for one",
    },
    CommandHelp {
        name: "quit",
        usage: "quit",
        summary: "Quit the shell",
    },
];

pub fn help_for(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, ShellError> {
        let mut words = line.split_whitespace();

        let Some(name) = words.next() else {
            return Ok(Command::Empty);
        };
        let args: Vec<&str> = words.collect();

        let command = match name {
            "fetch" => Command::Fetch {
                label: args.first().map(|label| label.to_string()),
            },

            "add" => match args.as_slice() {
                [address, label] => Command::Add {
                    address: address.to_string(),
                    label: label.to_string(),
                },
                _ => return Err(ShellError::Usage("add <IP_ADDRESS> <HOSTNAME>")),
            },

            "remove" => match args.as_slice() {
                [address] => Command::Remove {
                    address: address.to_string(),
                },
                _ => return Err(ShellError::Usage("remove <IP_ADDRESS>")),
            },

            "list" => Command::List,
            "chart" => Command::Chart,
            "stats" => Command::Stats,
            "alerts" => Command::Alerts,

            "set_alert" => match args.as_slice() {
                [metric, value] => Command::SetAlert {
                    metric: metric.parse()?,
                    value: value.to_string(),
                },
                _ => return Err(ShellError::Usage("set_alert <metric> <value>")),
            },

            "autofind" => Command::Autofind {
                ranges: args.iter().map(|range| range.to_string()).collect(),
            },

            "help" | "?" => Command::Help {
                topic: args.first().map(|topic| topic.to_string()),
            },

            "quit" | "exit" => Command::Quit,

            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}
