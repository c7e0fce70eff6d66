//! Command descriptions, usage and help text

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Analyze,
    Modify,
    List,
    Help,
    Undo,
    Save,
    Preview,
    Generate,
    Apply,
    Explain,
}

#[derive(Debug)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub command: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub examples: &'static [&'static str],
}

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::Analyze,
        command: "/analyze",
        description: "Analyze the current file or a specific file/directory",
        usage: "/analyze [path] [-d for deep analysis]",
        examples: &["/analyze", "/analyze ./components -d", "/analyze utils/helpers.ts"],
    },
    CommandSpec {
        kind: CommandKind::Modify,
        command: "/modify",
        description: "Modify the current file or create a new one",
        usage: "/modify [path] [-c to create new]",
        examples: &[
            "/modify",
            "/modify components/new-component.tsx -c",
            "/modify utils/helpers.ts",
        ],
    },
    CommandSpec {
        kind: CommandKind::List,
        command: "/list",
        description: "List files in the current directory or specified path",
        usage: "/list [path] [-r for recursive]",
        examples: &["/list", "/list components -r", "/list utils"],
    },
    CommandSpec {
        kind: CommandKind::Help,
        command: "/help",
        description: "Show available commands and their usage",
        usage: "/help [command]",
        examples: &["/help", "/help analyze", "/help modify"],
    },
    CommandSpec {
        kind: CommandKind::Undo,
        command: "/undo",
        description: "Undo the last modification",
        usage: "/undo",
        examples: &["/undo"],
    },
    CommandSpec {
        kind: CommandKind::Save,
        command: "/save",
        description: "Save current changes",
        usage: "/save [message]",
        examples: &["/save", "/save \"Updated component styling\""],
    },
    CommandSpec {
        kind: CommandKind::Preview,
        command: "/preview",
        description: "Preview changes before applying them",
        usage: "/preview",
        examples: &["/preview"],
    },
    CommandSpec {
        kind: CommandKind::Generate,
        command: "/generate",
        description: "Generate new code based on a description",
        usage: "/generate [type] [description]",
        examples: &[
            "/generate component \"A button with loading state\"",
            "/generate hook \"useWindowSize hook to track window dimensions\"",
            "/generate util \"Function to format date strings\"",
        ],
    },
    CommandSpec {
        kind: CommandKind::Apply,
        command: "/apply",
        description: "Apply generated or modified code to the editor",
        usage: "/apply [target] [-r to replace entire file]",
        examples: &["/apply", "/apply -r", "/apply cursor"],
    },
    CommandSpec {
        kind: CommandKind::Explain,
        command: "/explain",
        description: "Get an explanation of the current code or generated code",
        usage: "/explain [target]",
        examples: &["/explain", "/explain generated", "/explain function"],
    },
];

const GROUPS: &[(&str, &[CommandKind])] = &[
    (
        "File Operations",
        &[CommandKind::Analyze, CommandKind::Modify, CommandKind::List],
    ),
    (
        "Code Generation",
        &[CommandKind::Generate, CommandKind::Apply, CommandKind::Explain],
    ),
    (
        "Changes",
        &[CommandKind::Preview, CommandKind::Save, CommandKind::Undo],
    ),
    ("Help", &[CommandKind::Help]),
];

/// Look up a command by name, with or without the leading `/`
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    let name = name.trim().to_lowercase();
    let name = name.strip_prefix('/').unwrap_or(&name);
    COMMANDS.iter().find(|c| &c.command[1..] == name)
}

fn spec(kind: CommandKind) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.kind == kind)
}

impl CommandSpec {
    /// Single-command help
    pub fn describe(&self) -> String {
        let examples: Vec<String> = self.examples.iter().map(|e| format!("  {e}")).collect();
        format!(
            "Command: {}\nDescription: {}\nUsage: {}\nExamples:\n{}",
            self.command,
            self.description,
            self.usage,
            examples.join("\n")
        )
    }
}

/// Grouped command listing; `detailed` adds usage and examples as markdown
pub fn instructions(detailed: bool) -> String {
    let mut lines = vec![if detailed {
        "# AI Code Editor Commands\n".to_string()
    } else {
        "Available commands:".to_string()
    }];

    for (group, kinds) in GROUPS {
        lines.push(if detailed {
            format!("\n## {group}\n")
        } else {
            format!("\n{group}:")
        });

        for cmd in kinds.iter().filter_map(|k| spec(*k)) {
            if detailed {
                lines.push(format!("### {}", cmd.command));
                lines.push(cmd.description.to_string());
                lines.push(format!("\nUsage: `{}`", cmd.usage));
                lines.push("\nExamples:".to_string());
                lines.extend(cmd.examples.iter().map(|e| format!("- `{e}`")));
                lines.push("\n".to_string());
            } else {
                lines.push(format!("- {} - {}", cmd.command, cmd.description));
            }
        }
    }
    lines.join("\n")
}
