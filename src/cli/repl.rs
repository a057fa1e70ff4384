//! Interactive shell
//!
//! One command per line: a command word followed by arguments. Arguments are
//! split on whitespace; single or double quotes group words into one argument.
//! Title arguments are re-joined with single spaces, so `search User Interface`
//! and `search "User Interface"` are equivalent.

use tracing::{debug, instrument};

use crate::application::services::{MindMapManager, Outcome};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::infrastructure::traits::{LineReader, ReadOutcome};
use crate::infrastructure::InfraError;

pub const PROMPT: &str = "mindmap> ";

const NO_ACTIVE_MAP: &str = "No active mind map. Create or load a map first.";

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplControl {
    Continue,
    Exit,
}

pub struct Repl<R: LineReader> {
    manager: MindMapManager,
    reader: R,
    confirm_delete: bool,
}

impl<R: LineReader> Repl<R> {
    pub fn new(manager: MindMapManager, reader: R) -> Self {
        Self {
            manager,
            reader,
            confirm_delete: true,
        }
    }

    pub fn with_confirm_delete(mut self, confirm: bool) -> Self {
        self.confirm_delete = confirm;
        self
    }

    pub fn manager(&self) -> &MindMapManager {
        &self.manager
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Run until `exit`, Ctrl-C or end of input.
    pub fn run(&mut self) -> CliResult<()> {
        output::header("MindMap CLI - Type 'help' for available commands");

        loop {
            let raw = match self
                .reader
                .read_line(PROMPT)
                .map_err(|e| InfraError::io("read command", e))?
            {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted | ReadOutcome::Eof => {
                    output::info("Exiting...");
                    break;
                }
            };

            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            self.reader.add_history(line);

            match self.dispatch(line) {
                Ok(ReplControl::Continue) => {}
                Ok(ReplControl::Exit) => {
                    output::info("Goodbye!");
                    break;
                }
                Err(e) => output::error(&e),
            }
        }

        self.reader
            .close()
            .map_err(|e| InfraError::io("save history", e))?;
        Ok(())
    }

    /// Execute one command line.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, line: &str) -> CliResult<ReplControl> {
        let tokens = tokenize_line(line)?;
        let Some((cmd, args)) = tokens.split_first() else {
            return Ok(ReplControl::Continue);
        };
        let cmd = cmd.to_lowercase();
        debug!("command={} args={:?}", cmd, args);

        match cmd.as_str() {
            "create" => self.create(args)?,
            "load" => self.load(args)?,
            "save" => self.save(args),
            "list" => self.list()?,
            "display" => self.display(),
            "add" => self.add(args)?,
            "delete" => self.delete(args)?,
            "rename" => self.rename(args)?,
            "search" => self.search(args)?,
            "info" => self.info(),
            "help" => print_help(),
            "exit" | "quit" => return Ok(ReplControl::Exit),
            other => {
                return Err(CliError::Usage(format!(
                    "Unknown command: '{other}'. Type 'help' for available commands."
                )))
            }
        }
        Ok(ReplControl::Continue)
    }

    /// Ask a follow-up question; `None` when the user aborts.
    fn ask(&mut self, prompt: &str) -> CliResult<Option<String>> {
        match self
            .reader
            .read_line(prompt)
            .map_err(|e| InfraError::io("read answer", e))?
        {
            ReadOutcome::Line(answer) => Ok(Some(answer.trim().to_string())),
            ReadOutcome::Interrupted | ReadOutcome::Eof => Ok(None),
        }
    }

    /// Title from the arguments, or asked for interactively.
    fn title_arg(&mut self, args: &[String], prompt: &str) -> CliResult<Option<String>> {
        if !args.is_empty() {
            return Ok(Some(args.join(" ")));
        }
        Ok(self.ask(prompt)?.filter(|t| !t.is_empty()))
    }

    fn has_active_map(&self) -> bool {
        if self.manager.current_map().is_none() {
            output::warning(NO_ACTIVE_MAP);
            return false;
        }
        true
    }

    fn create(&mut self, args: &[String]) -> CliResult<()> {
        let Some(title) = self.title_arg(args, "Enter mind map title: ")? else {
            return Err(CliError::Usage("Map title cannot be empty".into()));
        };

        let custom = self
            .ask(&format!(
                "Use custom root node title? (default: '{title}') [y/N]: "
            ))?
            .unwrap_or_default();
        let root_title = if is_yes(&custom) {
            let root = self.ask("Enter root node title: ")?.filter(|t| !t.is_empty());
            if root.is_none() {
                output::info("Using map title as root node title");
            }
            root
        } else {
            None
        };

        report(self.manager.create_map(&title, root_title.as_deref()));
        Ok(())
    }

    fn load(&mut self, args: &[String]) -> CliResult<()> {
        if args.is_empty() {
            return Err(CliError::Usage("Usage: load <name>".into()));
        }
        report(self.manager.load_map(&args.join(" ")));
        Ok(())
    }

    fn save(&mut self, args: &[String]) {
        let name = (!args.is_empty()).then(|| args.join(" "));
        report(self.manager.save_map(name.as_deref()));
    }

    fn list(&self) -> CliResult<()> {
        let mut names = self.manager.list_maps()?;
        if names.is_empty() {
            output::info("No mind maps found");
            return Ok(());
        }
        names.sort();
        output::header("Available mind maps:");
        for name in names {
            output::info(&format!("- {name}"));
        }
        Ok(())
    }

    fn display(&self) {
        match self.manager.display_map() {
            Some(outline) => {
                output::header("Map structure:");
                output::info(&outline);
            }
            None => output::warning(NO_ACTIVE_MAP),
        }
    }

    fn add(&mut self, args: &[String]) -> CliResult<()> {
        if !self.has_active_map() {
            return Ok(());
        }
        let (parent, title) = match args {
            [] => {
                let parent = self.ask("Enter parent node title (or 'root'): ")?;
                let title = self.ask("Enter new node title: ")?;
                (parent, title)
            }
            [parent] => (Some(parent.clone()), self.ask("Enter new node title: ")?),
            [parent, rest @ ..] => (Some(parent.clone()), Some(rest.join(" "))),
        };
        let (Some(parent), Some(title)) = (parent, title) else {
            output::info("Cancelled");
            return Ok(());
        };
        report(self.manager.add_node(&parent, &title));
        Ok(())
    }

    fn delete(&mut self, args: &[String]) -> CliResult<()> {
        if !self.has_active_map() {
            return Ok(());
        }
        let Some(title) = self.title_arg(args, "Enter the title of the node to delete: ")? else {
            return Err(CliError::Usage("Node title cannot be empty".into()));
        };

        if self.confirm_delete {
            let answer = self
                .ask(&format!("Are you sure you want to delete '{title}'? [y/N]: "))?
                .unwrap_or_default();
            if !is_yes(&answer) {
                output::info("Deletion cancelled");
                return Ok(());
            }
        }
        report(self.manager.delete_node(&title));
        Ok(())
    }

    fn rename(&mut self, args: &[String]) -> CliResult<()> {
        if !self.has_active_map() {
            return Ok(());
        }
        let [old, rest @ ..] = args else {
            return Err(CliError::Usage("Usage: rename <title> <new title>".into()));
        };
        if rest.is_empty() {
            return Err(CliError::Usage("Usage: rename <title> <new title>".into()));
        }
        report(self.manager.rename_node(old, &rest.join(" ")));
        Ok(())
    }

    fn search(&mut self, args: &[String]) -> CliResult<()> {
        if !self.has_active_map() {
            return Ok(());
        }
        let Some(title) = self.title_arg(args, "Enter the title of the node to search: ")? else {
            return Err(CliError::Usage("Node title cannot be empty".into()));
        };

        let found = self.manager.search_node(&title).and_then(|id| {
            let map = self.manager.current_map()?;
            let node = map.node(id)?;
            Some((map.get_path(id), node.level()))
        });
        match found {
            Some((path, level)) => {
                output::success(&format!("Node '{title}' found"));
                output::action("Path", &path.join(" > "));
                output::action("Level", &level);
            }
            None => output::failure(&format!("Node '{title}' not found")),
        }
        Ok(())
    }

    fn info(&self) {
        match self.manager.map_info() {
            Some(info) => {
                output::header(&format!("Mind Map: {}", info.title));
                output::detail(&format!("Root Node: {}", info.root_title));
                output::detail(&format!("Nodes: {}", info.node_count));
                output::detail(&format!("Maximum depth: {}", info.max_depth));
            }
            None => output::warning(NO_ACTIVE_MAP),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    answer.to_lowercase().starts_with('y')
}

fn report(outcome: Outcome) {
    if outcome.succeeded {
        output::success(&outcome.message);
    } else {
        output::failure(&outcome.message);
    }
}

fn print_help() {
    output::header("Available commands:");
    for (usage, what) in [
        ("create [title]", "Create a new mind map, optionally with a custom root"),
        ("load <name>", "Load a saved mind map"),
        ("save [name]", "Save the current mind map"),
        ("list", "List saved mind maps"),
        ("display", "Display the current mind map"),
        ("add [parent] [title]", "Add a node under parent ('root' for the root)"),
        ("delete [title]", "Delete a node and its subtree"),
        ("rename <title> <new title>", "Rename a node"),
        ("search [title]", "Show path and level of a node"),
        ("info", "Show statistics of the current map"),
        ("help", "Show this help message"),
        ("exit", "Exit the application"),
    ] {
        output::detail(&format!("{usage:<28} - {what}"));
    }
}

/// Split a command line into words, honouring quotes at the start of a word.
///
/// An apostrophe inside a word (`Bob's`) is kept literally.
pub fn tokenize_line(line: &str) -> CliResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if !in_token && (c == '"' || c == '\'') => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CliError::Usage(format!("unbalanced quote in: {line}")));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
