//! Interactive merge session
//!
//! The shell owns the session's only `FileCollection`. Each input line is
//! parsed into a `ShellCommand` and applied immediately; positions are
//! 1-based on screen and resolved against the collection as it is when the
//! command runs.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use pdfmerge_core::{
    merge_collection, FileCollection, MergeConfig, MergeError, MergeExecutor,
    EMPTY_COLLECTION_NOTICE, MERGE_FAILED_NOTICE,
};
use tracing::{debug, error};

use crate::commands::{add_paths, describe_skipped, write_merged};

const PROMPT: &str = "pdfmerge> ";

const HELP: &str = "\
Commands:
  add <path>...        add PDF files (quote paths containing spaces)
  list                 show files in merge order
  remove <pos>         remove the file at a position
  move <from> <to>     move a file to a new position
  name [base]          set the output name (blank resets to the default)
  merge                merge and write the output file
  clear                remove every file
  help                 show this help
  quit                 leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(Vec<PathBuf>),
    List,
    /// Zero-based index (typed as a 1-based position)
    Remove(usize),
    /// Zero-based indices (typed as 1-based positions)
    Move(usize, usize),
    Name(Option<String>),
    Merge,
    Clear,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let words = split_words(line)?;
        let Some((verb, rest)) = words.split_first() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => {
                if rest.is_empty() {
                    return Err("usage: add <path>...".to_string());
                }
                ShellCommand::Add(rest.iter().map(PathBuf::from).collect())
            }
            "list" | "ls" => ShellCommand::List,
            "remove" | "rm" => match rest {
                [pos] => ShellCommand::Remove(parse_position(pos)?),
                _ => return Err("usage: remove <pos>".to_string()),
            },
            "move" | "mv" => match rest {
                [from, to] => ShellCommand::Move(parse_position(from)?, parse_position(to)?),
                _ => return Err("usage: move <from> <to>".to_string()),
            },
            "name" => ShellCommand::Name(Some(rest.join(" ")).filter(|n| !n.trim().is_empty())),
            "merge" => ShellCommand::Merge,
            "clear" => ShellCommand::Clear,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        };

        Ok(Some(command))
    }
}

/// 1-based position on screen to zero-based index
fn parse_position(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("'{}' is not a position (positions start at 1)", word)),
        Ok(pos) => Ok(pos - 1),
    }
}

/// Whitespace-separated words; double quotes group a word containing spaces
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

/// Whether the loop keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a, E: MergeExecutor + ?Sized> {
    collection: FileCollection,
    config: MergeConfig,
    executor: &'a E,
    output_name: Option<String>,
}

impl<'a, E: MergeExecutor + ?Sized> Shell<'a, E> {
    pub fn new(config: MergeConfig, executor: &'a E) -> Self {
        Self {
            collection: config.new_collection(),
            config,
            executor,
            output_name: None,
        }
    }

    pub fn collection(&self) -> &FileCollection {
        &self.collection
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match ShellCommand::parse(&line) {
                Ok(Some(command)) => {
                    if self.execute(command, out)? == Flow::Quit {
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{}", e)?,
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        writeln!(out)?;
        Ok(())
    }

    /// Apply one command; user mistakes print a notice and keep the session
    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> anyhow::Result<Flow> {
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::Add(paths) => {
                let report = add_paths(&mut self.collection, &paths);
                for line in describe_skipped(&report) {
                    writeln!(out, "{}", line)?;
                }
                writeln!(
                    out,
                    "Added {} file(s); {} in total",
                    report.added.len(),
                    self.collection.len()
                )?;
            }
            ShellCommand::List => self.list(out)?,
            ShellCommand::Remove(index) => match self.collection.remove_at(index) {
                Ok(entry) => writeln!(out, "Removed {}", entry.name())?,
                Err(e) => self.notice(out, &e)?,
            },
            ShellCommand::Move(from, to) => match self.collection.move_to(from, to) {
                Ok(()) => self.list(out)?,
                Err(e) => self.notice(out, &e)?,
            },
            ShellCommand::Name(name) => {
                self.output_name = name;
                writeln!(
                    out,
                    "Output will be {}",
                    self.config.output_filename(self.output_name.as_deref())
                )?;
            }
            ShellCommand::Merge => self.merge(out)?,
            ShellCommand::Clear => {
                self.collection.clear();
                writeln!(out, "Cleared")?;
            }
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        if self.collection.is_empty() {
            writeln!(out, "No files selected")?;
            return Ok(());
        }
        for summary in self.collection.summaries() {
            writeln!(
                out,
                "{:>3}. {} ({} bytes)",
                summary.position + 1,
                summary.name,
                summary.size_bytes
            )?;
        }
        Ok(())
    }

    fn merge<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let merged = match merge_collection(&self.collection, self.executor) {
            Ok(merged) => merged,
            Err(MergeError::EmptyCollection) => {
                writeln!(out, "{}", EMPTY_COLLECTION_NOTICE)?;
                return Ok(());
            }
            Err(e) => {
                debug!("Merge failed, collection kept: {}", e);
                writeln!(out, "{}", MERGE_FAILED_NOTICE)?;
                return Ok(());
            }
        };

        match write_merged(&self.config, self.output_name.as_deref(), &merged) {
            Ok(path) => writeln!(
                out,
                "Wrote {} ({} files, {} bytes)",
                path.display(),
                merged.source_count(),
                merged.size_bytes()
            )?,
            Err(e) => {
                error!("{:#}", e);
                writeln!(out, "Could not save the merged file: {:#}", e)?;
            }
        }
        Ok(())
    }

    fn notice<W: Write>(&self, out: &mut W, err: &MergeError) -> anyhow::Result<()> {
        debug!("Rejected: {}", err);
        match err {
            MergeError::IndexOutOfRange { index, len } => writeln!(
                out,
                "No file at position {} ({} selected)",
                index + 1,
                len
            )?,
            other => writeln!(out, "{}", other)?,
        }
        Ok(())
    }
}
