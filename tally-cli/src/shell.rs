//! Interactive line-oriented session.
//!
//! Stdin lines and interpreter results are multiplexed on one task, so the
//! [`Session`] is only ever touched from here. A `parse` hands the text to the
//! worker and returns immediately; the prompt shows the busy flag until the
//! result comes back, and a second `parse` is refused meanwhile.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tally_core::draft::DATE_FORMAT;
use tally_core::{
    Category, DraftField, Filter, Saved, Session, SessionError, Sort, SortField, SortOrder, Status,
    TransactionType,
};
use tally_export::ExportFormat;
use tally_interpret::Interpreter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::DisplaySection;
use crate::render;
use crate::time::Clock;
use crate::worker::{self, InterpretEvent, InterpretRequest};

#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Show available commands
    Help,
    /// List the current view
    #[command(alias = "ls")]
    List,
    /// Totals over the current view
    Summary,
    /// Show one transaction in full
    Show { id: String },
    /// Start a blank entry
    New,
    /// Load a transaction into the entry form
    Edit { id: String },
    /// Set a field on the entry form
    Set {
        field: String,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Clear a field on the entry form
    Unset { field: String },
    /// Show the entry form
    Draft,
    /// Validate and save the entry form
    Save,
    /// Discard the entry form
    Cancel,
    /// Fill the entry form from free text
    Parse {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Delete a transaction
    #[command(alias = "rm")]
    Delete { id: String },
    /// Narrow the view: search|type|category|status|from|to <value>, or `filter clear`
    Filter {
        field: Option<String>,
        #[arg(allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Order the view by a field
    Sort { field: String, order: Option<String> },
    /// Write the current view to a file
    Export { format: String, path: PathBuf },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// What the caller should do after a line was handled.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Interpret(InterpretRequest),
    Quit,
}

pub struct Shell<W: Write> {
    session: Session,
    display: DisplaySection,
    out: W,
    pending: Option<u64>,
    next_request_id: u64,
    clock: Clock,
}

impl<W: Write> Shell<W> {
    /// A shell whose date stays at the session's current `today`.
    pub fn new(session: Session, display: DisplaySection, out: W) -> Self {
        let today = session.today();
        Self {
            session,
            display,
            out,
            pending: None,
            next_request_id: 1,
            clock: Box::new(move || today),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    fn say(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    pub fn print_prompt(&mut self) {
        let prompt = if self.session.is_interpreting() {
            "tally (interpreting...)> "
        } else if self.session.draft().is_editing() {
            "tally (editing)> "
        } else {
            "tally> "
        };
        self.say(prompt);
        let _ = self.out.flush();
    }

    pub fn greet(&mut self) {
        self.say("Tally personal finance tracker. Type `help` for commands.\n");
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        self.session.set_today((self.clock)());
        match self.dispatch(line) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!(error = %e, "shell command failed");
                self.say(&format!("error: {e:#}\n"));
                Flow::Continue
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let tokens = tokenize(line)?;
        let cmd = match ShellLine::try_parse_from(&tokens) {
            Ok(l) => l.command,
            Err(e) => {
                // clap renders usage errors and --help itself
                self.say(&e.render().to_string());
                return Ok(Flow::Continue);
            }
        };

        let symbol = self.display.currency_symbol.clone();
        match cmd {
            ShellCommand::Help => {
                let help = help_text();
                self.say(&help);
            }
            ShellCommand::List => {
                let view = self.session.view();
                let text = render::criteria(self.session.filter(), self.session.sort())
                    + &render::table(&view, &symbol);
                self.say(&text);
            }
            ShellCommand::Summary => {
                let text = render::summary(&self.session.summary(), &symbol);
                self.say(&text);
            }
            ShellCommand::Show { id } => {
                let t = self.session.store().resolve(&id)?;
                let text = render::detail(t, &symbol);
                self.say(&text);
            }
            ShellCommand::New => {
                self.session.new_draft();
                let text = render::draft(self.session.draft(), &symbol);
                self.say(&text);
            }
            ShellCommand::Edit { id } => {
                let d = self.session.edit(&id)?;
                let text = render::draft(d, &symbol);
                self.say(&text);
            }
            ShellCommand::Set { field, value } => {
                let field: DraftField = field.parse()?;
                self.session.draft_mut().set(field, &value.join(" "))?;
                let text = render::draft(self.session.draft(), &symbol);
                self.say(&text);
            }
            ShellCommand::Unset { field } => {
                let field: DraftField = field.parse()?;
                self.session.draft_mut().clear(field);
                let text = render::draft(self.session.draft(), &symbol);
                self.say(&text);
            }
            ShellCommand::Draft => {
                let text = render::draft(self.session.draft(), &symbol);
                self.say(&text);
            }
            ShellCommand::Save => {
                let saved = self.session.submit_draft()?;
                let msg = match saved {
                    Saved::Added(t) => format!("Added {}\n", t.id()),
                    Saved::Updated(t) => format!("Updated {}\n", t.id()),
                };
                self.say(&msg);
            }
            ShellCommand::Cancel => {
                self.session.new_draft();
                self.say("Entry discarded.\n");
            }
            ShellCommand::Parse { .. } => return self.start_parse(raw_rest(line)),
            ShellCommand::Delete { id } => {
                let removed = self.session.delete(&id)?;
                self.say(&format!("Deleted {}\n", removed.id()));
            }
            ShellCommand::Filter { field, value } => {
                match field.as_deref() {
                    None => {}
                    Some("clear") | Some("reset") => self.session.reset_filter(),
                    Some(f) => apply_filter(self.session.filter_mut(), f, &value.join(" "))?,
                }
                let text = render::criteria(self.session.filter(), self.session.sort());
                self.say(&text);
            }
            ShellCommand::Sort { field, order } => {
                let field: SortField = field.parse()?;
                let order: SortOrder = match order {
                    Some(o) => o.parse()?,
                    None => SortOrder::default(),
                };
                self.session.set_sort(Sort::new(field, order));
                let text = render::criteria(self.session.filter(), self.session.sort());
                self.say(&text);
            }
            ShellCommand::Export { format, path } => {
                let format: ExportFormat = format.parse()?;
                let view = self.session.view();
                if view.is_empty() {
                    bail!("nothing to export, the current view is empty");
                }
                let n = tally_export::export_to_path(format, &view, &path)?;
                self.say(&format!("Exported {n} transactions to {}\n", path.display()));
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn start_parse(&mut self, text: &str) -> Result<Flow> {
        if text.is_empty() {
            bail!("usage: parse <text>");
        }
        match self.session.begin_interpreting() {
            Ok(()) => {}
            Err(SessionError::Busy) => {
                self.say("Still interpreting the previous entry, please wait.\n");
                return Ok(Flow::Continue);
            }
            Err(e) => return Err(e.into()),
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending = Some(request_id);
        self.say("Interpreting...\n");
        Ok(Flow::Interpret(InterpretRequest {
            request_id,
            text: text.to_string(),
        }))
    }

    pub fn handle_event(&mut self, ev: InterpretEvent) {
        if self.pending != Some(ev.request_id) {
            tracing::debug!(request_id = ev.request_id, "ignoring stale interpretation");
            return;
        }
        self.pending = None;

        let symbol = self.display.currency_symbol.clone();
        match ev.result {
            Ok(parsed) => {
                if let Err(e) = self.session.finish_interpreting(Some(&parsed)) {
                    tracing::warn!(error = %e, "interpretation finished twice");
                }
                let text = render::parsed(&parsed, &symbol) + &render::draft(self.session.draft(), &symbol);
                self.say(&text);
                self.say("Review the entry, then `save`.\n");
            }
            Err(e) => {
                if let Err(err) = self.session.finish_interpreting(None) {
                    tracing::warn!(error = %err, "interpretation finished twice");
                }
                tracing::warn!(error = %e, "interpretation failed");
                self.say(&format!("{}\n", e.user_message()));
            }
        }
    }
}

/// Drive a shell from stdin until `quit` or end of input.
pub async fn run<W, I>(mut shell: Shell<W>, interpreter: I) -> Result<()>
where
    W: Write,
    I: Interpreter + Send + Sync + 'static,
{
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker::run_worker(interpreter, req_rx, ev_tx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    shell.greet();
    shell.print_prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    // piped input: let an outstanding parse land before exiting
                    if shell.is_waiting() {
                        if let Some(ev) = ev_rx.recv().await {
                            shell.handle_event(ev);
                        }
                    }
                    break;
                };
                match shell.handle_line(&line) {
                    Flow::Continue => {}
                    Flow::Interpret(req) => {
                        if req_tx.send(req).is_err() {
                            bail!("interpreter worker stopped");
                        }
                    }
                    Flow::Quit => break,
                }
                shell.print_prompt();
            }
            Some(ev) = ev_rx.recv() => {
                shell.say("\n");
                shell.handle_event(ev);
                shell.print_prompt();
            }
        }
    }

    drop(req_tx);
    worker.abort();
    Ok(())
}

fn help_text() -> String {
    let cmd = ShellLine::command();
    let mut out = String::from("Commands:\n");
    for sub in cmd.get_subcommands() {
        let args: Vec<String> = sub
            .get_positionals()
            .map(|a| {
                let name = a.get_id().as_str().to_string();
                if a.is_required_set() { format!("<{name}>") } else { format!("[{name}]") }
            })
            .collect();
        let usage = format!("{} {}", sub.get_name(), args.join(" "));
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        out.push_str(&format!("  {:<28} {}\n", usage.trim_end(), about));
    }
    out.push_str(&format!("\nFields: {}\n", field_names()));
    out.push_str(&format!("Categories: {}\n", Category::labels().join(", ")));
    out.push_str(&format!("Dates use {DATE_FORMAT}.\n"));
    out
}

fn field_names() -> String {
    DraftField::ALL
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Set or clear one filter predicate. An empty value, `any` or `all` clears it.
fn apply_filter(filter: &mut Filter, field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    let clear = value.is_empty() || value.eq_ignore_ascii_case("any") || value.eq_ignore_ascii_case("all");

    match field.to_ascii_lowercase().as_str() {
        "search" | "q" | "text" => filter.search = if clear { String::new() } else { value.to_string() },
        "type" | "kind" => {
            filter.kind = if clear { None } else { Some(value.parse::<TransactionType>()?) }
        }
        "category" | "cat" => {
            filter.category = if clear { None } else { Some(value.parse::<Category>()?) }
        }
        "status" => filter.status = if clear { None } else { Some(value.parse::<Status>()?) },
        "from" | "start" => filter.start = if clear { None } else { Some(parse_date(value)?) },
        "to" | "end" => filter.end = if clear { None } else { Some(parse_date(value)?) },
        other => bail!("unknown filter '{other}' (expected search, type, category, status, from, to or clear)"),
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("invalid date '{s}' (use YYYY-MM-DD)"))
}

/// Split on whitespace; double quotes group words.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut cur));
                    has_token = false;
                }
            }
            c => {
                cur.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        bail!("unterminated quote");
    }
    if has_token {
        tokens.push(cur);
    }
    Ok(tokens)
}

/// Everything after the command word, verbatim, minus one pair of enclosing quotes.
fn raw_rest(line: &str) -> &str {
    let rest = line
        .trim()
        .split_once(char::is_whitespace)
        .map(|(_, r)| r.trim())
        .unwrap_or("");
    rest.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(rest)
}
