//! Interactive console: reads commands from stdin and drives the workspace.
//!
//! The console task is the single owner of the [`Workspace`]. It waits on
//! four sources at once: the shutdown token, stdin, autosave ticks, and
//! finished AI jobs. AI requests run on spawned tasks and come back as
//! [`AiOutcome`]s over a channel, so editing continues while one is pending.
//!
//! Runs until `quit`, stdin closes, or the shutdown token is cancelled.
//! Returns the workspace so the caller can persist it one last time.

pub mod command;
pub mod render;

use std::io::Write as _;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{AiJob, AiOutcome, Notice, Workspace};
use crate::autosave::AutosaveTick;
use crate::graph::types::{NodeUpdate, Position};
use crate::ui_state::SidebarPanel;
use command::{Command, EditField, SettingsCommand, ShowTarget};

const JOB_QUEUE: usize = 8;

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    workspace: Workspace,
    export_dir: PathBuf,
    outcomes_tx: mpsc::Sender<AiOutcome>,
    outcomes_rx: mpsc::Receiver<AiOutcome>,
}

impl Console {
    pub fn new(workspace: Workspace, export_dir: impl Into<PathBuf>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::channel(JOB_QUEUE);
        Self { workspace, export_dir: export_dir.into(), outcomes_tx, outcomes_rx }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub async fn run(
        mut self,
        mut ticks: mpsc::Receiver<AutosaveTick>,
        shutdown: CancellationToken,
    ) -> Workspace {
        info!("console started");
        println!("─────────────────────────────────");
        println!(" topicmap  (`help` for commands, Ctrl-C to quit)");
        println!("─────────────────────────────────");
        println!("{}", render::graph(self.workspace.document(), self.workspace.ui()));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            let _ = std::io::stdout().flush();

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    println!();
                    info!("console shutting down");
                    break;
                }

                Some(outcome) = self.outcomes_rx.recv() => {
                    println!();
                    self.print_outcome(outcome);
                }

                Some(tick) = ticks.recv() => {
                    if let Err(e) = self.workspace.autosave(tick) {
                        warn!(error = %e, "autosave failed");
                        println!("\n{}", Notice::error(format!("Autosave failed: {e}")));
                    }
                }

                line = lines.next_line() => match line {
                    Err(e) => {
                        warn!("stdin read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim();
                        if input.is_empty() {
                            continue;
                        }
                        debug!(input, "console received line");
                        match command::parse(input) {
                            Err(e) => println!("{e}"),
                            Ok(cmd) => {
                                if self.execute(cmd) == Flow::Quit {
                                    break;
                                }
                            }
                        }
                    }
                },
            }
        }

        self.workspace
    }

    /// Apply one parsed command, printing its result.
    pub fn execute(&mut self, cmd: Command) -> Flow {
        let ws = &mut self.workspace;
        let notice = match cmd {
            Command::Quit => return Flow::Quit,
            Command::Help => {
                println!("{}", command::HELP);
                return Flow::Continue;
            }
            Command::Show(target) => {
                self.show(target);
                return Flow::Continue;
            }
            Command::Sessions => {
                println!("{}", render::sessions(ws.document()));
                return Flow::Continue;
            }
            Command::Settings(SettingsCommand::Show) => {
                println!("{}", render::settings(ws.settings(), ws.env_api_key_present()));
                return Flow::Continue;
            }

            Command::Topic(topic) => ws.set_topic(&topic),
            Command::Add { label, description, parent } => match parent {
                None => ws.add_concept(&label, &description, None),
                Some(r) => match ws.resolve_node(&r) {
                    Some(id) => ws.add_concept(&label, &description, Some(&id)),
                    None => unknown_node(&r),
                },
            },
            Command::Edit { node, field, value } => self.with_node(&node, |ws, id| {
                let update = match field {
                    EditField::Label => NodeUpdate { label: Some(value), ..Default::default() },
                    EditField::Description => NodeUpdate { description: Some(value), ..Default::default() },
                };
                ws.edit_node(id, update)
            }),
            Command::Remove(node) => self.with_node(&node, Workspace::remove_node),
            Command::Accept(node) => self.with_node(&node, Workspace::accept),
            Command::Reject(node) => self.with_node(&node, Workspace::reject),
            Command::Move { node, x, y } => {
                self.with_node(&node, |ws, id| ws.move_node(id, Position::new(x, y)))
            }
            Command::Select(None) => ws.select(None),
            Command::Select(Some(node)) => self.with_node(&node, |ws, id| ws.select(Some(id.to_string()))),

            Command::Expand(node) => self.dispatch(node, Workspace::prepare_expand),
            Command::Mece(node) => self.dispatch(node, Workspace::prepare_mece),
            Command::Resources(node) => self.dispatch(node, Workspace::prepare_resources),

            Command::Undo => ws.undo(),
            Command::Redo => ws.redo(),
            Command::Save => ws.save(),
            Command::New => ws.new_graph(),
            Command::Load(r) => match ws.resolve_graph(&r) {
                Some(id) => ws.load(&id),
                None => Notice::error(format!("No saved graph matches `{r}`.")),
            },
            Command::Delete(r) => match ws.resolve_graph(&r) {
                Some(id) => ws.delete_graph(&id),
                None => Notice::error(format!("No saved graph matches `{r}`.")),
            },
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                self.workspace.export(&dir)
            }

            Command::Settings(SettingsCommand::ApiKey(key)) => ws.set_api_key(&key),
            Command::Settings(SettingsCommand::Model(model)) => ws.set_model(model),
            Command::Settings(SettingsCommand::MaxSuggestions(n)) => ws.set_max_suggestions(n),
        };
        println!("{notice}");
        Flow::Continue
    }

    fn show(&mut self, target: ShowTarget) {
        match target {
            ShowTarget::Mece => self.workspace.open_panel(Some(SidebarPanel::Mece)),
            ShowTarget::Suggestions => self.workspace.open_panel(Some(SidebarPanel::Suggestions)),
            ShowTarget::Graph | ShowTarget::Node(_) => {}
        }
        let ws = &self.workspace;
        let text = match target {
            ShowTarget::Graph => {
                let mut text = render::graph(ws.document(), ws.ui());
                if let Some(panel) = render::panel(ws.document(), ws.ui()) {
                    text.push_str("\n\n");
                    text.push_str(&panel);
                }
                text
            }
            ShowTarget::Suggestions => render::suggestions(ws.document()),
            ShowTarget::Mece => match ws.ui().mece_report() {
                Some(report) => render::mece(ws.document(), report),
                None => "(no MECE report yet; run `mece <node>`)".to_string(),
            },
            ShowTarget::Node(r) => match ws.resolve_node(&r).and_then(|id| ws.document().node(&id)) {
                Some(node) => render::node(ws.document(), node),
                None => unknown_node(&r).to_string(),
            },
        };
        println!("{text}");
    }

    fn with_node(&mut self, reference: &str, f: impl FnOnce(&mut Workspace, &str) -> Notice) -> Notice {
        match self.workspace.resolve_node(reference) {
            Some(id) => f(&mut self.workspace, &id),
            None => unknown_node(reference),
        }
    }

    /// Prepare an AI job against `node` (default: selected, else root) and
    /// run it on a spawned task. The outcome comes back through the loop.
    fn dispatch(
        &mut self,
        node: Option<String>,
        prepare: fn(&mut Workspace, &str) -> Result<AiJob, Notice>,
    ) -> Notice {
        let target = match node {
            Some(r) => self.workspace.resolve_node(&r).ok_or_else(|| unknown_node(&r)),
            None => self.default_target().ok_or_else(|| Notice::warning("Start a graph with `topic <name>` first.")),
        };
        let job = match target.and_then(|id| prepare(&mut self.workspace, &id)) {
            Ok(job) => job,
            Err(notice) => return notice,
        };

        let label = self
            .workspace
            .document()
            .node(&job.ticket().node_id)
            .map(|n| n.label.clone())
            .unwrap_or_default();
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let outcome = job.run().await;
            if tx.send(outcome).await.is_err() {
                debug!("console gone before AI job finished");
            }
        });
        Notice::info(format!("Working on \"{label}\"..."))
    }

    fn default_target(&self) -> Option<String> {
        let ws = &self.workspace;
        ws.ui()
            .selected_node_id()
            .map(str::to_string)
            .or_else(|| ws.document().root_node().map(|n| n.id.clone()))
    }

    fn print_outcome(&mut self, outcome: AiOutcome) {
        let shows_report = matches!(outcome, AiOutcome::MeceChecked { .. });
        let notice = self.workspace.apply(outcome);
        println!("{notice}");
        if shows_report && !notice.is_error() {
            self.show(ShowTarget::Mece);
        }
    }

    /// Wait for the next AI outcome and apply it. Used by tests in place of
    /// the select loop.
    pub async fn settle_next(&mut self) -> Option<Notice> {
        let outcome = self.outcomes_rx.recv().await?;
        Some(self.workspace.apply(outcome))
    }
}

fn unknown_node(reference: &str) -> Notice {
    Notice::error(format!("No node matches `{reference}`."))
}
