//! Prompt loop driving one session through an [`EngineHandle`].
use anyhow::{Result, bail};
use async_trait::async_trait;
use client_blockchain_core::TxReceipt;
use client_frontend_core::{
    EntryGate, EventConsumer, EventImpact, Frontend, FrontendConfig, LotteryAction, LotteryView,
    MessageLevel, MessageLog, NoticeConsumer, SelectWinnerGate, failure_notice,
};
use runtime::{EngineHandle, RuntimeError};
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin,
    Stdout,
};
use tokio::sync::broadcast::error::RecvError;

use crate::config::CliConfig;
use crate::input::{CliCommand, HELP, parse_command};
use crate::presentation::{render_notice, render_view};

/// Terminal frontend reading one intent per line.
///
/// The line reader and the notice log live in `self`, so a `run` future that
/// is dropped mid-read (on a wallet switch) loses no input.
pub struct CliFrontend<R = BufReader<Stdin>, W = Stdout> {
    config: CliConfig,
    lines: Lines<R>,
    out: W,
    notices: NoticeConsumer,
}

impl CliFrontend {
    /// Frontend bound to the process's stdin and stdout.
    pub fn stdio(config: CliConfig, frontend_config: &FrontendConfig) -> Self {
        Self::new(
            BufReader::new(io::stdin()),
            io::stdout(),
            config,
            frontend_config,
        )
    }
}

impl<R, W> CliFrontend<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, out: W, config: CliConfig, frontend_config: &FrontendConfig) -> Self {
        Self {
            config,
            lines: input.lines(),
            out,
            notices: NoticeConsumer::new(MessageLog::new(frontend_config.messages.capacity)),
        }
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn prompt(&mut self) -> Result<()> {
        let prompt = self.config.ui.prompt.clone();
        self.write(&prompt).await
    }

    async fn render_snapshot(&mut self, handle: &EngineHandle) -> Result<()> {
        match handle.snapshot() {
            Some(snapshot) => {
                let text = render_view(&LotteryView::from_snapshot(&snapshot));
                self.write(&text).await
            }
            None => self.write("Loading lottery data...\n").await,
        }
    }

    async fn flush_notices(&mut self) -> Result<()> {
        let text: String = self
            .notices
            .message_log_mut()
            .drain_unseen()
            .map(render_notice)
            .collect();
        if text.is_empty() {
            return Ok(());
        }
        self.write(&text).await
    }

    fn notice(&mut self, text: impl Into<String>, level: MessageLevel) {
        self.notices.message_log_mut().push_text(text, level);
    }

    /// Returns `false` when the user asked to quit.
    async fn handle_command(&mut self, handle: &EngineHandle, command: CliCommand) -> Result<bool> {
        match command {
            CliCommand::Quit => return Ok(false),
            CliCommand::Help => self.write(&format!("{HELP}\n")).await?,
            CliCommand::Status => self.render_snapshot(handle).await?,
            CliCommand::Refresh => {
                handle.refresh()?;
                self.notice("Refreshing lottery data...", MessageLevel::Info);
            }
            CliCommand::Enter => self.enter(handle).await?,
            CliCommand::Select => self.select_winner(handle).await?,
        }
        Ok(true)
    }

    async fn enter(&mut self, handle: &EngineHandle) -> Result<()> {
        let Some(snapshot) = handle.snapshot() else {
            self.notice("Lottery data is still loading", MessageLevel::Warning);
            return Ok(());
        };
        let gate = EntryGate::for_snapshot(&snapshot);
        if !gate.is_open() {
            self.notice(gate.label(), MessageLevel::Warning);
            return Ok(());
        }

        self.write("Submitting entry...\n").await?;
        let outcome = handle.enter().await;
        self.report(LotteryAction::Enter, outcome)
    }

    async fn select_winner(&mut self, handle: &EngineHandle) -> Result<()> {
        let Some(snapshot) = handle.snapshot() else {
            self.notice("Lottery data is still loading", MessageLevel::Warning);
            return Ok(());
        };
        match SelectWinnerGate::for_snapshot(&snapshot) {
            SelectWinnerGate::Hidden => {
                self.notice("Only the manager can select a winner!", MessageLevel::Warning);
                return Ok(());
            }
            gate @ SelectWinnerGate::NeedMore(_) => {
                if let Some(label) = gate.label() {
                    self.notice(label, MessageLevel::Warning);
                }
                return Ok(());
            }
            SelectWinnerGate::Ready => {}
        }

        self.write("Selecting winner...\n").await?;
        let outcome = handle.select_winner().await;
        self.report(LotteryAction::SelectWinner, outcome)
    }

    fn report(
        &mut self,
        action: LotteryAction,
        outcome: std::result::Result<TxReceipt, RuntimeError>,
    ) -> Result<()> {
        match outcome {
            Ok(receipt) => {
                self.notice(
                    format!("{} TX: {}", action.success_message(), receipt.transaction.short()),
                    MessageLevel::Success,
                );
                Ok(())
            }
            Err(RuntimeError::EngineStopped) => bail!("engine stopped"),
            Err(error) => {
                tracing::warn!(target: "client::cli", %action, %error, "submission failed");
                let raw = match (error.rejection_reason(), std::error::Error::source(&error)) {
                    (Some(reason), _) => reason.to_string(),
                    (None, Some(source)) => format!("{error}: {source}"),
                    (None, None) => error.to_string(),
                };
                self.notice(failure_notice(action, &raw), MessageLevel::Error);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<R, W> Frontend for CliFrontend<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn run(&mut self, handle: EngineHandle) -> Result<()> {
        let mut events = handle.subscribe();

        self.write(&format!(
            "Connected as {}. Type 'help' for commands.\n",
            handle.account().short()
        ))
        .await?;
        self.render_snapshot(&handle).await?;
        self.prompt().await?;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let impact = match event {
                        Ok(event) => self.notices.on_event(&event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "client::cli", skipped, "sync events lagged");
                            EventImpact::redraw()
                        }
                        Err(RecvError::Closed) => bail!("engine stopped"),
                    };
                    if impact.requires_redraw {
                        self.write("\n").await?;
                        self.render_snapshot(&handle).await?;
                    }
                    self.flush_notices().await?;
                    if impact.requires_redraw {
                        self.prompt().await?;
                    }
                }
                line = self.lines.next_line() => {
                    let Some(line) = line? else {
                        // EOF behaves like quit.
                        return Ok(());
                    };
                    match parse_command(&line) {
                        None => {}
                        Some(Err(message)) => self.notice(message, MessageLevel::Warning),
                        Some(Ok(command)) => {
                            if !self.handle_command(&handle, command).await? {
                                return Ok(());
                            }
                        }
                    }
                    self.flush_notices().await?;
                    self.prompt().await?;
                }
            }
        }
    }
}
