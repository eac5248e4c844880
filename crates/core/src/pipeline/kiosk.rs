use std::time::Instant;

use thiserror::Error;

use crate::audit::domain::audit_sink::AuditSink;
use crate::auth::domain::authenticator::Authenticator;
use crate::banking::domain::account::{parse_amount, Account};
use crate::banking::domain::session_menu::{MenuChoice, SessionMenu, MENU_TEXT};
use crate::capture::domain::frame_source::FrameSource;

use super::authenticate_frame_use_case::{elapsed_ms, AuthenticateFrameUseCase};
use super::frame_display::FrameDisplay;
use super::operator_console::{OperatorCommand, OperatorConsole};
use super::pipeline_logger::PipelineLogger;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("frame acquisition failed: {0}")]
    Acquisition(Box<dyn std::error::Error>),
    #[error("face evaluation failed: {0}")]
    Evaluation(Box<dyn std::error::Error>),
    #[error("display failed: {0}")]
    Display(Box<dyn std::error::Error>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KioskMode {
    Authenticating,
    InSession,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    OperatorQuit,
    SourceExhausted,
}

/// Top-level driver alternating between live authentication and the
/// banking session.
///
/// Authenticating: poll operator input, pull a frame, evaluate its faces,
/// display. In session: frames are not pulled; the loop blocks on menu
/// input until the operator exits back. All auth and balance state lives
/// here and is only touched from this thread.
pub struct Kiosk {
    source: Box<dyn FrameSource>,
    authenticate: AuthenticateFrameUseCase,
    authenticator: Authenticator,
    account: Account,
    audit: Box<dyn AuditSink>,
    display: Box<dyn FrameDisplay>,
    console: Box<dyn OperatorConsole>,
    logger: Box<dyn PipelineLogger>,
    mode: KioskMode,
}

impl Kiosk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        authenticate: AuthenticateFrameUseCase,
        authenticator: Authenticator,
        account: Account,
        audit: Box<dyn AuditSink>,
        display: Box<dyn FrameDisplay>,
        console: Box<dyn OperatorConsole>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            authenticate,
            authenticator,
            account,
            audit,
            display,
            console,
            logger,
            mode: KioskMode::Authenticating,
        }
    }

    pub fn mode(&self) -> KioskMode {
        self.mode
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Runs until the operator quits or the source ends.
    pub fn run(&mut self) -> Result<StopReason, KioskError> {
        self.console
            .report("Press m for the menu after access is granted, q to quit.");
        let result = loop {
            match self.step() {
                Ok(Some(reason)) => break Ok(reason),
                Ok(None) => {}
                Err(e) => break Err(e),
            }
        };
        self.source.close();
        self.logger.summary();
        result
    }

    /// One loop iteration. `Some` means stop.
    pub fn step(&mut self) -> Result<Option<StopReason>, KioskError> {
        match self.mode {
            KioskMode::Authenticating => self.authenticate_step(),
            KioskMode::InSession => Ok(self.session_step()),
        }
    }

    fn authenticate_step(&mut self) -> Result<Option<StopReason>, KioskError> {
        match self.console.poll_command() {
            Some(OperatorCommand::Quit) => {
                log::info!("Operator quit");
                return Ok(Some(StopReason::OperatorQuit));
            }
            Some(OperatorCommand::OpenMenu) => {
                if self.authenticator.is_session_allowed() {
                    log::info!("Opening session menu");
                    self.mode = KioskMode::InSession;
                    self.console.report(MENU_TEXT);
                    return Ok(None);
                }
                self.console.report("Menu unavailable: access not granted");
            }
            Some(OperatorCommand::Cancel) => log::debug!("Nothing to cancel"),
            Some(OperatorCommand::Other(key)) => log::debug!("Ignoring operator key {key:?}"),
            None => {}
        }

        let t0 = Instant::now();
        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("Frame source exhausted");
                return Ok(Some(StopReason::SourceExhausted));
            }
            Err(e) => return Err(KioskError::Acquisition(e)),
        };
        self.logger.timing("acquire", elapsed_ms(t0));

        let outcomes = self
            .authenticate
            .execute(
                &frame,
                Instant::now(),
                &mut self.authenticator,
                self.audit.as_mut(),
                self.logger.as_mut(),
            )
            .map_err(KioskError::Evaluation)?;
        self.display
            .show(&frame, &outcomes)
            .map_err(KioskError::Display)?;
        self.logger.frame(frame.index());
        Ok(None)
    }

    fn session_step(&mut self) -> Option<StopReason> {
        let Some(line) = self.console.read_line("Select option: ") else {
            return Some(StopReason::OperatorQuit);
        };
        let choice = match line.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(e) => {
                self.console.report(&e.to_string());
                return None;
            }
        };

        let amount = match choice {
            MenuChoice::Withdraw | MenuChoice::Deposit => {
                let Some(line) = self.console.read_line("Amount: ") else {
                    return Some(StopReason::OperatorQuit);
                };
                match parse_amount(&line) {
                    Ok(amount) => amount,
                    Err(e) => {
                        self.console.report(&e.to_string());
                        return None;
                    }
                }
            }
            MenuChoice::CheckBalance | MenuChoice::Exit => 0,
        };

        let user = self.authenticator.policy().authorized_identity();
        let mut menu = SessionMenu::new(user, &mut self.account, self.audit.as_mut());
        let message = match choice {
            MenuChoice::CheckBalance => format!("Balance: {}", menu.check_balance()),
            MenuChoice::Withdraw => match menu.withdraw(amount) {
                Ok(balance) => format!("Withdrawn {amount}. Balance: {balance}"),
                Err(e) => e.to_string(),
            },
            MenuChoice::Deposit => match menu.deposit(amount) {
                Ok(balance) => format!("Deposited {amount}. Balance: {balance}"),
                Err(e) => e.to_string(),
            },
            MenuChoice::Exit => {
                log::info!("Session closed");
                self.mode = KioskMode::Authenticating;
                "Session closed".to_string()
            }
        };
        self.console.report(&message);
        None
    }
}
