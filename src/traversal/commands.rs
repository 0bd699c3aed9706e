use std::thread;
use std::time::{Duration, Instant};

use log::*;

use crate::error::{Result, WashError};
use crate::lang::ast::Command;
use crate::query::Query;
use crate::session::BrowserSession;
use crate::traversal::context::Context;
use crate::traversal::Traversal;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

impl<S: BrowserSession> Traversal<'_, S> {
    /// Runs an imperative command against the session. Nothing is written to the result tree.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        info!("executing {} command", command.name());
        match command {
            Command::Click(target) => {
                let node = self.resolve_target(target)?;
                self.session.click(&node)
            }
            Command::Keyboard { keys, target } if target.is_empty() => self.session.send_keys(None, keys),
            Command::Keyboard { keys, target } => {
                let node = self.resolve_target(target)?;
                self.session.clear(&node)?;
                self.session.send_keys(Some(&node), keys)
            }
            Command::Sleep(seconds) => {
                thread::sleep(to_duration(*seconds)?);
                Ok(())
            }
            Command::Wait { seconds, until } => self.wait_until(to_duration(*seconds)?, until),
            Command::Navigate(location) => self.session.navigate(location),
            Command::Script(code) => self.session.eval_script(code),
        }
    }

    /// First node matched by the query chain, starting from the document root.
    fn resolve_target(&mut self, queries: &[Query]) -> Result<S::Node> {
        let context = self.prepare_context(&Context::Document, queries)?;
        if context.len() > 1 {
            warn!(
                "command target matched {} elements, only the first one is used",
                context.len()
            );
        }
        context.first().cloned().ok_or_else(|| {
            WashError::runtime(format!("command target {} matched no element", describe(queries)))
        })
    }

    /// Polls the query chain until it matches something or the timeout expires.
    fn wait_until(&mut self, timeout: Duration, until: &[Query]) -> Result<()> {
        if until.is_empty() {
            thread::sleep(timeout);
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        loop {
            // an index that does not fit yet means the elements have not appeared
            match self.prepare_context(&Context::Document, until) {
                Ok(context) if !context.is_empty() => {
                    debug!("wait condition met with {} element(s)", context.len());
                    return Ok(());
                }
                Ok(_) => {}
                Err(WashError::Runtime(reason)) => trace!("wait condition not met: {}", reason),
                Err(err) => return Err(err),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(WashError::runtime(format!(
                    "timed out after {:?} waiting for {}",
                    timeout,
                    describe(until)
                )));
            }
            thread::sleep(WAIT_POLL_INTERVAL.min(deadline - now));
        }
    }
}

fn to_duration(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| WashError::runtime(format!("invalid duration of {} second(s)", seconds)))
}

fn describe(queries: &[Query]) -> String {
    queries
        .iter()
        .map(|query| query.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
