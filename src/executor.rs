use std::fs;
use std::path::Path;

use log::*;
use serde::Serialize;

use crate::config::validate::validate;
use crate::error::{Result, WashError};
use crate::lang;
use crate::lang::ast::{Script, Statement};
use crate::session::{BrowserSession, SessionFactory};
use crate::traversal::{Context, ResultNode, Traversal};

/// Output of one script run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptResult {
    pub start_url: String,
    pub current_url: String,
    pub execution_result: ResultNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl ScriptResult {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| WashError::runtime(err.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| WashError::runtime(err.to_string()))
    }
}

/// A parsed and validated WASH script, ready to run.
#[derive(Debug, Clone)]
pub struct Wash {
    source: String,
    script: Script,
    debug: bool,
}

impl Wash {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Wash> {
        let path = path.as_ref();
        debug!("Reading script {}", path.display());
        let source = fs::read_to_string(path)?;
        Wash::from_string(&source)
    }

    pub fn from_string(source: &str) -> Result<Wash> {
        let script = lang::parse(source)?;
        validate(&script)?;
        Ok(Wash {
            source: source.to_string(),
            script,
            debug: false,
        })
    }

    /// Attach the script source to the result.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn execute<F: SessionFactory>(&self, factory: &F) -> Result<ScriptResult> {
        let mut result = execute_script(factory, &self.script)?;
        if self.debug {
            result.script = Some(self.source.clone());
        }
        Ok(result)
    }

    pub fn execute_as_json<F: SessionFactory>(&self, factory: &F) -> Result<String> {
        self.execute(factory)?.to_json()
    }
}

/// Opens the document, runs the script body and releases the session on every path.
pub fn execute_script<F: SessionFactory>(factory: &F, script: &Script) -> Result<ScriptResult> {
    let start_url = script.open.location();
    let mut session = factory.open(&start_url)?;
    info!("Session opened");

    let outcome = evaluate_body(&mut session, script)
        .and_then(|execution_result| Ok((execution_result, session.current_url()?)));
    let released = session.quit();

    match (outcome, released) {
        (Ok((execution_result, current_url)), Ok(())) => Ok(ScriptResult {
            start_url,
            current_url,
            execution_result,
            script: None,
        }),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), released) => {
            if let Err(quit_err) = released {
                warn!("Failed to release session: {}", quit_err);
            }
            error!("Script execution failed: {}", err);
            Err(err)
        }
    }
}

/// Statements run in declaration order; commands act on the session, expressions
/// are evaluated against the document root and merged into the root result.
pub fn evaluate_body<S: BrowserSession>(session: &mut S, script: &Script) -> Result<ResultNode> {
    let mut traversal = Traversal::new(session);
    let mut root = ResultNode::new();
    for statement in &script.body {
        match statement {
            Statement::Command(command) => traversal.execute(command)?,
            Statement::Expression(expression) => {
                let value = traversal.evaluate_expression(&Context::Document, expression)?;
                root.add(&expression.result_key, value)?;
            }
        }
    }
    Ok(root)
}
