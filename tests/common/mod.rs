#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wash_lib::error::Result;
use wash_lib::session::{BrowserSession, Scope, SelectorKind, SessionFactory, StaticDocumentFactory, StaticDocumentSession};
use wash_lib::{WashError, Wash};

type Node = <StaticDocumentSession as BrowserSession>::Node;

/// Runs a whole script over a static document and returns the result tree as JSON.
pub fn process(source: &str) -> Result<String> {
    let result = Wash::from_string(source)?.execute(&StaticDocumentFactory)?;
    result.execution_result.to_json()
}

/// Opens static sessions and records every session lifecycle event.
#[derive(Default)]
pub struct TrackingFactory {
    pub events: Rc<RefCell<Vec<String>>>,
    pub fail_open: bool,
    pub fail_quit: bool,
}

impl TrackingFactory {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn quits(&self) -> usize {
        self.events().iter().filter(|event| *event == "quit").count()
    }
}

impl SessionFactory for TrackingFactory {
    type Session = TrackingSession;

    fn open(&self, location: &str) -> Result<TrackingSession> {
        if self.fail_open {
            return Err(WashError::session("browser is not available"));
        }
        self.events.borrow_mut().push("open".to_string());
        Ok(TrackingSession {
            inner: StaticDocumentSession::open(location)?,
            events: self.events.clone(),
            fail_quit: self.fail_quit,
        })
    }
}

pub struct TrackingSession {
    inner: StaticDocumentSession,
    events: Rc<RefCell<Vec<String>>>,
    fail_quit: bool,
}

impl TrackingSession {
    fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }
}

impl BrowserSession for TrackingSession {
    type Node = Node;

    fn find(&mut self, scope: Scope<'_, Node>, kind: SelectorKind, value: &str) -> Result<Vec<Node>> {
        self.record(format!("find {} {}", kind, value));
        self.inner.find(scope, kind, value)
    }

    fn text_of(&mut self, node: &Node) -> Result<String> {
        self.inner.text_of(node)
    }

    fn outer_html_of(&mut self, node: &Node) -> Result<String> {
        self.inner.outer_html_of(node)
    }

    fn inner_html_of(&mut self, node: &Node) -> Result<String> {
        self.inner.inner_html_of(node)
    }

    fn attribute_of(&mut self, node: &Node, name: &str) -> Result<Option<String>> {
        self.inner.attribute_of(node, name)
    }

    fn click(&mut self, _node: &Node) -> Result<()> {
        self.record("click");
        Ok(())
    }

    fn send_keys(&mut self, _node: Option<&Node>, text: &str) -> Result<()> {
        self.record(format!("keys {}", text));
        Ok(())
    }

    fn clear(&mut self, _node: &Node) -> Result<()> {
        Ok(())
    }

    fn navigate(&mut self, location: &str) -> Result<()> {
        self.inner.navigate(location)
    }

    fn eval_script(&mut self, code: &str) -> Result<()> {
        self.record(format!("script {}", code));
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        self.inner.current_url()
    }

    fn quit(&mut self) -> Result<()> {
        self.record("quit");
        self.inner.quit()?;
        if self.fail_quit {
            return Err(WashError::session("browser went away"));
        }
        Ok(())
    }
}
