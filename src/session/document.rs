use std::fs;

use ego_tree::NodeId;
use log::*;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, WashError};
use crate::session::{BrowserSession, Scope, SelectorKind, SessionFactory};

/// Opens [`StaticDocumentSession`]s. No browser or driver is involved.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticDocumentFactory;

impl SessionFactory for StaticDocumentFactory {
    type Session = StaticDocumentSession;

    fn open(&self, location: &str) -> Result<StaticDocumentSession> {
        StaticDocumentSession::open(location)
    }
}

/// Session over a parsed HTML document, loaded from a `file://` path or a
/// `data:text/html` location. Read-only: no scripts run, nothing is clickable.
pub struct StaticDocumentSession {
    location: String,
    document: Html,
    closed: bool,
}

impl StaticDocumentSession {
    pub fn open(location: &str) -> Result<Self> {
        info!("Loading static document from {}", abbreviate(location));
        Ok(StaticDocumentSession {
            location: location.to_string(),
            document: load(location)?,
            closed: false,
        })
    }

    pub fn from_html(html: &str) -> Self {
        StaticDocumentSession {
            location: format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html)),
            document: Html::parse_document(html),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn element(&self, node: &NodeId) -> Result<ElementRef<'_>> {
        self.document
            .tree
            .get(*node)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| WashError::session(format!("node {:?} is not an element of the current document", node)))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(WashError::session("session has already been closed"));
        }
        Ok(())
    }

    fn unsupported(&self, action: &str) -> Result<()> {
        self.ensure_open()?;
        Err(WashError::session(format!(
            "static document sessions are read-only and do not support {}",
            action
        )))
    }
}

impl BrowserSession for StaticDocumentSession {
    type Node = NodeId;

    fn find(&mut self, scope: Scope<'_, NodeId>, kind: SelectorKind, value: &str) -> Result<Vec<NodeId>> {
        self.ensure_open()?;
        let css = kind
            .to_css(value)
            .ok_or_else(|| WashError::session(format!("{} selectors need a WebDriver session", kind)))?;
        let selector = Selector::parse(&css)
            .map_err(|err| WashError::language(format!("invalid {} selector '{}': {:?}", kind, value, err)))?;

        let found: Vec<NodeId> = match scope {
            Scope::Document => self.document.select(&selector).map(|element| element.id()).collect(),
            Scope::Element(node) => self
                .element(node)?
                .select(&selector)
                .map(|element| element.id())
                .collect(),
        };
        trace!("{} '{}' matched {} element(s)", kind, value, found.len());
        Ok(found)
    }

    fn text_of(&mut self, node: &NodeId) -> Result<String> {
        let text = self.element(node)?.text().collect::<String>();
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn outer_html_of(&mut self, node: &NodeId) -> Result<String> {
        Ok(self.element(node)?.html())
    }

    fn inner_html_of(&mut self, node: &NodeId) -> Result<String> {
        Ok(self.element(node)?.inner_html())
    }

    fn attribute_of(&mut self, node: &NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.element(node)?.value().attr(name).map(str::to_string))
    }

    fn click(&mut self, _node: &NodeId) -> Result<()> {
        self.unsupported("click")
    }

    fn send_keys(&mut self, _node: Option<&NodeId>, _text: &str) -> Result<()> {
        self.unsupported("keyboard input")
    }

    fn clear(&mut self, _node: &NodeId) -> Result<()> {
        self.unsupported("clearing elements")
    }

    fn navigate(&mut self, location: &str) -> Result<()> {
        self.ensure_open()?;
        self.document = load(location)?;
        self.location = location.to_string();
        Ok(())
    }

    fn eval_script(&mut self, _code: &str) -> Result<()> {
        self.unsupported("script execution")
    }

    fn current_url(&mut self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.location.clone())
    }

    fn quit(&mut self) -> Result<()> {
        debug!("Closing static document session");
        self.closed = true;
        Ok(())
    }
}

fn load(location: &str) -> Result<Html> {
    if let Some(rest) = location.strip_prefix("data:") {
        let (media_type, payload) = rest
            .split_once(',')
            .ok_or_else(|| WashError::session("data location without a payload"))?;
        if !media_type.starts_with("text/html") || media_type.ends_with(";base64") {
            return Err(WashError::session(format!(
                "unsupported data location media type '{}'",
                media_type
            )));
        }
        let html = urlencoding::decode(payload)
            .map_err(|err| WashError::session(format!("malformed data location: {}", err)))?;
        Ok(Html::parse_document(&html))
    } else if let Some(path) = location.strip_prefix("file://") {
        let html = fs::read_to_string(path)?;
        Ok(Html::parse_document(&html))
    } else {
        Err(WashError::session(format!(
            "static documents open file:// or data:text/html locations only, not '{}'",
            abbreviate(location)
        )))
    }
}

fn abbreviate(location: &str) -> String {
    const LIMIT: usize = 80;
    match location.char_indices().nth(LIMIT) {
        Some((end, _)) => format!("{}...", &location[..end]),
        None => location.to_string(),
    }
}
