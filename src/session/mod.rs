use std::fmt;
use std::fmt::Debug;

use crate::error::Result;

pub mod document;
pub mod webdriver;

pub use document::{StaticDocumentFactory, StaticDocumentSession};
pub use webdriver::{WebDriverLauncher, WebDriverSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Id,
    Name,
    Tag,
    Class,
    Css,
    XPath,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorKind::Id => "id",
            SelectorKind::Name => "name",
            SelectorKind::Tag => "tag",
            SelectorKind::Class => "class",
            SelectorKind::Css => "css",
            SelectorKind::XPath => "xpath",
        };
        write!(f, "{}", name)
    }
}

impl SelectorKind {
    /// Equivalent CSS selector, for kinds that have one.
    pub fn to_css(&self, value: &str) -> Option<String> {
        let quoted = value.replace('\\', "\\\\").replace('"', "\\\"");
        match self {
            SelectorKind::Id => Some(format!("[id=\"{}\"]", quoted)),
            SelectorKind::Name => Some(format!("[name=\"{}\"]", quoted)),
            SelectorKind::Tag => Some(value.to_string()),
            SelectorKind::Class => Some(format!("[class~=\"{}\"]", quoted)),
            SelectorKind::Css => Some(value.to_string()),
            SelectorKind::XPath => None,
        }
    }
}

/// Where a selector is resolved: the whole document or below one element.
#[derive(Debug)]
pub enum Scope<'a, N> {
    Document,
    Element(&'a N),
}

impl<N> Clone for Scope<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Scope<'_, N> {}

/// An open browser session. Every call blocks until the browser answers.
pub trait BrowserSession {
    type Node: Clone + Debug;

    fn find(&mut self, scope: Scope<'_, Self::Node>, kind: SelectorKind, value: &str) -> Result<Vec<Self::Node>>;

    fn text_of(&mut self, node: &Self::Node) -> Result<String>;
    fn outer_html_of(&mut self, node: &Self::Node) -> Result<String>;
    fn inner_html_of(&mut self, node: &Self::Node) -> Result<String>;
    fn attribute_of(&mut self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    fn click(&mut self, node: &Self::Node) -> Result<()>;
    /// Sends keys to `node`, or to the focused part of the page when `None`.
    fn send_keys(&mut self, node: Option<&Self::Node>, text: &str) -> Result<()>;
    fn clear(&mut self, node: &Self::Node) -> Result<()>;
    fn navigate(&mut self, location: &str) -> Result<()>;
    fn eval_script(&mut self, code: &str) -> Result<()>;
    fn current_url(&mut self) -> Result<String>;

    /// Releases the session. Called exactly once by the executor.
    fn quit(&mut self) -> Result<()>;
}

/// Opens sessions on a document location: `http(s)://`, `file:///` or `data:text/html`.
pub trait SessionFactory {
    type Session: BrowserSession;

    fn open(&self, location: &str) -> Result<Self::Session>;
}
