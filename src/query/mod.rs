use std::fmt;

use log::{debug, trace};

use crate::error::{Result, WashError};
use crate::session::{BrowserSession, Scope, SelectorKind};
use crate::traversal::context::{Context, Outcome};
use crate::traversal::value::ResultValue;

/// A single selection or extraction step. The value is trimmed on construction.
#[derive(Debug, PartialEq, Eq, Clone)]
#[allow(non_camel_case_types)]
pub enum Query {
    by_id(String),
    by_name(String),
    by_tag(String),
    by_class(String),
    by_css(String),
    by_xpath(String),
    by_index(String),
    data(String),
}

/// What a data query extracts from a node.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DataTarget<'a> {
    Text,
    Html,
    InnerHtml,
    Attribute(&'a str),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.value())
    }
}

impl Query {
    pub fn new(kind: &str, value: &str) -> Result<Query> {
        let value = value.trim().to_string();
        match kind {
            "id" => Ok(Query::by_id(value)),
            "name" => Ok(Query::by_name(value)),
            "tag" => Ok(Query::by_tag(value)),
            "class" => Ok(Query::by_class(value)),
            "css" => Ok(Query::by_css(value)),
            "xpath" => Ok(Query::by_xpath(value)),
            "index" => Ok(Query::by_index(value)),
            "data" => Ok(Query::data(value)),
            other => Err(WashError::language(format!("unknown query type '{}'", other))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Query::by_id(_) => "id",
            Query::by_name(_) => "name",
            Query::by_tag(_) => "tag",
            Query::by_class(_) => "class",
            Query::by_css(_) => "css",
            Query::by_xpath(_) => "xpath",
            Query::by_index(_) => "index",
            Query::data(_) => "data",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Query::by_id(value)
            | Query::by_name(value)
            | Query::by_tag(value)
            | Query::by_class(value)
            | Query::by_css(value)
            | Query::by_xpath(value)
            | Query::by_index(value)
            | Query::data(value) => value,
        }
    }

    pub fn selector_kind(&self) -> Option<SelectorKind> {
        match self {
            Query::by_id(_) => Some(SelectorKind::Id),
            Query::by_name(_) => Some(SelectorKind::Name),
            Query::by_tag(_) => Some(SelectorKind::Tag),
            Query::by_class(_) => Some(SelectorKind::Class),
            Query::by_css(_) => Some(SelectorKind::Css),
            Query::by_xpath(_) => Some(SelectorKind::XPath),
            Query::by_index(_) | Query::data(_) => None,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Query::data(_))
    }

    /// Checks the query value without touching a session.
    pub fn check(&self) -> Result<()> {
        match self {
            Query::by_index(value) => parse_index(value).map(|_| ()),
            Query::data(value) => data_target(value).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn apply<S: BrowserSession>(&self, session: &mut S, context: &Context<S::Node>) -> Result<Outcome<S::Node>> {
        let outcome = match self {
            Query::by_index(value) => Outcome::Context(select_index(value, context)?),
            Query::data(value) => Outcome::Data(extract(session, value, context)?),
            _ => {
                let kind = self
                    .selector_kind()
                    .ok_or_else(|| WashError::Unsupported(format!("query {}", self)))?;
                Outcome::Context(Context::Nodes(select(session, kind, self.value(), context)?))
            }
        };
        if let Outcome::Context(ref narrowed) = outcome {
            trace!("{}: {} -> {} item(s)", self, context.len(), narrowed.len());
        }
        Ok(outcome)
    }
}

/// Resolves a selector against every item of the context, concatenating the
/// per-item results in order.
fn select<S: BrowserSession>(
    session: &mut S,
    kind: SelectorKind,
    value: &str,
    context: &Context<S::Node>,
) -> Result<Vec<S::Node>> {
    match context {
        Context::Document => session.find(Scope::Document, kind, value),
        Context::Nodes(nodes) if nodes.len() == 1 => session.find(Scope::Element(&nodes[0]), kind, value),
        Context::Nodes(nodes) => {
            let mut found = Vec::new();
            for node in nodes {
                found.extend(session.find(Scope::Element(node), kind, value)?);
            }
            Ok(found)
        }
    }
}

fn parse_index(value: &str) -> Result<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let index = match value.parse::<i64>() {
        Ok(index) => index,
        Err(_) if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) => {
            return Err(WashError::runtime(format!("index {} out of range", value)))
        }
        Err(_) => {
            return Err(WashError::language(format!(
                "index selector value '{}' is not an integer",
                value
            )))
        }
    };
    if index == 0 {
        return Err(WashError::runtime("index selector value must not be zero"));
    }
    Ok(index)
}

/// Positive `n` picks the n-th item (1-based), negative `n` keeps the last `|n|` items.
/// The whole context is one indexable collection; the document root counts as one item.
fn select_index<N: Clone>(value: &str, context: &Context<N>) -> Result<Context<N>> {
    let index = parse_index(value)?;
    let size = context.len();
    let wanted = index.unsigned_abs() as usize;
    if index.unsigned_abs() > size as u64 {
        return Err(WashError::runtime(format!(
            "index {} out of range for a context of {} item(s)",
            index, size
        )));
    }

    match context {
        Context::Document => Ok(Context::Document),
        Context::Nodes(nodes) if index > 0 => Ok(Context::Nodes(vec![nodes[wanted - 1].clone()])),
        Context::Nodes(nodes) => Ok(Context::Nodes(nodes[size - wanted..].to_vec())),
    }
}

pub fn data_target(value: &str) -> Result<DataTarget<'_>> {
    match value {
        "text" => Ok(DataTarget::Text),
        "html" => Ok(DataTarget::Html),
        "inner_html" => Ok(DataTarget::InnerHtml),
        attribute if attribute.len() > 1 && attribute.starts_with('@') => {
            Ok(DataTarget::Attribute(&attribute[1..]))
        }
        _ => Err(WashError::language(format!("unsupported data query value '{}'", value))),
    }
}

/// One scalar for a single node, a list of scalars otherwise.
fn extract<S: BrowserSession>(session: &mut S, value: &str, context: &Context<S::Node>) -> Result<ResultValue> {
    let target = data_target(value)?;
    let nodes = match context {
        Context::Document => {
            return Err(WashError::language(format!(
                "data query '{}' needs an element, not the document root",
                value
            )))
        }
        Context::Nodes(nodes) => nodes,
    };

    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        let extracted = match target {
            DataTarget::Text => ResultValue::from(session.text_of(node)?),
            DataTarget::Html => ResultValue::from(session.outer_html_of(node)?),
            DataTarget::InnerHtml => ResultValue::from(session.inner_html_of(node)?),
            DataTarget::Attribute(name) => ResultValue::from(session.attribute_of(node, name)?),
        };
        values.push(extracted);
    }
    debug!("data '{}' extracted {} value(s)", value, values.len());

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(ResultValue::List(values))
    }
}
