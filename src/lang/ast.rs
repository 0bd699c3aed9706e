use crate::query::Query;

/** Parsed WASH script, the root of the expression tree. */
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub open: OpenStatement,
    pub configurations: Vec<Configuration>,
    pub use_configuration: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenStatement {
    Url(String),
    File(String),
    Html(String),
}

impl OpenStatement {
    /// Location handed to the browser session when the document is opened.
    pub fn location(&self) -> String {
        match self {
            OpenStatement::Url(url) => url.to_string(),
            OpenStatement::File(path) => format!("file:///{}", path.trim_start_matches('/')),
            OpenStatement::Html(html) => {
                format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub name: String,
    pub entries: Vec<ConfigurationEntry>,
}

impl Configuration {
    pub fn entry(&self, name: &str) -> Option<&ConfigurationEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationEntry {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl ConfigurationEntry {
    pub fn parameter(&self, name: &str) -> Option<&Literal> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
            .map(|parameter| &parameter.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Literal>),
}

impl Literal {
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "boolean",
            Literal::List(_) => "list",
        }
    }
}

/// Top-level entry of a script body. Commands act on the session,
/// expressions write into the result tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub result_key: String,
    pub queries: Vec<Query>,
    pub body: ExpressionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionBody {
    /// Narrow the context with the queries, then evaluate the nested expressions per item.
    Context(ContextExpression),
    /// Fold the queries over the context item; the chain ends in a data query.
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextExpression {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click(Vec<Query>),
    Keyboard { keys: String, target: Vec<Query> },
    Sleep(f64),
    Wait { seconds: f64, until: Vec<Query> },
    Navigate(String),
    Script(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Click(_) => "click",
            Command::Keyboard { .. } => "type",
            Command::Sleep(_) => "sleep",
            Command::Wait { .. } => "wait",
            Command::Navigate(_) => "navigate",
            Command::Script(_) => "run",
        }
    }
}

impl Script {
    /// Every query in the script, in declaration order, including command targets.
    pub fn queries(&self) -> Vec<&Query> {
        fn collect<'a>(expression: &'a Expression, dst: &mut Vec<&'a Query>) {
            dst.extend(expression.queries.iter());
            if let ExpressionBody::Context(context) = &expression.body {
                for child in &context.expressions {
                    collect(child, dst);
                }
            }
        }

        let mut queries = Vec::new();
        for statement in &self.body {
            match statement {
                Statement::Expression(expression) => collect(expression, &mut queries),
                Statement::Command(Command::Click(target))
                | Statement::Command(Command::Keyboard { target, .. })
                | Statement::Command(Command::Wait { until: target, .. }) => {
                    queries.extend(target.iter())
                }
                Statement::Command(_) => {}
            }
        }
        queries
    }
}
