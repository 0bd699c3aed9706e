use log::{debug, trace};
use pest::iterators::Pair;
use pest::Parser;

use crate::error::{Result, WashError};
use crate::query::Query;

pub mod ast;

use ast::*;

#[derive(Parser)]
#[grammar = "lang/grammar.pest"]
struct WashParser;

pub fn parse(source: &str) -> Result<Script> {
    let mut pairs = WashParser::parse(Rule::script, source)?;
    let script = match pairs.next() {
        Some(pair) => build_script(pair)?,
        None => return Err(WashError::Syntax("empty script".to_string())),
    };
    debug!(
        "Parsed script: {} configuration(s), {} statement(s)",
        script.configurations.len(),
        script.body.len()
    );
    Ok(script)
}

fn build_script(pair: Pair<Rule>) -> Result<Script> {
    let mut open = None;
    let mut configurations = Vec::new();
    let mut use_configuration = None;
    let mut body = Vec::new();

    for pair in pair.into_inner() {
        trace!("{:?}", pair.as_rule());
        match pair.as_rule() {
            Rule::open_statement => open = Some(build_open(pair)?),
            Rule::configuration => configurations.push(build_configuration(pair)?),
            Rule::use_statement => {
                let name = first_inner(pair, Rule::use_statement)?;
                use_configuration = Some(name.as_str().to_string());
            }
            Rule::expression => body.push(Statement::Expression(build_expression(pair)?)),
            Rule::EOI => {}
            _ => body.push(Statement::Command(build_command(pair)?)),
        }
    }

    let open = open.ok_or_else(|| WashError::Syntax("missing open statement".to_string()))?;
    Ok(Script {
        open,
        configurations,
        use_configuration,
        body,
    })
}

fn build_open(pair: Pair<Rule>) -> Result<OpenStatement> {
    let variant = first_inner(pair, Rule::open_statement)?;
    let rule = variant.as_rule();
    let value = to_string(first_inner(variant, rule)?)?;
    match rule {
        Rule::open_url => Ok(OpenStatement::Url(value)),
        Rule::open_file => Ok(OpenStatement::File(value)),
        Rule::open_html => Ok(OpenStatement::Html(value)),
        rule => Err(unexpected(rule, "open statement")),
    }
}

fn build_configuration(pair: Pair<Rule>) -> Result<Configuration> {
    let mut inner = pair.into_inner();
    let name = match inner.next() {
        Some(name) => name.as_str().to_string(),
        None => return Err(WashError::Syntax("configuration without a name".to_string())),
    };

    let mut entries = Vec::new();
    for entry in inner {
        let mut content = entry.into_inner();
        let entry_name = match content.next() {
            Some(ident) => ident.as_str().to_string(),
            None => return Err(WashError::Syntax("configuration entry without a name".to_string())),
        };
        let mut parameters = Vec::new();
        for parameter in content {
            let mut parts = parameter.into_inner();
            match (parts.next(), parts.next()) {
                (Some(ident), Some(value)) => parameters.push(Parameter {
                    name: ident.as_str().to_string(),
                    value: to_literal(value)?,
                }),
                _ => return Err(WashError::Syntax("malformed configuration parameter".to_string())),
            }
        }
        entries.push(ConfigurationEntry {
            name: entry_name,
            parameters,
        });
    }

    Ok(Configuration { name, entries })
}

fn build_expression(pair: Pair<Rule>) -> Result<Expression> {
    let mut inner = pair.into_inner();
    let result_key = match inner.next() {
        Some(ident) => ident.as_str().to_string(),
        None => return Err(WashError::Syntax("expression without a result key".to_string())),
    };

    let mut queries = Vec::new();
    let mut body = ExpressionBody::Terminal;
    for next in inner {
        match next.as_rule() {
            Rule::selector => queries.push(to_query(next)?),
            Rule::data_query => {
                let value = to_string(first_inner(next, Rule::data_query)?)?;
                queries.push(Query::new("data", &value)?);
            }
            Rule::context_expression => {
                let expressions = next
                    .into_inner()
                    .map(build_expression)
                    .collect::<Result<Vec<_>>>()?;
                body = ExpressionBody::Context(ContextExpression { expressions });
            }
            rule => return Err(unexpected(rule, "expression")),
        }
    }

    Ok(Expression {
        result_key,
        queries,
        body,
    })
}

fn build_command(pair: Pair<Rule>) -> Result<Command> {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    match rule {
        Rule::click_command => Ok(Command::Click(
            inner.map(to_query).collect::<Result<Vec<_>>>()?,
        )),
        Rule::type_command => {
            let keys = match inner.next() {
                Some(keys) => to_string(keys)?,
                None => return Err(WashError::Syntax("type command without keys".to_string())),
            };
            let target = inner.map(to_query).collect::<Result<Vec<_>>>()?;
            Ok(Command::Keyboard { keys, target })
        }
        Rule::sleep_command => {
            let seconds = to_seconds(inner.next())?;
            Ok(Command::Sleep(seconds))
        }
        Rule::wait_command => {
            let seconds = to_seconds(inner.next())?;
            let until = inner.map(to_query).collect::<Result<Vec<_>>>()?;
            Ok(Command::Wait { seconds, until })
        }
        Rule::navigate_command => match inner.next() {
            Some(url) => Ok(Command::Navigate(to_string(url)?)),
            None => Err(WashError::Syntax("navigate command without a location".to_string())),
        },
        Rule::run_command => match inner.next() {
            Some(code) => Ok(Command::Script(to_string(code)?)),
            None => Err(WashError::Syntax("run command without a script".to_string())),
        },
        rule => Err(unexpected(rule, "statement")),
    }
}

fn to_query(pair: Pair<Rule>) -> Result<Query> {
    let mut inner = pair.into_inner();
    match (inner.next(), inner.next()) {
        (Some(kind), Some(value)) => {
            let value = to_string(value)?;
            Query::new(kind.as_str(), &value)
        }
        _ => Err(WashError::Syntax("malformed selector".to_string())),
    }
}

/// Text of a `string` or `integer` pair, with escapes resolved.
fn to_string(pair: Pair<Rule>) -> Result<String> {
    match pair.as_rule() {
        Rule::string => {
            let quoted = first_inner(pair, Rule::string)?;
            Ok(unescape(quoted.as_str()))
        }
        Rule::integer | Rule::number => Ok(pair.as_str().to_string()),
        rule => Err(unexpected(rule, "value")),
    }
}

fn to_literal(pair: Pair<Rule>) -> Result<Literal> {
    match pair.as_rule() {
        Rule::string => Ok(Literal::Str(to_string(pair)?)),
        Rule::boolean => Ok(Literal::Bool(pair.as_str() == "true")),
        Rule::number => {
            let text = pair.as_str();
            if let Ok(value) = text.parse::<i64>() {
                Ok(Literal::Integer(value))
            } else {
                text.parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| WashError::Syntax(format!("invalid number '{}'", text)))
            }
        }
        Rule::array => Ok(Literal::List(
            pair.into_inner().map(to_literal).collect::<Result<Vec<_>>>()?,
        )),
        rule => Err(unexpected(rule, "literal")),
    }
}

fn to_seconds(pair: Option<Pair<Rule>>) -> Result<f64> {
    let pair = pair.ok_or_else(|| WashError::Syntax("missing duration".to_string()))?;
    pair.as_str()
        .parse::<f64>()
        .map_err(|_| WashError::Syntax(format!("invalid duration '{}'", pair.as_str())))
}

fn first_inner(pair: Pair<Rule>, rule: Rule) -> Result<Pair<Rule>> {
    pair.into_inner()
        .next()
        .ok_or_else(|| WashError::Syntax(format!("empty {:?}", rule)))
}

fn unexpected(rule: Rule, context: &str) -> WashError {
    WashError::Unsupported(format!("unexpected {:?} in {}", rule, context))
}

fn unescape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some(other) => output.push(other),
            None => output.push('\\'),
        }
    }
    output
}
