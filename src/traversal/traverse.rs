use log::*;

use crate::error::{Result, WashError};
use crate::lang::ast::{ContextExpression, Expression, ExpressionBody};
use crate::query::Query;
use crate::session::BrowserSession;
use crate::traversal::context::{Context, Outcome};
use crate::traversal::value::{ResultNode, ResultValue};
use crate::traversal::Traversal;

impl<S: BrowserSession> Traversal<'_, S> {
    /// Applies `queries` in order, each one narrowing the output of the previous.
    pub fn prepare_context(&mut self, context: &Context<S::Node>, queries: &[Query]) -> Result<Context<S::Node>> {
        let mut current = context.clone();
        for query in queries {
            current = match query.apply(self.session, &current)? {
                Outcome::Context(narrowed) => narrowed,
                Outcome::Data(_) => {
                    return Err(WashError::language(format!(
                        "data query '{}' cannot be used to select a context",
                        query.value()
                    )))
                }
            };
        }
        Ok(current)
    }

    /// Evaluates the sibling expressions once per context item.
    ///
    /// A single item yields its result node directly; any other count yields a
    /// list with one node per item.
    pub fn evaluate(
        &mut self,
        context: &Context<S::Node>,
        context_expression: &ContextExpression,
    ) -> Result<ResultValue> {
        let mut results = Vec::new();
        for item in context.items() {
            let mut node = ResultNode::new();
            for expression in &context_expression.expressions {
                let value = self.evaluate_expression(&item, expression)?;
                node.add(&expression.result_key, value)?;
            }
            results.push(ResultValue::Node(node));
        }
        debug!("context expression evaluated over {} item(s)", results.len());

        if results.len() == 1 {
            Ok(results.remove(0))
        } else {
            Ok(ResultValue::List(results))
        }
    }

    pub fn evaluate_expression(&mut self, item: &Context<S::Node>, expression: &Expression) -> Result<ResultValue> {
        trace!("evaluating '{}'", expression.result_key);
        match &expression.body {
            ExpressionBody::Context(nested) => {
                let sub_context = self.prepare_context(item, &expression.queries)?;
                self.evaluate(&sub_context, nested)
            }
            ExpressionBody::Terminal => self.fold(item, expression),
        }
    }

    fn fold(&mut self, item: &Context<S::Node>, expression: &Expression) -> Result<ResultValue> {
        let mut current = Outcome::Context(item.clone());
        for query in &expression.queries {
            current = match current {
                Outcome::Context(context) => query.apply(self.session, &context)?,
                Outcome::Data(_) => {
                    return Err(WashError::Unsupported(format!(
                        "query {} follows a data query in '{}'",
                        query, expression.result_key
                    )))
                }
            };
        }

        match current {
            Outcome::Data(value) => Ok(value),
            Outcome::Context(_) => Err(WashError::Unsupported(format!(
                "expression '{}' does not end with a data query",
                expression.result_key
            ))),
        }
    }
}
