mod config;
mod results;

#[cfg(test)]
pub mod test_util {
    use ego_tree::NodeId;

    use crate::config::validate::validate;
    use crate::error::Result;
    use crate::executor::evaluate_body;
    use crate::lang;
    use crate::lang::ast::{Command, Script, Statement};
    use crate::session::{BrowserSession, Scope, SelectorKind, StaticDocumentSession};
    use crate::traversal::ResultNode;

    pub const LISTS: &str = r#"<html><body>
        <ul id="first"><li class="item" id="a">A</li><li class="item odd" id="b">B</li></ul>
        <ul id="second"><li class="item" id="c">C</li></ul>
        <p id="para">Some <b>bold</b> text</p>
        <a id="link" href="/next">Next</a>
    </body></html>"#;

    /// Parses and validates a script body, prefixed with a placeholder open statement.
    pub fn script(body: &str) -> Result<Script> {
        let source = format!("open url 'about:blank'\n{}", body);
        println!("Input: {}", source);
        let script = lang::parse(&source)?;
        validate(&script)?;
        Ok(script)
    }

    pub fn run<S: BrowserSession>(session: &mut S, body: &str) -> Result<ResultNode> {
        evaluate_body(session, &script(body)?)
    }

    /// Result tree of `body` evaluated over `html`, as compact JSON.
    pub fn process(html: &str, body: &str) -> Result<String> {
        let mut session = StaticDocumentSession::from_html(html);
        run(&mut session, body)?.to_json()
    }

    pub fn command(source: &str) -> Command {
        match script(source).expect("parsed").body.remove(0) {
            Statement::Command(command) => command,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    pub fn css(session: &mut StaticDocumentSession, selector: &str) -> Vec<NodeId> {
        session
            .find(Scope::Document, SelectorKind::Css, selector)
            .expect("selector")
    }

    pub fn ids(session: &mut StaticDocumentSession, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| {
                session
                    .attribute_of(node, "id")
                    .expect("attribute")
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Static document session that accepts interactions and records them instead of failing.
    pub struct RecordingSession {
        inner: StaticDocumentSession,
        pub actions: Vec<String>,
    }

    impl RecordingSession {
        pub fn new(html: &str) -> Self {
            RecordingSession {
                inner: StaticDocumentSession::from_html(html),
                actions: Vec::new(),
            }
        }

        fn label(&mut self, node: &NodeId) -> String {
            self.inner
                .attribute_of(node, "id")
                .ok()
                .flatten()
                .unwrap_or_else(|| "?".to_string())
        }
    }

    impl BrowserSession for RecordingSession {
        type Node = NodeId;

        fn find(&mut self, scope: Scope<'_, NodeId>, kind: SelectorKind, value: &str) -> Result<Vec<NodeId>> {
            self.inner.find(scope, kind, value)
        }

        fn text_of(&mut self, node: &NodeId) -> Result<String> {
            self.inner.text_of(node)
        }

        fn outer_html_of(&mut self, node: &NodeId) -> Result<String> {
            self.inner.outer_html_of(node)
        }

        fn inner_html_of(&mut self, node: &NodeId) -> Result<String> {
            self.inner.inner_html_of(node)
        }

        fn attribute_of(&mut self, node: &NodeId, name: &str) -> Result<Option<String>> {
            self.inner.attribute_of(node, name)
        }

        fn click(&mut self, node: &NodeId) -> Result<()> {
            let label = self.label(node);
            self.actions.push(format!("click {}", label));
            Ok(())
        }

        fn send_keys(&mut self, node: Option<&NodeId>, text: &str) -> Result<()> {
            let label = match node {
                Some(node) => self.label(node),
                None => "(focused)".to_string(),
            };
            self.actions.push(format!("keys {} {}", label, text));
            Ok(())
        }

        fn clear(&mut self, node: &NodeId) -> Result<()> {
            let label = self.label(node);
            self.actions.push(format!("clear {}", label));
            Ok(())
        }

        fn navigate(&mut self, location: &str) -> Result<()> {
            self.actions.push(format!("navigate {}", location));
            self.inner.navigate(location)
        }

        fn eval_script(&mut self, code: &str) -> Result<()> {
            self.actions.push(format!("script {}", code));
            Ok(())
        }

        fn current_url(&mut self) -> Result<String> {
            self.inner.current_url()
        }

        fn quit(&mut self) -> Result<()> {
            self.actions.push("quit".to_string());
            self.inner.quit()
        }
    }
}
