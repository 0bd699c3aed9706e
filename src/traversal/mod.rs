use crate::session::BrowserSession;

pub mod commands;
pub mod context;
pub mod traverse;
pub mod value;

pub use context::{Context, Outcome};
pub use value::{ResultNode, ResultValue};

/** Mutable state of one script evaluation: the session every query goes through. */
pub struct Traversal<'a, S: BrowserSession> {
    session: &'a mut S,
}

impl<'a, S: BrowserSession> Traversal<'a, S> {
    pub fn new(session: &'a mut S) -> Self {
        Traversal { session }
    }
}
