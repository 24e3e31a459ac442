use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use crate::collaborators::{Outcome, Request, RequestToken, Response, Transport};
use crate::error::TransportError;

#[derive(Debug, Default)]
struct TransportState {
    issued: Vec<(RequestToken, Request)>,
    ready: VecDeque<(RequestToken, Outcome)>,
}

/// Records issued requests; the host decides how each one completes.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Rc<RefCell<TransportState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> Vec<(RequestToken, Request)> {
        self.state.borrow().issued.clone()
    }

    pub fn last_issued(&self) -> Option<(RequestToken, Request)> {
        self.state.borrow().issued.last().cloned()
    }

    /// Queue a completion to be reported by the next `poll`.
    pub fn respond(&self, token: RequestToken, outcome: Outcome) {
        self.state.borrow_mut().ready.push_back((token, outcome));
    }

    pub fn succeed(&self, token: RequestToken, body: &str) {
        self.respond(token, Ok(Response::ok(body)));
    }

    pub fn fail(&self, token: RequestToken, status: u16, message: &str) {
        let url = self
            .state
            .borrow()
            .issued
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, r)| r.url.clone())
            .unwrap_or_default();
        self.respond(token, Err(TransportError::new(url, Some(status), message)));
    }
}

impl Transport for MemoryTransport {
    fn issue(&mut self, token: RequestToken, request: Request) {
        self.state.borrow_mut().issued.push((token, request));
    }

    fn poll(&mut self) -> Vec<(RequestToken, Outcome)> {
        self.state.borrow_mut().ready.drain(..).collect()
    }
}

/// Serves request paths from a directory. The query string is ignored and
/// each request completes on the following `poll`.
#[derive(Debug)]
pub struct FileTransport {
    root: PathBuf,
    ready: Vec<(RequestToken, Outcome)>,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ready: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn fetch(&self, request: &Request) -> Outcome {
        let Some(path) = self.resolve(&request.url) else {
            return Err(TransportError::new(&request.url, Some(403), "path escapes the root"));
        };
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(Response::ok(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(TransportError::new(&request.url, Some(404), "not found"))
            }
            Err(err) => Err(TransportError::new(&request.url, None, err.to_string())),
        }
    }
}

impl Transport for FileTransport {
    fn issue(&mut self, token: RequestToken, request: Request) {
        tracing::debug!(url = %request.url, root = %self.root.display(), "serving from disk");
        let outcome = self.fetch(&request);
        self.ready.push((token, outcome));
    }

    fn poll(&mut self) -> Vec<(RequestToken, Outcome)> {
        std::mem::take(&mut self.ready)
    }
}
