//! Lifecycle notifications and caller-supplied request hooks.
//!
//! Built-in handling always runs first; handlers registered here are invoked
//! afterwards, in registration order.

use crate::collaborators::{Request, Response};
use crate::error::TransportError;

/// Fired before a pane (re)loads. Calling [`prevent_default`] vetoes the load.
///
/// [`prevent_default`]: BeforePaneLoad::prevent_default
#[derive(Debug)]
pub struct BeforePaneLoad<'a> {
    pane_id: &'a str,
    prevented: bool,
}

impl<'a> BeforePaneLoad<'a> {
    pub fn new(pane_id: &'a str) -> Self {
        Self {
            pane_id,
            prevented: false,
        }
    }

    pub fn pane_id(&self) -> &str {
        self.pane_id
    }

    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented
    }
}

/// Fired once new content is in place. `container_id` is set when only a
/// container inside the pane was refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterPaneLoad<'a> {
    pub pane_id: &'a str,
    pub container_id: Option<&'a str>,
}

pub type BeforeLoadListener = Box<dyn FnMut(&mut BeforePaneLoad<'_>)>;
pub type AfterLoadListener = Box<dyn FnMut(&AfterPaneLoad<'_>)>;

#[derive(Default)]
pub struct Listeners {
    before_load: Vec<BeforeLoadListener>,
    after_load: Vec<AfterLoadListener>,
}

impl Listeners {
    pub fn on_before_load(&mut self, listener: impl FnMut(&mut BeforePaneLoad<'_>) + 'static) {
        self.before_load.push(Box::new(listener));
    }

    pub fn on_after_load(&mut self, listener: impl FnMut(&AfterPaneLoad<'_>) + 'static) {
        self.after_load.push(Box::new(listener));
    }

    /// Returns `false` when any listener vetoed the load. Every listener is
    /// notified even after a veto.
    pub(crate) fn fire_before_load(&mut self, pane_id: &str) -> bool {
        let mut event = BeforePaneLoad::new(pane_id);
        for listener in &mut self.before_load {
            listener(&mut event);
        }
        !event.is_default_prevented()
    }

    pub(crate) fn fire_after_load(&mut self, pane_id: &str, container_id: Option<&str>) {
        let event = AfterPaneLoad {
            pane_id,
            container_id,
        };
        for listener in &mut self.after_load {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("before_load", &self.before_load.len())
            .field("after_load", &self.after_load.len())
            .finish()
    }
}

pub type BeforeSendHook = Box<dyn FnMut(&mut Request)>;
pub type SuccessHook = Box<dyn FnMut(&Response)>;
pub type ErrorHook = Box<dyn FnMut(&TransportError)>;

/// Ordered caller extensions for one kind of request.
#[derive(Default)]
pub struct RequestHooks {
    before_send: Vec<BeforeSendHook>,
    success: Vec<SuccessHook>,
    error: Vec<ErrorHook>,
}

impl RequestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_send(mut self, hook: impl FnMut(&mut Request) + 'static) -> Self {
        self.before_send.push(Box::new(hook));
        self
    }

    pub fn success(mut self, hook: impl FnMut(&Response) + 'static) -> Self {
        self.success.push(Box::new(hook));
        self
    }

    pub fn error(mut self, hook: impl FnMut(&TransportError) + 'static) -> Self {
        self.error.push(Box::new(hook));
        self
    }

    pub(crate) fn run_before_send(&mut self, request: &mut Request) {
        for hook in &mut self.before_send {
            hook(request);
        }
    }

    pub(crate) fn run_success(&mut self, response: &Response) {
        for hook in &mut self.success {
            hook(response);
        }
    }

    pub(crate) fn run_error(&mut self, error: &TransportError) {
        for hook in &mut self.error {
            hook(error);
        }
    }
}

impl std::fmt::Debug for RequestHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHooks")
            .field("before_send", &self.before_send.len())
            .field("success", &self.success.len())
            .field("error", &self.error.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn veto_is_reported_and_all_listeners_run() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();
        let c = Rc::clone(&calls);
        listeners.on_before_load(move |e| {
            c.borrow_mut().push("veto".to_string());
            e.prevent_default();
        });
        let c = Rc::clone(&calls);
        listeners.on_before_load(move |e| {
            assert!(e.is_default_prevented());
            c.borrow_mut().push(e.pane_id().to_string());
        });
        assert!(!listeners.fire_before_load("p1"));
        assert_eq!(*calls.borrow(), vec!["veto", "p1"]);
    }

    #[test]
    fn no_listeners_means_no_veto() {
        let mut listeners = Listeners::default();
        assert!(listeners.fire_before_load("p1"));
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&seen), Rc::clone(&seen));
        let mut hooks = RequestHooks::new()
            .success(move |r| a.borrow_mut().push(format!("first:{}", r.body)))
            .success(move |r| b.borrow_mut().push(format!("second:{}", r.body)));
        hooks.run_success(&Response::ok("x"));
        assert_eq!(*seen.borrow(), vec!["first:x", "second:x"]);
    }

    #[test]
    fn before_send_hooks_may_amend_the_request() {
        let mut hooks = RequestHooks::new().before_send(|req| {
            req.options.insert("X-Trace".into(), "1".into());
        });
        let mut request = Request::new("/a", crate::config::Method::Get);
        hooks.run_before_send(&mut request);
        assert_eq!(request.options.get("X-Trace").map(String::as_str), Some("1"));
    }
}
