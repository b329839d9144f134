// Context stack tracking for lazy header printing

use crate::state::Context;
use std::sync::Arc;

/// Open contexts and the part of them whose headers reached the output.
///
/// `active` always mirrors the live nesting. `printed` holds the contexts
/// whose header was emitted; in verbose mode it tracks `active` exactly, in
/// quiet mode it lags until a failing test forces disclosure.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    active: Vec<Arc<Context>>,
    printed: Vec<Arc<Context>>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a context. With `disclose` its header is considered printed and
    /// the caller must print it; returns whether that happened.
    pub fn enter(&mut self, context: &Arc<Context>, disclose: bool) -> bool {
        self.active.push(Arc::clone(context));
        if disclose {
            self.printed.push(Arc::clone(context));
        }
        disclose
    }

    /// Pop a context. Returns whether its header had been printed, in which
    /// case the caller unwinds one indent level.
    pub fn exit(&mut self, context: &Arc<Context>) -> bool {
        self.active.pop();

        match self.printed.last() {
            Some(last) if Arc::ptr_eq(last, context) => {
                self.printed.pop();
                true
            }
            _ => false,
        }
    }

    /// Contexts entered since `printed` and `active` last agreed, root first.
    ///
    /// Walks `printed` from the most recent entry backward to the deepest
    /// context still open; everything opened after it is pending.
    pub fn pending_headers(&self) -> &[Arc<Context>] {
        let matched = self.printed.iter().rev().find_map(|printed| {
            self.active
                .iter()
                .position(|active| Arc::ptr_eq(active, printed))
        });

        match matched {
            Some(position) => &self.active[position + 1..],
            None => &self.active,
        }
    }

    /// Record every open context as printed
    pub fn disclose_all(&mut self) {
        self.printed = self.active.clone();
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// How many open contexts have their header on screen
    pub fn disclosed_depth(&self) -> usize {
        self.printed.len()
    }

    pub fn active(&self) -> &[Arc<Context>] {
        &self.active
    }

    pub fn printed(&self) -> &[Arc<Context>] {
        &self.printed
    }
}
