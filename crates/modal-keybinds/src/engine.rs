//! The matching runtime.
//!
//! [`BindingEngine`] stores registered bindings plus a buffer of pending
//! keydown events. Each `key_down` either dispatches, waits for
//! disambiguation, or falls through to the flush path; `flush` force-commits
//! the longest ready match and re-feeds whatever trailed it.

use crate::key::KeyEvent;
use crate::matcher::{KeySequence, Progress};
use std::fmt;
use thiserror::Error;

/// Remap expansions allowed within one resolution before the engine gives
/// up and surfaces the keys unhandled.
pub const DEFAULT_REMAP_LIMIT: usize = 64;

/// Identifier for a registered binding. Ids are allocated monotonically and
/// never recycled within a process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a completed sequence does.
#[derive(Debug, Clone)]
enum Action<P> {
    /// Hand the payload to the caller.
    Dispatch(P),
    /// Reinject a literal key list through the matching pipeline.
    Remap(Vec<KeyEvent>),
}

/// Externally visible result of feeding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<P> {
    /// A binding's sequence completed; run its payload.
    Execute(P),
    /// A key no binding could consume.
    Unhandled(KeyEvent),
}

/// Error registering a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("empty key sequence")]
    EmptySequence,
}

type Predicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

struct Binding<P, C> {
    id: BindingId,
    sequence: KeySequence,
    action: Action<P>,
    enabled: Predicate<C>,
}

/// Result of consuming the buffered keys against every enabled binding.
struct Candidates {
    /// Highest-priority binding whose sequence completed, if any.
    ready: Option<usize>,
    /// Bindings that matched the whole buffer with presses left over.
    potential: usize,
}

/// The input binding engine.
///
/// Generic over `P`, the opaque payload dispatched when a binding fires,
/// and `C`, the opaque context handed to every enabled-predicate. All
/// operations are synchronous; there is no internal timer. A host arms its
/// own timer whenever `key_down` returns no effects while
/// [`is_pending`](Self::is_pending) holds, and calls [`flush`](Self::flush)
/// when it expires.
pub struct BindingEngine<P, C> {
    next_id: u64,
    bindings: Vec<Binding<P, C>>,
    pending: Vec<KeyEvent>,
    remap_limit: usize,
}

impl<P, C> BindingEngine<P, C> {
    pub fn new() -> Self {
        Self::with_remap_limit(DEFAULT_REMAP_LIMIT)
    }

    /// An engine with a custom cap on remap expansions per resolution.
    pub fn with_remap_limit(remap_limit: usize) -> Self {
        Self {
            next_id: 0,
            bindings: Vec::new(),
            pending: Vec::new(),
            remap_limit,
        }
    }

    /// Register a dispatch binding.
    ///
    /// `enabled` is consulted with the current context on every resolution;
    /// a binding whose predicate returns false behaves as absent for that
    /// call. When several bindings become ready at the same buffer prefix,
    /// the last one registered wins.
    pub fn add_binding(
        &mut self,
        sequence: KeySequence,
        enabled: impl Fn(&C) -> bool + Send + Sync + 'static,
        payload: P,
    ) -> Result<BindingId, BindError> {
        self.register(sequence, Box::new(enabled), Action::Dispatch(payload))
    }

    /// Register a remap: when the sequence completes, `keys` are reinjected
    /// through the matching pipeline in its place.
    pub fn add_mapping(
        &mut self,
        sequence: KeySequence,
        enabled: impl Fn(&C) -> bool + Send + Sync + 'static,
        keys: Vec<KeyEvent>,
    ) -> Result<BindingId, BindError> {
        self.register(sequence, Box::new(enabled), Action::Remap(keys))
    }

    fn register(
        &mut self,
        sequence: KeySequence,
        enabled: Predicate<C>,
        action: Action<P>,
    ) -> Result<BindingId, BindError> {
        if sequence.is_empty() {
            return Err(BindError::EmptySequence);
        }
        let id = BindingId(self.next_id);
        self.next_id += 1;
        log::debug!("registered binding {} ({} presses)", id, sequence.len());
        self.bindings.push(Binding {
            id,
            sequence,
            action,
            enabled,
        });
        Ok(id)
    }

    /// Drop a binding. Returns false if the id is unknown.
    pub fn remove(&mut self, id: BindingId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != id);
        before != self.bindings.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Whether keys are buffered awaiting disambiguation. Hosts key their
    /// flush timer off this.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<P: Clone, C> BindingEngine<P, C> {
    /// Feed one keydown event.
    ///
    /// Buffers the key while any enabled binding could still extend to a
    /// longer match; dispatches when the buffer completes exactly one
    /// resolution; otherwise falls through to the flush path so unmatched
    /// keys surface as [`Effect::Unhandled`].
    pub fn key_down(&mut self, context: &C, key: KeyEvent) -> Vec<Effect<P>> {
        let (effects, pending) = self.feed_keys(context, self.pending.clone(), key, 0);
        self.pending = pending;
        effects
    }

    /// Feed one keyup event.
    ///
    /// The matching algorithm drives from keydown buffering only, so this
    /// produces no effects; the entry point exists for API symmetry.
    pub fn key_up(&mut self, _context: &C, _key: KeyEvent) -> Vec<Effect<P>> {
        Vec::new()
    }

    /// Force resolution of the pending buffer, as if no further input could
    /// arrive. Called by the host on timer expiry.
    pub fn flush(&mut self, context: &C) -> Vec<Effect<P>> {
        let (effects, pending) = self.resolve_keys(context, self.pending.clone(), 0);
        self.pending = pending;
        effects
    }

    /// One keydown against a working buffer. Returns the effects plus the
    /// buffer to carry forward; `self` is only read, so a panicking
    /// predicate leaves the engine untouched.
    fn feed_keys(
        &self,
        context: &C,
        mut buffer: Vec<KeyEvent>,
        key: KeyEvent,
        depth: usize,
    ) -> (Vec<Effect<P>>, Vec<KeyEvent>) {
        buffer.push(key);
        let candidates = self.candidates(context, &buffer);

        if candidates.potential > 0 {
            // Ambiguous: some binding still wants more keys.
            return (Vec::new(), buffer);
        }

        if let Some(ix) = candidates.ready {
            return match &self.bindings[ix].action {
                Action::Dispatch(payload) => {
                    log::trace!("dispatching binding {}", self.bindings[ix].id);
                    (vec![Effect::Execute(payload.clone())], Vec::new())
                }
                Action::Remap(keys) => {
                    if depth + 1 > self.remap_limit {
                        self.remap_overflow(keys)
                    } else {
                        self.resolve_keys(context, keys.clone(), depth + 1)
                    }
                }
            };
        }

        // Nothing accepts the extended buffer; recover through the flush
        // path so the longest earlier match still commits.
        self.resolve_keys(context, buffer, depth)
    }

    /// Two-pass resolution.
    ///
    /// Forced pass: commit the first ready binding even if potentials
    /// remain, shrinking the working prefix from its tail until something
    /// commits or a lone key surfaces unhandled. Settled pass: re-feed the
    /// carried tail as ordinary input; whatever stays potential is the new
    /// pending buffer.
    fn resolve_keys(
        &self,
        context: &C,
        keys: Vec<KeyEvent>,
        mut depth: usize,
    ) -> (Vec<Effect<P>>, Vec<KeyEvent>) {
        let mut effects = Vec::new();
        let mut prefix = keys;
        let mut carry: Vec<KeyEvent> = Vec::new();

        while !prefix.is_empty() {
            let candidates = self.candidates(context, &prefix);
            if let Some(ix) = candidates.ready {
                prefix.clear();
                match &self.bindings[ix].action {
                    Action::Dispatch(payload) => {
                        log::trace!("dispatching binding {}", self.bindings[ix].id);
                        effects.push(Effect::Execute(payload.clone()));
                    }
                    Action::Remap(keys) => {
                        depth += 1;
                        if depth > self.remap_limit {
                            let (mut overflow, _) = self.remap_overflow(keys);
                            effects.append(&mut overflow);
                        } else {
                            prefix = keys.clone();
                        }
                    }
                }
            } else if prefix.len() == 1 {
                if let Some(key) = prefix.pop() {
                    effects.push(Effect::Unhandled(key));
                }
            } else if let Some(key) = prefix.pop() {
                carry.insert(0, key);
            }
        }

        let mut pending = Vec::new();
        for key in carry {
            let (more, next) = self.feed_keys(context, pending, key, depth);
            effects.extend(more);
            pending = next;
        }
        (effects, pending)
    }

    fn remap_overflow(&self, keys: &[KeyEvent]) -> (Vec<Effect<P>>, Vec<KeyEvent>) {
        log::warn!(
            "remap recursion exceeded {} expansions, surfacing {} key(s) unhandled",
            self.remap_limit,
            keys.len()
        );
        (
            keys.iter().cloned().map(Effect::Unhandled).collect(),
            Vec::new(),
        )
    }

    /// Consume the buffered keys against every enabled binding.
    ///
    /// Later registrations take precedence, so the scan runs newest-first
    /// and the first completed sequence wins.
    fn candidates(&self, context: &C, keys: &[KeyEvent]) -> Candidates {
        let mut ready = None;
        let mut potential = 0;
        for (ix, binding) in self.bindings.iter().enumerate().rev() {
            if !(binding.enabled)(context) {
                continue;
            }
            match binding.sequence.progress(keys) {
                Progress::Ready => {
                    if ready.is_none() {
                        ready = Some(ix);
                    }
                }
                Progress::Potential => potential += 1,
                Progress::Dropped => {}
            }
        }
        Candidates { ready, potential }
    }
}

impl<P, C> Default for BindingEngine<P, C> {
    fn default() -> Self {
        Self::new()
    }
}
