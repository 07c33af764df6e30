//! Hierarchical state machine driving tool and gesture interpretation.
//!
//! Tools are nodes whose children are interaction phases; exactly one
//! root-to-leaf path is active at any time. Behaviors receive events with
//! mutable access to the [`App`](crate::app::App) and request sibling
//! transitions by returning the target id to their parent node, which keeps
//! the tree itself free of back references.

use crate::app::App;
use crate::error::{CoreError, Result};
use crate::input::{KeyInfo, Modifiers, PinchInfo, PointerInfo, WheelInfo};
use log::debug;
use std::fmt;

/// One event fanned out across the active path, root first.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    PointerDown(&'a PointerInfo),
    PointerMove(&'a PointerInfo),
    PointerUp(&'a PointerInfo),
    DoubleClick(&'a PointerInfo),
    KeyDown(&'a KeyInfo),
    KeyUp(&'a KeyInfo),
    Wheel(&'a WheelInfo),
    Pinch(&'a PinchInfo),
    ModifierChange(Modifiers),
}

/// Lifecycle hooks and event handlers for one state node.
///
/// Event handlers return `Some(id)` to request a transition to a sibling
/// state; the parent node applies it. Every hook defaults to a no-op so
/// structural nodes only implement what they need.
#[allow(unused_variables)]
pub trait StateBehavior: fmt::Debug {
    fn on_enter(&mut self, app: &mut App) {}
    fn on_exit(&mut self, app: &mut App) {}
    /// Fires on a node when its active child changes.
    fn on_transition(&mut self, app: &mut App) {}

    fn on_pointer_down(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        None
    }
    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        None
    }
    fn on_pointer_up(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        None
    }
    fn on_double_click(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        None
    }
    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        None
    }
    fn on_key_up(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        None
    }
    fn on_wheel(&mut self, app: &mut App, info: &WheelInfo) -> Option<&'static str> {
        None
    }
    fn on_pinch(&mut self, app: &mut App, info: &PinchInfo) -> Option<&'static str> {
        None
    }
    fn on_modifier_change(&mut self, app: &mut App, modifiers: Modifiers) -> Option<&'static str> {
        None
    }

    /// Route one event to the matching handler.
    fn handle(&mut self, app: &mut App, event: Event<'_>) -> Option<&'static str> {
        match event {
            Event::PointerDown(info) => self.on_pointer_down(app, info),
            Event::PointerMove(info) => self.on_pointer_move(app, info),
            Event::PointerUp(info) => self.on_pointer_up(app, info),
            Event::DoubleClick(info) => self.on_double_click(app, info),
            Event::KeyDown(info) => self.on_key_down(app, info),
            Event::KeyUp(info) => self.on_key_up(app, info),
            Event::Wheel(info) => self.on_wheel(app, info),
            Event::Pinch(info) => self.on_pinch(app, info),
            Event::ModifierChange(modifiers) => self.on_modifier_change(app, modifiers),
        }
    }
}

/// A behavior with no handlers, for purely structural nodes.
#[derive(Debug, Default)]
pub struct Passive;

impl StateBehavior for Passive {}

/// One node in the tool tree.
pub struct StateNode {
    pub id: &'static str,
    /// Child entered automatically when this node activates.
    initial: Option<&'static str>,
    children: Vec<StateNode>,
    /// Index of the active child, if any.
    current: Option<usize>,
    pub is_active: bool,
    behavior: Box<dyn StateBehavior>,
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("is_active", &self.is_active)
            .field("current", &self.current.map(|i| self.children[i].id))
            .finish()
    }
}

impl StateNode {
    /// A leaf node with the given behavior.
    pub fn new(id: &'static str, behavior: Box<dyn StateBehavior>) -> Self {
        Self {
            id,
            initial: None,
            children: Vec::new(),
            current: None,
            is_active: false,
            behavior,
        }
    }

    /// Attach child states.
    pub fn with_children(mut self, children: Vec<StateNode>) -> Self {
        self.children = children;
        self
    }

    /// Set the child entered automatically on activation.
    pub fn with_initial(mut self, initial: &'static str) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Id of the active child, if any.
    pub fn current_child_id(&self) -> Option<&'static str> {
        self.current.map(|i| self.children[i].id)
    }

    /// Activate this node and cascade into its initial chain.
    pub fn enter(&mut self, app: &mut App) -> Result<()> {
        self.is_active = true;
        self.behavior.on_enter(app);
        if let Some(initial) = self.initial {
            let idx = self.child_index(initial)?;
            self.current = Some(idx);
            self.children[idx].enter(app)?;
        }
        Ok(())
    }

    /// Deactivate this node and its active descendants.
    pub fn exit(&mut self, app: &mut App) {
        self.is_active = false;
        self.behavior.on_exit(app);
        if let Some(idx) = self.current {
            self.children[idx].exit(app);
        }
    }

    /// Switch the active child to a sibling by id.
    ///
    /// Exits the old child's whole active path, fires `on_transition` on
    /// this node, then enters the new child down to a leaf.
    pub fn transition(&mut self, target: &str, app: &mut App) -> Result<()> {
        if self.children.is_empty() {
            return Err(CoreError::NoChildStates(self.id.to_string()));
        }
        let idx = self.child_index(target)?;
        if let Some(old) = self.current {
            self.children[old].exit(app);
        }
        debug!("{}: -> {}", self.id, target);
        self.current = Some(idx);
        self.behavior.on_transition(app);
        self.children[idx].enter(app)
    }

    /// Fan an event down the active path, self before descendants.
    ///
    /// A request returned by this node's own handler bubbles to the caller;
    /// a request returned by the active child is applied here as a sibling
    /// transition.
    pub fn dispatch(&mut self, app: &mut App, event: Event<'_>) -> Result<Option<&'static str>> {
        if let Some(request) = self.behavior.handle(app, event) {
            return Ok(Some(request));
        }
        if let Some(idx) = self.current {
            if let Some(request) = self.children[idx].dispatch(app, event)? {
                self.transition(request, app)?;
            }
        }
        Ok(None)
    }

    /// Whether the dotted path names the active chain below this node.
    ///
    /// `is_in("select.translating")` matches when `select` is the active
    /// child and `translating` is active below it. An empty path matches.
    pub fn is_in(&self, path: &str) -> bool {
        let mut node = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            match node.current {
                Some(idx) if node.children[idx].id == segment => {
                    node = &node.children[idx];
                }
                _ => return false,
            }
        }
        true
    }

    /// Ids along the active chain below this node, outermost first.
    pub fn active_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut node = self;
        while let Some(idx) = node.current {
            node = &node.children[idx];
            if !node.is_active {
                break;
            }
            path.push(node.id);
        }
        path
    }

    fn child_index(&self, id: &str) -> Result<usize> {
        self.children
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::UnknownState {
                from: self.id.to_string(),
                target: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        trace: Trace,
        request: Option<&'static str>,
    }

    impl Recorder {
        fn node(name: &'static str, trace: &Trace) -> StateNode {
            StateNode::new(
                name,
                Box::new(Recorder {
                    name,
                    trace: trace.clone(),
                    request: None,
                }),
            )
        }

        fn node_requesting(name: &'static str, trace: &Trace, request: &'static str) -> StateNode {
            StateNode::new(
                name,
                Box::new(Recorder {
                    name,
                    trace: trace.clone(),
                    request: Some(request),
                }),
            )
        }
    }

    impl StateBehavior for Recorder {
        fn on_enter(&mut self, _app: &mut App) {
            self.trace.borrow_mut().push(format!("enter:{}", self.name));
        }
        fn on_exit(&mut self, _app: &mut App) {
            self.trace.borrow_mut().push(format!("exit:{}", self.name));
        }
        fn on_pointer_down(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
            self.trace.borrow_mut().push(format!("down:{}", self.name));
            self.request
        }
    }

    fn tree(trace: &Trace) -> StateNode {
        StateNode::new("root", Box::new(Passive))
            .with_initial("a")
            .with_children(vec![
                Recorder::node("a", trace)
                    .with_initial("a1")
                    .with_children(vec![
                        Recorder::node_requesting("a1", trace, "a2"),
                        Recorder::node("a2", trace),
                    ]),
                Recorder::node("b", trace),
            ])
    }

    fn pointer() -> PointerInfo {
        PointerInfo::new(kurbo::Point::ZERO, crate::input::EventTarget::Canvas)
    }

    #[test]
    fn test_enter_cascades_to_leaf() {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::new();
        let mut root = tree(&trace);
        root.enter(&mut app).unwrap();
        assert_eq!(*trace.borrow(), vec!["enter:a", "enter:a1"]);
        assert!(root.is_in("a.a1"));
        assert_eq!(root.active_path(), vec!["a", "a1"]);
    }

    #[test]
    fn test_dispatch_applies_child_request() {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::new();
        let mut root = tree(&trace);
        root.enter(&mut app).unwrap();
        trace.borrow_mut().clear();

        let info = pointer();
        root.dispatch(&mut app, Event::PointerDown(&info)).unwrap();
        // a handles first, then a1 requests a sibling move applied by a
        assert_eq!(*trace.borrow(), vec!["down:a", "down:a1", "exit:a1", "enter:a2"]);
        assert!(root.is_in("a.a2"));
        assert!(!root.is_in("a.a1"));
    }

    #[test]
    fn test_transition_exits_old_path() {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::new();
        let mut root = tree(&trace);
        root.enter(&mut app).unwrap();
        trace.borrow_mut().clear();

        root.transition("b", &mut app).unwrap();
        assert_eq!(*trace.borrow(), vec!["exit:a", "exit:a1", "enter:b"]);
        assert!(root.is_in("b"));
        assert_eq!(root.active_path(), vec!["b"]);
    }

    #[test]
    fn test_transition_unknown_target() {
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::new();
        let mut root = tree(&trace);
        root.enter(&mut app).unwrap();

        assert!(matches!(
            root.transition("nope", &mut app),
            Err(CoreError::UnknownState { .. })
        ));
    }

    #[test]
    fn test_transition_without_children() {
        let mut app = App::new();
        let mut leaf = StateNode::new("leaf", Box::new(Passive));
        assert!(matches!(
            leaf.transition("x", &mut app),
            Err(CoreError::NoChildStates(_))
        ));
    }
}
