use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::observer::{MutationKind, MutationObserver, MutationRecord, ObserveOptions, Registration};
use crate::selector::Selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    observers: Vec<Registration>,
    next_observer_id: u64,
}

impl Tree {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn contains(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Pre-order walk of `from` and its descendants
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .map(|n| self.node(n).text.as_str())
            .collect()
    }

    fn notify(&mut self, target: NodeId, kind: MutationKind) {
        let mut closed = Vec::new();
        for registration in &self.observers {
            let in_scope = if registration.options.subtree {
                self.contains(registration.root, target)
            } else {
                registration.root == target
            };
            if !in_scope || !registration.options.wants(&kind) {
                continue;
            }
            let record = MutationRecord {
                kind: kind.clone(),
                target,
            };
            if registration.tx.send(record).is_err() {
                closed.push(registration.id);
            }
        }
        if !closed.is_empty() {
            self.observers.retain(|r| !closed.contains(&r.id));
        }
    }
}

/// Shared handle to one document. Clones refer to the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Arc<Mutex<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with an `html` root and a `body`
    pub fn new() -> Self {
        let mut root = Node::new("html");
        let mut body = Node::new("body");
        body.parent = Some(NodeId(0));
        root.children.push(NodeId(1));

        Self {
            inner: Arc::new(Mutex::new(Tree {
                nodes: vec![root, body],
                root: NodeId(0),
                body: NodeId(1),
                observers: Vec::new(),
                next_observer_id: 0,
            })),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn document_element(&self) -> NodeId {
        self.tree().root
    }

    pub fn body(&self) -> NodeId {
        self.tree().body
    }

    /// New detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut tree = self.tree();
        tree.nodes.push(Node::new(tag));
        NodeId(tree.nodes.len() - 1)
    }

    /// Append `child` to `parent`, detaching it from its previous parent first
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree();
        if tree.contains(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to append an ancestor to its descendant");
            return;
        }
        if let Some(old_parent) = tree.node(child).parent {
            tree.node_mut(old_parent).children.retain(|&c| c != child);
            tree.notify(old_parent, MutationKind::ChildList);
        }
        tree.node_mut(child).parent = Some(parent);
        tree.node_mut(parent).children.push(child);
        tree.notify(parent, MutationKind::ChildList);
    }

    /// Detach `node` from its parent. Returns false if it was already detached.
    pub fn remove(&self, node: NodeId) -> bool {
        let mut tree = self.tree();
        let Some(parent) = tree.node(node).parent else {
            return false;
        };
        tree.node_mut(parent).children.retain(|&c| c != node);
        tree.node_mut(node).parent = None;
        tree.notify(parent, MutationKind::ChildList);
        true
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        let mut tree = self.tree();
        if tree.node(node).text == text {
            return;
        }
        tree.node_mut(node).text = text.to_string();
        tree.notify(node, MutationKind::CharacterData);
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree().text_content(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree().node(node).parent
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree().node(node).attribute(name).map(str::to_string)
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut tree = self.tree();
        let attributes = &mut tree.node_mut(node).attributes;
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) if *v == value => return,
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        tree.notify(
            node,
            MutationKind::Attributes {
                name: name.to_string(),
            },
        );
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        let mut tree = self.tree();
        let attributes = &mut tree.node_mut(node).attributes;
        let before = attributes.len();
        attributes.retain(|(k, _)| k != name);
        if attributes.len() != before {
            tree.notify(
                node,
                MutationKind::Attributes {
                    name: name.to_string(),
                },
            );
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let classes = self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "class", &classes);
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree();
        tree.descendants(tree.root)
            .into_iter()
            .find(|&n| tree.node(n).attribute("id") == Some(id))
    }

    /// First connected element matching `selector`, in document order
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Every connected element matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let root = self.document_element();
        self.query_selector_all_in(root, selector)
    }

    pub fn query_selector_all_in(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree();
        tree.descendants(scope)
            .into_iter()
            .filter(|&n| {
                let node = tree.node(n);
                selector.matches(&node.tag, |name| node.attribute(name))
            })
            .collect()
    }

    /// Start observing `root`
    pub fn observe(&self, root: NodeId, options: ObserveOptions) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut tree = self.tree();
            let id = tree.next_observer_id;
            tree.next_observer_id += 1;
            tree.observers.push(Registration {
                id,
                root,
                options,
                tx,
            });
            id
        };
        MutationObserver::new(id, self.clone(), rx)
    }

    /// Stop delivering records to the observer registered as `id`.
    /// Queued records stay readable. Unknown ids are ignored.
    pub fn disconnect_observer(&self, id: u64) {
        self.tree().observers.retain(|r| r.id != id);
    }

    pub fn observer_count(&self) -> usize {
        self.tree().observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_mutations() -> ObserveOptions {
        ObserveOptions {
            child_list: true,
            character_data: true,
            attributes: true,
            attribute_filter: None,
            subtree: true,
        }
    }

    #[test]
    fn query_in_document_order() {
        let doc = Document::new();
        let body = doc.body();
        let row = doc.create_element("div");
        doc.append_child(body, row);
        let mut tiles = Vec::new();
        for letter in ["a", "b", "c"] {
            let tile = doc.create_element("div");
            doc.add_class(tile, "tile");
            doc.set_text(tile, letter);
            doc.append_child(row, tile);
            tiles.push(tile);
        }

        let selector = Selector::parse(".tile").unwrap();
        assert_eq!(doc.query_selector_all(&selector), tiles);
        assert_eq!(doc.text_content(row), "abc");
    }

    #[test]
    fn detached_nodes_are_not_queried() {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attribute(el, "id", "alphalist");
        assert_eq!(doc.get_element_by_id("alphalist"), None);

        doc.append_child(doc.body(), el);
        assert_eq!(doc.get_element_by_id("alphalist"), Some(el));
        assert!(doc.remove(el));
        assert!(!doc.remove(el));
        assert_eq!(doc.get_element_by_id("alphalist"), None);
    }

    #[test]
    fn class_list_edits() {
        let doc = Document::new();
        let body = doc.body();
        doc.add_class(body, "one");
        doc.add_class(body, "two");
        doc.add_class(body, "two");
        assert_eq!(doc.attribute(body, "class").as_deref(), Some("one two"));
        doc.remove_class(body, "one");
        assert!(!doc.has_class(body, "one"));
        assert!(doc.has_class(body, "two"));
    }

    #[test]
    fn observer_sees_subtree_changes_only() {
        let doc = Document::new();
        let game = doc.create_element("div");
        let outside = doc.create_element("div");
        doc.append_child(doc.body(), game);
        doc.append_child(doc.body(), outside);

        let mut observer = doc.observe(game, all_mutations());
        let tile = doc.create_element("div");
        doc.append_child(game, tile);
        doc.set_text(tile, "q");
        doc.set_text(outside, "ignored");

        let records = observer.take_records();
        assert_eq!(
            records,
            vec![
                MutationRecord {
                    kind: MutationKind::ChildList,
                    target: game
                },
                MutationRecord {
                    kind: MutationKind::CharacterData,
                    target: tile
                },
            ]
        );
    }

    #[test]
    fn attribute_filter_and_disconnect() {
        let doc = Document::new();
        let body = doc.body();
        let mut observer = doc.observe(
            body,
            ObserveOptions {
                attributes: true,
                attribute_filter: Some(vec!["data-state".to_string()]),
                subtree: true,
                ..Default::default()
            },
        );

        doc.set_attribute(body, "data-state", "tbd");
        doc.set_attribute(body, "data-state", "tbd");
        doc.set_attribute(body, "style", "color: red");
        assert_eq!(observer.take_records().len(), 1);

        observer.disconnect();
        assert_eq!(doc.observer_count(), 0);
        doc.set_attribute(body, "data-state", "absent");
        assert!(observer.take_records().is_empty());
    }

    #[test]
    fn dropping_observer_unregisters() {
        let doc = Document::new();
        {
            let _observer = doc.observe(doc.body(), all_mutations());
            assert_eq!(doc.observer_count(), 1);
        }
        assert_eq!(doc.observer_count(), 0);
    }
}
