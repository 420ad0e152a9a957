//! In-memory host page.
//!
//! A small element tree with just enough DOM behavior for the widget:
//! id lookup limited to connected elements, child replacement, inline styles,
//! iframe `src`, and a record of resize library activity. The CLI renders
//! through it and the test suites assert against it.

use std::cell::RefCell;

use super::host::{HostPage, ResizerHost};
use super::mount::IframeSpec;
use crate::{Error, Result};

/// Handle to a node of a [`HeadlessPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        style: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct ResizerLog {
    present: bool,
    script_loads: Vec<String>,
    attached: Vec<String>,
}

/// A host page that lives entirely in memory.
#[derive(Debug)]
pub struct HeadlessPage {
    nodes: RefCell<Vec<Node>>,
    resizer: RefCell<ResizerLog>,
}

const BODY: NodeId = NodeId(0);

impl HeadlessPage {
    /// An empty page: just a `<body>`.
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                attributes: Vec::new(),
                style: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: RefCell::new(vec![body]),
            resizer: RefCell::new(ResizerLog::default()),
        }
    }

    /// A page with one `<div id=...>` in its body.
    pub fn with_container(id: &str) -> Self {
        let page = Self::new();
        page.add_element(&BODY, "div", id);
        page
    }

    /// Pretend the resize library was already on the page.
    pub fn with_resizer_loaded(self) -> Self {
        self.resizer.borrow_mut().present = true;
        self
    }

    pub fn body(&self) -> NodeId {
        BODY
    }

    /// Append `<tag id=...>` to `parent` and return it.
    pub fn add_element(&self, parent: &NodeId, tag: &str, id: &str) -> NodeId {
        let node = self.push_node(NodeKind::Element {
            tag: tag.to_string(),
            attributes: vec![("id".to_string(), id.to_string())],
            style: Vec::new(),
        });
        self.attach(*parent, node);
        node
    }

    /// Append a text node to `parent`.
    pub fn append_text(&self, parent: &NodeId, text: &str) -> NodeId {
        let node = self.push_node(NodeKind::Text(text.to_string()));
        self.attach(*parent, node);
        node
    }

    pub fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// Tag name, or `#text` for text nodes.
    pub fn tag_name(&self, node: &NodeId) -> String {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element { tag, .. } => tag.clone(),
            NodeKind::Text(_) => "#text".to_string(),
        }
    }

    pub fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element { attributes, .. } => lookup(attributes, name),
            NodeKind::Text(_) => None,
        }
    }

    /// One inline style property.
    pub fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        match &self.nodes.borrow()[node.0].kind {
            NodeKind::Element { style, .. } => lookup(style, property),
            NodeKind::Text(_) => None,
        }
    }

    /// Every iframe currently connected to the page, in document order.
    pub fn iframes(&self) -> Vec<NodeId> {
        self.connected()
            .into_iter()
            .filter(|node| self.tag_name(node) == "iframe")
            .collect()
    }

    /// Serialize `node` and its subtree as HTML.
    pub fn outer_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.write_html(*node, &mut out);
        out
    }

    /// Serialize the children of `node` as HTML.
    pub fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Script URLs the widget asked to load.
    pub fn script_loads(&self) -> Vec<String> {
        self.resizer.borrow().script_loads.clone()
    }

    /// Iframe ids the resize library was bound to, in order.
    pub fn attached_resizers(&self) -> Vec<String> {
        self.resizer.borrow().attached.clone()
    }

    fn push_node(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    /// Nodes reachable from the body, depth-first in document order.
    fn connected(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut order = Vec::new();
        let mut stack = vec![BODY];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(nodes[node.0].children.iter().rev());
        }
        order
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let children = {
            let nodes = self.nodes.borrow();
            match &nodes[node.0].kind {
                NodeKind::Text(text) => {
                    out.push_str(&escape(text));
                    return;
                }
                NodeKind::Element {
                    tag,
                    attributes,
                    style,
                } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attributes {
                        out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
                    }
                    if !style.is_empty() {
                        let declarations: Vec<String> = style
                            .iter()
                            .map(|(property, value)| format!("{}: {};", property, value))
                            .collect();
                        out.push_str(&format!(" style=\"{}\"", escape(&declarations.join(" "))));
                    }
                    out.push('>');
                }
            }
            nodes[node.0].children.clone()
        };
        for child in children {
            self.write_html(child, out);
        }
        out.push_str(&format!("</{}>", self.tag_name(&node)));
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes.borrow_mut()[node.0].kind {
            upsert(attributes, name, value);
        }
    }
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPage for HeadlessPage {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.connected()
            .into_iter()
            .find(|node| self.attribute(node, "id").as_deref() == Some(id))
    }

    fn clear_children(&self, element: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[element.0].children);
        for child in children {
            nodes[child.0].parent = None;
        }
    }

    fn create_iframe(&self, spec: &IframeSpec) -> Result<NodeId> {
        let attributes = [
            ("id", spec.id.as_str()),
            ("src", spec.src.as_str()),
            ("frameborder", spec.frame_border),
            ("scrolling", spec.scrolling),
            ("width", spec.width.as_str()),
            ("height", spec.height.as_str()),
        ];
        Ok(self.push_node(NodeKind::Element {
            tag: "iframe".to_string(),
            attributes: attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            style: spec
                .style
                .iter()
                .map(|(property, value)| (property.to_string(), value.to_string()))
                .collect(),
        }))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes[child.0].parent.is_some() {
            return Err(Error::Dom("node already has a parent".to_string()));
        }
        if matches!(nodes[parent.0].kind, NodeKind::Text(_)) {
            return Err(Error::Dom("text nodes cannot have children".to_string()));
        }
        nodes[child.0].parent = Some(*parent);
        nodes[parent.0].children.push(*child);
        Ok(())
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        if let NodeKind::Element { style, .. } = &mut self.nodes.borrow_mut()[element.0].kind {
            upsert(style, property, value);
        }
    }

    fn frame_src(&self, element: &NodeId) -> Option<String> {
        if self.tag_name(element) != "iframe" {
            return None;
        }
        self.attribute(element, "src")
    }

    fn set_frame_src(&self, element: &NodeId, src: &str) {
        self.set_attribute(element, "src", src);
    }
}

impl ResizerHost for HeadlessPage {
    fn resizer_present(&self) -> bool {
        self.resizer.borrow().present
    }

    fn load_resizer(&self, url: &str) -> Result<()> {
        self.resizer.borrow_mut().script_loads.push(url.to_string());
        Ok(())
    }

    fn attach_resizer(&self, iframe_id: &str) -> Result<()> {
        if self.element_by_id(iframe_id).is_none() {
            return Err(Error::Dom(format!("iframe #{} is not in the page", iframe_id)));
        }
        self.resizer.borrow_mut().attached.push(iframe_id.to_string());
        Ok(())
    }
}

fn lookup(pairs: &[(String, String)], name: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match pairs.iter_mut().find(|(key, _)| key == name) {
        Some(pair) => pair.1 = value.to_string(),
        None => pairs.push((name.to_string(), value.to_string())),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
