//! Small declarative HTML tree.

use std::fmt::Write;

const VOID_TAGS: &[&str] = &["br", "input", "meta", "link", "hr", "img"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Node>,
    },
    /// Escaped when rendered.
    Text(String),
    /// Emitted verbatim; callers make it safe.
    Raw(String),
}

impl Node {
    pub fn el(tag: &'static str) -> Self {
        Node::Element {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push((name, value.to_string()));
        }
        self
    }

    pub fn id(self, value: impl ToString) -> Self {
        self.attr("id", value)
    }

    pub fn class(self, value: impl ToString) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(&escape(s)),
            Node::Raw(s) => out.push_str(s),
            Node::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value));
                }
                out.push('>');
                if VOID_TAGS.contains(tag) {
                    return;
                }
                for child in children {
                    child.render_into(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text with its line breaks kept.
pub fn multiline(s: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (i, line) in s.lines().enumerate() {
        if i > 0 {
            nodes.push(Node::el("br"));
        }
        nodes.push(Node::text(line));
    }
    nodes
}

/// JSON that can sit inside a `<script>` element.
pub fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
