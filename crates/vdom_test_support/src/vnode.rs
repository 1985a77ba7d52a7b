//! Minimal virtual-node model used to drive the mutation sink.

use std::collections::BTreeMap;

/// Element content: nothing, one text leaf, or child elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VBody {
    #[default]
    Empty,
    Text(String),
    Children(Vec<VNode>),
}

/// One virtual element. `component` names the component whose subtree
/// is rooted here, if any; it becomes a synthetic path ancestor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VNode {
    pub type_name: String,
    pub key: Option<String>,
    pub class_name: Option<String>,
    pub component: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub body: VBody,
}

impl VNode {
    pub fn element(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            ..Self::default()
        }
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn class_name(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn component(mut self, name: &str) -> Self {
        self.component = Some(name.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, name: &str, value: &str) -> Self {
        self.styles.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, value: &str) -> Self {
        self.body = VBody::Text(value.to_string());
        self
    }

    pub fn children(mut self, children: Vec<VNode>) -> Self {
        self.body = VBody::Children(children);
        self
    }
}
