use crate::{Id, Node};

/// Assign fresh ids in document order, starting at `start`. Returns the next
/// unused id.
pub fn assign_node_ids(node: &mut Node, start: u32) -> u32 {
    let mut next = start;
    assign(node, &mut next);
    next
}

fn assign(node: &mut Node, next: &mut u32) {
    node.set_id(Id(*next));
    *next += 1;
    if let Some(children) = node.children_mut() {
        for c in children {
            assign(c, next);
        }
    }
}

pub fn find(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children().iter().find_map(|c| find(c, id))
}

pub fn find_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_mut(c, id))
}

/// First element whose `attr` equals `value`, in document order.
pub fn find_by_attr<'a>(node: &'a Node, attr_name: &str, value: &str) -> Option<&'a Node> {
    if attr(node, attr_name) == Some(value) {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|c| find_by_attr(c, attr_name, value))
}

/// Ids from the root down to (and including) `id`. Empty if `id` is absent.
pub fn path_to(node: &Node, id: Id) -> Vec<Id> {
    let mut path = Vec::new();
    if walk_path(node, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn walk_path(node: &Node, id: Id, path: &mut Vec<Id>) -> bool {
    path.push(node.id());
    if node.id() == id {
        return true;
    }
    for c in node.children() {
        if walk_path(c, id, path) {
            return true;
        }
    }
    path.pop();
    false
}

pub fn parent_of(root: &Node, id: Id) -> Option<Id> {
    let path = path_to(root, id);
    path.len().checked_sub(2).map(|i| path[i])
}

/// Nearest ancestor of `id` (excluding itself) with the given tag name.
pub fn closest_ancestor<'a>(root: &'a Node, id: Id, tag: &str) -> Option<&'a Node> {
    let path = path_to(root, id);
    path.iter()
        .rev()
        .skip(1)
        .filter_map(|a| find(root, *a))
        .find(|n| n.is_element(tag))
}

pub fn attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    let Node::Element { attributes, .. } = node else {
        return None;
    };
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_deref().unwrap_or(""))
}

pub fn has_attr(node: &Node, name: &str) -> bool {
    attr(node, name).is_some()
}

/// Set (or with `None`, remove) an attribute. Returns `true` if anything changed.
pub fn set_attr(node: &mut Node, name: &str, value: Option<&str>) -> bool {
    let Node::Element { attributes, .. } = node else {
        return false;
    };
    let pos = attributes
        .iter()
        .position(|(k, _)| k.eq_ignore_ascii_case(name));
    match (pos, value) {
        (Some(i), Some(v)) => {
            if attributes[i].1.as_deref() == Some(v) {
                return false;
            }
            attributes[i].1 = Some(v.to_string());
            true
        }
        (Some(i), None) => {
            attributes.remove(i);
            true
        }
        (None, Some(v)) => {
            attributes.push((name.to_string(), Some(v.to_string())));
            true
        }
        (None, None) => false,
    }
}

pub fn has_class(node: &Node, class: &str) -> bool {
    attr(node, "class").is_some_and(|c| c.split_whitespace().any(|t| t == class))
}

/// Add or remove one class token, keeping the others in order.
pub fn set_class(node: &mut Node, class: &str, on: bool) -> bool {
    let mut tokens: Vec<String> = attr(node, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let present = tokens.iter().any(|t| t == class);
    match (present, on) {
        (false, true) => tokens.push(class.to_string()),
        (true, false) => tokens.retain(|t| t != class),
        _ => return false,
    }
    if tokens.is_empty() {
        set_attr(node, "class", None)
    } else {
        set_attr(node, "class", Some(&tokens.join(" ")))
    }
}

/// Insert `new_node` as the next sibling of `target`. Returns `false` (and drops
/// nothing but `new_node`) if `target` has no parent in this tree.
pub fn insert_after(root: &mut Node, target: Id, new_node: Node) -> bool {
    let Some(parent) = parent_of(root, target) else {
        return false;
    };
    let Some(children) = find_mut(root, parent).and_then(Node::children_mut) else {
        return false;
    };
    let Some(pos) = children.iter().position(|c| c.id() == target) else {
        return false;
    };
    children.insert(pos + 1, new_node);
    true
}

/// Detach the node with `id` from the tree and hand it back.
pub fn remove(root: &mut Node, id: Id) -> Option<Node> {
    let parent = parent_of(root, id)?;
    let children = find_mut(root, parent)?.children_mut()?;
    let pos = children.iter().position(|c| c.id() == id)?;
    Some(children.remove(pos))
}

/// Concatenated text content of a subtree.
pub fn text_content(node: &Node) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        _ => {
            for c in node.children() {
                collect_text(c, out);
            }
        }
    }
}
