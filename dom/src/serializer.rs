use crate::XmlNode;
use log::{debug, warn};
use std::fs;
use std::path::Path;

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct SerializeOptions {
    pub pretty: bool,
    pub indent: String,
    pub encoding: Option<String>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            pretty: false,
            indent: "  ".to_string(),
            encoding: None,
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        SerializeOptions::default()
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    pub fn encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }
}

// -----------------------------------------------------------------------------------------------

/// Node subtree to text or file. File failures are reported as a boolean
/// plus a retrievable message.
#[derive(Debug, Default)]
pub struct XmlSerializer {
    options: SerializeOptions,
    reason: Option<String>,
}

impl XmlSerializer {
    pub fn new() -> Self {
        XmlSerializer::default()
    }

    pub fn with_options(options: SerializeOptions) -> Self {
        XmlSerializer {
            options,
            reason: None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn write_to_string(&mut self, node: &XmlNode) -> String {
        self.reason = None;
        serialize(node, &self.options, None)
    }

    pub fn write_file(&mut self, node: &XmlNode, path: impl AsRef<Path>) -> bool {
        self.reason = None;
        let path = path.as_ref();

        let encoding = self
            .options
            .encoding
            .clone()
            .or_else(|| node.as_document().and_then(|v| v.borrow().encoding.clone()))
            .unwrap_or_else(|| "UTF-8".to_string());

        let text = serialize(node, &self.options, Some(encoding.as_str()));
        let bytes = match encode(&text, &encoding) {
            Ok(bytes) => bytes,
            Err(reason) => {
                warn!("serialize failed: {}", reason);
                self.reason = Some(reason);
                return false;
            }
        };

        match fs::write(path, &bytes) {
            Ok(()) => {
                debug!("wrote {} bytes to {}", bytes.len(), path.display());
                true
            }
            Err(e) => {
                let reason = format!("cannot write {}: {}", path.display(), e);
                warn!("serialize failed: {}", reason);
                self.reason = Some(reason);
                false
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------

fn serialize(node: &XmlNode, options: &SerializeOptions, encoding: Option<&str>) -> String {
    match node {
        XmlNode::Document(doc) => {
            let (version, declared, standalone, children) = {
                let inner = doc.borrow();
                (
                    inner.version.clone(),
                    inner.encoding.clone(),
                    inner.standalone,
                    inner.children.clone(),
                )
            };

            let mut out = String::new();
            let encoding = encoding.map(String::from).or(declared);
            if version.is_some() || encoding.is_some() {
                out.push_str(&format!(
                    "<?xml version=\"{}\"",
                    version.as_deref().unwrap_or("1.0")
                ));
                if let Some(encoding) = encoding.as_deref() {
                    out.push_str(&format!(" encoding=\"{}\"", encoding));
                }
                if let Some(standalone) = standalone {
                    out.push_str(&format!(
                        " standalone=\"{}\"",
                        if standalone { "yes" } else { "no" }
                    ));
                }
                out.push_str("?>");
                if options.pretty {
                    out.push('\n');
                }
            }

            for child in children.as_slice() {
                out.push_str(&fragment(child, options));
                if options.pretty {
                    out.push('\n');
                }
            }
            out
        }
        _ => fragment(node, options),
    }
}

fn fragment(node: &XmlNode, options: &SerializeOptions) -> String {
    if !options.pretty {
        return node.to_string();
    }

    let mut out = String::new();
    pretty_node(node, 0, options, &mut out);
    out
}

fn pretty_node(node: &XmlNode, depth: usize, options: &SerializeOptions, out: &mut String) {
    let pad = options.indent.repeat(depth);
    match node {
        XmlNode::Element(element) => {
            let (name, children) = {
                let inner = element.borrow();
                (inner.qualified_name(), inner.children.clone())
            };

            if children.is_empty() || has_character_content(&children) {
                // leaf and mixed content stay verbatim
                out.push_str(&pad);
                out.push_str(&node.to_string());
                return;
            }

            out.push_str(&pad);
            out.push('<');
            out.push_str(&name);
            for attr in element.borrow().attributes.as_slice() {
                out.push(' ');
                out.push_str(&attr.borrow().to_string());
            }
            out.push('>');

            for child in children.as_slice() {
                out.push('\n');
                pretty_node(child, depth + 1, options, out);
            }

            out.push('\n');
            out.push_str(&pad);
            out.push_str(&format!("</{}>", name));
        }
        XmlNode::DocumentFragment(frag) => {
            let children = frag.borrow().children.clone();
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                pretty_node(child, depth, options, out);
            }
        }
        XmlNode::Document(_) => out.push_str(&serialize(node, options, None)),
        _ => {
            out.push_str(&pad);
            out.push_str(&node.to_string());
        }
    }
}

fn has_character_content(children: &[XmlNode]) -> bool {
    children.iter().any(|v| {
        matches!(
            v,
            XmlNode::Text(_) | XmlNode::CData(_) | XmlNode::EntityReference(_)
        )
    })
}

// -----------------------------------------------------------------------------------------------

/// Best-effort encoder; unsupported encodings are refused with a message.
fn encode(text: &str, label: &str) -> Result<Vec<u8>, String> {
    match label.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(text.as_bytes().to_vec()),
        "us-ascii" | "ascii" => {
            if text.is_ascii() {
                Ok(text.as_bytes().to_vec())
            } else {
                Err("text contains characters outside US-ASCII".to_string())
            }
        }
        "utf-16" | "utf-16le" => {
            let mut bytes = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                bytes.extend(unit.to_le_bytes());
            }
            Ok(bytes)
        }
        "utf-16be" => {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                bytes.extend(unit.to_be_bytes());
            }
            Ok(bytes)
        }
        _ => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    Err(format!("text is not representable in {}", encoding.name()))
                } else {
                    Ok(bytes.into_owned())
                }
            }
            None => Err(format!("unsupported encoding: {}", label)),
        },
    }
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
