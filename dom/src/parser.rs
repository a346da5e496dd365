use crate::error::DomException;
use crate::{
    attach_doctype, node, set_parent, CharacterDataKind, NodeRef, WeakNode, XmlAttr,
    XmlCharacterData, XmlDocument, XmlDocumentType, XmlElement, XmlEntity, XmlEntityReference,
    XmlNode, XmlNotation, XmlProcessingInstruction, XMLNS_NAMESPACE_URI, XML_NAMESPACE_URI,
};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use xdom_parser::model;

// -----------------------------------------------------------------------------------------------

/// Coarse outcome of a parse; the message is kept separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseStatus {
    #[default]
    None,
    Environment,
    XmlSyntax,
    Sax,
    Dom,
}

// -----------------------------------------------------------------------------------------------

enum BuildError {
    Environment(String),
    Sax(String),
    Dom(DomException),
}

impl From<DomException> for BuildError {
    fn from(value: DomException) -> Self {
        BuildError::Dom(value)
    }
}

// -----------------------------------------------------------------------------------------------

/// Text or file to document tree; never raises, reports a category and a
/// message instead.
#[derive(Debug, Default)]
pub struct DomParser {
    document: Option<NodeRef<XmlDocument>>,
    status: ParseStatus,
    reason: String,
    resolve_externals: bool,
}

impl DomParser {
    pub fn new() -> Self {
        DomParser::default()
    }

    /// Enables reading the external DTD subset named by the doctype SYSTEM
    /// literal. The read blocks without a timeout; off by default.
    pub fn set_resolve_externals(&mut self, enabled: bool) {
        self.resolve_externals = enabled;
    }

    pub fn resolve_externals(&self) -> bool {
        self.resolve_externals
    }

    pub fn parse(&mut self, source: &str, from_file: bool) -> ParseStatus {
        self.document = None;
        self.status = ParseStatus::None;
        self.reason = String::new();

        if from_file {
            let path = Path::new(source);
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return self.fail(
                        ParseStatus::Environment,
                        format!("cannot read {}: {}", path.display(), e),
                    )
                }
            };
            let text = match decode(&bytes) {
                Ok(text) => text,
                Err(reason) => return self.fail(ParseStatus::Environment, reason),
            };
            self.parse_text(&text, path.parent().map(Path::to_path_buf))
        } else {
            self.parse_text(source, None)
        }
    }

    pub fn parse_str(&mut self, text: &str) -> ParseStatus {
        self.parse(text, false)
    }

    pub fn parse_file(&mut self, path: &str) -> ParseStatus {
        self.parse(path, true)
    }

    pub fn document(&self) -> Option<NodeRef<XmlDocument>> {
        self.document.clone()
    }

    pub fn status(&self) -> ParseStatus {
        self.status
    }

    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    fn parse_text(&mut self, text: &str, base_dir: Option<PathBuf>) -> ParseStatus {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

        match xdom_parser::document(text) {
            Ok(("", ast)) => match self.build_document(&ast, base_dir.as_deref()) {
                Ok(doc) => {
                    debug!("parsed document ({} chars)", text.len());
                    self.document = Some(doc);
                    ParseStatus::None
                }
                Err(BuildError::Environment(reason)) => self.fail(ParseStatus::Environment, reason),
                Err(BuildError::Sax(reason)) => self.fail(ParseStatus::Sax, reason),
                Err(BuildError::Dom(e)) => self.fail(ParseStatus::Dom, e.to_string()),
            },
            Ok((rest, _)) => self.fail(
                ParseStatus::XmlSyntax,
                format!("unexpected content at offset {}", text.len() - rest.len()),
            ),
            Err(e) => self.fail(ParseStatus::XmlSyntax, e.to_string()),
        }
    }

    fn fail(&mut self, status: ParseStatus, reason: String) -> ParseStatus {
        warn!("parse failed ({:?}): {}", status, reason);
        self.status = status;
        self.reason = reason;
        status
    }

    fn build_document(
        &self,
        ast: &model::Document<'_>,
        base_dir: Option<&Path>,
    ) -> Result<NodeRef<XmlDocument>, BuildError> {
        let doc = XmlDocument::new();

        if let Some(decl) = &ast.prolog.decl {
            let mut inner = doc.borrow_mut();
            inner.version = Some(decl.version.to_string());
            inner.encoding = decl.encoding.map(String::from);
            inner.standalone = decl.standalone;
        }

        let mut entity_names = HashSet::new();

        for misc in &ast.prolog.before_doctype {
            append_misc(&doc, misc);
        }

        if let Some(doctype_ast) = &ast.prolog.doctype {
            let doctype = node(XmlDocumentType {
                name: doctype_ast.name.qualified(),
                public_id: doctype_ast
                    .external_id
                    .as_ref()
                    .and_then(|id| id.public_id())
                    .map(String::from),
                system_id: doctype_ast
                    .external_id
                    .as_ref()
                    .map(|id| id.system_id().to_string()),
                internal_subset: doctype_ast.subset.as_ref().map(|s| s.raw.to_string()),
                entities: vec![],
                notations: vec![],
                parent: None,
                owner: None,
            });

            if let Some(subset) = &doctype_ast.subset {
                add_subset_decls(&doc, &doctype, &subset.decls, &mut entity_names);
            }

            if let Some(external_id) = &doctype_ast.external_id {
                if self.resolve_externals {
                    self.load_external_subset(
                        &doc,
                        &doctype,
                        external_id.system_id(),
                        base_dir,
                        &mut entity_names,
                    )?;
                } else {
                    debug!(
                        "external DTD subset '{}' not resolved",
                        external_id.system_id()
                    );
                }
            }

            attach_doctype(&doc, doctype)?;
        }

        for misc in &ast.prolog.after_doctype {
            append_misc(&doc, misc);
        }

        let builder = TreeBuilder {
            doc: doc.clone(),
            entity_names,
        };
        let root = builder.build_element(&ast.root, &HashMap::new())?;
        set_parent(
            &XmlNode::Element(root.clone()),
            Some(WeakNode::Document(Rc::downgrade(&doc))),
        );
        doc.borrow_mut().children.push(XmlNode::Element(root));

        for misc in &ast.trailing {
            append_misc(&doc, misc);
        }

        Ok(doc)
    }

    fn load_external_subset(
        &self,
        doc: &NodeRef<XmlDocument>,
        doctype: &NodeRef<XmlDocumentType>,
        system_id: &str,
        base_dir: Option<&Path>,
        entity_names: &mut HashSet<String>,
    ) -> Result<(), BuildError> {
        let path = match base_dir {
            Some(base) if Path::new(system_id).is_relative() => base.join(system_id),
            _ => PathBuf::from(system_id),
        };

        let bytes = std::fs::read(&path).map_err(|e| {
            BuildError::Environment(format!(
                "cannot read external subset {}: {}",
                path.display(),
                e
            ))
        })?;
        let text = decode(&bytes).map_err(BuildError::Environment)?;

        match xdom_parser::external_subset(&text) {
            Ok(("", decls)) => {
                debug!("resolved external subset {}", path.display());
                add_subset_decls(doc, doctype, &decls, entity_names);
                Ok(())
            }
            _ => Err(BuildError::Sax(format!(
                "malformed external subset {}",
                path.display()
            ))),
        }
    }
}

// -----------------------------------------------------------------------------------------------

fn append_misc(doc: &NodeRef<XmlDocument>, misc: &model::Misc<'_>) {
    let child = match misc {
        model::Misc::Comment(data) => XmlNode::Comment(node(XmlCharacterData {
            kind: CharacterDataKind::Comment,
            data: data.to_string(),
            parent: None,
            owner: Rc::downgrade(doc),
        })),
        model::Misc::Pi(pi) => XmlNode::PI(node(XmlProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.data.unwrap_or_default().to_string(),
            parent: None,
            owner: Rc::downgrade(doc),
        })),
        model::Misc::Space => return,
    };

    set_parent(&child, Some(WeakNode::Document(Rc::downgrade(doc))));
    doc.borrow_mut().children.push(child);
}

fn add_subset_decls(
    doc: &NodeRef<XmlDocument>,
    doctype: &NodeRef<XmlDocumentType>,
    decls: &[model::SubsetDecl<'_>],
    entity_names: &mut HashSet<String>,
) {
    for decl in decls {
        match decl {
            model::SubsetDecl::Entity(entity) => {
                // first declaration wins
                if !entity_names.insert(entity.name.to_string()) {
                    continue;
                }

                let (public_id, system_id, notation_name) = match &entity.def {
                    model::EntityDef::Internal(_) => (None, None, None),
                    model::EntityDef::External { id, ndata } => (
                        id.public_id().map(String::from),
                        Some(id.system_id().to_string()),
                        ndata.map(String::from),
                    ),
                };

                doctype.borrow_mut().entities.push(node(XmlEntity {
                    name: entity.name.to_string(),
                    public_id,
                    system_id,
                    notation_name,
                    owner: Rc::downgrade(doc),
                }));
            }
            model::SubsetDecl::Notation(notation) => {
                doctype.borrow_mut().notations.push(node(XmlNotation {
                    name: notation.name.to_string(),
                    public_id: notation.public_id.map(String::from),
                    system_id: notation.system_id.map(String::from),
                    owner: Rc::downgrade(doc),
                }));
            }
            _ => {}
        }
    }
}

// -----------------------------------------------------------------------------------------------

struct TreeBuilder {
    doc: NodeRef<XmlDocument>,
    entity_names: HashSet<String>,
}

impl TreeBuilder {
    fn build_element(
        &self,
        ast: &model::Element<'_>,
        parent_scope: &HashMap<String, String>,
    ) -> Result<NodeRef<XmlElement>, BuildError> {
        let mut scope = parent_scope.clone();
        for attr in &ast.attributes {
            let binding = match (attr.name.prefix, attr.name.local) {
                (None, "xmlns") => Some(String::new()),
                (Some("xmlns"), prefix) => Some(prefix.to_string()),
                _ => None,
            };
            if let Some(prefix) = binding {
                let uri = self.flatten_value(&attr.value)?;
                if uri.is_empty() {
                    scope.remove(&prefix);
                } else {
                    scope.insert(prefix, uri);
                }
            }
        }

        let namespace_uri = match ast.name.prefix {
            Some(prefix) => Some(self.resolve_prefix(&scope, prefix)?),
            None => scope.get("").cloned(),
        };

        let element = node(XmlElement {
            local_name: ast.name.local.to_string(),
            prefix: ast.name.prefix.map(String::from),
            namespace_uri,
            attributes: vec![],
            children: vec![],
            parent: None,
            owner: Rc::downgrade(&self.doc),
        });

        let mut seen = HashSet::new();
        for attr in &ast.attributes {
            if !seen.insert(attr.name.qualified()) {
                return Err(BuildError::Sax(format!(
                    "duplicate attribute '{}'",
                    attr.name.qualified()
                )));
            }

            let built = self.build_attribute(attr, &scope)?;
            built.borrow_mut().owner_element = Some(Rc::downgrade(&element));
            element.borrow_mut().attributes.push(built);
        }

        for content in &ast.children {
            // adjacent character content collapses into one text node
            let child = self.build_content(content, &scope)?;
            let merged = match (&child, element.borrow().children.last()) {
                (XmlNode::Text(new), Some(XmlNode::Text(last))) => {
                    last.borrow_mut().data.push_str(new.borrow().data.as_str());
                    true
                }
                _ => false,
            };
            if !merged {
                set_parent(&child, Some(WeakNode::Element(Rc::downgrade(&element))));
                element.borrow_mut().children.push(child);
            }
        }

        Ok(element)
    }

    fn build_attribute(
        &self,
        ast: &model::Attribute<'_>,
        scope: &HashMap<String, String>,
    ) -> Result<NodeRef<XmlAttr>, BuildError> {
        let namespace_uri = match (ast.name.prefix, ast.name.local) {
            (None, "xmlns") | (Some("xmlns"), _) => Some(XMLNS_NAMESPACE_URI.to_string()),
            (Some("xml"), _) => Some(XML_NAMESPACE_URI.to_string()),
            (Some(prefix), _) => Some(self.resolve_prefix(scope, prefix)?),
            (None, _) => None,
        };

        let attr = node(XmlAttr {
            local_name: ast.name.local.to_string(),
            prefix: ast.name.prefix.map(String::from),
            namespace_uri,
            children: vec![],
            specified: true,
            owner_element: None,
            owner: Rc::downgrade(&self.doc),
        });

        let mut text = String::new();
        for part in &ast.value {
            match part {
                model::AttrPart::Text(value) => text.push_str(value),
                model::AttrPart::CharRef(char_ref) => {
                    text.push(resolve_char_ref(char_ref)?);
                }
                model::AttrPart::EntityRef(name) => {
                    if let Some(c) = predefined_entity(name) {
                        text.push(c);
                    } else if self.entity_names.contains(*name) {
                        self.flush_attr_text(&attr, &mut text);
                        let reference = node(XmlEntityReference {
                            name: name.to_string(),
                            parent: Some(WeakNode::Attribute(Rc::downgrade(&attr))),
                            owner: Rc::downgrade(&self.doc),
                        });
                        attr.borrow_mut()
                            .children
                            .push(XmlNode::EntityReference(reference));
                    } else {
                        return Err(BuildError::Sax(format!("undeclared entity '{}'", name)));
                    }
                }
            }
        }
        self.flush_attr_text(&attr, &mut text);

        Ok(attr)
    }

    fn flush_attr_text(&self, attr: &NodeRef<XmlAttr>, text: &mut String) {
        if text.is_empty() {
            return;
        }
        let child = node(XmlCharacterData {
            kind: CharacterDataKind::Text,
            data: std::mem::take(text),
            parent: Some(WeakNode::Attribute(Rc::downgrade(attr))),
            owner: Rc::downgrade(&self.doc),
        });
        attr.borrow_mut().children.push(XmlNode::Text(child));
    }

    fn build_content(
        &self,
        ast: &model::Content<'_>,
        scope: &HashMap<String, String>,
    ) -> Result<XmlNode, BuildError> {
        let owner = Rc::downgrade(&self.doc);
        let child = match ast {
            model::Content::Text(value) => XmlNode::Text(node(XmlCharacterData {
                kind: CharacterDataKind::Text,
                data: value.to_string(),
                parent: None,
                owner,
            })),
            model::Content::CharRef(char_ref) => XmlNode::Text(node(XmlCharacterData {
                kind: CharacterDataKind::Text,
                data: resolve_char_ref(char_ref)?.to_string(),
                parent: None,
                owner,
            })),
            model::Content::EntityRef(name) => {
                if let Some(c) = predefined_entity(name) {
                    XmlNode::Text(node(XmlCharacterData {
                        kind: CharacterDataKind::Text,
                        data: c.to_string(),
                        parent: None,
                        owner,
                    }))
                } else if self.entity_names.contains(*name) {
                    XmlNode::EntityReference(node(XmlEntityReference {
                        name: name.to_string(),
                        parent: None,
                        owner,
                    }))
                } else {
                    return Err(BuildError::Sax(format!("undeclared entity '{}'", name)));
                }
            }
            model::Content::CData(value) => XmlNode::CData(node(XmlCharacterData {
                kind: CharacterDataKind::CData,
                data: value.to_string(),
                parent: None,
                owner,
            })),
            model::Content::Comment(value) => XmlNode::Comment(node(XmlCharacterData {
                kind: CharacterDataKind::Comment,
                data: value.to_string(),
                parent: None,
                owner,
            })),
            model::Content::Pi(pi) => XmlNode::PI(node(XmlProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.data.unwrap_or_default().to_string(),
                parent: None,
                owner,
            })),
            model::Content::Element(child) => {
                XmlNode::Element(self.build_element(child, scope)?)
            }
        };

        Ok(child)
    }

    fn resolve_prefix(
        &self,
        scope: &HashMap<String, String>,
        prefix: &str,
    ) -> Result<String, BuildError> {
        if prefix == "xml" {
            return Ok(XML_NAMESPACE_URI.to_string());
        }
        if prefix == "xmlns" {
            return Ok(XMLNS_NAMESPACE_URI.to_string());
        }

        scope
            .get(prefix)
            .cloned()
            .ok_or_else(|| BuildError::Sax(format!("undeclared namespace prefix '{}'", prefix)))
    }

    fn flatten_value(&self, parts: &[model::AttrPart<'_>]) -> Result<String, BuildError> {
        let mut value = String::new();
        for part in parts {
            match part {
                model::AttrPart::Text(text) => value.push_str(text),
                model::AttrPart::CharRef(char_ref) => value.push(resolve_char_ref(char_ref)?),
                model::AttrPart::EntityRef(name) => match predefined_entity(name) {
                    Some(c) => value.push(c),
                    None => {
                        return Err(BuildError::Sax(format!(
                            "entity reference '&{};' in namespace declaration",
                            name
                        )))
                    }
                },
            }
        }
        Ok(value)
    }
}

fn resolve_char_ref(char_ref: &model::CharRef<'_>) -> Result<char, BuildError> {
    char_ref.resolve().ok_or_else(|| {
        BuildError::Sax(format!(
            "invalid character reference '&#{}{};'",
            if char_ref.radix == 16 { "x" } else { "" },
            char_ref.digits
        ))
    })
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    }
}

// -----------------------------------------------------------------------------------------------

/// BOM sniffing then best-effort decode; without a BOM, the declaration's
/// encoding label decides.
fn decode(bytes: &[u8]) -> Result<String, String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return decode_with(encoding_rs::UTF_8, &bytes[3..]);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_with(encoding_rs::UTF_16BE, &bytes[2..]);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_with(encoding_rs::UTF_16LE, &bytes[2..]);
    }

    let sniffed = String::from_utf8_lossy(bytes);
    if let Some(label) = declared_encoding(&sniffed) {
        if !label.eq_ignore_ascii_case("utf-8") {
            let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| format!("unsupported encoding: {}", label))?;
            return decode_with(encoding, bytes);
        }
    }

    String::from_utf8(bytes.to_vec()).map_err(|e| format!("malformed UTF-8 input: {}", e))
}

fn decode_with(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> Result<String, String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        Err(format!("malformed {} input", encoding.name()))
    } else {
        Ok(text.into_owned())
    }
}

/// Lightweight scan for `encoding="..."` inside a leading XML declaration.
fn declared_encoding(text: &str) -> Option<String> {
    let end = text.find("?>")?;
    let decl = &text[..end];
    if !decl.starts_with("<?xml") {
        return None;
    }

    let at = decl.find("encoding")?;
    let rest = decl[at + "encoding".len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let close = rest.find(quote)?;
    Some(rest[..close].to_string())
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
