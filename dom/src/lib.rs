pub mod error;
pub mod parser;
pub mod serializer;

use error::{DomException, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

// -----------------------------------------------------------------------------------------------

pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE_URI: &str = "http://www.w3.org/2000/xmlns/";

pub type NodeRef<T> = Rc<RefCell<T>>;
pub(crate) type WeakRef<T> = Weak<RefCell<T>>;

pub(crate) fn node<T>(value: T) -> NodeRef<T> {
    Rc::new(RefCell::new(value))
}

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CData = 4,
    EntityReference = 5,
    Entity = 6,
    PI = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterDataKind {
    Text,
    CData,
    Comment,
}

// -----------------------------------------------------------------------------------------------

/// The universal tagged-variant tree entity.
///
/// Equality is node identity; structural comparison is done by serializing.
#[derive(Clone, Debug)]
pub enum XmlNode {
    Element(NodeRef<XmlElement>),
    Attribute(NodeRef<XmlAttr>),
    Text(NodeRef<XmlCharacterData>),
    CData(NodeRef<XmlCharacterData>),
    Comment(NodeRef<XmlCharacterData>),
    EntityReference(NodeRef<XmlEntityReference>),
    Entity(NodeRef<XmlEntity>),
    PI(NodeRef<XmlProcessingInstruction>),
    Document(NodeRef<XmlDocument>),
    DocumentType(NodeRef<XmlDocumentType>),
    DocumentFragment(NodeRef<XmlDocumentFragment>),
    Notation(NodeRef<XmlNotation>),
}

impl PartialEq for XmlNode {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_node(other)
    }
}

impl XmlNode {
    pub fn is_same_node(&self, other: &XmlNode) -> bool {
        match (self, other) {
            (XmlNode::Element(a), XmlNode::Element(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Attribute(a), XmlNode::Attribute(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Text(a), XmlNode::Text(b)) => Rc::ptr_eq(a, b),
            (XmlNode::CData(a), XmlNode::CData(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Comment(a), XmlNode::Comment(b)) => Rc::ptr_eq(a, b),
            (XmlNode::EntityReference(a), XmlNode::EntityReference(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Entity(a), XmlNode::Entity(b)) => Rc::ptr_eq(a, b),
            (XmlNode::PI(a), XmlNode::PI(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Document(a), XmlNode::Document(b)) => Rc::ptr_eq(a, b),
            (XmlNode::DocumentType(a), XmlNode::DocumentType(b)) => Rc::ptr_eq(a, b),
            (XmlNode::DocumentFragment(a), XmlNode::DocumentFragment(b)) => Rc::ptr_eq(a, b),
            (XmlNode::Notation(a), XmlNode::Notation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<NodeRef<XmlElement>> {
        if let XmlNode::Element(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_attribute(&self) -> Option<NodeRef<XmlAttr>> {
        if let XmlNode::Attribute(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_text(&self) -> Option<NodeRef<XmlCharacterData>> {
        if let XmlNode::Text(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_cdata(&self) -> Option<NodeRef<XmlCharacterData>> {
        if let XmlNode::CData(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_comment(&self) -> Option<NodeRef<XmlCharacterData>> {
        if let XmlNode::Comment(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_character_data(&self) -> Option<NodeRef<XmlCharacterData>> {
        match self {
            XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_entity_reference(&self) -> Option<NodeRef<XmlEntityReference>> {
        if let XmlNode::EntityReference(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_entity(&self) -> Option<NodeRef<XmlEntity>> {
        if let XmlNode::Entity(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_pi(&self) -> Option<NodeRef<XmlProcessingInstruction>> {
        if let XmlNode::PI(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_document(&self) -> Option<NodeRef<XmlDocument>> {
        if let XmlNode::Document(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_document_type(&self) -> Option<NodeRef<XmlDocumentType>> {
        if let XmlNode::DocumentType(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_document_fragment(&self) -> Option<NodeRef<XmlDocumentFragment>> {
        if let XmlNode::DocumentFragment(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_notation(&self) -> Option<NodeRef<XmlNotation>> {
        if let XmlNode::Notation(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }
}

impl From<NodeRef<XmlElement>> for XmlNode {
    fn from(value: NodeRef<XmlElement>) -> Self {
        XmlNode::Element(value)
    }
}

impl From<NodeRef<XmlAttr>> for XmlNode {
    fn from(value: NodeRef<XmlAttr>) -> Self {
        XmlNode::Attribute(value)
    }
}

impl From<NodeRef<XmlCharacterData>> for XmlNode {
    fn from(value: NodeRef<XmlCharacterData>) -> Self {
        let kind = value.borrow().kind;
        match kind {
            CharacterDataKind::Text => XmlNode::Text(value),
            CharacterDataKind::CData => XmlNode::CData(value),
            CharacterDataKind::Comment => XmlNode::Comment(value),
        }
    }
}

impl From<NodeRef<XmlEntityReference>> for XmlNode {
    fn from(value: NodeRef<XmlEntityReference>) -> Self {
        XmlNode::EntityReference(value)
    }
}

impl From<NodeRef<XmlEntity>> for XmlNode {
    fn from(value: NodeRef<XmlEntity>) -> Self {
        XmlNode::Entity(value)
    }
}

impl From<NodeRef<XmlProcessingInstruction>> for XmlNode {
    fn from(value: NodeRef<XmlProcessingInstruction>) -> Self {
        XmlNode::PI(value)
    }
}

impl From<NodeRef<XmlDocument>> for XmlNode {
    fn from(value: NodeRef<XmlDocument>) -> Self {
        XmlNode::Document(value)
    }
}

impl From<NodeRef<XmlDocumentType>> for XmlNode {
    fn from(value: NodeRef<XmlDocumentType>) -> Self {
        XmlNode::DocumentType(value)
    }
}

impl From<NodeRef<XmlDocumentFragment>> for XmlNode {
    fn from(value: NodeRef<XmlDocumentFragment>) -> Self {
        XmlNode::DocumentFragment(value)
    }
}

impl From<NodeRef<XmlNotation>> for XmlNode {
    fn from(value: NodeRef<XmlNotation>) -> Self {
        XmlNode::Notation(value)
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) enum WeakNode {
    Element(WeakRef<XmlElement>),
    Attribute(WeakRef<XmlAttr>),
    Document(WeakRef<XmlDocument>),
    DocumentFragment(WeakRef<XmlDocumentFragment>),
}

impl WeakNode {
    fn upgrade(&self) -> Option<XmlNode> {
        match self {
            WeakNode::Element(v) => v.upgrade().map(XmlNode::Element),
            WeakNode::Attribute(v) => v.upgrade().map(XmlNode::Attribute),
            WeakNode::Document(v) => v.upgrade().map(XmlNode::Document),
            WeakNode::DocumentFragment(v) => v.upgrade().map(XmlNode::DocumentFragment),
        }
    }
}

fn downgrade(value: &XmlNode) -> Option<WeakNode> {
    match value {
        XmlNode::Element(v) => Some(WeakNode::Element(Rc::downgrade(v))),
        XmlNode::Attribute(v) => Some(WeakNode::Attribute(Rc::downgrade(v))),
        XmlNode::Document(v) => Some(WeakNode::Document(Rc::downgrade(v))),
        XmlNode::DocumentFragment(v) => Some(WeakNode::DocumentFragment(Rc::downgrade(v))),
        _ => None,
    }
}

// -----------------------------------------------------------------------------------------------

pub trait AsNode {
    fn as_node(&self) -> XmlNode;
}

impl AsNode for XmlNode {
    fn as_node(&self) -> XmlNode {
        self.clone()
    }
}

impl AsNode for NodeRef<XmlElement> {
    fn as_node(&self) -> XmlNode {
        XmlNode::Element(self.clone())
    }
}

impl AsNode for NodeRef<XmlAttr> {
    fn as_node(&self) -> XmlNode {
        XmlNode::Attribute(self.clone())
    }
}

impl AsNode for NodeRef<XmlCharacterData> {
    fn as_node(&self) -> XmlNode {
        XmlNode::from(self.clone())
    }
}

impl AsNode for NodeRef<XmlEntityReference> {
    fn as_node(&self) -> XmlNode {
        XmlNode::EntityReference(self.clone())
    }
}

impl AsNode for NodeRef<XmlEntity> {
    fn as_node(&self) -> XmlNode {
        XmlNode::Entity(self.clone())
    }
}

impl AsNode for NodeRef<XmlProcessingInstruction> {
    fn as_node(&self) -> XmlNode {
        XmlNode::PI(self.clone())
    }
}

impl AsNode for NodeRef<XmlDocument> {
    fn as_node(&self) -> XmlNode {
        XmlNode::Document(self.clone())
    }
}

impl AsNode for NodeRef<XmlDocumentType> {
    fn as_node(&self) -> XmlNode {
        XmlNode::DocumentType(self.clone())
    }
}

impl AsNode for NodeRef<XmlDocumentFragment> {
    fn as_node(&self) -> XmlNode {
        XmlNode::DocumentFragment(self.clone())
    }
}

impl AsNode for NodeRef<XmlNotation> {
    fn as_node(&self) -> XmlNode {
        XmlNode::Notation(self.clone())
    }
}

// -----------------------------------------------------------------------------------------------

pub trait Node: AsNode {
    fn node_name(&self) -> String {
        name_of(&self.as_node())
    }

    fn node_value(&self) -> Option<String> {
        value_of(&self.as_node())
    }

    fn set_node_value(&self, value: &str) -> Result<()> {
        set_value_of(&self.as_node(), value)
    }

    fn node_type(&self) -> NodeType {
        type_of(&self.as_node())
    }

    fn parent_node(&self) -> Option<XmlNode> {
        parent_of(&self.as_node())
    }

    fn child_nodes(&self) -> XmlNodeList {
        XmlNodeList::children(self.as_node())
    }

    fn first_child(&self) -> Option<XmlNode> {
        children_of(&self.as_node()).first().cloned()
    }

    fn last_child(&self) -> Option<XmlNode> {
        children_of(&self.as_node()).last().cloned()
    }

    fn previous_sibling(&self) -> Option<XmlNode> {
        sibling_of(&self.as_node(), -1)
    }

    fn next_sibling(&self) -> Option<XmlNode> {
        sibling_of(&self.as_node(), 1)
    }

    fn attributes(&self) -> Option<XmlNamedNodeMap> {
        match self.as_node() {
            XmlNode::Element(v) => Some(XmlNamedNodeMap::attributes(v)),
            _ => None,
        }
    }

    fn owner_document(&self) -> Option<NodeRef<XmlDocument>> {
        owner_of(&self.as_node())
    }

    fn insert_before(&self, new_child: XmlNode, ref_child: Option<&XmlNode>) -> Result<XmlNode> {
        insert_before_node(&self.as_node(), new_child, ref_child)
    }

    fn append_child(&self, new_child: XmlNode) -> Result<XmlNode> {
        insert_before_node(&self.as_node(), new_child, None)
    }

    fn replace_child(&self, new_child: XmlNode, old_child: &XmlNode) -> Result<XmlNode> {
        replace_child_node(&self.as_node(), new_child, old_child)
    }

    fn remove_child(&self, old_child: &XmlNode) -> Result<XmlNode> {
        remove_child_node(&self.as_node(), old_child)
    }

    fn has_child_nodes(&self) -> bool {
        !children_of(&self.as_node()).is_empty()
    }

    fn has_attributes(&self) -> bool {
        match self.as_node() {
            XmlNode::Element(v) => !v.borrow().attributes.is_empty(),
            _ => false,
        }
    }

    fn clone_node(&self, deep: bool) -> XmlNode {
        let this = self.as_node();
        copy_subtree(&this, deep, &owner_weak_of(&this))
    }

    fn normalize(&self) {
        normalize_node(&self.as_node());
    }

    fn namespace_uri(&self) -> Option<String> {
        match self.as_node() {
            XmlNode::Element(v) => v.borrow().namespace_uri.clone(),
            XmlNode::Attribute(v) => v.borrow().namespace_uri.clone(),
            _ => None,
        }
    }

    fn prefix(&self) -> Option<String> {
        match self.as_node() {
            XmlNode::Element(v) => v.borrow().prefix.clone(),
            XmlNode::Attribute(v) => v.borrow().prefix.clone(),
            _ => None,
        }
    }

    fn set_prefix(&self, prefix: Option<&str>) -> Result<()> {
        set_prefix_of(&self.as_node(), prefix)
    }

    fn local_name(&self) -> Option<String> {
        match self.as_node() {
            XmlNode::Element(v) => Some(v.borrow().local_name.clone()),
            XmlNode::Attribute(v) => Some(v.borrow().local_name.clone()),
            _ => None,
        }
    }
}

impl<T: AsNode> Node for T {}

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct XmlDomImplementation;

impl XmlDomImplementation {
    pub fn has_feature(&self, feature: &str, version: Option<&str>) -> bool {
        feature.eq_ignore_ascii_case("xml")
            && version.map(|v| v == "1.0" || v == "2.0").unwrap_or(true)
    }

    pub fn create_document_type(
        &self,
        qualified_name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<NodeRef<XmlDocumentType>> {
        if !xdom_nom::is_name(qualified_name) {
            return Err(DomException::InvalidCharacter);
        }
        if xdom_nom::split_qname(qualified_name).is_none() {
            return Err(DomException::Namespace);
        }

        Ok(node(XmlDocumentType {
            name: qualified_name.to_string(),
            public_id: public_id.map(String::from),
            system_id: system_id.map(String::from),
            internal_subset: None,
            entities: vec![],
            notations: vec![],
            parent: None,
            owner: None,
        }))
    }

    pub fn create_document(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: Option<&str>,
        doctype: Option<NodeRef<XmlDocumentType>>,
    ) -> Result<NodeRef<XmlDocument>> {
        let doc = match doctype {
            Some(doctype) => XmlDocument::with_doctype(doctype)?,
            None => XmlDocument::new(),
        };

        if let Some(qualified_name) = qualified_name {
            let root = doc.create_element_ns(namespace_uri, qualified_name)?;
            doc.append_child(root.as_node())?;
        }

        Ok(doc)
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlDocument {
    children: Vec<XmlNode>,
    pub(crate) version: Option<String>,
    pub(crate) encoding: Option<String>,
    pub(crate) standalone: Option<bool>,
}

impl XmlDocument {
    pub fn new() -> NodeRef<XmlDocument> {
        node(XmlDocument {
            children: vec![],
            version: None,
            encoding: None,
            standalone: None,
        })
    }

    /// Builds a document with a document-type child; the only way to attach
    /// one.
    pub fn with_doctype(doctype: NodeRef<XmlDocumentType>) -> Result<NodeRef<XmlDocument>> {
        let doc = Self::new();
        attach_doctype(&doc, doctype)?;
        Ok(doc)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn standalone(&self) -> Option<bool> {
        self.standalone
    }
}

pub(crate) fn attach_doctype(
    doc: &NodeRef<XmlDocument>,
    doctype: NodeRef<XmlDocumentType>,
) -> Result<()> {
    {
        let mut inner = doctype.borrow_mut();
        if inner.owner.is_some() {
            return Err(DomException::WrongDocument);
        }
        inner.owner = Some(Rc::downgrade(doc));
        inner.parent = Some(WeakNode::Document(Rc::downgrade(doc)));
    }
    doc.borrow_mut()
        .children
        .push(XmlNode::DocumentType(doctype));
    Ok(())
}

pub trait Document {
    fn doc_type(&self) -> Option<NodeRef<XmlDocumentType>>;

    fn implementation(&self) -> XmlDomImplementation;

    fn document_element(&self) -> Option<NodeRef<XmlElement>>;

    fn create_element(&self, tag_name: &str) -> Result<NodeRef<XmlElement>>;

    fn create_element_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeRef<XmlElement>>;

    fn create_attribute(&self, name: &str) -> Result<NodeRef<XmlAttr>>;

    fn create_attribute_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeRef<XmlAttr>>;

    fn create_text_node(&self, data: &str) -> NodeRef<XmlCharacterData>;

    fn create_cdata_section(&self, data: &str) -> NodeRef<XmlCharacterData>;

    fn create_comment(&self, data: &str) -> NodeRef<XmlCharacterData>;

    fn create_processing_instruction(
        &self,
        target: &str,
        data: &str,
    ) -> Result<NodeRef<XmlProcessingInstruction>>;

    fn create_entity_reference(&self, name: &str) -> Result<NodeRef<XmlEntityReference>>;

    fn create_document_fragment(&self) -> NodeRef<XmlDocumentFragment>;

    fn get_elements_by_tag_name(&self, tag_name: &str) -> XmlNodeList;

    fn get_elements_by_tag_name_ns(&self, namespace_uri: &str, local_name: &str) -> XmlNodeList;

    /// Always `None`: no attribute is known to be of the ID type without a
    /// registration mechanism, which this model does not provide.
    fn get_element_by_id(&self, id: &str) -> Option<NodeRef<XmlElement>>;

    fn import_node(&self, source: &XmlNode, deep: bool) -> Result<XmlNode>;
}

impl Document for NodeRef<XmlDocument> {
    fn doc_type(&self) -> Option<NodeRef<XmlDocumentType>> {
        self.borrow()
            .children
            .iter()
            .find_map(|v| v.as_document_type())
    }

    fn implementation(&self) -> XmlDomImplementation {
        XmlDomImplementation {}
    }

    fn document_element(&self) -> Option<NodeRef<XmlElement>> {
        self.borrow().children.iter().find_map(|v| v.as_element())
    }

    fn create_element(&self, tag_name: &str) -> Result<NodeRef<XmlElement>> {
        if !xdom_nom::is_name(tag_name) {
            return Err(DomException::InvalidCharacter);
        }

        Ok(node(XmlElement {
            local_name: tag_name.to_string(),
            prefix: None,
            namespace_uri: None,
            attributes: vec![],
            children: vec![],
            parent: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_element_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeRef<XmlElement>> {
        let (uri, prefix, local_name) = validate_qualified_name(namespace_uri, qualified_name, false)?;

        Ok(node(XmlElement {
            local_name,
            prefix,
            namespace_uri: uri,
            attributes: vec![],
            children: vec![],
            parent: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_attribute(&self, name: &str) -> Result<NodeRef<XmlAttr>> {
        if !xdom_nom::is_name(name) {
            return Err(DomException::InvalidCharacter);
        }

        Ok(node(XmlAttr {
            local_name: name.to_string(),
            prefix: None,
            namespace_uri: None,
            children: vec![],
            specified: true,
            owner_element: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_attribute_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeRef<XmlAttr>> {
        let (uri, prefix, local_name) = validate_qualified_name(namespace_uri, qualified_name, true)?;

        Ok(node(XmlAttr {
            local_name,
            prefix,
            namespace_uri: uri,
            children: vec![],
            specified: true,
            owner_element: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_text_node(&self, data: &str) -> NodeRef<XmlCharacterData> {
        node(XmlCharacterData {
            kind: CharacterDataKind::Text,
            data: data.to_string(),
            parent: None,
            owner: Rc::downgrade(self),
        })
    }

    fn create_cdata_section(&self, data: &str) -> NodeRef<XmlCharacterData> {
        node(XmlCharacterData {
            kind: CharacterDataKind::CData,
            data: data.to_string(),
            parent: None,
            owner: Rc::downgrade(self),
        })
    }

    fn create_comment(&self, data: &str) -> NodeRef<XmlCharacterData> {
        node(XmlCharacterData {
            kind: CharacterDataKind::Comment,
            data: data.to_string(),
            parent: None,
            owner: Rc::downgrade(self),
        })
    }

    fn create_processing_instruction(
        &self,
        target: &str,
        data: &str,
    ) -> Result<NodeRef<XmlProcessingInstruction>> {
        if !xdom_nom::is_name(target) {
            return Err(DomException::InvalidCharacter);
        }

        Ok(node(XmlProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
            parent: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_entity_reference(&self, name: &str) -> Result<NodeRef<XmlEntityReference>> {
        if !xdom_nom::is_name(name) {
            return Err(DomException::InvalidCharacter);
        }

        Ok(node(XmlEntityReference {
            name: name.to_string(),
            parent: None,
            owner: Rc::downgrade(self),
        }))
    }

    fn create_document_fragment(&self) -> NodeRef<XmlDocumentFragment> {
        node(XmlDocumentFragment {
            children: vec![],
            owner: Rc::downgrade(self),
        })
    }

    fn get_elements_by_tag_name(&self, tag_name: &str) -> XmlNodeList {
        XmlNodeList::by_tag_name(self.as_node(), tag_name)
    }

    fn get_elements_by_tag_name_ns(&self, namespace_uri: &str, local_name: &str) -> XmlNodeList {
        XmlNodeList::by_tag_name_ns(self.as_node(), namespace_uri, local_name)
    }

    fn get_element_by_id(&self, _id: &str) -> Option<NodeRef<XmlElement>> {
        None
    }

    fn import_node(&self, source: &XmlNode, deep: bool) -> Result<XmlNode> {
        match source {
            XmlNode::Document(_) | XmlNode::DocumentType(_) => Err(DomException::NotSupported),
            _ => Ok(copy_subtree(source, deep, &Rc::downgrade(self))),
        }
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlElement {
    local_name: String,
    prefix: Option<String>,
    namespace_uri: Option<String>,
    attributes: Vec<NodeRef<XmlAttr>>,
    children: Vec<XmlNode>,
    parent: Option<WeakNode>,
    owner: WeakRef<XmlDocument>,
}

impl XmlElement {
    fn qualified_name(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

pub trait Element {
    fn tag_name(&self) -> String;

    fn get_attribute(&self, name: &str) -> String;

    fn get_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> String;

    fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

    fn set_attribute_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<()>;

    fn remove_attribute(&self, name: &str);

    fn remove_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str);

    fn get_attribute_node(&self, name: &str) -> Option<NodeRef<XmlAttr>>;

    fn get_attribute_node_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<NodeRef<XmlAttr>>;

    fn set_attribute_node(&self, attr: NodeRef<XmlAttr>) -> Result<Option<NodeRef<XmlAttr>>>;

    fn set_attribute_node_ns(&self, attr: NodeRef<XmlAttr>) -> Result<Option<NodeRef<XmlAttr>>>;

    fn remove_attribute_node(&self, attr: &NodeRef<XmlAttr>) -> Result<NodeRef<XmlAttr>>;

    fn has_attribute(&self, name: &str) -> bool;

    fn has_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> bool;

    fn get_elements_by_tag_name(&self, tag_name: &str) -> XmlNodeList;

    fn get_elements_by_tag_name_ns(&self, namespace_uri: &str, local_name: &str) -> XmlNodeList;
}

impl Element for NodeRef<XmlElement> {
    fn tag_name(&self) -> String {
        self.borrow().qualified_name()
    }

    fn get_attribute(&self, name: &str) -> String {
        self.get_attribute_node(name)
            .map(|v| v.value())
            .unwrap_or_default()
    }

    fn get_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> String {
        self.get_attribute_node_ns(namespace_uri, local_name)
            .map(|v| v.value())
            .unwrap_or_default()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        if !xdom_nom::is_name(name) {
            return Err(DomException::InvalidCharacter);
        }

        if let Some(attr) = self.get_attribute_node(name) {
            attr.set_value(value);
            return Ok(());
        }

        let owner = self.borrow().owner.clone();
        let attr = node(XmlAttr {
            local_name: name.to_string(),
            prefix: None,
            namespace_uri: None,
            children: vec![],
            specified: true,
            owner_element: Some(Rc::downgrade(self)),
            owner,
        });
        attr.set_value(value);
        self.borrow_mut().attributes.push(attr);
        Ok(())
    }

    fn set_attribute_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<()> {
        let (uri, prefix, local_name) = validate_qualified_name(namespace_uri, qualified_name, true)?;

        if let Some(attr) = self.get_attribute_node_ns(uri.as_deref(), &local_name) {
            attr.borrow_mut().prefix = prefix;
            attr.set_value(value);
            return Ok(());
        }

        let owner = self.borrow().owner.clone();
        let attr = node(XmlAttr {
            local_name,
            prefix,
            namespace_uri: uri,
            children: vec![],
            specified: true,
            owner_element: Some(Rc::downgrade(self)),
            owner,
        });
        attr.set_value(value);
        self.borrow_mut().attributes.push(attr);
        Ok(())
    }

    fn remove_attribute(&self, name: &str) {
        let pos = self
            .borrow()
            .attributes
            .iter()
            .position(|v| v.name() == name);
        if let Some(pos) = pos {
            let attr = self.borrow_mut().attributes.remove(pos);
            attr.borrow_mut().owner_element = None;
        }
    }

    fn remove_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) {
        let pos = self.borrow().attributes.iter().position(|v| {
            let v = v.borrow();
            v.namespace_uri.as_deref() == namespace_uri && v.local_name == local_name
        });
        if let Some(pos) = pos {
            let attr = self.borrow_mut().attributes.remove(pos);
            attr.borrow_mut().owner_element = None;
        }
    }

    fn get_attribute_node(&self, name: &str) -> Option<NodeRef<XmlAttr>> {
        self.borrow()
            .attributes
            .iter()
            .find(|v| v.name() == name)
            .cloned()
    }

    fn get_attribute_node_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<NodeRef<XmlAttr>> {
        self.borrow()
            .attributes
            .iter()
            .find(|v| {
                let v = v.borrow();
                v.namespace_uri.as_deref() == namespace_uri && v.local_name == local_name
            })
            .cloned()
    }

    fn set_attribute_node(&self, attr: NodeRef<XmlAttr>) -> Result<Option<NodeRef<XmlAttr>>> {
        let map = XmlNamedNodeMap::attributes(self.clone());
        let old = map.set_named_item(XmlNode::Attribute(attr))?;
        Ok(old.and_then(|v| v.as_attribute()))
    }

    fn set_attribute_node_ns(&self, attr: NodeRef<XmlAttr>) -> Result<Option<NodeRef<XmlAttr>>> {
        let map = XmlNamedNodeMap::attributes(self.clone());
        let old = map.set_named_item_ns(XmlNode::Attribute(attr))?;
        Ok(old.and_then(|v| v.as_attribute()))
    }

    fn remove_attribute_node(&self, attr: &NodeRef<XmlAttr>) -> Result<NodeRef<XmlAttr>> {
        let pos = self
            .borrow()
            .attributes
            .iter()
            .position(|v| Rc::ptr_eq(v, attr));
        match pos {
            Some(pos) => {
                let attr = self.borrow_mut().attributes.remove(pos);
                attr.borrow_mut().owner_element = None;
                Ok(attr)
            }
            None => Err(DomException::NotFound),
        }
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute_node(name).is_some()
    }

    fn has_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> bool {
        self.get_attribute_node_ns(namespace_uri, local_name).is_some()
    }

    fn get_elements_by_tag_name(&self, tag_name: &str) -> XmlNodeList {
        XmlNodeList::by_tag_name(self.as_node(), tag_name)
    }

    fn get_elements_by_tag_name_ns(&self, namespace_uri: &str, local_name: &str) -> XmlNodeList {
        XmlNodeList::by_tag_name_ns(self.as_node(), namespace_uri, local_name)
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlAttr {
    local_name: String,
    prefix: Option<String>,
    namespace_uri: Option<String>,
    children: Vec<XmlNode>,
    specified: bool,
    owner_element: Option<WeakRef<XmlElement>>,
    owner: WeakRef<XmlDocument>,
}

impl XmlAttr {
    fn qualified_name(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

pub trait Attr {
    fn name(&self) -> String;

    fn specified(&self) -> bool;

    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    fn owner_element(&self) -> Option<NodeRef<XmlElement>>;
}

impl Attr for NodeRef<XmlAttr> {
    fn name(&self) -> String {
        self.borrow().qualified_name()
    }

    fn specified(&self) -> bool {
        self.borrow().specified
    }

    fn value(&self) -> String {
        let mut value = String::new();
        for child in self.borrow().children.as_slice() {
            if let Some(text) = child.as_character_data() {
                value.push_str(text.borrow().data.as_str());
            }
        }
        value
    }

    fn set_value(&self, value: &str) {
        let owner = self.borrow().owner.clone();
        let text = node(XmlCharacterData {
            kind: CharacterDataKind::Text,
            data: value.to_string(),
            parent: Some(WeakNode::Attribute(Rc::downgrade(self))),
            owner,
        });

        let mut inner = self.borrow_mut();
        for child in inner.children.as_slice() {
            set_parent(child, None);
        }
        inner.children = vec![XmlNode::Text(text)];
        inner.specified = true;
    }

    fn owner_element(&self) -> Option<NodeRef<XmlElement>> {
        self.borrow()
            .owner_element
            .as_ref()
            .and_then(|v| v.upgrade())
    }
}

// -----------------------------------------------------------------------------------------------

/// Text, CDATA section and comment, distinguished by `kind`.
#[derive(Debug)]
pub struct XmlCharacterData {
    kind: CharacterDataKind,
    data: String,
    parent: Option<WeakNode>,
    owner: WeakRef<XmlDocument>,
}

impl XmlCharacterData {
    pub fn kind(&self) -> CharacterDataKind {
        self.kind
    }
}

pub trait CharacterData {
    fn data(&self) -> String;

    fn set_data(&self, data: &str);

    fn length(&self) -> usize;

    fn substring_data(&self, offset: usize, count: usize) -> Result<String>;

    fn append_data(&self, data: &str);

    fn insert_data(&self, offset: usize, data: &str) -> Result<()>;

    fn delete_data(&self, offset: usize, count: usize) -> Result<()>;

    fn replace_data(&self, offset: usize, count: usize, data: &str) -> Result<()>;
}

impl CharacterData for NodeRef<XmlCharacterData> {
    fn data(&self) -> String {
        self.borrow().data.clone()
    }

    fn set_data(&self, data: &str) {
        self.borrow_mut().data = data.to_string();
    }

    fn length(&self) -> usize {
        self.borrow().data.chars().count()
    }

    fn substring_data(&self, offset: usize, count: usize) -> Result<String> {
        let inner = self.borrow();
        let start = byte_offset(&inner.data, offset)?;
        let end = byte_offset_clamped(&inner.data, offset + count);
        Ok(inner.data[start..end].to_string())
    }

    fn append_data(&self, data: &str) {
        self.borrow_mut().data.push_str(data);
    }

    fn insert_data(&self, offset: usize, data: &str) -> Result<()> {
        let mut inner = self.borrow_mut();
        let at = byte_offset(&inner.data, offset)?;
        inner.data.insert_str(at, data);
        Ok(())
    }

    fn delete_data(&self, offset: usize, count: usize) -> Result<()> {
        let mut inner = self.borrow_mut();
        let start = byte_offset(&inner.data, offset)?;
        let end = byte_offset_clamped(&inner.data, offset + count);
        inner.data.replace_range(start..end, "");
        Ok(())
    }

    fn replace_data(&self, offset: usize, count: usize, data: &str) -> Result<()> {
        let mut inner = self.borrow_mut();
        let start = byte_offset(&inner.data, offset)?;
        let end = byte_offset_clamped(&inner.data, offset + count);
        inner.data.replace_range(start..end, data);
        Ok(())
    }
}

pub trait Text: CharacterData {
    fn split_text(&self, offset: usize) -> Result<NodeRef<XmlCharacterData>>;
}

impl Text for NodeRef<XmlCharacterData> {
    fn split_text(&self, offset: usize) -> Result<NodeRef<XmlCharacterData>> {
        let (kind, tail, owner, parent) = {
            let mut inner = self.borrow_mut();
            if inner.kind == CharacterDataKind::Comment {
                return Err(DomException::NotSupported);
            }

            let at = byte_offset(&inner.data, offset)?;
            let tail = inner.data.split_off(at);
            (inner.kind, tail, inner.owner.clone(), inner.parent.clone())
        };

        let new = node(XmlCharacterData {
            kind,
            data: tail,
            parent: None,
            owner,
        });

        if let Some(parent) = parent.as_ref().and_then(|v| v.upgrade()) {
            let this = self.as_node();
            let pos = index_of(&parent, &this);
            if let Some(pos) = pos {
                with_children_mut(&parent, |children| {
                    children.insert(pos + 1, XmlNode::from(new.clone()))
                });
                set_parent(&XmlNode::from(new.clone()), downgrade(&parent));
            }
        }

        Ok(new)
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlProcessingInstruction {
    target: String,
    data: String,
    parent: Option<WeakNode>,
    owner: WeakRef<XmlDocument>,
}

pub trait ProcessingInstruction {
    fn target(&self) -> String;

    fn data(&self) -> String;

    fn set_data(&self, data: &str);
}

impl ProcessingInstruction for NodeRef<XmlProcessingInstruction> {
    fn target(&self) -> String {
        self.borrow().target.clone()
    }

    fn data(&self) -> String {
        self.borrow().data.clone()
    }

    fn set_data(&self, data: &str) {
        self.borrow_mut().data = data.to_string();
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlEntityReference {
    name: String,
    parent: Option<WeakNode>,
    owner: WeakRef<XmlDocument>,
}

impl XmlEntityReference {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlEntity {
    name: String,
    public_id: Option<String>,
    system_id: Option<String>,
    notation_name: Option<String>,
    owner: WeakRef<XmlDocument>,
}

pub trait Entity {
    fn public_id(&self) -> Option<String>;

    fn system_id(&self) -> Option<String>;

    fn notation_name(&self) -> Option<String>;
}

impl Entity for NodeRef<XmlEntity> {
    fn public_id(&self) -> Option<String> {
        self.borrow().public_id.clone()
    }

    fn system_id(&self) -> Option<String> {
        self.borrow().system_id.clone()
    }

    fn notation_name(&self) -> Option<String> {
        self.borrow().notation_name.clone()
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlNotation {
    name: String,
    public_id: Option<String>,
    system_id: Option<String>,
    owner: WeakRef<XmlDocument>,
}

pub trait Notation {
    fn public_id(&self) -> Option<String>;

    fn system_id(&self) -> Option<String>;
}

impl Notation for NodeRef<XmlNotation> {
    fn public_id(&self) -> Option<String> {
        self.borrow().public_id.clone()
    }

    fn system_id(&self) -> Option<String> {
        self.borrow().system_id.clone()
    }
}

// -----------------------------------------------------------------------------------------------

/// Built once, frozen after parse.
#[derive(Debug)]
pub struct XmlDocumentType {
    name: String,
    public_id: Option<String>,
    system_id: Option<String>,
    internal_subset: Option<String>,
    entities: Vec<NodeRef<XmlEntity>>,
    notations: Vec<NodeRef<XmlNotation>>,
    parent: Option<WeakNode>,
    owner: Option<WeakRef<XmlDocument>>,
}

impl XmlDocumentType {
    pub fn new(
        qualified_name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<NodeRef<XmlDocumentType>> {
        XmlDomImplementation {}.create_document_type(qualified_name, public_id, system_id)
    }
}

pub trait DocumentType {
    fn name(&self) -> String;

    fn public_id(&self) -> Option<String>;

    fn system_id(&self) -> Option<String>;

    fn internal_subset(&self) -> Option<String>;

    fn entities(&self) -> XmlNamedNodeMap;

    fn notations(&self) -> XmlNamedNodeMap;
}

impl DocumentType for NodeRef<XmlDocumentType> {
    fn name(&self) -> String {
        self.borrow().name.clone()
    }

    fn public_id(&self) -> Option<String> {
        self.borrow().public_id.clone()
    }

    fn system_id(&self) -> Option<String> {
        self.borrow().system_id.clone()
    }

    fn internal_subset(&self) -> Option<String> {
        self.borrow().internal_subset.clone()
    }

    fn entities(&self) -> XmlNamedNodeMap {
        XmlNamedNodeMap {
            store: MapStore::Entities(self.clone()),
        }
    }

    fn notations(&self) -> XmlNamedNodeMap {
        XmlNamedNodeMap {
            store: MapStore::Notations(self.clone()),
        }
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct XmlDocumentFragment {
    children: Vec<XmlNode>,
    owner: WeakRef<XmlDocument>,
}

// -----------------------------------------------------------------------------------------------

/// An unordered attribute collection keyed both by qualified name and by
/// (namespace URI, local name); also the read-only entity and notation
/// collections of a document type.
#[derive(Clone, Debug)]
pub struct XmlNamedNodeMap {
    store: MapStore,
}

#[derive(Clone, Debug)]
enum MapStore {
    Attributes(NodeRef<XmlElement>),
    Entities(NodeRef<XmlDocumentType>),
    Notations(NodeRef<XmlDocumentType>),
}

impl XmlNamedNodeMap {
    pub(crate) fn attributes(element: NodeRef<XmlElement>) -> Self {
        XmlNamedNodeMap {
            store: MapStore::Attributes(element),
        }
    }

    fn items(&self) -> Vec<XmlNode> {
        match &self.store {
            MapStore::Attributes(element) => element
                .borrow()
                .attributes
                .iter()
                .cloned()
                .map(XmlNode::Attribute)
                .collect(),
            MapStore::Entities(doctype) => doctype
                .borrow()
                .entities
                .iter()
                .cloned()
                .map(XmlNode::Entity)
                .collect(),
            MapStore::Notations(doctype) => doctype
                .borrow()
                .notations
                .iter()
                .cloned()
                .map(XmlNode::Notation)
                .collect(),
        }
    }

    pub fn get_named_item(&self, name: &str) -> Option<XmlNode> {
        self.items().into_iter().find(|v| v.node_name() == name)
    }

    pub fn get_named_item_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<XmlNode> {
        self.items().into_iter().find(|v| {
            v.namespace_uri().as_deref() == namespace_uri
                && v.local_name().as_deref() == Some(local_name)
        })
    }

    pub fn set_named_item(&self, item: XmlNode) -> Result<Option<XmlNode>> {
        self.set_item(item, false)
    }

    pub fn set_named_item_ns(&self, item: XmlNode) -> Result<Option<XmlNode>> {
        self.set_item(item, true)
    }

    fn set_item(&self, item: XmlNode, by_namespace: bool) -> Result<Option<XmlNode>> {
        let element = match &self.store {
            MapStore::Attributes(element) => element,
            _ => return Err(DomException::NoModificationAllowed),
        };

        let attr = item.as_attribute().ok_or(DomException::HierarchyRequest)?;

        let element_doc = element.borrow().owner.upgrade();
        let attr_doc = attr.borrow().owner.upgrade();
        match (element_doc, attr_doc) {
            (Some(a), Some(b)) if Rc::ptr_eq(&a, &b) => {}
            _ => return Err(DomException::WrongDocument),
        }

        if let Some(current) = attr.borrow().owner_element.as_ref().and_then(|v| v.upgrade()) {
            if !Rc::ptr_eq(&current, element) {
                return Err(DomException::InuseAttribute);
            }
        }

        let pos = {
            let inner = element.borrow();
            inner.attributes.iter().position(|v| {
                if by_namespace {
                    let v = v.borrow();
                    let a = attr.borrow();
                    v.namespace_uri == a.namespace_uri && v.local_name == a.local_name
                } else {
                    v.name() == attr.name()
                }
            })
        };

        match pos {
            Some(pos) => {
                let old = element.borrow().attributes[pos].clone();
                if Rc::ptr_eq(&old, &attr) {
                    return Ok(Some(XmlNode::Attribute(old)));
                }
                old.borrow_mut().owner_element = None;
                attr.borrow_mut().owner_element = Some(Rc::downgrade(element));
                element.borrow_mut().attributes[pos] = attr;
                Ok(Some(XmlNode::Attribute(old)))
            }
            None => {
                attr.borrow_mut().owner_element = Some(Rc::downgrade(element));
                element.borrow_mut().attributes.push(attr);
                Ok(None)
            }
        }
    }

    pub fn remove_named_item(&self, name: &str) -> Result<XmlNode> {
        let element = match &self.store {
            MapStore::Attributes(element) => element,
            _ => return Err(DomException::NoModificationAllowed),
        };

        let pos = element
            .borrow()
            .attributes
            .iter()
            .position(|v| v.name() == name)
            .ok_or(DomException::NotFound)?;
        let attr = element.borrow_mut().attributes.remove(pos);
        attr.borrow_mut().owner_element = None;
        Ok(XmlNode::Attribute(attr))
    }

    pub fn remove_named_item_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Result<XmlNode> {
        let element = match &self.store {
            MapStore::Attributes(element) => element,
            _ => return Err(DomException::NoModificationAllowed),
        };

        let pos = element
            .borrow()
            .attributes
            .iter()
            .position(|v| {
                let v = v.borrow();
                v.namespace_uri.as_deref() == namespace_uri && v.local_name == local_name
            })
            .ok_or(DomException::NotFound)?;
        let attr = element.borrow_mut().attributes.remove(pos);
        attr.borrow_mut().owner_element = None;
        Ok(XmlNode::Attribute(attr))
    }

    pub fn item(&self, index: usize) -> Option<XmlNode> {
        self.items().get(index).cloned()
    }

    pub fn length(&self) -> usize {
        self.items().len()
    }
}

// -----------------------------------------------------------------------------------------------

/// A live, order-preserving view over the current tree state.
#[derive(Clone, Debug)]
pub struct XmlNodeList {
    view: ListView,
}

#[derive(Clone, Debug)]
enum ListView {
    Children(XmlNode),
    TagName {
        root: XmlNode,
        name: String,
    },
    TagNameNs {
        root: XmlNode,
        namespace_uri: String,
        local_name: String,
    },
}

impl XmlNodeList {
    pub(crate) fn children(parent: XmlNode) -> Self {
        XmlNodeList {
            view: ListView::Children(parent),
        }
    }

    pub(crate) fn by_tag_name(root: XmlNode, name: &str) -> Self {
        XmlNodeList {
            view: ListView::TagName {
                root,
                name: name.to_string(),
            },
        }
    }

    pub(crate) fn by_tag_name_ns(root: XmlNode, namespace_uri: &str, local_name: &str) -> Self {
        XmlNodeList {
            view: ListView::TagNameNs {
                root,
                namespace_uri: namespace_uri.to_string(),
                local_name: local_name.to_string(),
            },
        }
    }

    fn nodes(&self) -> Vec<XmlNode> {
        match &self.view {
            ListView::Children(parent) => children_of(parent),
            ListView::TagName { root, name } => {
                let mut nodes = vec![];
                collect_by_tag_name(root, name, &mut nodes);
                nodes
            }
            ListView::TagNameNs {
                root,
                namespace_uri,
                local_name,
            } => {
                let mut nodes = vec![];
                collect_by_tag_name_ns(root, namespace_uri, local_name, &mut nodes);
                nodes
            }
        }
    }

    pub fn item(&self, index: usize) -> Option<XmlNode> {
        self.nodes().get(index).cloned()
    }

    pub fn length(&self) -> usize {
        self.nodes().len()
    }

    pub fn iter(&self) -> std::vec::IntoIter<XmlNode> {
        self.nodes().into_iter()
    }
}

fn collect_by_tag_name(root: &XmlNode, name: &str, nodes: &mut Vec<XmlNode>) {
    for child in children_of(root) {
        if let XmlNode::Element(element) = &child {
            if name == "*" || element.borrow().qualified_name() == name {
                nodes.push(child.clone());
            }
        }
        collect_by_tag_name(&child, name, nodes);
    }
}

fn collect_by_tag_name_ns(
    root: &XmlNode,
    namespace_uri: &str,
    local_name: &str,
    nodes: &mut Vec<XmlNode>,
) {
    for child in children_of(root) {
        if let XmlNode::Element(element) = &child {
            let inner = element.borrow();
            let uri_match = match inner.namespace_uri.as_deref() {
                Some(uri) => namespace_uri == "*" || namespace_uri == uri,
                None => namespace_uri == "*" || namespace_uri.is_empty(),
            };
            if uri_match && (local_name == "*" || inner.local_name == local_name) {
                nodes.push(child.clone());
            }
        }
        collect_by_tag_name_ns(&child, namespace_uri, local_name, nodes);
    }
}

// -----------------------------------------------------------------------------------------------
// Tree access shared by the Node operations.

fn name_of(value: &XmlNode) -> String {
    match value {
        XmlNode::Element(v) => v.borrow().qualified_name(),
        XmlNode::Attribute(v) => v.borrow().qualified_name(),
        XmlNode::Text(_) => "#text".to_string(),
        XmlNode::CData(_) => "#cdata-section".to_string(),
        XmlNode::Comment(_) => "#comment".to_string(),
        XmlNode::EntityReference(v) => v.borrow().name.clone(),
        XmlNode::Entity(v) => v.borrow().name.clone(),
        XmlNode::PI(v) => v.borrow().target.clone(),
        XmlNode::Document(_) => "#document".to_string(),
        XmlNode::DocumentType(v) => v.borrow().name.clone(),
        XmlNode::DocumentFragment(_) => "#document-fragment".to_string(),
        XmlNode::Notation(v) => v.borrow().name.clone(),
    }
}

fn value_of(value: &XmlNode) -> Option<String> {
    match value {
        XmlNode::Attribute(v) => Some(v.value()),
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => Some(v.borrow().data.clone()),
        XmlNode::PI(v) => Some(v.borrow().data.clone()),
        _ => None,
    }
}

fn set_value_of(value: &XmlNode, data: &str) -> Result<()> {
    match value {
        XmlNode::Attribute(v) => {
            v.set_value(data);
            Ok(())
        }
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => {
            v.borrow_mut().data = data.to_string();
            Ok(())
        }
        XmlNode::PI(v) => {
            v.borrow_mut().data = data.to_string();
            Ok(())
        }
        XmlNode::EntityReference(_)
        | XmlNode::Entity(_)
        | XmlNode::Notation(_)
        | XmlNode::DocumentType(_) => Err(DomException::NoModificationAllowed),
        _ => Err(DomException::NoDataAllowed),
    }
}

fn type_of(value: &XmlNode) -> NodeType {
    match value {
        XmlNode::Element(_) => NodeType::Element,
        XmlNode::Attribute(_) => NodeType::Attribute,
        XmlNode::Text(_) => NodeType::Text,
        XmlNode::CData(_) => NodeType::CData,
        XmlNode::Comment(_) => NodeType::Comment,
        XmlNode::EntityReference(_) => NodeType::EntityReference,
        XmlNode::Entity(_) => NodeType::Entity,
        XmlNode::PI(_) => NodeType::PI,
        XmlNode::Document(_) => NodeType::Document,
        XmlNode::DocumentType(_) => NodeType::DocumentType,
        XmlNode::DocumentFragment(_) => NodeType::DocumentFragment,
        XmlNode::Notation(_) => NodeType::Notation,
    }
}

fn parent_of(value: &XmlNode) -> Option<XmlNode> {
    match value {
        XmlNode::Element(v) => v.borrow().parent.as_ref().and_then(|p| p.upgrade()),
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => {
            v.borrow().parent.as_ref().and_then(|p| p.upgrade())
        }
        XmlNode::EntityReference(v) => v.borrow().parent.as_ref().and_then(|p| p.upgrade()),
        XmlNode::PI(v) => v.borrow().parent.as_ref().and_then(|p| p.upgrade()),
        XmlNode::DocumentType(v) => v.borrow().parent.as_ref().and_then(|p| p.upgrade()),
        _ => None,
    }
}

fn children_of(value: &XmlNode) -> Vec<XmlNode> {
    match value {
        XmlNode::Element(v) => v.borrow().children.clone(),
        XmlNode::Attribute(v) => v.borrow().children.clone(),
        XmlNode::Document(v) => v.borrow().children.clone(),
        XmlNode::DocumentFragment(v) => v.borrow().children.clone(),
        _ => vec![],
    }
}

fn with_children_mut<R>(parent: &XmlNode, f: impl FnOnce(&mut Vec<XmlNode>) -> R) -> Option<R> {
    match parent {
        XmlNode::Element(v) => Some(f(&mut v.borrow_mut().children)),
        XmlNode::Attribute(v) => Some(f(&mut v.borrow_mut().children)),
        XmlNode::Document(v) => Some(f(&mut v.borrow_mut().children)),
        XmlNode::DocumentFragment(v) => Some(f(&mut v.borrow_mut().children)),
        _ => None,
    }
}

fn set_parent(child: &XmlNode, parent: Option<WeakNode>) {
    match child {
        XmlNode::Element(v) => v.borrow_mut().parent = parent,
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => {
            v.borrow_mut().parent = parent
        }
        XmlNode::EntityReference(v) => v.borrow_mut().parent = parent,
        XmlNode::PI(v) => v.borrow_mut().parent = parent,
        XmlNode::DocumentType(v) => v.borrow_mut().parent = parent,
        _ => {}
    }
}

fn owner_of(value: &XmlNode) -> Option<NodeRef<XmlDocument>> {
    match value {
        XmlNode::Element(v) => v.borrow().owner.upgrade(),
        XmlNode::Attribute(v) => v.borrow().owner.upgrade(),
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => v.borrow().owner.upgrade(),
        XmlNode::EntityReference(v) => v.borrow().owner.upgrade(),
        XmlNode::Entity(v) => v.borrow().owner.upgrade(),
        XmlNode::PI(v) => v.borrow().owner.upgrade(),
        XmlNode::Document(_) => None,
        XmlNode::DocumentType(v) => v.borrow().owner.as_ref().and_then(|w| w.upgrade()),
        XmlNode::DocumentFragment(v) => v.borrow().owner.upgrade(),
        XmlNode::Notation(v) => v.borrow().owner.upgrade(),
    }
}

fn owner_weak_of(value: &XmlNode) -> WeakRef<XmlDocument> {
    match value {
        XmlNode::Element(v) => v.borrow().owner.clone(),
        XmlNode::Attribute(v) => v.borrow().owner.clone(),
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => v.borrow().owner.clone(),
        XmlNode::EntityReference(v) => v.borrow().owner.clone(),
        XmlNode::Entity(v) => v.borrow().owner.clone(),
        XmlNode::PI(v) => v.borrow().owner.clone(),
        XmlNode::Document(v) => Rc::downgrade(v),
        XmlNode::DocumentType(v) => v.borrow().owner.clone().unwrap_or_default(),
        XmlNode::DocumentFragment(v) => v.borrow().owner.clone(),
        XmlNode::Notation(v) => v.borrow().owner.clone(),
    }
}

fn document_of(value: &XmlNode) -> Option<NodeRef<XmlDocument>> {
    match value {
        XmlNode::Document(v) => Some(v.clone()),
        _ => owner_of(value),
    }
}

fn sibling_of(value: &XmlNode, step: isize) -> Option<XmlNode> {
    let parent = parent_of(value)?;
    let children = children_of(&parent);
    let pos = children.iter().position(|v| v.is_same_node(value))?;
    let pos = pos.checked_add_signed(step)?;
    children.get(pos).cloned()
}

fn index_of(parent: &XmlNode, child: &XmlNode) -> Option<usize> {
    children_of(parent).iter().position(|v| v.is_same_node(child))
}

fn is_read_only(value: &XmlNode) -> bool {
    matches!(
        value,
        XmlNode::EntityReference(_)
            | XmlNode::Entity(_)
            | XmlNode::Notation(_)
            | XmlNode::DocumentType(_)
    )
}

fn is_ancestor_or_self(candidate: &XmlNode, node: &XmlNode) -> bool {
    let mut current = Some(node.clone());
    while let Some(value) = current {
        if value.is_same_node(candidate) {
            return true;
        }
        current = parent_of(&value);
    }
    false
}

fn can_contain(parent: &XmlNode, child: &XmlNode) -> bool {
    let child_type = type_of(child);
    match parent {
        XmlNode::Document(_) => matches!(
            child_type,
            NodeType::Element | NodeType::PI | NodeType::Comment
        ),
        XmlNode::Element(_) | XmlNode::DocumentFragment(_) => matches!(
            child_type,
            NodeType::Element
                | NodeType::Text
                | NodeType::CData
                | NodeType::Comment
                | NodeType::PI
                | NodeType::EntityReference
        ),
        XmlNode::Attribute(_) => {
            matches!(child_type, NodeType::Text | NodeType::EntityReference)
        }
        _ => false,
    }
}

fn validate_new_child(
    parent: &XmlNode,
    new_child: &XmlNode,
    replaced: Option<&XmlNode>,
) -> Result<()> {
    if is_ancestor_or_self(new_child, parent) {
        return Err(DomException::HierarchyRequest);
    }

    if let XmlNode::DocumentFragment(_) = new_child {
        for child in children_of(new_child) {
            if !can_contain(parent, &child) {
                return Err(DomException::HierarchyRequest);
            }
        }
    } else if !can_contain(parent, new_child) {
        return Err(DomException::HierarchyRequest);
    }

    match (document_of(parent), owner_of(new_child)) {
        (Some(a), Some(b)) if Rc::ptr_eq(&a, &b) => {}
        _ => return Err(DomException::WrongDocument),
    }

    // a document holds at most one element child
    if let XmlNode::Document(_) = parent {
        let incoming = if let XmlNode::DocumentFragment(_) = new_child {
            children_of(new_child)
                .iter()
                .filter(|v| v.as_element().is_some())
                .count()
        } else if new_child.as_element().is_some() {
            1
        } else {
            0
        };

        if incoming > 0 {
            let existing = children_of(parent)
                .iter()
                .filter(|v| {
                    v.as_element().is_some()
                        && !v.is_same_node(new_child)
                        && replaced.map(|r| !v.is_same_node(r)).unwrap_or(true)
                })
                .count();
            if existing + incoming > 1 {
                return Err(DomException::HierarchyRequest);
            }
        }
    }

    Ok(())
}

fn insert_before_node(
    parent: &XmlNode,
    new_child: XmlNode,
    ref_child: Option<&XmlNode>,
) -> Result<XmlNode> {
    if is_read_only(parent) {
        return Err(DomException::NoModificationAllowed);
    }

    if let Some(ref_child) = ref_child {
        index_of(parent, ref_child).ok_or(DomException::NotFound)?;
    }

    validate_new_child(parent, &new_child, None)?;

    if let XmlNode::DocumentFragment(_) = &new_child {
        for child in children_of(&new_child) {
            insert_before_node(parent, child, ref_child)?;
        }
        return Ok(new_child);
    }

    if let Some(ref_child) = ref_child {
        if ref_child.is_same_node(&new_child) {
            return Ok(new_child);
        }
    }

    detach(&new_child);

    let pos = match ref_child {
        Some(ref_child) => index_of(parent, ref_child).ok_or(DomException::NotFound)?,
        None => children_of(parent).len(),
    };
    with_children_mut(parent, |children| children.insert(pos, new_child.clone()))
        .ok_or(DomException::HierarchyRequest)?;
    set_parent(&new_child, downgrade(parent));

    Ok(new_child)
}

fn remove_child_node(parent: &XmlNode, old_child: &XmlNode) -> Result<XmlNode> {
    if is_read_only(parent) {
        return Err(DomException::NoModificationAllowed);
    }

    let pos = index_of(parent, old_child).ok_or(DomException::NotFound)?;
    with_children_mut(parent, |children| children.remove(pos));
    set_parent(old_child, None);
    Ok(old_child.clone())
}

fn replace_child_node(
    parent: &XmlNode,
    new_child: XmlNode,
    old_child: &XmlNode,
) -> Result<XmlNode> {
    if is_read_only(parent) {
        return Err(DomException::NoModificationAllowed);
    }

    let pos = index_of(parent, old_child).ok_or(DomException::NotFound)?;
    if old_child.is_same_node(&new_child) {
        return Ok(old_child.clone());
    }

    validate_new_child(parent, &new_child, Some(old_child))?;

    with_children_mut(parent, |children| children.remove(pos));
    set_parent(old_child, None);

    let anchor = children_of(parent).get(pos).cloned();
    insert_before_node(parent, new_child, anchor.as_ref())?;
    Ok(old_child.clone())
}

fn detach(child: &XmlNode) {
    if let Some(parent) = parent_of(child) {
        if let Some(pos) = index_of(&parent, child) {
            with_children_mut(&parent, |children| children.remove(pos));
        }
    }
    set_parent(child, None);
}

// -----------------------------------------------------------------------------------------------

fn copy_subtree(value: &XmlNode, deep: bool, owner: &WeakRef<XmlDocument>) -> XmlNode {
    match value {
        XmlNode::Element(v) => {
            let inner = v.borrow();
            let copy = node(XmlElement {
                local_name: inner.local_name.clone(),
                prefix: inner.prefix.clone(),
                namespace_uri: inner.namespace_uri.clone(),
                attributes: vec![],
                children: vec![],
                parent: None,
                owner: owner.clone(),
            });

            // attributes travel with the element regardless of depth
            for attr in inner.attributes.as_slice() {
                let attr_copy = copy_attr(attr, owner);
                attr_copy.borrow_mut().owner_element = Some(Rc::downgrade(&copy));
                copy.borrow_mut().attributes.push(attr_copy);
            }

            if deep {
                for child in inner.children.as_slice() {
                    let child_copy = copy_subtree(child, true, owner);
                    set_parent(&child_copy, Some(WeakNode::Element(Rc::downgrade(&copy))));
                    copy.borrow_mut().children.push(child_copy);
                }
            }

            XmlNode::Element(copy)
        }
        XmlNode::Attribute(v) => XmlNode::Attribute(copy_attr(v, owner)),
        XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => {
            let inner = v.borrow();
            XmlNode::from(node(XmlCharacterData {
                kind: inner.kind,
                data: inner.data.clone(),
                parent: None,
                owner: owner.clone(),
            }))
        }
        XmlNode::EntityReference(v) => XmlNode::EntityReference(node(XmlEntityReference {
            name: v.borrow().name.clone(),
            parent: None,
            owner: owner.clone(),
        })),
        XmlNode::Entity(v) => {
            let inner = v.borrow();
            XmlNode::Entity(node(XmlEntity {
                name: inner.name.clone(),
                public_id: inner.public_id.clone(),
                system_id: inner.system_id.clone(),
                notation_name: inner.notation_name.clone(),
                owner: owner.clone(),
            }))
        }
        XmlNode::PI(v) => {
            let inner = v.borrow();
            XmlNode::PI(node(XmlProcessingInstruction {
                target: inner.target.clone(),
                data: inner.data.clone(),
                parent: None,
                owner: owner.clone(),
            }))
        }
        XmlNode::Document(v) => {
            let inner = v.borrow();
            let copy = XmlDocument::new();
            copy.borrow_mut().version = inner.version.clone();
            copy.borrow_mut().encoding = inner.encoding.clone();
            copy.borrow_mut().standalone = inner.standalone;

            if deep {
                let copy_owner = Rc::downgrade(&copy);
                for child in inner.children.as_slice() {
                    let child_copy = copy_subtree(child, true, &copy_owner);
                    set_parent(&child_copy, Some(WeakNode::Document(Rc::downgrade(&copy))));
                    copy.borrow_mut().children.push(child_copy);
                }
            }

            XmlNode::Document(copy)
        }
        XmlNode::DocumentType(v) => {
            let inner = v.borrow();
            let copy = node(XmlDocumentType {
                name: inner.name.clone(),
                public_id: inner.public_id.clone(),
                system_id: inner.system_id.clone(),
                internal_subset: inner.internal_subset.clone(),
                entities: vec![],
                notations: vec![],
                parent: None,
                owner: None,
            });

            for entity in inner.entities.as_slice() {
                let e = entity.borrow();
                copy.borrow_mut().entities.push(node(XmlEntity {
                    name: e.name.clone(),
                    public_id: e.public_id.clone(),
                    system_id: e.system_id.clone(),
                    notation_name: e.notation_name.clone(),
                    owner: owner.clone(),
                }));
            }
            for notation in inner.notations.as_slice() {
                let n = notation.borrow();
                copy.borrow_mut().notations.push(node(XmlNotation {
                    name: n.name.clone(),
                    public_id: n.public_id.clone(),
                    system_id: n.system_id.clone(),
                    owner: owner.clone(),
                }));
            }

            XmlNode::DocumentType(copy)
        }
        XmlNode::DocumentFragment(v) => {
            let inner = v.borrow();
            let copy = node(XmlDocumentFragment {
                children: vec![],
                owner: owner.clone(),
            });

            if deep {
                for child in inner.children.as_slice() {
                    let child_copy = copy_subtree(child, true, owner);
                    set_parent(
                        &child_copy,
                        Some(WeakNode::DocumentFragment(Rc::downgrade(&copy))),
                    );
                    copy.borrow_mut().children.push(child_copy);
                }
            }

            XmlNode::DocumentFragment(copy)
        }
        XmlNode::Notation(v) => {
            let inner = v.borrow();
            XmlNode::Notation(node(XmlNotation {
                name: inner.name.clone(),
                public_id: inner.public_id.clone(),
                system_id: inner.system_id.clone(),
                owner: owner.clone(),
            }))
        }
    }
}

fn copy_attr(value: &NodeRef<XmlAttr>, owner: &WeakRef<XmlDocument>) -> NodeRef<XmlAttr> {
    let inner = value.borrow();
    let copy = node(XmlAttr {
        local_name: inner.local_name.clone(),
        prefix: inner.prefix.clone(),
        namespace_uri: inner.namespace_uri.clone(),
        children: vec![],
        specified: true,
        owner_element: None,
        owner: owner.clone(),
    });

    for child in inner.children.as_slice() {
        let child_copy = copy_subtree(child, true, owner);
        set_parent(&child_copy, Some(WeakNode::Attribute(Rc::downgrade(&copy))));
        copy.borrow_mut().children.push(child_copy);
    }

    copy
}

// -----------------------------------------------------------------------------------------------

fn normalize_node(value: &XmlNode) {
    let children = children_of(value);
    let mut merged: Vec<XmlNode> = vec![];

    for child in children {
        if let XmlNode::Text(text) = &child {
            if text.borrow().data.is_empty() {
                set_parent(&child, None);
                continue;
            }
            if let Some(XmlNode::Text(last)) = merged.last() {
                let data = text.borrow().data.clone();
                last.borrow_mut().data.push_str(data.as_str());
                set_parent(&child, None);
                continue;
            }
        }
        merged.push(child);
    }

    with_children_mut(value, |children| *children = merged.clone());

    for child in merged {
        if let XmlNode::Element(element) = &child {
            let attributes = element.borrow().attributes.clone();
            for attr in attributes {
                normalize_node(&XmlNode::Attribute(attr));
            }
        }
        normalize_node(&child);
    }
}

// -----------------------------------------------------------------------------------------------

fn set_prefix_of(value: &XmlNode, prefix: Option<&str>) -> Result<()> {
    let (namespace_uri, is_attribute) = match value {
        XmlNode::Element(v) => (v.borrow().namespace_uri.clone(), false),
        XmlNode::Attribute(v) => (v.borrow().namespace_uri.clone(), true),
        _ if is_read_only(value) => return Err(DomException::NoModificationAllowed),
        _ => return Ok(()),
    };

    if let Some(prefix) = prefix {
        if !xdom_nom::is_name(prefix) {
            return Err(DomException::InvalidCharacter);
        }
        if !xdom_nom::is_ncname(prefix) {
            return Err(DomException::Namespace);
        }

        let uri = namespace_uri.ok_or(DomException::Namespace)?;
        if prefix == "xml" && uri != XML_NAMESPACE_URI {
            return Err(DomException::Namespace);
        }
        if prefix == "xmlns" && (!is_attribute || uri != XMLNS_NAMESPACE_URI) {
            return Err(DomException::Namespace);
        }
    }

    match value {
        XmlNode::Element(v) => v.borrow_mut().prefix = prefix.map(String::from),
        XmlNode::Attribute(v) => v.borrow_mut().prefix = prefix.map(String::from),
        _ => {}
    }
    Ok(())
}

#[allow(clippy::type_complexity)]
fn validate_qualified_name(
    namespace_uri: Option<&str>,
    qualified_name: &str,
    is_attribute: bool,
) -> Result<(Option<String>, Option<String>, String)> {
    if !xdom_nom::is_name(qualified_name) {
        return Err(DomException::InvalidCharacter);
    }

    let (prefix, local_name) =
        xdom_nom::split_qname(qualified_name).ok_or(DomException::Namespace)?;
    let uri = namespace_uri.filter(|v| !v.is_empty());

    let is_xmlns_name = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns_name {
        if !is_attribute || uri != Some(XMLNS_NAMESPACE_URI) {
            return Err(DomException::Namespace);
        }
    } else if uri == Some(XMLNS_NAMESPACE_URI) {
        return Err(DomException::Namespace);
    }

    if let Some(prefix) = prefix {
        let uri = uri.ok_or(DomException::Namespace)?;
        if prefix == "xml" && uri != XML_NAMESPACE_URI {
            return Err(DomException::Namespace);
        }
    }

    Ok((
        uri.map(String::from),
        prefix.map(String::from),
        local_name.to_string(),
    ))
}

// -----------------------------------------------------------------------------------------------

fn byte_offset(data: &str, offset: usize) -> Result<usize> {
    if offset == 0 {
        return Ok(0);
    }

    let mut count = 0;
    for (pos, _) in data.char_indices() {
        if count == offset {
            return Ok(pos);
        }
        count += 1;
    }
    if count == offset {
        Ok(data.len())
    } else {
        Err(DomException::IndexSize)
    }
}

fn byte_offset_clamped(data: &str, offset: usize) -> usize {
    byte_offset(data, offset).unwrap_or(data.len())
}

// -----------------------------------------------------------------------------------------------
// Compact serialization.

pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlNode::Element(v) => v.borrow().fmt(f),
            XmlNode::Attribute(v) => v.borrow().fmt(f),
            XmlNode::Text(v) | XmlNode::CData(v) | XmlNode::Comment(v) => v.borrow().fmt(f),
            XmlNode::EntityReference(v) => v.borrow().fmt(f),
            XmlNode::Entity(v) => v.borrow().fmt(f),
            XmlNode::PI(v) => v.borrow().fmt(f),
            XmlNode::Document(v) => v.borrow().fmt(f),
            XmlNode::DocumentType(v) => v.borrow().fmt(f),
            XmlNode::DocumentFragment(v) => v.borrow().fmt(f),
            XmlNode::Notation(v) => v.borrow().fmt(f),
        }
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.qualified_name())?;

        for attr in self.attributes.as_slice() {
            write!(f, " {}", attr.borrow())?;
        }

        if self.children.is_empty() {
            write!(f, " />")
        } else {
            write!(f, ">")?;
            for child in self.children.as_slice() {
                child.fmt(f)?;
            }
            write!(f, "</{}>", self.qualified_name())
        }
    }
}

impl fmt::Display for XmlAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"", self.qualified_name())?;
        for child in self.children.as_slice() {
            match child {
                XmlNode::Text(v) => write!(f, "{}", escape_attribute(v.borrow().data.as_str()))?,
                XmlNode::EntityReference(v) => write!(f, "&{};", v.borrow().name)?,
                _ => {}
            }
        }
        write!(f, "\"")
    }
}

impl fmt::Display for XmlCharacterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CharacterDataKind::Text => write!(f, "{}", escape_text(self.data.as_str())),
            CharacterDataKind::CData => write!(f, "<![CDATA[{}]]>", self.data),
            CharacterDataKind::Comment => write!(f, "<!--{}-->", self.data),
        }
    }
}

impl fmt::Display for XmlProcessingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "<?{}?>", self.target)
        } else {
            write!(f, "<?{} {}?>", self.target, self.data)
        }
    }
}

impl fmt::Display for XmlEntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{};", self.name)
    }
}

impl fmt::Display for XmlEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!ENTITY {}", self.name)?;
        if let Some(public_id) = self.public_id.as_deref() {
            write!(f, " PUBLIC \"{}\"", public_id)?;
            if let Some(system_id) = self.system_id.as_deref() {
                write!(f, " \"{}\"", system_id)?;
            }
        } else if let Some(system_id) = self.system_id.as_deref() {
            write!(f, " SYSTEM \"{}\"", system_id)?;
        }
        if let Some(notation_name) = self.notation_name.as_deref() {
            write!(f, " NDATA {}", notation_name)?;
        }
        write!(f, ">")
    }
}

impl fmt::Display for XmlNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!NOTATION {}", self.name)?;
        if let Some(public_id) = self.public_id.as_deref() {
            write!(f, " PUBLIC \"{}\"", public_id)?;
            if let Some(system_id) = self.system_id.as_deref() {
                write!(f, " \"{}\"", system_id)?;
            }
        } else if let Some(system_id) = self.system_id.as_deref() {
            write!(f, " SYSTEM \"{}\"", system_id)?;
        }
        write!(f, ">")
    }
}

impl fmt::Display for XmlDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!DOCTYPE {}", self.name)?;
        if let Some(public_id) = self.public_id.as_deref() {
            write!(f, " PUBLIC \"{}\"", public_id)?;
            if let Some(system_id) = self.system_id.as_deref() {
                write!(f, " \"{}\"", system_id)?;
            }
        } else if let Some(system_id) = self.system_id.as_deref() {
            write!(f, " SYSTEM \"{}\"", system_id)?;
        }
        if let Some(subset) = self.internal_subset.as_deref() {
            write!(f, " [{}]", subset)?;
        }
        write!(f, ">")
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(version) = self.version.as_deref() {
            write!(f, "<?xml version=\"{}\"", version)?;
            if let Some(encoding) = self.encoding.as_deref() {
                write!(f, " encoding=\"{}\"", encoding)?;
            }
            if let Some(standalone) = self.standalone {
                write!(f, " standalone=\"{}\"", if standalone { "yes" } else { "no" })?;
            }
            write!(f, "?>")?;
        }

        for child in self.children.as_slice() {
            child.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for XmlDocumentFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in self.children.as_slice() {
            child.fmt(f)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DomParser, ParseStatus};
    use crate::serializer::XmlSerializer;

    fn parse(text: &str) -> NodeRef<XmlDocument> {
        let mut parser = DomParser::new();
        assert_eq!(ParseStatus::None, parser.parse_str(text));
        parser.document().unwrap()
    }

    #[test]
    fn test_factory_node_names() {
        let doc = XmlDocument::new();

        assert_eq!("a", doc.create_element("a").unwrap().node_name());
        assert_eq!("b", doc.create_attribute("b").unwrap().node_name());
        assert_eq!("#text", doc.create_text_node("t").node_name());
        assert_eq!("#cdata-section", doc.create_cdata_section("c").node_name());
        assert_eq!("#comment", doc.create_comment("c").node_name());
        assert_eq!("p", doc.create_processing_instruction("p", "d").unwrap().node_name());
        assert_eq!("e", doc.create_entity_reference("e").unwrap().node_name());
        assert_eq!("#document-fragment", doc.create_document_fragment().node_name());
        assert_eq!("#document", doc.node_name());
    }

    #[test]
    fn test_factory_node_types() {
        let doc = XmlDocument::new();

        assert_eq!(NodeType::Element, doc.create_element("a").unwrap().node_type());
        assert_eq!(NodeType::Attribute, doc.create_attribute("b").unwrap().node_type());
        assert_eq!(NodeType::Text, doc.create_text_node("t").node_type());
        assert_eq!(NodeType::CData, doc.create_cdata_section("c").node_type());
        assert_eq!(NodeType::Comment, doc.create_comment("c").node_type());
        assert_eq!(NodeType::Document, doc.node_type());
    }

    #[test]
    fn test_factory_invalid_name() {
        let doc = XmlDocument::new();

        assert_eq!(DomException::InvalidCharacter, doc.create_element("a b").unwrap_err());
        assert_eq!(DomException::InvalidCharacter, doc.create_element("1a").unwrap_err());
        assert_eq!(DomException::InvalidCharacter, doc.create_attribute("<x>").unwrap_err());
        assert_eq!(
            DomException::InvalidCharacter,
            doc.create_processing_instruction("a b", "").unwrap_err()
        );
        assert_eq!(
            DomException::InvalidCharacter,
            doc.create_entity_reference("a;b").unwrap_err()
        );
    }

    #[test]
    fn test_factory_namespace_rules() {
        let doc = XmlDocument::new();

        let e = doc.create_element_ns(Some("urn:x"), "p:a").unwrap();
        assert_eq!(Some("urn:x".to_string()), e.namespace_uri());
        assert_eq!(Some("p".to_string()), e.prefix());
        assert_eq!(Some("a".to_string()), e.local_name());
        assert_eq!("p:a", e.node_name());

        let e = doc.create_element_ns(Some("urn:x"), "a").unwrap();
        assert_eq!(None, e.prefix());
        assert_eq!(Some("urn:x".to_string()), e.namespace_uri());

        // prefix without a namespace
        assert_eq!(DomException::Namespace, doc.create_element_ns(None, "p:a").unwrap_err());
        // malformed qualified names
        assert_eq!(
            DomException::Namespace,
            doc.create_element_ns(Some("urn:x"), "p:a:b").unwrap_err()
        );
        assert_eq!(
            DomException::InvalidCharacter,
            doc.create_element_ns(Some("urn:x"), "p a").unwrap_err()
        );
        // reserved prefixes bound to the wrong URI
        assert_eq!(
            DomException::Namespace,
            doc.create_attribute_ns(Some("urn:x"), "xml:lang").unwrap_err()
        );
        assert!(doc
            .create_attribute_ns(Some(XML_NAMESPACE_URI), "xml:lang")
            .is_ok());
        assert_eq!(
            DomException::Namespace,
            doc.create_element_ns(Some(XMLNS_NAMESPACE_URI), "xmlns").unwrap_err()
        );
        assert_eq!(
            DomException::Namespace,
            doc.create_attribute_ns(Some("urn:x"), "xmlns:p").unwrap_err()
        );
        assert!(doc
            .create_attribute_ns(Some(XMLNS_NAMESPACE_URI), "xmlns:p")
            .is_ok());
    }

    #[test]
    fn test_append_and_navigate() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        root.append_child(a.as_node()).unwrap();
        root.append_child(b.as_node()).unwrap();

        assert_eq!(Some(root.as_node()), a.parent_node());
        assert_eq!(Some(doc.as_node()), root.parent_node());
        assert_eq!(Some(a.as_node()), root.first_child());
        assert_eq!(Some(b.as_node()), root.last_child());
        assert_eq!(Some(b.as_node()), a.next_sibling());
        assert_eq!(Some(a.as_node()), b.previous_sibling());
        assert_eq!(None, a.previous_sibling());
        assert_eq!(None, b.next_sibling());
        assert!(root.has_child_nodes());
        assert!(!a.has_child_nodes());
        assert!(Rc::ptr_eq(&doc.document_element().unwrap(), &root));
        assert!(doc.owner_document().is_none());
        assert!(Rc::ptr_eq(&a.owner_document().unwrap(), &doc));
    }

    #[test]
    fn test_insert_before_positions() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let a = doc.create_element("a").unwrap();
        let c = doc.create_element("c").unwrap();
        root.append_child(a.as_node()).unwrap();
        root.append_child(c.as_node()).unwrap();

        let b = doc.create_element("b").unwrap();
        let inserted = root.insert_before(b.as_node(), Some(&c.as_node())).unwrap();
        assert_eq!(b.as_node(), inserted);

        let names: Vec<String> = root.child_nodes().iter().map(|v| v.node_name()).collect();
        assert_eq!(vec!["a", "b", "c"], names);

        // reinserting an attached node moves it
        root.insert_before(c.as_node(), Some(&a.as_node())).unwrap();
        let names: Vec<String> = root.child_nodes().iter().map(|v| v.node_name()).collect();
        assert_eq!(vec!["c", "a", "b"], names);

        // unknown reference child
        let stranger = doc.create_element("s").unwrap();
        assert_eq!(
            DomException::NotFound,
            root.insert_before(doc.create_element("x").unwrap().as_node(), Some(&stranger.as_node()))
                .unwrap_err()
        );
    }

    #[test]
    fn test_insert_hierarchy_request() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();
        let a = doc.create_element("a").unwrap();
        root.append_child(a.as_node()).unwrap();

        // a node must not become a descendant of itself
        assert_eq!(
            DomException::HierarchyRequest,
            a.append_child(root.as_node()).unwrap_err()
        );
        assert_eq!(
            DomException::HierarchyRequest,
            a.append_child(a.as_node()).unwrap_err()
        );

        // a document holds one element only
        assert_eq!(
            DomException::HierarchyRequest,
            doc.append_child(doc.create_element("second").unwrap().as_node())
                .unwrap_err()
        );

        // text directly under the document
        assert_eq!(
            DomException::HierarchyRequest,
            doc.append_child(doc.create_text_node("x").as_node()).unwrap_err()
        );

        // attribute nodes never enter the child list
        assert_eq!(
            DomException::HierarchyRequest,
            root.append_child(doc.create_attribute("x").unwrap().as_node())
                .unwrap_err()
        );
    }

    #[test]
    fn test_insert_wrong_document() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let other = XmlDocument::new();
        let foreign = other.create_element("x").unwrap();
        assert_eq!(
            DomException::WrongDocument,
            root.append_child(foreign.as_node()).unwrap_err()
        );

        // import first, then insert
        let imported = doc.import_node(&foreign.as_node(), true).unwrap();
        root.append_child(imported.clone()).unwrap();
        assert!(Rc::ptr_eq(&imported.as_element().unwrap().owner_document().unwrap(), &doc));
    }

    #[test]
    fn test_remove_child() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        root.append_child(a.as_node()).unwrap();
        a.append_child(b.as_node()).unwrap();

        let removed = root.remove_child(&a.as_node()).unwrap();
        assert_eq!(a.as_node(), removed);
        assert_eq!(None, a.parent_node());
        assert!(!root.has_child_nodes());

        // the detached subtree stays intact and owned
        assert_eq!(Some(a.as_node()), b.parent_node());
        assert!(Rc::ptr_eq(&a.owner_document().unwrap(), &doc));

        assert_eq!(
            DomException::NotFound,
            root.remove_child(&a.as_node()).unwrap_err()
        );
    }

    #[test]
    fn test_replace_child() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let old = doc.create_element("old").unwrap();
        let tail = doc.create_element("tail").unwrap();
        root.append_child(old.as_node()).unwrap();
        root.append_child(tail.as_node()).unwrap();

        let new = doc.create_element("new").unwrap();
        let returned = root.replace_child(new.as_node(), &old.as_node()).unwrap();
        assert_eq!(old.as_node(), returned);
        assert_eq!(None, old.parent_node());

        let names: Vec<String> = root.child_nodes().iter().map(|v| v.node_name()).collect();
        assert_eq!(vec!["new", "tail"], names);

        // replacing the document element keeps the one-element invariant
        let second = doc.create_element("second").unwrap();
        doc.replace_child(second.as_node(), &root.as_node()).unwrap();
        assert_eq!("second", doc.document_element().unwrap().node_name());
    }

    #[test]
    fn test_fragment_splice() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();
        let anchor = doc.create_element("z").unwrap();
        root.append_child(anchor.as_node()).unwrap();

        let frag = doc.create_document_fragment();
        frag.append_child(doc.create_element("a").unwrap().as_node()).unwrap();
        frag.append_child(doc.create_element("b").unwrap().as_node()).unwrap();

        root.insert_before(frag.as_node(), Some(&anchor.as_node())).unwrap();

        let names: Vec<String> = root.child_nodes().iter().map(|v| v.node_name()).collect();
        assert_eq!(vec!["a", "b", "z"], names);
        assert!(!frag.has_child_nodes());
    }

    #[test]
    fn test_clone_node() {
        let doc = parse("<r a=\"1\"><b>t</b><!--c--></r>");
        let root = doc.document_element().unwrap();

        let clone = root.clone_node(true);
        assert_eq!(None, clone.parent_node());
        assert!(!clone.is_same_node(&root.as_node()));
        assert_eq!(root.as_node().to_string(), clone.to_string());

        // no shared identity below the root either
        let b = root.first_child().unwrap();
        let b_clone = clone.first_child().unwrap();
        assert!(!b.is_same_node(&b_clone));
        assert_eq!(Some(clone.clone()), b_clone.parent_node());

        // shallow clones keep attributes, not children
        let shallow = root.clone_node(false);
        assert!(!shallow.has_child_nodes());
        assert_eq!("1", shallow.as_element().unwrap().get_attribute("a"));
        assert!(shallow.as_element().unwrap().get_attribute_node("a").unwrap().specified());
    }

    #[test]
    fn test_import_node() {
        let source = parse("<r a=\"1\"><b>t</b></r>");
        let target = XmlDocument::new();
        let root = source.document_element().unwrap();

        let imported = target.import_node(&root.as_node(), true).unwrap();
        assert!(Rc::ptr_eq(
            &imported.as_element().unwrap().owner_document().unwrap(),
            &target
        ));
        assert_eq!(root.as_node().to_string(), imported.to_string());
        assert!(Rc::ptr_eq(
            &imported
                .first_child()
                .unwrap()
                .as_element()
                .unwrap()
                .owner_document()
                .unwrap(),
            &target
        ));

        assert_eq!(
            DomException::NotSupported,
            target.import_node(&source.as_node(), true).unwrap_err()
        );
        let doctype = XmlDocumentType::new("r", None, None).unwrap();
        assert_eq!(
            DomException::NotSupported,
            target.import_node(&doctype.as_node(), false).unwrap_err()
        );
    }

    #[test]
    fn test_normalize_merges_text() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        root.append_child(doc.create_text_node("a").as_node()).unwrap();
        root.append_child(doc.create_text_node("").as_node()).unwrap();
        root.append_child(doc.create_text_node("b").as_node()).unwrap();

        root.normalize();

        assert_eq!(1, root.child_nodes().length());
        let text = root.first_child().unwrap().as_text().unwrap();
        assert_eq!("ab", text.data());
    }

    #[test]
    fn test_normalize_keeps_other_kinds() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        root.append_child(doc.create_text_node("a").as_node()).unwrap();
        root.append_child(doc.create_cdata_section("c").as_node()).unwrap();
        root.append_child(doc.create_text_node("b").as_node()).unwrap();
        root.append_child(doc.create_comment("x").as_node()).unwrap();

        root.normalize();

        assert_eq!(4, root.child_nodes().length());
    }

    #[test]
    fn test_character_data_edits() {
        let doc = XmlDocument::new();
        let text = doc.create_text_node("hello");

        assert_eq!(5, text.length());
        assert_eq!("ell", text.substring_data(1, 3).unwrap());
        // count clamps to the remaining length
        assert_eq!("llo", text.substring_data(2, 99).unwrap());
        assert_eq!(DomException::IndexSize, text.substring_data(6, 1).unwrap_err());

        text.append_data("!");
        assert_eq!("hello!", text.data());

        text.insert_data(5, " world").unwrap();
        assert_eq!("hello world!", text.data());
        assert_eq!(DomException::IndexSize, text.insert_data(99, "x").unwrap_err());

        text.delete_data(5, 6).unwrap();
        assert_eq!("hello!", text.data());

        text.replace_data(0, 5, "bye").unwrap();
        assert_eq!("bye!", text.data());

        text.set_data("reset");
        assert_eq!("reset", text.data());
    }

    #[test]
    fn test_split_text() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();
        let text = doc.create_text_node("hello");
        root.append_child(text.as_node()).unwrap();

        let tail = text.split_text(3).unwrap();
        assert_eq!("hel", text.data());
        assert_eq!("lo", tail.data());
        assert_eq!(2, root.child_nodes().length());
        assert_eq!(Some(tail.as_node()), text.next_sibling());

        // offset zero yields an empty head
        let rest = text.split_text(0).unwrap();
        assert_eq!("", text.data());
        assert_eq!("hel", rest.data());

        // offset at the end yields an empty tail
        let empty = tail.split_text(2).unwrap();
        assert_eq!("lo", tail.data());
        assert_eq!("", empty.data());

        assert_eq!(DomException::IndexSize, tail.split_text(99).unwrap_err());

        // a detached node splits without siblings
        let lone = doc.create_text_node("ab");
        let lone_tail = lone.split_text(1).unwrap();
        assert_eq!("a", lone.data());
        assert_eq!("b", lone_tail.data());
        assert_eq!(None, lone_tail.as_node().parent_node());

        // comments do not split
        let comment = doc.create_comment("c");
        assert_eq!(DomException::NotSupported, comment.split_text(0).unwrap_err());
    }

    #[test]
    fn test_named_node_map_dual_keys() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let attr = doc.create_attribute_ns(Some("urn:x"), "p:a").unwrap();
        attr.set_value("v");

        let map = root.attributes().unwrap();
        assert_eq!(None, map.set_named_item_ns(attr.as_node()).unwrap());
        assert_eq!(1, map.length());

        // both key forms resolve to the same node
        let by_name = map.get_named_item("p:a").unwrap();
        let by_pair = map.get_named_item_ns(Some("urn:x"), "a").unwrap();
        assert!(by_name.is_same_node(&attr.as_node()));
        assert!(by_pair.is_same_node(&attr.as_node()));

        assert!(map.get_named_item("a").is_none());
        assert!(map.get_named_item_ns(Some("urn:y"), "a").is_none());

        // replacement returns the displaced node
        let other = doc.create_attribute_ns(Some("urn:x"), "q:a").unwrap();
        other.set_value("w");
        let displaced = map.set_named_item_ns(other.as_node()).unwrap().unwrap();
        assert!(displaced.is_same_node(&attr.as_node()));
        assert_eq!(1, map.length());
        assert!(attr.owner_element().is_none());

        let removed = map.remove_named_item_ns(Some("urn:x"), "a").unwrap();
        assert!(removed.is_same_node(&other.as_node()));
        assert_eq!(
            DomException::NotFound,
            map.remove_named_item("q:a").unwrap_err()
        );
    }

    #[test]
    fn test_named_node_map_inuse_attribute() {
        let doc = XmlDocument::new();
        let e1 = doc.create_element("e1").unwrap();
        let e2 = doc.create_element("e2").unwrap();
        doc.append_child(e1.as_node()).unwrap();
        e1.append_child(e2.as_node()).unwrap();

        let attr = doc.create_attribute("a").unwrap();
        attr.set_value("v");
        e1.set_attribute_node(attr.clone()).unwrap();
        assert!(Rc::ptr_eq(&attr.owner_element().unwrap(), &e1));

        assert_eq!(
            DomException::InuseAttribute,
            e2.set_attribute_node(attr.clone()).unwrap_err()
        );

        // after removal the attribute is free again
        e1.remove_attribute_node(&attr).unwrap();
        e2.set_attribute_node(attr.clone()).unwrap();
        assert!(Rc::ptr_eq(&attr.owner_element().unwrap(), &e2));
    }

    #[test]
    fn test_named_node_map_wrong_document() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let other = XmlDocument::new();
        let foreign = other.create_attribute("a").unwrap();
        assert_eq!(
            DomException::WrongDocument,
            root.attributes().unwrap().set_named_item(foreign.as_node()).unwrap_err()
        );

        // only attributes belong in an attribute map
        assert_eq!(
            DomException::HierarchyRequest,
            root.attributes()
                .unwrap()
                .set_named_item(doc.create_text_node("t").as_node())
                .unwrap_err()
        );
    }

    #[test]
    fn test_doctype_maps_frozen() {
        let doc = parse("<!DOCTYPE r [<!ENTITY e \"v\"><!NOTATION n SYSTEM \"n\">]><r/>");
        let doctype = doc.doc_type().unwrap();

        let entities = doctype.entities();
        assert_eq!(1, entities.length());
        assert_eq!(
            DomException::NoModificationAllowed,
            entities.set_named_item(doc.create_text_node("x").as_node()).unwrap_err()
        );
        assert_eq!(
            DomException::NoModificationAllowed,
            entities.remove_named_item("e").unwrap_err()
        );

        let notations = doctype.notations();
        assert_eq!(1, notations.length());
        assert_eq!(
            DomException::NoModificationAllowed,
            notations.remove_named_item("n").unwrap_err()
        );
    }

    #[test]
    fn test_doctype_attach_only_at_construction() {
        let doctype = XmlDocumentType::new("r", Some("-//X//EN"), Some("r.dtd")).unwrap();
        let doc = XmlDocument::with_doctype(doctype.clone()).unwrap();
        assert!(Rc::ptr_eq(&doc.doc_type().unwrap(), &doctype));
        assert_eq!(Some(doc.as_node()), doctype.parent_node());

        // a doctype never enters through the generic insertion path
        let doc2 = XmlDocument::new();
        let late = XmlDocumentType::new("r", None, None).unwrap();
        assert_eq!(
            DomException::HierarchyRequest,
            doc2.append_child(late.as_node()).unwrap_err()
        );

        // nor can one be attached to two documents
        assert!(XmlDocument::with_doctype(doctype).is_err());
    }

    #[test]
    fn test_read_only_nodes() {
        let doc = parse("<!DOCTYPE r [<!ENTITY e \"v\">]><r>&e;</r>");
        let root = doc.document_element().unwrap();
        let reference = root.first_child().unwrap();
        assert_eq!(NodeType::EntityReference, reference.node_type());

        assert_eq!(
            DomException::NoModificationAllowed,
            reference.append_child(doc.create_text_node("x").as_node()).unwrap_err()
        );
        assert_eq!(
            DomException::NoModificationAllowed,
            reference.set_node_value("x").unwrap_err()
        );

        let doctype = doc.doc_type().unwrap();
        assert_eq!(
            DomException::NoModificationAllowed,
            doctype.set_node_value("x").unwrap_err()
        );
    }

    #[test]
    fn test_node_value_rules() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();

        assert_eq!(None, root.node_value());
        assert_eq!(DomException::NoDataAllowed, root.set_node_value("x").unwrap_err());
        assert_eq!(DomException::NoDataAllowed, doc.set_node_value("x").unwrap_err());

        let text = doc.create_text_node("t");
        text.set_node_value("u").unwrap();
        assert_eq!(Some("u".to_string()), text.node_value());

        let attr = doc.create_attribute("a").unwrap();
        attr.set_value("v");
        assert_eq!(Some("v".to_string()), attr.node_value());
        attr.set_node_value("w").unwrap();
        assert_eq!("w", attr.value());
        assert!(attr.specified());

        let pi = doc.create_processing_instruction("p", "d").unwrap();
        assert_eq!(Some("d".to_string()), pi.node_value());
        pi.set_data("e");
        assert_eq!("e", pi.data());
    }

    #[test]
    fn test_live_child_list() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        let children = root.child_nodes();
        assert_eq!(0, children.length());
        assert_eq!(None, children.item(0));

        root.append_child(doc.create_element("a").unwrap().as_node()).unwrap();
        assert_eq!(1, children.length());
        root.append_child(doc.create_element("b").unwrap().as_node()).unwrap();
        assert_eq!(2, children.length());
        assert_eq!("b", children.item(1).unwrap().node_name());
        assert_eq!(None, children.item(2));
    }

    #[test]
    fn test_live_tag_name_list() {
        let doc = parse("<r><a/><b>x</b></r>");
        let list = doc.get_elements_by_tag_name("a");
        assert_eq!(1, list.length());
        assert_eq!("a", list.item(0).unwrap().node_name());

        // the view observes later mutation without re-querying
        let b = doc.get_elements_by_tag_name("b").item(0).unwrap().as_element().unwrap();
        b.append_child(doc.create_element("a").unwrap().as_node()).unwrap();
        assert_eq!(2, list.length());
    }

    #[test]
    fn test_tag_name_list_preorder() {
        let doc = parse("<r><a><c/></a><b/></r>");
        let names: Vec<String> = doc
            .get_elements_by_tag_name("*")
            .iter()
            .map(|v| v.node_name())
            .collect();
        assert_eq!(vec!["r", "a", "c", "b"], names);

        let root = doc.document_element().unwrap();
        let names: Vec<String> = root
            .get_elements_by_tag_name("*")
            .iter()
            .map(|v| v.node_name())
            .collect();
        assert_eq!(vec!["a", "c", "b"], names);
    }

    #[test]
    fn test_tag_name_list_ns() {
        let doc = parse("<r xmlns:p=\"urn:x\"><p:a/><a/><p:b/></r>");

        let list = doc.get_elements_by_tag_name_ns("urn:x", "*");
        assert_eq!(2, list.length());

        let list = doc.get_elements_by_tag_name_ns("urn:x", "a");
        assert_eq!(1, list.length());
        assert_eq!("p:a", list.item(0).unwrap().node_name());

        let list = doc.get_elements_by_tag_name_ns("*", "a");
        assert_eq!(2, list.length());

        let list = doc.get_elements_by_tag_name_ns("", "a");
        assert_eq!(1, list.length());
        assert_eq!("a", list.item(0).unwrap().node_name());
    }

    #[test]
    fn test_element_attribute_shortcuts() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();

        root.set_attribute("a", "1").unwrap();
        assert!(root.has_attribute("a"));
        assert!(root.has_attributes());
        assert_eq!("1", root.get_attribute("a"));
        assert_eq!("", root.get_attribute("missing"));

        root.set_attribute("a", "2").unwrap();
        assert_eq!("2", root.get_attribute("a"));
        assert_eq!(1, root.attributes().unwrap().length());

        root.set_attribute_ns(Some("urn:x"), "p:b", "3").unwrap();
        assert_eq!("3", root.get_attribute_ns(Some("urn:x"), "b"));
        assert!(root.has_attribute_ns(Some("urn:x"), "b"));

        root.remove_attribute("a");
        assert!(!root.has_attribute("a"));
        root.remove_attribute_ns(Some("urn:x"), "b");
        assert!(!root.has_attribute_ns(Some("urn:x"), "b"));
        assert!(!root.has_attributes());

        assert_eq!(
            DomException::InvalidCharacter,
            root.set_attribute("a b", "x").unwrap_err()
        );
    }

    #[test]
    fn test_set_prefix() {
        let doc = XmlDocument::new();

        let e = doc.create_element_ns(Some("urn:x"), "a").unwrap();
        e.set_prefix(Some("p")).unwrap();
        assert_eq!("p:a", e.node_name());
        e.set_prefix(None).unwrap();
        assert_eq!("a", e.node_name());

        // no namespace to bind the prefix to
        let plain = doc.create_element("b").unwrap();
        assert_eq!(DomException::Namespace, plain.set_prefix(Some("p")).unwrap_err());

        assert_eq!(
            DomException::InvalidCharacter,
            e.set_prefix(Some("p q")).unwrap_err()
        );
        assert_eq!(DomException::Namespace, e.set_prefix(Some("p:q")).unwrap_err());
        assert_eq!(DomException::Namespace, e.set_prefix(Some("xml")).unwrap_err());
    }

    #[test]
    fn test_get_element_by_id_is_null() {
        let doc = parse("<r><a id=\"x\"/></r>");
        assert!(doc.get_element_by_id("x").is_none());
    }

    #[test]
    fn test_dom_implementation() {
        let implementation = XmlDocument::new().implementation();
        assert!(implementation.has_feature("XML", None));
        assert!(implementation.has_feature("xml", Some("1.0")));
        assert!(implementation.has_feature("xml", Some("2.0")));
        assert!(!implementation.has_feature("xml", Some("3.0")));
        assert!(!implementation.has_feature("html", None));

        let doc = implementation
            .create_document(Some("urn:x"), Some("p:r"), None)
            .unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!("p:r", root.tag_name());
        assert_eq!(Some("urn:x".to_string()), root.namespace_uri());
    }

    #[test]
    fn test_round_trip_factory_tree() {
        let doc = XmlDocument::new();
        let root = doc.create_element("root").unwrap();
        doc.append_child(root.as_node()).unwrap();
        root.set_attribute("a", "1").unwrap();
        root.set_attribute("xmlns:p", "urn:x").unwrap();

        let child = doc.create_element_ns(Some("urn:x"), "p:c").unwrap();
        root.append_child(child.as_node()).unwrap();
        child.append_child(doc.create_text_node("t < u").as_node()).unwrap();
        root.append_child(doc.create_comment("note").as_node()).unwrap();
        root.append_child(doc.create_cdata_section("<raw>").as_node()).unwrap();
        root.append_child(doc.create_processing_instruction("pi", "d").unwrap().as_node())
            .unwrap();

        let mut serializer = XmlSerializer::new();
        let text = serializer.write_to_string(&doc.as_node());

        let mut parser = DomParser::new();
        assert_eq!(ParseStatus::None, parser.parse_str(&text));
        let reparsed = parser.document().unwrap();

        assert_eq!(text, serializer.write_to_string(&reparsed.as_node()));

        let c = reparsed
            .get_elements_by_tag_name_ns("urn:x", "c")
            .item(0)
            .unwrap();
        assert_eq!("p:c", c.node_name());
    }

    #[test]
    fn test_display_forms() {
        let doc = XmlDocument::new();

        let e = doc.create_element("e").unwrap();
        assert_eq!("<e />", e.as_node().to_string());

        e.set_attribute("a", "v").unwrap();
        e.append_child(doc.create_text_node("x").as_node()).unwrap();
        assert_eq!("<e a=\"v\">x</e>", e.as_node().to_string());

        assert_eq!("<!--c-->", doc.create_comment("c").as_node().to_string());
        assert_eq!(
            "<![CDATA[<x>]]>",
            doc.create_cdata_section("<x>").as_node().to_string()
        );
        assert_eq!(
            "<?p d?>",
            doc.create_processing_instruction("p", "d").unwrap().as_node().to_string()
        );
        assert_eq!(
            "<?p?>",
            doc.create_processing_instruction("p", "").unwrap().as_node().to_string()
        );
        assert_eq!(
            "&e;",
            doc.create_entity_reference("e").unwrap().as_node().to_string()
        );

        let doctype = XmlDocumentType::new("r", Some("-//X//EN"), Some("r.dtd")).unwrap();
        assert_eq!(
            "<!DOCTYPE r PUBLIC \"-//X//EN\" \"r.dtd\">",
            doctype.as_node().to_string()
        );
    }
}

// -----------------------------------------------------------------------------------------------
