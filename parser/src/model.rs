pub use xdom_nom::model::QName;

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Document<'a> {
    pub prolog: Prolog<'a>,
    pub root: Element<'a>,
    pub trailing: Vec<Misc<'a>>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
pub struct Prolog<'a> {
    pub decl: Option<XmlDecl<'a>>,
    pub before_doctype: Vec<Misc<'a>>,
    pub doctype: Option<Doctype<'a>>,
    pub after_doctype: Vec<Misc<'a>>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct XmlDecl<'a> {
    pub version: &'a str,
    pub encoding: Option<&'a str>,
    pub standalone: Option<bool>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum Misc<'a> {
    Comment(&'a str),
    Pi(Pi<'a>),
    Space,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Pi<'a> {
    pub target: &'a str,
    pub data: Option<&'a str>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Doctype<'a> {
    pub name: QName<'a>,
    pub external_id: Option<ExternalId<'a>>,
    pub subset: Option<Subset<'a>>,
}

// -----------------------------------------------------------------------------------------------

/// The internal subset together with its raw source text.
#[derive(Debug, PartialEq)]
pub struct Subset<'a> {
    pub raw: &'a str,
    pub decls: Vec<SubsetDecl<'a>>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ExternalId<'a> {
    System(&'a str),
    Public(&'a str, &'a str),
}

impl<'a> ExternalId<'a> {
    pub fn public_id(&self) -> Option<&'a str> {
        match self {
            ExternalId::System(_) => None,
            ExternalId::Public(p, _) => Some(p),
        }
    }

    pub fn system_id(&self) -> &'a str {
        match self {
            ExternalId::System(s) => s,
            ExternalId::Public(_, s) => s,
        }
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum SubsetDecl<'a> {
    Entity(EntityDecl<'a>),
    /// Parameter entity declaration; only the name is kept.
    ParameterEntity(&'a str),
    Notation(NotationDecl<'a>),
    /// Raw `<!ELEMENT ...>` text; content models are not interpreted.
    Element(&'a str),
    /// Raw `<!ATTLIST ...>` text; attribute defaults are not interpreted.
    AttList(&'a str),
    Pi(Pi<'a>),
    Comment(&'a str),
    PeReference(&'a str),
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct EntityDecl<'a> {
    pub name: &'a str,
    pub def: EntityDef<'a>,
}

#[derive(Debug, PartialEq)]
pub enum EntityDef<'a> {
    Internal(Vec<EntityValuePart<'a>>),
    External {
        id: ExternalId<'a>,
        ndata: Option<&'a str>,
    },
}

#[derive(Debug, PartialEq)]
pub enum EntityValuePart<'a> {
    Text(&'a str),
    CharRef(CharRef<'a>),
    EntityRef(&'a str),
    PeReference(&'a str),
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct NotationDecl<'a> {
    pub name: &'a str,
    pub public_id: Option<&'a str>,
    pub system_id: Option<&'a str>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharRef<'a> {
    pub digits: &'a str,
    pub radix: u32,
}

impl<'a> CharRef<'a> {
    /// Resolves the reference to its code point, when valid.
    pub fn resolve(&self) -> Option<char> {
        let value = u32::from_str_radix(self.digits, self.radix).ok()?;
        char::from_u32(value).filter(|c| xdom_nom::xmlchar::is_char(*c))
    }
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Element<'a> {
    pub name: QName<'a>,
    pub attributes: Vec<Attribute<'a>>,
    pub children: Vec<Content<'a>>,
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub struct Attribute<'a> {
    pub name: QName<'a>,
    pub value: Vec<AttrPart<'a>>,
}

#[derive(Debug, PartialEq)]
pub enum AttrPart<'a> {
    Text(&'a str),
    CharRef(CharRef<'a>),
    EntityRef(&'a str),
}

// -----------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum Content<'a> {
    Text(&'a str),
    Element(Element<'a>),
    CData(&'a str),
    CharRef(CharRef<'a>),
    EntityRef(&'a str),
    Pi(Pi<'a>),
    Comment(&'a str),
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_id() {
        let id = ExternalId::System("sys");
        assert_eq!(None, id.public_id());
        assert_eq!("sys", id.system_id());

        let id = ExternalId::Public("pub", "sys");
        assert_eq!(Some("pub"), id.public_id());
        assert_eq!("sys", id.system_id());
    }

    #[test]
    fn test_char_ref_resolve() {
        assert_eq!(Some('A'), CharRef { digits: "65", radix: 10 }.resolve());
        assert_eq!(Some('A'), CharRef { digits: "41", radix: 16 }.resolve());
        assert_eq!(None, CharRef { digits: "0", radix: 10 }.resolve());
        assert_eq!(None, CharRef { digits: "110000", radix: 16 }.resolve());
    }
}

// -----------------------------------------------------------------------------------------------
