// -----------------------------------------------------------------------------------------------

/// The closed set of structural error kinds raised by mutating operations.
///
/// Codes follow the DOM numbering; `StringSize` is the legacy alias of
/// `DomstringSize` and shares its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomException {
    IndexSize,
    DomstringSize,
    HierarchyRequest,
    WrongDocument,
    InvalidCharacter,
    NoDataAllowed,
    NoModificationAllowed,
    NotFound,
    NotSupported,
    InuseAttribute,
    InvalidState,
    Syntax,
    InvalidModification,
    Namespace,
    InvalidAccess,
    Validation,
    StringSize,
}

impl DomException {
    pub fn code(&self) -> u16 {
        match self {
            DomException::IndexSize => 1,
            DomException::DomstringSize => 2,
            DomException::HierarchyRequest => 3,
            DomException::WrongDocument => 4,
            DomException::InvalidCharacter => 5,
            DomException::NoDataAllowed => 6,
            DomException::NoModificationAllowed => 7,
            DomException::NotFound => 8,
            DomException::NotSupported => 9,
            DomException::InuseAttribute => 10,
            DomException::InvalidState => 11,
            DomException::Syntax => 12,
            DomException::InvalidModification => 13,
            DomException::Namespace => 14,
            DomException::InvalidAccess => 15,
            DomException::Validation => 16,
            DomException::StringSize => 2,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DomException::IndexSize => "index or size is out of range",
            DomException::DomstringSize => "text does not fit in a string",
            DomException::HierarchyRequest => "node cannot be inserted at this location",
            DomException::WrongDocument => "node belongs to a different document",
            DomException::InvalidCharacter => "name contains an invalid character",
            DomException::NoDataAllowed => "node does not carry data",
            DomException::NoModificationAllowed => "node is read only",
            DomException::NotFound => "node is not present here",
            DomException::NotSupported => "operation is not supported",
            DomException::InuseAttribute => "attribute belongs to another element",
            DomException::InvalidState => "object is no longer usable",
            DomException::Syntax => "string is not valid here",
            DomException::InvalidModification => "node kind cannot be changed",
            DomException::Namespace => "name is inconsistent with its namespace",
            DomException::InvalidAccess => "parameter is not supported by this object",
            DomException::Validation => "change would leave the tree invalid",
            DomException::StringSize => "text does not fit in a string",
        }
    }
}

impl std::error::Error for DomException {}

impl std::fmt::Display for DomException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

pub type Result<T> = std::result::Result<T, DomException>;

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
