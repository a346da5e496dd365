use std::fmt;

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local: &'a str,
}

impl<'a> QName<'a> {
    pub fn prefixed(prefix: &'a str, local: &'a str) -> Self {
        QName {
            prefix: Some(prefix),
            local,
        }
    }

    pub fn unprefixed(local: &'a str) -> Self {
        QName {
            prefix: None,
            local,
        }
    }

    pub fn qualified(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.to_string(),
        }
    }
}

impl<'a> From<&'a str> for QName<'a> {
    fn from(value: &'a str) -> Self {
        QName::unprefixed(value)
    }
}

impl<'a> From<(&'a str, &'a str)> for QName<'a> {
    fn from(value: (&'a str, &'a str)) -> Self {
        let (prefix, local) = value;
        QName::prefixed(prefix, local)
    }
}

impl<'a> fmt::Display for QName<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if let Some(prefix) = self.prefix {
            write!(f, "{}:", prefix)?;
        }
        write!(f, "{}", self.local)
    }
}

// -----------------------------------------------------------------------------------------------


// -----------------------------------------------------------------------------------------------
