//! Request modifiers.
//!
//! Every request carries a `modifier1` (which plugin handles it) and an
//! optional `modifier2` (a plugin-specific sub-mode).

use std::fmt;

/// A `modifier1`/`modifier2` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifier {
    code: u16,
    submod: Option<u16>,
}

impl Modifier {
    /// Python WSGI.
    pub const WSGI: Self = Self::new(0);
    /// Perl PSGI.
    pub const PSGI: Self = Self::new(5);
    /// Lua WSAPI.
    pub const LUA: Self = Self::new(6);
    /// Ruby Rack.
    pub const RACK: Self = Self::new(7);
    /// JVM.
    pub const JVM: Self = Self::new(8);
    /// CGI.
    pub const CGI: Self = Self::new(9);
    /// Go.
    pub const GCCGO: Self = Self::new(11);
    /// PHP.
    pub const PHP: Self = Self::new(14);
    /// Mono ASP.NET.
    pub const MONO: Self = Self::new(15);
    /// Spooler requests.
    pub const SPOOLER: Self = Self::new(17);
    /// Symcall.
    pub const SYMCALL: Self = Self::new(18);
    /// Server side includes.
    pub const SSI: Self = Self::new(19);
    /// Eval.
    pub const EVAL: Self = Self::new(22);
    /// XSLT.
    pub const XSLT: Self = Self::new(23);
    /// V8 JavaScript.
    pub const V8: Self = Self::new(24);
    /// GridFS.
    pub const GRIDFS: Self = Self::new(25);
    /// WebDAV.
    pub const WEBDAV: Self = Self::new(35);
    /// Ping.
    pub const PING: Self = Self::new(100);
    /// Echo.
    pub const ECHO: Self = Self::new(101);
    /// Raise a signal.
    pub const SIGNAL: Self = Self::new(110);
    /// Cache access.
    pub const CACHE: Self = Self::new(111);

    /// A modifier with an arbitrary code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self { code, submod: None }
    }

    /// Adds a `modifier2` sub-mode.
    #[must_use]
    pub const fn with_submod(mut self, submod: u16) -> Self {
        self.submod = Some(submod);
        self
    }

    /// `modifier1` code.
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// `modifier2` code, if any.
    pub const fn submod(&self) -> Option<u16> {
        self.submod
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.submod {
            Some(submod) => write!(f, "{},{}", self.code, submod),
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Modifier::PSGI.to_string(), "5");
        assert_eq!(Modifier::CGI.with_submod(2).to_string(), "9,2");
    }
}
