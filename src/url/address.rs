use crate::UrlError;
use std::fmt;
use url::Url;

/// An absolute, normalized locator with the fragment removed
///
/// Two addresses that differ only by fragment compare equal, so `Address` is the
/// key for every frontier and link-set membership check. Normalization beyond the
/// fragment (lower-cased host, resolved dot segments, default port elision) is the
/// WHATWG parsing done by the `url` crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Url);

impl Address {
    /// Parses an absolute address
    ///
    /// # Arguments
    ///
    /// * `input` - An absolute URL string
    ///
    /// # Returns
    ///
    /// * `Ok(Address)` - The normalized address
    /// * `Err(UrlError)` - The input is not absolute or has no host
    ///
    /// # Examples
    ///
    /// ```
    /// use webspider::url::Address;
    ///
    /// let address = Address::parse("http://EXAMPLE.test/a/../page#top").unwrap();
    /// assert_eq!(address.as_str(), "http://example.test/page");
    /// ```
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let url = Url::parse(input).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;
        Self::from_url(url)
    }

    /// Wraps a parsed URL, dropping its fragment
    pub fn from_url(mut url: Url) -> Result<Self, UrlError> {
        if url.host_str().is_none() {
            return Err(UrlError::MissingHost);
        }
        url.set_fragment(None);
        Ok(Self(url))
    }

    /// Parses a seed address, which must be http or https
    pub fn parse_seed(input: &str) -> Result<Self, UrlError> {
        let address = Self::parse(input)?;
        match address.scheme() {
            "http" | "https" => Ok(address),
            other => Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS seeds are supported, got: {}",
                other
            ))),
        }
    }

    /// Resolves a reference found on this page against this address
    ///
    /// Relative, root-relative, scheme-relative and absolute references are all
    /// accepted; the result must still carry a host, which rules out `javascript:`,
    /// `data:` and similar references.
    pub fn resolve(&self, reference: &str) -> Result<Self, UrlError> {
        let joined = self
            .0
            .join(reference)
            .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;
        Self::from_url(joined)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Host without port
    pub fn host(&self) -> &str {
        // from_url guarantees a host
        self.0.host_str().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl std::str::FromStr for Address {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Address> for Url {
    fn from(address: Address) -> Self {
        address.0
    }
}
