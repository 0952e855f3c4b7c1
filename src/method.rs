//! HTTP method type for datastore requests.

use strum::{Display, EnumString};

/// HTTP methods issued by the datastore client.
///
/// Only the methods a LoopBack datastore adapter actually sends are listed;
/// this is not a general-purpose HTTP method type.
///
/// ## Examples
///
/// ```rust
/// use loopback_datastore::Method;
///
/// assert_eq!(Method::Get.to_string(), "GET");
/// assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// HTTP GET - retrieve resources.
    Get,
    /// HTTP POST - create a resource or perform a login exchange.
    Post,
    /// HTTP PUT - replace a resource.
    Put,
    /// HTTP PATCH - partially update a resource.
    Patch,
    /// HTTP DELETE - remove a resource.
    Delete,
}

impl Method {
    /// Returns `true` if this method typically carries a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        method.to_reqwest()
    }
}
