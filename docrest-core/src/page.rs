//! Pagination metadata in the Spring-Data-HATEOAS style.
//!
//! Pages are zero-based. A [`PageRequest`] is read out of the caller's filters,
//! turned into a skip/limit window, and combined with the full match count to
//! produce a [`PageDescriptor`] and a [`LinkSet`]:
//!
//! ```ignore
//! use docrest::page::PageRequest;
//!
//! let request = PageRequest::new(2, 2);
//! let links = request.links(11)?;
//!
//! assert_eq!(request.page_count(11)?, 6);
//! assert_eq!(links.next.map(|l| l.page), Some(3));
//! assert_eq!(links.last.map(|l| l.page), Some(5));
//! ```

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    config::ManagerConfig,
    error::{ManagerError, ManagerResult},
    query::{FindOptions, Sort, display_string},
};

/// Which page the caller asked for, and how it should be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Number of items per page.
    pub size: u64,
    /// The page number (0-indexed).
    pub number: u64,
    /// Optional ordering applied before slicing.
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn new(size: u64, number: u64) -> Self {
        Self { size, number, sort: None }
    }

    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    /// Pops the page size, page number and sort arguments out of `filters`,
    /// leaving only the lookup entries behind.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidQueryArgument`] for a page or size that is
    /// not a non-negative integer, or a page number above `i64::MAX`, and
    /// [`ManagerError::InvalidSort`] for a malformed sort.
    pub fn from_filters(filters: &mut Document, config: &ManagerConfig) -> ManagerResult<Self> {
        let size = match filters.remove(&config.page_size_query_arg) {
            Some(value) => integer_arg(&config.page_size_query_arg, value)?,
            None => config.default_page_size,
        };
        let number = match filters.remove(&config.page_query_arg) {
            Some(value) => {
                let number = integer_arg(&config.page_query_arg, value)?;
                link_page(&config.page_query_arg, number)?;
                number
            },
            None => 0,
        };
        let sort = Sort::from_query_arg(filters.remove(&config.sort_query_arg))?;

        Ok(Self { size, number, sort })
    }

    /// Number of documents preceding this page.
    pub fn skip(&self) -> u64 {
        self.size.saturating_mul(self.number)
    }

    /// Find options selecting exactly this page.
    pub fn find_options(&self) -> FindOptions {
        FindOptions::builder()
            .maybe_sort(self.sort.clone())
            .skip(self.skip())
            .limit(self.size)
            .build()
    }

    /// Total number of pages for `count` matching documents.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::ZeroPageSize`] when the page size is zero.
    pub fn page_count(&self, count: u64) -> ManagerResult<u64> {
        if self.size == 0 {
            return Err(ManagerError::ZeroPageSize);
        }

        Ok(count.div_ceil(self.size))
    }

    /// Builds the page descriptor for `count` matching documents.
    pub fn descriptor(&self, count: u64) -> ManagerResult<PageDescriptor> {
        Ok(PageDescriptor {
            size: self.size,
            total_elements: count,
            total_pages: self.page_count(count)?,
            number: self.number,
        })
    }

    /// Computes the navigation links for `count` matching documents.
    ///
    /// `last` points at `page_count - 1` whenever the current page is not that
    /// page, which for an empty result is page `-1`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::ZeroPageSize`] when the page size is zero and
    /// [`ManagerError::InvalidQueryArgument`] when the page number does not fit
    /// a link.
    pub fn links(&self, count: u64) -> ManagerResult<LinkSet> {
        let page_count = link_page("page count", self.page_count(count)?)?;
        let number = link_page("page", self.number)?;
        let link = |page: i64| PageLink { page, size: self.size };

        Ok(LinkSet {
            next: number
                .checked_add(1)
                .filter(|_| count > self.size.saturating_mul(self.number.saturating_add(1)))
                .map(link),
            prev: (number > 0).then(|| link(number - 1)),
            first: (number > 0).then(|| link(0)),
            last: (number != page_count - 1).then(|| link(page_count - 1)),
        })
    }
}

/// Converts a page index to the signed form links carry.
fn link_page(name: &str, page: u64) -> ManagerResult<i64> {
    i64::try_from(page).map_err(|_| ManagerError::InvalidQueryArgument(name.to_string(), page.to_string()))
}

/// Reads a non-negative integer query argument. Strings are parsed, whole
/// doubles accepted and single-element arrays unwrapped.
fn integer_arg(name: &str, value: Bson) -> ManagerResult<u64> {
    let invalid = |value: &Bson| ManagerError::InvalidQueryArgument(name.to_string(), display_string(value));

    match value {
        Bson::Int32(n) => u64::try_from(n).map_err(|_| invalid(&value)),
        Bson::Int64(n) => u64::try_from(n).map_err(|_| invalid(&value)),
        Bson::Double(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
        Bson::String(ref s) => s.trim().parse::<u64>().map_err(|_| invalid(&value)),
        Bson::Array(mut values) if values.len() == 1 => match values.pop() {
            Some(single) => integer_arg(name, single),
            None => Err(ManagerError::InvalidQueryArgument(name.to_string(), "[]".to_string())),
        },
        other => Err(invalid(&other)),
    }
}

/// Size and position of the returned page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
}

/// Wrapper giving the descriptor its `page` key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageObject {
    pub page: PageDescriptor,
}

/// Serialized documents of one page, plus the page descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PagePayload {
    pub data: Vec<Value>,
    pub page_object: PageObject,
}

impl PagePayload {
    /// Flattens the payload into resource properties: the documents under
    /// `resource_name`, the descriptor under `page`.
    pub fn into_resource_properties(self, resource_name: &str) -> Value {
        let mut properties = Map::new();
        properties.insert(resource_name.to_string(), Value::Array(self.data));
        properties.insert("page".to_string(), json!(self.page_object.page));

        Value::Object(properties)
    }
}

/// A link to another page.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub page: i64,
    pub size: u64,
}

impl PageLink {
    /// Renders the link as query arguments using the configured names.
    pub fn to_value(&self, config: &ManagerConfig) -> Value {
        let mut args = Map::new();
        args.insert(config.page_query_arg.clone(), json!(self.page));
        args.insert(config.page_size_query_arg.clone(), json!(self.size));

        Value::Object(args)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    pub next: Option<PageLink>,
    pub prev: Option<PageLink>,
    pub first: Option<PageLink>,
    pub last: Option<PageLink>,
}

impl LinkSet {
    pub fn to_value(&self, config: &ManagerConfig) -> Value {
        let render = |link: &Option<PageLink>| {
            link.as_ref()
                .map(|link| link.to_value(config))
                .unwrap_or(Value::Null)
        };

        json!({
            "next": render(&self.next),
            "prev": render(&self.prev),
            "first": render(&self.first),
            "last": render(&self.last),
        })
    }
}

/// Link metadata returned next to a page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMeta {
    pub links: LinkSet,
}

impl LinkMeta {
    pub fn to_value(&self, config: &ManagerConfig) -> Value {
        json!({ "links": self.links.to_value(config) })
    }
}

/// Metadata returned next to an unpaginated listing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMeta {
    pub count: u64,
}
