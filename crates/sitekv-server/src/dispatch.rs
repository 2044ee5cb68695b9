//! Request routing.
//!
//! Routes are an ordered table of named matchers, evaluated first-match-wins.
//! Order matters: `/api/pages/all` and `/api/pages/delete/…` must be claimed
//! before the generic `/api/pages/{id}` matcher, which also refuses them
//! explicitly. A request no matcher claims gets the liveness reply.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sitekv_core::RecordType;
use tracing::debug;

use crate::error::AppError;
use crate::handlers;
use crate::state::AppState;

/// Coarse request intent derived from the HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `GET`, `HEAD`
    Read,
    /// `POST`, `PUT`, `PATCH`
    Write,
    /// `DELETE`
    Remove,
    /// Anything else.
    Other,
}

impl Verb {
    #[must_use]
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD => Self::Read,
            Method::POST | Method::PUT | Method::PATCH => Self::Write,
            Method::DELETE => Self::Remove,
            _ => Self::Other,
        }
    }
}

/// A resolved request, ready for a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// List every record of an identified type for the tenant in the body.
    List(RecordType),
    /// Page + navigation + footer in one call.
    Bundle,
    /// Read one identified record.
    Get { record_type: RecordType, id: String },
    /// Create or replace one identified record.
    Put { record_type: RecordType, id: String },
    /// Delete one identified record.
    Delete { record_type: RecordType, id: String },
    /// Read a singleton for the tenant named in the path.
    GetSingleton {
        record_type: RecordType,
        tenant_id: String,
    },
    /// Write a singleton for the tenant in the body.
    PutSingleton(RecordType),
    /// No route matched.
    Liveness,
}

/// A path namespace for one record type.
struct Collection {
    record_type: RecordType,
    base: &'static str,
}

const PAGES: Collection = Collection {
    record_type: RecordType::Page,
    base: "/api/pages",
};
const PRODUCTS: Collection = Collection {
    record_type: RecordType::Product,
    base: "/api/products",
};
const NAVIGATION: Collection = Collection {
    record_type: RecordType::Navigation,
    base: "/api/navigation",
};
const FOOTER: Collection = Collection {
    record_type: RecordType::Footer,
    base: "/api/footer",
};

const BUNDLE_PREFIX: &str = "/api/getAllData";
const ALL_SEGMENT: &str = "all";
const DELETE_SEGMENT: &str = "delete";

impl Collection {
    /// Path remainder after `{base}/`.
    fn rest<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.base)?.strip_prefix('/')
    }

    fn list(&self, verb: Verb, path: &str) -> Option<Route> {
        (verb == Verb::Write && self.rest(path) == Some(ALL_SEGMENT))
            .then_some(Route::List(self.record_type))
    }

    fn record(&self, verb: Verb, path: &str) -> Option<Route> {
        let rest = self.rest(path)?;
        if rest.is_empty() || rest == ALL_SEGMENT || is_delete_path(rest) {
            return None;
        }
        let id = decode_segment(rest);
        let record_type = self.record_type;
        match verb {
            Verb::Read => Some(Route::Get { record_type, id }),
            Verb::Write => Some(Route::Put { record_type, id }),
            Verb::Remove | Verb::Other => None,
        }
    }

    fn delete(&self, verb: Verb, path: &str) -> Option<Route> {
        let id = self
            .rest(path)?
            .strip_prefix(DELETE_SEGMENT)?
            .strip_prefix('/')?;
        if id.is_empty() || !matches!(verb, Verb::Write | Verb::Remove) {
            return None;
        }
        Some(Route::Delete {
            record_type: self.record_type,
            id: decode_segment(id),
        })
    }

    fn singleton(&self, verb: Verb, path: &str) -> Option<Route> {
        let record_type = self.record_type;
        match verb {
            Verb::Write if path == self.base => Some(Route::PutSingleton(record_type)),
            Verb::Read => {
                let tenant = self.rest(path).filter(|t| !t.is_empty())?;
                Some(Route::GetSingleton {
                    record_type,
                    tenant_id: decode_segment(tenant),
                })
            }
            _ => None,
        }
    }
}

fn is_delete_path(rest: &str) -> bool {
    rest == DELETE_SEGMENT
        || rest
            .strip_prefix(DELETE_SEGMENT)
            .is_some_and(|r| r.starts_with('/'))
}

/// Percent-decode a path segment, keeping it verbatim if it is not UTF-8.
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_owned(), |s| s.into_owned())
}

type Matcher = fn(Verb, &str) -> Option<Route>;

/// One entry of the routing table.
pub struct RouteSpec {
    pub name: &'static str,
    matcher: Matcher,
}

/// The routing table, in priority order.
pub static ROUTES: [RouteSpec; 9] = [
    RouteSpec {
        name: "list pages",
        matcher: |v, p| PAGES.list(v, p),
    },
    RouteSpec {
        name: "bundle",
        matcher: |v, p| (v == Verb::Write && p.starts_with(BUNDLE_PREFIX)).then_some(Route::Bundle),
    },
    RouteSpec {
        name: "page",
        matcher: |v, p| PAGES.record(v, p),
    },
    RouteSpec {
        name: "delete page",
        matcher: |v, p| PAGES.delete(v, p),
    },
    RouteSpec {
        name: "navigation",
        matcher: |v, p| NAVIGATION.singleton(v, p),
    },
    RouteSpec {
        name: "footer",
        matcher: |v, p| FOOTER.singleton(v, p),
    },
    RouteSpec {
        name: "list products",
        matcher: |v, p| PRODUCTS.list(v, p),
    },
    RouteSpec {
        name: "product",
        matcher: |v, p| PRODUCTS.record(v, p),
    },
    RouteSpec {
        name: "delete product",
        matcher: |v, p| PRODUCTS.delete(v, p),
    },
];

/// Resolve a request to a route. Returns the matching entry's name alongside.
#[must_use]
pub fn resolve(method: &Method, path: &str) -> (&'static str, Route) {
    let verb = Verb::from_method(method);
    ROUTES
        .iter()
        .find_map(|spec| (spec.matcher)(verb, path).map(|route| (spec.name, route)))
        .unwrap_or(("liveness", Route::Liveness))
}

/// Query parameters accepted on read routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    #[serde(alias = "websiteId")]
    pub tenant_id: Option<String>,
}

/// Parse the query string of a read request.
fn read_params(uri: &Uri) -> Result<ReadParams, AppError> {
    Query::<ReadParams>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|rejection| {
            AppError::BadRequest(format!("invalid query string: {}", rejection.body_text()))
        })
}

/// Unwrap a buffered body, keeping rejections inside the JSON error envelope.
fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("request body too large".to_owned())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

/// Fallback handler: resolve and dispatch every request.
///
/// The query string and body are only interpreted by routes that use them,
/// so a request nothing claims always gets the liveness reply.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let (name, route) = resolve(&method, uri.path());
    debug!(%method, path = uri.path(), route = name, "dispatching request");

    dispatch(&state, route, &uri, body).await.into_response()
}

async fn dispatch(
    state: &AppState,
    route: Route,
    uri: &Uri,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    match route {
        Route::List(record_type) => handlers::list(state, record_type, &body_bytes(body)?).await,
        Route::Bundle => handlers::bundle(state, &body_bytes(body)?).await,
        Route::Get { record_type, id } => {
            let params = read_params(uri)?;
            handlers::get(state, record_type, &id, params.tenant_id.as_deref()).await
        }
        Route::Put { record_type, id } => {
            handlers::put(state, record_type, &id, &body_bytes(body)?).await
        }
        Route::Delete { record_type, id } => {
            handlers::delete(state, record_type, &id, &body_bytes(body)?).await
        }
        Route::GetSingleton {
            record_type,
            tenant_id,
        } => handlers::get_singleton(state, record_type, &tenant_id).await,
        Route::PutSingleton(record_type) => {
            handlers::put_singleton(state, record_type, &body_bytes(body)?).await
        }
        Route::Liveness => Ok(handlers::liveness()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, path: &str) -> Route {
        resolve(&method, path).1
    }

    fn page(id: &str) -> (RecordType, String) {
        (RecordType::Page, id.to_owned())
    }

    #[test]
    fn list_all_is_claimed_before_single_page() {
        assert_eq!(
            route(Method::POST, "/api/pages/all"),
            Route::List(RecordType::Page)
        );
        // Never treated as a page called "all".
        assert_eq!(route(Method::GET, "/api/pages/all"), Route::Liveness);
    }

    #[test]
    fn bundle_matches_by_prefix() {
        assert_eq!(route(Method::POST, "/api/getAllData"), Route::Bundle);
        assert_eq!(route(Method::POST, "/api/getAllDataForPage"), Route::Bundle);
        assert_eq!(route(Method::GET, "/api/getAllData"), Route::Liveness);
    }

    #[test]
    fn single_page_by_method() {
        let (record_type, id) = page("about");
        assert_eq!(
            route(Method::GET, "/api/pages/about"),
            Route::Get {
                record_type,
                id: id.clone()
            }
        );
        assert_eq!(
            route(Method::POST, "/api/pages/about"),
            Route::Put {
                record_type,
                id: id.clone()
            }
        );
        assert_eq!(
            route(Method::PUT, "/api/pages/about"),
            Route::Put { record_type, id }
        );
    }

    #[test]
    fn page_identifier_keeps_path_segments_and_is_decoded() {
        assert_eq!(
            route(Method::GET, "/api/pages/blog/first-post"),
            Route::Get {
                record_type: RecordType::Page,
                id: "blog/first-post".to_owned()
            }
        );
        assert_eq!(
            route(Method::GET, "/api/pages/site1%3Apage%3Aabout"),
            Route::Get {
                record_type: RecordType::Page,
                id: "site1:page:about".to_owned()
            }
        );
    }

    #[test]
    fn delete_is_never_a_page_write() {
        let (record_type, id) = page("about");
        assert_eq!(
            route(Method::POST, "/api/pages/delete/about"),
            Route::Delete {
                record_type,
                id: id.clone()
            }
        );
        assert_eq!(
            route(Method::DELETE, "/api/pages/delete/about"),
            Route::Delete { record_type, id }
        );
        assert_eq!(route(Method::GET, "/api/pages/delete/about"), Route::Liveness);
        assert_eq!(route(Method::POST, "/api/pages/delete"), Route::Liveness);
    }

    #[test]
    fn page_named_like_delete_prefix_is_still_a_page() {
        assert_eq!(
            route(Method::GET, "/api/pages/deleted-items"),
            Route::Get {
                record_type: RecordType::Page,
                id: "deleted-items".to_owned()
            }
        );
    }

    #[test]
    fn singletons() {
        assert_eq!(
            route(Method::GET, "/api/navigation/site1"),
            Route::GetSingleton {
                record_type: RecordType::Navigation,
                tenant_id: "site1".to_owned()
            }
        );
        assert_eq!(
            route(Method::POST, "/api/navigation"),
            Route::PutSingleton(RecordType::Navigation)
        );
        assert_eq!(
            route(Method::GET, "/api/footer/site1"),
            Route::GetSingleton {
                record_type: RecordType::Footer,
                tenant_id: "site1".to_owned()
            }
        );
        assert_eq!(
            route(Method::POST, "/api/footer"),
            Route::PutSingleton(RecordType::Footer)
        );
        assert_eq!(route(Method::GET, "/api/footer"), Route::Liveness);
        assert_eq!(route(Method::GET, "/api/footerx/site1"), Route::Liveness);
    }

    #[test]
    fn products_mirror_pages() {
        assert_eq!(
            route(Method::POST, "/api/products/all"),
            Route::List(RecordType::Product)
        );
        assert_eq!(
            route(Method::GET, "/api/products/mug"),
            Route::Get {
                record_type: RecordType::Product,
                id: "mug".to_owned()
            }
        );
        assert_eq!(
            route(Method::DELETE, "/api/products/delete/mug"),
            Route::Delete {
                record_type: RecordType::Product,
                id: "mug".to_owned()
            }
        );
    }

    #[test]
    fn unmatched_is_liveness() {
        for (method, path) in [
            (Method::GET, "/"),
            (Method::GET, "/health"),
            (Method::POST, "/api/unknown"),
            (Method::GET, "/api/pages/"),
            (Method::OPTIONS, "/api/pages/about"),
        ] {
            assert_eq!(resolve(&method, path), ("liveness", Route::Liveness));
        }
    }

    #[test]
    fn route_names_are_unique() {
        let mut names: Vec<_> = ROUTES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ROUTES.len());
    }
}
