//! Admin user listing with stale-response protection. Every fetch takes a
//! ticket; a response is applied only while its ticket is still the latest,
//! so a slow answer to an old query can never replace a newer one.

use crate::{
    features::users::{
        client,
        types::{UserPage, UserSummary},
    },
    portal::{ApiClient, ApiError},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, PoisonError,
};
use tracing::debug;

/// Rows per page the server uses when the client does not ask otherwise.
pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    pub page: u32,
    pub search: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingView {
    pub query: ListingQuery,
    pub users: Vec<UserSummary>,
    pub total: Option<u64>,
    pub pages: Option<u32>,
    pub has_more: bool,
}

impl ListingView {
    fn from_page(query: ListingQuery, page: UserPage) -> Self {
        let has_more = has_more(&page);
        Self {
            query,
            users: page.users,
            total: page.total,
            pages: page.pages,
            has_more,
        }
    }
}

/// Whether another page exists. The server's `has_next` wins; without it a
/// full page is taken to mean there may be more.
#[must_use]
pub fn has_more(page: &UserPage) -> bool {
    page.has_next.unwrap_or(page.users.len() >= PAGE_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct UserListing {
    issued: AtomicU64,
    current: Mutex<Option<ListingView>>,
}

impl UserListing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket; any ticket issued earlier becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Stores the page if the ticket is still current. Returns the applied
    /// view, or `None` when the response was stale and dropped.
    pub fn apply(&self, ticket: Ticket, query: ListingQuery, page: UserPage) -> Option<ListingView> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_latest(ticket) {
            debug!(?query, "discarding stale user listing response");
            return None;
        }
        let view = ListingView::from_page(query, page);
        *current = Some(view.clone());
        Some(view)
    }

    #[must_use]
    pub fn current(&self) -> Option<ListingView> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetches and applies a page. `Ok(None)` means a newer fetch started
    /// while this one was in flight.
    ///
    /// # Errors
    /// Returns the API error of the fetch.
    pub async fn fetch(
        &self,
        api: &ApiClient,
        query: ListingQuery,
    ) -> Result<Option<ListingView>, ApiError> {
        let ticket = self.begin();
        let page = client::list_users(api, query.page, &query.search).await?;
        Ok(self.apply(ticket, query, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::PortalConfig;
    use serde_json::json;
    use std::{net::TcpListener, time::Duration};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn user(id: u64) -> UserSummary {
        serde_json::from_value(json!({
            "id": id,
            "nombre_completo": format!("User {id}"),
            "correo_electronico": format!("user{id}@example.com"),
            "estado": "activo"
        }))
        .unwrap()
    }

    fn page(count: u64, has_next: Option<bool>) -> UserPage {
        UserPage {
            users: (1..=count).map(user).collect(),
            total: None,
            page: None,
            pages: None,
            has_next,
            has_prev: None,
        }
    }

    #[test]
    fn has_more_prefers_server_flag() {
        assert!(!has_more(&page(10, Some(false))));
        assert!(has_more(&page(3, Some(true))));
        assert!(has_more(&page(10, None)));
        assert!(!has_more(&page(9, None)));
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let listing = UserListing::new();
        let first = listing.begin();
        let second = listing.begin();

        let newer = ListingQuery {
            page: 1,
            search: "b".to_string(),
        };
        assert!(listing.apply(second, newer.clone(), page(1, None)).is_some());
        assert!(listing
            .apply(first, ListingQuery::default(), page(5, None))
            .is_none());
        assert_eq!(listing.current().unwrap().query, newer);
    }

    #[tokio::test]
    async fn slow_old_query_does_not_overwrite_newer() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("q", "slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "users": [] }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("q", "fast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{ "id": 1, "nombre_completo": "Fast", "correo_electronico": "f@example.com" }]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&PortalConfig::new(&server.uri(), 5).unwrap()).unwrap();
        let listing = UserListing::new();
        let slow = ListingQuery {
            page: 1,
            search: "slow".to_string(),
        };
        let fast = ListingQuery {
            page: 1,
            search: "fast".to_string(),
        };

        let slow_fetch = listing.fetch(&api, slow);
        let fast_fetch = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            listing.fetch(&api, fast.clone()).await
        };
        let (slow_result, fast_result) = tokio::join!(slow_fetch, fast_fetch);

        assert!(slow_result.unwrap().is_none());
        assert!(fast_result.unwrap().is_some());
        let current = listing.current().unwrap();
        assert_eq!(current.query, fast);
        assert_eq!(current.users.len(), 1);
    }
}
